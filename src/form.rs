//! URL-encoded form body parsing
//!
//! The whole body is decoded first and split afterwards, so an encoded `&`
//! or `=` inside a value splits the pair. Submissions from the bundled form
//! never contain those, and the behaviour is kept as is.

use crate::error::{AppError, Result};
use crate::store::Record;

/// Decode a form body and split it into field name/value pairs
///
/// Pairs are separated by `&`, name and value by the first `=`. A segment
/// without `=` (including an empty body) is rejected. Repeated names keep
/// the last value.
pub fn parse_form(body: &[u8]) -> Result<Record> {
    let decoded = decode_plus(body);

    decoded
        .split('&')
        .map(|segment| {
            segment
                .split_once('=')
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .ok_or_else(|| AppError::MalformedFormBody(segment.to_string()))
        })
        .collect()
}

/// Percent-decode `input`, turning `+` into a space
///
/// Invalid escapes are kept literally; bytes that are not valid UTF-8 after
/// decoding become U+FFFD.
pub fn decode_plus(input: &[u8]) -> String {
    let mut out = Vec::with_capacity(input.len());
    let mut i = 0;

    while i < input.len() {
        match input[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' => match (input.get(i + 1), input.get(i + 2)) {
                (Some(&hi), Some(&lo)) if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit() => {
                    out.push((hex_value(hi) << 4) | hex_value(lo));
                    i += 3;
                }
                _ => {
                    out.push(b'%');
                    i += 1;
                }
            },
            byte => {
                out.push(byte);
                i += 1;
            }
        }
    }

    String::from_utf8_lossy(&out).into_owned()
}

const fn hex_value(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        b'A'..=b'F' => digit - b'A' + 10,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_pairs() {
        let record = parse_form(b"username=alice&message=hi").unwrap();
        assert_eq!(record.len(), 2);
        assert_eq!(record["username"], "alice");
        assert_eq!(record["message"], "hi");
    }

    #[test]
    fn test_plus_and_percent_decoding() {
        let record = parse_form(b"username=J%C3%BCrgen&message=hello+there%21").unwrap();
        assert_eq!(record["username"], "Jürgen");
        assert_eq!(record["message"], "hello there!");
    }

    #[test]
    fn test_split_on_first_equals() {
        let record = parse_form(b"expr=a=b").unwrap();
        assert_eq!(record["expr"], "a=b");
    }

    #[test]
    fn test_empty_value_is_allowed() {
        let record = parse_form(b"username=&message=hi").unwrap();
        assert_eq!(record["username"], "");
    }

    #[test]
    fn test_segment_without_equals_is_malformed() {
        match parse_form(b"username=alice&oops") {
            Err(AppError::MalformedFormBody(segment)) => assert_eq!(segment, "oops"),
            other => panic!("expected malformed body, got {other:?}"),
        }
        assert!(matches!(
            parse_form(b""),
            Err(AppError::MalformedFormBody(_))
        ));
    }

    #[test]
    fn test_encoded_ampersand_splits_value() {
        // decoding happens before splitting
        let record = parse_form(b"message=fish%26chips%3Dyes").unwrap();
        assert_eq!(record["message"], "fish");
        assert_eq!(record["chips"], "yes");
    }

    #[test]
    fn test_invalid_escape_kept_literally() {
        assert_eq!(decode_plus(b"100%"), "100%");
        assert_eq!(decode_plus(b"%zz"), "%zz");
        assert_eq!(decode_plus(b"%4"), "%4");
    }
}
