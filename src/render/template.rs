//! Listing template expansion
//!
//! Supported markup:
//! - `<!-- each -->...<!-- end -->` repeated once per message, with
//!   `$timestamp`, `$username` and `$message` substituted inside
//! - `<!-- empty -->...<!-- end -->` kept only when there are no messages
//! - `$count` anywhere, the number of messages
//!
//! Unknown `$variables` and unterminated sections are left as written.

use super::view::MessageView;

const EACH_OPEN: &str = "<!-- each -->";
const EMPTY_OPEN: &str = "<!-- empty -->";
const SECTION_END: &str = "<!-- end -->";

/// Template used for `/read` when no template file is configured
pub const DEFAULT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Messages</title>
    <link rel="stylesheet" href="/style.css">
</head>
<body>
    <h1>Messages ($count)</h1>
    <ul class="messages">
<!-- each -->
        <li>
            <span class="timestamp">$timestamp</span>
            <strong class="username">$username</strong>
            <p class="message">$message</p>
        </li>
<!-- end -->
    </ul>
<!-- empty -->
    <p class="empty">No messages yet</p>
<!-- end -->
    <p><a href="/message">Leave a message</a> | <a href="/">Home</a></p>
</body>
</html>
"#;

/// Expand `template` against the message rows
pub fn expand(template: &str, rows: &[MessageView]) -> String {
    let count = rows.len().to_string();
    let top_level = |name: &str| (name == "count").then_some(count.as_str());

    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some((start, open)) = next_section(rest) {
        let body_start = start + open.len();
        let Some(body_len) = rest[body_start..].find(SECTION_END) else {
            break;
        };

        substitute(&rest[..start], &top_level, &mut out);
        let body = &rest[body_start..body_start + body_len];

        if open == EACH_OPEN {
            for row in rows {
                substitute(
                    body,
                    &|name: &str| row.field(name).or_else(|| top_level(name)),
                    &mut out,
                );
            }
        } else if rows.is_empty() {
            substitute(body, &top_level, &mut out);
        }

        rest = &rest[body_start + body_len + SECTION_END.len()..];
    }

    substitute(rest, &top_level, &mut out);
    out
}

/// Earliest section opener in `text`
fn next_section(text: &str) -> Option<(usize, &'static str)> {
    [EACH_OPEN, EMPTY_OPEN]
        .into_iter()
        .filter_map(|open| text.find(open).map(|pos| (pos, open)))
        .min_by_key(|(pos, _)| *pos)
}

/// Replace `$name` variables in a single pass, so substituted values are
/// never expanded again
fn substitute<'a>(text: &str, lookup: &dyn Fn(&str) -> Option<&'a str>, out: &mut String) {
    let mut rest = text;

    while let Some(dollar) = rest.find('$') {
        out.push_str(&rest[..dollar]);
        let after = &rest[dollar + 1..];
        let name_len = after
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(after.len());
        let name = &after[..name_len];

        match lookup(name) {
            Some(value) if !name.is_empty() => out.push_str(value),
            _ => {
                out.push('$');
                out.push_str(name);
            }
        }
        rest = &after[name_len..];
    }

    out.push_str(rest);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(timestamp: &str, username: &str, message: &str) -> MessageView {
        MessageView {
            timestamp: timestamp.to_string(),
            username: username.to_string(),
            message: message.to_string(),
        }
    }

    #[test]
    fn test_each_section_repeats() {
        let template = "<ul><!-- each --><li>$username: $message</li><!-- end --></ul>";
        let rows = [row("t1", "alice", "hi"), row("t2", "bob", "yo")];
        assert_eq!(
            expand(template, &rows),
            "<ul><li>alice: hi</li><li>bob: yo</li></ul>"
        );
    }

    #[test]
    fn test_empty_section_only_without_rows() {
        let template = "<!-- each -->$message<!-- end --><!-- empty -->none<!-- end -->";
        assert_eq!(expand(template, &[]), "none");
        assert_eq!(expand(template, &[row("t", "u", "m")]), "m");
    }

    #[test]
    fn test_count_and_unknown_variables() {
        let template = "$count messages, $price stays, $ alone";
        assert_eq!(
            expand(template, &[row("t", "u", "m")]),
            "1 messages, $price stays, $ alone"
        );
    }

    #[test]
    fn test_values_are_not_expanded_twice() {
        let template = "<!-- each -->$username|$message<!-- end -->";
        assert_eq!(
            expand(template, &[row("t", "$message", "real")]),
            "$message|real"
        );
    }

    #[test]
    fn test_unterminated_section_left_as_written() {
        let template = "a <!-- each -->$username";
        assert_eq!(expand(template, &[row("t", "u", "m")]), template);
    }

    #[test]
    fn test_default_template() {
        let empty = expand(DEFAULT_TEMPLATE, &[]);
        assert!(empty.contains("No messages yet"));
        assert!(empty.contains("Messages (0)"));

        let listed = expand(DEFAULT_TEMPLATE, &[row("2024-01-01 10:00:00.000000", "alice", "hi")]);
        assert!(!listed.contains("No messages yet"));
        assert!(listed.contains("2024-01-01 10:00:00.000000"));
        assert!(listed.contains("alice"));
        assert!(listed.contains("<p class=\"message\">hi</p>"));
    }
}
