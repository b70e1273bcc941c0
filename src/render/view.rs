//! View model for the message listing

use crate::store::Records;

/// One row of the listing, values already HTML-escaped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageView {
    pub timestamp: String,
    pub username: String,
    pub message: String,
}

impl MessageView {
    /// Value of a template variable for this row
    pub fn field(&self, name: &str) -> Option<&str> {
        match name {
            "timestamp" => Some(&self.timestamp),
            "username" => Some(&self.username),
            "message" => Some(&self.message),
            _ => None,
        }
    }
}

/// Build the listing in key order (oldest first for timestamp keys)
///
/// Records without a `username` or `message` field show an empty string.
pub fn build_view(records: &Records) -> Vec<MessageView> {
    records
        .iter()
        .map(|(timestamp, record)| MessageView {
            timestamp: escape_html(timestamp),
            username: escape_html(record.get("username").map_or("", String::as_str)),
            message: escape_html(record.get("message").map_or("", String::as_str)),
        })
        .collect()
}

/// Escape text for use in HTML content and attribute values
pub fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Record;

    #[test]
    fn test_build_view_orders_by_key() {
        let mut records = Records::new();
        let mut late = Record::new();
        late.insert("username".to_string(), "bob".to_string());
        late.insert("message".to_string(), "second".to_string());
        let mut early = Record::new();
        early.insert("username".to_string(), "alice".to_string());
        early.insert("message".to_string(), "first".to_string());
        records.insert("2024-01-02 00:00:00.000000".to_string(), late);
        records.insert("2024-01-01 00:00:00.000000".to_string(), early);

        let view = build_view(&records);
        assert_eq!(view.len(), 2);
        assert_eq!(view[0].username, "alice");
        assert_eq!(view[1].message, "second");
    }

    #[test]
    fn test_missing_fields_render_empty() {
        let mut records = Records::new();
        records.insert("k".to_string(), Record::new());
        let view = build_view(&records);
        assert_eq!(view[0].username, "");
        assert_eq!(view[0].field("message"), Some(""));
        assert_eq!(view[0].field("email"), None);
    }

    #[test]
    fn test_values_are_escaped() {
        assert_eq!(
            escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#x27;Jerry&#x27;&lt;/b&gt;"
        );
    }
}
