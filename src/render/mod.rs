//! Renderer module
//!
//! Turns the stored records into response bytes: HTML through the listing
//! template, or the store file as-is for JSON output.

pub mod template;
pub mod view;

use std::path::Path;
use tokio::fs;

use crate::error::{AppError, Result};
use crate::store::{JsonStore, Records};

pub use view::{build_view, escape_html, MessageView};

/// Where the listing template comes from
#[derive(Debug, Clone, Copy)]
pub enum TemplateRef<'a> {
    /// Template file on disk
    File(&'a Path),
    /// Built-in template
    Inline,
}

/// Render `data` through the template into UTF-8 HTML
pub async fn render_template(template: TemplateRef<'_>, data: &Records) -> Result<Vec<u8>> {
    let rows = build_view(data);

    let html = match template {
        TemplateRef::File(path) => {
            let source = fs::read_to_string(path)
                .await
                .map_err(|_| AppError::TemplateNotFound(path.to_path_buf()))?;
            template::expand(&source, &rows)
        }
        TemplateRef::Inline => template::expand(template::DEFAULT_TEMPLATE, &rows),
    };

    Ok(html.into_bytes())
}

/// Raw bytes of the JSON store file, not parsed or re-serialized
pub async fn render_json(store: &JsonStore) -> Result<Vec<u8>> {
    store.raw().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Record;
    use tempfile::TempDir;

    fn sample() -> Records {
        let mut record = Record::new();
        record.insert("username".to_string(), "alice".to_string());
        record.insert("message".to_string(), "<hi>".to_string());
        let mut records = Records::new();
        records.insert("2024-05-01 12:00:00.000001".to_string(), record);
        records
    }

    #[tokio::test]
    async fn test_inline_template() {
        let html = render_template(TemplateRef::Inline, &sample()).await.unwrap();
        let html = String::from_utf8(html).unwrap();
        assert!(html.contains("2024-05-01 12:00:00.000001"));
        assert!(html.contains("alice"));
        assert!(html.contains("&lt;hi&gt;"));

        let empty = render_template(TemplateRef::Inline, &Records::new())
            .await
            .unwrap();
        assert!(String::from_utf8(empty).unwrap().contains("No messages yet"));
    }

    #[tokio::test]
    async fn test_file_template() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("output.html");
        std::fs::write(&path, "<!-- each -->[$username]<!-- end -->").unwrap();

        let html = render_template(TemplateRef::File(&path), &sample())
            .await
            .unwrap();
        assert_eq!(html, b"[alice]");
    }

    #[tokio::test]
    async fn test_missing_template_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.html");
        assert!(matches!(
            render_template(TemplateRef::File(&path), &sample()).await,
            Err(AppError::TemplateNotFound(p)) if p == path
        ));
    }

    #[tokio::test]
    async fn test_render_json_is_verbatim() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        let content = b"{ \"k\" : {\"username\": \"bob\"} }";
        std::fs::write(&path, content).unwrap();
        let store = JsonStore::open(&path).await.unwrap();

        assert_eq!(render_json(&store).await.unwrap(), content);
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(
            render_json(&store).await,
            Err(AppError::StorageUnavailable { .. })
        ));
    }
}
