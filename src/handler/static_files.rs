//! Static file serving module
//!
//! Handles static file lookup under the site root, MIME type detection, and
//! the fixed pages (index, message, error).

use crate::config::SiteConfig;
use crate::error::{AppError, Result};
use crate::handler::router::RequestContext;
use crate::http::{self, mime};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Serve a fixed HTML page relative to the site root
pub async fn serve_page(
    ctx: &RequestContext<'_>,
    site: &SiteConfig,
    page: &str,
) -> Result<Response<Full<Bytes>>> {
    let path = site.root.join(page);
    let content = fs::read(&path)
        .await
        .map_err(|_| AppError::PageUnavailable(path))?;

    Ok(http::build_html_response(StatusCode::OK, content, ctx.is_head))
}

/// Serve the error page with 404, or a plain-text 404 if it is missing too
pub async fn serve_not_found(ctx: &RequestContext<'_>, site: &SiteConfig) -> Response<Full<Bytes>> {
    let path = site.root.join(&site.error_page);
    match fs::read(&path).await {
        Ok(content) => http::build_html_response(StatusCode::NOT_FOUND, content, ctx.is_head),
        Err(e) => {
            logger::log_warning(&format!(
                "Error page '{}' unavailable: {e}",
                path.display()
            ));
            http::build_404_response()
        }
    }
}

/// Serve any existing file under the site root
pub async fn serve_static(
    ctx: &RequestContext<'_>,
    site: &SiteConfig,
) -> Result<Response<Full<Bytes>>> {
    let (content, content_type) =
        load_static(&site.root, ctx.path, site.permissive_static).await?;

    Ok(http::build_body_response(
        StatusCode::OK,
        content_type,
        content,
        ctx.is_head,
    ))
}

/// Load a static file for the request path
///
/// Without `permissive`, the canonical file path must stay inside the
/// canonical site root. Directories are never served.
pub async fn load_static(
    root: &Path,
    request_path: &str,
    permissive: bool,
) -> Result<(Vec<u8>, &'static str)> {
    let not_found = || AppError::StaticFileNotFound(request_path.to_string());

    let relative = request_path.trim_start_matches('/');
    if relative.is_empty() {
        return Err(not_found());
    }

    let file_path = root.join(relative);

    // File not found is common (404), no need to log at warning level
    let Ok(file_canonical) = fs::canonicalize(&file_path).await else {
        return Err(not_found());
    };

    if !permissive && !is_contained(root, &file_canonical).await {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {request_path} -> {}",
            file_canonical.display()
        ));
        return Err(not_found());
    }

    match fs::metadata(&file_canonical).await {
        Ok(meta) if meta.is_file() => {}
        _ => return Err(not_found()),
    }

    let content = match fs::read(&file_canonical).await {
        Ok(c) => c,
        Err(e) => {
            logger::log_error(&format!(
                "Failed to read file '{}': {e}",
                file_path.display()
            ));
            return Err(not_found());
        }
    };

    let content_type = mime::get_content_type(file_path.extension().and_then(|e| e.to_str()));

    Ok((content, content_type))
}

async fn is_contained(root: &Path, file_canonical: &Path) -> bool {
    let root_canonical: PathBuf = match fs::canonicalize(root).await {
        Ok(p) => p,
        Err(e) => {
            logger::log_warning(&format!(
                "Site root not found or inaccessible '{}': {e}",
                root.display()
            ));
            return false;
        }
    };
    file_canonical.starts_with(root_canonical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn site_with_public_dir() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let public = dir.path().join("public");
        std::fs::create_dir_all(public.join("css")).unwrap();
        std::fs::write(public.join("css").join("style.css"), "body {}").unwrap();
        std::fs::write(public.join("notes.unknownext"), "plain").unwrap();
        std::fs::write(dir.path().join("secret.txt"), "outside").unwrap();
        (dir, public)
    }

    #[tokio::test]
    async fn test_load_existing_file_with_content_type() {
        let (_dir, public) = site_with_public_dir();
        let (content, content_type) = load_static(&public, "/css/style.css", false)
            .await
            .unwrap();
        assert_eq!(content, b"body {}");
        assert_eq!(content_type, "text/css");
    }

    #[tokio::test]
    async fn test_unknown_extension_is_plain_text() {
        let (_dir, public) = site_with_public_dir();
        let (_, content_type) = load_static(&public, "/notes.unknownext", false)
            .await
            .unwrap();
        assert_eq!(content_type, "text/plain");
    }

    #[tokio::test]
    async fn test_missing_file_and_directory_are_not_found() {
        let (_dir, public) = site_with_public_dir();
        assert!(matches!(
            load_static(&public, "/nope.css", false).await,
            Err(AppError::StaticFileNotFound(_))
        ));
        assert!(matches!(
            load_static(&public, "/css", false).await,
            Err(AppError::StaticFileNotFound(_))
        ));
        assert!(matches!(
            load_static(&public, "/", false).await,
            Err(AppError::StaticFileNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_traversal_blocked_unless_permissive() {
        let (_dir, public) = site_with_public_dir();
        assert!(matches!(
            load_static(&public, "/../secret.txt", false).await,
            Err(AppError::StaticFileNotFound(_))
        ));

        let (content, _) = load_static(&public, "/../secret.txt", true)
            .await
            .unwrap();
        assert_eq!(content, b"outside");
    }
}
