//! Form submission module
//!
//! Reads a URL-encoded body, stores it under the current timestamp and
//! redirects back to the home page.

use crate::config::AppState;
use crate::error::{AppError, Result};
use crate::form;
use crate::http;
use crate::store::{self, Records};
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::{Request, Response};

/// Error type of a request body once wrapped in `Limited`
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Handle a POST: parse, persist, redirect to `/`
///
/// The store is left untouched when any step before the save fails.
pub async fn handle_submission<B>(req: Request<B>, state: &AppState) -> Result<Response<Full<Bytes>>>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    let length = content_length(&req, state.config.http.max_body_size)?;

    // never buffer more than the announced length
    let body = Limited::new(req.into_body(), length)
        .collect()
        .await
        .map_err(|e| {
            if e.is::<LengthLimitError>() {
                AppError::BodyRead(format!("body longer than Content-Length {length}"))
            } else {
                AppError::BodyRead(e.to_string())
            }
        })?
        .to_bytes();

    if body.len() != length {
        return Err(AppError::BodyRead(format!(
            "body has {} bytes, Content-Length announced {length}",
            body.len()
        )));
    }

    let record = form::parse_form(&body)?;

    let mut entries = Records::new();
    entries.insert(store::timestamp_key(), record);
    state.store.save(entries).await?;

    Ok(http::build_redirect_response("/"))
}

/// Validate the `Content-Length` header and return it as a byte count
fn content_length<B>(req: &Request<B>, max_body_size: u64) -> Result<usize> {
    let header = req
        .headers()
        .get("content-length")
        .ok_or(AppError::MissingContentLength)?;

    let value = header
        .to_str()
        .map_err(|_| AppError::InvalidContentLength("<non-ASCII>".to_string()))?;

    let size: u64 = value
        .trim()
        .parse()
        .map_err(|_| AppError::InvalidContentLength(value.to_string()))?;

    if size > max_body_size {
        return Err(AppError::PayloadTooLarge {
            size,
            limit: max_body_size,
        });
    }

    usize::try_from(size).map_err(|_| AppError::PayloadTooLarge {
        size,
        limit: max_body_size,
    })
}
