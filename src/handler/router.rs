//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method dispatch, route matching,
//! error-to-response conversion and access logging.

use crate::config::AppState;
use crate::error::{AppError, Result};
use crate::handler::submit::{self, BoxError};
use crate::handler::static_files;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use crate::render::{self, TemplateRef};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderValue, SERVER};
use hyper::{Method, Request, Response, StatusCode};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Query that switches `/read` to raw JSON output
pub const JSON_QUERY: &str = "format=json";

/// Request context encapsulating information needed for GET/HEAD processing
pub struct RequestContext<'a> {
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub is_head: bool,
}

/// Main entry point for HTTP request handling
///
/// Never fails: every error becomes a 4xx/5xx response.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> std::result::Result<Response<Full<Bytes>>, Infallible>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    let started = Instant::now();
    let access_entry = state
        .access_log_enabled()
        .then(|| AccessLogEntry::from_request(&req, peer_addr));

    let mut response = match dispatch(req, &state).await {
        Ok(resp) => resp,
        Err(err) => {
            if err.is_server_error() {
                logger::log_error(&err.to_string());
            } else {
                logger::log_warning(&err.to_string());
            }
            http::build_error_response(&err)
        }
    };

    if let Ok(server_name) = HeaderValue::from_str(&state.config.http.server_name) {
        response.headers_mut().insert(SERVER, server_name);
    }

    if let Some(mut entry) = access_entry {
        let body_bytes = response
            .body()
            .size_hint()
            .exact()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0);
        entry.finish(response.status().as_u16(), body_bytes, started);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Dispatch by method: GET/HEAD read, POST submits, anything else is 405
async fn dispatch<B>(req: Request<B>, state: &AppState) -> Result<Response<Full<Bytes>>>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    match *req.method() {
        Method::GET | Method::HEAD => {
            let ctx = RequestContext {
                path: req.uri().path(),
                query: req.uri().query(),
                is_head: req.method() == Method::HEAD,
            };
            route_get(&ctx, state).await
        }
        Method::POST => submit::handle_submission(req, state).await,
        _ => {
            logger::log_warning(&format!("Method not allowed: {}", req.method()));
            Ok(http::build_405_response())
        }
    }
}

/// Route a GET/HEAD request by exact path, in priority order
async fn route_get(ctx: &RequestContext<'_>, state: &AppState) -> Result<Response<Full<Bytes>>> {
    let site = &state.config.site;

    match ctx.path {
        "/" => static_files::serve_page(ctx, site, &site.index_page).await,
        "/message" => static_files::serve_page(ctx, site, &site.message_page).await,
        "/read" if ctx.query == Some(JSON_QUERY) => {
            let json = render::render_json(&state.store).await?;
            Ok(http::build_json_response(json, ctx.is_head))
        }
        "/read" => {
            let records = state.store.load().await?;
            let template_path = site.read_template.as_ref().map(|t| site.root.join(t));
            let template = template_path
                .as_deref()
                .map_or(TemplateRef::Inline, TemplateRef::File);
            let html = render::render_template(template, &records).await?;
            Ok(http::build_html_response(StatusCode::OK, html, ctx.is_head))
        }
        _ => match static_files::serve_static(ctx, site).await {
            Err(AppError::StaticFileNotFound(_)) => {
                Ok(static_files::serve_not_found(ctx, site).await)
            }
            other => other,
        },
    }
}
