//! Guestbook server
//!
//! Serves a few HTML pages, accepts form submissions, keeps them in a JSON
//! file keyed by submission time and renders them back as HTML or JSON.

pub mod config;
pub mod error;
pub mod form;
pub mod handler;
pub mod http;
pub mod logger;
pub mod render;
pub mod server;
pub mod store;
