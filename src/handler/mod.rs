//! Request handler module
//!
//! Responsible for request routing dispatch: fixed pages, the message
//! listing, static files and form submissions.

pub mod router;
pub mod static_files;
pub mod submit;

// Re-export main entry point
pub use router::handle_request;
