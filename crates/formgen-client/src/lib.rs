//! HTTP access to the form generation service.

mod http;

pub use http::HttpFormService;
