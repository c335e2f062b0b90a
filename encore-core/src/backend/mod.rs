//! Native media backends.

mod http;

pub use http::{HttpBackendOptions, HttpMediaElement, HttpMediaFactory};
