//! REST client for the bookkeeping backend

pub mod http;

pub use http::HttpBackend;
