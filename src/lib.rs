//! Focal web gateway library.
//!
//! Public entry point for the photo site: proxies browser writes to the
//! internal backend, handles magic-link sessions, serves page data, and
//! provides the client-side photo submission form.

pub mod api;
pub mod config;
pub mod forms;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod routing;

pub use config::schema::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
