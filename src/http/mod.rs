//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing)
//!     → {prefix}/{resource}  → proxy.rs (allow-list, forward, relay)
//!     → {prefix}/session, /magic, /l → session.rs
//!     → /, /a, /p, /e, /c → pages.rs (internal GraphQL lookups)
//!     → response.rs (empty statuses, relays, cookies)
//! ```

pub mod pages;
pub mod proxy;
pub mod request;
pub mod response;
pub mod server;
pub mod session;

pub use proxy::ForwardError;
pub use request::X_REQUEST_ID;
pub use server::{AppState, HttpServer, SharedState};
