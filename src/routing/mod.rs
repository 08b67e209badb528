//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request (resource segment, collection or item, method)
//!     → router.rs (allow-list lookup)
//!     → route.rs (backend path + method)
//!     → Return: Allowed(route) | MethodNotAllowed | UnknownResource
//! ```
//!
//! # Design Decisions
//! - Only allow-listed routes are exposed; everything else is 404/405
//! - A table never changes once built; a config reload builds a new one

pub mod route;
pub mod router;

pub use route::{ProxyRoute, Resource, RouteKind};
pub use router::{RouteMatch, RouteTable};
