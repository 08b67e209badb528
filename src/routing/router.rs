//! Route lookup.
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Explicit outcomes: allowed, wrong method, unknown resource
//! - Collection and item paths carry separate allow-lists

use std::collections::HashMap;

use axum::http::Method;

use crate::routing::route::{ProxyRoute, Resource, RouteKind};

/// Outcome of looking up a public request.
#[derive(Debug, PartialEq, Eq)]
pub enum RouteMatch<'a> {
    Allowed(&'a ProxyRoute),
    MethodNotAllowed(Resource),
    UnknownResource,
}

/// The allow-list of publicly exposed routes.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: HashMap<(Resource, RouteKind), Vec<ProxyRoute>>,
}

impl RouteTable {
    /// Build a table from explicit routes.
    pub fn new(routes: impl IntoIterator<Item = ProxyRoute>) -> Self {
        let mut table: HashMap<(Resource, RouteKind), Vec<ProxyRoute>> = HashMap::new();
        for route in routes {
            table.entry((route.resource, route.kind)).or_default().push(route);
        }
        Self { routes: table }
    }

    /// Create on the collection, update and delete on an item, passed
    /// straight through. Upvotes and tags are never updated.
    pub fn standard() -> Self {
        Self::new(Resource::ALL.into_iter().flat_map(|resource| {
            RouteKind::ALL.into_iter().flat_map(move |kind| {
                standard_methods(resource, kind)
                    .into_iter()
                    .map(move |method| ProxyRoute::passthrough(resource, kind, method))
            })
        }))
    }

    pub fn resolve(&self, resource: &str, kind: RouteKind, method: &Method) -> RouteMatch<'_> {
        let Ok(resource) = resource.parse::<Resource>() else {
            return RouteMatch::UnknownResource;
        };
        if !RouteKind::ALL.iter().any(|k| self.routes.contains_key(&(resource, *k))) {
            return RouteMatch::UnknownResource;
        }
        self.routes
            .get(&(resource, kind))
            .and_then(|routes| routes.iter().find(|r| &r.method == method))
            .map(RouteMatch::Allowed)
            .unwrap_or(RouteMatch::MethodNotAllowed(resource))
    }

    /// Methods exposed for a resource path, in insertion order.
    pub fn allowed_methods(&self, resource: Resource, kind: RouteKind) -> Vec<Method> {
        self.routes
            .get(&(resource, kind))
            .map(|routes| routes.iter().map(|r| r.method.clone()).collect())
            .unwrap_or_default()
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::standard()
    }
}

fn standard_methods(resource: Resource, kind: RouteKind) -> Vec<Method> {
    match (kind, resource) {
        (RouteKind::Collection, _) => vec![Method::PUT],
        (RouteKind::Item, Resource::Upvote | Resource::Tag) => vec![Method::DELETE],
        (RouteKind::Item, _) => vec![Method::POST, Method::DELETE],
    }
}
