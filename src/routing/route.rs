//! Proxied resources and the routes that expose them.

use std::fmt;
use std::str::FromStr;

use axum::http::Method;

/// A backend resource reachable through the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Resource {
    Account,
    Photo,
    Edit,
    Reply,
    Upvote,
    Preview,
    Tag,
    Editor,
    Camera,
    Lens,
    Manufacturer,
}

impl Resource {
    pub const ALL: [Resource; 11] = [
        Resource::Account,
        Resource::Photo,
        Resource::Edit,
        Resource::Reply,
        Resource::Upvote,
        Resource::Preview,
        Resource::Tag,
        Resource::Editor,
        Resource::Camera,
        Resource::Lens,
        Resource::Manufacturer,
    ];

    /// Path segment, identical on the public and the backend side.
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Account => "account",
            Resource::Photo => "photo",
            Resource::Edit => "edit",
            Resource::Reply => "reply",
            Resource::Upvote => "upvote",
            Resource::Preview => "preview",
            Resource::Tag => "tag",
            Resource::Editor => "editor",
            Resource::Camera => "camera",
            Resource::Lens => "lens",
            Resource::Manufacturer => "manufacturer",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownResource(pub String);

impl FromStr for Resource {
    type Err = UnknownResource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Resource::ALL
            .iter()
            .copied()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| UnknownResource(s.to_string()))
    }
}

/// Whether a request addresses the resource itself (`/photo`) or one record
/// of it (`/photo/42`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteKind {
    Collection,
    Item,
}

impl RouteKind {
    pub const ALL: [RouteKind; 2] = [RouteKind::Collection, RouteKind::Item];

    /// Kind of a request given the sub-path after the resource segment.
    pub fn for_rest(rest: Option<&str>) -> Self {
        match rest.map(|r| r.trim_matches('/')) {
            Some(r) if !r.is_empty() => RouteKind::Item,
            _ => RouteKind::Collection,
        }
    }
}

impl fmt::Display for RouteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteKind::Collection => f.write_str("collection"),
            RouteKind::Item => f.write_str("item"),
        }
    }
}

/// Maps one public `(resource, kind, method)` triple onto a backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyRoute {
    pub resource: Resource,
    pub kind: RouteKind,
    pub method: Method,
    pub backend_path: String,
    pub backend_method: Method,
}

impl ProxyRoute {
    /// Same path, same method on the backend.
    pub fn passthrough(resource: Resource, kind: RouteKind, method: Method) -> Self {
        Self {
            resource,
            kind,
            backend_path: format!("/{}", resource.as_str()),
            backend_method: method.clone(),
            method,
        }
    }

    /// Full backend URL for this route.
    ///
    /// `rest` is the sub-path after the resource (`/photo/42` → `42`), carried
    /// over verbatim; `query` is the raw query string.
    pub fn backend_url(&self, base: &str, rest: Option<&str>, query: Option<&str>) -> String {
        let mut url = format!("{}{}", base.trim_end_matches('/'), self.backend_path);
        if let Some(rest) = rest.map(|r| r.trim_matches('/')).filter(|r| !r.is_empty()) {
            url.push('/');
            url.push_str(rest);
        }
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            url.push('?');
            url.push_str(query);
        }
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_roundtrip_names() {
        for resource in Resource::ALL {
            assert_eq!(resource.as_str().parse::<Resource>(), Ok(resource));
        }
        assert_eq!(
            "graphql".parse::<Resource>(),
            Err(UnknownResource("graphql".into()))
        );
    }

    #[test]
    fn test_backend_url() {
        let route = ProxyRoute::passthrough(Resource::Photo, RouteKind::Item, Method::DELETE);
        assert_eq!(route.backend_url("http://api:5000", None, None), "http://api:5000/photo");
        assert_eq!(
            route.backend_url("http://api:5000/", Some("42"), Some("force=1")),
            "http://api:5000/photo/42?force=1"
        );
        assert_eq!(route.backend_url("http://api:5000", Some("/"), Some("")), "http://api:5000/photo");
    }

    #[test]
    fn test_kind_from_rest() {
        assert_eq!(RouteKind::for_rest(None), RouteKind::Collection);
        assert_eq!(RouteKind::for_rest(Some("/")), RouteKind::Collection);
        assert_eq!(RouteKind::for_rest(Some("42")), RouteKind::Item);
        assert_eq!(RouteKind::for_rest(Some("7/replies")), RouteKind::Item);
    }
}
