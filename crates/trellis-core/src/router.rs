//! Route registration and matching.
//!
//! The router is deliberately dumb. It is responsible for route
//! registration and for normalizing a request into a [`MatchResult`]; it
//! never executes controllers, never renders, and never interprets the
//! capability or area metadata it stores. All decisions happen above it,
//! in middleware and in the application orchestrator.
//!
//! # Pattern syntax
//!
//! - Fixed segments: `/demo/settings`
//! - Slug placeholders: `/pages/:slug` - matches one segment of ASCII
//!   alphanumerics, `-`, `_`
//! - Greedy catch-all: `/*rest` - matches one or more trailing segments;
//!   must be the final segment of the pattern
//!
//! Patterns are parsed and validated at registration time; `map` rejects a
//! malformed pattern instead of deferring the failure to match time.
//!
//! # Ordering
//!
//! Registration order is semantically significant: the first registered
//! route whose method and pattern match wins. A catch-all registered
//! before a more specific pattern shadows it. Catch-all routes therefore
//! belong last, by convention - the router does not reorder anything.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::request::Method;

/// Named path parameters extracted from a matched route.
pub type PathParams = BTreeMap<String, String>;

/// Error raised when registering a route.
#[derive(Debug, Error)]
pub enum RouterError {
    /// The path pattern could not be parsed.
    #[error("invalid route pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

/// The target a route points at, plus optional metadata.
///
/// `capabilities` and `area` are stored verbatim; enforcement happens in
/// middleware, never here.
#[derive(Debug, Clone)]
pub struct RouteTarget {
    /// Registered controller identifier.
    pub controller: String,
    /// Action identifier on that controller.
    pub action: String,
    /// Capabilities the route requires to exist.
    pub capabilities: Vec<String>,
    /// Area tag, e.g. "frontend" or "admin".
    pub area: String,
    /// Optional route name for reverse lookup and logging.
    pub name: Option<String>,
}

impl RouteTarget {
    /// A target with default metadata (no capabilities, area "frontend").
    pub fn new(controller: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            controller: controller.into(),
            action: action.into(),
            capabilities: Vec::new(),
            area: "frontend".to_string(),
            name: None,
        }
    }

    /// Adds a required capability.
    pub fn capability(mut self, capability: impl Into<String>) -> Self {
        self.capabilities.push(capability.into());
        self
    }

    /// Sets the area tag.
    pub fn area(mut self, area: impl Into<String>) -> Self {
        self.area = area.into();
        self
    }

    /// Names the route.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// A registered route: method, pattern, target metadata.
///
/// Immutable once registered.
#[derive(Debug, Clone)]
pub struct RouteDescriptor {
    /// HTTP method this route answers.
    pub method: Method,
    /// The original pattern string, for diagnostics.
    pub pattern: String,
    /// Controller identifier.
    pub controller: String,
    /// Action identifier.
    pub action: String,
    /// Capabilities the route requires to exist.
    pub capabilities: Vec<String>,
    /// Area tag.
    pub area: String,
    /// Optional route name.
    pub name: Option<String>,
}

impl RouteDescriptor {
    /// Builds a descriptor from a target.
    ///
    /// Used by [`Router::map`] and by the application when synthesizing a
    /// descriptor for fallback dispatch. Performs no pattern validation;
    /// only the router compiles patterns.
    pub fn new(method: Method, pattern: impl Into<String>, target: RouteTarget) -> Self {
        Self {
            method,
            pattern: pattern.into(),
            controller: target.controller,
            action: target.action,
            capabilities: target.capabilities,
            area: target.area,
            name: target.name,
        }
    }
}

/// One compiled pattern segment.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
    CatchAll(String),
}

/// A descriptor paired with its compiled pattern.
#[derive(Debug, Clone)]
struct CompiledRoute {
    segments: Vec<Segment>,
    descriptor: RouteDescriptor,
}

/// A successful route match.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    /// The matched route descriptor.
    pub route: RouteDescriptor,
    /// Extracted named path parameters.
    pub params: PathParams,
}

/// Result of matching a request against the route table.
///
/// Matching is a total function: "no route" is a normal [`Fallback`]
/// outcome, never an error.
#[derive(Debug, Clone)]
pub enum MatchResult {
    /// A route matched.
    Route(RouteMatch),
    /// No route matched; the application decides what this status means.
    Fallback { status: u16 },
}

/// Ordered route table with first-match-wins semantics.
#[derive(Debug, Default)]
pub struct Router {
    routes: Vec<CompiledRoute>,
    base_path: String,
}

impl Router {
    /// Creates an empty router.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a base path stripped from request paths before matching.
    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }

    /// Registers a route.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidPattern`] when the pattern cannot be
    /// compiled (empty placeholder name, catch-all before the end, missing
    /// leading slash).
    pub fn map(
        &mut self,
        method: Method,
        pattern: &str,
        target: RouteTarget,
    ) -> Result<(), RouterError> {
        let segments = compile_pattern(pattern)?;
        self.routes.push(CompiledRoute {
            segments,
            descriptor: RouteDescriptor::new(method, pattern, target),
        });
        Ok(())
    }

    /// Registered routes, in registration order.
    pub fn routes(&self) -> impl Iterator<Item = &RouteDescriptor> {
        self.routes.iter().map(|r| &r.descriptor)
    }

    /// Matches a request against the table.
    ///
    /// Returns the first route (in registration order) whose method and
    /// pattern match, or `Fallback { status: 404 }`.
    pub fn match_request(&self, method: Method, path: &str) -> MatchResult {
        let path = self.strip_base(path);
        let segments: Vec<&str> = split_path(path);

        for route in &self.routes {
            if route.descriptor.method != method {
                continue;
            }
            if let Some(params) = match_segments(&route.segments, &segments) {
                return MatchResult::Route(RouteMatch {
                    route: route.descriptor.clone(),
                    params,
                });
            }
        }

        MatchResult::Fallback { status: 404 }
    }

    fn strip_base<'a>(&self, path: &'a str) -> &'a str {
        if self.base_path.is_empty() {
            return path;
        }
        match path.strip_prefix(&self.base_path) {
            Some(rest) if rest.is_empty() => "/",
            Some(rest) => rest,
            None => path,
        }
    }
}

fn split_path(path: &str) -> Vec<&str> {
    path.trim_start_matches('/')
        .split('/')
        .filter(|s| !s.is_empty())
        .collect()
}

fn compile_pattern(pattern: &str) -> Result<Vec<Segment>, RouterError> {
    let invalid = |reason: &str| RouterError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: reason.to_string(),
    };

    if !pattern.starts_with('/') {
        return Err(invalid("pattern must start with '/'"));
    }

    let raw: Vec<&str> = split_path(pattern);
    let mut segments = Vec::with_capacity(raw.len());

    for (index, part) in raw.iter().enumerate() {
        if let Some(name) = part.strip_prefix(':') {
            if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(invalid("placeholder name must be alphanumeric"));
            }
            segments.push(Segment::Param(name.to_string()));
        } else if let Some(name) = part.strip_prefix('*') {
            if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(invalid("catch-all name must be alphanumeric"));
            }
            if index != raw.len() - 1 {
                return Err(invalid("catch-all must be the final segment"));
            }
            segments.push(Segment::CatchAll(name.to_string()));
        } else {
            segments.push(Segment::Literal(part.to_string()));
        }
    }

    Ok(segments)
}

fn is_slug(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn match_segments(pattern: &[Segment], path: &[&str]) -> Option<PathParams> {
    let mut params = PathParams::new();

    for (index, segment) in pattern.iter().enumerate() {
        match segment {
            Segment::Literal(literal) => {
                if path.get(index) != Some(&literal.as_str()) {
                    return None;
                }
            }
            Segment::Param(name) => {
                let value = path.get(index)?;
                if !is_slug(value) {
                    return None;
                }
                params.insert(name.clone(), (*value).to_string());
            }
            Segment::CatchAll(name) => {
                // Greedy: consumes one or more remaining segments.
                if index >= path.len() {
                    return None;
                }
                params.insert(name.clone(), path[index..].join("/"));
                return Some(params);
            }
        }
    }

    if path.len() != pattern.len() {
        return None;
    }

    Some(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(controller: &str, action: &str) -> RouteTarget {
        RouteTarget::new(controller, action)
    }

    fn expect_route(result: MatchResult) -> RouteMatch {
        match result {
            MatchResult::Route(m) => m,
            MatchResult::Fallback { status } => panic!("expected route, got fallback {status}"),
        }
    }

    #[test]
    fn test_fixed_segment_match() {
        let mut router = Router::new();
        router
            .map(Method::Get, "/demo", target("demo", "index"))
            .unwrap();

        let matched = expect_route(router.match_request(Method::Get, "/demo"));
        assert_eq!(matched.route.controller, "demo");
        assert_eq!(matched.route.action, "index");
        assert!(matched.params.is_empty());
    }

    #[test]
    fn test_root_pattern_matches_root_only() {
        let mut router = Router::new();
        router.map(Method::Get, "/", target("home", "index")).unwrap();

        expect_route(router.match_request(Method::Get, "/"));
        assert!(matches!(
            router.match_request(Method::Get, "/other"),
            MatchResult::Fallback { status: 404 }
        ));
    }

    #[test]
    fn test_slug_param_extraction() {
        let mut router = Router::new();
        router
            .map(Method::Get, "/pages/:slug", target("pages", "show"))
            .unwrap();

        let matched = expect_route(router.match_request(Method::Get, "/pages/hello-world"));
        assert_eq!(matched.params.get("slug").map(String::as_str), Some("hello-world"));
    }

    #[test]
    fn test_slug_param_rejects_non_slug_characters() {
        let mut router = Router::new();
        router
            .map(Method::Get, "/pages/:slug", target("pages", "show"))
            .unwrap();

        assert!(matches!(
            router.match_request(Method::Get, "/pages/has.dot"),
            MatchResult::Fallback { .. }
        ));
    }

    #[test]
    fn test_catch_all_collects_remaining_segments() {
        let mut router = Router::new();
        router
            .map(Method::Get, "/*rest", target("resolve", "index"))
            .unwrap();

        let matched = expect_route(router.match_request(Method::Get, "/a/b/c"));
        assert_eq!(matched.params.get("rest").map(String::as_str), Some("a/b/c"));
    }

    #[test]
    fn test_catch_all_requires_at_least_one_segment() {
        let mut router = Router::new();
        router
            .map(Method::Get, "/*rest", target("resolve", "index"))
            .unwrap();

        assert!(matches!(
            router.match_request(Method::Get, "/"),
            MatchResult::Fallback { .. }
        ));
    }

    #[test]
    fn test_method_must_match() {
        let mut router = Router::new();
        router
            .map(Method::Post, "/shorten", target("shorten", "create"))
            .unwrap();

        assert!(matches!(
            router.match_request(Method::Get, "/shorten"),
            MatchResult::Fallback { .. }
        ));
        expect_route(router.match_request(Method::Post, "/shorten"));
    }

    #[test]
    fn test_first_match_wins_specific_before_catch_all() {
        let mut router = Router::new();
        router
            .map(Method::Get, "/demo", target("demo", "index"))
            .unwrap();
        router
            .map(Method::Get, "/*slug", target("resolve", "index"))
            .unwrap();

        let matched = expect_route(router.match_request(Method::Get, "/demo"));
        assert_eq!(matched.route.controller, "demo");
    }

    #[test]
    fn test_first_match_wins_catch_all_shadows_specific() {
        // Registration order is the contract: a catch-all registered first
        // shadows everything after it.
        let mut router = Router::new();
        router
            .map(Method::Get, "/*slug", target("resolve", "index"))
            .unwrap();
        router
            .map(Method::Get, "/demo", target("demo", "index"))
            .unwrap();

        let matched = expect_route(router.match_request(Method::Get, "/demo"));
        assert_eq!(matched.route.controller, "resolve");
    }

    #[test]
    fn test_match_is_total_never_errors() {
        let router = Router::new();
        assert!(matches!(
            router.match_request(Method::Get, "/anything/at/all"),
            MatchResult::Fallback { status: 404 }
        ));
    }

    #[test]
    fn test_invalid_patterns_fail_at_registration() {
        let mut router = Router::new();

        assert!(router
            .map(Method::Get, "no-slash", target("c", "a"))
            .is_err());
        assert!(router.map(Method::Get, "/x/:", target("c", "a")).is_err());
        assert!(router
            .map(Method::Get, "/x/*rest/y", target("c", "a"))
            .is_err());
        assert!(router.map(Method::Get, "/x/*", target("c", "a")).is_err());
    }

    #[test]
    fn test_base_path_is_stripped() {
        let mut router = Router::new().with_base_path("/app");
        router.map(Method::Get, "/demo", target("demo", "index")).unwrap();
        router.map(Method::Get, "/", target("home", "index")).unwrap();

        expect_route(router.match_request(Method::Get, "/app/demo"));
        let matched = expect_route(router.match_request(Method::Get, "/app"));
        assert_eq!(matched.route.controller, "home");
    }

    #[test]
    fn test_route_metadata_is_stored_verbatim() {
        let mut router = Router::new();
        router
            .map(
                Method::Get,
                "/admin/media",
                target("media", "index")
                    .capability("media.read")
                    .area("admin")
                    .named("media.index"),
            )
            .unwrap();

        let route = router.routes().next().unwrap();
        assert_eq!(route.capabilities, vec!["media.read".to_string()]);
        assert_eq!(route.area, "admin");
        assert_eq!(route.name.as_deref(), Some("media.index"));
    }
}
