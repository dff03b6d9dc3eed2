//! Guard middleware.
//!
//! The concrete guards of the framework. Each works purely on the
//! transport-level request context: guard rejections (405, 413, 429) are
//! ordinary terminal outcomes, while a missing required capability is a
//! fatal dispatch error - a configuration bug, not a user condition.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::capability::{CapabilityError, CapabilityRegistry};
use crate::context::RequestContext;
use crate::error::DispatchError;
use crate::pipeline::{Middleware, Next};
use crate::ratelimit::RateLimitPolicy;
use crate::request::Method;
use crate::response::{Outcome, Response};

/// Restricts the allowed HTTP methods.
///
/// Disallowed verbs are rejected with 405 and an `Allow` header listing
/// the whitelist.
#[derive(Debug)]
pub struct MethodWhitelist {
    allowed: Vec<Method>,
}

impl MethodWhitelist {
    /// Creates a whitelist guard.
    pub fn new(allowed: Vec<Method>) -> Self {
        Self { allowed }
    }
}

impl Middleware for MethodWhitelist {
    fn handle(&self, cx: &mut RequestContext, next: Next<'_>) -> Result<Outcome, DispatchError> {
        let method = cx.request().method();
        if !self.allowed.contains(&method) {
            let allow = self
                .allowed
                .iter()
                .map(Method::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            cx.defer_response(
                Response::html("405 Method Not Allowed", 405).with_header("Allow", allow),
            );
            return Ok(Outcome::AlreadySent);
        }

        next.run(cx)
    }
}

/// Rejects requests whose *declared* payload exceeds a byte limit.
///
/// The decision uses `Content-Length` only; the body is never read.
#[derive(Debug)]
pub struct PayloadLimit {
    max_bytes: u64,
}

impl PayloadLimit {
    /// Creates a payload guard with a maximum declared size in bytes.
    pub fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }
}

impl Middleware for PayloadLimit {
    fn handle(&self, cx: &mut RequestContext, next: Next<'_>) -> Result<Outcome, DispatchError> {
        if cx.request().content_length() > self.max_bytes {
            return Ok(Outcome::html("413 Payload Too Large").with_status(413));
        }

        next.run(cx)
    }
}

/// Verifies that every capability the matched route requires is registered.
///
/// This checks *existence*, not permission: a route demanding a capability
/// no component provides is a wiring bug and fails fast, before the
/// controller runs.
pub struct CapabilityGuard {
    registry: Rc<CapabilityRegistry>,
}

impl CapabilityGuard {
    /// Creates the guard over a shared capability registry.
    pub fn new(registry: Rc<CapabilityRegistry>) -> Self {
        Self { registry }
    }
}

impl Middleware for CapabilityGuard {
    fn handle(&self, cx: &mut RequestContext, next: Next<'_>) -> Result<Outcome, DispatchError> {
        for capability in &cx.route().capabilities {
            if !self.registry.has(capability) {
                return Err(CapabilityError::Unregistered(capability.clone()).into());
            }
        }

        next.run(cx)
    }
}

/// Protects against request flooding with a sliding-window counter keyed
/// by client address.
pub struct RateLimitGuard {
    policy: RefCell<RateLimitPolicy>,
}

impl RateLimitGuard {
    /// Creates a guard allowing `limit` requests per `window` per client.
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            policy: RefCell::new(RateLimitPolicy::new(limit, window)),
        }
    }
}

impl Middleware for RateLimitGuard {
    fn handle(&self, cx: &mut RequestContext, next: Next<'_>) -> Result<Outcome, DispatchError> {
        let key = cx.request().remote_addr().to_string();
        if !self.policy.borrow_mut().allow(&key, Instant::now()) {
            return Ok(Outcome::html("429 Too Many Requests").with_status(429));
        }

        next.run(cx)
    }
}

/// Detects short-term request bursts.
///
/// Same counting logic as [`RateLimitGuard`], meant to be configured with
/// a much tighter window (e.g. 10 requests in 2 seconds).
pub struct BurstGuard {
    policy: RefCell<RateLimitPolicy>,
}

impl BurstGuard {
    /// Creates a burst guard allowing `limit` requests per `window`.
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            policy: RefCell::new(RateLimitPolicy::new(limit, window)),
        }
    }
}

impl Middleware for BurstGuard {
    fn handle(&self, cx: &mut RequestContext, next: Next<'_>) -> Result<Outcome, DispatchError> {
        let key = cx.request().remote_addr().to_string();
        if !self.policy.borrow_mut().allow(&key, Instant::now()) {
            return Ok(Outcome::html("429 Too Many Requests").with_status(429));
        }

        next.run(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Pipeline;
    use crate::request::Request;
    use crate::router::{PathParams, RouteDescriptor, RouteTarget};

    fn context_for(request: Request, target: RouteTarget) -> RequestContext {
        let route = RouteDescriptor::new(request.method(), request.path(), target);
        RequestContext::new(request, route, PathParams::new())
    }

    fn run(pipeline: &Pipeline, cx: &mut RequestContext) -> Result<Outcome, DispatchError> {
        pipeline.handle(cx, &mut |_| Ok(Outcome::html("handler")))
    }

    #[test]
    fn test_method_whitelist_allows_listed_methods() {
        let mut pipeline = Pipeline::new();
        pipeline.add(MethodWhitelist::new(vec![Method::Get, Method::Post]));

        let request = Request::builder(Method::Get, "/demo").build();
        let mut cx = context_for(request, RouteTarget::new("demo", "index"));
        assert_eq!(run(&pipeline, &mut cx).unwrap(), Outcome::html("handler"));
    }

    #[test]
    fn test_method_whitelist_rejects_with_405_and_allow_header() {
        let mut pipeline = Pipeline::new();
        pipeline.add(MethodWhitelist::new(vec![Method::Get, Method::Post]));

        let request = Request::builder(Method::Delete, "/demo").build();
        let mut cx = context_for(request, RouteTarget::new("demo", "index"));

        assert_eq!(run(&pipeline, &mut cx).unwrap(), Outcome::AlreadySent);
        let response = cx.take_deferred().unwrap();
        assert_eq!(response.status, 405);
        assert!(response
            .headers
            .contains(&("Allow".to_string(), "GET, POST".to_string())));
    }

    #[test]
    fn test_payload_limit_uses_declared_length_only() {
        let mut pipeline = Pipeline::new();
        pipeline.add(PayloadLimit::new(1_000));

        let small = Request::builder(Method::Post, "/upload")
            .content_length(1_000)
            .build();
        let mut cx = context_for(small, RouteTarget::new("upload", "create"));
        assert_eq!(run(&pipeline, &mut cx).unwrap(), Outcome::html("handler"));

        let oversized = Request::builder(Method::Post, "/upload")
            .content_length(1_001)
            .build();
        let mut cx = context_for(oversized, RouteTarget::new("upload", "create"));
        assert!(matches!(
            run(&pipeline, &mut cx).unwrap(),
            Outcome::Html { status: 413, .. }
        ));
    }

    #[test]
    fn test_capability_guard_passes_registered_capabilities() {
        let registry = Rc::new(CapabilityRegistry::new());
        registry.register("media.read", "MediaComponent").unwrap();

        let mut pipeline = Pipeline::new();
        pipeline.add(CapabilityGuard::new(registry));

        let request = Request::builder(Method::Get, "/media").build();
        let target = RouteTarget::new("media", "index").capability("media.read");
        let mut cx = context_for(request, target);
        assert_eq!(run(&pipeline, &mut cx).unwrap(), Outcome::html("handler"));
    }

    #[test]
    fn test_capability_guard_fails_fast_on_unregistered_capability() {
        let registry = Rc::new(CapabilityRegistry::new());
        let mut pipeline = Pipeline::new();
        pipeline.add(CapabilityGuard::new(registry));

        let request = Request::builder(Method::Get, "/admin").build();
        let target = RouteTarget::new("admin", "index").capability("admin.access");
        let mut cx = context_for(request, target);

        let err = run(&pipeline, &mut cx).unwrap_err();
        assert!(matches!(
            err,
            DispatchError::Capability(CapabilityError::Unregistered(name)) if name == "admin.access"
        ));
    }

    #[test]
    fn test_capability_guard_ignores_routes_without_requirements() {
        let registry = Rc::new(CapabilityRegistry::new());
        let mut pipeline = Pipeline::new();
        pipeline.add(CapabilityGuard::new(registry));

        let request = Request::builder(Method::Get, "/open").build();
        let mut cx = context_for(request, RouteTarget::new("open", "index"));
        assert_eq!(run(&pipeline, &mut cx).unwrap(), Outcome::html("handler"));
    }

    #[test]
    fn test_rate_limit_guard_rejects_when_window_is_full() {
        let mut pipeline = Pipeline::new();
        pipeline.add(RateLimitGuard::new(2, Duration::from_secs(60)));

        let request = Request::builder(Method::Get, "/demo")
            .remote_addr("203.0.113.9")
            .build();

        for _ in 0..2 {
            let mut cx = context_for(request.clone(), RouteTarget::new("demo", "index"));
            assert_eq!(run(&pipeline, &mut cx).unwrap(), Outcome::html("handler"));
        }

        let mut cx = context_for(request, RouteTarget::new("demo", "index"));
        assert!(matches!(
            run(&pipeline, &mut cx).unwrap(),
            Outcome::Html { status: 429, .. }
        ));
    }

    #[test]
    fn test_burst_guard_counts_per_client() {
        let mut pipeline = Pipeline::new();
        pipeline.add(BurstGuard::new(1, Duration::from_secs(2)));

        let first = Request::builder(Method::Get, "/demo")
            .remote_addr("203.0.113.9")
            .build();
        let mut cx = context_for(first, RouteTarget::new("demo", "index"));
        assert_eq!(run(&pipeline, &mut cx).unwrap(), Outcome::html("handler"));

        // A different client is unaffected by the first one's burst.
        let other = Request::builder(Method::Get, "/demo")
            .remote_addr("198.51.100.7")
            .build();
        let mut cx = context_for(other, RouteTarget::new("demo", "index"));
        assert_eq!(run(&pipeline, &mut cx).unwrap(), Outcome::html("handler"));
    }
}
