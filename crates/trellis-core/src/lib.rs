//! # Trellis Core - Request Lifecycle Dispatch Engine
//!
//! `trellis-core` provides the engine underneath the Trellis web framework:
//! routing, the middleware pipeline, the hook system, and the capability
//! registry. It knows nothing about configuration files, template engines,
//! or process boundaries - those live in the `trellis` crate.
//!
//! # Design Principles
//!
//! - **No magic**: routes, capabilities, and hooks are registered
//!   explicitly. Nothing is discovered, scanned, or auto-wired.
//! - **Total routing**: the router never fails on an unmatched request; it
//!   returns a typed [`MatchResult::Fallback`] and the application decides
//!   what a 404 looks like.
//! - **Explicit continuation passing**: middleware receives a [`Next`]
//!   value and either calls it or short-circuits. The onion is built from
//!   named types, not nested closures.
//! - **Single-threaded requests**: one request is one synchronous pass
//!   from match to response. Shared registries use `Rc` and interior
//!   mutability; registration happens once, serially, before serving.
//!
//! # Pipeline Position
//!
//! ```text
//! Request snapshot
//!   → Router::match_request
//!   → Pipeline (guards: method / payload / capability / rate / burst)
//!   → controller invocation (terminal handler)
//!   → Outcome (Html | Json | AlreadySent)
//! ```

mod capability;
mod context;
mod error;
mod guard;
mod hooks;
mod page;
mod pipeline;
mod ratelimit;
mod render;
mod request;
mod response;
mod router;

pub use capability::{
    CapabilityError, CapabilityRegistry, PermissionOverrides, PermissionPolicy,
};
pub use context::RequestContext;
pub use error::DispatchError;
pub use guard::{BurstGuard, CapabilityGuard, MethodWhitelist, PayloadLimit, RateLimitGuard};
pub use hooks::{ActionFn, FilterFn, HookError, HookRegistry, DEFAULT_PRIORITY};
pub use page::{BlockSpec, PageContext};
pub use pipeline::{Middleware, Next, Pipeline, Terminal};
pub use ratelimit::RateLimitPolicy;
pub use render::{RenderError, Renderer};
pub use request::{InvalidMethod, Method, Request, RequestBuilder};
pub use response::{HttpSink, Outcome, Response, ResponseSink};
pub use router::{MatchResult, PathParams, RouteDescriptor, RouteMatch, RouteTarget, Router, RouterError};
