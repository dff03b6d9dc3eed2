//! Dispatch error taxonomy.
//!
//! Two families of failure exist and must not be confused:
//!
//! - **Fatal programmer errors** - a route pointing at an unregistered
//!   controller or unknown action, a missing required capability, an
//!   unregistered service. These are configuration bugs and propagate up
//!   to the front controller as errors; they are never downgraded to a
//!   user-facing 404.
//! - **Expected user-facing conditions** - no matching route (the
//!   [`crate::MatchResult::Fallback`] path), 405/413/429 guard rejections.
//!   These are ordinary control flow producing well-formed responses and
//!   never appear in this enum.

use thiserror::Error;

use crate::capability::CapabilityError;
use crate::hooks::HookError;
use crate::render::RenderError;
use crate::router::RouterError;

/// Errors raised during the request lifecycle.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A hook callback failed; propagated uncaught, no isolation.
    #[error(transparent)]
    Hook(#[from] HookError),

    /// Capability registration or enforcement failure.
    #[error(transparent)]
    Capability(#[from] CapabilityError),

    /// Route registration failure.
    #[error(transparent)]
    Router(#[from] RouterError),

    /// Template rendering failure, surfaced from the renderer collaborator.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// A route references a controller id nothing registered.
    #[error("controller '{0}' is not registered")]
    ControllerNotFound(String),

    /// A second factory was registered under an existing controller id.
    #[error("controller '{0}' already registered")]
    DuplicateController(String),

    /// A controller does not implement the action a route names.
    #[error("controller '{controller}' has no action '{action}'")]
    UnknownAction { controller: String, action: String },

    /// Service lookup by id found nothing.
    #[error("service '{0}' not registered")]
    ServiceNotFound(String),

    /// Service lookup found an instance of the wrong type.
    #[error("service '{id}' is not a {expected}")]
    ServiceType { id: String, expected: &'static str },

    /// A middleware tried to overwrite an existing context annotation.
    #[error("context annotation '{0}' already set")]
    DuplicateAnnotation(String),

    /// Response body serialization failed.
    #[error("response serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    /// The response sink failed while writing.
    #[error("response write failed: {0}")]
    Io(#[from] std::io::Error),
}
