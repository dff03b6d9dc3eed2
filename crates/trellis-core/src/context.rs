//! Shared per-request execution context.
//!
//! One [`RequestContext`] is built per matched request and threaded
//! through the middleware chain into the controller invocation. Middleware
//! may read anything and may *add* annotations; existing data is never
//! replaced - the append-only discipline the original left to convention
//! is enforced here by construction.

use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::DispatchError;
use crate::request::Request;
use crate::response::Response;
use crate::router::{PathParams, RouteDescriptor};

/// Mutable state shared across the middleware chain and the controller.
#[derive(Debug)]
pub struct RequestContext {
    request: Request,
    route: RouteDescriptor,
    params: PathParams,
    annotations: BTreeMap<String, Value>,
    deferred: Option<Response>,
}

impl RequestContext {
    /// Builds the context for one matched request.
    pub fn new(request: Request, route: RouteDescriptor, params: PathParams) -> Self {
        Self {
            request,
            route,
            params,
            annotations: BTreeMap::new(),
            deferred: None,
        }
    }

    /// The inbound request snapshot.
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// The matched route.
    pub fn route(&self) -> &RouteDescriptor {
        &self.route
    }

    /// Extracted path parameters.
    pub fn params(&self) -> &PathParams {
        &self.params
    }

    /// Adds an annotation under a new key.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::DuplicateAnnotation`] when the key exists;
    /// annotations are append-only.
    pub fn annotate(&mut self, key: &str, value: Value) -> Result<(), DispatchError> {
        if self.annotations.contains_key(key) {
            return Err(DispatchError::DuplicateAnnotation(key.to_string()));
        }
        self.annotations.insert(key.to_string(), value);
        Ok(())
    }

    /// Reads an annotation.
    pub fn annotation(&self, key: &str) -> Option<&Value> {
        self.annotations.get(key)
    }

    /// Queues a terminal response (redirects, guard rejections that need
    /// headers). The application flushes it when the pipeline result is
    /// [`crate::Outcome::AlreadySent`].
    ///
    /// A later call replaces an earlier one; at most one terminal response
    /// leaves the process.
    pub fn defer_response(&mut self, response: Response) {
        self.deferred = Some(response);
    }

    /// Takes the queued terminal response, if any.
    pub fn take_deferred(&mut self) -> Option<Response> {
        self.deferred.take()
    }
}
