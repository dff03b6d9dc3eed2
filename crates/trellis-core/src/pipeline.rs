//! Middleware pipeline.
//!
//! Guards execute in a stacked pipeline: the first middleware added is the
//! outermost wrapper and runs first. Each middleware receives the shared
//! [`RequestContext`] and a [`Next`] continuation; it either calls
//! `next.run(cx)` to delegate inwards or returns its own terminal value,
//! short-circuiting everything after it.
//!
//! Middleware may inspect and annotate the context and make
//! allow/deny/transform decisions. It must not render and must not touch
//! the page context - that is the controller's and renderer's territory.

use crate::context::RequestContext;
use crate::error::DispatchError;
use crate::response::Outcome;

/// A pipeline stage.
pub trait Middleware {
    /// Handles the request, delegating inwards via `next` or returning a
    /// terminal [`Outcome`] of its own.
    fn handle(&self, cx: &mut RequestContext, next: Next<'_>) -> Result<Outcome, DispatchError>;
}

/// The innermost call of the pipeline, usually the controller invocation.
pub type Terminal<'a> = &'a mut dyn FnMut(&mut RequestContext) -> Result<Outcome, DispatchError>;

/// Continuation handed to each middleware.
///
/// Consumed by value: a middleware calls `next.run(cx)` at most once. Not
/// calling it short-circuits the rest of the chain.
pub struct Next<'a> {
    stack: &'a [Box<dyn Middleware>],
    terminal: Terminal<'a>,
}

impl<'a> Next<'a> {
    /// Invokes the remainder of the chain.
    pub fn run(self, cx: &mut RequestContext) -> Result<Outcome, DispatchError> {
        match self.stack.split_first() {
            Some((middleware, rest)) => middleware.handle(
                cx,
                Next {
                    stack: rest,
                    terminal: self.terminal,
                },
            ),
            None => (self.terminal)(cx),
        }
    }
}

/// Ordered middleware stack.
#[derive(Default)]
pub struct Pipeline {
    stack: Vec<Box<dyn Middleware>>,
}

impl Pipeline {
    /// Creates an empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a middleware. Execution order equals registration order.
    pub fn add(&mut self, middleware: impl Middleware + 'static) {
        self.stack.push(Box::new(middleware));
    }

    /// Number of registered middleware.
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    /// Whether the pipeline is empty.
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Runs the chain with `terminal` as the innermost call.
    pub fn handle(
        &self,
        cx: &mut RequestContext,
        terminal: Terminal<'_>,
    ) -> Result<Outcome, DispatchError> {
        Next {
            stack: &self.stack,
            terminal,
        }
        .run(cx)
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("middleware_count", &self.stack.len())
            .finish()
    }
}
