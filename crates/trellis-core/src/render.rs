//! Renderer contract.
//!
//! The dispatch engine never produces HTML itself. It hands a template id
//! and the finished [`PageContext`] to whatever implements [`Renderer`]
//! and returns the string it gets back. Errors surface unchanged - the
//! engine does not catch rendering failures.

use thiserror::Error;

use crate::page::PageContext;

/// Errors surfaced by renderer implementations.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The named template is not registered.
    #[error("template '{0}' not found")]
    TemplateNotFound(String),

    /// The template engine failed while rendering.
    #[error("template render failed: {0}")]
    Engine(String),
}

/// Template renderer collaborator.
///
/// Implementations obtain styles, scripts, and block HTML themselves and
/// merge them with the page's view data.
pub trait Renderer {
    /// Renders a template against a page context.
    fn render(&self, template: &str, page: &PageContext) -> Result<String, RenderError>;
}
