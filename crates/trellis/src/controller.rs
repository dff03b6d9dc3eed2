//! Controller contract and per-request helper context.
//!
//! Every request handler implements [`Controller`]. An action builds page
//! state and returns an [`Outcome`]; transport framing (HTML vs JSON) is
//! decided centrally by the application from the variant, never by the
//! controller writing output. The only terminal operation a controller
//! may perform itself is a redirect, and even that goes through the
//! deferred-response slot rather than any global output state.

use std::rc::Rc;

use serde_json::{json, Value};

use trellis_core::{
    DispatchError, Outcome, PageContext, PathParams, Request, RequestContext, Response,
};

use crate::app::App;
use crate::config::AppConfig;

/// Factory producing a fresh controller instance per request.
pub type ControllerFactory = Rc<dyn Fn() -> Box<dyn Controller>>;

/// Contract every request handler satisfies.
///
/// `action` is the action id the matched route names. Implementations
/// dispatch on it and return [`DispatchError::UnknownAction`] for ids they
/// do not implement - a programmer error the application treats as fatal,
/// never as a user-facing 404.
pub trait Controller {
    /// Invokes the named action.
    fn handle(&mut self, action: &str, cx: &mut RequestCx<'_>) -> Result<Outcome, DispatchError>;
}

/// Everything an action needs: the application, the request, path params,
/// and the page context being built.
pub struct RequestCx<'a> {
    app: &'a App,
    cx: &'a mut RequestContext,
    page: &'a mut PageContext,
}

impl<'a> RequestCx<'a> {
    /// Bundles the per-request state for a controller invocation.
    pub fn new(app: &'a App, cx: &'a mut RequestContext, page: &'a mut PageContext) -> Self {
        Self { app, cx, page }
    }

    // -------------------------------------------------
    // Core access
    // -------------------------------------------------

    /// The application.
    pub fn app(&self) -> &App {
        self.app
    }

    /// The inbound request snapshot.
    pub fn request(&self) -> &Request {
        self.cx.request()
    }

    /// All extracted path parameters.
    pub fn params(&self) -> &PathParams {
        self.cx.params()
    }

    /// One path parameter.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.cx.params().get(name).map(String::as_str)
    }

    /// The page context this request is building.
    pub fn page(&mut self) -> &mut PageContext {
        self.page
    }

    // -------------------------------------------------
    // Services / config / capabilities
    // -------------------------------------------------

    /// Looks up a service by id.
    pub fn service<T: 'static>(&self, id: &str) -> Result<Rc<T>, DispatchError> {
        self.app.get_service(id)
    }

    /// The application configuration.
    pub fn config(&self) -> &AppConfig {
        self.app.config()
    }

    /// Whether a capability exists and is currently allowed.
    pub fn can(&self, capability: &str) -> bool {
        self.app.can(capability)
    }

    /// Fails unless a capability exists and is allowed.
    pub fn require_capability(&self, capability: &str) -> Result<(), DispatchError> {
        self.app.require_capability(capability)
    }

    // -------------------------------------------------
    // Response helpers
    // -------------------------------------------------

    /// Renders a template against the page context.
    ///
    /// Fires `renderer.before` and `renderer.after` around the renderer
    /// service and returns an HTML outcome carrying the page's status.
    /// Renderer errors surface unchanged.
    pub fn render(&mut self, template: &str) -> Result<Outcome, DispatchError> {
        let hooks = self.app.hooks();
        hooks.do_action(
            "renderer.before",
            &json!({"template": template, "status": self.page.status()}),
        )?;

        let renderer = self.app.renderer()?;
        let html = renderer.render(template, self.page)?;

        hooks.do_action(
            "renderer.after",
            &json!({"template": template, "bytes": html.len()}),
        )?;

        Ok(Outcome::Html {
            body: html,
            status: self.page.status(),
        })
    }

    /// A JSON outcome.
    pub fn json(&self, data: Value, status: u16) -> Outcome {
        Outcome::Json { data, status }
    }

    /// Issues a redirect and ends the request.
    ///
    /// The redirect is queued as the terminal response; return the
    /// resulting [`Outcome::AlreadySent`] from the action so no further
    /// processing happens.
    pub fn redirect(&mut self, url: impl Into<String>, status: u16) -> Outcome {
        self.cx.defer_response(Response::redirect(url, status));
        Outcome::AlreadySent
    }
}
