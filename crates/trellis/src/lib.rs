//! # Trellis - Explicitly-Wired MVC Web Framework
//!
//! Trellis is a small MVC framework built around one idea: **no magic**.
//! Routes, components, plugins, services, and capabilities are registered
//! explicitly, in code, in a deterministic order. Nothing is discovered,
//! scanned, or auto-wired.
//!
//! A request flows through a fixed lifecycle:
//!
//! ```text
//! front controller
//!   → Bootstrap::boot (config + services + guard stack)
//!   → App::run
//!       → register extensions (once)        🔔 components.ready
//!       → security headers
//!       → Router::match_request
//!       → middleware pipeline (guards)
//!       → controller action → Outcome       🔔 app.ready
//!       → response write (HTML / JSON / already sent)
//! ```
//!
//! # Core Concepts
//!
//! - [`App`]: owns the lifecycle, the service locator, and the registries
//! - [`Controller`]: the contract every request handler satisfies; actions
//!   return an [`Outcome`] (`Html` | `Json` | `AlreadySent`)
//! - [`Component`]: extension unit that may add routes, services,
//!   controllers, and capabilities
//! - [`Plugin`]: extension unit that may only subscribe to hooks
//! - [`ViewRenderer`]: MiniJinja-backed default renderer
//! - [`logging`]: bitmask-level structured logging with a null default
//!
//! # Quick Start
//!
//! ```rust
//! use trellis::{App, AppConfig, Component, Controller, Outcome, RequestCx};
//! use trellis_core::{DispatchError, Method, RouteTarget};
//!
//! struct HomeController;
//!
//! impl Controller for HomeController {
//!     fn handle(&mut self, action: &str, _cx: &mut RequestCx<'_>) -> Result<Outcome, DispatchError> {
//!         match action {
//!             "index" => Ok(Outcome::html("<html>OK</html>")),
//!             _ => Err(DispatchError::UnknownAction {
//!                 controller: "home".into(),
//!                 action: action.into(),
//!             }),
//!         }
//!     }
//! }
//!
//! struct HomeComponent;
//!
//! impl Component for HomeComponent {
//!     fn register(&self, app: &mut App) -> Result<(), DispatchError> {
//!         app.router_mut().map(Method::Get, "/", RouteTarget::new("home", "index"))?;
//!         app.register_controller("home", || Box::new(HomeController))?;
//!         Ok(())
//!     }
//! }
//!
//! let mut app = App::new(AppConfig::default());
//! app.add_component(HomeComponent);
//! app.register_extensions().unwrap();
//! ```

mod app;
mod bootstrap;
mod config;
mod controller;
mod extension;
pub mod logging;
mod security;
mod view;

pub use app::App;
pub use bootstrap::{Bootstrap, BootstrapError};
pub use config::{AppConfig, ConfigError, FallbackSpec, GuardConfig, LoggingConfig, SecurityConfig};
pub use controller::{Controller, ControllerFactory, RequestCx};
pub use extension::{Component, Plugin};
pub use security::security_headers;
pub use view::ViewRenderer;

// The engine types applications touch constantly, re-exported for
// convenience; `trellis_core` remains available for the rest.
pub use trellis_core::{
    DispatchError, HookRegistry, MatchResult, Method, Outcome, PageContext, Renderer, Request,
    Response, ResponseSink, RouteTarget, Router,
};
