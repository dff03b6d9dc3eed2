//! Extension contracts: components and plugins.
//!
//! Two kinds of extension exist, with deliberately different reach:
//!
//! - **Components** are active building blocks. They may register routes,
//!   controllers, services, and capabilities - they add surface to the
//!   application.
//! - **Plugins** only subscribe to hooks. No routes, no controllers, no
//!   rendering; they influence existing flows from the outside.
//!
//! These boundaries are governance. The core intentionally does not
//! enforce them technically: a plugin holding `&App` cannot mutate it,
//! but nothing stops a component from doing plugin-ish things. What the
//! core does enforce is *when* registration happens: exactly once,
//! explicitly, in registration order, before the request is served.

use trellis_core::{DispatchError, HookRegistry};

use crate::app::App;

/// An active system building block.
///
/// Registered explicitly via [`App::add_component`]; no auto-discovery.
/// `register` runs exactly once per application instance.
pub trait Component {
    /// Registers the component: routes, controllers, services,
    /// capabilities.
    fn register(&self, app: &mut App) -> Result<(), DispatchError>;

    /// Declares the capabilities this component provides.
    ///
    /// Purely declarative - this states potential and enforces nothing.
    /// Actual registration still happens in [`Component::register`] via
    /// [`App::register_capability`].
    fn capabilities(&self) -> Vec<String> {
        Vec::new()
    }
}

/// A hook-only extension.
///
/// Plugins receive the hook registry to subscribe and a read-only view of
/// the application for looking up services (typically the logger).
pub trait Plugin {
    /// Registers the plugin's hook subscriptions.
    fn register(&self, hooks: &HookRegistry, app: &App);
}
