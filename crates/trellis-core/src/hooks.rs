//! Hook system providing actions and filters.
//!
//! Hooks are the extension seam of the framework: well-known lifecycle
//! events (`components.ready`, `app.ready`, `renderer.before`,
//! `renderer.after`) plus whatever names components and plugins agree on.
//!
//! Two kinds of hook exist, stored in separate namespaces even when they
//! share a name:
//!
//! - **Actions** are fire-and-forget callbacks. Return values are ignored;
//!   only side effects matter.
//! - **Filters** transform a value. Each callback receives the current
//!   value and returns the next one; the final value is handed back to the
//!   caller.
//!
//! Execution order is ascending numeric priority, then registration order
//! within the same priority. The same callback may be registered more than
//! once and will run more than once - there is no uniqueness check and no
//! unregister operation.
//!
//! Callback errors propagate to the caller of [`HookRegistry::do_action`] /
//! [`HookRegistry::apply_filters`]. There is no isolation: a broken
//! subscriber breaks the request. Protections belong in middleware, not
//! silently inside the hook loop.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use serde_json::Value;
use thiserror::Error;

/// Priority used when a registration does not specify one.
pub const DEFAULT_PRIORITY: i32 = 10;

/// Error returned by a hook callback.
#[derive(Debug, Error)]
#[error("hook callback failed: {message}")]
pub struct HookError {
    /// Human-readable error message.
    pub message: String,
}

impl HookError {
    /// Creates a new hook error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Type alias for action callbacks.
///
/// Actions receive the hook payload and return nothing on success.
pub type ActionFn = Rc<dyn Fn(&Value) -> Result<(), HookError>>;

/// Type alias for filter callbacks.
///
/// Filters receive the current value plus the extra arguments passed to
/// [`HookRegistry::apply_filters`] and return the transformed value.
pub type FilterFn = Rc<dyn Fn(Value, &Value) -> Result<Value, HookError>>;

/// Registry of action and filter subscriptions.
///
/// The registry is shared by reference during the registration phase
/// (plugins subscribe through `&HookRegistry`), so storage sits behind
/// `RefCell`. Firing snapshots the callback list first: a callback that
/// registers further hooks mid-flight does not alias the borrow, and the
/// new registration takes effect from the next firing on.
#[derive(Default)]
pub struct HookRegistry {
    actions: RefCell<BTreeMap<String, BTreeMap<i32, Vec<ActionFn>>>>,
    filters: RefCell<BTreeMap<String, BTreeMap<i32, Vec<FilterFn>>>>,
}

impl HookRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    // -------------------------------------------------
    // Actions
    // -------------------------------------------------

    /// Registers an action callback at [`DEFAULT_PRIORITY`].
    pub fn add_action<F>(&self, hook: &str, callback: F)
    where
        F: Fn(&Value) -> Result<(), HookError> + 'static,
    {
        self.add_action_with_priority(hook, DEFAULT_PRIORITY, callback);
    }

    /// Registers an action callback at an explicit priority.
    ///
    /// Lower priorities run earlier. Callbacks at the same priority run in
    /// registration order.
    pub fn add_action_with_priority<F>(&self, hook: &str, priority: i32, callback: F)
    where
        F: Fn(&Value) -> Result<(), HookError> + 'static,
    {
        self.actions
            .borrow_mut()
            .entry(hook.to_string())
            .or_default()
            .entry(priority)
            .or_default()
            .push(Rc::new(callback));
    }

    /// Fires all callbacks registered for an action hook.
    ///
    /// A no-op when nothing is registered. The first callback error aborts
    /// the run and propagates to the caller.
    pub fn do_action(&self, hook: &str, payload: &Value) -> Result<(), HookError> {
        let snapshot: Vec<ActionFn> = match self.actions.borrow().get(hook) {
            Some(by_priority) => by_priority.values().flatten().cloned().collect(),
            None => return Ok(()),
        };

        for callback in snapshot {
            callback(payload)?;
        }

        Ok(())
    }

    // -------------------------------------------------
    // Filters
    // -------------------------------------------------

    /// Registers a filter callback at [`DEFAULT_PRIORITY`].
    pub fn add_filter<F>(&self, hook: &str, callback: F)
    where
        F: Fn(Value, &Value) -> Result<Value, HookError> + 'static,
    {
        self.add_filter_with_priority(hook, DEFAULT_PRIORITY, callback);
    }

    /// Registers a filter callback at an explicit priority.
    pub fn add_filter_with_priority<F>(&self, hook: &str, priority: i32, callback: F)
    where
        F: Fn(Value, &Value) -> Result<Value, HookError> + 'static,
    {
        self.filters
            .borrow_mut()
            .entry(hook.to_string())
            .or_default()
            .entry(priority)
            .or_default()
            .push(Rc::new(callback));
    }

    /// Threads a value through all filters registered for a hook.
    ///
    /// Returns the value unchanged when nothing is registered (identity
    /// law). `args` is handed to every callback unchanged; pass
    /// `Value::Null` when there is nothing to say.
    pub fn apply_filters(&self, hook: &str, value: Value, args: &Value) -> Result<Value, HookError> {
        let snapshot: Vec<FilterFn> = match self.filters.borrow().get(hook) {
            Some(by_priority) => by_priority.values().flatten().cloned().collect(),
            None => return Ok(value),
        };

        let mut current = value;
        for callback in snapshot {
            current = callback(current, args)?;
        }

        Ok(current)
    }
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let actions: usize = self
            .actions
            .borrow()
            .values()
            .flat_map(|m| m.values())
            .map(Vec::len)
            .sum();
        let filters: usize = self
            .filters
            .borrow()
            .values()
            .flat_map(|m| m.values())
            .map(Vec::len)
            .sum();
        f.debug_struct("HookRegistry")
            .field("action_count", &actions)
            .field("filter_count", &filters)
            .finish()
    }
}
