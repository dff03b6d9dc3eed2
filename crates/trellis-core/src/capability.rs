//! Capability registry and permission policy.
//!
//! A capability is a named, globally unique declaration that some component
//! provides a technical feature ("media.read", "db", "admin.panel").
//! Registering one answers *what the system can do*, never *who may do it*.
//! The existence check is deliberately not an authorization decision.
//!
//! Permissions are the separate question of whether a capability may
//! currently be exercised. The default policy is allow-all (fail open):
//! locking anything down requires explicit, non-default configuration.

use std::cell::RefCell;
use std::collections::BTreeMap;

use thiserror::Error;

/// Errors raised by the capability layer.
#[derive(Debug, Error)]
pub enum CapabilityError {
    /// A second component tried to claim an existing capability name.
    #[error("capability '{0}' already registered")]
    Duplicate(String),

    /// A route requires a capability no component has registered.
    #[error("required capability '{0}' not provided by any component")]
    Unregistered(String),

    /// A capability exists but the policy denies it in the current context.
    #[error("capability '{0}' is not allowed in current context")]
    NotAllowed(String),
}

/// Write-once set of named capabilities, each claimed by one provider.
///
/// Shared by reference during the registration phase, hence the interior
/// `RefCell`. There is no unregister operation.
#[derive(Debug, Default)]
pub struct CapabilityRegistry {
    entries: RefCell<BTreeMap<String, String>>,
}

impl CapabilityRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a capability for a provider.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError::Duplicate`] if the name is already
    /// claimed. The first provider is never overwritten.
    pub fn register(&self, name: &str, provider: &str) -> Result<(), CapabilityError> {
        let mut entries = self.entries.borrow_mut();
        if entries.contains_key(name) {
            return Err(CapabilityError::Duplicate(name.to_string()));
        }
        entries.insert(name.to_string(), provider.to_string());
        Ok(())
    }

    /// Existence-only check. Any caller gets the same yes/no.
    pub fn has(&self, name: &str) -> bool {
        self.entries.borrow().contains_key(name)
    }

    /// Returns the provider that claimed a capability, if any.
    pub fn provider(&self, name: &str) -> Option<String> {
        self.entries.borrow().get(name).cloned()
    }

    /// Snapshot of all registered capabilities (introspection / debugging).
    pub fn all(&self) -> BTreeMap<String, String> {
        self.entries.borrow().clone()
    }
}

/// Boolean policy over capability names.
///
/// Implementations must be pure per call: same input, same answer, no
/// request state consulted.
pub trait PermissionPolicy {
    /// Whether the capability may currently be exercised.
    fn allows(&self, capability: &str) -> bool;
}

/// Policy backed by explicit allow/deny overrides.
///
/// Capabilities without an override are allowed - the framework is fail
/// open by design, not fail closed.
#[derive(Debug, Default)]
pub struct PermissionOverrides {
    overrides: RefCell<BTreeMap<String, bool>>,
}

impl PermissionOverrides {
    /// Creates a policy with no overrides (everything allowed).
    pub fn new() -> Self {
        Self::default()
    }

    /// Explicitly allows a capability.
    pub fn allow(&self, capability: &str) {
        self.overrides
            .borrow_mut()
            .insert(capability.to_string(), true);
    }

    /// Explicitly denies a capability.
    pub fn deny(&self, capability: &str) {
        self.overrides
            .borrow_mut()
            .insert(capability.to_string(), false);
    }

    /// Bulk-sets permission rules, e.g. from a policy file at bootstrap.
    pub fn apply<I, S>(&self, rules: I)
    where
        I: IntoIterator<Item = (S, bool)>,
        S: Into<String>,
    {
        let mut overrides = self.overrides.borrow_mut();
        for (capability, allowed) in rules {
            overrides.insert(capability.into(), allowed);
        }
    }

    /// Snapshot of all overrides (introspection / debugging).
    pub fn all(&self) -> BTreeMap<String, bool> {
        self.overrides.borrow().clone()
    }
}

impl PermissionPolicy for PermissionOverrides {
    fn allows(&self, capability: &str) -> bool {
        self.overrides
            .borrow()
            .get(capability)
            .copied()
            .unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_has() {
        let registry = CapabilityRegistry::new();
        registry.register("media.read", "MediaComponent").unwrap();

        assert!(registry.has("media.read"));
        assert!(!registry.has("media.write"));
        assert_eq!(
            registry.provider("media.read"),
            Some("MediaComponent".to_string())
        );
    }

    #[test]
    fn test_duplicate_registration_is_an_error() {
        let registry = CapabilityRegistry::new();
        registry.register("db", "StorageComponent").unwrap();

        let err = registry.register("db", "OtherComponent").unwrap_err();
        assert!(matches!(err, CapabilityError::Duplicate(name) if name == "db"));

        // The first provider survives.
        assert_eq!(registry.provider("db"), Some("StorageComponent".to_string()));
    }

    #[test]
    fn test_overrides_default_to_allow() {
        let policy = PermissionOverrides::new();
        assert!(policy.allows("anything.at.all"));
    }

    #[test]
    fn test_explicit_deny_wins_over_default() {
        let policy = PermissionOverrides::new();
        policy.deny("admin.panel");

        assert!(!policy.allows("admin.panel"));
        assert!(policy.allows("media.read"));
    }

    #[test]
    fn test_allow_after_deny_flips_back() {
        let policy = PermissionOverrides::new();
        policy.deny("export");
        policy.allow("export");
        assert!(policy.allows("export"));
    }

    #[test]
    fn test_apply_bulk_rules() {
        let policy = PermissionOverrides::new();
        policy.apply([("a", true), ("b", false)]);

        assert!(policy.allows("a"));
        assert!(!policy.allows("b"));
        assert_eq!(policy.all().len(), 2);
    }
}
