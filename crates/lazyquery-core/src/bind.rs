use convert_case::{Case, Casing};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error as ThisError;

///
/// BindingRules
///
/// Name-to-kind lookup used to bind an unbound query to an entity kind.
///
/// The default rule derives the binding key from a kind name by
/// camel-casing it and appending `s` (`"Article"` → `"articles"`,
/// `"OrderItem"` → `"orderItems"`). English pluralization is irregular,
/// so the rule is pluggable: register overrides with [`Self::irregular`]
/// rather than relying on a built-in pluralization table.
///

#[derive(Clone, Debug, Default)]
pub struct BindingRules {
    irregular: BTreeMap<String, String>,
}

impl BindingRules {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            irregular: BTreeMap::new(),
        }
    }

    /// Register an irregular binding key for one entity kind
    /// (e.g. `"Person"` → `"people"`).
    #[must_use]
    pub fn irregular(mut self, kind: impl Into<String>, key: impl Into<String>) -> Self {
        self.irregular.insert(kind.into(), key.into());
        self
    }

    /// Binding key derived from an entity kind name.
    #[must_use]
    pub fn key_for(&self, kind: &str) -> String {
        if let Some(key) = self.irregular.get(kind) {
            return key.clone();
        }

        let mut key = kind.to_case(Case::Camel);
        key.push('s');
        key
    }

    /// Resolve a candidate key against the entity catalog. Returns the
    /// matching entity kind, or `None` when the key binds nothing.
    #[must_use]
    pub fn resolve(&self, key: &str, kinds: &BTreeSet<String>) -> Option<String> {
        kinds.iter().find(|kind| self.key_for(kind) == key).cloned()
    }
}

///
/// BindError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum BindError {
    #[error("query is already bound to entity kind '{entity}'")]
    AlreadyBound { entity: String },

    #[error("'{key}' does not bind any known entity kind")]
    UnknownBinding { key: String },
}

///
/// TESTS
///
