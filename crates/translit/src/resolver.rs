//! Run-scoped symbol table shared by every unit of a run.
//!
//! Maps stable source identities (`com.acme.Greeter`,
//! `com.acme.Greeter#greet`) to the [`TargetRef`] they were translated to.
//! The first binding for an identity wins; a second one is a
//! [`BindError`]. Lookups never wait for a binding to appear: units are not
//! translated in dependency order, so an unbound identity is reported as
//! unresolved and the caller falls back.

use crate::error::BindError;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use tracing::debug;
use translit_syntax::TargetRef;

#[derive(Debug, Default)]
pub struct SymbolResolver {
    bindings: RwLock<HashMap<String, TargetRef>>,
}

impl SymbolResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the reference bound for `identity`.
    pub fn resolve(&self, identity: &str) -> Option<TargetRef> {
        self.bindings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(identity)
            .cloned()
    }

    /// Bind `identity` to `reference`. Fails if the identity is already bound.
    pub fn bind(&self, identity: impl Into<String>, reference: TargetRef) -> Result<(), BindError> {
        use std::collections::hash_map::Entry;

        let identity = identity.into();
        let mut bindings = self
            .bindings
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        match bindings.entry(identity) {
            Entry::Occupied(entry) => Err(BindError::Duplicate {
                identity: entry.key().clone(),
                existing: entry.get().full_name(),
                attempted: reference.full_name(),
            }),
            Entry::Vacant(entry) => {
                debug!(identity = %entry.key(), target = %reference.full_name(), "bound symbol");
                entry.insert(reference);
                Ok(())
            }
        }
    }

    pub fn len(&self) -> usize {
        self.bindings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
