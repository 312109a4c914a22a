// Copyright (c) The Resolvent Authors.
// Licensed under the MIT License.

use crate::key::AttrKey;
use crate::value::Value;

use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use anyhow::Result;

/// Resolved attribute values accumulated during one query execution.
///
/// The context is append-only: once an attribute has a value, later binds
/// of the same key are ignored. Resolvers never receive the full context;
/// they get a copy scoped to their declared inputs.
#[derive(Clone, Debug, Default)]
pub struct Context {
    values: BTreeMap<AttrKey, Value>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a context entry. Convenience for building initial contexts:
    /// `Context::new().with("session/token", token)?`.
    pub fn with(mut self, key: &str, value: Value) -> Result<Self> {
        self.bind(key.parse()?, value);
        Ok(self)
    }

    /// Bind `key` to `value` unless the key is already bound.
    /// Returns whether the binding took effect.
    pub fn bind(&mut self, key: AttrKey, value: Value) -> bool {
        match self.values.entry(key) {
            std::collections::btree_map::Entry::Vacant(e) => {
                e.insert(value);
                true
            }
            std::collections::btree_map::Entry::Occupied(_) => false,
        }
    }

    pub fn get(&self, key: &AttrKey) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &AttrKey) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AttrKey, &Value)> {
        self.values.iter()
    }

    pub fn key_set(&self) -> BTreeSet<AttrKey> {
        self.values.keys().cloned().collect()
    }

    /// A copy of this context stripped down to `keys`. This is what a
    /// resolver sees: exactly its declared inputs, nothing inherited.
    pub fn scoped_to(&self, keys: &[AttrKey]) -> Context {
        let mut scoped = Context::new();
        for key in keys {
            if let Some(v) = self.values.get(key) {
                scoped.bind(key.clone(), v.clone());
            }
        }
        scoped
    }

    /// Build an entity context from a resolved join value. Object entries
    /// whose keys are not valid attribute keys are skipped; they can only
    /// enter the child tree through a resolver.
    pub fn from_entity(entity: &BTreeMap<Rc<str>, Value>) -> Context {
        let mut ctx = Context::new();
        for (k, v) in entity {
            if let Ok(key) = AttrKey::new(k) {
                ctx.bind(key, v.clone());
            }
        }
        ctx
    }
}
