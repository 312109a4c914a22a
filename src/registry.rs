// Copyright (c) The Resolvent Authors.
// Licensed under the MIT License.

use crate::key::AttrKey;
use crate::resolver::Resolver;

use std::collections::BTreeMap;
use std::rc::Rc;

/// Errors raised while registering resolvers.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RegistryError {
    #[error("resolvers `{existing}` and `{incoming}` both declare output {key}")]
    DuplicateOutputConflict {
        // Display form of the contested attribute key. Kept as text so the
        // error stays Send + Sync.
        key: String,
        existing: String,
        incoming: String,
    },

    #[error("invalid resolver `{name}`: {reason}")]
    InvalidResolver { name: String, reason: String },
}

/// Whether one attribute may have several registered producers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Multiple candidates per key, tried in registration order.
    #[default]
    Allow,
    /// At most one producer per key.
    Reject,
}

/// Process-wide resolver catalog, indexed by declared output attribute.
/// Built at startup; read-only while queries run.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    resolvers: Vec<Rc<Resolver>>,
    by_output: BTreeMap<AttrKey, Vec<usize>>,
    policy: DuplicatePolicy,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_duplicate_policy(&mut self, policy: DuplicatePolicy) {
        self.policy = policy;
    }

    fn validate(&self, resolver: &Resolver) -> Result<(), RegistryError> {
        let invalid = |reason: String| RegistryError::InvalidResolver {
            name: resolver.name().to_string(),
            reason,
        };

        if resolver.name().trim().is_empty() {
            return Err(invalid("name must not be empty".to_string()));
        }
        if resolver.outputs().is_empty() {
            return Err(invalid("at least one output must be declared".to_string()));
        }
        for key in resolver.outputs().iter().chain(resolver.inputs()) {
            if key.is_placeholder() {
                return Err(invalid(format!(
                    "placeholder key {key} cannot be resolved; placeholders only reshape the result tree"
                )));
            }
        }
        if self.resolvers.iter().any(|r| r.name() == resolver.name()) {
            return Err(invalid("a resolver with this name is already registered".to_string()));
        }
        Ok(())
    }

    /// Add a resolver, indexing it under each declared output. Candidate
    /// order for an attribute is registration order.
    pub fn register(&mut self, resolver: Resolver) -> Result<(), RegistryError> {
        self.validate(&resolver)?;

        if self.policy == DuplicatePolicy::Reject {
            for key in resolver.outputs() {
                if let Some(ids) = self.by_output.get(key) {
                    if let Some(&first) = ids.first() {
                        return Err(RegistryError::DuplicateOutputConflict {
                            key: key.to_string(),
                            existing: self.resolvers[first].name().to_string(),
                            incoming: resolver.name().to_string(),
                        });
                    }
                }
            }
        }

        let idx = self.resolvers.len();
        for key in resolver.outputs() {
            self.by_output.entry(key.clone()).or_default().push(idx);
        }
        self.resolvers.push(Rc::new(resolver));
        Ok(())
    }

    /// Resolver ids able to produce `key`, in registration order.
    pub fn resolvers_for(&self, key: &AttrKey) -> &[usize] {
        match self.by_output.get(key) {
            Some(ids) => ids,
            None => &[],
        }
    }

    pub fn resolver(&self, idx: usize) -> &Resolver {
        &self.resolvers[idx]
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rc<Resolver>> {
        self.resolvers.iter()
    }
}
