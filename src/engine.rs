// Copyright (c) The Resolvent Authors.
// Licensed under the MIT License.

use crate::context::Context;
use crate::executor::{CancelFlag, ExecutionResult, Executor};
use crate::planner::{detect_cycles, PlanError};
use crate::query::Query;
use crate::registry::{DuplicatePolicy, Registry, RegistryError};
use crate::resolver::Resolver;

use anyhow::Result;

/// The query resolution engine.
///
/// Register resolvers at startup, then execute queries against it. The
/// registry is frozen for the duration of each execution; registering
/// more resolvers invalidates the prepared state and the next execution
/// re-checks the configuration.
#[derive(Clone, Debug, Default)]
pub struct Engine {
    registry: Registry,
    prepared: bool,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_duplicate_policy(&mut self, policy: DuplicatePolicy) {
        self.registry.set_duplicate_policy(policy);
    }

    pub fn register(&mut self, resolver: Resolver) -> Result<(), RegistryError> {
        self.registry.register(resolver)?;
        // if the configuration changes, it must be validated again
        self.prepared = false;
        Ok(())
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Validate the resolver configuration. Cycles between resolvers are
    /// rejected here, before any query runs.
    pub fn prepare(&mut self) -> Result<(), PlanError> {
        if !self.prepared {
            detect_cycles(&self.registry)?;
            self.prepared = true;
        }
        Ok(())
    }

    /// Execute `query` against an initial context of already-known values
    /// (e.g. an authenticated session token). Returns the query-shaped
    /// result tree together with diagnostics for any key that could not
    /// be resolved; partial unresolvability is never a total failure.
    pub fn execute(&mut self, query: &Query, ctx: Context) -> Result<ExecutionResult> {
        self.execute_with_cancel(query, ctx, CancelFlag::new())
    }

    pub fn execute_with_cancel(
        &mut self,
        query: &Query,
        ctx: Context,
        cancel: CancelFlag,
    ) -> Result<ExecutionResult> {
        self.prepare()?;
        Executor::new(&self.registry, cancel).execute(query, ctx)
    }

    /// Parse the EDN text form of a query and execute it.
    pub fn execute_str(&mut self, query: &str, ctx: Context) -> Result<ExecutionResult> {
        let query = Query::parse(query)?;
        self.execute(&query, ctx)
    }
}
