// Copyright (c) The Resolvent Authors.
// Licensed under the MIT License.

use crate::context::Context;
use crate::key::AttrKey;
use crate::planner::{self, Plan};
use crate::query::{Query, QueryNode};
use crate::registry::Registry;
use crate::value::Value;

use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;

/// Cooperative cancellation handle. Setting the flag stops the executor
/// from dispatching further resolver invocations; resolvers are
/// side-effect-free with respect to the context, so whatever already ran
/// is simply kept and the partial result returned.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum DiagnosticKind {
    /// No satisfiable resolver path produced the key.
    UnresolvableAttribute,
    /// A join key resolved to something that is not an entity or a
    /// sequence of entities.
    UnexpectedJoinValue,
    /// Resolution stopped because the query was cancelled.
    Cancelled,
}

/// A per-key report accompanying a partial result tree. Diagnostics never
/// abort sibling resolution.
#[derive(Clone, Debug, Serialize)]
pub struct Diagnostic {
    /// Position in the result tree, e.g. `:account/friends[2] :account/name`.
    pub path: String,
    pub key: AttrKey,
    pub kind: DiagnosticKind,
}

/// The outcome of one query execution: a query-shaped tree of resolved
/// values plus the keys that could not be filled in.
#[derive(Clone, Debug, Serialize)]
pub struct ExecutionResult {
    pub tree: Value,
    pub diagnostics: Vec<Diagnostic>,
}

impl ExecutionResult {
    pub fn is_complete(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

pub(crate) struct Executor<'a> {
    registry: &'a Registry,
    cancel: CancelFlag,
    cancelled: bool,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Executor<'a> {
    pub fn new(registry: &'a Registry, cancel: CancelFlag) -> Self {
        Self {
            registry,
            cancel,
            cancelled: false,
            diagnostics: vec![],
        }
    }

    pub fn execute(mut self, query: &Query, ctx: Context) -> Result<ExecutionResult> {
        let tree = self.walk(query, ctx, "")?;
        Ok(ExecutionResult {
            tree,
            diagnostics: self.diagnostics,
        })
    }

    fn walk(&mut self, query: &Query, mut ctx: Context, path: &str) -> Result<Value> {
        let goals: BTreeSet<AttrKey> = query.requested_keys().into_iter().collect();
        self.ensure(&goals, &mut ctx)?;

        let mut out: BTreeMap<Rc<str>, Value> = BTreeMap::new();
        for node in &query.nodes {
            let key = node.key();
            let key_path = join_path(path, key);
            match node {
                QueryNode::Prop(key) => match ctx.get(key) {
                    Some(v) => {
                        out.insert(key.as_str().into(), v.clone());
                    }
                    None => self.report_missing(key_path, key),
                },
                QueryNode::Join { key, query } if key.is_placeholder() => {
                    // Identity transform: re-expose the current context at
                    // a different tree position.
                    let nested = self.walk(query, ctx.clone(), &key_path)?;
                    out.insert(key.as_str().into(), nested);
                }
                QueryNode::Join { key, query } => match ctx.get(key).cloned() {
                    Some(Value::Object(entity)) => {
                        let child = Context::from_entity(entity.as_ref());
                        let nested = self.walk(query, child, &key_path)?;
                        out.insert(key.as_str().into(), nested);
                    }
                    Some(Value::Array(items)) => {
                        let mut rows = vec![];
                        for (i, item) in items.iter().enumerate() {
                            let row_path = format!("{key_path}[{i}]");
                            match item {
                                Value::Object(entity) => {
                                    let child = Context::from_entity(entity.as_ref());
                                    rows.push(self.walk(query, child, &row_path)?);
                                }
                                _ => self.report(row_path, key, DiagnosticKind::UnexpectedJoinValue),
                            }
                        }
                        out.insert(key.as_str().into(), Value::from(rows));
                    }
                    Some(_) => self.report(key_path, key, DiagnosticKind::UnexpectedJoinValue),
                    None => self.report_missing(key_path, key),
                },
            }
        }
        Ok(Value::from(out))
    }

    /// Make sure every goal that can be resolved is present in the
    /// context, planning and running resolver invocations as needed.
    fn ensure(&mut self, goals: &BTreeSet<AttrKey>, ctx: &mut Context) -> Result<()> {
        let missing: BTreeSet<AttrKey> = goals
            .iter()
            .filter(|k| !ctx.contains(k))
            .cloned()
            .collect();
        if missing.is_empty() {
            return Ok(());
        }
        let plan = planner::plan(self.registry, &missing, &ctx.key_set());
        self.run(&plan, ctx)
    }

    fn run(&mut self, plan: &Plan, ctx: &mut Context) -> Result<()> {
        let order: Vec<usize> = plan
            .stages
            .iter()
            .flat_map(|s| s.invocations.iter().copied())
            .collect();

        // Candidate order for a key is registration order, but planning can
        // place a later-registered candidate in an earlier stage when the
        // earlier one sits behind a dependency chain. Each bind is gated on
        // the earlier-registered candidates still in play, so registration
        // order decides which producer a key gets regardless of staging.
        let mut candidates: BTreeMap<&AttrKey, Vec<usize>> = BTreeMap::new();
        for &idx in &order {
            for key in self.registry.resolver(idx).outputs() {
                candidates.entry(key).or_default().push(idx);
            }
        }

        let mut done = vec![false; self.registry.len()];
        let mut waiting = vec![false; self.registry.len()];
        loop {
            let mut progress = false;
            for &idx in &order {
                if done[idx] {
                    continue;
                }
                if self.cancel.is_cancelled() {
                    self.cancelled = true;
                    return Ok(());
                }
                let resolver = self.registry.resolver(idx);

                // First success wins: once every output of this candidate
                // is present, invoking it again cannot add anything.
                if resolver.outputs().iter().all(|k| ctx.contains(k)) {
                    done[idx] = true;
                    progress = true;
                    continue;
                }
                if !resolver.inputs().iter().all(|k| ctx.contains(k)) {
                    continue;
                }
                let gated = resolver.outputs().iter().any(|k| {
                    !ctx.contains(k)
                        && candidates[k].iter().any(|&i| i < idx && !done[i] && !waiting[i])
                });
                if gated {
                    continue;
                }

                let scoped = ctx.scoped_to(resolver.inputs());
                let produced = resolver.invoke(&scoped)?;
                for (key, value) in produced {
                    // bind is append-only; an already-present key keeps
                    // its first value.
                    ctx.bind(key, value);
                }
                done[idx] = true;
                progress = true;
            }
            if progress {
                continue;
            }
            // A candidate whose inputs never materialized (an earlier
            // alternate returned no data somewhere up its chain) releases
            // the gate so later alternates can run. It stays runnable in
            // case a later pass supplies its inputs after all.
            let mut released = false;
            for &idx in &order {
                if done[idx] || waiting[idx] {
                    continue;
                }
                let resolver = self.registry.resolver(idx);
                if !resolver.inputs().iter().all(|k| ctx.contains(k)) {
                    waiting[idx] = true;
                    released = true;
                }
            }
            if !released {
                break;
            }
        }
        Ok(())
    }

    fn report_missing(&mut self, path: String, key: &AttrKey) {
        let kind = if self.cancelled {
            DiagnosticKind::Cancelled
        } else {
            DiagnosticKind::UnresolvableAttribute
        };
        self.report(path, key, kind);
    }

    fn report(&mut self, path: String, key: &AttrKey, kind: DiagnosticKind) {
        self.diagnostics.push(Diagnostic {
            path,
            key: key.clone(),
            kind,
        });
    }
}

fn join_path(path: &str, key: &AttrKey) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path} {key}")
    }
}
