// Copyright (c) The Resolvent Authors.
// Licensed under the MIT License.

use crate::key::AttrKey;
use crate::registry::Registry;

use std::collections::BTreeSet;

/// Static configuration errors found while planning.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PlanError {
    #[error("cyclic dependency between resolvers: {}", cycle.join(" -> "))]
    CyclicDependency { cycle: Vec<String> },
}

/// One sweep of the planning fixpoint. Invocations within a stage have all
/// their inputs satisfied before the stage starts and do not consume each
/// other's outputs, so they are safe to dispatch concurrently.
#[derive(Clone, Debug, Default)]
pub struct Stage {
    pub invocations: Vec<usize>,
}

/// An ordered list of resolver invocations whose cumulative inputs are
/// always satisfied by the time they run, plus the goals that no
/// invocation sequence can reach.
#[derive(Clone, Debug, Default)]
pub struct Plan {
    pub stages: Vec<Stage>,
    pub unresolved: Vec<AttrKey>,
}

impl Plan {
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

/// Compute the invocations needed to produce `goals` given the attributes
/// already present in the seed context.
///
/// Attributes and resolvers form a bipartite dependency graph. Starting
/// from the seeded attributes, each sweep schedules every unscheduled
/// resolver whose inputs are all satisfied; the sweep's outputs feed the
/// next sweep. The fixpoint terminates when no sweep makes progress.
/// Afterwards the stages are pruned back to the invocations that can
/// contribute to a goal, keeping every candidate for a goal attribute so
/// the executor can fall back when one returns no data.
pub fn plan(registry: &Registry, goals: &BTreeSet<AttrKey>, seeded: &BTreeSet<AttrKey>) -> Plan {
    let mut satisfied = seeded.clone();
    let mut scheduled = vec![false; registry.len()];
    let mut stages: Vec<Stage> = vec![];

    loop {
        let mut sweep = vec![];
        for idx in 0..registry.len() {
            if scheduled[idx] {
                continue;
            }
            let resolver = registry.resolver(idx);
            if resolver.inputs().iter().all(|k| satisfied.contains(k)) {
                sweep.push(idx);
                scheduled[idx] = true;
            }
        }
        if sweep.is_empty() {
            break;
        }
        // Outputs become visible only after the sweep, which is what makes
        // the invocations within it independent.
        for &idx in &sweep {
            for key in registry.resolver(idx).outputs() {
                satisfied.insert(key.clone());
            }
        }
        stages.push(Stage { invocations: sweep });
    }

    let unresolved: Vec<AttrKey> = goals
        .iter()
        .filter(|k| !satisfied.contains(*k))
        .cloned()
        .collect();

    // Prune backwards: an invocation is kept only if some declared output
    // is still needed; keeping it makes its non-seeded inputs needed too.
    let mut needed: BTreeSet<AttrKey> = goals
        .iter()
        .filter(|k| satisfied.contains(*k) && !seeded.contains(*k))
        .cloned()
        .collect();
    for stage in stages.iter_mut().rev() {
        stage.invocations.retain(|&idx| {
            let resolver = registry.resolver(idx);
            let relevant = resolver.outputs().iter().any(|k| needed.contains(k));
            if relevant {
                for key in resolver.inputs() {
                    if !seeded.contains(key) {
                        needed.insert(key.clone());
                    }
                }
            }
            relevant
        });
    }
    stages.retain(|s| !s.invocations.is_empty());

    Plan { stages, unresolved }
}

const WHITE: u8 = 0;
const GRAY: u8 = 1;
const BLACK: u8 = 2;

/// Reject registries where resolvers depend on each other's outputs in a
/// cycle. Run once at prepare time; execution never has to deal with
/// cycles at arbitrary depth.
///
/// A resolver echoing one of its own inputs as an output (the usual
/// entity-resolver pattern) is not a cycle.
pub fn detect_cycles(registry: &Registry) -> Result<(), PlanError> {
    let mut color = vec![WHITE; registry.len()];
    let mut stack = vec![];
    for idx in 0..registry.len() {
        if color[idx] == WHITE {
            visit(idx, registry, &mut color, &mut stack)?;
        }
    }
    Ok(())
}

fn visit(
    idx: usize,
    registry: &Registry,
    color: &mut [u8],
    stack: &mut Vec<usize>,
) -> Result<(), PlanError> {
    color[idx] = GRAY;
    stack.push(idx);
    for key in registry.resolver(idx).inputs() {
        for &dep in registry.resolvers_for(key) {
            if dep == idx {
                continue;
            }
            match color[dep] {
                GRAY => {
                    let name = |i: usize| registry.resolver(i).name().to_string();
                    let pos = stack.iter().position(|&i| i == dep).unwrap_or(0);
                    let mut cycle: Vec<String> = stack[pos..].iter().map(|&i| name(i)).collect();
                    cycle.push(name(dep));
                    return Err(PlanError::CyclicDependency { cycle });
                }
                WHITE => visit(dep, registry, color, stack)?,
                _ => {}
            }
        }
    }
    stack.pop();
    color[idx] = BLACK;
    Ok(())
}
