// Copyright (c) The Resolvent Authors.
// Licensed under the MIT License.

use crate::key::AttrKey;
use crate::planner::{detect_cycles, plan, PlanError};
use crate::registry::Registry;
use crate::resolver::{Output, Resolver};
use crate::value::Value;

use std::collections::BTreeSet;

use anyhow::{bail, Result};

fn keys(texts: &[&str]) -> Result<BTreeSet<AttrKey>> {
    texts.iter().map(|t| t.parse()).collect()
}

fn producer(name: &str, inputs: &[&str], outputs: &[&str]) -> Result<Resolver> {
    let produced: Result<Vec<AttrKey>> = outputs.iter().map(|o| o.parse()).collect();
    let produced = produced?;
    Resolver::new(name, inputs, outputs, move |_| {
        let mut out = Output::new();
        for key in &produced {
            out.insert(key.clone(), Value::from(1i64));
        }
        Ok(out)
    })
}

#[test]
fn chain_is_planned_in_dependency_order() -> Result<()> {
    let mut registry = Registry::new();
    registry.register(producer("session", &[], &["session/account-id"])?)?;
    registry.register(producer(
        "account",
        &["session/account-id"],
        &["account/display-name"],
    )?)?;

    let plan = plan(
        &registry,
        &keys(&["account/display-name"])?,
        &BTreeSet::new(),
    );
    assert!(plan.unresolved.is_empty());
    assert_eq!(plan.stages.len(), 2);
    assert_eq!(plan.stages[0].invocations, vec![0]);
    assert_eq!(plan.stages[1].invocations, vec![1]);
    Ok(())
}

#[test]
fn independent_producers_share_a_stage() -> Result<()> {
    let mut registry = Registry::new();
    registry.register(producer("a", &[], &["a/x"])?)?;
    registry.register(producer("b", &[], &["b/y"])?)?;

    let plan = plan(&registry, &keys(&["a/x", "b/y"])?, &BTreeSet::new());
    assert_eq!(plan.stages.len(), 1);
    assert_eq!(plan.stages[0].invocations, vec![0, 1]);
    Ok(())
}

#[test]
fn irrelevant_resolvers_are_pruned() -> Result<()> {
    let mut registry = Registry::new();
    registry.register(producer("noise", &[], &["noise/n"])?)?;
    registry.register(producer("wanted", &[], &["a/x"])?)?;

    let plan = plan(&registry, &keys(&["a/x"])?, &BTreeSet::new());
    assert_eq!(plan.stages.len(), 1);
    assert_eq!(plan.stages[0].invocations, vec![1]);
    Ok(())
}

#[test]
fn seeded_attributes_need_no_producer() -> Result<()> {
    let mut registry = Registry::new();
    registry.register(producer("session", &[], &["session/account-id"])?)?;
    registry.register(producer(
        "account",
        &["session/account-id"],
        &["account/display-name"],
    )?)?;

    let plan = plan(
        &registry,
        &keys(&["account/display-name"])?,
        &keys(&["session/account-id"])?,
    );
    assert_eq!(plan.stages.len(), 1);
    assert_eq!(plan.stages[0].invocations, vec![1]);
    Ok(())
}

#[test]
fn unreachable_goal_is_reported() -> Result<()> {
    let mut registry = Registry::new();
    registry.register(producer("wanted", &[], &["a/x"])?)?;

    let plan = plan(&registry, &keys(&["a/x", "b/missing"])?, &BTreeSet::new());
    assert_eq!(plan.unresolved, vec!["b/missing".parse::<AttrKey>()?]);
    assert_eq!(plan.stages.len(), 1);
    Ok(())
}

#[test]
fn goal_with_unsatisfiable_inputs_is_reported() -> Result<()> {
    let mut registry = Registry::new();
    // Producible only from an attribute nothing provides.
    registry.register(producer("account", &["session/account-id"], &["account/display-name"])?)?;

    let plan = plan(
        &registry,
        &keys(&["account/display-name"])?,
        &BTreeSet::new(),
    );
    assert_eq!(
        plan.unresolved,
        vec!["account/display-name".parse::<AttrKey>()?]
    );
    assert!(plan.is_empty());
    Ok(())
}

#[test]
fn alternate_candidates_are_kept_in_registration_order() -> Result<()> {
    let mut registry = Registry::new();
    registry.register(producer("primary", &[], &["a/x"])?)?;
    registry.register(producer("fallback", &[], &["a/x"])?)?;

    let plan = plan(&registry, &keys(&["a/x"])?, &BTreeSet::new());
    assert_eq!(plan.stages.len(), 1);
    assert_eq!(plan.stages[0].invocations, vec![0, 1]);
    Ok(())
}

#[test]
fn diamond_dependencies_are_not_a_cycle() -> Result<()> {
    let mut registry = Registry::new();
    registry.register(producer("root", &[], &["d/x"])?)?;
    registry.register(producer("left", &["d/x"], &["d/y"])?)?;
    registry.register(producer("right", &["d/x"], &["d/z"])?)?;
    registry.register(producer("merge", &["d/y", "d/z"], &["d/w"])?)?;

    detect_cycles(&registry)?;

    let plan = plan(&registry, &keys(&["d/w"])?, &BTreeSet::new());
    assert_eq!(plan.stages.len(), 3);
    assert_eq!(plan.stages[1].invocations, vec![1, 2]);
    Ok(())
}

#[test]
fn two_resolver_cycle_is_rejected() -> Result<()> {
    let mut registry = Registry::new();
    registry.register(producer("a", &["cycle/b"], &["cycle/a"])?)?;
    registry.register(producer("b", &["cycle/a"], &["cycle/b"])?)?;

    match detect_cycles(&registry) {
        Err(PlanError::CyclicDependency { cycle }) => {
            assert!(cycle.contains(&"a".to_string()));
            assert!(cycle.contains(&"b".to_string()));
            Ok(())
        }
        Ok(()) => bail!("cycle was not detected"),
    }
}

#[test]
fn echoing_an_input_is_not_a_cycle() -> Result<()> {
    let mut registry = Registry::new();
    // The usual entity-resolver pattern: the id comes back out alongside
    // the attributes looked up from it.
    registry.register(producer(
        "account",
        &["account/id"],
        &["account/id", "account/display-name"],
    )?)?;

    detect_cycles(&registry)?;
    Ok(())
}
