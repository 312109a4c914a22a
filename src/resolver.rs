// Copyright (c) The Resolvent Authors.
// Licensed under the MIT License.

use crate::context::Context;
use crate::key::AttrKey;
use crate::value::Value;

use core::fmt;
use std::collections::BTreeMap;
use std::rc::Rc;

use anyhow::{bail, Result};

/// The partial context produced by one resolver invocation. An empty
/// output means "no data found" and lets the next candidate run; hard
/// failures are `Err`.
pub type Output = BTreeMap<AttrKey, Value>;

/// Build an [`Output`] from `(key, value)` pairs.
pub fn output<'a, I>(pairs: I) -> Result<Output>
where
    I: IntoIterator<Item = (&'a str, Value)>,
{
    let mut out = Output::new();
    for (key, value) in pairs {
        out.insert(key.parse()?, value);
    }
    Ok(out)
}

type ResolveFcn = Rc<dyn Fn(&Context) -> Result<Output>>;

/// A unit of computation: declared inputs, declared outputs, and a pure
/// function from an input context to a partial context.
///
/// The engine guarantees a resolver is only invoked once every declared
/// input is present, and only ever with a context scoped to those inputs.
/// In return the resolver may only write its declared outputs.
#[derive(Clone)]
pub struct Resolver {
    name: Rc<str>,
    inputs: Vec<AttrKey>,
    outputs: Vec<AttrKey>,
    fcn: ResolveFcn,
}

impl Resolver {
    pub fn new(
        name: &str,
        inputs: &[&str],
        outputs: &[&str],
        fcn: impl Fn(&Context) -> Result<Output> + 'static,
    ) -> Result<Resolver> {
        let mut input_keys = vec![];
        for key in inputs {
            input_keys.push(key.parse()?);
        }
        let mut output_keys = vec![];
        for key in outputs {
            output_keys.push(key.parse()?);
        }
        Ok(Resolver {
            name: name.into(),
            inputs: input_keys,
            outputs: output_keys,
            fcn: Rc::new(fcn),
        })
    }

    /// A resolver that always produces `key = value` from no inputs.
    pub fn constant(name: &str, key: &str, value: Value) -> Result<Resolver> {
        let attr: AttrKey = key.parse()?;
        let out = attr.clone();
        Resolver::new(name, &[], &[key], move |_| {
            let mut m = Output::new();
            m.insert(out.clone(), value.clone());
            Ok(m)
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inputs(&self) -> &[AttrKey] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[AttrKey] {
        &self.outputs
    }

    /// Run the resolver against an input-scoped context.
    /// Outputs not declared up front are rejected.
    pub fn invoke(&self, inputs: &Context) -> Result<Output> {
        let out = (self.fcn)(inputs)?;
        for key in out.keys() {
            if !self.outputs.contains(key) {
                bail!(
                    "resolver `{}` produced undeclared output {key}",
                    self.name
                );
            }
        }
        Ok(out)
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("name", &self.name)
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .finish()
    }
}
