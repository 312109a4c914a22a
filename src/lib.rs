// Copyright (c) The Resolvent Authors.
// Licensed under the MIT License.

// Use README.md as crate documentation.
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/README.md"))]

mod context;
mod engine;
mod executor;
mod key;
mod lexer;
mod number;
mod parser;
mod planner;
mod query;
mod registry;
mod resolver;
mod value;

pub use context::Context;
pub use engine::Engine;
pub use executor::{CancelFlag, Diagnostic, DiagnosticKind, ExecutionResult};
pub use key::{AttrKey, PLACEHOLDER_NS};
pub use number::Number;
pub use planner::{Plan, PlanError, Stage};
pub use query::{Query, QueryNode};
pub use registry::{DuplicatePolicy, Registry, RegistryError};
pub use resolver::{output, Output, Resolver};
pub use value::Value;

/// Items in `unstable` are likely to change.
pub mod unstable {
    pub use crate::lexer::*;
    pub use crate::parser::*;
    pub use crate::planner::{detect_cycles, plan};
}
