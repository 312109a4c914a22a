// Copyright (c) The Resolvent Authors.
// Licensed under the MIT License.

use crate::key::AttrKey;
use crate::lexer::Source;
use crate::parser::Parser;

use core::fmt;

use anyhow::Result;
use serde::Serialize;

/// One request in a query: either a scalar attribute or a join carrying a
/// nested query.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum QueryNode {
    Prop(AttrKey),
    Join { key: AttrKey, query: Query },
}

impl QueryNode {
    pub fn key(&self) -> &AttrKey {
        match self {
            QueryNode::Prop(key) => key,
            QueryNode::Join { key, .. } => key,
        }
    }
}

/// An ordered sequence of query nodes, written as an EDN vector:
/// `[:account/id {:account/friends [:account/display-name]}]`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Query {
    pub nodes: Vec<QueryNode>,
}

impl Query {
    pub fn new(nodes: Vec<QueryNode>) -> Self {
        Self { nodes }
    }

    /// Parse the EDN text form.
    pub fn parse(text: &str) -> Result<Query> {
        let source = Source::new(text.to_string())?;
        Parser::new(&source)?.parse_query()
    }

    /// Build a flat query of scalar requests.
    pub fn props(keys: &[&str]) -> Result<Query> {
        let mut nodes = vec![];
        for key in keys {
            nodes.push(QueryNode::Prop(key.parse()?));
        }
        Ok(Query { nodes })
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Keys requested at this level, joins included, placeholders excluded.
    pub fn requested_keys(&self) -> Vec<AttrKey> {
        self.nodes
            .iter()
            .map(QueryNode::key)
            .filter(|k| !k.is_placeholder())
            .cloned()
            .collect()
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("[")?;
        for (i, node) in self.nodes.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            match node {
                QueryNode::Prop(key) => write!(f, "{key}")?,
                QueryNode::Join { key, query } => write!(f, "{{{key} {query}}}")?,
            }
        }
        f.write_str("]")
    }
}
