// Copyright (c) The Resolvent Authors.
// Licensed under the MIT License.

use crate::key::AttrKey;
use crate::query::{Query, QueryNode};

use anyhow::Result;

#[test]
fn flat_query() -> Result<()> {
    let query = Query::parse("[:account/id :account/display-name]")?;
    assert_eq!(query.nodes.len(), 2);
    assert_eq!(
        query.nodes[0],
        QueryNode::Prop("account/id".parse::<AttrKey>()?)
    );
    Ok(())
}

#[test]
fn join_query() -> Result<()> {
    let query = Query::parse("[{:account/friends [:account/display-name]}]")?;
    match &query.nodes[0] {
        QueryNode::Join { key, query } => {
            assert_eq!(*key, "account/friends".parse::<AttrKey>()?);
            assert_eq!(query.nodes.len(), 1);
        }
        node => panic!("expected a join, got {node:?}"),
    }
    Ok(())
}

#[test]
fn joins_nest() -> Result<()> {
    let query = Query::parse(
        "[{:account/friends [{:account/address [:address/street]} :account/id]}]",
    )?;
    let QueryNode::Join { query: inner, .. } = &query.nodes[0] else {
        panic!("expected a join");
    };
    assert_eq!(inner.nodes.len(), 2);
    assert!(matches!(&inner.nodes[0], QueryNode::Join { .. }));
    Ok(())
}

#[test]
fn commas_and_comments_are_whitespace() -> Result<()> {
    let query = Query::parse(
        "[:account/id, ; the account\n :account/display-name]",
    )?;
    assert_eq!(query.nodes.len(), 2);
    Ok(())
}

#[test]
fn placeholder_keywords_parse() -> Result<()> {
    let query = Query::parse("[{:>/profile [:account/id]}]")?;
    let QueryNode::Join { key, .. } = &query.nodes[0] else {
        panic!("expected a join");
    };
    assert!(key.is_placeholder());
    assert_eq!(key.namespace(), ">");
    Ok(())
}

#[test]
fn display_round_trips() -> Result<()> {
    let text = "[:a/b {:c/d [:e/f {:>/g [:h/i]}]}]";
    let query = Query::parse(text)?;
    assert_eq!(query.to_string(), text);
    assert_eq!(Query::parse(&query.to_string())?, query);
    Ok(())
}

#[test]
fn empty_query_parses() -> Result<()> {
    assert!(Query::parse("[]")?.is_empty());
    Ok(())
}

#[test]
fn requested_keys_skip_placeholders() -> Result<()> {
    let query = Query::parse("[:a/b {:>/ph [:c/d]} {:e/f [:g/h]}]")?;
    let keys: Vec<AttrKey> = query.requested_keys();
    assert_eq!(keys.len(), 2);
    assert_eq!(keys[0], "a/b".parse::<AttrKey>()?);
    assert_eq!(keys[1], "e/f".parse::<AttrKey>()?);
    Ok(())
}

#[test]
fn unterminated_query_is_an_error() {
    assert!(Query::parse("[:a/b").is_err());
    assert!(Query::parse("[{:a/b [:c/d]").is_err());
}

#[test]
fn trailing_tokens_are_an_error() {
    assert!(Query::parse("[:a/b] :c/d").is_err());
    assert!(Query::parse("[:a/b]]").is_err());
}

#[test]
fn joins_have_exactly_one_entry() {
    assert!(Query::parse("{:a/b [:c/d]}").is_err());
    assert!(Query::parse("[{:a/b [:c/d] :e/f [:g/h]}]").is_err());
}

#[test]
fn keys_require_a_namespace() {
    assert!(Query::parse("[:id]").is_err());
    assert!(Query::parse("[:a/b/c]").is_err());
    assert!(Query::parse("[: ]").is_err());
}

#[test]
fn error_messages_carry_position() {
    let err = Query::parse("[:a/b\n  4]").expect_err("digit is not a query token");
    let msg = format!("{err}");
    assert!(msg.contains("<query>:2:3"), "unexpected message: {msg}");
}
