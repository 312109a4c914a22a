// Copyright (c) The Resolvent Authors.
// Licensed under the MIT License.

use crate::key::AttrKey;
use crate::lexer::{Lexer, Source, Token, TokenKind};
use crate::query::{Query, QueryNode};

use anyhow::Result;

#[derive(Clone)]
pub struct Parser<'source> {
    source: Source,
    lexer: Lexer<'source>,
    tok: Token,
}

impl<'source> Parser<'source> {
    pub fn new(source: &'source Source) -> Result<Self> {
        let mut lexer = Lexer::new(source);
        let tok = lexer.next_token()?;
        Ok(Self {
            source: source.clone(),
            lexer,
            tok,
        })
    }

    fn token_text(&self) -> &str {
        self.tok.1.text()
    }

    fn next_token(&mut self) -> Result<()> {
        self.tok = self.lexer.next_token()?;
        Ok(())
    }

    fn expect(&mut self, text: &str, context: &str) -> Result<()> {
        if self.tok.0 == TokenKind::Symbol && self.token_text() == text {
            self.next_token()
        } else {
            let msg = format!("expecting `{text}` {context}");
            Err(self.source.error(self.tok.1.line, self.tok.1.col, &msg))
        }
    }

    /// Parse a complete query vector and require that nothing follows it.
    pub fn parse_query(&mut self) -> Result<Query> {
        let query = self.parse_query_vector()?;
        if self.tok.0 != TokenKind::Eof {
            return Err(self.tok.1.error("expecting end of query"));
        }
        Ok(query)
    }

    fn parse_query_vector(&mut self) -> Result<Query> {
        self.expect("[", "to begin query")?;
        let mut nodes = vec![];
        loop {
            match self.tok.0 {
                TokenKind::Symbol if self.token_text() == "]" => {
                    self.next_token()?;
                    return Ok(Query::new(nodes));
                }
                TokenKind::Symbol if self.token_text() == "{" => {
                    nodes.push(self.parse_join()?);
                }
                TokenKind::Keyword => {
                    nodes.push(QueryNode::Prop(self.parse_key()?));
                }
                _ => {
                    return Err(self
                        .tok
                        .1
                        .error("expecting keyword, join or `]` in query"))
                }
            }
        }
    }

    fn parse_join(&mut self) -> Result<QueryNode> {
        self.expect("{", "to begin join")?;
        let key = self.parse_key()?;
        let query = self.parse_query_vector()?;
        self.expect("}", "to end join; a join has exactly one entry")?;
        Ok(QueryNode::Join { key, query })
    }

    fn parse_key(&mut self) -> Result<AttrKey> {
        if self.tok.0 != TokenKind::Keyword {
            return Err(self.tok.1.error("expecting keyword"));
        }
        let key = AttrKey::new(self.token_text()).map_err(|e| self.tok.1.error(&e.to_string()))?;
        self.next_token()?;
        Ok(key)
    }
}
