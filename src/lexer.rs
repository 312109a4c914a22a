// Copyright (c) The Resolvent Authors.
// Licensed under the MIT License.

use core::fmt::{self, Debug, Formatter};
use core::iter::Peekable;
use core::str::CharIndices;
use std::rc::Rc;

use anyhow::{anyhow, bail, Result};

#[derive(Clone)]
struct SourceInternal {
    pub file: String,
    pub contents: String,
    pub lines: Vec<(u32, u32)>,
}

/// A piece of query text, with enough bookkeeping to render
/// line/column-annotated error messages.
#[derive(Clone)]
pub struct Source {
    src: Rc<SourceInternal>,
}

impl Debug for Source {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        self.src.file.fmt(f)
    }
}

impl Source {
    pub fn from_contents(file: String, contents: String) -> Result<Source> {
        let max_size = u32::MAX as usize - 2;
        if contents.len() > max_size {
            bail!("{file} exceeds maximum allowed query size {max_size}");
        }
        let mut lines = vec![];
        let mut start = 0u32;
        for (i, ch) in contents.char_indices() {
            if ch == '\n' {
                lines.push((start, i as u32));
                start = i as u32 + 1;
            }
        }
        if (start as usize) <= contents.len() {
            lines.push((start, contents.len() as u32));
        }
        Ok(Source {
            src: Rc::new(SourceInternal {
                file,
                contents,
                lines,
            }),
        })
    }

    pub fn new(contents: String) -> Result<Source> {
        Self::from_contents("<query>".to_string(), contents)
    }

    pub fn file(&self) -> &str {
        &self.src.file
    }

    pub fn contents(&self) -> &str {
        &self.src.contents
    }

    pub fn line(&self, idx: u32) -> &str {
        if let Some((start, end)) = self.src.lines.get(idx as usize) {
            &self.src.contents[*start as usize..*end as usize]
        } else {
            ""
        }
    }

    pub fn message(&self, line: u32, col: u32, kind: &str, msg: &str) -> String {
        if line as usize > self.src.lines.len() {
            return format!("{}: invalid line {} specified", self.src.file, line);
        }

        let line_str = format!("{line}");
        let line_num_width = line_str.len() + 1;
        let col_spaces = col as usize - 1;

        format!(
            "\n--> {}:{}:{}\n{:<line_num_width$}|\n\
		{:<line_num_width$}| {}\n\
		{:<line_num_width$}| {:<col_spaces$}^\n\
		{}: {}",
            self.src.file,
            line,
            col,
            "",
            line,
            self.line(line - 1),
            "",
            "",
            kind,
            msg
        )
    }

    pub fn error(&self, line: u32, col: u32, msg: &str) -> anyhow::Error {
        anyhow!(self.message(line, col, "error", msg))
    }
}

/// A region of query text, tagged with its token kind's position.
#[derive(Clone)]
pub struct Span {
    pub source: Source,
    pub line: u32,
    pub col: u32,
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub fn text(&self) -> &str {
        &self.source.contents()[self.start as usize..self.end as usize]
    }

    pub fn error(&self, msg: &str) -> anyhow::Error {
        self.source.error(self.line, self.col, msg)
    }
}

impl Debug for Span {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        f.write_fmt(format_args!(
            "{}:{}:{}, \"{}\"",
            self.source.file(),
            self.line,
            self.col,
            self.text()
        ))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    // One of `[ ] { }`.
    Symbol,
    // `:namespace/name`; the span text excludes the leading `:`.
    Keyword,
    Eof,
}

#[derive(Clone, Debug)]
pub struct Token(pub TokenKind, pub Span);

#[derive(Clone)]
pub struct Lexer<'source> {
    source: Source,
    iter: Peekable<CharIndices<'source>>,
    line: u32,
    col: u32,
}

impl<'source> Lexer<'source> {
    pub fn new(src: &'source Source) -> Self {
        Self {
            source: src.clone(),
            iter: src.contents().char_indices().peekable(),
            line: 1,
            col: 1,
        }
    }

    fn peek(&mut self) -> (usize, char) {
        match self.iter.peek() {
            Some((index, chr)) => (*index, *chr),
            _ => (self.source.contents().len(), '\x00'),
        }
    }

    fn advance(&mut self) {
        if let Some((_, chr)) = self.iter.next() {
            if chr == '\n' {
                self.line += 1;
                self.col = 1;
            } else {
                self.col += 1;
            }
        }
    }

    fn is_keyword_char(chr: char) -> bool {
        // EDN symbol characters, minus the ones the query grammar reserves.
        chr.is_alphanumeric() || "-_.*+!?<>=/".contains(chr)
    }

    fn read_keyword(&mut self) -> Result<Token> {
        let (line, col) = (self.line, self.col);
        // Consume the ':'.
        self.advance();
        let (start, _) = self.peek();
        loop {
            let (index, chr) = self.peek();
            if !Self::is_keyword_char(chr) {
                if index == start {
                    return Err(self.source.error(line, col, "expecting keyword after `:`"));
                }
                return Ok(Token(
                    TokenKind::Keyword,
                    Span {
                        source: self.source.clone(),
                        line,
                        col,
                        start: start as u32,
                        end: index as u32,
                    },
                ));
            }
            self.advance();
        }
    }

    pub fn next_token(&mut self) -> Result<Token> {
        loop {
            let (index, chr) = self.peek();
            match chr {
                // EDN treats comma as whitespace.
                ' ' | '\t' | '\r' | '\n' | ',' => self.advance(),
                ';' => {
                    // Comment extends to end of line.
                    while !matches!(self.peek().1, '\n' | '\x00') {
                        self.advance();
                    }
                }
                '\x00' => {
                    return Ok(Token(
                        TokenKind::Eof,
                        Span {
                            source: self.source.clone(),
                            line: self.line,
                            col: self.col,
                            start: index as u32,
                            end: index as u32,
                        },
                    ))
                }
                '[' | ']' | '{' | '}' => {
                    let (line, col) = (self.line, self.col);
                    self.advance();
                    return Ok(Token(
                        TokenKind::Symbol,
                        Span {
                            source: self.source.clone(),
                            line,
                            col,
                            start: index as u32,
                            end: index as u32 + 1,
                        },
                    ));
                }
                ':' => return self.read_keyword(),
                _ => {
                    return Err(self.source.error(
                        self.line,
                        self.col,
                        &format!("unexpected character `{chr}`"),
                    ))
                }
            }
        }
    }
}
