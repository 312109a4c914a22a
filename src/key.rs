// Copyright (c) The Resolvent Authors.
// Licensed under the MIT License.

use core::fmt;
use std::rc::Rc;
use std::str::FromStr;

use anyhow::{bail, Result};
use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// Namespace reserved for placeholder keys. Placeholders are virtual,
/// non-persisted keys used purely to reshape the result tree; the
/// registry is never consulted for them.
pub const PLACEHOLDER_NS: &str = ">";

/// A globally unique, namespaced attribute identifier such as
/// `account/display-name`, written `:account/display-name` in query text.
///
/// Keys are compared by text. The namespace is mandatory: a key must name
/// exactly what it belongs to, and must never be reused for both a global
/// and a contextual meaning.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AttrKey {
    text: Rc<str>,
    // Byte offset of the '/' separating namespace from name.
    slash: usize,
}

impl AttrKey {
    pub fn new(text: &str) -> Result<AttrKey> {
        let Some(slash) = text.find('/') else {
            bail!("attribute key `{text}` has no namespace; expected `namespace/name`");
        };
        if slash == 0 {
            bail!("attribute key `{text}` has an empty namespace");
        }
        if slash + 1 == text.len() {
            bail!("attribute key `{text}` has an empty name");
        }
        if text[slash + 1..].contains('/') {
            bail!("attribute key `{text}` has more than one `/`");
        }
        if text.chars().any(char::is_whitespace) {
            bail!("attribute key `{text}` contains whitespace");
        }
        Ok(AttrKey {
            text: text.into(),
            slash,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn namespace(&self) -> &str {
        &self.text[..self.slash]
    }

    pub fn name(&self) -> &str {
        &self.text[self.slash + 1..]
    }

    pub fn is_placeholder(&self) -> bool {
        self.namespace().starts_with(PLACEHOLDER_NS)
    }
}

impl FromStr for AttrKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        AttrKey::new(s.strip_prefix(':').unwrap_or(s))
    }
}

impl fmt::Display for AttrKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, ":{}", self.text)
    }
}

impl fmt::Debug for AttrKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl Serialize for AttrKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.text)
    }
}

impl<'de> Deserialize<'de> for AttrKey {
    fn deserialize<D>(deserializer: D) -> Result<AttrKey, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        AttrKey::new(&s).map_err(de::Error::custom)
    }
}
