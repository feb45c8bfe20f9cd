//! Docstring dialects and the type bindings they produce.
//!
//! A dialect parser is a pure function from raw docstring text to an ordered
//! list of [`TypeBinding`]s. Parsers never fail: a docstring without the
//! expected structure simply yields fewer (or no) bindings.

pub mod gensim;
pub mod normalize;
pub mod sphinx;

use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A parsed `(parameter, type)` pair. `name == None` marks the return type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeBinding {
    pub name: Option<String>,
    pub type_name: String,
    pub optional: bool,
}

impl TypeBinding {
    pub fn param(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            type_name: type_name.into(),
            optional: false,
        }
    }

    pub fn optional_param(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            optional: true,
            ..Self::param(name, type_name)
        }
    }

    pub fn returns(type_name: impl Into<String>) -> Self {
        Self {
            name: None,
            type_name: type_name.into(),
            optional: false,
        }
    }

    pub fn is_return(&self) -> bool {
        self.name.is_none()
    }

    /// The type as it appears in a type comment.
    pub fn rendered(&self) -> String {
        if self.optional {
            format!("Optional[{}]", self.type_name)
        } else {
            self.type_name.clone()
        }
    }
}

/// Signature shared by every dialect parser.
pub type ParserFn = fn(&str) -> Vec<TypeBinding>;

/// Supported docstring conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// `:param type name:` / `:rtype: type` field lists
    #[default]
    Sphinx,
    /// numpy-style `Parameters` tables as used by gensim
    Gensim,
}

impl Dialect {
    pub fn parser(self) -> ParserFn {
        match self {
            Dialect::Sphinx => sphinx::parse,
            Dialect::Gensim => gensim::parse,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Dialect::Sphinx => "sphinx",
            Dialect::Gensim => "gensim",
        }
    }
}

impl FromStr for Dialect {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sphinx" => Ok(Dialect::Sphinx),
            "gensim" => Ok(Dialect::Gensim),
            other => Err(Error::UnsupportedDialect(other.to_string())),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Look up the parser for a dialect identifier.
pub fn select(dialect_name: &str) -> Result<ParserFn> {
    dialect_name.parse::<Dialect>().map(Dialect::parser)
}
