//! Probing: turning documented callables into type-comment records.
//!
//! - [`function`]: the signature assembler for a single callable
//! - [`class`]: enumerates and probes the methods a class owns
//! - [`module`]: walks a module (and a package's submodules) and orders the
//!   aggregated records

pub mod class;
pub mod function;
pub mod module;

use crate::docstring::Dialect;
use serde::{Deserialize, Serialize};

pub use class::probe_class;
pub use function::{probe_function, type_comment};
pub use module::{probe_module, Prober};

/// Number of observations per probed callable.
pub const SAMPLES_PER_PROBE: u32 = 1;

/// One callable's signature in pyannotate's `type_info.json` shape.
///
/// Fields are declared in lexicographic order so serialized keys come out
/// sorted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeRecord {
    pub func_name: String,
    pub line: usize,
    pub path: String,
    pub samples: u32,
    pub type_comments: Vec<String>,
}

/// How methods are named in `func_name`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum NamePolicy {
    /// `ClassName.method`
    #[default]
    Qualified,
    /// `method`
    Bare,
}

/// Which class members are candidates for probing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum MemberFilter {
    /// Skip `_private` names, except `__init__`
    #[default]
    Privacy,
    /// Consider every name; only the defining-module check applies
    OriginOnly,
}

/// Final ordering of aggregated records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum RecordOrder {
    /// Group by file, top to bottom within each file
    #[default]
    PathLine,
    /// Line number only; suits a single in-memory module
    Line,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProbeOptions {
    pub dialect: Dialect,
    pub naming: NamePolicy,
    pub member_filter: MemberFilter,
    pub order: RecordOrder,
}

impl ProbeOptions {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            ..Self::default()
        }
    }

    pub fn with_naming(mut self, naming: NamePolicy) -> Self {
        self.naming = naming;
        self
    }

    pub fn with_member_filter(mut self, member_filter: MemberFilter) -> Self {
        self.member_filter = member_filter;
        self
    }

    pub fn with_order(mut self, order: RecordOrder) -> Self {
        self.order = order;
        self
    }
}
