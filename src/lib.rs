//! Derives pyannotate-style type comments from Python docstrings.
//!
//! Python sources are parsed statically into a [`reflect`] namespace, each
//! documented function and method is matched against its docstring in one of
//! the supported [`docstring`] dialects, and the result is a flat list of
//! [`ProbeRecord`]s ready to be written as `type_info.json`.

pub mod cli;
pub mod config;
pub mod docstring;
pub mod errors;
pub mod io;
pub mod observability;
pub mod probe;
pub mod reflect;

// Re-export commonly used types
pub use crate::docstring::{select, Dialect, ParserFn, TypeBinding};
pub use crate::errors::{Error, Result};
pub use crate::probe::{
    probe_class, probe_function, probe_module, MemberFilter, NamePolicy, ProbeOptions,
    ProbeRecord, Prober, RecordOrder,
};
pub use crate::reflect::{ModuleLoader, ModuleObject, ModuleRef, SourceLoader};
