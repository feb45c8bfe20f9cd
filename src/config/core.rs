use crate::docstring::Dialect;
use crate::errors::Result;
use crate::probe::{MemberFilter, NamePolicy, ProbeOptions, RecordOrder};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = ".docprobe.toml";

/// Root configuration structure for docprobe.
///
/// Every field is optional so that layers (file, then command line) can be
/// merged field by field.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ProbeConfig {
    /// Docstring dialect identifier (`sphinx` or `gensim`)
    #[serde(default)]
    pub dialect: Option<String>,

    /// Method naming policy in `func_name`
    #[serde(default)]
    pub naming: Option<NamePolicy>,

    /// Class member filter policy
    #[serde(default)]
    pub member_filter: Option<MemberFilter>,

    /// Final record ordering
    #[serde(default)]
    pub order: Option<RecordOrder>,

    /// Roots searched when resolving dotted module names
    #[serde(default)]
    pub search_paths: Option<Vec<PathBuf>>,
}

impl ProbeConfig {
    /// Layer `overrides` on top of `self`; set fields in `overrides` win.
    pub fn merge(self, overrides: ProbeConfig) -> ProbeConfig {
        ProbeConfig {
            dialect: overrides.dialect.or(self.dialect),
            naming: overrides.naming.or(self.naming),
            member_filter: overrides.member_filter.or(self.member_filter),
            order: overrides.order.or(self.order),
            search_paths: overrides.search_paths.or(self.search_paths),
        }
    }

    /// Resolve relative search paths against the directory of the config file.
    pub fn anchored_at(mut self, base: &Path) -> ProbeConfig {
        if let Some(paths) = self.search_paths.as_mut() {
            for path in paths.iter_mut().filter(|p| p.is_relative()) {
                *path = base.join(&*path);
            }
        }
        self
    }

    /// Build prober options, validating the dialect identifier.
    pub fn probe_options(&self) -> Result<ProbeOptions> {
        let dialect = match self.dialect.as_deref() {
            Some(name) => name.parse::<Dialect>()?,
            None => Dialect::default(),
        };
        Ok(ProbeOptions {
            dialect,
            naming: self.naming.unwrap_or_default(),
            member_filter: self.member_filter.unwrap_or_default(),
            order: self.order.unwrap_or_default(),
        })
    }

    /// Configured search roots, or the current directory.
    pub fn search_paths_or_default(&self) -> Vec<PathBuf> {
        self.search_paths
            .clone()
            .filter(|paths| !paths.is_empty())
            .unwrap_or_else(|| vec![PathBuf::from(".")])
    }
}
