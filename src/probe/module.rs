//! Module prober.

use super::class::probe_class;
use super::function::probe_function;
use super::{ProbeOptions, ProbeRecord, RecordOrder};
use crate::docstring::Dialect;
use crate::errors::Result;
use crate::reflect::{resolve_import, ModuleLoader, ModuleObject, ModuleRef, Object, SourceLoader};
use std::borrow::Cow;
use tracing::{debug, debug_span, trace};

/// Probes modules resolved through a [`ModuleLoader`].
pub struct Prober<L> {
    loader: L,
    options: ProbeOptions,
}

impl<L: ModuleLoader> Prober<L> {
    pub fn new(loader: L, options: ProbeOptions) -> Self {
        Self { loader, options }
    }

    /// Resolve `module_ref`, probe it (recursing into submodules of a
    /// package), and return the records in final order.
    ///
    /// Load failures abort the whole pass.
    pub fn probe_module(&self, module_ref: ModuleRef) -> Result<Vec<ProbeRecord>> {
        let module = module_ref.resolve(&self.loader)?;
        let mut records = Vec::new();
        self.collect_module(&module, &mut records)?;
        sort_records(&mut records, self.options.order);
        Ok(records)
    }

    fn collect_module(&self, module: &ModuleObject, records: &mut Vec<ProbeRecord>) -> Result<()> {
        let _span = debug_span!("probe_module", module = %module.name).entered();
        let before = records.len();

        records.extend(self.probe_members(module)?);

        // Only declared children are visited, never attribute references, so
        // this terminates for any package tree.
        for submodule in self.loader.submodules(module)? {
            self.collect_module(&submodule, records)?;
        }

        debug!(records = records.len() - before, "Module probed");
        Ok(())
    }

    /// Probe the functions and classes visible on a single module, including
    /// names it imports from elsewhere.
    fn probe_members(&self, module: &ModuleObject) -> Result<Vec<ProbeRecord>> {
        let parser = self.options.dialect.parser();
        let mut records = Vec::new();

        for (name, object) in module.members() {
            let object = match object {
                Object::Import { target } => {
                    match resolve_import(&self.loader, module, target)? {
                        Some(imported) => Cow::Owned(imported),
                        None => continue,
                    }
                }
                local => Cow::Borrowed(local),
            };

            match object.as_ref() {
                Object::Function(func) if module.defines(&func.path) => {
                    records.extend(probe_function(func, parser, None));
                }
                Object::Function(func) => {
                    trace!(member = name, defined_in = %func.path.display(), "Skipping re-exported function");
                }
                Object::Class(class) => records.extend(probe_class(class, &self.options)),
                _ => {}
            }
        }

        Ok(records)
    }
}

fn sort_records(records: &mut [ProbeRecord], order: RecordOrder) {
    match order {
        RecordOrder::PathLine => {
            records.sort_by(|a, b| a.path.cmp(&b.path).then(a.line.cmp(&b.line)))
        }
        RecordOrder::Line => records.sort_by_key(|r| r.line),
    }
}

/// Probe `module_ref` with default options, resolving imports against the
/// current directory.
pub fn probe_module(module_ref: ModuleRef, dialect: Dialect) -> Result<Vec<ProbeRecord>> {
    Prober::new(SourceLoader::from_current_dir(), ProbeOptions::new(dialect)).probe_module(module_ref)
}
