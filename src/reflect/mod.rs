//! Static reflection over Python modules.
//!
//! The probers never look at syntax directly. They walk a namespace made of
//! [`ModuleObject`], [`ClassObject`] and [`FunctionObject`] values, which
//! answers the same questions runtime introspection would: which names are
//! visible, what each one is bound to, where it was defined, and which
//! positional parameters a callable declares.
//!
//! Namespaces come from a [`ModuleLoader`](loader::ModuleLoader). The
//! production loader builds them from source with tree-sitter
//! ([`builder`]); tests construct them by hand.

pub mod builder;
pub mod loader;
pub mod parser;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use loader::{resolve_import, ModuleLoader, ModuleRef, SourceLoader};

/// Failure to resolve a single attribute. Always recoverable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReflectError {
    #[error("attribute {0:?} does not exist")]
    Missing(String),

    #[error("attribute {name:?} is only available at runtime: {reason}")]
    Deferred { name: String, reason: String },
}

/// How a callable receives its implicit first argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CallableKind {
    /// Module-level function
    #[default]
    Function,
    /// Method bound to an instance (`self`)
    InstanceMethod,
    /// `@classmethod`, bound to the class (`cls`)
    ClassMethod,
    /// `@staticmethod`, no receiver
    StaticMethod,
}

impl CallableKind {
    /// Number of leading positional parameters filled in implicitly.
    pub fn receiver_count(self) -> usize {
        match self {
            CallableKind::InstanceMethod | CallableKind::ClassMethod => 1,
            CallableKind::Function | CallableKind::StaticMethod => 0,
        }
    }
}

/// A `def`, as seen through its code object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionObject {
    pub name: String,
    /// Name of the module the `def` lives in
    pub module: String,
    pub path: PathBuf,
    /// 1-based line of the definition (first decorator, if decorated)
    pub line: usize,
    /// Declared positional parameters, receiver included
    pub params: Vec<String>,
    pub kind: CallableKind,
    pub docstring: Option<String>,
}

impl FunctionObject {
    pub fn new(
        name: impl Into<String>,
        module: impl Into<String>,
        path: impl Into<PathBuf>,
        line: usize,
    ) -> Self {
        Self {
            name: name.into(),
            module: module.into(),
            path: path.into(),
            line,
            params: Vec::new(),
            kind: CallableKind::Function,
            docstring: None,
        }
    }

    pub fn with_params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params = params.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_kind(mut self, kind: CallableKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_docstring(mut self, docstring: impl Into<String>) -> Self {
        self.docstring = Some(docstring.into());
        self
    }

    /// Positional parameters a caller supplies explicitly.
    pub fn explicit_params(&self) -> &[String] {
        let skip = self.kind.receiver_count().min(self.params.len());
        &self.params[skip..]
    }

    /// The docstring, if it has any non-whitespace content.
    pub fn documentation(&self) -> Option<&str> {
        self.docstring
            .as_deref()
            .filter(|doc| !doc.trim().is_empty())
    }
}

/// What a name is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Object {
    Function(FunctionObject),
    Class(ClassObject),
    /// A `@property`; the getter is kept but never probed
    Property(FunctionObject),
    /// A name bound by `import`; `target` is the imported dotted path
    Import { target: String },
    /// Any other value
    Value,
}

impl Object {
    pub fn as_function(&self) -> Option<&FunctionObject> {
        match self {
            Object::Function(func) => Some(func),
            _ => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Object::Function(_) => "function",
            Object::Class(_) => "class",
            Object::Property(_) => "property",
            Object::Import { .. } => "import",
            Object::Value => "value",
        }
    }
}

/// A class attribute as resolution would see it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberSlot {
    Resolved(Object),
    /// Resolution raises; the reason explains why
    Deferred(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassObject {
    pub name: String,
    pub module: String,
    pub path: PathBuf,
    pub line: usize,
    /// Own and inherited members, keyed by attribute name
    pub members: BTreeMap<String, MemberSlot>,
}

impl ClassObject {
    pub fn new(
        name: impl Into<String>,
        module: impl Into<String>,
        path: impl Into<PathBuf>,
        line: usize,
    ) -> Self {
        Self {
            name: name.into(),
            module: module.into(),
            path: path.into(),
            line,
            members: BTreeMap::new(),
        }
    }

    pub fn with_member(mut self, name: impl Into<String>, object: Object) -> Self {
        self.members.insert(name.into(), MemberSlot::Resolved(object));
        self
    }

    pub fn with_deferred(mut self, name: impl Into<String>, reason: impl Into<String>) -> Self {
        self.members
            .insert(name.into(), MemberSlot::Deferred(reason.into()));
        self
    }

    /// Attribute names in `dir()` order.
    pub fn member_names(&self) -> impl Iterator<Item = &str> {
        self.members.keys().map(String::as_str)
    }

    pub fn resolve(&self, name: &str) -> Result<&Object, ReflectError> {
        match self.members.get(name) {
            Some(MemberSlot::Resolved(object)) => Ok(object),
            Some(MemberSlot::Deferred(reason)) => Err(ReflectError::Deferred {
                name: name.to_string(),
                reason: reason.clone(),
            }),
            None => Err(ReflectError::Missing(name.to_string())),
        }
    }
}

/// A loaded module namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleObject {
    pub name: String,
    pub path: PathBuf,
    /// Directory holding child modules, when this module is a package
    pub package_dir: Option<PathBuf>,
    pub members: BTreeMap<String, Object>,
}

impl ModuleObject {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            package_dir: None,
            members: BTreeMap::new(),
        }
    }

    pub fn with_package_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.package_dir = Some(dir.into());
        self
    }

    pub fn with_member(mut self, name: impl Into<String>, object: Object) -> Self {
        self.members.insert(name.into(), object);
        self
    }

    pub fn is_package(&self) -> bool {
        self.package_dir.is_some()
    }

    /// Whether `path` is this module's own source file.
    pub fn defines(&self, path: &Path) -> bool {
        self.path == path
    }

    /// Visible names with their bindings, in `dir()` order.
    pub fn members(&self) -> impl Iterator<Item = (&str, &Object)> {
        self.members.iter().map(|(name, obj)| (name.as_str(), obj))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_receiver_count_by_kind() {
        assert_eq!(CallableKind::Function.receiver_count(), 0);
        assert_eq!(CallableKind::StaticMethod.receiver_count(), 0);
        assert_eq!(CallableKind::InstanceMethod.receiver_count(), 1);
        assert_eq!(CallableKind::ClassMethod.receiver_count(), 1);
    }

    #[test]
    fn test_explicit_params_skip_receiver_regardless_of_name() {
        let method = FunctionObject::new("bark", "dogs", "dogs.py", 3)
            .with_params(["this", "language"])
            .with_kind(CallableKind::InstanceMethod);
        assert_eq!(method.explicit_params(), ["language".to_string()]);

        let broken = FunctionObject::new("odd", "dogs", "dogs.py", 9)
            .with_kind(CallableKind::InstanceMethod);
        assert!(broken.explicit_params().is_empty());
    }

    #[test]
    fn test_documentation_ignores_blank_docstrings() {
        let func = FunctionObject::new("f", "m", "m.py", 1).with_docstring("  \n\t");
        assert_eq!(func.documentation(), None);
    }

    #[test]
    fn test_class_resolve_reports_deferred_and_missing() {
        let class = ClassObject::new("Document", "models", "models.py", 1)
            .with_member("save", Object::Value)
            .with_deferred("objects", "requires a database connection");

        assert_eq!(class.resolve("save"), Ok(&Object::Value));
        assert!(matches!(
            class.resolve("objects"),
            Err(ReflectError::Deferred { .. })
        ));
        assert_eq!(
            class.resolve("nope"),
            Err(ReflectError::Missing("nope".to_string()))
        );
        assert_eq!(class.member_names().collect::<Vec<_>>(), ["objects", "save"]);
    }
}
