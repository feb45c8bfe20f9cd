//! Module loading: the one place that touches the file system.
//!
//! [`ModuleLoader`] is the seam between probing and I/O. The probers only
//! ever ask a loader for namespaces, so tests substitute an in-memory loader
//! and never read files.

use super::builder::build_module;
use super::{ModuleObject, Object};
use crate::errors::{Error, Result};
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, trace};
use walkdir::WalkDir;

const PACKAGE_INIT: &str = "__init__.py";
const SOURCE_EXTENSION: &str = "py";
/// Longest chain of re-exports followed for one imported name.
const MAX_IMPORT_HOPS: usize = 8;

/// Source of module namespaces.
pub trait ModuleLoader {
    /// Resolve a dotted module path such as `package.sub`.
    fn import(&self, dotted: &str) -> Result<ModuleObject>;

    /// Load a single source file under a fresh synthetic module name.
    fn load_file(&self, path: &Path) -> Result<ModuleObject>;

    /// Load every immediate child module of a package, sorted by name.
    /// Returns nothing for plain modules.
    fn submodules(&self, package: &ModuleObject) -> Result<Vec<ModuleObject>>;
}

/// What the caller wants probed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleRef {
    Loaded(ModuleObject),
    Dotted(String),
    File(PathBuf),
}

impl ModuleRef {
    /// Interpret a command-line argument: anything that looks like a path
    /// (a `.py` suffix or a path separator) is a file, the rest are dotted
    /// module names.
    pub fn parse(reference: &str) -> Self {
        let looks_like_path = reference.ends_with(".py")
            || reference.contains('/')
            || reference.contains(std::path::MAIN_SEPARATOR);
        if looks_like_path {
            ModuleRef::File(PathBuf::from(reference))
        } else {
            ModuleRef::Dotted(reference.to_string())
        }
    }

    pub fn resolve(self, loader: &dyn ModuleLoader) -> Result<ModuleObject> {
        match self {
            ModuleRef::Loaded(module) => Ok(module),
            ModuleRef::Dotted(dotted) => loader.import(&dotted),
            ModuleRef::File(path) => loader.load_file(&path),
        }
    }
}

impl From<ModuleObject> for ModuleRef {
    fn from(module: ModuleObject) -> Self {
        ModuleRef::Loaded(module)
    }
}

/// What an imported name in `importer` is bound to, following re-exports
/// through intermediate modules.
///
/// `target` is an [`Object::Import`] target such as `pkg.mod.Name` or
/// `..sibling.Name`. Returns `None` for whole-module imports, for modules
/// outside the loader's reach and for names the module does not bind. Any
/// other load failure is propagated.
pub fn resolve_import(
    loader: &dyn ModuleLoader,
    importer: &ModuleObject,
    target: &str,
) -> Result<Option<Object>> {
    let mut package = package_of(importer);
    let mut target = target.to_string();

    for _ in 0..MAX_IMPORT_HOPS {
        let Some(absolute) = absolute_import(package.as_deref(), &target) else {
            return Ok(None);
        };
        let Some((module_name, attribute)) = absolute.rsplit_once('.') else {
            return Ok(None);
        };

        let module = match loader.import(module_name) {
            Ok(module) => module,
            Err(Error::ModuleNotFound { .. }) => {
                trace!(import = %absolute, "Imported module is not on the search path");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        target = match module.members.get(attribute) {
            Some(Object::Import { target }) => target.clone(),
            Some(object) => return Ok(Some(object.clone())),
            None => return Ok(None),
        };
        package = package_of(&module);
    }

    trace!(import = %target, "Gave up following re-exports");
    Ok(None)
}

/// The package relative imports in `module` are anchored at.
fn package_of(module: &ModuleObject) -> Option<String> {
    if module.is_package() {
        return Some(module.name.clone());
    }
    module
        .name
        .rsplit_once('.')
        .map(|(parent, _)| parent.to_string())
}

/// Turn a possibly relative import target into an absolute dotted path.
fn absolute_import(package: Option<&str>, target: &str) -> Option<String> {
    let rest = target.trim_start_matches('.');
    let dots = target.len() - rest.len();
    if dots == 0 {
        return Some(rest.to_string());
    }

    let mut base = package?;
    for _ in 1..dots {
        base = base.rsplit_once('.')?.0;
    }
    if rest.is_empty() {
        Some(base.to_string())
    } else {
        Some(format!("{base}.{rest}"))
    }
}

static SYNTHETIC_MODULES: AtomicUsize = AtomicUsize::new(0);

/// A throwaway module name that no other load in this process shares.
fn synthetic_module_name() -> String {
    let n = SYNTHETIC_MODULES.fetch_add(1, Ordering::Relaxed);
    format!("__docprobe_{n}__")
}

/// Loads modules by parsing Python source found under a set of search roots.
#[derive(Debug, Clone)]
pub struct SourceLoader {
    search_paths: Vec<PathBuf>,
}

impl SourceLoader {
    pub fn new(search_paths: Vec<PathBuf>) -> Self {
        Self { search_paths }
    }

    /// Search only the current directory.
    pub fn from_current_dir() -> Self {
        Self::new(vec![PathBuf::from(".")])
    }

    /// The file backing a dotted module under `root`, and the package
    /// directory when it is a package.
    fn locate(root: &Path, dotted: &str) -> Option<(PathBuf, Option<PathBuf>)> {
        let relative: PathBuf = dotted.split('.').collect();
        let dir = root.join(&relative);

        let init = dir.join(PACKAGE_INIT);
        if init.is_file() {
            return Some((init, Some(dir)));
        }
        let file = dir.with_extension(SOURCE_EXTENSION);
        file.is_file().then_some((file, None))
    }

    fn load(&self, name: &str, path: &Path, package_dir: Option<PathBuf>) -> Result<ModuleObject> {
        let source = fs::read_to_string(path)
            .map_err(|e| Error::file_system("Failed to read module source", path, e))?;
        debug!(module = name, path = %path.display(), bytes = source.len(), "Loading module");
        build_module(name, path, &source, package_dir)
    }
}

impl Default for SourceLoader {
    fn default() -> Self {
        Self::from_current_dir()
    }
}

impl ModuleLoader for SourceLoader {
    fn import(&self, dotted: &str) -> Result<ModuleObject> {
        let valid = !dotted.is_empty()
            && dotted
                .split('.')
                .all(|part| !part.is_empty() && part.chars().all(|c| c.is_alphanumeric() || c == '_'));
        let found = valid
            .then(|| {
                self.search_paths
                    .iter()
                    .find_map(|root| Self::locate(root, dotted))
            })
            .flatten();

        match found {
            Some((path, package_dir)) => self.load(dotted, &path, package_dir),
            None => Err(Error::ModuleNotFound {
                module: dotted.to_string(),
                searched: self.search_paths.clone(),
            }),
        }
    }

    fn load_file(&self, path: &Path) -> Result<ModuleObject> {
        let package_dir = (path.file_name() == Some(OsStr::new(PACKAGE_INIT)))
            .then(|| path.parent().map(Path::to_path_buf))
            .flatten();
        self.load(&synthetic_module_name(), path, package_dir)
    }

    fn submodules(&self, package: &ModuleObject) -> Result<Vec<ModuleObject>> {
        let Some(dir) = package.package_dir.as_deref() else {
            return Ok(Vec::new());
        };

        let mut children = Vec::new();
        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(dir).to_path_buf();
                let source = e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("directory walk failed"));
                Error::file_system("Failed to list package directory", path, source)
            })?;
            let path = entry.path();
            let file_type = entry.file_type();

            // Symlinks are not followed, so a package can never contain itself.
            let child = if file_type.is_dir() && path.join(PACKAGE_INIT).is_file() {
                Some((path.join(PACKAGE_INIT), Some(path.to_path_buf())))
            } else if file_type.is_file()
                && path.extension() == Some(OsStr::new(SOURCE_EXTENSION))
                && entry.file_name() != OsStr::new(PACKAGE_INIT)
            {
                Some((path.to_path_buf(), None))
            } else {
                None
            };

            if let Some((file, package_dir)) = child {
                let stem = match path.file_stem().and_then(|s| s.to_str()) {
                    Some(stem) => stem,
                    None => continue,
                };
                let name = format!("{}.{}", package.name, stem);
                trace!(submodule = %name, "Discovered submodule");
                children.push(self.load(&name, &file, package_dir)?);
            }
        }

        Ok(children)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, contents: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_module_ref_parse() {
        assert_eq!(
            ModuleRef::parse("pkg.sub"),
            ModuleRef::Dotted("pkg.sub".to_string())
        );
        assert_eq!(
            ModuleRef::parse("example.py"),
            ModuleRef::File(PathBuf::from("example.py"))
        );
        assert_eq!(
            ModuleRef::parse("src/pkg/mod"),
            ModuleRef::File(PathBuf::from("src/pkg/mod"))
        );
    }

    #[test]
    fn test_import_module_and_package() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "pkg/__init__.py", "");
        write(tmp.path(), "pkg/leaf.py", "def f():\n    pass\n");
        let loader = SourceLoader::new(vec![tmp.path().to_path_buf()]);

        let package = loader.import("pkg").unwrap();
        assert_eq!(package.name, "pkg");
        assert_eq!(package.path, tmp.path().join("pkg/__init__.py"));
        assert!(package.is_package());

        let leaf = loader.import("pkg.leaf").unwrap();
        assert!(!leaf.is_package());
        assert!(leaf.members.contains_key("f"));
    }

    #[test]
    fn test_import_searches_roots_in_order() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        write(second.path(), "only_here.py", "X = 1\n");
        let loader = SourceLoader::new(vec![
            first.path().to_path_buf(),
            second.path().to_path_buf(),
        ]);

        let module = loader.import("only_here").unwrap();
        assert_eq!(module.path, second.path().join("only_here.py"));
    }

    #[test]
    fn test_import_missing_module() {
        let tmp = TempDir::new().unwrap();
        let loader = SourceLoader::new(vec![tmp.path().to_path_buf()]);
        assert!(matches!(
            loader.import("nope"),
            Err(Error::ModuleNotFound { .. })
        ));
        assert!(matches!(
            loader.import("../escape"),
            Err(Error::ModuleNotFound { .. })
        ));
    }

    #[test]
    fn test_load_file_uses_unique_synthetic_names() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "script.py", "def f():\n    pass\n");
        let loader = SourceLoader::default();

        let a = loader.load_file(&tmp.path().join("script.py")).unwrap();
        let b = loader.load_file(&tmp.path().join("script.py")).unwrap();
        assert_ne!(a.name, b.name);
        assert!(a.name.starts_with("__docprobe_"));
        assert_eq!(a.members["f"].as_function().unwrap().module, a.name);
    }

    #[test]
    fn test_load_missing_file_is_fatal() {
        let loader = SourceLoader::default();
        let err = loader.load_file(Path::new("/definitely/not/here.py")).unwrap_err();
        assert!(matches!(err, Error::FileSystem { .. }));
    }

    #[test]
    fn test_submodules_lists_direct_children_sorted() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "pkg/__init__.py", "");
        write(tmp.path(), "pkg/zeta.py", "");
        write(tmp.path(), "pkg/alpha.py", "");
        write(tmp.path(), "pkg/notes.txt", "");
        write(tmp.path(), "pkg/nested/__init__.py", "");
        write(tmp.path(), "pkg/nested/deep.py", "");
        write(tmp.path(), "pkg/not_a_package/orphan.py", "");
        let loader = SourceLoader::new(vec![tmp.path().to_path_buf()]);

        let package = loader.import("pkg").unwrap();
        let names: Vec<String> = loader
            .submodules(&package)
            .unwrap()
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(names, ["pkg.alpha", "pkg.nested", "pkg.zeta"]);
    }

    #[test]
    fn test_absolute_import_relative_levels() {
        assert_eq!(absolute_import(None, "lib.shapes.Circle").as_deref(), Some("lib.shapes.Circle"));
        assert_eq!(absolute_import(Some("pkg.sub"), ".mod.Name").as_deref(), Some("pkg.sub.mod.Name"));
        assert_eq!(absolute_import(Some("pkg.sub"), "..Name").as_deref(), Some("pkg.Name"));
        assert_eq!(absolute_import(Some("pkg.sub"), ".").as_deref(), Some("pkg.sub"));
        assert_eq!(absolute_import(Some("pkg"), "...Name"), None);
        assert_eq!(absolute_import(None, ".Name"), None);
    }

    #[test]
    fn test_resolve_import_follows_reexports() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "lib/__init__.py", "from .shapes import Circle\n");
        write(tmp.path(), "lib/shapes.py", "class Circle:\n    pass\n");
        write(tmp.path(), "app.py", "from lib import Circle\nimport os\n");
        let loader = SourceLoader::new(vec![tmp.path().to_path_buf()]);
        let app = loader.import("app").unwrap();

        let circle = resolve_import(&loader, &app, "lib.Circle").unwrap();
        assert!(matches!(circle, Some(Object::Class(ref class)) if class.module == "lib.shapes"));

        assert_eq!(resolve_import(&loader, &app, "os").unwrap(), None);
        assert_eq!(resolve_import(&loader, &app, "os.path.join").unwrap(), None);
        assert_eq!(resolve_import(&loader, &app, "lib.Missing").unwrap(), None);
    }

    #[test]
    fn test_resolve_import_stops_on_import_cycles() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "ping.py", "from pong import name\n");
        write(tmp.path(), "pong.py", "from ping import name\n");
        let loader = SourceLoader::new(vec![tmp.path().to_path_buf()]);
        let ping = loader.import("ping").unwrap();

        assert_eq!(resolve_import(&loader, &ping, "pong.name").unwrap(), None);
    }

    #[test]
    fn test_plain_module_has_no_submodules() {
        let loader = SourceLoader::default();
        let module = ModuleObject::new("m", "m.py");
        assert!(loader.submodules(&module).unwrap().is_empty());
    }
}
