//! Builds a [`ModuleObject`] namespace from Python source.
//!
//! Only what a module's top level binds is modelled: `def`, `class`,
//! imports and simple assignments. Nested control flow (`if`, `try`, ...)
//! is not evaluated, so names bound only inside it are not visible.

use super::parser::{named_children, node_line, node_text, parse_source, string_literal_value};
use super::{CallableKind, ClassObject, FunctionObject, MemberSlot, ModuleObject, Object};
use crate::errors::Result;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, debug_span};
use tree_sitter::Node;

const PROPERTY_DECORATORS: &[&str] = &[
    "property",
    "cached_property",
    "abstractproperty",
    "setter",
    "getter",
    "deleter",
];

/// Parse `source` and build the namespace it defines.
pub fn build_module(
    name: &str,
    path: &Path,
    source: &str,
    package_dir: Option<PathBuf>,
) -> Result<ModuleObject> {
    let _span = debug_span!("build_module", module = name, path = %path.display()).entered();

    let tree = parse_source(source, path)?;
    let ctx = BuildContext {
        module: name,
        path,
        source,
    };

    let mut members = BTreeMap::new();
    for stmt in named_children(&tree.root_node()) {
        ctx.bind_statement(&stmt, &mut members);
    }

    debug!(members = members.len(), "Module namespace built");

    Ok(ModuleObject {
        name: name.to_string(),
        path: path.to_path_buf(),
        package_dir,
        members,
    })
}

struct BuildContext<'a> {
    module: &'a str,
    path: &'a Path,
    source: &'a str,
}

/// Whether a definition sits in a module or a class body.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Scope {
    Module,
    Class,
}

impl<'a> BuildContext<'a> {
    fn text(&self, node: &Node) -> &'a str {
        node_text(node, self.source)
    }

    fn field_text(&self, node: &Node, field: &str) -> Option<&'a str> {
        node.child_by_field_name(field).map(|n| self.text(&n))
    }

    fn bind_statement(&self, stmt: &Node, members: &mut BTreeMap<String, Object>) {
        match stmt.kind() {
            "function_definition" | "class_definition" | "decorated_definition" => {
                if let Some((name, object)) = self.definition(stmt, Scope::Module, members) {
                    members.insert(name, object);
                }
            }
            "import_statement" => members.extend(self.import_bindings(stmt)),
            "import_from_statement" => members.extend(self.import_from_bindings(stmt)),
            "expression_statement" => {
                for (name, value) in self.assignment_bindings(stmt) {
                    let object = match value {
                        AssignedValue::Alias(target) => {
                            members.get(target).cloned().unwrap_or(Object::Value)
                        }
                        AssignedValue::Call(_) | AssignedValue::Other => Object::Value,
                    };
                    members.insert(name.to_string(), object);
                }
            }
            _ => {}
        }
    }

    /// A `def` or `class`, possibly decorated, bound under its name.
    ///
    /// `scope` holds the names bound so far, which is where base classes
    /// are looked up.
    fn definition(
        &self,
        node: &Node,
        context: Scope,
        scope: &BTreeMap<String, Object>,
    ) -> Option<(String, Object)> {
        let (definition, decorators) = match node.kind() {
            "decorated_definition" => {
                let definition = node.child_by_field_name("definition")?;
                let decorators: Vec<&str> = named_children(node)
                    .iter()
                    .filter(|child| child.kind() == "decorator")
                    .filter_map(|decorator| self.decorator_name(decorator))
                    .collect();
                (definition, decorators)
            }
            _ => (*node, Vec::new()),
        };
        // A decorated definition starts at its first decorator.
        let line = node_line(node);

        match definition.kind() {
            "function_definition" => {
                let func = self.function(&definition, line, default_kind(context, &decorators));
                let name = func.name.clone();
                let object = if context == Scope::Class && is_property(&decorators) {
                    Object::Property(func)
                } else {
                    Object::Function(func)
                };
                Some((name, object))
            }
            "class_definition" => {
                let class = self.class(&definition, line, scope);
                Some((class.name.clone(), Object::Class(class)))
            }
            _ => None,
        }
    }

    /// Last dotted segment of a decorator expression, ignoring call arguments.
    fn decorator_name(&self, decorator: &Node) -> Option<&'a str> {
        let expr = named_children(decorator).into_iter().next()?;
        let target = match expr.kind() {
            "call" => expr.child_by_field_name("function")?,
            _ => expr,
        };
        self.text(&target).rsplit('.').next()
    }

    fn function(&self, def: &Node, line: usize, kind: CallableKind) -> FunctionObject {
        FunctionObject {
            name: self.field_text(def, "name").unwrap_or_default().to_string(),
            module: self.module.to_string(),
            path: self.path.to_path_buf(),
            line,
            params: def
                .child_by_field_name("parameters")
                .map(|params| self.positional_params(&params))
                .unwrap_or_default(),
            kind,
            docstring: def
                .child_by_field_name("body")
                .and_then(|body| self.docstring(&body)),
        }
    }

    /// Parameters that can be passed positionally, in declaration order.
    fn positional_params(&self, params: &Node) -> Vec<String> {
        let mut names = Vec::new();

        for param in named_children(params) {
            let name = match param.kind() {
                "identifier" => Some(param),
                "default_parameter" | "typed_default_parameter" => {
                    param.child_by_field_name("name")
                }
                "typed_parameter" => match named_children(&param).into_iter().next() {
                    Some(inner) if inner.kind() == "identifier" => Some(inner),
                    // `*args: int` / `**kwargs: str`
                    _ => break,
                },
                // Everything after `*`, `*args` or `**kwargs` is keyword-only.
                "list_splat_pattern" | "keyword_separator" | "dictionary_splat_pattern" => break,
                _ => None,
            };
            if let Some(name) = name {
                names.push(self.text(&name).to_string());
            }
        }

        names
    }

    /// The leading string literal of a block, if any.
    fn docstring(&self, body: &Node) -> Option<String> {
        let first = named_children(body)
            .into_iter()
            .find(|stmt| stmt.kind() != "comment")?;
        if first.kind() != "expression_statement" {
            return None;
        }
        let literal = named_children(&first).into_iter().next()?;
        if literal.kind() != "string" {
            return None;
        }
        string_literal_value(self.text(&literal)).map(str::to_string)
    }

    fn class(&self, def: &Node, line: usize, scope: &BTreeMap<String, Object>) -> ClassObject {
        let name = self.field_text(def, "name").unwrap_or_default();
        let mut members = self.inherited_members(def, scope);

        let mut own: BTreeMap<String, Object> = BTreeMap::new();
        if let Some(body) = def.child_by_field_name("body") {
            for stmt in named_children(&body) {
                self.bind_class_statement(&stmt, scope, &mut own, &mut members);
            }
        }

        ClassObject {
            name: name.to_string(),
            module: self.module.to_string(),
            path: self.path.to_path_buf(),
            line,
            members,
        }
    }

    fn bind_class_statement(
        &self,
        stmt: &Node,
        scope: &BTreeMap<String, Object>,
        own: &mut BTreeMap<String, Object>,
        members: &mut BTreeMap<String, MemberSlot>,
    ) {
        match stmt.kind() {
            "function_definition" | "class_definition" | "decorated_definition" => {
                if let Some((name, object)) = self.definition(stmt, Scope::Class, scope) {
                    own.insert(name.clone(), object.clone());
                    members.insert(name, MemberSlot::Resolved(object));
                }
            }
            "expression_statement" => {
                for (name, value) in self.assignment_bindings(stmt) {
                    let slot = match value {
                        AssignedValue::Alias(target) => MemberSlot::Resolved(
                            own.get(target).cloned().unwrap_or(Object::Value),
                        ),
                        AssignedValue::Call(callee) => MemberSlot::Deferred(format!(
                            "bound to the result of calling `{callee}` when the class body runs"
                        )),
                        AssignedValue::Other => MemberSlot::Resolved(Object::Value),
                    };
                    if let MemberSlot::Resolved(ref object) = slot {
                        own.insert(name.to_string(), object.clone());
                    }
                    members.insert(name.to_string(), slot);
                }
            }
            _ => {}
        }
    }

    /// Members contributed by base classes defined earlier in this module.
    ///
    /// Earlier bases take precedence over later ones, matching the method
    /// resolution order for the common non-diamond case.
    fn inherited_members(
        &self,
        def: &Node,
        scope: &BTreeMap<String, Object>,
    ) -> BTreeMap<String, MemberSlot> {
        let bases: Vec<&ClassObject> = def
            .child_by_field_name("superclasses")
            .map(|args| named_children(&args))
            .unwrap_or_default()
            .iter()
            .filter(|arg| arg.kind() == "identifier")
            .filter_map(|arg| match scope.get(self.text(arg)) {
                Some(Object::Class(base)) => Some(base),
                _ => None,
            })
            .collect();

        let mut members = BTreeMap::new();
        for base in bases.into_iter().rev() {
            members.extend(base.members.clone());
        }
        members
    }

    fn import_bindings(&self, stmt: &Node) -> Vec<(String, Object)> {
        named_children(stmt)
            .iter()
            .filter_map(|item| match item.kind() {
                // `import a.b` binds `a`
                "dotted_name" => {
                    let target = self.text(item);
                    let head = target.split('.').next().unwrap_or(target);
                    Some((head.to_string(), import_of(head)))
                }
                "aliased_import" => {
                    let target = self.field_text(item, "name")?;
                    let alias = self.field_text(item, "alias")?;
                    Some((alias.to_string(), import_of(target)))
                }
                _ => None,
            })
            .collect()
    }

    fn import_from_bindings(&self, stmt: &Node) -> Vec<(String, Object)> {
        let Some(module_name) = stmt.child_by_field_name("module_name") else {
            return Vec::new();
        };
        let module = self.text(&module_name);
        let mut cursor = stmt.walk();
        let names: Vec<Node> = stmt.children_by_field_name("name", &mut cursor).collect();

        names
            .iter()
            .filter_map(|item| {
                let (target, bound) = match item.kind() {
                    "aliased_import" => (
                        self.field_text(item, "name")?,
                        self.field_text(item, "alias")?,
                    ),
                    _ => (self.text(item), self.text(item)),
                };
                let qualified = if module.ends_with('.') {
                    format!("{module}{target}")
                } else {
                    format!("{module}.{target}")
                };
                Some((bound.to_string(), import_of(&qualified)))
            })
            .collect()
    }

    /// Names bound by an assignment statement and what they are bound to.
    fn assignment_bindings(&self, stmt: &Node) -> Vec<(&'a str, AssignedValue<'a>)> {
        let Some(assignment) = named_children(stmt)
            .into_iter()
            .find(|child| child.kind() == "assignment")
        else {
            return Vec::new();
        };

        let mut current = Some(assignment);
        // `a = b = value` nests assignments on the right-hand side.
        let mut targets = Vec::new();
        let mut value = AssignedValue::Other;
        while let Some(node) = current.take() {
            if let Some(left) = node.child_by_field_name("left") {
                targets.extend(self.target_names(&left));
            }
            match node.child_by_field_name("right") {
                Some(right) if right.kind() == "assignment" => current = Some(right),
                Some(right) => value = self.assigned_value(&right),
                None => {}
            }
        }

        targets.into_iter().map(|target| (target, value)).collect()
    }

    fn target_names(&self, left: &Node) -> Vec<&'a str> {
        match left.kind() {
            "identifier" => vec![self.text(left)],
            "pattern_list" | "tuple_pattern" | "list_pattern" => named_children(left)
                .iter()
                .filter(|n| n.kind() == "identifier")
                .map(|n| self.text(n))
                .collect(),
            _ => Vec::new(),
        }
    }

    fn assigned_value(&self, right: &Node) -> AssignedValue<'a> {
        match right.kind() {
            "identifier" => AssignedValue::Alias(self.text(right)),
            "call" => AssignedValue::Call(self.field_text(right, "function").unwrap_or_default()),
            _ => AssignedValue::Other,
        }
    }
}

#[derive(Clone, Copy)]
enum AssignedValue<'a> {
    /// `name = other_name`
    Alias(&'a str),
    /// `name = callee(...)`
    Call(&'a str),
    Other,
}

fn import_of(target: &str) -> Object {
    Object::Import {
        target: target.to_string(),
    }
}

fn default_kind(context: Scope, decorators: &[&str]) -> CallableKind {
    match context {
        Scope::Module => CallableKind::Function,
        Scope::Class if decorators.contains(&"classmethod") => CallableKind::ClassMethod,
        Scope::Class if decorators.contains(&"staticmethod") => CallableKind::StaticMethod,
        Scope::Class => CallableKind::InstanceMethod,
    }
}

fn is_property(decorators: &[&str]) -> bool {
    decorators
        .iter()
        .any(|name| PROPERTY_DECORATORS.contains(name))
}
