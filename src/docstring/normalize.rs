//! Canonical spellings for docstring type names.
//!
//! Docstrings frequently spell builtin types in prose (`boolean`, `integer`).
//! Both dialects pass every extracted type token through [`canonical_type`]
//! so the emitted type comments use the names a type checker understands.

/// Spelling variant → canonical type name.
const REWRITES: &[(&str, &str)] = &[
    ("boolean", "bool"),
    ("integer", "int"),
    ("string", "str"),
    ("dictionary", "dict"),
    ("none", "None"),
];

/// Rewrite a type token to its canonical spelling, or return it unchanged.
pub fn canonical_type(token: &str) -> String {
    REWRITES
        .iter()
        .find(|(variant, _)| *variant == token)
        .map(|(_, canonical)| (*canonical).to_string())
        .unwrap_or_else(|| token.to_string())
}
