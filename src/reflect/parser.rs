//! Tree-sitter parser integration for Python
//!
//! Provides parsing with the tree-sitter Python grammar plus small node
//! helpers shared by the namespace builder.

use crate::errors::{Error, Result};
use std::path::Path;
use tree_sitter::{Node, Parser, Tree};

/// Parse Python source into a syntax tree, rejecting sources with syntax errors.
pub fn parse_source(content: &str, path: &Path) -> Result<Tree> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .map_err(|e| Error::parse(path, 0, 0, format!("failed to load Python grammar: {e}")))?;

    let tree = parser
        .parse(content, None)
        .ok_or_else(|| Error::parse(path, 0, 0, "parser produced no tree"))?;

    if let Some(bad) = first_error(tree.root_node()) {
        let message = if bad.is_missing() {
            format!("missing {}", bad.kind())
        } else {
            "invalid syntax".to_string()
        };
        return Err(Error::parse(path, node_line(&bad), node_column(&bad), message));
    }

    Ok(tree)
}

/// Depth-first search for the first `ERROR` or missing node.
fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error)
}

/// Get text for a tree-sitter node
pub fn node_text<'a>(node: &Node, source: &'a str) -> &'a str {
    &source[node.start_byte()..node.end_byte()]
}

/// Get the line number for a tree-sitter node (1-indexed)
pub fn node_line(node: &Node) -> usize {
    node.start_position().row + 1
}

/// Get the column number for a tree-sitter node (1-indexed)
pub fn node_column(node: &Node) -> usize {
    node.start_position().column + 1
}

/// Named children of a node, collected so callers can iterate freely.
pub fn named_children<'t>(node: &Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

/// Value of a string literal node, without prefix and quotes.
///
/// Only plain, raw and unicode literals qualify: bytes and f-strings never
/// become a docstring. Escape sequences are kept verbatim; docstring tags
/// never rely on them.
pub fn string_literal_value(literal: &str) -> Option<&str> {
    let body = literal.trim_start_matches(|c: char| c.is_ascii_alphabetic());
    let prefix = &literal[..literal.len() - body.len()];
    if !prefix.chars().all(|c| matches!(c, 'r' | 'R' | 'u' | 'U')) {
        return None;
    }
    ["\"\"\"", "'''", "\"", "'"]
        .into_iter()
        .find_map(|quote| body.strip_prefix(quote)?.strip_suffix(quote))
}
