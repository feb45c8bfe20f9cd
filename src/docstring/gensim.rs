//! Tabular-section (numpy / gensim) dialect.
//!
//! ```text
//! Parameters
//! ----------
//! uri: str or object
//!     The object to open.
//! mode: str, optional
//!     Mimicks built-in open parameter of the same name.
//! ```
//!
//! Only the `Parameters` table is read; this dialect never yields a return
//! binding.

use super::normalize::canonical_type;
use super::TypeBinding;
use once_cell::sync::Lazy;
use regex::Regex;

const SECTION_HEADER: &str = "Parameters";
const OPTIONAL_MARKER: &str = ", optional";
const DESCRIPTION_INDENT: &str = "    ";

static ENTRY_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\*{0,2}(?P<name>\w+)\s*:\s*(?P<type>.*)$").expect("valid entry header pattern")
});

static TYPE_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w.]+").expect("valid type token pattern"));

static UNDERLINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-+$").expect("valid underline pattern"));

pub fn parse(docstring: &str) -> Vec<TypeBinding> {
    let cleaned = clean_docstring(docstring);
    let lines: Vec<&str> = cleaned.iter().map(String::as_str).collect();

    match find_table_start(&lines) {
        Some(start) => parse_entries(&lines[start..]),
        None => Vec::new(),
    }
}

/// Index of the first line after a `Parameters` header and its underline.
fn find_table_start(lines: &[&str]) -> Option<usize> {
    lines
        .windows(2)
        .position(|pair| {
            pair[0].trim_end() == SECTION_HEADER && UNDERLINE.is_match(pair[1].trim_end())
        })
        .map(|header| header + 2)
}

fn parse_entries(lines: &[&str]) -> Vec<TypeBinding> {
    let mut bindings = Vec::new();

    for line in lines {
        if line.trim().is_empty() {
            break;
        }
        if line.starts_with(DESCRIPTION_INDENT) {
            continue;
        }
        match ENTRY_HEADER.captures(line) {
            Some(caps) => bindings.extend(parse_entry(&caps["name"], &caps["type"])),
            // Anything else at column zero means the table is over or malformed.
            None => break,
        }
    }

    bindings
}

fn parse_entry(name: &str, type_text: &str) -> Option<TypeBinding> {
    let (type_text, optional) = match type_text.find(OPTIONAL_MARKER) {
        Some(at) => {
            let stripped = format!(
                "{}{}",
                &type_text[..at],
                &type_text[at + OPTIONAL_MARKER.len()..]
            );
            (stripped, true)
        }
        None => (type_text.to_string(), false),
    };

    let token = TYPE_TOKEN.find(type_text.trim())?;
    Some(TypeBinding {
        name: Some(name.to_string()),
        type_name: canonical_type(token.as_str()),
        optional,
    })
}

/// Normalize docstring indentation the way `inspect.cleandoc` does: the first
/// line is stripped, the rest lose their common leading whitespace, and
/// leading/trailing blank lines are dropped.
fn clean_docstring(docstring: &str) -> Vec<String> {
    let expanded = docstring.replace('\t', "        ");
    let raw: Vec<&str> = expanded.lines().collect();

    let margin = raw
        .iter()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);

    let mut cleaned: Vec<String> = raw
        .iter()
        .enumerate()
        .map(|(i, line)| {
            if i == 0 {
                line.trim_start().to_string()
            } else if line.trim().is_empty() {
                String::new()
            } else {
                line.get(margin..).unwrap_or(line.trim_start()).to_string()
            }
        })
        .collect();

    while cleaned.last().is_some_and(|line| line.trim().is_empty()) {
        cleaned.pop();
    }
    let leading_blank = cleaned
        .iter()
        .take_while(|line| line.trim().is_empty())
        .count();
    cleaned.drain(..leading_blank);
    cleaned
}
