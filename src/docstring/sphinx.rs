//! Structured-tag (Sphinx field list) dialect.
//!
//! Recognizes `:param <type> <name>:` and a trailing `:rtype: <type>` on each
//! line. Everything else in the docstring, including `:returns:` prose and
//! continuation lines, is ignored.

use super::normalize::canonical_type;
use super::TypeBinding;
use once_cell::sync::Lazy;
use regex::Regex;

static PARAM_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r":param (?P<type>[\w.]+) (?P<name>\w+):").expect("valid param tag pattern")
});

static RTYPE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r":rtype: (?P<type>[\w.]+)$").expect("valid rtype tag pattern"));

/// Extract bindings in line order.
pub fn parse(docstring: &str) -> Vec<TypeBinding> {
    docstring.lines().flat_map(parse_line).collect()
}

fn parse_line(line: &str) -> Vec<TypeBinding> {
    let param = PARAM_TAG
        .captures(line)
        .map(|caps| TypeBinding::param(&caps["name"], canonical_type(&caps["type"])));
    let rtype = RTYPE_TAG
        .captures(line)
        .map(|caps| TypeBinding::returns(canonical_type(&caps["type"])));

    param.into_iter().chain(rtype).collect()
}
