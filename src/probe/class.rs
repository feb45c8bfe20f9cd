//! Class prober.

use super::function::probe_function;
use super::{MemberFilter, NamePolicy, ProbeOptions, ProbeRecord};
use crate::reflect::{ClassObject, FunctionObject, Object};
use tracing::trace;

const CONSTRUCTOR: &str = "__init__";

/// Probe the methods `class` owns, in member enumeration order.
///
/// Members that fail to resolve are skipped. Callables defined in another
/// module (typically inherited from a foreign base class) are left to that
/// module's own probe pass.
pub fn probe_class(class: &ClassObject, options: &ProbeOptions) -> Vec<ProbeRecord> {
    let parser = options.dialect.parser();
    let qualifier = match options.naming {
        NamePolicy::Qualified => Some(class.name.as_str()),
        NamePolicy::Bare => None,
    };

    class
        .member_names()
        .filter(|name| is_candidate(name, options.member_filter))
        .filter_map(|name| match class.resolve(name) {
            Ok(object) => Some(object),
            Err(e) => {
                trace!(class = %class.name, error = %e, "Skipping unresolvable member");
                None
            }
        })
        .filter_map(|object| owned_callable(class, object))
        .filter_map(|func| probe_function(func, parser, qualifier))
        .collect()
}

fn is_candidate(name: &str, filter: MemberFilter) -> bool {
    match filter {
        MemberFilter::Privacy => !name.starts_with('_') || name == CONSTRUCTOR,
        MemberFilter::OriginOnly => true,
    }
}

/// The member as a function, if it is callable and defined in the class's module.
fn owned_callable<'c>(class: &ClassObject, object: &'c Object) -> Option<&'c FunctionObject> {
    object
        .as_function()
        .filter(|func| func.module == class.module)
}
