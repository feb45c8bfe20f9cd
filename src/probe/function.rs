//! Signature assembler.

use super::{ProbeRecord, SAMPLES_PER_PROBE};
use crate::docstring::{ParserFn, TypeBinding};
use crate::reflect::FunctionObject;
use std::collections::HashMap;

/// Type used for parameters the docstring does not mention.
pub const UNDOCUMENTED_PARAM: &str = "Any";
/// Return type used when the docstring documents none.
pub const UNDOCUMENTED_RETURN: &str = "None";

/// Probe one callable. Returns `None` for callables without a docstring;
/// the parser is not invoked for them.
///
/// `class_name` qualifies `func_name` as `Class.member` when given.
pub fn probe_function(
    func: &FunctionObject,
    parser: ParserFn,
    class_name: Option<&str>,
) -> Option<ProbeRecord> {
    let docstring = func.documentation()?;
    let bindings = parser(docstring);

    let func_name = match class_name {
        Some(class) => format!("{}.{}", class, func.name),
        None => func.name.clone(),
    };

    Some(ProbeRecord {
        func_name,
        line: func.line,
        path: func.path.display().to_string(),
        samples: SAMPLES_PER_PROBE,
        type_comments: vec![type_comment(func, &bindings)],
    })
}

/// Render `(T1 T2 ... Tn) -> Tr` for `func`'s explicit positional parameters.
pub fn type_comment(func: &FunctionObject, bindings: &[TypeBinding]) -> String {
    let mut documented: HashMap<Option<&str>, String> = HashMap::new();
    for binding in bindings {
        documented.insert(binding.name.as_deref(), binding.rendered());
    }

    let params: Vec<&str> = func
        .explicit_params()
        .iter()
        .map(|param| {
            documented
                .get(&Some(param.as_str()))
                .map(String::as_str)
                .unwrap_or(UNDOCUMENTED_PARAM)
        })
        .collect();
    let returns = documented
        .get(&None)
        .map(String::as_str)
        .unwrap_or(UNDOCUMENTED_RETURN);

    format!("({}) -> {}", params.join(" "), returns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docstring::{gensim, sphinx};
    use crate::reflect::CallableKind;
    use pretty_assertions::assert_eq;

    fn func(params: &[&str]) -> FunctionObject {
        FunctionObject::new("f", "test_module", "test_module.py", 12).with_params(params.iter().copied())
    }

    #[test]
    fn test_probe_function_fills_undocumented_with_any() {
        let f = func(&["foo", "bar", "baz", "undocumented"]).with_docstring(
            "
        :param int foo:
        :param float baz:
        :param str bar:
        :rtype: X
        ",
        );

        let expected = ProbeRecord {
            func_name: "f".to_string(),
            line: 12,
            path: "test_module.py".to_string(),
            samples: 1,
            type_comments: vec!["(int str float Any) -> X".to_string()],
        };
        assert_eq!(probe_function(&f, sphinx::parse, None), Some(expected));
    }

    #[test]
    fn test_fully_documented_has_no_any() {
        let f = func(&["a", "b", "c"]).with_docstring(":param int a:\n:param str b:\n:param bool c:");
        let record = probe_function(&f, sphinx::parse, None).unwrap();
        assert_eq!(record.type_comments, ["(int str bool) -> None"]);
        assert!(!record.type_comments[0].contains(UNDOCUMENTED_PARAM));
    }

    #[test]
    fn test_zero_params_render_without_space() {
        let f = func(&[]).with_docstring(":rtype: int");
        let record = probe_function(&f, sphinx::parse, None).unwrap();
        assert_eq!(record.type_comments, ["() -> int"]);
    }

    #[test]
    fn test_undocumented_callable_is_skipped_without_parsing() {
        fn exploding_parser(_: &str) -> Vec<TypeBinding> {
            panic!("parser must not run for undocumented callables");
        }
        assert_eq!(probe_function(&func(&["x"]), exploding_parser, None), None);
        let blank = func(&["x"]).with_docstring("   \n  ");
        assert_eq!(probe_function(&blank, exploding_parser, None), None);
    }

    #[test]
    fn test_docstring_without_tags_still_yields_record() {
        let f = func(&["x"]).with_docstring("Does things.");
        let record = probe_function(&f, sphinx::parse, None).unwrap();
        assert_eq!(record.type_comments, ["(Any) -> None"]);
    }

    #[test]
    fn test_receiver_skipped_by_kind_not_name() {
        let method = func(&["this", "foo"])
            .with_kind(CallableKind::InstanceMethod)
            .with_docstring(":param int foo:\n:rtype: collections.defaultdict");
        let record = probe_function(&method, sphinx::parse, Some("Santa")).unwrap();
        assert_eq!(record.func_name, "Santa.f");
        assert_eq!(record.type_comments, ["(int) -> collections.defaultdict"]);

        // A static method's first parameter is a real argument, even if named `self`.
        let statik = func(&["self"])
            .with_kind(CallableKind::StaticMethod)
            .with_docstring(":param float self:");
        assert_eq!(
            probe_function(&statik, sphinx::parse, None).unwrap().type_comments,
            ["(float) -> None"]
        );
    }

    #[test]
    fn test_duplicate_bindings_last_wins() {
        let bindings = vec![
            TypeBinding::param("x", "int"),
            TypeBinding::param("x", "float"),
            TypeBinding::returns("str"),
            TypeBinding::returns("bytes"),
        ];
        assert_eq!(type_comment(&func(&["x"]), &bindings), "(float) -> bytes");
    }

    #[test]
    fn test_gensim_optional_params_render_optional() {
        let f = func(&["uri", "mode"]).with_docstring(
            "Open.

            Parameters
            ----------
            uri: str
                The uri.
            mode: str, optional
                The mode.
            ",
        );
        let record = probe_function(&f, gensim::parse, None).unwrap();
        assert_eq!(record.type_comments, ["(str Optional[str]) -> None"]);
    }
}
