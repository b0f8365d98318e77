//! Runtime helpers for lowered scripts.
//!
//! Lowering some syntax (object spread, async functions, class fields)
//! produces calls such as `babelHelpers.objectSpread2(...)`. The preview page
//! has no helper library, so every helper a program references is defined in
//! a prologue placed in front of the compiled code:
//!
//! ```text
//! var babelHelpers = babelHelpers || {};
//! babelHelpers.toPropertyKey = function (t) { ... };
//! babelHelpers.defineProperty = function (e, r, t) { ... };
//! ```
//!
//! A referenced helper without a definition here is a compile error, so no
//! output ever calls an undefined helper.

use std::collections::BTreeSet;

use oxc::ast::ast::{Expression, Program, StaticMemberExpression};
use oxc::ast_visit::{Visit, walk};

/// Global object the transformer routes helper calls through.
pub const HELPERS_GLOBAL: &str = "babelHelpers";

/// Helper name, helpers it calls, definition.
///
/// Dependencies come before their dependents.
const HELPERS: &[(&str, &[&str], &str)] = &[
    (
        "typeof",
        &[],
        r#"function (o) { return o && "function" == typeof Symbol && o.constructor === Symbol && o !== Symbol.prototype ? "symbol" : typeof o; }"#,
    ),
    (
        "toPrimitive",
        &["typeof"],
        r#"function (t, r) { if ("object" != babelHelpers.typeof(t) || !t) return t; var e = t[Symbol.toPrimitive]; if (void 0 !== e) { var i = e.call(t, r || "default"); if ("object" != babelHelpers.typeof(i)) return i; throw new TypeError("@@toPrimitive must return a primitive value."); } return ("string" === r ? String : Number)(t); }"#,
    ),
    (
        "toPropertyKey",
        &["toPrimitive", "typeof"],
        r#"function (t) { var i = babelHelpers.toPrimitive(t, "string"); return "symbol" == babelHelpers.typeof(i) ? i : i + ""; }"#,
    ),
    (
        "defineProperty",
        &["toPropertyKey"],
        r#"function (e, r, t) { r = babelHelpers.toPropertyKey(r); if (r in e) { Object.defineProperty(e, r, { value: t, enumerable: true, configurable: true, writable: true }); } else { e[r] = t; } return e; }"#,
    ),
    (
        "objectSpread2",
        &["defineProperty"],
        r#"function (e) { for (var r = 1; r < arguments.length; r++) { var t = null != arguments[r] ? arguments[r] : {}; var k = Object.keys(t); if (Object.getOwnPropertySymbols) { k = k.concat(Object.getOwnPropertySymbols(t).filter(function (s) { return Object.getOwnPropertyDescriptor(t, s).enumerable; })); } k.forEach(function (key) { babelHelpers.defineProperty(e, key, t[key]); }); } return e; }"#,
    ),
    (
        "extends",
        &[],
        r#"function (n) { for (var e = 1; e < arguments.length; e++) { var t = arguments[e]; for (var r in t) { if ({}.hasOwnProperty.call(t, r)) n[r] = t[r]; } } return n; }"#,
    ),
    (
        "objectWithoutPropertiesLoose",
        &[],
        r#"function (r, e) { if (null == r) return {}; var t = {}; for (var n in r) { if ({}.hasOwnProperty.call(r, n) && e.indexOf(n) === -1) t[n] = r[n]; } return t; }"#,
    ),
    (
        "objectWithoutProperties",
        &["objectWithoutPropertiesLoose"],
        r#"function (e, t) { if (null == e) return {}; var i = babelHelpers.objectWithoutPropertiesLoose(e, t); if (Object.getOwnPropertySymbols) { var n = Object.getOwnPropertySymbols(e); for (var r = 0; r < n.length; r++) { var o = n[r]; if (t.indexOf(o) === -1 && {}.propertyIsEnumerable.call(e, o)) i[o] = e[o]; } } return i; }"#,
    ),
    (
        "objectDestructuringEmpty",
        &[],
        r#"function (t) { if (null == t) throw new TypeError("Cannot destructure " + t); }"#,
    ),
    (
        "asyncToGenerator",
        &[],
        r#"function (n) { return function () { var t = this, e = arguments; return new Promise(function (resolve, reject) { var gen = n.apply(t, e); function step(key, arg) { try { var info = gen[key](arg); var value = info.value; } catch (error) { reject(error); return; } if (info.done) { resolve(value); } else { Promise.resolve(value).then(next, fail); } } function next(v) { step("next", v); } function fail(v) { step("throw", v); } next(void 0); }); }; }"#,
    ),
    (
        "checkPrivateRedeclaration",
        &[],
        r#"function (e, t) { if (t.has(e)) throw new TypeError("Cannot initialize the same private elements twice on an object"); }"#,
    ),
    (
        "classPrivateFieldInitSpec",
        &["checkPrivateRedeclaration"],
        r#"function (e, t, a) { babelHelpers.checkPrivateRedeclaration(e, t); t.set(e, a); }"#,
    ),
    (
        "classPrivateMethodInitSpec",
        &["checkPrivateRedeclaration"],
        r#"function (e, a) { babelHelpers.checkPrivateRedeclaration(e, a); a.add(e); }"#,
    ),
    (
        "assertClassBrand",
        &[],
        r#"function (e, t, n) { if ("function" == typeof e ? e === t : e.has(t)) return arguments.length < 3 ? t : n; throw new TypeError("Private element is not present on this object"); }"#,
    ),
    (
        "classPrivateFieldGet2",
        &["assertClassBrand"],
        r#"function (s, a) { return s.get(babelHelpers.assertClassBrand(s, a)); }"#,
    ),
    (
        "classPrivateFieldSet2",
        &["assertClassBrand"],
        r#"function (s, a, r) { s.set(babelHelpers.assertClassBrand(s, a), r); return r; }"#,
    ),
    (
        "readOnlyError",
        &[],
        r#"function (r) { throw new TypeError('"' + r + '" is read-only'); }"#,
    ),
    (
        "writeOnlyError",
        &[],
        r#"function (r) { throw new TypeError('"' + r + '" is write-only'); }"#,
    ),
    (
        "checkInRHS",
        &[],
        r#"function (e) { if (Object(e) !== e) throw TypeError("right-hand side of 'in' should be an object, got " + (null !== e ? typeof e : "null")); return e; }"#,
    ),
];

fn lookup(name: &str) -> Option<&'static (&'static str, &'static [&'static str], &'static str)> {
    HELPERS.iter().find(|(helper, _, _)| *helper == name)
}

/// Helper names referenced as `babelHelpers.<name>` in `program`.
pub fn referenced_helpers(program: &Program<'_>) -> BTreeSet<String> {
    let mut collector = HelperCollector::default();
    collector.visit_program(program);
    collector.names
}

/// Definitions for `names` and everything they depend on.
///
/// Returns the names without a definition as the error. An empty set yields
/// an empty prologue.
pub fn prologue(names: &BTreeSet<String>) -> Result<String, Vec<String>> {
    if names.is_empty() {
        return Ok(String::new());
    }

    let missing: Vec<String> = names
        .iter()
        .filter(|name| lookup(name).is_none())
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(missing);
    }

    let mut needed = BTreeSet::new();
    let mut stack: Vec<&str> = names.iter().map(String::as_str).collect();
    while let Some(name) = stack.pop() {
        if needed.insert(name)
            && let Some((_, deps, _)) = lookup(name)
        {
            stack.extend(deps.iter().copied());
        }
    }

    let mut out = format!("var {HELPERS_GLOBAL} = {HELPERS_GLOBAL} || {{}};\n");
    for (name, _, source) in HELPERS.iter().filter(|(name, _, _)| needed.contains(name)) {
        out.push_str(&format!("{HELPERS_GLOBAL}.{name} = {source};\n"));
    }
    Ok(out)
}

#[derive(Default)]
struct HelperCollector {
    names: BTreeSet<String>,
}

impl<'a> Visit<'a> for HelperCollector {
    fn visit_static_member_expression(&mut self, expr: &StaticMemberExpression<'a>) {
        if let Expression::Identifier(object) = &expr.object
            && object.name.as_str() == HELPERS_GLOBAL
        {
            self.names.insert(expr.property.name.to_string());
        }
        walk::walk_static_member_expression(self, expr);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxc::allocator::Allocator;
    use oxc::parser::Parser;
    use oxc::span::SourceType;

    fn names(list: &[&str]) -> BTreeSet<String> {
        list.iter().map(|name| (*name).to_string()).collect()
    }

    #[test]
    fn test_collects_helper_references() {
        let allocator = Allocator::default();
        let source = "const o = babelHelpers.objectSpread2({}, a); babelHelpers.extends(b, c); other.extends(d);";
        let ret = Parser::new(&allocator, source, SourceType::mjs()).parse();
        assert_eq!(
            referenced_helpers(&ret.program),
            names(&["extends", "objectSpread2"])
        );
    }

    #[test]
    fn test_prologue_includes_dependencies() {
        let out = prologue(&names(&["objectSpread2"])).unwrap();
        assert!(out.starts_with("var babelHelpers = babelHelpers || {};"));
        for helper in ["objectSpread2", "defineProperty", "toPropertyKey", "toPrimitive", "typeof"] {
            assert!(out.contains(&format!("babelHelpers.{helper} = function")), "{helper} missing");
        }
        // Dependencies are defined first
        assert!(out.find("babelHelpers.typeof =").unwrap() < out.find("babelHelpers.objectSpread2 =").unwrap());
        assert!(!out.contains("asyncToGenerator"));
    }

    #[test]
    fn test_prologue_parses() {
        let all: BTreeSet<String> = HELPERS.iter().map(|(name, _, _)| (*name).to_string()).collect();
        let out = prologue(&all).unwrap();
        let allocator = Allocator::default();
        let ret = Parser::new(&allocator, &out, SourceType::cjs()).parse();
        assert!(ret.errors.is_empty(), "prologue does not parse:\n{out}");
    }

    #[test]
    fn test_dependencies_are_known() {
        for (name, deps, _) in HELPERS {
            for dep in *deps {
                assert!(lookup(dep).is_some(), "{name} depends on unknown {dep}");
            }
        }
    }

    #[test]
    fn test_empty_prologue() {
        assert_eq!(prologue(&BTreeSet::new()).unwrap(), "");
    }

    #[test]
    fn test_unknown_helper_rejected() {
        let missing = prologue(&names(&["defineProperty", "wrapAsyncGenerator"])).unwrap_err();
        assert_eq!(missing, vec!["wrapAsyncGenerator".to_string()]);
    }
}
