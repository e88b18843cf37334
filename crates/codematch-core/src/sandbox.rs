//! Isolated evaluation of untrusted snippets.
//!
//! Snippets are evaluated by an embedded Starlark interpreter, a Python
//! dialect without filesystem, network, clock or import access. Every call
//! builds a fresh `Module` (and heap), so nothing a snippet defines survives
//! past the invocation that loaded it.

use crate::literal::{parse_literal, Literal};
use starlark::codemap::FileSpanRef;
use starlark::environment::{Globals, Module};
use starlark::eval::{BeforeStmtFuncDyn, Evaluator};
use starlark::syntax::{AstModule, Dialect};
use starlark::values::Value;
use std::fmt;
use std::time::Instant;

const SNIPPET_FILE: &str = "snippet.star";

/// Helpers Python code leans on that the Starlark standard library lacks.
const PRELUDE: &str = r#"
def sum(iterable, start = 0):
    total = start
    for x in iterable:
        total = total + x
    return total

def pow(base, exp):
    result = 1
    for _ in range(exp):
        result = result * base
    return result
"#;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SandboxError {
    Define(String),
    NoFunction,
    Argument(String),
    Call(String),
    Timeout,
}

impl fmt::Display for SandboxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SandboxError::Define(m) | SandboxError::Argument(m) | SandboxError::Call(m) => {
                f.write_str(m)
            }
            SandboxError::NoFunction => f.write_str("No function found in code"),
            SandboxError::Timeout => f.write_str("timed out"),
        }
    }
}

impl std::error::Error for SandboxError {}

#[derive(Debug, Clone)]
pub struct Invocation {
    pub function: String,
    pub result: Literal,
}

/// Aborts evaluation at the first statement that starts after the deadline.
struct StatementDeadline(Instant);

impl<'a, 'e: 'a> BeforeStmtFuncDyn<'a, 'e> for StatementDeadline {
    fn call<'v>(
        &mut self,
        _span: FileSpanRef,
        _eval: &mut Evaluator<'v, 'a, 'e>,
    ) -> starlark::Result<()> {
        if Instant::now() >= self.0 {
            return Err(starlark::Error::new_other(anyhow::anyhow!("timed out")));
        }
        Ok(())
    }
}

/// Defines `source` in a fresh module, then calls the first function it
/// binds (in definition order) with `args` as positional arguments.
pub fn invoke_first_function(source: &str, args: &[Literal]) -> Result<Invocation, SandboxError> {
    invoke_with_deadline(source, args, None)
}

/// Like [`invoke_first_function`], but evaluation stops with
/// [`SandboxError::Timeout`] once `deadline` has passed.
pub fn invoke_with_deadline(
    source: &str,
    args: &[Literal],
    deadline: Option<Instant>,
) -> Result<Invocation, SandboxError> {
    let globals = Globals::standard();
    let module = Module::new();
    let mut eval = Evaluator::new(&module);
    if let Some(at) = deadline {
        let hook: Box<dyn BeforeStmtFuncDyn> = Box::new(StatementDeadline(at));
        eval.before_stmt_for_dap(hook.into());
    }
    let failed = |wrap: fn(String) -> SandboxError| {
        move |e: starlark::Error| match deadline {
            Some(at) if Instant::now() >= at => SandboxError::Timeout,
            _ => wrap(condense(&e.to_string())),
        }
    };

    let prelude = parse("prelude.star", PRELUDE.to_owned()).map_err(SandboxError::Define)?;
    eval.eval_module(prelude, &globals)
        .map_err(failed(SandboxError::Define))?;
    let builtins: Vec<(String, Value)> = module
        .names()
        .filter_map(|name| Some((name.as_str().to_string(), module.get(name.as_str())?)))
        .collect();

    let ast = parse(SNIPPET_FILE, source.to_owned()).map_err(SandboxError::Define)?;
    eval.eval_module(ast, &globals)
        .map_err(failed(SandboxError::Define))?;

    // Module names come back in binding order; unchanged prelude helpers are skipped.
    let (name, function) = module
        .names()
        .find_map(|name| {
            let name = name.as_str();
            let value = module.get(name)?;
            let inherited = builtins
                .iter()
                .any(|(n, v)| n == name && v.ptr_eq(value));
            (!inherited && value.get_type() == "function").then(|| (name.to_string(), value))
        })
        .ok_or(SandboxError::NoFunction)?;

    let mut values: Vec<Value> = Vec::with_capacity(args.len());
    for (i, arg) in args.iter().enumerate() {
        let ast = parse(&format!("arg{}.star", i), arg.to_starlark()).map_err(SandboxError::Argument)?;
        let value = eval
            .eval_module(ast, &globals)
            .map_err(failed(SandboxError::Argument))?;
        values.push(value);
    }

    let result = eval
        .eval_function(function, &values, &[])
        .map_err(failed(SandboxError::Call))?;

    Ok(Invocation {
        function: name,
        result: to_literal(result),
    })
}

fn parse(file: &str, content: String) -> Result<AstModule, String> {
    AstModule::parse(file, content, &Dialect::Extended).map_err(|e| condense(&e.to_string()))
}

fn to_literal(value: Value) -> Literal {
    let repr = value.to_repr();
    match repr.as_str() {
        "inf" | "+inf" => return Literal::Float(f64::INFINITY),
        "-inf" => return Literal::Float(f64::NEG_INFINITY),
        "nan" => return Literal::Float(f64::NAN),
        _ => {}
    }
    parse_literal(&repr).unwrap_or_else(|_| Literal::Str(value.to_str()))
}

/// First meaningful line of an interpreter diagnostic.
fn condense(message: &str) -> String {
    let line = message
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("evaluation failed");
    line.strip_prefix("error: ").unwrap_or(line).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calls_the_first_defined_function() -> anyhow::Result<()> {
        let src = "def helper(x):\n    return x * 2\n\ndef main(x):\n    return helper(x) + 1\n";
        let out = invoke_first_function(src, &[Literal::Int(4)])?;
        assert_eq!(out.function, "helper");
        assert_eq!(out.result, Literal::Int(8));
        Ok(())
    }

    #[test]
    fn reports_missing_function() {
        let err = invoke_first_function("x = 1\n", &[]).unwrap_err();
        assert_eq!(err, SandboxError::NoFunction);
        assert_eq!(err.to_string(), "No function found in code");
    }

    #[test]
    fn syntax_errors_are_definition_failures() {
        let err = invoke_first_function("def broken(:\n    pass\n", &[]).unwrap_err();
        assert!(matches!(err, SandboxError::Define(_)));
    }

    #[test]
    fn no_host_access() {
        let err = invoke_first_function("load('os', 'system')\ndef f():\n    return 1\n", &[])
            .unwrap_err();
        assert!(matches!(err, SandboxError::Define(_)));
    }

    #[test]
    fn runtime_errors_are_call_failures() {
        let err = invoke_first_function("def f(a, b):\n    return a // b\n", &[
            Literal::Int(1),
            Literal::Int(0),
        ])
        .unwrap_err();
        assert!(matches!(err, SandboxError::Call(_)));
    }

    #[test]
    fn returns_containers_as_literals() -> anyhow::Result<()> {
        let src = "def pair(a, b):\n    return [a, b, {'k': (a,)}]\n";
        let out = invoke_first_function(src, &[Literal::Str("x".into()), Literal::Float(1.5)])?;
        assert_eq!(out.result.to_string(), "['x', 1.5, {'k': ('x',)}]");
        Ok(())
    }

    #[test]
    fn prelude_helpers_are_available_but_never_selected() -> anyhow::Result<()> {
        let src = "def total(xs):\n    return sum(xs) + pow(2, 3)\n";
        let out = invoke_first_function(src, &[Literal::List(vec![Literal::Int(1), Literal::Int(2)])])?;
        assert_eq!(out.function, "total");
        assert_eq!(out.result, Literal::Int(11));
        Ok(())
    }

    #[test]
    fn first_function_follows_definition_order_not_name() -> anyhow::Result<()> {
        let src = "LIMIT = 3\ndef b():\n    return 1\nif LIMIT == 3:\n    pass\ndef a():\n    return 2\n";
        let out = invoke_first_function(src, &[])?;
        assert_eq!(out.function, "b");
        assert_eq!(out.result, Literal::Int(1));
        Ok(())
    }

    #[test]
    fn finds_functions_defined_inside_top_level_blocks() -> anyhow::Result<()> {
        let src = "if True:\n    def f(x):\n        return x + 1\n";
        let out = invoke_first_function(src, &[Literal::Int(1)])?;
        assert_eq!(out.function, "f");
        assert_eq!(out.result, Literal::Int(2));

        let src = "if False:\n    def g(x):\n        return x\nelse:\n    def h(x):\n        return -x\n";
        let out = invoke_first_function(src, &[Literal::Int(3)])?;
        assert_eq!(out.function, "h");
        assert_eq!(out.result, Literal::Int(-3));
        Ok(())
    }

    #[test]
    fn assigned_lambdas_count_as_functions() -> anyhow::Result<()> {
        let out = invoke_first_function("double = lambda x: x * 2\n", &[Literal::Int(5)])?;
        assert_eq!(out.function, "double");
        assert_eq!(out.result, Literal::Int(10));
        Ok(())
    }

    #[test]
    fn redefined_prelude_helper_is_selectable() -> anyhow::Result<()> {
        let src = "def sum(xs):\n    return len(xs)\n";
        let out = invoke_first_function(src, &[Literal::List(vec![Literal::Int(7)])])?;
        assert_eq!(out.function, "sum");
        assert_eq!(out.result, Literal::Int(1));
        Ok(())
    }

    #[test]
    fn passed_deadline_stops_long_loops() {
        let src = "def spin(n):\n    total = 0\n    for i in range(n):\n        for j in range(n):\n            total += 1\n    return total\n";
        let started = Instant::now();
        let deadline = started + std::time::Duration::from_millis(100);
        let err = invoke_with_deadline(src, &[Literal::Int(1_000_000)], Some(deadline)).unwrap_err();
        assert_eq!(err, SandboxError::Timeout);
        assert!(started.elapsed() < std::time::Duration::from_secs(10));
    }

    #[test]
    fn big_integers_round_trip_through_calls() -> anyhow::Result<()> {
        let big = crate::literal::parse_literal("10000000000000000000")?;
        let out = invoke_first_function("def twice(n):\n    return n * 2\n", &[big])?;
        assert_eq!(out.result, Literal::BigInt("20000000000000000000".into()));
        Ok(())
    }
}
