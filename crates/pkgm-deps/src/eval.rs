//! Restricted evaluator for parsed declaration files
//!
//! Statements are executed in order against a [`Scope`]. The only callable
//! is `Var(name)`, which reads from the `vars` binding as it stands when the
//! call is evaluated.

use std::collections::BTreeMap;
use tracing::debug;

use crate::errors::EvalError;
use crate::parser::{parse_module, Assignment, BinOp, Expr, ExprKind};
use crate::types::{DependencyMap, Value};

/// Name of the binding holding variables for `Var` lookups
pub const VARS_BINDING: &str = "vars";
/// Name of the binding holding the dependency pins
pub const DEPS_BINDING: &str = "deps";
/// Platform-specific pins; pre-bound so files can reference it, never consumed
pub const DEPS_OS_BINDING: &str = "deps_os";
/// The variable lookup helper
pub const VAR_CALL: &str = "Var";

#[derive(Debug, Clone)]
struct Binding {
    value: Value,
    line: usize,
}

/// Top-level bindings produced by evaluating a declaration file
#[derive(Debug, Clone)]
pub struct Scope {
    bindings: BTreeMap<String, Binding>,
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

impl Scope {
    /// Create the initial scope with `deps_os` bound to an empty mapping
    pub fn new() -> Self {
        let mut bindings = BTreeMap::new();
        bindings.insert(
            DEPS_OS_BINDING.to_string(),
            Binding {
                value: Value::Dict(BTreeMap::new()),
                line: 0,
            },
        );
        Self { bindings }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name).map(|b| &b.value)
    }

    /// Execute every statement of `source` in order
    pub fn execute(&mut self, source: &str) -> Result<(), EvalError> {
        let statements = parse_module(source)?;
        for statement in &statements {
            self.assign(statement)?;
        }
        debug!("Evaluated {} top-level bindings", statements.len());
        Ok(())
    }

    fn assign(&mut self, statement: &Assignment) -> Result<(), EvalError> {
        let value = self.eval(&statement.value)?;
        self.bindings.insert(
            statement.name.clone(),
            Binding {
                value,
                line: statement.line,
            },
        );
        Ok(())
    }

    /// Implements `Var(name)`: look `name` up in the current `vars` binding
    pub fn lookup_var(&self, name: &str, line: usize) -> Result<Value, EvalError> {
        let undefined = || EvalError::UndefinedVariable {
            name: name.to_string(),
            line,
        };

        match self.bindings.get(VARS_BINDING) {
            None => Err(undefined()),
            Some(Binding {
                value: Value::Dict(vars),
                ..
            }) => vars.get(name).cloned().ok_or_else(undefined),
            Some(binding) => Err(EvalError::type_mismatch(
                line,
                format!(
                    "'{}' must be a mapping (bound at line {}), found {}",
                    VARS_BINDING,
                    binding.line,
                    binding.value.type_name()
                ),
            )),
        }
    }

    /// Evaluate a single expression against the current bindings
    pub fn eval(&self, expr: &Expr) -> Result<Value, EvalError> {
        match &expr.kind {
            ExprKind::Str(s) => Ok(Value::Str(s.clone())),
            ExprKind::Int(i) => Ok(Value::Int(*i)),
            ExprKind::Bool(b) => Ok(Value::Bool(*b)),
            ExprKind::None => Ok(Value::None),
            ExprKind::Name(name) => self.resolve_name(name, expr.line),
            ExprKind::Call { name, args } => self.call(name, args, expr.line),
            ExprKind::List(items) => items
                .iter()
                .map(|item| self.eval(item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List),
            ExprKind::Dict(entries) => {
                let mut map = BTreeMap::new();
                for (key_expr, value_expr) in entries {
                    let key = match self.eval(key_expr)? {
                        Value::Str(key) => key,
                        other => {
                            return Err(EvalError::type_mismatch(
                                key_expr.line,
                                format!("mapping keys must be strings, found {}", other.type_name()),
                            ));
                        }
                    };
                    let value = self.eval(value_expr)?;
                    map.insert(key, value);
                }
                Ok(Value::Dict(map))
            }
            ExprKind::Binary { op, lhs, rhs } => {
                let lhs = self.eval(lhs)?;
                let rhs = self.eval(rhs)?;
                match op {
                    BinOp::Add => add(lhs, rhs, expr.line),
                    BinOp::Format => format_value(&lhs, &rhs, expr.line),
                }
            }
        }
    }

    fn resolve_name(&self, name: &str, line: usize) -> Result<Value, EvalError> {
        self.get(name)
            .cloned()
            .ok_or_else(|| EvalError::UndefinedName {
                name: name.to_string(),
                line,
            })
    }

    fn call(&self, name: &str, args: &[Expr], line: usize) -> Result<Value, EvalError> {
        if name != VAR_CALL {
            return Err(EvalError::UnsupportedCall {
                name: name.to_string(),
                line,
            });
        }

        let [arg] = args else {
            return Err(EvalError::type_mismatch(
                line,
                format!("Var() takes exactly one argument ({} given)", args.len()),
            ));
        };

        match self.eval(arg)? {
            Value::Str(var_name) => self.lookup_var(&var_name, line),
            other => Err(EvalError::type_mismatch(
                line,
                format!("Var() argument must be a string, found {}", other.type_name()),
            )),
        }
    }

    /// Extract the `deps` binding as identifier to declared value
    ///
    /// Values are returned as evaluated. Chromium-style files unpin entries
    /// with `None`, so the string check is left to the consumer of the
    /// entries it actually selects. A file without `deps` yields an empty
    /// map.
    pub fn dependencies(&self) -> Result<DependencyMap, EvalError> {
        let Some(binding) = self.bindings.get(DEPS_BINDING) else {
            return Ok(DependencyMap::new());
        };

        let Value::Dict(entries) = &binding.value else {
            return Err(EvalError::type_mismatch(
                binding.line,
                format!(
                    "'{}' must be a mapping, found {}",
                    DEPS_BINDING,
                    binding.value.type_name()
                ),
            ));
        };

        for (key, value) in entries {
            if !matches!(value, Value::Str(_)) {
                debug!("Dependency '{}' is not a string ({})", key, value.type_name());
            }
        }
        Ok(entries.clone())
    }
}

fn add(lhs: Value, rhs: Value, line: usize) -> Result<Value, EvalError> {
    match (lhs, rhs) {
        (Value::Str(mut a), Value::Str(b)) => {
            a.push_str(&b);
            Ok(Value::Str(a))
        }
        (Value::Int(a), Value::Int(b)) => a
            .checked_add(b)
            .map(Value::Int)
            .ok_or_else(|| EvalError::type_mismatch(line, "integer overflow")),
        (Value::List(mut a), Value::List(b)) => {
            a.extend(b);
            Ok(Value::List(a))
        }
        (a, b) => Err(EvalError::type_mismatch(
            line,
            format!(
                "unsupported operand types for +: '{}' and '{}'",
                a.type_name(),
                b.type_name()
            ),
        )),
    }
}

/// `%` string formatting with a single operand (`%s`, `%d`, `%%`)
fn format_value(template: &Value, arg: &Value, line: usize) -> Result<Value, EvalError> {
    let Value::Str(template) = template else {
        return Err(EvalError::type_mismatch(
            line,
            format!(
                "unsupported operand types for %: '{}' and '{}'",
                template.type_name(),
                arg.type_name()
            ),
        ));
    };
    if !arg.is_scalar() {
        return Err(EvalError::type_mismatch(
            line,
            format!("cannot format a {} into a string", arg.type_name()),
        ));
    }

    let mut out = String::with_capacity(template.len());
    let mut used = 0usize;
    let mut chars = template.chars();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('%') => out.push('%'),
            Some(conv @ ('s' | 'd')) => {
                used += 1;
                if used > 1 {
                    return Err(EvalError::type_mismatch(
                        line,
                        "not enough arguments for format string",
                    ));
                }
                match (conv, arg) {
                    ('d', Value::Int(i)) => out.push_str(&i.to_string()),
                    ('d', Value::Bool(b)) => out.push_str(if *b { "1" } else { "0" }),
                    ('d', other) => {
                        return Err(EvalError::type_mismatch(
                            line,
                            format!("%d format requires a number, not {}", other.type_name()),
                        ));
                    }
                    _ => out.push_str(&arg.to_string()),
                }
            }
            Some(other) => {
                return Err(EvalError::type_mismatch(
                    line,
                    format!("unsupported format character '{}'", other),
                ));
            }
            None => {
                return Err(EvalError::type_mismatch(line, "incomplete format"));
            }
        }
    }

    if used == 0 {
        return Err(EvalError::type_mismatch(
            line,
            "not all arguments converted during string formatting",
        ));
    }

    Ok(Value::Str(out))
}

/// Evaluate declaration text and return its resolved dependencies
pub fn evaluate_deps(source: &str) -> Result<DependencyMap, EvalError> {
    let mut scope = Scope::new();
    scope.execute(source)?;
    let deps = scope.dependencies()?;
    debug!("Resolved {} dependencies", deps.len());
    Ok(deps)
}
