//! Tree-walking evaluator for marker expressions

use crate::context::{DataContext, Value};
use crate::error::EvalError;
use crate::expr::ast::{BinaryOp, Expr, MarkerExpr, UnaryOp};

/// Host capabilities an expression may call into
///
/// The render engine implements this to provide `include`; evaluation never
/// touches the filesystem or any other host facility on its own.
pub trait EvalHost {
    /// Load and render another view with the same data context
    ///
    /// Missing views yield `Value::Null` (empty output) rather than an error.
    fn include(&mut self, view: &str, ctx: &mut DataContext) -> Result<Value, EvalError>;
}

/// Host with no include capability; `include` warns and yields empty output
pub struct NoIncludes;

impl EvalHost for NoIncludes {
    fn include(&mut self, view: &str, _ctx: &mut DataContext) -> Result<Value, EvalError> {
        tracing::warn!(view, "include skipped: no views directory configured");
        Ok(Value::Null)
    }
}

/// Evaluate the top-level content of one marker
///
/// Declarations and assignments mutate the context and yield `Value::Null`,
/// so the marker itself contributes no visible text.
pub fn eval_marker(
    marker: &MarkerExpr,
    ctx: &mut DataContext,
    host: &mut dyn EvalHost,
) -> Result<Value, EvalError> {
    match marker {
        MarkerExpr::Declaration { name, value, .. } | MarkerExpr::Assignment { name, value } => {
            let value = eval_expr(value, ctx, host)?;
            ctx.insert(name.clone(), value);
            Ok(Value::Null)
        }
        MarkerExpr::Value(expr) => eval_expr(expr, ctx, host),
    }
}

fn eval_expr(
    expr: &Expr,
    ctx: &mut DataContext,
    host: &mut dyn EvalHost,
) -> Result<Value, EvalError> {
    match expr {
        Expr::Null => Ok(Value::Null),
        Expr::Bool(b) => Ok(Value::Bool(*b)),
        Expr::Number(n) => Ok(Value::Number(*n)),
        Expr::Str(s) => Ok(Value::String(s.clone())),
        Expr::Ident(name) => ctx
            .get(name)
            .cloned()
            .ok_or_else(|| EvalError::UnknownIdentifier { name: name.clone() }),
        Expr::Member { object, field } => {
            let object = eval_expr(object, ctx, host)?;
            match object {
                // A missing key yields null, not an error
                Value::Object(entries) => Ok(entries.get(field).cloned().unwrap_or(Value::Null)),
                other => Err(EvalError::type_error(format!(
                    "cannot read field '{}' of {}",
                    field,
                    other.type_name()
                ))),
            }
        }
        Expr::Call { function, args } => eval_call(function, args, ctx, host),
        Expr::Unary { op, operand } => {
            let operand = eval_expr(operand, ctx, host)?;
            match op {
                UnaryOp::Neg => match operand {
                    Value::Number(n) => Ok(Value::Number(-n)),
                    other => Err(EvalError::type_error(format!(
                        "cannot negate {}",
                        other.type_name()
                    ))),
                },
                UnaryOp::Not => Ok(Value::Bool(!operand.is_truthy())),
            }
        }
        Expr::Binary { op, lhs, rhs } => eval_binary(*op, lhs, rhs, ctx, host),
        Expr::Ternary {
            cond,
            then_value,
            else_value,
        } => {
            if eval_expr(cond, ctx, host)?.is_truthy() {
                eval_expr(then_value, ctx, host)
            } else {
                eval_expr(else_value, ctx, host)
            }
        }
    }
}

fn eval_binary(
    op: BinaryOp,
    lhs: &Expr,
    rhs: &Expr,
    ctx: &mut DataContext,
    host: &mut dyn EvalHost,
) -> Result<Value, EvalError> {
    // Boolean operators short-circuit; everything else evaluates both sides
    match op {
        BinaryOp::And => {
            if !eval_expr(lhs, ctx, host)?.is_truthy() {
                return Ok(Value::Bool(false));
            }
            return Ok(Value::Bool(eval_expr(rhs, ctx, host)?.is_truthy()));
        }
        BinaryOp::Or => {
            if eval_expr(lhs, ctx, host)?.is_truthy() {
                return Ok(Value::Bool(true));
            }
            return Ok(Value::Bool(eval_expr(rhs, ctx, host)?.is_truthy()));
        }
        _ => {}
    }

    let lhs = eval_expr(lhs, ctx, host)?;
    let rhs = eval_expr(rhs, ctx, host)?;

    match op {
        BinaryOp::Add => match (&lhs, &rhs) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
            (Value::String(_), _) | (_, Value::String(_)) => {
                match (lhs.concat_text(), rhs.concat_text()) {
                    (Some(a), Some(b)) => Ok(Value::String(a + &b)),
                    _ => Err(EvalError::type_error(format!(
                        "cannot concatenate {} and {}",
                        lhs.type_name(),
                        rhs.type_name()
                    ))),
                }
            }
            _ => Err(EvalError::type_error(format!(
                "cannot add {} and {}",
                lhs.type_name(),
                rhs.type_name()
            ))),
        },
        BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => match (&lhs, &rhs) {
            // Division is total over f64; x/0 is inf or NaN
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(match op {
                BinaryOp::Sub => a - b,
                BinaryOp::Mul => a * b,
                BinaryOp::Div => a / b,
                _ => a % b,
            })),
            _ => Err(EvalError::type_error(format!(
                "arithmetic requires numbers, got {} and {}",
                lhs.type_name(),
                rhs.type_name()
            ))),
        },
        BinaryOp::Eq => Ok(Value::Bool(lhs == rhs)),
        BinaryOp::Ne => Ok(Value::Bool(lhs != rhs)),
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
            let ordering = match (&lhs, &rhs) {
                (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
                (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
                _ => {
                    return Err(EvalError::type_error(format!(
                        "cannot compare {} and {}",
                        lhs.type_name(),
                        rhs.type_name()
                    )))
                }
            };
            let result = match ordering {
                Some(ord) => match op {
                    BinaryOp::Lt => ord.is_lt(),
                    BinaryOp::Le => ord.is_le(),
                    BinaryOp::Gt => ord.is_gt(),
                    _ => ord.is_ge(),
                },
                // NaN compares false, as in the host language the templates came from
                None => false,
            };
            Ok(Value::Bool(result))
        }
        BinaryOp::And | BinaryOp::Or => unreachable!("handled above"),
    }
}

fn eval_call(
    function: &str,
    args: &[Expr],
    ctx: &mut DataContext,
    host: &mut dyn EvalHost,
) -> Result<Value, EvalError> {
    let mut values = Vec::with_capacity(args.len());
    for arg in args {
        values.push(eval_expr(arg, ctx, host)?);
    }

    let arity = |expected: &str| EvalError::Arity {
        function: function.to_string(),
        expected: expected.to_string(),
        got: values.len(),
    };

    match function {
        "include" => {
            let [Value::String(view)] = &values[..] else {
                return match values.len() {
                    1 => Err(EvalError::type_error("include expects a view name string")),
                    _ => Err(arity("1")),
                };
            };
            let view = view.clone();
            host.include(&view, ctx)
        }
        "upper" | "lower" | "trim" => {
            let [Value::String(s)] = &values[..] else {
                return match values.len() {
                    1 => Err(EvalError::type_error(format!(
                        "{} expects a string",
                        function
                    ))),
                    _ => Err(arity("1")),
                };
            };
            Ok(Value::String(match function {
                "upper" => s.to_uppercase(),
                "lower" => s.to_lowercase(),
                _ => s.trim().to_string(),
            }))
        }
        "len" => {
            let [value] = &values[..] else {
                return Err(arity("1"));
            };
            let len = match value {
                Value::String(s) => s.chars().count(),
                Value::Array(items) => items.len(),
                Value::Object(entries) => entries.len(),
                other => {
                    return Err(EvalError::type_error(format!(
                        "len is not defined for {}",
                        other.type_name()
                    )))
                }
            };
            Ok(Value::Number(len as f64))
        }
        "str" => {
            let [value] = &values[..] else {
                return Err(arity("1"));
            };
            match value.concat_text() {
                Some(text) => Ok(Value::String(text)),
                None => Err(EvalError::type_error(format!(
                    "cannot convert {} to string",
                    value.type_name()
                ))),
            }
        }
        "num" => {
            let [value] = &values[..] else {
                return Err(arity("1"));
            };
            match value {
                Value::Number(n) => Ok(Value::Number(*n)),
                Value::Bool(b) => Ok(Value::Number(if *b { 1.0 } else { 0.0 })),
                Value::String(s) => s.trim().parse::<f64>().map(Value::Number).map_err(|_| {
                    EvalError::type_error(format!("cannot parse '{}' as a number", s))
                }),
                other => Err(EvalError::type_error(format!(
                    "cannot convert {} to number",
                    other.type_name()
                ))),
            }
        }
        "round" | "floor" | "ceil" | "abs" => {
            let [Value::Number(n)] = &values[..] else {
                return match values.len() {
                    1 => Err(EvalError::type_error(format!(
                        "{} expects a number",
                        function
                    ))),
                    _ => Err(arity("1")),
                };
            };
            Ok(Value::Number(match function {
                "round" => n.round(),
                "floor" => n.floor(),
                "ceil" => n.ceil(),
                _ => n.abs(),
            }))
        }
        "min" | "max" => {
            if values.len() < 2 {
                return Err(arity("at least 2"));
            }
            let mut best: Option<f64> = None;
            for value in &values {
                let Value::Number(n) = value else {
                    return Err(EvalError::type_error(format!(
                        "{} expects numbers, got {}",
                        function,
                        value.type_name()
                    )));
                };
                best = Some(match best {
                    None => *n,
                    Some(b) if function == "min" => b.min(*n),
                    Some(b) => b.max(*n),
                });
            }
            Ok(Value::Number(best.unwrap_or(f64::NAN)))
        }
        "contains" => match &values[..] {
            [Value::String(haystack), Value::String(needle)] => {
                Ok(Value::Bool(haystack.contains(needle.as_str())))
            }
            [Value::Array(items), needle] => Ok(Value::Bool(items.contains(needle))),
            [_, _] => Err(EvalError::type_error(
                "contains expects (string, string) or (array, value)",
            )),
            _ => Err(arity("2")),
        },
        "replace" => match &values[..] {
            [Value::String(s), Value::String(from), Value::String(to)] => {
                Ok(Value::String(s.replace(from.as_str(), to)))
            }
            [_, _, _] => Err(EvalError::type_error("replace expects three strings")),
            _ => Err(arity("3")),
        },
        "default" => match &values[..] {
            [Value::Null, fallback] => Ok(fallback.clone()),
            [value, _] => Ok(value.clone()),
            _ => Err(arity("2")),
        },
        _ => Err(EvalError::UnknownFunction {
            name: function.to_string(),
        }),
    }
}
