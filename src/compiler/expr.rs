/*
MIT License

Copyright (c) 2026 Raja Lehtihet and Wael El Oraiby

Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the "Software"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
*/

//! Expression evaluation and strict operator arithmetic.

use super::*;

impl<N: Number> Evaluator<'_, N> {
    /// Evaluates one expression at recursion depth `depth`.
    pub fn eval_expr(
        &self,
        depth: usize,
        expr: &Expr,
        store: &mut Store<N>,
        vary: &VaryMap<N>,
    ) -> TranslationResult<ArgVal<N>> {
        self.enter(depth, || expr.describe())?;
        match expr {
            Expr::Unary { op, arg } => self.eval_unary_node(depth, *op, arg, store, vary),
            Expr::Binary { op, left, right } => {
                self.eval_binary_node(depth, *op, left, right, store, vary)
            }
            Expr::Comp { name, args } => self.eval_comp(depth, name, args, store, vary),
            Expr::Path(path) => self.eval_path(depth + 1, path, store, vary),
            leaf => eval_leaf(leaf),
        }
    }

    fn eval_unary_node(
        &self,
        depth: usize,
        op: UnaryOp,
        arg: &Expr,
        store: &mut Store<N>,
        vary: &VaryMap<N>,
    ) -> TranslationResult<ArgVal<N>> {
        let value = self.eval_expr(depth + 1, arg, store, vary)?;
        eval_unary(op, operand(value, || "unary operand".to_string())?)
    }

    /// Left operand first: its cache writes are visible to the right one.
    fn eval_binary_node(
        &self,
        depth: usize,
        op: BinaryOp,
        left: &Expr,
        right: &Expr,
        store: &mut Store<N>,
        vary: &VaryMap<N>,
    ) -> TranslationResult<ArgVal<N>> {
        let left = self.eval_expr(depth + 1, left, store, vary)?;
        let left = operand(left, || format!("operand of '{}'", op.symbol()))?;
        let right = self.eval_expr(depth + 1, right, store, vary)?;
        let right = operand(right, || format!("operand of '{}'", op.symbol()))?;
        eval_binary(op, left, right)
    }
}

/// Literals evaluate to themselves; the remaining forms are refused.
fn eval_leaf<N: Number>(expr: &Expr) -> TranslationResult<ArgVal<N>> {
    let value = match expr {
        Expr::Int(v) => Value::Int(*v),
        Expr::Float(v) => Value::Float(N::from_f64(*v)),
        Expr::Str(s) => Value::Str(s.clone()),
        Expr::Bool(b) => Value::Bool(*b),
        other => return Err(TranslationError::UnsupportedExpression(other.describe())),
    };
    Ok(ArgVal::Val(value))
}

/// An operator operand must be a plain value.
fn operand<N: Number>(
    arg: ArgVal<N>,
    context: impl FnOnce() -> String,
) -> TranslationResult<Value<N>> {
    match arg {
        ArgVal::Val(value) => Ok(value),
        shape => shape.into_value(&context()),
    }
}

/// Applies a unary operator.
pub(super) fn eval_unary<N: Number>(op: UnaryOp, value: Value<N>) -> TranslationResult<ArgVal<N>> {
    let out = match (op, value) {
        (UnaryOp::UPlus, v @ (Value::Float(_) | Value::Int(_))) => v,
        (UnaryOp::UMinus, Value::Float(v)) => Value::Float(-v),
        (UnaryOp::UMinus, Value::Int(v)) => Value::Int(v.checked_neg().ok_or_else(|| {
            TranslationError::IntegerOverflow {
                context: format!("-({v})"),
            }
        })?),
        (op, other) => {
            return Err(TranslationError::type_mismatch(
                format!("unary {op:?}"),
                format!("expected a number, found {}", other.type_name()),
            ));
        }
    };
    Ok(ArgVal::Val(out))
}

/// Applies a binary operator to same-typed numeric operands.
pub(super) fn eval_binary<N: Number>(
    op: BinaryOp,
    left: Value<N>,
    right: Value<N>,
) -> TranslationResult<ArgVal<N>> {
    let out = match (left, right) {
        (Value::Float(l), Value::Float(r)) => Value::Float(float_binary(op, l, r)?),
        (Value::Int(l), Value::Int(r)) => Value::Int(int_binary(op, l, r)?),
        (l, r) => {
            return Err(TranslationError::type_mismatch(
                format!("'{}'", op.symbol()),
                format!(
                    "operands must both be float or both be int, found {} and {}",
                    l.type_name(),
                    r.type_name()
                ),
            ));
        }
    };
    Ok(ArgVal::Val(out))
}

fn float_binary<N: Number>(op: BinaryOp, l: N, r: N) -> TranslationResult<N> {
    Ok(match op {
        BinaryOp::BPlus => l + r,
        BinaryOp::BMinus => l - r,
        BinaryOp::Multiply => l * r,
        BinaryOp::Divide => {
            if r.is_zero() {
                return Err(TranslationError::DivideByZero {
                    context: format!("{:?} / {:?}", l.value(), r.value()),
                });
            }
            l / r
        }
        BinaryOp::Exp => l.powf(r),
    })
}

fn int_binary(op: BinaryOp, l: i64, r: i64) -> TranslationResult<i64> {
    let overflow = || TranslationError::IntegerOverflow {
        context: format!("{l} {} {r}", op.symbol()),
    };
    match op {
        BinaryOp::BPlus => l.checked_add(r).ok_or_else(overflow),
        BinaryOp::BMinus => l.checked_sub(r).ok_or_else(overflow),
        BinaryOp::Multiply => l.checked_mul(r).ok_or_else(overflow),
        BinaryOp::Divide => {
            if r == 0 {
                return Err(TranslationError::DivideByZero {
                    context: format!("{l} / {r}"),
                });
            }
            l.checked_div(r).ok_or_else(overflow)
        }
        BinaryOp::Exp => {
            if r < 0 {
                return Err(TranslationError::type_mismatch(
                    format!("{l} ^ {r}"),
                    "integer power needs a non-negative exponent",
                ));
            }
            let exponent = u32::try_from(r).map_err(|_| overflow())?;
            l.checked_pow(exponent).ok_or_else(overflow)
        }
    }
}
