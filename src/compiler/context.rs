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

//! Evaluator state and pass-level entry points.

use super::*;

/// Deepest depth budget an evaluator accepts.
///
/// Operator and computation nesting still recurse natively, so the budget is
/// bounded to stay well inside a default 2 MiB thread stack.
pub const MAX_RECURSION_LIMIT: usize = 1024;

/// Recursive evaluator of symbolic expressions against a threaded store.
///
/// The evaluator itself is stateless apart from the computation registry and
/// the depth budget; memoization lives in the `&mut Store` each pass owns.
pub struct Evaluator<'a, N> {
    pub(super) computations: &'a ComputationRegistry<N>,
    pub(super) limit: usize,
}

impl<'a, N: Number> Evaluator<'a, N> {
    /// Creates an evaluator with depth budget `limit`, capped at
    /// [`MAX_RECURSION_LIMIT`].
    pub fn new(computations: &'a ComputationRegistry<N>, limit: usize) -> Self {
        if limit > MAX_RECURSION_LIMIT {
            log::warn!("recursion limit {limit} capped at {MAX_RECURSION_LIMIT}");
        }
        Self {
            computations,
            limit: limit.min(MAX_RECURSION_LIMIT),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Fails once `depth` reaches the budget.
    pub(super) fn enter(
        &self,
        depth: usize,
        context: impl FnOnce() -> String,
    ) -> TranslationResult<()> {
        if depth >= self.limit {
            return Err(TranslationError::RecursionLimitExceeded {
                limit: self.limit,
                context: context(),
            });
        }
        Ok(())
    }

    /// Evaluates `expr` on an owned store and hands the updated store back.
    pub fn evaluate(
        &self,
        expr: &Expr,
        mut store: Store<N>,
        vary: &VaryMap<N>,
    ) -> TranslationResult<(ArgVal<N>, Store<N>)> {
        let value = self.eval_expr(0, expr, &mut store, vary)?;
        Ok((value, store))
    }

    /// Evaluates the shapes at `names` in order.
    pub fn eval_shapes(
        &self,
        names: &[Path],
        store: &mut Store<N>,
        vary: &VaryMap<N>,
    ) -> TranslationResult<Vec<Shape<N>>> {
        let mut shapes = Vec::with_capacity(names.len());
        for name in names {
            match self.eval_path(0, name, store, vary)? {
                ArgVal::Shape(shape) => shapes.push(shape),
                ArgVal::Val(value) => {
                    return Err(TranslationError::type_mismatch(
                        name.to_string(),
                        format!("expected shape, found {}", value.type_name()),
                    ));
                }
            }
        }
        Ok(shapes)
    }

    /// Evaluates the arguments of one objective or constraint call.
    pub fn eval_fn(
        &self,
        call: &FnCall,
        store: &mut Store<N>,
        vary: &VaryMap<N>,
    ) -> TranslationResult<FnDone<N>> {
        let args = self.eval_args(0, &call.args, store, vary)?;
        Ok(FnDone {
            role: call.role,
            name: call.name.clone(),
            args,
        })
    }
}
