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

//! Path resolution, shape assembly and computation calls.

use super::*;

/// What a resolved slot asks the evaluator to do next.
enum Step<N> {
    Ready(Value<N>),
    Evaluate(Box<Expr>),
    Shape { kind: String, properties: Vec<String> },
}

impl<N: Number> Evaluator<'_, N> {
    /// Resolves a path: override first, then the store.
    ///
    /// `Unevaluated` slots are evaluated and memoized as `Done`. A shape field
    /// evaluates every property through its own property path.
    ///
    /// A slot holding a bare reference to another path is followed in place
    /// rather than by recursion. Each hop still spends the two depth units a
    /// path expression costs, so cycles of any length end in
    /// `RecursionLimitExceeded` without growing the stack.
    pub fn eval_path(
        &self,
        depth: usize,
        path: &Path,
        store: &mut Store<N>,
        vary: &VaryMap<N>,
    ) -> TranslationResult<ArgVal<N>> {
        let mut depth = depth;
        let mut current = path.clone();
        // Paths whose slot evaluated to the final result, outermost first.
        let mut chain = Vec::new();

        let result = loop {
            self.enter(depth, || current.to_string())?;
            match next_step(store, &current, vary)? {
                Step::Ready(value) => break ArgVal::Val(value),
                Step::Shape { kind, properties } => {
                    break self.eval_shape(depth, &current, kind, properties, store, vary)?;
                }
                Step::Evaluate(expr) => {
                    if let Expr::Path(next) = expr.as_ref() {
                        self.enter(depth + 1, || expr.describe())?;
                        let next = next.clone();
                        chain.push(std::mem::replace(&mut current, next));
                        depth += 2;
                        continue;
                    }
                    let value = self.eval_expr(depth + 1, &expr, store, vary)?;
                    chain.push(current);
                    break value;
                }
            }
        };

        memoize_chain(chain, result, store)
    }

    /// Evaluates each property of the shape at `path` in dictionary order.
    fn eval_shape(
        &self,
        depth: usize,
        path: &Path,
        kind: String,
        names: Vec<String>,
        store: &mut Store<N>,
        vary: &VaryMap<N>,
    ) -> TranslationResult<ArgVal<N>> {
        let (object, field) = (path.object(), path.field_name());
        let mut properties = BTreeMap::new();
        for name in names {
            let property = Path::property(object, field, name.as_str());
            let value = self.eval_path(depth + 1, &property, store, vary)?;
            properties.insert(name, plain_value(&property, value)?);
        }
        properties.insert("name".to_string(), Value::Str(format!("{object}.{field}")));
        Ok(ArgVal::Shape(Shape { kind, properties }))
    }

    /// Looks up a computation, then evaluates its arguments and applies it.
    pub(super) fn eval_comp(
        &self,
        depth: usize,
        name: &str,
        args: &[Expr],
        store: &mut Store<N>,
        vary: &VaryMap<N>,
    ) -> TranslationResult<ArgVal<N>> {
        let Some(f) = self.computations.get(name) else {
            return Err(unknown_computation(name));
        };
        let args = self.eval_args(depth, args, store, vary)?;
        f(&args)
    }

    /// Evaluates arguments left to right, threading the store.
    pub(super) fn eval_args(
        &self,
        depth: usize,
        args: &[Expr],
        store: &mut Store<N>,
        vary: &VaryMap<N>,
    ) -> TranslationResult<Vec<ArgVal<N>>> {
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.eval_expr(depth + 1, arg, store, vary)?);
        }
        Ok(values)
    }
}

/// Copies out what `path` resolves to so the store can be threaded mutably.
fn next_step<N: Number>(
    store: &Store<N>,
    path: &Path,
    vary: &VaryMap<N>,
) -> TranslationResult<Step<N>> {
    Ok(match store.resolve(path, vary)? {
        Resolved::Override(v) => Step::Ready(Value::Float(v)),
        Resolved::Field(FieldSlot::Expr(TagExpr::Done(v)))
        | Resolved::Property(TagExpr::Done(v)) => Step::Ready(v.clone()),
        Resolved::Field(FieldSlot::Expr(TagExpr::Unevaluated(e)))
        | Resolved::Property(TagExpr::Unevaluated(e)) => Step::Evaluate(Box::new(e.clone())),
        Resolved::Field(FieldSlot::Shape { kind, properties }) => Step::Shape {
            kind: kind.clone(),
            properties: properties.keys().cloned().collect(),
        },
    })
}

/// Caches `result` at every path of a reference chain, innermost first.
///
/// Only field paths may evaluate to a shape; shapes are never cached.
fn memoize_chain<N: Number>(
    chain: Vec<Path>,
    result: ArgVal<N>,
    store: &mut Store<N>,
) -> TranslationResult<ArgVal<N>> {
    for path in chain.iter().rev() {
        match &result {
            ArgVal::Val(value) => store.cache_done(path, value.clone()),
            ArgVal::Shape(_) if path.is_field() => {}
            ArgVal::Shape(shape) => {
                return Err(TranslationError::type_mismatch(
                    path.to_string(),
                    format!("property evaluated to shape {}", shape.name()),
                ));
            }
        }
    }
    Ok(result)
}

fn plain_value<N: Number>(property: &Path, value: ArgVal<N>) -> TranslationResult<Value<N>> {
    match value {
        ArgVal::Val(value) => Ok(value),
        other => other.into_value(&property.to_string()),
    }
}

fn unknown_computation(name: &str) -> TranslationError {
    TranslationError::UnknownComputation(name.to_string())
}
