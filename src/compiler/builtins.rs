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

//! Standard computation, objective and constraint functions.
//!
//! Constraints are exterior penalties: each returns `max(g, 0)^2` for a
//! violation measure `g` that is non-positive when the constraint holds.

use super::*;

/// Smallest allowed shape extent for `minSize`.
pub const MIN_SIZE: f64 = 20.0;
/// Largest allowed shape extent for `maxSize`.
pub const MAX_SIZE: f64 = 250.0;
/// Keeps `repel` finite for coincident centers.
const REPEL_EPSILON: f64 = 1e-6;

/// Registers `abs`, `sqrt`, `max`, `min`, `average`, `norm`, `centerX`, `centerY`.
pub(crate) fn register_computations<N: Number>(registry: &mut ComputationRegistry<N>) {
    registry.register("abs", |args| {
        let [x] = floats::<N, 1>("abs", args)?;
        Ok(float(x.abs()))
    });
    registry.register("sqrt", |args| {
        let [x] = floats::<N, 1>("sqrt", args)?;
        if x.value() < 0.0 {
            return Err(TranslationError::type_mismatch(
                "sqrt",
                format!("negative argument {}", x.value()),
            ));
        }
        Ok(float(x.sqrt()))
    });
    registry.register("max", |args| {
        let [a, b] = floats::<N, 2>("max", args)?;
        Ok(float(a.max(b)))
    });
    registry.register("min", |args| {
        let [a, b] = floats::<N, 2>("min", args)?;
        Ok(float(a.min(b)))
    });
    registry.register("average", |args| {
        if args.is_empty() {
            return Err(TranslationError::arity("average", 1, 0));
        }
        let mut sum = N::zero();
        for arg in args {
            sum = sum + arg.float("average")?;
        }
        Ok(float(sum / N::from_f64(args.len() as f64)))
    });
    registry.register("norm", |args| {
        let [x, y] = floats::<N, 2>("norm", args)?;
        Ok(float((x.clone() * x + y.clone() * y).sqrt()))
    });
    registry.register("centerX", |args| {
        let shape = one_shape("centerX", args)?;
        Ok(float(center(shape)?.0))
    });
    registry.register("centerY", |args| {
        let shape = one_shape("centerY", args)?;
        Ok(float(center(shape)?.1))
    });
}

/// Registers `near`, `nearPoint`, `repel`, `centerLabel`.
pub(crate) fn register_objectives<N: Number>(registry: &mut FunctionRegistry<N>) {
    let shapes2 = || Signature::new(vec![ArgType::Shape, ArgType::Shape]);

    registry.register("near", shapes2(), |args| {
        center_distance_sq(shape_arg(args, 0, "near")?, shape_arg(args, 1, "near")?)
    });
    registry.register(
        "nearPoint",
        Signature::new(vec![ArgType::Shape, ArgType::Float, ArgType::Float]),
        |args| {
            let (x, y) = center(shape_arg(args, 0, "nearPoint")?)?;
            let dx = x - args[1].float("nearPoint")?;
            let dy = y - args[2].float("nearPoint")?;
            Ok(dx.clone() * dx + dy.clone() * dy)
        },
    );
    registry.register("repel", shapes2(), |args| {
        let d2 = center_distance_sq(shape_arg(args, 0, "repel")?, shape_arg(args, 1, "repel")?)?;
        Ok(N::from_f64(1.0) / (d2 + N::from_f64(REPEL_EPSILON)))
    });
    registry.register("centerLabel", shapes2(), |args| {
        center_distance_sq(
            shape_arg(args, 0, "centerLabel")?,
            shape_arg(args, 1, "centerLabel")?,
        )
    });
}

/// Registers `minSize`, `maxSize`, `contains`, `disjoint`, `smallerThan`.
pub(crate) fn register_constraints<N: Number>(registry: &mut FunctionRegistry<N>) {
    let shape1 = || Signature::new(vec![ArgType::Shape]);
    let shapes2 = || Signature::new(vec![ArgType::Shape, ArgType::Shape]);

    registry.register("minSize", shape1(), |args| {
        let (smallest, _) = size(shape_arg(args, 0, "minSize")?)?;
        Ok(penalty(N::from_f64(MIN_SIZE) - smallest))
    });
    registry.register("maxSize", shape1(), |args| {
        let (_, largest) = size(shape_arg(args, 0, "maxSize")?)?;
        Ok(penalty(largest - N::from_f64(MAX_SIZE)))
    });
    registry.register("contains", shapes2(), |args| {
        let outer = shape_arg(args, 0, "contains")?;
        let inner = shape_arg(args, 1, "contains")?;
        let d = center_distance_sq(outer, inner)?.sqrt();
        Ok(penalty(d + extent(inner)? - extent(outer)?))
    });
    registry.register("disjoint", shapes2(), |args| {
        let a = shape_arg(args, 0, "disjoint")?;
        let b = shape_arg(args, 1, "disjoint")?;
        let d = center_distance_sq(a, b)?.sqrt();
        Ok(penalty(extent(a)? + extent(b)? - d))
    });
    registry.register("smallerThan", shapes2(), |args| {
        let a = shape_arg(args, 0, "smallerThan")?;
        let b = shape_arg(args, 1, "smallerThan")?;
        Ok(penalty(extent(a)? - extent(b)?))
    });
}

/// `max(g, 0)^2`
fn penalty<N: Number>(g: N) -> N {
    let g = g.max(N::zero());
    g.clone() * g
}

fn float<N>(value: N) -> ArgVal<N> {
    ArgVal::Val(Value::Float(value))
}

/// Extracts exactly `K` float arguments.
fn floats<N: Number, const K: usize>(name: &str, args: &[ArgVal<N>]) -> TranslationResult<[N; K]> {
    if args.len() != K {
        return Err(TranslationError::arity(name, K, args.len()));
    }
    let values = args
        .iter()
        .map(|arg| arg.float(name))
        .collect::<TranslationResult<Vec<N>>>()?;
    values
        .try_into()
        .map_err(|_| TranslationError::arity(name, K, args.len()))
}

fn one_shape<'a, N: Number>(name: &str, args: &'a [ArgVal<N>]) -> TranslationResult<&'a Shape<N>> {
    if args.len() != 1 {
        return Err(TranslationError::arity(name, 1, args.len()));
    }
    args[0].shape(name)
}

fn shape_arg<'a, N: Number>(
    args: &'a [ArgVal<N>],
    index: usize,
    name: &str,
) -> TranslationResult<&'a Shape<N>> {
    args.get(index)
        .ok_or_else(|| TranslationError::arity(name, index + 1, args.len()))?
        .shape(name)
}

/// Center of a shape: `(x, y)`, or the midpoint of a line.
fn center<N: Number>(shape: &Shape<N>) -> TranslationResult<(N, N)> {
    if shape.has("x") {
        return Ok((shape.float("x")?, shape.float("y")?));
    }
    let half = N::from_f64(0.5);
    let x = (shape.float("startX")? + shape.float("endX")?) * half.clone();
    let y = (shape.float("startY")? + shape.float("endY")?) * half;
    Ok((x, y))
}

fn center_distance_sq<N: Number>(a: &Shape<N>, b: &Shape<N>) -> TranslationResult<N> {
    let (ax, ay) = center(a)?;
    let (bx, by) = center(b)?;
    let dx = ax - bx;
    let dy = ay - by;
    Ok(dx.clone() * dx + dy.clone() * dy)
}

/// `(smallest, largest)` side of a shape: the radius for circles.
fn size<N: Number>(shape: &Shape<N>) -> TranslationResult<(N, N)> {
    if shape.has("r") {
        let r = shape.float("r")?;
        return Ok((r.clone(), r));
    }
    let w = shape.float("w")?;
    let h = shape.float("h")?;
    Ok((w.clone().min(h.clone()), w.max(h)))
}

/// Bounding radius; shapes without a size count as points.
fn extent<N: Number>(shape: &Shape<N>) -> TranslationResult<N> {
    if shape.has("r") {
        return shape.float("r");
    }
    if shape.has("w") && shape.has("h") {
        let (_, largest) = size(shape)?;
        return Ok(largest * N::from_f64(0.5));
    }
    Ok(N::zero())
}
