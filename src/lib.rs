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

//! Translation evaluator and optimization-problem compiler for diagrams.
//!
//! This crate provides:
//! - A symbolic store of objects, fields and shape properties.
//! - Analysis passes that find varying parameters, unset properties and
//!   objective/constraint calls.
//! - A lazy, memoizing expression evaluator with an override map and a
//!   recursion guard, generic over the number type.
//! - A deterministic sampler for the initial state.
//! - A penalty-weighted energy over the varying vector.
//!
//! # Pipeline
//!
//! 1. The front-end builds a [`Store`] (declared objects, shapes, expressions).
//! 2. [`gen_opt_problem_and_state`] analyzes it, samples free parameters,
//!    collects declared and default functions and compiles the energy.
//! 3. An external optimizer repeatedly calls
//!    [`CompiledEnergy::evaluate`] with the penalty weight and a varying vector.
//!
//! # Paths
//!
//! Slots are addressed by [`Path`]s, written `object.field` or
//! `object.field.property`:
//!
//! ```
//! use diagram_translation::Path;
//!
//! let path: Path = "A.shape.x".parse().unwrap();
//! assert_eq!(path, Path::property("A", "shape", "x"));
//! ```

mod analysis;
mod ast;
mod catalog;
mod compiler;
mod config;
mod diagnostics;
mod model;
mod number;
mod parser;
mod problem;
mod registry;
mod stdlib;

pub use analysis::{
    find_declared_fns, find_default_fns, find_shape_names, find_shape_property_paths,
    find_uninitialized_paths, find_varying_paths,
};
pub use ast::{BinaryOp, Expr, FnCall, FnRole, Path, UnaryOp};
pub use catalog::{PropertyDef, PropertyType, Sampler, ShapeCatalog, ShapeDef};
pub use compiler::{
    compile_energy, CompiledEnergy, EnergyTerms, Evaluator, MAX_RECURSION_LIMIT, MAX_SIZE, MIN_SIZE,
};
pub use config::{Canvas, TranslationConfig};
pub use diagnostics::SyntaxError;
pub use model::{
    init_fields, init_shapes, ArgVal, FieldSlot, FnDone, PropertyDict, Resolved, Shape, Store,
    TagExpr, TranslationError, TranslationResult, Value, VaryMap,
};
pub use number::Number;
pub use parser::parse_path;
pub use problem::{gen_opt_problem_and_state, OptimizationState, OptimizerPhase, Params};
pub use registry::{
    ArgType, CompFn, ComputationRegistry, FunctionRegistry, Registries, ScoreFn, Signature,
};
pub use stdlib::standard_catalog;

#[cfg(test)]
mod tests;
