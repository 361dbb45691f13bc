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

//! Top-level assembly of the optimization problem and its state.

use fastrand::Rng;
use std::sync::Arc;

use crate::analysis::{
    find_declared_fns, find_default_fns, find_shape_names, find_shape_property_paths,
    find_uninitialized_paths, find_varying_paths,
};
use crate::ast::{FnCall, FnRole, Path};
use crate::catalog::ShapeCatalog;
use crate::compiler::{compile_energy, CompiledEnergy};
use crate::config::TranslationConfig;
use crate::model::{
    init_fields, init_shapes, FieldSlot, Shape, Store, TranslationError, TranslationResult, Value,
    VaryMap,
};
use crate::registry::Registries;

/// Progress of the external optimizer driver.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum OptimizerPhase {
    /// Start of an outer (penalty) iteration.
    #[default]
    NewIteration,
    /// Inner unconstrained loop running; carries the last varying vector.
    UnconstrainedRunning(Vec<f64>),
    /// Inner loop converged at the carried vector.
    UnconstrainedConverged(Vec<f64>),
    /// Outer loop converged.
    OptimizationConverged,
}

impl OptimizerPhase {
    /// Whether the driver may move from `self` to `next`.
    pub fn permits(&self, next: &OptimizerPhase) -> bool {
        use OptimizerPhase::*;
        matches!(
            (self, next),
            (NewIteration, UnconstrainedRunning(_))
                | (UnconstrainedRunning(_), UnconstrainedRunning(_))
                | (UnconstrainedRunning(_), UnconstrainedConverged(_))
                | (UnconstrainedConverged(_), NewIteration)
                | (UnconstrainedConverged(_), OptimizationConverged)
        )
    }

    pub fn is_converged(&self) -> bool {
        matches!(self, OptimizerPhase::OptimizationConverged)
    }
}

/// Penalty weight, optimizer phase and the energy.
#[derive(Debug)]
pub struct Params {
    pub penalty_weight: f64,
    pub phase: OptimizerPhase,
    pub energy: CompiledEnergy<f64>,
}

/// Everything an optimizer and a renderer need after assembly.
#[derive(Debug)]
pub struct OptimizationState {
    /// Shapes evaluated at `varying_state`.
    pub shapes: Vec<Shape<f64>>,
    pub shape_names: Vec<Path>,
    pub shape_property_paths: Vec<Path>,
    /// Initialized store the energy was compiled over.
    pub store: Store<f64>,
    pub varying_paths: Vec<Path>,
    /// Non-numeric properties that were unset before sampling.
    pub uninitialized_paths: Vec<Path>,
    /// Current varying vector, ordered like `varying_paths`.
    pub varying_state: Vec<f64>,
    pub objectives: Vec<FnCall>,
    pub constraints: Vec<FnCall>,
    pub params: Params,
    pub rng: Rng,
}

impl OptimizationState {
    /// Energy of `varying` at the current penalty weight.
    pub fn energy(&self, varying: &[f64]) -> TranslationResult<f64> {
        self.params
            .energy
            .evaluate(self.params.penalty_weight, varying)
    }

    /// Evaluates every shape with `varying` as the override.
    pub fn evaluate_shapes(&self, varying: &[f64]) -> TranslationResult<Vec<Shape<f64>>> {
        let vary = VaryMap::from_parts(&self.varying_paths, varying)?;
        let mut store = self.store.clone();
        self.params
            .energy
            .evaluator()
            .eval_shapes(&self.shape_names, &mut store, &vary)
    }

    /// Installs a new varying vector and refreshes `shapes`.
    pub fn set_varying_state(&mut self, varying: Vec<f64>) -> TranslationResult<()> {
        self.shapes = self.evaluate_shapes(&varying)?;
        self.varying_state = varying;
        Ok(())
    }

    /// Current value of a varying path.
    pub fn varying_value(&self, path: &Path) -> Option<f64> {
        let index = self.varying_paths.iter().position(|p| p == path)?;
        self.varying_state.get(index).copied()
    }
}

/// Turns a front-end store into an initialized optimization problem.
pub fn gen_opt_problem_and_state(
    store: Store<f64>,
    catalog: &ShapeCatalog,
    registries: Arc<Registries<f64>>,
    config: &TranslationConfig,
) -> TranslationResult<OptimizationState> {
    config.validate()?;
    catalog.validate()?;
    check_shape_kinds(&store, catalog)?;

    let varying_paths = find_varying_paths(&store, catalog);
    let uninitialized_paths = find_uninitialized_paths(&store, catalog);
    log::debug!(
        "{} varying paths, {} uninitialized properties",
        varying_paths.len(),
        uninitialized_paths.len()
    );
    if varying_paths.is_empty() {
        return Err(TranslationError::EmptyInitialState);
    }

    let mut rng = Rng::with_seed(config.seed);
    let mut store = store;
    init_fields(&mut store, &varying_paths, &mut rng, &config.canvas);
    init_shapes(&mut store, catalog, &mut rng);

    let shape_names = find_shape_names(&store);
    let shape_property_paths = find_shape_property_paths(&store);

    let (objectives, constraints): (Vec<FnCall>, Vec<FnCall>) = find_declared_fns(&store)
        .into_iter()
        .chain(find_default_fns(&store, catalog))
        .partition(|call| call.role == FnRole::Objective);
    for call in objectives.iter().chain(&constraints) {
        if !registries.for_role(call.role).contains(&call.name) {
            return Err(TranslationError::UnknownFunction {
                role: call.role,
                name: call.name.clone(),
            });
        }
    }

    let energy = compile_energy(
        store.clone(),
        objectives.clone(),
        constraints.clone(),
        varying_paths.clone(),
        registries,
        config,
    );

    let mut evaluated = store.clone();
    let shapes = energy
        .evaluator()
        .eval_shapes(&shape_names, &mut evaluated, &VaryMap::new())?;
    let varying_state = varying_paths
        .iter()
        .map(|path| match evaluated.done_value(path) {
            Some(Value::Float(v)) => Ok(*v),
            Some(other) => Err(TranslationError::type_mismatch(
                path.to_string(),
                format!("varying value must be a float, found {}", other.type_name()),
            )),
            None => Err(TranslationError::UnknownPath(path.clone())),
        })
        .collect::<TranslationResult<Vec<f64>>>()?;

    if log::log_enabled!(log::Level::Debug) {
        match energy.evaluate(config.initial_penalty_weight, &varying_state) {
            Ok(value) => log::debug!("initial energy {value}"),
            Err(e) => log::debug!("initial energy unavailable: {e}"),
        }
    }

    Ok(OptimizationState {
        shapes,
        shape_names,
        shape_property_paths,
        store,
        varying_paths,
        uninitialized_paths,
        varying_state,
        objectives,
        constraints,
        params: Params {
            penalty_weight: config.initial_penalty_weight,
            phase: OptimizerPhase::NewIteration,
            energy,
        },
        rng,
    })
}

/// Rejects shapes whose type tag is missing from the catalog.
fn check_shape_kinds(store: &Store<f64>, catalog: &ShapeCatalog) -> TranslationResult<()> {
    store.fold(Ok(()), |acc, object, field, slot| {
        acc?;
        match slot {
            FieldSlot::Shape { kind, .. } if !catalog.contains(kind) => {
                Err(TranslationError::UnknownShape {
                    kind: kind.clone(),
                    path: Path::field(object, field),
                })
            }
            _ => Ok(()),
        }
    })
}
