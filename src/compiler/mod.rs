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

//! Expression evaluator and penalty-weighted energy compiler.

mod builtins;
mod calls;
mod context;
mod expr;

use crate::ast::{BinaryOp, Expr, FnCall, Path, UnaryOp};
use crate::config::TranslationConfig;
use crate::model::{
    ArgVal, FieldSlot, FnDone, Resolved, Shape, Store, TagExpr, TranslationError,
    TranslationResult, Value, VaryMap,
};
use crate::number::Number;
use crate::registry::{ArgType, ComputationRegistry, FunctionRegistry, Registries, Signature};
use std::collections::BTreeMap;
use std::sync::Arc;

pub use self::builtins::{MAX_SIZE, MIN_SIZE};
pub use self::context::{Evaluator, MAX_RECURSION_LIMIT};

pub(crate) use self::builtins::{register_computations, register_constraints, register_objectives};

/// Objective sum and weighted constraint sum of one energy evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyTerms<N> {
    pub objective: N,
    /// Constraint sum already multiplied by `constraint_weight * penalty_weight`.
    pub constraint: N,
}

impl<N: Number> EnergyTerms<N> {
    pub fn total(self) -> N {
        self.objective + self.constraint
    }
}

/// Scalar energy over the varying vector.
///
/// Captures the initialized store once. Each evaluation clones it, so
/// memoized sub-results never leak from one varying vector to the next.
#[derive(Debug)]
pub struct CompiledEnergy<N> {
    store: Store<N>,
    objectives: Vec<FnCall>,
    constraints: Vec<FnCall>,
    varying_paths: Vec<Path>,
    registries: Arc<Registries<N>>,
    constraint_weight: f64,
    recursion_limit: usize,
}

/// Closes over the store and function lists to build the energy.
pub fn compile_energy<N: Number>(
    store: Store<N>,
    objectives: Vec<FnCall>,
    constraints: Vec<FnCall>,
    varying_paths: Vec<Path>,
    registries: Arc<Registries<N>>,
    config: &TranslationConfig,
) -> CompiledEnergy<N> {
    log::debug!(
        "compiled energy: {} objectives, {} constraints, {} varying paths",
        objectives.len(),
        constraints.len(),
        varying_paths.len()
    );
    CompiledEnergy {
        store,
        objectives,
        constraints,
        varying_paths,
        registries,
        constraint_weight: config.constraint_weight,
        recursion_limit: config.recursion_limit,
    }
}

impl<N: Number> CompiledEnergy<N> {
    /// `objectives + constraints * (constraint_weight * penalty_weight)`.
    pub fn evaluate(&self, penalty_weight: N, varying: &[N]) -> TranslationResult<N> {
        Ok(self.terms(penalty_weight, varying)?.total())
    }

    /// Evaluates both energy terms for `varying`.
    pub fn terms(&self, penalty_weight: N, varying: &[N]) -> TranslationResult<EnergyTerms<N>> {
        let vary = VaryMap::from_parts(&self.varying_paths, varying)?;
        let mut store = self.store.clone();
        let evaluator = self.evaluator();

        let objectives = self.eval_calls(&evaluator, &self.objectives, &mut store, &vary)?;
        let constraints = self.eval_calls(&evaluator, &self.constraints, &mut store, &vary)?;

        let objective = self.score(&objectives)?;
        let constraint = self.score(&constraints)?;
        let weight = N::from_f64(self.constraint_weight) * penalty_weight;
        Ok(EnergyTerms {
            objective,
            constraint: constraint * weight,
        })
    }

    /// Evaluator sharing this energy's registry and depth budget.
    pub fn evaluator(&self) -> Evaluator<'_, N> {
        Evaluator::new(&self.registries.computations, self.recursion_limit)
    }

    pub fn store(&self) -> &Store<N> {
        &self.store
    }

    pub fn objectives(&self) -> &[FnCall] {
        &self.objectives
    }

    pub fn constraints(&self) -> &[FnCall] {
        &self.constraints
    }

    pub fn varying_paths(&self) -> &[Path] {
        &self.varying_paths
    }

    pub fn registries(&self) -> &Arc<Registries<N>> {
        &self.registries
    }

    fn eval_calls(
        &self,
        evaluator: &Evaluator<'_, N>,
        calls: &[FnCall],
        store: &mut Store<N>,
        vary: &VaryMap<N>,
    ) -> TranslationResult<Vec<FnDone<N>>> {
        calls
            .iter()
            .map(|call| evaluator.eval_fn(call, store, vary))
            .collect()
    }

    fn score(&self, calls: &[FnDone<N>]) -> TranslationResult<N> {
        let mut sum = N::zero();
        for call in calls {
            sum = sum + self.registries.for_role(call.role).call(&call.name, &call.args)?;
        }
        Ok(sum)
    }
}

impl CompiledEnergy<f64> {
    /// Re-instantiates the same energy over another number type.
    pub fn with_number<M: Number>(&self, registries: Arc<Registries<M>>) -> CompiledEnergy<M> {
        CompiledEnergy {
            store: self.store.cast(),
            objectives: self.objectives.clone(),
            constraints: self.constraints.clone(),
            varying_paths: self.varying_paths.clone(),
            registries,
            constraint_weight: self.constraint_weight,
            recursion_limit: self.recursion_limit,
        }
    }
}
