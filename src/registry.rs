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

//! Name-keyed function registries consulted by the evaluator and the energy.

use std::collections::BTreeMap;
use std::fmt;

use crate::ast::FnRole;
use crate::model::{ArgVal, TranslationError, TranslationResult, Value};
use crate::number::Number;

/// Computation function: evaluated arguments to a value or shape.
pub type CompFn<N> = Box<dyn Fn(&[ArgVal<N>]) -> TranslationResult<ArgVal<N>> + Send + Sync>;

/// Objective or constraint function: evaluated arguments to one score.
pub type ScoreFn<N> = Box<dyn Fn(&[ArgVal<N>]) -> TranslationResult<N> + Send + Sync>;

/// Accepted kind of one argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgType {
    Float,
    Shape,
    Any,
}

impl ArgType {
    pub fn accepts<N: Number>(self, arg: &ArgVal<N>) -> bool {
        match self {
            ArgType::Float => matches!(arg, ArgVal::Val(Value::Float(_))),
            ArgType::Shape => matches!(arg, ArgVal::Shape(_)),
            ArgType::Any => true,
        }
    }

    fn label(self) -> &'static str {
        match self {
            ArgType::Float => "float",
            ArgType::Shape => "shape",
            ArgType::Any => "any",
        }
    }
}

/// Positional argument kinds of a registered objective or constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub args: Vec<ArgType>,
}

impl Signature {
    pub fn new(args: Vec<ArgType>) -> Self {
        Self { args }
    }

    /// Checks argument count and kinds for function `name`.
    pub fn check<N: Number>(&self, name: &str, args: &[ArgVal<N>]) -> TranslationResult<()> {
        if args.len() != self.args.len() {
            return Err(TranslationError::arity(
                format!("arguments of '{name}'"),
                self.args.len(),
                args.len(),
            ));
        }
        for (index, (expected, arg)) in self.args.iter().zip(args).enumerate() {
            if !expected.accepts(arg) {
                return Err(TranslationError::type_mismatch(
                    format!("argument {} of '{name}'", index + 1),
                    format!("expected {}, found {}", expected.label(), arg.type_name()),
                ));
            }
        }
        Ok(())
    }
}

/// Registry of computation functions.
pub struct ComputationRegistry<N> {
    functions: BTreeMap<String, CompFn<N>>,
}

impl<N> Default for ComputationRegistry<N> {
    fn default() -> Self {
        Self {
            functions: BTreeMap::new(),
        }
    }
}

impl<N: Number> ComputationRegistry<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `f` under `name`, replacing any previous entry.
    pub fn register<F>(&mut self, name: &str, f: F)
    where
        F: Fn(&[ArgVal<N>]) -> TranslationResult<ArgVal<N>> + Send + Sync + 'static,
    {
        self.functions.insert(name.to_string(), Box::new(f));
    }

    pub fn get(&self, name: &str) -> Option<&CompFn<N>> {
        self.functions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }
}

impl<N> fmt::Debug for ComputationRegistry<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.functions.keys()).finish()
    }
}

/// Registry of objective or constraint functions, with signatures.
pub struct FunctionRegistry<N> {
    role: FnRole,
    functions: BTreeMap<String, (Signature, ScoreFn<N>)>,
}

impl<N: Number> FunctionRegistry<N> {
    pub fn new(role: FnRole) -> Self {
        Self {
            role,
            functions: BTreeMap::new(),
        }
    }

    pub fn role(&self) -> FnRole {
        self.role
    }

    /// Registers `f` with its signature, replacing any previous entry.
    pub fn register<F>(&mut self, name: &str, signature: Signature, f: F)
    where
        F: Fn(&[ArgVal<N>]) -> TranslationResult<N> + Send + Sync + 'static,
    {
        self.functions
            .insert(name.to_string(), (signature, Box::new(f)));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn signature(&self, name: &str) -> Option<&Signature> {
        self.functions.get(name).map(|(signature, _)| signature)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }

    /// Validates `args` against the signature and scores them.
    pub fn call(&self, name: &str, args: &[ArgVal<N>]) -> TranslationResult<N> {
        let (signature, f) =
            self.functions
                .get(name)
                .ok_or_else(|| TranslationError::UnknownFunction {
                    role: self.role,
                    name: name.to_string(),
                })?;
        signature.check(name, args)?;
        f(args)
    }
}

impl<N> fmt::Debug for FunctionRegistry<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("role", &self.role)
            .field("names", &self.functions.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// The three registries one translation run consults.
#[derive(Debug)]
pub struct Registries<N> {
    pub computations: ComputationRegistry<N>,
    pub objectives: FunctionRegistry<N>,
    pub constraints: FunctionRegistry<N>,
}

impl<N: Number> Registries<N> {
    /// Empty registries.
    pub fn new() -> Self {
        Self {
            computations: ComputationRegistry::new(),
            objectives: FunctionRegistry::new(FnRole::Objective),
            constraints: FunctionRegistry::new(FnRole::Constraint),
        }
    }

    pub fn for_role(&self, role: FnRole) -> &FunctionRegistry<N> {
        match role {
            FnRole::Objective => &self.objectives,
            FnRole::Constraint => &self.constraints,
        }
    }
}

impl<N: Number> Default for Registries<N> {
    fn default() -> Self {
        Self::new()
    }
}
