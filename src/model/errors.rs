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

//! Error taxonomy surfaced by store, evaluator and compiler APIs.

use thiserror::Error;

use crate::ast::{FnRole, Path};
use crate::diagnostics::SyntaxError;

/// Errors produced while building, evaluating or compiling a translation.
///
/// Every variant indicates a malformed translation or a mismatch between the
/// front-end and the registries/catalog; none is retried.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TranslationError {
    /// An object name was never declared by the front-end.
    #[error("unknown object '{0}'")]
    UnknownObject(String),

    /// A strict insert hit an existing binding.
    #[error("path '{0}' is already bound")]
    DuplicatePath(Path),

    /// The object exists but the field or property does not.
    #[error("no slot at path '{0}'")]
    UnknownPath(Path),

    /// Two parallel lists differ in length.
    #[error("{context}: expected {expected} values, found {found}")]
    ArityMismatch {
        context: String,
        expected: usize,
        found: usize,
    },

    /// Operand or argument kinds do not fit the operation.
    #[error("type mismatch in {context}: {detail}")]
    TypeMismatch { context: String, detail: String },

    /// Division with a zero divisor.
    #[error("division by zero in {context}")]
    DivideByZero { context: String },

    /// Integer arithmetic left the `i64` range.
    #[error("integer overflow in {context}")]
    IntegerOverflow { context: String },

    /// No computation function with this name is registered.
    #[error("unknown computation '{0}'")]
    UnknownComputation(String),

    /// No objective/constraint function with this name is registered for the role.
    #[error("unknown {role} function '{name}'")]
    UnknownFunction { role: FnRole, name: String },

    /// A shape type tag is missing from the catalog.
    #[error("unknown shape type '{kind}' at '{path}'")]
    UnknownShape { kind: String, path: Path },

    /// An expression shape the evaluator refuses to handle.
    #[error("unsupported expression: {0}")]
    UnsupportedExpression(String),

    /// The evaluation depth budget ran out, usually because of a path cycle.
    #[error("recursion limit of {limit} exceeded while evaluating {context}")]
    RecursionLimitExceeded { limit: usize, context: String },

    /// No varying parameter was found; there is nothing to optimize.
    #[error("translation has no varying parameters")]
    EmptyInitialState,

    /// A textual path could not be parsed.
    #[error(transparent)]
    PathSyntax(#[from] SyntaxError),

    /// Configuration or catalog data failed validation.
    #[error("config error: {0}")]
    Config(String),
}

pub type TranslationResult<T> = Result<T, TranslationError>;

impl TranslationError {
    pub(crate) fn arity(context: impl Into<String>, expected: usize, found: usize) -> Self {
        TranslationError::ArityMismatch {
            context: context.into(),
            expected,
            found,
        }
    }

    pub(crate) fn type_mismatch(context: impl Into<String>, detail: impl Into<String>) -> Self {
        TranslationError::TypeMismatch {
            context: context.into(),
            detail: detail.into(),
        }
    }
}
