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

//! Symbolic expression and path definitions.
//!
//! The upstream front-end produces these nodes inside a [`crate::Store`]. The
//! evaluator later resolves them into concrete [`crate::Value`]s and shapes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::diagnostics::SyntaxError;

/// Address of a slot in the store.
///
/// Field paths name an `object.field` slot; property paths name one property
/// of the shape stored at `object.field`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Path {
    /// `object.field`
    Field { object: String, field: String },
    /// `object.field.property`
    Property {
        object: String,
        field: String,
        property: String,
    },
}

impl Path {
    /// Builds a field path.
    pub fn field(object: impl Into<String>, field: impl Into<String>) -> Self {
        Path::Field {
            object: object.into(),
            field: field.into(),
        }
    }

    /// Builds a property path.
    pub fn property(
        object: impl Into<String>,
        field: impl Into<String>,
        property: impl Into<String>,
    ) -> Self {
        Path::Property {
            object: object.into(),
            field: field.into(),
            property: property.into(),
        }
    }

    /// Object name the path is rooted at.
    pub fn object(&self) -> &str {
        match self {
            Path::Field { object, .. } | Path::Property { object, .. } => object,
        }
    }

    /// Field name inside the object.
    pub fn field_name(&self) -> &str {
        match self {
            Path::Field { field, .. } | Path::Property { field, .. } => field,
        }
    }

    /// Property name for property paths.
    pub fn property_name(&self) -> Option<&str> {
        match self {
            Path::Field { .. } => None,
            Path::Property { property, .. } => Some(property),
        }
    }

    pub fn is_field(&self) -> bool {
        matches!(self, Path::Field { .. })
    }

    /// Returns the `object.field` path this path lives under.
    pub fn to_field_path(&self) -> Path {
        Path::field(self.object(), self.field_name())
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Path::Field { object, field } => write!(f, "{object}.{field}"),
            Path::Property {
                object,
                field,
                property,
            } => write!(f, "{object}.{field}.{property}"),
        }
    }
}

impl FromStr for Path {
    type Err = SyntaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::parser::parse_path(s)
    }
}

impl TryFrom<String> for Path {
    type Error = SyntaxError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Path> for String {
    fn from(path: Path) -> Self {
        path.to_string()
    }
}

/// Unary arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `+x`
    UPlus,
    /// `-x`
    UMinus,
}

/// Binary arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// Addition (`+`).
    BPlus,
    /// Subtraction (`-`).
    BMinus,
    /// Multiplication (`*`).
    Multiply,
    /// Division (`/`).
    Divide,
    /// Exponentiation (`^`).
    Exp,
}

impl BinaryOp {
    /// Operator token used in diagnostics.
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::BPlus => "+",
            BinaryOp::BMinus => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Exp => "^",
        }
    }
}

/// Symbolic expression stored in unevaluated slots.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Integer literal.
    Int(i64),
    /// Float literal.
    Float(f64),
    /// String literal.
    Str(String),
    /// Boolean literal.
    Bool(bool),
    /// Declared-free marker: the optimizer controls this value.
    Vary,
    /// Unary operation.
    Unary { op: UnaryOp, arg: Box<Expr> },
    /// Binary operation.
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Named computation-function application.
    Comp { name: String, args: Vec<Expr> },
    /// Reference to another slot.
    Path(Path),
    /// Objective call (top-level only).
    ObjFn { name: String, args: Vec<Expr> },
    /// Constraint call (top-level only).
    ConstrFn { name: String, args: Vec<Expr> },
    /// Avoid-function call (top-level only, not compiled).
    AvoidFn { name: String, args: Vec<Expr> },
    /// Inline shape constructor.
    Ctor {
        kind: String,
        properties: Vec<(String, Expr)>,
    },
    /// Layering directive between two shapes.
    Layering { below: Path, above: Path },
    /// List literal (reserved).
    List(Vec<Expr>),
    /// List element access (reserved).
    ListAccess { path: Path, index: i64 },
}

impl Expr {
    pub fn path(path: Path) -> Self {
        Expr::Path(path)
    }

    /// Reference to `object.field`.
    pub fn field_ref(object: &str, field: &str) -> Self {
        Expr::Path(Path::field(object, field))
    }

    /// Reference to `object.field.property`.
    pub fn property_ref(object: &str, field: &str, property: &str) -> Self {
        Expr::Path(Path::property(object, field, property))
    }

    pub fn unary(op: UnaryOp, arg: Expr) -> Self {
        Expr::Unary {
            op,
            arg: Box::new(arg),
        }
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn comp(name: &str, args: Vec<Expr>) -> Self {
        Expr::Comp {
            name: name.to_string(),
            args,
        }
    }

    pub fn objective(name: &str, args: Vec<Expr>) -> Self {
        Expr::ObjFn {
            name: name.to_string(),
            args,
        }
    }

    pub fn constraint(name: &str, args: Vec<Expr>) -> Self {
        Expr::ConstrFn {
            name: name.to_string(),
            args,
        }
    }

    /// Short label for diagnostics.
    pub fn describe(&self) -> String {
        match self {
            Expr::Int(v) => format!("integer {v}"),
            Expr::Float(v) => format!("float {v}"),
            Expr::Str(s) => format!("string {s:?}"),
            Expr::Bool(b) => format!("bool {b}"),
            Expr::Vary => "varying marker".to_string(),
            Expr::Unary { op, .. } => format!("unary {op:?}"),
            Expr::Binary { op, .. } => format!("binary '{}'", op.symbol()),
            Expr::Comp { name, .. } => format!("computation '{name}'"),
            Expr::Path(path) => format!("path {path}"),
            Expr::ObjFn { name, .. } => format!("objective '{name}'"),
            Expr::ConstrFn { name, .. } => format!("constraint '{name}'"),
            Expr::AvoidFn { name, .. } => format!("avoid function '{name}'"),
            Expr::Ctor { kind, .. } => format!("inline {kind} constructor"),
            Expr::Layering { below, above } => format!("layering {below} below {above}"),
            Expr::List(_) => "list literal".to_string(),
            Expr::ListAccess { path, index } => format!("list access {path}[{index}]"),
        }
    }
}

/// Whether a function call contributes to the objective or the penalty term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FnRole {
    Objective,
    Constraint,
}

impl fmt::Display for FnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FnRole::Objective => write!(f, "objective"),
            FnRole::Constraint => write!(f, "constraint"),
        }
    }
}

/// A named objective or constraint call with symbolic arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct FnCall {
    /// Objective or constraint.
    pub role: FnRole,
    /// Registry name.
    pub name: String,
    /// Unevaluated arguments.
    pub args: Vec<Expr>,
}

impl FnCall {
    pub fn new(role: FnRole, name: impl Into<String>, args: Vec<Expr>) -> Self {
        Self {
            role,
            name: name.into(),
            args,
        }
    }
}
