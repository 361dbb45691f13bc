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

//! Concrete values, evaluated shapes and evaluated function calls.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::ast::FnRole;
use crate::number::Number;

use super::{TranslationError, TranslationResult};

/// Concrete value held by a `Done` slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value<N> {
    Float(N),
    Int(i64),
    Bool(bool),
    Str(String),
    /// RGBA components in `[0, 1]`.
    Color([f64; 4]),
}

impl<N> Value<N> {
    /// Type label used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Float(_) => "float",
            Value::Int(_) => "int",
            Value::Bool(_) => "bool",
            Value::Str(_) => "string",
            Value::Color(_) => "color",
        }
    }

    pub fn as_float(&self) -> Option<&N> {
        match self {
            Value::Float(v) => Some(v),
            _ => None,
        }
    }

    /// Re-types the float payload, leaving other variants untouched.
    pub fn map_float<M>(self, f: impl FnOnce(N) -> M) -> Value<M> {
        match self {
            Value::Float(v) => Value::Float(f(v)),
            Value::Int(v) => Value::Int(v),
            Value::Bool(v) => Value::Bool(v),
            Value::Str(v) => Value::Str(v),
            Value::Color(v) => Value::Color(v),
        }
    }
}

/// A fully evaluated shape: type tag plus concrete property values.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape<N> {
    /// Shape type tag from the catalog (`"Circle"`, ...).
    pub kind: String,
    /// Evaluated properties, including the synthesized `name`.
    pub properties: BTreeMap<String, Value<N>>,
}

impl<N: Number> Shape<N> {
    /// Returns the synthesized `object.field` name.
    pub fn name(&self) -> &str {
        match self.properties.get("name") {
            Some(Value::Str(name)) => name,
            _ => "",
        }
    }

    pub fn get(&self, property: &str) -> Option<&Value<N>> {
        self.properties.get(property)
    }

    pub fn has(&self, property: &str) -> bool {
        self.properties.contains_key(property)
    }

    /// Returns a float property or a type error naming the shape.
    pub fn float(&self, property: &str) -> TranslationResult<N> {
        match self.properties.get(property) {
            Some(Value::Float(v)) => Ok(v.clone()),
            Some(other) => Err(TranslationError::type_mismatch(
                format!("{}.{property}", self.name()),
                format!("expected float, found {}", other.type_name()),
            )),
            None => Err(TranslationError::type_mismatch(
                format!("{}.{property}", self.name()),
                format!("{} has no property '{property}'", self.kind),
            )),
        }
    }
}

/// Argument value: either a plain value or an evaluated shape.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgVal<N> {
    Val(Value<N>),
    Shape(Shape<N>),
}

impl<N: Number> ArgVal<N> {
    pub fn type_name(&self) -> &'static str {
        match self {
            ArgVal::Val(v) => v.type_name(),
            ArgVal::Shape(_) => "shape",
        }
    }

    /// Extracts a float argument.
    pub fn float(&self, context: &str) -> TranslationResult<N> {
        match self {
            ArgVal::Val(Value::Float(v)) => Ok(v.clone()),
            other => Err(TranslationError::type_mismatch(
                context,
                format!("expected float, found {}", other.type_name()),
            )),
        }
    }

    /// Extracts a shape argument.
    pub fn shape(&self, context: &str) -> TranslationResult<&Shape<N>> {
        match self {
            ArgVal::Shape(shape) => Ok(shape),
            other => Err(TranslationError::type_mismatch(
                context,
                format!("expected shape, found {}", other.type_name()),
            )),
        }
    }

    /// Extracts a plain value, rejecting shapes.
    pub fn into_value(self, context: &str) -> TranslationResult<Value<N>> {
        match self {
            ArgVal::Val(v) => Ok(v),
            ArgVal::Shape(shape) => Err(TranslationError::type_mismatch(
                context,
                format!("expected a value, found shape {}", shape.name()),
            )),
        }
    }
}

impl<N> From<Value<N>> for ArgVal<N> {
    fn from(value: Value<N>) -> Self {
        ArgVal::Val(value)
    }
}

/// An objective or constraint call with fully evaluated arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct FnDone<N> {
    pub role: FnRole,
    pub name: String,
    pub args: Vec<ArgVal<N>>,
}
