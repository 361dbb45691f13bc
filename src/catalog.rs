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

//! Shape-type catalog: property schemas, samplers and default functions.
//!
//! The catalog is plain data. It can be built in code (see
//! [`crate::stdlib::standard_catalog`]) or loaded from JSON:
//!
//! ```json
//! { "shapes": { "Dot": {
//!     "properties": {
//!       "x": { "ty": "Float", "sampler": { "Uniform": { "min": -10.0, "max": 10.0 } } },
//!       "mode": { "ty": "Str", "sampler": { "Choice": { "options": ["a", "b"] } } }
//!     },
//!     "default_constraints": ["minSize"]
//! } } }
//! ```

use fastrand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::{TranslationError, TranslationResult, Value};

/// Declared type of a shape property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyType {
    Float,
    Int,
    Bool,
    Str,
    Color,
}

impl PropertyType {
    /// Type of a concrete value.
    pub fn of<N>(value: &Value<N>) -> Self {
        match value {
            Value::Float(_) => PropertyType::Float,
            Value::Int(_) => PropertyType::Int,
            Value::Bool(_) => PropertyType::Bool,
            Value::Str(_) => PropertyType::Str,
            Value::Color(_) => PropertyType::Color,
        }
    }
}

/// Default value generator for one property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Sampler {
    /// Uniform float in `[min, max)`.
    Uniform { min: f64, max: f64 },
    /// Always the same value.
    Fixed { value: Value<f64> },
    /// Random RGB with alpha `0.5`.
    Color,
    /// One of the listed strings.
    Choice { options: Vec<String> },
    Bool,
}

impl Sampler {
    /// Draws one value, advancing `rng`.
    pub fn sample(&self, rng: &mut Rng) -> Value<f64> {
        match self {
            Sampler::Uniform { min, max } => Value::Float(min + (max - min) * rng.f64()),
            Sampler::Fixed { value } => value.clone(),
            Sampler::Color => Value::Color([rng.f64(), rng.f64(), rng.f64(), 0.5]),
            Sampler::Choice { options } => match options.len() {
                0 => Value::Str(String::new()),
                n => Value::Str(options[rng.usize(..n)].clone()),
            },
            Sampler::Bool => Value::Bool(rng.bool()),
        }
    }

    /// Type of every value this sampler produces.
    pub fn output_type(&self) -> PropertyType {
        match self {
            Sampler::Uniform { .. } => PropertyType::Float,
            Sampler::Fixed { value } => PropertyType::of(value),
            Sampler::Color => PropertyType::Color,
            Sampler::Choice { .. } => PropertyType::Str,
            Sampler::Bool => PropertyType::Bool,
        }
    }
}

/// Schema entry for one property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDef {
    pub ty: PropertyType,
    /// Computed later by layout; never sampled and never varying.
    #[serde(default)]
    pub pending: bool,
    pub sampler: Sampler,
}

impl PropertyDef {
    pub fn new(ty: PropertyType, sampler: Sampler) -> Self {
        Self {
            ty,
            pending: false,
            sampler,
        }
    }

    /// Marks the property as pending.
    pub fn pending(mut self) -> Self {
        self.pending = true;
        self
    }

    pub fn is_numeric(&self) -> bool {
        self.ty == PropertyType::Float
    }
}

/// Schema of one shape type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShapeDef {
    pub properties: BTreeMap<String, PropertyDef>,
    #[serde(default)]
    pub default_objectives: Vec<String>,
    #[serde(default)]
    pub default_constraints: Vec<String>,
}

impl ShapeDef {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a property to the schema.
    pub fn with_property(mut self, name: &str, def: PropertyDef) -> Self {
        self.properties.insert(name.to_string(), def);
        self
    }

    pub fn with_default_objective(mut self, name: &str) -> Self {
        self.default_objectives.push(name.to_string());
        self
    }

    pub fn with_default_constraint(mut self, name: &str) -> Self {
        self.default_constraints.push(name.to_string());
        self
    }

    pub fn property(&self, name: &str) -> Option<&PropertyDef> {
        self.properties.get(name)
    }

    /// Numeric property names in sorted order.
    pub fn numeric_properties(&self) -> impl Iterator<Item = &str> {
        self.properties
            .iter()
            .filter(|(_, def)| def.is_numeric())
            .map(|(name, _)| name.as_str())
    }

    /// Pending property names in sorted order.
    pub fn pending_properties(&self) -> impl Iterator<Item = &str> {
        self.properties
            .iter()
            .filter(|(_, def)| def.pending)
            .map(|(name, _)| name.as_str())
    }
}

/// Catalog of shape types keyed by type tag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShapeCatalog {
    pub shapes: BTreeMap<String, ShapeDef>,
}

impl ShapeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers or replaces a shape type.
    pub fn insert(&mut self, kind: &str, def: ShapeDef) {
        self.shapes.insert(kind.to_string(), def);
    }

    pub fn get(&self, kind: &str) -> Option<&ShapeDef> {
        self.shapes.get(kind)
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.shapes.contains_key(kind)
    }

    /// Parses and validates a JSON catalog.
    pub fn from_json(source: &str) -> TranslationResult<Self> {
        let catalog: ShapeCatalog = serde_json::from_str(source)
            .map_err(|e| TranslationError::Config(format!("invalid shape catalog: {e}")))?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Checks that every sampler produces its property's declared type and
    /// has a usable range.
    pub fn validate(&self) -> TranslationResult<()> {
        for (kind, def) in &self.shapes {
            for (name, prop) in &def.properties {
                let produced = prop.sampler.output_type();
                if produced != prop.ty {
                    return Err(TranslationError::Config(format!(
                        "{kind}.{name}: sampler produces {produced:?} but the property is {:?}",
                        prop.ty
                    )));
                }
                match &prop.sampler {
                    Sampler::Uniform { min, max }
                        if !(min.is_finite() && max.is_finite() && min <= max) =>
                    {
                        return Err(TranslationError::Config(format!(
                            "{kind}.{name}: uniform range [{min}, {max}] is invalid"
                        )));
                    }
                    Sampler::Choice { options } if options.is_empty() => {
                        return Err(TranslationError::Config(format!(
                            "{kind}.{name}: choice sampler has no options"
                        )));
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }
}
