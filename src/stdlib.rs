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

//! Standard shape catalog and standard function registries.

use crate::catalog::{PropertyDef, PropertyType, Sampler, ShapeCatalog, ShapeDef};
use crate::compiler::{register_computations, register_constraints, register_objectives};
use crate::config::Canvas;
use crate::model::Value;
use crate::number::Number;
use crate::registry::Registries;

/// Builds `Circle`, `Rectangle`, `Text` and `Line` for `canvas`.
///
/// Positions are drawn over the whole canvas. `Text` sizes are pending: they
/// are filled in by text layout, never sampled or optimized.
pub fn standard_catalog(canvas: &Canvas) -> ShapeCatalog {
    let x = || float(-canvas.width / 2.0, canvas.width / 2.0);
    let y = || float(-canvas.height / 2.0, canvas.height / 2.0);
    let color = || PropertyDef::new(PropertyType::Color, Sampler::Color);
    let stroke = || {
        PropertyDef::new(
            PropertyType::Str,
            Sampler::Choice {
                options: vec!["solid".to_string(), "dashed".to_string()],
            },
        )
    };

    let mut catalog = ShapeCatalog::new();
    catalog.insert(
        "Circle",
        ShapeDef::new()
            .with_property("x", x())
            .with_property("y", y())
            .with_property("r", float(20.0, 100.0))
            .with_property("color", color())
            .with_property("strokeStyle", stroke())
            .with_default_constraint("minSize")
            .with_default_constraint("maxSize"),
    );
    catalog.insert(
        "Rectangle",
        ShapeDef::new()
            .with_property("x", x())
            .with_property("y", y())
            .with_property("w", float(20.0, 200.0))
            .with_property("h", float(20.0, 200.0))
            .with_property("color", color())
            .with_property("strokeStyle", stroke())
            .with_default_constraint("minSize")
            .with_default_constraint("maxSize"),
    );
    catalog.insert(
        "Text",
        ShapeDef::new()
            .with_property("x", x())
            .with_property("y", y())
            .with_property("w", float(0.0, 0.0).pending())
            .with_property("h", float(0.0, 0.0).pending())
            .with_property("string", fixed(Value::Str(String::new()), PropertyType::Str))
            .with_property("fontSize", fixed(Value::Str("12pt".to_string()), PropertyType::Str))
            .with_property("color", color()),
    );
    catalog.insert(
        "Line",
        ShapeDef::new()
            .with_property("startX", x())
            .with_property("startY", y())
            .with_property("endX", x())
            .with_property("endY", y())
            .with_property("thickness", float(1.0, 5.0))
            .with_property("color", color())
            .with_property("style", stroke()),
    );
    catalog
}

fn float(min: f64, max: f64) -> PropertyDef {
    PropertyDef::new(PropertyType::Float, Sampler::Uniform { min, max })
}

fn fixed(value: Value<f64>, ty: PropertyType) -> PropertyDef {
    PropertyDef::new(ty, Sampler::Fixed { value })
}

impl<N: Number> Registries<N> {
    /// Registries holding every builtin computation, objective and constraint.
    pub fn standard() -> Self {
        let mut registries = Registries::new();
        register_computations(&mut registries.computations);
        register_objectives(&mut registries.objectives);
        register_constraints(&mut registries.constraints);
        registries
    }
}
