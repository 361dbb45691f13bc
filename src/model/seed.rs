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

//! Deterministic initial-state sampling.
//!
//! Both passes thread one caller-owned [`Rng`]; with the same store and seed
//! they write identical values.

use fastrand::Rng;

use crate::ast::Path;
use crate::catalog::ShapeCatalog;
use crate::config::Canvas;

use super::{FieldSlot, Store, Value};

/// Draws every free field from the canvas coordinate range.
///
/// All draws happen as one batch in `varying_paths` order before any value is
/// written back. Property paths in `varying_paths` are left to
/// [`init_shapes`].
pub fn init_fields(store: &mut Store<f64>, varying_paths: &[Path], rng: &mut Rng, canvas: &Canvas) {
    let fields: Vec<&Path> = varying_paths.iter().filter(|p| p.is_field()).collect();
    let (lo, hi) = canvas.coordinate_range();
    let draws: Vec<f64> = (0..fields.len())
        .map(|_| lo + (hi - lo) * rng.f64())
        .collect();

    for (path, value) in fields.into_iter().zip(draws) {
        if !store.set_done(path, Value::Float(value)) {
            log::warn!("free field {path} is not a scalar slot; sample dropped");
        }
    }
}

/// Samples unset and declared-free shape properties from their catalog samplers.
///
/// Shapes are visited in store order and properties in sorted order. A
/// property is sampled when it is absent and not pending, or when it holds the
/// varying marker. `name` is never sampled.
pub fn init_shapes(store: &mut Store<f64>, catalog: &ShapeCatalog, rng: &mut Rng) {
    let targets = store.fold(Vec::new(), |mut acc, object, field, slot| {
        let FieldSlot::Shape { kind, properties } = slot else {
            return acc;
        };
        let Some(def) = catalog.get(kind) else {
            log::warn!("shape {object}.{field} has unknown type '{kind}'; not sampled");
            return acc;
        };
        for (name, prop) in &def.properties {
            if name == "name" {
                continue;
            }
            let wanted = match properties.get(name) {
                None => !prop.pending,
                Some(tag) => tag.is_vary(),
            };
            if wanted {
                acc.push((Path::property(object, field, name), prop.sampler.clone()));
            }
        }
        acc
    });

    for (path, sampler) in targets {
        let value = sampler.sample(rng);
        if !store.set_done(&path, value) {
            log::warn!("sampled property {path} has no slot in the store");
        }
    }
}
