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

//! Read-only analysis passes over the store.
//!
//! Every pass is a single [`Store::fold`] and returns its results in store
//! order. Shapes whose type is missing from the catalog contribute nothing;
//! assembly rejects them before any pass runs.

use crate::ast::{Expr, FnCall, FnRole, Path};
use crate::catalog::ShapeCatalog;
use crate::model::{FieldSlot, Store, TagExpr};

/// Paths the optimizer controls.
///
/// Fields holding the varying marker, then for each shape every numeric,
/// non-pending schema property that is absent or holds the marker.
pub fn find_varying_paths<N: Clone>(store: &Store<N>, catalog: &ShapeCatalog) -> Vec<Path> {
    store.fold(Vec::new(), |mut acc, object, field, slot| {
        match slot {
            FieldSlot::Expr(tag) => {
                if tag.is_vary() {
                    acc.push(Path::field(object, field));
                }
            }
            FieldSlot::Shape { kind, properties } => {
                let Some(def) = catalog.get(kind) else {
                    return acc;
                };
                for (name, prop) in &def.properties {
                    if !prop.is_numeric() || prop.pending {
                        continue;
                    }
                    let free = properties.get(name).map_or(true, TagExpr::is_vary);
                    if free {
                        acc.push(Path::property(object, field, name));
                    }
                }
            }
        }
        acc
    })
}

/// Non-numeric schema properties that are absent and must be sampled.
pub fn find_uninitialized_paths<N: Clone>(store: &Store<N>, catalog: &ShapeCatalog) -> Vec<Path> {
    store.fold(Vec::new(), |mut acc, object, field, slot| {
        let FieldSlot::Shape { kind, properties } = slot else {
            return acc;
        };
        let Some(def) = catalog.get(kind) else {
            return acc;
        };
        for (name, prop) in &def.properties {
            if prop.is_numeric() || prop.pending || name == "name" {
                continue;
            }
            if !properties.contains_key(name) {
                acc.push(Path::property(object, field, name));
            }
        }
        acc
    })
}

/// Objective and constraint calls declared as top-level field expressions.
pub fn find_declared_fns<N: Clone>(store: &Store<N>) -> Vec<FnCall> {
    store.fold(Vec::new(), |mut acc, object, field, slot| {
        let FieldSlot::Expr(TagExpr::Unevaluated(expr)) = slot else {
            return acc;
        };
        match expr {
            Expr::ObjFn { name, args } => {
                acc.push(FnCall::new(FnRole::Objective, name.clone(), args.clone()))
            }
            Expr::ConstrFn { name, args } => {
                acc.push(FnCall::new(FnRole::Constraint, name.clone(), args.clone()))
            }
            Expr::AvoidFn { name, .. } => {
                log::warn!("avoid function '{name}' at {object}.{field} is ignored");
            }
            _ => {}
        }
        acc
    })
}

/// Catalog default functions applied to each shape's own field path.
///
/// Objectives come before constraints for each shape.
pub fn find_default_fns<N: Clone>(store: &Store<N>, catalog: &ShapeCatalog) -> Vec<FnCall> {
    store.fold(Vec::new(), |mut acc, object, field, slot| {
        let FieldSlot::Shape { kind, .. } = slot else {
            return acc;
        };
        let Some(def) = catalog.get(kind) else {
            return acc;
        };
        let own = || vec![Expr::field_ref(object, field)];
        for name in &def.default_objectives {
            acc.push(FnCall::new(FnRole::Objective, name.clone(), own()));
        }
        for name in &def.default_constraints {
            acc.push(FnCall::new(FnRole::Constraint, name.clone(), own()));
        }
        acc
    })
}

/// Field paths holding shapes.
pub fn find_shape_names<N: Clone>(store: &Store<N>) -> Vec<Path> {
    store.fold(Vec::new(), |mut acc, object, field, slot| {
        if matches!(slot, FieldSlot::Shape { .. }) {
            acc.push(Path::field(object, field));
        }
        acc
    })
}

/// Every property path present in a shape dictionary.
pub fn find_shape_property_paths<N: Clone>(store: &Store<N>) -> Vec<Path> {
    store.fold(Vec::new(), |mut acc, object, field, slot| {
        if let FieldSlot::Shape { properties, .. } = slot {
            acc.extend(
                properties
                    .keys()
                    .map(|name| Path::property(object, field, name)),
            );
        }
        acc
    })
}
