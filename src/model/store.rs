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

//! The symbolic store: object → field → slot.

use std::collections::BTreeMap;

use crate::ast::{Expr, Path};
use crate::number::Number;

use super::{TranslationError, TranslationResult, Value, VaryMap};

/// Property dictionary of a shape slot, iterated in sorted (dictionary) order.
pub type PropertyDict<N> = BTreeMap<String, TagExpr<N>>;

/// Scalar slot content: either still symbolic or already concrete.
#[derive(Debug, Clone, PartialEq)]
pub enum TagExpr<N> {
    Unevaluated(Expr),
    Done(Value<N>),
}

impl<N> TagExpr<N> {
    /// Returns whether this is the declared-free marker.
    pub fn is_vary(&self) -> bool {
        matches!(self, TagExpr::Unevaluated(Expr::Vary))
    }

    pub fn done(&self) -> Option<&Value<N>> {
        match self {
            TagExpr::Done(value) => Some(value),
            TagExpr::Unevaluated(_) => None,
        }
    }
}

/// One `object.field` slot.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldSlot<N> {
    /// Scalar field.
    Expr(TagExpr<N>),
    /// Shape instance with its property dictionary.
    Shape {
        kind: String,
        properties: PropertyDict<N>,
    },
}

/// Result of a lookup that may have been answered by the override map.
#[derive(Debug)]
pub enum Resolved<'a, N> {
    /// The optimizer currently controls the path.
    Override(N),
    Field(&'a FieldSlot<N>),
    Property(&'a TagExpr<N>),
}

/// Symbolic translation store.
///
/// Objects and fields are kept in sorted maps so every traversal visits slots
/// in one fixed order.
#[derive(Debug, Clone, PartialEq)]
pub struct Store<N> {
    objects: BTreeMap<String, BTreeMap<String, FieldSlot<N>>>,
}

impl<N> Default for Store<N> {
    fn default() -> Self {
        Self {
            objects: BTreeMap::new(),
        }
    }
}

impl<N: Clone> Store<N> {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares an object name; declaring twice is a no-op.
    pub fn declare_object(&mut self, name: impl Into<String>) {
        self.objects.entry(name.into()).or_default();
    }

    pub fn has_object(&self, name: &str) -> bool {
        self.objects.contains_key(name)
    }

    /// Declared object names in store order.
    pub fn object_names(&self) -> impl Iterator<Item = &str> {
        self.objects.keys().map(String::as_str)
    }

    /// Inserts a shape under a declared object.
    pub fn insert_shape(
        &mut self,
        object: &str,
        field: &str,
        kind: impl Into<String>,
        properties: PropertyDict<N>,
    ) -> TranslationResult<()> {
        let fields = self
            .objects
            .get_mut(object)
            .ok_or_else(|| TranslationError::UnknownObject(object.to_string()))?;
        if fields.contains_key(field) {
            return Err(TranslationError::DuplicatePath(Path::field(object, field)));
        }
        fields.insert(
            field.to_string(),
            FieldSlot::Shape {
                kind: kind.into(),
                properties,
            },
        );
        Ok(())
    }

    /// Binds a slot value at `path`, refusing to replace an existing binding.
    pub fn insert_path(&mut self, path: Path, tag: TagExpr<N>) -> TranslationResult<()> {
        let fields = self
            .objects
            .get_mut(path.object())
            .ok_or_else(|| TranslationError::UnknownObject(path.object().to_string()))?;

        match &path {
            Path::Field { field, .. } => {
                if fields.contains_key(field) {
                    return Err(TranslationError::DuplicatePath(path));
                }
                fields.insert(field.clone(), FieldSlot::Expr(tag));
                Ok(())
            }
            Path::Property {
                field, property, ..
            } => {
                let Some(FieldSlot::Shape { properties, .. }) = fields.get_mut(field) else {
                    return Err(TranslationError::UnknownPath(path.to_field_path()));
                };
                if properties.contains_key(property) {
                    return Err(TranslationError::DuplicatePath(path));
                }
                properties.insert(property.clone(), tag);
                Ok(())
            }
        }
    }

    /// Binds many paths at once; nothing is written unless every insert succeeds.
    pub fn insert_paths(
        &mut self,
        paths: &[Path],
        tags: Vec<TagExpr<N>>,
    ) -> TranslationResult<()> {
        if paths.len() != tags.len() {
            return Err(TranslationError::arity(
                "insert_paths",
                paths.len(),
                tags.len(),
            ));
        }

        let mut staged = self.clone();
        for (path, tag) in paths.iter().zip(tags) {
            staged.insert_path(path.clone(), tag)?;
        }
        *self = staged;
        Ok(())
    }

    /// Writes a concrete value at `path`, replacing whatever scalar slot was there.
    ///
    /// Property paths may name properties absent from the dictionary. Returns
    /// `false` when the object is undeclared or the path does not address a
    /// scalar slot.
    pub fn set_done(&mut self, path: &Path, value: Value<N>) -> bool {
        let Some(fields) = self.objects.get_mut(path.object()) else {
            return false;
        };
        match path {
            Path::Field { field, .. } => match fields.get(field) {
                Some(FieldSlot::Shape { .. }) => false,
                _ => {
                    fields.insert(field.clone(), FieldSlot::Expr(TagExpr::Done(value)));
                    true
                }
            },
            Path::Property {
                field, property, ..
            } => match fields.get_mut(field) {
                Some(FieldSlot::Shape { properties, .. }) => {
                    properties.insert(property.clone(), TagExpr::Done(value));
                    true
                }
                _ => false,
            },
        }
    }

    /// Memoizes an evaluated value. Only unevaluated slots are written, so the
    /// first write wins.
    pub fn cache_done(&mut self, path: &Path, value: Value<N>) {
        let slot = match path {
            Path::Field { object, field } => match self
                .objects
                .get_mut(object)
                .and_then(|fields| fields.get_mut(field))
            {
                Some(FieldSlot::Expr(tag)) => Some(tag),
                _ => None,
            },
            Path::Property {
                object,
                field,
                property,
            } => match self
                .objects
                .get_mut(object)
                .and_then(|fields| fields.get_mut(field))
            {
                Some(FieldSlot::Shape { properties, .. }) => properties.get_mut(property),
                _ => None,
            },
        };

        if let Some(tag) = slot {
            if matches!(tag, TagExpr::Unevaluated(_)) {
                log::trace!("cached {path}");
                *tag = TagExpr::Done(value);
            }
        }
    }

    /// Looks up a field slot.
    pub fn field(&self, object: &str, field: &str) -> TranslationResult<&FieldSlot<N>> {
        let fields = self
            .objects
            .get(object)
            .ok_or_else(|| TranslationError::UnknownObject(object.to_string()))?;
        fields
            .get(field)
            .ok_or_else(|| TranslationError::UnknownPath(Path::field(object, field)))
    }

    /// Looks up a property slot of a shape field.
    pub fn property(
        &self,
        object: &str,
        field: &str,
        property: &str,
    ) -> TranslationResult<&TagExpr<N>> {
        match self.field(object, field)? {
            FieldSlot::Shape { properties, .. } => properties.get(property).ok_or_else(|| {
                TranslationError::UnknownPath(Path::property(object, field, property))
            }),
            FieldSlot::Expr(_) => Err(TranslationError::UnknownPath(Path::property(
                object, field, property,
            ))),
        }
    }

    /// Looks up `path` in the store only.
    pub fn lookup(&self, path: &Path) -> TranslationResult<Resolved<'_, N>> {
        match path {
            Path::Field { object, field } => self.field(object, field).map(Resolved::Field),
            Path::Property {
                object,
                field,
                property,
            } => self
                .property(object, field, property)
                .map(Resolved::Property),
        }
    }

    /// Looks up `path`, letting the override map take precedence.
    ///
    /// While an optimizer run is in progress the store value of a varying path
    /// is stale, so the override answers first.
    pub fn resolve(&self, path: &Path, vary: &VaryMap<N>) -> TranslationResult<Resolved<'_, N>> {
        if let Some(value) = vary.get(path) {
            return Ok(Resolved::Override(value.clone()));
        }
        self.lookup(path)
    }

    /// Returns the concrete value at `path`, if that slot is `Done`.
    pub fn done_value(&self, path: &Path) -> Option<&Value<N>> {
        match self.lookup(path).ok()? {
            Resolved::Field(FieldSlot::Expr(tag)) | Resolved::Property(tag) => tag.done(),
            _ => None,
        }
    }

    /// Folds `f` over every `(object, field, slot)` in store order.
    pub fn fold<A>(&self, init: A, mut f: impl FnMut(A, &str, &str, &FieldSlot<N>) -> A) -> A {
        let mut acc = init;
        for (object, fields) in &self.objects {
            for (field, slot) in fields {
                acc = f(acc, object, field, slot);
            }
        }
        acc
    }
}

impl Store<f64> {
    /// Re-types every concrete float into another number type.
    pub fn cast<M: Number>(&self) -> Store<M> {
        let cast_tag = |tag: &TagExpr<f64>| match tag {
            TagExpr::Unevaluated(expr) => TagExpr::Unevaluated(expr.clone()),
            TagExpr::Done(value) => TagExpr::Done(value.clone().map_float(M::from_f64)),
        };

        let objects = self
            .objects
            .iter()
            .map(|(object, fields)| {
                let fields = fields
                    .iter()
                    .map(|(field, slot)| {
                        let slot = match slot {
                            FieldSlot::Expr(tag) => FieldSlot::Expr(cast_tag(tag)),
                            FieldSlot::Shape { kind, properties } => FieldSlot::Shape {
                                kind: kind.clone(),
                                properties: properties
                                    .iter()
                                    .map(|(name, tag)| (name.clone(), cast_tag(tag)))
                                    .collect(),
                            },
                        };
                        (field.clone(), slot)
                    })
                    .collect();
                (object.clone(), fields)
            })
            .collect();

        Store { objects }
    }
}
