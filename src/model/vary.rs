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

//! Pass-scoped override map from varying paths to the optimizer's iterate.

use std::collections::BTreeMap;

use crate::ast::Path;

use super::{TranslationError, TranslationResult};

/// Override map consulted before the store during one evaluation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct VaryMap<N> {
    values: BTreeMap<Path, N>,
}

impl<N> Default for VaryMap<N> {
    fn default() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }
}

impl<N: Clone> VaryMap<N> {
    /// Empty map: every lookup falls through to the store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Zips `paths` with `values` in order.
    pub fn from_parts(paths: &[Path], values: &[N]) -> TranslationResult<Self> {
        if paths.len() != values.len() {
            return Err(TranslationError::arity(
                "varying vector",
                paths.len(),
                values.len(),
            ));
        }
        Ok(Self {
            values: paths.iter().cloned().zip(values.iter().cloned()).collect(),
        })
    }

    pub fn get(&self, path: &Path) -> Option<&N> {
        self.values.get(path)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
