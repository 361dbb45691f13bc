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

//! Translation configuration.

use serde::{Deserialize, Serialize};

use crate::compiler::MAX_RECURSION_LIMIT;
use crate::model::{TranslationError, TranslationResult};

/// Rendering canvas the initial layout is drawn on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 700.0,
        }
    }
}

impl Canvas {
    /// Range free fields are drawn from: `[-height/2, height/2)`.
    pub fn coordinate_range(&self) -> (f64, f64) {
        let half = self.height / 2.0;
        (-half, half)
    }
}

/// Knobs of one translation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    /// Seed of the deterministic random source.
    pub seed: u64,
    pub canvas: Canvas,
    /// Fixed multiplier applied to the constraint sum.
    pub constraint_weight: f64,
    /// Penalty weight stored in the initial [`crate::Params`].
    pub initial_penalty_weight: f64,
    /// Evaluator depth budget, at most [`crate::MAX_RECURSION_LIMIT`].
    pub recursion_limit: usize,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            seed: 16,
            canvas: Canvas::default(),
            constraint_weight: 1e4,
            initial_penalty_weight: 1e-3,
            recursion_limit: 1000,
        }
    }
}

impl TranslationConfig {
    /// Parses a JSON config; missing keys take their defaults.
    pub fn from_json(source: &str) -> TranslationResult<Self> {
        let config: TranslationConfig = serde_json::from_str(source)
            .map_err(|e| TranslationError::Config(format!("invalid config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> TranslationResult<()> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(self.canvas.width) || !positive(self.canvas.height) {
            return Err(TranslationError::Config(format!(
                "canvas must have positive finite sides, got {}x{}",
                self.canvas.width, self.canvas.height
            )));
        }
        if !positive(self.constraint_weight) {
            return Err(TranslationError::Config(format!(
                "constraint_weight must be positive, got {}",
                self.constraint_weight
            )));
        }
        if !positive(self.initial_penalty_weight) {
            return Err(TranslationError::Config(format!(
                "initial_penalty_weight must be positive, got {}",
                self.initial_penalty_weight
            )));
        }
        if !(1..=MAX_RECURSION_LIMIT).contains(&self.recursion_limit) {
            return Err(TranslationError::Config(format!(
                "recursion_limit must be between 1 and {MAX_RECURSION_LIMIT}, got {}",
                self.recursion_limit
            )));
        }
        Ok(())
    }
}
