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

//! Syntax errors for textual paths.
//!
//! Paths are one line, so an error is a message plus the column where the
//! grammar gave up.

use std::fmt;

/// A textual path the grammar rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub message: String,
    /// 1-based character column of the failure.
    pub column: usize,
    /// The rejected text.
    pub input: String,
}

impl SyntaxError {
    pub(crate) fn new(message: impl Into<String>, input: &str, column: usize) -> Self {
        Self {
            message: message.into(),
            column,
            input: input.to_string(),
        }
    }

    /// A single `^` under the failing column of `input`.
    pub fn caret(&self) -> String {
        let limit = self.input.chars().count();
        let pad = self.column.saturating_sub(1).min(limit);
        format!("{:pad$}^", "")
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at column {}\n    {}\n    {}",
            self.message,
            self.column,
            self.input,
            self.caret()
        )
    }
}

impl std::error::Error for SyntaxError {}
