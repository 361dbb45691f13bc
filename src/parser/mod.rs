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

//! `nom` grammar for textual paths.
//!
//! A path is `object.field` or `object.field.property`. Every segment is an
//! identifier `[A-Za-z_][A-Za-z0-9_]*`; blanks around segments and dots are
//! skipped.

use nom::{
    bytes::complete::take_while,
    character::complete::{char, multispace0, satisfy},
    combinator::{all_consuming, cut, opt, recognize},
    error::{context, VerboseError, VerboseErrorKind},
    sequence::{delimited, pair, preceded},
    IResult, Parser,
};
use nom_locate::LocatedSpan;

use crate::ast::Path;
use crate::diagnostics::SyntaxError;

/// Parser input; tracks the column of every remaining slice.
type Input<'a> = LocatedSpan<&'a str>;

type PResult<'a, O> = IResult<Input<'a>, O, VerboseError<Input<'a>>>;

/// Parses a full textual path.
pub fn parse_path(source: &str) -> Result<Path, SyntaxError> {
    let parsed = all_consuming(delimited(multispace0, path, multispace0))(Input::new(source));
    match parsed {
        Ok((_, path)) => Ok(path),
        Err(nom::Err::Error(e) | nom::Err::Failure(e)) => Err(syntax_error(source, &e)),
        Err(nom::Err::Incomplete(_)) => Err(SyntaxError::new(
            "Syntax error: incomplete path",
            source,
            source.chars().count() + 1,
        )),
    }
}

fn path(input: Input<'_>) -> PResult<'_, Path> {
    let (input, object) = context("object name", segment).parse(input)?;
    let (input, _) = context("'.'", dot).parse(input)?;
    let (input, field) = context("field name", segment).parse(input)?;
    // Once a second dot is seen the property segment is mandatory.
    let (input, property) =
        opt(preceded(dot, cut(context("property name", segment)))).parse(input)?;

    let path = match property {
        Some(property) => Path::property(object, field, property),
        None => Path::field(object, field),
    };
    Ok((input, path))
}

/// One identifier, blanks on both sides skipped.
fn segment(input: Input<'_>) -> PResult<'_, String> {
    let identifier = recognize(pair(
        satisfy(|c| c == '_' || c.is_ascii_alphabetic()),
        take_while(|c: char| c == '_' || c.is_ascii_alphanumeric()),
    ));
    delimited(multispace0, identifier, multispace0)
        .map(|name: Input<'_>| name.fragment().to_string())
        .parse(input)
}

fn dot(input: Input<'_>) -> PResult<'_, char> {
    delimited(multispace0, char('.'), multispace0)(input)
}

/// Reports the outermost labelled failure, at the column it started from.
fn syntax_error(source: &str, error: &VerboseError<Input<'_>>) -> SyntaxError {
    let Some((at, kind)) = error.errors.last() else {
        return SyntaxError::new("Syntax error", source, 1);
    };
    let message = match kind {
        VerboseErrorKind::Context(label) => format!("Syntax error: expected {label}"),
        VerboseErrorKind::Char(c) => format!("Syntax error: expected '{c}'"),
        VerboseErrorKind::Nom(kind) => format!("Syntax error near {kind:?}"),
    };
    SyntaxError::new(message, source, at.get_utf8_column())
}
