//! Postgres array literals
//!
//! List-valued fields arrive from storage as `{"a","b"}` strings. This
//! module converts them to and from `Vec<String>`.
//!
//! Accepted input:
//! - `{}` for the empty list
//! - quoted elements, where `\` escapes the next character
//! - bare elements, trimmed, which may contain inner spaces
//! - whitespace around braces, commas and elements
//!
//! `NULL` elements, nested arrays and anything after the closing brace are
//! rejected. `encode` always quotes.

use std::iter::Peekable;
use std::str::CharIndices;

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PgArrayError {
    #[error("array literal must start with '{{'")]
    NotAnArray,
    #[error("array literal is missing its closing '}}'")]
    Unterminated,
    #[error("unterminated quoted element starting at byte {0}")]
    UnterminatedQuote(usize),
    #[error("NULL element at byte {0}")]
    NullElement(usize),
    #[error("nested array at byte {0}")]
    Nested(usize),
    #[error("empty element at byte {0}")]
    EmptyElement(usize),
    #[error("unexpected {found:?} at byte {at}")]
    Unexpected { found: char, at: usize },
    #[error("trailing input at byte {0}")]
    TrailingInput(usize),
}

type Chars<'a> = Peekable<CharIndices<'a>>;

pub fn decode(literal: &str) -> Result<Vec<String>, PgArrayError> {
    let mut chars = literal.char_indices().peekable();
    skip_whitespace(&mut chars);
    if !matches!(chars.next(), Some((_, '{'))) {
        return Err(PgArrayError::NotAnArray);
    }

    let mut elements = Vec::new();
    skip_whitespace(&mut chars);
    if matches!(chars.peek(), Some((_, '}'))) {
        chars.next();
        return finish(chars, elements);
    }

    loop {
        skip_whitespace(&mut chars);
        let element = match chars.peek().copied() {
            None => return Err(PgArrayError::Unterminated),
            Some((at, '"')) => {
                chars.next();
                quoted(&mut chars, at)?
            }
            Some((at, '{')) => return Err(PgArrayError::Nested(at)),
            Some((at, _)) => bare(&mut chars, at)?,
        };
        elements.push(element);

        skip_whitespace(&mut chars);
        match chars.next() {
            Some((_, ',')) => continue,
            Some((_, '}')) => return finish(chars, elements),
            Some((at, found)) => return Err(PgArrayError::Unexpected { found, at }),
            None => return Err(PgArrayError::Unterminated),
        }
    }
}

pub fn encode<S: AsRef<str>>(elements: &[S]) -> String {
    let mut out = String::from("{");
    for (index, element) in elements.iter().enumerate() {
        if index > 0 {
            out.push(',');
        }
        out.push('"');
        for c in element.as_ref().chars() {
            if c == '"' || c == '\\' {
                out.push('\\');
            }
            out.push(c);
        }
        out.push('"');
    }
    out.push('}');
    out
}

/// Decode straight into a JSON array of strings for a row field
pub fn to_value(literal: &str) -> Result<Value, PgArrayError> {
    Ok(Value::Array(
        decode(literal)?.into_iter().map(Value::String).collect(),
    ))
}

/// Strings of a JSON array field; non-string entries are skipped
pub fn from_value(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| entry.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

fn skip_whitespace(chars: &mut Chars<'_>) {
    while matches!(chars.peek(), Some((_, c)) if c.is_whitespace()) {
        chars.next();
    }
}

fn quoted(chars: &mut Chars<'_>, start: usize) -> Result<String, PgArrayError> {
    let mut element = String::new();
    while let Some((_, c)) = chars.next() {
        match c {
            '"' => return Ok(element),
            '\\' => match chars.next() {
                Some((_, escaped)) => element.push(escaped),
                None => break,
            },
            _ => element.push(c),
        }
    }
    Err(PgArrayError::UnterminatedQuote(start))
}

fn bare(chars: &mut Chars<'_>, start: usize) -> Result<String, PgArrayError> {
    let mut element = String::new();
    while let Some(&(at, c)) = chars.peek() {
        match c {
            ',' | '}' => break,
            '"' | '{' | '\\' => return Err(PgArrayError::Unexpected { found: c, at }),
            _ => {
                element.push(c);
                chars.next();
            }
        }
    }
    let element = element.trim_end();
    if element.is_empty() {
        return Err(PgArrayError::EmptyElement(start));
    }
    if element.eq_ignore_ascii_case("NULL") {
        return Err(PgArrayError::NullElement(start));
    }
    Ok(element.to_string())
}

fn finish(mut chars: Chars<'_>, elements: Vec<String>) -> Result<Vec<String>, PgArrayError> {
    skip_whitespace(&mut chars);
    match chars.next() {
        Some((at, _)) => Err(PgArrayError::TrailingInput(at)),
        None => Ok(elements),
    }
}
