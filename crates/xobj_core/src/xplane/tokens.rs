//! Line reader for the X-Plane OBJ text format.
//!
//! Every non-blank line becomes a [`Line`]: a keyword followed by
//! whitespace-separated fields. Field access helpers check the arity first
//! and only then convert, so a short line is reported as malformed rather
//! than as a bad number.

use std::str::FromStr;

use super::parser::{ParseError, ParseResult};

/// A tokenized instruction.
#[derive(Clone, Debug, PartialEq)]
pub struct Line<'a> {
    /// 1-based line number in the source text
    pub number: usize,
    pub keyword: &'a str,
    pub fields: Vec<&'a str>,
}

impl<'a> Line<'a> {
    /// Split a raw line. Returns `None` for blank lines.
    pub fn parse(number: usize, raw: &'a str) -> Option<Self> {
        let mut tokens = raw.split_whitespace();
        let keyword = tokens.next()?;
        Some(Self {
            number,
            keyword,
            fields: tokens.collect(),
        })
    }

    /// Fail with `MalformedInstruction` unless at least `count` fields are present.
    pub fn require(&self, count: usize) -> ParseResult<()> {
        if self.fields.len() < count {
            return Err(self.malformed(format!(
                "expects at least {} fields, found {}",
                count,
                self.fields.len()
            )));
        }
        Ok(())
    }

    /// Build a `MalformedInstruction` error for this line.
    pub fn malformed(&self, reason: impl Into<String>) -> ParseError {
        ParseError::MalformedInstruction {
            line: self.number,
            keyword: self.keyword.to_string(),
            reason: reason.into(),
        }
    }

    pub fn text(&self, index: usize) -> ParseResult<&'a str> {
        self.require(index + 1)?;
        Ok(self.fields[index])
    }

    /// Parse field `index` as a number of type `T`.
    pub fn number<T: FromStr>(&self, index: usize) -> ParseResult<T> {
        let raw = self.text(index)?;
        raw.parse::<T>().map_err(|_| ParseError::NumericConversion {
            line: self.number,
            keyword: self.keyword.to_string(),
            field: index + 1,
            value: raw.to_string(),
        })
    }

    pub fn float(&self, index: usize) -> ParseResult<f32> {
        self.number::<f32>(index)
    }

    /// Parse `N` consecutive floats starting at field `start`.
    pub fn floats<const N: usize>(&self, start: usize) -> ParseResult<[f32; N]> {
        self.require(start + N)?;
        let mut values = [0.0; N];
        for (i, value) in values.iter_mut().enumerate() {
            *value = self.float(start + i)?;
        }
        Ok(values)
    }

    /// All fields joined with `separator`.
    pub fn joined(&self, separator: &str) -> String {
        self.fields.join(separator)
    }
}

/// Iterate over the non-blank lines of `content`.
pub fn tokenize(content: &str) -> impl Iterator<Item = Line<'_>> {
    content
        .lines()
        .enumerate()
        .filter_map(|(i, raw)| Line::parse(i + 1, raw))
}
