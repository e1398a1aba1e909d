//! URL-encoded form bodies for the update endpoint
//!
//! A body is a list of `key=value` terms joined with `&`, always followed by
//! `&headers=false` (which keeps the service from echoing header data in its
//! reply). Both the declared length and the serialized bytes are derived from
//! the same [`FormBody`] term list.

use core::fmt::{self, Write};
use heapless::{String, Vec};

use super::error::ResultCode;
use super::{FIELD_COUNT, MAX_FIELD_LEN};
use crate::network::application::http::request::Body;

/// Generic float field values must stay strictly inside +/- this bound.
pub const FLOAT_LIMIT: f64 = 999_999_000_000.0;

/// Terminates every update body.
pub const HEADERS_SUFFIX: &str = "&headers=false";

/// Keys of the eight channel fields, index 0 is field 1.
pub const FIELD_KEYS: [&str; FIELD_COUNT] = [
    "field1", "field2", "field3", "field4", "field5", "field6", "field7", "field8",
];

/// Eight fields, three location terms, status, twitter, tweet and created_at.
const MAX_TERMS: usize = FIELD_COUNT + 7;

/// Enough room for any finite `f32` with six decimals.
pub type Rendered = String<48>;

/// Text of a single field value, at most 255 bytes.
pub type FieldText = String<MAX_FIELD_LEN>;

/// A value that can be written into a channel field.
///
/// Implemented for text and the common numeric types, so one setter covers
/// every value kind.
pub trait FieldValue {
    /// Render the value as it goes on the wire.
    fn render(&self) -> Result<FieldText, ResultCode>;
}

impl FieldValue for &str {
    fn render(&self) -> Result<FieldText, ResultCode> {
        FieldText::try_from(*self).map_err(|_| ResultCode::OutOfRange)
    }
}

impl FieldValue for i32 {
    fn render(&self) -> Result<FieldText, ResultCode> {
        let mut text = FieldText::new();
        write!(text, "{}", self).map_err(|_| ResultCode::OutOfRange)?;
        Ok(text)
    }
}

impl FieldValue for i64 {
    fn render(&self) -> Result<FieldText, ResultCode> {
        let mut text = FieldText::new();
        write!(text, "{}", self).map_err(|_| ResultCode::OutOfRange)?;
        Ok(text)
    }
}

impl FieldValue for f32 {
    fn render(&self) -> Result<FieldText, ResultCode> {
        encode_float(f64::from(*self))
    }
}

impl FieldValue for f64 {
    fn render(&self) -> Result<FieldText, ResultCode> {
        encode_float(*self)
    }
}

/// Render a generic float field with five decimals.
///
/// Finite values at or beyond [`FLOAT_LIMIT`] in magnitude are rejected.
/// Infinities and NaN pass through as `inf`, `-inf` and `NaN`.
pub fn encode_float(value: f64) -> Result<FieldText, ResultCode> {
    if value.is_finite() && value.abs() >= FLOAT_LIMIT {
        return Err(ResultCode::OutOfRange);
    }
    let mut text = FieldText::new();
    write!(text, "{:.5}", value).map_err(|_| ResultCode::OutOfRange)?;
    Ok(text)
}

/// Render a latitude, longitude or elevation with six decimals.
pub fn encode_location(value: f32) -> Rendered {
    let mut text = Rendered::new();
    // Any f32 fits in 48 bytes at this precision.
    let _ = write!(text, "{:.6}", value);
    text
}

/// Value side of a term.
#[derive(Debug, Clone)]
pub enum TermValue<'a> {
    /// Text borrowed from the caller or the field batch.
    Text(&'a str),
    /// A number rendered when the term was built.
    Number(Rendered),
}

impl TermValue<'_> {
    pub fn as_str(&self) -> &str {
        match self {
            TermValue::Text(text) => text,
            TermValue::Number(number) => number.as_str(),
        }
    }
}

/// One `key=value` pair.
#[derive(Debug, Clone)]
pub struct Term<'a> {
    pub key: &'static str,
    pub value: TermValue<'a>,
}

impl Term<'_> {
    /// `key`, `=` and the value.
    pub fn len(&self) -> usize {
        self.key.len() + 1 + self.value.as_str().len()
    }
}

/// An ordered list of form terms.
#[derive(Debug, Clone, Default)]
pub struct FormBody<'a> {
    terms: Vec<Term<'a>, MAX_TERMS>,
}

impl<'a> FormBody<'a> {
    pub fn new() -> Self {
        Self { terms: Vec::new() }
    }

    pub fn push_text(&mut self, key: &'static str, value: &'a str) -> Result<(), ResultCode> {
        self.push(Term {
            key,
            value: TermValue::Text(value),
        })
    }

    pub fn push_number(&mut self, key: &'static str, value: Rendered) -> Result<(), ResultCode> {
        self.push(Term {
            key,
            value: TermValue::Number(value),
        })
    }

    fn push(&mut self, term: Term<'a>) -> Result<(), ResultCode> {
        self.terms
            .push(term)
            .map_err(|_| ResultCode::UnexpectedFail)
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn terms(&self) -> &[Term<'a>] {
        &self.terms
    }

    /// Length of the terms alone, without [`HEADERS_SUFFIX`]. Zero when empty.
    pub fn payload_len(&self) -> usize {
        let separators = self.terms.len().saturating_sub(1);
        self.terms.iter().map(Term::len).sum::<usize>() + separators
    }
}

impl Body for FormBody<'_> {
    fn content_length(&self) -> usize {
        self.payload_len() + HEADERS_SUFFIX.len()
    }

    fn write_to(&self, out: &mut dyn Write) -> fmt::Result {
        for (index, term) in self.terms.iter().enumerate() {
            if index > 0 {
                out.write_char('&')?;
            }
            out.write_str(term.key)?;
            out.write_char('=')?;
            out.write_str(term.value.as_str())?;
        }
        out.write_str(HEADERS_SUFFIX)
    }
}

/// A caller-built form body, posted as given plus [`HEADERS_SUFFIX`].
#[derive(Debug, Clone, Copy)]
pub struct RawForm<'a>(pub &'a str);

impl Body for RawForm<'_> {
    fn content_length(&self) -> usize {
        self.0.len() + HEADERS_SUFFIX.len()
    }

    fn write_to(&self, out: &mut dyn Write) -> fmt::Result {
        out.write_str(self.0)?;
        out.write_str(HEADERS_SUFFIX)
    }
}
