//! The most recent channel entry read with a multi-field read

use super::FIELD_COUNT;
use super::extract::{parse_float, parse_long};
use super::form::FieldText;
use super::{FIELD_NUM_MAX, FIELD_NUM_MIN};

/// Text of every value in one channel entry.
///
/// Replaced wholesale by each successful multi-field read. Values that were
/// absent from the entry are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedSnapshot {
    /// `field1` to `field8`, in order.
    pub fields: [FieldText; FIELD_COUNT],
    pub status: FieldText,
    pub latitude: FieldText,
    pub longitude: FieldText,
    pub elevation: FieldText,
    /// ISO 8601 time the server stored the entry.
    pub created_at: FieldText,
}

impl FeedSnapshot {
    /// Text of `field` (1..=8), `None` for an invalid field number.
    pub fn field(&self, field: u8) -> Option<&str> {
        if !(FIELD_NUM_MIN..=FIELD_NUM_MAX).contains(&field) {
            return None;
        }
        Some(self.fields[usize::from(field - FIELD_NUM_MIN)].as_str())
    }

    /// Field coerced like `atof`: 0 for text or an invalid field number.
    pub fn field_as_float(&self, field: u8) -> f32 {
        self.field(field).map(parse_float).unwrap_or(0.0)
    }

    /// Field coerced like `atol`.
    pub fn field_as_long(&self, field: u8) -> i64 {
        self.field(field).map(parse_long).unwrap_or(0)
    }

    /// [`field_as_long`](Self::field_as_long), saturated to `i32`.
    pub fn field_as_int(&self, field: u8) -> i32 {
        clamp_i32(self.field_as_long(field))
    }

    pub fn latitude(&self) -> f32 {
        parse_float(&self.latitude)
    }

    pub fn longitude(&self) -> f32 {
        parse_float(&self.longitude)
    }

    pub fn elevation(&self) -> f32 {
        parse_float(&self.elevation)
    }
}

/// Copy as much of `text` as fits into a field slot, on a char boundary.
pub(crate) fn bounded(text: &str) -> FieldText {
    let mut out = FieldText::new();
    for c in text.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

pub(crate) fn clamp_i32(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}
