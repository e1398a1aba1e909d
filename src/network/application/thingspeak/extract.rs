//! Value extraction from response bodies
//!
//! Read responses carry a flat JSON object. Only single string values are
//! ever looked up, so the default extractor is a key scan rather than a
//! parser. [`SerdeExtractor`] deserializes the record with `serde-json-core`
//! instead and can be dropped in through [`Client::with_extractor`].
//!
//! [`Client::with_extractor`]: super::Client::with_extractor

use serde::Deserialize;

use super::feed::{FeedSnapshot, bounded};
use super::form::FIELD_KEYS;

/// Looks up string values in a response body.
pub trait ValueExtractor {
    /// Value of `key`, or an empty string when it is missing or not a string.
    fn extract<'a>(&self, body: &'a str, key: &str) -> &'a str;

    /// Every value of a feed record.
    fn extract_feed(&self, body: &str) -> FeedSnapshot {
        let mut feed = FeedSnapshot::default();
        for (slot, key) in feed.fields.iter_mut().zip(FIELD_KEYS) {
            *slot = bounded(self.extract(body, key));
        }
        feed.created_at = bounded(self.extract(body, "created_at"));
        feed.latitude = bounded(self.extract(body, "latitude"));
        feed.longitude = bounded(self.extract(body, "longitude"));
        feed.elevation = bounded(self.extract(body, "elevation"));
        feed.status = bounded(self.extract(body, "status"));
        feed
    }
}

/// Finds `"key":"` and returns everything up to the next `"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyScan;

impl ValueExtractor for KeyScan {
    fn extract<'a>(&self, body: &'a str, key: &str) -> &'a str {
        if key.is_empty() {
            return "";
        }
        let mut from = 0;
        while let Some(pos) = body[from..].find(key) {
            let start = from + pos;
            let end = start + key.len();
            if body[..start].ends_with('"') && body[end..].starts_with("\":\"") {
                let value = &body[end + 3..];
                return value.find('"').map_or("", |close| &value[..close]);
            }
            from = end;
        }
        ""
    }
}

/// One entry of a channel feed, as the service serializes it.
#[derive(Debug, Default, Deserialize)]
pub struct FeedRecord<'a> {
    #[serde(borrow, default)]
    pub field1: Option<&'a str>,
    #[serde(borrow, default)]
    pub field2: Option<&'a str>,
    #[serde(borrow, default)]
    pub field3: Option<&'a str>,
    #[serde(borrow, default)]
    pub field4: Option<&'a str>,
    #[serde(borrow, default)]
    pub field5: Option<&'a str>,
    #[serde(borrow, default)]
    pub field6: Option<&'a str>,
    #[serde(borrow, default)]
    pub field7: Option<&'a str>,
    #[serde(borrow, default)]
    pub field8: Option<&'a str>,
    #[serde(borrow, default)]
    pub created_at: Option<&'a str>,
    #[serde(borrow, default)]
    pub latitude: Option<&'a str>,
    #[serde(borrow, default)]
    pub longitude: Option<&'a str>,
    #[serde(borrow, default)]
    pub elevation: Option<&'a str>,
    #[serde(borrow, default)]
    pub status: Option<&'a str>,
}

impl<'a> FeedRecord<'a> {
    pub fn get(&self, key: &str) -> Option<&'a str> {
        match key {
            "field1" => self.field1,
            "field2" => self.field2,
            "field3" => self.field3,
            "field4" => self.field4,
            "field5" => self.field5,
            "field6" => self.field6,
            "field7" => self.field7,
            "field8" => self.field8,
            "created_at" => self.created_at,
            "latitude" => self.latitude,
            "longitude" => self.longitude,
            "elevation" => self.elevation,
            "status" => self.status,
            _ => None,
        }
    }
}

/// Deserializes the whole record with `serde-json-core`.
///
/// Bodies that are not a feed record (or contain escaped strings) yield
/// empty values.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerdeExtractor;

impl SerdeExtractor {
    fn record<'a>(&self, body: &'a str) -> Option<FeedRecord<'a>> {
        serde_json_core::from_str::<FeedRecord<'a>>(body.trim())
            .ok()
            .map(|(record, _)| record)
    }
}

impl ValueExtractor for SerdeExtractor {
    fn extract<'a>(&self, body: &'a str, key: &str) -> &'a str {
        self.record(body)
            .and_then(|record| record.get(key))
            .unwrap_or("")
    }

    fn extract_feed(&self, body: &str) -> FeedSnapshot {
        let record = self.record(body).unwrap_or_default();
        let value = |v: Option<&str>| bounded(v.unwrap_or(""));
        let mut feed = FeedSnapshot::default();
        for (slot, key) in feed.fields.iter_mut().zip(FIELD_KEYS) {
            *slot = value(record.get(key));
        }
        feed.created_at = value(record.created_at);
        feed.latitude = value(record.latitude);
        feed.longitude = value(record.longitude);
        feed.elevation = value(record.elevation);
        feed.status = value(record.status);
        feed
    }
}

/// Lenient float parse: the longest numeric prefix, 0 when there is none.
pub fn parse_float(text: &str) -> f32 {
    let text = text.trim_start();
    let result = numeric_prefix(text).parse::<f32>().unwrap_or(0.0);
    // Negative infinity is decided by the sign, not by the parser.
    if result.is_infinite() && text.starts_with('-') {
        return f32::NEG_INFINITY;
    }
    result
}

/// Lenient integer parse: optional sign and leading digits, 0 when there are none.
pub fn parse_long(text: &str) -> i64 {
    let bytes = text.trim_start().as_bytes();
    let (negative, digits) = match bytes.first() {
        Some(b'-') => (true, &bytes[1..]),
        Some(b'+') => (false, &bytes[1..]),
        _ => (false, bytes),
    };
    let magnitude = digits
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .fold(0i64, |acc, &b| {
            acc.saturating_mul(10).saturating_add(i64::from(b - b'0'))
        });
    if negative { -magnitude } else { magnitude }
}

fn numeric_prefix(text: &str) -> &str {
    let bytes = text.as_bytes();
    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));

    for word in ["infinity", "inf", "nan"] {
        let candidate = bytes.get(end..end + word.len());
        if candidate.is_some_and(|c| c.eq_ignore_ascii_case(word.as_bytes())) {
            return &text[..end + word.len()];
        }
    }

    let digits = |from: usize| {
        bytes[from..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count()
    };

    let integer = digits(end);
    end += integer;
    let mut mantissa = integer;
    if bytes.get(end) == Some(&b'.') {
        let fraction = digits(end + 1);
        if integer + fraction > 0 {
            end += 1 + fraction;
        }
        mantissa += fraction;
    }
    if mantissa == 0 {
        return "";
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exponent = end + 1;
        if matches!(bytes.get(exponent), Some(b'+' | b'-')) {
            exponent += 1;
        }
        let count = digits(exponent);
        if count > 0 {
            end = exponent + count;
        }
    }
    &text[..end]
}
