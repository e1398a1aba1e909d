//! Values staged for the next multi-field write

use super::error::ResultCode;
use super::form::{FIELD_KEYS, FieldText, FieldValue, FormBody, encode_location};
use super::{FIELD_COUNT, FIELD_NUM_MAX, FIELD_NUM_MIN};

/// Staged values for one multi-field update.
///
/// Each slot is optional: an empty string or `None` is simply left out of the
/// request body. The batch is consumed and cleared when the write is issued.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldBatch {
    fields: [FieldText; FIELD_COUNT],
    latitude: Option<f32>,
    longitude: Option<f32>,
    elevation: Option<f32>,
    status: FieldText,
    twitter: FieldText,
    tweet: FieldText,
    created_at: FieldText,
}

impl FieldBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage `value` for `field` (1..=8).
    pub fn set_field<V: FieldValue>(&mut self, field: u8, value: V) -> Result<(), ResultCode> {
        let slot = field_index(field)?;
        self.fields[slot] = value.render()?;
        Ok(())
    }

    /// Degrees N; NaN clears the value.
    pub fn set_latitude(&mut self, latitude: f32) {
        self.latitude = location(latitude);
    }

    /// Degrees E; NaN clears the value.
    pub fn set_longitude(&mut self, longitude: f32) {
        self.longitude = location(longitude);
    }

    /// Meters above sea level; NaN clears the value.
    pub fn set_elevation(&mut self, elevation: f32) {
        self.elevation = location(elevation);
    }

    pub fn set_status(&mut self, status: &str) -> Result<(), ResultCode> {
        self.status = status.render()?;
        Ok(())
    }

    /// Both values are checked before either is stored.
    pub fn set_twitter_tweet(&mut self, twitter: &str, tweet: &str) -> Result<(), ResultCode> {
        let twitter = twitter.render()?;
        let tweet = tweet.render()?;
        self.twitter = twitter;
        self.tweet = tweet;
        Ok(())
    }

    /// ISO 8601 timestamp to record the update under, instead of the
    /// server's receive time.
    pub fn set_created_at(&mut self, created_at: &str) -> Result<(), ResultCode> {
        self.created_at = created_at.render()?;
        Ok(())
    }

    /// Staged text for `field`, empty when unset, `None` for an invalid number.
    pub fn field(&self, field: u8) -> Option<&str> {
        let slot = field_index(field).ok()?;
        Some(self.fields[slot].as_str())
    }

    pub fn latitude(&self) -> Option<f32> {
        self.latitude
    }

    pub fn longitude(&self) -> Option<f32> {
        self.longitude
    }

    pub fn elevation(&self) -> Option<f32> {
        self.elevation
    }

    /// Whether a multi-field write would have nothing to send.
    pub fn is_empty(&self) -> bool {
        self.form().is_empty()
    }

    /// Build the request body terms, in wire order.
    pub fn form(&self) -> FormBody<'_> {
        let mut form = FormBody::new();
        // At most FIELD_COUNT + 7 terms, which is the form's capacity.
        let _ = self.fill(&mut form);
        form
    }

    fn fill<'a>(&'a self, form: &mut FormBody<'a>) -> Result<(), ResultCode> {
        for (key, value) in FIELD_KEYS.into_iter().zip(self.fields.iter()) {
            if !value.is_empty() {
                form.push_text(key, value)?;
            }
        }

        let locations = [
            ("lat", self.latitude),
            ("long", self.longitude),
            ("elevation", self.elevation),
        ];
        for (key, value) in locations {
            if let Some(value) = value {
                form.push_number(key, encode_location(value))?;
            }
        }

        let texts = [
            ("status", &self.status),
            ("twitter", &self.twitter),
            ("tweet", &self.tweet),
            ("created_at", &self.created_at),
        ];
        for (key, value) in texts {
            if !value.is_empty() {
                form.push_text(key, value)?;
            }
        }
        Ok(())
    }

    /// Hand out the staged values and leave the batch empty.
    pub fn take(&mut self) -> FieldBatch {
        core::mem::take(self)
    }

    pub fn reset(&mut self) {
        *self = FieldBatch::default();
    }
}

fn field_index(field: u8) -> Result<usize, ResultCode> {
    if (FIELD_NUM_MIN..=FIELD_NUM_MAX).contains(&field) {
        Ok(usize::from(field - FIELD_NUM_MIN))
    } else {
        Err(ResultCode::InvalidFieldNumber)
    }
}

fn location(value: f32) -> Option<f32> {
    if value.is_nan() { None } else { Some(value) }
}
