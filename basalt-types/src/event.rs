//! Device events as stored by the upload pipeline.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::BasaltError;

/// Field names used by device events and synthesized segments.
pub mod fields {
    /// Document identifier.
    pub const ID: &str = "_id";
    /// Identifier key used by records that did not come from the document store.
    pub const PLAIN_ID: &str = "id";
    /// Event type tag.
    pub const TYPE: &str = "type";
    /// Timestamp reported by the device.
    pub const DEVICE_TIME: &str = "deviceTime";
    /// Basal delivery sub-type (`scheduled` or `temp`).
    pub const DELIVERY_TYPE: &str = "deliveryType";
    /// Name of the basal schedule in effect.
    pub const SCHEDULE_NAME: &str = "scheduleName";
    /// Delivery rate.
    pub const VALUE: &str = "value";
    /// Duration of a temporary basal, in milliseconds.
    pub const DURATION: &str = "duration";
    /// Segment start.
    pub const START: &str = "start";
    /// Segment end; `null` for a segment still open at the end of the data.
    pub const END: &str = "end";
    /// `start/end` rendering of a segment.
    pub const INTERVAL: &str = "interval";
}

/// Well-known values of the `type` tag.
pub mod tags {
    /// Substring shared by every basal-related type tag.
    pub const BASAL_FAMILY: &str = "basal";
    /// A basal rate change reported by the pump.
    pub const BASAL_RATE_CHANGE: &str = "basal-rate-change";
    /// A synthesized basal rate segment.
    pub const BASAL_RATE_SEGMENT: &str = "basal-rate-segment";
}

/// Basal delivery mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryType {
    /// Rate driven by the programmed basal schedule; changes arrive as boundary events.
    Scheduled,
    /// Temporary override carrying its own duration.
    Temp,
}

impl DeliveryType {
    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Temp => "temp",
        }
    }
}

impl fmt::Display for DeliveryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeliveryType {
    type Err = BasaltError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(Self::Scheduled),
            "temp" => Ok(Self::Temp),
            other => Err(BasaltError::InvalidArg(format!(
                "unknown delivery type: {other}"
            ))),
        }
    }
}

/// Which key an event's identifier was stored under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IdKey {
    /// `_id`, the document store key.
    #[default]
    Document,
    /// `id`.
    Plain,
}

impl IdKey {
    /// Field name for this key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Document => fields::ID,
            Self::Plain => fields::PLAIN_ID,
        }
    }
}

/// A single device event.
///
/// Events are JSON objects; only a handful of fields are interpreted by the
/// normalizer, everything else is carried along untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Event(Map<String, Value>);

impl Event {
    /// Create an empty event.
    #[must_use]
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Interpret a JSON value as an event.
    ///
    /// # Errors
    /// Returns `InvalidArg` if the value is not a JSON object.
    pub fn from_value(value: Value) -> Result<Self, BasaltError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(BasaltError::InvalidArg(format!(
                "event must be a JSON object, got {other}"
            ))),
        }
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    /// Set a field, returning the previous value.
    pub fn insert(&mut self, key: &str, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.to_string(), value.into())
    }

    /// Remove a field, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Raw field access.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Field access that treats JSON `null` as absent.
    fn present(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// The identifier: `_id`, falling back to `id`.
    #[must_use]
    pub fn id(&self) -> Option<&Value> {
        self.id_entry().map(|(_, v)| v)
    }

    /// The identifier together with the key it was found under.
    #[must_use]
    pub fn id_entry(&self) -> Option<(IdKey, &Value)> {
        self.present(fields::ID)
            .map(|v| (IdKey::Document, v))
            .or_else(|| self.present(fields::PLAIN_ID).map(|v| (IdKey::Plain, v)))
    }

    /// Identifier rendered for diagnostics.
    #[must_use]
    pub fn id_label(&self) -> String {
        match self.id() {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => "<unknown>".to_string(),
        }
    }

    /// The `type` tag.
    #[must_use]
    pub fn kind(&self) -> Option<&str> {
        self.str_field(fields::TYPE)
    }

    /// The `deviceTime` timestamp.
    #[must_use]
    pub fn device_time(&self) -> Option<&Value> {
        self.present(fields::DEVICE_TIME)
    }

    /// The raw `deliveryType` tag.
    #[must_use]
    pub fn delivery_type(&self) -> Option<&str> {
        self.str_field(fields::DELIVERY_TYPE)
    }

    /// The `scheduleName` field.
    #[must_use]
    pub fn schedule_name(&self) -> Option<&Value> {
        self.present(fields::SCHEDULE_NAME)
    }

    /// The `value` (rate) field.
    #[must_use]
    pub fn value(&self) -> Option<&Value> {
        self.present(fields::VALUE)
    }

    /// The `duration` field in whole milliseconds.
    ///
    /// Floating point durations are accepted when they carry no fractional part.
    #[must_use]
    pub fn duration_ms(&self) -> Option<i64> {
        let v = self.present(fields::DURATION)?;
        v.as_i64().or_else(|| {
            v.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < 9.0e15)
                .map(|f| f as i64)
        })
    }

    /// Whether the `type` tag marks a synthesized segment.
    #[must_use]
    pub fn is_segment(&self) -> bool {
        self.kind() == Some(tags::BASAL_RATE_SEGMENT)
    }

    /// Borrow the underlying JSON object.
    #[must_use]
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consume into the underlying JSON object.
    #[must_use]
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Event {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<Event> for Value {
    fn from(e: Event) -> Self {
        Self::Object(e.0)
    }
}

impl TryFrom<Value> for Event {
    type Error = BasaltError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}
