//! Synthesized basal rate segments.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::event::{DeliveryType, Event, IdKey, fields, tags};
use crate::BasaltError;

/// A basal rate segment: an interval during which one rate was in effect.
///
/// `end` is `None` for the sentinel segment emitted when a scheduled rate was
/// still in effect when the data ran out. Sentinel segments produced from the
/// opening event may carry extra fields; they are kept in `extra`.
///
/// The serde form always names the identifier `_id`; the event form from
/// [`Segment::into_event`] writes it back under `id_key`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Identifier of the event that opened the segment.
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    /// Key the identifier was read from.
    #[serde(skip)]
    pub id_key: IdKey,
    /// Device time at which the rate took effect.
    pub start: Value,
    /// Device time at which the rate stopped; `None` if still open.
    pub end: Option<Value>,
    /// `start/end` rendering.
    pub interval: String,
    /// Delivery mode of the segment.
    #[serde(rename = "deliveryType")]
    pub delivery_type: DeliveryType,
    /// Schedule name, for scheduled segments.
    #[serde(
        rename = "scheduleName",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub schedule_name: Option<Value>,
    /// Delivery rate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Any other fields copied from the originating event.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl Segment {
    /// Whether the segment has no end (still open when the data ended).
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.end.is_none()
    }

    /// Render the segment as an event carrying `type: basal-rate-segment`.
    #[must_use]
    pub fn into_event(self) -> Event {
        let mut out = Event::new();
        if let Some(id) = self.id {
            out.insert(self.id_key.as_str(), id);
        }
        out.insert(fields::TYPE, tags::BASAL_RATE_SEGMENT);
        out.insert(fields::START, self.start);
        out.insert(fields::END, self.end.unwrap_or(Value::Null));
        out.insert(fields::INTERVAL, self.interval);
        out.insert(fields::DELIVERY_TYPE, self.delivery_type.as_str());
        if let Some(name) = self.schedule_name {
            out.insert(fields::SCHEDULE_NAME, name);
        }
        if let Some(value) = self.value {
            out.insert(fields::VALUE, value);
        }
        for (k, v) in self.extra {
            out.insert(&k, v);
        }
        out
    }
}

impl From<Segment> for Event {
    fn from(s: Segment) -> Self {
        s.into_event()
    }
}

impl TryFrom<Event> for Segment {
    type Error = BasaltError;

    /// Parse a segment back out of an output event.
    ///
    /// # Errors
    /// Returns `InvalidArg` if the event is not a `basal-rate-segment` or lacks
    /// the segment fields.
    fn try_from(event: Event) -> Result<Self, Self::Error> {
        if !event.is_segment() {
            return Err(BasaltError::InvalidArg(format!(
                "event {} is not a {}",
                event.id_label(),
                tags::BASAL_RATE_SEGMENT
            )));
        }
        let id_key = event.id_entry().map_or(IdKey::Document, |(key, _)| key);
        let mut map = event.into_map();
        map.remove(fields::TYPE);
        if id_key == IdKey::Plain {
            if let Some(id) = map.remove(fields::PLAIN_ID) {
                map.insert(fields::ID.to_string(), id);
            }
        }
        let mut segment: Self = serde_json::from_value(Value::Object(map))?;
        segment.id_key = id_key;
        Ok(segment)
    }
}
