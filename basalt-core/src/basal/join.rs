use basalt_types::{BasaltError, DeliveryType, Event, IdKey, Segment, fields, tags};
use serde_json::Value;

use crate::join::{HandlerBuilder, JoinHandler};
use crate::time;

/// Whether `event` is a scheduled basal rate change.
///
/// The type-family check, the rate-change check and the delivery check are
/// kept separate so new basal event variants are not misclassified.
#[must_use]
pub fn is_scheduled_basal(event: &Event) -> bool {
    let Some(kind) = event.kind() else {
        return false;
    };
    if !kind.contains(tags::BASAL_FAMILY) {
        return false;
    }
    kind == tags::BASAL_RATE_CHANGE
        && event.delivery_type() == Some(DeliveryType::Scheduled.as_str())
}

/// Joins consecutive scheduled rate changes into a rate segment.
///
/// The first scheduled change opens the segment; everything that is not a
/// scheduled change is buffered; the next scheduled change closes it. The
/// closing event is handed back after the segment and the buffered events so
/// it can open the following segment.
#[derive(Debug, Default)]
pub struct BasalJoinHandler {
    segment_start: Option<Event>,
    event_buffer: Vec<Event>,
}

impl BasalJoinHandler {
    /// Create an empty handler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The event that opened the current segment.
    #[must_use]
    pub const fn segment_start(&self) -> Option<&Event> {
        self.segment_start.as_ref()
    }

    /// Number of events buffered since the segment start.
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.event_buffer.len()
    }

    fn boundary_time(event: &Event) -> Result<Value, BasaltError> {
        event.device_time().cloned().ok_or_else(|| {
            BasaltError::malformed(
                event.id_label(),
                fields::DEVICE_TIME,
                "is required on a scheduled rate change",
            )
        })
    }

    fn close(&mut self, start: &Event, end: Event) -> Result<Vec<Event>, BasaltError> {
        let start_time = Self::boundary_time(start)?;
        let end_time = Self::boundary_time(&end)?;
        let (id_key, id) = start
            .id_entry()
            .map_or((IdKey::Document, None), |(key, id)| (key, Some(id.clone())));
        let segment = Segment {
            id,
            id_key,
            interval: time::interval(&start_time, &end_time),
            start: start_time,
            end: Some(end_time),
            delivery_type: DeliveryType::Scheduled,
            schedule_name: start.schedule_name().cloned(),
            value: start.value().cloned(),
            extra: serde_json::Map::new(),
        };

        let mut batch = Vec::with_capacity(self.event_buffer.len() + 2);
        batch.push(segment.into_event());
        batch.append(&mut self.event_buffer);
        batch.push(end);
        Ok(batch)
    }
}

impl JoinHandler for BasalJoinHandler {
    fn name(&self) -> &'static str {
        "basal-join"
    }

    fn handle(&mut self, event: Event) -> Result<Option<Vec<Event>>, BasaltError> {
        if !is_scheduled_basal(&event) {
            self.event_buffer.push(event);
            return Ok(None);
        }

        match self.segment_start.take() {
            None => {
                Self::boundary_time(&event)?;
                self.segment_start = Some(event);
                Ok(None)
            }
            Some(start) => self.close(&start, event).map(Some),
        }
    }

    fn completed(self: Box<Self>) -> Result<Vec<Event>, BasaltError> {
        let Self {
            segment_start,
            event_buffer,
        } = *self;

        // Only reachable when driven outside a builder, which always opens
        // the handler with a scheduled change.
        let Some(start) = segment_start else {
            return Ok(event_buffer);
        };

        if !event_buffer.is_empty() {
            #[cfg(feature = "tracing")]
            tracing::warn!(
                id = %start.id_label(),
                discarded = event_buffer.len(),
                "discarding events buffered after a segment start that never closed"
            );
        }

        let start_time = Self::boundary_time(&start)?;
        let interval = time::interval(&start_time, &start_time);
        let mut open = start;
        open.remove(fields::DEVICE_TIME);
        let open = open
            .with(fields::TYPE, tags::BASAL_RATE_SEGMENT)
            .with(fields::START, start_time)
            .with(fields::END, Value::Null)
            .with(fields::INTERVAL, interval);
        Ok(vec![open])
    }
}

/// Builder opening a [`BasalJoinHandler`] on scheduled rate changes.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasalBuilder;

impl HandlerBuilder for BasalBuilder {
    fn build(&self, event: &Event) -> Result<Option<Box<dyn JoinHandler>>, BasaltError> {
        if is_scheduled_basal(event) {
            Ok(Some(Box::new(BasalJoinHandler::new())))
        } else {
            Ok(None)
        }
    }
}

/// The builder list used to normalize basal data.
#[must_use]
pub fn basal_builders() -> Vec<Box<dyn HandlerBuilder>> {
    vec![Box::new(BasalBuilder)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ev(v: Value) -> Event {
        Event::from_value(v).unwrap()
    }

    fn scheduled(id: &str, t: &str) -> Event {
        ev(json!({
            "_id": id,
            "type": "basal-rate-change",
            "deliveryType": "scheduled",
            "deviceTime": t,
            "scheduleName": "Standard",
            "value": 0.8
        }))
    }

    #[test]
    fn predicate_requires_all_three_conditions() {
        assert!(is_scheduled_basal(&scheduled("a", "2014-01-01T00:00:00")));
        assert!(!is_scheduled_basal(&ev(json!({"type": "basal-rate-change", "deliveryType": "temp"}))));
        assert!(!is_scheduled_basal(&ev(json!({"type": "basal-rate-segment", "deliveryType": "scheduled"}))));
        assert!(!is_scheduled_basal(&ev(json!({"type": "rate-change", "deliveryType": "scheduled"}))));
        assert!(!is_scheduled_basal(&ev(json!({"deliveryType": "scheduled"}))));
    }

    #[test]
    fn close_emits_segment_buffer_then_terminator() {
        let mut h = BasalJoinHandler::new();
        assert!(h.handle(scheduled("a", "2014-01-01T00:00:00")).unwrap().is_none());
        assert!(h.handle(ev(json!({"_id": "x", "type": "smbg"}))).unwrap().is_none());
        assert_eq!(h.buffered(), 1);

        let batch = h.handle(scheduled("b", "2014-01-01T06:00:00")).unwrap().unwrap();
        assert_eq!(batch.len(), 3);
        let seg: Value = batch[0].clone().into();
        assert_eq!(
            seg,
            json!({
                "_id": "a",
                "type": "basal-rate-segment",
                "start": "2014-01-01T00:00:00",
                "end": "2014-01-01T06:00:00",
                "interval": "2014-01-01T00:00:00/2014-01-01T06:00:00",
                "deliveryType": "scheduled",
                "scheduleName": "Standard",
                "value": 0.8
            })
        );
        assert_eq!(batch[1].id_label(), "x");
        assert_eq!(batch[2].id_label(), "b");
        assert!(h.segment_start().is_none());
        assert_eq!(h.buffered(), 0);
    }

    #[test]
    fn close_keeps_the_identifier_key_of_the_start() {
        let mut h = BasalJoinHandler::new();
        let mut start = scheduled("a", "2014-01-01T00:00:00");
        let id = start.remove("_id").unwrap();
        h.handle(start.with("id", id)).unwrap();

        let batch = h.handle(scheduled("b", "2014-01-01T06:00:00")).unwrap().unwrap();
        assert_eq!(batch[0].get("id"), Some(&json!("a")));
        assert!(batch[0].get("_id").is_none());
        assert_eq!(batch[2].get("_id"), Some(&json!("b")));
    }

    #[test]
    fn completed_drops_buffer_and_keeps_start_fields() {
        let mut h = Box::new(BasalJoinHandler::new());
        let start = scheduled("a", "2014-01-01T00:00:00").with("deviceId", "pump");
        h.handle(start).unwrap();
        h.handle(ev(json!({"_id": "x", "type": "smbg"}))).unwrap();

        let out = h.completed().unwrap();
        assert_eq!(out.len(), 1);
        let seg: Value = out[0].clone().into();
        assert_eq!(seg["type"], json!("basal-rate-segment"));
        assert_eq!(seg["start"], json!("2014-01-01T00:00:00"));
        assert_eq!(seg["end"], Value::Null);
        assert_eq!(seg["interval"], json!("2014-01-01T00:00:00/2014-01-01T00:00:00"));
        assert_eq!(seg["deviceId"], json!("pump"));
        assert_eq!(seg["deliveryType"], json!("scheduled"));
        assert!(seg.get("deviceTime").is_none());
    }

    #[test]
    fn missing_device_time_is_malformed() {
        let mut h = BasalJoinHandler::new();
        let bad = ev(json!({"_id": "a", "type": "basal-rate-change", "deliveryType": "scheduled"}));
        let err = h.handle(bad).unwrap_err();
        assert!(matches!(err, BasaltError::MalformedEvent { ref field, .. } if field == "deviceTime"));
    }

    #[test]
    fn builder_only_opens_on_scheduled_changes() {
        let b = BasalBuilder;
        assert!(b.build(&scheduled("a", "2014-01-01T00:00:00")).unwrap().is_some());
        assert!(b.build(&ev(json!({"type": "temp-basal", "deliveryType": "temp"}))).unwrap().is_none());
    }
}
