use basalt_types::{BasaltError, DeliveryType, Event, IdKey, Segment, fields};

use crate::time::{self, DeviceTime};

/// Map a temporary basal to a rate segment; every other event is returned as is.
///
/// `end` is `deviceTime + duration` (milliseconds), computed on the wall clock
/// without zone or DST correction. Segments are never re-mapped.
///
/// # Errors
/// Returns `MalformedEvent` if a temp basal lacks a usable `deviceTime` or an
/// integer `duration`.
pub fn map_temp_basal(event: Event) -> Result<Event, BasaltError> {
    if event.delivery_type() != Some(DeliveryType::Temp.as_str()) || event.is_segment() {
        return Ok(event);
    }

    let start = event.device_time().cloned().ok_or_else(|| {
        BasaltError::malformed(event.id_label(), fields::DEVICE_TIME, "is required on a temp basal")
    })?;
    let parsed = DeviceTime::parse(&start).ok_or_else(|| {
        BasaltError::malformed(
            event.id_label(),
            fields::DEVICE_TIME,
            format!("is not a recognized timestamp: {start}"),
        )
    })?;
    let duration = event.duration_ms().ok_or_else(|| {
        BasaltError::malformed(
            event.id_label(),
            fields::DURATION,
            "must be an integer number of milliseconds",
        )
    })?;
    let end = parsed
        .add_millis(duration)
        .ok_or_else(|| {
            BasaltError::malformed(event.id_label(), fields::DURATION, "overflows the timestamp")
        })?
        .to_value();

    let (id_key, id) = event
        .id_entry()
        .map_or((IdKey::Document, None), |(key, id)| (key, Some(id.clone())));
    Ok(Segment {
        id,
        id_key,
        interval: time::interval(&start, &end),
        start,
        end: Some(end),
        delivery_type: DeliveryType::Temp,
        schedule_name: None,
        value: event.value().cloned(),
        extra: serde_json::Map::new(),
    }
    .into_event())
}
