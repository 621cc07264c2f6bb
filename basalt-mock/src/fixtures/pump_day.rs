use basalt_core::Event;
use serde_json::{Value, json};

fn ev(v: Value) -> Event {
    Event::from_value(v).unwrap()
}

fn scheduled(id: &str, time: &str, rate: f64) -> Event {
    ev(json!({
        "_id": id,
        "type": "basal-rate-change",
        "deliveryType": "scheduled",
        "deviceTime": time,
        "scheduleName": "Standard",
        "value": rate,
        "deviceId": "pump-0001"
    }))
}

fn cbg(id: &str, time: &str, mgdl: u32) -> Event {
    ev(json!({
        "_id": id,
        "type": "cbg",
        "deviceTime": time,
        "value": mgdl,
        "deviceId": "cgm-0001"
    }))
}

/// One day of pump and CGM uploads, sorted by `deviceTime`.
///
/// Three scheduled rate changes (00:00, 06:00, 22:00), a 90 minute temp basal
/// at 14:00, a bolus and a handful of CGM readings.
#[must_use]
pub fn pump_day() -> Vec<Event> {
    vec![
        scheduled("sched-0000", "2014-03-01T00:00:00", 0.8),
        cbg("cbg-0300", "2014-03-01T03:00:00", 112),
        scheduled("sched-0600", "2014-03-01T06:00:00", 1.1),
        cbg("cbg-0700", "2014-03-01T07:00:00", 164),
        ev(json!({
            "_id": "bolus-0705",
            "type": "bolus",
            "subType": "normal",
            "deviceTime": "2014-03-01T07:05:00",
            "value": 4.5,
            "deviceId": "pump-0001"
        })),
        cbg("cbg-1200", "2014-03-01T12:00:00", 98),
        ev(json!({
            "_id": "temp-1400",
            "type": "temp-basal",
            "deliveryType": "temp",
            "deviceTime": "2014-03-01T14:00:00",
            "duration": 5_400_000,
            "percent": 50,
            "value": 0.55,
            "deviceId": "pump-0001"
        })),
        cbg("cbg-1800", "2014-03-01T18:00:00", 141),
        scheduled("sched-2200", "2014-03-01T22:00:00", 0.9),
        cbg("cbg-2300", "2014-03-01T23:00:00", 120),
    ]
}
