use basalt_core::{BasaltError, Event, basal_builders, normalize, self_join};
use serde_json::{Value, json};

fn scheduled(id: &str, t: i64) -> Event {
    Event::from_value(json!({
        "_id": id,
        "type": "basal-rate-change",
        "deliveryType": "scheduled",
        "deviceTime": t,
        "scheduleName": "Standard",
        "value": 1.0
    }))
    .unwrap()
}

fn other(id: &str, t: i64) -> Event {
    Event::from_value(json!({"_id": id, "type": "smbg", "deviceTime": t, "value": 5.4})).unwrap()
}

fn ok(events: Vec<Event>) -> Vec<Result<Event, BasaltError>> {
    events.into_iter().map(Ok).collect()
}

fn join_all(events: Vec<Event>) -> Vec<Value> {
    self_join(ok(events), basal_builders())
        .map(|r| r.unwrap().into())
        .collect()
}

fn segment(id: &str, start: i64, end: i64) -> Value {
    json!({
        "_id": id,
        "type": "basal-rate-segment",
        "start": start,
        "end": end,
        "interval": format!("{start}/{end}"),
        "deliveryType": "scheduled",
        "scheduleName": "Standard",
        "value": 1.0
    })
}

fn sentinel(id: &str, start: i64) -> Value {
    json!({
        "_id": id,
        "type": "basal-rate-segment",
        "deliveryType": "scheduled",
        "scheduleName": "Standard",
        "value": 1.0,
        "start": start,
        "end": null,
        "interval": format!("{start}/{start}")
    })
}

#[test]
fn adjacent_pair_closes_segment_and_terminator_reopens() {
    let out = join_all(vec![scheduled("A", 1), scheduled("B", 2)]);
    assert_eq!(out, vec![segment("A", 1, 2), sentinel("B", 2)]);
}

#[test]
fn buffered_events_follow_the_segment_in_order() {
    let out = join_all(vec![
        scheduled("A", 1),
        other("X", 1),
        other("Y", 2),
        scheduled("B", 2),
    ]);
    assert_eq!(
        out,
        vec![
            segment("A", 1, 2),
            other("X", 1).into(),
            other("Y", 2).into(),
            sentinel("B", 2),
        ]
    );
}

#[test]
fn lone_start_flushes_as_open_segment() {
    let out = join_all(vec![scheduled("A", 1)]);
    assert_eq!(out, vec![sentinel("A", 1)]);
    assert_eq!(out[0]["interval"], json!("1/1"));
}

#[test]
fn chain_of_three_produces_two_segments() {
    let out = join_all(vec![scheduled("A", 1), scheduled("B", 2), scheduled("C", 3)]);
    assert_eq!(
        out,
        vec![segment("A", 1, 2), segment("B", 2, 3), sentinel("C", 3)]
    );
}

#[test]
fn events_before_first_scheduled_change_pass_through() {
    let out = join_all(vec![other("P", 0), scheduled("A", 1), scheduled("B", 2)]);
    assert_eq!(out[0], Value::from(other("P", 0)));
    assert_eq!(out[1], segment("A", 1, 2));
}

#[test]
fn buffer_after_unterminated_start_is_dropped() {
    let out = join_all(vec![scheduled("A", 1), other("X", 2), other("Y", 3)]);
    assert_eq!(out, vec![sentinel("A", 1)]);
}

#[test]
fn produced_segments_pass_through_unchanged() {
    let first = join_all(vec![scheduled("A", 1), scheduled("B", 2), scheduled("C", 3)]);
    let refed: Vec<Event> = first
        .iter()
        .cloned()
        .map(|v| Event::from_value(v).unwrap())
        .collect();
    let second = join_all(refed);
    assert_eq!(second, first);
}

#[test]
fn temp_basal_maps_without_joining() {
    let temp = Event::from_value(json!({
        "_id": "T",
        "type": "temp-basal",
        "deliveryType": "temp",
        "deviceTime": 5,
        "duration": 300_000,
        "value": 0.4
    }))
    .unwrap();
    let out: Vec<Value> = normalize(ok(vec![temp]))
        .map(|r| r.unwrap().into())
        .collect();
    assert_eq!(
        out,
        vec![json!({
            "_id": "T",
            "type": "basal-rate-segment",
            "start": 5,
            "end": 300_005,
            "interval": "5/300005",
            "deliveryType": "temp",
            "value": 0.4
        })]
    );
}

#[test]
fn temp_basal_inside_a_join_is_buffered_then_mapped() {
    let temp = Event::from_value(json!({
        "_id": "T",
        "type": "temp-basal",
        "deliveryType": "temp",
        "deviceTime": 5,
        "duration": 10,
        "value": 0.4
    }))
    .unwrap();
    let out: Vec<Value> = normalize(ok(vec![scheduled("A", 1), temp, scheduled("B", 20)]))
        .map(|r| r.unwrap().into())
        .collect();
    assert_eq!(out.len(), 3);
    assert_eq!(out[0], segment("A", 1, 20));
    assert_eq!(out[1]["deliveryType"], json!("temp"));
    assert_eq!(out[1]["end"], json!(15));
    assert_eq!(out[2], sentinel("B", 20));
}

#[test]
fn upstream_error_terminates_after_emitted_events() {
    let input = vec![
        Ok(other("P", 0)),
        Err(BasaltError::upstream("cursor died")),
        Ok(other("Q", 1)),
    ];
    let out: Vec<_> = normalize(input).collect();
    assert_eq!(out.len(), 2);
    assert!(out[0].is_ok());
    assert_eq!(out[1], Err(BasaltError::Upstream("cursor died".into())));
}

#[test]
fn upstream_error_drops_active_join_without_flush() {
    let input = vec![Ok(scheduled("A", 1)), Err(BasaltError::upstream("gone"))];
    let out: Vec<_> = normalize(input).collect();
    assert_eq!(out, vec![Err(BasaltError::Upstream("gone".into()))]);
}

#[test]
fn malformed_temp_basal_terminates_stream() {
    let bad = Event::from_value(json!({"_id": "T", "deliveryType": "temp", "deviceTime": 5})).unwrap();
    let out: Vec<_> = normalize(ok(vec![other("P", 0), bad, other("Q", 9)])).collect();
    assert_eq!(out.len(), 2);
    assert!(matches!(out[1], Err(BasaltError::MalformedEvent { .. })));
}

#[test]
fn string_timestamps_render_verbatim() {
    let a = scheduled("A", 0).with("deviceTime", "2014-03-01T00:00:00");
    let b = scheduled("B", 0).with("deviceTime", "2014-03-01T08:00:00");
    let out = join_all(vec![a, b]);
    assert_eq!(out[0]["interval"], json!("2014-03-01T00:00:00/2014-03-01T08:00:00"));
}

#[test]
fn closing_change_without_device_time_terminates_stream() {
    let mut bad = scheduled("B", 0);
    bad.remove("deviceTime");
    let input = ok(vec![other("P", 0), scheduled("A", 1), other("X", 1), bad, other("Q", 3)]);
    let out: Vec<_> = normalize(input).collect();
    assert_eq!(out.len(), 2);
    assert_eq!(out[0].as_ref().map(Event::id_label), Ok("P".to_string()));
    assert!(matches!(
        out[1],
        Err(BasaltError::MalformedEvent { ref id, ref field, .. }) if id == "B" && field == "deviceTime"
    ));
}

fn keyed_by_plain_id(mut event: Event) -> Event {
    if let Some(id) = event.remove("_id") {
        event.insert("id", id);
    }
    event
}

fn rekey(mut v: Value) -> Value {
    if let Some(id) = v.as_object_mut().and_then(|m| m.remove("_id")) {
        v["id"] = id;
    }
    v
}

#[test]
fn plain_id_is_carried_to_closed_and_open_segments() {
    let out = join_all(vec![
        keyed_by_plain_id(scheduled("A", 1)),
        keyed_by_plain_id(scheduled("B", 2)),
    ]);
    assert_eq!(out, vec![rekey(segment("A", 1, 2)), rekey(sentinel("B", 2))]);
    assert!(out.iter().all(|v| v.get("_id").is_none()));
}

#[test]
fn plain_id_is_carried_to_temp_segments() {
    let temp = Event::from_value(json!({
        "id": "T",
        "type": "temp-basal",
        "deliveryType": "temp",
        "deviceTime": 5,
        "duration": 300_000,
        "value": 0.5
    }))
    .unwrap();
    let out: Vec<Value> = normalize(ok(vec![temp])).map(|r| r.unwrap().into()).collect();
    assert_eq!(
        out,
        vec![json!({
            "id": "T",
            "type": "basal-rate-segment",
            "start": 5,
            "end": 300_005,
            "interval": "5/300005",
            "deliveryType": "temp",
            "value": 0.5
        })]
    );
}
