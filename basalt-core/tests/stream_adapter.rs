use basalt_core::{BasaltError, Event, SelfJoinStream, basal_builders, normalize, normalize_stream};
use futures::{StreamExt, stream};
use serde_json::json;
use tokio_test::{assert_pending, assert_ready, task};

fn scheduled(id: &str, t: i64) -> Event {
    Event::from_value(json!({
        "_id": id,
        "type": "basal-rate-change",
        "deliveryType": "scheduled",
        "deviceTime": t,
        "value": 0.9
    }))
    .unwrap()
}

fn reading(id: &str, t: i64) -> Event {
    Event::from_value(json!({"_id": id, "type": "cbg", "deviceTime": t, "value": 120})).unwrap()
}

fn temp(id: &str, t: i64, duration: i64) -> Event {
    Event::from_value(json!({
        "_id": id,
        "type": "temp-basal",
        "deliveryType": "temp",
        "deviceTime": t,
        "duration": duration,
        "value": 0.3
    }))
    .unwrap()
}

fn sample() -> Vec<Result<Event, BasaltError>> {
    vec![
        Ok(reading("r0", 0)),
        Ok(scheduled("a", 10)),
        Ok(reading("r1", 11)),
        Ok(temp("t1", 12, 100)),
        Ok(scheduled("b", 20)),
        Ok(reading("r2", 21)),
        Ok(scheduled("c", 30)),
    ]
}

#[tokio::test]
async fn stream_matches_iterator() {
    let blocking: Vec<_> = normalize(sample()).collect();
    let streamed: Vec<_> = normalize_stream(stream::iter(sample())).collect().await;
    assert_eq!(streamed, blocking);
    assert_eq!(streamed.len(), 7);
}

#[tokio::test]
async fn stream_stops_after_error() {
    let input = vec![
        Ok(reading("r0", 0)),
        Err(BasaltError::upstream("connection reset")),
        Ok(reading("r1", 1)),
    ];
    let out: Vec<_> = normalize_stream(stream::iter(input)).collect().await;
    assert_eq!(out.len(), 2);
    assert_eq!(out[1], Err(BasaltError::Upstream("connection reset".into())));
}

#[test]
fn pending_upstream_yields_pending_without_losing_state() {
    let (tx, rx) = futures::channel::mpsc::unbounded::<Result<Event, BasaltError>>();
    let mut joined = task::spawn(SelfJoinStream::new(rx, basal_builders()));

    assert_pending!(joined.poll_next());

    tx.unbounded_send(Ok(scheduled("a", 1))).unwrap();
    tx.unbounded_send(Ok(reading("r", 2))).unwrap();
    // Both events are absorbed by the active join.
    assert_pending!(joined.poll_next());

    tx.unbounded_send(Ok(scheduled("b", 3))).unwrap();
    let first = assert_ready!(joined.poll_next()).unwrap().unwrap();
    assert!(first.is_segment());
    assert_eq!(first.get("interval"), Some(&json!("1/3")));

    let second = assert_ready!(joined.poll_next()).unwrap().unwrap();
    assert_eq!(second.id_label(), "r");
    // "b" reopened a join and is held until more input or the end.
    assert_pending!(joined.poll_next());

    drop(tx);
    let sentinel = assert_ready!(joined.poll_next()).unwrap().unwrap();
    assert_eq!(sentinel.id_label(), "b");
    assert_eq!(sentinel.get("end"), Some(&serde_json::Value::Null));
    assert!(assert_ready!(joined.poll_next()).is_none());
    assert!(assert_ready!(joined.poll_next()).is_none());
}
