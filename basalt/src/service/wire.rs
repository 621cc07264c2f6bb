use basalt_core::{BasaltError, Event};
use futures::{Stream, StreamExt};
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Serialize `events` as a JSON array, one element at a time.
///
/// Writes `[` before the first element, `,\n` between elements and `\n]\n`
/// after the last; an empty sequence produces `[]\n`. Returns the number of
/// elements written.
///
/// # Errors
/// Stops at the first `Err` item and returns it, leaving the array
/// unterminated. Serialization and I/O failures are returned as well.
pub async fn write_json_array<S, W>(mut events: S, out: &mut W) -> Result<usize, BasaltError>
where
    S: Stream<Item = Result<Event, BasaltError>> + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut count = 0usize;
    while let Some(item) = events.next().await {
        let event = match item {
            Ok(event) => event,
            Err(err) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(written = count, error = %err, "view failed mid-stream");
                // Whatever was written stays visible to the reader.
                let _ = out.flush().await;
                return Err(err);
            }
        };
        let body = serde_json::to_vec(&event)?;
        let sep: &[u8] = if count == 0 { b"[" } else { b",\n" };
        out.write_all(sep).await?;
        out.write_all(&body).await?;
        count += 1;
    }

    let close: &[u8] = if count == 0 { b"[]\n" } else { b"\n]\n" };
    out.write_all(close).await?;
    out.flush().await?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use serde_json::json;

    fn ev(id: u32) -> Event {
        Event::from_value(json!({"_id": id, "type": "cbg"})).unwrap()
    }

    #[tokio::test]
    async fn empty_sequence_is_an_empty_array() {
        let mut out = Vec::new();
        let n = write_json_array(stream::iter(Vec::<Result<Event, BasaltError>>::new()), &mut out)
            .await
            .unwrap();
        assert_eq!(n, 0);
        assert_eq!(out, b"[]\n");
    }

    #[tokio::test]
    async fn elements_are_separated_and_terminated() {
        let mut out = Vec::new();
        let n = write_json_array(stream::iter(vec![Ok(ev(1)), Ok(ev(2))]), &mut out)
            .await
            .unwrap();
        assert_eq!(n, 2);
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "[{\"_id\":1,\"type\":\"cbg\"},\n{\"_id\":2,\"type\":\"cbg\"}\n]\n"
        );
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.as_array().map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn error_leaves_array_open() {
        let mut out = Vec::new();
        let err = write_json_array(
            stream::iter(vec![Ok(ev(1)), Err(BasaltError::upstream("lost")), Ok(ev(2))]),
            &mut out,
        )
        .await
        .unwrap_err();
        assert_eq!(err, BasaltError::Upstream("lost".into()));
        assert_eq!(out, b"[{\"_id\":1,\"type\":\"cbg\"}");
    }
}
