use basalt_core::{BasaltError, Event, EventStream, StreamHandle, normalize_stream};
use futures::StreamExt;
use tokio::io::AsyncWrite;
use tokio::sync::{mpsc, oneshot};

use super::wire::write_json_array;
use crate::Basalt;

impl Basalt {
    /// Open the normalized view of `target`'s device data on behalf of `subject`.
    ///
    /// Steps, each bounded by the configured open timeout:
    /// 1. ask access control whether `subject` may view `target`;
    /// 2. resolve the stream holding `target`'s uploads;
    /// 3. open that stream on the event source.
    ///
    /// The returned stream joins scheduled basal rate changes into segments
    /// and maps temp basals; it ends after its first error.
    ///
    /// # Errors
    /// Returns `Unauthorized` when access is denied, `NotFound` when `target`
    /// has no stream, `Timeout` when a step exceeds the deadline, or the
    /// collaborator's own error.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "basalt::service::view",
            skip(self),
            fields(source = self.source.name()),
        )
    )]
    pub async fn view(&self, subject: &str, target: &str) -> Result<EventStream, BasaltError> {
        let timeout = self.cfg.open_timeout;

        let allowed =
            Self::call_with_timeout("authorize", timeout, self.access.can_view(subject, target))
                .await?;
        if !allowed {
            return Err(BasaltError::unauthorized(subject, target));
        }

        let stream_id =
            Self::call_with_timeout("resolve", timeout, self.directory.stream_for(target))
                .await?
                .ok_or_else(|| BasaltError::not_found(format!("stream for {target}")))?;

        let events = Self::call_with_timeout("open", timeout, self.source.open(&stream_id)).await?;

        #[cfg(feature = "tracing")]
        tracing::debug!(stream = %stream_id, "view opened");

        Ok(normalize_stream(events).boxed())
    }

    /// Open a view and pump it into a bounded channel on a spawned task.
    ///
    /// Behavior and trade-offs:
    /// - The channel holds at most `channel_capacity` items; a slow consumer
    ///   back-pressures the read from storage.
    /// - The pump ends after forwarding the terminal error, at the end of the
    ///   view, when the receiver is dropped, or when the handle is stopped.
    /// - Dropping the `StreamHandle` stops the pump; items already queued stay
    ///   readable.
    ///
    /// # Errors
    /// Fails like [`view`](Self::view) if the view cannot be opened.
    pub async fn stream_view(
        &self,
        subject: &str,
        target: &str,
    ) -> Result<(StreamHandle, mpsc::Receiver<Result<Event, BasaltError>>), BasaltError> {
        let mut events = self.view(subject, target).await?;

        let (tx, rx) = mpsc::channel::<Result<Event, BasaltError>>(self.cfg.channel_capacity);
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();

        let join = tokio::spawn(async move {
            #[cfg(feature = "tracing")]
            let mut forwarded = 0usize;
            loop {
                tokio::select! {
                    biased;
                    _ = &mut stop_rx => break,
                    maybe_item = events.next() => {
                        let Some(item) = maybe_item else { break };
                        let last = item.is_err();
                        tokio::select! {
                            biased;
                            _ = &mut stop_rx => break,
                            res = tx.send(item) => {
                                // Receiver gone; nobody is listening.
                                if res.is_err() { break; }
                            }
                        }
                        #[cfg(feature = "tracing")]
                        {
                            forwarded += 1;
                        }
                        if last {
                            break;
                        }
                    }
                }
            }
            #[cfg(feature = "tracing")]
            tracing::debug!(forwarded, "view pump finished");
        });

        Ok((StreamHandle::new(join, stop_tx), rx))
    }

    /// Write the view as a JSON array to `out`, returning the element count.
    ///
    /// # Errors
    /// Fails like [`view`](Self::view) before anything is written. Once
    /// writing has started, a terminal error in the view or an I/O failure is
    /// returned with the array left unterminated.
    pub async fn write_view<W>(
        &self,
        subject: &str,
        target: &str,
        out: &mut W,
    ) -> Result<usize, BasaltError>
    where
        W: AsyncWrite + Unpin,
    {
        let events = self.view(subject, target).await?;
        write_json_array(events, out).await
    }
}
