use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::{StreamExt, stream};
use tokio::sync::{Mutex, mpsc};

use basalt_core::{BasaltError, Event, EventSource, EventStream, StreamId};

/// Instruction for how `open` should behave for a given stream.
#[derive(Debug, Clone)]
pub enum OpenBehavior {
    /// Serve these events and end.
    Serve(Vec<Event>),
    /// Serve these events, then yield the error as the last item.
    FailAfter(Vec<Event>, BasaltError),
    /// Fail the `open` call itself.
    Fail(BasaltError),
    /// Never return from `open` (simulate a stalled query).
    Hang,
    /// Serve whatever the controller pushes until it closes the stream.
    Manual,
}

#[derive(Default)]
struct InternalState {
    rules: HashMap<StreamId, OpenBehavior>,
    opened: HashMap<StreamId, usize>,
    manual_tx: HashMap<StreamId, mpsc::Sender<Result<Event, BasaltError>>>,
}

/// Controller handle used by tests to drive the dynamic source from the outside.
pub struct DynamicMockController {
    state: Arc<Mutex<InternalState>>,
}

impl DynamicMockController {
    /// Set the behavior of `open` for `stream`.
    pub async fn set_open_behavior(&self, stream: impl Into<StreamId>, behavior: OpenBehavior) {
        let mut guard = self.state.lock().await;
        guard.rules.insert(stream.into(), behavior);
    }

    /// Push one item into an open Manual stream.
    ///
    /// Returns `true` if the item was queued, `false` if no Manual stream is
    /// open for `stream` or its reader is gone.
    pub async fn push(&self, stream: &StreamId, item: Result<Event, BasaltError>) -> bool {
        // Clone the sender so the lock is not held across the send.
        let tx = {
            let guard = self.state.lock().await;
            guard.manual_tx.get(stream).cloned()
        };
        match tx {
            Some(tx) => tx.send(item).await.is_ok(),
            None => false,
        }
    }

    /// End an open Manual stream.
    pub async fn close(&self, stream: &StreamId) {
        let mut guard = self.state.lock().await;
        guard.manual_tx.remove(stream);
    }

    /// How many times `open` was called for `stream`.
    pub async fn open_count(&self, stream: &StreamId) -> usize {
        let guard = self.state.lock().await;
        guard.opened.get(stream).copied().unwrap_or_default()
    }

    /// Clear all configured behaviors, request counts and Manual streams.
    pub async fn clear_all_behaviors(&self) {
        let mut guard = self.state.lock().await;
        guard.rules.clear();
        guard.opened.clear();
        guard.manual_tx.clear();
    }
}

/// An event source that defers all behavior to an external controller.
pub struct DynamicMockSource {
    name: &'static str,
    state: Arc<Mutex<InternalState>>,
}

impl DynamicMockSource {
    /// Create a new dynamic source and its controller.
    #[must_use]
    pub fn new_with_controller(
        name: &'static str,
    ) -> (Arc<dyn EventSource>, DynamicMockController) {
        let state = Arc::new(Mutex::new(InternalState::default()));
        let controller = DynamicMockController {
            state: Arc::clone(&state),
        };
        let me = Arc::new(Self { name, state });
        (me as Arc<dyn EventSource>, controller)
    }
}

#[async_trait]
impl EventSource for DynamicMockSource {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn open(&self, stream_id: &StreamId) -> Result<EventStream, BasaltError> {
        let behavior = {
            let mut guard = self.state.lock().await;
            *guard.opened.entry(stream_id.clone()).or_default() += 1;
            guard.rules.get(stream_id).cloned()
        };

        match behavior {
            Some(OpenBehavior::Serve(events)) => Ok(stream::iter(events.into_iter().map(Ok)).boxed()),
            Some(OpenBehavior::FailAfter(events, err)) => Ok(stream::iter(
                events.into_iter().map(Ok).chain(std::iter::once(Err(err))),
            )
            .boxed()),
            Some(OpenBehavior::Fail(err)) => Err(err),
            Some(OpenBehavior::Hang) => {
                std::future::pending::<()>().await;
                unreachable!()
            }
            Some(OpenBehavior::Manual) => {
                let (tx, rx) = mpsc::channel::<Result<Event, BasaltError>>(64);
                {
                    let mut guard = self.state.lock().await;
                    guard.manual_tx.insert(stream_id.clone(), tx);
                }
                Ok(stream::unfold(rx, |mut rx| async move {
                    rx.recv().await.map(|item| (item, rx))
                })
                .boxed())
            }
            None => Err(BasaltError::not_found(format!("stream {stream_id}"))),
        }
    }
}
