//! Collaborator traits.
//!
//! The normalizer only needs an ordered event stream; finding and guarding
//! that stream is delegated to external services, modelled here as
//! object-safe async traits so implementations can be swapped in tests.

use async_trait::async_trait;
use futures::stream::BoxStream;

use basalt_types::{BasaltError, Event, StreamId};

/// Ordered stream of device events as returned by an [`EventSource`].
pub type EventStream = BoxStream<'static, Result<Event, BasaltError>>;

/// Storage collaborator.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// A stable identifier for logs (e.g. "mongo-device-data").
    fn name(&self) -> &'static str;

    /// Open the events of `stream`, sorted ascending by `deviceTime`.
    ///
    /// Errors while opening are returned directly; errors while reading are
    /// yielded as the terminal item of the stream.
    async fn open(&self, stream: &StreamId) -> Result<EventStream, BasaltError>;
}

/// Resolves which stream holds a subject's uploads.
#[async_trait]
pub trait StreamDirectory: Send + Sync {
    /// Look up the upload stream of `target`; `Ok(None)` if it has none.
    async fn stream_for(&self, target: &str) -> Result<Option<StreamId>, BasaltError>;
}

/// Authorization collaborator.
#[async_trait]
pub trait AccessControl: Send + Sync {
    /// Whether `subject` may view the data of `target`.
    async fn can_view(&self, subject: &str, target: &str) -> Result<bool, BasaltError>;
}
