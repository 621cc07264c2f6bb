//! In-memory collaborators for the basalt service.
//!
//! - [`MockStore`]: an [`EventSource`] serving fixed per-stream event lists.
//! - [`MockDirectory`]: a [`StreamDirectory`] backed by a map.
//! - [`MockAccess`]: an [`AccessControl`] with explicit grants.
//! - [`DynamicMockSource`]: an [`EventSource`] driven at runtime by a
//!   [`DynamicMockController`], for failure injection and live streams.
use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use basalt_core::{
    AccessControl, BasaltError, Event, EventSource, EventStream, StreamDirectory, StreamId,
};
use futures::{StreamExt, stream};

mod dynamic;
mod fixtures;

pub use dynamic::{DynamicMockController, DynamicMockSource, OpenBehavior};
pub use fixtures::pump_day;

/// Stream id of the [`pump_day`] fixture in [`MockStore::with_fixtures`].
pub const PUMP_DAY_STREAM: &str = "upload-pump-day";

/// Mock storage serving deterministic event lists.
///
/// Two stream ids are reserved for failure injection: `FAIL` fails on open,
/// and `BROKEN` yields one event and then an upstream error.
#[derive(Debug, Default, Clone)]
pub struct MockStore {
    streams: HashMap<StreamId, Vec<Event>>,
}

impl MockStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding the [`pump_day`] fixture under [`PUMP_DAY_STREAM`].
    #[must_use]
    pub fn with_fixtures() -> Self {
        Self::new().with_stream(PUMP_DAY_STREAM, pump_day())
    }

    /// Register `events` under `stream`. Events are served in the given order.
    #[must_use]
    pub fn with_stream(mut self, stream: impl Into<StreamId>, events: Vec<Event>) -> Self {
        self.streams.insert(stream.into(), events);
        self
    }

    fn maybe_fail(stream: &StreamId) -> Result<Option<EventStream>, BasaltError> {
        match stream.as_str() {
            "FAIL" => Err(BasaltError::Other(format!(
                "basalt-mock: forced failure opening {stream}"
            ))),
            "BROKEN" => {
                let first = Event::new()
                    .with("_id", "broken-0")
                    .with("type", "cbg")
                    .with("deviceTime", "2014-03-01T00:00:00");
                let items = vec![
                    Ok(first),
                    Err(BasaltError::upstream("basalt-mock: cursor lost")),
                ];
                Ok(Some(stream::iter(items).boxed()))
            }
            _ => Ok(None),
        }
    }
}

#[async_trait]
impl EventSource for MockStore {
    fn name(&self) -> &'static str {
        "basalt-mock"
    }

    async fn open(&self, stream: &StreamId) -> Result<EventStream, BasaltError> {
        if let Some(forced) = Self::maybe_fail(stream)? {
            return Ok(forced);
        }
        let events = self.streams.get(stream).cloned().unwrap_or_default();
        Ok(stream::iter(events.into_iter().map(Ok)).boxed())
    }
}

/// Mock directory mapping subjects to their upload stream.
#[derive(Debug, Default, Clone)]
pub struct MockDirectory {
    streams: HashMap<String, StreamId>,
}

impl MockDirectory {
    /// An empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `target` to `stream`.
    #[must_use]
    pub fn with(mut self, target: impl Into<String>, stream: impl Into<StreamId>) -> Self {
        self.streams.insert(target.into(), stream.into());
        self
    }
}

#[async_trait]
impl StreamDirectory for MockDirectory {
    async fn stream_for(&self, target: &str) -> Result<Option<StreamId>, BasaltError> {
        Ok(self.streams.get(target).cloned())
    }
}

/// Mock access control. A subject may always view its own data; anything
/// else needs an explicit grant.
#[derive(Debug, Default, Clone)]
pub struct MockAccess {
    grants: HashSet<(String, String)>,
    allow_all: bool,
}

impl MockAccess {
    /// Only self-access is allowed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every pair is allowed.
    #[must_use]
    pub fn allow_all() -> Self {
        Self {
            allow_all: true,
            ..Self::default()
        }
    }

    /// Allow `subject` to view `target`.
    #[must_use]
    pub fn grant(mut self, subject: impl Into<String>, target: impl Into<String>) -> Self {
        self.grants.insert((subject.into(), target.into()));
        self
    }
}

#[async_trait]
impl AccessControl for MockAccess {
    async fn can_view(&self, subject: &str, target: &str) -> Result<bool, BasaltError> {
        Ok(self.allow_all
            || subject == target
            || self
                .grants
                .contains(&(subject.to_string(), target.to_string())))
    }
}
