//! Basalt serves authorized, normalized views of uploaded insulin pump data.
//!
//! Overview
//! - Asks an access-control collaborator whether the requesting subject may
//!   view the target's data, resolves the stream holding the target's
//!   uploads, and opens it on the storage collaborator.
//! - Normalizes the ordered event stream: consecutive scheduled basal rate
//!   changes are joined into rate segments with a start, an end and an
//!   interval; temp basals become segments ending `duration` later; every
//!   other event passes through in order.
//! - Serves the result as a `Stream`, as a bounded channel fed by a spawned
//!   pump, or written incrementally as a JSON array.
//!
//! Key behaviors and trade-offs
//! - Fail-fast: the first error (from storage, a handler, or a malformed
//!   event) is the last item of a view. Nothing is retried or repaired.
//! - Events buffered after the last scheduled rate change are dropped when
//!   the stream ends; the last change is emitted as an open segment with a
//!   `null` end.
//! - Collaborator calls made while opening a view are bounded by
//!   `open_timeout`; reading the opened stream is not.
//!
//! Example
//! ```rust,ignore
//! use std::sync::Arc;
//! use basalt::Basalt;
//! use basalt_mock::{MockAccess, MockDirectory, MockStore, PUMP_DAY_STREAM};
//!
//! let basalt = Basalt::builder()
//!     .with_source(Arc::new(MockStore::with_fixtures()))
//!     .with_directory(Arc::new(MockDirectory::new().with("alice", PUMP_DAY_STREAM)))
//!     .with_access(Arc::new(MockAccess::new()))
//!     .build()?;
//!
//! let mut out = Vec::new();
//! let n = basalt.write_view("alice", "alice", &mut out).await?;
//! ```
//!
//! See `basalt/examples/` for runnable end-to-end demonstrations.
#![warn(missing_docs)]

pub(crate) mod core;
mod service;

pub use crate::core::{Basalt, BasaltBuilder};
pub use service::wire::write_json_array;

// Re-export core types for convenience
pub use basalt_core::{
    AccessControl, BasaltConfig, BasaltError, DeliveryType, Event, EventSource, EventStream, IdKey,
    HandlerBuilder, JoinHandler, Protocol, Segment, ServiceDescriptor, StreamDirectory,
    StreamHandle, StreamId, fields, normalize, normalize_stream, self_join, tags,
};
