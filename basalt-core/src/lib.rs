//! basalt-core
//!
//! Core types, traits, and utilities shared across the basalt ecosystem.
//!
//! - `join`: the generic self-join operator (builders, handlers, the fold and
//!   its iterator/stream adapters).
//! - `basal`: the basal-delivery specialization (scheduled rate-change join,
//!   temp basal mapping, and the composed normalizer).
//! - `time`: device timestamp rendering and arithmetic.
//! - `source`: async traits for the storage, directory and access collaborators.
//!
//! Async runtime (Tokio)
//! ---------------------
//! The join operator itself is runtime-agnostic: it is a synchronous fold with
//! an `Iterator` adapter and a `futures::Stream` adapter. `stream::StreamHandle`
//! wraps `tokio::task::JoinHandle<()>` and uses `tokio::sync::oneshot::Sender<()>`
//! for cooperative shutdown, so code that pumps normalized streams into
//! channels must run under a Tokio 1.x runtime.
#![warn(missing_docs)]

/// Basal-delivery recognizers and the composed normalizer.
pub mod basal;
/// Generic self-join operator.
pub mod join;
/// Collaborator traits: event source, stream directory, access control.
pub mod source;
/// Stream handle utilities for spawned pump tasks.
pub mod stream;
/// Device timestamp rendering and arithmetic.
pub mod time;

pub use basal::{
    BasalBuilder, BasalJoinHandler, Normalize, basal_builders, is_scheduled_basal,
    map_temp_basal, normalize, normalize_stream,
};
pub use join::{HandlerBuilder, JoinFold, JoinHandler, SelfJoin, SelfJoinStream, self_join};
pub use source::{AccessControl, EventSource, EventStream, StreamDirectory};
pub use stream::StreamHandle;

pub use basalt_types::{
    BasaltConfig, BasaltError, DeliveryType, Event, IdKey, Protocol, Segment, ServiceDescriptor,
    StreamId, fields, tags,
};
