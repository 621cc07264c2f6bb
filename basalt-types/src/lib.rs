//! Basalt-specific data transfer objects and configuration primitives.
#![warn(missing_docs)]

mod config;
mod error;
mod event;
mod segment;
mod stream_id;

pub use config::{BasaltConfig, Protocol, ServiceDescriptor};
pub use error::BasaltError;
pub use event::{DeliveryType, Event, IdKey, fields, tags};
pub use segment::Segment;
pub use stream_id::StreamId;
