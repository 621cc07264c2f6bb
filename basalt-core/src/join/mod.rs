//! A self-join is a join done on a single ordered stream of events.
//!
//! While no join is in progress, every event is offered to the registered
//! [`HandlerBuilder`]s in order. The first builder that recognizes the event
//! returns a [`JoinHandler`], which from then on receives *every* event until
//! it hands back a batch. The batch replaces the consumed events in the output
//! and is re-fed through the operator, so the event that closed one join can
//! open the next. At end of input a still-active handler is flushed through
//! [`JoinHandler::completed`].
//!
//! Modules include:
//! - `handler`: the builder/handler traits
//! - `fold`: the push-style fold holding the single active handler slot
//! - `adapter`: pull-style `Iterator` and `Stream` adapters over the fold

/// Pull-style adapters over [`JoinFold`].
pub mod adapter;
/// The fold holding the active handler slot and re-feed worklist.
pub mod fold;
/// Builder and handler traits.
pub mod handler;

pub use adapter::{SelfJoin, SelfJoinStream};
pub use fold::JoinFold;
pub use handler::{HandlerBuilder, JoinHandler};

/// Self-join an iterator of events with the given builders.
///
/// Convenience for [`SelfJoin::new`].
pub fn self_join<I>(input: I, builders: Vec<Box<dyn HandlerBuilder>>) -> SelfJoin<I::IntoIter>
where
    I: IntoIterator<Item = Result<basalt_types::Event, basalt_types::BasaltError>>,
{
    SelfJoin::new(input.into_iter(), builders)
}
