use basalt_types::{BasaltError, Event};

/// A join in progress.
///
/// A handler receives every event while it is active, including the one that
/// caused a builder to create it. Implementations must not block.
pub trait JoinHandler: Send {
    /// Name used in logs and error messages.
    fn name(&self) -> &'static str {
        "join-handler"
    }

    /// Consume one event.
    ///
    /// Returns `Ok(None)` while the join is still collecting. Returning
    /// `Ok(Some(batch))` ends the join: the handler is dropped and the batch is
    /// re-fed, in order, through the operator.
    ///
    /// # Errors
    /// Any error terminates the output sequence.
    fn handle(&mut self, event: Event) -> Result<Option<Vec<Event>>, BasaltError>;

    /// Flush a join that was still in progress when the input ended.
    ///
    /// The returned events are emitted as-is, without being re-fed.
    ///
    /// # Errors
    /// Any error terminates the output sequence.
    fn completed(self: Box<Self>) -> Result<Vec<Event>, BasaltError>;
}

/// Recognizer that decides whether an event opens a new join.
///
/// Builders are consulted only while no handler is active, in registration order.
pub trait HandlerBuilder: Send + Sync {
    /// Return a fresh handler if `event` opens a join.
    ///
    /// # Errors
    /// Any error terminates the output sequence.
    fn build(&self, event: &Event) -> Result<Option<Box<dyn JoinHandler>>, BasaltError>;
}

impl<F> HandlerBuilder for F
where
    F: Fn(&Event) -> Result<Option<Box<dyn JoinHandler>>, BasaltError> + Send + Sync,
{
    fn build(&self, event: &Event) -> Result<Option<Box<dyn JoinHandler>>, BasaltError> {
        self(event)
    }
}
