use std::collections::VecDeque;

use basalt_types::{BasaltError, Event};

use super::handler::{HandlerBuilder, JoinHandler};

/// Push-style self-join fold.
///
/// Holds the single active handler slot and the re-feed worklist. Output is
/// appended to a caller-provided queue so the pull adapters can hand events
/// out one at a time.
pub struct JoinFold {
    builders: Vec<Box<dyn HandlerBuilder>>,
    active: Option<Box<dyn JoinHandler>>,
    worklist: VecDeque<Event>,
}

impl JoinFold {
    /// Create a fold over the given builders, tried in order.
    #[must_use]
    pub fn new(builders: Vec<Box<dyn HandlerBuilder>>) -> Self {
        Self {
            builders,
            active: None,
            worklist: VecDeque::new(),
        }
    }

    /// Whether a join is currently in progress.
    #[must_use]
    pub fn is_joining(&self) -> bool {
        self.active.is_some()
    }

    /// Process one input event, appending whatever becomes emittable to `out`.
    ///
    /// Batches returned by handlers are re-fed before this call returns; a
    /// batch produced while re-feeding is processed ahead of the rest of the
    /// batch that contained its trigger.
    ///
    /// # Errors
    /// Propagates the first builder or handler failure. Events appended to
    /// `out` before the failure stay there; the fold is reset.
    pub fn push(&mut self, event: Event, out: &mut VecDeque<Event>) -> Result<(), BasaltError> {
        self.worklist.push_back(event);
        while let Some(next) = self.worklist.pop_front() {
            if let Err(err) = self.step(next, out) {
                #[cfg(feature = "tracing")]
                tracing::warn!(error = %err, "self-join terminated by handler failure");
                self.reset();
                return Err(err);
            }
        }
        Ok(())
    }

    /// Signal end of input: flush a still-active handler into `out`.
    ///
    /// A handler already cleared is not flushed again; calling `finish` twice
    /// is a no-op the second time.
    ///
    /// # Errors
    /// Propagates a failure from [`JoinHandler::completed`].
    pub fn finish(&mut self, out: &mut VecDeque<Event>) -> Result<(), BasaltError> {
        if let Some(handler) = self.active.take() {
            #[cfg(feature = "tracing")]
            tracing::debug!(handler = handler.name(), "flushing join still open at end of input");
            out.extend(handler.completed()?);
        }
        Ok(())
    }

    /// Drop the active handler and any pending re-feed work.
    pub fn reset(&mut self) {
        self.active = None;
        self.worklist.clear();
    }

    fn step(&mut self, event: Event, out: &mut VecDeque<Event>) -> Result<(), BasaltError> {
        if self.active.is_none() {
            for builder in &self.builders {
                if let Some(handler) = builder.build(&event)? {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(handler = handler.name(), id = %event.id_label(), "join opened");
                    self.active = Some(handler);
                    break;
                }
            }
        }

        let Some(handler) = self.active.as_mut() else {
            out.push_back(event);
            return Ok(());
        };

        if let Some(batch) = handler.handle(event)? {
            #[cfg(feature = "tracing")]
            tracing::debug!(handler = handler.name(), batch = batch.len(), "join closed");
            self.active = None;
            for e in batch.into_iter().rev() {
                self.worklist.push_front(e);
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for JoinFold {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JoinFold")
            .field("builders", &self.builders.len())
            .field("active", &self.active.as_ref().map(|h| h.name()))
            .field("pending", &self.worklist.len())
            .finish()
    }
}
