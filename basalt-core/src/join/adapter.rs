use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};

use basalt_types::{BasaltError, Event};
use futures::{Stream, StreamExt};

use super::fold::JoinFold;
use super::handler::HandlerBuilder;

/// State shared by the iterator and stream adapters: the fold plus the queue
/// of events ready to hand out and the terminal error, if any.
struct Drain {
    fold: JoinFold,
    ready: VecDeque<Event>,
    failed: Option<BasaltError>,
    done: bool,
}

impl Drain {
    fn new(builders: Vec<Box<dyn HandlerBuilder>>) -> Self {
        Self {
            fold: JoinFold::new(builders),
            ready: VecDeque::new(),
            failed: None,
            done: false,
        }
    }

    /// `Some(item)` when there is something to yield (`Some(None)` is the end),
    /// `None` when more input is needed.
    fn pop(&mut self) -> Option<Option<Result<Event, BasaltError>>> {
        if let Some(e) = self.ready.pop_front() {
            return Some(Some(Ok(e)));
        }
        if let Some(err) = self.failed.take() {
            return Some(Some(Err(err)));
        }
        if self.done {
            return Some(None);
        }
        None
    }

    fn accept(&mut self, item: Option<Result<Event, BasaltError>>) {
        let res = match item {
            Some(Ok(event)) => self.fold.push(event, &mut self.ready),
            Some(Err(err)) => {
                self.fold.reset();
                Err(err)
            }
            None => {
                self.done = true;
                self.fold.finish(&mut self.ready)
            }
        };
        if let Err(err) = res {
            self.done = true;
            self.failed = Some(err);
        }
    }
}

/// Blocking self-join over an iterator of events.
///
/// Lazily pulls input only when the output queue is empty. After the terminal
/// error or the end of input it keeps returning `None`. Dropping it drops the
/// active handler without flushing.
pub struct SelfJoin<I> {
    input: I,
    drain: Drain,
}

impl<I> SelfJoin<I>
where
    I: Iterator<Item = Result<Event, BasaltError>>,
{
    /// Wrap `input`, consulting `builders` in order.
    pub fn new(input: I, builders: Vec<Box<dyn HandlerBuilder>>) -> Self {
        Self {
            input,
            drain: Drain::new(builders),
        }
    }

    /// Whether a join is currently in progress.
    #[must_use]
    pub fn is_joining(&self) -> bool {
        self.drain.fold.is_joining()
    }
}

impl<I> Iterator for SelfJoin<I>
where
    I: Iterator<Item = Result<Event, BasaltError>>,
{
    type Item = Result<Event, BasaltError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(out) = self.drain.pop() {
                return out;
            }
            let item = self.input.next();
            self.drain.accept(item);
        }
    }
}

impl<I> std::iter::FusedIterator for SelfJoin<I> where
    I: Iterator<Item = Result<Event, BasaltError>>
{
}

/// Async self-join over a stream of events.
///
/// Same semantics as [`SelfJoin`]; builders and handlers still run
/// synchronously inside `poll_next`.
pub struct SelfJoinStream<S> {
    input: S,
    drain: Drain,
}

impl<S> SelfJoinStream<S>
where
    S: Stream<Item = Result<Event, BasaltError>> + Unpin,
{
    /// Wrap `input`, consulting `builders` in order.
    pub fn new(input: S, builders: Vec<Box<dyn HandlerBuilder>>) -> Self {
        Self {
            input,
            drain: Drain::new(builders),
        }
    }
}

impl<S> Stream for SelfJoinStream<S>
where
    S: Stream<Item = Result<Event, BasaltError>> + Unpin,
{
    type Item = Result<Event, BasaltError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            if let Some(out) = this.drain.pop() {
                return Poll::Ready(out);
            }
            match this.input.poll_next_unpin(cx) {
                Poll::Ready(item) => this.drain.accept(item),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
