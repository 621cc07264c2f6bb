use basalt_types::{BasaltError, Event};
use futures::{Stream, StreamExt, future};

use super::join::basal_builders;
use super::temp::map_temp_basal;
use crate::join::{SelfJoin, SelfJoinStream};

/// Normalized basal view over an iterator of events.
///
/// Yields the first error once and then ends.
pub struct Normalize<I> {
    inner: SelfJoin<I>,
    failed: bool,
}

impl<I> Iterator for Normalize<I>
where
    I: Iterator<Item = Result<Event, BasaltError>>,
{
    type Item = Result<Event, BasaltError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let item = self.inner.next()?.and_then(map_temp_basal);
        self.failed = item.is_err();
        Some(item)
    }
}

impl<I> std::iter::FusedIterator for Normalize<I> where
    I: Iterator<Item = Result<Event, BasaltError>>
{
}

/// Join scheduled basal rate changes into segments and map temp basals.
pub fn normalize<I>(input: I) -> Normalize<I::IntoIter>
where
    I: IntoIterator<Item = Result<Event, BasaltError>>,
{
    Normalize {
        inner: SelfJoin::new(input.into_iter(), basal_builders()),
        failed: false,
    }
}

/// Async counterpart of [`normalize`].
pub fn normalize_stream<S>(input: S) -> impl Stream<Item = Result<Event, BasaltError>> + Send
where
    S: Stream<Item = Result<Event, BasaltError>> + Unpin + Send,
{
    SelfJoinStream::new(input, basal_builders()).scan(false, |failed, item| {
        if *failed {
            return future::ready(None);
        }
        let item = item.and_then(map_temp_basal);
        *failed = item.is_err();
        future::ready(Some(item))
    })
}
