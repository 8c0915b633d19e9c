// ============================================================================
// spark-observables - ChangeStream
// Pull endpoint over a sink: events queue up until the holder reads them
// ============================================================================

use std::collections::VecDeque;

use crate::core::shared::{with_mut, Shared};

use super::sink::Subscription;

/// An attached, buffering subscriber.
///
/// Events queue in publish order from the moment the stream is opened
/// (after any snapshot it was seeded with). Reading never blocks: when the
/// queue is empty, [`try_next`](Self::try_next) returns `None` and later
/// publishes fill it again, so an empty queue is never end of stream.
/// For that reason the stream is not an `Iterator`; read it with
/// `try_next` or `drain`. Dropping the stream unsubscribes.
pub struct ChangeStream<T> {
    queue: Shared<VecDeque<T>>,
    subscription: Subscription,
}

impl<T> ChangeStream<T> {
    pub(crate) fn new(queue: Shared<VecDeque<T>>, subscription: Subscription) -> Self {
        Self {
            queue,
            subscription,
        }
    }

    /// Takes the oldest queued event, if any.
    pub fn try_next(&mut self) -> Option<T> {
        with_mut(&self.queue, |q| q.pop_front())
    }

    /// Takes every queued event, oldest first.
    pub fn drain(&mut self) -> Vec<T> {
        with_mut(&self.queue, |q| q.drain(..).collect())
    }

    /// Number of events waiting to be read.
    pub fn pending(&self) -> usize {
        with_mut(&self.queue, |q| q.len())
    }

    pub fn is_empty(&self) -> bool {
        self.pending() == 0
    }

    /// Whether the container behind this stream still exists.
    pub fn is_attached(&self) -> bool {
        self.subscription.is_active()
    }

    /// Stops receiving events. Anything still queued is discarded.
    pub fn unsubscribe(self) {
        self.subscription.unsubscribe();
    }
}

impl<T> std::fmt::Debug for ChangeStream<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeStream")
            .field("pending", &self.pending())
            .field("subscription", &self.subscription)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::notify::ChangeSink;

    #[test]
    fn queue_refills_after_running_dry() {
        let sink: ChangeSink<&'static str> = ChangeSink::new();
        let mut stream = sink.stream();

        sink.publish("a");
        assert_eq!(stream.pending(), 1);
        assert_eq!(stream.try_next(), Some("a"));
        assert_eq!(stream.try_next(), None);
        assert!(stream.is_empty());

        sink.publish("b");
        assert_eq!(stream.try_next(), Some("b"));
    }

    #[test]
    fn drain_after_a_gap_still_sees_later_events() {
        let sink: ChangeSink<u8> = ChangeSink::new();
        let mut stream = sink.stream();

        sink.publish(1);
        assert_eq!(stream.drain(), vec![1]);
        assert!(stream.drain().is_empty());

        sink.publish_all([2, 3]);
        assert_eq!(stream.drain(), vec![2, 3]);
        assert!(stream.is_attached());
    }

    #[test]
    fn stream_reports_detached_sink() {
        let sink: ChangeSink<u8> = ChangeSink::new();
        let stream = sink.stream();
        assert!(stream.is_attached());
        drop(sink);
        assert!(!stream.is_attached());
    }
}
