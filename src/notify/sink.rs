// ============================================================================
// spark-observables - ChangeSink
// Ordered multicast without replay
// ============================================================================

use crate::core::shared::{downgrade, shared, with_mut, MaybeSend, Shared, WeakShared};

use super::stream::ChangeStream;
use std::collections::VecDeque;

#[cfg(not(feature = "sync"))]
type Callback<Op> = dyn FnMut(&Op);
#[cfg(feature = "sync")]
type Callback<Op> = dyn FnMut(&Op) + Send;

#[cfg(not(feature = "sync"))]
type DynRegistry = dyn Registry;
#[cfg(feature = "sync")]
type DynRegistry = dyn Registry + Send;

// =============================================================================
// REGISTRY
// =============================================================================

/// Type-erased view of a sink's subscriber list, so a [`Subscription`] can
/// detach itself without knowing the operation type.
trait Registry {
    fn detach(&mut self, id: u64);
}

struct Subscriber<Op> {
    id: u64,
    callback: Shared<Callback<Op>>,
}

struct SinkState<Op> {
    next_id: u64,
    subscribers: Vec<Subscriber<Op>>,
}

impl<Op> Registry for SinkState<Op> {
    fn detach(&mut self, id: u64) {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != id);
        if self.subscribers.len() != before {
            tracing::debug!(id, remaining = self.subscribers.len(), "unsubscribed");
        }
    }
}

// =============================================================================
// CHANGE SINK
// =============================================================================

/// The ordered event channel of one container.
///
/// Hot: the sink accepts pushes whether or not anyone listens, and an
/// event published while nobody is subscribed is dropped, not buffered.
/// Each subscriber sees every event published while it is attached,
/// exactly once, in publish order.
pub struct ChangeSink<Op> {
    state: Shared<SinkState<Op>>,
}

impl<Op: 'static> ChangeSink<Op> {
    pub fn new() -> Self {
        Self {
            state: shared(SinkState {
                next_id: 0,
                subscribers: Vec::new(),
            }),
        }
    }

    /// Number of currently attached subscribers.
    pub fn subscriber_count(&self) -> usize {
        with_mut(&self.state, |state| state.subscribers.len())
    }

    /// Pushes `op` to every attached subscriber.
    pub fn publish(&self, op: Op) {
        // Snapshot the callbacks so a subscriber may (un)subscribe while
        // being notified.
        let callbacks: Vec<Shared<Callback<Op>>> = with_mut(&self.state, |state| {
            state
                .subscribers
                .iter()
                .map(|s| s.callback.clone())
                .collect()
        });

        if callbacks.is_empty() {
            tracing::trace!("no subscribers, event dropped");
            return;
        }

        tracing::trace!(subscribers = callbacks.len(), "publish");
        for callback in &callbacks {
            with_mut(callback, |f| f(&op));
        }
    }

    /// Publishes each operation in order.
    pub fn publish_all(&self, ops: impl IntoIterator<Item = Op>) {
        for op in ops {
            self.publish(op);
        }
    }

    /// Attaches a callback. It stays attached until the returned
    /// [`Subscription`] is dropped or unsubscribed.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: FnMut(&Op) + MaybeSend + 'static,
        Op: MaybeSend,
    {
        let callback: Shared<Callback<Op>> = shared(callback);
        let id = with_mut(&self.state, |state| {
            let id = state.next_id;
            state.next_id += 1;
            state.subscribers.push(Subscriber { id, callback });
            tracing::debug!(id, subscribers = state.subscribers.len(), "subscribed");
            id
        });

        let registry: Shared<DynRegistry> = self.state.clone();
        Subscription {
            registry: Some(downgrade(&registry)),
            id,
        }
    }

    /// Opens a pull endpoint receiving every subsequent operation.
    pub fn stream(&self) -> ChangeStream<Op>
    where
        Op: Clone + MaybeSend,
    {
        self.stream_with(None, |op: &Op, queue: &mut VecDeque<Op>| {
            queue.push_back(op.clone())
        })
    }

    /// Opens a pull endpoint whose queue starts with `seed` and is then fed
    /// by `project` for every published operation.
    ///
    /// `seed` is queued before the endpoint attaches, so nothing published
    /// afterwards can land ahead of it.
    pub fn stream_with<T, F>(&self, seed: impl IntoIterator<Item = T>, mut project: F) -> ChangeStream<T>
    where
        T: MaybeSend + 'static,
        F: FnMut(&Op, &mut VecDeque<T>) + MaybeSend + 'static,
        Op: MaybeSend,
    {
        let queue = shared(seed.into_iter().collect::<VecDeque<T>>());
        let feed = queue.clone();
        let subscription = self.subscribe(move |op| with_mut(&feed, |q| project(op, q)));
        ChangeStream::new(queue, subscription)
    }
}

impl<Op: 'static> Default for ChangeSink<Op> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Op> std::fmt::Debug for ChangeSink<Op> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let subscribers = with_mut(&self.state, |state| state.subscribers.len());
        f.debug_struct("ChangeSink")
            .field("subscribers", &subscribers)
            .finish()
    }
}

// =============================================================================
// SUBSCRIPTION
// =============================================================================

/// Keeps a subscriber attached to its sink.
///
/// Dropping it detaches the subscriber; this has no effect on the
/// container or on other subscribers. Outliving the sink is harmless.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    registry: Option<WeakShared<DynRegistry>>,
    id: u64,
}

impl Subscription {
    /// Detaches now.
    pub fn unsubscribe(mut self) {
        self.detach();
    }

    /// Keeps the subscriber attached for as long as the sink lives.
    pub fn detach_forever(mut self) {
        self.registry = None;
    }

    /// Whether the sink this subscription points at still exists.
    pub fn is_active(&self) -> bool {
        self.registry
            .as_ref()
            .is_some_and(|registry| registry.upgrade().is_some())
    }

    fn detach(&mut self) {
        if let Some(registry) = self.registry.take().and_then(|r| r.upgrade()) {
            with_mut(&registry, |r| r.detach(self.id));
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.detach();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
