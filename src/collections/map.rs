// ============================================================================
// spark-observables - ObservableMap
// A key-value mapping that publishes Add/Update/Remove for every mutation
// ============================================================================

use std::collections::HashMap;

use crate::core::operation::MapOperation;
use crate::core::shared::MaybeSend;
use crate::notify::{ChangeSink, ChangeStream, Subscription};
use crate::store::MappingStore;

use super::map_views::{EntrySet, KeySet, Values};

// =============================================================================
// OBSERVABLE MAP
// =============================================================================

/// A key-value mapping with a change stream.
///
/// Writes made directly or through the [`KeySet`], [`Values`] and
/// [`EntrySet`] views all publish [`MapOperation`]s on the same stream.
///
/// # Example
///
/// ```
/// use spark_observables::{MapOperation, ObservableMap};
///
/// let mut scores: ObservableMap<&str, u32> = ObservableMap::new();
/// let mut changes = scores.changes();
///
/// scores.insert("alice", 1);
/// scores.insert("alice", 2);
/// scores.remove(&"alice");
///
/// assert_eq!(
///     changes.drain(),
///     vec![
///         MapOperation::Add { key: "alice", value: 1 },
///         MapOperation::Update { key: "alice", old: 1, value: 2 },
///         MapOperation::Remove { key: "alice", old: 2 },
///     ]
/// );
/// ```
pub struct ObservableMap<K, V, S = HashMap<K, V>>
where
    S: MappingStore<K, V>,
{
    /// The underlying data
    store: S,

    sink: ChangeSink<MapOperation<K, V>>,
}

impl<K, V, S> ObservableMap<K, V, S>
where
    K: Clone + 'static,
    V: Clone + 'static,
    S: MappingStore<K, V>,
{
    /// Create an empty map.
    pub fn new() -> Self
    where
        S: Default,
    {
        Self::with_store(S::default())
    }

    /// Wrap an existing mapping. Its current entries publish nothing.
    pub fn with_store(store: S) -> Self {
        Self {
            store,
            sink: ChangeSink::new(),
        }
    }

    /// Unwrap the backing store, dropping every subscriber.
    pub fn into_inner(self) -> S {
        self.store
    }

    /// Read access to the backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// A read and notification only handle on this map.
    ///
    /// Every mutator takes `&mut self`, so a shared borrow can read and
    /// subscribe but never write.
    pub fn as_read_only(&self) -> &Self {
        self
    }

    fn handle(&mut self) -> MapHandle<'_, K, V, S> {
        MapHandle {
            store: &mut self.store,
            sink: &self.sink,
        }
    }

    // =========================================================================
    // READ
    // =========================================================================

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.store.get(key)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.store.contains_key(key)
    }

    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.store.iter().any(|(_, v)| v == value)
    }

    pub fn iter(&self) -> S::Iter<'_> {
        self.store.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.store.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.store.iter().map(|(_, v)| v)
    }

    // =========================================================================
    // WRITE
    // =========================================================================

    /// Inserts the pair. Publishes `Add` for a new key, otherwise `Update`
    /// carrying the displaced value, which is returned.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.handle().insert(key, value)
    }

    /// Inserts every pair, then publishes one event per pair in input order.
    ///
    /// Each pair is classified against the map as it was before the call:
    /// a key absent before the call yields `Add` even when it appears twice
    /// in `entries`, and a present key yields `Update` with its pre-call
    /// value as `old`.
    pub fn insert_all(&mut self, entries: impl IntoIterator<Item = (K, V)>) {
        let entries: Vec<(K, V)> = entries.into_iter().collect();
        let before: Vec<Option<V>> = entries
            .iter()
            .map(|(key, _)| self.store.get(key).cloned())
            .collect();

        for (key, value) in &entries {
            self.store.insert(key.clone(), value.clone());
        }

        self.sink.publish_all(entries.into_iter().zip(before).map(
            |((key, value), old)| match old {
                None => MapOperation::Add { key, value },
                Some(old) => MapOperation::Update { key, old, value },
            },
        ));
    }

    /// Removes `key`. Publishes `Remove` only if it was present.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.handle().remove(key)
    }

    /// Keeps only the entries for which `keep` returns `true`, then
    /// publishes a `Remove` per dropped entry in store order.
    pub fn retain(&mut self, keep: impl FnMut(&K, &V) -> bool) -> bool {
        self.handle().retain(keep)
    }

    /// Empties the map, then publishes a `Remove` per former entry.
    pub fn clear(&mut self) {
        self.handle().clear()
    }

    /// The mutable key-set view.
    pub fn keys_mut(&mut self) -> KeySet<'_, K, V, S> {
        KeySet::new(self.handle())
    }

    /// The mutable value-collection view.
    pub fn values_mut(&mut self) -> Values<'_, K, V, S> {
        Values::new(self.handle())
    }

    /// The mutable entry-set view.
    pub fn entries_mut(&mut self) -> EntrySet<'_, K, V, S> {
        EntrySet::new(self.handle())
    }

    // =========================================================================
    // NOTIFICATION
    // =========================================================================

    /// Attaches a callback for every subsequent operation.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: FnMut(&MapOperation<K, V>) + MaybeSend + 'static,
        K: MaybeSend,
        V: MaybeSend,
    {
        self.sink.subscribe(callback)
    }

    /// Operations published after this call, for every key.
    pub fn changes(&self) -> ChangeStream<MapOperation<K, V>>
    where
        K: MaybeSend,
        V: MaybeSend,
    {
        self.sink.stream()
    }

    /// One `Add` per current entry in store order, then live operations.
    pub fn changes_with_snapshot(&self) -> ChangeStream<MapOperation<K, V>>
    where
        K: MaybeSend,
        V: MaybeSend,
    {
        self.changes_matching(|_| true)
    }

    /// Operations on `key` only, starting with an `Add` of its current
    /// value if it has one.
    pub fn changes_for_key(&self, key: K) -> ChangeStream<MapOperation<K, V>>
    where
        K: PartialEq + MaybeSend,
        V: MaybeSend,
    {
        let seed = self.store.get(&key).cloned().map(|value| MapOperation::Add {
            key: key.clone(),
            value,
        });
        self.sink.stream_with(seed, move |op: &MapOperation<K, V>, queue| {
            if *op.key() == key {
                queue.push_back(op.clone());
            }
        })
    }

    /// Operations on keys accepted by `filter`, starting with an `Add` per
    /// currently matching entry.
    pub fn changes_matching<F>(&self, mut filter: F) -> ChangeStream<MapOperation<K, V>>
    where
        F: FnMut(&K) -> bool + MaybeSend + 'static,
        K: MaybeSend,
        V: MaybeSend,
    {
        let seed: Vec<MapOperation<K, V>> = self
            .store
            .iter()
            .filter(|(key, _)| filter(*key))
            .map(|(key, value)| MapOperation::Add {
                key: key.clone(),
                value: value.clone(),
            })
            .collect();
        self.sink.stream_with(seed, move |op: &MapOperation<K, V>, queue| {
            if filter(op.key()) {
                queue.push_back(op.clone());
            }
        })
    }
}

impl<K, V, S> Default for ObservableMap<K, V, S>
where
    K: Clone + 'static,
    V: Clone + 'static,
    S: MappingStore<K, V> + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> From<S> for ObservableMap<K, V, S>
where
    K: Clone + 'static,
    V: Clone + 'static,
    S: MappingStore<K, V>,
{
    fn from(store: S) -> Self {
        Self::with_store(store)
    }
}

impl<K, V, S> FromIterator<(K, V)> for ObservableMap<K, V, S>
where
    K: Clone + 'static,
    V: Clone + 'static,
    S: MappingStore<K, V> + FromIterator<(K, V)>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::with_store(iter.into_iter().collect())
    }
}

impl<K, V, S> Extend<(K, V)> for ObservableMap<K, V, S>
where
    K: Clone + 'static,
    V: Clone + 'static,
    S: MappingStore<K, V>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.insert_all(iter);
    }
}

impl<K, V, S> std::fmt::Debug for ObservableMap<K, V, S>
where
    S: MappingStore<K, V> + std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObservableMap")
            .field("store", &self.store)
            .field("sink", &self.sink)
            .finish()
    }
}

// =============================================================================
// MAP HANDLE
// =============================================================================

/// Exclusive access to a map's store and sink, shared by the map and its
/// views so that every write path publishes the same way.
pub(crate) struct MapHandle<'a, K, V, S> {
    pub(crate) store: &'a mut S,
    pub(crate) sink: &'a ChangeSink<MapOperation<K, V>>,
}

impl<K, V, S> MapHandle<'_, K, V, S>
where
    K: Clone + 'static,
    V: Clone + 'static,
    S: MappingStore<K, V>,
{
    pub(crate) fn reborrow(&mut self) -> MapHandle<'_, K, V, S> {
        MapHandle {
            store: &mut *self.store,
            sink: self.sink,
        }
    }

    pub(crate) fn insert(&mut self, key: K, value: V) -> Option<V> {
        let old = self.store.insert(key.clone(), value.clone());
        self.sink.publish(match &old {
            None => MapOperation::Add { key, value },
            Some(old) => MapOperation::Update {
                key,
                old: old.clone(),
                value,
            },
        });
        old
    }

    pub(crate) fn remove(&mut self, key: &K) -> Option<V> {
        let old = self.store.remove(key)?;
        self.sink.publish(MapOperation::Remove {
            key: key.clone(),
            old: old.clone(),
        });
        Some(old)
    }

    /// Drops every entry `keep` rejects; only entries actually removed
    /// publish, in store order.
    pub(crate) fn retain(&mut self, mut keep: impl FnMut(&K, &V) -> bool) -> bool {
        let mut removed = Vec::new();
        self.store.retain(|key, value| {
            let kept = keep(key, &*value);
            if !kept {
                removed.push(MapOperation::Remove {
                    key: key.clone(),
                    old: value.clone(),
                });
            }
            kept
        });

        let changed = !removed.is_empty();
        self.sink.publish_all(removed);
        changed
    }

    pub(crate) fn clear(&mut self) {
        let snapshot: Vec<MapOperation<K, V>> = self
            .store
            .iter()
            .map(|(key, value)| MapOperation::Remove {
                key: key.clone(),
                old: value.clone(),
            })
            .collect();
        self.store.clear();
        self.sink.publish_all(snapshot);
    }
}

// =============================================================================
// TESTS
// =============================================================================
