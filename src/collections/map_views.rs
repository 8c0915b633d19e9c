// ============================================================================
// spark-observables - Map views
// Key-set, value-collection and entry-set views onto an ObservableMap
// ============================================================================
//
// Every view removes whole entries, so every event it publishes is a
// `Remove { key, old }` read before the entry goes away, or an `Update`
// from `EntryMut::set_value`. None of the views can insert.
// ============================================================================

use crate::core::error::{CollectionError, Result};
use crate::core::operation::MapOperation;
use crate::notify::ChangeSink;
use crate::store::MappingStore;

use super::map::MapHandle;

// =============================================================================
// KEY SET
// =============================================================================

/// The keys of an [`ObservableMap`](crate::ObservableMap). Removing a key
/// removes its entry.
pub struct KeySet<'a, K, V, S> {
    map: MapHandle<'a, K, V, S>,
}

impl<'a, K, V, S> KeySet<'a, K, V, S>
where
    K: Clone + 'static,
    V: Clone + 'static,
    S: MappingStore<K, V>,
{
    pub(crate) fn new(map: MapHandle<'a, K, V, S>) -> Self {
        Self { map }
    }

    pub fn len(&self) -> usize {
        self.map.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.store.is_empty()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.map.store.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &K> {
        self.map.store.iter().map(|(k, _)| k)
    }

    /// Always fails: a key alone cannot make an entry.
    pub fn insert(&mut self, _key: K) -> Result<bool> {
        Err(CollectionError::unsupported("key set", "insert"))
    }

    pub fn remove(&mut self, key: &K) -> bool {
        self.map.remove(key).is_some()
    }

    /// Removes the entries of the given keys; keys that were absent
    /// publish nothing.
    pub fn remove_all(&mut self, keys: &[K]) -> bool
    where
        K: PartialEq,
    {
        self.map.retain(|k, _| !keys.contains(k))
    }

    pub fn retain_all(&mut self, keys: &[K]) -> bool
    where
        K: PartialEq,
    {
        self.map.retain(|k, _| keys.contains(k))
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&K) -> bool) -> bool {
        self.map.retain(|k, _| keep(k))
    }

    pub fn clear(&mut self) {
        self.map.clear()
    }

    pub fn cursor(&mut self) -> KeyCursor<'_, K, V, S> {
        KeyCursor {
            entries: EntryCursor::new(self.map.reborrow()),
        }
    }
}

// =============================================================================
// VALUES
// =============================================================================

/// The values of an [`ObservableMap`](crate::ObservableMap). Removing a
/// value removes the entry holding it.
pub struct Values<'a, K, V, S> {
    map: MapHandle<'a, K, V, S>,
}

impl<'a, K, V, S> Values<'a, K, V, S>
where
    K: Clone + 'static,
    V: Clone + 'static,
    S: MappingStore<K, V>,
{
    pub(crate) fn new(map: MapHandle<'a, K, V, S>) -> Self {
        Self { map }
    }

    pub fn len(&self) -> usize {
        self.map.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.store.is_empty()
    }

    pub fn contains(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.iter().any(|v| v == value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &V> {
        self.map.store.iter().map(|(_, v)| v)
    }

    /// Always fails: a value alone cannot make an entry.
    pub fn insert(&mut self, _value: V) -> Result<bool> {
        Err(CollectionError::unsupported("value collection", "insert"))
    }

    /// Removes the first entry, in store order, holding `value`.
    pub fn remove(&mut self, value: &V) -> bool
    where
        V: PartialEq,
    {
        let key = self
            .map
            .store
            .iter()
            .find(|(_, v)| *v == value)
            .map(|(k, _)| k.clone());
        match key {
            Some(key) => self.map.remove(&key).is_some(),
            None => false,
        }
    }

    /// Removes every entry whose value is in `values`.
    pub fn remove_all(&mut self, values: &[V]) -> bool
    where
        V: PartialEq,
    {
        self.map.retain(|_, v| !values.contains(v))
    }

    pub fn retain_all(&mut self, values: &[V]) -> bool
    where
        V: PartialEq,
    {
        self.map.retain(|_, v| values.contains(v))
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&V) -> bool) -> bool {
        self.map.retain(|_, v| keep(v))
    }

    pub fn clear(&mut self) {
        self.map.clear()
    }

    pub fn cursor(&mut self) -> ValueCursor<'_, K, V, S> {
        ValueCursor {
            entries: EntryCursor::new(self.map.reborrow()),
        }
    }
}

// =============================================================================
// ENTRY SET
// =============================================================================

/// The entries of an [`ObservableMap`](crate::ObservableMap).
pub struct EntrySet<'a, K, V, S> {
    map: MapHandle<'a, K, V, S>,
}

impl<'a, K, V, S> EntrySet<'a, K, V, S>
where
    K: Clone + 'static,
    V: Clone + 'static,
    S: MappingStore<K, V>,
{
    pub(crate) fn new(map: MapHandle<'a, K, V, S>) -> Self {
        Self { map }
    }

    pub fn len(&self) -> usize {
        self.map.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.store.is_empty()
    }

    pub fn contains(&self, key: &K, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.map.store.get(key) == Some(value)
    }

    pub fn iter(&self) -> S::Iter<'_> {
        self.map.store.iter()
    }

    /// Always fails: entries are added through the map.
    pub fn insert(&mut self, _key: K, _value: V) -> Result<bool> {
        Err(CollectionError::unsupported("entry set", "insert"))
    }

    /// Removes the entry only if `key` currently maps to `value`.
    pub fn remove(&mut self, key: &K, value: &V) -> bool
    where
        V: PartialEq,
    {
        if !self.contains(key, value) {
            return false;
        }
        self.map.remove(key).is_some()
    }

    /// Removes every entry equal to one in `entries`.
    pub fn remove_all(&mut self, entries: &[(K, V)]) -> bool
    where
        K: PartialEq,
        V: PartialEq,
    {
        self.map
            .retain(|k, v| !entries.iter().any(|(ek, ev)| ek == k && ev == v))
    }

    /// Keeps only entries equal to one in `entries`.
    pub fn retain_all(&mut self, entries: &[(K, V)]) -> bool
    where
        K: PartialEq,
        V: PartialEq,
    {
        self.map
            .retain(|k, v| entries.iter().any(|(ek, ev)| ek == k && ev == v))
    }

    pub fn retain(&mut self, keep: impl FnMut(&K, &V) -> bool) -> bool {
        self.map.retain(keep)
    }

    pub fn clear(&mut self) {
        self.map.clear()
    }

    pub fn cursor(&mut self) -> EntryCursor<'_, K, V, S> {
        EntryCursor::new(self.map.reborrow())
    }
}

// =============================================================================
// CURSORS
// =============================================================================

/// Walks a map's entries, handing out [`EntryMut`]s and removing the entry
/// it last produced.
///
/// The walk covers the keys present when the cursor was opened. Opening a
/// cursor clones every key, so it costs O(n) up front; key and value
/// cursors share that cost.
pub struct EntryCursor<'a, K, V, S> {
    map: MapHandle<'a, K, V, S>,
    pending: std::vec::IntoIter<K>,
    current: Option<K>,
}

impl<'a, K, V, S> EntryCursor<'a, K, V, S>
where
    K: Clone + 'static,
    V: Clone + 'static,
    S: MappingStore<K, V>,
{
    fn new(map: MapHandle<'a, K, V, S>) -> Self {
        let pending: Vec<K> = map.store.iter().map(|(k, _)| k.clone()).collect();
        Self {
            map,
            pending: pending.into_iter(),
            current: None,
        }
    }

    pub fn has_next(&self) -> bool {
        !self.pending.as_slice().is_empty()
    }

    fn advance(&mut self) -> Option<&K> {
        self.current = None;
        loop {
            let key = self.pending.next()?;
            if self.map.store.contains_key(&key) {
                self.current = Some(key);
                return self.current.as_ref();
            }
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<EntryMut<'_, K, V>> {
        self.advance()?;
        let key = self.current.as_ref()?;
        let value = self.map.store.get_mut(key)?;
        Some(EntryMut {
            key,
            value,
            sink: self.map.sink,
        })
    }

    /// Removes the entry last returned by [`next`](Self::next) and
    /// publishes its `Remove`.
    pub fn remove(&mut self) -> Result<(K, V)> {
        let key = self.current.take().ok_or_else(CollectionError::invalid_state)?;
        match self.map.remove(&key) {
            Some(old) => Ok((key, old)),
            None => Err(CollectionError::invalid_state()),
        }
    }
}

/// A live entry produced by an [`EntryCursor`].
pub struct EntryMut<'c, K, V> {
    key: &'c K,
    value: &'c mut V,
    sink: &'c ChangeSink<MapOperation<K, V>>,
}

impl<K, V> EntryMut<'_, K, V>
where
    K: Clone + 'static,
    V: Clone + 'static,
{
    pub fn key(&self) -> &K {
        self.key
    }

    pub fn value(&self) -> &V {
        self.value
    }

    /// Replaces the value in place and publishes an `Update`.
    pub fn set_value(&mut self, value: V) -> V {
        let old = std::mem::replace(self.value, value.clone());
        self.sink.publish(MapOperation::Update {
            key: self.key.clone(),
            old: old.clone(),
            value,
        });
        old
    }
}

/// Walks a map's keys; removing a key removes its entry.
pub struct KeyCursor<'a, K, V, S> {
    entries: EntryCursor<'a, K, V, S>,
}

impl<K, V, S> KeyCursor<'_, K, V, S>
where
    K: Clone + 'static,
    V: Clone + 'static,
    S: MappingStore<K, V>,
{
    pub fn has_next(&self) -> bool {
        self.entries.has_next()
    }

    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<&K> {
        self.entries.advance()
    }

    pub fn remove(&mut self) -> Result<K> {
        self.entries.remove().map(|(key, _)| key)
    }
}

/// Walks a map's values; removing a value removes its entry.
pub struct ValueCursor<'a, K, V, S> {
    entries: EntryCursor<'a, K, V, S>,
}

impl<K, V, S> ValueCursor<'_, K, V, S>
where
    K: Clone + 'static,
    V: Clone + 'static,
    S: MappingStore<K, V>,
{
    pub fn has_next(&self) -> bool {
        self.entries.has_next()
    }

    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<&V> {
        self.entries.advance()?;
        let key = self.entries.current.as_ref()?;
        self.entries.map.store.get(key)
    }

    pub fn remove(&mut self) -> Result<V> {
        self.entries.remove().map(|(_, value)| value)
    }
}

// =============================================================================
// TESTS
// =============================================================================
