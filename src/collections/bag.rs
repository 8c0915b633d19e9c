// ============================================================================
// spark-observables - ObservableBag
// An unordered collection that publishes Put/Remove for every mutation
// ============================================================================

use std::collections::HashSet;

use crate::core::error::{CollectionError, Result};
use crate::core::operation::BagOperation;
use crate::core::shared::MaybeSend;
use crate::notify::{ChangeSink, ChangeStream, Subscription};
use crate::store::CollectionStore;

use super::ObservableCollection;

// =============================================================================
// OBSERVABLE BAG
// =============================================================================

/// An unordered collection with a change stream.
///
/// Reads and writes behave exactly like the backing store `S`; in addition
/// every mutation that changes the contents publishes [`BagOperation`]s
/// before returning.
///
/// # Example
///
/// ```
/// use spark_observables::{BagOperation, ObservableBag};
///
/// let mut tags: ObservableBag<&str> = ObservableBag::new();
/// let mut changes = tags.changes();
///
/// tags.insert("important");
/// tags.insert("important"); // already present, nothing published
/// tags.remove(&"important");
///
/// assert_eq!(
///     changes.drain(),
///     vec![BagOperation::Put("important"), BagOperation::Remove("important")]
/// );
/// ```
pub struct ObservableBag<E, S = HashSet<E>>
where
    S: CollectionStore<E>,
{
    /// The underlying data
    store: S,

    sink: ChangeSink<BagOperation<E>>,
}

impl<E, S> ObservableBag<E, S>
where
    E: Clone + 'static,
    S: CollectionStore<E>,
{
    /// Create an empty bag.
    pub fn new() -> Self
    where
        S: Default,
    {
        Self::with_store(S::default())
    }

    /// Wrap an existing store. Its current contents publish nothing.
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

    /// A read and notification only handle on this bag.
    ///
    /// Every mutator takes `&mut self`, so a shared borrow can read and
    /// subscribe but never write.
    ///
    /// ```compile_fail
    /// use spark_observables::ObservableBag;
    ///
    /// let mut bag: ObservableBag<u8> = ObservableBag::new();
    /// let view = bag.as_read_only();
    /// view.insert(1);
    /// ```
    pub fn as_read_only(&self) -> &Self {
        self
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

    pub fn contains(&self, element: &E) -> bool {
        self.store.contains(element)
    }

    pub fn contains_all(&self, elements: &[E]) -> bool {
        elements.iter().all(|e| self.store.contains(e))
    }

    pub fn iter(&self) -> S::Iter<'_> {
        self.store.iter()
    }

    // =========================================================================
    // WRITE
    // =========================================================================

    /// Inserts `element`. Publishes `Put` only if the store changed.
    pub fn insert(&mut self, element: E) -> bool {
        let changed = self.store.insert(element.clone());
        if changed {
            self.sink.publish(BagOperation::Put(element));
        }
        changed
    }

    /// Removes one occurrence of `element`. Publishes `Remove` only if found.
    pub fn remove(&mut self, element: &E) -> bool {
        let changed = self.store.remove(element);
        if changed {
            self.sink.publish(BagOperation::Remove(element.clone()));
        }
        changed
    }

    /// Inserts every element, then publishes one `Put` per element that was
    /// absent before the call and actually went in.
    ///
    /// Elements already present, and repeats a set store swallowed, publish
    /// nothing. Returns whether the store changed, which for a multiset
    /// store includes extra copies of elements already present.
    pub fn insert_all(&mut self, elements: impl IntoIterator<Item = E>) -> bool {
        let elements: Vec<E> = elements.into_iter().collect();
        let present_before: Vec<bool> = elements.iter().map(|e| self.store.contains(e)).collect();

        let mut changed = false;
        let mut put = Vec::new();
        for (element, present) in elements.into_iter().zip(present_before) {
            let inserted = self.store.insert(element.clone());
            changed |= inserted;
            if inserted && !present {
                put.push(element);
            }
        }

        self.sink.publish_all(put.into_iter().map(BagOperation::Put));
        changed
    }

    /// Removes every element equal to one in `elements`.
    pub fn remove_all(&mut self, elements: &[E]) -> bool
    where
        E: PartialEq,
    {
        self.retain(|e| !elements.contains(e))
    }

    /// Keeps only elements equal to one in `elements`.
    pub fn retain_all(&mut self, elements: &[E]) -> bool
    where
        E: PartialEq,
    {
        self.retain(|e| elements.contains(e))
    }

    /// Keeps only the elements for which `keep` returns `true`, then
    /// publishes a `Remove` for each element dropped, in store order.
    pub fn retain(&mut self, mut keep: impl FnMut(&E) -> bool) -> bool {
        let mut removed = Vec::new();
        self.store.retain(|e| {
            let kept = keep(e);
            if !kept {
                removed.push(e.clone());
            }
            kept
        });

        let changed = !removed.is_empty();
        self.sink.publish_all(removed.into_iter().map(BagOperation::Remove));
        changed
    }

    /// Empties the bag, then publishes a `Remove` per former element in
    /// store order.
    pub fn clear(&mut self) {
        let snapshot: Vec<E> = self.store.iter().cloned().collect();
        self.store.clear();
        self.sink.publish_all(snapshot.into_iter().map(BagOperation::Remove));
    }

    /// A cursor that can remove the element it last produced.
    pub fn cursor(&mut self) -> BagCursor<'_, E, S> {
        let pending: Vec<E> = self.store.iter().cloned().collect();
        BagCursor {
            store: &mut self.store,
            sink: &self.sink,
            pending: pending.into_iter(),
            current: None,
        }
    }

    // =========================================================================
    // NOTIFICATION
    // =========================================================================

    /// Attaches a callback for every subsequent operation.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: FnMut(&BagOperation<E>) + MaybeSend + 'static,
        E: MaybeSend,
    {
        self.sink.subscribe(callback)
    }

    /// Operations published after this call. No replay.
    pub fn changes(&self) -> ChangeStream<BagOperation<E>>
    where
        E: MaybeSend,
    {
        self.sink.stream()
    }

    /// One `Put` per current element in store order, then live operations.
    pub fn changes_with_snapshot(&self) -> ChangeStream<BagOperation<E>>
    where
        E: MaybeSend,
    {
        let snapshot = self.store.iter().cloned().map(BagOperation::Put);
        self.sink
            .stream_with(snapshot, |op: &BagOperation<E>, queue| queue.push_back(op.clone()))
    }
}

impl<E, S> ObservableCollection<E> for ObservableBag<E, S>
where
    E: Clone + MaybeSend + 'static,
    S: CollectionStore<E>,
{
    fn len(&self) -> usize {
        self.store.len()
    }

    fn contains(&self, element: &E) -> bool {
        self.store.contains(element)
    }

    fn changes(&self) -> ChangeStream<BagOperation<E>> {
        ObservableBag::changes(self)
    }

    fn changes_with_snapshot(&self) -> ChangeStream<BagOperation<E>> {
        ObservableBag::changes_with_snapshot(self)
    }
}

impl<E, S> Default for ObservableBag<E, S>
where
    E: Clone + 'static,
    S: CollectionStore<E> + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<E, S> From<S> for ObservableBag<E, S>
where
    E: Clone + 'static,
    S: CollectionStore<E>,
{
    fn from(store: S) -> Self {
        Self::with_store(store)
    }
}

impl<E, S> FromIterator<E> for ObservableBag<E, S>
where
    E: Clone + 'static,
    S: CollectionStore<E> + FromIterator<E>,
{
    fn from_iter<I: IntoIterator<Item = E>>(iter: I) -> Self {
        Self::with_store(iter.into_iter().collect())
    }
}

impl<E, S> Extend<E> for ObservableBag<E, S>
where
    E: Clone + 'static,
    S: CollectionStore<E>,
{
    fn extend<I: IntoIterator<Item = E>>(&mut self, iter: I) {
        self.insert_all(iter);
    }
}

impl<E, S> std::fmt::Debug for ObservableBag<E, S>
where
    S: CollectionStore<E> + std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObservableBag")
            .field("store", &self.store)
            .field("sink", &self.sink)
            .finish()
    }
}

// =============================================================================
// CURSOR
// =============================================================================

/// Walks a bag and removes the element it last produced.
///
/// The walk covers the contents at the time the cursor was opened; the
/// cursor holds the bag exclusively, so nothing else can change them.
/// Opening a cursor clones every element, so it costs O(n) up front.
pub struct BagCursor<'a, E, S> {
    store: &'a mut S,
    sink: &'a ChangeSink<BagOperation<E>>,
    pending: std::vec::IntoIter<E>,
    current: Option<E>,
}

impl<E, S> BagCursor<'_, E, S>
where
    E: Clone + 'static,
    S: CollectionStore<E>,
{
    pub fn has_next(&self) -> bool {
        !self.pending.as_slice().is_empty()
    }

    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<&E> {
        self.current = self.pending.next();
        self.current.as_ref()
    }

    /// Removes the element last returned by [`next`](Self::next) and
    /// publishes its `Remove`.
    ///
    /// Fails with [`CollectionError::InvalidState`] before the first
    /// `next`, or when called twice for the same element.
    pub fn remove(&mut self) -> Result<E> {
        let element = self.current.take().ok_or_else(CollectionError::invalid_state)?;
        if !self.store.remove(&element) {
            return Err(CollectionError::invalid_state());
        }
        self.sink.publish(BagOperation::Remove(element.clone()));
        Ok(element)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use BagOperation::{Put, Remove};

    #[test]
    fn insert_publishes_only_real_changes() {
        let mut bag: ObservableBag<&str> = ObservableBag::new();
        let mut changes = bag.changes();

        assert!(bag.insert("x"));
        assert!(!bag.insert("x"));
        assert_eq!(changes.drain(), vec![Put("x")]);
    }

    #[test]
    fn removing_absent_element_is_silent() {
        let mut bag: ObservableBag<&str> = ObservableBag::from_iter(["a"]);
        let mut changes = bag.changes();

        assert!(!bag.remove(&"zzz"));
        assert!(changes.drain().is_empty());
        assert_eq!(bag.len(), 1);
    }

    #[test]
    fn insert_all_skips_present_and_repeated() {
        let mut bag: ObservableBag<&str> = ObservableBag::from_iter(["x"]);
        let mut changes = bag.changes();

        assert!(bag.insert_all(["x", "x", "y", "y"]));
        assert_eq!(changes.drain(), vec![Put("y")]);
        assert!(!bag.insert_all(["x"]));
        assert!(changes.drain().is_empty());
    }

    #[test]
    fn multiset_store_publishes_each_new_copy() {
        let mut bag: ObservableBag<char, Vec<char>> = ObservableBag::new();
        let mut changes = bag.changes();

        bag.insert_all(['a', 'a']);
        bag.insert('a');
        assert_eq!(changes.drain(), vec![Put('a'), Put('a'), Put('a')]);
        assert_eq!(bag.len(), 3);

        bag.remove_all(&['a']);
        assert_eq!(changes.drain(), vec![Remove('a'), Remove('a'), Remove('a')]);
    }

    #[test]
    fn multiset_bulk_insert_of_present_element_reports_change() {
        let mut bag: ObservableBag<char, Vec<char>> = ObservableBag::from_iter(['a']);
        let mut changes = bag.changes();

        assert!(bag.insert_all(['a']));
        assert_eq!(bag.len(), 2);
        assert!(changes.drain().is_empty());

        let mut set: ObservableBag<char, BTreeSet<char>> = ObservableBag::from_iter(['a']);
        assert!(!set.insert_all(['a', 'a']));
    }

    #[test]
    fn remove_all_and_retain_all_report_dropped_elements() {
        let mut bag: ObservableBag<u8, BTreeSet<u8>> = ObservableBag::from_iter([1, 2, 3, 4]);
        let mut changes = bag.changes();

        assert!(bag.remove_all(&[2, 9, 2]));
        assert_eq!(changes.drain(), vec![Remove(2)]);

        assert!(bag.retain_all(&[1, 4]));
        assert_eq!(changes.drain(), vec![Remove(3)]);

        assert!(!bag.retain_all(&[1, 4]));
        assert!(changes.drain().is_empty());
    }

    #[test]
    fn clear_reports_every_former_element_in_order() {
        let mut bag: ObservableBag<u8, BTreeSet<u8>> = ObservableBag::from_iter([3, 1, 2]);
        let mut changes = bag.changes();

        bag.clear();
        assert!(bag.is_empty());
        assert_eq!(changes.drain(), vec![Remove(1), Remove(2), Remove(3)]);
    }

    #[test]
    fn cursor_removes_last_returned_element() {
        let mut bag: ObservableBag<u8, BTreeSet<u8>> = ObservableBag::from_iter([1, 2, 3]);
        let mut changes = bag.changes();

        let mut cursor = bag.cursor();
        assert_eq!(cursor.remove(), Err(CollectionError::InvalidState));
        while let Some(&e) = cursor.next() {
            if e % 2 == 1 {
                assert_eq!(cursor.remove(), Ok(e));
                assert_eq!(cursor.remove(), Err(CollectionError::InvalidState));
            }
        }
        assert!(!cursor.has_next());

        assert_eq!(changes.drain(), vec![Remove(1), Remove(3)]);
        assert_eq!(bag.iter().copied().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn snapshot_precedes_live_events() {
        let mut bag: ObservableBag<u8, BTreeSet<u8>> = ObservableBag::from_iter([1, 2]);
        let mut changes = bag.changes_with_snapshot();

        bag.insert(3);
        assert_eq!(changes.drain(), vec![Put(1), Put(2), Put(3)]);
    }

    #[test]
    fn read_only_facade_shares_the_stream() {
        let mut bag: ObservableBag<u8, BTreeSet<u8>> = ObservableBag::from_iter([5]);
        let mut changes = {
            let view = bag.as_read_only();
            assert_eq!(view.len(), 1);
            assert!(view.contains(&5));
            view.changes_with_snapshot()
        };

        bag.remove(&5);
        assert_eq!(changes.drain(), vec![Put(5), Remove(5)]);
    }

    #[test]
    fn debug_format() {
        let bag: ObservableBag<u8, BTreeSet<u8>> = ObservableBag::from_iter([7]);
        let debug = format!("{:?}", bag);
        assert!(debug.contains("ObservableBag"));
        assert!(debug.contains('7'));
    }
}
