// ============================================================================
// spark-observables - ObservableList
// An ordered sequence that publishes index-aware Add/Update/Remove events
// ============================================================================

use std::ops::Index;

use crate::core::error::Result;
use crate::core::operation::{BagOperation, ListOperation};
use crate::core::shared::MaybeSend;
use crate::notify::{ChangeSink, ChangeStream, Subscription};
use crate::store::SequenceStore;

use super::list_view::{ListCursor, ListView};
use super::ObservableCollection;

// =============================================================================
// OBSERVABLE LIST
// =============================================================================

/// An ordered sequence with an index-aware change stream.
///
/// Every mutation, whether made directly, through a [`ListView`] obtained
/// from [`sub_list`](Self::sub_list), or through a [`ListCursor`], publishes
/// [`ListOperation`]s with indices in this list's coordinates.
///
/// The same stream is also available in bag form through
/// [`changes`](Self::changes), where an `Update` becomes a `Remove` of the
/// old element followed by a `Put` of the new one.
///
/// # Example
///
/// ```
/// use spark_observables::{ListOperation, ObservableList};
///
/// let mut items: ObservableList<&str> = ObservableList::from_iter(["a", "b", "c", "d", "e"]);
/// let mut changes = items.list_changes();
///
/// // Remove "c" through a view of ["b", "c", "d"].
/// let mut middle = items.sub_list(1, 4).unwrap();
/// middle.remove(1).unwrap();
///
/// assert_eq!(changes.drain(), vec![ListOperation::Remove { index: 2, old: "c" }]);
/// ```
pub struct ObservableList<E, S = Vec<E>>
where
    S: SequenceStore<E>,
{
    /// The underlying data
    store: S,

    sink: ChangeSink<ListOperation<E>>,
}

impl<E, S> ObservableList<E, S>
where
    E: Clone + 'static,
    S: SequenceStore<E>,
{
    /// Create an empty list.
    pub fn new() -> Self
    where
        S: Default,
    {
        Self::with_store(S::default())
    }

    /// Wrap an existing sequence. Its current contents publish nothing.
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

    /// A read and notification only handle on this list.
    ///
    /// Every mutator takes `&mut self`, so a shared borrow can read and
    /// subscribe but never write.
    pub fn as_read_only(&self) -> &Self {
        self
    }

    /// A mutable view of the whole list.
    pub fn view(&mut self) -> ListView<'_, E, S> {
        ListView::whole(&mut self.store, &self.sink)
    }

    /// A mutable view of `from..to`. Mutations through it publish on this
    /// list's stream with translated indices.
    pub fn sub_list(&mut self, from: usize, to: usize) -> Result<ListView<'_, E, S>> {
        let view = ListView::whole(&mut self.store, &self.sink);
        view.into_sub_list(from, to)
    }

    // =========================================================================
    // READ
    // =========================================================================

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<&E> {
        self.store.get(index)
    }

    pub fn first(&self) -> Option<&E> {
        self.store.get(0)
    }

    pub fn last(&self) -> Option<&E> {
        self.store.len().checked_sub(1).and_then(|i| self.store.get(i))
    }

    pub fn iter(&self) -> S::Iter<'_> {
        self.store.iter()
    }

    pub fn contains(&self, element: &E) -> bool
    where
        E: PartialEq,
    {
        self.store.iter().any(|e| e == element)
    }

    pub fn index_of(&self, element: &E) -> Option<usize>
    where
        E: PartialEq,
    {
        self.store.iter().position(|e| e == element)
    }

    pub fn last_index_of(&self, element: &E) -> Option<usize>
    where
        E: PartialEq,
    {
        self.store
            .iter()
            .enumerate()
            .filter(|(_, e)| *e == element)
            .map(|(i, _)| i)
            .last()
    }

    pub fn to_vec(&self) -> Vec<E> {
        self.store.iter().cloned().collect()
    }

    // =========================================================================
    // WRITE
    // =========================================================================

    /// Appends `element`; publishes `Add` at the old length with `at_end`.
    pub fn push(&mut self, element: E) {
        self.view().push(element)
    }

    pub fn insert(&mut self, index: usize, element: E) -> Result<()> {
        self.view().insert(index, element)
    }

    pub fn extend_from(&mut self, elements: impl IntoIterator<Item = E>) -> bool {
        self.view().extend_from(elements)
    }

    pub fn insert_all(&mut self, index: usize, elements: impl IntoIterator<Item = E>) -> Result<bool> {
        self.view().insert_all(index, elements)
    }

    /// Replaces the element at `index`; always publishes one `Update`.
    pub fn set(&mut self, index: usize, element: E) -> Result<E> {
        self.view().set(index, element)
    }

    pub fn remove(&mut self, index: usize) -> Result<E> {
        self.view().remove(index)
    }

    pub fn remove_item(&mut self, element: &E) -> bool
    where
        E: PartialEq,
    {
        self.view().remove_item(element)
    }

    pub fn remove_all(&mut self, elements: &[E]) -> bool
    where
        E: PartialEq,
    {
        self.view().remove_all(elements)
    }

    pub fn retain_all(&mut self, elements: &[E]) -> bool
    where
        E: PartialEq,
    {
        self.view().retain_all(elements)
    }

    pub fn retain(&mut self, keep: impl FnMut(&E) -> bool) -> bool {
        self.view().retain(keep)
    }

    pub fn clear(&mut self) {
        self.view().clear()
    }

    /// A cursor positioned before the first element.
    pub fn cursor(&mut self) -> ListCursor<'_, E, S> {
        ListView::whole(&mut self.store, &self.sink).into_cursor(0)
    }

    /// A cursor positioned before `index`.
    pub fn cursor_at(&mut self, index: usize) -> Result<ListCursor<'_, E, S>> {
        let view = ListView::whole(&mut self.store, &self.sink);
        view.check_cursor_index(index)?;
        Ok(view.into_cursor(index))
    }

    // =========================================================================
    // NOTIFICATION
    // =========================================================================

    /// Attaches a callback for every subsequent list operation.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: FnMut(&ListOperation<E>) + MaybeSend + 'static,
        E: MaybeSend,
    {
        self.sink.subscribe(callback)
    }

    /// List operations published after this call.
    pub fn list_changes(&self) -> ChangeStream<ListOperation<E>>
    where
        E: MaybeSend,
    {
        self.sink.stream()
    }

    /// One `Add` per current element (ascending, `at_end` set), then live
    /// list operations.
    pub fn list_changes_with_snapshot(&self) -> ChangeStream<ListOperation<E>>
    where
        E: MaybeSend,
    {
        let snapshot = self
            .store
            .iter()
            .cloned()
            .enumerate()
            .map(|(index, element)| ListOperation::Add {
                index,
                at_end: true,
                element,
            });
        self.sink.stream_with(snapshot, |op: &ListOperation<E>, queue| {
            queue.push_back(op.clone())
        })
    }

    /// The bag projection of [`list_changes`](Self::list_changes).
    pub fn changes(&self) -> ChangeStream<BagOperation<E>>
    where
        E: MaybeSend,
    {
        self.sink.stream_with(None, project_to_bag)
    }

    /// One `Put` per current element in order, then the live bag projection.
    pub fn changes_with_snapshot(&self) -> ChangeStream<BagOperation<E>>
    where
        E: MaybeSend,
    {
        let snapshot = self.store.iter().cloned().map(BagOperation::Put);
        self.sink.stream_with(snapshot, project_to_bag)
    }
}

fn project_to_bag<E: Clone>(
    op: &ListOperation<E>,
    queue: &mut std::collections::VecDeque<BagOperation<E>>,
) {
    queue.extend(op.clone().to_bag_operations());
}

impl<E, S> ObservableCollection<E> for ObservableList<E, S>
where
    E: Clone + PartialEq + MaybeSend + 'static,
    S: SequenceStore<E>,
{
    fn len(&self) -> usize {
        self.store.len()
    }

    fn contains(&self, element: &E) -> bool {
        ObservableList::contains(self, element)
    }

    fn changes(&self) -> ChangeStream<BagOperation<E>> {
        ObservableList::changes(self)
    }

    fn changes_with_snapshot(&self) -> ChangeStream<BagOperation<E>> {
        ObservableList::changes_with_snapshot(self)
    }
}

impl<E, S> Index<usize> for ObservableList<E, S>
where
    E: Clone + 'static,
    S: SequenceStore<E>,
{
    type Output = E;

    fn index(&self, index: usize) -> &E {
        match self.store.get(index) {
            Some(element) => element,
            None => panic!("index {index} out of range for length {}", self.store.len()),
        }
    }
}

impl<E, S> Default for ObservableList<E, S>
where
    E: Clone + 'static,
    S: SequenceStore<E> + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<E, S> From<S> for ObservableList<E, S>
where
    E: Clone + 'static,
    S: SequenceStore<E>,
{
    fn from(store: S) -> Self {
        Self::with_store(store)
    }
}

impl<E, S> FromIterator<E> for ObservableList<E, S>
where
    E: Clone + 'static,
    S: SequenceStore<E> + FromIterator<E>,
{
    fn from_iter<I: IntoIterator<Item = E>>(iter: I) -> Self {
        Self::with_store(iter.into_iter().collect())
    }
}

impl<E, S> Extend<E> for ObservableList<E, S>
where
    E: Clone + 'static,
    S: SequenceStore<E>,
{
    fn extend<I: IntoIterator<Item = E>>(&mut self, iter: I) {
        self.extend_from(iter);
    }
}

impl<E, S> std::fmt::Debug for ObservableList<E, S>
where
    S: SequenceStore<E> + std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObservableList")
            .field("store", &self.store)
            .field("sink", &self.sink)
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
