// ============================================================================
// spark-observables - ListView / ListCursor
// Offset-translated mutable windows onto an ObservableList
// ============================================================================
//
// A view is a window `offset .. store.len() - tail` over the list's store.
// Mutations through a view only touch elements inside the window, so the
// number of elements after it (`tail`) never changes while the view lives.
// That keeps `len()` correct without any bookkeeping in the parent views.
// ============================================================================

use crate::core::error::{CollectionError, Result};
use crate::core::operation::ListOperation;
use crate::notify::ChangeSink;
use crate::store::SequenceStore;

// =============================================================================
// LIST VIEW
// =============================================================================

/// A mutable window onto an [`ObservableList`](crate::ObservableList).
///
/// Indices passed to a view are local to it; every event it publishes
/// carries the index translated into the top-level list. Obtained from
/// [`ObservableList::view`](crate::ObservableList::view) (the whole list)
/// or [`sub_list`](Self::sub_list).
pub struct ListView<'a, E, S> {
    store: &'a mut S,
    sink: &'a ChangeSink<ListOperation<E>>,
    /// Index of the view's first element in the top-level list.
    offset: usize,
    /// Number of list elements after the view's last element.
    tail: usize,
    /// Whether the view's upper bound is the end of the top-level list.
    end_is_end: bool,
}

impl<'a, E, S> ListView<'a, E, S>
where
    E: Clone + 'static,
    S: SequenceStore<E>,
{
    pub(crate) fn whole(store: &'a mut S, sink: &'a ChangeSink<ListOperation<E>>) -> Self {
        Self {
            store,
            sink,
            offset: 0,
            tail: 0,
            end_is_end: true,
        }
    }

    fn reborrow(&mut self) -> ListView<'_, E, S> {
        ListView {
            store: &mut *self.store,
            sink: self.sink,
            offset: self.offset,
            tail: self.tail,
            end_is_end: self.end_is_end,
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn end_is_end(&self) -> bool {
        self.end_is_end
    }

    // =========================================================================
    // READ
    // =========================================================================

    pub fn len(&self) -> usize {
        self.store.len() - self.offset - self.tail
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<&E> {
        if index < self.len() {
            self.store.get(self.offset + index)
        } else {
            None
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &E> {
        self.store.iter().skip(self.offset).take(self.len())
    }

    pub fn contains(&self, element: &E) -> bool
    where
        E: PartialEq,
    {
        self.iter().any(|e| e == element)
    }

    pub fn index_of(&self, element: &E) -> Option<usize>
    where
        E: PartialEq,
    {
        self.iter().position(|e| e == element)
    }

    pub fn last_index_of(&self, element: &E) -> Option<usize>
    where
        E: PartialEq,
    {
        self.iter()
            .enumerate()
            .filter(|(_, e)| *e == element)
            .map(|(i, _)| i)
            .last()
    }

    pub fn to_vec(&self) -> Vec<E> {
        self.iter().cloned().collect()
    }

    // =========================================================================
    // INSERT
    // =========================================================================

    /// Appends `element` at the end of the view.
    pub fn push(&mut self, element: E) {
        let index = self.len();
        self.store.insert(self.offset + index, element.clone());
        self.sink.publish(ListOperation::Add {
            index: self.offset + index,
            at_end: self.end_is_end,
            element,
        });
    }

    /// Inserts `element` at local `index`, shifting later elements.
    pub fn insert(&mut self, index: usize, element: E) -> Result<()> {
        let len = self.len();
        if index > len {
            return Err(CollectionError::out_of_range(index, len));
        }

        self.store.insert(self.offset + index, element.clone());
        self.sink.publish(ListOperation::Add {
            index: self.offset + index,
            at_end: self.end_is_end && index == len,
            element,
        });
        Ok(())
    }

    /// Appends every element, publishing one `Add` each.
    pub fn extend_from(&mut self, elements: impl IntoIterator<Item = E>) -> bool {
        let len = self.len();
        self.insert_batch(len, elements.into_iter().collect())
    }

    /// Inserts every element starting at local `index`, publishing one
    /// `Add` each with consecutive indices.
    pub fn insert_all(&mut self, index: usize, elements: impl IntoIterator<Item = E>) -> Result<bool> {
        let len = self.len();
        if index > len {
            return Err(CollectionError::out_of_range(index, len));
        }
        Ok(self.insert_batch(index, elements.into_iter().collect()))
    }

    fn insert_batch(&mut self, index: usize, elements: Vec<E>) -> bool {
        if elements.is_empty() {
            return false;
        }

        // `at_end` is decided once for the whole batch.
        let at_end = self.end_is_end && index == self.len();
        let start = self.offset + index;
        self.store.insert_many(start, elements.clone());
        self.sink.publish_all(elements.into_iter().enumerate().map(|(i, element)| {
            ListOperation::Add {
                index: start + i,
                at_end,
                element,
            }
        }));
        true
    }

    // =========================================================================
    // UPDATE
    // =========================================================================

    /// Replaces the element at local `index`, returning the old one.
    pub fn set(&mut self, index: usize, element: E) -> Result<E> {
        let len = self.len();
        if index >= len {
            return Err(CollectionError::out_of_range(index, len));
        }

        let old = self.store.replace(self.offset + index, element.clone());
        self.sink.publish(ListOperation::Update {
            index: self.offset + index,
            old: old.clone(),
            element,
        });
        Ok(old)
    }

    // =========================================================================
    // REMOVE
    // =========================================================================

    /// Removes and returns the element at local `index`.
    pub fn remove(&mut self, index: usize) -> Result<E> {
        let len = self.len();
        if index >= len {
            return Err(CollectionError::out_of_range(index, len));
        }

        let old = self.store.remove(self.offset + index);
        self.sink.publish(ListOperation::Remove {
            index: self.offset + index,
            old: old.clone(),
        });
        Ok(old)
    }

    /// Removes the first element equal to `element`.
    pub fn remove_item(&mut self, element: &E) -> bool
    where
        E: PartialEq,
    {
        match self.index_of(element) {
            Some(index) => self.remove(index).is_ok(),
            None => false,
        }
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

    /// Keeps only the elements for which `keep` returns `true`.
    ///
    /// Publishes one `Remove` per dropped element after the mutation,
    /// ascending, using the indices the elements had before it.
    pub fn retain(&mut self, mut keep: impl FnMut(&E) -> bool) -> bool {
        let offset = self.offset;
        let range = offset..offset + self.len();
        let mut removed = Vec::new();
        let mut position = offset;

        self.store.retain_range(range, |e| {
            let kept = keep(e);
            if !kept {
                removed.push(ListOperation::Remove {
                    index: position,
                    old: e.clone(),
                });
            }
            position += 1;
            kept
        });

        let changed = !removed.is_empty();
        self.sink.publish_all(removed);
        changed
    }

    /// Empties the view, publishing a `Remove` per former element in
    /// ascending order with pre-mutation indices.
    pub fn clear(&mut self) {
        let offset = self.offset;
        let drained = self.store.drain_range(offset..offset + self.len());
        self.sink.publish_all(
            drained
                .into_iter()
                .enumerate()
                .map(|(i, old)| ListOperation::Remove { index: offset + i, old }),
        );
    }

    // =========================================================================
    // DERIVED VIEWS
    // =========================================================================

    /// A view of local `from..to`.
    ///
    /// Its offset composes with this view's, and it only reaches the end of
    /// the list when `to` is this view's end and this view reaches it too.
    pub fn sub_list(&mut self, from: usize, to: usize) -> Result<ListView<'_, E, S>> {
        self.reborrow().into_sub_list(from, to)
    }

    /// A cursor positioned before the first element.
    pub fn cursor(&mut self) -> ListCursor<'_, E, S> {
        self.reborrow().into_cursor(0)
    }

    /// A cursor positioned before local `index`.
    pub fn cursor_at(&mut self, index: usize) -> Result<ListCursor<'_, E, S>> {
        self.check_cursor_index(index)?;
        Ok(self.reborrow().into_cursor(index))
    }

    pub(crate) fn into_sub_list(self, from: usize, to: usize) -> Result<ListView<'a, E, S>> {
        let len = self.len();
        if from > to || to > len {
            let err = CollectionError::InvalidRange { from, to, len };
            tracing::debug!(%err, "rejected sub-list");
            return Err(err);
        }

        Ok(ListView {
            store: self.store,
            sink: self.sink,
            offset: self.offset + from,
            tail: self.tail + (len - to),
            end_is_end: self.end_is_end && to == len,
        })
    }

    pub(crate) fn check_cursor_index(&self, index: usize) -> Result<()> {
        let len = self.len();
        if index > len {
            return Err(CollectionError::out_of_range(index, len));
        }
        Ok(())
    }

    pub(crate) fn into_cursor(self, index: usize) -> ListCursor<'a, E, S> {
        ListCursor {
            view: self,
            next: index,
            last: None,
        }
    }
}

impl<E, S> Extend<E> for ListView<'_, E, S>
where
    E: Clone + 'static,
    S: SequenceStore<E>,
{
    fn extend<I: IntoIterator<Item = E>>(&mut self, iter: I) {
        self.extend_from(iter);
    }
}

impl<E, S> std::fmt::Debug for ListView<'_, E, S>
where
    E: Clone + std::fmt::Debug + 'static,
    S: SequenceStore<E>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListView")
            .field("offset", &self.offset)
            .field("end_is_end", &self.end_is_end)
            .field("elements", &self.iter().collect::<Vec<_>>())
            .finish()
    }
}

// =============================================================================
// LIST CURSOR
// =============================================================================

/// A bidirectional cursor over a [`ListView`] that can insert, replace and
/// remove as it goes.
///
/// The cursor sits between elements. `next`/`previous` step over one
/// element and make it current; `set` and `remove` act on the current
/// element; `add` inserts at the cursor position and clears the current
/// element.
pub struct ListCursor<'a, E, S> {
    view: ListView<'a, E, S>,
    /// Local index of the element `next` would return.
    next: usize,
    /// Local index of the element last returned by `next`/`previous`.
    last: Option<usize>,
}

impl<E, S> ListCursor<'_, E, S>
where
    E: Clone + 'static,
    S: SequenceStore<E>,
{
    pub fn has_next(&self) -> bool {
        self.next < self.view.len()
    }

    pub fn has_previous(&self) -> bool {
        self.next > 0
    }

    pub fn next_index(&self) -> usize {
        self.next
    }

    pub fn previous_index(&self) -> Option<usize> {
        self.next.checked_sub(1)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<&E> {
        if !self.has_next() {
            return None;
        }
        let index = self.next;
        self.next += 1;
        self.last = Some(index);
        self.view.get(index)
    }

    pub fn previous(&mut self) -> Option<&E> {
        let index = self.next.checked_sub(1)?;
        self.next = index;
        self.last = Some(index);
        self.view.get(index)
    }

    /// Replaces the current element and publishes an `Update`.
    pub fn set(&mut self, element: E) -> Result<E> {
        let index = self.last.ok_or_else(CollectionError::invalid_state)?;
        self.view.set(index, element)
    }

    /// Inserts at the cursor position and publishes an `Add`. A following
    /// `next` is unaffected; a following `previous` returns the new element.
    pub fn add(&mut self, element: E) {
        let at_end = self.view.end_is_end && !self.has_next();
        let index = self.next;
        let start = self.view.offset;
        self.view.store.insert(start + index, element.clone());
        self.view.sink.publish(ListOperation::Add {
            index: start + index,
            at_end,
            element,
        });
        self.next += 1;
        self.last = None;
    }

    /// Removes the current element and publishes a `Remove`.
    pub fn remove(&mut self) -> Result<E> {
        let index = self.last.take().ok_or_else(CollectionError::invalid_state)?;
        let old = self.view.remove(index)?;
        if index < self.next {
            self.next -= 1;
        }
        Ok(old)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use ListOperation::{Add, Remove, Update};

    fn letters() -> (Vec<char>, ChangeSink<ListOperation<char>>) {
        (vec!['a', 'b', 'c', 'd', 'e'], ChangeSink::new())
    }

    #[test]
    fn sub_list_translates_indices() {
        let (mut store, sink) = letters();
        let mut changes = sink.stream();
        let mut whole = ListView::whole(&mut store, &sink);

        let mut sub = whole.sub_list(1, 4).unwrap();
        assert_eq!(sub.to_vec(), vec!['b', 'c', 'd']);
        assert_eq!(sub.remove(1), Ok('c'));
        assert_eq!(sub.len(), 2);

        assert_eq!(changes.drain(), vec![Remove { index: 2, old: 'c' }]);
        assert_eq!(store, vec!['a', 'b', 'd', 'e']);
    }

    #[test]
    fn nested_sub_lists_compose_offsets() {
        let (mut store, sink) = letters();
        let mut changes = sink.stream();
        let mut whole = ListView::whole(&mut store, &sink);

        let mut outer = whole.sub_list(1, 5).unwrap();
        assert!(outer.end_is_end());
        {
            let mut inner = outer.sub_list(2, 4).unwrap();
            assert_eq!(inner.offset(), 3);
            assert!(inner.end_is_end());
            inner.push('f');
            inner.set(0, 'D').unwrap();
        }
        // The outer view sees the inner insertion.
        assert_eq!(outer.len(), 5);

        assert_eq!(
            changes.drain(),
            vec![
                Add { index: 5, at_end: true, element: 'f' },
                Update { index: 3, old: 'd', element: 'D' },
            ]
        );
    }

    #[test]
    fn inner_window_never_reports_at_end() {
        let (mut store, sink) = letters();
        let mut changes = sink.stream();
        let mut whole = ListView::whole(&mut store, &sink);

        let mut sub = whole.sub_list(1, 3).unwrap();
        assert!(!sub.end_is_end());
        sub.push('x');
        sub.insert(3, 'y').unwrap();
        sub.extend_from(['z']);

        assert_eq!(
            changes.drain(),
            vec![
                Add { index: 3, at_end: false, element: 'x' },
                Add { index: 4, at_end: false, element: 'y' },
                Add { index: 5, at_end: false, element: 'z' },
            ]
        );
        assert_eq!(store, vec!['a', 'b', 'c', 'x', 'y', 'z', 'd', 'e']);
    }

    #[test]
    fn sub_list_rejects_bad_ranges() {
        let (mut store, sink) = letters();
        let mut whole = ListView::whole(&mut store, &sink);
        assert!(matches!(
            whole.sub_list(3, 2),
            Err(CollectionError::InvalidRange { from: 3, to: 2, len: 5 })
        ));
        assert!(whole.sub_list(0, 6).is_err());
        assert!(whole.sub_list(5, 5).is_ok());
    }

    #[test]
    fn out_of_range_access_is_rejected_without_events() {
        let (mut store, sink) = letters();
        let mut changes = sink.stream();
        let mut whole = ListView::whole(&mut store, &sink);
        let mut sub = whole.sub_list(0, 2).unwrap();

        assert_eq!(
            sub.set(2, 'x'),
            Err(CollectionError::IndexOutOfRange { index: 2, len: 2 })
        );
        assert!(sub.remove(7).is_err());
        assert!(sub.insert(3, 'x').is_err());
        assert!(sub.insert_all(3, ['x']).is_err());
        assert_eq!(sub.get(2), None);
        assert!(changes.drain().is_empty());
    }

    #[test]
    fn retain_on_window_uses_pre_mutation_indices() {
        let (mut store, sink) = letters();
        let mut changes = sink.stream();
        let mut whole = ListView::whole(&mut store, &sink);
        let mut sub = whole.sub_list(1, 4).unwrap();

        assert!(sub.retain_all(&['c']));
        assert_eq!(
            changes.drain(),
            vec![Remove { index: 1, old: 'b' }, Remove { index: 3, old: 'd' }]
        );
        assert_eq!(store, vec!['a', 'c', 'e']);
    }

    #[test]
    fn clear_on_window_only_clears_window() {
        let (mut store, sink) = letters();
        let mut changes = sink.stream();
        let mut whole = ListView::whole(&mut store, &sink);
        whole.sub_list(3, 5).unwrap().clear();

        assert_eq!(
            changes.drain(),
            vec![Remove { index: 3, old: 'd' }, Remove { index: 4, old: 'e' }]
        );
        assert_eq!(store, vec!['a', 'b', 'c']);
    }

    #[test]
    fn cursor_mutations_follow_the_cursor() {
        let (mut store, sink) = letters();
        let mut changes = sink.stream();
        let mut whole = ListView::whole(&mut store, &sink);
        let mut sub = whole.sub_list(1, 4).unwrap();
        let mut cursor = sub.cursor();

        assert_eq!(cursor.set('!'), Err(CollectionError::InvalidState));
        assert_eq!(cursor.next(), Some(&'b'));
        assert_eq!(cursor.set('B'), Ok('b'));
        cursor.add('x');
        assert_eq!(cursor.remove(), Err(CollectionError::InvalidState));
        assert_eq!(cursor.next(), Some(&'c'));
        assert_eq!(cursor.remove(), Ok('c'));
        assert_eq!(cursor.next_index(), 2);
        assert_eq!(cursor.previous(), Some(&'x'));
        assert_eq!(cursor.remove(), Ok('x'));

        assert_eq!(
            changes.drain(),
            vec![
                Update { index: 1, old: 'b', element: 'B' },
                Add { index: 2, at_end: false, element: 'x' },
                Remove { index: 3, old: 'c' },
                Remove { index: 2, old: 'x' },
            ]
        );
        assert_eq!(store, vec!['a', 'B', 'd', 'e']);
    }

    #[test]
    fn cursor_add_at_true_end_reports_at_end() {
        let (mut store, sink) = letters();
        let mut changes = sink.stream();
        let mut whole = ListView::whole(&mut store, &sink);
        let mut cursor = whole.cursor_at(4).unwrap();

        assert!(cursor.has_next());
        cursor.add('x');
        assert_eq!(cursor.next(), Some(&'e'));
        assert!(!cursor.has_next());
        cursor.add('y');

        assert_eq!(
            changes.drain(),
            vec![
                Add { index: 4, at_end: false, element: 'x' },
                Add { index: 6, at_end: true, element: 'y' },
            ]
        );
    }

    #[test]
    fn last_index_of_finds_final_match() {
        let mut store = vec![1, 2, 1, 2];
        let sink = ChangeSink::new();
        let mut whole = ListView::whole(&mut store, &sink);
        let sub = whole.sub_list(0, 3).unwrap();
        assert_eq!(sub.last_index_of(&2), Some(1));
        assert_eq!(sub.last_index_of(&1), Some(2));
        assert_eq!(sub.index_of(&9), None);
    }
}
