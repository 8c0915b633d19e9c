// ============================================================================
// spark-observables - SequenceStore
// Positional storage behind ObservableList and its sub-range views
// ============================================================================

use std::collections::VecDeque;
use std::ops::Range;

/// Storage contract behind an [`ObservableList`](crate::ObservableList).
///
/// Positional methods expect in-bounds indices; the list and its views
/// check bounds before calling into the store.
pub trait SequenceStore<E> {
    type Iter<'a>: Iterator<Item = &'a E>
    where
        Self: 'a,
        E: 'a;

    fn len(&self) -> usize;

    fn get(&self, index: usize) -> Option<&E>;

    /// Replaces the element at `index`, returning the previous one.
    fn replace(&mut self, index: usize, element: E) -> E;

    fn insert(&mut self, index: usize, element: E);

    fn remove(&mut self, index: usize) -> E;

    fn iter(&self) -> Self::Iter<'_>;

    /// Inserts `elements` in order starting at `index`.
    fn insert_many(&mut self, index: usize, elements: Vec<E>) {
        for (i, element) in elements.into_iter().enumerate() {
            self.insert(index + i, element);
        }
    }

    /// Removes and returns the elements in `range`, in order.
    fn drain_range(&mut self, range: Range<usize>) -> Vec<E> {
        let mut drained = Vec::with_capacity(range.len());
        for _ in range.clone() {
            drained.push(self.remove(range.start));
        }
        drained
    }

    /// Keeps only the elements of `range` for which `keep` returns `true`.
    ///
    /// `keep` is called exactly once per element of `range`, in order.
    /// Elements outside `range` are untouched.
    fn retain_range<F: FnMut(&E) -> bool>(&mut self, range: Range<usize>, mut keep: F) {
        let mut index = range.start;
        let mut end = range.end;
        while index < end {
            let kept = self.get(index).is_none_or(&mut keep);
            if kept {
                index += 1;
            } else {
                self.remove(index);
                end -= 1;
            }
        }
    }
}

impl<E> SequenceStore<E> for Vec<E> {
    type Iter<'a>
        = std::slice::Iter<'a, E>
    where
        Self: 'a,
        E: 'a;

    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn get(&self, index: usize) -> Option<&E> {
        self.as_slice().get(index)
    }

    fn replace(&mut self, index: usize, element: E) -> E {
        std::mem::replace(&mut self[index], element)
    }

    fn insert(&mut self, index: usize, element: E) {
        Vec::insert(self, index, element)
    }

    fn remove(&mut self, index: usize) -> E {
        Vec::remove(self, index)
    }

    fn iter(&self) -> Self::Iter<'_> {
        self.as_slice().iter()
    }

    fn insert_many(&mut self, index: usize, elements: Vec<E>) {
        self.splice(index..index, elements);
    }

    fn drain_range(&mut self, range: Range<usize>) -> Vec<E> {
        self.drain(range).collect()
    }

    fn retain_range<F: FnMut(&E) -> bool>(&mut self, range: Range<usize>, keep: F) {
        let tail = self.split_off(range.end);
        let mut middle = self.split_off(range.start);
        middle.retain(keep);
        self.append(&mut middle);
        self.extend(tail);
    }
}

impl<E> SequenceStore<E> for VecDeque<E> {
    type Iter<'a>
        = std::collections::vec_deque::Iter<'a, E>
    where
        Self: 'a,
        E: 'a;

    fn len(&self) -> usize {
        VecDeque::len(self)
    }

    fn get(&self, index: usize) -> Option<&E> {
        VecDeque::get(self, index)
    }

    fn replace(&mut self, index: usize, element: E) -> E {
        std::mem::replace(&mut self[index], element)
    }

    fn insert(&mut self, index: usize, element: E) {
        VecDeque::insert(self, index, element)
    }

    fn remove(&mut self, index: usize) -> E {
        // Callers check bounds, so the slot is occupied.
        match VecDeque::remove(self, index) {
            Some(element) => element,
            None => unreachable!("index {index} checked by caller"),
        }
    }

    fn iter(&self) -> Self::Iter<'_> {
        VecDeque::iter(self)
    }

    fn drain_range(&mut self, range: Range<usize>) -> Vec<E> {
        self.drain(range).collect()
    }
}
