// ============================================================================
// spark-observables - CollectionStore
// Unordered storage: sets (deduplicating) and Vec (multiset)
// ============================================================================

use std::collections::{BTreeSet, HashSet};
use std::hash::{BuildHasher, Hash};

/// Storage contract behind an [`ObservableBag`](crate::ObservableBag).
///
/// `insert` and `remove` report whether the contents changed; that report
/// is what decides whether an event is published.
pub trait CollectionStore<E> {
    type Iter<'a>: Iterator<Item = &'a E>
    where
        Self: 'a,
        E: 'a;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn contains(&self, element: &E) -> bool;

    /// Inserts `element`, returning `true` if the contents changed.
    fn insert(&mut self, element: E) -> bool;

    /// Removes one occurrence of `element`, returning `true` if found.
    fn remove(&mut self, element: &E) -> bool;

    /// Keeps only the elements for which `keep` returns `true`.
    ///
    /// `keep` is called exactly once per element, in iteration order.
    fn retain<F: FnMut(&E) -> bool>(&mut self, keep: F);

    fn clear(&mut self);

    fn iter(&self) -> Self::Iter<'_>;
}

impl<E, S> CollectionStore<E> for HashSet<E, S>
where
    E: Eq + Hash,
    S: BuildHasher,
{
    type Iter<'a>
        = std::collections::hash_set::Iter<'a, E>
    where
        Self: 'a,
        E: 'a;

    fn len(&self) -> usize {
        HashSet::len(self)
    }

    fn contains(&self, element: &E) -> bool {
        HashSet::contains(self, element)
    }

    fn insert(&mut self, element: E) -> bool {
        HashSet::insert(self, element)
    }

    fn remove(&mut self, element: &E) -> bool {
        HashSet::remove(self, element)
    }

    fn retain<F: FnMut(&E) -> bool>(&mut self, keep: F) {
        HashSet::retain(self, keep)
    }

    fn clear(&mut self) {
        HashSet::clear(self)
    }

    fn iter(&self) -> Self::Iter<'_> {
        HashSet::iter(self)
    }
}

impl<E: Ord> CollectionStore<E> for BTreeSet<E> {
    type Iter<'a>
        = std::collections::btree_set::Iter<'a, E>
    where
        Self: 'a,
        E: 'a;

    fn len(&self) -> usize {
        BTreeSet::len(self)
    }

    fn contains(&self, element: &E) -> bool {
        BTreeSet::contains(self, element)
    }

    fn insert(&mut self, element: E) -> bool {
        BTreeSet::insert(self, element)
    }

    fn remove(&mut self, element: &E) -> bool {
        BTreeSet::remove(self, element)
    }

    fn retain<F: FnMut(&E) -> bool>(&mut self, keep: F) {
        BTreeSet::retain(self, keep)
    }

    fn clear(&mut self) {
        BTreeSet::clear(self)
    }

    fn iter(&self) -> Self::Iter<'_> {
        BTreeSet::iter(self)
    }
}

/// A `Vec` used as a multiset: every insert succeeds, removal takes the
/// first equal element.
impl<E: PartialEq> CollectionStore<E> for Vec<E> {
    type Iter<'a>
        = std::slice::Iter<'a, E>
    where
        Self: 'a,
        E: 'a;

    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn contains(&self, element: &E) -> bool {
        self.as_slice().contains(element)
    }

    fn insert(&mut self, element: E) -> bool {
        self.push(element);
        true
    }

    fn remove(&mut self, element: &E) -> bool {
        match self.iter().position(|e| e == element) {
            Some(pos) => {
                Vec::remove(self, pos);
                true
            }
            None => false,
        }
    }

    fn retain<F: FnMut(&E) -> bool>(&mut self, keep: F) {
        Vec::retain(self, keep)
    }

    fn clear(&mut self) {
        Vec::clear(self)
    }

    fn iter(&self) -> Self::Iter<'_> {
        self.as_slice().iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn churn<S: CollectionStore<u32> + Default>() -> S {
        let mut store = S::default();
        store.insert(1);
        store.insert(2);
        store.insert(2);
        store.remove(&1);
        store
    }

    #[test]
    fn sets_deduplicate() {
        let set: HashSet<u32> = churn();
        assert_eq!(CollectionStore::len(&set), 1);
        let tree: BTreeSet<u32> = churn();
        assert_eq!(CollectionStore::iter(&tree).copied().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn vec_keeps_duplicates() {
        let bag: Vec<u32> = churn();
        assert_eq!(bag, vec![2, 2]);
    }

    #[test]
    fn vec_remove_takes_first_match_only() {
        let mut bag = vec![3, 1, 3];
        assert!(CollectionStore::remove(&mut bag, &3));
        assert_eq!(bag, vec![1, 3]);
        assert!(!CollectionStore::remove(&mut bag, &9));
    }
}
