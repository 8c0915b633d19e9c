// ============================================================================
// spark-observables - Change Operations
// The typed events each container publishes
// ============================================================================
//
// Every event carries both the pre- and post-mutation value at the affected
// position, so a subscriber never has to read the container back (it may
// have moved on by the time the event is observed).
// ============================================================================

use crate::store::{CollectionStore, MappingStore, SequenceStore};

// =============================================================================
// BAG OPERATION
// =============================================================================

/// A change to an unordered collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BagOperation<E> {
    /// `element` entered the collection.
    Put(E),
    /// The element left the collection.
    Remove(E),
}

impl<E> BagOperation<E> {
    /// The element the operation is about.
    pub fn element(&self) -> &E {
        match self {
            BagOperation::Put(element) | BagOperation::Remove(element) => element,
        }
    }

    /// Replays the operation onto another collection store.
    ///
    /// Returns whether the store changed.
    pub fn apply_to<S: CollectionStore<E>>(&self, store: &mut S) -> bool
    where
        E: Clone,
    {
        match self {
            BagOperation::Put(element) => store.insert(element.clone()),
            BagOperation::Remove(old) => store.remove(old),
        }
    }
}

// =============================================================================
// LIST OPERATION
// =============================================================================

/// An index-aware change to an ordered sequence.
///
/// Indices are always expressed in the coordinates of the top-level list,
/// whatever view the mutation went through.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ListOperation<E> {
    /// `element` was inserted at `index`. `at_end` is set when the insertion
    /// happened at the end of the emitting view and that view reaches the
    /// end of the list.
    Add {
        index: usize,
        at_end: bool,
        element: E,
    },
    /// The element at `index` was replaced.
    Update { index: usize, old: E, element: E },
    /// `old` was removed from `index`.
    Remove { index: usize, old: E },
}

impl<E> ListOperation<E> {
    pub fn index(&self) -> usize {
        match self {
            ListOperation::Add { index, .. }
            | ListOperation::Update { index, .. }
            | ListOperation::Remove { index, .. } => *index,
        }
    }

    /// Projects the operation onto the bag-compatible stream.
    ///
    /// `Update` splits into `Remove(old)` followed by `Put(element)`.
    pub fn to_bag_operations(self) -> impl Iterator<Item = BagOperation<E>> {
        let (first, second) = match self {
            ListOperation::Add { element, .. } => (BagOperation::Put(element), None),
            ListOperation::Update { old, element, .. } => {
                (BagOperation::Remove(old), Some(BagOperation::Put(element)))
            }
            ListOperation::Remove { old, .. } => (BagOperation::Remove(old), None),
        };
        std::iter::once(first).chain(second)
    }

    /// Replays the operation onto another sequence.
    ///
    /// Returns `false` (and leaves the sequence untouched) when the index
    /// does not fit.
    pub fn apply_to<S: SequenceStore<E>>(&self, store: &mut S) -> bool
    where
        E: Clone,
    {
        match self {
            ListOperation::Add { index, element, .. } if *index <= store.len() => {
                store.insert(*index, element.clone());
                true
            }
            ListOperation::Update { index, element, .. } if *index < store.len() => {
                store.replace(*index, element.clone());
                true
            }
            ListOperation::Remove { index, .. } if *index < store.len() => {
                store.remove(*index);
                true
            }
            _ => false,
        }
    }
}

// =============================================================================
// MAP OPERATION
// =============================================================================

/// A change to a key-value mapping.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MapOperation<K, V> {
    /// `key` had no value and now maps to `value`.
    Add { key: K, value: V },
    /// `key` moved from `old` to `value`.
    Update { key: K, old: V, value: V },
    /// `key` and its `old` value were removed.
    Remove { key: K, old: V },
}

impl<K, V> MapOperation<K, V> {
    pub fn key(&self) -> &K {
        match self {
            MapOperation::Add { key, .. }
            | MapOperation::Update { key, .. }
            | MapOperation::Remove { key, .. } => key,
        }
    }

    /// The value after the operation, `None` for removals.
    pub fn value(&self) -> Option<&V> {
        match self {
            MapOperation::Add { value, .. } | MapOperation::Update { value, .. } => Some(value),
            MapOperation::Remove { .. } => None,
        }
    }

    /// Replays the operation onto another mapping store.
    pub fn apply_to<S: MappingStore<K, V>>(&self, store: &mut S)
    where
        K: Clone,
        V: Clone,
    {
        match self {
            MapOperation::Add { key, value } | MapOperation::Update { key, value, .. } => {
                store.insert(key.clone(), value.clone());
            }
            MapOperation::Remove { key, .. } => {
                store.remove(key);
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
