// ============================================================================
// spark-observables - Observable Collections
// Bags, lists and maps that publish an ordered change stream
// ============================================================================
//
// Every container owns its backing store and one ChangeSink. Views and
// cursors borrow both, so a mutation through any surface publishes on the
// container's single stream, in call order, before the call returns.
// ============================================================================

mod bag;
mod list;
mod list_view;
mod map;
mod map_views;

pub use bag::{BagCursor, ObservableBag};
pub use list::ObservableList;
pub use list_view::{ListCursor, ListView};
pub use map::ObservableMap;
pub use map_views::{EntryCursor, EntryMut, EntrySet, KeyCursor, KeySet, ValueCursor, Values};

use crate::core::operation::BagOperation;
use crate::notify::ChangeStream;

/// Read and notification contract shared by bags and lists.
///
/// Lists publish their bag projection here: an `Update` arrives as a
/// `Remove` of the old element followed by a `Put` of the new one.
pub trait ObservableCollection<E> {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn contains(&self, element: &E) -> bool;

    /// Operations published after this call.
    fn changes(&self) -> ChangeStream<BagOperation<E>>;

    /// One `Put` per current element, then live operations.
    fn changes_with_snapshot(&self) -> ChangeStream<BagOperation<E>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mirror<C: ObservableCollection<u8>>(collection: &C) -> Vec<BagOperation<u8>> {
        collection.changes_with_snapshot().drain()
    }

    #[test]
    fn bag_and_list_share_the_collection_contract() {
        let bag: ObservableBag<u8, Vec<u8>> = ObservableBag::from_iter([1, 2]);
        let list: ObservableList<u8> = ObservableList::from_iter([1, 2]);

        assert_eq!(mirror(&bag), mirror(&list));
        assert_eq!(mirror(list.as_read_only()), vec![BagOperation::Put(1), BagOperation::Put(2)]);
        assert!(!ObservableCollection::is_empty(bag.as_read_only()));
    }
}
