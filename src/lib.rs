// ============================================================================
// spark-observables - Observable Collections for Rust
// ============================================================================
//
// Bags, lists and maps that behave like their backing store for reads and
// writes, and publish an ordered stream of change operations for every
// mutation, including mutations made through sub-lists, key sets, value
// collections, entry sets and cursors.
// ============================================================================

pub mod collections;
pub mod core;
pub mod notify;
pub mod store;

// Re-export core items at crate root for ergonomic access
pub use crate::core::error::{CollectionError, Result};
pub use crate::core::operation::{BagOperation, ListOperation, MapOperation};
pub use crate::core::shared::MaybeSend;

// Re-export the notification plumbing
pub use notify::{ChangeSink, ChangeStream, Subscription};

// Re-export the backing-store contracts
pub use store::{CollectionStore, MappingStore, SequenceStore};

// Re-export collections, views and cursors
pub use collections::{
    BagCursor, EntryCursor, EntryMut, EntrySet, KeyCursor, KeySet, ListCursor, ListView,
    ObservableBag, ObservableCollection, ObservableList, ObservableMap, ValueCursor, Values,
};

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_without_subscribers_are_dropped() {
        let mut bag: ObservableBag<u8> = ObservableBag::new();
        bag.insert(1);

        let mut late = bag.changes();
        bag.insert(2);
        assert_eq!(late.drain(), vec![BagOperation::Put(2)]);
    }

    #[test]
    fn every_subscriber_sees_every_event_once() {
        let mut list: ObservableList<u8> = ObservableList::new();
        let mut first = list.list_changes();
        let mut second = list.list_changes();

        list.push(1);
        list.push(2);
        assert_eq!(first.drain(), second.drain());
        assert!(first.is_empty() && second.is_empty());
    }

    #[test]
    fn dropped_stream_stops_receiving() {
        let mut map: ObservableMap<u8, u8> = ObservableMap::new();
        let stream = map.changes();
        assert!(stream.is_attached());
        drop(stream);

        let mut kept = map.changes();
        map.insert(1, 1);
        assert_eq!(kept.drain(), vec![MapOperation::Add { key: 1, value: 1 }]);
    }
}
