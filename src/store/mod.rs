// ============================================================================
// spark-observables - Backing Stores
// The narrow storage contracts the observable containers are written against
// ============================================================================
//
// Any conforming set, bag, sequence or mapping can back a container. The
// containers never reach past these traits, so swapping a HashSet for a
// BTreeSet (or a Vec for a VecDeque) changes storage but not the events.
// ============================================================================

mod collection;
mod mapping;
mod sequence;

pub use collection::CollectionStore;
pub use mapping::MappingStore;
pub use sequence::SequenceStore;
