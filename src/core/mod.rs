// ============================================================================
// spark-observables - Core Module
// Errors, operation types and the shared-cell abstraction
// ============================================================================

pub mod error;
pub mod operation;
pub mod shared;

pub use error::{CollectionError, Result};
pub use operation::{BagOperation, ListOperation, MapOperation};
pub use shared::MaybeSend;
