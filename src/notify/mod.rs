// ============================================================================
// spark-observables - Notification
// Hot multicast sinks and the subscriber endpoints that read from them
// ============================================================================
//
// A container owns exactly one sink. Views borrow it and publish into it,
// so every access surface shares one ordered stream.
// ============================================================================

mod sink;
mod stream;

pub use sink::{ChangeSink, Subscription};
pub use stream::ChangeStream;
