/// the double-ended blocking queue
pub mod deque;
pub use deque::YDBoundedDeque;
pub use deque::WAIT_FOREVER;

/// construction-time settings
pub mod config;
pub use config::YDDequeConfig;
pub use config::YDOverflowPolicy;

/// the errors
pub mod error;
pub use error::YDPushError;
pub use error::YDQueueError;

/// utils for internal usage
mod utils;
