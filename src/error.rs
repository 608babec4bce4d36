#[derive(Eq, PartialEq, Debug, Clone, Copy, thiserror::Error)]
pub enum YDQueueError {
    /// the wait expired before the deque was ready
    #[error("timed out waiting on the deque")]
    Timeout,
    /// the deque was shut down before or during the call
    #[error("deque is closed")]
    Closed,
    /// peeked at an empty deque
    #[error("deque is empty")]
    EmptyQueue,
}

/// A rejected push. Hands the element back so the caller decides what to do with it.
#[derive(Eq, PartialEq, Debug, thiserror::Error)]
#[error("push rejected: {error}")]
pub struct YDPushError<T> {
    #[source]
    pub error: YDQueueError,
    pub element: T,
}

impl<T> YDPushError<T> {
    pub(crate) fn new(error: YDQueueError, element: T) -> Self {
        YDPushError { error, element }
    }

    pub fn error(&self) -> YDQueueError {
        self.error
    }

    /// Take back the element that could not be pushed.
    pub fn into_inner(self) -> T {
        self.element
    }
}
