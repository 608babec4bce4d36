/// What a push does when the deque is at its capacity limit.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum YDOverflowPolicy {
    /// Block the producer until a consumer frees space, the timeout expires, or the deque closes.
    BlockBackpressure,
    /// Never block. Evict from the end opposite to the insertion until the new element fits.
    DropOldest,
}

impl YDOverflowPolicy {
    /// Map the classic `push_block` flag onto a policy.
    pub fn from_push_block(push_block: bool) -> Self {
        if push_block {
            YDOverflowPolicy::BlockBackpressure
        } else {
            YDOverflowPolicy::DropOldest
        }
    }

    pub fn blocks_on_push(&self) -> bool {
        *self == YDOverflowPolicy::BlockBackpressure
    }
}

/// Construction-time settings of a [`YDBoundedDeque`](crate::YDBoundedDeque). Immutable once the deque
/// exists.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct YDDequeConfig {
    /// Maximum number of buffered elements. `0` means unbounded.
    pub capacity_limit: usize,
    pub overflow_policy: YDOverflowPolicy,
}

impl YDDequeConfig {
    pub fn new(capacity_limit: usize, overflow_policy: YDOverflowPolicy) -> Self {
        YDDequeConfig {
            capacity_limit,
            overflow_policy,
        }
    }

    /// Bounded deque whose producers wait for space.
    pub fn blocking(capacity_limit: usize) -> Self {
        Self::new(capacity_limit, YDOverflowPolicy::BlockBackpressure)
    }

    /// Bounded deque that evicts old elements to make room.
    pub fn drop_oldest(capacity_limit: usize) -> Self {
        Self::new(capacity_limit, YDOverflowPolicy::DropOldest)
    }

    /// No capacity limit. Memory use is bounded only by how fast consumers keep up.
    pub fn unbounded() -> Self {
        Self::new(0, YDOverflowPolicy::DropOldest)
    }

    pub fn is_bounded(&self) -> bool {
        self.capacity_limit > 0
    }
}

impl Default for YDDequeConfig {
    fn default() -> Self {
        Self::unbounded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_from_push_block() {
        assert_eq!(
            YDOverflowPolicy::from_push_block(true),
            YDOverflowPolicy::BlockBackpressure
        );
        assert_eq!(
            YDOverflowPolicy::from_push_block(false),
            YDOverflowPolicy::DropOldest
        );
        assert!(YDOverflowPolicy::BlockBackpressure.blocks_on_push());
        assert!(!YDOverflowPolicy::DropOldest.blocks_on_push());
    }

    #[test]
    fn named_constructors() {
        let config = YDDequeConfig::blocking(8);
        assert_eq!(config.capacity_limit, 8);
        assert_eq!(config.overflow_policy, YDOverflowPolicy::BlockBackpressure);
        assert!(config.is_bounded());

        let config = YDDequeConfig::drop_oldest(4);
        assert_eq!(config.overflow_policy, YDOverflowPolicy::DropOldest);

        let config = YDDequeConfig::default();
        assert_eq!(config, YDDequeConfig::unbounded());
        assert!(!config.is_bounded());
    }
}
