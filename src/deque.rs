use std::{
    collections::VecDeque,
    sync::{Condvar, Mutex, MutexGuard},
    time::Duration,
};

use crate::utils::{self, YDDequeEnd};
use crate::{YDDequeConfig, YDOverflowPolicy, YDPushError, YDQueueError};

/// Pass as `timeout` to wait until the operation succeeds or the deque is shut down.
pub const WAIT_FOREVER: Duration = Duration::ZERO;

/// everything guarded by the deque lock
struct YDDequeState<T> {
    buffer: VecDeque<T>,
    active: bool,
}

/// Mutex and CondVar backed double-ended hand-off queue.
///
/// Producers insert at either end with [`push_back`](Self::push_back) / [`push_front`](Self::push_front)
/// and consumers remove from either end with [`pop_front`](Self::pop_front) /
/// [`pop_back`](Self::pop_back). What happens at the capacity limit is fixed at construction by the
/// [`YDOverflowPolicy`]: producers either wait for space or evict the oldest element from the far end.
///
/// [`shutdown`](Self::shutdown) empties the deque, wakes every waiter and makes all later transfers fail
/// with [`YDQueueError::Closed`]. It runs automatically on drop.
///
/// The deque is not `Clone`. Share it between threads by reference or through an `Arc`.
pub struct YDBoundedDeque<T> {
    config: YDDequeConfig,
    state: Mutex<YDDequeState<T>>,
    /// consumers wait here for an element
    item_available: Condvar,
    /// producers wait here for space (backpressure policy only)
    space_available: Condvar,
}

impl<T> YDBoundedDeque<T> {
    /// Create an empty, active deque.
    ///
    /// # Arguments
    /// * `config` - Capacity limit and overflow policy. A capacity limit of `0` makes the deque unbounded,
    ///   which is logged as a warning since nothing then limits memory growth.
    ///
    /// # Examples
    /// ```
    /// use yep_deque::{YDBoundedDeque, YDDequeConfig};
    ///
    /// let deque: YDBoundedDeque<u32> = YDBoundedDeque::new(YDDequeConfig::blocking(16));
    /// assert_eq!(deque.capacity(), 16);
    /// assert!(deque.is_empty());
    /// ```
    pub fn new(config: YDDequeConfig) -> Self {
        log::info!(
            "bounded deque capacity: {}, overflow policy: {:?}",
            config.capacity_limit,
            config.overflow_policy
        );
        if !config.is_bounded() {
            log::warn!("bounded deque created with capacity limit 0, memory use is unbounded");
        }

        let buffer = if config.is_bounded() {
            VecDeque::with_capacity(config.capacity_limit)
        } else {
            VecDeque::new()
        };

        YDBoundedDeque {
            config,
            state: Mutex::new(YDDequeState {
                buffer,
                active: true,
            }),
            item_available: Condvar::new(),
            space_available: Condvar::new(),
        }
    }

    /// Shorthand for [`new`](Self::new) with a config built from its two fields.
    pub fn with_capacity(capacity_limit: usize, overflow_policy: YDOverflowPolicy) -> Self {
        Self::new(YDDequeConfig::new(capacity_limit, overflow_policy))
    }

    /// Insert `element` at the back.
    ///
    /// # Arguments
    /// * `element` - The value to insert.
    /// * `timeout` - How long to wait for space under [`YDOverflowPolicy::BlockBackpressure`].
    ///   [`WAIT_FOREVER`] waits until space frees up or the deque closes. Ignored by
    ///   [`YDOverflowPolicy::DropOldest`], which evicts from the front instead of waiting.
    ///
    /// # Returns
    /// `Ok(())` once the element is in the deque. One waiting consumer is woken.
    ///
    /// # Errors
    /// `YDQueueError::Closed` if the deque is or becomes shut down, `YDQueueError::Timeout` if the
    /// deque stayed full for the whole `timeout`. The element is handed back in the error.
    ///
    /// # Examples
    /// ```
    /// use std::time::Duration;
    /// use yep_deque::{YDBoundedDeque, YDDequeConfig, YDQueueError, WAIT_FOREVER};
    ///
    /// let deque = YDBoundedDeque::new(YDDequeConfig::blocking(1));
    /// deque.push_back(1, WAIT_FOREVER).unwrap();
    ///
    /// let err = deque.push_back(2, Duration::from_millis(1)).unwrap_err();
    /// assert_eq!(err.error(), YDQueueError::Timeout);
    /// assert_eq!(err.into_inner(), 2);
    /// ```
    pub fn push_back(&self, element: T, timeout: Duration) -> Result<(), YDPushError<T>> {
        self.push(YDDequeEnd::Back, element, timeout)
    }

    /// Insert `element` at the front. Same contract as [`push_back`](Self::push_back), except that
    /// [`YDOverflowPolicy::DropOldest`] evicts from the back.
    pub fn push_front(&self, element: T, timeout: Duration) -> Result<(), YDPushError<T>> {
        self.push(YDDequeEnd::Front, element, timeout)
    }

    /// Remove and return the front element, waiting for one to arrive.
    ///
    /// # Arguments
    /// * `timeout` - How long to wait while the deque is empty. [`WAIT_FOREVER`] waits until an element
    ///   arrives or the deque closes.
    ///
    /// # Returns
    /// The removed element. Under [`YDOverflowPolicy::BlockBackpressure`] one waiting producer is woken.
    ///
    /// # Errors
    /// `YDQueueError::Closed` if the deque is or becomes shut down, `YDQueueError::Timeout` if it stayed
    /// empty for the whole `timeout`.
    ///
    /// # Examples
    /// ```
    /// use std::time::Duration;
    /// use yep_deque::{YDBoundedDeque, YDDequeConfig, YDQueueError, WAIT_FOREVER};
    ///
    /// let deque = YDBoundedDeque::new(YDDequeConfig::blocking(4));
    /// assert_eq!(
    ///     deque.pop_front(Duration::from_millis(1)).unwrap_err(),
    ///     YDQueueError::Timeout
    /// );
    ///
    /// deque.push_back("a", WAIT_FOREVER).unwrap();
    /// deque.push_back("b", WAIT_FOREVER).unwrap();
    /// assert_eq!(deque.pop_front(WAIT_FOREVER).unwrap(), "a");
    /// ```
    pub fn pop_front(&self, timeout: Duration) -> Result<T, YDQueueError> {
        self.pop(YDDequeEnd::Front, timeout)
    }

    /// Remove and return the back element. Same contract as [`pop_front`](Self::pop_front).
    pub fn pop_back(&self, timeout: Duration) -> Result<T, YDQueueError> {
        self.pop(YDDequeEnd::Back, timeout)
    }

    /// Close the deque for good.
    ///
    /// Drops every buffered element, wakes all blocked producers and consumers (they fail with
    /// `YDQueueError::Closed`) and makes every later push or pop fail immediately. Calling it again is a
    /// no-op.
    pub fn shutdown(&self) {
        let drained = {
            let mut state = self.lock();
            if state.active {
                log::debug!(
                    "shutting down bounded deque, dropping {} buffered elements",
                    state.buffer.len()
                );
            }
            state.active = false;
            std::mem::take(&mut state.buffer)
        };

        self.space_available.notify_all();
        self.item_available.notify_all();
        drop(drained);
    }

    /// Whether [`shutdown`](Self::shutdown) has run.
    pub fn is_closed(&self) -> bool {
        !self.lock().active
    }

    /// Number of buffered elements.
    pub fn len(&self) -> usize {
        self.lock().buffer.len()
    }

    /// Whether no element is buffered.
    pub fn is_empty(&self) -> bool {
        self.lock().buffer.is_empty()
    }

    /// Whether a push would have to wait or evict. An unbounded deque is never full.
    pub fn is_full(&self) -> bool {
        self.config.is_bounded() && self.len() >= self.config.capacity_limit
    }

    /// The capacity limit, `0` for an unbounded deque.
    pub fn capacity(&self) -> usize {
        self.config.capacity_limit
    }

    /// What a push does when the deque is full.
    pub fn overflow_policy(&self) -> YDOverflowPolicy {
        self.config.overflow_policy
    }

    /// The config the deque was built with.
    pub fn config(&self) -> &YDDequeConfig {
        &self.config
    }

    /// Drop every buffered element without closing the deque.
    ///
    /// Under [`YDOverflowPolicy::BlockBackpressure`] all producers waiting for space are woken.
    pub fn clear(&self) {
        let drained = std::mem::take(&mut self.lock().buffer);

        if self.config.overflow_policy.blocks_on_push() {
            self.space_available.notify_all();
        }
        drop(drained);
    }

    fn lock(&self) -> MutexGuard<'_, YDDequeState<T>> {
        utils::lock(&self.state)
    }

    fn push(&self, end: YDDequeEnd, element: T, timeout: Duration) -> Result<(), YDPushError<T>> {
        let mut state = self.lock();
        if !state.active {
            return Err(YDPushError::new(YDQueueError::Closed, element));
        }

        let evicted = match self.config.overflow_policy {
            YDOverflowPolicy::BlockBackpressure => {
                state = match self.wait_for_space(state, timeout) {
                    Ok(state) => state,
                    Err(error) => return Err(YDPushError::new(error, element)),
                };
                Vec::new()
            }
            YDOverflowPolicy::DropOldest => self.evict_for(&mut state, end),
        };

        end.push(&mut state.buffer, element);
        drop(state);

        self.item_available.notify_one();
        drop(evicted);
        Ok(())
    }

    fn wait_for_space<'a>(
        &self,
        state: MutexGuard<'a, YDDequeState<T>>,
        timeout: Duration,
    ) -> Result<MutexGuard<'a, YDDequeState<T>>, YDQueueError> {
        let capacity_limit = self.config.capacity_limit;
        let (state, timed_out) =
            utils::wait_while(&self.space_available, state, timeout, |state| {
                state.active && capacity_limit != 0 && state.buffer.len() >= capacity_limit
            });

        if !state.active {
            return Err(YDQueueError::Closed);
        }
        if timed_out {
            return Err(YDQueueError::Timeout);
        }
        Ok(state)
    }

    /// Make room for one element pushed at `end`. Returns the evicted elements so they are dropped
    /// outside the lock.
    fn evict_for(&self, state: &mut YDDequeState<T>, end: YDDequeEnd) -> Vec<T> {
        let mut evicted = Vec::new();
        if !self.config.is_bounded() {
            return evicted;
        }

        while state.buffer.len() >= self.config.capacity_limit {
            match end.opposite().pop(&mut state.buffer) {
                Some(element) => evicted.push(element),
                None => break,
            }
        }

        if !evicted.is_empty() {
            log::trace!("evicted {} elements from the {:?}", evicted.len(), end.opposite());
        }
        evicted
    }

    fn pop(&self, end: YDDequeEnd, timeout: Duration) -> Result<T, YDQueueError> {
        let state = self.lock();
        let (mut state, timed_out) =
            utils::wait_while(&self.item_available, state, timeout, |state| {
                state.active && state.buffer.is_empty()
            });

        // shutdown wins over leftovers
        if !state.active {
            return Err(YDQueueError::Closed);
        }
        if timed_out {
            return Err(YDQueueError::Timeout);
        }

        let element = end.pop(&mut state.buffer).ok_or(YDQueueError::EmptyQueue)?;
        drop(state);

        if self.config.overflow_policy.blocks_on_push() {
            self.space_available.notify_one();
        }
        Ok(element)
    }
}

impl<T: Clone> YDBoundedDeque<T> {
    /// Copy of the front element.
    ///
    /// # Errors
    /// `YDQueueError::EmptyQueue` when there is nothing to look at.
    pub fn front(&self) -> Result<T, YDQueueError> {
        self.peek(YDDequeEnd::Front)
    }

    /// Copy of the back element.
    ///
    /// # Errors
    /// `YDQueueError::EmptyQueue` when there is nothing to look at.
    pub fn back(&self) -> Result<T, YDQueueError> {
        self.peek(YDDequeEnd::Back)
    }

    fn peek(&self, end: YDDequeEnd) -> Result<T, YDQueueError> {
        let state = self.lock();
        end.peek(&state.buffer)
            .cloned()
            .ok_or(YDQueueError::EmptyQueue)
    }
}

impl<T> Default for YDBoundedDeque<T> {
    fn default() -> Self {
        Self::new(YDDequeConfig::default())
    }
}

impl<T> Drop for YDBoundedDeque<T> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
