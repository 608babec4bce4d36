use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Which end of the buffer an operation targets.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub(crate) enum YDDequeEnd {
    Front,
    Back,
}

impl YDDequeEnd {
    pub(crate) fn opposite(self) -> YDDequeEnd {
        match self {
            YDDequeEnd::Front => YDDequeEnd::Back,
            YDDequeEnd::Back => YDDequeEnd::Front,
        }
    }

    pub(crate) fn push<T>(self, buffer: &mut VecDeque<T>, element: T) {
        match self {
            YDDequeEnd::Front => buffer.push_front(element),
            YDDequeEnd::Back => buffer.push_back(element),
        }
    }

    pub(crate) fn pop<T>(self, buffer: &mut VecDeque<T>) -> Option<T> {
        match self {
            YDDequeEnd::Front => buffer.pop_front(),
            YDDequeEnd::Back => buffer.pop_back(),
        }
    }

    pub(crate) fn peek<T>(self, buffer: &VecDeque<T>) -> Option<&T> {
        match self {
            YDDequeEnd::Front => buffer.front(),
            YDDequeEnd::Back => buffer.back(),
        }
    }
}

/// Lock `mutex`, taking over the state if a previous holder panicked. Every mutation under the deque
/// lock completes before control returns to user code, so the state is consistent either way.
pub(crate) fn lock<S>(mutex: &Mutex<S>) -> MutexGuard<'_, S> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Block on `condvar` while `blocked` holds. A zero `timeout` waits indefinitely.
///
/// Returns the reacquired guard and whether the wait gave up with `blocked` still true.
pub(crate) fn wait_while<'a, S, F>(
    condvar: &Condvar,
    guard: MutexGuard<'a, S>,
    timeout: Duration,
    blocked: F,
) -> (MutexGuard<'a, S>, bool)
where
    F: FnMut(&mut S) -> bool,
{
    if timeout.is_zero() {
        let guard = condvar
            .wait_while(guard, blocked)
            .unwrap_or_else(PoisonError::into_inner);
        (guard, false)
    } else {
        let (guard, result) = condvar
            .wait_timeout_while(guard, timeout, blocked)
            .unwrap_or_else(PoisonError::into_inner);
        (guard, result.timed_out())
    }
}
