// Common utilities for tests, benches and demos

use std::time::{Duration, Instant};

/// How long to give a freshly spawned thread to reach its blocking call.
pub const SETTLE_TIME: Duration = Duration::from_millis(50);

pub fn message_for(id: u32) -> String {
    format!("hello-{id}")
}

pub fn id_from_message(message: &str) -> u32 {
    let id_str = match message.strip_prefix("hello-") {
        Some(s) => s,
        None => panic!("bad message: {message}"),
    };
    match id_str.parse() {
        Ok(id) => id,
        Err(e) => panic!("couldn't parse message id, err: {:?} message: {}", e, message),
    }
}

/// Sleep long enough that another thread is most likely parked in a wait.
pub fn settle() {
    std::thread::sleep(SETTLE_TIME);
}

/// Spin, then yield, then sleep, depending on how many times in a row we found nothing to do.
pub fn backoff(attempt: &mut u32) {
    if *attempt < 16 {
        std::hint::spin_loop();
    } else if *attempt < 64 {
        std::thread::yield_now();
    } else {
        std::thread::sleep(Duration::from_micros(50));
    }
    *attempt = attempt.saturating_add(1);
}

pub fn assert_elapsed_at_least(start: Instant, min: Duration) {
    let elapsed = start.elapsed();
    assert!(
        elapsed >= min,
        "returned after {elapsed:?}, expected at least {min:?}"
    );
}

/// Panic if `deadline` has passed, so a broken wakeup fails the test instead of hanging it.
pub fn check_deadline(deadline: Instant, what: &str) {
    if Instant::now() > deadline {
        panic!("{what} timed out");
    }
}
