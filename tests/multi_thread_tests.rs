#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Barrier, Mutex};
    use std::time::{Duration, Instant};

    use test_support::utils::{check_deadline, id_from_message, message_for, settle};
    use yep_deque::{YDBoundedDeque, YDDequeConfig, YDQueueError, WAIT_FOREVER};

    const LONG_TIMEOUT: Duration = Duration::from_secs(10);

    #[test]
    /**
     * One producer and one consumer hand off through a single-slot blocking deque. The consumer must
     * see every value in order, and the producer never sees more than one unconsumed element.
     */
    fn single_slot_handoff_test() {
        let num_messages: u32 = 10_000;
        let deque: YDBoundedDeque<String> = YDBoundedDeque::new(YDDequeConfig::blocking(1));

        std::thread::scope(|s| {
            // consumer thread
            s.spawn(|| {
                for expected in 0..num_messages {
                    let message = deque.pop_front(LONG_TIMEOUT).expect("consume");
                    assert_eq!(
                        id_from_message(&message),
                        expected,
                        "consumed data out of order"
                    );
                }
            });

            // producer thread
            s.spawn(|| {
                for id in 0..num_messages {
                    deque
                        .push_back(message_for(id), LONG_TIMEOUT)
                        .expect("produce");
                    assert!(deque.len() <= 1, "more than one outstanding element");
                }
            });
        });

        assert!(deque.is_empty());
    }

    #[test]
    /**
     * Multiple producers and consumers on a small blocking deque. Every message is received exactly
     * once and the capacity limit is never exceeded.
     */
    fn multi_produce_consume_test() {
        let capacity: usize = 8;
        let max_messages: u32 = 20_000;
        let num_producers: u16 = 4;
        let num_consumers: u16 = 4;

        let deque: YDBoundedDeque<String> = YDBoundedDeque::new(YDDequeConfig::blocking(capacity));
        let produce_counter = AtomicU32::new(0);
        let received_ids = Mutex::new(HashSet::<u32>::new());
        let deadline = Instant::now() + LONG_TIMEOUT;

        std::thread::scope(|s| {
            // start consumers
            for i in 0..num_consumers {
                let builder = std::thread::Builder::new().name(format!("consumer_{}", i));
                let deque = &deque;
                let received_ids = &received_ids;
                builder
                    .spawn_scoped(s, move || loop {
                        match deque.pop_front(Duration::from_millis(100)) {
                            Ok(message) => {
                                let id = id_from_message(&message);
                                assert!(id < max_messages, "received id out of range: {}", id);
                                assert!(
                                    received_ids.lock().unwrap().insert(id),
                                    "duplicate message received: {}",
                                    message
                                );
                            }
                            // producers are done and the deque has been shut down
                            Err(YDQueueError::Closed) => break,
                            Err(YDQueueError::Timeout) => {}
                            Err(e) => panic!("unexpected error when consuming: {:?}", e),
                        }
                        check_deadline(deadline, "consumer");
                    })
                    .unwrap();
            }

            // start producers
            let producers: Vec<_> = (0..num_producers)
                .map(|i| {
                    let builder = std::thread::Builder::new().name(format!("producer_{}", i));
                    let deque = &deque;
                    let counter = &produce_counter;
                    builder
                        .spawn_scoped(s, move || {
                            let mut id = counter.fetch_add(1, Ordering::AcqRel);
                            while id < max_messages {
                                deque
                                    .push_back(message_for(id), LONG_TIMEOUT)
                                    .expect("produce");
                                assert!(deque.len() <= capacity);
                                id = counter.fetch_add(1, Ordering::AcqRel);
                            }
                        })
                        .unwrap()
                })
                .collect();

            for producer in producers {
                producer.join().expect("producer panicked");
            }

            // wait for the consumers to drain, then release them
            while !deque.is_empty() {
                check_deadline(deadline, "drain");
                std::thread::yield_now();
            }
            while received_ids.lock().unwrap().len() < max_messages as usize {
                check_deadline(deadline, "receive");
                std::thread::yield_now();
            }
            deque.shutdown();
        });

        let received_ids = received_ids.lock().unwrap();
        assert_eq!(received_ids.len(), max_messages as usize);
        for i in 0..max_messages {
            assert!(received_ids.contains(&i), "missing received id: {}", i);
        }
    }

    #[test]
    /**
     * A producer blocked on a full deque proceeds as soon as a consumer pops.
     */
    fn pop_wakes_blocked_producer_test() {
        let deque = YDBoundedDeque::new(YDDequeConfig::blocking(1));
        deque.push_back(0, WAIT_FOREVER).unwrap();

        std::thread::scope(|s| {
            let producer = s.spawn(|| {
                let start = Instant::now();
                deque.push_back(1, LONG_TIMEOUT).expect("woken producer should push");
                start.elapsed()
            });

            settle();
            assert_eq!(deque.pop_front(LONG_TIMEOUT).unwrap(), 0);

            let waited = producer.join().expect("producer panicked");
            assert!(waited < LONG_TIMEOUT);
        });

        assert_eq!(deque.pop_front(LONG_TIMEOUT).unwrap(), 1);
    }

    #[test]
    /**
     * clear() on a blocking deque wakes a producer waiting for space.
     */
    fn clear_wakes_blocked_producer_test() {
        let deque = YDBoundedDeque::new(YDDequeConfig::blocking(2));
        deque.push_back(0, WAIT_FOREVER).unwrap();
        deque.push_back(1, WAIT_FOREVER).unwrap();

        std::thread::scope(|s| {
            let producer = s.spawn(|| {
                let start = Instant::now();
                let result = deque.push_front(2, LONG_TIMEOUT).map_err(|e| e.error());
                (result, start.elapsed())
            });

            settle();
            deque.clear();

            let (result, waited) = producer.join().expect("producer panicked");
            assert_eq!(result, Ok(()));
            assert!(waited < LONG_TIMEOUT);
        });

        assert_eq!(deque.len(), 1);
        assert_eq!(deque.front().unwrap(), 2);
    }

    #[test]
    /**
     * A consumer blocked on an empty deque receives the next push, from either end.
     */
    fn push_wakes_blocked_consumer_test() {
        let deque = Arc::new(YDBoundedDeque::new(YDDequeConfig::drop_oldest(4)));

        for push_at_front in [true, false] {
            let barrier = Arc::new(Barrier::new(2));
            let consumer = {
                let deque = Arc::clone(&deque);
                let barrier = Arc::clone(&barrier);
                std::thread::spawn(move || {
                    barrier.wait();
                    deque.pop_back(LONG_TIMEOUT)
                })
            };

            barrier.wait();
            settle();
            if push_at_front {
                deque.push_front("front", WAIT_FOREVER).unwrap();
            } else {
                deque.push_back("back", WAIT_FOREVER).unwrap();
            }

            let expected = if push_at_front { "front" } else { "back" };
            assert_eq!(consumer.join().expect("consumer panicked"), Ok(expected));
            assert!(deque.is_empty());
        }
    }
}
