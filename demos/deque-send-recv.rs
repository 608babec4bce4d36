//! A multi-producer, multi-consumer send-recv example using YDBoundedDeque
//!
//! One deque is built in `main` and handed to every worker through an `Arc`. Producers push numbered
//! messages at the back, consumers pop them from the front. Once all producers are done and the
//! deque has drained, `main` shuts it down to release the consumers.

use clap::{Parser, ValueEnum};
use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::{Appender, Root};
use log4rs::encode::pattern::PatternEncoder;
use log4rs::Config;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use test_support::utils::{id_from_message, message_for};
use yep_deque::{YDBoundedDeque, YDDequeConfig, YDOverflowPolicy, YDQueueError};

#[derive(ValueEnum, Debug, Clone, Copy)]
enum Policy {
    /// Producers wait for space
    Block,
    /// Producers evict the oldest message
    DropOldest,
}

impl From<Policy> for YDOverflowPolicy {
    fn from(policy: Policy) -> Self {
        match policy {
            Policy::Block => YDOverflowPolicy::BlockBackpressure,
            Policy::DropOldest => YDOverflowPolicy::DropOldest,
        }
    }
}

/// A multi-producer, multi-consumer send-recv example using YDBoundedDeque
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Deque capacity limit, 0 for unbounded
    #[arg(short = 'd', long, default_value = "64")]
    capacity: usize,

    /// What producers do when the deque is full
    #[arg(short = 'o', long, value_enum, default_value_t = Policy::Block)]
    policy: Policy,

    /// Total number of messages to send
    #[arg(short = 'n', long, default_value = "10000")]
    msg_count: u32,

    /// Timeout in seconds for a single push or pop
    #[arg(short = 't', long, default_value = "10")]
    timeout_secs: u64,

    /// Number of producer threads
    #[arg(short = 'p', long, default_value = "2")]
    producer_threads: u16,

    /// Number of consumer threads
    #[arg(short = 'c', long, default_value = "2")]
    consumer_threads: u16,

    /// Enable verbose logging
    #[arg(short = 'v', long, default_value_t = false)]
    verbose: bool,
}

fn warn_for_thread_counts(args: &Args) {
    let available_cpus = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    let total_threads = args.producer_threads as usize + args.consumer_threads as usize;

    if total_threads > available_cpus {
        log::warn!(
            "total thread count ({total_threads}) exceeds available CPUs ({available_cpus})"
        );
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new("{d} {l} {t} - {m}{n}")))
        .build();
    let config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .build(Root::builder().appender("stderr").build(level))
        .expect("invalid logging config");
    log4rs::init_config(config).expect("logger already installed");
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if args.producer_threads == 0 || args.consumer_threads == 0 {
        panic!("producer_threads and consumer_threads must be greater than zero");
    }
    warn_for_thread_counts(&args);

    let config = YDDequeConfig::new(args.capacity, args.policy.into());
    let timeout = Duration::from_secs(args.timeout_secs);

    println!("Starting multi send-recv test with:");
    println!("  Capacity: {}", config.capacity_limit);
    println!("  Overflow policy: {:?}", config.overflow_policy);
    println!("  Total messages: {}", args.msg_count);
    println!("  Producer threads: {}", args.producer_threads);
    println!("  Consumer threads: {}", args.consumer_threads);

    let deque: Arc<YDBoundedDeque<String>> = Arc::new(YDBoundedDeque::new(config));
    let received = Arc::new(Mutex::new(vec![0u32; args.msg_count as usize]));

    let start_time = Instant::now();

    let producers: Vec<_> = (0..args.producer_threads)
        .map(|p| {
            let deque = Arc::clone(&deque);
            let step = args.producer_threads as u32;
            let msg_count = args.msg_count;
            thread::Builder::new()
                .name(format!("producer_{p}"))
                .spawn(move || {
                    for id in (p as u32..msg_count).step_by(step as usize) {
                        let message = message_for(id);
                        log::debug!("send: {message}");
                        if let Err(e) = deque.push_back(message, timeout) {
                            panic!("producer {p} failed to send {}: {e}", e.element);
                        }
                    }
                })
                .expect("failed to spawn producer")
        })
        .collect();

    let consumers: Vec<_> = (0..args.consumer_threads)
        .map(|c| {
            let deque = Arc::clone(&deque);
            let received = Arc::clone(&received);
            thread::Builder::new()
                .name(format!("consumer_{c}"))
                .spawn(move || loop {
                    match deque.pop_front(timeout) {
                        Ok(message) => {
                            log::debug!("recv: {message}");
                            let id = id_from_message(&message);
                            received.lock().unwrap()[id as usize] += 1;
                        }
                        Err(YDQueueError::Closed) => break,
                        Err(e) => panic!("consumer {c} error: {e}"),
                    }
                })
                .expect("failed to spawn consumer")
        })
        .collect();

    for producer in producers {
        producer.join().expect("producer panicked");
    }

    let deadline = Instant::now() + timeout;
    while !deque.is_empty() {
        if Instant::now() > deadline {
            panic!("consumers did not drain the deque within {timeout:?}");
        }
        thread::yield_now();
    }
    // messages already popped are still recorded, shutdown only stops further pops
    deque.shutdown();

    for consumer in consumers {
        consumer.join().expect("consumer panicked");
    }

    let elapsed = start_time.elapsed();
    println!(
        "Multi-send-recv test finished in {:?} us!",
        elapsed.as_micros()
    );

    let received = received.lock().unwrap();
    if let Some(index) = received.iter().position(|&count| count > 1) {
        panic!("Duplicate message index {index} detected during validation");
    }

    let delivered = received.iter().filter(|&&count| count == 1).count();
    match config.overflow_policy {
        YDOverflowPolicy::BlockBackpressure => {
            if delivered != args.msg_count as usize {
                panic!(
                    "Expected {} delivered messages but counted {}",
                    args.msg_count, delivered
                );
            }
        }
        YDOverflowPolicy::DropOldest => {
            println!(
                "Delivered {} of {} messages, {} evicted",
                delivered,
                args.msg_count,
                args.msg_count as usize - delivered
            );
        }
    }
}
