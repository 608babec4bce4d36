use clap::Parser;
use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::{Appender, Root};
use log4rs::encode::pattern::PatternEncoder;
use log4rs::Config;
use std::collections::VecDeque;
use std::sync::{Barrier, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use test_support::utils::{backoff, id_from_message, message_for};
use yep_deque::{YDBoundedDeque, YDDequeConfig, WAIT_FOREVER};

/// Compare single-producer/single-consumer hand-off between YDBoundedDeque, flume and a polled
/// Mutex+VecDeque.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Capacity limit shared by all contenders
    #[arg(short = 'd', long, default_value = "64")]
    queue_depth: usize,

    /// Total number of messages to send
    #[arg(short = 'n', long, default_value = "10000")]
    msg_count: u32,

    /// Enable verbose logging
    #[arg(short = 'v', long, default_value_t = false)]
    verbose: bool,
}

fn check_order(name: &str, message: &str, expected: u32) {
    log::debug!("{name} recv: {message}");
    let id = id_from_message(message);
    if id != expected {
        panic!("{name} mismatch: expected message {expected} got {id}");
    }
}

/// Time from the first send to the last receive, measured across both threads.
fn run_timed<P, C>(producer: P, consumer: C) -> Duration
where
    P: FnOnce() + Send,
    C: FnOnce() + Send,
{
    let barrier = Barrier::new(2);
    let mut start_time = Instant::now();
    let mut end_time = Instant::now();

    thread::scope(|s| {
        s.spawn(|| {
            barrier.wait();
            consumer();
            end_time = Instant::now();
        });
        s.spawn(|| {
            barrier.wait();
            start_time = Instant::now();
            producer();
        });
    });

    end_time.duration_since(start_time)
}

fn run_ydbounded_deque(args: &Args) -> Duration {
    let deque: YDBoundedDeque<String> = YDBoundedDeque::new(YDDequeConfig::blocking(args.queue_depth));

    run_timed(
        || {
            for id in 0..args.msg_count {
                deque
                    .push_back(message_for(id), WAIT_FOREVER)
                    .expect("YDBoundedDeque closed");
            }
        },
        || {
            for expected in 0..args.msg_count {
                let message = deque.pop_front(WAIT_FOREVER).expect("YDBoundedDeque closed");
                check_order("YDBoundedDeque", &message, expected);
            }
        },
    )
}

fn run_flume(args: &Args) -> Duration {
    let (sender, receiver) = flume::bounded::<String>(args.queue_depth);

    run_timed(
        || {
            for id in 0..args.msg_count {
                sender.send(message_for(id)).expect("Flume channel closed");
            }
        },
        || {
            for expected in 0..args.msg_count {
                let message = receiver.recv().expect("Flume channel closed");
                check_order("Flume", &message, expected);
            }
        },
    )
}

fn run_mutex_vecdeque(args: &Args) -> Duration {
    let queue: Mutex<VecDeque<String>> = Mutex::new(VecDeque::with_capacity(args.queue_depth));

    run_timed(
        || {
            let mut attempt = 0;
            let mut id = 0;
            while id < args.msg_count {
                let mut q = queue.lock().unwrap();
                if q.len() < args.queue_depth {
                    q.push_back(message_for(id));
                    id += 1;
                    attempt = 0;
                } else {
                    drop(q);
                    backoff(&mut attempt);
                }
            }
        },
        || {
            let mut attempt = 0;
            let mut expected = 0;
            while expected < args.msg_count {
                let maybe_msg = queue.lock().unwrap().pop_front();
                match maybe_msg {
                    Some(message) => {
                        check_order("Mutex+VecDeque", &message, expected);
                        expected += 1;
                        attempt = 0;
                    }
                    None => backoff(&mut attempt),
                }
            }
        },
    )
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

    println!("Comparison run with:");
    println!("  Queue depth: {}", args.queue_depth);
    println!("  Total messages: {}", args.msg_count);

    if args.queue_depth == 0 {
        panic!("queue_depth must be greater than zero");
    }

    let yd_dur = run_ydbounded_deque(&args);
    let flume_dur = run_flume(&args);
    let mv_dur = run_mutex_vecdeque(&args);

    println!("\nResults (lower is better):");
    println!(
        "  YDBoundedDeque:   {:.3} us",
        yd_dur.as_nanos() as f64 / 1_000.0
    );
    println!(
        "  Flume (bounded):  {:.3} us",
        flume_dur.as_nanos() as f64 / 1_000.0
    );
    println!(
        "  Mutex+VecDeque:   {:.3} us",
        mv_dur.as_nanos() as f64 / 1_000.0
    );

    let yd_msgs_per_sec = (args.msg_count as f64) / yd_dur.as_secs_f64();
    let flume_msgs_per_sec = (args.msg_count as f64) / flume_dur.as_secs_f64();
    let mv_msgs_per_sec = (args.msg_count as f64) / mv_dur.as_secs_f64();
    println!("\nThroughput:");
    println!("  YDBoundedDeque:   {:.2} msgs/s", yd_msgs_per_sec);
    println!("  Flume (bounded):  {:.2} msgs/s", flume_msgs_per_sec);
    println!("  Mutex+VecDeque:   {:.2} msgs/s", mv_msgs_per_sec);
}
