mod common;

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier, Mutex};
use std::thread;

use demandflow::{
    Emitter, FetchFn, StreamError, Subscriber, Subscription, SubscriptionConfig,
    SubscriptionState,
};
use rand::Rng;

use common::{drain_now, Forward, Seen};

const THREADS: usize = 8;

#[test]
fn concurrent_requests_are_fetched_exactly_once() {
    let fetched = Arc::new(AtomicU64::new(0));
    let in_fetch = Arc::new(AtomicBool::new(false));
    let overlaps = Arc::new(AtomicUsize::new(0));

    let producer = {
        let fetched = Arc::clone(&fetched);
        let in_fetch = Arc::clone(&in_fetch);
        let overlaps = Arc::clone(&overlaps);
        FetchFn::new(move |n: u64, _e: &Emitter<u32>| {
            if in_fetch.swap(true, Ordering::SeqCst) {
                overlaps.fetch_add(1, Ordering::SeqCst);
            }
            fetched.fetch_add(n, Ordering::SeqCst);
            in_fetch.store(false, Ordering::SeqCst);
        })
    };
    let (fwd, _rx) = Forward::<u32>::new(0);
    let sub = Subscription::subscribe(producer, fwd, SubscriptionConfig::default());

    let barrier = Arc::new(Barrier::new(THREADS));
    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let sub = sub.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let mut rng = rand::thread_rng();
                let mut requested = 0u64;
                barrier.wait();
                for _ in 0..2_000 {
                    let n = rng.gen_range(1..=100);
                    sub.request(n);
                    requested += n as u64;
                }
                requested
            })
        })
        .collect();

    let expected: u64 = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(fetched.load(Ordering::SeqCst), expected);
    assert_eq!(sub.outstanding(), 0);
    assert_eq!(overlaps.load(Ordering::SeqCst), 0, "fetch calls overlapped");
}

/// Detects overlapping callbacks and checks per-thread ordering.
struct SerialCheck {
    busy: Arc<AtomicBool>,
    overlaps: Arc<AtomicUsize>,
    last_seq: Vec<Option<u32>>,
    out_of_order: Arc<AtomicUsize>,
    delivered: Arc<AtomicUsize>,
    completions: Arc<AtomicUsize>,
}

impl SerialCheck {
    fn enter(&self) {
        if self.busy.swap(true, Ordering::SeqCst) {
            self.overlaps.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn exit(&self) {
        self.busy.store(false, Ordering::SeqCst);
    }
}

impl Subscriber<(usize, u32)> for SerialCheck {
    fn on_subscribe(&mut self, subscription: Subscription<(usize, u32)>) {
        subscription.request(i64::MAX);
    }

    fn on_next(&mut self, (thread, seq): (usize, u32)) {
        self.enter();
        if let Some(prev) = self.last_seq[thread] {
            if seq <= prev {
                self.out_of_order.fetch_add(1, Ordering::SeqCst);
            }
        }
        self.last_seq[thread] = Some(seq);
        self.delivered.fetch_add(1, Ordering::SeqCst);
        // Widen the window for a second deliverer to slip in.
        std::hint::spin_loop();
        self.exit();
    }

    fn on_error(&mut self, _error: StreamError) {}

    fn on_complete(&mut self) {
        self.enter();
        self.completions.fetch_add(1, Ordering::SeqCst);
        self.exit();
    }
}

#[test]
fn concurrent_emitters_never_overlap_callbacks() {
    const PER_THREAD: u32 = 5_000;

    let overlaps = Arc::new(AtomicUsize::new(0));
    let out_of_order = Arc::new(AtomicUsize::new(0));
    let delivered = Arc::new(AtomicUsize::new(0));
    let completions = Arc::new(AtomicUsize::new(0));
    let check = SerialCheck {
        busy: Arc::new(AtomicBool::new(false)),
        overlaps: Arc::clone(&overlaps),
        last_seq: vec![None; THREADS],
        out_of_order: Arc::clone(&out_of_order),
        delivered: Arc::clone(&delivered),
        completions: Arc::clone(&completions),
    };

    let producer = FetchFn::new(|_n: u64, _e: &Emitter<(usize, u32)>| {});
    let sub = Subscription::subscribe(producer, check, SubscriptionConfig::default());

    let barrier = Arc::new(Barrier::new(THREADS));
    let handles: Vec<_> = (0..THREADS)
        .map(|thread| {
            let emitter = sub.emitter();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for seq in 0..PER_THREAD {
                    assert!(emitter.on_next((thread, seq)));
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    assert!(sub.emitter().on_complete());

    assert_eq!(overlaps.load(Ordering::SeqCst), 0, "callbacks overlapped");
    assert_eq!(out_of_order.load(Ordering::SeqCst), 0, "per-thread order broken");
    assert_eq!(delivered.load(Ordering::SeqCst), THREADS * PER_THREAD as usize);
    assert_eq!(completions.load(Ordering::SeqCst), 1);
    assert_eq!(sub.state(), SubscriptionState::Completed);
}

#[test]
fn items_and_completion_from_different_threads_keep_order() {
    let (fwd, mut rx) = Forward::<&'static str>::new(3);
    let sub = Subscription::subscribe(
        FetchFn::new(|_n: u64, _e: &Emitter<&'static str>| {}),
        fwd,
        SubscriptionConfig::default(),
    );

    let emitter = sub.emitter();
    thread::spawn(move || {
        emitter.on_next("A");
        emitter.on_next("B");
        emitter.on_next("C");
    })
    .join()
    .unwrap();

    let emitter = sub.emitter();
    thread::spawn(move || emitter.on_complete())
        .join()
        .unwrap();

    assert_eq!(
        drain_now(&mut rx),
        vec![
            Seen::Next("A"),
            Seen::Next("B"),
            Seen::Next("C"),
            Seen::Complete
        ]
    );
}

#[test]
fn cancel_stops_delivery_from_busy_producers() {
    let (fwd, mut rx) = Forward::<u64>::new(i64::MAX);
    let sub = Subscription::subscribe(
        FetchFn::new(|_n: u64, _e: &Emitter<u64>| {}),
        fwd,
        SubscriptionConfig::default(),
    );

    let running = Arc::new(AtomicBool::new(true));
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let emitter = sub.emitter();
            let running = Arc::clone(&running);
            thread::spawn(move || {
                let mut i = 0;
                while running.load(Ordering::SeqCst) {
                    emitter.on_next(i);
                    i += 1;
                }
                // Keep pushing after cancellation has been observed.
                for j in 0..1_000 {
                    assert!(!emitter.on_next(i + j));
                }
                emitter.on_complete()
            })
        })
        .collect();

    thread::sleep(std::time::Duration::from_millis(20));
    sub.cancel();
    running.store(false, Ordering::SeqCst);

    for h in handles {
        assert!(!h.join().unwrap(), "completion accepted after cancel");
    }
    let seen_at_join = drain_now(&mut rx);
    assert!(seen_at_join.iter().all(|s| matches!(s, Seen::Next(_))));

    for _ in 0..100 {
        sub.emitter().on_next(0);
    }
    assert!(drain_now(&mut rx).is_empty());
    assert_eq!(sub.state(), SubscriptionState::Cancelled);
}

#[test]
fn reentrant_requests_with_threaded_producer() {
    const TOTAL: u64 = 200;

    let next = Arc::new(AtomicU64::new(0));
    let workers = Arc::new(Mutex::new(Vec::new()));
    let producer = {
        let workers = Arc::clone(&workers);
        FetchFn::new(move |n: u64, emitter: &Emitter<u64>| {
            let emitter = emitter.clone();
            let next = Arc::clone(&next);
            // Emit from a fresh thread, like an I/O completion callback would.
            let handle = thread::spawn(move || {
                for _ in 0..n {
                    let i = next.fetch_add(1, Ordering::SeqCst);
                    if i >= TOTAL {
                        emitter.on_complete();
                        return;
                    }
                    emitter.on_next(i);
                }
            });
            workers.lock().unwrap().push(handle);
        })
    };

    let (fwd, mut rx) = Forward::<u64>::new(1);
    let fwd = fwd.batch(1);
    let sub = Subscription::subscribe(producer, fwd, SubscriptionConfig::default());

    // Each delivered item requests the next one, which spawns another worker.
    loop {
        let handle = workers.lock().unwrap().pop();
        match handle {
            Some(h) => h.join().unwrap(),
            None if sub.is_stopped() => break,
            None => thread::yield_now(),
        }
    }

    let seen = drain_now(&mut rx);
    let expected: Vec<_> = (0..TOTAL)
        .map(Seen::Next)
        .chain(std::iter::once(Seen::Complete))
        .collect();
    assert_eq!(seen, expected);
}
