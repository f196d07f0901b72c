//! # Two-Thread Relay Verification
//!
//! Runs a real producer thread against a real consumer thread and checks:
//!
//! 1. **Order**: consumer observes production order across batch boundaries
//! 2. **No lost work**: every unit runs exactly once under continuous seal/drain
//! 3. **Blocking calls**: results come back from the consumer thread, in order
//! 4. **Deferred handles**: identifiers resolve once their creation has run
//!
//! Run with: cargo test -p glrelay_core --test two_thread_test -- --nocapture

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use glrelay_core::sync::command_queue;
use glrelay_core::{relay, FlushSignal, NativeHandle, ObjectId, RelayConfig};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

// ============================================================================
// ORDER PRESERVATION
// ============================================================================

#[test]
fn random_seal_drain_interleavings_preserve_order() {
    for seed in 0..20u64 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let (mut writer, mut reader) = command_queue::<Vec<u32>>(8);
        let mut observed = Vec::new();
        let total = rng.gen_range(1..500u32);

        for i in 0..total {
            writer.enqueue(move |log| log.push(i));
            if rng.gen_bool(0.2) {
                writer.seal();
            }
            if rng.gen_bool(0.1) {
                reader.drain_and_execute(&mut observed);
            }
        }
        writer.seal();
        reader.drain_and_execute(&mut observed);

        assert_eq!(observed, (0..total).collect::<Vec<_>>(), "seed {seed}");
    }
}

#[test]
fn order_preserved_across_threads() {
    const UNITS: u32 = 100_000;

    let (mut writer, mut reader) = command_queue::<Vec<u32>>(64);
    let done = Arc::new(AtomicBool::new(false));
    let producer_done = Arc::clone(&done);

    let producer = thread::spawn(move || {
        for i in 0..UNITS {
            writer.enqueue(move |log| log.push(i));
            if i % 97 == 0 {
                writer.seal();
            }
        }
        writer.seal();
        producer_done.store(true, Ordering::Release);
    });

    let consumer = thread::spawn(move || {
        let mut observed = Vec::with_capacity(UNITS as usize);
        loop {
            let finished = done.load(Ordering::Acquire);
            reader.drain_and_execute(&mut observed);
            if finished {
                // One more drain after the flag catches the final seal.
                reader.drain_and_execute(&mut observed);
                break;
            }
        }
        observed
    });

    producer.join().unwrap();
    let observed = consumer.join().unwrap();

    assert_eq!(observed.len(), UNITS as usize);
    assert!(observed.iter().enumerate().all(|(i, v)| *v == i as u32));
}

// ============================================================================
// NO LOST WORK
// ============================================================================

#[test]
fn every_unit_runs_exactly_once_under_continuous_drain() {
    let (mut writer, mut reader) = command_queue::<Vec<u64>>(16);
    let stop = Arc::new(AtomicBool::new(false));
    let producer_stop = Arc::clone(&stop);

    let producer = thread::spawn(move || {
        let deadline = Instant::now() + Duration::from_millis(200);
        let mut produced = 0u64;
        while Instant::now() < deadline {
            for _ in 0..32 {
                let n = produced;
                writer.enqueue(move |counts| counts.push(n));
                produced += 1;
            }
            writer.seal();
        }
        producer_stop.store(true, Ordering::Release);
        produced
    });

    let consumer = thread::spawn(move || {
        let mut counts = Vec::new();
        loop {
            let stopping = stop.load(Ordering::Acquire);
            reader.drain_and_execute(&mut counts);
            if stopping {
                reader.drain_and_execute(&mut counts);
                break;
            }
        }
        counts
    });

    let produced = producer.join().unwrap();
    let executed = consumer.join().unwrap();

    println!("produced {produced} units in 200ms");
    assert_eq!(executed.len() as u64, produced);
    assert!(executed.iter().enumerate().all(|(i, n)| *n == i as u64));
}

// ============================================================================
// BLOCKING CALLS
// ============================================================================

#[test]
fn hundred_blocking_calls_return_consumer_results() {
    let (flush, listener) = FlushSignal::channel();
    let (mut producer, mut consumer) = relay(Vec::<u32>::new(), &RelayConfig::default(), flush);
    let stop = Arc::new(AtomicBool::new(false));
    let consumer_stop = Arc::clone(&stop);

    let render = thread::spawn(move || {
        let render_thread = thread::current().id();
        while !consumer_stop.load(Ordering::Acquire) {
            let _ = listener.wait_timeout(Duration::from_millis(16));
            consumer.drain_and_execute();
        }
        (render_thread, consumer)
    });

    let mut threads = Vec::new();
    for i in 0..100u32 {
        producer.enqueue(move |s| s.native_mut().push(i));
        let (len, ran_on) = producer
            .run_blocking(move |s| (s.native().len(), thread::current().id()))
            .unwrap();
        // Every prior fire-and-forget unit ran before the blocking one.
        assert_eq!(len, i as usize + 1);
        threads.push(ran_on);
    }

    stop.store(true, Ordering::Release);
    let (render_thread, consumer) = render.join().unwrap();

    assert!(threads.iter().all(|t| *t == render_thread));
    assert_eq!(consumer.state().native(), &(0..100).collect::<Vec<_>>());
    assert_eq!(consumer.stats().blocking_calls, 100);
}

#[test]
fn blocking_call_waits_for_slow_consumer() {
    let (flush, listener) = FlushSignal::channel();
    let (mut producer, mut consumer) = relay(0u64, &RelayConfig::default(), flush);

    let render = thread::spawn(move || {
        // Ignore the first wake-up for a while to prove the producer parks.
        assert!(listener.wait_timeout(Duration::from_secs(5)));
        thread::sleep(Duration::from_millis(30));
        consumer.drain_and_execute();
    });

    let start = Instant::now();
    let value = producer
        .run_blocking(|s| {
            *s.native_mut() = 41;
            *s.native() + 1
        })
        .unwrap();

    assert_eq!(value, 42);
    assert!(start.elapsed() >= Duration::from_millis(30));
    render.join().unwrap();
}

// ============================================================================
// DEFERRED HANDLES
// ============================================================================

#[test]
fn deferred_handles_resolve_on_render_thread() {
    let (flush, listener) = FlushSignal::channel();
    let (mut producer, mut consumer) = relay(Vec::<u32>::new(), &RelayConfig::default(), flush);
    let stop = Arc::new(AtomicBool::new(false));
    let consumer_stop = Arc::clone(&stop);

    let render = thread::spawn(move || {
        while !consumer_stop.load(Ordering::Acquire) {
            let _ = listener.wait_timeout(Duration::from_millis(5));
            consumer.drain_and_execute();
        }
        consumer
    });

    let ids: Vec<ObjectId> = (0..50u32)
        .map(|i| producer.create_and_defer(move |_| NativeHandle::new(1000 + i)))
        .collect();

    // Destroy every other one, then resolve all of them in a single blocking call.
    for id in ids.iter().step_by(2) {
        producer.destroy(*id);
    }
    let lookup_ids = ids.clone();
    let resolved = producer
        .run_blocking(move |s| lookup_ids.iter().map(|id| s.lookup(*id)).collect::<Vec<_>>())
        .unwrap();

    stop.store(true, Ordering::Release);
    let consumer = render.join().unwrap();

    for (i, handle) in resolved.iter().enumerate() {
        if i % 2 == 0 {
            assert!(handle.is_null(), "destroyed id {i} should be null");
        } else {
            assert_eq!(handle.raw(), 1000 + i as u32);
        }
    }
    assert_eq!(consumer.state().handles().len(), 25);
}
