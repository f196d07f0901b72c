//! # Relay Queue Benchmark
//!
//! Measures the script-thread cost of recording calls and the render-thread
//! cost of draining them.
//!
//! 1. Enqueue + seal per frame (what the script pays)
//! 2. Drain + execute (what the render thread pays)
//! 3. Blocking round trip against a live consumer thread

#![allow(missing_docs)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use glrelay_core::sync::command_queue;
use glrelay_core::{relay, FlushSignal, NativeHandle, RelayConfig};

fn bench_enqueue_seal(c: &mut Criterion) {
    let mut group = c.benchmark_group("enqueue_seal");

    for calls_per_frame in [100u64, 1_000, 10_000] {
        group.throughput(Throughput::Elements(calls_per_frame));
        group.bench_with_input(
            BenchmarkId::from_parameter(calls_per_frame),
            &calls_per_frame,
            |b, &n| {
                let (mut writer, mut reader) = command_queue::<u64>(n as usize);
                let mut sink = 0u64;
                b.iter(|| {
                    for i in 0..n {
                        writer.enqueue(move |acc| *acc = acc.wrapping_add(i));
                    }
                    writer.seal();
                    // Keep the backlog from growing without bound.
                    reader.discard_backlog();
                });
                reader.drain_and_execute(&mut sink);
                black_box(sink);
            },
        );
    }

    group.finish();
}

fn bench_drain_execute(c: &mut Criterion) {
    let mut group = c.benchmark_group("drain_execute");

    for calls_per_frame in [100u64, 1_000, 10_000] {
        group.throughput(Throughput::Elements(calls_per_frame));
        group.bench_with_input(
            BenchmarkId::from_parameter(calls_per_frame),
            &calls_per_frame,
            |b, &n| {
                let (mut writer, mut reader) = command_queue::<u64>(n as usize);
                let mut acc = 0u64;
                b.iter(|| {
                    for i in 0..n {
                        writer.enqueue(move |acc| *acc = acc.wrapping_add(i));
                    }
                    writer.seal();
                    black_box(reader.drain_and_execute(&mut acc))
                });
            },
        );
    }

    group.finish();
}

fn bench_deferred_create(c: &mut Criterion) {
    let (mut producer, mut consumer) = relay((), &RelayConfig::default(), FlushSignal::noop());
    let mut next = 1u32;

    c.bench_function("create_and_defer_then_drain_1000", |b| {
        b.iter(|| {
            for _ in 0..1000 {
                let raw = next;
                next = next.wrapping_add(1).max(1);
                let id = producer.create_and_defer(move |_| NativeHandle::new(raw));
                producer.destroy(id);
            }
            producer.seal();
            black_box(consumer.drain_and_execute())
        });
    });
}

fn bench_blocking_round_trip(c: &mut Criterion) {
    let (flush, listener) = FlushSignal::channel();
    let (mut producer, mut consumer) = relay(0u64, &RelayConfig::default(), flush);
    let stop = Arc::new(AtomicBool::new(false));
    let consumer_stop = Arc::clone(&stop);

    let render = thread::spawn(move || {
        while !consumer_stop.load(Ordering::Acquire) {
            let _ = listener.wait_timeout(Duration::from_millis(1));
            consumer.drain_and_execute();
        }
    });

    c.bench_function("run_blocking_round_trip", |b| {
        b.iter(|| {
            black_box(producer.run_blocking(|s| {
                *s.native_mut() += 1;
                *s.native()
            }))
        });
    });

    stop.store(true, Ordering::Release);
    let _ = render.join();
}

criterion_group!(
    benches,
    bench_enqueue_seal,
    bench_drain_execute,
    bench_deferred_create,
    bench_blocking_round_trip,
);
criterion_main!(benches);
