//! Message and frame encoding/decoding benchmarks.

use bytes::{Bytes, BytesMut};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use riemann_protocol::{Event, Frame, Message, DEFAULT_MAX_FRAME_SIZE};

fn create_test_event(i: usize) -> Event {
    let mut event = Event::new();
    event.set_host("bench-host");
    event.set_service(format!("service-{}", i));
    event.set_state("ok");
    event.set_metric(i as f32);
    event.set_ttl(60.0);
    event.set_tags(["bench", "riemann"]);
    event.set_attributes([("env", "prod"), ("region", "eu-west-1")]);
    event
}

fn create_test_message(count: usize) -> Message {
    Message::from_events((0..count).map(create_test_event))
}

fn bench_frame_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame_encode");

    for size in [100, 1000, 10000] {
        let frame = Frame::new(Bytes::from("x".repeat(size)));

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &frame, |b, frame| {
            b.iter(|| black_box(frame.encode().unwrap()));
        });
    }

    group.finish();
}

fn bench_frame_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame_decode");

    for size in [100, 1000, 10000] {
        let encoded = Frame::new(Bytes::from("x".repeat(size))).encode().unwrap();

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &encoded, |b, encoded| {
            b.iter(|| {
                let mut buf: BytesMut = encoded.clone();
                black_box(Frame::decode(&mut buf, DEFAULT_MAX_FRAME_SIZE).unwrap())
            });
        });
    }

    group.finish();
}

fn bench_message_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("message_encode");

    for count in [1, 10, 100] {
        let message = create_test_message(count);

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &message, |b, message| {
            b.iter(|| black_box(message.raw()));
        });
    }

    group.finish();
}

fn bench_message_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("message_decode");

    for count in [1, 10, 100] {
        let raw = create_test_message(count).raw();

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &raw, |b, raw| {
            b.iter(|| black_box(Message::from_raw(raw).unwrap()));
        });
    }

    group.finish();
}

fn bench_event_from_params(c: &mut Criterion) {
    let params = serde_json::json!({
        "host": "bench-host",
        "service": "cpu",
        "state": "ok",
        "metric": 0.25,
        "tags": ["bench", "riemann"],
        "attributes": {"env": "prod", "cores": 8},
        "custom": "kept",
    });

    c.bench_function("event_from_params", |b| {
        b.iter(|| black_box(Event::from_params(&params).unwrap()));
    });
}

criterion_group!(
    benches,
    bench_frame_encode,
    bench_frame_decode,
    bench_message_encode,
    bench_message_decode,
    bench_event_from_params,
);

criterion_main!(benches);
