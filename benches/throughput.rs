//! Benchmarks for keystream generation and pipeline delivery
//!
//! Run with: cargo bench

use cipherpipe::config::KeystreamSettings;
use cipherpipe::{Arc4, BufferSink, FilterGraph, Fork, KeystreamFilter, Passthrough, StreamCipher};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

const KEY: &[u8] = b"benchmark key";

fn bench_arc4_apply(c: &mut Criterion) {
    let mut group = c.benchmark_group("arc4_apply_keystream");

    for size in [64usize, 4096, 65_536] {
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let mut engine = Arc4::new(KEY).unwrap();
            let mut data = vec![0u8; size];
            b.iter(|| {
                engine.apply_keystream(black_box(&mut data)).unwrap();
            });
        });
    }

    group.finish();
}

fn bench_arc4_block_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("arc4_block_size");
    group.throughput(Throughput::Bytes(65_536));

    for block_size in [256usize, 4096, 65_536] {
        group.bench_with_input(
            BenchmarkId::from_parameter(block_size),
            &block_size,
            |b, &block_size| {
                let settings = KeystreamSettings::default().with_block_size(block_size);
                let mut engine = Arc4::with_settings(KEY, &settings).unwrap();
                let mut data = vec![0u8; 65_536];
                b.iter(|| {
                    engine.apply_keystream(black_box(&mut data)).unwrap();
                });
            },
        );
    }

    group.finish();
}

fn bench_chain_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("chain_write");
    let payload = vec![0x5au8; 4096];
    group.throughput(Throughput::Bytes(payload.len() as u64));

    for depth in [1usize, 8, 64] {
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, &depth| {
            let mut graph = FilterGraph::new();
            let head = graph.add(Passthrough::new());
            for _ in 1..depth {
                let next = graph.add(Passthrough::new());
                graph.builder().attach(head, next).unwrap();
            }
            let sink = graph.add(BufferSink::new());
            graph.builder().attach(head, sink).unwrap();

            b.iter(|| {
                graph.start_message(head).unwrap();
                graph.write(head, black_box(&payload)).unwrap();
                graph.end_message(head).unwrap();
                black_box(graph.take_output(sink).unwrap());
            });
        });
    }

    group.finish();
}

fn bench_fork_encrypt(c: &mut Criterion) {
    let mut group = c.benchmark_group("fork_encrypt");
    let payload = vec![0xa5u8; 4096];
    group.throughput(Throughput::Bytes(payload.len() as u64));

    group.bench_function("encrypt_fanout_3", |b| {
        let mut graph = FilterGraph::new();
        let encrypt = graph.add(KeystreamFilter::arc4(KEY, &KeystreamSettings::default()).unwrap());
        let fork = graph.add_fanout(Fork::new());
        let sinks: Vec<_> = (0..3).map(|_| graph.add(BufferSink::new())).collect();
        graph.builder().attach(encrypt, fork).unwrap();
        graph.fanout(fork).unwrap().set_downstream(&sinks).unwrap();

        b.iter(|| {
            graph.start_message(encrypt).unwrap();
            graph.write(encrypt, black_box(&payload)).unwrap();
            graph.end_message(encrypt).unwrap();
            for &sink in &sinks {
                black_box(graph.take_output(sink).unwrap());
            }
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_arc4_apply,
    bench_arc4_block_size,
    bench_chain_write,
    bench_fork_encrypt
);
criterion_main!(benches);
