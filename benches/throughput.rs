use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use spsc_fifo_rs::{Fifo, FifoConfig};
use std::thread;

const TOTAL_BYTES: u64 = 64 * 1024 * 1024; // 64 MiB per iteration

fn bench_spsc_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("spsc_bytes");
    group.throughput(Throughput::Bytes(TOTAL_BYTES));

    group.bench_function("single_producer_consumer", |b| {
        b.iter(|| {
            let (producer, consumer) = Fifo::build(1 << 16, FifoConfig::default()).unwrap();
            let payload = vec![0xABu8; 4096];

            let producer_handle = thread::spawn(move || {
                let mut sent = 0u64;
                while sent < TOTAL_BYTES {
                    let want = payload.len().min((TOTAL_BYTES - sent) as usize);
                    let n = producer.write(&payload[..want]);
                    if n == 0 {
                        std::hint::spin_loop();
                        continue;
                    }
                    sent += n as u64;
                }
            });

            let mut dst = vec![0u8; 4096];
            let mut received = 0u64;
            while received < TOTAL_BYTES {
                let n = consumer.read(&mut dst);
                black_box(&dst[..n]);
                if n == 0 {
                    std::hint::spin_loop();
                    continue;
                }
                received += n as u64;
            }

            producer_handle.join().unwrap();
        });
    });

    group.finish();
}

fn bench_chunk_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("spsc_bytes_by_chunk");
    group.throughput(Throughput::Bytes(TOTAL_BYTES));

    for chunk_size in [64usize, 256, 1024, 4096, 16384] {
        group.bench_with_input(
            BenchmarkId::from_parameter(chunk_size),
            &chunk_size,
            |b, &chunk_size| {
                b.iter(|| {
                    let (producer, consumer) = Fifo::build(1 << 16, FifoConfig::default()).unwrap();
                    let payload = vec![0xCDu8; chunk_size];

                    let producer_handle = thread::spawn(move || {
                        let mut sent = 0u64;
                        while sent < TOTAL_BYTES {
                            let want = payload.len().min((TOTAL_BYTES - sent) as usize);
                            let n = producer.write(&payload[..want]);
                            if n == 0 {
                                std::hint::spin_loop();
                                continue;
                            }
                            sent += n as u64;
                        }
                    });

                    let mut dst = vec![0u8; chunk_size];
                    let mut received = 0u64;
                    while received < TOTAL_BYTES {
                        let n = consumer.read(&mut dst);
                        black_box(&dst[..n]);
                        if n == 0 {
                            std::hint::spin_loop();
                            continue;
                        }
                        received += n as u64;
                    }

                    producer_handle.join().unwrap();
                });
            },
        );
    }

    group.finish();
}

fn bench_all_or_nothing_vs_best_effort(c: &mut Criterion) {
    let mut group = c.benchmark_group("spsc_bytes_write_mode");
    group.throughput(Throughput::Bytes(TOTAL_BYTES));

    group.bench_function("best_effort_write", |b| {
        b.iter(|| {
            let (producer, consumer) = Fifo::build(1 << 14, FifoConfig::default()).unwrap();
            let payload = vec![0xEFu8; 512];

            let producer_handle = thread::spawn(move || {
                let mut sent = 0u64;
                while sent < TOTAL_BYTES {
                    let n = producer.write(&payload);
                    sent += n as u64;
                    if n == 0 {
                        std::hint::spin_loop();
                    }
                }
            });

            let mut dst = vec![0u8; 512];
            let mut received = 0u64;
            while received < TOTAL_BYTES {
                let n = consumer.read(&mut dst);
                black_box(&dst[..n]);
                received += n as u64;
                if n == 0 {
                    std::hint::spin_loop();
                }
            }

            producer_handle.join().unwrap();
        });
    });

    group.bench_function("all_or_nothing_write", |b| {
        b.iter(|| {
            let (producer, consumer) = Fifo::build(1 << 14, FifoConfig::default()).unwrap();
            let payload = vec![0xEFu8; 512];

            let producer_handle = thread::spawn(move || {
                let mut sent = 0u64;
                while sent < TOTAL_BYTES {
                    if producer.write_all(&payload) {
                        sent += payload.len() as u64;
                    } else {
                        std::hint::spin_loop();
                    }
                }
            });

            let mut dst = vec![0u8; 512];
            let mut received = 0u64;
            while received < TOTAL_BYTES {
                if consumer.read_all(&mut dst) {
                    black_box(&dst);
                    received += dst.len() as u64;
                } else {
                    std::hint::spin_loop();
                }
            }

            producer_handle.join().unwrap();
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_spsc_throughput,
    bench_chunk_sizes,
    bench_all_or_nothing_vs_best_effort
);
criterion_main!(benches);
