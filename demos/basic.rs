use spsc_fifo_rs::{Backoff, Fifo, FifoConfig};
use std::thread;
use std::time::Instant;

fn main() {
    println!("spsc-fifo-rs Basic Example");
    println!("==========================\n");

    let capacity = 1 << 16; // 64 KiB
    let total_bytes: usize = 64 * 1024 * 1024;
    let chunk = 4096;

    let (producer, consumer) = Fifo::build(capacity, FifoConfig::with_metrics()).unwrap();

    println!("Configuration:");
    println!("  Ring capacity: {} bytes", producer.capacity());
    println!("  Total bytes: {total_bytes}");
    println!("  Chunk size: {chunk} bytes\n");

    let start = Instant::now();

    let producer_handle = thread::spawn(move || {
        let payload: Vec<u8> = (0..chunk).map(|i| (i % 256) as u8).collect();
        let mut sent = 0;
        let mut backoff = Backoff::new();
        while sent < total_bytes {
            let want = chunk.min(total_bytes - sent);
            let n = producer.write(&payload[..want]);
            if n == 0 {
                backoff.snooze();
                continue;
            }
            backoff.reset();
            sent += n;
        }
        producer
    });

    let consumer_handle = thread::spawn(move || {
        let mut buf = vec![0u8; chunk];
        let mut received = 0;
        let mut backoff = Backoff::new();
        while received < total_bytes {
            let n = consumer.read(&mut buf);
            if n == 0 {
                backoff.snooze();
                continue;
            }
            backoff.reset();
            received += n;
        }
        (consumer, received)
    });

    let producer = producer_handle.join().unwrap();
    let (consumer, received) = consumer_handle.join().unwrap();
    let duration = start.elapsed();

    let bytes_per_sec = received as f64 / duration.as_secs_f64();

    println!("Results:");
    println!("  Bytes received: {received}");
    println!("  Duration: {duration:.2?}");
    println!("  Throughput: {:.2} MB/sec", bytes_per_sec / 1_000_000.0);
    println!("  Producer metrics: {:?}", producer.metrics());
    println!("  Consumer metrics: {:?}", consumer.metrics());
}
