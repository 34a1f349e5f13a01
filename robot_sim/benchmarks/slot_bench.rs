use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use robot_runtime::Command;
use robot_sim::LatestCommandSlot;

fn bench_slot(c: &mut Criterion) {
    let mut group = c.benchmark_group("slot");

    group.bench_function("publish_take_uncontended", |b| {
        let slot = LatestCommandSlot::new();
        b.iter(|| {
            slot.publish(black_box(Command::Left));
            black_box(slot.take())
        })
    });

    group.bench_function("take_with_busy_writer", |b| {
        let slot = Arc::new(LatestCommandSlot::new());
        let running = Arc::new(AtomicBool::new(true));
        let writer = {
            let slot = Arc::clone(&slot);
            let running = Arc::clone(&running);
            thread::spawn(move || {
                let mut i = 0usize;
                while running.load(Ordering::Relaxed) {
                    slot.publish(Command::ALL[i % 4]);
                    i = i.wrapping_add(1);
                }
            })
        };

        b.iter(|| black_box(slot.take()));

        running.store(false, Ordering::Relaxed);
        writer.join().expect("writer thread");
    });

    group.finish();
}

criterion_group!(slot_benches, bench_slot);
criterion_main!(slot_benches);
