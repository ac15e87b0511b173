use std::thread;
use std::time::{Duration, Instant};

use criterion::{Criterion, criterion_group, criterion_main};
use rulesieve::{
    CompileOptions, FieldType, Predicate, Record, Schema, all, any, compile_with_schema, field,
};

fn build_shared_predicate() -> (Predicate<Record>, Vec<Record>) {
    let schema = Schema::new("Order")
        .field("total", FieldType::Float)
        .field("status", FieldType::String)
        .field("tags", FieldType::list(FieldType::String));
    let node = all([
        field("total").between(10.0, 500.0),
        any([
            field("status").is_in(["paid", "shipped"]),
            field("tags").contains("priority"),
        ]),
        field("status").not_equal("refunded"),
    ]);
    let pred = compile_with_schema(&node, &schema, &CompileOptions::new()).unwrap();

    let statuses = ["paid", "shipped", "pending", "refunded"];
    let orders = (0..1000)
        .map(|i| {
            let mut tags = vec!["web"];
            if i % 7 == 0 {
                tags.push("priority");
            }
            Record::new()
                .set("total", f64::from(i % 600))
                .set("status", statuses[i as usize % statuses.len()])
                .set("tags", tags)
        })
        .collect();

    (pred, orders)
}

fn bench_throughput(c: &mut Criterion) {
    let thread_counts = [1, 2, 4, 8];

    let mut group = c.benchmark_group("throughput");
    group.measurement_time(Duration::from_secs(5));

    for &threads in &thread_counts {
        let (pred, orders) = build_shared_predicate();

        group.bench_function(&format!("{threads}_threads"), |b| {
            b.iter_custom(|iters| {
                let per_thread = iters / threads as u64;
                let handles: Vec<_> = (0..threads)
                    .map(|_| {
                        let p = pred.clone();
                        let batch = orders.clone();
                        thread::spawn(move || {
                            let start = Instant::now();
                            for _ in 0..per_thread {
                                let _ = p.filter_all(&batch);
                            }
                            start.elapsed()
                        })
                    })
                    .collect();

                let mut max_elapsed = Duration::ZERO;
                for h in handles {
                    let elapsed = h.join().unwrap();
                    if elapsed > max_elapsed {
                        max_elapsed = elapsed;
                    }
                }
                max_elapsed
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_throughput);
criterion_main!(benches);
