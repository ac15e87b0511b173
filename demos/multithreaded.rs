use std::thread;

use rulesieve::{CompileOptions, FieldType, Record, Schema, all, compile_with_schema, field};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let schema = Schema::new("User")
        .field("age", FieldType::Int)
        .field("status", FieldType::String);
    let allowed = compile_with_schema::<Record>(
        &all([field("age").greater_or_equal(18), field("status").equal("active")]),
        &schema,
        &CompileOptions::new(),
    )
    .expect("failed to compile rules");

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let pred = allowed.clone();
            thread::spawn(move || {
                let user = Record::new()
                    .set("age", 16_i64 + i64::from(i))
                    .set("status", "active");
                let result = pred.evaluate(&user);
                println!("Thread {i}: {result:?}");
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }
}
