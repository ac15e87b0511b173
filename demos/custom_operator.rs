use std::net::Ipv4Addr;

use rulesieve::operators::Fragment;
use rulesieve::{
    CoercionError, CompileError, CompileOptions, FieldType, OperatorDefinition, Record, Schema,
    TypeTag, compile_with_schema, field,
};
use serde_json::json;
use tracing_subscriber::EnvFilter;

/// `in_ip_range`: the field holds an IPv4 address within `[lower, upper]`.
fn in_ip_range() -> OperatorDefinition {
    OperatorDefinition::new("in_ip_range", |leaf| {
        let bounds: Vec<Ipv4Addr> = leaf
            .literals()
            .into_iter()
            .map(|literal| {
                literal
                    .as_str()
                    .and_then(|s| s.parse().ok())
                    .ok_or_else(|| CompileError::Coercion {
                        field: leaf.rule().field.clone(),
                        source: CoercionError::Invalid {
                            literal: literal.to_string(),
                            target: TypeTag::String,
                        },
                    })
            })
            .collect::<Result<_, _>>()?;
        let &[lower, upper] = bounds.as_slice() else {
            return Err(CompileError::Coercion {
                field: leaf.rule().field.clone(),
                source: CoercionError::Arity {
                    operator: leaf.rule().operator.clone(),
                    expected: 2,
                    actual: bounds.len(),
                },
            });
        };
        Ok(Fragment::any(move |v| {
            v.as_str()
                .and_then(|s| s.parse::<Ipv4Addr>().ok())
                .is_some_and(|ip| (lower..=upper).contains(&ip))
        }))
    })
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let schema = Schema::new("Request")
        .field("path", FieldType::String)
        .field("client_ip", FieldType::String);
    let options = CompileOptions::new().operator(in_ip_range());
    let internal = field("client_ip").op("in_ip_range", json!(["10.0.0.0", "10.255.255.255"]));

    let pred = compile_with_schema::<Record>(&internal, &schema, &options)
        .expect("failed to compile rules");

    for ip in ["10.1.2.3", "192.168.0.1"] {
        let request = Record::new().set("path", "/admin").set("client_ip", ip);
        println!("{ip}: {}", pred.matches(&request));
    }

    // Without the registration the same tree is rejected.
    match compile_with_schema::<Record>(&internal, &schema, &CompileOptions::new()) {
        Ok(_) => println!("unexpectedly compiled"),
        Err(err) => println!("without registration: {err}"),
    }
}
