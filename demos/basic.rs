use rulesieve::{CompileOptions, Entity, FieldType, Schema, TypedEntity, Value, all, compile, field};
use tracing_subscriber::EnvFilter;

struct User {
    name: String,
    age: i64,
    status: String,
}

impl Entity for User {
    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "name" => Some(self.name.as_str().into()),
            "age" => Some(self.age.into()),
            "status" => Some(self.status.as_str().into()),
            _ => None,
        }
    }
}

impl TypedEntity for User {
    fn schema() -> Schema {
        Schema::new("User")
            .field("name", FieldType::String)
            .field("age", FieldType::Int)
            .field("status", FieldType::String)
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Define rules
    let rules = all([
        field("age").greater_or_equal(18),
        field("status").equal("active"),
    ]);
    println!("rules:     {rules}");

    let can_proceed =
        compile::<User>(&rules, &CompileOptions::new()).expect("failed to compile rules");
    println!("predicate: {can_proceed}");

    // Evaluate against a few users
    let users = [
        User {
            name: "ada".into(),
            age: 25,
            status: "Active".into(),
        },
        User {
            name: "bob".into(),
            age: 15,
            status: "active".into(),
        },
        User {
            name: "cy".into(),
            age: 40,
            status: "closed".into(),
        },
    ];
    for user in &users {
        println!("{}: {}", user.name, can_proceed.matches(user));
    }
}
