use rulesieve::{
    CompileOptions, Entity, FieldType, Locale, Schema, SieveError, TypedEntity, Value,
    compile_json,
};
use tracing_subscriber::EnvFilter;

struct Product {
    name: &'static str,
    price: f64,
    tags: Vec<&'static str>,
}

impl Entity for Product {
    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "name" => Some(self.name.into()),
            "price" => Some(self.price.into()),
            "tags" => Some(self.tags.clone().into()),
            _ => None,
        }
    }
}

impl TypedEntity for Product {
    fn schema() -> Schema {
        Schema::new("Product")
            .field("name", FieldType::String)
            .field("price", FieldType::Float)
            .field("tags", FieldType::list(FieldType::String))
    }
}

// What a query-builder front end posts, with German number formatting.
const RULES: &str = r#"{
    "condition": "AND",
    "rules": [
        {"id": "price", "field": "price", "type": "double", "operator": "between",
         "value": ["1,50", "20,00"]},
        {"condition": "OR", "not": true, "rules": [
            {"id": "tags", "field": "tags", "type": "string", "operator": "contains",
             "value": "discontinued"}
        ]}
    ]
}"#;

fn main() -> Result<(), SieveError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let options = CompileOptions::new().locale(Locale::from_tag("de-DE")?);
    let pred = compile_json::<Product>(RULES, &options)?;
    println!("{pred}");

    let catalog = [
        Product {
            name: "pencil",
            price: 1.25,
            tags: vec!["office"],
        },
        Product {
            name: "notebook",
            price: 4.99,
            tags: vec!["office", "paper"],
        },
        Product {
            name: "stapler",
            price: 12.0,
            tags: vec!["office", "discontinued"],
        },
        Product {
            name: "lamp",
            price: 35.0,
            tags: vec![],
        },
    ];

    for product in pred.filter_all(&catalog)? {
        println!("match: {}", product.name);
    }
    Ok(())
}
