use rulesieve::{
    CompileError, CompileOptions, Entity, FieldType, RuleNode, Schema, SieveError, TypedEntity,
    Value, all, compile, compile_json, field,
};

#[derive(Debug)]
struct Product {
    name: String,
    price: f64,
    category: i64,
    in_stock: bool,
}

impl Entity for Product {
    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "name" => Some(self.name.as_str().into()),
            "price" => Some(self.price.into()),
            "category" => Some(self.category.into()),
            "in_stock" => Some(self.in_stock.into()),
            _ => None,
        }
    }
}

impl TypedEntity for Product {
    fn schema() -> Schema {
        Schema::new("Product")
            .field("name", FieldType::String)
            .field("price", FieldType::Float)
            .field("category", FieldType::Int)
            .field("in_stock", FieldType::Bool)
    }
}

fn catalog() -> Vec<Product> {
    vec![
        Product {
            name: "Pencil".into(),
            price: 1.25,
            category: 2,
            in_stock: true,
        },
        Product {
            name: "Notebook".into(),
            price: 10.5,
            category: 2,
            in_stock: false,
        },
        Product {
            name: "Lamp".into(),
            price: 25.0,
            category: 7,
            in_stock: true,
        },
    ]
}

const QUERY_BUILDER: &str = r#"{
    "condition": "AND",
    "rules": [
        {"id": "price", "field": "price", "type": "double", "input": "number",
         "operator": "less", "value": 10.25},
        {"condition": "OR", "rules": [
            {"id": "category", "field": "category", "type": "integer", "input": "select",
             "operator": "equal", "value": "2"},
            {"id": "category", "field": "category", "type": "integer", "input": "select",
             "operator": "equal", "value": "1"}
        ]}
    ],
    "valid": true
}"#;

#[test]
fn compile_query_builder_output() {
    let pred = compile_json::<Product>(QUERY_BUILDER, &CompileOptions::new()).unwrap();
    let items = catalog();
    let names: Vec<&str> = pred
        .filter_all(&items)
        .unwrap()
        .into_iter()
        .map(|p| p.name.as_str())
        .collect();
    assert_eq!(names, ["Pencil"]);
}

#[test]
fn deserialize_then_compile() {
    let node: RuleNode = serde_json::from_str(QUERY_BUILDER).unwrap();
    assert_eq!(node.leaf_count(), 3);
    assert_eq!(node.fields(), ["price", "category"]);
    let pred = compile::<Product>(&node, &CompileOptions::new()).unwrap();
    assert_eq!(pred.leaf_count(), 3);
}

#[test]
fn untyped_leaf_defaults_to_string_and_follows_field() {
    let json = r#"{"field": "category", "operator": "in", "value": ["7", "9"]}"#;
    let pred = compile_json::<Product>(json, &CompileOptions::new()).unwrap();
    let items = catalog();
    assert_eq!(pred.filter_all(&items).unwrap().len(), 1);
}

#[test]
fn negated_group_on_the_wire() {
    let json = r#"{"condition": "OR", "not": true, "rules": [
        {"field": "in_stock", "type": "boolean", "operator": "equal", "value": false}
    ]}"#;
    let pred = compile_json::<Product>(json, &CompileOptions::new()).unwrap();
    let items = catalog();
    assert_eq!(pred.filter_all(&items).unwrap().len(), 2);
}

#[test]
fn malformed_json() {
    let err = compile_json::<Product>("{\"rules\": [", &CompileOptions::new()).unwrap_err();
    assert!(matches!(err, SieveError::Json(_)));
}

#[test]
fn invalid_structure_names_location() {
    let json = r#"{"rules": [{"field": "price", "operator": "less", "value": 1}, "oops"]}"#;
    let err = compile_json::<Product>(json, &CompileOptions::new()).unwrap_err();
    match err {
        SieveError::Compile(CompileError::InvalidRuleStructure { location, reason }) => {
            assert_eq!(location, "root.rules[1]");
            assert_eq!(reason, "expected an object, found a string");
        }
        other => panic!("expected invalid structure, got {other:?}"),
    }
}

#[test]
fn unknown_field_from_json() {
    let json = r#"{"field": "colour", "operator": "equal", "value": "red"}"#;
    let err = compile_json::<Product>(json, &CompileOptions::new()).unwrap_err();
    assert!(matches!(
        err,
        SieveError::Compile(CompileError::FieldNotFound { ref segment, .. }) if segment == "colour"
    ));
}

#[test]
fn malformed_literal_from_json() {
    let json = r#"{"field": "price", "type": "double", "operator": "between", "value": ["1", "x"]}"#;
    let err = compile_json::<Product>(json, &CompileOptions::new()).unwrap_err();
    assert!(matches!(err, SieveError::Compile(CompileError::Coercion { .. })));
}

#[test]
fn options_from_json() {
    let options = CompileOptions::from_json(
        r#"{"locale": "de-DE", "case_sensitive_strings": true, "missing_key": "null"}"#,
    )
    .unwrap();
    let json = r#"{"field": "price", "type": "double", "operator": "greater", "value": "10,25"}"#;
    let pred = compile_json::<Product>(json, &options).unwrap();
    let items = catalog();
    assert_eq!(pred.filter_all(&items).unwrap().len(), 2);

    let strict = compile::<Product>(&field("name").equal("pencil"), &options).unwrap();
    assert!(!strict.matches(&items[0]));
}

#[test]
fn options_reject_unknown_keys_and_locales() {
    assert!(CompileOptions::from_json(r#"{"colour": true}"#).is_err());
    assert!(CompileOptions::from_json(r#"{"locale": "xx-YY"}"#).is_err());
}

#[test]
fn serialized_tree_reads_back() {
    let node = all([field("price").less(10.25), !field("name").begins_with("No")]);
    let json = serde_json::to_string_pretty(&node).unwrap();
    let pred = compile_json::<Product>(&json, &CompileOptions::new()).unwrap();
    let items = catalog();
    assert_eq!(pred.filter_all(&items).unwrap().len(), 1);
}
