#![cfg(test)]

use struct2msg::{
    generate_from_clang_json, generate_from_header, schemas_to_json,
    traits::{Frontend, HeaderFrontend},
    EmissionFilter, FieldDescriptor, GeneratorConfig, SchemaDefinition,
};

#[test]
fn test_generate_from_header() {
    let input = r#"
    struct Point { int x; int y; };
    typedef struct { double lat; double lon; } GeoFit;
    struct { int lost; } orphan;
    "#;
    let out = generate_from_header(input, &GeneratorConfig::default()).expect("generate_from_header failed");
    assert_eq!(out.report.schemas.len(), 2);
    assert_eq!(out.report.failures.len(), 1);
    assert_eq!(out.text, out.report.render());
    assert!(out.text.ends_with("Message GeoFit {\noptional double lat = 1;\noptional double lon = 2;\n}\n"));
}

#[test]
fn test_generate_from_clang_json() {
    let json = r#"{
      "kind": "TranslationUnitDecl",
      "inner": [
        {"kind": "CXXRecordDecl", "name": "Point", "tagUsed": "struct", "completeDefinition": true,
         "inner": [
           {"kind": "FieldDecl", "name": "x", "type": {"qualType": "int"}},
           {"kind": "FieldDecl", "name": "y", "type": {"qualType": "int"}}
         ]}
      ]
    }"#;
    let config = GeneratorConfig::with_filter(EmissionFilter::contains("Point"));
    let out = generate_from_clang_json(json, &config).expect("generate_from_clang_json failed");
    assert_eq!(out.text, "Message Point {\noptional int x = 1;\noptional int y = 2;\n}\n");
}

#[test]
fn test_schemas_to_json() {
    let schemas = vec![
        SchemaDefinition::new("Point", vec![
            FieldDescriptor::new("int", "x"),
            FieldDescriptor::new("int", "y"),
        ]),
        SchemaDefinition::new("Empty", vec![]),
    ];
    let json = schemas_to_json(&schemas).expect("schemas_to_json failed");
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value, serde_json::json!([
        {
            "name": "Point",
            "fields": [
                { "tag": 1, "type": "int", "name": "x" },
                { "tag": 2, "type": "int", "name": "y" }
            ]
        },
        { "name": "Empty", "fields": [] }
    ]));
}

#[test]
fn test_frontend_trait_object() {
    let frontends: Vec<Box<dyn Frontend>> = vec![Box::new(HeaderFrontend)];
    let report = struct2msg::compile(frontends[0].as_ref(), "class A { char c; };", &GeneratorConfig::default())
        .expect("compile failed");
    assert_eq!(report.schemas[0].fields, vec![FieldDescriptor::new("char", "c")]);
}
