use ichub_engine::{
    ErrorIndex, append_item, build_hierarchy, collect_leaves, correlate, group_by_section, interpret_schema,
    interpret_schema_with, InterpretOptions, validate_form,
};
use ichub_types::{FieldType, ItemType};
use ichub_util::{get_value, set_value};
use serde_json::{Value, json};

fn load_fixture() -> Value {
    let schema = include_str!("data/catalog_part_schema.json");
    serde_json::from_str(schema).expect("parse catalog part fixture")
}

#[test]
fn required_error_reaches_named_field_and_append_extends_tags() {
    let schema = json!({
        "name": { "type": "text", "required": true },
        "tags": { "type": "array", "itemType": "text" }
    });
    let fields = interpret_schema(&schema).expect("interpret shorthand schema");
    assert_eq!(fields.len(), 2);
    assert!(fields[0].required);

    let errors = correlate(&["name is required"]);
    let name = errors.state_for_key("name");
    assert!(name.has_error);
    assert_eq!(name.messages, vec!["is required".to_string()]);
    assert!(!errors.state_for_key("tags").is_flagged());

    let FieldType::Array { items } = &fields[1].field_type else {
        panic!("tags should be an array field, got {:?}", fields[1].field_type);
    };
    assert_eq!(items, &ItemType::Text);
    let data = append_item(&json!({}), "tags", items);
    assert_eq!(data, json!({ "tags": [""] }));
    assert_eq!(get_value(&data, "tags[0]"), Some(&json!("")));
}

#[test]
fn indexed_error_correlates_to_item_descriptor() {
    let fields = interpret_schema(&load_fixture()).expect("interpret fixture");
    let materials = fields.iter().find(|field| field.key == "materialList").expect("materialList present");
    let item_name = materials
        .children()
        .iter()
        .find(|child| child.leaf_name() == "name")
        .expect("item name descriptor");
    assert_eq!(item_name.key, "materialList[item].name");

    let errors = correlate(&["materialList[0].name is required"]);
    assert!(errors.state_for_key(&item_name.key).has_error);
    assert!(errors.state_for_key("materialList.name").has_error);
    assert!(errors.state_for("materialList[0].name", &item_name.key).has_error);
    assert!(!errors.state_for("materialList[1].name", &item_name.key).has_error);

    let list = errors.state_for_key("materialList");
    assert!(list.has_child_errors, "collapsed list should flag errors inside");
    assert!(list.messages.is_empty());
}

#[test]
fn fixture_sections_and_tree_follow_schema_order() {
    let fields = interpret_schema(&load_fixture()).expect("interpret fixture");
    let sections = group_by_section(&fields);
    assert_eq!(
        sections.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["Identification", "Physical Properties", "Materials"]
    );

    let tree = build_hierarchy(&sections["Physical Properties"]).expect("physical tree");
    let leaves = collect_leaves(&tree).into_iter().map(|field| field.key.as_str()).collect::<Vec<_>>();
    assert_eq!(
        leaves,
        vec![
            "physical.weight.value",
            "physical.weight.unit",
            "physical.dimensions.width.value",
            "physical.dimensions.width.unit",
            "physical.dimensions.height.value",
            "physical.dimensions.height.unit",
        ]
    );
    let part_id = &fields[0];
    assert_eq!(part_id.label, "Manufacturer Part ID");
    assert_eq!(part_id.placeholder.as_deref(), Some("MP-0001"));
    assert!(part_id.has_documentation());
}

#[test]
fn local_validation_feeds_the_correlator() {
    let fields = interpret_schema(&load_fixture()).expect("interpret fixture");
    let mut data = json!({ "manufacturerPartId": "bad id!" });
    data = set_value(&data, "materialList", json!([{ "name": "steel", "share": 70 }, { "name": "", "share": 130 }]));

    let issues = validate_form(&fields, &data);
    let messages = issues.iter().map(ToString::to_string).collect::<Vec<_>>();
    assert_eq!(
        messages,
        vec![
            "manufacturerPartId must match the pattern ^[A-Za-z0-9-]+$",
            "name is required",
            "materialList[1].name is required",
            "materialList[1].share must be less than or equal to 100",
        ]
    );

    let index: ErrorIndex = correlate(&messages);
    assert!(index.unattributed().is_empty());
    assert!(index.state_for("materialList[1]", "materialList[item]").has_child_errors);
    assert!(!index.state_for("materialList[0]", "materialList[item]").has_child_errors);
    assert!(index.state_for_key("materialList[item].share").has_error);
}

#[test]
fn required_only_keeps_required_item_fields() {
    let fields = interpret_schema_with(&load_fixture(), InterpretOptions { required_only: true }).expect("interpret");
    let keys = fields.iter().map(|field| field.key.as_str()).collect::<Vec<_>>();
    assert_eq!(keys, vec!["manufacturerPartId", "name", "materialList"]);
    assert_eq!(fields[2].children().len(), 2);
}
