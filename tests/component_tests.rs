use chart_scene::component::Component;
use chart_scene::core::{SettingKey, SettingValue};
use chart_scene::scene::Root;
use serde_json::json;

fn sample_component() -> Component {
    let mut component = Component::new();
    component.map_field("value", SettingKey::Y);
    component.map_field("label", SettingKey::Text);
    component
}

#[test]
fn records_map_declared_fields_to_settings() {
    let mut component = sample_component();
    let index = component
        .push_record(json!({ "value": 42.5, "label": "Q1", "extra": [1, 2] }))
        .expect("valid record");

    let item = component.item(index).expect("item");
    assert_eq!(item.float(&SettingKey::Y), Some(42.5));
    assert_eq!(
        item.value(&SettingKey::Text),
        Some(&SettingValue::Text("Q1".to_owned()))
    );
    // Unmapped fields stay in the raw record untouched.
    assert_eq!(item.record()["extra"], json!([1, 2]));
}

#[test]
fn missing_mapped_fields_are_simply_absent() {
    let mut component = sample_component();
    let index = component
        .push_record(json!({ "label": "no value" }))
        .expect("valid record");

    let item = component.item(index).expect("item");
    assert_eq!(item.float(&SettingKey::Y), None);
}

#[test]
fn non_object_records_are_rejected() {
    let mut component = sample_component();
    assert!(component.push_record(json!(42)).is_err());
    assert!(component.push_record(json!(["a", "b"])).is_err());
    assert!(component.is_empty());
}

#[test]
fn set_data_replaces_everything_atomically() {
    let mut root = Root::new();
    let mut component = sample_component();
    component
        .push_record(json!({ "value": 1.0 }))
        .expect("valid record");

    // One bad record rejects the whole batch, leaving current data alone.
    let result = component.set_data(
        &mut root,
        vec![json!({ "value": 2.0 }), json!("not a record")],
    );
    assert!(result.is_err());
    assert_eq!(component.len(), 1);

    component
        .set_data(&mut root, vec![json!({ "value": 2.0 }), json!({ "value": 3.0 })])
        .expect("valid batch");
    assert_eq!(component.len(), 2);
    assert_eq!(
        component.item(0).expect("item").float(&SettingKey::Y),
        Some(2.0)
    );
}

#[test]
fn removing_a_record_disposes_its_bound_elements() {
    let mut root = Root::new();
    let mut component = sample_component();
    component
        .push_record(json!({ "value": 10.0 }))
        .expect("valid record");
    component
        .push_record(json!({ "value": 20.0 }))
        .expect("valid record");

    let first_visual = root.new_graphics();
    root.push_child(root.container(), first_visual);
    let second_visual = root.new_graphics();
    root.push_child(root.container(), second_visual);
    component.bind(0, first_visual).expect("bind");
    component.bind(1, second_visual).expect("bind");

    let removed = component.remove_record(&mut root, 0).expect("remove");
    assert_eq!(removed["value"], json!(10.0));
    assert!(!root.is_live(first_visual));
    assert!(root.is_live(second_visual));
    assert_eq!(component.len(), 1);
}

#[test]
fn clear_tears_down_every_bound_element() {
    let mut root = Root::new();
    let mut component = sample_component();
    let mut visuals = Vec::new();
    for value in [1.0, 2.0, 3.0] {
        let index = component
            .push_record(json!({ "value": value }))
            .expect("valid record");
        let visual = root.new_graphics();
        root.push_child(root.container(), visual);
        component.bind(index, visual).expect("bind");
        visuals.push(visual);
    }

    component.clear(&mut root);
    assert!(component.is_empty());
    assert!(visuals.iter().all(|visual| !root.is_live(*visual)));
}

#[test]
fn bind_to_missing_item_is_an_error() {
    let mut root = Root::new();
    let mut component = sample_component();
    let node = root.new_graphics();
    root.push_child(root.container(), node);

    assert!(component.bind(3, node).is_err());
}
