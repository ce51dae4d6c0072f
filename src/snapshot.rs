//! Serialization boundary: a read-only walk of public settings and
//! children producing a plain JSON tree, and reconstruction of that tree
//! through the same public surface the walk reads.

use indexmap::IndexMap;
use serde_json::{json, Map, Value};

use crate::core::settings::SettingKey;
use crate::core::value::{Color, Percent, PositionMode, SettingValue};
use crate::error::{SceneError, SceneResult};
use crate::scene::layout::Layout;
use crate::scene::node::{NodeId, NodeKind};
use crate::scene::root::Root;

/// Serializes the subtree at `id` into a `{type, settings, children}`
/// tree. Only explicitly set public settings are written; template, theme
/// and private values are presentation state, not document state.
#[must_use]
pub fn snapshot(root: &Root, id: NodeId) -> Value {
    let node = root.node_ref(id);
    let mut object = Map::new();
    object.insert("type".to_owned(), json!(node.class_name()));
    if let Some(name) = node.name() {
        object.insert("name".to_owned(), json!(name));
    }
    if let NodeKind::Container(data) = node.kind() {
        if data.layout != Layout::None {
            object.insert("layout".to_owned(), layout_to_json(data.layout));
        }
    }

    let mut settings = Map::new();
    for key in node.settings().keys() {
        if let Some(value) = node.settings().get(key) {
            settings.insert(key.name().to_owned(), setting_to_json(&value));
        }
    }
    if !settings.is_empty() {
        object.insert("settings".to_owned(), Value::Object(settings));
    }

    if let Some(children) = node.children() {
        if !children.is_empty() {
            let serialized: Vec<Value> = children
                .iter()
                .filter(|child| root.is_live(**child))
                .map(|child| snapshot(root, *child))
                .collect();
            object.insert("children".to_owned(), Value::Array(serialized));
        }
    }

    Value::Object(object)
}

/// Rebuilds a snapshot into a detached subtree, returning its root node.
///
/// `#name` string values copy the same setting from the named node, which
/// must appear earlier in document order; `##` escapes a literal leading
/// `#`. Reconstruction uses only public constructors and `set`, so a
/// rebuilt tree behaves identically to a hand-built one.
pub fn restore(root: &mut Root, value: &Value) -> SceneResult<NodeId> {
    let mut names: IndexMap<String, NodeId> = IndexMap::new();
    restore_node(root, value, &mut names)
}

fn restore_node(
    root: &mut Root,
    value: &Value,
    names: &mut IndexMap<String, NodeId>,
) -> SceneResult<NodeId> {
    let object = value
        .as_object()
        .ok_or_else(|| SceneError::MalformedSnapshot("node must be a JSON object".to_owned()))?;
    let node_type = object
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| SceneError::MalformedSnapshot("node is missing `type`".to_owned()))?;

    let id = match node_type {
        "Container" => {
            let layout = match object.get("layout") {
                Some(layout) => layout_from_json(layout)?,
                None => Layout::None,
            };
            root.new_container(layout)
        }
        "Graphics" => root.new_graphics(),
        "Label" => root.new_label(""),
        other => {
            return Err(SceneError::MalformedSnapshot(format!(
                "unknown node type `{other}`"
            )))
        }
    };

    if let Some(name) = object.get("name").and_then(Value::as_str) {
        root.set_name(id, name);
        names.insert(name.to_owned(), id);
    }

    if let Some(settings) = object.get("settings") {
        let settings = settings.as_object().ok_or_else(|| {
            SceneError::MalformedSnapshot("`settings` must be a JSON object".to_owned())
        })?;
        for (name, raw) in settings {
            let key = SettingKey::parse(name);
            let value = match raw.as_str() {
                Some(text) if text.starts_with("##") => SettingValue::Text(text[1..].to_owned()),
                Some(text) if text.starts_with('#') => resolve_reference(root, names, text, &key)?,
                _ => setting_from_json(raw)?,
            };
            root.set(id, key, value);
        }
    }

    if let Some(children) = object.get("children") {
        let children = children.as_array().ok_or_else(|| {
            SceneError::MalformedSnapshot("`children` must be a JSON array".to_owned())
        })?;
        for child in children {
            let child_id = restore_node(root, child, names)?;
            root.push_child(id, child_id);
        }
    }

    Ok(id)
}

fn resolve_reference(
    root: &Root,
    names: &IndexMap<String, NodeId>,
    reference: &str,
    key: &SettingKey,
) -> SceneResult<SettingValue> {
    let name = &reference[1..];
    let target = names
        .get(name)
        .copied()
        .ok_or_else(|| SceneError::UnknownRef(name.to_owned()))?;
    root.get(target, key).ok_or_else(|| {
        SceneError::UnknownRef(format!("`{name}` has no `{}` setting", key.name()))
    })
}

fn layout_to_json(layout: Layout) -> Value {
    match layout {
        Layout::None => json!("none"),
        Layout::Vertical => json!("vertical"),
        Layout::Horizontal => json!("horizontal"),
        Layout::Grid { columns } => json!({ "grid": columns }),
    }
}

fn layout_from_json(value: &Value) -> SceneResult<Layout> {
    match value {
        Value::String(name) => match name.as_str() {
            "none" => Ok(Layout::None),
            "vertical" => Ok(Layout::Vertical),
            "horizontal" => Ok(Layout::Horizontal),
            other => Err(SceneError::MalformedSnapshot(format!(
                "unknown layout `{other}`"
            ))),
        },
        Value::Object(object) => {
            let columns = object
                .get("grid")
                .and_then(Value::as_u64)
                .ok_or_else(|| {
                    SceneError::MalformedSnapshot("grid layout needs a `grid` count".to_owned())
                })?;
            Ok(Layout::Grid {
                columns: columns as usize,
            })
        }
        other => Err(SceneError::MalformedSnapshot(format!(
            "layout must be a string or object, got {other}"
        ))),
    }
}

fn setting_to_json(value: &SettingValue) -> Value {
    match value {
        SettingValue::Float(float) => json!(float),
        SettingValue::Bool(flag) => json!(flag),
        SettingValue::Text(text) => {
            if text.starts_with('#') {
                json!(format!("#{text}"))
            } else {
                json!(text)
            }
        }
        SettingValue::Color(color) => {
            json!({ "color": [color.red, color.green, color.blue, color.alpha] })
        }
        SettingValue::Percent(percent) => json!({ "percent": percent.0 }),
        SettingValue::Size(size) => match size {
            crate::core::value::Size::Absolute(length) => json!(length),
            crate::core::value::Size::Relative(percent) => json!({ "percent": percent.0 }),
        },
        SettingValue::Position(mode) => match mode {
            PositionMode::Relative => json!({ "position": "relative" }),
            PositionMode::Absolute => json!({ "position": "absolute" }),
        },
        SettingValue::Json(inner) => json!({ "json": inner }),
    }
}

fn setting_from_json(value: &Value) -> SceneResult<SettingValue> {
    match value {
        Value::Number(number) => number.as_f64().map(SettingValue::Float).ok_or_else(|| {
            SceneError::MalformedSnapshot(format!("setting number out of range: {number}"))
        }),
        Value::Bool(flag) => Ok(SettingValue::Bool(*flag)),
        Value::String(text) => Ok(SettingValue::Text(text.clone())),
        Value::Object(object) => {
            if let Some(percent) = object.get("percent").and_then(Value::as_f64) {
                return Ok(SettingValue::Percent(Percent(percent)));
            }
            if let Some(channels) = object.get("color").and_then(Value::as_array) {
                let mut parsed = [0.0; 4];
                if channels.len() != 4 {
                    return Err(SceneError::MalformedSnapshot(
                        "color must have 4 channels".to_owned(),
                    ));
                }
                for (slot, channel) in parsed.iter_mut().zip(channels) {
                    *slot = channel.as_f64().ok_or_else(|| {
                        SceneError::MalformedSnapshot("color channels must be numbers".to_owned())
                    })?;
                }
                let color = Color::rgba(parsed[0], parsed[1], parsed[2], parsed[3]);
                color.validate()?;
                return Ok(SettingValue::Color(color));
            }
            if let Some(mode) = object.get("position").and_then(Value::as_str) {
                return match mode {
                    "relative" => Ok(SettingValue::Position(PositionMode::Relative)),
                    "absolute" => Ok(SettingValue::Position(PositionMode::Absolute)),
                    other => Err(SceneError::MalformedSnapshot(format!(
                        "unknown position mode `{other}`"
                    ))),
                };
            }
            if let Some(inner) = object.get("json") {
                return Ok(SettingValue::Json(inner.clone()));
            }
            Err(SceneError::MalformedSnapshot(format!(
                "unrecognized setting object: {}",
                Value::Object(object.clone())
            )))
        }
        other => Err(SceneError::MalformedSnapshot(format!(
            "unsupported setting value: {other}"
        ))),
    }
}
