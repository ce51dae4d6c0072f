use indexmap::IndexMap;
use serde_json::Value;

use crate::core::settings::SettingKey;
use crate::core::value::SettingValue;
use crate::error::{SceneError, SceneResult};
use crate::scene::node::NodeId;
use crate::scene::root::Root;

/// One bound data record: the raw record, its mapped settings and the
/// visual elements created for it.
#[derive(Debug)]
pub struct DataItem {
    record: Value,
    mapped: IndexMap<SettingKey, SettingValue>,
    bound: Vec<NodeId>,
}

impl DataItem {
    #[must_use]
    pub fn record(&self) -> &Value {
        &self.record
    }

    /// Mapped value for a setting key, converted from the record field.
    #[must_use]
    pub fn value(&self, key: &SettingKey) -> Option<&SettingValue> {
        self.mapped.get(key)
    }

    #[must_use]
    pub fn float(&self, key: &SettingKey) -> Option<f64> {
        self.mapped.get(key).and_then(SettingValue::as_float)
    }

    /// Visual elements owned by this item, torn down with it.
    #[must_use]
    pub fn bound(&self) -> &[NodeId] {
        &self.bound
    }
}

/// Data-driven entity: plain JSON records mapped onto setting values, one
/// `DataItem` per record, in record order.
///
/// The component never interprets record fields itself; the field map
/// declares which fields feed which setting keys, and everything else in
/// the record is carried along untouched.
pub struct Component {
    fields: IndexMap<String, SettingKey>,
    items: Vec<DataItem>,
}

impl Component {
    #[must_use]
    pub fn new() -> Self {
        Self {
            fields: IndexMap::new(),
            items: Vec::new(),
        }
    }

    /// Declares that record field `field` feeds setting `key`. Existing
    /// items are not remapped; set the mapping before loading data.
    pub fn map_field(&mut self, field: &str, key: SettingKey) {
        self.fields.insert(field.to_owned(), key);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn item(&self, index: usize) -> Option<&DataItem> {
        self.items.get(index)
    }

    pub fn items(&self) -> impl Iterator<Item = &DataItem> {
        self.items.iter()
    }

    fn make_item(&self, record: Value) -> SceneResult<DataItem> {
        let object = record.as_object().ok_or_else(|| {
            SceneError::InvalidData(format!("data record must be a JSON object, got {record}"))
        })?;
        let mut mapped = IndexMap::new();
        for (field, key) in &self.fields {
            if let Some(value) = object.get(field) {
                mapped.insert(key.clone(), json_to_setting(value));
            }
        }
        Ok(DataItem {
            record,
            mapped,
            bound: Vec::new(),
        })
    }

    /// Appends one record, creating its data item.
    pub fn push_record(&mut self, record: Value) -> SceneResult<usize> {
        let item = self.make_item(record)?;
        self.items.push(item);
        Ok(self.items.len() - 1)
    }

    pub fn insert_record(&mut self, index: usize, record: Value) -> SceneResult<()> {
        if index > self.items.len() {
            return Err(SceneError::InvalidData(format!(
                "insert index {index} out of range for {} records",
                self.items.len()
            )));
        }
        let item = self.make_item(record)?;
        self.items.insert(index, item);
        Ok(())
    }

    /// Replaces all records at once, tearing down every current item.
    pub fn set_data(&mut self, root: &mut Root, records: Vec<Value>) -> SceneResult<()> {
        // Validate everything before touching the scene.
        let mut items = Vec::with_capacity(records.len());
        for record in records {
            items.push(self.make_item(record)?);
        }
        self.clear(root);
        self.items = items;
        Ok(())
    }

    /// Attaches a visual element to the item at `index`; the element is
    /// disposed when the item is removed.
    pub fn bind(&mut self, index: usize, node: NodeId) -> SceneResult<()> {
        match self.items.get_mut(index) {
            Some(item) => {
                item.bound.push(node);
                Ok(())
            }
            None => Err(SceneError::InvalidData(format!(
                "no data item at index {index}"
            ))),
        }
    }

    /// Removes one record and disposes its bound elements.
    pub fn remove_record(&mut self, root: &mut Root, index: usize) -> SceneResult<Value> {
        if index >= self.items.len() {
            return Err(SceneError::InvalidData(format!(
                "remove index {index} out of range for {} records",
                self.items.len()
            )));
        }
        let item = self.items.remove(index);
        for node in item.bound {
            root.dispose_node(node);
        }
        Ok(item.record)
    }

    /// Removes every record and its bound elements.
    pub fn clear(&mut self, root: &mut Root) {
        for item in self.items.drain(..) {
            for node in item.bound {
                root.dispose_node(node);
            }
        }
    }
}

impl Default for Component {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Component")
            .field("fields", &self.fields.len())
            .field("items", &self.items.len())
            .finish()
    }
}

/// Conversion from raw record fields to setting values. Numbers, booleans
/// and strings map to their typed variants; structured values stay JSON.
fn json_to_setting(value: &Value) -> SettingValue {
    match value {
        Value::Number(number) => match number.as_f64() {
            Some(float) => SettingValue::Float(float),
            None => SettingValue::Json(value.clone()),
        },
        Value::Bool(flag) => SettingValue::Bool(*flag),
        Value::String(text) => SettingValue::Text(text.clone()),
        other => SettingValue::Json(other.clone()),
    }
}
