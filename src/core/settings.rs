use std::cell::{Cell, RefCell};
use std::rc::Rc;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::disposer::Disposer;
use crate::core::value::{Color, PositionMode, SettingValue, Size};

/// Closed set of recognized setting keys.
///
/// Unknown keys are carried by `Custom` so setting one is never an error;
/// internal code paths only ever read the typed variants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SettingKey {
    X,
    Y,
    Width,
    Height,
    MinWidth,
    MinHeight,
    MaxWidth,
    MaxHeight,
    Scale,
    Rotation,
    Opacity,
    Visible,
    ForceHidden,
    Position,
    MarginTop,
    MarginBottom,
    MarginLeft,
    MarginRight,
    PaddingTop,
    PaddingBottom,
    PaddingLeft,
    PaddingRight,
    Fill,
    Stroke,
    StrokeWidth,
    Text,
    FontSize,
    Start,
    End,
    Min,
    Max,
    Inversed,
    MaxZoomFactor,
    MinZoomCount,
    MaxZoomCount,
    Pan,
    Custom(String),
}

impl SettingKey {
    /// Wire name used by snapshots and theme rule tables.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            SettingKey::X => "x",
            SettingKey::Y => "y",
            SettingKey::Width => "width",
            SettingKey::Height => "height",
            SettingKey::MinWidth => "minWidth",
            SettingKey::MinHeight => "minHeight",
            SettingKey::MaxWidth => "maxWidth",
            SettingKey::MaxHeight => "maxHeight",
            SettingKey::Scale => "scale",
            SettingKey::Rotation => "rotation",
            SettingKey::Opacity => "opacity",
            SettingKey::Visible => "visible",
            SettingKey::ForceHidden => "forceHidden",
            SettingKey::Position => "position",
            SettingKey::MarginTop => "marginTop",
            SettingKey::MarginBottom => "marginBottom",
            SettingKey::MarginLeft => "marginLeft",
            SettingKey::MarginRight => "marginRight",
            SettingKey::PaddingTop => "paddingTop",
            SettingKey::PaddingBottom => "paddingBottom",
            SettingKey::PaddingLeft => "paddingLeft",
            SettingKey::PaddingRight => "paddingRight",
            SettingKey::Fill => "fill",
            SettingKey::Stroke => "stroke",
            SettingKey::StrokeWidth => "strokeWidth",
            SettingKey::Text => "text",
            SettingKey::FontSize => "fontSize",
            SettingKey::Start => "start",
            SettingKey::End => "end",
            SettingKey::Min => "min",
            SettingKey::Max => "max",
            SettingKey::Inversed => "inversed",
            SettingKey::MaxZoomFactor => "maxZoomFactor",
            SettingKey::MinZoomCount => "minZoomCount",
            SettingKey::MaxZoomCount => "maxZoomCount",
            SettingKey::Pan => "pan",
            SettingKey::Custom(name) => name,
        }
    }

    #[must_use]
    pub fn parse(name: &str) -> SettingKey {
        match name {
            "x" => SettingKey::X,
            "y" => SettingKey::Y,
            "width" => SettingKey::Width,
            "height" => SettingKey::Height,
            "minWidth" => SettingKey::MinWidth,
            "minHeight" => SettingKey::MinHeight,
            "maxWidth" => SettingKey::MaxWidth,
            "maxHeight" => SettingKey::MaxHeight,
            "scale" => SettingKey::Scale,
            "rotation" => SettingKey::Rotation,
            "opacity" => SettingKey::Opacity,
            "visible" => SettingKey::Visible,
            "forceHidden" => SettingKey::ForceHidden,
            "position" => SettingKey::Position,
            "marginTop" => SettingKey::MarginTop,
            "marginBottom" => SettingKey::MarginBottom,
            "marginLeft" => SettingKey::MarginLeft,
            "marginRight" => SettingKey::MarginRight,
            "paddingTop" => SettingKey::PaddingTop,
            "paddingBottom" => SettingKey::PaddingBottom,
            "paddingLeft" => SettingKey::PaddingLeft,
            "paddingRight" => SettingKey::PaddingRight,
            "fill" => SettingKey::Fill,
            "stroke" => SettingKey::Stroke,
            "strokeWidth" => SettingKey::StrokeWidth,
            "text" => SettingKey::Text,
            "fontSize" => SettingKey::FontSize,
            "start" => SettingKey::Start,
            "end" => SettingKey::End,
            "min" => SettingKey::Min,
            "max" => SettingKey::Max,
            "inversed" => SettingKey::Inversed,
            "maxZoomFactor" => SettingKey::MaxZoomFactor,
            "minZoomCount" => SettingKey::MinZoomCount,
            "maxZoomCount" => SettingKey::MaxZoomCount,
            "pan" => SettingKey::Pan,
            other => SettingKey::Custom(other.to_owned()),
        }
    }

    /// True for keys whose change invalidates cached bounds and layout.
    #[must_use]
    pub fn affects_geometry(&self) -> bool {
        matches!(
            self,
            SettingKey::X
                | SettingKey::Y
                | SettingKey::Width
                | SettingKey::Height
                | SettingKey::MinWidth
                | SettingKey::MinHeight
                | SettingKey::MaxWidth
                | SettingKey::MaxHeight
                | SettingKey::Scale
                | SettingKey::Rotation
                | SettingKey::Visible
                | SettingKey::ForceHidden
                | SettingKey::Position
                | SettingKey::MarginTop
                | SettingKey::MarginBottom
                | SettingKey::MarginLeft
                | SettingKey::MarginRight
                | SettingKey::PaddingTop
                | SettingKey::PaddingBottom
                | SettingKey::PaddingLeft
                | SettingKey::PaddingRight
                | SettingKey::Text
                | SettingKey::FontSize
        )
    }
}

/// One settled change handed to listeners after a completed pass.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingChange {
    pub key: SettingKey,
    pub private: bool,
    pub old: Option<SettingValue>,
    pub new: Option<SettingValue>,
}

type AdapterFn = Rc<dyn Fn(&SettingKey, SettingValue) -> SettingValue>;
type ListenerCallback = Rc<RefCell<dyn FnMut(&SettingChange)>>;

struct ListenerEntry {
    key: SettingKey,
    private: bool,
    active: Rc<Cell<bool>>,
    callback: ListenerCallback,
}

/// Shared bundle of default settings consulted by every store it is applied
/// to. Mutating a template re-dirties all sharers on their next pass.
#[derive(Clone)]
pub struct Template {
    inner: Rc<RefCell<TemplateInner>>,
}

struct TemplateInner {
    values: IndexMap<SettingKey, SettingValue>,
    revision: u64,
}

impl Template {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(TemplateInner {
                values: IndexMap::new(),
                revision: 0,
            })),
        }
    }

    #[must_use]
    pub fn with(entries: impl IntoIterator<Item = (SettingKey, SettingValue)>) -> Self {
        let template = Self::new();
        for (key, value) in entries {
            template.set(key, value);
        }
        template
    }

    pub fn set(&self, key: SettingKey, value: impl Into<SettingValue>) -> bool {
        let value = value.into();
        let mut inner = self.inner.borrow_mut();
        if inner.values.get(&key) == Some(&value) {
            return false;
        }
        inner.values.insert(key, value);
        inner.revision += 1;
        true
    }

    pub fn remove(&self, key: &SettingKey) -> bool {
        let mut inner = self.inner.borrow_mut();
        if inner.values.shift_remove(key).is_some() {
            inner.revision += 1;
            return true;
        }
        false
    }

    #[must_use]
    pub fn get(&self, key: &SettingKey) -> Option<SettingValue> {
        self.inner.borrow().values.get(key).cloned()
    }

    #[must_use]
    pub fn revision(&self) -> u64 {
        self.inner.borrow().revision
    }

    #[must_use]
    pub fn entries(&self) -> Vec<(SettingKey, SettingValue)> {
        self.inner
            .borrow()
            .values
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}

impl Default for Template {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Template {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Template")
            .field("revision", &self.revision())
            .finish()
    }
}

/// Per-entity settings store with dirty tracking, adapters, states,
/// templates and theme-seeded defaults.
///
/// Resolution order for `get`: own value, then applied templates from most
/// recently applied backwards, then theme defaults. Adapters transform the
/// resolved value at read time, composing in registration order.
pub struct SettingsStore {
    values: IndexMap<SettingKey, SettingValue>,
    private_values: IndexMap<SettingKey, SettingValue>,
    prev: IndexMap<SettingKey, SettingValue>,
    prev_private: IndexMap<SettingKey, SettingValue>,
    dirty: IndexSet<SettingKey>,
    dirty_private: IndexSet<SettingKey>,
    adapters: IndexMap<SettingKey, SmallVec<[AdapterFn; 2]>>,
    listeners: Vec<ListenerEntry>,
    states: IndexMap<String, IndexMap<SettingKey, SettingValue>>,
    applied_states: Vec<String>,
    state_originals: IndexMap<SettingKey, Option<SettingValue>>,
    templates: Vec<(Template, u64)>,
    theme_defaults: IndexMap<SettingKey, SettingValue>,
}

impl SettingsStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            values: IndexMap::new(),
            private_values: IndexMap::new(),
            prev: IndexMap::new(),
            prev_private: IndexMap::new(),
            dirty: IndexSet::new(),
            dirty_private: IndexSet::new(),
            adapters: IndexMap::new(),
            listeners: Vec::new(),
            states: IndexMap::new(),
            applied_states: Vec::new(),
            state_originals: IndexMap::new(),
            templates: Vec::new(),
            theme_defaults: IndexMap::new(),
        }
    }

    /// Stores a value and marks the key dirty. Returns `false` (and leaves
    /// the dirty set untouched) when the value equals the current one.
    pub fn set(&mut self, key: SettingKey, value: impl Into<SettingValue>) -> bool {
        let value = value.into();
        if self.values.get(&key) == Some(&value) {
            return false;
        }
        self.values.insert(key.clone(), value);
        self.dirty.insert(key);
        true
    }

    pub fn remove(&mut self, key: &SettingKey) -> bool {
        if self.values.shift_remove(key).is_some() {
            self.dirty.insert(key.clone());
            return true;
        }
        false
    }

    pub fn set_private(&mut self, key: SettingKey, value: impl Into<SettingValue>) -> bool {
        let value = value.into();
        if self.private_values.get(&key) == Some(&value) {
            return false;
        }
        self.private_values.insert(key.clone(), value);
        self.dirty_private.insert(key);
        true
    }

    pub fn remove_private(&mut self, key: &SettingKey) -> bool {
        if self.private_values.shift_remove(key).is_some() {
            self.dirty_private.insert(key.clone());
            return true;
        }
        false
    }

    fn resolve_raw(&self, key: &SettingKey) -> Option<SettingValue> {
        if let Some(value) = self.values.get(key) {
            return Some(value.clone());
        }
        for (template, _) in self.templates.iter().rev() {
            if let Some(value) = template.get(key) {
                return Some(value);
            }
        }
        self.theme_defaults.get(key).cloned()
    }

    /// Current value after adapters, or `None` when unset everywhere.
    #[must_use]
    pub fn get(&self, key: &SettingKey) -> Option<SettingValue> {
        let raw = self.resolve_raw(key)?;
        Some(self.run_adapters(key, raw))
    }

    #[must_use]
    pub fn get_or(&self, key: &SettingKey, fallback: impl Into<SettingValue>) -> SettingValue {
        self.get(key).unwrap_or_else(|| fallback.into())
    }

    #[must_use]
    pub fn get_private(&self, key: &SettingKey) -> Option<SettingValue> {
        self.private_values.get(key).cloned()
    }

    fn run_adapters(&self, key: &SettingKey, value: SettingValue) -> SettingValue {
        match self.adapters.get(key) {
            Some(chain) => chain
                .iter()
                .fold(value, |current, adapter| adapter(key, current)),
            None => value,
        }
    }

    #[must_use]
    pub fn float(&self, key: &SettingKey) -> Option<f64> {
        self.get(key).and_then(|value| value.as_float())
    }

    #[must_use]
    pub fn float_or(&self, key: &SettingKey, fallback: f64) -> f64 {
        self.float(key).unwrap_or(fallback)
    }

    #[must_use]
    pub fn bool_or(&self, key: &SettingKey, fallback: bool) -> bool {
        self.get(key)
            .and_then(|value| value.as_bool())
            .unwrap_or(fallback)
    }

    #[must_use]
    pub fn text(&self, key: &SettingKey) -> Option<String> {
        self.get(key)
            .and_then(|value| value.as_text().map(str::to_owned))
    }

    #[must_use]
    pub fn color(&self, key: &SettingKey) -> Option<Color> {
        self.get(key).and_then(|value| value.as_color())
    }

    #[must_use]
    pub fn size(&self, key: &SettingKey) -> Option<Size> {
        self.get(key).and_then(|value| value.as_size())
    }

    #[must_use]
    pub fn position_or(&self, key: &SettingKey, fallback: PositionMode) -> PositionMode {
        self.get(key)
            .and_then(|value| value.as_position())
            .unwrap_or(fallback)
    }

    #[must_use]
    pub fn private_float(&self, key: &SettingKey) -> Option<f64> {
        self.private_values.get(key).and_then(SettingValue::as_float)
    }

    /// True from the moment a key changes until the pass that settles it
    /// completes. Covers both public and private settings.
    #[must_use]
    pub fn is_dirty(&self, key: &SettingKey) -> bool {
        self.dirty.contains(key) || self.dirty_private.contains(key)
    }

    #[must_use]
    pub fn has_dirty(&self) -> bool {
        !self.dirty.is_empty() || !self.dirty_private.is_empty()
    }

    #[must_use]
    pub fn any_geometry_dirty(&self) -> bool {
        self.dirty
            .iter()
            .chain(self.dirty_private.iter())
            .any(SettingKey::affects_geometry)
    }

    /// Registers a read-time value transform for `key`, composed after any
    /// previously registered adapters.
    pub fn add_adapter(
        &mut self,
        key: SettingKey,
        adapter: impl Fn(&SettingKey, SettingValue) -> SettingValue + 'static,
    ) {
        self.adapters
            .entry(key)
            .or_default()
            .push(Rc::new(adapter));
    }

    pub fn on(
        &mut self,
        key: SettingKey,
        callback: impl FnMut(&SettingChange) + 'static,
    ) -> Disposer {
        self.register_listener(key, false, callback)
    }

    pub fn on_private(
        &mut self,
        key: SettingKey,
        callback: impl FnMut(&SettingChange) + 'static,
    ) -> Disposer {
        self.register_listener(key, true, callback)
    }

    fn register_listener(
        &mut self,
        key: SettingKey,
        private: bool,
        callback: impl FnMut(&SettingChange) + 'static,
    ) -> Disposer {
        let active = Rc::new(Cell::new(true));
        self.listeners.push(ListenerEntry {
            key,
            private,
            active: Rc::clone(&active),
            callback: Rc::new(RefCell::new(callback)),
        });
        Disposer::new(move || active.set(false))
    }

    /// Defines a named bundle of overrides applied later via `state_apply`.
    pub fn state_create(
        &mut self,
        name: &str,
        entries: impl IntoIterator<Item = (SettingKey, SettingValue)>,
    ) {
        self.states
            .insert(name.to_owned(), entries.into_iter().collect());
    }

    /// Applies a named state non-destructively. Re-applying moves the state
    /// to the end of the merge order, so the latest application wins on
    /// conflicting keys. Returns `false` for unknown state names.
    pub fn state_apply(&mut self, name: &str) -> bool {
        if !self.states.contains_key(name) {
            return false;
        }
        self.applied_states.retain(|applied| applied != name);
        self.applied_states.push(name.to_owned());
        self.recompute_states();
        true
    }

    /// Removes an applied state, restoring original values for keys no
    /// longer covered by any remaining state.
    pub fn state_remove(&mut self, name: &str) -> bool {
        let before = self.applied_states.len();
        self.applied_states.retain(|applied| applied != name);
        if self.applied_states.len() == before {
            return false;
        }
        self.recompute_states();
        true
    }

    #[must_use]
    pub fn applied_states(&self) -> &[String] {
        &self.applied_states
    }

    fn recompute_states(&mut self) {
        let mut merged: IndexMap<SettingKey, SettingValue> = IndexMap::new();
        for name in &self.applied_states {
            if let Some(entries) = self.states.get(name) {
                for (key, value) in entries {
                    merged.insert(key.clone(), value.clone());
                }
            }
        }

        // Restore keys that fell out of every applied state.
        let stale: Vec<SettingKey> = self
            .state_originals
            .keys()
            .filter(|key| !merged.contains_key(*key))
            .cloned()
            .collect();
        for key in stale {
            if let Some(original) = self.state_originals.shift_remove(&key) {
                match original {
                    Some(value) => {
                        self.set(key, value);
                    }
                    None => {
                        self.remove(&key);
                    }
                }
            }
        }

        for (key, value) in merged {
            if !self.state_originals.contains_key(&key) {
                let original = self.values.get(&key).cloned();
                self.state_originals.insert(key.clone(), original);
            }
            self.set(key, value);
        }
    }

    /// Registers a shared template consulted on reads; later-applied
    /// templates take precedence. The stored revision starts stale so the
    /// next sweep dirties the template's keys on this store.
    pub fn apply_template(&mut self, template: &Template) {
        let revision = template.revision().wrapping_sub(1);
        self.templates.push((template.clone(), revision));
    }

    /// Picks up template mutations since the last sweep, dirtying affected
    /// keys that the store does not override. Returns whether anything
    /// became dirty.
    pub fn sync_templates(&mut self) -> bool {
        let mut changed = false;
        let mut dirtied: Vec<SettingKey> = Vec::new();
        for (template, seen) in &mut self.templates {
            let revision = template.revision();
            if revision != *seen {
                *seen = revision;
                for (key, _) in template.entries() {
                    dirtied.push(key);
                }
                changed = true;
            }
        }
        for key in dirtied {
            if !self.values.contains_key(&key) {
                self.dirty.insert(key);
            }
        }
        changed
    }

    /// Seeds a theme default. Never marks the key dirty; explicit sets
    /// always override seeded values.
    pub fn seed_default(&mut self, key: SettingKey, value: impl Into<SettingValue>) {
        self.theme_defaults.insert(key, value.into());
    }

    /// Clears the dirty sets, snapshots previous values and returns the
    /// settled changes, one per key regardless of how many times it was set
    /// during the pass.
    pub fn settle(&mut self) -> Vec<SettingChange> {
        let mut changes = Vec::new();

        let dirty: Vec<SettingKey> = self.dirty.drain(..).collect();
        for key in dirty {
            let old = self.prev.get(&key).cloned();
            let new = self.resolve_raw(&key);
            match &new {
                Some(value) => {
                    self.prev.insert(key.clone(), value.clone());
                }
                None => {
                    self.prev.shift_remove(&key);
                }
            }
            if old != new {
                changes.push(SettingChange {
                    key,
                    private: false,
                    old,
                    new,
                });
            }
        }

        let dirty_private: Vec<SettingKey> = self.dirty_private.drain(..).collect();
        for key in dirty_private {
            let old = self.prev_private.get(&key).cloned();
            let new = self.private_values.get(&key).cloned();
            match &new {
                Some(value) => {
                    self.prev_private.insert(key.clone(), value.clone());
                }
                None => {
                    self.prev_private.shift_remove(&key);
                }
            }
            if old != new {
                changes.push(SettingChange {
                    key,
                    private: true,
                    old,
                    new,
                });
            }
        }

        changes
    }

    /// Dispatches settled changes to matching listeners.
    pub fn notify(&mut self, changes: &[SettingChange]) {
        self.listeners.retain(|entry| entry.active.get());
        if changes.is_empty() {
            return;
        }
        let listeners: Vec<(SettingKey, bool, ListenerCallback)> = self
            .listeners
            .iter()
            .map(|entry| (entry.key.clone(), entry.private, Rc::clone(&entry.callback)))
            .collect();
        for change in changes {
            for (key, private, callback) in &listeners {
                if *key == change.key && *private == change.private {
                    (callback.borrow_mut())(change);
                }
            }
        }
    }

    /// Keys with an explicitly set public value, in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &SettingKey> {
        self.values.keys()
    }
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SettingsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsStore")
            .field("values", &self.values.len())
            .field("dirty", &self.dirty.len())
            .field("applied_states", &self.applied_states)
            .finish()
    }
}
