use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::disposer::Disposer;
use crate::core::settings::{SettingChange, SettingKey, SettingsStore, Template};
use crate::core::types::{Bounds, Viewport};
use crate::core::value::{PositionMode, SettingValue, Size};
use crate::interaction::{GestureAction, PointerEvent, PointerEventKind};
use crate::render::{RectPrimitive, RenderFrame, TextHAlign, TextPrimitive};
use crate::scene::animation::{Animation, Easing};
use crate::scene::layout::{self, Layout, LayoutChild, LayoutPlacement};
use crate::scene::node::{ContainerData, GraphicsData, LabelData, Node, NodeId, NodeKind};
use crate::theme::Theme;

/// Scheduler state for one root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchedulerPhase {
    Idle,
    Scheduled,
    Running,
}

struct Slot {
    generation: u32,
    node: Option<Box<Node>>,
}

/// Width/height estimate per character for headless label measurement.
const LABEL_WIDTH_FACTOR: f64 = 0.6;
const LABEL_HEIGHT_FACTOR: f64 = 1.2;

/// Re-entrant settings changes get further drains within the same frame;
/// past this many the frame is a feedback loop and gets cut short.
const MAX_FRAME_PASSES: usize = 100;

/// Explicit root context: owns the scene arena, the update scheduler, the
/// animation set and the theme stack. Never ambient; every node lives in
/// exactly one `Root`.
pub struct Root {
    slots: Vec<Slot>,
    free: Vec<u32>,
    container: NodeId,
    pending: IndexSet<NodeId>,
    phase: SchedulerPhase,
    animations: Vec<Animation>,
    themes: Vec<Theme>,
    frame: u64,
    needs_render: bool,
    disposed: bool,
    active_gesture: Option<NodeId>,
}

impl Root {
    #[must_use]
    pub fn new() -> Self {
        let mut root = Self {
            slots: Vec::new(),
            free: Vec::new(),
            container: NodeId {
                index: 0,
                generation: 0,
            },
            pending: IndexSet::new(),
            phase: SchedulerPhase::Idle,
            animations: Vec::new(),
            themes: Vec::new(),
            frame: 0,
            needs_render: true,
            disposed: false,
            active_gesture: None,
        };
        root.container = root.spawn(
            "Container",
            NodeKind::Container(ContainerData {
                children: crate::core::list::List::new(),
                layout: Layout::None,
                auto_dispose_children: true,
            }),
        );
        root
    }

    /// The implicit top-level container every scene hangs off.
    #[must_use]
    pub fn container(&self) -> NodeId {
        self.container
    }

    #[must_use]
    pub fn phase(&self) -> SchedulerPhase {
        self.phase
    }

    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Synchronous, immediate teardown of the whole context. Idempotent.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        let live: Vec<NodeId> = self.live_ids();
        for id in live {
            self.dispose_node(id);
        }
        self.pending.clear();
        self.animations.clear();
        self.phase = SchedulerPhase::Idle;
        self.disposed = true;
    }

    pub fn push_theme(&mut self, theme: Theme) {
        self.themes.push(theme);
    }

    // ---- node lifecycle -------------------------------------------------

    fn spawn(&mut self, class_name: &'static str, kind: NodeKind) -> NodeId {
        let mut node = Box::new(Node::new(class_name, kind));
        Self::seed_from_themes(&self.themes, &mut node.settings, class_name, &[]);

        let id = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.node = Some(node);
                NodeId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                NodeId {
                    index,
                    generation: 0,
                }
            }
        };
        self.schedule(id);
        id
    }

    fn seed_from_themes(
        themes: &[Theme],
        settings: &mut SettingsStore,
        class_name: &str,
        tags: &[String],
    ) {
        for theme in themes {
            for (key, value) in theme.matching(class_name, tags) {
                settings.seed_default(key.clone(), value.clone());
            }
        }
    }

    /// Re-seeds theme defaults for a node carrying the given theme tags.
    pub fn apply_theme_tags(&mut self, id: NodeId, tags: &[&str]) {
        let tags: Vec<String> = tags.iter().map(|tag| (*tag).to_owned()).collect();
        let class_name = self.node_ref(id).class_name;
        let themes = std::mem::take(&mut self.themes);
        Self::seed_from_themes(&themes, &mut self.node_mut(id).settings, class_name, &tags);
        self.themes = themes;
        self.schedule(id);
    }

    /// Creates a detached container. It becomes live in the scene once
    /// pushed into another container's child list.
    pub fn new_container(&mut self, layout: Layout) -> NodeId {
        self.spawn(
            "Container",
            NodeKind::Container(ContainerData {
                children: crate::core::list::List::new(),
                layout,
                auto_dispose_children: true,
            }),
        )
    }

    /// Container flavor that leaves child disposal to the caller.
    pub fn new_container_shared_children(&mut self, layout: Layout) -> NodeId {
        self.spawn(
            "Container",
            NodeKind::Container(ContainerData {
                children: crate::core::list::List::new(),
                layout,
                auto_dispose_children: false,
            }),
        )
    }

    pub fn new_graphics(&mut self) -> NodeId {
        self.spawn("Graphics", NodeKind::Graphics(GraphicsData::default()))
    }

    pub fn new_label(&mut self, text: &str) -> NodeId {
        let id = self.spawn("Label", NodeKind::Label(LabelData::default()));
        self.set(id, SettingKey::Text, text);
        id
    }

    pub fn set_name(&mut self, id: NodeId, name: &str) {
        self.node_mut(id).name = Some(name.to_owned());
    }

    /// Registers a disposer run when the node is disposed. On an already
    /// dead id the disposer runs immediately.
    pub fn add_disposer(&mut self, id: NodeId, disposer: Disposer) {
        if self.is_live(id) {
            self.node_ref(id).disposers.add(disposer);
        } else {
            disposer.dispose();
        }
    }

    pub fn defer_on_dispose(&mut self, id: NodeId, action: impl FnOnce() + 'static) {
        self.add_disposer(id, Disposer::new(action));
    }

    #[must_use]
    pub fn is_live(&self, id: NodeId) -> bool {
        self.slots
            .get(id.index as usize)
            .is_some_and(|slot| slot.generation == id.generation && slot.node.is_some())
    }

    fn live_ids(&self) -> Vec<NodeId> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| {
                slot.node.as_ref().map(|_| NodeId {
                    index: index as u32,
                    generation: slot.generation,
                })
            })
            .collect()
    }

    /// Panics on a disposed or unknown id: dispose is terminal and reuse is
    /// a programming error.
    #[must_use]
    pub fn node_ref(&self, id: NodeId) -> &Node {
        let slot = self
            .slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation);
        match slot.and_then(|slot| slot.node.as_deref()) {
            Some(node) => node,
            None => panic!("node {id:?} is disposed or unknown"),
        }
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        let slot = self
            .slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation);
        match slot.and_then(|slot| slot.node.as_deref_mut()) {
            Some(node) => node,
            None => panic!("node {id:?} is disposed or unknown"),
        }
    }

    /// Disposes a node and its owned subtree. Idempotent: a second call on
    /// the same id is a no-op. Runs every registered disposer exactly once.
    pub fn dispose_node(&mut self, id: NodeId) {
        if !self.is_live(id) {
            return;
        }

        // Cancel anything pending or animating against this node.
        self.pending.shift_remove(&id);
        self.animations.retain(|animation| animation.node != id);
        if self.active_gesture == Some(id) {
            self.active_gesture = None;
        }

        // Detach from a live parent without re-triggering auto-dispose.
        let parent = self.node_ref(id).parent;
        if let Some(parent) = parent {
            if self.is_live(parent) {
                self.detach_child(parent, id);
                self.invalidate_bounds(parent);
                self.schedule(parent);
            }
        }

        let slot = &mut self.slots[id.index as usize];
        let Some(node) = slot.node.take() else {
            return;
        };
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);

        if let NodeKind::Container(data) = &node.kind {
            for child in data.children.as_slice().to_vec() {
                self.dispose_node(child);
            }
        }

        node.disposers.dispose_all();
    }

    fn detach_child(&mut self, parent: NodeId, child: NodeId) {
        if let NodeKind::Container(data) = &mut self.node_mut(parent).kind {
            if let Some(index) = data.children.index_of(&child) {
                data.children.remove_index(index);
            }
        }
    }

    // ---- settings facade ------------------------------------------------

    #[must_use]
    pub fn settings(&self, id: NodeId) -> &SettingsStore {
        &self.node_ref(id).settings
    }

    pub fn set(&mut self, id: NodeId, key: SettingKey, value: impl Into<SettingValue>) {
        let affects_geometry = key.affects_geometry();
        let changed = self.node_mut(id).settings.set(key, value);
        if changed {
            self.node_mut(id).draw_dirty = true;
            if affects_geometry {
                self.invalidate_bounds(id);
            }
            self.schedule(id);
        }
    }

    pub fn set_private(&mut self, id: NodeId, key: SettingKey, value: impl Into<SettingValue>) {
        let affects_geometry = key.affects_geometry();
        let changed = self.node_mut(id).settings.set_private(key, value);
        if changed {
            self.node_mut(id).draw_dirty = true;
            if affects_geometry {
                self.invalidate_bounds(id);
            }
            self.schedule(id);
        }
    }

    pub fn remove_setting(&mut self, id: NodeId, key: &SettingKey) {
        if self.node_mut(id).settings.remove(key) {
            if key.affects_geometry() {
                self.invalidate_bounds(id);
            }
            self.schedule(id);
        }
    }

    pub fn remove_private_setting(&mut self, id: NodeId, key: &SettingKey) {
        if self.node_mut(id).settings.remove_private(key) {
            if key.affects_geometry() {
                self.invalidate_bounds(id);
            }
            self.schedule(id);
        }
    }

    #[must_use]
    pub fn get(&self, id: NodeId, key: &SettingKey) -> Option<SettingValue> {
        self.node_ref(id).settings.get(key)
    }

    #[must_use]
    pub fn is_dirty(&self, id: NodeId, key: &SettingKey) -> bool {
        self.node_ref(id).settings.is_dirty(key)
    }

    pub fn on(
        &mut self,
        id: NodeId,
        key: SettingKey,
        callback: impl FnMut(&SettingChange) + 'static,
    ) -> Disposer {
        self.node_mut(id).settings.on(key, callback)
    }

    pub fn on_private(
        &mut self,
        id: NodeId,
        key: SettingKey,
        callback: impl FnMut(&SettingChange) + 'static,
    ) -> Disposer {
        self.node_mut(id).settings.on_private(key, callback)
    }

    pub fn add_adapter(
        &mut self,
        id: NodeId,
        key: SettingKey,
        adapter: impl Fn(&SettingKey, SettingValue) -> SettingValue + 'static,
    ) {
        self.node_mut(id).settings.add_adapter(key, adapter);
    }

    pub fn state_create(
        &mut self,
        id: NodeId,
        name: &str,
        entries: impl IntoIterator<Item = (SettingKey, SettingValue)>,
    ) {
        self.node_mut(id).settings.state_create(name, entries);
    }

    pub fn state_apply(&mut self, id: NodeId, name: &str) -> bool {
        let applied = self.node_mut(id).settings.state_apply(name);
        if applied {
            self.invalidate_bounds(id);
            self.schedule(id);
        }
        applied
    }

    pub fn state_remove(&mut self, id: NodeId, name: &str) -> bool {
        let removed = self.node_mut(id).settings.state_remove(name);
        if removed {
            self.invalidate_bounds(id);
            self.schedule(id);
        }
        removed
    }

    /// Wires a shared template into the node. Its keys are dirtied by the
    /// template sweep at the start of the next frame; later-applied
    /// templates take precedence over earlier ones.
    pub fn apply_template(&mut self, id: NodeId, template: &Template) {
        self.node_mut(id).settings.apply_template(template);
        self.invalidate_bounds(id);
        self.schedule(id);
    }

    // ---- children -------------------------------------------------------

    /// Appends a child, reparenting it and invalidating this container's
    /// layout. Ownership transfers to the container's child list.
    pub fn push_child(&mut self, parent: NodeId, child: NodeId) {
        self.adopt(parent, child, None);
    }

    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) {
        self.adopt(parent, child, Some(index));
    }

    fn adopt(&mut self, parent: NodeId, child: NodeId, index: Option<usize>) {
        assert!(
            self.node_ref(parent).is_container(),
            "push_child target must be a container"
        );
        let old_parent = self.node_ref(child).parent;
        if let Some(old_parent) = old_parent {
            if self.is_live(old_parent) {
                self.detach_child(old_parent, child);
                self.invalidate_bounds(old_parent);
                self.schedule(old_parent);
            }
        }
        self.node_mut(child).parent = Some(parent);
        if let NodeKind::Container(data) = &mut self.node_mut(parent).kind {
            match index {
                Some(index) => data.children.insert_index(index, child),
                None => data.children.push(child),
            }
        }
        self.invalidate_bounds(parent);
        self.schedule(parent);
        self.schedule(child);
    }

    /// Removes the child at `index`. With owning child lists the removed
    /// child is disposed; the shared flavor only detaches it.
    pub fn remove_child(&mut self, parent: NodeId, index: usize) -> NodeId {
        let (child, auto_dispose) = match &mut self.node_mut(parent).kind {
            NodeKind::Container(data) => {
                (data.children.remove_index(index), data.auto_dispose_children)
            }
            _ => panic!("remove_child target must be a container"),
        };
        self.node_mut(child).parent = None;
        if auto_dispose {
            self.dispose_node(child);
        }
        self.invalidate_bounds(parent);
        self.schedule(parent);
        child
    }

    pub fn move_child(&mut self, parent: NodeId, child: NodeId, new_index: usize) {
        if let NodeKind::Container(data) = &mut self.node_mut(parent).kind {
            data.children.move_value(&child, new_index);
        }
        self.invalidate_bounds(parent);
        self.schedule(parent);
    }

    /// Clears all children with a single structural event.
    pub fn clear_children(&mut self, parent: NodeId) {
        let (children, auto_dispose) = match &mut self.node_mut(parent).kind {
            NodeKind::Container(data) => {
                let children = data.children.as_slice().to_vec();
                data.children.clear();
                (children, data.auto_dispose_children)
            }
            _ => panic!("clear_children target must be a container"),
        };
        for child in children {
            if self.is_live(child) {
                self.node_mut(child).parent = None;
                if auto_dispose {
                    self.dispose_node(child);
                }
            }
        }
        self.invalidate_bounds(parent);
        self.schedule(parent);
    }

    pub fn observe_children(
        &self,
        parent: NodeId,
        callback: impl FnMut(&crate::core::list::ListEvent<NodeId>) + 'static,
    ) -> Disposer {
        match self.node_ref(parent).children() {
            Some(children) => children.observe(callback),
            None => Disposer::empty(),
        }
    }

    // ---- scheduler ------------------------------------------------------

    pub fn schedule(&mut self, id: NodeId) {
        if self.disposed {
            return;
        }
        self.pending.insert(id);
        if self.phase == SchedulerPhase::Idle {
            self.phase = SchedulerPhase::Scheduled;
        }
    }

    fn invalidate_bounds(&mut self, id: NodeId) {
        let mut current = Some(id);
        while let Some(node_id) = current {
            if !self.is_live(node_id) {
                break;
            }
            let node = self.node_mut(node_id);
            node.bounds_valid = false;
            current = node.parent;
            if let Some(parent) = current {
                if self.is_live(parent) {
                    self.pending.insert(parent);
                }
            }
        }
        if self.phase == SchedulerPhase::Idle && !self.pending.is_empty() {
            self.phase = SchedulerPhase::Scheduled;
        }
    }

    /// Starts an eased tween of a float setting, replacing any in-flight
    /// animation of the same key on the same node.
    pub fn animate(
        &mut self,
        id: NodeId,
        key: SettingKey,
        to: f64,
        duration_ms: f64,
        easing: Easing,
        now_ms: f64,
    ) {
        self.animations
            .retain(|animation| !(animation.node == id && animation.key == key));
        let from = self.node_ref(id).settings.float_or(&key, 0.0);
        if duration_ms <= 0.0 {
            self.set(id, key, to);
            return;
        }
        self.animations.push(Animation {
            node: id,
            key,
            from,
            to,
            start_ms: now_ms,
            duration_ms,
            easing,
        });
        self.schedule(id);
    }

    #[must_use]
    pub fn has_animations(&self) -> bool {
        !self.animations.is_empty()
    }

    /// One scheduler tick: template sweep, animation step, then drains all
    /// pending entities. Each entity's lifecycle hooks run in fixed order;
    /// re-entrant settings changes are settled within the same frame.
    pub fn run_frame(&mut self, now_ms: f64) {
        if self.disposed {
            return;
        }
        self.frame += 1;
        self.phase = SchedulerPhase::Running;

        self.sweep_templates();
        self.step_animations(now_ms);

        let mut passes = 0;
        while !self.pending.is_empty() {
            passes += 1;
            if passes > MAX_FRAME_PASSES {
                warn!(
                    pending = self.pending.len(),
                    "update pass did not converge, deferring remainder to next frame"
                );
                break;
            }
            let batch = std::mem::take(&mut self.pending);
            for id in batch {
                // Entities disposed while pending are skipped, never touched.
                if !self.is_live(id) {
                    continue;
                }
                self.process_entity(id);
            }
        }

        self.phase = SchedulerPhase::Idle;
    }

    fn sweep_templates(&mut self) {
        for id in self.live_ids() {
            if self.node_mut(id).settings.sync_templates() {
                self.node_mut(id).draw_dirty = true;
                self.pending.insert(id);
            }
        }
    }

    fn step_animations(&mut self, now_ms: f64) {
        let animations = std::mem::take(&mut self.animations);
        let mut keep = Vec::with_capacity(animations.len());
        for animation in animations {
            if !self.is_live(animation.node) {
                continue;
            }
            let value = animation.value_at(now_ms);
            self.set(animation.node, animation.key.clone(), value);
            if !animation.is_finished(now_ms) {
                keep.push(animation);
            }
        }
        self.animations = keep;
    }

    /// Fixed per-entity lifecycle: structural reaction, geometry recompute,
    /// draw push, then settle-and-notify. Self-contained with respect to
    /// sibling ordering.
    fn process_entity(&mut self, id: NodeId) {
        self.before_changed(id);
        let resized = self.measure(id);
        if self.node_ref(id).is_container() {
            self.layout_container(id);
        }
        // A size change feeds the parent's layout within the same frame.
        if resized {
            if let Some(parent) = self.node_ref(id).parent {
                if self.is_live(parent) {
                    self.node_mut(parent).bounds_valid = false;
                    self.pending.insert(parent);
                }
            }
        }
        self.changed(id);
        self.after_changed(id);
    }

    fn before_changed(&mut self, id: NodeId) {
        // Visibility flips restructure the parent's flow.
        let node = self.node_ref(id);
        if node.settings.is_dirty(&SettingKey::Visible)
            || node.settings.is_dirty(&SettingKey::ForceHidden)
        {
            if let Some(parent) = node.parent {
                if self.is_live(parent) {
                    self.invalidate_bounds(parent);
                    self.pending.insert(parent);
                }
            }
        }
    }

    fn changed(&mut self, id: NodeId) {
        let node = self.node_mut(id);
        if node.settings.has_dirty() {
            node.draw_dirty = true;
        }
    }

    fn after_changed(&mut self, id: NodeId) {
        if self.node_ref(id).settings.has_dirty() {
            self.needs_render = true;
        }
        let changes = self.node_mut(id).settings.settle();
        self.node_mut(id).settings.notify(&changes);
    }

    // ---- geometry -------------------------------------------------------

    fn resolved_extent(&self, id: NodeId, horizontal: bool) -> Option<f64> {
        let node = self.node_ref(id);
        let key = if horizontal {
            SettingKey::Width
        } else {
            SettingKey::Height
        };
        if let Some(value) = node.settings.private_float(&key) {
            return Some(value);
        }
        match node.settings.size(&key) {
            Some(Size::Absolute(value)) => Some(value),
            _ => None,
        }
    }

    fn measure(&mut self, id: NodeId) -> bool {
        let bounds = match &self.node_ref(id).kind {
            NodeKind::Graphics(data) => {
                let width = self
                    .resolved_extent(id, true)
                    .unwrap_or(data.natural_width);
                let height = self
                    .resolved_extent(id, false)
                    .unwrap_or(data.natural_height);
                Bounds::from_size(width.max(0.0), height.max(0.0))
            }
            NodeKind::Label(_) => {
                let node = self.node_ref(id);
                let font_size = node.settings.float_or(&SettingKey::FontSize, 12.0);
                let text = node.settings.text(&SettingKey::Text).unwrap_or_default();
                let measured_width = text.chars().count() as f64 * font_size * LABEL_WIDTH_FACTOR;
                let measured_height = font_size * LABEL_HEIGHT_FACTOR;
                let width = self.resolved_extent(id, true).unwrap_or(measured_width);
                let height = self.resolved_extent(id, false).unwrap_or(measured_height);
                if let NodeKind::Label(data) = &mut self.node_mut(id).kind {
                    data.measured_width = measured_width;
                    data.measured_height = measured_height;
                }
                Bounds::from_size(width.max(0.0), height.max(0.0))
            }
            NodeKind::Container(data) => {
                let children = data.children.as_slice().to_vec();
                let node = self.node_ref(id);
                let padding_left = node.settings.float_or(&SettingKey::PaddingLeft, 0.0);
                let padding_right = node.settings.float_or(&SettingKey::PaddingRight, 0.0);
                let padding_top = node.settings.float_or(&SettingKey::PaddingTop, 0.0);
                let padding_bottom = node.settings.float_or(&SettingKey::PaddingBottom, 0.0);

                let mut content = Bounds::ZERO;
                for child_id in children {
                    if !self.is_live(child_id) {
                        continue;
                    }
                    let child = self.node_ref(child_id);
                    if !child.is_visible() {
                        continue;
                    }
                    let scale = child.settings.float_or(&SettingKey::Scale, 1.0);
                    let b = child.local_bounds;
                    let scaled = Bounds::new(
                        b.left * scale,
                        b.top * scale,
                        b.right * scale,
                        b.bottom * scale,
                    );
                    content =
                        content.union(scaled.translated(child.effective_x(), child.effective_y()));
                }

                let width = self
                    .resolved_extent(id, true)
                    .unwrap_or(padding_left + content.right.max(0.0) + padding_right);
                let height = self
                    .resolved_extent(id, false)
                    .unwrap_or(padding_top + content.bottom.max(0.0) + padding_bottom);
                Bounds::from_size(width.max(0.0), height.max(0.0))
            }
        };

        let node = self.node_mut(id);
        let changed = node.local_bounds != bounds;
        node.local_bounds = bounds;
        node.bounds_valid = true;
        changed
    }

    fn layout_container(&mut self, id: NodeId) {
        let (children, container_layout) = match &self.node_ref(id).kind {
            NodeKind::Container(data) => (data.children.as_slice().to_vec(), data.layout),
            _ => return,
        };
        if children.is_empty() || container_layout == Layout::None {
            return;
        }

        let node = self.node_ref(id);
        let padding_left = node.settings.float_or(&SettingKey::PaddingLeft, 0.0);
        let padding_right = node.settings.float_or(&SettingKey::PaddingRight, 0.0);
        let padding_top = node.settings.float_or(&SettingKey::PaddingTop, 0.0);
        let padding_bottom = node.settings.float_or(&SettingKey::PaddingBottom, 0.0);
        let width = self
            .resolved_extent(id, true)
            .unwrap_or_else(|| self.node_ref(id).local_bounds.width());
        let height = self
            .resolved_extent(id, false)
            .unwrap_or_else(|| self.node_ref(id).local_bounds.height());
        let inner_width = width - padding_left - padding_right;
        let inner_height = height - padding_top - padding_bottom;

        let inputs: Vec<LayoutChild> = children
            .iter()
            .map(|child_id| {
                if !self.is_live(*child_id) {
                    // A dead id still in the list measures as nothing.
                    return LayoutChild {
                        visible: false,
                        ..LayoutChild::measured(Bounds::ZERO)
                    };
                }
                let child = self.node_ref(*child_id);
                let settings = &child.settings;
                LayoutChild {
                    visible: child.is_visible(),
                    relative: settings.position_or(&SettingKey::Position, PositionMode::Relative)
                        == PositionMode::Relative,
                    width: settings.size(&SettingKey::Width),
                    height: settings.size(&SettingKey::Height),
                    min_width: settings.float(&SettingKey::MinWidth),
                    max_width: settings.float(&SettingKey::MaxWidth),
                    min_height: settings.float(&SettingKey::MinHeight),
                    max_height: settings.float(&SettingKey::MaxHeight),
                    margin_left: settings.float_or(&SettingKey::MarginLeft, 0.0),
                    margin_right: settings.float_or(&SettingKey::MarginRight, 0.0),
                    margin_top: settings.float_or(&SettingKey::MarginTop, 0.0),
                    margin_bottom: settings.float_or(&SettingKey::MarginBottom, 0.0),
                    bounds: child.local_bounds,
                }
            })
            .collect();

        let placements: Vec<LayoutPlacement> =
            layout::update_container(container_layout, inner_width, inner_height, &inputs);

        for (child_id, placement) in children.iter().zip(placements) {
            if !self.is_live(*child_id) {
                continue;
            }
            if placement.clear {
                self.remove_private_setting(*child_id, &SettingKey::X);
                self.remove_private_setting(*child_id, &SettingKey::Y);
                continue;
            }
            if let Some(x) = placement.x {
                self.set_private(*child_id, SettingKey::X, padding_left + x);
            }
            if let Some(y) = placement.y {
                self.set_private(*child_id, SettingKey::Y, padding_top + y);
            }
            if let Some(width) = placement.width {
                self.set_private(*child_id, SettingKey::Width, width);
            }
            if let Some(height) = placement.height {
                self.set_private(*child_id, SettingKey::Height, height);
            }
        }
    }

    /// Global bounds computed from the canonical local bounds and ancestor
    /// transforms. Valid between a completed `run_frame` and the next
    /// settings change.
    #[must_use]
    pub fn global_bounds(&self, id: NodeId) -> Bounds {
        let mut bounds = self.node_ref(id).local_bounds;
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = self.node_ref(node_id);
            let scale = node.settings.float_or(&SettingKey::Scale, 1.0);
            bounds = Bounds::new(
                bounds.left * scale,
                bounds.top * scale,
                bounds.right * scale,
                bounds.bottom * scale,
            )
            .translated(node.effective_x(), node.effective_y());
            current = node.parent;
        }
        bounds
    }

    /// Visibility including inherited hiding from ancestors.
    #[must_use]
    pub fn is_effectively_visible(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node_id) = current {
            if !self.is_live(node_id) {
                return false;
            }
            let node = self.node_ref(node_id);
            if !node.is_visible() {
                return false;
            }
            current = node.parent;
        }
        true
    }

    // ---- interaction ----------------------------------------------------

    /// Routes a normalized pointer event. Pointer-down captures the target;
    /// subsequent global moves and the final up are routed to it, after
    /// which the capture is torn down.
    pub fn pointer_event(&mut self, target: NodeId, event: PointerEvent) -> Option<GestureAction> {
        let routed = match event.kind {
            PointerEventKind::Down => {
                self.active_gesture = Some(target);
                target
            }
            _ => self.active_gesture.unwrap_or(target),
        };
        if !self.is_live(routed) {
            self.active_gesture = None;
            return None;
        }
        let action = self.node_mut(routed).gesture.on_event(event);
        if event.kind == PointerEventKind::Up {
            self.active_gesture = None;
        }
        action
    }

    /// Applies a drag action to a node's public position settings.
    pub fn apply_drag(&mut self, id: NodeId, action: &GestureAction) {
        if let GestureAction::DragMove { delta, .. } = action {
            let x = self.node_ref(id).settings.float_or(&SettingKey::X, 0.0);
            let y = self.node_ref(id).settings.float_or(&SettingKey::Y, 0.0);
            self.set(id, SettingKey::X, x + delta.x);
            self.set(id, SettingKey::Y, y + delta.y);
        }
    }

    // ---- draw output ----------------------------------------------------

    #[must_use]
    pub fn take_needs_render(&mut self) -> bool {
        std::mem::replace(&mut self.needs_render, false)
    }

    /// Builds the display list for the current settled scene, depth-first
    /// in child order (which is z-order).
    #[must_use]
    pub fn build_render_frame(&mut self, viewport: Viewport) -> RenderFrame {
        let mut frame = RenderFrame::new(viewport);
        self.collect_primitives(self.container, &mut frame);
        self.needs_render = false;
        frame
    }

    fn collect_primitives(&mut self, id: NodeId, frame: &mut RenderFrame) {
        if !self.is_live(id) || !self.node_ref(id).is_visible() {
            return;
        }
        let bounds = self.global_bounds(id);
        let node = self.node_mut(id);
        node.draw_dirty = false;
        let settings = &node.settings;
        match &node.kind {
            NodeKind::Graphics(_) => {
                let fill = settings.color(&SettingKey::Fill);
                let stroke = settings.color(&SettingKey::Stroke);
                if fill.is_some() || stroke.is_some() {
                    frame.rects.push(RectPrimitive {
                        x: bounds.left,
                        y: bounds.top,
                        width: bounds.width().max(0.0),
                        height: bounds.height().max(0.0),
                        fill,
                        stroke,
                        stroke_width: settings.float_or(&SettingKey::StrokeWidth, 1.0),
                    });
                }
            }
            NodeKind::Label(_) => {
                if let Some(content) = settings.text(&SettingKey::Text) {
                    if !content.is_empty() {
                        frame.texts.push(TextPrimitive {
                            x: bounds.left,
                            y: bounds.top,
                            content,
                            font_size: settings.float_or(&SettingKey::FontSize, 12.0),
                            color: settings
                                .color(&SettingKey::Fill)
                                .unwrap_or(crate::core::value::Color::rgb(0.0, 0.0, 0.0)),
                            h_align: TextHAlign::Left,
                        });
                    }
                }
            }
            NodeKind::Container(data) => {
                let children = data.children.as_slice().to_vec();
                for child in children {
                    self.collect_primitives(child, frame);
                }
            }
        }
    }
}

impl Default for Root {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Root {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Root")
            .field("phase", &self.phase)
            .field("frame", &self.frame)
            .field("pending", &self.pending.len())
            .field("disposed", &self.disposed)
            .finish()
    }
}
