use serde::{Deserialize, Serialize};

use crate::core::disposer::DisposerBin;
use crate::core::list::List;
use crate::core::settings::{SettingKey, SettingsStore};
use crate::core::types::Bounds;
use crate::interaction::GestureState;
use crate::scene::layout::Layout;

/// Generational handle to a scene node owned by a `Root`.
///
/// A stale id held after disposal never aliases a recycled slot; looking one
/// up panics, since disposed-entity reuse is a programming error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

/// Per-kind payload of a scene node.
#[derive(Debug)]
pub enum NodeKind {
    Container(ContainerData),
    Graphics(GraphicsData),
    Label(LabelData),
}

#[derive(Debug)]
pub struct ContainerData {
    pub children: List<NodeId>,
    pub layout: Layout,
    /// When set, removing or clearing a child disposes it; the plain
    /// flavor leaves disposal to the caller.
    pub auto_dispose_children: bool,
}

#[derive(Debug, Default)]
pub struct GraphicsData {
    pub natural_width: f64,
    pub natural_height: f64,
}

#[derive(Debug, Default)]
pub struct LabelData {
    pub measured_width: f64,
    pub measured_height: f64,
}

/// One live scene node: settings store plus cached geometry and kind data.
pub struct Node {
    pub(crate) class_name: &'static str,
    pub(crate) name: Option<String>,
    pub(crate) settings: SettingsStore,
    pub(crate) parent: Option<NodeId>,
    pub(crate) kind: NodeKind,
    pub(crate) local_bounds: Bounds,
    pub(crate) bounds_valid: bool,
    pub(crate) draw_dirty: bool,
    pub(crate) disposers: DisposerBin,
    pub(crate) gesture: GestureState,
}

impl Node {
    pub(crate) fn new(class_name: &'static str, kind: NodeKind) -> Self {
        Self {
            class_name,
            name: None,
            settings: SettingsStore::new(),
            parent: None,
            kind,
            local_bounds: Bounds::ZERO,
            bounds_valid: false,
            draw_dirty: true,
            disposers: DisposerBin::new(),
            gesture: GestureState::new(),
        }
    }

    #[must_use]
    pub fn class_name(&self) -> &'static str {
        self.class_name
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[must_use]
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    #[must_use]
    pub fn is_container(&self) -> bool {
        matches!(self.kind, NodeKind::Container(_))
    }

    #[must_use]
    pub fn children(&self) -> Option<&List<NodeId>> {
        match &self.kind {
            NodeKind::Container(data) => Some(&data.children),
            _ => None,
        }
    }

    /// Local bounds from the last completed measure pass.
    #[must_use]
    pub fn local_bounds(&self) -> Bounds {
        self.local_bounds
    }

    #[must_use]
    pub fn bounds_valid(&self) -> bool {
        self.bounds_valid
    }

    /// Effective local position: layout-written private overrides win over
    /// user-set public values, keeping the two distinguishable.
    #[must_use]
    pub fn effective_x(&self) -> f64 {
        self.settings
            .private_float(&SettingKey::X)
            .unwrap_or_else(|| self.settings.float_or(&SettingKey::X, 0.0))
    }

    #[must_use]
    pub fn effective_y(&self) -> f64 {
        self.settings
            .private_float(&SettingKey::Y)
            .unwrap_or_else(|| self.settings.float_or(&SettingKey::Y, 0.0))
    }

    /// Explicit visibility; inherited hiding is resolved by the root.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.settings.bool_or(&SettingKey::Visible, true)
            && !self.settings.bool_or(&SettingKey::ForceHidden, false)
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("class", &self.class_name)
            .field("name", &self.name)
            .field("bounds", &self.local_bounds)
            .finish()
    }
}
