use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::axis::axis::{Axis, AxisKind};
use crate::axis::interval::{choose_grid_interval, TimeUnit};
use crate::core::list::ListTemplate;
use crate::core::settings::{SettingKey, Template};
use crate::scene::layout::Layout;
use crate::scene::node::NodeId;
use crate::scene::root::Root;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AxisOrientation {
    Horizontal,
    Vertical,
}

/// Maps relative axis positions to pixel coordinates along one direction.
///
/// The mapping is recomputed from the canonical `(start, end, length)`
/// triple on every call, so there is no cached scale to fall out of sync
/// with the window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisRenderer {
    length: f64,
    inversed: bool,
    orientation: AxisOrientation,
}

impl AxisRenderer {
    #[must_use]
    pub fn new(orientation: AxisOrientation, length: f64) -> Self {
        Self {
            length: length.max(0.0),
            inversed: false,
            orientation,
        }
    }

    #[must_use]
    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn set_length(&mut self, length: f64) {
        self.length = length.max(0.0);
    }

    #[must_use]
    pub fn inversed(&self) -> bool {
        self.inversed
    }

    pub fn set_inversed(&mut self, inversed: bool) {
        self.inversed = inversed;
    }

    #[must_use]
    pub fn orientation(&self) -> AxisOrientation {
        self.orientation
    }

    /// Pixels per relative unit at the current zoom.
    #[must_use]
    pub fn axis_scale(&self, axis: &Axis) -> f64 {
        self.length / (axis.end() - axis.start())
    }

    /// Pixel coordinate of a relative position. Positions outside the
    /// window map to off-screen coordinates rather than clamping.
    #[must_use]
    pub fn position_to_coordinate(&self, axis: &Axis, position: f64) -> f64 {
        let scale = self.axis_scale(axis);
        if self.inversed {
            (axis.end() - position) * scale
        } else {
            (position - axis.start()) * scale
        }
    }

    #[must_use]
    pub fn coordinate_to_position(&self, axis: &Axis, coordinate: f64) -> f64 {
        let scale = self.axis_scale(axis);
        if self.inversed {
            axis.end() - coordinate / scale
        } else {
            axis.start() + coordinate / scale
        }
    }

    #[must_use]
    pub fn value_to_coordinate(&self, axis: &Axis, value: f64) -> f64 {
        self.position_to_coordinate(axis, axis.value_to_position(value))
    }

    #[must_use]
    pub fn coordinate_to_value(&self, axis: &Axis, coordinate: f64) -> f64 {
        axis.position_to_value(self.coordinate_to_position(axis, coordinate))
    }
}

/// Scene-side presentation of one axis: pooled grid lines, ticks, labels
/// and alternating fills, virtualized over the visible window.
///
/// Elements are keyed by grid step index, so panning reuses every element
/// that stays visible; only entering steps allocate and leaving steps
/// dispose. The pool size is proportional to the visible step count,
/// never to the domain size.
pub struct AxisView {
    renderer: AxisRenderer,
    container: NodeId,
    grid_pool: IndexMap<i64, NodeId>,
    tick_pool: IndexMap<i64, NodeId>,
    label_pool: IndexMap<i64, NodeId>,
    fill_pool: IndexMap<i64, NodeId>,
    grid_template: ListTemplate<NodeId, Root>,
    tick_template: ListTemplate<NodeId, Root>,
    label_template: ListTemplate<NodeId, Root>,
    fill_template: ListTemplate<NodeId, Root>,
    min_grid_distance: f64,
    fills_enabled: bool,
    last_step: f64,
}

/// Extra steps materialized on each side of the window so small pans do
/// not churn the pools at the edges.
const VIRTUALIZE_BUFFER_STEPS: i64 = 1;

impl AxisView {
    #[must_use]
    pub fn new(root: &mut Root, renderer: AxisRenderer) -> Self {
        let container = root.new_container(Layout::None);

        let grid_template = ListTemplate::new(
            Template::with([(SettingKey::StrokeWidth, 1.0.into())]),
            |root: &mut Root, template: &Template| {
                let node = root.new_graphics();
                root.apply_template(node, template);
                node
            },
        );
        let tick_template = ListTemplate::new(
            Template::with([(SettingKey::Height, 5.0.into())]),
            |root: &mut Root, template: &Template| {
                let node = root.new_graphics();
                root.apply_template(node, template);
                node
            },
        );
        let label_template = ListTemplate::new(
            Template::with([(SettingKey::FontSize, 12.0.into())]),
            |root: &mut Root, template: &Template| {
                let node = root.new_label("");
                root.apply_template(node, template);
                node
            },
        );
        let fill_template = ListTemplate::new(
            Template::new(),
            |root: &mut Root, template: &Template| {
                let node = root.new_graphics();
                root.apply_template(node, template);
                node
            },
        );

        Self {
            renderer,
            container,
            grid_pool: IndexMap::new(),
            tick_pool: IndexMap::new(),
            label_pool: IndexMap::new(),
            fill_pool: IndexMap::new(),
            grid_template,
            tick_template,
            label_template,
            fill_template,
            min_grid_distance: 60.0,
            fills_enabled: false,
            last_step: 0.0,
        }
    }

    #[must_use]
    pub fn container(&self) -> NodeId {
        self.container
    }

    #[must_use]
    pub fn renderer(&self) -> &AxisRenderer {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut AxisRenderer {
        &mut self.renderer
    }

    pub fn set_min_grid_distance(&mut self, distance: f64) {
        self.min_grid_distance = distance.max(1.0);
    }

    pub fn set_fills_enabled(&mut self, enabled: bool) {
        self.fills_enabled = enabled;
    }

    /// Template shared by all pooled grid lines; mutate to restyle every
    /// line, existing and future.
    #[must_use]
    pub fn grid_template(&self) -> &Template {
        self.grid_template.template()
    }

    #[must_use]
    pub fn tick_template(&self) -> &Template {
        self.tick_template.template()
    }

    #[must_use]
    pub fn label_template(&self) -> &Template {
        self.label_template.template()
    }

    #[must_use]
    pub fn fill_template(&self) -> &Template {
        self.fill_template.template()
    }

    #[must_use]
    pub fn pooled_element_count(&self) -> usize {
        self.grid_pool.len() + self.tick_pool.len() + self.label_pool.len() + self.fill_pool.len()
    }

    /// Step size in domain units for the current window.
    #[must_use]
    pub fn grid_step(&self, axis: &Axis) -> f64 {
        match axis.kind() {
            AxisKind::Date { base_interval } => choose_grid_interval(
                base_interval,
                self.renderer.length(),
                axis.visible_span(),
                self.min_grid_distance,
            )
            .approx_millis(),
            AxisKind::Value => {
                let raw = axis.visible_span() * self.min_grid_distance
                    / self.renderer.length().max(1.0);
                nice_step(raw)
            }
        }
    }

    /// Reconciles the pools with the current window: positions surviving
    /// elements, creates entering ones, disposes leaving ones.
    pub fn sync(&mut self, root: &mut Root, axis: &Axis) {
        let step = self.grid_step(axis);
        if !step.is_finite() || step <= 0.0 {
            return;
        }
        // A step change re-keys everything; start the pools fresh.
        if step != self.last_step {
            self.clear_pools(root);
            self.last_step = step;
        }

        let visible_min = axis.position_to_value(axis.start());
        let visible_max = axis.position_to_value(axis.end());
        let first = (visible_min / step).floor() as i64 - VIRTUALIZE_BUFFER_STEPS;
        let last = (visible_max / step).ceil() as i64 + VIRTUALIZE_BUFFER_STEPS;

        Self::retire_outside(root, &mut self.grid_pool, first, last);
        Self::retire_outside(root, &mut self.tick_pool, first, last);
        Self::retire_outside(root, &mut self.label_pool, first, last);
        Self::retire_outside(root, &mut self.fill_pool, first, last);

        for index in first..=last {
            let value = index as f64 * step;
            let position = axis.value_to_position(value);
            let coordinate = self.renderer.position_to_coordinate(axis, position);

            let grid = *self.grid_pool.entry(index).or_insert_with(|| {
                let node = self.grid_template.make(root);
                root.push_child(self.container, node);
                node
            });
            self.place(root, grid, coordinate);

            let tick = *self.tick_pool.entry(index).or_insert_with(|| {
                let node = self.tick_template.make(root);
                root.push_child(self.container, node);
                node
            });
            self.place(root, tick, coordinate);

            let label = *self.label_pool.entry(index).or_insert_with(|| {
                let node = self.label_template.make(root);
                root.push_child(self.container, node);
                node
            });
            root.set(label, SettingKey::Text, format_label(axis, value, step));
            self.place(root, label, coordinate);

            if self.fills_enabled && index.rem_euclid(2) == 0 {
                let next = self
                    .renderer
                    .position_to_coordinate(axis, axis.value_to_position((index + 1) as f64 * step));
                let fill = *self.fill_pool.entry(index).or_insert_with(|| {
                    let node = self.fill_template.make(root);
                    root.push_child(self.container, node);
                    node
                });
                let (near, far) = if coordinate <= next {
                    (coordinate, next)
                } else {
                    (next, coordinate)
                };
                self.place(root, fill, near);
                match self.renderer.orientation() {
                    AxisOrientation::Horizontal => {
                        root.set_private(fill, SettingKey::Width, far - near);
                    }
                    AxisOrientation::Vertical => {
                        root.set_private(fill, SettingKey::Height, far - near);
                    }
                }
            }
        }
    }

    fn place(&self, root: &mut Root, node: NodeId, coordinate: f64) {
        match self.renderer.orientation() {
            AxisOrientation::Horizontal => root.set_private(node, SettingKey::X, coordinate),
            AxisOrientation::Vertical => root.set_private(node, SettingKey::Y, coordinate),
        }
    }

    fn retire_outside(root: &mut Root, pool: &mut IndexMap<i64, NodeId>, first: i64, last: i64) {
        let stale: Vec<i64> = pool
            .keys()
            .copied()
            .filter(|index| *index < first || *index > last)
            .collect();
        for index in stale {
            if let Some(node) = pool.shift_remove(&index) {
                root.dispose_node(node);
            }
        }
    }

    fn clear_pools(&mut self, root: &mut Root) {
        for pool in [
            &mut self.grid_pool,
            &mut self.tick_pool,
            &mut self.label_pool,
            &mut self.fill_pool,
        ] {
            for (_, node) in pool.drain(..) {
                root.dispose_node(node);
            }
        }
    }

    /// Disposes the container and every pooled element.
    pub fn dispose(&mut self, root: &mut Root) {
        self.grid_pool.clear();
        self.tick_pool.clear();
        self.label_pool.clear();
        self.fill_pool.clear();
        root.dispose_node(self.container);
    }
}

impl std::fmt::Debug for AxisView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AxisView")
            .field("renderer", &self.renderer)
            .field("pooled", &self.pooled_element_count())
            .finish()
    }
}

/// Rounds `raw` up to the nearest 1/2/5 decade step.
fn nice_step(raw: f64) -> f64 {
    if !raw.is_finite() || raw <= 0.0 {
        return 1.0;
    }
    let magnitude = 10.0_f64.powf(raw.log10().floor());
    let normalized = raw / magnitude;
    let factor = if normalized <= 1.0 {
        1.0
    } else if normalized <= 2.0 {
        2.0
    } else if normalized <= 5.0 {
        5.0
    } else {
        10.0
    };
    factor * magnitude
}

fn format_label(axis: &Axis, value: f64, step: f64) -> String {
    match axis.kind() {
        AxisKind::Date { base_interval } => format_date(value, base_interval.unit, step),
        AxisKind::Value => format_value(value, step),
    }
}

fn format_value(value: f64, step: f64) -> String {
    let decimals = if step >= 1.0 {
        0
    } else {
        (-step.log10().floor()) as usize
    };
    format!("{value:.decimals$}")
}

fn format_date(value_ms: f64, base_unit: TimeUnit, step_ms: f64) -> String {
    let timestamp: DateTime<Utc> = match DateTime::from_timestamp_millis(value_ms as i64) {
        Some(timestamp) => timestamp,
        None => return String::new(),
    };
    // Pick the format from the effective step, never finer than the base.
    let unit = if step_ms >= TimeUnit::Year.approx_millis() {
        TimeUnit::Year
    } else if step_ms >= TimeUnit::Month.approx_millis() {
        TimeUnit::Month
    } else if step_ms >= TimeUnit::Day.approx_millis() {
        TimeUnit::Day
    } else if step_ms >= TimeUnit::Minute.approx_millis() {
        TimeUnit::Minute
    } else if step_ms >= TimeUnit::Second.approx_millis() {
        TimeUnit::Second
    } else {
        TimeUnit::Millisecond
    };
    let unit = unit.max(base_unit.min(TimeUnit::Day));
    match unit {
        TimeUnit::Year => timestamp.format("%Y").to_string(),
        TimeUnit::Month => timestamp.format("%b %Y").to_string(),
        TimeUnit::Week | TimeUnit::Day => timestamp.format("%b %-d").to_string(),
        TimeUnit::Hour | TimeUnit::Minute => timestamp.format("%H:%M").to_string(),
        TimeUnit::Second => timestamp.format("%H:%M:%S").to_string(),
        TimeUnit::Millisecond => timestamp.format("%H:%M:%S%.3f").to_string(),
    }
}
