use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::types::Bounds;
use crate::core::value::Size;

/// Child placement strategy. Stateless, so one value can serve any number
/// of containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Layout {
    None,
    Vertical,
    Horizontal,
    Grid { columns: usize },
}

/// Measured inputs for one child, assembled by the container pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutChild {
    pub visible: bool,
    pub relative: bool,
    pub width: Option<Size>,
    pub height: Option<Size>,
    pub min_width: Option<f64>,
    pub max_width: Option<f64>,
    pub min_height: Option<f64>,
    pub max_height: Option<f64>,
    pub margin_left: f64,
    pub margin_right: f64,
    pub margin_top: f64,
    pub margin_bottom: f64,
    pub bounds: Bounds,
}

impl LayoutChild {
    /// A visible, relative child with measured bounds and no size settings.
    #[must_use]
    pub fn measured(bounds: Bounds) -> Self {
        Self {
            visible: true,
            relative: true,
            width: None,
            height: None,
            min_width: None,
            max_width: None,
            min_height: None,
            max_height: None,
            margin_left: 0.0,
            margin_right: 0.0,
            margin_top: 0.0,
            margin_bottom: 0.0,
            bounds,
        }
    }
}

/// Computed private overrides for one child. `None` fields leave the
/// child's current value alone; `clear` removes an invisible child from
/// the flow without leaving a gap.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LayoutPlacement {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub clear: bool,
}

/// Positions children from their current measured bounds.
///
/// Pure function: only the returned placements carry the result, and two
/// calls with the same inputs produce identical output.
#[must_use]
pub fn update_container(
    layout: Layout,
    inner_width: f64,
    inner_height: f64,
    children: &[LayoutChild],
) -> Vec<LayoutPlacement> {
    match layout {
        Layout::None => vec![LayoutPlacement::default(); children.len()],
        Layout::Vertical => flow(inner_height, children, MainAxis::Vertical),
        Layout::Horizontal => flow(inner_width, children, MainAxis::Horizontal),
        Layout::Grid { columns } => grid(columns, children),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MainAxis {
    Vertical,
    Horizontal,
}

struct MainItem {
    visible: bool,
    relative: bool,
    size: Option<Size>,
    min: Option<f64>,
    max: Option<f64>,
    margin_start: f64,
    margin_end: f64,
    bounds_start: f64,
    bounds_end: f64,
}

impl MainItem {
    fn from_child(child: &LayoutChild, axis: MainAxis) -> Self {
        match axis {
            MainAxis::Vertical => Self {
                visible: child.visible,
                relative: child.relative,
                size: child.height,
                min: child.min_height,
                max: child.max_height,
                margin_start: child.margin_top,
                margin_end: child.margin_bottom,
                bounds_start: child.bounds.top,
                bounds_end: child.bounds.bottom,
            },
            MainAxis::Horizontal => Self {
                visible: child.visible,
                relative: child.relative,
                size: child.width,
                min: child.min_width,
                max: child.max_width,
                margin_start: child.margin_left,
                margin_end: child.margin_right,
                bounds_start: child.bounds.left,
                bounds_end: child.bounds.right,
            },
        }
    }

    fn measured_extent(&self) -> f64 {
        self.bounds_end - self.bounds_start
    }

    fn clamp(&self, value: f64) -> f64 {
        let mut clamped = value;
        if let Some(min) = self.min {
            clamped = clamped.max(min);
        }
        if let Some(max) = self.max {
            clamped = clamped.min(max);
        }
        clamped
    }
}

fn flow(inner_size: f64, children: &[LayoutChild], axis: MainAxis) -> Vec<LayoutPlacement> {
    let items: Vec<MainItem> = children
        .iter()
        .map(|child| MainItem::from_child(child, axis))
        .collect();

    // Pass 1: partition relative children into fixed and percentage pools.
    let mut available = inner_size;
    let mut total_percent = 0.0;
    for item in &items {
        if !item.visible || !item.relative {
            continue;
        }
        match item.size {
            Some(Size::Relative(percent)) => {
                total_percent += percent.0;
                available -= item.margin_start + item.margin_end;
            }
            Some(Size::Absolute(size)) => {
                available -= size + item.margin_start + item.margin_end;
            }
            None => {
                available -= item.measured_extent() + item.margin_start + item.margin_end;
            }
        }
    }

    if available <= 0.0 || available.is_infinite() {
        warn!(available, "degenerate layout space, clamping to epsilon");
        available = 0.1;
    }

    // Shares are relative to the percent total, so an under-subscribed
    // total stretches to fill the available space. A percentage child
    // whose share hits its min/max clamp leaves the pool and consumes its
    // clamped size; the survivors re-normalize over the remaining percent.
    let mut resolved: Vec<Option<f64>> = vec![None; items.len()];
    for (index, item) in items.iter().enumerate() {
        if !item.visible || !item.relative {
            continue;
        }
        let Some(Size::Relative(percent)) = item.size else {
            continue;
        };
        if total_percent <= 0.0 {
            resolved[index] = Some(item.clamp(0.0));
            continue;
        }
        let tentative = available * percent.0 / total_percent;
        let clamped = item.clamp(tentative);
        if clamped != tentative {
            resolved[index] = Some(clamped);
            available -= clamped;
            total_percent -= percent.0;
        }
    }

    for (index, item) in items.iter().enumerate() {
        if !item.visible || !item.relative || resolved[index].is_some() {
            continue;
        }
        if let Some(Size::Relative(percent)) = item.size {
            let share = if total_percent > 0.0 {
                available * percent.0 / total_percent
            } else {
                0.0
            };
            resolved[index] = Some(item.clamp(share));
        }
    }

    // Pass 2: walk in order, accumulating the flow cursor. Absolute
    // children are measured but self-positioned; invisible children leave
    // the flow entirely.
    let mut placements = vec![LayoutPlacement::default(); items.len()];
    let mut cursor = 0.0;
    for (index, item) in items.iter().enumerate() {
        if !item.visible {
            placements[index].clear = true;
            continue;
        }
        if !item.relative {
            continue;
        }

        let extent = resolved[index].unwrap_or_else(|| match item.size {
            Some(Size::Absolute(size)) => size,
            _ => item.measured_extent(),
        });
        let position = cursor + item.margin_start - item.bounds_start;
        match axis {
            MainAxis::Vertical => {
                placements[index].y = Some(position);
                if matches!(item.size, Some(Size::Relative(_))) {
                    placements[index].height = resolved[index];
                }
            }
            MainAxis::Horizontal => {
                placements[index].x = Some(position);
                if matches!(item.size, Some(Size::Relative(_))) {
                    placements[index].width = resolved[index];
                }
            }
        }
        cursor = position + item.bounds_start + extent + item.margin_end;
    }

    placements
}

fn grid(columns: usize, children: &[LayoutChild]) -> Vec<LayoutPlacement> {
    let columns = columns.max(1);

    let mut cell_width = 0.0_f64;
    let mut cell_height = 0.0_f64;
    for child in children {
        if !child.visible || !child.relative {
            continue;
        }
        cell_width =
            cell_width.max(child.bounds.width() + child.margin_left + child.margin_right);
        cell_height =
            cell_height.max(child.bounds.height() + child.margin_top + child.margin_bottom);
    }

    let mut placements = vec![LayoutPlacement::default(); children.len()];
    let mut slot = 0;
    for (index, child) in children.iter().enumerate() {
        if !child.visible {
            placements[index].clear = true;
            continue;
        }
        if !child.relative {
            continue;
        }
        let row = slot / columns;
        let column = slot % columns;
        placements[index].x =
            Some(column as f64 * cell_width + child.margin_left - child.bounds.left);
        placements[index].y =
            Some(row as f64 * cell_height + child.margin_top - child.bounds.top);
        slot += 1;
    }

    placements
}
