use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::axis::interval::BaseInterval;
use crate::error::{SceneError, SceneResult};
use crate::scene::animation::Easing;

/// Axis flavor. Date axes must declare the granularity of their data up
/// front; it is never inferred.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AxisKind {
    Value,
    Date { base_interval: BaseInterval },
}

/// Limits on how far a window can zoom in or out.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomConstraints {
    /// Upper bound on magnification: the window can never get narrower
    /// than `1 / max_zoom_factor` of the full range.
    pub max_zoom_factor: f64,
    /// Minimum number of base intervals that must stay visible.
    pub min_zoom_count: Option<u32>,
    /// Maximum number of base intervals that may be visible.
    pub max_zoom_count: Option<u32>,
}

impl Default for ZoomConstraints {
    fn default() -> Self {
        Self {
            max_zoom_factor: 1_000.0,
            min_zoom_count: None,
            max_zoom_count: None,
        }
    }
}

/// In-flight tween of the zoom window, advanced by `tick`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct WindowAnimation {
    from_start: f64,
    from_end: f64,
    to_start: f64,
    to_end: f64,
    start_ms: f64,
    duration_ms: f64,
    easing: Easing,
}

/// One axis of a chart: a value domain plus the zoom window over it.
///
/// The window `(start, end)` is the canonical zoom state, always kept
/// inside `0 <= start < end <= 1`. Every zoom and pan operation funnels
/// through [`Axis::set_window`], which enforces the invariant and the
/// configured constraints.
#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    kind: AxisKind,
    start: f64,
    end: f64,
    min: f64,
    max: f64,
    constraints: ZoomConstraints,
    animation: Option<WindowAnimation>,
}

impl Axis {
    /// Value axis over `[min, max]` with the full range visible.
    pub fn new_value(min: f64, max: f64) -> SceneResult<Self> {
        if !min.is_finite() || !max.is_finite() || min >= max {
            return Err(SceneError::InvalidConfig(format!(
                "axis range must be finite with min < max, got [{min}, {max}]"
            )));
        }
        Ok(Self {
            kind: AxisKind::Value,
            start: 0.0,
            end: 1.0,
            min,
            max,
            constraints: ZoomConstraints::default(),
            animation: None,
        })
    }

    /// Date axis over `[min_ms, max_ms]` epoch milliseconds. The base
    /// interval is required configuration, not a default.
    pub fn new_date(
        min_ms: f64,
        max_ms: f64,
        base_interval: Option<BaseInterval>,
    ) -> SceneResult<Self> {
        let base_interval = base_interval.ok_or(SceneError::MissingBaseInterval)?;
        if !min_ms.is_finite() || !max_ms.is_finite() || min_ms >= max_ms {
            return Err(SceneError::InvalidConfig(format!(
                "date axis range must be finite with min < max, got [{min_ms}, {max_ms}]"
            )));
        }
        Ok(Self {
            kind: AxisKind::Date { base_interval },
            start: 0.0,
            end: 1.0,
            min: min_ms,
            max: max_ms,
            constraints: ZoomConstraints::default(),
            animation: None,
        })
    }

    #[must_use]
    pub fn kind(&self) -> AxisKind {
        self.kind
    }

    #[must_use]
    pub fn start(&self) -> f64 {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> f64 {
        self.end
    }

    #[must_use]
    pub fn min(&self) -> f64 {
        self.min
    }

    #[must_use]
    pub fn max(&self) -> f64 {
        self.max
    }

    #[must_use]
    pub fn constraints(&self) -> ZoomConstraints {
        self.constraints
    }

    pub fn set_constraints(&mut self, constraints: ZoomConstraints) {
        self.constraints = ZoomConstraints {
            max_zoom_factor: constraints.max_zoom_factor.max(1.0),
            ..constraints
        };
        // Re-clamp the current window under the new limits.
        self.set_window(self.start, self.end);
    }

    pub fn set_range(&mut self, min: f64, max: f64) -> SceneResult<()> {
        if !min.is_finite() || !max.is_finite() || min >= max {
            return Err(SceneError::InvalidConfig(format!(
                "axis range must be finite with min < max, got [{min}, {max}]"
            )));
        }
        self.min = min;
        self.max = max;
        Ok(())
    }

    /// Number of base intervals in the full range, for count constraints.
    fn domain_interval_count(&self) -> Option<f64> {
        match self.kind {
            AxisKind::Date { base_interval } => {
                Some((self.max - self.min) / base_interval.approx_millis())
            }
            AxisKind::Value => None,
        }
    }

    fn window_width_limits(&self) -> (f64, f64) {
        let mut min_width = 1.0 / self.constraints.max_zoom_factor.max(1.0);
        let mut max_width = 1.0_f64;
        if let Some(count) = self.domain_interval_count() {
            if count > 0.0 {
                if let Some(min_count) = self.constraints.min_zoom_count {
                    min_width = min_width.max(f64::from(min_count) / count);
                }
                if let Some(max_count) = self.constraints.max_zoom_count {
                    max_width = max_width.min(f64::from(max_count) / count);
                }
            }
        }
        (min_width.min(1.0), max_width.max(min_width.min(1.0)))
    }

    /// Sets the zoom window, clamping every malformed or out-of-limit
    /// request into the nearest valid window rather than rejecting it.
    /// Interaction deltas are transient, so clamping beats erroring.
    pub fn set_window(&mut self, start: f64, end: f64) {
        let (mut start, mut end) = if start <= end {
            (start, end)
        } else {
            (end, start)
        };
        if !start.is_finite() {
            start = 0.0;
        }
        if !end.is_finite() {
            end = 1.0;
        }
        start = start.clamp(0.0, 1.0);
        end = end.clamp(0.0, 1.0);

        let (min_width, max_width) = self.window_width_limits();
        let width = end - start;
        if width < min_width {
            let center = (start + end) / 2.0;
            start = center - min_width / 2.0;
            end = center + min_width / 2.0;
        } else if width > max_width {
            let center = (start + end) / 2.0;
            start = center - max_width / 2.0;
            end = center + max_width / 2.0;
        }

        // Shift back inside [0, 1] preserving width.
        if start < 0.0 {
            end -= start;
            start = 0.0;
        }
        if end > 1.0 {
            start -= end - 1.0;
            end = 1.0;
            start = start.max(0.0);
        }

        self.start = start;
        self.end = end;
    }

    /// Eased transition of the window to `(start, end)`.
    pub fn animate_window(
        &mut self,
        start: f64,
        end: f64,
        duration_ms: f64,
        easing: Easing,
        now_ms: f64,
    ) {
        if duration_ms <= 0.0 {
            self.animation = None;
            self.set_window(start, end);
            return;
        }
        // Clamp the target up front so the tween lands on a valid window.
        let mut target = self.clone();
        target.animation = None;
        target.set_window(start, end);
        self.animation = Some(WindowAnimation {
            from_start: self.start,
            from_end: self.end,
            to_start: target.start,
            to_end: target.end,
            start_ms: now_ms,
            duration_ms,
            easing,
        });
    }

    /// Advances an in-flight window animation. Returns whether the window
    /// changed this tick.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        let Some(animation) = self.animation else {
            return false;
        };
        let progress = ((now_ms - animation.start_ms) / animation.duration_ms).clamp(0.0, 1.0);
        let eased = animation.easing.apply(progress);
        let start = animation.from_start + (animation.to_start - animation.from_start) * eased;
        let end = animation.from_end + (animation.to_end - animation.from_end) * eased;
        if progress >= 1.0 {
            self.animation = None;
            self.set_window(animation.to_start, animation.to_end);
        } else {
            self.set_window(start, end);
        }
        true
    }

    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    pub fn zoom_to_window(&mut self, start: f64, end: f64) {
        self.animation = None;
        self.set_window(start, end);
    }

    /// Relative position of a domain value: 0 at `min`, 1 at `max`.
    #[must_use]
    pub fn value_to_position(&self, value: f64) -> f64 {
        (value - self.min) / (self.max - self.min)
    }

    #[must_use]
    pub fn position_to_value(&self, position: f64) -> f64 {
        self.min + position * (self.max - self.min)
    }

    /// Zooms so `[from, to]` fills the window.
    pub fn zoom_to_values(&mut self, from: f64, to: f64) {
        let start = self.value_to_position(from);
        let end = self.value_to_position(to);
        self.zoom_to_window(start, end);
    }

    /// Date-axis convenience over [`Axis::zoom_to_values`].
    pub fn zoom_to_dates(&mut self, from: DateTime<Utc>, to: DateTime<Utc>) {
        self.zoom_to_values(from.timestamp_millis() as f64, to.timestamp_millis() as f64);
    }

    /// Halves the window width around its center.
    pub fn zoom_in(&mut self) {
        let width = (self.end - self.start) / 2.0;
        let center = (self.start + self.end) / 2.0;
        self.zoom_to_window(center - width / 2.0, center + width / 2.0);
    }

    /// Doubles the window width around its center.
    pub fn zoom_out(&mut self) {
        let width = (self.end - self.start) * 2.0;
        let center = (self.start + self.end) / 2.0;
        self.zoom_to_window(center - width / 2.0, center + width / 2.0);
    }

    /// Shifts the window by `delta` in relative units, preserving width.
    /// At a domain edge the window pins instead of shrinking.
    pub fn pan_by(&mut self, delta: f64) {
        if !delta.is_finite() {
            return;
        }
        let width = self.end - self.start;
        let delta = delta.clamp(-self.start, 1.0 - self.end);
        self.zoom_to_window(self.start + delta, self.start + delta + width);
    }

    /// Visible span in domain units.
    #[must_use]
    pub fn visible_span(&self) -> f64 {
        (self.end - self.start) * (self.max - self.min)
    }
}

/// Grab state for dragging a scrollbar thumb whose pan behavior zooms:
/// dragging away from the grab point widens the window symmetrically
/// around the grabbed range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThumbDrag {
    down_start: f64,
    down_end: f64,
}

impl ThumbDrag {
    /// Captures the window at pointer-down on the thumb.
    #[must_use]
    pub fn begin(axis: &Axis) -> Self {
        Self {
            down_start: axis.start(),
            down_end: axis.end(),
        }
    }

    /// Applies a drag of `pan_delta` relative units since the grab.
    pub fn pan_zoom(&self, axis: &mut Axis, pan_delta: f64) {
        let grabbed_width = self.down_end - self.down_start;
        let extra = pan_delta * grabbed_width.min(1.0) / 2.0;
        axis.zoom_to_window(self.down_start - extra, self.down_end + extra);
    }
}
