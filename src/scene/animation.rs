use serde::{Deserialize, Serialize};

use crate::core::settings::SettingKey;
use crate::scene::node::NodeId;

/// Easing curves for cooperative, frame-driven animations.
pub mod ease {
    #[must_use]
    pub fn linear(t: f64) -> f64 {
        t
    }

    #[must_use]
    pub fn quad_in(t: f64) -> f64 {
        t * t
    }

    #[must_use]
    pub fn quad_out(t: f64) -> f64 {
        t * (2.0 - t)
    }

    #[must_use]
    pub fn cubic_out(t: f64) -> f64 {
        let inv = 1.0 - t;
        1.0 - inv * inv * inv
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Easing {
    Linear,
    QuadIn,
    QuadOut,
    CubicOut,
}

impl Easing {
    #[must_use]
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => ease::linear(t),
            Easing::QuadIn => ease::quad_in(t),
            Easing::QuadOut => ease::quad_out(t),
            Easing::CubicOut => ease::cubic_out(t),
        }
    }
}

/// Time-sliced tween of one float setting, advanced by scheduler frames.
#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    pub(crate) node: NodeId,
    pub(crate) key: SettingKey,
    pub(crate) from: f64,
    pub(crate) to: f64,
    pub(crate) start_ms: f64,
    pub(crate) duration_ms: f64,
    pub(crate) easing: Easing,
}

impl Animation {
    /// Eased value at `now_ms`; the exact target at or past the end.
    #[must_use]
    pub fn value_at(&self, now_ms: f64) -> f64 {
        if self.duration_ms <= 0.0 {
            return self.to;
        }
        let progress = ((now_ms - self.start_ms) / self.duration_ms).clamp(0.0, 1.0);
        if progress >= 1.0 {
            return self.to;
        }
        self.from + (self.to - self.from) * self.easing.apply(progress)
    }

    #[must_use]
    pub fn is_finished(&self, now_ms: f64) -> bool {
        now_ms - self.start_ms >= self.duration_ms
    }
}
