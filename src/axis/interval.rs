use serde::{Deserialize, Serialize};

/// Calendar-aware time units for date axis intervals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TimeUnit {
    Millisecond,
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl TimeUnit {
    /// Nominal duration in milliseconds. Months and years use calendar
    /// averages; grid selection only needs relative magnitudes.
    #[must_use]
    pub fn approx_millis(self) -> f64 {
        match self {
            TimeUnit::Millisecond => 1.0,
            TimeUnit::Second => 1_000.0,
            TimeUnit::Minute => 60_000.0,
            TimeUnit::Hour => 3_600_000.0,
            TimeUnit::Day => 86_400_000.0,
            TimeUnit::Week => 604_800_000.0,
            TimeUnit::Month => 2_592_000_000.0,
            TimeUnit::Year => 31_536_000_000.0,
        }
    }
}

/// Granularity of the underlying data on a date axis. Must be declared
/// explicitly; it is never inferred from the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BaseInterval {
    pub unit: TimeUnit,
    pub count: u32,
}

impl BaseInterval {
    #[must_use]
    pub fn new(unit: TimeUnit, count: u32) -> Self {
        Self {
            unit,
            count: count.max(1),
        }
    }

    #[must_use]
    pub fn approx_millis(&self) -> f64 {
        self.unit.approx_millis() * f64::from(self.count)
    }
}

/// Candidate grid steps from finest to coarsest. Selection walks this table
/// forward and stops at the first step wide enough on screen, so zooming in
/// only ever refines the grid.
pub(crate) const GRID_INTERVALS: &[BaseInterval] = &[
    BaseInterval { unit: TimeUnit::Millisecond, count: 1 },
    BaseInterval { unit: TimeUnit::Millisecond, count: 5 },
    BaseInterval { unit: TimeUnit::Millisecond, count: 10 },
    BaseInterval { unit: TimeUnit::Millisecond, count: 50 },
    BaseInterval { unit: TimeUnit::Millisecond, count: 100 },
    BaseInterval { unit: TimeUnit::Millisecond, count: 500 },
    BaseInterval { unit: TimeUnit::Second, count: 1 },
    BaseInterval { unit: TimeUnit::Second, count: 5 },
    BaseInterval { unit: TimeUnit::Second, count: 10 },
    BaseInterval { unit: TimeUnit::Second, count: 30 },
    BaseInterval { unit: TimeUnit::Minute, count: 1 },
    BaseInterval { unit: TimeUnit::Minute, count: 5 },
    BaseInterval { unit: TimeUnit::Minute, count: 10 },
    BaseInterval { unit: TimeUnit::Minute, count: 15 },
    BaseInterval { unit: TimeUnit::Minute, count: 30 },
    BaseInterval { unit: TimeUnit::Hour, count: 1 },
    BaseInterval { unit: TimeUnit::Hour, count: 3 },
    BaseInterval { unit: TimeUnit::Hour, count: 6 },
    BaseInterval { unit: TimeUnit::Hour, count: 12 },
    BaseInterval { unit: TimeUnit::Day, count: 1 },
    BaseInterval { unit: TimeUnit::Day, count: 2 },
    BaseInterval { unit: TimeUnit::Day, count: 3 },
    BaseInterval { unit: TimeUnit::Week, count: 1 },
    BaseInterval { unit: TimeUnit::Week, count: 2 },
    BaseInterval { unit: TimeUnit::Month, count: 1 },
    BaseInterval { unit: TimeUnit::Month, count: 2 },
    BaseInterval { unit: TimeUnit::Month, count: 3 },
    BaseInterval { unit: TimeUnit::Month, count: 6 },
    BaseInterval { unit: TimeUnit::Year, count: 1 },
    BaseInterval { unit: TimeUnit::Year, count: 2 },
    BaseInterval { unit: TimeUnit::Year, count: 5 },
    BaseInterval { unit: TimeUnit::Year, count: 10 },
    BaseInterval { unit: TimeUnit::Year, count: 25 },
    BaseInterval { unit: TimeUnit::Year, count: 50 },
    BaseInterval { unit: TimeUnit::Year, count: 100 },
    BaseInterval { unit: TimeUnit::Year, count: 500 },
    BaseInterval { unit: TimeUnit::Year, count: 1_000 },
];

/// Picks the grid step for the current zoom window.
///
/// The result is never finer than `base`, and coarsens monotonically as
/// `visible_span_ms` grows or `axis_length_px` shrinks.
#[must_use]
pub fn choose_grid_interval(
    base: BaseInterval,
    axis_length_px: f64,
    visible_span_ms: f64,
    min_grid_distance_px: f64,
) -> BaseInterval {
    let base_millis = base.approx_millis();
    if axis_length_px <= 0.0 || visible_span_ms <= 0.0 {
        return base;
    }

    // Smallest step whose on-screen spacing clears the minimum distance.
    let px_per_ms = axis_length_px / visible_span_ms;
    let mut chosen = *GRID_INTERVALS
        .last()
        .unwrap_or(&BaseInterval { unit: TimeUnit::Year, count: 1_000 });
    for candidate in GRID_INTERVALS {
        let millis = candidate.approx_millis();
        if millis < base_millis {
            continue;
        }
        if millis * px_per_ms >= min_grid_distance_px {
            chosen = *candidate;
            break;
        }
    }

    if chosen.approx_millis() < base_millis {
        base
    } else {
        chosen
    }
}
