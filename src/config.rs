/*
 * Compile-time timing plan for the crossing. All durations are milliseconds.
 */

/// How long the button must settle, both after the press and after the release.
pub const DEBOUNCE_DELAY: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingPlan {
    /// Amber on the way to red, and again on the way back to green.
    pub yellow: u32,
    /// Red for traffic, walk for pedestrians.
    pub red: u32,
}

impl TimingPlan {
    pub const STANDARD: TimingPlan = TimingPlan {
        yellow: 3_000,
        red: 10_000,
    };

    pub const EXTENDED: TimingPlan = TimingPlan {
        yellow: 5_000,
        red: 12_000,
    };
}

#[cfg(not(feature = "extended-timing"))]
pub const TIMING_PLAN: TimingPlan = TimingPlan::STANDARD;

#[cfg(feature = "extended-timing")]
pub const TIMING_PLAN: TimingPlan = TimingPlan::EXTENDED;
