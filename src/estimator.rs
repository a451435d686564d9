//! turns successive cumulative cpu counters into a utilization.

use {
    crate::stat::UserHz,
    std::fmt,
    tracing::warn,
};

/// a snapshot's counters, summed into busy and idle time.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Totals {
    /// user, nice, system, irq, softirq, and steal time.
    pub busy: UserHz,
    /// idle and iowait time.
    pub idle: UserHz,
}

/// the totals observed at the last successful sample.
///
/// the initial state is all zeroes, meaning that nothing has been observed yet.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct EstimatorState {
    /// idle time at the last sample.
    pub idle: UserHz,
    /// busy and idle time at the last sample.
    pub total: UserHz,
}

/// the fraction of time the cpus were busy between two samples.
///
/// this is nominally within `[0, 1]`, but it is not clamped.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct Utilization(f64);

/// folds the current totals into the prior state, returning the utilization since then.
///
/// this yields 0% when there is no prior sample, when no time has passed, or when the grand
/// total went backwards (e.g. the counters were reset). in the last case, the state starts over
/// from the current totals.
///
/// iowait may decrease between samples, so a drop in idle time alone counts as no idle time.
pub fn step(current: Totals, prior: EstimatorState) -> (Utilization, EstimatorState) {
    let Totals { busy, idle } = current;
    let total = idle.saturating_add(busy);
    let next = EstimatorState { idle, total };

    if prior.is_initial() {
        return (Utilization::ZERO, next);
    }

    let Some(total_delta) = total.checked_sub(prior.total) else {
        warn!(%prior, %next, "cpu counters went backwards, resetting");
        return (Utilization::ZERO, next);
    };
    let idle_delta = idle.checked_sub(prior.idle).unwrap_or(UserHz::ZERO);

    if total_delta == UserHz::ZERO {
        return (Utilization::ZERO, next);
    }

    let (idle_delta, total_delta) = (idle_delta.as_f64(), total_delta.as_f64());
    let utilization = Utilization((total_delta - idle_delta) / total_delta);

    (utilization, next)
}

// === impl Totals ===

impl fmt::Display for Totals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { busy, idle } = self;
        write!(f, "busy={busy} idle={idle}")
    }
}

// === impl EstimatorState ===

impl EstimatorState {
    /// returns true if no sample has been folded into this state.
    pub fn is_initial(&self) -> bool {
        *self == Self::default()
    }
}

impl fmt::Display for EstimatorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { idle, total } = self;
        write!(f, "idle={idle} total={total}")
    }
}

// === impl Utilization ===

impl Utilization {
    pub const ZERO: Self = Self(0.0);
    pub const FULL: Self = Self(1.0);

    pub const fn new(fraction: f64) -> Self {
        Self(fraction)
    }

    /// returns the busy fraction, as-is.
    pub const fn fraction(self) -> f64 {
        let Self(fraction) = self;
        fraction
    }
}

impl fmt::Display for Utilization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self(fraction) = self;
        write!(f, "{:.1}%", fraction * 100.0)
    }
}
