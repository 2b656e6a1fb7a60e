//! Behaviour Mutators
//!
//! [`VariableStrike`] gives any strike-bearing payoff a time-dependent strike
//! for its early-exercise rule. During one `transient_value` call the payoff's
//! own strike is swapped for `strike_at(t)`; a guard puts the original back
//! when the call returns or unwinds. Terminal and default values keep using
//! the stored strike.
//!
//! The swap goes through a `Cell`, so a payoff wrapped this way must not be
//! evaluated from two call sites at once. Payoffs are `!Sync`, which rules out
//! sharing across threads.

use super::interface::{Capabilities, Payoff};
use super::simple::{Strike, StrikeBearing};
use ndarray::{Array1, ArrayView1};
use std::fmt;
use tracing::trace;

/// Time → strike strategy.
pub trait StrikeSchedule {
    fn strike_at(&self, t: f64) -> f64;
}

impl<F> StrikeSchedule for F
where
    F: Fn(f64) -> f64,
{
    fn strike_at(&self, t: f64) -> f64 {
        self(t)
    }
}

/// Restores the strike it replaced when dropped.
struct StrikeGuard<'a> {
    slot: &'a Strike,
    original: f64,
}

impl<'a> StrikeGuard<'a> {
    fn install(slot: &'a Strike, k: f64) -> Self {
        let original = slot.replace(k);
        StrikeGuard { slot, original }
    }
}

impl Drop for StrikeGuard<'_> {
    fn drop(&mut self) {
        self.slot.replace(self.original);
    }
}

/// Strike-bearing payoff whose transient rule uses a scheduled strike.
pub struct VariableStrike<P, F> {
    payoff: P,
    schedule: F,
}

impl<P, F> VariableStrike<P, F>
where
    P: StrikeBearing,
    F: StrikeSchedule,
{
    /// Wrap `payoff`, taking transient strikes from `schedule`.
    pub fn new(payoff: P, schedule: F) -> Self {
        VariableStrike { payoff, schedule }
    }

    pub fn strike_at(&self, t: f64) -> f64 {
        self.schedule.strike_at(t)
    }

    /// The wrapped payoff, carrying its stored strike.
    pub fn inner(&self) -> &P {
        &self.payoff
    }
}

impl<P: fmt::Debug, F> fmt::Debug for VariableStrike<P, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariableStrike")
            .field("payoff", &self.payoff)
            .finish_non_exhaustive()
    }
}

impl<P, F> Payoff for VariableStrike<P, F>
where
    P: StrikeBearing,
    F: StrikeSchedule,
{
    fn maturity(&self) -> f64 {
        self.payoff.maturity()
    }

    fn name(&self) -> &str {
        "VariableStrike"
    }

    fn capabilities(&self) -> Capabilities {
        self.payoff.capabilities()
    }

    fn is_active(&self, t: f64) -> bool {
        self.payoff.is_active(t)
    }

    fn default_value(&self, t: f64, s: ArrayView1<'_, f64>) -> Array1<f64> {
        self.payoff.default_value(t, s)
    }

    fn terminal_value(&self, s: ArrayView1<'_, f64>) -> Array1<f64> {
        self.payoff.terminal_value(s)
    }

    fn transient_value(
        &self,
        t: f64,
        v: ArrayView1<'_, f64>,
        s: ArrayView1<'_, f64>,
    ) -> Array1<f64> {
        let k = self.schedule.strike_at(t);
        let guard = StrikeGuard::install(self.payoff.strike_slot(), k);
        trace!(t, strike = k, restores = guard.original, "scoped strike substitution");
        self.payoff.transient_value(t, v, s)
    }

    fn coupon_value(&self, t: f64) -> f64 {
        self.payoff.coupon_value(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payoff::simple::{CallA, PutV};
    use ndarray::array;

    #[test]
    fn test_transient_uses_scheduled_strike() {
        let call = VariableStrike::new(CallA::new(4.0, 100.0).unwrap(), |t: f64| 100.0 + 5.0 * t);
        let s = array![112.0];
        let v = array![0.0];

        // strike 110 at t = 2
        assert_eq!(call.transient_value(2.0, v.view(), s.view()), array![2.0]);
        assert_eq!(call.inner().strike(), 100.0);
        assert_eq!(call.strike_at(3.0), 115.0);
    }

    #[test]
    fn test_terminal_and_default_keep_stored_strike() {
        let call = VariableStrike::new(CallA::new(4.0, 100.0).unwrap(), |_t: f64| 50.0);
        let s = array![112.0];

        assert_eq!(call.terminal_value(s.view()), array![12.0]);
        assert_eq!(call.default_value(1.0, s.view()), array![12.0]);
    }

    #[test]
    fn test_value_floor_can_vary_in_time() {
        let floor = VariableStrike::new(PutV::new(2.0, 90.0).unwrap(), |t: f64| 90.0 + t);
        let s = array![1.0, 1.0];
        let v = array![80.0, 95.0];

        assert_eq!(floor.transient_value(1.5, v.view(), s.view()), array![91.5, 95.0]);
        assert_eq!(floor.inner().strike(), 90.0);
    }
}
