//! Simple Payoffs
//!
//! # Spot-referencing
//! - **Forward**: `S - K` at maturity
//! - **European Call / Put**: `max(S - K, 0)` / `max(K - S, 0)` at maturity
//! - **American Call / Put**: European terminal value plus early exercise,
//!   `max(V, intrinsic(S))` before maturity; the intrinsic value is also the
//!   residual on default
//!
//! # Value-referencing
//! - **PutV**: floor on the portfolio value, `max(V, K)`
//! - **CallVR**: cap on the portfolio value, `min(V, K)`
//!
//! All of these default totally (zero residual) unless stated otherwise.

use super::interface::{Capabilities, Payoff};
use crate::error::validation::{validate_finite, validate_positive};
use crate::error::{assert_before_maturity, assert_same_nodes, PayoffResult};
use crate::math_utils::{cap_at, floor_at, maximum, nan_max};
use ndarray::{Array1, ArrayView1};
use std::cell::Cell;

/// Strike owned by a single payoff.
///
/// Read-only from outside the crate; the scoped substitution in
/// [`VariableStrike`](super::mutator::VariableStrike) is the only writer.
#[derive(Debug, Clone)]
pub struct Strike(Cell<f64>);

impl Strike {
    /// Strike fixed at `k`.
    pub fn new(k: f64) -> Self {
        Strike(Cell::new(k))
    }

    /// Strike currently installed.
    pub fn get(&self) -> f64 {
        self.0.get()
    }

    /// Install `k`, returning the strike it replaced.
    pub(crate) fn replace(&self, k: f64) -> f64 {
        self.0.replace(k)
    }
}

/// A payoff parameterised by a strike (or value threshold) `K`.
pub trait StrikeBearing: Payoff {
    /// The cell holding `K`, shared with the scoped substitution.
    fn strike_slot(&self) -> &Strike;

    /// Current value of `K`.
    fn strike(&self) -> f64 {
        self.strike_slot().get()
    }
}

fn call_intrinsic(s: ArrayView1<'_, f64>, k: f64) -> Array1<f64> {
    s.mapv(|x| nan_max(x - k, 0.0))
}

fn put_intrinsic(s: ArrayView1<'_, f64>, k: f64) -> Array1<f64> {
    s.mapv(|x| nan_max(k - x, 0.0))
}

macro_rules! strike_payoff {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name {
            maturity: f64,
            strike: Strike,
        }

        impl $name {
            pub fn new(maturity: f64, strike: f64) -> PayoffResult<Self> {
                validate_positive("maturity", maturity)?;
                validate_finite("strike", strike)?;
                Ok($name {
                    maturity,
                    strike: Strike::new(strike),
                })
            }
        }

        impl StrikeBearing for $name {
            fn strike_slot(&self) -> &Strike {
                &self.strike
            }
        }
    };
}

strike_payoff!(
    /// Forward contract: `S - K` at maturity, total default.
    Forward
);
strike_payoff!(
    /// European call: `max(S - K, 0)` at maturity.
    CallE
);
strike_payoff!(
    /// American call: exercisable at any `t ≤ T`.
    CallA
);
strike_payoff!(
    /// European put: `max(K - S, 0)` at maturity.
    PutE
);
strike_payoff!(
    /// American put: exercisable at any `t ≤ T`.
    PutA
);
strike_payoff!(
    /// American put on the portfolio value: `V + max(K - V, 0) = max(V, K)`.
    PutV
);
strike_payoff!(
    /// Reverse American call on the portfolio value: `V - max(V - K, 0) = min(V, K)`.
    CallVR
);

impl Payoff for Forward {
    fn maturity(&self) -> f64 {
        self.maturity
    }

    fn name(&self) -> &str {
        "Forward"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::TERMINAL
    }

    fn terminal_value(&self, s: ArrayView1<'_, f64>) -> Array1<f64> {
        let k = self.strike();
        s.mapv(|x| x - k)
    }
}

impl Payoff for CallE {
    fn maturity(&self) -> f64 {
        self.maturity
    }

    fn name(&self) -> &str {
        "CallE"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::TERMINAL
    }

    fn terminal_value(&self, s: ArrayView1<'_, f64>) -> Array1<f64> {
        call_intrinsic(s, self.strike())
    }
}

impl Payoff for CallA {
    fn maturity(&self) -> f64 {
        self.maturity
    }

    fn name(&self) -> &str {
        "CallA"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::TERMINAL | Capabilities::TRANSIENT | Capabilities::DEFAULT
    }

    fn default_value(&self, t: f64, s: ArrayView1<'_, f64>) -> Array1<f64> {
        assert_before_maturity(t, self.maturity);
        call_intrinsic(s, self.strike())
    }

    fn terminal_value(&self, s: ArrayView1<'_, f64>) -> Array1<f64> {
        call_intrinsic(s, self.strike())
    }

    fn transient_value(
        &self,
        t: f64,
        v: ArrayView1<'_, f64>,
        s: ArrayView1<'_, f64>,
    ) -> Array1<f64> {
        assert_before_maturity(t, self.maturity);
        assert_same_nodes(v.len(), s.len());
        maximum(call_intrinsic(s, self.strike()), v)
    }
}

impl Payoff for PutE {
    fn maturity(&self) -> f64 {
        self.maturity
    }

    fn name(&self) -> &str {
        "PutE"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::TERMINAL
    }

    fn terminal_value(&self, s: ArrayView1<'_, f64>) -> Array1<f64> {
        put_intrinsic(s, self.strike())
    }
}

impl Payoff for PutA {
    fn maturity(&self) -> f64 {
        self.maturity
    }

    fn name(&self) -> &str {
        "PutA"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::TERMINAL | Capabilities::TRANSIENT | Capabilities::DEFAULT
    }

    fn default_value(&self, t: f64, s: ArrayView1<'_, f64>) -> Array1<f64> {
        assert_before_maturity(t, self.maturity);
        put_intrinsic(s, self.strike())
    }

    fn terminal_value(&self, s: ArrayView1<'_, f64>) -> Array1<f64> {
        put_intrinsic(s, self.strike())
    }

    fn transient_value(
        &self,
        t: f64,
        v: ArrayView1<'_, f64>,
        s: ArrayView1<'_, f64>,
    ) -> Array1<f64> {
        assert_before_maturity(t, self.maturity);
        assert_same_nodes(v.len(), s.len());
        maximum(put_intrinsic(s, self.strike()), v)
    }
}

impl Payoff for PutV {
    fn maturity(&self) -> f64 {
        self.maturity
    }

    fn name(&self) -> &str {
        "PutV"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::TRANSIENT
    }

    fn transient_value(
        &self,
        t: f64,
        v: ArrayView1<'_, f64>,
        s: ArrayView1<'_, f64>,
    ) -> Array1<f64> {
        assert_before_maturity(t, self.maturity);
        assert_same_nodes(v.len(), s.len());
        floor_at(v, self.strike())
    }
}

impl Payoff for CallVR {
    fn maturity(&self) -> f64 {
        self.maturity
    }

    fn name(&self) -> &str {
        "CallVR"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::TRANSIENT
    }

    fn transient_value(
        &self,
        t: f64,
        v: ArrayView1<'_, f64>,
        s: ArrayView1<'_, f64>,
    ) -> Array1<f64> {
        assert_before_maturity(t, self.maturity);
        assert_same_nodes(v.len(), s.len());
        cap_at(v, self.strike())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_forward_terminal_can_be_negative() {
        let fwd = Forward::new(1.0, 100.0).unwrap();
        let s = array![90.0, 100.0, 115.0];
        assert_eq!(fwd.terminal_value(s.view()), array![-10.0, 0.0, 15.0]);
        assert_eq!(fwd.default_value(0.5, s.view()), Array1::<f64>::zeros(3));
    }

    #[test]
    fn test_european_terminal_values() {
        let call = CallE::new(1.0, 100.0).unwrap();
        let put = PutE::new(1.0, 100.0).unwrap();
        let s = array![80.0, 100.0, 130.0];

        assert_eq!(call.terminal_value(s.view()), array![0.0, 0.0, 30.0]);
        assert_eq!(put.terminal_value(s.view()), array![20.0, 0.0, 0.0]);
    }

    #[test]
    fn test_european_keeps_continuation_value() {
        let call = CallE::new(1.0, 100.0).unwrap();
        let s = array![80.0, 130.0];
        let v = array![0.5, 12.0];
        assert_eq!(call.transient_value(0.5, v.view(), s.view()), v);
    }

    #[test]
    fn test_american_call_exercises_when_intrinsic_dominates() {
        let call = CallA::new(2.0, 100.0).unwrap();
        let s = array![80.0, 110.0, 150.0];
        let v = array![3.0, 12.0, 40.0];

        let out = call.transient_value(1.0, v.view(), s.view());
        assert_eq!(out, array![3.0, 12.0, 50.0]);
        assert_eq!(call.default_value(1.0, s.view()), array![0.0, 10.0, 50.0]);
    }

    #[test]
    fn test_american_put_floors_negative_continuation_at_intrinsic() {
        let put = PutA::new(2.0, 100.0).unwrap();
        let s = array![80.0, 120.0];
        let v = array![-5.0, -1.0];

        let out = put.transient_value(1.0, v.view(), s.view());
        assert_eq!(out, array![20.0, 0.0]);
    }

    #[test]
    fn test_value_floor_and_cap() {
        let floor = PutV::new(3.0, 95.0).unwrap();
        let cap = CallVR::new(3.0, 110.0).unwrap();
        let s = array![1.0, 1.0, 1.0];
        let v = array![90.0, 100.0, 120.0];

        assert_eq!(floor.transient_value(1.0, v.view(), s.view()), array![95.0, 100.0, 120.0]);
        assert_eq!(cap.transient_value(1.0, v.view(), s.view()), array![90.0, 100.0, 110.0]);
        assert_eq!(floor.terminal_value(s.view()), Array1::<f64>::zeros(3));
    }

    #[test]
    fn test_strike_accessor() {
        let call = CallA::new(1.0, 101.25).unwrap();
        assert_abs_diff_eq!(call.strike(), 101.25, epsilon = 1e-15);
    }

    #[test]
    fn test_invalid_construction() {
        assert!(CallE::new(0.0, 100.0).is_err());
        assert!(PutA::new(1.0, f64::NAN).is_err());
        assert!(Forward::new(-1.0, 100.0).is_err());
    }

    #[test]
    fn test_nan_spot_is_not_swallowed() {
        let call = CallE::new(1.0, 100.0).unwrap();
        let put = PutA::new(1.0, 100.0).unwrap();
        let s = array![f64::NAN, 110.0];

        let c = call.terminal_value(s.view());
        assert!(c[0].is_nan());
        assert_eq!(c[1], 10.0);

        let v = array![1.0, 1.0];
        let p = put.transient_value(0.5, v.view(), s.view());
        assert!(p[0].is_nan());
        assert_eq!(p[1], 1.0);
    }

    #[test]
    #[should_panic(expected = "evaluated at maturity")]
    fn test_value_floor_at_maturity_panics() {
        let floor = PutV::new(2.0, 95.0).unwrap();
        let v = array![90.0];
        floor.transient_value(2.0, v.view(), v.view());
    }

    #[test]
    #[should_panic(expected = "evaluated at maturity")]
    fn test_value_cap_at_maturity_panics() {
        let cap = CallVR::new(2.0, 110.0).unwrap();
        let v = array![120.0];
        cap.transient_value(2.0, v.view(), v.view());
    }

    #[test]
    #[should_panic(expected = "evaluated at maturity")]
    fn test_american_default_at_maturity_panics() {
        let put = PutA::new(1.0, 100.0).unwrap();
        put.default_value(1.0, array![90.0].view());
    }
}
