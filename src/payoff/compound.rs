//! Compound Payoffs
//!
//! Structural wrappers around other payoffs:
//!
//! - [`Stack`]: several rights held together. Terminal and default values take
//!   the best child; the transient value folds the children in order, so
//!   `[conversion, call]` lets the issuer's call cap a value that already
//!   includes the holder's conversion right.
//! - [`Time`]: restricts a payoff to discrete instants and closed intervals.
//! - [`UpAndOut`]: extinguishes a payoff on nodes at or above a barrier.

use super::interface::{Capabilities, Payoff};
use crate::error::validation::validate_finite;
use crate::error::{assert_before_maturity, assert_same_nodes, PayoffError, PayoffResult};
use crate::math_utils::{maximum, scatter, select_nodes};
use ndarray::{Array1, ArrayView1, Axis};
use tracing::{debug, warn};

/// Several payoffs held at once, sharing the maturity of the first.
#[derive(Debug)]
pub struct Stack {
    maturity: f64,
    stack: Vec<Box<dyn Payoff>>,
}

impl Stack {
    pub fn new(stack: Vec<Box<dyn Payoff>>) -> PayoffResult<Self> {
        let maturity = stack.first().ok_or(PayoffError::EmptyStack)?.maturity();
        for (index, payoff) in stack.iter().enumerate().skip(1) {
            if payoff.maturity() != maturity {
                return Err(PayoffError::MaturityMismatch {
                    index,
                    expected: maturity,
                    found: payoff.maturity(),
                });
            }
        }

        debug!(
            children = stack.len(),
            maturity,
            kinds = ?stack.iter().map(|p| p.name()).collect::<Vec<_>>(),
            "composed payoff stack"
        );
        Ok(Stack { maturity, stack })
    }

    pub fn children(&self) -> &[Box<dyn Payoff>] {
        &self.stack
    }
}

impl Payoff for Stack {
    fn maturity(&self) -> f64 {
        self.maturity
    }

    fn name(&self) -> &str {
        "Stack"
    }

    fn capabilities(&self) -> Capabilities {
        self.stack
            .iter()
            .fold(Capabilities::NONE, |acc, p| acc | p.capabilities())
    }

    fn default_value(&self, t: f64, s: ArrayView1<'_, f64>) -> Array1<f64> {
        assert_before_maturity(t, self.maturity);
        self.stack
            .iter()
            .map(|payoff| payoff.default_value(t, s))
            .reduce(|v, w| maximum(v, w.view()))
            .unwrap_or_else(|| Array1::zeros(s.len()))
    }

    fn terminal_value(&self, s: ArrayView1<'_, f64>) -> Array1<f64> {
        self.stack
            .iter()
            .map(|payoff| payoff.terminal_value(s))
            .reduce(|v, w| maximum(v, w.view()))
            .unwrap_or_else(|| Array1::zeros(s.len()))
    }

    fn transient_value(
        &self,
        t: f64,
        v: ArrayView1<'_, f64>,
        s: ArrayView1<'_, f64>,
    ) -> Array1<f64> {
        assert_before_maturity(t, self.maturity);
        assert_same_nodes(v.len(), s.len());
        self.stack
            .iter()
            .fold(v.to_owned(), |v, payoff| payoff.transient_value(t, v.view(), s))
    }

    fn coupon_value(&self, t: f64) -> f64 {
        self.stack.iter().map(|p| p.coupon_value(t)).sum()
    }
}

/// One entry of a time restriction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimeRestriction {
    /// A single time `t`
    Instant(f64),
    /// All times in `[lower, upper]`
    Interval(f64, f64),
}

impl From<f64> for TimeRestriction {
    fn from(t: f64) -> Self {
        TimeRestriction::Instant(t)
    }
}

impl From<(f64, f64)> for TimeRestriction {
    fn from((lower, upper): (f64, f64)) -> Self {
        TimeRestriction::Interval(lower, upper)
    }
}

impl TryFrom<&[f64]> for TimeRestriction {
    type Error = PayoffError;

    fn try_from(raw: &[f64]) -> PayoffResult<Self> {
        match *raw {
            [t] => Ok(TimeRestriction::Instant(t)),
            [lower, upper] => Ok(TimeRestriction::Interval(lower, upper)),
            _ => Err(PayoffError::MalformedRestriction { len: raw.len() }),
        }
    }
}

/// A payoff that is only live at selected times.
///
/// Outside those times the payoff is inert: the continuation value passes
/// through untouched, default and coupon are zero.
#[derive(Debug, Clone)]
pub struct Time<P> {
    payoff: P,
    instants: Vec<f64>,
    intervals: Vec<(f64, f64)>,
}

impl<P: Payoff> Time<P> {
    pub fn new<I>(payoff: P, times: I) -> PayoffResult<Self>
    where
        I: IntoIterator,
        I::Item: Into<TimeRestriction>,
    {
        let mut timed = Time {
            payoff,
            instants: Vec::new(),
            intervals: Vec::new(),
        };
        timed.set_restrictions(times)?;
        Ok(timed)
    }

    /// Registered instants, then the intervals after clipping to `[0, T]`.
    pub fn restrictions(&self) -> Vec<TimeRestriction> {
        self.instants
            .iter()
            .map(|&t| TimeRestriction::Instant(t))
            .chain(
                self.intervals
                    .iter()
                    .map(|&(l, u)| TimeRestriction::Interval(l, u)),
            )
            .collect()
    }

    /// Replace every restriction. On error the previous ones are kept.
    pub fn set_restrictions<I>(&mut self, times: I) -> PayoffResult<()>
    where
        I: IntoIterator,
        I::Item: Into<TimeRestriction>,
    {
        let maturity = self.payoff.maturity();
        let mut instants = Vec::new();
        let mut intervals = Vec::new();

        for restriction in times {
            match restriction.into() {
                TimeRestriction::Instant(t) => {
                    if t.is_nan() {
                        return Err(PayoffError::InvalidParameters {
                            parameter: "time".to_string(),
                            value: t,
                            constraint: "must not be NaN".to_string(),
                        });
                    }
                    if (0.0..=maturity).contains(&t) {
                        instants.push(t);
                    } else {
                        warn!(t, maturity, "dropping time restriction outside [0, T]");
                    }
                }
                TimeRestriction::Interval(lower, upper) => {
                    if lower.is_nan() || upper.is_nan() || lower > upper {
                        return Err(PayoffError::InvalidInterval { lower, upper });
                    }
                    let (l, u) = (lower.max(0.0), upper.min(maturity));
                    if l <= u {
                        intervals.push((l, u));
                    } else {
                        warn!(lower, upper, maturity, "dropping interval outside [0, T]");
                    }
                }
            }
        }

        instants.sort_by(f64::total_cmp);
        instants.dedup();
        debug!(
            payoff = self.payoff.name(),
            instants = instants.len(),
            intervals = intervals.len(),
            "time restriction installed"
        );
        self.instants = instants;
        self.intervals = intervals;
        Ok(())
    }

    pub fn inner(&self) -> &P {
        &self.payoff
    }
}

impl<P: Payoff> Payoff for Time<P> {
    fn maturity(&self) -> f64 {
        self.payoff.maturity()
    }

    fn name(&self) -> &str {
        "Time"
    }

    fn capabilities(&self) -> Capabilities {
        self.payoff.capabilities()
    }

    fn is_active(&self, t: f64) -> bool {
        self.instants.contains(&t) || self.intervals.iter().any(|&(l, u)| l <= t && t <= u)
    }

    fn default_value(&self, t: f64, s: ArrayView1<'_, f64>) -> Array1<f64> {
        assert_before_maturity(t, self.maturity());
        if self.is_active(t) {
            self.payoff.default_value(t, s)
        } else {
            Array1::zeros(s.len())
        }
    }

    fn terminal_value(&self, s: ArrayView1<'_, f64>) -> Array1<f64> {
        if self.is_active(self.maturity()) {
            self.payoff.terminal_value(s)
        } else {
            Array1::zeros(s.len())
        }
    }

    fn transient_value(
        &self,
        t: f64,
        v: ArrayView1<'_, f64>,
        s: ArrayView1<'_, f64>,
    ) -> Array1<f64> {
        assert_before_maturity(t, self.maturity());
        assert_same_nodes(v.len(), s.len());
        if self.is_active(t) {
            self.payoff.transient_value(t, v, s)
        } else {
            v.to_owned()
        }
    }

    fn coupon_value(&self, t: f64) -> f64 {
        if self.is_active(t) {
            self.payoff.coupon_value(t)
        } else {
            0.0
        }
    }
}

/// Up-and-out knock-out at barrier `L`.
///
/// Only nodes with spot strictly below `L` see the wrapped payoff; every
/// other node is worth zero. The surviving subset is recomputed on every
/// call.
#[derive(Debug, Clone)]
pub struct UpAndOut<P> {
    payoff: P,
    barrier: f64,
}

impl<P: Payoff> UpAndOut<P> {
    pub fn new(payoff: P, barrier: f64) -> PayoffResult<Self> {
        validate_finite("barrier", barrier)?;
        debug!(payoff = payoff.name(), barrier, "up-and-out barrier attached");
        Ok(UpAndOut { payoff, barrier })
    }

    pub fn barrier(&self) -> f64 {
        self.barrier
    }

    pub fn inner(&self) -> &P {
        &self.payoff
    }

    /// Evaluate `f` on the surviving nodes and zero the rest.
    fn knock_out<F>(&self, s: ArrayView1<'_, f64>, f: F) -> Array1<f64>
    where
        F: FnOnce(&[usize], ArrayView1<'_, f64>) -> Array1<f64>,
    {
        let barrier = self.barrier;
        // NaN spots stay with the child so they surface in the result
        let idx = select_nodes(s, |x| x < barrier || x.is_nan());
        let alive = s.select(Axis(0), &idx);
        let mut out = Array1::zeros(s.len());
        scatter(&mut out, &idx, f(&idx[..], alive.view()).view());
        out
    }
}

impl<P: Payoff> Payoff for UpAndOut<P> {
    fn maturity(&self) -> f64 {
        self.payoff.maturity()
    }

    fn name(&self) -> &str {
        "UpAndOut"
    }

    fn capabilities(&self) -> Capabilities {
        self.payoff.capabilities()
    }

    fn default_value(&self, t: f64, s: ArrayView1<'_, f64>) -> Array1<f64> {
        assert_before_maturity(t, self.maturity());
        self.knock_out(s, |_, alive| self.payoff.default_value(t, alive))
    }

    fn terminal_value(&self, s: ArrayView1<'_, f64>) -> Array1<f64> {
        self.knock_out(s, |_, alive| self.payoff.terminal_value(alive))
    }

    fn transient_value(
        &self,
        t: f64,
        v: ArrayView1<'_, f64>,
        s: ArrayView1<'_, f64>,
    ) -> Array1<f64> {
        assert_before_maturity(t, self.maturity());
        assert_same_nodes(v.len(), s.len());
        self.knock_out(s, |idx, alive| {
            let v_alive = v.select(Axis(0), idx);
            self.payoff.transient_value(t, v_alive.view(), alive)
        })
    }

    fn coupon_value(&self, t: f64) -> f64 {
        if self.is_active(t) {
            self.payoff.coupon_value(t)
        } else {
            0.0
        }
    }
}
