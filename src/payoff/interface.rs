//! The Payoff Contract
//!
//! # Backward Induction
//!
//! A pricing engine (binomial tree or finite-difference grid) walks backward
//! from maturity `T`. Every payoff answers four questions about an array of
//! nodes `S` (spot prices, or portfolio values for value-based payoffs):
//!
//! ```text
//! t = T :  V  = terminal_value(S)
//! t < T :  V  = transient_value(t, V_cont, S)    fold exercise rights into V
//!          V* = default_value(t, S)              residual on default nodes
//!          c  = coupon_value(t)                  state-independent cashflow
//! ```
//!
//! `default_value` and `transient_value` are undefined at `t = T`; calling
//! them there panics.
//!
//! # Shapes
//!
//! Node arrays are one-dimensional. Every returned array has the length of
//! `S`, and `V` must match `S` node for node.

use crate::error::{assert_before_maturity, assert_same_nodes};
use bitflags::bitflags;
use ndarray::{Array1, ArrayView1};
use std::fmt;

bitflags! {
    /// Operations a payoff contributes beyond the neutral base behaviour.
    ///
    /// An engine can skip default folding or coupon accounting for a payoff
    /// tree whose flags lack `DEFAULT` or `COUPON`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Capabilities: u32 {
        const NONE      = 0;
        const TERMINAL  = 1 << 0;
        const TRANSIENT = 1 << 1;
        const DEFAULT   = 1 << 2;
        const COUPON    = 1 << 3;
    }
}

/// Value rules of a derivative contract, evaluated over arrays of nodes.
///
/// The defaults describe a contract that pays nothing and never alters the
/// continuation value.
pub trait Payoff: fmt::Debug {
    /// Maturity `T`.
    fn maturity(&self) -> f64;

    /// Short kind name, used in logs.
    fn name(&self) -> &str;

    /// Operations this payoff contributes beyond the neutral defaults.
    fn capabilities(&self) -> Capabilities;

    /// Whether the payoff is live at `t`. Defaults to `t ∈ [0, T]`.
    fn is_active(&self, t: f64) -> bool {
        (0.0..=self.maturity()).contains(&t)
    }

    /// Value received on nodes that default at `t < T`.
    fn default_value(&self, t: f64, s: ArrayView1<'_, f64>) -> Array1<f64> {
        assert_before_maturity(t, self.maturity());
        Array1::zeros(s.len())
    }

    /// Value at maturity.
    fn terminal_value(&self, s: ArrayView1<'_, f64>) -> Array1<f64> {
        Array1::zeros(s.len())
    }

    /// Fold this payoff's rights into the continuation value `v` at `t < T`.
    fn transient_value(
        &self,
        t: f64,
        v: ArrayView1<'_, f64>,
        s: ArrayView1<'_, f64>,
    ) -> Array1<f64> {
        assert_before_maturity(t, self.maturity());
        assert_same_nodes(v.len(), s.len());
        v.to_owned()
    }

    /// Cashflow paid at `t`, independent of the nodes.
    fn coupon_value(&self, _t: f64) -> f64 {
        0.0
    }
}

macro_rules! forward_payoff {
    ($($ptr:ty),*) => {$(
        impl<P: Payoff + ?Sized> Payoff for $ptr {
            fn maturity(&self) -> f64 {
                (**self).maturity()
            }

            fn name(&self) -> &str {
                (**self).name()
            }

            fn capabilities(&self) -> Capabilities {
                (**self).capabilities()
            }

            fn is_active(&self, t: f64) -> bool {
                (**self).is_active(t)
            }

            fn default_value(&self, t: f64, s: ArrayView1<'_, f64>) -> Array1<f64> {
                (**self).default_value(t, s)
            }

            fn terminal_value(&self, s: ArrayView1<'_, f64>) -> Array1<f64> {
                (**self).terminal_value(s)
            }

            fn transient_value(
                &self,
                t: f64,
                v: ArrayView1<'_, f64>,
                s: ArrayView1<'_, f64>,
            ) -> Array1<f64> {
                (**self).transient_value(t, v, s)
            }

            fn coupon_value(&self, t: f64) -> f64 {
                (**self).coupon_value(t)
            }
        }
    )*};
}

forward_payoff!(Box<P>, &P);
