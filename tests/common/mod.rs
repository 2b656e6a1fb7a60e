// tests/common/mod.rs
//! A minimal CRR binomial rollback used to drive payoffs through the engine
//! contract, plus the Black-Scholes reference it is checked against.

#![allow(dead_code)]

use ndarray::Array1;
use payoff_algebra::Payoff;
use statrs::function::erf;
use std::f64::consts::SQRT_2;

pub struct Lattice {
    pub s0: f64,
    pub r: f64,
    pub sigma: f64,
    /// Default intensity; zero disables default folding
    pub hazard: f64,
    pub steps: usize,
}

impl Default for Lattice {
    fn default() -> Self {
        Lattice {
            s0: 100.0,
            r: 0.05,
            sigma: 0.2,
            hazard: 0.0,
            steps: 400,
        }
    }
}

impl Lattice {
    fn spots(&self, i: usize, u: f64) -> Array1<f64> {
        Array1::from_iter((0..=i).map(|j| self.s0 * u.powi(2 * j as i32 - i as i32)))
    }

    /// Roll `payoff` back from maturity to `t = 0`.
    ///
    /// Coupons are added to the node values after the transient rule.
    pub fn price(&self, payoff: &dyn Payoff) -> f64 {
        let maturity = payoff.maturity();
        let n = self.steps;
        let dt = maturity / n as f64;
        let u = (self.sigma * dt.sqrt()).exp();
        let d = 1.0 / u;
        let p = ((self.r * dt).exp() - d) / (u - d);
        let disc = (-self.r * dt).exp();
        let survive = (-self.hazard * dt).exp();

        let mut v = payoff.terminal_value(self.spots(n, u).view()) + payoff.coupon_value(maturity);

        for i in (0..n).rev() {
            let t = maturity * i as f64 / n as f64;
            let s = self.spots(i, u);
            let expected = Array1::from_iter(
                (0..=i).map(|j| disc * (p * v[j + 1] + (1.0 - p) * v[j])),
            );
            let mut cont = expected * survive;
            if self.hazard > 0.0 {
                cont = cont + payoff.default_value(t, s.view()) * (1.0 - survive);
            }
            v = payoff.transient_value(t, cont.view(), s.view()) + payoff.coupon_value(t);
        }

        v[0]
    }
}

pub fn norm_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf::erf(x / SQRT_2))
}

pub fn bs_call_price(s: f64, k: f64, r: f64, sigma: f64, t: f64) -> f64 {
    let d1 = ((s / k).ln() + (r + 0.5 * sigma * sigma) * t) / (sigma * t.sqrt());
    let d2 = d1 - sigma * t.sqrt();
    s * norm_cdf(d1) - k * (-r * t).exp() * norm_cdf(d2)
}

pub fn bs_put_price(s: f64, k: f64, r: f64, sigma: f64, t: f64) -> f64 {
    let d1 = ((s / k).ln() + (r + 0.5 * sigma * sigma) * t) / (sigma * t.sqrt());
    let d2 = d1 - sigma * t.sqrt();
    k * (-r * t).exp() * norm_cdf(-d2) - s * norm_cdf(-d1)
}
