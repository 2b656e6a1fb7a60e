// demos/convertible_bond.rs
//! Compose a callable convertible bond and roll it back on a CRR tree.
//!
//! Run with `RUST_LOG=payoff_algebra=debug` to see the composition logged.

use ndarray::Array1;
use payoff_algebra::payoff::{AnnuityI, AnnuityTerms, CallA, CallVR, PutV, Stack, Time};
use payoff_algebra::{Capabilities, Payoff, PayoffResult};
use tracing_subscriber::EnvFilter;

const T: f64 = 5.0;

fn convertible_bond(callable_from: f64) -> PayoffResult<Stack> {
    let bond = AnnuityI::new(AnnuityTerms {
        maturity: T,
        times: (1..=10).map(|i| 0.5 * i as f64).collect(),
        coupon: 2.0,
        nominal: 100.0,
        recovery: 0.4,
    })?;
    // one share per bond, convertible at any time
    let conversion = CallA::new(T, 0.0)?;
    let put = Time::new(PutV::new(T, 105.0)?, [3.0])?;
    let call = Time::new(CallVR::new(T, 115.0)?, [(callable_from, T)])?;

    Stack::new(vec![
        Box::new(bond),
        Box::new(put),
        Box::new(conversion),
        Box::new(call),
    ])
}

fn rollback(payoff: &dyn Payoff, s0: f64, r: f64, sigma: f64, hazard: f64, steps: usize) -> f64 {
    let maturity = payoff.maturity();
    let dt = maturity / steps as f64;
    let u = (sigma * dt.sqrt()).exp();
    let d = 1.0 / u;
    let p = ((r * dt).exp() - d) / (u - d);
    let disc = (-r * dt).exp();
    let survive = (-hazard * dt).exp();
    let caps = payoff.capabilities();
    let spots =
        |i: usize| Array1::from_iter((0..=i).map(|j| s0 * u.powi(2 * j as i32 - i as i32)));

    let mut v = payoff.terminal_value(spots(steps).view());
    if caps.contains(Capabilities::COUPON) {
        v += payoff.coupon_value(maturity);
    }

    for i in (0..steps).rev() {
        let t = maturity * i as f64 / steps as f64;
        let s = spots(i);
        let mut cont =
            Array1::from_iter((0..=i).map(|j| disc * survive * (p * v[j + 1] + (1.0 - p) * v[j])));
        if caps.contains(Capabilities::DEFAULT) {
            cont = cont + payoff.default_value(t, s.view()) * (1.0 - survive);
        }
        v = payoff.transient_value(t, cont.view(), s.view());
        if caps.contains(Capabilities::COUPON) {
            v += payoff.coupon_value(t);
        }
    }

    v[0]
}

fn main() -> PayoffResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("Callable Convertible Bond");
    println!("=========================\n");

    let steps = 1_000;
    let (r, sigma, hazard) = (0.05, 0.25, 0.02);

    println!(
        "{:>8} {:>14} {:>14} {:>14}",
        "Spot", "Call from 1y", "Call from 2y", "Call from 4y"
    );
    let payoffs = [
        convertible_bond(1.0)?,
        convertible_bond(2.0)?,
        convertible_bond(4.0)?,
    ];
    for s0 in [60.0, 80.0, 100.0, 120.0, 140.0] {
        let prices: Vec<f64> = payoffs
            .iter()
            .map(|p| rollback(p, s0, r, sigma, hazard, steps))
            .collect();
        println!(
            "{:>8.1} {:>14.4} {:>14.4} {:>14.4}",
            s0, prices[0], prices[1], prices[2]
        );
    }

    Ok(())
}
