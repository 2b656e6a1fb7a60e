//! # payoff-algebra: Composable Payoffs for Backward Induction
//!
//! The value rules a binomial tree or finite-difference solver applies while
//! stepping backward from maturity, with combinators to build convertible and
//! callable structures out of simple parts.
//!
//! ## Key Features
//!
//! - **Simple payoffs**: forwards, European and American calls and puts, floors
//!   and caps on the portfolio value
//! - **Bond legs**: coupon schedules with extrinsic or intrinsic coupons
//! - **Combinators**: stacks of rights, time restrictions, up-and-out barriers
//! - **Variable strikes**: time-dependent strikes with scoped substitution
//!
//! ## Quick Start
//!
//! ```rust
//! use ndarray::array;
//! use payoff_algebra::payoff::{CallA, Payoff, UpAndOut};
//!
//! let call = UpAndOut::new(CallA::new(1.0, 100.0)?, 120.0)?;
//! let s = array![90.0, 110.0, 130.0];
//!
//! assert_eq!(call.terminal_value(s.view()), array![0.0, 10.0, 0.0]);
//!
//! let v = array![2.0, 5.0, 40.0];
//! assert_eq!(call.transient_value(0.5, v.view(), s.view()), array![2.0, 10.0, 0.0]);
//! # Ok::<(), payoff_algebra::PayoffError>(())
//! ```
//!
//! ## Engine Contract
//!
//! At `t = T` the engine calls `terminal_value(S)` once. At each earlier step
//! it calls `transient_value(t, V, S)`, applies `default_value(t, S)` on the
//! defaulting nodes and accounts `coupon_value(t)` separately. Calling the
//! transient or default rule at `t = T` panics.

// Module declarations
pub mod error;
pub mod math_utils;
pub mod payoff;

// Re-export commonly used types for convenience
pub use error::{PayoffError, PayoffResult};
pub use payoff::{Capabilities, Payoff};
