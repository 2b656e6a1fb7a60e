pub mod annuity;
pub mod compound;
pub mod interface;
pub mod mutator;
pub mod simple;

pub use annuity::{Annuity, AnnuityI, AnnuityTerms};
pub use compound::{Stack, Time, TimeRestriction, UpAndOut};
pub use interface::{Capabilities, Payoff};
pub use mutator::{StrikeSchedule, VariableStrike};
pub use simple::{CallA, CallE, CallVR, Forward, PutA, PutE, PutV, Strike, StrikeBearing};
