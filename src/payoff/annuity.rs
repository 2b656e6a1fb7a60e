//! Stock-Independent Payoffs
//!
//! A bond leg paying coupon `C` on a discrete schedule and nominal `N` at
//! maturity. On default the holder recovers `N·R`, whatever the time.
//!
//! - [`Annuity`] reports its coupon only through `coupon_value`; the engine
//!   accounts for it separately, and a dominating sibling in a stack can
//!   override the bond without the coupon ever reaching the portfolio value.
//! - [`AnnuityI`] adds the coupon to the portfolio value itself, in
//!   `transient_value` and `terminal_value`.

use super::interface::{Capabilities, Payoff};
use crate::error::validation::{validate_finite, validate_positive, validate_range};
use crate::error::{assert_before_maturity, assert_same_nodes, PayoffError, PayoffResult};
use crate::math_utils::filled_like;
use ndarray::{Array1, ArrayView1};

/// Terms of a coupon-bearing bond leg.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnuityTerms {
    /// Maturity `T`
    pub maturity: f64,
    /// Coupon payment times
    pub times: Vec<f64>,
    /// Coupon amount `C`
    pub coupon: f64,
    /// Nominal `N`, paid once at maturity
    pub nominal: f64,
    /// Recovery rate `R` applied to the nominal on default
    pub recovery: f64,
}

impl AnnuityTerms {
    pub fn validate(&self) -> PayoffResult<()> {
        validate_positive("maturity", self.maturity)?;
        validate_finite("coupon", self.coupon)?;
        validate_finite("nominal", self.nominal)?;
        validate_range("recovery", self.recovery, 0.0, 1.0)?;

        for &t in &self.times {
            validate_finite("times", t)?;
            if !(0.0..=self.maturity).contains(&t) {
                return Err(PayoffError::InvalidConfiguration {
                    field: "times".to_string(),
                    reason: format!(
                        "coupon time {} lies outside [0, {}]",
                        t, self.maturity
                    ),
                });
            }
        }

        Ok(())
    }

    fn pays_at(&self, t: f64) -> bool {
        self.times.iter().any(|&c| c == t)
    }
}

impl Default for AnnuityTerms {
    fn default() -> Self {
        AnnuityTerms {
            maturity: 1.0,
            times: Vec::new(),
            coupon: 0.0,
            nominal: 0.0,
            recovery: 0.0,
        }
    }
}

fn checked_schedule(mut terms: AnnuityTerms) -> PayoffResult<AnnuityTerms> {
    terms.validate()?;
    terms.times.sort_by(f64::total_cmp);
    terms.times.dedup();
    Ok(terms)
}

/// Bond leg with extrinsic coupons.
#[derive(Debug, Clone)]
pub struct Annuity {
    terms: AnnuityTerms,
}

impl Annuity {
    pub fn new(terms: AnnuityTerms) -> PayoffResult<Self> {
        Ok(Annuity {
            terms: checked_schedule(terms)?,
        })
    }

    pub fn terms(&self) -> &AnnuityTerms {
        &self.terms
    }
}

impl Payoff for Annuity {
    fn maturity(&self) -> f64 {
        self.terms.maturity
    }

    fn name(&self) -> &str {
        "Annuity"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::TERMINAL | Capabilities::DEFAULT | Capabilities::COUPON
    }

    /// Live only on the coupon dates.
    fn is_active(&self, t: f64) -> bool {
        self.terms.pays_at(t)
    }

    fn default_value(&self, t: f64, s: ArrayView1<'_, f64>) -> Array1<f64> {
        assert_before_maturity(t, self.terms.maturity);
        filled_like(s, self.terms.nominal * self.terms.recovery)
    }

    fn terminal_value(&self, s: ArrayView1<'_, f64>) -> Array1<f64> {
        filled_like(s, self.terms.nominal)
    }

    fn coupon_value(&self, t: f64) -> f64 {
        if self.is_active(t) {
            self.terms.coupon
        } else {
            0.0
        }
    }
}

/// Bond leg with intrinsic coupons.
#[derive(Debug, Clone)]
pub struct AnnuityI {
    terms: AnnuityTerms,
}

impl AnnuityI {
    pub fn new(terms: AnnuityTerms) -> PayoffResult<Self> {
        Ok(AnnuityI {
            terms: checked_schedule(terms)?,
        })
    }

    pub fn terms(&self) -> &AnnuityTerms {
        &self.terms
    }
}

impl Payoff for AnnuityI {
    fn maturity(&self) -> f64 {
        self.terms.maturity
    }

    fn name(&self) -> &str {
        "AnnuityI"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::TERMINAL | Capabilities::TRANSIENT | Capabilities::DEFAULT
    }

    fn default_value(&self, t: f64, s: ArrayView1<'_, f64>) -> Array1<f64> {
        assert_before_maturity(t, self.terms.maturity);
        filled_like(s, self.terms.nominal * self.terms.recovery)
    }

    fn terminal_value(&self, s: ArrayView1<'_, f64>) -> Array1<f64> {
        let mut value = self.terms.nominal;
        if self.terms.pays_at(self.terms.maturity) {
            value += self.terms.coupon;
        }
        filled_like(s, value)
    }

    fn transient_value(
        &self,
        t: f64,
        v: ArrayView1<'_, f64>,
        s: ArrayView1<'_, f64>,
    ) -> Array1<f64> {
        assert_before_maturity(t, self.terms.maturity);
        assert_same_nodes(v.len(), s.len());
        if self.terms.pays_at(t) {
            v.mapv(|x| x + self.terms.coupon)
        } else {
            v.to_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn terms() -> AnnuityTerms {
        AnnuityTerms {
            maturity: 3.0,
            times: vec![3.0, 1.0, 2.0, 2.0],
            coupon: 5.0,
            nominal: 100.0,
            recovery: 0.4,
        }
    }

    #[test]
    fn test_schedule_is_sorted_and_deduplicated() {
        let bond = Annuity::new(terms()).unwrap();
        assert_eq!(bond.terms().times, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_annuity_activity_follows_schedule() {
        let bond = Annuity::new(terms()).unwrap();
        assert!(bond.is_active(1.0));
        assert!(!bond.is_active(1.5));
        assert_eq!(bond.coupon_value(2.0), 5.0);
        assert_eq!(bond.coupon_value(2.5), 0.0);
    }

    #[test]
    fn test_recovery_on_default_is_time_independent() {
        let bond = Annuity::new(terms()).unwrap();
        let bond_i = AnnuityI::new(terms()).unwrap();
        let s = array![50.0, 150.0];

        for t in [0.0, 1.0, 2.5] {
            assert_eq!(bond.default_value(t, s.view()), array![40.0, 40.0]);
            assert_eq!(bond_i.default_value(t, s.view()), array![40.0, 40.0]);
        }
    }

    #[test]
    fn test_intrinsic_coupon_is_folded_into_value() {
        let bond_i = AnnuityI::new(terms()).unwrap();
        let s = array![80.0, 120.0];
        let v = array![101.0, 102.0];

        assert_eq!(bond_i.transient_value(1.0, v.view(), s.view()), array![106.0, 107.0]);
        assert_eq!(bond_i.transient_value(1.5, v.view(), s.view()), v);
        assert_eq!(bond_i.terminal_value(s.view()), array![105.0, 105.0]);
        assert_eq!(bond_i.coupon_value(1.0), 0.0);
    }

    #[test]
    #[should_panic(expected = "evaluated at maturity")]
    fn test_annuity_default_at_maturity_panics() {
        let bond = Annuity::new(terms()).unwrap();
        bond.default_value(3.0, array![100.0].view());
    }

    #[test]
    #[should_panic(expected = "evaluated at maturity")]
    fn test_annuity_transient_at_maturity_panics() {
        let bond = Annuity::new(terms()).unwrap();
        let v = array![100.0];
        bond.transient_value(3.0, v.view(), v.view());
    }

    #[test]
    #[should_panic(expected = "evaluated at maturity")]
    fn test_intrinsic_annuity_default_at_maturity_panics() {
        let bond_i = AnnuityI::new(terms()).unwrap();
        bond_i.default_value(3.0, array![100.0].view());
    }

    #[test]
    #[should_panic(expected = "evaluated at maturity")]
    fn test_intrinsic_annuity_transient_at_maturity_panics() {
        let bond_i = AnnuityI::new(terms()).unwrap();
        let v = array![100.0];
        bond_i.transient_value(3.0, v.view(), v.view());
    }

    #[test]
    fn test_terms_validation() {
        let mut bad = terms();
        bad.recovery = 1.5;
        assert!(Annuity::new(bad).is_err());

        let mut bad = terms();
        bad.times.push(4.0);
        assert!(matches!(
            AnnuityI::new(bad),
            Err(PayoffError::InvalidConfiguration { .. })
        ));

        assert!(AnnuityTerms::default().validate().is_ok());
    }
}
