//! Progressive bracket tax with a credit floor and an optional flat cap.
//!
//! # Calculation Steps
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | If a cap is active and salary ≥ cap salary, the tax is the cap tax |
//! | 2    | Walk brackets in ascending order, taxing each slice of salary at its rate |
//! | 3    | Subtract the credit (points × value per point), never going below zero |
//!
//! The top bracket extends up to the salary itself. The walk stops at the
//! first bracket whose lower bound the salary does not exceed, and right after
//! the bracket that contains the salary.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use burden_core::calculations::BracketTaxCalculator;
//! use burden_core::{ContributionCap, TaxBracket, TaxBracketSchedule, TaxCreditPolicy};
//!
//! let schedule = TaxBracketSchedule::new(vec![
//!     TaxBracket::new(dec!(0), dec!(0.0345)),
//!     TaxBracket::new(dec!(5944), dec!(0.075)),
//! ])
//! .unwrap();
//!
//! let calculator = BracketTaxCalculator::new(&schedule, TaxCreditPolicy::none())
//!     .with_cap(ContributionCap::new(dec!(43370), dec!(3012)));
//!
//! // 5944 × 3.45% + 4056 × 7.5%
//! assert_eq!(calculator.compute_tax(dec!(10000)), dec!(509.268));
//! assert_eq!(calculator.compute_tax(dec!(50000)), dec!(3012));
//! ```

use rust_decimal::Decimal;
use tracing::warn;

use crate::models::{ContributionCap, TaxBracketSchedule, TaxCreditPolicy};

/// Calculator for tax owed on a single salary under a bracket schedule.
#[derive(Debug, Clone)]
pub struct BracketTaxCalculator<'a> {
    schedule: &'a TaxBracketSchedule,
    credit: TaxCreditPolicy,
    cap: ContributionCap,
}

impl<'a> BracketTaxCalculator<'a> {
    /// Creates an uncapped calculator.
    pub fn new(
        schedule: &'a TaxBracketSchedule,
        credit: TaxCreditPolicy,
    ) -> Self {
        Self {
            schedule,
            credit,
            cap: ContributionCap::default(),
        }
    }

    /// Adds a statutory ceiling. A cap with a zero salary or zero tax has no
    /// effect.
    pub fn with_cap(
        mut self,
        cap: ContributionCap,
    ) -> Self {
        self.cap = cap;
        self
    }

    /// Returns the tax owed on `salary`.
    ///
    /// A negative salary is treated as no income and owes nothing.
    pub fn compute_tax(
        &self,
        salary: Decimal,
    ) -> Decimal {
        if let Some(capped) = self.cap.applies_to(salary) {
            return capped;
        }

        if salary < Decimal::ZERO {
            warn!(salary = %salary, "Negative salary; treating as no income");
        }

        let accrued = self.bracket_tax(salary);
        self.apply_credit(accrued)
    }

    /// Sums `rate × slice` over the brackets the salary reaches.
    fn bracket_tax(
        &self,
        salary: Decimal,
    ) -> Decimal {
        let brackets = self.schedule.brackets();
        let mut tax = Decimal::ZERO;

        for (index, bracket) in brackets.iter().enumerate() {
            let bottom = bracket.lower_bound;
            if salary <= bottom {
                break;
            }

            let top = brackets
                .get(index + 1)
                .map_or(salary, |next| next.lower_bound);

            if salary > top {
                tax += bracket.rate * (top - bottom);
            } else {
                tax += bracket.rate * (salary - bottom);
                break;
            }
        }

        tax
    }

    /// Subtracts the credit, flooring the result at zero.
    fn apply_credit(
        &self,
        tax: Decimal,
    ) -> Decimal {
        let credit = self.credit.total();
        if tax <= credit {
            Decimal::ZERO
        } else {
            tax - credit
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use tracing_subscriber::fmt::format::FmtSpan;

    use super::*;
    use crate::models::TaxBracket;

    /// The 2018 employer National Insurance and Health schedule.
    fn employer_schedule() -> TaxBracketSchedule {
        TaxBracketSchedule::new(vec![
            TaxBracket::new(dec!(0), dec!(0.0345)),
            TaxBracket::new(dec!(5944), dec!(0.075)),
        ])
        .expect("valid schedule")
    }

    /// A monthly income tax schedule with several brackets.
    fn income_schedule() -> TaxBracketSchedule {
        TaxBracketSchedule::new(vec![
            TaxBracket::new(dec!(0), dec!(0.10)),
            TaxBracket::new(dec!(6310), dec!(0.14)),
            TaxBracket::new(dec!(9050), dec!(0.20)),
            TaxBracket::new(dec!(14530), dec!(0.31)),
        ])
        .expect("valid schedule")
    }

    fn employer_cap() -> ContributionCap {
        ContributionCap::new(dec!(43370), dec!(3012))
    }

    /// Log output captured by the subscriber from [`init_test_tracing`].
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            let buffer = self.0.lock().expect("log buffer poisoned");
            String::from_utf8_lossy(&buffer).into_owned()
        }
    }

    impl io::Write for CapturedLogs {
        fn write(
            &mut self,
            buf: &[u8],
        ) -> io::Result<usize> {
            self.0
                .lock()
                .expect("log buffer poisoned")
                .extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Initializes a thread-local subscriber whose WARN output can be read back.
    fn init_test_tracing() -> (tracing::subscriber::DefaultGuard, CapturedLogs) {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_span_events(FmtSpan::NONE)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        (tracing::subscriber::set_default(subscriber), logs)
    }

    // =========================================================================
    // Cap tests
    // =========================================================================

    #[test]
    fn cap_returns_max_tax_above_max_salary() {
        let schedule = employer_schedule();
        let calculator =
            BracketTaxCalculator::new(&schedule, TaxCreditPolicy::none()).with_cap(employer_cap());

        assert_eq!(calculator.compute_tax(dec!(50000)), dec!(3012));
    }

    #[test]
    fn cap_returns_max_tax_at_max_salary() {
        let schedule = employer_schedule();
        let calculator =
            BracketTaxCalculator::new(&schedule, TaxCreditPolicy::none()).with_cap(employer_cap());

        assert_eq!(calculator.compute_tax(dec!(43370)), dec!(3012));
    }

    #[test]
    fn cap_ignores_credit() {
        let schedule = employer_schedule();
        let calculator = BracketTaxCalculator::new(&schedule, TaxCreditPolicy::standard_2018())
            .with_cap(employer_cap());

        assert_eq!(calculator.compute_tax(dec!(60000)), dec!(3012));
    }

    #[test]
    fn inactive_cap_falls_through_to_brackets() {
        let schedule = employer_schedule();
        let calculator = BracketTaxCalculator::new(&schedule, TaxCreditPolicy::none())
            .with_cap(ContributionCap::new(dec!(43370), dec!(0)));

        // 5944 × 0.0345 + 44056 × 0.075
        assert_eq!(calculator.compute_tax(dec!(50000)), dec!(3509.268));
    }

    #[test]
    fn just_below_cap_uses_brackets() {
        let schedule = employer_schedule();
        let calculator =
            BracketTaxCalculator::new(&schedule, TaxCreditPolicy::none()).with_cap(employer_cap());

        // 205.068 + (43000 - 5944) × 0.075
        assert_eq!(calculator.compute_tax(dec!(43000)), dec!(2984.268));
    }

    // =========================================================================
    // Bracket walk tests
    // =========================================================================

    #[test]
    fn zero_salary_owes_nothing() {
        let schedule = employer_schedule();
        let calculator = BracketTaxCalculator::new(&schedule, TaxCreditPolicy::none());

        assert_eq!(calculator.compute_tax(dec!(0)), dec!(0));
    }

    #[test]
    fn salary_at_bracket_boundary_taxed_in_lower_bracket_only() {
        let schedule = employer_schedule();
        let calculator = BracketTaxCalculator::new(&schedule, TaxCreditPolicy::none());

        assert_eq!(calculator.compute_tax(dec!(5944)), dec!(5944) * dec!(0.0345));
    }

    #[test]
    fn salary_inside_first_bracket() {
        let schedule = employer_schedule();
        let calculator = BracketTaxCalculator::new(&schedule, TaxCreditPolicy::none());

        assert_eq!(calculator.compute_tax(dec!(1000)), dec!(34.5));
    }

    #[test]
    fn salary_spanning_all_brackets() {
        let schedule = income_schedule();
        let calculator = BracketTaxCalculator::new(&schedule, TaxCreditPolicy::none());

        // 631 + 2740 × 0.14 + 5480 × 0.20 + 5470 × 0.31
        let expected = dec!(631) + dec!(383.6) + dec!(1096) + dec!(1695.7);
        assert_eq!(calculator.compute_tax(dec!(20000)), expected);
    }

    #[test]
    fn salary_in_middle_bracket_stops_after_partial_slice() {
        let schedule = income_schedule();
        let calculator = BracketTaxCalculator::new(&schedule, TaxCreditPolicy::none());

        // 631 + 2740 × 0.14 + 950 × 0.20
        assert_eq!(calculator.compute_tax(dec!(10000)), dec!(1204.6));
    }

    #[test]
    fn salary_below_first_bound_owes_nothing() {
        let schedule =
            TaxBracketSchedule::new(vec![TaxBracket::new(dec!(1000), dec!(0.5))]).expect("valid");
        let calculator = BracketTaxCalculator::new(&schedule, TaxCreditPolicy::none());

        assert_eq!(calculator.compute_tax(dec!(999)), dec!(0));
        assert_eq!(calculator.compute_tax(dec!(1200)), dec!(100));
    }

    #[test]
    fn empty_schedule_owes_nothing() {
        let schedule = TaxBracketSchedule::default();
        let calculator = BracketTaxCalculator::new(&schedule, TaxCreditPolicy::none());

        assert_eq!(calculator.compute_tax(dec!(25000)), dec!(0));
    }

    #[test]
    fn negative_salary_owes_nothing_and_logs_warning() {
        let (_guard, logs) = init_test_tracing();
        let schedule = employer_schedule();
        let calculator = BracketTaxCalculator::new(&schedule, TaxCreditPolicy::none());

        assert_eq!(calculator.compute_tax(dec!(-500)), dec!(0));

        let output = logs.contents();
        assert!(output.contains("WARN"), "missing level in {output:?}");
        assert!(output.contains("Negative salary; treating as no income"));
        assert!(output.contains("salary=-500"));
    }

    #[test]
    fn positive_salary_logs_nothing() {
        let (_guard, logs) = init_test_tracing();
        let schedule = employer_schedule();
        let calculator = BracketTaxCalculator::new(&schedule, TaxCreditPolicy::none());

        assert_eq!(calculator.compute_tax(dec!(1000)), dec!(34.5));
        assert_eq!(logs.contents(), "");
    }

    // =========================================================================
    // Credit tests
    // =========================================================================

    #[test]
    fn credit_is_subtracted_from_bracket_tax() {
        let schedule = income_schedule();
        let calculator = BracketTaxCalculator::new(&schedule, TaxCreditPolicy::standard_2018());

        // 1204.6 - 2.25 × 216
        assert_eq!(calculator.compute_tax(dec!(10000)), dec!(718.6));
    }

    #[test]
    fn credit_larger_than_tax_floors_at_zero() {
        let schedule = income_schedule();
        let calculator = BracketTaxCalculator::new(&schedule, TaxCreditPolicy::standard_2018());

        // 4000 × 0.10 = 400 < 486
        assert_eq!(calculator.compute_tax(dec!(4000)), dec!(0));
    }

    #[test]
    fn credit_equal_to_tax_floors_at_zero() {
        let schedule = income_schedule();
        let calculator =
            BracketTaxCalculator::new(&schedule, TaxCreditPolicy::new(dec!(1), dec!(400)));

        assert_eq!(calculator.compute_tax(dec!(4000)), dec!(0));
    }
}
