//! Employer-side contributions per household.
//!
//! Each person's gross income is run through the employer contribution
//! schedule (no credit, statutory cap) and the results are summed by household.

use std::collections::{BTreeMap, HashSet};

use rust_decimal::Decimal;
use tracing::debug;

use crate::calculations::BracketTaxCalculator;
use crate::calculations::common::overflow;
use crate::error::Result;
use crate::models::{EmployerContributionConfig, HouseholdId, PersonRecord, TaxCreditPolicy};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Contribution {
    total: Decimal,
    members: usize,
}

/// Summed employer contributions keyed by household.
///
/// Looking up a household with no members yields zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmployerTaxByHousehold {
    contributions: BTreeMap<HouseholdId, Contribution>,
}

/// A household referenced by the person table but absent from the household
/// table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrphanedHousehold {
    pub household_id: HouseholdId,
    pub persons: usize,
    pub employer_tax: Decimal,
}

impl EmployerTaxByHousehold {
    /// Employer tax for `household_id`, or zero if it has no members.
    pub fn get(
        &self,
        household_id: HouseholdId,
    ) -> Decimal {
        self.contributions
            .get(&household_id)
            .map_or(Decimal::ZERO, |c| c.total)
    }

    /// Number of person records that contributed to `household_id`.
    pub fn members(
        &self,
        household_id: HouseholdId,
    ) -> usize {
        self.contributions
            .get(&household_id)
            .map_or(0, |c| c.members)
    }

    /// Number of distinct households with at least one person.
    pub fn len(&self) -> usize {
        self.contributions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contributions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (HouseholdId, Decimal)> + '_ {
        self.contributions.iter().map(|(id, c)| (*id, c.total))
    }

    /// Splits off the households not in `known`.
    ///
    /// Returns the contributions restricted to `known` households together
    /// with the orphaned entries, in ascending household order.
    pub fn split_unknown(
        self,
        known: &HashSet<HouseholdId>,
    ) -> (Self, Vec<OrphanedHousehold>) {
        let (kept, orphaned): (BTreeMap<_, _>, BTreeMap<_, _>) = self
            .contributions
            .into_iter()
            .partition(|(id, _)| known.contains(id));

        let orphaned = orphaned
            .into_iter()
            .map(|(household_id, c)| OrphanedHousehold {
                household_id,
                persons: c.members,
                employer_tax: c.total,
            })
            .collect();

        (
            Self {
                contributions: kept,
            },
            orphaned,
        )
    }
}

/// Applies the employer contribution rules to every person and groups the
/// results by household.
#[derive(Debug, Clone)]
pub struct PersonAggregator<'a> {
    calculator: BracketTaxCalculator<'a>,
}

impl<'a> PersonAggregator<'a> {
    pub fn new(config: &'a EmployerContributionConfig) -> Self {
        let calculator = BracketTaxCalculator::new(&config.schedule, TaxCreditPolicy::none())
            .with_cap(config.cap);
        Self { calculator }
    }

    /// Employer contribution owed on one person's income.
    pub fn contribution(
        &self,
        person: &PersonRecord,
    ) -> Decimal {
        self.calculator.compute_tax(person.gross_income)
    }

    /// # Errors
    ///
    /// Returns [`crate::BurdenError::InvalidInput`] if a household's summed
    /// contributions leave the decimal range.
    pub fn aggregate(
        &self,
        persons: &[PersonRecord],
    ) -> Result<EmployerTaxByHousehold> {
        let mut contributions: BTreeMap<HouseholdId, Contribution> = BTreeMap::new();

        for person in persons {
            let contribution = self.contribution(person);
            let entry = contributions.entry(person.household_id).or_default();
            entry.total = entry.total.checked_add(contribution).ok_or_else(|| {
                overflow(&format!(
                    "employer tax of household {}",
                    person.household_id
                ))
            })?;
            entry.members += 1;
        }

        debug!(
            persons = persons.len(),
            households = contributions.len(),
            "Aggregated employer contributions"
        );

        Ok(EmployerTaxByHousehold { contributions })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::BurdenError;
    use crate::models::{ContributionCap, TaxBracket, TaxBracketSchedule};

    fn person(
        household: u64,
        income: Decimal,
    ) -> PersonRecord {
        PersonRecord {
            household_id: HouseholdId(household),
            gross_income: income,
        }
    }

    // =========================================================================
    // PersonAggregator tests
    // =========================================================================

    #[test]
    fn contribution_uses_employer_schedule() {
        let config = EmployerContributionConfig::default();
        let aggregator = PersonAggregator::new(&config);

        assert_eq!(aggregator.contribution(&person(1, dec!(1000))), dec!(34.5));
    }

    #[test]
    fn contribution_applies_cap() {
        let config = EmployerContributionConfig::default();
        let aggregator = PersonAggregator::new(&config);

        assert_eq!(aggregator.contribution(&person(1, dec!(90000))), dec!(3012));
    }

    #[test]
    fn aggregate_sums_members_of_same_household() {
        let config = EmployerContributionConfig::default();
        let aggregator = PersonAggregator::new(&config);

        let result = aggregator
            .aggregate(&[
                person(1, dec!(1000)),
                person(2, dec!(2000)),
                person(1, dec!(10000)),
            ])
            .expect("aggregation should succeed");

        assert_eq!(result.len(), 2);
        assert_eq!(result.get(HouseholdId(1)), dec!(34.5) + dec!(509.268));
        assert_eq!(result.get(HouseholdId(2)), dec!(69));
        assert_eq!(result.members(HouseholdId(1)), 2);
    }

    #[test]
    fn aggregate_counts_members_without_income() {
        let config = EmployerContributionConfig::default();
        let aggregator = PersonAggregator::new(&config);

        let result = aggregator
            .aggregate(&[person(5, dec!(0)), person(5, dec!(0))])
            .expect("aggregation should succeed");

        assert_eq!(result.get(HouseholdId(5)), dec!(0));
        assert_eq!(result.members(HouseholdId(5)), 2);
    }

    #[test]
    fn aggregate_of_no_persons_is_empty() {
        let config = EmployerContributionConfig::default();
        let aggregator = PersonAggregator::new(&config);

        let result = aggregator
            .aggregate(&[])
            .expect("aggregation should succeed");

        assert!(result.is_empty());
    }

    #[test]
    fn aggregate_rejects_household_total_beyond_decimal_range() {
        let config = EmployerContributionConfig {
            schedule: TaxBracketSchedule::new(vec![TaxBracket::new(dec!(0), dec!(1))])
                .expect("valid schedule"),
            cap: ContributionCap::default(),
        };
        let aggregator = PersonAggregator::new(&config);

        let result = aggregator.aggregate(&[person(8, Decimal::MAX), person(8, Decimal::MAX)]);

        assert_eq!(
            result,
            Err(BurdenError::InvalidInput(
                "employer tax of household 8 exceeds the decimal range".to_string()
            ))
        );
    }

    // =========================================================================
    // EmployerTaxByHousehold tests
    // =========================================================================

    #[test]
    fn get_defaults_to_zero_for_unknown_household() {
        let config = EmployerContributionConfig::default();
        let result = PersonAggregator::new(&config)
            .aggregate(&[person(1, dec!(1000))])
            .expect("aggregation should succeed");

        assert_eq!(result.get(HouseholdId(99)), Decimal::ZERO);
        assert_eq!(result.members(HouseholdId(99)), 0);
    }

    #[test]
    fn split_unknown_separates_orphans() {
        let config = EmployerContributionConfig::default();
        let result = PersonAggregator::new(&config)
            .aggregate(&[
                person(1, dec!(1000)),
                person(7, dec!(2000)),
                person(7, dec!(1000)),
            ])
            .expect("aggregation should succeed");
        let known: HashSet<HouseholdId> = [HouseholdId(1), HouseholdId(2)].into_iter().collect();

        let (kept, orphaned) = result.split_unknown(&known);

        assert_eq!(kept.len(), 1);
        assert_eq!(kept.get(HouseholdId(1)), dec!(34.5));
        assert_eq!(
            orphaned,
            vec![OrphanedHousehold {
                household_id: HouseholdId(7),
                persons: 2,
                employer_tax: dec!(103.5),
            }]
        );
    }

    #[test]
    fn iter_yields_households_in_ascending_order() {
        let config = EmployerContributionConfig::default();
        let result = PersonAggregator::new(&config)
            .aggregate(&[person(3, dec!(1000)), person(1, dec!(2000))])
            .expect("aggregation should succeed");

        let ids: Vec<HouseholdId> = result.iter().map(|(id, _)| id).collect();

        assert_eq!(ids, vec![HouseholdId(1), HouseholdId(3)]);
    }
}
