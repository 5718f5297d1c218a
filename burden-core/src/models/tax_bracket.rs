use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A single progressive bracket: income above `lower_bound` is taxed at `rate`
/// until the next bracket's lower bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub lower_bound: Decimal,
    pub rate: Decimal,
}

impl TaxBracket {
    pub fn new(
        lower_bound: Decimal,
        rate: Decimal,
    ) -> Self {
        Self { lower_bound, rate }
    }
}

/// An ordered progressive bracket schedule.
///
/// Lower bounds are non-negative and strictly increasing; rates lie in
/// `[0, 1]`. The top bracket has no explicit upper bound.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<TaxBracket>", into = "Vec<TaxBracket>")]
pub struct TaxBracketSchedule {
    brackets: Vec<TaxBracket>,
}

impl TaxBracketSchedule {
    /// Builds a schedule, rejecting unordered bounds and out-of-range rates.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use burden_core::{TaxBracket, TaxBracketSchedule};
    ///
    /// let schedule = TaxBracketSchedule::new(vec![
    ///     TaxBracket::new(dec!(0), dec!(0.0345)),
    ///     TaxBracket::new(dec!(5944), dec!(0.075)),
    /// ])
    /// .unwrap();
    ///
    /// assert_eq!(schedule.len(), 2);
    /// ```
    pub fn new(brackets: Vec<TaxBracket>) -> Result<Self, ConfigError> {
        let mut previous: Option<Decimal> = None;
        for (position, bracket) in brackets.iter().enumerate() {
            let out_of_order = match previous {
                Some(bound) => bracket.lower_bound <= bound,
                None => bracket.lower_bound < Decimal::ZERO,
            };
            if out_of_order {
                return Err(ConfigError::UnorderedBracket {
                    position,
                    bound: bracket.lower_bound,
                });
            }
            if bracket.rate < Decimal::ZERO || bracket.rate > Decimal::ONE {
                return Err(ConfigError::InvalidBracketRate(bracket.rate));
            }
            previous = Some(bracket.lower_bound);
        }

        Ok(Self { brackets })
    }

    /// For built-in schedules whose ordering is covered by tests.
    pub(crate) fn new_unchecked(brackets: Vec<TaxBracket>) -> Self {
        Self { brackets }
    }

    pub fn brackets(&self) -> &[TaxBracket] {
        &self.brackets
    }

    pub fn len(&self) -> usize {
        self.brackets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.brackets.is_empty()
    }
}

impl TryFrom<Vec<TaxBracket>> for TaxBracketSchedule {
    type Error = ConfigError;

    fn try_from(brackets: Vec<TaxBracket>) -> Result<Self, Self::Error> {
        Self::new(brackets)
    }
}

impl From<TaxBracketSchedule> for Vec<TaxBracket> {
    fn from(schedule: TaxBracketSchedule) -> Self {
        schedule.brackets
    }
}
