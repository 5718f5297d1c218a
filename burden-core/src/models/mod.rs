mod fiscal_config;
mod household;
mod tax_bracket;
mod tax_credit;

pub use fiscal_config::{BurdenConfig, EmployerContributionConfig, FiscalConfig, ForeignKeyPolicy};
pub use household::{HouseholdId, HouseholdRecord, PersonRecord};
pub use tax_bracket::{TaxBracket, TaxBracketSchedule};
pub use tax_credit::{ContributionCap, TaxCreditPolicy};
