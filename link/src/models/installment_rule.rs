use serde::{Deserialize, Serialize};

use super::status::Status;
use crate::request::{FormPayload, IntoFormPayload};

/// Installment/pricing rule for treatment packages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallmentRule {
    pub id: i64,
    pub title: String,
    /// Lower bound of the bill amount the rule applies to
    pub min_amount: f64,
    /// Upper bound; `None` means unbounded
    #[serde(default)]
    pub max_amount: Option<f64>,
    /// Number of monthly installments
    pub months: u32,
    /// Percentage added on top of the bill
    #[serde(default)]
    pub interest_rate: f64,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl InstallmentRule {
    pub fn applies_to(&self, amount: f64) -> bool {
        amount >= self.min_amount && self.max_amount.map_or(true, |max| amount <= max)
    }

    /// Monthly payment for `amount` under this rule.
    pub fn monthly_payment(&self, amount: f64) -> f64 {
        if self.months == 0 {
            return amount;
        }
        amount * (1.0 + self.interest_rate / 100.0) / f64::from(self.months)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstallmentRuleInput {
    pub title: Option<String>,
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
    pub months: Option<u32>,
    pub interest_rate: Option<f64>,
    pub status: Option<Status>,
}

impl IntoFormPayload for InstallmentRuleInput {
    fn into_form_payload(&self) -> FormPayload {
        FormPayload::new()
            .optional_text("title", self.title.as_deref())
            .optional_value("min_amount", self.min_amount)
            .optional_value("max_amount", self.max_amount)
            .optional_value("months", self.months)
            .optional_value("interest_rate", self.interest_rate)
            .optional_text("status", self.status.map(|s| s.as_str()))
    }
}
