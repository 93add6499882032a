use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A lender listed by the catalog.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Provider {
    pub id: String,
    pub name: String,
}

impl Provider {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A loan product offered by exactly one provider.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub provider_id: String,
    pub name: String,
    pub min_amount: Decimal,
    pub max_amount: Decimal,
    /// Multiplier applied to the principal at origination, e.g. `0.08`.
    pub interest_rate: Decimal,
}

impl Product {
    /// Bounds are inclusive on both ends.
    pub fn accepts(&self, amount: Decimal) -> bool {
        amount >= self.min_amount && amount <= self.max_amount
    }

    pub fn interest_for(&self, principal: Decimal) -> Decimal {
        principal * self.interest_rate
    }
}
