use crate::error::UssdError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Sub, SubAssign};

/// Represents the money held on a customer's wallet.
///
/// This is a wrapper around `rust_decimal::Decimal` to keep wallet arithmetic
/// apart from loan bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Balance(pub Decimal);

/// Represents a positive monetary amount moved by a loan or a repayment.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, UssdError> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(UssdError::ValidationError(
                "Amount must be positive".to_string(),
            ))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl From<Amount> for Balance {
    fn from(amount: Amount) -> Self {
        Self(amount.0)
    }
}

impl Balance {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Add for Balance {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Balance {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl AddAssign for Balance {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Balance {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
pub enum LoanStatus {
    Active,
    #[serde(rename = "Paid Off")]
    PaidOff,
}

/// A loan taken by a customer from one of the catalog providers.
///
/// The outstanding amount is always derived from principal, interest and
/// repaid; it is never stored.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Loan {
    pub id: String,
    pub provider_name: String,
    pub product_name: String,
    pub principal: Decimal,
    pub interest: Decimal,
    pub repaid: Decimal,
    pub status: LoanStatus,
    pub originated_on: NaiveDate,
}

impl Loan {
    pub fn new(
        provider_name: impl Into<String>,
        product_name: impl Into<String>,
        principal: Amount,
        interest: Decimal,
        originated_on: NaiveDate,
    ) -> Self {
        Self {
            id: format!("loan-{}", uuid::Uuid::new_v4()),
            provider_name: provider_name.into(),
            product_name: product_name.into(),
            principal: principal.value(),
            interest,
            repaid: Decimal::ZERO,
            status: LoanStatus::Active,
            originated_on,
        }
    }

    /// Principal plus interest minus everything repaid so far.
    pub fn outstanding(&self) -> Decimal {
        self.principal + self.interest - self.repaid
    }

    pub fn is_active(&self) -> bool {
        self.status == LoanStatus::Active
    }

    /// Active with something left to pay.
    pub fn is_repayable(&self) -> bool {
        self.is_active() && self.outstanding() > Decimal::ZERO
    }

    /// Books a repayment. Once the loan is paid off it stays paid off.
    pub fn apply_repayment(&mut self, amount: Amount) {
        self.repaid += amount.value();
        if self.outstanding() <= Decimal::ZERO {
            self.status = LoanStatus::PaidOff;
        }
    }
}

/// A registered customer as seen by the account directory.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Account {
    /// Normalized phone number.
    pub account_id: String,
    pub pin: String,
    pub national_id: String,
    pub verified: bool,
    pub balance: Balance,
    pub loans: Vec<Loan>,
    /// Human readable ledger, oldest first.
    pub transactions: Vec<String>,
}

impl Account {
    pub fn new(account_id: impl Into<String>, pin: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            pin: pin.into(),
            national_id: String::new(),
            verified: true,
            balance: Balance::ZERO,
            loans: Vec::new(),
            transactions: Vec::new(),
        }
    }

    /// Books a new loan, credits the principal to the wallet and records it.
    pub fn originate_loan(
        &mut self,
        provider_name: &str,
        product_name: &str,
        principal: Amount,
        interest: Decimal,
        originated_on: NaiveDate,
    ) -> Loan {
        let loan = Loan::new(
            provider_name,
            product_name,
            principal,
            interest,
            originated_on,
        );
        self.balance += Balance::from(principal);
        self.transactions.push(format!(
            "Loan of {:.2} from {}",
            principal.value(),
            provider_name
        ));
        self.loans.push(loan.clone());
        loan
    }

    /// Applies a repayment to the given loan. Returns `false` if the loan is unknown.
    pub fn repay(&mut self, loan_id: &str, amount: Amount) -> bool {
        let Some(loan) = self.loans.iter_mut().find(|l| l.id == loan_id) else {
            return false;
        };
        loan.apply_repayment(amount);
        let provider_name = loan.provider_name.clone();
        self.balance -= Balance::from(amount);
        self.transactions.push(format!(
            "Repayment of {:.2} to {}",
            amount.value(),
            provider_name
        ));
        true
    }
}
