use super::account::{Amount, Balance, Loan};
use super::catalog::{Product, Provider};
use super::session::Session;
use crate::error::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;

/// Whether an account id may use the service at all.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum AccountStanding {
    Unregistered,
    Unverified,
    Verified,
}

/// The record store for customers, keyed by normalized account id.
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    async fn standing(&self, account_id: &str) -> Result<AccountStanding>;
    async fn get_pin(&self, account_id: &str) -> Result<Option<String>>;
    async fn set_pin(&self, account_id: &str, pin: &str) -> Result<()>;
    async fn get_loans(&self, account_id: &str) -> Result<Vec<Loan>>;
    async fn get_balance(&self, account_id: &str) -> Result<Balance>;
    async fn add_loan(
        &self,
        account_id: &str,
        provider_name: &str,
        product_name: &str,
        amount: Amount,
        interest: Decimal,
    ) -> Result<Loan>;
    async fn repay_loan(&self, account_id: &str, loan_id: &str, amount: Amount) -> Result<bool>;
    async fn get_transactions(&self, account_id: &str) -> Result<Vec<String>>;
}

/// Lists loan providers and their products, possibly from a remote service.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    async fn list_providers(&self) -> Result<Vec<Provider>>;
    async fn list_products(&self, provider_id: &str) -> Result<Vec<Product>>;
}

/// Holds one session record per session id.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn create(&self, session_id: &str, account_id: &str) -> Result<Session>;
    async fn get(&self, session_id: &str) -> Result<Option<Session>>;
    async fn update(&self, session_id: &str, session: Session) -> Result<()>;
    async fn delete(&self, session_id: &str) -> Result<()>;
}

pub type AccountDirectoryBox = Box<dyn AccountDirectory>;
pub type CatalogProviderBox = Box<dyn CatalogProvider>;
pub type SessionStoreBox = Box<dyn SessionStore>;
