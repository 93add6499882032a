use crate::domain::account::{Account, Amount, Balance, Loan, LoanStatus};
use crate::domain::catalog::{Product, Provider};
use crate::domain::ports::{AccountDirectory, AccountStanding, CatalogProvider, SessionStore};
use crate::domain::session::{Session, SessionPolicy};
use crate::error::{Result, UssdError};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// A thread-safe in-memory store for USSD sessions.
///
/// Uses `Arc<RwLock<HashMap<String, Session>>>` so clones share the same map.
/// Sessions idle for longer than the policy's timeout are dropped on read.
#[derive(Clone)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
    policy: SessionPolicy,
}

impl InMemorySessionStore {
    /// Creates a new, empty in-memory session store.
    pub fn new(policy: SessionPolicy) -> Self {
        Self {
            sessions: Arc::default(),
            policy,
        }
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(&self, session_id: &str, account_id: &str) -> Result<Session> {
        let session = Session::new(account_id, self.policy.first_screen());
        let mut sessions = self.sessions.write().await;
        sessions.insert(session_id.to_string(), session.clone());
        debug!(session_id, "Session created");
        Ok(session)
    }

    async fn get(&self, session_id: &str) -> Result<Option<Session>> {
        let mut sessions = self.sessions.write().await;
        let expired = sessions
            .get(session_id)
            .is_some_and(|s| s.is_expired(Utc::now(), self.policy.idle_timeout));
        if expired {
            sessions.remove(session_id);
            info!(session_id, "Session expired");
            return Ok(None);
        }
        Ok(sessions.get(session_id).cloned())
    }

    async fn update(&self, session_id: &str, session: Session) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        sessions.insert(session_id.to_string(), session);
        Ok(())
    }

    async fn delete(&self, session_id: &str) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        sessions.remove(session_id);
        Ok(())
    }
}

/// A thread-safe in-memory account directory.
///
/// Loans, balances and the ledger all live on the `Account` record, so every
/// mutation happens under a single write lock.
#[derive(Default, Clone)]
pub struct InMemoryAccountDirectory {
    accounts: Arc<RwLock<HashMap<String, Account>>>,
}

impl InMemoryAccountDirectory {
    /// Creates a new, empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_accounts(accounts: impl IntoIterator<Item = Account>) -> Self {
        let accounts = accounts
            .into_iter()
            .map(|a| (a.account_id.clone(), a))
            .collect();
        Self {
            accounts: Arc::new(RwLock::new(accounts)),
        }
    }

    /// Directory seeded with the demo customers.
    pub fn demo() -> Self {
        Self::with_accounts(demo_accounts())
    }
}

fn unknown_account(account_id: &str) -> UssdError {
    UssdError::DirectoryError(format!("unknown account {account_id}"))
}

#[async_trait]
impl AccountDirectory for InMemoryAccountDirectory {
    async fn standing(&self, account_id: &str) -> Result<AccountStanding> {
        let accounts = self.accounts.read().await;
        Ok(match accounts.get(account_id) {
            None => AccountStanding::Unregistered,
            Some(account) if !account.verified => AccountStanding::Unverified,
            Some(_) => AccountStanding::Verified,
        })
    }

    async fn get_pin(&self, account_id: &str) -> Result<Option<String>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.get(account_id).map(|a| a.pin.clone()))
    }

    async fn set_pin(&self, account_id: &str, pin: &str) -> Result<()> {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .get_mut(account_id)
            .ok_or_else(|| unknown_account(account_id))?;
        account.pin = pin.to_string();
        Ok(())
    }

    async fn get_loans(&self, account_id: &str) -> Result<Vec<Loan>> {
        let accounts = self.accounts.read().await;
        Ok(accounts
            .get(account_id)
            .map(|a| a.loans.clone())
            .unwrap_or_default())
    }

    async fn get_balance(&self, account_id: &str) -> Result<Balance> {
        let accounts = self.accounts.read().await;
        Ok(accounts
            .get(account_id)
            .map(|a| a.balance)
            .unwrap_or_default())
    }

    async fn add_loan(
        &self,
        account_id: &str,
        provider_name: &str,
        product_name: &str,
        amount: Amount,
        interest: Decimal,
    ) -> Result<Loan> {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .get_mut(account_id)
            .ok_or_else(|| unknown_account(account_id))?;
        Ok(account.originate_loan(
            provider_name,
            product_name,
            amount,
            interest,
            Utc::now().date_naive(),
        ))
    }

    async fn repay_loan(&self, account_id: &str, loan_id: &str, amount: Amount) -> Result<bool> {
        let mut accounts = self.accounts.write().await;
        Ok(accounts
            .get_mut(account_id)
            .is_some_and(|account| account.repay(loan_id, amount)))
    }

    async fn get_transactions(&self, account_id: &str) -> Result<Vec<String>> {
        let accounts = self.accounts.read().await;
        Ok(accounts
            .get(account_id)
            .map(|a| a.transactions.clone())
            .unwrap_or_default())
    }
}

/// A fixed catalog held in memory.
#[derive(Debug, Default, Clone)]
pub struct StaticCatalog {
    providers: Vec<Provider>,
    products: Vec<Product>,
}

impl StaticCatalog {
    pub fn new(providers: Vec<Provider>, products: Vec<Product>) -> Self {
        Self {
            providers,
            products,
        }
    }

    /// Four banks and their products.
    pub fn demo() -> Self {
        let product = |id: &str, provider_id: &str, name: &str, min, max, rate| Product {
            id: id.to_string(),
            provider_id: provider_id.to_string(),
            name: name.to_string(),
            min_amount: min,
            max_amount: max,
            interest_rate: rate,
        };
        Self::new(
            vec![
                Provider::new("nib", "NIB Bank"),
                Provider::new("dashen", "Dashen Bank"),
                Provider::new("cbe", "CBE"),
                Provider::new("awash", "Awash Bank"),
            ],
            vec![
                product("nib-personal", "nib", "Personal Loan", dec!(1000), dec!(5000), dec!(0.1)),
                product("nib-business", "nib", "Business Starter", dec!(5000), dec!(20000), dec!(0.08)),
                product("dashen-student", "dashen", "Student Loan", dec!(500), dec!(2500), dec!(0.05)),
                product("dashen-emergency", "dashen", "Emergency Fund", dec!(200), dec!(1000), dec!(0.12)),
                product("cbe-salary", "cbe", "Salary Advance", dec!(1500), dec!(10000), dec!(0.09)),
                product("awash-agri", "awash", "Agri-Loan", dec!(2000), dec!(15000), dec!(0.07)),
            ],
        )
    }
}

#[async_trait]
impl CatalogProvider for StaticCatalog {
    async fn list_providers(&self) -> Result<Vec<Provider>> {
        Ok(self.providers.clone())
    }

    async fn list_products(&self, provider_id: &str) -> Result<Vec<Product>> {
        Ok(self
            .products
            .iter()
            .filter(|p| p.provider_id == provider_id)
            .cloned()
            .collect())
    }
}

fn seeded_loan(
    id: &str,
    provider_name: &str,
    product_name: &str,
    amounts: (Decimal, Decimal, Decimal),
    status: LoanStatus,
    originated_on: (i32, u32, u32),
) -> Loan {
    let (principal, interest, repaid) = amounts;
    let (y, m, d) = originated_on;
    Loan {
        id: id.to_string(),
        provider_name: provider_name.to_string(),
        product_name: product_name.to_string(),
        principal,
        interest,
        repaid,
        status,
        originated_on: NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default(),
    }
}

fn demo_accounts() -> Vec<Account> {
    let mut first = Account::new("+251900000001", "1234");
    first.national_id = "12345678".to_string();
    first.balance = Balance::new(dec!(5000.00));
    first.loans = vec![seeded_loan(
        "loan1",
        "Dashen Bank",
        "Emergency Fund",
        (dec!(500), dec!(60), dec!(100)),
        LoanStatus::Active,
        (2023, 10, 15),
    )];
    first.transactions = vec!["Repayment of 100.00 to Dashen Bank".to_string()];

    let mut second = Account::new("+251900000002", "5678");
    second.national_id = "87654321".to_string();
    second.balance = Balance::new(dec!(12500.75));
    second.loans = vec![
        seeded_loan(
            "loan2",
            "NIB Bank",
            "Business Starter",
            (dec!(10000), dec!(800), dec!(2000)),
            LoanStatus::Active,
            (2023, 11, 1),
        ),
        seeded_loan(
            "loan3",
            "Dashen Bank",
            "Student Loan",
            (dec!(2000), dec!(100), dec!(2100)),
            LoanStatus::PaidOff,
            (2023, 9, 20),
        ),
    ];
    second.transactions = vec![
        "Loan of 10000.00 from NIB Bank".to_string(),
        "Repayment of 2000.00 to NIB Bank".to_string(),
    ];

    let mut third = Account::new("+251900000003", "4321");
    third.national_id = "11223344".to_string();
    third.balance = Balance::new(dec!(800.50));

    let mut unverified = Account::new("+251900000004", "1111");
    unverified.national_id = "44332211".to_string();
    unverified.verified = false;

    vec![first, second, third, unverified]
}
