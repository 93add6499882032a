//! The session state machine.
//!
//! [`SessionMachine::step`] consumes one user input against the current
//! session and yields an [`Outcome`]: either the next session value plus an
//! optional notice, or a terminal message. Nothing is persisted here; the
//! engine commits the outcome once the step has completed.

use super::locale::{INVALID_LANGUAGE_CHOICE, Strings};
use super::render::has_next_page;
use crate::domain::account::{Amount, Loan};
use crate::domain::catalog::Provider;
use crate::domain::ports::{AccountDirectory, AccountStanding, CatalogProvider};
use crate::domain::session::{Language, ProductSelection, Screen, Session};
use crate::error::Result;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

/// Upstream menus offer the loan service as option `3`; with a handoff it
/// opens the loan application.
pub const HANDOFF_LOAN_SHORTCUT: &str = "3";

/// Credentials and language forwarded by an upstream system.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Handoff {
    pub pin: Option<String>,
    pub language: Option<Language>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The dialog continues on `session.screen`.
    Continue {
        session: Session,
        notice: Option<String>,
    },
    /// The dialog is over; the session must be deleted.
    End { message: String },
}

impl Outcome {
    fn next(session: Session) -> Self {
        Outcome::Continue {
            session,
            notice: None,
        }
    }

    fn notify(session: Session, notice: impl Into<String>) -> Self {
        Outcome::Continue {
            session,
            notice: Some(notice.into()),
        }
    }

    fn end(message: impl Into<String>) -> Self {
        Outcome::End {
            message: message.into(),
        }
    }

    fn home(session: &Session, notice: impl Into<String>) -> Self {
        let mut next = session.clone();
        next.go_home();
        Outcome::notify(next, notice)
    }

    /// Puts `leading` in front of whatever notice the outcome already has.
    fn after(self, leading: Option<String>) -> Self {
        match (self, leading) {
            (
                Outcome::Continue {
                    session,
                    notice: Some(notice),
                },
                Some(leading),
            ) => Outcome::notify(session, format!("{leading}\n{notice}")),
            (
                Outcome::Continue {
                    session,
                    notice: None,
                },
                Some(leading),
            ) => Outcome::notify(session, leading),
            (outcome, _) => outcome,
        }
    }
}

/// The last `*`-separated segment of the accumulated USSD text.
pub fn last_input(text: &str) -> &str {
    text.rsplit('*').next().unwrap_or_default().trim()
}

pub fn is_pin_format(input: &str) -> bool {
    input.len() == 4 && input.bytes().all(|b| b.is_ascii_digit())
}

/// 1-based menu choice into a zero-based index.
fn parse_choice(input: &str, len: usize) -> Option<usize> {
    input
        .parse::<usize>()
        .ok()
        .filter(|n| (1..=len).contains(n))
        .map(|n| n - 1)
}

fn parse_amount(input: &str) -> Option<Decimal> {
    input.parse::<Decimal>().ok()
}

fn moved(session: &Session, screen: Screen) -> Session {
    let mut next = session.clone();
    next.screen = screen;
    next
}

pub struct SessionMachine<'a> {
    accounts: &'a dyn AccountDirectory,
    catalog: &'a dyn CatalogProvider,
}

impl<'a> SessionMachine<'a> {
    pub fn new(accounts: &'a dyn AccountDirectory, catalog: &'a dyn CatalogProvider) -> Self {
        Self { accounts, catalog }
    }

    /// Runs one request against `session`.
    ///
    /// Collaborator failures inside a screen handler become a generic error
    /// and a return home. Failures before that point are returned as `Err`.
    pub async fn step(&self, mut session: Session, input: &str, handoff: &Handoff) -> Result<Outcome> {
        let mut login_notice = None;

        if let Some(pin) = handoff.pin.as_deref()
            && !session.authenticated
        {
            let t = Strings::new(session.language);
            match self.accounts.get_pin(&session.account_id).await? {
                Some(stored) if stored == pin => {
                    info!(account = %session.account_id, "Authenticated via handoff");
                    session.authenticate();
                    login_notice = Some(t.login_success().to_string());
                }
                _ => {
                    warn!(account = %session.account_id, "Handoff PIN rejected");
                    return Ok(Outcome::end(t.handoff_failed()));
                }
            }
        }

        if session.screen == Screen::LanguageSelect {
            match handoff.language {
                Some(language) => {
                    session.language = language;
                    session.screen = Screen::Pin;
                }
                None => return Ok(select_language(session, input)),
            }
        }

        let t = Strings::new(session.language);
        match self.accounts.standing(&session.account_id).await? {
            AccountStanding::Unregistered => {
                info!(account = %session.account_id, "Account not registered");
                return Ok(Outcome::end(t.not_registered()));
            }
            AccountStanding::Unverified => {
                info!(account = %session.account_id, "Account not verified");
                return Ok(Outcome::end(t.not_verified()));
            }
            AccountStanding::Verified => {}
        }

        if !session.authenticated {
            return self.enter_pin(session, input).await;
        }

        if session.screen.has_global_navigation() {
            match input {
                "0" => {
                    debug!(from = session.screen.name(), "Navigating home");
                    session.go_home();
                    return Ok(Outcome::next(session));
                }
                "99" => {
                    let from = session.screen.name();
                    session.go_back();
                    debug!(from, to = session.screen.name(), "Navigating back");
                    return Ok(Outcome::next(session));
                }
                _ => {}
            }
        }

        let handoff_login = login_notice.is_some();
        let outcome = match self.dispatch(&session, input, handoff, handoff_login).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(screen = session.screen.name(), error = %e, "Screen handler failed");
                Outcome::home(&session, t.generic_error())
            }
        };
        Ok(outcome.after(login_notice))
    }

    async fn enter_pin(&self, mut session: Session, input: &str) -> Result<Outcome> {
        let t = Strings::new(session.language);
        if input.is_empty() {
            return Ok(Outcome::next(session));
        }
        if !is_pin_format(input) {
            return Ok(Outcome::notify(session, t.invalid_pin_format()));
        }

        let stored = self.accounts.get_pin(&session.account_id).await?;
        if stored.as_deref() == Some(input) {
            info!(account = %session.account_id, "PIN accepted");
            session.authenticate();
            return Ok(Outcome::notify(session, t.login_success()));
        }

        let attempts = session.record_failed_pin();
        if session.is_locked_out() {
            warn!(account = %session.account_id, attempts, "PIN attempts exhausted");
            Ok(Outcome::end(t.too_many_pin_attempts()))
        } else {
            info!(account = %session.account_id, attempts, "Incorrect PIN");
            Ok(Outcome::notify(session, t.incorrect_pin(attempts)))
        }
    }

    async fn dispatch(
        &self,
        session: &Session,
        input: &str,
        handoff: &Handoff,
        handoff_login: bool,
    ) -> Result<Outcome> {
        match &session.screen {
            Screen::Home => self.home(session, input, handoff, handoff_login).await,
            Screen::ChooseProvider { providers } => {
                self.choose_provider(session, providers, input).await
            }
            Screen::ChooseProduct(selection) => {
                self.choose_product(session, selection, input).await
            }
            Screen::ApplyLoanAmount {
                selection,
                product_id,
            } => Ok(enter_loan_amount(session, selection, product_id, input)),
            Screen::ApplyLoanConfirm {
                selection,
                product_id,
                amount,
            } => {
                self.confirm_loan(session, selection, product_id, *amount, input)
                    .await
            }
            Screen::LoanStatus { page } => self.loan_status(session, *page, input).await,
            Screen::RepaySelectLoan { loans } => Ok(select_repay_loan(session, loans, input)),
            Screen::RepayEnterAmount { loans, loan_id } => {
                self.repay(session, loans, loan_id, input).await
            }
            Screen::ChangePin => self.change_pin(session, input).await,
            Screen::LoanHistory | Screen::LanguageSelect | Screen::Pin => {
                Ok(Outcome::next(session.clone()))
            }
        }
    }

    async fn has_active_loan(&self, account_id: &str) -> Result<bool> {
        let loans = self.accounts.get_loans(account_id).await?;
        Ok(loans.iter().any(Loan::is_active))
    }

    async fn home(
        &self,
        session: &Session,
        input: &str,
        handoff: &Handoff,
        handoff_login: bool,
    ) -> Result<Outcome> {
        let t = Strings::new(session.language);
        let account_id = session.account_id.as_str();
        let choice = if handoff.pin.is_some() && input == HANDOFF_LOAN_SHORTCUT {
            "1"
        } else {
            input
        };

        let outcome = match choice {
            "1" => {
                let providers = self.catalog.list_providers().await?;
                if self.has_active_loan(account_id).await? {
                    info!(account = %account_id, "Loan application refused, active loan exists");
                    Outcome::end(t.has_active_loan())
                } else {
                    Outcome::next(moved(session, Screen::ChooseProvider { providers }))
                }
            }
            "2" => Outcome::next(moved(session, Screen::LoanStatus { page: 0 })),
            "3" => {
                let loans: Vec<Loan> = self
                    .accounts
                    .get_loans(account_id)
                    .await?
                    .into_iter()
                    .filter(Loan::is_repayable)
                    .collect();
                Outcome::next(moved(session, Screen::RepaySelectLoan { loans }))
            }
            "4" => {
                let balance = self.accounts.get_balance(account_id).await?;
                Outcome::end(t.balance(balance.0))
            }
            "5" => Outcome::next(moved(session, Screen::LoanHistory)),
            "6" => Outcome::next(moved(session, Screen::ChangePin)),
            "0" => Outcome::end(t.exit_message()),
            _ if handoff_login => Outcome::next(session.clone()),
            _ => Outcome::notify(session.clone(), t.invalid_choice()),
        };
        Ok(outcome)
    }

    async fn choose_provider(
        &self,
        session: &Session,
        providers: &[Provider],
        input: &str,
    ) -> Result<Outcome> {
        let t = Strings::new(session.language);
        let Some(index) = parse_choice(input, providers.len()) else {
            return Ok(Outcome::notify(session.clone(), t.invalid_choice()));
        };

        let provider = &providers[index];
        let products = self.catalog.list_products(&provider.id).await?;
        debug!(provider = %provider.name, products = products.len(), "Provider chosen");
        Ok(Outcome::next(moved(
            session,
            Screen::ChooseProduct(ProductSelection {
                providers: providers.to_vec(),
                provider_id: provider.id.clone(),
                products,
                page: 0,
            }),
        )))
    }

    async fn choose_product(
        &self,
        session: &Session,
        selection: &ProductSelection,
        input: &str,
    ) -> Result<Outcome> {
        let t = Strings::new(session.language);
        let page = selection.page;
        match input {
            "7" => {
                let mut selection = selection.clone();
                selection.page = page.saturating_sub(1);
                return Ok(Outcome::next(moved(session, Screen::ChooseProduct(selection))));
            }
            "8" => {
                let mut selection = selection.clone();
                if has_next_page(page, selection.products.len()) {
                    selection.page = page + 1;
                }
                return Ok(Outcome::next(moved(session, Screen::ChooseProduct(selection))));
            }
            _ => {}
        }

        let Some(index) = parse_choice(input, selection.products.len()) else {
            return Ok(Outcome::notify(session.clone(), t.invalid_choice()));
        };
        if self.has_active_loan(&session.account_id).await? {
            info!(account = %session.account_id, "Loan application refused, active loan exists");
            return Ok(Outcome::end(t.has_active_loan()));
        }

        let product = &selection.products[index];
        debug!(product = %product.name, "Product chosen");
        Ok(Outcome::next(moved(
            session,
            Screen::ApplyLoanAmount {
                selection: selection.clone(),
                product_id: product.id.clone(),
            },
        )))
    }

    async fn confirm_loan(
        &self,
        session: &Session,
        selection: &ProductSelection,
        product_id: &str,
        amount: Decimal,
        input: &str,
    ) -> Result<Outcome> {
        let t = Strings::new(session.language);
        match input {
            "1" => {
                let (Some(provider), Some(product)) =
                    (selection.provider(), selection.product(product_id))
                else {
                    warn!("Loan confirmation without a resolvable provider or product");
                    return Ok(Outcome::home(session, t.generic_error()));
                };
                let principal = Amount::new(amount)?;
                let loan = self
                    .accounts
                    .add_loan(
                        &session.account_id,
                        &provider.name,
                        &product.name,
                        principal,
                        product.interest_for(amount),
                    )
                    .await?;
                info!(account = %session.account_id, loan = %loan.id, %amount, "Loan granted");
                Ok(Outcome::end(t.loan_success(amount, &product.name)))
            }
            "2" => Ok(Outcome::home(session, t.loan_cancelled())),
            _ => Ok(Outcome::notify(session.clone(), t.invalid_choice())),
        }
    }

    async fn loan_status(&self, session: &Session, page: usize, input: &str) -> Result<Outcome> {
        if input != "9" {
            return Ok(Outcome::next(session.clone()));
        }
        let loans = self.accounts.get_loans(&session.account_id).await?;
        let page = if has_next_page(page, loans.len()) {
            page + 1
        } else {
            page
        };
        Ok(Outcome::next(moved(session, Screen::LoanStatus { page })))
    }

    async fn repay(
        &self,
        session: &Session,
        loans: &[Loan],
        loan_id: &str,
        input: &str,
    ) -> Result<Outcome> {
        let t = Strings::new(session.language);
        let Some(loan) = loans.iter().find(|l| l.id == loan_id) else {
            return Ok(Outcome::home(session, t.loan_not_found()));
        };

        let outstanding = loan.outstanding();
        let Some(amount) = parse_amount(input)
            .filter(|a| *a > Decimal::ZERO && *a <= outstanding)
        else {
            return Ok(Outcome::notify(
                session.clone(),
                t.invalid_repayment(outstanding),
            ));
        };

        let repaid = self
            .accounts
            .repay_loan(&session.account_id, loan_id, Amount::new(amount)?)
            .await?;
        if repaid {
            info!(account = %session.account_id, loan = %loan_id, %amount, "Repayment applied");
            Ok(Outcome::end(t.repayment_success(amount)))
        } else {
            warn!(account = %session.account_id, loan = %loan_id, "Repayment target vanished");
            Ok(Outcome::home(session, t.loan_not_found()))
        }
    }

    async fn change_pin(&self, session: &Session, input: &str) -> Result<Outcome> {
        let t = Strings::new(session.language);
        if !is_pin_format(input) {
            return Ok(Outcome::notify(session.clone(), t.invalid_pin_format()));
        }
        self.accounts.set_pin(&session.account_id, input).await?;
        info!(account = %session.account_id, "PIN changed");
        Ok(Outcome::end(t.pin_changed()))
    }
}

fn select_language(mut session: Session, input: &str) -> Outcome {
    let language = match input {
        "1" => Language::En,
        "2" => Language::Am,
        "" => return Outcome::next(session),
        _ => return Outcome::notify(session, INVALID_LANGUAGE_CHOICE),
    };
    session.language = language;
    session.screen = Screen::Pin;
    Outcome::next(session)
}

fn enter_loan_amount(
    session: &Session,
    selection: &ProductSelection,
    product_id: &str,
    input: &str,
) -> Outcome {
    let t = Strings::new(session.language);
    let Some(product) = selection.product(product_id) else {
        return Outcome::home(session, t.product_not_found());
    };

    match parse_amount(input).filter(|a| product.accepts(*a)) {
        Some(amount) => Outcome::next(moved(
            session,
            Screen::ApplyLoanConfirm {
                selection: selection.clone(),
                product_id: product_id.to_string(),
                amount,
            },
        )),
        None => Outcome::notify(
            session.clone(),
            t.invalid_amount(product.min_amount, product.max_amount),
        ),
    }
}

fn select_repay_loan(session: &Session, loans: &[Loan], input: &str) -> Outcome {
    let t = Strings::new(session.language);
    match parse_choice(input, loans.len()) {
        Some(index) => Outcome::next(moved(
            session,
            Screen::RepayEnterAmount {
                loans: loans.to_vec(),
                loan_id: loans[index].id.clone(),
            },
        )),
        None => Outcome::notify(session.clone(), t.invalid_choice()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::Account;
    use crate::domain::catalog::Product;
    use crate::domain::session::MAX_PIN_ATTEMPTS;
    use crate::infrastructure::in_memory::{InMemoryAccountDirectory, StaticCatalog};
    use rust_decimal_macros::dec;

    const PHONE: &str = "+251900000003";

    fn directory() -> InMemoryAccountDirectory {
        InMemoryAccountDirectory::with_accounts([Account::new(PHONE, "1234")])
    }

    fn home_session() -> Session {
        let mut session = Session::new(PHONE, Screen::Pin);
        session.authenticate();
        session
    }

    async fn step(
        directory: &InMemoryAccountDirectory,
        session: Session,
        input: &str,
    ) -> Outcome {
        let catalog = StaticCatalog::demo();
        SessionMachine::new(directory, &catalog)
            .step(session, input, &Handoff::default())
            .await
            .unwrap()
    }

    fn continued(outcome: Outcome) -> (Session, Option<String>) {
        match outcome {
            Outcome::Continue { session, notice } => (session, notice),
            Outcome::End { message } => panic!("unexpected end: {message}"),
        }
    }

    #[test]
    fn test_last_input() {
        assert_eq!(last_input(""), "");
        assert_eq!(last_input("1"), "1");
        assert_eq!(last_input("1*1234*2"), "2");
        assert_eq!(last_input("1*1234* 99 "), "99");
        assert_eq!(last_input("1*"), "");
    }

    #[test]
    fn test_pin_format() {
        assert!(is_pin_format("0000"));
        assert!(!is_pin_format("123"));
        assert!(!is_pin_format("12345"));
        assert!(!is_pin_format("12a4"));
    }

    #[tokio::test]
    async fn test_language_selection() {
        let directory = directory();
        let session = Session::new(PHONE, Screen::LanguageSelect);

        let (same, notice) = continued(step(&directory, session.clone(), "").await);
        assert_eq!(same.screen, Screen::LanguageSelect);
        assert!(notice.is_none());

        let (same, notice) = continued(step(&directory, session.clone(), "3").await);
        assert_eq!(same.screen, Screen::LanguageSelect);
        assert_eq!(notice.as_deref(), Some(INVALID_LANGUAGE_CHOICE));

        let (next, _) = continued(step(&directory, session, "2").await);
        assert_eq!(next.screen, Screen::Pin);
        assert_eq!(next.language, Language::Am);
    }

    #[tokio::test]
    async fn test_malformed_pin_keeps_attempts() {
        let directory = directory();
        let session = Session::new(PHONE, Screen::Pin);
        let (next, notice) = continued(step(&directory, session, "12").await);
        assert_eq!(next.pin_attempts, 0);
        assert_eq!(notice.as_deref(), Some("Invalid PIN format. Please enter 4 digits."));
    }

    #[tokio::test]
    async fn test_pin_attempts_lead_to_lockout() {
        let directory = directory();
        let mut session = Session::new(PHONE, Screen::Pin);
        for attempt in 1..MAX_PIN_ATTEMPTS {
            let (next, notice) = continued(step(&directory, session, "0000").await);
            assert_eq!(next.pin_attempts, attempt);
            assert_eq!(
                notice.unwrap(),
                format!("Incorrect PIN. Attempt {attempt} of 3.")
            );
            session = next;
        }
        let outcome = step(&directory, session, "0000").await;
        assert_eq!(
            outcome,
            Outcome::End {
                message: "Too many incorrect PIN attempts. Session ended.".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_unregistered_account_ends() {
        let directory = InMemoryAccountDirectory::new();
        let outcome = step(&directory, Session::new(PHONE, Screen::Pin), "1234").await;
        assert!(matches!(outcome, Outcome::End { .. }));
    }

    #[tokio::test]
    async fn test_handoff_authenticates_and_takes_shortcut() {
        let directory = directory();
        let catalog = StaticCatalog::demo();
        let handoff = Handoff {
            pin: Some("1234".to_string()),
            language: None,
        };
        let outcome = SessionMachine::new(&directory, &catalog)
            .step(Session::new(PHONE, Screen::Pin), HANDOFF_LOAN_SHORTCUT, &handoff)
            .await
            .unwrap();
        let (next, notice) = continued(outcome);
        assert!(next.authenticated);
        assert!(matches!(next.screen, Screen::ChooseProvider { .. }));
        assert_eq!(notice.as_deref(), Some("Login successful."));
    }

    #[tokio::test]
    async fn test_handoff_wrong_pin_ends() {
        let directory = directory();
        let catalog = StaticCatalog::demo();
        let handoff = Handoff {
            pin: Some("9999".to_string()),
            language: None,
        };
        let outcome = SessionMachine::new(&directory, &catalog)
            .step(Session::new(PHONE, Screen::Pin), "", &handoff)
            .await
            .unwrap();
        assert_eq!(
            outcome,
            Outcome::End {
                message: "Authentication failed. Session ended.".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_product_pagination_bounds() {
        let directory = directory();
        let (providers, _) = continued(step(&directory, home_session(), "1").await);
        let (products, _) = continued(step(&directory, providers, "1").await);
        let Screen::ChooseProduct(selection) = &products.screen else {
            panic!("expected product list");
        };
        assert_eq!(selection.products.len(), 2);

        // Two products fit one page: neither 7 nor 8 moves
        let (next, _) = continued(step(&directory, products.clone(), "8").await);
        assert_eq!(next, products);
        let (prev, _) = continued(step(&directory, products.clone(), "7").await);
        assert_eq!(prev, products);
    }

    #[tokio::test]
    async fn test_loan_amount_bounds() {
        let directory = directory();
        let (s, _) = continued(step(&directory, home_session(), "1").await);
        let (s, _) = continued(step(&directory, s, "1").await);
        let (s, _) = continued(step(&directory, s, "1").await);

        for input in ["999", "5001", "abc", ""] {
            let (same, notice) = continued(step(&directory, s.clone(), input).await);
            assert_eq!(same.screen, s.screen);
            assert_eq!(
                notice.as_deref(),
                Some("Invalid amount. Enter a number between 1000 and 5000.")
            );
        }

        for input in ["1000", "5000"] {
            let (next, _) = continued(step(&directory, s.clone(), input).await);
            assert!(matches!(next.screen, Screen::ApplyLoanConfirm { .. }));
        }
    }

    #[tokio::test]
    async fn test_confirm_grants_loan() {
        let directory = directory();
        let mut s = home_session();
        for input in ["1", "2", "1"] {
            s = continued(step(&directory, s, input).await).0;
        }
        let (s, _) = continued(step(&directory, s, "1500").await);
        let outcome = step(&directory, s, "1").await;
        assert_eq!(
            outcome,
            Outcome::End {
                message: "Application for 1500.00 for Student Loan submitted! Amount credited."
                    .to_string()
            }
        );

        let loans = directory.get_loans(PHONE).await.unwrap();
        assert_eq!(loans.len(), 1);
        assert_eq!(loans[0].principal, dec!(1500));
        assert_eq!(loans[0].interest, dec!(75));
        assert_eq!(loans[0].provider_name, "Dashen Bank");
    }

    #[tokio::test]
    async fn test_cancel_returns_home() {
        let directory = directory();
        let mut s = home_session();
        for input in ["1", "1", "1", "2000"] {
            s = continued(step(&directory, s, input).await).0;
        }
        let (s, notice) = continued(step(&directory, s, "2").await);
        assert_eq!(s.screen, Screen::Home);
        assert_eq!(notice.as_deref(), Some("Loan application cancelled."));
        assert!(directory.get_loans(PHONE).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_repayment_flow() {
        let directory = directory();
        let loan = directory
            .add_loan(PHONE, "CBE", "Salary Advance", Amount::new(dec!(1000)).unwrap(), dec!(90))
            .await
            .unwrap();

        let (s, _) = continued(step(&directory, home_session(), "3").await);
        assert_eq!(
            s.screen,
            Screen::RepaySelectLoan {
                loans: vec![loan.clone()]
            }
        );
        let (s, _) = continued(step(&directory, s, "1").await);

        for input in ["0.00", "-5", "1090.01", "lots"] {
            let (same, notice) = continued(step(&directory, s.clone(), input).await);
            assert_eq!(same.screen, s.screen);
            assert_eq!(
                notice.as_deref(),
                Some("Invalid amount. Enter an amount greater than 0 and up to 1090.00.")
            );
        }

        let outcome = step(&directory, s, "1090").await;
        assert_eq!(
            outcome,
            Outcome::End {
                message: "Repayment of 1090.00 successful.".to_string()
            }
        );
        let loans = directory.get_loans(PHONE).await.unwrap();
        assert!(!loans[0].is_active());
    }

    #[tokio::test]
    async fn test_global_navigation() {
        let directory = directory();
        let mut s = home_session();
        for input in ["1", "1", "1"] {
            s = continued(step(&directory, s, input).await).0;
        }
        assert!(matches!(s.screen, Screen::ApplyLoanAmount { .. }));

        let (back, _) = continued(step(&directory, s.clone(), "99").await);
        assert!(matches!(back.screen, Screen::ChooseProduct(_)));

        let (home, notice) = continued(step(&directory, s, "0").await);
        assert_eq!(home.screen, Screen::Home);
        assert!(notice.is_none());
    }

    #[tokio::test]
    async fn test_change_pin() {
        let directory = directory();
        let (s, _) = continued(step(&directory, home_session(), "6").await);
        assert_eq!(s.screen, Screen::ChangePin);

        let (same, notice) = continued(step(&directory, s.clone(), "12").await);
        assert_eq!(same.screen, Screen::ChangePin);
        assert!(notice.is_some());

        let outcome = step(&directory, s, "4321").await;
        assert!(matches!(outcome, Outcome::End { .. }));
        assert_eq!(
            directory.get_pin(PHONE).await.unwrap().as_deref(),
            Some("4321")
        );
    }

    #[tokio::test]
    async fn test_home_invalid_choice() {
        let directory = directory();
        let (s, notice) = continued(step(&directory, home_session(), "42").await);
        assert_eq!(s.screen, Screen::Home);
        assert_eq!(notice.as_deref(), Some("Invalid choice."));
    }

    fn paged_catalog() -> StaticCatalog {
        let products = (1..=5)
            .map(|n| Product {
                id: format!("p{n}"),
                provider_id: "bank".to_string(),
                name: format!("Product {n}"),
                min_amount: dec!(100),
                max_amount: dec!(1000),
                interest_rate: dec!(0.1),
            })
            .collect();
        StaticCatalog::new(vec![Provider::new("bank", "Bank")], products)
    }

    fn product_page(session: &Session) -> usize {
        match &session.screen {
            Screen::ChooseProduct(selection) => selection.page,
            other => panic!("expected product list, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_product_paging_moves_between_pages() {
        let directory = directory();
        let catalog = paged_catalog();
        let machine = SessionMachine::new(&directory, &catalog);
        let handoff = Handoff::default();

        let mut s = home_session();
        for input in ["1", "1"] {
            s = continued(machine.step(s, input, &handoff).await.unwrap()).0;
        }
        assert_eq!(product_page(&s), 0);

        // Five products make three pages; 8 stops on the last one
        for (input, page) in [("8", 1), ("8", 2), ("8", 2), ("7", 1)] {
            s = continued(machine.step(s, input, &handoff).await.unwrap()).0;
            assert_eq!(product_page(&s), page, "after {input}");
        }

        let (next, _) = continued(machine.step(s, "3", &handoff).await.unwrap());
        assert!(matches!(
            next.screen,
            Screen::ApplyLoanAmount { ref product_id, .. } if product_id == "p3"
        ));
    }

    #[tokio::test]
    async fn test_loan_status_more_advances_once() {
        let mut account = Account::new(PHONE, "1234");
        for provider in ["NIB Bank", "Dashen Bank", "CBE"] {
            account.originate_loan(
                provider,
                "Personal Loan",
                Amount::new(dec!(100)).unwrap(),
                dec!(10),
                chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            );
        }
        let directory = InMemoryAccountDirectory::with_accounts([account]);

        let (s, _) = continued(step(&directory, home_session(), "2").await);
        assert_eq!(s.screen, Screen::LoanStatus { page: 0 });
        let (s, _) = continued(step(&directory, s, "9").await);
        assert_eq!(s.screen, Screen::LoanStatus { page: 1 });
        let (s, _) = continued(step(&directory, s, "9").await);
        assert_eq!(s.screen, Screen::LoanStatus { page: 1 });
    }
}

