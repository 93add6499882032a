use super::account::Loan;
use super::catalog::{Product, Provider};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Items shown per page on paginated screens.
pub const PAGE_SIZE: usize = 2;
/// Failed PIN entries after which the dialog is closed.
pub const MAX_PIN_ATTEMPTS: u8 = 3;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Am,
}

impl Language {
    /// Maps an upstream language tag; anything but Amharic falls back to English.
    pub fn from_tag(tag: &str) -> Self {
        if tag.trim().eq_ignore_ascii_case("am") {
            Language::Am
        } else {
            Language::En
        }
    }
}

/// The loan-application choices accumulated once a provider is picked.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct ProductSelection {
    /// Providers as fetched when the flow started, kept for going back.
    pub providers: Vec<Provider>,
    pub provider_id: String,
    pub products: Vec<Product>,
    pub page: usize,
}

impl ProductSelection {
    pub fn provider(&self) -> Option<&Provider> {
        self.providers.iter().find(|p| p.id == self.provider_id)
    }

    pub fn product(&self, product_id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == product_id)
    }
}

/// The screen a dialog is on. Each variant carries only the data valid there.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(tag = "screen", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Screen {
    LanguageSelect,
    Pin,
    Home,
    ChooseProvider {
        providers: Vec<Provider>,
    },
    ChooseProduct(ProductSelection),
    ApplyLoanAmount {
        selection: ProductSelection,
        product_id: String,
    },
    ApplyLoanConfirm {
        selection: ProductSelection,
        product_id: String,
        amount: Decimal,
    },
    LoanStatus {
        page: usize,
    },
    RepaySelectLoan {
        /// Snapshot of repayable loans taken when the screen was entered.
        loans: Vec<Loan>,
    },
    RepayEnterAmount {
        loans: Vec<Loan>,
        loan_id: String,
    },
    LoanHistory,
    ChangePin,
}

impl Screen {
    pub fn name(&self) -> &'static str {
        match self {
            Screen::LanguageSelect => "LANGUAGE_SELECT",
            Screen::Pin => "PIN",
            Screen::Home => "HOME",
            Screen::ChooseProvider { .. } => "CHOOSE_PROVIDER",
            Screen::ChooseProduct(_) => "CHOOSE_PRODUCT",
            Screen::ApplyLoanAmount { .. } => "APPLY_LOAN_AMOUNT",
            Screen::ApplyLoanConfirm { .. } => "APPLY_LOAN_CONFIRM",
            Screen::LoanStatus { .. } => "LOAN_STATUS",
            Screen::RepaySelectLoan { .. } => "REPAY_SELECT_LOAN",
            Screen::RepayEnterAmount { .. } => "REPAY_ENTER_AMOUNT",
            Screen::LoanHistory => "LOAN_HISTORY",
            Screen::ChangePin => "CHANGE_PIN",
        }
    }

    /// Whether `0` and `99` are handled before the screen's own logic.
    pub fn has_global_navigation(&self) -> bool {
        !matches!(self, Screen::LanguageSelect | Screen::Pin | Screen::Home)
    }

    /// The screen `99` leads to. Screens without a predecessor lead home.
    pub fn back(self) -> Screen {
        match self {
            Screen::ChooseProduct(selection) => Screen::ChooseProvider {
                providers: selection.providers,
            },
            Screen::ApplyLoanAmount { selection, .. } => Screen::ChooseProduct(selection),
            Screen::ApplyLoanConfirm {
                selection,
                product_id,
                ..
            } => Screen::ApplyLoanAmount {
                selection,
                product_id,
            },
            Screen::RepayEnterAmount { loans, .. } => Screen::RepaySelectLoan { loans },
            _ => Screen::Home,
        }
    }
}

/// Server-side record of one in-progress dialog.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Session {
    pub screen: Screen,
    pub pin_attempts: u8,
    pub authenticated: bool,
    pub language: Language,
    pub account_id: String,
    pub last_activity: DateTime<Utc>,
}

impl Session {
    pub fn new(account_id: impl Into<String>, screen: Screen) -> Self {
        Self {
            screen,
            pin_attempts: 0,
            authenticated: false,
            language: Language::default(),
            account_id: account_id.into(),
            last_activity: Utc::now(),
        }
    }

    pub fn authenticate(&mut self) {
        self.authenticated = true;
        self.pin_attempts = 0;
        self.screen = Screen::Home;
    }

    /// Counts a wrong PIN and returns the new attempt count.
    pub fn record_failed_pin(&mut self) -> u8 {
        self.pin_attempts = (self.pin_attempts + 1).min(MAX_PIN_ATTEMPTS);
        self.pin_attempts
    }

    pub fn is_locked_out(&self) -> bool {
        self.pin_attempts >= MAX_PIN_ATTEMPTS
    }

    /// Returns to the home menu, dropping every sub-flow selection.
    pub fn go_home(&mut self) {
        self.screen = Screen::Home;
    }

    pub fn go_back(&mut self) {
        let screen = std::mem::replace(&mut self.screen, Screen::Home);
        self.screen = screen.back();
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_activity = now;
    }

    pub fn is_expired(&self, now: DateTime<Utc>, idle_timeout: Duration) -> bool {
        (now - self.last_activity)
            .to_std()
            .map(|idle| idle > idle_timeout)
            .unwrap_or(false)
    }
}

/// How sessions are started and how long an idle one survives.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionPolicy {
    pub ask_language: bool,
    pub idle_timeout: Duration,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            ask_language: true,
            idle_timeout: Duration::from_secs(180),
        }
    }
}

impl SessionPolicy {
    pub fn first_screen(&self) -> Screen {
        if self.ask_language {
            Screen::LanguageSelect
        } else {
            Screen::Pin
        }
    }
}
