use super::locale::Strings;
use super::locks::SessionLocks;
use super::render::{AccountView, render};
use super::transition::{Handoff, Outcome, SessionMachine, last_input};
use crate::domain::phone::normalize_msisdn;
use crate::domain::ports::{AccountDirectoryBox, CatalogProviderBox, SessionStoreBox};
use crate::domain::session::{Language, Screen, Session};
use crate::error::Result;
use chrono::Utc;
use std::fmt;
use tracing::{debug, error, info};

/// One inbound USSD hop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UssdRequest {
    pub session_id: String,
    /// Raw phone number; normalized before lookup.
    pub phone_number: String,
    /// Every input of the dialog so far, `*`-separated.
    pub text: String,
    pub handoff: Handoff,
}

impl UssdRequest {
    pub fn new(
        session_id: impl Into<String>,
        phone_number: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            phone_number: phone_number.into(),
            text: text.into(),
            handoff: Handoff::default(),
        }
    }

    pub fn with_handoff(mut self, pin: Option<String>, language: Option<Language>) -> Self {
        self.handoff = Handoff { pin, language };
        self
    }
}

/// The reply to a USSD hop: keep prompting, or close the dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UssdResponse {
    Continue(String),
    End(String),
}

impl UssdResponse {
    pub fn text(&self) -> &str {
        match self {
            UssdResponse::Continue(text) | UssdResponse::End(text) => text,
        }
    }

    pub fn is_end(&self) -> bool {
        matches!(self, UssdResponse::End(_))
    }
}

impl fmt::Display for UssdResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UssdResponse::Continue(text) => write!(f, "CON {text}"),
            UssdResponse::End(text) => write!(f, "END {text}"),
        }
    }
}

/// Entry point for USSD traffic.
///
/// `UssdEngine` owns the session store and the collaborators. Requests for the
/// same session id run one at a time; a session is written back only when the
/// dialog continues and deleted as soon as it ends.
pub struct UssdEngine {
    sessions: SessionStoreBox,
    accounts: AccountDirectoryBox,
    catalog: CatalogProviderBox,
    locks: SessionLocks,
}

impl UssdEngine {
    /// Creates a new `UssdEngine` instance.
    ///
    /// # Arguments
    ///
    /// * `sessions` - The store for in-progress dialogs.
    /// * `accounts` - The customer record store.
    /// * `catalog` - The source of loan providers and products.
    pub fn new(
        sessions: SessionStoreBox,
        accounts: AccountDirectoryBox,
        catalog: CatalogProviderBox,
    ) -> Self {
        Self {
            sessions,
            accounts,
            catalog,
            locks: SessionLocks::new(),
        }
    }

    /// Processes one request and produces the text to send back.
    pub async fn handle(&self, request: UssdRequest) -> Result<UssdResponse> {
        let session_id = request.session_id.as_str();
        let input = last_input(&request.text);
        let _guard = self.locks.acquire(session_id).await;

        let session = match self.sessions.get(session_id).await? {
            Some(session) => session,
            None => {
                let account_id = normalize_msisdn(&request.phone_number);
                let mut session = self.sessions.create(session_id, &account_id).await?;
                if let Some(language) = request.handoff.language {
                    session.language = language;
                    if session.screen == Screen::LanguageSelect {
                        session.screen = Screen::Pin;
                    }
                }
                session
            }
        };
        debug!(session_id, screen = session.screen.name(), "Processing input");

        let language = session.language;
        let machine = SessionMachine::new(self.accounts.as_ref(), self.catalog.as_ref());
        let outcome = match machine.step(session, input, &request.handoff).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(session_id, error = %e, "Request failed, ending session");
                Outcome::End {
                    message: Strings::new(language).generic_error().to_string(),
                }
            }
        };

        match outcome {
            Outcome::End { message } => {
                self.sessions.delete(session_id).await?;
                info!(session_id, "Session ended");
                Ok(UssdResponse::End(message))
            }
            Outcome::Continue {
                mut session,
                notice,
            } => {
                let view = match self.account_view(&session).await {
                    Ok(view) => view,
                    Err(e) => {
                        error!(session_id, error = %e, "Could not load screen data, ending session");
                        self.sessions.delete(session_id).await?;
                        return Ok(UssdResponse::End(
                            Strings::new(session.language).generic_error().to_string(),
                        ));
                    }
                };
                let menu = render(&session, &view);
                debug!(session_id, screen = session.screen.name(), "Session continues");

                let language = session.language;
                session.touch(Utc::now());
                if let Err(e) = self.sessions.update(session_id, session).await {
                    error!(session_id, error = %e, "Could not store session, ending session");
                    self.sessions.delete(session_id).await?;
                    return Ok(UssdResponse::End(
                        Strings::new(language).generic_error().to_string(),
                    ));
                }

                let text = match notice {
                    Some(notice) => format!("{notice}\n{menu}"),
                    None => menu,
                };
                Ok(UssdResponse::Continue(text))
            }
        }
    }

    async fn account_view(&self, session: &Session) -> Result<AccountView> {
        let mut view = AccountView::default();
        match session.screen {
            Screen::LoanStatus { .. } => {
                view.loans = self.accounts.get_loans(&session.account_id).await?;
            }
            Screen::LoanHistory => {
                view.transactions = self.accounts.get_transactions(&session.account_id).await?;
            }
            _ => {}
        }
        Ok(view)
    }
}
