//! Screen renderer: turns a session into the text shown on the handset.
//!
//! Rendering is pure. Data owned by the account directory (loans, ledger) is
//! fetched by the caller into an [`AccountView`] before rendering.

use super::locale::{LANGUAGE_MENU, Strings};
use crate::domain::account::Loan;
use crate::domain::session::{PAGE_SIZE, ProductSelection, Screen, Session};

/// Ledger entries shown on the history screen, newest last.
pub const HISTORY_LENGTH: usize = 5;

/// Directory data needed by the screens that display account records.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct AccountView {
    pub loans: Vec<Loan>,
    pub transactions: Vec<String>,
}

/// Whether a page after `page` exists for a list of `len` items.
pub fn has_next_page(page: usize, len: usize) -> bool {
    (page + 1) * PAGE_SIZE < len
}

fn page_slice<T>(items: &[T], page: usize) -> &[T] {
    let start = (page * PAGE_SIZE).min(items.len());
    let end = (start + PAGE_SIZE).min(items.len());
    &items[start..end]
}

pub fn render(session: &Session, view: &AccountView) -> String {
    let t = Strings::new(session.language);
    let mut lines: Vec<String> = Vec::new();

    match &session.screen {
        Screen::LanguageSelect => return LANGUAGE_MENU.to_string(),
        Screen::Pin => return t.pin_prompt().to_string(),
        Screen::Home => return t.home_menu().to_string(),
        Screen::ChooseProvider { providers } => {
            lines.push(t.choose_provider().to_string());
            if providers.is_empty() {
                lines.push(t.no_providers().to_string());
            }
            lines.extend(
                providers
                    .iter()
                    .enumerate()
                    .map(|(i, p)| format!("{}. {}", i + 1, p.name)),
            );
            lines.push(t.nav_home().to_string());
        }
        Screen::ChooseProduct(selection) => {
            render_products(&t, selection, &mut lines);
        }
        Screen::ApplyLoanAmount {
            selection,
            product_id,
        } => match selection.product(product_id) {
            Some(product) => {
                lines.push(t.enter_amount(product.min_amount, product.max_amount));
                lines.push(t.nav_home().to_string());
                lines.push(t.nav_back().to_string());
            }
            None => {
                lines.push(t.product_not_found().to_string());
                lines.push(t.nav_home().to_string());
            }
        },
        Screen::ApplyLoanConfirm {
            selection,
            product_id,
            amount,
        } => match (selection.provider(), selection.product(product_id)) {
            (Some(provider), Some(product)) => {
                lines.push(t.confirm_loan(
                    &provider.name,
                    &product.name,
                    *amount,
                    product.interest_for(*amount),
                ));
                lines.push(t.nav_home().to_string());
                lines.push(t.nav_back().to_string());
            }
            _ => {
                lines.push(t.product_not_found().to_string());
                lines.push(t.nav_home().to_string());
            }
        },
        Screen::LoanStatus { page } => {
            if view.loans.is_empty() {
                lines.push(t.no_loans().to_string());
            } else {
                lines.push(t.loan_status_title().to_string());
                lines.extend(page_slice(&view.loans, *page).iter().enumerate().map(
                    |(i, loan)| {
                        t.loan_status_line(
                            page * PAGE_SIZE + i + 1,
                            &loan.provider_name,
                            &loan.product_name,
                            loan.outstanding(),
                        )
                    },
                ));
                if has_next_page(*page, view.loans.len()) {
                    lines.push(t.nav_more().to_string());
                }
            }
            lines.push(t.nav_home().to_string());
        }
        Screen::RepaySelectLoan { loans } => {
            if loans.is_empty() {
                lines.push(t.no_repayable_loans().to_string());
            } else {
                lines.push(t.repay_title().to_string());
                lines.extend(loans.iter().enumerate().map(|(i, loan)| {
                    t.repay_line(
                        i + 1,
                        &loan.provider_name,
                        &loan.product_name,
                        loan.outstanding(),
                    )
                }));
            }
            lines.push(t.nav_home().to_string());
        }
        Screen::RepayEnterAmount { loans, loan_id } => {
            match loans.iter().find(|l| &l.id == loan_id) {
                Some(loan) => {
                    lines.push(t.enter_repay_amount(loan.outstanding()));
                    lines.push(t.nav_home().to_string());
                    lines.push(t.nav_back().to_string());
                }
                None => {
                    lines.push(t.loan_not_found().to_string());
                    lines.push(t.nav_home().to_string());
                }
            }
        }
        Screen::LoanHistory => {
            if view.transactions.is_empty() {
                lines.push(t.no_transactions().to_string());
            } else {
                lines.push(t.history_title().to_string());
                let skip = view.transactions.len().saturating_sub(HISTORY_LENGTH);
                lines.extend(view.transactions.iter().skip(skip).cloned());
            }
            lines.push(t.nav_home().to_string());
        }
        Screen::ChangePin => {
            lines.push(t.change_pin_prompt().to_string());
            lines.push(t.nav_home().to_string());
        }
    }

    lines.join("\n")
}

fn render_products(t: &Strings, selection: &ProductSelection, lines: &mut Vec<String>) {
    lines.push(t.choose_product().to_string());
    if selection.products.is_empty() {
        lines.push(t.no_products().to_string());
    }
    let page = selection.page;
    lines.extend(
        page_slice(&selection.products, page)
            .iter()
            .enumerate()
            .map(|(i, p)| {
                t.product_line(page * PAGE_SIZE + i + 1, &p.name, p.min_amount, p.max_amount)
            }),
    );
    if page > 0 {
        lines.push(t.nav_prev().to_string());
    }
    if has_next_page(page, selection.products.len()) {
        lines.push(t.nav_next().to_string());
    }
    lines.push(t.nav_home().to_string());
    lines.push(t.nav_back().to_string());
}
