use crate::domain::account::{Account, Balance};
use crate::domain::phone::normalize_msisdn;
use crate::error::{Result, UssdError};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize)]
struct AccountRecord {
    phone_number: String,
    pin: String,
    #[serde(default)]
    national_id: String,
    verified: bool,
    #[serde(default)]
    balance: Option<Decimal>,
}

impl From<AccountRecord> for Account {
    fn from(record: AccountRecord) -> Self {
        let mut account = Account::new(normalize_msisdn(&record.phone_number), record.pin);
        account.national_id = record.national_id;
        account.verified = record.verified;
        account.balance = Balance::new(record.balance.unwrap_or_default());
        account
    }
}

/// Reads customer accounts from a CSV source.
///
/// Expects the header `phone_number,pin,national_id,verified,balance`. Phone
/// numbers are normalized before they become account ids.
pub struct AccountReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> AccountReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    pub fn accounts(self) -> impl Iterator<Item = Result<Account>> {
        self.reader
            .into_deserialize::<AccountRecord>()
            .map(|result| result.map(Account::from).map_err(UssdError::from))
    }
}
