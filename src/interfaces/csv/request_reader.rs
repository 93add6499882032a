use crate::application::engine::UssdRequest;
use crate::domain::session::Language;
use crate::error::{Result, UssdError};
use serde::Deserialize;
use std::io::Read;

/// One row of a replay file.
#[derive(Debug, Deserialize)]
struct RequestRecord {
    session_id: String,
    phone_number: String,
    #[serde(default)]
    text: String,
    #[serde(default)]
    pin: Option<String>,
    #[serde(default)]
    language: Option<String>,
}

impl From<RequestRecord> for UssdRequest {
    fn from(record: RequestRecord) -> Self {
        UssdRequest::new(record.session_id, record.phone_number, record.text).with_handoff(
            record.pin.filter(|p| !p.is_empty()),
            record
                .language
                .filter(|l| !l.is_empty())
                .map(|l| Language::from_tag(&l)),
        )
    }
}

/// Reads USSD hops from a CSV source, in the order they should be replayed.
///
/// Header: `session_id,phone_number,text,pin,language`. The last two columns
/// may be empty or missing.
pub struct RequestReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> RequestReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily deserializes requests; a bad row yields an error and the rest still follow.
    pub fn requests(self) -> impl Iterator<Item = Result<UssdRequest>> {
        self.reader
            .into_deserialize::<RequestRecord>()
            .map(|result| result.map(UssdRequest::from).map_err(UssdError::from))
    }
}
