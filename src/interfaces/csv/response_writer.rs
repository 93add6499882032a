use crate::application::engine::UssdResponse;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct ResponseRecord<'a> {
    session_id: &'a str,
    response: String,
}

/// Writes replay results as `session_id,response` rows.
///
/// `response` carries the `CON`/`END` marker; multi-line menus are quoted.
pub struct ResponseWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> ResponseWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write(&mut self, session_id: &str, response: &UssdResponse) -> Result<()> {
        self.writer.serialize(ResponseRecord {
            session_id,
            response: response.to_string(),
        })?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writer_quotes_menus() {
        let mut buffer = Vec::new();
        {
            let mut writer = ResponseWriter::new(&mut buffer);
            writer
                .write("s1", &UssdResponse::Continue("Menu\n1. A".to_string()))
                .unwrap();
            writer
                .write("s1", &UssdResponse::End("Bye".to_string()))
                .unwrap();
            writer.flush().unwrap();
        }
        let output = String::from_utf8(buffer).unwrap();
        assert_eq!(
            output,
            "session_id,response\ns1,\"CON Menu\n1. A\"\ns1,END Bye\n"
        );
    }
}
