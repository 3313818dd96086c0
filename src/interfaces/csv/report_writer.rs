use crate::domain::outcome::ValidationResult;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

/// One output row. The card number itself is never written back.
#[derive(Debug, Serialize, PartialEq)]
pub struct ReportRow<'a> {
    pub id: &'a str,
    pub valid: bool,
    pub institute: Option<&'static str>,
    /// Reason codes joined with `;`, empty when there are none.
    pub reasons: String,
}

impl<'a> ReportRow<'a> {
    pub fn new(id: &'a str, result: &ValidationResult) -> Self {
        Self {
            id,
            valid: result.is_valid,
            institute: result.institute.map(|institute| institute.id()),
            reasons: result
                .codes()
                .map(|code| code.as_str())
                .collect::<Vec<_>>()
                .join(";"),
        }
    }
}

pub struct ReportWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write(&mut self, id: &str, result: &ValidationResult) -> Result<()> {
        self.writer.serialize(ReportRow::new(id, result))?;
        Ok(())
    }

    pub fn finish(mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
