use crate::error::{CardError, Result};
use serde::Deserialize;
use std::io::Read;

/// One row of the input file: a caller-chosen identifier and the number to check.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct CardRecord {
    pub id: String,
    pub number: String,
}

/// Reads card records from a CSV source with an `id,number` header.
///
/// Only headers are trimmed. Whitespace inside a `number` field is kept so the
/// validator can reject it.
pub struct CardReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CardReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::Headers)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily deserializes records, one `Result` per row.
    pub fn records(self) -> impl Iterator<Item = Result<CardRecord>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(CardError::from))
    }
}
