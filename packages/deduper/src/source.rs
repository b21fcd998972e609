//! Delimited-text record source.
//!
//! Reads a file with a header row (tab-separated by default) and yields one
//! [`Record`] per row. Every field is trimmed. The first malformed row ends
//! the batch with a [`RecordError`].

use std::io::Read;

use address_dedupe_address_models::{RawAddress, Record};
use csv::StringRecord;

/// Default field delimiter.
pub const DEFAULT_DELIMITER: u8 = b'\t';

/// Errors raised while reading records.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    /// The underlying reader failed or a row had the wrong number of fields.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A required column is not in the header row.
    #[error("Missing column '{0}' in header")]
    MissingColumn(String),

    /// A row has no value for a required column.
    #[error("Line {line}: missing value for column '{column}'")]
    MissingField {
        /// 1-based line number.
        line: u64,
        /// Column name.
        column: String,
    },

    /// The id column is empty or not an integer.
    #[error("Line {line}: invalid id '{value}'")]
    InvalidId {
        /// 1-based line number.
        line: u64,
        /// The offending value, trimmed.
        value: String,
    },
}

/// Header names of the columns a record is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceColumns {
    /// Record id column.
    pub id: String,
    /// Street line column.
    pub street: String,
    /// City column.
    pub city: String,
    /// Region (state/country) column.
    pub region: String,
    /// Postal code column.
    pub postal_code: String,
}

impl Default for SourceColumns {
    fn default() -> Self {
        Self {
            id: "id".to_string(),
            street: "street address".to_string(),
            city: "city".to_string(),
            region: "region".to_string(),
            postal_code: "postal code".to_string(),
        }
    }
}

/// How to read a delimited record source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceOptions {
    /// Field delimiter byte.
    pub delimiter: u8,
    /// Column names to read.
    pub columns: SourceColumns,
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
            columns: SourceColumns::default(),
        }
    }
}

impl SourceOptions {
    /// Sets the field delimiter (e.g. `b','` for CSV files).
    #[must_use]
    pub const fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Sets the column names.
    #[must_use]
    pub fn with_columns(mut self, columns: SourceColumns) -> Self {
        self.columns = columns;
        self
    }
}

/// Positions of the required columns within a row.
#[derive(Debug, Clone, Copy)]
struct ColumnIndices {
    id: usize,
    street: usize,
    city: usize,
    region: usize,
    postal_code: usize,
}

/// Iterator of [`Record`]s over delimited text.
#[derive(Debug)]
pub struct RecordReader<R: Read> {
    reader: csv::Reader<R>,
    columns: SourceColumns,
    indices: ColumnIndices,
    row: StringRecord,
}

impl<R: Read> RecordReader<R> {
    /// Reads the header row and resolves the configured columns.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::MissingColumn`] if a configured column is not
    /// in the header, or [`RecordError::Csv`] if the header cannot be read.
    pub fn new(reader: R, options: &SourceOptions) -> Result<Self, RecordError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(options.delimiter)
            .has_headers(true)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        let index = |name: &str| {
            headers
                .iter()
                .position(|header| header.trim() == name)
                .ok_or_else(|| RecordError::MissingColumn(name.to_string()))
        };

        let columns = &options.columns;
        let indices = ColumnIndices {
            id: index(&columns.id)?,
            street: index(&columns.street)?,
            city: index(&columns.city)?,
            region: index(&columns.region)?,
            postal_code: index(&columns.postal_code)?,
        };

        Ok(Self {
            reader,
            columns: columns.clone(),
            indices,
            row: StringRecord::new(),
        })
    }

    fn parse_row(&self) -> Result<Record, RecordError> {
        let line = self.row.position().map_or(0, csv::Position::line);
        let field = |idx: usize, column: &str| {
            self.row
                .get(idx)
                .map(str::trim)
                .ok_or_else(|| RecordError::MissingField {
                    line,
                    column: column.to_string(),
                })
        };

        let id = field(self.indices.id, &self.columns.id)?;
        let id = id.parse::<i64>().map_err(|_| RecordError::InvalidId {
            line,
            value: id.to_string(),
        })?;

        let address = RawAddress::new(
            field(self.indices.street, &self.columns.street)?,
            field(self.indices.city, &self.columns.city)?,
            field(self.indices.region, &self.columns.region)?,
            field(self.indices.postal_code, &self.columns.postal_code)?,
        );

        Ok(Record::new(id, address))
    }
}

impl<R: Read> Iterator for RecordReader<R> {
    type Item = Result<Record, RecordError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.reader.read_record(&mut self.row) {
            Ok(false) => None,
            Ok(true) => Some(self.parse_row()),
            Err(e) => Some(Err(e.into())),
        }
    }
}
