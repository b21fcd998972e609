#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Exact-match address deduplication.
//!
//! Streams records in order, canonicalizes each address and reports every
//! record whose canonical address was already seen. The first record seen
//! with an address is the source of every later duplicate of it.
//!
//! # Usage
//!
//! ```rust
//! use address_dedupe_address_models::{DuplicatePair, RawAddress, Record};
//! use address_dedupe_deduper::Deduper;
//!
//! let duplicates = Deduper::bundled().dedupe([
//!     Record::new(1, RawAddress::new("1234 street st", "cityburg", "pa", "12345")),
//!     Record::new(2, RawAddress::new("1234 STREET ST.", "CityBurg", "Pennsylvania", "12345")),
//! ]);
//! assert_eq!(duplicates, vec![DuplicatePair::new(1, 2)]);
//! ```

pub mod source;

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::convert::Infallible;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use address_dedupe_address_models::{CanonicalAddress, DuplicatePair, Record};
use address_dedupe_canonicalizer::Canonicalizer;

pub use source::{RecordError, RecordReader, SourceColumns, SourceOptions};

/// Errors that can occur while deduplicating a record source.
#[derive(Debug, thiserror::Error)]
pub enum DedupeError {
    /// The source file could not be opened.
    #[error("Failed to open {}: {source}", path.display())]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A record could not be read.
    #[error("Invalid record: {0}")]
    Record(#[from] RecordError),
}

/// First-wins deduplicator over canonical addresses.
///
/// Each call owns its own identity map, so one `Deduper` can serve any
/// number of independent batches.
#[derive(Debug, Clone, Copy)]
pub struct Deduper<'a> {
    canonicalizer: Canonicalizer<'a>,
}

impl<'a> Deduper<'a> {
    /// Creates a deduper that canonicalizes with `canonicalizer`.
    #[must_use]
    pub const fn new(canonicalizer: Canonicalizer<'a>) -> Self {
        Self { canonicalizer }
    }

    /// Reports duplicates among `records`, in discovery order.
    #[must_use]
    pub fn dedupe<I>(&self, records: I) -> Vec<DuplicatePair>
    where
        I: IntoIterator<Item = Record>,
    {
        self.try_dedupe(records.into_iter().map(Ok::<_, Infallible>))
            .unwrap_or_else(|never| match never {})
    }

    /// Reports duplicates among fallible `records`, in discovery order.
    ///
    /// # Errors
    ///
    /// Returns the first error yielded by `records`. No further records are
    /// read and no partial result is returned.
    pub fn try_dedupe<I, E>(&self, records: I) -> Result<Vec<DuplicatePair>, E>
    where
        I: IntoIterator<Item = Result<Record, E>>,
    {
        let mut seen: HashMap<CanonicalAddress, i64> = HashMap::new();
        let mut duplicates = Vec::new();
        let mut total = 0_u64;

        for record in records {
            let Record { id, address } = record?;
            total += 1;

            match seen.entry(self.canonicalizer.canonicalize(&address)) {
                Entry::Occupied(entry) => {
                    let pair = DuplicatePair::new(*entry.get(), id);
                    log::debug!(
                        "Record {id} duplicates record {}: {:?}",
                        pair.source_id,
                        entry.key()
                    );
                    duplicates.push(pair);
                }
                Entry::Vacant(entry) => {
                    entry.insert(id);
                }
            }
        }

        log::info!(
            "Deduplicated {total} records: {} unique addresses, {} duplicates",
            seen.len(),
            duplicates.len()
        );

        Ok(duplicates)
    }

    /// Reads records from delimited text and reports duplicates.
    ///
    /// # Errors
    ///
    /// Returns [`DedupeError::Record`] on the first malformed header or row.
    pub fn dedupe_reader<R: Read>(
        &self,
        reader: R,
        options: &SourceOptions,
    ) -> Result<Vec<DuplicatePair>, DedupeError> {
        let records = RecordReader::new(reader, options)?;
        Ok(self.try_dedupe(records)?)
    }

    /// Reads records from the delimited file at `path` and reports
    /// duplicates.
    ///
    /// # Errors
    ///
    /// Returns [`DedupeError::Io`] if the file cannot be opened, or
    /// [`DedupeError::Record`] on the first malformed header or row.
    pub fn dedupe_from(
        &self,
        path: &Path,
        options: &SourceOptions,
    ) -> Result<Vec<DuplicatePair>, DedupeError> {
        log::info!("Deduplicating records from {}", path.display());

        let file = File::open(path).map_err(|source| DedupeError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        self.dedupe_reader(BufReader::new(file), options)
    }
}

impl Deduper<'static> {
    /// A deduper over the bundled lookup tables.
    #[must_use]
    pub fn bundled() -> Self {
        Self::new(Canonicalizer::bundled())
    }
}
