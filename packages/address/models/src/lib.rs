#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared types for address canonicalization and deduplication.
//!
//! This crate contains only plain data types. It has no lookup tables and
//! no I/O; see `address_dedupe_canonicalizer` and `address_dedupe_deduper`
//! for the logic that produces and consumes them.

use serde::{Deserialize, Serialize};

/// An address exactly as supplied by a source record.
///
/// Fields are free text with arbitrary casing, spacing and punctuation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAddress {
    /// Street line, e.g. `"1234 N. Main st."`.
    pub street: String,
    /// City name.
    pub city: String,
    /// State, territory or country, abbreviated or spelled out.
    pub region: String,
    /// Postal (zip) code.
    pub postal_code: String,
}

impl RawAddress {
    /// Builds a raw address from its four fields.
    #[must_use]
    pub fn new(
        street: impl Into<String>,
        city: impl Into<String>,
        region: impl Into<String>,
        postal_code: impl Into<String>,
    ) -> Self {
        Self {
            street: street.into(),
            city: city.into(),
            region: region.into(),
            postal_code: postal_code.into(),
        }
    }
}

/// The normalized form of an address, used as the deduplication key.
///
/// Two canonical addresses are the same address iff all four fields are
/// equal, so `Eq` and `Hash` are derived over every field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CanonicalAddress {
    /// Uppercased street with corrected tokens and a standard suffix.
    pub street: String,
    /// Uppercased city, resolved to the primary city for the zip code when
    /// a known variant.
    pub city: String,
    /// Standard two-letter state or country code, or the uppercased input.
    pub region: String,
    /// Uppercased postal code.
    pub postal_code: String,
}

impl CanonicalAddress {
    /// Builds a canonical address from already-normalized fields.
    #[must_use]
    pub fn new(
        street: impl Into<String>,
        city: impl Into<String>,
        region: impl Into<String>,
        postal_code: impl Into<String>,
    ) -> Self {
        Self {
            street: street.into(),
            city: city.into(),
            region: region.into(),
            postal_code: postal_code.into(),
        }
    }
}

impl From<CanonicalAddress> for RawAddress {
    fn from(value: CanonicalAddress) -> Self {
        Self {
            street: value.street,
            city: value.city,
            region: value.region,
            postal_code: value.postal_code,
        }
    }
}

/// One input row: a caller-supplied id and its raw address.
///
/// Ids are unique per batch. Order of appearance decides which record is
/// the source of a duplicate group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Caller-supplied identifier.
    pub id: i64,
    /// The address to canonicalize.
    pub address: RawAddress,
}

impl Record {
    /// Builds a record.
    #[must_use]
    pub const fn new(id: i64, address: RawAddress) -> Self {
        Self { id, address }
    }
}

/// A later record whose canonical address was already seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DuplicatePair {
    /// Id of the first record seen with the shared canonical address.
    pub source_id: i64,
    /// Id of the later record that collapsed onto it.
    pub duplicate_id: i64,
}

impl DuplicatePair {
    /// Builds a duplicate pair.
    #[must_use]
    pub const fn new(source_id: i64, duplicate_id: i64) -> Self {
        Self {
            source_id,
            duplicate_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn canonical_addresses_with_equal_fields_share_a_map_key() {
        let mut seen = HashMap::new();
        seen.insert(CanonicalAddress::new("1 MAIN ST", "CITYBURG", "PA", "12345"), 1);

        let again = CanonicalAddress::new(
            String::from("1 MAIN ST"),
            String::from("CITYBURG"),
            String::from("PA"),
            String::from("12345"),
        );
        assert_eq!(seen.get(&again), Some(&1));
    }

    #[test]
    fn canonical_addresses_differing_in_one_field_are_distinct() {
        let a = CanonicalAddress::new("1 MAIN ST", "CITYBURG", "PA", "12345");
        let b = CanonicalAddress::new("1 MAIN ST", "CITYBURG", "PA", "12346");
        assert_ne!(a, b);
    }

    #[test]
    fn duplicate_pair_serializes_with_snake_case_fields() {
        let json = serde_json::to_string(&DuplicatePair::new(3, 1003)).unwrap();
        assert_eq!(json, r#"{"source_id":3,"duplicate_id":1003}"#);
    }
}
