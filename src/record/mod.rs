//! Record normalization module
//!
//! Turns raw collection items into canonical records.
//!
//! # Overview
//!
//! The remote API returns the same logical field under different casings
//! depending on the method that produced it (`STATUS`, `status`,
//! `createdDate`). [`FieldAccessor`] resolves a canonical key against those
//! variants and [`RecordNormalizer`] builds a [`CanonicalRecord`] from it.

mod field;
mod normalizer;

pub use field::{normalize_number, to_camel_case_key, FieldAccessor};
pub use normalizer::{CanonicalField, CanonicalRecord, RecordNormalizer};
