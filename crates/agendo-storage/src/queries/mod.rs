// SPDX-FileCopyrightText: 2026 Agendo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query modules, one per entity family.
//!
//! Every function takes `&Database` and routes through the serialized
//! connection. Rows are mapped to `agendo-core` domain structs here;
//! nothing above this layer sees SQL.

pub mod appointments;
pub mod businesses;
pub mod catalog;
pub mod conversations;
pub mod messages;
pub mod sessions;

use std::str::FromStr;

/// Maps an enum-from-text parse failure into a rusqlite conversion error
/// so it surfaces through the normal row-mapping path.
pub(crate) fn parse_column<T>(idx: usize, raw: &str) -> Result<T, rusqlite::Error>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    T::from_str(raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}
