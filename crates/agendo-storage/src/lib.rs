// SPDX-FileCopyrightText: 2026 Agendo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence for the Agendo scheduling agent.
//!
//! A single serialized connection (tokio-rusqlite) with embedded
//! refinery migrations, typed query modules per entity family, and a
//! [`SqliteStorage`] adapter implementing the core `Storage` trait.

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;

pub use adapter::SqliteStorage;
pub use database::Database;
