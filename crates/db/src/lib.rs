//! Storage and services for the kasa ledger.
//!
//! This crate provides:
//! - the [`store::LedgerStore`] seam with in-memory and `PostgreSQL` backends
//! - `SeaORM` entity definitions and migrations
//! - the ledger services built on top of a store (see [`Ledger`])

pub mod entities;
pub mod error;
pub mod ledger;
pub mod migration;
pub mod repositories;
pub mod store;

pub use error::StoreError;
pub use ledger::Ledger;
pub use migration::Migrator;
pub use store::{LedgerStore, MemoryStore, PgStore};
