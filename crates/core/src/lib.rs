//! Core ledger rules for Kasa.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and balance arithmetic live here.
//!
//! # Modules
//!
//! - `currency` - Currency catalog, formatting, conversion and rate freshness
//! - `ledger` - Accounts, transactions, balance mutation and numbering
//! - `personnel` - Salary, advance and payable records and their reconciliation

pub mod currency;
pub mod ledger;
pub mod personnel;

pub use ledger::LedgerError;
