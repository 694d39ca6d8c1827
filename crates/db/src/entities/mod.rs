//! `SeaORM` entity definitions.
//!
//! One table per ledger collection. Enum columns map to Postgres enum types
//! through [`sea_orm_active_enums`].

pub mod accounts;
pub mod advance_records;
pub mod exchange_rates;
pub mod ledger_sequences;
pub mod payables;
pub mod personnel;
pub mod salary_records;
pub mod sea_orm_active_enums;
pub mod transactions;
