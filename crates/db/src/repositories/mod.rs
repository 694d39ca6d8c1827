//! Ledger services over a [`crate::store::LedgerStore`].
//!
//! Services hold an `Arc<dyn LedgerStore>` and never talk to a database
//! directly, so the same code runs on the in-memory and PostgreSQL backends.

pub mod account;
pub mod admin;
pub mod exchange_rate;
pub mod personnel;
pub mod rate_source;
pub mod transaction;

mod retry;

pub use account::AccountStore;
pub use admin::{AuditReport, ClearScope, Confirmation, LedgerAdmin};
pub use exchange_rate::ExchangeRateProvider;
pub use personnel::{AdvancePayment, PayablePayment, PersonnelLedger, SalaryPayment};
pub use rate_source::{HttpRateSource, RateSource, RateSourceError, StaticRateSource, UnavailableRateSource};
pub use transaction::{CreatedTransaction, TransactionEngine};
