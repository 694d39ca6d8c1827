//! The storage seam.
//!
//! Services read through [`LedgerStore`] and write through one entry point,
//! [`LedgerStore::commit`], which applies a whole [`LedgerCommit`] atomically
//! and rejects it if any account version or transaction status changed since
//! it was read.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::Serialize;

use kasa_core::currency::ExchangeRate;
use kasa_core::ledger::{Account, AccountFilter, Transaction, TransactionFilter, TransactionStatus};
use kasa_core::personnel::{AdvanceRecord, Payable, Personnel, SalaryRecord};
use kasa_core::LedgerError;
use kasa_shared::types::{
    AccountId, AdvanceRecordId, Currency, PageRequest, PayableId, PersonnelId, SalaryRecordId,
    TransactionId,
};

use crate::error::StoreError;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// A clearable group of ledger records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    /// Accounts and their balances.
    Accounts,
    /// Transactions.
    Transactions,
    /// Cached and manual exchange rates.
    ExchangeRates,
    /// Personnel.
    Personnel,
    /// Salary payment records.
    SalaryRecords,
    /// Advance records.
    AdvanceRecords,
    /// Supplier payables.
    Payables,
}

impl Collection {
    /// Every collection, in stats order.
    pub const ALL: [Self; 7] = [
        Self::Accounts,
        Self::Transactions,
        Self::ExchangeRates,
        Self::Personnel,
        Self::SalaryRecords,
        Self::AdvanceRecords,
        Self::Payables,
    ];

    /// Wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Accounts => "accounts",
            Self::Transactions => "transactions",
            Self::ExchangeRates => "exchange_rates",
            Self::Personnel => "personnel",
            Self::SalaryRecords => "salary_records",
            Self::AdvanceRecords => "advance_records",
            Self::Payables => "payables",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Collection {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| LedgerError::UnknownCollection(s.to_string()))
    }
}

/// Account part of a commit.
#[derive(Debug, Clone)]
pub enum AccountWrite {
    /// A new account; fails if the ID or its default slot is taken.
    Insert(Account),
    /// Replaces the stored account if its version still equals `expected_version`.
    /// The store writes `expected_version + 1`.
    Update {
        /// The new snapshot.
        account: Account,
        /// Version the snapshot was read at.
        expected_version: i64,
    },
}

impl AccountWrite {
    /// The account being written.
    #[must_use]
    pub fn account(&self) -> &Account {
        match self {
            Self::Insert(account) | Self::Update { account, .. } => account,
        }
    }
}

/// Transaction part of a commit.
///
/// Status works as the version of a transaction: amount, type and accounts
/// never change, so a status check is enough to detect a concurrent writer.
#[derive(Debug, Clone)]
pub enum TransactionWrite {
    /// A new transaction; fails if the ID or number is taken.
    Insert(Transaction),
    /// Replaces the stored transaction if its status is still `expected_status`.
    Update {
        /// The new record.
        transaction: Transaction,
        /// Status the record was read with.
        expected_status: TransactionStatus,
    },
    /// Removes the transaction if its status is still `expected_status`.
    Delete {
        /// The transaction.
        id: TransactionId,
        /// Status the record was read with.
        expected_status: TransactionStatus,
    },
}

/// Personnel-side part of a commit.
#[derive(Debug, Clone)]
pub enum RecordWrite {
    /// Insert or replace a personnel record.
    UpsertPersonnel(Personnel),
    /// Insert a salary record.
    InsertSalary(SalaryRecord),
    /// Remove a salary record.
    DeleteSalary(SalaryRecordId),
    /// Insert an advance record.
    InsertAdvance(AdvanceRecord),
    /// Remove an advance record.
    DeleteAdvance(AdvanceRecordId),
    /// Insert a payable.
    InsertPayable(Payable),
}

/// Everything one ledger operation writes, applied all-or-nothing.
#[derive(Debug, Clone, Default)]
pub struct LedgerCommit {
    /// Account inserts and version-checked updates.
    pub accounts: Vec<AccountWrite>,
    /// At most one transaction write.
    pub transaction: Option<TransactionWrite>,
    /// Satellite record writes.
    pub records: Vec<RecordWrite>,
}

impl LedgerCommit {
    /// A commit with only account writes.
    #[must_use]
    pub fn accounts(accounts: Vec<AccountWrite>) -> Self {
        Self {
            accounts,
            ..Self::default()
        }
    }

    /// A commit with only record writes.
    #[must_use]
    pub fn records(records: Vec<RecordWrite>) -> Self {
        Self {
            records,
            ..Self::default()
        }
    }
}

/// A bulk clear, applied in one atomic operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClearPlan {
    /// Collections to empty.
    pub collections: BTreeSet<Collection>,
    /// Zero every remaining account's balances and bump its version.
    pub zero_balances: bool,
    /// Reset the transaction-number counters.
    pub reset_sequences: bool,
}

/// Storage backend for the ledger.
///
/// List methods return rows in a stable order: accounts by creation time,
/// transactions newest first.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Fetches one account.
    async fn get_account(&self, id: AccountId) -> Result<Option<Account>, StoreError>;

    /// Lists accounts matching the filter.
    async fn list_accounts(&self, filter: &AccountFilter) -> Result<Vec<Account>, StoreError>;

    /// Fetches one transaction.
    async fn get_transaction(&self, id: TransactionId) -> Result<Option<Transaction>, StoreError>;

    /// Lists transactions matching the filter, newest first, with the total
    /// number of matches.
    async fn list_transactions(
        &self,
        filter: &TransactionFilter,
        page: Option<&PageRequest>,
    ) -> Result<(Vec<Transaction>, u64), StoreError>;

    /// Atomically increments and returns the counter of `scope`. The first
    /// value of a scope is 1.
    async fn next_sequence(&self, scope: &str) -> Result<u64, StoreError>;

    /// Fetches the cached rate of a pair.
    async fn get_rate(&self, from: Currency, to: Currency) -> Result<Option<ExchangeRate>, StoreError>;

    /// Inserts or replaces the cached rate of a pair.
    async fn put_rate(&self, rate: &ExchangeRate) -> Result<(), StoreError>;

    /// Fetches one personnel record.
    async fn get_personnel(&self, id: PersonnelId) -> Result<Option<Personnel>, StoreError>;

    /// Lists personnel, optionally only active or inactive ones.
    async fn list_personnel(&self, is_active: Option<bool>) -> Result<Vec<Personnel>, StoreError>;

    /// Lists salary records, optionally for one employee.
    async fn list_salary_records(&self, personnel_id: Option<PersonnelId>) -> Result<Vec<SalaryRecord>, StoreError>;

    /// Lists advance records, optionally for one employee.
    async fn list_advance_records(&self, personnel_id: Option<PersonnelId>) -> Result<Vec<AdvanceRecord>, StoreError>;

    /// Fetches one payable.
    async fn get_payable(&self, id: PayableId) -> Result<Option<Payable>, StoreError>;

    /// Lists every payable.
    async fn list_payables(&self) -> Result<Vec<Payable>, StoreError>;

    /// Row count per collection.
    async fn counts(&self) -> Result<BTreeMap<Collection, u64>, StoreError>;

    /// Applies a commit atomically.
    ///
    /// Fails with [`StoreError::VersionConflict`] or [`StoreError::Duplicate`]
    /// without writing anything if any precondition does not hold.
    async fn commit(&self, commit: LedgerCommit) -> Result<(), StoreError>;

    /// Applies a bulk clear atomically.
    async fn clear(&self, plan: &ClearPlan) -> Result<(), StoreError>;
}
