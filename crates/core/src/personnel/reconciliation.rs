//! Advance reconciliation.
//!
//! COMPLETED EXPENSE transactions tagged ADVANCE are the money that actually
//! moved. Advance records are matched against them and anything unmatched is
//! reported, never silently merged into the totals.

use std::collections::{BTreeMap, HashSet};

use rust_decimal::Decimal;
use serde::Serialize;

use kasa_shared::types::{AdvanceRecordId, Currency, PersonnelId, TransactionId};

use crate::ledger::{ExpenseCategory, Transaction, TransactionType};

use super::types::AdvanceRecord;

/// How one side of the reconciliation lines up with the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReconciliationStatus {
    /// Record and transaction agree.
    Matched,
    /// A record exists but no completed advance transaction backs it.
    RecordWithoutTransaction,
    /// An advance was paid but nobody recorded it.
    TransactionWithoutRecord,
}

/// One row of the advance report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdvanceReportEntry {
    /// Employee, from the transaction when present, else the record.
    pub personnel_id: Option<PersonnelId>,
    /// The advance transaction.
    pub transaction_id: Option<TransactionId>,
    /// The advance record.
    pub record_id: Option<AdvanceRecordId>,
    /// Amount; the transaction's when present.
    pub amount: Decimal,
    /// Currency of `amount`.
    pub currency: Currency,
    /// Match outcome.
    pub status: ReconciliationStatus,
}

/// Reconciled advances.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AdvanceReport {
    /// Every transaction and record, reconciled.
    pub entries: Vec<AdvanceReportEntry>,
    /// Σ COMPLETED advance transactions per currency.
    pub totals: BTreeMap<Currency, Decimal>,
    /// Σ records with no backing transaction per currency.
    pub unreconciled_records: BTreeMap<Currency, Decimal>,
}

impl AdvanceReport {
    /// True when every record and transaction matched.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.entries
            .iter()
            .all(|e| e.status == ReconciliationStatus::Matched)
    }
}

fn is_advance(tx: &Transaction) -> bool {
    tx.is_completed()
        && tx.transaction_type == TransactionType::Expense
        && tx.expense_category() == Some(ExpenseCategory::Advance)
}

/// Reconciles advance records against advance transactions.
///
/// Non-advance transactions in `transactions` are ignored, so callers can pass
/// a broader listing. A record whose transaction was deleted or is not yet
/// COMPLETED is reported as `RecordWithoutTransaction`.
#[must_use]
pub fn reconcile_advances<'a>(
    transactions: impl IntoIterator<Item = &'a Transaction>,
    records: impl IntoIterator<Item = &'a AdvanceRecord>,
) -> AdvanceReport {
    let advances: Vec<&Transaction> = transactions.into_iter().filter(|tx| is_advance(tx)).collect();
    let records: Vec<&AdvanceRecord> = records.into_iter().collect();

    let recorded: HashSet<TransactionId> = records.iter().filter_map(|r| r.transaction_id).collect();
    let paid: HashSet<TransactionId> = advances.iter().map(|tx| tx.id).collect();

    let mut report = AdvanceReport::default();

    for tx in &advances {
        *report.totals.entry(tx.currency).or_default() += tx.amount;
        let record = records.iter().find(|r| r.transaction_id == Some(tx.id));
        report.entries.push(AdvanceReportEntry {
            personnel_id: tx.personnel_id.or_else(|| record.map(|r| r.personnel_id)),
            transaction_id: Some(tx.id),
            record_id: record.map(|r| r.id),
            amount: tx.amount,
            currency: tx.currency,
            status: if recorded.contains(&tx.id) {
                ReconciliationStatus::Matched
            } else {
                ReconciliationStatus::TransactionWithoutRecord
            },
        });
    }

    for record in records
        .iter()
        .filter(|r| r.transaction_id.is_none_or(|id| !paid.contains(&id)))
    {
        *report.unreconciled_records.entry(record.currency).or_default() += record.amount;
        report.entries.push(AdvanceReportEntry {
            personnel_id: Some(record.personnel_id),
            transaction_id: None,
            record_id: Some(record.id),
            amount: record.amount,
            currency: record.currency,
            status: ReconciliationStatus::RecordWithoutTransaction,
        });
    }

    report
}
