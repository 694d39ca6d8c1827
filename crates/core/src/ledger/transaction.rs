//! Transaction aggregate.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use kasa_shared::types::{AccountId, Currency, PayableId, PersonnelId, TransactionId, UserId};

use super::error::LedgerError;
use super::types::{Category, ExpenseCategory, TransactionStatus, TransactionType, TransferDirection};

/// Counter side of a TRANSFER.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferDetails {
    /// The other account.
    pub counter_account_id: AccountId,
    /// Denormalised name of the other account.
    pub counter_account_name: String,
    /// Direction relative to the transaction's `account_id`.
    pub direction: TransferDirection,
    /// Currency on the counter side.
    pub counter_currency: Currency,
    /// Amount moved on the counter side.
    pub counter_amount: Decimal,
    /// Rate from the debited currency to the credited one (1 for same-currency).
    pub rate: Decimal,
}

/// Target side of an EXCHANGE.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExchangeDetails {
    /// Currency credited.
    pub to_currency: Currency,
    /// Amount credited.
    pub to_amount: Decimal,
    /// Rate applied (1 source = rate target).
    pub rate: Decimal,
}

/// An immutable record of a money movement.
///
/// Amount, type and accounts never change after creation; only `status`
/// moves, and only along `PENDING -> COMPLETED | CANCELLED`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transaction {
    /// Unique identifier.
    pub id: TransactionId,
    /// Human-readable unique number, e.g. `TRX-20240115-000042`.
    pub transaction_number: String,
    /// Transaction type.
    pub transaction_type: TransactionType,
    /// Current status.
    pub status: TransactionStatus,
    /// Amount in `currency`; always positive.
    pub amount: Decimal,
    /// Currency of `amount`.
    pub currency: Currency,
    /// Owning account.
    pub account_id: AccountId,
    /// Denormalised owning account name.
    pub account_name: String,
    /// Business date.
    pub transaction_date: NaiveDate,
    /// Description.
    pub description: String,
    /// Category (INCOME/EXPENSE only).
    pub category: Option<Category>,
    /// External reference.
    pub reference: Option<String>,
    /// Notes.
    pub notes: Option<String>,
    /// Present on TRANSFER.
    pub transfer: Option<TransferDetails>,
    /// Present on EXCHANGE.
    pub exchange: Option<ExchangeDetails>,
    /// Linked personnel record.
    pub personnel_id: Option<PersonnelId>,
    /// Denormalised personnel name.
    pub personnel_name: Option<String>,
    /// Free-text counterparty.
    pub supplier_name: Option<String>,
    /// Linked payable.
    pub payable_id: Option<PayableId>,
    /// Actor who created it.
    pub created_by: UserId,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// When the balance effect was applied.
    pub completed_at: Option<DateTime<Utc>>,
    /// When it was cancelled.
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl Transaction {
    /// Returns true if the transaction currently counts toward balances.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status.affects_balance()
    }

    /// Returns true if the transaction moves money on `account_id`, on either side.
    #[must_use]
    pub fn touches_account(&self, account_id: AccountId) -> bool {
        self.account_id == account_id
            || self
                .transfer
                .as_ref()
                .is_some_and(|t| t.counter_account_id == account_id)
    }

    /// Returns the expense category, if any.
    #[must_use]
    pub fn expense_category(&self) -> Option<ExpenseCategory> {
        self.category.as_ref().and_then(Category::expense)
    }

    /// Returns true for an expense tagged with `category`, in any status.
    #[must_use]
    pub fn is_expense_in(&self, category: ExpenseCategory) -> bool {
        self.transaction_type == TransactionType::Expense && self.expense_category() == Some(category)
    }

    /// Moves the transaction to a new status.
    ///
    /// # Errors
    ///
    /// Returns `INVALID_STATUS_TRANSITION` for anything but
    /// `PENDING -> COMPLETED | CANCELLED`.
    pub fn transition(&mut self, next: TransactionStatus, now: DateTime<Utc>) -> Result<(), LedgerError> {
        if !self.status.can_transition_to(next) {
            return Err(LedgerError::InvalidStatusTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        match next {
            TransactionStatus::Completed => self.completed_at = Some(now),
            TransactionStatus::Cancelled => self.cancelled_at = Some(now),
            TransactionStatus::Pending => {}
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use chrono::Utc;

    /// A COMPLETED INCOME/EXPENSE transaction on one account.
    pub(crate) fn simple(
        transaction_type: TransactionType,
        account_id: AccountId,
        amount: Decimal,
        currency: Currency,
    ) -> Transaction {
        let now = Utc::now();
        Transaction {
            id: TransactionId::new(),
            transaction_number: format!("TRX-{}", TransactionId::new()),
            transaction_type,
            status: TransactionStatus::Completed,
            amount,
            currency,
            account_id,
            account_name: "Test".to_string(),
            transaction_date: now.date_naive(),
            description: String::new(),
            category: None,
            reference: None,
            notes: None,
            transfer: None,
            exchange: None,
            personnel_id: None,
            personnel_name: None,
            supplier_name: None,
            payable_id: None,
            created_by: UserId::new(),
            created_at: now,
            completed_at: Some(now),
            cancelled_at: None,
        }
    }
}
