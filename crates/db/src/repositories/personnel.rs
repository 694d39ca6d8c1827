//! Personnel, salary, advance and payable operations.
//!
//! Payments are EXPENSE transactions created through the
//! [`TransactionEngine`]; the satellite record is committed in the same
//! atomic unit as the transaction it points at.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::info;

use kasa_core::LedgerError;
use kasa_core::ledger::{
    CreateTransactionInput, ExpenseCategory, Transaction, TransactionFilter, TransactionType, validate_amount,
};
use kasa_core::personnel::{
    AdvanceRecord, AdvanceReport, CreatePayableInput, CreatePersonnelInput, PayAdvanceInput, PayPayableInput,
    PaySalaryInput, Payable, PayableView, Personnel, RecordAdvanceInput, SalaryRecord, reconcile_advances,
};
use kasa_shared::types::{AdvanceRecordId, PayableId, PersonnelId, SalaryRecordId, UserId};

use super::transaction::{CreatedTransaction, TransactionEngine};
use crate::store::{LedgerCommit, LedgerStore, RecordWrite};

/// A salary payment: the expense and its salary record.
#[derive(Debug, Clone, Serialize)]
pub struct SalaryPayment {
    /// The EXPENSE transaction.
    #[serde(flatten)]
    pub created: CreatedTransaction,
    /// The salary record pointing at it.
    pub record: SalaryRecord,
}

/// An advance payment: the expense and its advance record.
#[derive(Debug, Clone, Serialize)]
pub struct AdvancePayment {
    /// The EXPENSE transaction.
    #[serde(flatten)]
    pub created: CreatedTransaction,
    /// The advance record pointing at it.
    pub record: AdvanceRecord,
}

/// A payable payment and the payable's settlement after it.
#[derive(Debug, Clone, Serialize)]
pub struct PayablePayment {
    /// The EXPENSE transaction.
    #[serde(flatten)]
    pub created: CreatedTransaction,
    /// Settlement after this payment.
    pub payable: PayableView,
}

/// Personnel and supplier-side ledger operations.
#[derive(Clone)]
pub struct PersonnelLedger {
    store: Arc<dyn LedgerStore>,
    engine: TransactionEngine,
}

impl PersonnelLedger {
    /// Creates a new personnel service on top of the transaction engine.
    #[must_use]
    pub fn new(store: Arc<dyn LedgerStore>, engine: TransactionEngine) -> Self {
        Self { store, engine }
    }

    // ========================================================================
    // Personnel
    // ========================================================================

    /// Adds an employee.
    ///
    /// # Errors
    ///
    /// `INVALID_RECORD` or `INVALID_AMOUNT`.
    pub async fn create_personnel(&self, input: CreatePersonnelInput) -> Result<Personnel, LedgerError> {
        let personnel = Personnel::new(&input, Utc::now())?;
        self.store
            .commit(LedgerCommit::records(vec![RecordWrite::UpsertPersonnel(personnel.clone())]))
            .await?;
        info!(personnel_id = %personnel.id, name = %personnel.name, "Personnel created");
        Ok(personnel)
    }

    /// Fetches one employee.
    ///
    /// # Errors
    ///
    /// `PERSONNEL_NOT_FOUND`.
    pub async fn get_personnel(&self, id: PersonnelId) -> Result<Personnel, LedgerError> {
        self.store
            .get_personnel(id)
            .await?
            .ok_or(LedgerError::PersonnelNotFound(id))
    }

    /// Lists employees by name.
    ///
    /// # Errors
    ///
    /// Storage failures only.
    pub async fn list_personnel(&self, is_active: Option<bool>) -> Result<Vec<Personnel>, LedgerError> {
        Ok(self.store.list_personnel(is_active).await?)
    }

    /// Marks an employee inactive. Their history stays.
    ///
    /// # Errors
    ///
    /// `PERSONNEL_NOT_FOUND`.
    pub async fn deactivate_personnel(&self, id: PersonnelId) -> Result<Personnel, LedgerError> {
        let mut personnel = self.get_personnel(id).await?;
        personnel.is_active = false;
        personnel.updated_at = Utc::now();
        self.store
            .commit(LedgerCommit::records(vec![RecordWrite::UpsertPersonnel(personnel.clone())]))
            .await?;
        info!(personnel_id = %id, "Personnel deactivated");
        Ok(personnel)
    }

    async fn active_personnel(&self, id: PersonnelId) -> Result<Personnel, LedgerError> {
        let personnel = self.get_personnel(id).await?;
        if !personnel.is_active {
            return Err(LedgerError::InvalidRecord(format!("personnel {id} is inactive")));
        }
        Ok(personnel)
    }

    /// Salary records, optionally for one employee.
    ///
    /// # Errors
    ///
    /// Storage failures only.
    pub async fn list_salary_records(&self, id: Option<PersonnelId>) -> Result<Vec<SalaryRecord>, LedgerError> {
        Ok(self.store.list_salary_records(id).await?)
    }

    // ========================================================================
    // Salary and advances
    // ========================================================================

    /// Pays a salary, bonus or SSK contribution.
    ///
    /// # Errors
    ///
    /// `PERSONNEL_NOT_FOUND`, `INVALID_RECORD`, `INVALID_CATEGORY` and every
    /// transaction creation failure.
    pub async fn pay_salary(
        &self,
        personnel_id: PersonnelId,
        input: PaySalaryInput,
        actor: UserId,
    ) -> Result<SalaryPayment, LedgerError> {
        let category = input.check()?;
        let personnel = self.active_personnel(personnel_id).await?;
        let currency = input.currency.unwrap_or(personnel.salary_currency);

        let mut tx_input =
            CreateTransactionInput::simple(TransactionType::Expense, input.account_id, input.net_amount, currency);
        tx_input.category = Some(category.as_str().to_string());
        tx_input.description = format!("{} {} {}", category.as_str(), personnel.name, input.period);
        tx_input.transaction_date = input.transaction_date;
        tx_input.notes.clone_from(&input.notes);
        tx_input.personnel_id = Some(personnel.id);
        tx_input.personnel_name = Some(personnel.name.clone());

        let record_id = SalaryRecordId::new();
        let record = |tx: &Transaction| SalaryRecord {
            id: record_id,
            personnel_id,
            transaction_id: tx.id,
            period: input.period.clone(),
            category,
            gross_amount: input.gross_amount,
            net_amount: input.net_amount,
            currency,
            created_at: tx.created_at,
        };

        let created = self
            .engine
            .create_linked(tx_input, actor, |tx| vec![RecordWrite::InsertSalary(record(tx))])
            .await?;

        info!(
            personnel_id = %personnel_id,
            period = %input.period,
            category = category.as_str(),
            amount = %input.net_amount,
            "Salary paid"
        );
        Ok(SalaryPayment {
            record: record(&created.transaction),
            created,
        })
    }

    /// Pays out an advance.
    ///
    /// # Errors
    ///
    /// `PERSONNEL_NOT_FOUND`, `INVALID_RECORD` and every transaction
    /// creation failure.
    pub async fn pay_advance(
        &self,
        personnel_id: PersonnelId,
        input: PayAdvanceInput,
        actor: UserId,
    ) -> Result<AdvancePayment, LedgerError> {
        validate_amount(input.amount)?;
        let personnel = self.active_personnel(personnel_id).await?;
        let currency = input.currency.unwrap_or(personnel.salary_currency);

        let mut tx_input =
            CreateTransactionInput::simple(TransactionType::Expense, input.account_id, input.amount, currency);
        tx_input.category = Some(ExpenseCategory::Advance.as_str().to_string());
        tx_input.description = input
            .description
            .clone()
            .unwrap_or_else(|| format!("ADVANCE {}", personnel.name));
        tx_input.transaction_date = input.transaction_date;
        tx_input.personnel_id = Some(personnel.id);
        tx_input.personnel_name = Some(personnel.name.clone());

        let record_id = AdvanceRecordId::new();
        let record = |tx: &Transaction| AdvanceRecord {
            id: record_id,
            personnel_id,
            transaction_id: Some(tx.id),
            amount: input.amount,
            currency,
            advance_date: tx.transaction_date,
            description: input.description.clone(),
            created_at: tx.created_at,
        };

        let created = self
            .engine
            .create_linked(tx_input, actor, |tx| vec![RecordWrite::InsertAdvance(record(tx))])
            .await?;

        info!(personnel_id = %personnel_id, amount = %input.amount, %currency, "Advance paid");
        Ok(AdvancePayment {
            record: record(&created.transaction),
            created,
        })
    }

    /// Stores an advance that was paid outside the ledger. No money moves.
    ///
    /// # Errors
    ///
    /// `PERSONNEL_NOT_FOUND` or `INVALID_AMOUNT`.
    pub async fn record_advance(
        &self,
        personnel_id: PersonnelId,
        input: RecordAdvanceInput,
    ) -> Result<AdvanceRecord, LedgerError> {
        validate_amount(input.amount)?;
        self.get_personnel(personnel_id).await?;

        let record = AdvanceRecord {
            id: AdvanceRecordId::new(),
            personnel_id,
            transaction_id: None,
            amount: input.amount,
            currency: input.currency,
            advance_date: input.advance_date,
            description: input.description,
            created_at: Utc::now(),
        };
        self.store
            .commit(LedgerCommit::records(vec![RecordWrite::InsertAdvance(record.clone())]))
            .await?;
        info!(personnel_id = %personnel_id, record_id = %record.id, "Advance recorded without transaction");
        Ok(record)
    }

    /// Reconciles advance records with ADVANCE expenses.
    ///
    /// # Errors
    ///
    /// Storage failures only.
    pub async fn advance_report(&self, personnel_id: Option<PersonnelId>) -> Result<AdvanceReport, LedgerError> {
        let filter = TransactionFilter {
            transaction_type: Some(TransactionType::Expense),
            category: Some(ExpenseCategory::Advance.as_str().to_string()),
            personnel_id,
            ..TransactionFilter::default()
        };
        let transactions = self.engine.list_all(&filter).await?;
        let records = self.store.list_advance_records(personnel_id).await?;
        Ok(reconcile_advances(&transactions, &records))
    }

    // ========================================================================
    // Payables
    // ========================================================================

    /// Registers an amount owed to a supplier.
    ///
    /// # Errors
    ///
    /// `INVALID_RECORD` or `INVALID_AMOUNT`.
    pub async fn create_payable(&self, input: CreatePayableInput, actor: UserId) -> Result<Payable, LedgerError> {
        let payable = Payable::new(&input, actor, Utc::now())?;
        self.store
            .commit(LedgerCommit::records(vec![RecordWrite::InsertPayable(payable.clone())]))
            .await?;
        info!(
            payable_id = %payable.id,
            supplier = %payable.supplier_name,
            amount = %payable.amount,
            currency = %payable.currency,
            "Payable created"
        );
        Ok(payable)
    }

    /// A payable with its current settlement.
    ///
    /// # Errors
    ///
    /// `PAYABLE_NOT_FOUND`.
    pub async fn get_payable(&self, id: PayableId) -> Result<PayableView, LedgerError> {
        let payable = self
            .store
            .get_payable(id)
            .await?
            .ok_or(LedgerError::PayableNotFound(id))?;
        let payments = self.payments(Some(id)).await?;
        Ok(PayableView::from_payments(payable, &payments))
    }

    /// Pays all or part of a payable's open amount.
    ///
    /// # Errors
    ///
    /// `PAYABLE_NOT_FOUND`, `PAYABLE_ALREADY_PAID`, `INVALID_RECORD` for a
    /// payment above the open amount, and every transaction creation failure.
    pub async fn pay_payable(
        &self,
        id: PayableId,
        input: PayPayableInput,
        actor: UserId,
    ) -> Result<PayablePayment, LedgerError> {
        let view = self.get_payable(id).await?;
        if view.open_amount.is_zero() {
            return Err(LedgerError::PayableAlreadyPaid(id));
        }
        let amount = input.amount.unwrap_or(view.open_amount);
        validate_amount(amount)?;
        if amount > view.open_amount {
            return Err(LedgerError::InvalidRecord(format!(
                "payment {amount} exceeds open amount {}",
                view.open_amount
            )));
        }

        let payable = view.payable;
        let mut tx_input =
            CreateTransactionInput::simple(TransactionType::Expense, input.account_id, amount, payable.currency);
        tx_input.category = Some(ExpenseCategory::Supplier.as_str().to_string());
        tx_input.description = payable
            .description
            .clone()
            .unwrap_or_else(|| format!("Payment to {}", payable.supplier_name));
        tx_input.transaction_date = input.transaction_date;
        tx_input.notes = input.notes;
        tx_input.supplier_name = Some(payable.supplier_name.clone());
        tx_input.payable_id = Some(id);

        let created = self.engine.create(tx_input, actor).await?;
        let view = self.get_payable(id).await?;

        info!(
            payable_id = %id,
            amount = %amount,
            open_amount = %view.open_amount,
            actor = %actor,
            "Payable paid"
        );
        Ok(PayablePayment { created, payable: view })
    }

    /// Lists payables with their settlement, optionally only those still open.
    ///
    /// # Errors
    ///
    /// Storage failures only.
    pub async fn list_payables(&self, open_only: bool) -> Result<Vec<PayableView>, LedgerError> {
        let payables = self.store.list_payables().await?;
        let mut by_payable: HashMap<PayableId, Vec<Transaction>> = HashMap::new();
        for tx in self.payments(None).await? {
            if let Some(id) = tx.payable_id {
                by_payable.entry(id).or_default().push(tx);
            }
        }

        Ok(payables
            .into_iter()
            .map(|payable| {
                let payments = by_payable.get(&payable.id).map(Vec::as_slice).unwrap_or_default();
                PayableView::from_payments(payable, payments)
            })
            .filter(|view| !open_only || !view.open_amount.is_zero())
            .collect())
    }

    async fn payments(&self, payable_id: Option<PayableId>) -> Result<Vec<Transaction>, LedgerError> {
        let filter = TransactionFilter {
            transaction_type: Some(TransactionType::Expense),
            payable_id,
            ..TransactionFilter::default()
        };
        self.engine.list_all(&filter).await
    }
}
