//! Transaction engine: creation, status transitions and deletion.
//!
//! Every balance change follows the same optimistic cycle:
//! 1. Read the touched accounts (with their versions) and the transaction
//! 2. Let [`BalanceMutator`] apply or reverse the deltas on those snapshots
//! 3. Commit the snapshots and the transaction write as one [`LedgerCommit`]
//! 4. On a version conflict, start over from step 1
//!
//! Rates and transaction numbers are resolved once, before the cycle, so a
//! retry never refetches a rate or burns another sequence value.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

use kasa_core::LedgerError;
use kasa_core::currency::{currency_info, convert_to, invert_amount};
use kasa_core::ledger::{
    Account, AccountMode, BalanceMutator, Category, CreateTransactionInput, ExchangeDetails, ExchangeInput,
    OverdraftPolicy, Transaction, TransactionFilter, TransactionStatus, TransactionSummary, TransferDetails,
    TransferDirection, TransferInput, check_transaction_input, format_transaction_number, sequence_scope, summarize,
};
use kasa_shared::LedgerConfig;
use kasa_shared::types::{AccountId, PageRequest, PageResponse, TransactionId, UserId};

use super::exchange_rate::ExchangeRateProvider;
use super::retry::with_optimistic_retry;
use crate::error::StoreError;
use crate::store::{AccountWrite, LedgerCommit, LedgerStore, RecordWrite, TransactionWrite};

/// Result of a successful create.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedTransaction {
    /// The generated `TRX-YYYYMMDD-NNNNNN` number.
    pub transaction_number: String,
    /// The stored transaction.
    pub transaction: Transaction,
}

/// Everything about a new transaction that is fixed before the retry loop.
struct Plan {
    id: TransactionId,
    number: String,
    date: NaiveDate,
    category: Option<Category>,
    status: TransactionStatus,
    transfer: Option<TransferDetails>,
    exchange: Option<ExchangeDetails>,
}

/// Owns transaction records and orchestrates balance mutation.
#[derive(Clone)]
pub struct TransactionEngine {
    store: Arc<dyn LedgerStore>,
    rates: ExchangeRateProvider,
    config: LedgerConfig,
    policy: OverdraftPolicy,
}

impl TransactionEngine {
    /// Creates a new engine.
    #[must_use]
    pub fn new(store: Arc<dyn LedgerStore>, rates: ExchangeRateProvider, config: LedgerConfig) -> Self {
        let policy = OverdraftPolicy::from_allow_negative(config.allow_negative_balance);
        Self {
            store,
            rates,
            config,
            policy,
        }
    }

    async fn retry<T, F, Fut>(&self, operation: &'static str, attempt: F) -> Result<T, LedgerError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, StoreError>>,
    {
        with_optimistic_retry(operation, self.config.max_retries, self.config.retry_backoff_ms, attempt).await
    }

    // ========================================================================
    // Create
    // ========================================================================

    /// Records a transaction and, unless it is PENDING, applies its balance
    /// effect in the same commit.
    ///
    /// # Errors
    ///
    /// `INVALID_AMOUNT`, `UNSUPPORTED_CURRENCY`, `ACCOUNT_NOT_FOUND`,
    /// `ACCOUNT_INACTIVE`, `RATE_UNAVAILABLE`, `INSUFFICIENT_BALANCE`,
    /// `CONCURRENT_UPDATE_CONFLICT` and the input shape errors of
    /// [`check_transaction_input`].
    pub async fn create(&self, input: CreateTransactionInput, actor: UserId) -> Result<CreatedTransaction, LedgerError> {
        self.create_linked(input, actor, |_| Vec::new()).await
    }

    /// Like [`Self::create`], committing the records built by `records` in
    /// the same atomic unit as the transaction.
    pub(crate) async fn create_linked<R>(
        &self,
        input: CreateTransactionInput,
        actor: UserId,
        records: R,
    ) -> Result<CreatedTransaction, LedgerError>
    where
        R: Fn(&Transaction) -> Vec<RecordWrite> + Sync,
    {
        let plan = self.prepare(&input).await?;

        let transaction = self
            .retry("create_transaction", || self.create_attempt(&input, &plan, actor, &records))
            .await?;

        info!(
            transaction_id = %transaction.id,
            transaction_number = %transaction.transaction_number,
            transaction_type = ?transaction.transaction_type,
            status = %transaction.status,
            amount = %transaction.amount,
            currency = %transaction.currency,
            account_id = %transaction.account_id,
            actor = %actor,
            "Transaction created"
        );
        Ok(CreatedTransaction {
            transaction_number: transaction.transaction_number.clone(),
            transaction,
        })
    }

    async fn prepare(&self, input: &CreateTransactionInput) -> Result<Plan, LedgerError> {
        let checked = check_transaction_input(input)?;

        let account = self.load_active(input.account_id).await?;
        account.ensure_supports(input.currency)?;

        let transfer = match &input.transfer {
            Some(transfer) => Some(self.plan_transfer(input, transfer).await?),
            None => None,
        };
        let exchange = match &input.exchange {
            Some(exchange) => Some(self.plan_exchange(&account, input, exchange).await?),
            None => None,
        };

        let date = input.transaction_date.unwrap_or_else(|| Utc::now().date_naive());
        let prefix = &self.config.transaction_number_prefix;
        let sequence = self.store.next_sequence(&sequence_scope(prefix, date)).await?;

        Ok(Plan {
            id: TransactionId::new(),
            number: format_transaction_number(prefix, date, sequence),
            date,
            category: checked.category,
            status: checked.status,
            transfer,
            exchange,
        })
    }

    /// Resolves the counter side of a transfer: its currency, rate and amount.
    ///
    /// The rate always converts the debited currency into the credited one.
    async fn plan_transfer(
        &self,
        input: &CreateTransactionInput,
        transfer: &TransferInput,
    ) -> Result<TransferDetails, LedgerError> {
        let counter = self.load_active(transfer.counter_account_id).await?;
        let counter_currency = transfer.counter_currency.unwrap_or(if counter.supports(input.currency) {
            input.currency
        } else {
            counter.currency
        });
        counter.ensure_supports(counter_currency)?;

        let (rate, counter_amount) = if counter_currency == input.currency {
            (Decimal::ONE, input.amount)
        } else {
            let (debited, credited) = match transfer.direction {
                TransferDirection::Out => (input.currency, counter_currency),
                TransferDirection::In => (counter_currency, input.currency),
            };
            let rate = match transfer.rate {
                Some(rate) => rate,
                None => self.rates.get_rate(debited, credited).await?.rate,
            };
            let converted = match transfer.direction {
                TransferDirection::Out => convert_to(input.amount, rate, counter_currency),
                TransferDirection::In => {
                    invert_amount(input.amount, rate, currency_info(counter_currency).decimal_places)
                }
            };
            let counter_amount = converted
                .ok_or_else(|| LedgerError::Internal(format!("overflow converting {}", input.amount)))?;
            (rate, counter_amount)
        };
        if counter_amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(counter_amount));
        }

        Ok(TransferDetails {
            counter_account_id: counter.id,
            counter_account_name: counter.name,
            direction: transfer.direction,
            counter_currency,
            counter_amount,
            rate,
        })
    }

    async fn plan_exchange(
        &self,
        account: &Account,
        input: &CreateTransactionInput,
        exchange: &ExchangeInput,
    ) -> Result<ExchangeDetails, LedgerError> {
        if account.mode != AccountMode::Multi {
            return Err(LedgerError::ExchangeRequiresMulti(account.id));
        }
        account.ensure_supports(exchange.to_currency)?;

        let rate = match exchange.rate {
            Some(rate) => rate,
            None => self.rates.get_rate(input.currency, exchange.to_currency).await?.rate,
        };
        let to_amount = convert_to(input.amount, rate, exchange.to_currency)
            .ok_or_else(|| LedgerError::Internal(format!("overflow converting {}", input.amount)))?;
        if to_amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(to_amount));
        }

        Ok(ExchangeDetails {
            to_currency: exchange.to_currency,
            to_amount,
            rate,
        })
    }

    async fn create_attempt<R>(
        &self,
        input: &CreateTransactionInput,
        plan: &Plan,
        actor: UserId,
        records: &R,
    ) -> Result<Transaction, StoreError>
    where
        R: Fn(&Transaction) -> Vec<RecordWrite> + Sync,
    {
        let now = Utc::now();
        let account = self.load_active(input.account_id).await?;
        account.ensure_supports(input.currency)?;

        let transfer = match &plan.transfer {
            Some(planned) => {
                let counter = self.load_active(planned.counter_account_id).await?;
                Some(TransferDetails {
                    counter_account_name: counter.name,
                    ..planned.clone()
                })
            }
            None => None,
        };

        let transaction = Transaction {
            id: plan.id,
            transaction_number: plan.number.clone(),
            transaction_type: input.transaction_type,
            status: plan.status,
            amount: input.amount,
            currency: input.currency,
            account_id: account.id,
            account_name: account.name.clone(),
            transaction_date: plan.date,
            description: input.description.trim().to_string(),
            category: plan.category.clone(),
            reference: input.reference.clone(),
            notes: input.notes.clone(),
            transfer,
            exchange: plan.exchange.clone(),
            personnel_id: input.personnel_id,
            personnel_name: input.personnel_name.clone(),
            supplier_name: input.supplier_name.clone(),
            payable_id: input.payable_id,
            created_by: actor,
            created_at: now,
            completed_at: (plan.status == TransactionStatus::Completed).then_some(now),
            cancelled_at: None,
        };

        let accounts = if transaction.is_completed() {
            let mut snapshots = self.load_touched(&transaction, true).await?;
            BalanceMutator::apply(&transaction, &mut snapshots, self.policy)?;
            account_updates(snapshots, now)
        } else {
            Vec::new()
        };

        self.store
            .commit(LedgerCommit {
                accounts,
                transaction: Some(TransactionWrite::Insert(transaction.clone())),
                records: records(&transaction),
            })
            .await?;
        Ok(transaction)
    }

    // ========================================================================
    // Status transitions
    // ========================================================================

    /// Moves a PENDING transaction to COMPLETED and applies its effect.
    ///
    /// # Errors
    ///
    /// `TRANSACTION_NOT_FOUND`, `INVALID_STATUS_TRANSITION`,
    /// `ACCOUNT_INACTIVE`, `INSUFFICIENT_BALANCE`, `CONCURRENT_UPDATE_CONFLICT`.
    pub async fn complete(&self, id: TransactionId, actor: UserId) -> Result<Transaction, LedgerError> {
        let transaction = self
            .retry("complete_transaction", || self.transition_attempt(id, TransactionStatus::Completed))
            .await?;
        info!(transaction_id = %id, actor = %actor, "Transaction completed");
        Ok(transaction)
    }

    /// Moves a PENDING transaction to CANCELLED. Balances are untouched.
    ///
    /// # Errors
    ///
    /// `TRANSACTION_NOT_FOUND`, `INVALID_STATUS_TRANSITION`,
    /// `CONCURRENT_UPDATE_CONFLICT`.
    pub async fn cancel(&self, id: TransactionId, actor: UserId) -> Result<Transaction, LedgerError> {
        let transaction = self
            .retry("cancel_transaction", || self.transition_attempt(id, TransactionStatus::Cancelled))
            .await?;
        info!(transaction_id = %id, actor = %actor, "Transaction cancelled");
        Ok(transaction)
    }

    async fn transition_attempt(&self, id: TransactionId, next: TransactionStatus) -> Result<Transaction, StoreError> {
        let mut transaction = self.load_transaction(id).await?;
        let expected_status = transaction.status;
        let now = Utc::now();
        transaction.transition(next, now)?;

        let accounts = if transaction.is_completed() {
            let mut snapshots = self.load_touched(&transaction, true).await?;
            BalanceMutator::apply(&transaction, &mut snapshots, self.policy)?;
            account_updates(snapshots, now)
        } else {
            Vec::new()
        };

        self.store
            .commit(LedgerCommit {
                accounts,
                transaction: Some(TransactionWrite::Update {
                    transaction: transaction.clone(),
                    expected_status,
                }),
                records: Vec::new(),
            })
            .await?;
        Ok(transaction)
    }

    // ========================================================================
    // Delete
    // ========================================================================

    /// Deletes a transaction. A COMPLETED one has its effect reversed in the
    /// same commit; salary and advance records pointing at it go with it.
    ///
    /// Reversal ignores the overdraft policy and account activity.
    ///
    /// # Errors
    ///
    /// `TRANSACTION_NOT_FOUND`, `CONCURRENT_UPDATE_CONFLICT`.
    pub async fn delete(&self, id: TransactionId, actor: UserId) -> Result<(), LedgerError> {
        let reversed = self.retry("delete_transaction", || self.delete_attempt(id)).await?;
        info!(transaction_id = %id, reversed, actor = %actor, "Transaction deleted");
        Ok(())
    }

    async fn delete_attempt(&self, id: TransactionId) -> Result<bool, StoreError> {
        let transaction = self.load_transaction(id).await?;
        let reversed = transaction.is_completed();

        let accounts = if reversed {
            let mut snapshots = self.load_touched(&transaction, false).await?;
            BalanceMutator::reverse(&transaction, &mut snapshots)?;
            account_updates(snapshots, Utc::now())
        } else {
            Vec::new()
        };

        let mut records = Vec::new();
        if let Some(personnel_id) = transaction.personnel_id {
            let salaries = self.store.list_salary_records(Some(personnel_id)).await?;
            records.extend(
                salaries
                    .into_iter()
                    .filter(|r| r.transaction_id == id)
                    .map(|r| RecordWrite::DeleteSalary(r.id)),
            );
            let advances = self.store.list_advance_records(Some(personnel_id)).await?;
            records.extend(
                advances
                    .into_iter()
                    .filter(|r| r.transaction_id == Some(id))
                    .map(|r| RecordWrite::DeleteAdvance(r.id)),
            );
        }

        self.store
            .commit(LedgerCommit {
                accounts,
                transaction: Some(TransactionWrite::Delete {
                    id,
                    expected_status: transaction.status,
                }),
                records,
            })
            .await?;
        Ok(reversed)
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Fetches one transaction.
    ///
    /// # Errors
    ///
    /// `TRANSACTION_NOT_FOUND`.
    pub async fn get(&self, id: TransactionId) -> Result<Transaction, LedgerError> {
        Ok(self.load_transaction(id).await?)
    }

    /// Lists matching transactions, newest first.
    ///
    /// # Errors
    ///
    /// Storage failures only.
    pub async fn list(
        &self,
        filter: &TransactionFilter,
        page: &PageRequest,
    ) -> Result<PageResponse<Transaction>, LedgerError> {
        let page = page.normalized();
        let (rows, total) = self.store.list_transactions(filter, Some(&page)).await?;
        Ok(PageResponse::new(rows, page.page, page.per_page, total))
    }

    /// Every matching transaction, newest first, unpaginated.
    ///
    /// # Errors
    ///
    /// Storage failures only.
    pub async fn list_all(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>, LedgerError> {
        Ok(self.store.list_transactions(filter, None).await?.0)
    }

    /// Income, expense and net per currency over COMPLETED transactions.
    ///
    /// # Errors
    ///
    /// Storage failures only.
    pub async fn summarize(&self, filter: &TransactionFilter) -> Result<TransactionSummary, LedgerError> {
        let transactions = self.list_all(filter).await?;
        Ok(summarize(&transactions))
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    async fn load_transaction(&self, id: TransactionId) -> Result<Transaction, StoreError> {
        Ok(self
            .store
            .get_transaction(id)
            .await?
            .ok_or(LedgerError::TransactionNotFound(id))?)
    }

    async fn load_active(&self, id: AccountId) -> Result<Account, StoreError> {
        let account = self
            .store
            .get_account(id)
            .await?
            .ok_or(LedgerError::AccountNotFound(id))?;
        if !account.is_active {
            return Err(LedgerError::AccountInactive(id).into());
        }
        Ok(account)
    }

    /// Fresh snapshots of every account the transaction moves money on.
    async fn load_touched(
        &self,
        transaction: &Transaction,
        require_active: bool,
    ) -> Result<BTreeMap<AccountId, Account>, StoreError> {
        let mut ids = vec![transaction.account_id];
        if let Some(transfer) = &transaction.transfer {
            ids.push(transfer.counter_account_id);
        }

        let mut snapshots = BTreeMap::new();
        for id in ids {
            let account = if require_active {
                self.load_active(id).await?
            } else {
                self.store
                    .get_account(id)
                    .await?
                    .ok_or(LedgerError::AccountNotFound(id))?
            };
            snapshots.insert(id, account);
        }
        Ok(snapshots)
    }
}

/// Version-checked writes for mutated snapshots.
fn account_updates(snapshots: BTreeMap<AccountId, Account>, now: DateTime<Utc>) -> Vec<AccountWrite> {
    snapshots
        .into_values()
        .map(|mut account| {
            account.updated_at = now;
            AccountWrite::Update {
                expected_version: account.version,
                account,
            }
        })
        .collect()
}
