//! In-memory store.
//!
//! One `tokio` `RwLock` guards every collection, so a commit checks and
//! applies all its writes under a single write lock. Used for tests and for
//! running the server without a database.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use kasa_core::currency::ExchangeRate;
use kasa_core::ledger::{Account, AccountFilter, Transaction, TransactionFilter};
use kasa_core::personnel::{AdvanceRecord, Payable, Personnel, SalaryRecord};
use kasa_shared::types::{
    AccountId, AdvanceRecordId, Currency, PageRequest, PayableId, PersonnelId, SalaryRecordId,
    TransactionId,
};

use super::{AccountWrite, ClearPlan, Collection, LedgerCommit, LedgerStore, RecordWrite, TransactionWrite};
use crate::error::StoreError;

#[derive(Debug, Default)]
struct State {
    accounts: BTreeMap<AccountId, Account>,
    transactions: BTreeMap<TransactionId, Transaction>,
    rates: HashMap<(Currency, Currency), ExchangeRate>,
    sequences: HashMap<String, u64>,
    personnel: BTreeMap<PersonnelId, Personnel>,
    salary_records: BTreeMap<SalaryRecordId, SalaryRecord>,
    advance_records: BTreeMap<AdvanceRecordId, AdvanceRecord>,
    payables: BTreeMap<PayableId, Payable>,
}

impl State {
    fn check(&self, commit: &LedgerCommit) -> Result<(), StoreError> {
        for write in &commit.accounts {
            match write {
                AccountWrite::Insert(account) => {
                    if self.accounts.contains_key(&account.id) {
                        return Err(StoreError::Duplicate(format!("account {}", account.id)));
                    }
                }
                AccountWrite::Update {
                    account,
                    expected_version,
                } => {
                    let current = self.accounts.get(&account.id).map(|a| a.version);
                    if current != Some(*expected_version) {
                        return Err(StoreError::VersionConflict(format!("account {}", account.id)));
                    }
                }
            }

            let account = write.account();
            if account.is_default_for(account.currency) {
                let taken = self.accounts.values().any(|other| {
                    other.id != account.id
                        && other.is_default_for(account.currency)
                        && !commit.accounts.iter().any(|w| w.account().id == other.id)
                });
                if taken {
                    return Err(StoreError::Duplicate(format!(
                        "default account for {}",
                        account.currency
                    )));
                }
            }
        }

        match &commit.transaction {
            None => {}
            Some(TransactionWrite::Insert(tx)) => {
                if self.transactions.contains_key(&tx.id)
                    || self
                        .transactions
                        .values()
                        .any(|t| t.transaction_number == tx.transaction_number)
                {
                    return Err(StoreError::Duplicate(format!(
                        "transaction number {}",
                        tx.transaction_number
                    )));
                }
            }
            Some(TransactionWrite::Update {
                transaction,
                expected_status,
            }) => {
                let current = self.transactions.get(&transaction.id).map(|t| t.status);
                if current != Some(*expected_status) {
                    return Err(StoreError::VersionConflict(format!("transaction {}", transaction.id)));
                }
            }
            Some(TransactionWrite::Delete { id, expected_status }) => {
                let current = self.transactions.get(id).map(|t| t.status);
                if current != Some(*expected_status) {
                    return Err(StoreError::VersionConflict(format!("transaction {id}")));
                }
            }
        }
        Ok(())
    }

    fn apply(&mut self, commit: LedgerCommit) {
        for write in commit.accounts {
            match write {
                AccountWrite::Insert(account) => {
                    self.accounts.insert(account.id, account);
                }
                AccountWrite::Update {
                    mut account,
                    expected_version,
                } => {
                    account.version = expected_version + 1;
                    self.accounts.insert(account.id, account);
                }
            }
        }

        match commit.transaction {
            None => {}
            Some(TransactionWrite::Insert(tx) | TransactionWrite::Update { transaction: tx, .. }) => {
                self.transactions.insert(tx.id, tx);
            }
            Some(TransactionWrite::Delete { id, .. }) => {
                self.transactions.remove(&id);
            }
        }

        for record in commit.records {
            match record {
                RecordWrite::UpsertPersonnel(p) => {
                    self.personnel.insert(p.id, p);
                }
                RecordWrite::InsertSalary(r) => {
                    self.salary_records.insert(r.id, r);
                }
                RecordWrite::DeleteSalary(id) => {
                    self.salary_records.remove(&id);
                }
                RecordWrite::InsertAdvance(r) => {
                    self.advance_records.insert(r.id, r);
                }
                RecordWrite::DeleteAdvance(id) => {
                    self.advance_records.remove(&id);
                }
                RecordWrite::InsertPayable(p) => {
                    self.payables.insert(p.id, p);
                }
            }
        }
    }

    fn count(&self, collection: Collection) -> usize {
        match collection {
            Collection::Accounts => self.accounts.len(),
            Collection::Transactions => self.transactions.len(),
            Collection::ExchangeRates => self.rates.len(),
            Collection::Personnel => self.personnel.len(),
            Collection::SalaryRecords => self.salary_records.len(),
            Collection::AdvanceRecords => self.advance_records.len(),
            Collection::Payables => self.payables.len(),
        }
    }

    fn empty(&mut self, collection: Collection) {
        match collection {
            Collection::Accounts => self.accounts.clear(),
            Collection::Transactions => self.transactions.clear(),
            Collection::ExchangeRates => self.rates.clear(),
            Collection::Personnel => self.personnel.clear(),
            Collection::SalaryRecords => self.salary_records.clear(),
            Collection::AdvanceRecords => self.advance_records.clear(),
            Collection::Payables => self.payables.clear(),
        }
    }
}

/// Newest business date first, then newest creation.
pub(crate) fn newest_first(a: &Transaction, b: &Transaction) -> Ordering {
    b.transaction_date
        .cmp(&a.transaction_date)
        .then_with(|| b.created_at.cmp(&a.created_at))
        .then_with(|| b.id.cmp(&a.id))
}

/// In-memory [`LedgerStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn get_account(&self, id: AccountId) -> Result<Option<Account>, StoreError> {
        Ok(self.state.read().await.accounts.get(&id).cloned())
    }

    async fn list_accounts(&self, filter: &AccountFilter) -> Result<Vec<Account>, StoreError> {
        let state = self.state.read().await;
        let mut accounts: Vec<Account> = state
            .accounts
            .values()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect();
        accounts.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(accounts)
    }

    async fn get_transaction(&self, id: TransactionId) -> Result<Option<Transaction>, StoreError> {
        Ok(self.state.read().await.transactions.get(&id).cloned())
    }

    async fn list_transactions(
        &self,
        filter: &TransactionFilter,
        page: Option<&PageRequest>,
    ) -> Result<(Vec<Transaction>, u64), StoreError> {
        let state = self.state.read().await;
        let mut matches: Vec<&Transaction> = state
            .transactions
            .values()
            .filter(|tx| filter.matches(tx))
            .collect();
        matches.sort_by(|a, b| newest_first(a, b));

        let total = matches.len() as u64;
        let rows = match page.map(PageRequest::normalized) {
            Some(page) => {
                let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
                let limit = usize::try_from(page.limit()).unwrap_or(usize::MAX);
                matches.into_iter().skip(offset).take(limit).cloned().collect()
            }
            None => matches.into_iter().cloned().collect(),
        };
        Ok((rows, total))
    }

    async fn next_sequence(&self, scope: &str) -> Result<u64, StoreError> {
        let mut state = self.state.write().await;
        let counter = state.sequences.entry(scope.to_string()).or_default();
        *counter += 1;
        Ok(*counter)
    }

    async fn get_rate(&self, from: Currency, to: Currency) -> Result<Option<ExchangeRate>, StoreError> {
        Ok(self.state.read().await.rates.get(&(from, to)).cloned())
    }

    async fn put_rate(&self, rate: &ExchangeRate) -> Result<(), StoreError> {
        self.state
            .write()
            .await
            .rates
            .insert((rate.from, rate.to), rate.clone());
        Ok(())
    }

    async fn get_personnel(&self, id: PersonnelId) -> Result<Option<Personnel>, StoreError> {
        Ok(self.state.read().await.personnel.get(&id).cloned())
    }

    async fn list_personnel(&self, is_active: Option<bool>) -> Result<Vec<Personnel>, StoreError> {
        let state = self.state.read().await;
        let mut personnel: Vec<Personnel> = state
            .personnel
            .values()
            .filter(|p| is_active.is_none_or(|active| p.is_active == active))
            .cloned()
            .collect();
        personnel.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(personnel)
    }

    async fn list_salary_records(&self, personnel_id: Option<PersonnelId>) -> Result<Vec<SalaryRecord>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .salary_records
            .values()
            .filter(|r| personnel_id.is_none_or(|p| r.personnel_id == p))
            .cloned()
            .collect())
    }

    async fn list_advance_records(&self, personnel_id: Option<PersonnelId>) -> Result<Vec<AdvanceRecord>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .advance_records
            .values()
            .filter(|r| personnel_id.is_none_or(|p| r.personnel_id == p))
            .cloned()
            .collect())
    }

    async fn get_payable(&self, id: PayableId) -> Result<Option<Payable>, StoreError> {
        Ok(self.state.read().await.payables.get(&id).cloned())
    }

    async fn list_payables(&self) -> Result<Vec<Payable>, StoreError> {
        Ok(self.state.read().await.payables.values().cloned().collect())
    }

    async fn counts(&self) -> Result<BTreeMap<Collection, u64>, StoreError> {
        let state = self.state.read().await;
        Ok(Collection::ALL
            .into_iter()
            .map(|c| (c, state.count(c) as u64))
            .collect())
    }

    async fn commit(&self, commit: LedgerCommit) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        state.check(&commit)?;
        state.apply(commit);
        Ok(())
    }

    async fn clear(&self, plan: &ClearPlan) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        for collection in &plan.collections {
            state.empty(*collection);
        }
        if plan.zero_balances {
            for account in state.accounts.values_mut() {
                account.zero_balances();
                account.version += 1;
            }
        }
        if plan.reset_sequences {
            state.sequences.clear();
        }
        Ok(())
    }
}
