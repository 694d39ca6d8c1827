//! Account service: creation, lookup, metadata edits and soft deletion.
//!
//! Balance fields are never written here. They change only through
//! [`super::transaction::TransactionEngine`].

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::info;

use kasa_core::LedgerError;
use kasa_core::currency::CurrencyCatalog;
use kasa_core::ledger::{
    Account, AccountFilter, CreateAccountInput, UpdateAccountInput, ensure_unique_default, total_balances,
};
use kasa_shared::LedgerConfig;
use kasa_shared::types::{AccountId, Currency, UserId};

use super::retry::with_optimistic_retry;
use crate::error::StoreError;
use crate::store::{AccountWrite, LedgerCommit, LedgerStore};

/// Owns account records.
#[derive(Clone)]
pub struct AccountStore {
    store: Arc<dyn LedgerStore>,
    catalog: CurrencyCatalog,
    config: LedgerConfig,
}

impl AccountStore {
    /// Creates a new account service.
    #[must_use]
    pub fn new(store: Arc<dyn LedgerStore>, catalog: CurrencyCatalog, config: LedgerConfig) -> Self {
        Self { store, catalog, config }
    }

    /// Opens a new account with zero balances.
    ///
    /// # Errors
    ///
    /// `INVALID_CURRENCY`, `INVALID_ACCOUNT_SPEC` or `DUPLICATE_DEFAULT`.
    pub async fn create(&self, input: CreateAccountInput, actor: UserId) -> Result<Account, LedgerError> {
        let account = Account::open(&input, &self.catalog, actor, Utc::now())?;

        let account = with_optimistic_retry("create_account", self.config.max_retries, self.config.retry_backoff_ms, || {
            self.insert_attempt(&account)
        })
        .await?;

        info!(
            account_id = %account.id,
            name = %account.name,
            mode = ?account.mode,
            currency = %account.currency,
            actor = %actor,
            "Account created"
        );
        Ok(account)
    }

    async fn insert_attempt(&self, account: &Account) -> Result<Account, StoreError> {
        self.check_default(account).await?;
        self.store
            .commit(LedgerCommit::accounts(vec![AccountWrite::Insert(account.clone())]))
            .await?;
        Ok(account.clone())
    }

    async fn check_default(&self, account: &Account) -> Result<(), StoreError> {
        if account.is_default_for(account.currency) {
            let others = self.store.list_accounts(&AccountFilter::active()).await?;
            ensure_unique_default(account, &others)?;
        }
        Ok(())
    }

    /// Fetches one account.
    ///
    /// # Errors
    ///
    /// `ACCOUNT_NOT_FOUND`.
    pub async fn get(&self, id: AccountId) -> Result<Account, LedgerError> {
        self.store
            .get_account(id)
            .await?
            .ok_or(LedgerError::AccountNotFound(id))
    }

    /// Lists accounts, oldest first.
    ///
    /// # Errors
    ///
    /// Storage failures only.
    pub async fn list(&self, filter: &AccountFilter) -> Result<Vec<Account>, LedgerError> {
        Ok(self.store.list_accounts(filter).await?)
    }

    /// Applies a metadata patch.
    ///
    /// # Errors
    ///
    /// `ACCOUNT_NOT_FOUND`, `INVALID_ACCOUNT_SPEC`, `INVALID_CURRENCY` or
    /// `DUPLICATE_DEFAULT`.
    pub async fn update(&self, id: AccountId, input: UpdateAccountInput, actor: UserId) -> Result<Account, LedgerError> {
        let account = with_optimistic_retry("update_account", self.config.max_retries, self.config.retry_backoff_ms, || {
            self.update_attempt(id, &input)
        })
        .await?;

        info!(account_id = %id, actor = %actor, "Account updated");
        Ok(account)
    }

    async fn update_attempt(&self, id: AccountId, input: &UpdateAccountInput) -> Result<Account, StoreError> {
        let mut account = self
            .store
            .get_account(id)
            .await?
            .ok_or(LedgerError::AccountNotFound(id))?;
        let expected_version = account.version;

        account.apply_update(input, &self.catalog, Utc::now())?;
        self.check_default(&account).await?;

        self.store
            .commit(LedgerCommit::accounts(vec![AccountWrite::Update {
                account: account.clone(),
                expected_version,
            }]))
            .await?;

        account.version = expected_version + 1;
        Ok(account)
    }

    /// Soft-deletes an account whose every balance is zero.
    ///
    /// # Errors
    ///
    /// `ACCOUNT_NOT_FOUND` or `ACCOUNT_HAS_BALANCE`.
    pub async fn delete(&self, id: AccountId, actor: UserId) -> Result<(), LedgerError> {
        with_optimistic_retry("delete_account", self.config.max_retries, self.config.retry_backoff_ms, || {
            self.deactivate_attempt(id)
        })
        .await?;

        info!(account_id = %id, actor = %actor, "Account deactivated");
        Ok(())
    }

    async fn deactivate_attempt(&self, id: AccountId) -> Result<(), StoreError> {
        let mut account = self
            .store
            .get_account(id)
            .await?
            .ok_or(LedgerError::AccountNotFound(id))?;
        let expected_version = account.version;

        account.deactivate(Utc::now())?;
        self.store
            .commit(LedgerCommit::accounts(vec![AccountWrite::Update {
                account,
                expected_version,
            }]))
            .await
    }

    /// The active default account for a currency, if one is set.
    ///
    /// # Errors
    ///
    /// Storage failures only.
    pub async fn default_account(&self, currency: Currency) -> Result<Option<Account>, LedgerError> {
        let accounts = self.store.list_accounts(&AccountFilter::active()).await?;
        Ok(accounts.into_iter().find(|a| a.is_default_for(currency)))
    }

    /// Sum of balances per currency over active accounts.
    ///
    /// # Errors
    ///
    /// Storage failures only.
    pub async fn total_balances(&self) -> Result<BTreeMap<Currency, Decimal>, LedgerError> {
        let accounts = self.store.list_accounts(&AccountFilter::active()).await?;
        Ok(total_balances(&accounts))
    }

    /// Enabled currencies.
    #[must_use]
    pub const fn catalog(&self) -> &CurrencyCatalog {
        &self.catalog
    }
}
