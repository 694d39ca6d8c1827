//! Wiring for the full ledger service graph.

use std::sync::Arc;

use kasa_core::currency::CurrencyCatalog;
use kasa_shared::AppConfig;

use crate::repositories::{
    AccountStore, ExchangeRateProvider, LedgerAdmin, PersonnelLedger, RateSource, TransactionEngine,
};
use crate::store::LedgerStore;

/// Every ledger service, sharing one store.
///
/// Cloning is cheap; each service holds `Arc`s.
#[derive(Clone)]
pub struct Ledger {
    /// Account records.
    pub accounts: AccountStore,
    /// Transaction lifecycle and balance mutation.
    pub transactions: TransactionEngine,
    /// Exchange rate lookup and cache.
    pub rates: ExchangeRateProvider,
    /// Personnel, salaries, advances and payables.
    pub personnel: PersonnelLedger,
    /// Statistics, audit and guarded clears.
    pub admin: LedgerAdmin,
}

impl Ledger {
    /// Builds the services from configuration.
    #[must_use]
    pub fn new(store: Arc<dyn LedgerStore>, source: Arc<dyn RateSource>, config: &AppConfig) -> Self {
        let catalog = CurrencyCatalog::new(config.ledger.currencies.iter().copied());
        let rates = ExchangeRateProvider::new(Arc::clone(&store), source, &config.exchange_rates);
        let transactions = TransactionEngine::new(Arc::clone(&store), rates.clone(), config.ledger.clone());

        Self {
            accounts: AccountStore::new(Arc::clone(&store), catalog, config.ledger.clone()),
            personnel: PersonnelLedger::new(Arc::clone(&store), transactions.clone()),
            admin: LedgerAdmin::new(store, &config.admin),
            transactions,
            rates,
        }
    }
}
