//! Maintenance operations: statistics, balance audit and guarded bulk clears.
//!
//! Destructive operations need a confirmation token requested beforehand for
//! the same scope. Tokens are single-use and expire after
//! `admin.confirmation_ttl_secs`; expiry is checked on use.
//!
//! A token reaches the operator out of band: it is written to the log here
//! and returned only to in-process callers, never over HTTP.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use kasa_core::LedgerError;
use kasa_core::ledger::{AccountFilter, BalanceMismatch, TransactionFilter, audit};
use kasa_shared::AdminConfig;

use crate::store::{ClearPlan, Collection, LedgerStore};

/// What a confirmation token authorises.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearScope {
    /// Clearing one collection (and whatever it cascades to).
    Collection(Collection),
    /// Clearing everything.
    All,
}

impl fmt::Display for ClearScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Collection(collection) => f.write_str(collection.as_str()),
            Self::All => f.write_str("all"),
        }
    }
}

impl FromStr for ClearScope {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            Ok(Self::All)
        } else {
            s.parse().map(Self::Collection)
        }
    }
}

/// A freshly issued confirmation token.
#[derive(Debug, Clone, Serialize)]
pub struct Confirmation {
    /// Pass this back to the destructive call.
    pub token: String,
    /// Scope the token authorises.
    pub scope: String,
    /// When the token stops being accepted.
    pub expires_at: DateTime<Utc>,
}

/// Result of a balance audit.
#[derive(Debug, Clone, Serialize)]
pub struct AuditReport {
    /// Accounts inspected.
    pub accounts_checked: usize,
    /// Transactions replayed.
    pub transactions_checked: usize,
    /// Slots whose stored balance disagrees with history.
    pub mismatches: Vec<BalanceMismatch>,
}

impl AuditReport {
    /// Returns true if every balance matches its history.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.mismatches.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
struct PendingConfirmation {
    scope: ClearScope,
    expires_at: DateTime<Utc>,
}

/// Maintenance surface of the ledger.
#[derive(Clone)]
pub struct LedgerAdmin {
    store: Arc<dyn LedgerStore>,
    ttl: Duration,
    tokens: Arc<DashMap<String, PendingConfirmation>>,
}

impl LedgerAdmin {
    /// Creates a new admin service.
    #[must_use]
    pub fn new(store: Arc<dyn LedgerStore>, config: &AdminConfig) -> Self {
        let ttl = i64::try_from(config.confirmation_ttl_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or(Duration::MAX);
        Self {
            store,
            ttl,
            tokens: Arc::new(DashMap::new()),
        }
    }

    /// Row count per collection.
    ///
    /// # Errors
    ///
    /// Storage failures only.
    pub async fn get_stats(&self) -> Result<BTreeMap<&'static str, u64>, LedgerError> {
        let counts = self.store.counts().await?;
        Ok(counts.into_iter().map(|(c, n)| (c.as_str(), n)).collect())
    }

    /// Replays COMPLETED transactions and compares every balance slot.
    ///
    /// # Errors
    ///
    /// Storage failures and malformed stored transactions.
    pub async fn audit_balances(&self) -> Result<AuditReport, LedgerError> {
        let accounts = self.store.list_accounts(&AccountFilter::default()).await?;
        let (transactions, _) = self
            .store
            .list_transactions(&TransactionFilter::default(), None)
            .await?;
        let mismatches = audit(&accounts, &transactions)?;

        if mismatches.is_empty() {
            info!(accounts = accounts.len(), transactions = transactions.len(), "Balance audit clean");
        } else {
            warn!(mismatches = mismatches.len(), "Balance audit found drift");
        }
        Ok(AuditReport {
            accounts_checked: accounts.len(),
            transactions_checked: transactions.len(),
            mismatches,
        })
    }

    /// Issues a one-time token for a destructive operation on `scope`
    /// (`all` or a collection name).
    ///
    /// # Errors
    ///
    /// `UNKNOWN_COLLECTION`.
    pub fn request_confirmation(&self, scope: &str) -> Result<Confirmation, LedgerError> {
        let scope: ClearScope = scope.parse()?;
        let now = Utc::now();
        self.tokens.retain(|_, pending| pending.expires_at > now);

        let token = Uuid::new_v4().simple().to_string();
        let expires_at = now + self.ttl;
        self.tokens
            .insert(token.clone(), PendingConfirmation { scope, expires_at });

        warn!(%scope, %token, %expires_at, "Confirmation token issued for operator");
        Ok(Confirmation {
            token,
            scope: scope.to_string(),
            expires_at,
        })
    }

    fn consume(&self, scope: ClearScope, token: &str) -> Result<(), LedgerError> {
        let now = Utc::now();
        let accepted = self
            .tokens
            .remove_if(token, |_, pending| pending.scope == scope)
            .is_some_and(|(_, pending)| pending.expires_at > now);
        if accepted {
            Ok(())
        } else {
            warn!(%scope, "Destructive operation rejected: invalid confirmation token");
            Err(LedgerError::ConfirmationRequired)
        }
    }

    /// Empties one collection.
    ///
    /// Clearing transactions zeroes every balance and drops salary and
    /// advance records; clearing accounts also clears transactions; clearing
    /// personnel drops their salary and advance records.
    ///
    /// # Errors
    ///
    /// `UNKNOWN_COLLECTION` or `CONFIRMATION_REQUIRED`.
    pub async fn clear_collection(&self, name: &str, token: &str) -> Result<ClearPlan, LedgerError> {
        let collection: Collection = name.parse()?;
        self.consume(ClearScope::Collection(collection), token)?;

        let plan = cascade(collection);
        self.store.clear(&plan).await?;
        warn!(
            collection = %collection,
            cleared = ?plan.collections,
            zero_balances = plan.zero_balances,
            "Collection cleared"
        );
        Ok(plan)
    }

    /// Empties every collection and resets transaction numbering.
    ///
    /// # Errors
    ///
    /// `CONFIRMATION_REQUIRED`.
    pub async fn clear_all(&self, token: &str) -> Result<ClearPlan, LedgerError> {
        self.consume(ClearScope::All, token)?;

        let plan = ClearPlan {
            collections: Collection::ALL.into_iter().collect(),
            zero_balances: false,
            reset_sequences: true,
        };
        self.store.clear(&plan).await?;
        warn!("All ledger data cleared");
        Ok(plan)
    }
}

/// Everything clearing `collection` has to take with it.
fn cascade(collection: Collection) -> ClearPlan {
    let mut collections = BTreeSet::from([collection]);
    let mut zero_balances = false;
    match collection {
        Collection::Accounts => {
            collections.extend([
                Collection::Transactions,
                Collection::SalaryRecords,
                Collection::AdvanceRecords,
            ]);
        }
        Collection::Transactions => {
            collections.extend([Collection::SalaryRecords, Collection::AdvanceRecords]);
            zero_balances = true;
        }
        Collection::Personnel => {
            collections.extend([Collection::SalaryRecords, Collection::AdvanceRecords]);
        }
        Collection::ExchangeRates
        | Collection::SalaryRecords
        | Collection::AdvanceRecords
        | Collection::Payables => {}
    }
    ClearPlan {
        collections,
        zero_balances,
        reset_sequences: false,
    }
}
