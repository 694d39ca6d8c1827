//! Ledger domain enums, categories and operation inputs.
//!
//! All wire strings are SCREAMING_SNAKE_CASE; unknown values are rejected at
//! the boundary instead of being carried through as free text.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use kasa_shared::types::{AccountId, Currency, PayableId, PersonnelId};

use super::error::LedgerError;

/// Kind of balance holder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    /// Physical cash box.
    Cash,
    /// Bank account.
    Bank,
    /// Credit or debit card.
    Card,
    /// E-wallet (payment app balance).
    EWallet,
    /// Anything else.
    Custom,
}

/// Whether an account tracks one scalar balance or one per currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountMode {
    /// One currency; `current_balance` is authoritative.
    #[default]
    Single,
    /// Several currencies; `balances` is authoritative.
    Multi,
}

/// Transaction type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    /// Money in.
    Income,
    /// Money out.
    Expense,
    /// Money moved between two accounts.
    Transfer,
    /// Currency swapped inside one multi-currency account.
    Exchange,
}

/// Transaction status.
///
/// `PENDING -> COMPLETED` applies the balance effect, `PENDING -> CANCELLED`
/// never does. Nothing leaves `COMPLETED` or `CANCELLED` except deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    /// Recorded, no balance effect yet.
    Pending,
    /// Balance effect applied.
    Completed,
    /// Abandoned; never had a balance effect.
    Cancelled,
}

impl TransactionStatus {
    /// Returns true if transactions in this status count toward balances.
    #[must_use]
    pub fn affects_balance(self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Returns true if `self -> next` is a legal transition.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Completed | Self::Cancelled)
        )
    }

    /// Stable string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of a transfer relative to the transaction's own account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransferDirection {
    /// Money arrives on `account_id` from the counter account.
    In,
    /// Money leaves `account_id` for the counter account.
    #[default]
    Out,
}

/// Enumerated expense categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExpenseCategory {
    /// Raw material purchases.
    RawMaterial,
    /// Packaging supplies.
    Packaging,
    /// Production costs.
    Production,
    /// Shipping and logistics.
    Logistics,
    /// Electricity, water, gas.
    Utilities,
    /// Rent.
    Rent,
    /// Machine and building maintenance.
    Maintenance,
    /// Taxes and duties.
    Tax,
    /// Office supplies.
    Office,
    /// Marketing.
    Marketing,
    /// Personnel salary.
    Salary,
    /// Personnel salary advance.
    Advance,
    /// Personnel bonus.
    Bonus,
    /// Social security contribution.
    Ssk,
    /// Supplier payment.
    Supplier,
    /// Anything else.
    Other,
}

impl ExpenseCategory {
    /// Every category in display order.
    pub const ALL: [Self; 16] = [
        Self::RawMaterial,
        Self::Packaging,
        Self::Production,
        Self::Logistics,
        Self::Utilities,
        Self::Rent,
        Self::Maintenance,
        Self::Tax,
        Self::Office,
        Self::Marketing,
        Self::Salary,
        Self::Advance,
        Self::Bonus,
        Self::Ssk,
        Self::Supplier,
        Self::Other,
    ];

    /// Stable string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RawMaterial => "RAW_MATERIAL",
            Self::Packaging => "PACKAGING",
            Self::Production => "PRODUCTION",
            Self::Logistics => "LOGISTICS",
            Self::Utilities => "UTILITIES",
            Self::Rent => "RENT",
            Self::Maintenance => "MAINTENANCE",
            Self::Tax => "TAX",
            Self::Office => "OFFICE",
            Self::Marketing => "MARKETING",
            Self::Salary => "SALARY",
            Self::Advance => "ADVANCE",
            Self::Bonus => "BONUS",
            Self::Ssk => "SSK",
            Self::Supplier => "SUPPLIER",
            Self::Other => "OTHER",
        }
    }

    /// Returns true for categories tied to a personnel record.
    #[must_use]
    pub fn is_personnel(self) -> bool {
        matches!(self, Self::Salary | Self::Advance | Self::Bonus | Self::Ssk)
    }
}

impl std::str::FromStr for ExpenseCategory {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_uppercase();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == wanted)
            .ok_or_else(|| LedgerError::InvalidCategory(s.to_string()))
    }
}

/// Income categories. Income is free-form, so unknown labels land in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IncomeCategory {
    /// Product sales.
    Sales,
    /// Service revenue.
    Service,
    /// Interest earned.
    Interest,
    /// Refund received.
    Refund,
    /// Free-form label.
    Other(String),
}

impl IncomeCategory {
    /// Parses a label, keeping unknown labels verbatim.
    ///
    /// # Errors
    ///
    /// Returns `INVALID_CATEGORY` for a blank label.
    pub fn parse(label: &str) -> Result<Self, LedgerError> {
        let trimmed = label.trim();
        if trimmed.is_empty() {
            return Err(LedgerError::InvalidCategory(
                "income category cannot be blank".to_string(),
            ));
        }
        Ok(match trimmed.to_uppercase().as_str() {
            "SALES" => Self::Sales,
            "SERVICE" => Self::Service,
            "INTEREST" => Self::Interest,
            "REFUND" => Self::Refund,
            _ => Self::Other(trimmed.to_string()),
        })
    }

    /// Display and storage label.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Sales => "SALES",
            Self::Service => "SERVICE",
            Self::Interest => "INTEREST",
            Self::Refund => "REFUND",
            Self::Other(label) => label.as_str(),
        }
    }
}

/// A transaction category, closed over the transaction type it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Category {
    /// Category of an INCOME transaction.
    Income(IncomeCategory),
    /// Category of an EXPENSE transaction.
    Expense(ExpenseCategory),
}

impl Category {
    /// Resolves an optional category label for a transaction type.
    ///
    /// EXPENSE without a label becomes `OTHER`; INCOME may stay uncategorised;
    /// TRANSFER and EXCHANGE take no category.
    ///
    /// # Errors
    ///
    /// Returns `INVALID_CATEGORY` for unknown expense labels or for a label on
    /// a type that takes none.
    pub fn resolve(
        transaction_type: TransactionType,
        label: Option<&str>,
    ) -> Result<Option<Self>, LedgerError> {
        match (transaction_type, label) {
            (TransactionType::Income, None) => Ok(None),
            (TransactionType::Income, Some(label)) => {
                IncomeCategory::parse(label).map(|c| Some(Self::Income(c)))
            }
            (TransactionType::Expense, None) => Ok(Some(Self::Expense(ExpenseCategory::Other))),
            (TransactionType::Expense, Some(label)) => {
                label.parse().map(|c| Some(Self::Expense(c)))
            }
            (TransactionType::Transfer | TransactionType::Exchange, None) => Ok(None),
            (TransactionType::Transfer | TransactionType::Exchange, Some(label)) => {
                Err(LedgerError::InvalidCategory(format!(
                    "{label} (transfers and exchanges are not categorised)"
                )))
            }
        }
    }

    /// Display and storage label.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Income(category) => category.as_str(),
            Self::Expense(category) => category.as_str(),
        }
    }

    /// Returns the expense category, if this is one.
    #[must_use]
    pub fn expense(&self) -> Option<ExpenseCategory> {
        match self {
            Self::Expense(category) => Some(*category),
            Self::Income(_) => None,
        }
    }
}

impl Serialize for Category {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Input for opening an account.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAccountInput {
    /// Display name.
    pub name: String,
    /// Kind of balance holder.
    pub account_type: AccountType,
    /// Single or multi-currency.
    #[serde(default)]
    pub mode: AccountMode,
    /// Primary currency.
    pub currency: Currency,
    /// Currencies a MULTI account holds; must include `currency`.
    #[serde(default)]
    pub supported_currencies: Vec<Currency>,
    /// Make this the default account for its currency.
    #[serde(default)]
    pub is_default: bool,
    /// Free text.
    #[serde(default)]
    pub description: Option<String>,
    /// Bank name for BANK accounts.
    #[serde(default)]
    pub bank_name: Option<String>,
    /// IBAN for BANK accounts.
    #[serde(default)]
    pub iban: Option<String>,
}

/// Metadata patch for an account. Balances are never part of it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAccountInput {
    /// New display name.
    #[serde(default)]
    pub name: Option<String>,
    /// New account type.
    #[serde(default)]
    pub account_type: Option<AccountType>,
    /// New description.
    #[serde(default)]
    pub description: Option<String>,
    /// New bank name.
    #[serde(default)]
    pub bank_name: Option<String>,
    /// New IBAN.
    #[serde(default)]
    pub iban: Option<String>,
    /// Set or clear the default flag.
    #[serde(default)]
    pub is_default: Option<bool>,
    /// Currencies to add to a MULTI account, starting at zero.
    #[serde(default)]
    pub add_currencies: Vec<Currency>,
}

/// TRANSFER-specific input.
#[derive(Debug, Clone, Deserialize)]
pub struct TransferInput {
    /// The other side of the transfer.
    pub counter_account_id: AccountId,
    /// Direction relative to the transaction's `account_id`.
    #[serde(default)]
    pub direction: TransferDirection,
    /// Currency on the counter side; defaults to the transaction currency.
    #[serde(default)]
    pub counter_currency: Option<Currency>,
    /// Rate from the debited currency to the credited currency; looked up when absent.
    #[serde(default)]
    pub rate: Option<Decimal>,
}

/// EXCHANGE-specific input.
#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeInput {
    /// Currency credited inside the same account.
    pub to_currency: Currency,
    /// Rate (1 source = rate target); looked up when absent.
    #[serde(default)]
    pub rate: Option<Decimal>,
}

/// Input for creating a transaction.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTransactionInput {
    /// Transaction type.
    pub transaction_type: TransactionType,
    /// Account the transaction belongs to.
    pub account_id: AccountId,
    /// Amount in `currency`; must be positive.
    pub amount: Decimal,
    /// Currency of `amount`.
    pub currency: Currency,
    /// Business date; defaults to today (UTC).
    #[serde(default)]
    pub transaction_date: Option<NaiveDate>,
    /// Free text.
    #[serde(default)]
    pub description: String,
    /// Category label, resolved against the type.
    #[serde(default)]
    pub category: Option<String>,
    /// External reference (invoice number, receipt id).
    #[serde(default)]
    pub reference: Option<String>,
    /// Notes.
    #[serde(default)]
    pub notes: Option<String>,
    /// `PENDING` to defer the balance effect; defaults to `COMPLETED`.
    #[serde(default)]
    pub status: Option<TransactionStatus>,
    /// Required for TRANSFER.
    #[serde(default)]
    pub transfer: Option<TransferInput>,
    /// Required for EXCHANGE.
    #[serde(default)]
    pub exchange: Option<ExchangeInput>,
    /// Linked personnel record.
    #[serde(default)]
    pub personnel_id: Option<PersonnelId>,
    /// Denormalised personnel name.
    #[serde(default)]
    pub personnel_name: Option<String>,
    /// Free-text counterparty.
    #[serde(default)]
    pub supplier_name: Option<String>,
    /// Linked payable.
    #[serde(default)]
    pub payable_id: Option<PayableId>,
}

impl CreateTransactionInput {
    /// Minimal INCOME/EXPENSE input; everything optional left empty.
    #[must_use]
    pub fn simple(
        transaction_type: TransactionType,
        account_id: AccountId,
        amount: Decimal,
        currency: Currency,
    ) -> Self {
        Self {
            transaction_type,
            account_id,
            amount,
            currency,
            transaction_date: None,
            description: String::new(),
            category: None,
            reference: None,
            notes: None,
            status: None,
            transfer: None,
            exchange: None,
            personnel_id: None,
            personnel_name: None,
            supplier_name: None,
            payable_id: None,
        }
    }
}
