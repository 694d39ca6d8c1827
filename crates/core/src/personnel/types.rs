//! Personnel, salary, advance and payable records.
//!
//! None of these hold money. Every realised payment is an EXPENSE
//! transaction; the records point at it.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use kasa_shared::types::{
    AccountId, AdvanceRecordId, Currency, PayableId, PersonnelId, SalaryRecordId, TransactionId,
    UserId,
};

use crate::ledger::validation::{MAX_NAME_LEN, validate_amount};
use crate::ledger::{ExpenseCategory, LedgerError, Transaction, TransactionType};

fn default_currency() -> Currency {
    Currency::Try
}

fn checked_name(name: &str, what: &str) -> Result<String, LedgerError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(LedgerError::InvalidRecord(format!("{what} cannot be blank")));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(LedgerError::InvalidRecord(format!(
            "{what} cannot exceed {MAX_NAME_LEN} characters"
        )));
    }
    Ok(name.to_string())
}

/// Validates a salary period label of the form `YYYY-MM`.
///
/// # Errors
///
/// Returns `INVALID_RECORD` for anything else.
pub fn validate_period(period: &str) -> Result<(), LedgerError> {
    let valid = period.len() == 7
        && NaiveDate::parse_from_str(&format!("{period}-01"), "%Y-%m-%d").is_ok();
    if valid {
        Ok(())
    } else {
        Err(LedgerError::InvalidRecord(format!(
            "salary period must look like 2024-01, got '{period}'"
        )))
    }
}

/// An employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Personnel {
    /// Personnel ID.
    pub id: PersonnelId,
    /// Full name.
    pub name: String,
    /// Job title.
    pub position: Option<String>,
    /// Agreed monthly net salary.
    pub monthly_salary: Option<Decimal>,
    /// Currency salaries are paid in.
    pub salary_currency: Currency,
    /// Inactive personnel cannot receive new payments.
    pub is_active: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last change.
    pub updated_at: DateTime<Utc>,
}

/// Input for adding an employee.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePersonnelInput {
    /// Full name.
    pub name: String,
    /// Job title.
    #[serde(default)]
    pub position: Option<String>,
    /// Agreed monthly net salary.
    #[serde(default)]
    pub monthly_salary: Option<Decimal>,
    /// Currency salaries are paid in.
    #[serde(default = "default_currency")]
    pub salary_currency: Currency,
}

impl Personnel {
    /// Builds a new active personnel record.
    ///
    /// # Errors
    ///
    /// Returns `INVALID_RECORD` for a blank name and `INVALID_AMOUNT` for a
    /// non-positive salary.
    pub fn new(input: &CreatePersonnelInput, now: DateTime<Utc>) -> Result<Self, LedgerError> {
        let name = checked_name(&input.name, "name")?;
        if let Some(salary) = input.monthly_salary {
            validate_amount(salary)?;
        }
        Ok(Self {
            id: PersonnelId::new(),
            name,
            position: input.position.clone(),
            monthly_salary: input.monthly_salary,
            salary_currency: input.salary_currency,
            is_active: true,
            created_at: now,
            updated_at: now,
        })
    }
}

/// A salary, bonus or social-security payment, pointing at its transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryRecord {
    /// Record ID.
    pub id: SalaryRecordId,
    /// Employee.
    pub personnel_id: PersonnelId,
    /// The EXPENSE transaction that moved the money.
    pub transaction_id: TransactionId,
    /// Pay period, `YYYY-MM`.
    pub period: String,
    /// SALARY, BONUS or SSK.
    pub category: ExpenseCategory,
    /// Gross amount before deductions, when known.
    pub gross_amount: Option<Decimal>,
    /// Amount actually paid.
    pub net_amount: Decimal,
    /// Currency paid in.
    pub currency: Currency,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Input for paying a salary, bonus or SSK contribution.
#[derive(Debug, Clone, Deserialize)]
pub struct PaySalaryInput {
    /// Account the money leaves.
    pub account_id: AccountId,
    /// Pay period, `YYYY-MM`.
    pub period: String,
    /// Amount paid.
    pub net_amount: Decimal,
    /// Gross amount, must not be below `net_amount`.
    #[serde(default)]
    pub gross_amount: Option<Decimal>,
    /// Defaults to the employee's salary currency.
    #[serde(default)]
    pub currency: Option<Currency>,
    /// SALARY (default), BONUS or SSK.
    #[serde(default)]
    pub category: Option<ExpenseCategory>,
    /// Business date; defaults to today.
    #[serde(default)]
    pub transaction_date: Option<NaiveDate>,
    /// Notes.
    #[serde(default)]
    pub notes: Option<String>,
}

impl PaySalaryInput {
    /// Validates the input and returns the effective category.
    ///
    /// # Errors
    ///
    /// `INVALID_RECORD` for a malformed period or gross below net,
    /// `INVALID_CATEGORY` for a non-salary category, `INVALID_AMOUNT`.
    pub fn check(&self) -> Result<ExpenseCategory, LedgerError> {
        validate_period(&self.period)?;
        validate_amount(self.net_amount)?;
        if let Some(gross) = self.gross_amount
            && gross < self.net_amount
        {
            return Err(LedgerError::InvalidRecord(
                "gross amount cannot be below net amount".to_string(),
            ));
        }
        let category = self.category.unwrap_or(ExpenseCategory::Salary);
        match category {
            ExpenseCategory::Salary | ExpenseCategory::Bonus | ExpenseCategory::Ssk => Ok(category),
            other => Err(LedgerError::InvalidCategory(format!(
                "{} is not a salary category",
                other.as_str()
            ))),
        }
    }
}

/// A salary advance. Legacy records may have no transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvanceRecord {
    /// Record ID.
    pub id: AdvanceRecordId,
    /// Employee.
    pub personnel_id: PersonnelId,
    /// The ADVANCE expense that moved the money, if any.
    pub transaction_id: Option<TransactionId>,
    /// Amount advanced.
    pub amount: Decimal,
    /// Currency.
    pub currency: Currency,
    /// Date of the advance.
    pub advance_date: NaiveDate,
    /// Free text.
    pub description: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Input for paying an advance through an account.
#[derive(Debug, Clone, Deserialize)]
pub struct PayAdvanceInput {
    /// Account the money leaves.
    pub account_id: AccountId,
    /// Amount advanced.
    pub amount: Decimal,
    /// Defaults to the employee's salary currency.
    #[serde(default)]
    pub currency: Option<Currency>,
    /// Business date; defaults to today.
    #[serde(default)]
    pub transaction_date: Option<NaiveDate>,
    /// Free text.
    #[serde(default)]
    pub description: Option<String>,
}

/// Input for recording an advance that was paid outside the ledger.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordAdvanceInput {
    /// Amount advanced.
    pub amount: Decimal,
    /// Currency.
    pub currency: Currency,
    /// Date of the advance.
    pub advance_date: NaiveDate,
    /// Free text.
    #[serde(default)]
    pub description: Option<String>,
}

/// Money owed to a supplier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payable {
    /// Payable ID.
    pub id: PayableId,
    /// Who is owed.
    pub supplier_name: String,
    /// What for.
    pub description: Option<String>,
    /// Amount owed.
    pub amount: Decimal,
    /// Currency owed.
    pub currency: Currency,
    /// Due date.
    pub due_date: Option<NaiveDate>,
    /// Who recorded it.
    pub created_by: UserId,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Input for recording a payable.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePayableInput {
    /// Who is owed.
    pub supplier_name: String,
    /// What for.
    #[serde(default)]
    pub description: Option<String>,
    /// Amount owed.
    pub amount: Decimal,
    /// Currency owed.
    pub currency: Currency,
    /// Due date.
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
}

impl Payable {
    /// Builds a new payable.
    ///
    /// # Errors
    ///
    /// `INVALID_RECORD` for a blank supplier, `INVALID_AMOUNT`.
    pub fn new(input: &CreatePayableInput, actor: UserId, now: DateTime<Utc>) -> Result<Self, LedgerError> {
        let supplier_name = checked_name(&input.supplier_name, "supplier name")?;
        validate_amount(input.amount)?;
        Ok(Self {
            id: PayableId::new(),
            supplier_name,
            description: input.description.clone(),
            amount: input.amount,
            currency: input.currency,
            due_date: input.due_date,
            created_by: actor,
            created_at: now,
        })
    }
}

/// Input for paying (part of) a payable.
#[derive(Debug, Clone, Deserialize)]
pub struct PayPayableInput {
    /// Account the money leaves.
    pub account_id: AccountId,
    /// Defaults to the whole open amount.
    #[serde(default)]
    pub amount: Option<Decimal>,
    /// Business date; defaults to today.
    #[serde(default)]
    pub transaction_date: Option<NaiveDate>,
    /// Notes.
    #[serde(default)]
    pub notes: Option<String>,
}

/// Settlement state of a payable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PayableStatus {
    /// Nothing paid yet.
    Open,
    /// Some but not all paid.
    PartiallyPaid,
    /// Fully paid.
    Paid,
}

/// A payable with its settlement derived from COMPLETED payments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayableView {
    /// The payable.
    #[serde(flatten)]
    pub payable: Payable,
    /// Σ COMPLETED EXPENSE transactions linked to it in its currency.
    pub paid_amount: Decimal,
    /// `amount - paid_amount`, never below zero.
    pub open_amount: Decimal,
    /// Settlement state.
    pub status: PayableStatus,
}

impl PayableView {
    /// Derives settlement from the linked transactions.
    #[must_use]
    pub fn from_payments<'a>(payable: Payable, payments: impl IntoIterator<Item = &'a Transaction>) -> Self {
        let paid_amount: Decimal = payments
            .into_iter()
            .filter(|tx| {
                tx.is_completed()
                    && tx.transaction_type == TransactionType::Expense
                    && tx.payable_id == Some(payable.id)
                    && tx.currency == payable.currency
            })
            .map(|tx| tx.amount)
            .sum();
        let open_amount = (payable.amount - paid_amount).max(Decimal::ZERO);
        let status = if open_amount.is_zero() {
            PayableStatus::Paid
        } else if paid_amount.is_zero() {
            PayableStatus::Open
        } else {
            PayableStatus::PartiallyPaid
        };
        Self {
            payable,
            paid_amount,
            open_amount,
            status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::TransactionStatus;
    use crate::ledger::transaction::fixtures::simple;
    use rust_decimal_macros::dec;

    #[test]
    fn test_validate_period() {
        assert!(validate_period("2024-01").is_ok());
        assert!(validate_period("2024-12").is_ok());
        assert!(validate_period("2024-13").is_err());
        assert!(validate_period("2024-1").is_err());
        assert!(validate_period("January").is_err());
    }

    #[test]
    fn test_personnel_requires_name() {
        let input = CreatePersonnelInput {
            name: " ".into(),
            position: None,
            monthly_salary: None,
            salary_currency: Currency::Try,
        };
        assert!(matches!(
            Personnel::new(&input, Utc::now()),
            Err(LedgerError::InvalidRecord(_))
        ));
    }

    #[test]
    fn test_salary_input_checks() {
        let mut input = PaySalaryInput {
            account_id: AccountId::new(),
            period: "2024-03".into(),
            net_amount: dec!(30000),
            gross_amount: Some(dec!(40000)),
            currency: None,
            category: None,
            transaction_date: None,
            notes: None,
        };
        assert_eq!(input.check().unwrap(), ExpenseCategory::Salary);

        input.category = Some(ExpenseCategory::Ssk);
        assert_eq!(input.check().unwrap(), ExpenseCategory::Ssk);

        input.category = Some(ExpenseCategory::Rent);
        assert!(matches!(input.check(), Err(LedgerError::InvalidCategory(_))));

        input.category = None;
        input.gross_amount = Some(dec!(100));
        assert!(matches!(input.check(), Err(LedgerError::InvalidRecord(_))));
    }

    #[test]
    fn test_payable_view_settlement() {
        let payable = Payable::new(
            &CreatePayableInput {
                supplier_name: "Karton A.Ş.".into(),
                description: None,
                amount: dec!(1000),
                currency: Currency::Try,
                due_date: None,
            },
            UserId::new(),
            Utc::now(),
        )
        .unwrap();

        let view = PayableView::from_payments(payable.clone(), []);
        assert_eq!(view.status, PayableStatus::Open);
        assert_eq!(view.open_amount, dec!(1000));

        let mut first = simple(TransactionType::Expense, AccountId::new(), dec!(400), Currency::Try);
        first.payable_id = Some(payable.id);
        let mut pending = simple(TransactionType::Expense, AccountId::new(), dec!(600), Currency::Try);
        pending.payable_id = Some(payable.id);
        pending.status = TransactionStatus::Pending;

        let view = PayableView::from_payments(payable.clone(), [&first, &pending]);
        assert_eq!(view.status, PayableStatus::PartiallyPaid);
        assert_eq!(view.paid_amount, dec!(400));
        assert_eq!(view.open_amount, dec!(600));

        pending.status = TransactionStatus::Completed;
        let view = PayableView::from_payments(payable, [&first, &pending]);
        assert_eq!(view.status, PayableStatus::Paid);
        assert_eq!(view.open_amount, dec!(0));
    }
}
