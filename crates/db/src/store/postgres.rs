//! PostgreSQL store on `SeaORM`.
//!
//! A commit runs inside one database transaction. Account updates use
//! `UPDATE ... WHERE id = $1 AND version = $expected` and transaction updates
//! and deletes filter on the expected status; zero affected rows aborts the
//! commit with a version conflict.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, Func, OnConflict};
use sea_orm::{
    ActiveValue::Set, ColumnTrait, Condition, ConnectOptions, ConnectionTrait, Database,
    DatabaseConnection, DatabaseTransaction, DbBackend, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Statement, TransactionTrait,
};

use kasa_core::currency::ExchangeRate;
use kasa_core::ledger::{
    Account, AccountFilter, Category, ExchangeDetails, ExpenseCategory, Transaction,
    TransactionFilter, TransferDetails,
};
use kasa_core::personnel::{AdvanceRecord, Payable, Personnel, SalaryRecord};
use kasa_shared::config::DatabaseConfig;
use kasa_shared::types::{
    AccountId, AdvanceRecordId, Currency, PageRequest, PayableId, PersonnelId, SalaryRecordId,
    TransactionId, UserId,
};

use super::{AccountWrite, ClearPlan, Collection, LedgerCommit, LedgerStore, RecordWrite, TransactionWrite};
use crate::entities::{
    accounts, advance_records, exchange_rates, ledger_sequences, payables, personnel,
    salary_records, sea_orm_active_enums as db_enum, transactions,
};
use crate::error::StoreError;

const NEXT_SEQUENCE_SQL: &str = r"
INSERT INTO ledger_sequences (scope, value) VALUES ($1, 1)
ON CONFLICT (scope) DO UPDATE SET value = ledger_sequences.value + 1
RETURNING value
";

/// Clear order that never violates a foreign key.
const CLEAR_ORDER: [Collection; 7] = [
    Collection::SalaryRecords,
    Collection::AdvanceRecords,
    Collection::Transactions,
    Collection::Payables,
    Collection::Personnel,
    Collection::Accounts,
    Collection::ExchangeRates,
];

/// PostgreSQL [`LedgerStore`].
#[derive(Debug, Clone)]
pub struct PgStore {
    db: DatabaseConnection,
}

impl PgStore {
    /// Wraps an existing connection.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Opens a connection pool sized from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is missing or the connection fails.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DbErr> {
        let url = config
            .url
            .as_deref()
            .ok_or_else(|| DbErr::Custom("database.url is not set".to_string()))?;
        let mut options = ConnectOptions::new(url);
        options
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .sqlx_logging(false);
        Ok(Self::new(Database::connect(options).await?))
    }

    /// The underlying connection, for migrations.
    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    async fn write_accounts(txn: &DatabaseTransaction, writes: Vec<AccountWrite>) -> Result<(), StoreError> {
        for write in writes {
            match write {
                AccountWrite::Insert(account) => {
                    accounts::Entity::insert(account_model(&account, account.version)?)
                        .exec(txn)
                        .await?;
                }
                AccountWrite::Update {
                    account,
                    expected_version,
                } => {
                    let result = accounts::Entity::update_many()
                        .set(account_model(&account, expected_version + 1)?)
                        .filter(accounts::Column::Id.eq(account.id.into_inner()))
                        .filter(accounts::Column::Version.eq(expected_version))
                        .exec(txn)
                        .await?;
                    if result.rows_affected == 0 {
                        return Err(StoreError::VersionConflict(format!("account {}", account.id)));
                    }
                }
            }
        }
        Ok(())
    }

    async fn write_transaction(txn: &DatabaseTransaction, write: TransactionWrite) -> Result<(), StoreError> {
        match write {
            TransactionWrite::Insert(tx) => {
                transactions::Entity::insert(transaction_model(&tx)).exec(txn).await?;
            }
            TransactionWrite::Update {
                transaction,
                expected_status,
            } => {
                let result = transactions::Entity::update_many()
                    .set(transaction_model(&transaction))
                    .filter(transactions::Column::Id.eq(transaction.id.into_inner()))
                    .filter(transactions::Column::Status.eq(db_enum::TransactionStatus::from(expected_status)))
                    .exec(txn)
                    .await?;
                if result.rows_affected == 0 {
                    return Err(StoreError::VersionConflict(format!("transaction {}", transaction.id)));
                }
            }
            TransactionWrite::Delete { id, expected_status } => {
                let result = transactions::Entity::delete_many()
                    .filter(transactions::Column::Id.eq(id.into_inner()))
                    .filter(transactions::Column::Status.eq(db_enum::TransactionStatus::from(expected_status)))
                    .exec(txn)
                    .await?;
                if result.rows_affected == 0 {
                    return Err(StoreError::VersionConflict(format!("transaction {id}")));
                }
            }
        }
        Ok(())
    }

    async fn write_record(txn: &DatabaseTransaction, write: RecordWrite) -> Result<(), StoreError> {
        match write {
            RecordWrite::UpsertPersonnel(p) => {
                personnel::Entity::insert(personnel_model(&p))
                    .on_conflict(
                        OnConflict::column(personnel::Column::Id)
                            .update_columns([
                                personnel::Column::Name,
                                personnel::Column::Position,
                                personnel::Column::MonthlySalary,
                                personnel::Column::SalaryCurrency,
                                personnel::Column::IsActive,
                                personnel::Column::UpdatedAt,
                            ])
                            .to_owned(),
                    )
                    .exec(txn)
                    .await?;
            }
            RecordWrite::InsertSalary(r) => {
                salary_records::Entity::insert(salary_model(&r)).exec(txn).await?;
            }
            RecordWrite::DeleteSalary(id) => {
                salary_records::Entity::delete_by_id(id.into_inner()).exec(txn).await?;
            }
            RecordWrite::InsertAdvance(r) => {
                advance_records::Entity::insert(advance_model(&r)).exec(txn).await?;
            }
            RecordWrite::DeleteAdvance(id) => {
                advance_records::Entity::delete_by_id(id.into_inner()).exec(txn).await?;
            }
            RecordWrite::InsertPayable(p) => {
                payables::Entity::insert(payable_model(&p)).exec(txn).await?;
            }
        }
        Ok(())
    }
}

fn transaction_condition(filter: &TransactionFilter) -> Condition {
    let mut condition = Condition::all();
    if let Some(id) = filter.account_id {
        condition = condition.add(
            Condition::any()
                .add(transactions::Column::AccountId.eq(id.into_inner()))
                .add(transactions::Column::CounterAccountId.eq(id.into_inner())),
        );
    }
    if let Some(t) = filter.transaction_type {
        condition = condition.add(transactions::Column::TransactionType.eq(db_enum::TransactionType::from(t)));
    }
    if let Some(status) = filter.status {
        condition = condition.add(transactions::Column::Status.eq(db_enum::TransactionStatus::from(status)));
    }
    if let Some(category) = &filter.category {
        condition = condition.add(
            Expr::expr(Func::lower(Expr::col(transactions::Column::Category)))
                .eq(category.trim().to_lowercase()),
        );
    }
    if let Some(p) = filter.personnel_id {
        condition = condition.add(transactions::Column::PersonnelId.eq(p.into_inner()));
    }
    if let Some(p) = filter.payable_id {
        condition = condition.add(transactions::Column::PayableId.eq(p.into_inner()));
    }
    if let Some(c) = filter.currency {
        condition = condition.add(transactions::Column::Currency.eq(c.code()));
    }
    if let Some(from) = filter.date_from {
        condition = condition.add(transactions::Column::TransactionDate.gte(from));
    }
    if let Some(to) = filter.date_to {
        condition = condition.add(transactions::Column::TransactionDate.lte(to));
    }
    condition
}

#[async_trait]
impl LedgerStore for PgStore {
    async fn get_account(&self, id: AccountId) -> Result<Option<Account>, StoreError> {
        accounts::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .map(account_from_model)
            .transpose()
    }

    async fn list_accounts(&self, filter: &AccountFilter) -> Result<Vec<Account>, StoreError> {
        let mut query = accounts::Entity::find();
        if let Some(t) = filter.account_type {
            query = query.filter(accounts::Column::AccountType.eq(db_enum::AccountType::from(t)));
        }
        if let Some(active) = filter.is_active {
            query = query.filter(accounts::Column::IsActive.eq(active));
        }
        let rows = query
            .order_by_asc(accounts::Column::CreatedAt)
            .order_by_asc(accounts::Column::Id)
            .all(&self.db)
            .await?;

        let mut accounts = Vec::with_capacity(rows.len());
        for row in rows {
            let account = account_from_model(row)?;
            if filter.matches(&account) {
                accounts.push(account);
            }
        }
        Ok(accounts)
    }

    async fn get_transaction(&self, id: TransactionId) -> Result<Option<Transaction>, StoreError> {
        transactions::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .map(transaction_from_model)
            .transpose()
    }

    async fn list_transactions(
        &self,
        filter: &TransactionFilter,
        page: Option<&PageRequest>,
    ) -> Result<(Vec<Transaction>, u64), StoreError> {
        let query = transactions::Entity::find().filter(transaction_condition(filter));
        let total = query.clone().count(&self.db).await?;

        let mut query = query
            .order_by_desc(transactions::Column::TransactionDate)
            .order_by_desc(transactions::Column::CreatedAt)
            .order_by_desc(transactions::Column::Id);
        if let Some(page) = page.map(PageRequest::normalized) {
            query = query.offset(page.offset()).limit(page.limit());
        }

        let rows = query.all(&self.db).await?;
        let transactions = rows
            .into_iter()
            .map(transaction_from_model)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((transactions, total))
    }

    async fn next_sequence(&self, scope: &str) -> Result<u64, StoreError> {
        let row = self
            .db
            .query_one(Statement::from_sql_and_values(
                DbBackend::Postgres,
                NEXT_SEQUENCE_SQL,
                [scope.into()],
            ))
            .await?
            .ok_or_else(|| StoreError::Corrupt(format!("sequence {scope} returned no row")))?;
        let value: i64 = row.try_get("", "value")?;
        u64::try_from(value).map_err(|_| StoreError::Corrupt(format!("sequence {scope} is negative")))
    }

    async fn get_rate(&self, from: Currency, to: Currency) -> Result<Option<ExchangeRate>, StoreError> {
        exchange_rates::Entity::find_by_id((from.code().to_string(), to.code().to_string()))
            .one(&self.db)
            .await?
            .map(rate_from_model)
            .transpose()
    }

    async fn put_rate(&self, rate: &ExchangeRate) -> Result<(), StoreError> {
        let model = exchange_rates::ActiveModel {
            from_currency: Set(rate.from.code().to_string()),
            to_currency: Set(rate.to.code().to_string()),
            rate: Set(rate.rate),
            origin: Set(rate.origin.into()),
            fetched_at: Set(rate.fetched_at.into()),
        };
        exchange_rates::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([exchange_rates::Column::FromCurrency, exchange_rates::Column::ToCurrency])
                    .update_columns([
                        exchange_rates::Column::Rate,
                        exchange_rates::Column::Origin,
                        exchange_rates::Column::FetchedAt,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn get_personnel(&self, id: PersonnelId) -> Result<Option<Personnel>, StoreError> {
        personnel::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .map(personnel_from_model)
            .transpose()
    }

    async fn list_personnel(&self, is_active: Option<bool>) -> Result<Vec<Personnel>, StoreError> {
        let mut query = personnel::Entity::find();
        if let Some(active) = is_active {
            query = query.filter(personnel::Column::IsActive.eq(active));
        }
        query
            .order_by_asc(personnel::Column::Name)
            .order_by_asc(personnel::Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(personnel_from_model)
            .collect()
    }

    async fn list_salary_records(&self, personnel_id: Option<PersonnelId>) -> Result<Vec<SalaryRecord>, StoreError> {
        let mut query = salary_records::Entity::find();
        if let Some(p) = personnel_id {
            query = query.filter(salary_records::Column::PersonnelId.eq(p.into_inner()));
        }
        query
            .order_by_asc(salary_records::Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(salary_from_model)
            .collect()
    }

    async fn list_advance_records(&self, personnel_id: Option<PersonnelId>) -> Result<Vec<AdvanceRecord>, StoreError> {
        let mut query = advance_records::Entity::find();
        if let Some(p) = personnel_id {
            query = query.filter(advance_records::Column::PersonnelId.eq(p.into_inner()));
        }
        query
            .order_by_asc(advance_records::Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(advance_from_model)
            .collect()
    }

    async fn get_payable(&self, id: PayableId) -> Result<Option<Payable>, StoreError> {
        payables::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .map(payable_from_model)
            .transpose()
    }

    async fn list_payables(&self) -> Result<Vec<Payable>, StoreError> {
        payables::Entity::find()
            .order_by_asc(payables::Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(payable_from_model)
            .collect()
    }

    async fn counts(&self) -> Result<BTreeMap<Collection, u64>, StoreError> {
        let mut counts = BTreeMap::new();
        counts.insert(Collection::Accounts, accounts::Entity::find().count(&self.db).await?);
        counts.insert(Collection::Transactions, transactions::Entity::find().count(&self.db).await?);
        counts.insert(Collection::ExchangeRates, exchange_rates::Entity::find().count(&self.db).await?);
        counts.insert(Collection::Personnel, personnel::Entity::find().count(&self.db).await?);
        counts.insert(Collection::SalaryRecords, salary_records::Entity::find().count(&self.db).await?);
        counts.insert(Collection::AdvanceRecords, advance_records::Entity::find().count(&self.db).await?);
        counts.insert(Collection::Payables, payables::Entity::find().count(&self.db).await?);
        Ok(counts)
    }

    async fn commit(&self, commit: LedgerCommit) -> Result<(), StoreError> {
        let txn = self.db.begin().await?;

        Self::write_accounts(&txn, commit.accounts).await?;
        if let Some(write) = commit.transaction {
            Self::write_transaction(&txn, write).await?;
        }
        for record in commit.records {
            Self::write_record(&txn, record).await?;
        }

        txn.commit().await?;
        Ok(())
    }

    async fn clear(&self, plan: &ClearPlan) -> Result<(), StoreError> {
        let txn = self.db.begin().await?;

        for collection in CLEAR_ORDER.into_iter().filter(|c| plan.collections.contains(c)) {
            match collection {
                Collection::SalaryRecords => {
                    salary_records::Entity::delete_many().exec(&txn).await?;
                }
                Collection::AdvanceRecords => {
                    advance_records::Entity::delete_many().exec(&txn).await?;
                }
                Collection::Transactions => {
                    transactions::Entity::delete_many().exec(&txn).await?;
                }
                Collection::Payables => {
                    payables::Entity::delete_many().exec(&txn).await?;
                }
                Collection::Personnel => {
                    personnel::Entity::delete_many().exec(&txn).await?;
                }
                Collection::Accounts => {
                    accounts::Entity::delete_many().exec(&txn).await?;
                }
                Collection::ExchangeRates => {
                    exchange_rates::Entity::delete_many().exec(&txn).await?;
                }
            }
        }

        if plan.zero_balances {
            for row in accounts::Entity::find().all(&txn).await? {
                let mut account = account_from_model(row)?;
                account.zero_balances();
                let version = account.version + 1;
                accounts::Entity::update(account_model(&account, version)?)
                    .exec(&txn)
                    .await?;
            }
        }
        if plan.reset_sequences {
            ledger_sequences::Entity::delete_many().exec(&txn).await?;
        }

        txn.commit().await?;
        Ok(())
    }
}

// ============================================================
// ROW MAPPING
// ============================================================

fn corrupt(err: impl std::fmt::Display) -> StoreError {
    StoreError::Corrupt(err.to_string())
}

fn currency(code: &str) -> Result<Currency, StoreError> {
    code.parse().map_err(corrupt)
}

fn account_model(account: &Account, version: i64) -> Result<accounts::ActiveModel, StoreError> {
    Ok(accounts::ActiveModel {
        id: Set(account.id.into_inner()),
        name: Set(account.name.clone()),
        account_type: Set(account.account_type.into()),
        mode: Set(account.mode.into()),
        currency: Set(account.currency.code().to_string()),
        current_balance: Set(account.current_balance),
        balances: Set(serde_json::to_value(&account.balances).map_err(corrupt)?),
        supported_currencies: Set(serde_json::to_value(&account.supported_currencies).map_err(corrupt)?),
        is_default: Set(account.is_default),
        is_active: Set(account.is_active),
        description: Set(account.description.clone()),
        bank_name: Set(account.bank_name.clone()),
        iban: Set(account.iban.clone()),
        version: Set(version),
        created_by: Set(account.created_by.into_inner()),
        created_at: Set(account.created_at.into()),
        updated_at: Set(account.updated_at.into()),
    })
}

fn account_from_model(m: accounts::Model) -> Result<Account, StoreError> {
    let balances: BTreeMap<Currency, Decimal> = serde_json::from_value(m.balances).map_err(corrupt)?;
    let supported_currencies: BTreeSet<Currency> =
        serde_json::from_value(m.supported_currencies).map_err(corrupt)?;
    Ok(Account {
        id: AccountId::from_uuid(m.id),
        name: m.name,
        account_type: m.account_type.into(),
        mode: m.mode.into(),
        currency: currency(&m.currency)?,
        current_balance: m.current_balance,
        balances,
        supported_currencies,
        is_default: m.is_default,
        is_active: m.is_active,
        description: m.description,
        bank_name: m.bank_name,
        iban: m.iban,
        version: m.version,
        created_by: UserId::from_uuid(m.created_by),
        created_at: m.created_at.with_timezone(&Utc),
        updated_at: m.updated_at.with_timezone(&Utc),
    })
}

fn transaction_model(tx: &Transaction) -> transactions::ActiveModel {
    let transfer = tx.transfer.as_ref();
    let exchange = tx.exchange.as_ref();
    transactions::ActiveModel {
        id: Set(tx.id.into_inner()),
        transaction_number: Set(tx.transaction_number.clone()),
        transaction_type: Set(tx.transaction_type.into()),
        status: Set(tx.status.into()),
        amount: Set(tx.amount),
        currency: Set(tx.currency.code().to_string()),
        account_id: Set(tx.account_id.into_inner()),
        account_name: Set(tx.account_name.clone()),
        transaction_date: Set(tx.transaction_date),
        description: Set(tx.description.clone()),
        category: Set(tx.category.as_ref().map(|c| c.as_str().to_string())),
        reference: Set(tx.reference.clone()),
        notes: Set(tx.notes.clone()),
        counter_account_id: Set(transfer.map(|t| t.counter_account_id.into_inner())),
        counter_account_name: Set(transfer.map(|t| t.counter_account_name.clone())),
        transfer_direction: Set(transfer.map(|t| t.direction.into())),
        counter_currency: Set(transfer.map(|t| t.counter_currency.code().to_string())),
        counter_amount: Set(transfer.map(|t| t.counter_amount)),
        to_currency: Set(exchange.map(|e| e.to_currency.code().to_string())),
        to_amount: Set(exchange.map(|e| e.to_amount)),
        rate: Set(transfer.map(|t| t.rate).or_else(|| exchange.map(|e| e.rate))),
        personnel_id: Set(tx.personnel_id.map(PersonnelId::into_inner)),
        personnel_name: Set(tx.personnel_name.clone()),
        supplier_name: Set(tx.supplier_name.clone()),
        payable_id: Set(tx.payable_id.map(PayableId::into_inner)),
        created_by: Set(tx.created_by.into_inner()),
        created_at: Set(tx.created_at.into()),
        completed_at: Set(tx.completed_at.map(Into::into)),
        cancelled_at: Set(tx.cancelled_at.map(Into::into)),
    }
}

fn transaction_from_model(m: transactions::Model) -> Result<Transaction, StoreError> {
    let transaction_type = m.transaction_type.into();
    let tx_currency = currency(&m.currency)?;

    let transfer = match m.counter_account_id {
        Some(counter) => Some(TransferDetails {
            counter_account_id: AccountId::from_uuid(counter),
            counter_account_name: m.counter_account_name.unwrap_or_default(),
            direction: m.transfer_direction.map(Into::into).unwrap_or_default(),
            counter_currency: match m.counter_currency.as_deref() {
                Some(code) => currency(code)?,
                None => tx_currency,
            },
            counter_amount: m
                .counter_amount
                .ok_or_else(|| corrupt(format!("transfer {} has no counter amount", m.id)))?,
            rate: m.rate.unwrap_or(Decimal::ONE),
        }),
        None => None,
    };
    let exchange = match m.to_currency.as_deref() {
        Some(code) => Some(ExchangeDetails {
            to_currency: currency(code)?,
            to_amount: m
                .to_amount
                .ok_or_else(|| corrupt(format!("exchange {} has no target amount", m.id)))?,
            rate: m
                .rate
                .ok_or_else(|| corrupt(format!("exchange {} has no rate", m.id)))?,
        }),
        None => None,
    };
    let category = Category::resolve(transaction_type, m.category.as_deref()).map_err(corrupt)?;

    Ok(Transaction {
        id: TransactionId::from_uuid(m.id),
        transaction_number: m.transaction_number,
        transaction_type,
        status: m.status.into(),
        amount: m.amount,
        currency: tx_currency,
        account_id: AccountId::from_uuid(m.account_id),
        account_name: m.account_name,
        transaction_date: m.transaction_date,
        description: m.description,
        category,
        reference: m.reference,
        notes: m.notes,
        transfer,
        exchange,
        personnel_id: m.personnel_id.map(PersonnelId::from_uuid),
        personnel_name: m.personnel_name,
        supplier_name: m.supplier_name,
        payable_id: m.payable_id.map(PayableId::from_uuid),
        created_by: UserId::from_uuid(m.created_by),
        created_at: m.created_at.with_timezone(&Utc),
        completed_at: m.completed_at.map(|t| t.with_timezone(&Utc)),
        cancelled_at: m.cancelled_at.map(|t| t.with_timezone(&Utc)),
    })
}

fn rate_from_model(m: exchange_rates::Model) -> Result<ExchangeRate, StoreError> {
    Ok(ExchangeRate {
        from: currency(&m.from_currency)?,
        to: currency(&m.to_currency)?,
        rate: m.rate,
        fetched_at: m.fetched_at.with_timezone(&Utc),
        origin: m.origin.into(),
    })
}

fn personnel_model(p: &Personnel) -> personnel::ActiveModel {
    personnel::ActiveModel {
        id: Set(p.id.into_inner()),
        name: Set(p.name.clone()),
        position: Set(p.position.clone()),
        monthly_salary: Set(p.monthly_salary),
        salary_currency: Set(p.salary_currency.code().to_string()),
        is_active: Set(p.is_active),
        created_at: Set(p.created_at.into()),
        updated_at: Set(p.updated_at.into()),
    }
}

fn personnel_from_model(m: personnel::Model) -> Result<Personnel, StoreError> {
    Ok(Personnel {
        id: PersonnelId::from_uuid(m.id),
        name: m.name,
        position: m.position,
        monthly_salary: m.monthly_salary,
        salary_currency: currency(&m.salary_currency)?,
        is_active: m.is_active,
        created_at: m.created_at.with_timezone(&Utc),
        updated_at: m.updated_at.with_timezone(&Utc),
    })
}

fn salary_model(r: &SalaryRecord) -> salary_records::ActiveModel {
    salary_records::ActiveModel {
        id: Set(r.id.into_inner()),
        personnel_id: Set(r.personnel_id.into_inner()),
        transaction_id: Set(r.transaction_id.into_inner()),
        period: Set(r.period.clone()),
        category: Set(r.category.as_str().to_string()),
        gross_amount: Set(r.gross_amount),
        net_amount: Set(r.net_amount),
        currency: Set(r.currency.code().to_string()),
        created_at: Set(r.created_at.into()),
    }
}

fn salary_from_model(m: salary_records::Model) -> Result<SalaryRecord, StoreError> {
    Ok(SalaryRecord {
        id: SalaryRecordId::from_uuid(m.id),
        personnel_id: PersonnelId::from_uuid(m.personnel_id),
        transaction_id: TransactionId::from_uuid(m.transaction_id),
        period: m.period,
        category: m.category.parse::<ExpenseCategory>().map_err(corrupt)?,
        gross_amount: m.gross_amount,
        net_amount: m.net_amount,
        currency: currency(&m.currency)?,
        created_at: m.created_at.with_timezone(&Utc),
    })
}

fn advance_model(r: &AdvanceRecord) -> advance_records::ActiveModel {
    advance_records::ActiveModel {
        id: Set(r.id.into_inner()),
        personnel_id: Set(r.personnel_id.into_inner()),
        transaction_id: Set(r.transaction_id.map(TransactionId::into_inner)),
        amount: Set(r.amount),
        currency: Set(r.currency.code().to_string()),
        advance_date: Set(r.advance_date),
        description: Set(r.description.clone()),
        created_at: Set(r.created_at.into()),
    }
}

fn advance_from_model(m: advance_records::Model) -> Result<AdvanceRecord, StoreError> {
    Ok(AdvanceRecord {
        id: AdvanceRecordId::from_uuid(m.id),
        personnel_id: PersonnelId::from_uuid(m.personnel_id),
        transaction_id: m.transaction_id.map(TransactionId::from_uuid),
        amount: m.amount,
        currency: currency(&m.currency)?,
        advance_date: m.advance_date,
        description: m.description,
        created_at: m.created_at.with_timezone(&Utc),
    })
}

fn payable_model(p: &Payable) -> payables::ActiveModel {
    payables::ActiveModel {
        id: Set(p.id.into_inner()),
        supplier_name: Set(p.supplier_name.clone()),
        description: Set(p.description.clone()),
        amount: Set(p.amount),
        currency: Set(p.currency.code().to_string()),
        due_date: Set(p.due_date),
        created_by: Set(p.created_by.into_inner()),
        created_at: Set(p.created_at.into()),
    }
}

fn payable_from_model(m: payables::Model) -> Result<Payable, StoreError> {
    Ok(Payable {
        id: PayableId::from_uuid(m.id),
        supplier_name: m.supplier_name,
        description: m.description,
        amount: m.amount,
        currency: currency(&m.currency)?,
        due_date: m.due_date,
        created_by: UserId::from_uuid(m.created_by),
        created_at: m.created_at.with_timezone(&Utc),
    })
}
