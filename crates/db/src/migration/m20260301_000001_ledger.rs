//! Initial ledger schema.
//!
//! Creates the enum types, the account and transaction tables, the rate cache,
//! the per-day transaction-number counters, and the personnel tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: ACCOUNTS & TRANSACTIONS
        // ============================================================
        db.execute_unprepared(ACCOUNTS_SQL).await?;
        db.execute_unprepared(TRANSACTIONS_SQL).await?;
        db.execute_unprepared(LEDGER_SEQUENCES_SQL).await?;

        // ============================================================
        // PART 3: EXCHANGE RATE CACHE
        // ============================================================
        db.execute_unprepared(EXCHANGE_RATES_SQL).await?;

        // ============================================================
        // PART 4: PERSONNEL & PAYABLES
        // ============================================================
        db.execute_unprepared(PERSONNEL_SQL).await?;
        db.execute_unprepared(PAYABLES_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
CREATE TYPE account_type AS ENUM ('CASH', 'BANK', 'CARD', 'E_WALLET', 'CUSTOM');
CREATE TYPE account_mode AS ENUM ('SINGLE', 'MULTI');
CREATE TYPE transaction_type AS ENUM ('INCOME', 'EXPENSE', 'TRANSFER', 'EXCHANGE');
CREATE TYPE transaction_status AS ENUM ('PENDING', 'COMPLETED', 'CANCELLED');
CREATE TYPE transfer_direction AS ENUM ('IN', 'OUT');
CREATE TYPE rate_origin AS ENUM ('UPSTREAM', 'MANUAL', 'IDENTITY');
";

const ACCOUNTS_SQL: &str = r"
CREATE TABLE accounts (
    id                   UUID PRIMARY KEY,
    name                 VARCHAR(120) NOT NULL,
    account_type         account_type NOT NULL,
    mode                 account_mode NOT NULL DEFAULT 'SINGLE',
    currency             VARCHAR(3) NOT NULL,
    current_balance      NUMERIC(28, 8) NOT NULL DEFAULT 0,
    balances             JSONB NOT NULL DEFAULT '{}'::jsonb,
    supported_currencies JSONB NOT NULL DEFAULT '[]'::jsonb,
    is_default           BOOLEAN NOT NULL DEFAULT FALSE,
    is_active            BOOLEAN NOT NULL DEFAULT TRUE,
    description          TEXT,
    bank_name            VARCHAR(120),
    iban                 VARCHAR(34),
    version              BIGINT NOT NULL DEFAULT 0,
    created_by           UUID NOT NULL,
    created_at           TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at           TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

-- At most one active default account per currency
CREATE UNIQUE INDEX idx_accounts_default_currency
    ON accounts (currency)
    WHERE is_default AND is_active;

CREATE INDEX idx_accounts_active ON accounts (is_active, created_at);
";

const TRANSACTIONS_SQL: &str = r"
CREATE TABLE transactions (
    id                   UUID PRIMARY KEY,
    transaction_number   VARCHAR(64) NOT NULL UNIQUE,
    transaction_type     transaction_type NOT NULL,
    status               transaction_status NOT NULL,
    amount               NUMERIC(28, 8) NOT NULL CHECK (amount > 0),
    currency             VARCHAR(3) NOT NULL,
    account_id           UUID NOT NULL REFERENCES accounts(id) ON DELETE RESTRICT,
    account_name         VARCHAR(120) NOT NULL,
    transaction_date     DATE NOT NULL,
    description          TEXT NOT NULL DEFAULT '',
    category             VARCHAR(64),
    reference            VARCHAR(120),
    notes                TEXT,

    -- TRANSFER
    counter_account_id   UUID REFERENCES accounts(id) ON DELETE RESTRICT,
    counter_account_name VARCHAR(120),
    transfer_direction   transfer_direction,
    counter_currency     VARCHAR(3),
    counter_amount       NUMERIC(28, 8),

    -- EXCHANGE
    to_currency          VARCHAR(3),
    to_amount            NUMERIC(28, 8),

    -- TRANSFER and EXCHANGE
    rate                 NUMERIC(28, 8),

    personnel_id         UUID,
    personnel_name       VARCHAR(120),
    supplier_name        VARCHAR(120),
    payable_id           UUID,
    created_by           UUID NOT NULL,
    created_at           TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    completed_at         TIMESTAMPTZ,
    cancelled_at         TIMESTAMPTZ,

    CONSTRAINT chk_transfer_details CHECK (
        transaction_type <> 'TRANSFER'
        OR (counter_account_id IS NOT NULL AND counter_amount IS NOT NULL AND rate IS NOT NULL)
    ),
    CONSTRAINT chk_exchange_details CHECK (
        transaction_type <> 'EXCHANGE'
        OR (to_currency IS NOT NULL AND to_amount IS NOT NULL AND rate IS NOT NULL)
    )
);

CREATE INDEX idx_transactions_account ON transactions (account_id, transaction_date DESC);
CREATE INDEX idx_transactions_counter ON transactions (counter_account_id) WHERE counter_account_id IS NOT NULL;
CREATE INDEX idx_transactions_date ON transactions (transaction_date DESC, created_at DESC);
CREATE INDEX idx_transactions_personnel ON transactions (personnel_id) WHERE personnel_id IS NOT NULL;
CREATE INDEX idx_transactions_payable ON transactions (payable_id) WHERE payable_id IS NOT NULL;
";

const LEDGER_SEQUENCES_SQL: &str = r"
CREATE TABLE ledger_sequences (
    scope VARCHAR(64) PRIMARY KEY,
    value BIGINT NOT NULL
);
";

const EXCHANGE_RATES_SQL: &str = r"
CREATE TABLE exchange_rates (
    from_currency VARCHAR(3) NOT NULL,
    to_currency   VARCHAR(3) NOT NULL,
    rate          NUMERIC(28, 8) NOT NULL CHECK (rate > 0),
    origin        rate_origin NOT NULL,
    fetched_at    TIMESTAMPTZ NOT NULL,
    PRIMARY KEY (from_currency, to_currency)
);
";

const PERSONNEL_SQL: &str = r"
CREATE TABLE personnel (
    id              UUID PRIMARY KEY,
    name            VARCHAR(120) NOT NULL,
    position        VARCHAR(120),
    monthly_salary  NUMERIC(28, 8),
    salary_currency VARCHAR(3) NOT NULL,
    is_active       BOOLEAN NOT NULL DEFAULT TRUE,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE salary_records (
    id             UUID PRIMARY KEY,
    personnel_id   UUID NOT NULL REFERENCES personnel(id) ON DELETE CASCADE,
    transaction_id UUID NOT NULL,
    period         CHAR(7) NOT NULL,
    category       VARCHAR(32) NOT NULL,
    gross_amount   NUMERIC(28, 8),
    net_amount     NUMERIC(28, 8) NOT NULL,
    currency       VARCHAR(3) NOT NULL,
    created_at     TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_salary_records_personnel ON salary_records (personnel_id, period);

CREATE TABLE advance_records (
    id             UUID PRIMARY KEY,
    personnel_id   UUID NOT NULL REFERENCES personnel(id) ON DELETE CASCADE,
    transaction_id UUID,
    amount         NUMERIC(28, 8) NOT NULL CHECK (amount > 0),
    currency       VARCHAR(3) NOT NULL,
    advance_date   DATE NOT NULL,
    description    TEXT,
    created_at     TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_advance_records_personnel ON advance_records (personnel_id);
";

const PAYABLES_SQL: &str = r"
CREATE TABLE payables (
    id            UUID PRIMARY KEY,
    supplier_name VARCHAR(120) NOT NULL,
    description   TEXT,
    amount        NUMERIC(28, 8) NOT NULL CHECK (amount > 0),
    currency      VARCHAR(3) NOT NULL,
    due_date      DATE,
    created_by    UUID NOT NULL,
    created_at    TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS payables;
DROP TABLE IF EXISTS advance_records;
DROP TABLE IF EXISTS salary_records;
DROP TABLE IF EXISTS personnel;
DROP TABLE IF EXISTS exchange_rates;
DROP TABLE IF EXISTS ledger_sequences;
DROP TABLE IF EXISTS transactions;
DROP TABLE IF EXISTS accounts;
DROP TYPE IF EXISTS rate_origin;
DROP TYPE IF EXISTS transfer_direction;
DROP TYPE IF EXISTS transaction_status;
DROP TYPE IF EXISTS transaction_type;
DROP TYPE IF EXISTS account_mode;
DROP TYPE IF EXISTS account_type;
";
