//! Initial database migration.
//!
//! Creates the enums, tables, indexes, and triggers for the posting and
//! batch settlement engine. Uniqueness invariants (one open batch per
//! teller, no duplicate receipt numbers, strictly increasing print numbers)
//! are enforced here rather than with in-process locks.

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
        // PART 2: CHART OF ACCOUNTS SLICE
        // ============================================================
        db.execute_unprepared(ACCOUNTS_SQL).await?;
        db.execute_unprepared(VARIANCE_ACCOUNTS_SQL).await?;

        // ============================================================
        // PART 3: TRANSACTION BATCHES
        // ============================================================
        db.execute_unprepared(TRANSACTION_BATCHES_SQL).await?;
        db.execute_unprepared(BATCH_FUNDINGS_SQL).await?;
        db.execute_unprepared(CASH_COUNTS_SQL).await?;
        db.execute_unprepared(CHECK_REMITTANCES_SQL).await?;
        db.execute_unprepared(ONLINE_REMITTANCES_SQL).await?;

        // ============================================================
        // PART 4: LEDGER
        // ============================================================
        db.execute_unprepared(LEDGER_ENTRIES_SQL).await?;
        db.execute_unprepared(ADJUSTMENT_ENTRIES_SQL).await?;

        // ============================================================
        // PART 5: RECEIPT COUNTERS
        // ============================================================
        db.execute_unprepared(RECEIPT_COUNTERS_SQL).await?;

        // ============================================================
        // PART 6: TRIGGERS & FUNCTIONS
        // ============================================================
        db.execute_unprepared(TRIGGERS_SQL).await?;

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
-- Account classifications
CREATE TYPE account_type AS ENUM (
    'deposit',
    'time_deposit',
    'svf_ledger',
    'loan',
    'fines',
    'interest',
    'ap_ledger',
    'ar_ledger',
    'ar_aging',
    'w_off',
    'other'
);

-- Originating operation of an entry
CREATE TYPE entry_source AS ENUM (
    'deposit',
    'withdraw',
    'payment',
    'adjustment',
    'petty_cash',
    'loan_release'
);

-- Batch lifecycle states
CREATE TYPE batch_state AS ENUM (
    'open',
    'ended',
    'view_requested',
    'view_accepted'
);
";

const ACCOUNTS_SQL: &str = r"
CREATE TABLE accounts (
    id UUID PRIMARY KEY,
    organization_id UUID NOT NULL,
    branch_id UUID NOT NULL,
    code VARCHAR(50) NOT NULL,
    name VARCHAR(255) NOT NULL,
    account_type account_type NOT NULL,
    currency CHAR(3) NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT uq_accounts_code UNIQUE (organization_id, branch_id, code)
);

CREATE INDEX idx_accounts_org_branch ON accounts (organization_id, branch_id);
";

const VARIANCE_ACCOUNTS_SQL: &str = r"
CREATE TABLE variance_accounts (
    id UUID PRIMARY KEY,
    organization_id UUID NOT NULL,
    branch_id UUID NOT NULL,
    currency CHAR(3) NOT NULL,
    account_id UUID NOT NULL REFERENCES accounts(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    -- One sink account per branch and currency
    CONSTRAINT uq_variance_branch_currency UNIQUE (organization_id, branch_id, currency)
);
";

const TRANSACTION_BATCHES_SQL: &str = r"
CREATE TABLE transaction_batches (
    id UUID PRIMARY KEY,
    organization_id UUID NOT NULL,
    branch_id UUID NOT NULL,
    employee_user_id UUID NOT NULL,
    currency CHAR(3) NOT NULL,
    state batch_state NOT NULL DEFAULT 'open',
    beginning_balance NUMERIC(20, 6) NOT NULL DEFAULT 0,
    total_cash_collection NUMERIC(20, 6) NOT NULL DEFAULT 0,
    total_deposit_entries NUMERIC(20, 6) NOT NULL DEFAULT 0,
    total_petty_cash NUMERIC(20, 6) NOT NULL DEFAULT 0,
    total_loan_releases NUMERIC(20, 6) NOT NULL DEFAULT 0,
    total_withdrawals NUMERIC(20, 6) NOT NULL DEFAULT 0,
    total_check_remittance NUMERIC(20, 6) NOT NULL DEFAULT 0,
    total_online_remittance NUMERIC(20, 6) NOT NULL DEFAULT 0,
    total_deposit_in_bank NUMERIC(20, 6) NOT NULL DEFAULT 0,
    total_cash_count NUMERIC(20, 6) NOT NULL DEFAULT 0,
    total_cash_on_hand NUMERIC(20, 6) NOT NULL DEFAULT 0,
    total_supposed_remittance NUMERIC(20, 6) NOT NULL DEFAULT 0,
    total_actual_remittance NUMERIC(20, 6) NOT NULL DEFAULT 0,
    is_balanced BOOLEAN NOT NULL DEFAULT TRUE,
    can_view BOOLEAN NOT NULL DEFAULT FALSE,
    request_view BOOLEAN NOT NULL DEFAULT FALSE,
    sign_offs JSONB,
    started_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    ended_at TIMESTAMPTZ,
    ended_by UUID,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

-- The central invariant: at most one open batch per teller per branch.
-- Concurrent start-batch requests are serialized by this index.
CREATE UNIQUE INDEX uq_open_batch_per_teller
    ON transaction_batches (employee_user_id, organization_id, branch_id)
    WHERE state = 'open';

CREATE INDEX idx_batches_org_branch ON transaction_batches (organization_id, branch_id);
";

const BATCH_FUNDINGS_SQL: &str = r"
CREATE TABLE batch_fundings (
    id UUID PRIMARY KEY,
    transaction_batch_id UUID NOT NULL REFERENCES transaction_batches(id),
    name VARCHAR(255) NOT NULL,
    amount NUMERIC(20, 6) NOT NULL,
    provided_by UUID NOT NULL,
    signature_media_id UUID,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_fundings_batch ON batch_fundings (transaction_batch_id);
";

const CASH_COUNTS_SQL: &str = r"
CREATE TABLE cash_counts (
    id UUID PRIMARY KEY,
    transaction_batch_id UUID NOT NULL REFERENCES transaction_batches(id),
    denomination NUMERIC(20, 6) NOT NULL,
    quantity BIGINT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_cash_counts_batch ON cash_counts (transaction_batch_id);
";

const CHECK_REMITTANCES_SQL: &str = r"
CREATE TABLE check_remittances (
    id UUID PRIMARY KEY,
    transaction_batch_id UUID NOT NULL REFERENCES transaction_batches(id),
    bank_name VARCHAR(255) NOT NULL,
    reference_number VARCHAR(100) NOT NULL,
    amount NUMERIC(20, 6) NOT NULL,
    date_entry DATE NOT NULL,
    created_by UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_check_remittances_batch ON check_remittances (transaction_batch_id);
";

const ONLINE_REMITTANCES_SQL: &str = r"
CREATE TABLE online_remittances (
    id UUID PRIMARY KEY,
    transaction_batch_id UUID NOT NULL REFERENCES transaction_batches(id),
    provider VARCHAR(255) NOT NULL,
    reference_number VARCHAR(100) NOT NULL,
    amount NUMERIC(20, 6) NOT NULL,
    date_entry DATE NOT NULL,
    created_by UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_online_remittances_batch ON online_remittances (transaction_batch_id);
";

const LEDGER_ENTRIES_SQL: &str = r"
CREATE TABLE ledger_entries (
    id UUID PRIMARY KEY,
    organization_id UUID NOT NULL,
    branch_id UUID NOT NULL,
    account_id UUID NOT NULL REFERENCES accounts(id),
    member_profile_id UUID,
    transaction_id UUID,
    transaction_batch_id UUID REFERENCES transaction_batches(id),
    source entry_source NOT NULL,
    currency CHAR(3) NOT NULL,
    debit NUMERIC(20, 6) NOT NULL DEFAULT 0,
    credit NUMERIC(20, 6) NOT NULL DEFAULT 0,
    balance NUMERIC(20, 6) NOT NULL DEFAULT 0,
    description TEXT NOT NULL DEFAULT '',
    reference_number VARCHAR(100),
    print_number BIGINT,
    entry_date DATE NOT NULL,
    reversal_of UUID REFERENCES ledger_entries(id),
    is_reversed BOOLEAN NOT NULL DEFAULT FALSE,
    created_by UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    -- Exactly one side of the entry carries the amount
    CONSTRAINT chk_single_sided CHECK (
        (debit = 0 AND credit <> 0) OR (credit = 0 AND debit <> 0)
    )
);

-- Receipt numbers are unique within an organization/branch scope; a posting
-- losing this race surfaces as a reference collision.
CREATE UNIQUE INDEX uq_ledger_reference_number
    ON ledger_entries (organization_id, branch_id, reference_number)
    WHERE reference_number IS NOT NULL;

-- Print numbers are strictly increasing per member, account, and branch.
CREATE UNIQUE INDEX uq_ledger_print_number
    ON ledger_entries (organization_id, branch_id, member_profile_id, account_id, print_number)
    WHERE print_number IS NOT NULL;

CREATE INDEX idx_ledger_batch ON ledger_entries (transaction_batch_id);
CREATE INDEX idx_ledger_account_member
    ON ledger_entries (account_id, member_profile_id, created_at DESC);
";

const ADJUSTMENT_ENTRIES_SQL: &str = r"
CREATE TABLE adjustment_entries (
    id UUID PRIMARY KEY,
    organization_id UUID NOT NULL,
    branch_id UUID NOT NULL,
    account_id UUID NOT NULL REFERENCES accounts(id),
    member_profile_id UUID,
    transaction_batch_id UUID REFERENCES transaction_batches(id),
    currency CHAR(3) NOT NULL,
    debit NUMERIC(20, 6) NOT NULL DEFAULT 0,
    credit NUMERIC(20, 6) NOT NULL DEFAULT 0,
    balance NUMERIC(20, 6) NOT NULL DEFAULT 0,
    description TEXT NOT NULL DEFAULT '',
    reference_number VARCHAR(100),
    entry_date DATE NOT NULL,
    reversal_of UUID REFERENCES adjustment_entries(id),
    is_reversed BOOLEAN NOT NULL DEFAULT FALSE,
    created_by UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT chk_adjustment_single_sided CHECK (
        (debit = 0 AND credit <> 0) OR (credit = 0 AND debit <> 0)
    )
);

CREATE INDEX idx_adjustments_batch ON adjustment_entries (transaction_batch_id);
CREATE INDEX idx_adjustments_account_member
    ON adjustment_entries (account_id, member_profile_id, created_at DESC);
";

const RECEIPT_COUNTERS_SQL: &str = r"
CREATE TABLE receipt_counters (
    id UUID PRIMARY KEY,
    organization_id UUID NOT NULL,
    branch_id UUID NOT NULL,
    counter BIGINT NOT NULL DEFAULT 0,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT uq_receipt_counter_scope UNIQUE (organization_id, branch_id)
);
";

const TRIGGERS_SQL: &str = r"
CREATE OR REPLACE FUNCTION set_updated_at()
RETURNS TRIGGER AS $$
BEGIN
    NEW.updated_at = NOW();
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_accounts_updated_at
    BEFORE UPDATE ON accounts
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();

CREATE TRIGGER trg_batches_updated_at
    BEFORE UPDATE ON transaction_batches
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();

CREATE TRIGGER trg_receipt_counters_updated_at
    BEFORE UPDATE ON receipt_counters
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS receipt_counters CASCADE;
DROP TABLE IF EXISTS adjustment_entries CASCADE;
DROP TABLE IF EXISTS ledger_entries CASCADE;
DROP TABLE IF EXISTS online_remittances CASCADE;
DROP TABLE IF EXISTS check_remittances CASCADE;
DROP TABLE IF EXISTS cash_counts CASCADE;
DROP TABLE IF EXISTS batch_fundings CASCADE;
DROP TABLE IF EXISTS transaction_batches CASCADE;
DROP TABLE IF EXISTS variance_accounts CASCADE;
DROP TABLE IF EXISTS accounts CASCADE;
DROP FUNCTION IF EXISTS set_updated_at CASCADE;
DROP TYPE IF EXISTS batch_state;
DROP TYPE IF EXISTS entry_source;
DROP TYPE IF EXISTS account_type;
";
