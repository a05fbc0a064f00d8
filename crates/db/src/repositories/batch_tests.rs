//! Tests for the batch repository's pure mapping helpers.

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use coopra_core::batch::BatchState;
use coopra_core::posting::EntrySource;
use coopra_shared::types::Currency;

use crate::entities::{
    accounts, adjustment_entries, ledger_entries, sea_orm_active_enums, transaction_batches,
};
use crate::repositories::batch::{adjustment_line, batch_to_domain, ledger_line, totals_from_model};

fn batch_model() -> transaction_batches::Model {
    transaction_batches::Model {
        id: Uuid::new_v4(),
        organization_id: Uuid::new_v4(),
        branch_id: Uuid::new_v4(),
        employee_user_id: Uuid::new_v4(),
        currency: "PHP".to_string(),
        state: sea_orm_active_enums::BatchState::Open,
        beginning_balance: dec!(1000),
        total_cash_collection: dec!(500),
        total_deposit_entries: dec!(500),
        total_petty_cash: dec!(0),
        total_loan_releases: dec!(0),
        total_withdrawals: dec!(0),
        total_check_remittance: dec!(0),
        total_online_remittance: dec!(0),
        total_deposit_in_bank: dec!(1500),
        total_cash_count: dec!(0),
        total_cash_on_hand: dec!(1500),
        total_supposed_remittance: dec!(1500),
        total_actual_remittance: dec!(1500),
        is_balanced: true,
        can_view: false,
        request_view: false,
        sign_offs: None,
        started_at: Utc::now().into(),
        ended_at: None,
        ended_by: None,
        created_at: Utc::now().into(),
        updated_at: Utc::now().into(),
    }
}

fn account_model(account_type: sea_orm_active_enums::AccountType) -> accounts::Model {
    accounts::Model {
        id: Uuid::new_v4(),
        organization_id: Uuid::new_v4(),
        branch_id: Uuid::new_v4(),
        code: "101".to_string(),
        name: "Regular Savings".to_string(),
        account_type,
        currency: "PHP".to_string(),
        is_active: true,
        created_at: Utc::now().into(),
        updated_at: Utc::now().into(),
    }
}

fn ledger_model(
    source: sea_orm_active_enums::EntrySource,
    debit: Decimal,
    credit: Decimal,
) -> ledger_entries::Model {
    ledger_entries::Model {
        id: Uuid::new_v4(),
        organization_id: Uuid::new_v4(),
        branch_id: Uuid::new_v4(),
        account_id: Uuid::new_v4(),
        member_profile_id: Some(Uuid::new_v4()),
        transaction_id: None,
        transaction_batch_id: Some(Uuid::new_v4()),
        source,
        currency: "PHP".to_string(),
        debit,
        credit,
        balance: credit - debit,
        description: "Counter transaction".to_string(),
        reference_number: None,
        print_number: None,
        entry_date: Utc::now().date_naive(),
        reversal_of: None,
        is_reversed: false,
        created_by: Uuid::new_v4(),
        created_at: Utc::now().into(),
    }
}

#[test]
fn test_batch_to_domain_maps_scalar_fields() {
    let model = batch_model();
    let domain = batch_to_domain(&model).unwrap();

    assert_eq!(domain.id.into_inner(), model.id);
    assert_eq!(domain.currency, Currency::Php);
    assert_eq!(domain.state, BatchState::Open);
    assert_eq!(domain.beginning_balance, dec!(1000));
    assert!(domain.sign_offs.is_none());
}

#[test]
fn test_batch_to_domain_rejects_unknown_currency() {
    let mut model = batch_model();
    model.currency = "???".to_string();

    let result = batch_to_domain(&model);
    assert!(result.is_err());
}

#[test]
fn test_batch_to_domain_parses_sign_offs() {
    let mut model = batch_model();
    model.sign_offs = Some(serde_json::json!({
        "prepared_by": {
            "name": "A. Reyes",
            "position": "Teller",
            "signature_media_id": null
        },
        "certified_by": null,
        "approved_by": null,
        "verified_by": null
    }));

    let domain = batch_to_domain(&model).unwrap();
    let sheet = domain.sign_offs.unwrap();
    assert_eq!(sheet.prepared_by.unwrap().name, "A. Reyes");
    assert!(sheet.approved_by.is_none());
}

#[test]
fn test_totals_from_model_round_trips_columns() {
    let model = batch_model();
    let totals = totals_from_model(&model);

    assert_eq!(totals.cash_collection, dec!(500));
    assert_eq!(totals.deposit_in_bank, dec!(1500));
    assert_eq!(totals.supposed_remittance, dec!(1500));
    assert_eq!(totals.actual_remittance, dec!(1500));
    assert!(totals.is_balanced);
}

#[test]
fn test_ledger_line_deposit_is_money_in() {
    let account = account_model(sea_orm_active_enums::AccountType::Deposit);
    let entry = ledger_model(sea_orm_active_enums::EntrySource::Deposit, dec!(0), dec!(500));

    let line = ledger_line(&entry, Some(&account)).unwrap();

    assert_eq!(line.source, EntrySource::Deposit);
    assert_eq!(line.amount, dec!(500));
    assert!(line.money_in);
}

#[test]
fn test_ledger_line_loan_payment_is_money_in() {
    // A loan payment debits the account but still brings cash in.
    let account = account_model(sea_orm_active_enums::AccountType::Loan);
    let entry = ledger_model(sea_orm_active_enums::EntrySource::Payment, dec!(200), dec!(0));

    let line = ledger_line(&entry, Some(&account)).unwrap();
    assert!(line.money_in);
}

#[test]
fn test_ledger_line_reversal_flips_direction() {
    // The reversal of a savings deposit debits the account: money out.
    let account = account_model(sea_orm_active_enums::AccountType::Deposit);
    let entry = ledger_model(sea_orm_active_enums::EntrySource::Deposit, dec!(500), dec!(0));

    let line = ledger_line(&entry, Some(&account)).unwrap();
    assert!(!line.money_in);
}

#[test]
fn test_ledger_line_missing_account_is_error() {
    let entry = ledger_model(sea_orm_active_enums::EntrySource::Deposit, dec!(0), dec!(500));
    let result = ledger_line(&entry, None);
    assert!(result.is_err());
}

#[test]
fn test_adjustment_line_source_is_adjustment() {
    let account = account_model(sea_orm_active_enums::AccountType::Deposit);
    let entry = adjustment_entries::Model {
        id: Uuid::new_v4(),
        organization_id: Uuid::new_v4(),
        branch_id: Uuid::new_v4(),
        account_id: account.id,
        member_profile_id: None,
        transaction_batch_id: Some(Uuid::new_v4()),
        currency: "PHP".to_string(),
        debit: Decimal::ZERO,
        credit: dec!(75),
        balance: dec!(75),
        description: "Correction".to_string(),
        reference_number: None,
        entry_date: Utc::now().date_naive(),
        reversal_of: None,
        is_reversed: false,
        created_by: Uuid::new_v4(),
        created_at: Utc::now().into(),
    };

    let line = adjustment_line(&entry, Some(&account)).unwrap();
    assert_eq!(line.source, EntrySource::Adjustment);
    assert_eq!(line.amount, dec!(75));
    assert!(line.money_in);
}
