use chrono::{DateTime, TimeZone, Utc};
use sea_orm::{Database, DatabaseConnection};

use ledger::{
    AccountCategory, AccountKind, AccountStatus, CreateAccountCmd, CreateTransactionCmd, Engine,
    EntryCmd, LedgerError, TransactionKind, UpdateAccountCmd,
};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

fn date(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
}

#[tokio::test]
async fn create_and_fetch_account() {
    let (engine, _db) = engine_with_db().await;

    let created = engine
        .create_account(
            CreateAccountCmd::new(
                "6001",
                "Freight Expense",
                AccountKind::Expense,
                AccountCategory::Operational,
            )
            .opening_balance(250),
        )
        .await
        .unwrap();

    assert_eq!(created.code, "6001");
    assert_eq!(created.name, "Freight Expense");
    assert_eq!(created.kind, AccountKind::Expense);
    assert_eq!(created.category, AccountCategory::Operational);
    assert_eq!(created.balance, 250);
    assert_eq!(created.opening_balance, 250);
    assert_eq!(created.status, AccountStatus::Active);
    assert!(!created.system);

    let by_id = engine.account(created.id).await.unwrap();
    assert_eq!(by_id, created);
    let by_code = engine.account_by_code("6001").await.unwrap();
    assert_eq!(by_code, created);
}

#[tokio::test]
async fn duplicate_code_is_rejected() {
    let (engine, _db) = engine_with_db().await;

    engine
        .create_account(CreateAccountCmd::new(
            "6001",
            "Freight Expense",
            AccountKind::Expense,
            AccountCategory::Operational,
        ))
        .await
        .unwrap();

    let err = engine
        .create_account(CreateAccountCmd::new(
            "6001",
            "Another Freight",
            AccountKind::Expense,
            AccountCategory::Operational,
        ))
        .await
        .unwrap_err();
    assert_eq!(err, LedgerError::DuplicateCode("6001".to_string()));
}

#[tokio::test]
async fn blank_code_is_rejected() {
    let (engine, _db) = engine_with_db().await;

    let err = engine
        .create_account(CreateAccountCmd::new(
            "   ",
            "Freight Expense",
            AccountKind::Expense,
            AccountCategory::Operational,
        ))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        LedgerError::InvalidAccount("account code must not be empty".to_string())
    );
}

#[tokio::test]
async fn seed_chart_is_idempotent() {
    let (engine, _db) = engine_with_db().await;

    let inserted = engine.seed_chart_of_accounts().await.unwrap();
    assert_eq!(inserted, 11);
    let again = engine.seed_chart_of_accounts().await.unwrap();
    assert_eq!(again, 0);

    let accounts = engine.accounts().await.unwrap();
    assert_eq!(accounts.len(), 11);
    // Listing is ordered by code, so cash comes first.
    assert_eq!(accounts[0].code, "1001");

    let cash = engine.account_by_code("1001").await.unwrap();
    assert_eq!(cash.name, "Cash");
    assert_eq!(cash.kind, AccountKind::Asset);
    assert_eq!(cash.category, AccountCategory::Current);
    assert!(cash.system);
    assert_eq!(cash.balance, 0);
}

#[tokio::test]
async fn update_renames_and_recategorizes() {
    let (engine, _db) = engine_with_db().await;

    let account = engine
        .create_account(CreateAccountCmd::new(
            "1301",
            "Prepaid Rent",
            AccountKind::Asset,
            AccountCategory::Current,
        ))
        .await
        .unwrap();

    let updated = engine
        .update_account(
            UpdateAccountCmd::new(account.id)
                .name("Prepaid Expenses")
                .category(AccountCategory::Fixed),
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Prepaid Expenses");
    assert_eq!(updated.category, AccountCategory::Fixed);
    assert_eq!(updated.code, "1301");

    // A command with nothing to change hands back the current row.
    let untouched = engine
        .update_account(UpdateAccountCmd::new(account.id))
        .await
        .unwrap();
    assert_eq!(untouched, updated);

    let err = engine
        .update_account(UpdateAccountCmd::new(9999).name("Ghost"))
        .await
        .unwrap_err();
    assert_eq!(err, LedgerError::AccountNotFound(9999));
}

#[tokio::test]
async fn deactivated_account_leaves_the_active_listing() {
    let (engine, _db) = engine_with_db().await;
    engine.seed_chart_of_accounts().await.unwrap();

    let inventory = engine.account_by_code("1201").await.unwrap();
    engine
        .set_account_status(inventory.id, AccountStatus::Inactive)
        .await
        .unwrap();

    let active = engine.active_accounts().await.unwrap();
    assert_eq!(active.len(), 10);
    assert!(active.iter().all(|a| a.code != "1201"));

    // The full chart still carries it.
    let all = engine.accounts().await.unwrap();
    assert_eq!(all.len(), 11);
    let inventory = engine.account_by_code("1201").await.unwrap();
    assert_eq!(inventory.status, AccountStatus::Inactive);
}

#[tokio::test]
async fn system_account_cannot_be_deleted() {
    let (engine, _db) = engine_with_db().await;
    engine.seed_chart_of_accounts().await.unwrap();

    let cash = engine.account_by_code("1001").await.unwrap();
    let err = engine.delete_account(cash.id).await.unwrap_err();
    assert_eq!(err, LedgerError::SystemAccount("1001".to_string()));
}

#[tokio::test]
async fn account_with_entries_cannot_be_deleted() {
    let (engine, _db) = engine_with_db().await;
    engine.seed_chart_of_accounts().await.unwrap();

    let inventory = engine.account_by_code("1201").await.unwrap();
    let payable = engine.account_by_code("2001").await.unwrap();

    // A draft is enough to pin the account: its entries already exist.
    engine
        .create_transaction(
            CreateTransactionCmd::new(TransactionKind::Purchase, date(2025, 3, 10), "tester")
                .entry(EntryCmd::debit(inventory.id, 800))
                .entry(EntryCmd::credit(payable.id, 800)),
        )
        .await
        .unwrap();

    let err = engine.delete_account(inventory.id).await.unwrap_err();
    assert_eq!(err, LedgerError::AccountInUse(inventory.id));
}

#[tokio::test]
async fn unused_account_can_be_deleted() {
    let (engine, _db) = engine_with_db().await;

    let account = engine
        .create_account(CreateAccountCmd::new(
            "1901",
            "Petty Cash",
            AccountKind::Asset,
            AccountCategory::Current,
        ))
        .await
        .unwrap();

    engine.delete_account(account.id).await.unwrap();
    let err = engine.account(account.id).await.unwrap_err();
    assert_eq!(err, LedgerError::AccountNotFound(account.id));
}
