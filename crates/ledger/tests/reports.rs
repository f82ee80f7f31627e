use chrono::{DateTime, TimeZone, Utc};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use ledger::{
    AccountCategory, AccountKind, AccountStatus, BalanceSheet, CashFlowStatement,
    CreateAccountCmd, CreateTransactionCmd, Engine, EntryCmd, LedgerError, TransactionKind,
    TransactionListFilter, TransactionStatus,
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

async fn post(
    engine: &Engine,
    kind: TransactionKind,
    when: DateTime<Utc>,
    debit_account: i32,
    credit_account: i32,
    amount: i64,
) -> i32 {
    engine
        .create_transaction(
            CreateTransactionCmd::new(kind, when, "tester")
                .entry(EntryCmd::debit(debit_account, amount))
                .entry(EntryCmd::credit(credit_account, amount))
                .post(),
        )
        .await
        .unwrap()
        .id
}

/// Seeds the chart and posts one January of activity: capital in, a sale,
/// a salary run, an equipment purchase and a loan drawdown. Also records a
/// draft and a voided sale, which must stay out of every report.
async fn sample_books(engine: &Engine) {
    engine.seed_chart_of_accounts().await.unwrap();
    let cash = engine.account_by_code("1001").await.unwrap().id;
    let equipment = engine.account_by_code("1501").await.unwrap().id;
    let loans = engine.account_by_code("2501").await.unwrap().id;
    let capital = engine.account_by_code("3001").await.unwrap().id;
    let sales = engine.account_by_code("4001").await.unwrap().id;
    let salary = engine.account_by_code("5001").await.unwrap().id;
    let operating = engine.account_by_code("5101").await.unwrap().id;

    post(engine, TransactionKind::General, date(2025, 1, 5), cash, capital, 10_000).await;
    post(engine, TransactionKind::Sales, date(2025, 1, 10), cash, sales, 5_000).await;

    let voided = post(engine, TransactionKind::Sales, date(2025, 1, 13), cash, sales, 777).await;
    engine.void_transaction(voided).await.unwrap();
    engine
        .create_transaction(
            CreateTransactionCmd::new(TransactionKind::General, date(2025, 1, 12), "tester")
                .entry(EntryCmd::debit(operating, 999))
                .entry(EntryCmd::credit(cash, 999)),
        )
        .await
        .unwrap();

    post(engine, TransactionKind::Payroll, date(2025, 1, 15), salary, cash, 2_000).await;
    post(engine, TransactionKind::Purchase, date(2025, 1, 20), equipment, cash, 3_000).await;
    post(engine, TransactionKind::Loan, date(2025, 1, 25), cash, loans, 4_000).await;
}

#[tokio::test]
async fn trial_balance_stays_in_identity() {
    let (engine, _db) = engine_with_db().await;
    sample_books(&engine).await;

    let report = engine.trial_balance().await.unwrap();
    assert_eq!(report.rows.len(), 11);
    assert_eq!(report.total_debit, 19_000);
    assert_eq!(report.total_credit, 19_000);
    assert!(report.is_balanced());

    let cash = report.rows.iter().find(|r| r.code == "1001").unwrap();
    assert_eq!((cash.debit, cash.credit), (14_000, 0));
    let loans = report.rows.iter().find(|r| r.code == "2501").unwrap();
    assert_eq!((loans.debit, loans.credit), (0, 4_000));
    let bank = report.rows.iter().find(|r| r.code == "1002").unwrap();
    assert_eq!((bank.debit, bank.credit), (0, 0));

    // Deactivating an idle account drops its row without breaking the
    // identity.
    let bank = engine.account_by_code("1002").await.unwrap();
    engine
        .set_account_status(bank.id, AccountStatus::Inactive)
        .await
        .unwrap();
    let report = engine.trial_balance().await.unwrap();
    assert_eq!(report.rows.len(), 10);
    assert!(report.is_balanced());
}

#[tokio::test]
async fn balance_sheet_groups_by_category() {
    let (engine, _db) = engine_with_db().await;
    sample_books(&engine).await;

    assert_eq!(
        engine.balance_sheet().await.unwrap(),
        BalanceSheet {
            current_assets: 14_000,
            fixed_assets: 3_000,
            total_assets: 17_000,
            current_liabilities: 0,
            long_term_liabilities: 4_000,
            total_liabilities: 4_000,
            equity: 10_000,
        }
    );
}

#[tokio::test]
async fn income_statement_covers_posted_activity_in_range() {
    let (engine, _db) = engine_with_db().await;
    sample_books(&engine).await;

    let statement = engine
        .income_statement(date(2025, 1, 1), date(2025, 1, 31))
        .await
        .unwrap();
    assert_eq!(statement.revenue.len(), 1);
    assert_eq!(statement.revenue[0].code, "4001");
    assert_eq!(statement.revenue[0].amount, 5_000);
    assert_eq!(statement.expenses.len(), 1);
    assert_eq!(statement.expenses[0].code, "5001");
    assert_eq!(statement.expenses[0].amount, 2_000);
    assert_eq!(statement.total_revenue, 5_000);
    assert_eq!(statement.total_expenses, 2_000);
    assert_eq!(statement.net_income, 3_000);

    // A window that starts after the sale only sees the salary run.
    let statement = engine
        .income_statement(date(2025, 1, 14), date(2025, 1, 31))
        .await
        .unwrap();
    assert!(statement.revenue.is_empty());
    assert_eq!(statement.total_expenses, 2_000);
    assert_eq!(statement.net_income, -2_000);
}

#[tokio::test]
async fn cash_flow_buckets_by_account_profile() {
    let (engine, _db) = engine_with_db().await;
    sample_books(&engine).await;

    // Per entry net debit - credit: sale -5000 and salary +2000 are
    // operating, the equipment purchase +3000 is investing, capital -10000
    // and the loan -4000 are financing. Cash itself stays out.
    assert_eq!(
        engine
            .cash_flow(date(2025, 1, 1), date(2025, 1, 31))
            .await
            .unwrap(),
        CashFlowStatement {
            operating: -3_000,
            investing: 3_000,
            financing: -14_000,
            net: -14_000,
        }
    );
}

#[tokio::test]
async fn ledger_folds_a_running_balance() {
    let (engine, _db) = engine_with_db().await;
    sample_books(&engine).await;
    let cash = engine.account_by_code("1001").await.unwrap();

    let lines = engine
        .ledger_entries(cash.id, date(2025, 1, 1), date(2025, 1, 31))
        .await
        .unwrap();
    let folded: Vec<(&str, i64, i64, i64)> = lines
        .iter()
        .map(|l| (l.reference.as_str(), l.debit, l.credit, l.running_balance))
        .collect();
    assert_eq!(
        folded,
        vec![
            ("TRX25010001", 10_000, 0, 10_000),
            ("SAL25010001", 5_000, 0, 15_000),
            ("PAY25010001", 0, 2_000, 13_000),
            ("PUR25010001", 0, 3_000, 10_000),
            ("LON25010001", 4_000, 0, 14_000),
        ]
    );

    // A narrower window folds from zero at its own start.
    let lines = engine
        .ledger_entries(cash.id, date(2025, 1, 12), date(2025, 1, 31))
        .await
        .unwrap();
    let runnings: Vec<i64> = lines.iter().map(|l| l.running_balance).collect();
    assert_eq!(runnings, vec![-2_000, -5_000, -1_000]);

    // Credit-normal accounts fold with the opposite sign.
    let loans = engine.account_by_code("2501").await.unwrap();
    let lines = engine
        .ledger_entries(loans.id, date(2025, 1, 1), date(2025, 1, 31))
        .await
        .unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].credit, 4_000);
    assert_eq!(lines[0].running_balance, 4_000);
}

#[tokio::test]
async fn ledger_breaks_date_ties_by_transaction_id() {
    let (engine, _db) = engine_with_db().await;
    engine.seed_chart_of_accounts().await.unwrap();
    let cash = engine.account_by_code("1001").await.unwrap();
    let capital = engine.account_by_code("3001").await.unwrap();

    let same_day = date(2025, 3, 7);
    let first = post(&engine, TransactionKind::General, same_day, cash.id, capital.id, 100).await;
    let second = post(&engine, TransactionKind::General, same_day, cash.id, capital.id, 40).await;

    let lines = engine
        .ledger_entries(cash.id, same_day, same_day)
        .await
        .unwrap();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].transaction_id, first);
    assert_eq!(lines[0].running_balance, 100);
    assert_eq!(lines[1].transaction_id, second);
    assert_eq!(lines[1].running_balance, 140);
}

#[tokio::test]
async fn cash_book_anchors_to_the_cash_account() {
    let (engine, _db) = engine_with_db().await;
    sample_books(&engine).await;

    let book = engine
        .cash_book(date(2025, 1, 1), date(2025, 1, 31))
        .await
        .unwrap();
    assert_eq!(book.account_code, "1001");
    assert_eq!(book.account_name, "Cash");

    let cash = engine.account_by_code("1001").await.unwrap();
    let lines = engine
        .ledger_entries(cash.id, date(2025, 1, 1), date(2025, 1, 31))
        .await
        .unwrap();
    assert_eq!(book.lines, lines);
}

#[tokio::test]
async fn cash_book_needs_the_seeded_chart() {
    let (engine, _db) = engine_with_db().await;

    let err = engine
        .cash_book(date(2025, 1, 1), date(2025, 1, 31))
        .await
        .unwrap_err();
    assert_eq!(err, LedgerError::MissingChartOfAccounts("1001".to_string()));
}

#[tokio::test]
async fn list_filters_by_kind_status_account_and_range() {
    let (engine, _db) = engine_with_db().await;
    sample_books(&engine).await;

    let all = engine
        .transactions(&TransactionListFilter::default())
        .await
        .unwrap();
    assert_eq!(all.len(), 7);
    // Newest first, headers only.
    assert_eq!(all[0].reference, "LON25010001");
    assert_eq!(all[6].reference, "TRX25010001");
    assert!(all.iter().all(|t| t.entries.is_empty()));

    let posted = engine
        .transactions(&TransactionListFilter {
            status: Some(TransactionStatus::Posted),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(posted.len(), 5);

    let sales = engine
        .transactions(&TransactionListFilter {
            kind: Some(TransactionKind::Sales),
            ..Default::default()
        })
        .await
        .unwrap();
    let refs: Vec<&str> = sales.iter().map(|t| t.reference.as_str()).collect();
    assert_eq!(refs, vec!["SAL25010002", "SAL25010001"]);

    let windowed = engine
        .transactions(&TransactionListFilter {
            from: Some(date(2025, 1, 12)),
            to: Some(date(2025, 1, 20)),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(windowed.len(), 4);
    assert_eq!(windowed[0].reference, "PUR25010001");
    assert_eq!(windowed[3].reference, "TRX25010002");

    let equipment = engine.account_by_code("1501").await.unwrap();
    let touching = engine
        .transactions(&TransactionListFilter {
            account_id: Some(equipment.id),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(touching.len(), 1);
    assert_eq!(touching[0].reference, "PUR25010001");

    let capped = engine
        .transactions(&TransactionListFilter {
            limit: Some(2),
            ..Default::default()
        })
        .await
        .unwrap();
    let refs: Vec<&str> = capped.iter().map(|t| t.reference.as_str()).collect();
    assert_eq!(refs, vec!["LON25010001", "PUR25010001"]);
}

#[tokio::test]
async fn inverted_ranges_are_rejected() {
    let (engine, _db) = engine_with_db().await;

    let filter = TransactionListFilter {
        from: Some(date(2025, 2, 1)),
        to: Some(date(2025, 1, 1)),
        ..Default::default()
    };
    let err = engine.transactions(&filter).await.unwrap_err();
    assert!(matches!(err, LedgerError::InvalidEntry(_)));

    let err = engine
        .income_statement(date(2025, 2, 1), date(2025, 1, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidEntry(_)));

    let err = engine
        .ledger_entries(1, date(2025, 2, 1), date(2025, 1, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidEntry(_)));
}

#[tokio::test]
async fn verify_balances_flags_drifted_accounts() {
    let (engine, db) = engine_with_db().await;
    sample_books(&engine).await;

    assert!(engine.verify_balances().await.unwrap().is_empty());

    // Drift the stored cash balance behind the engine's back.
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "UPDATE accounts SET balance = ? WHERE code = ?;",
        vec![999i64.into(), "1001".into()],
    ))
    .await
    .unwrap();

    let mismatches = engine.verify_balances().await.unwrap();
    assert_eq!(mismatches.len(), 1);
    assert_eq!(mismatches[0].code, "1001");
    assert_eq!(mismatches[0].stored, 999);
    assert_eq!(mismatches[0].derived, 14_000);
}

#[tokio::test]
async fn verify_balances_starts_from_the_opening_balance() {
    let (engine, db) = engine_with_db().await;
    engine
        .create_account(
            CreateAccountCmd::new(
                "1901",
                "Petty Cash",
                AccountKind::Asset,
                AccountCategory::Current,
            )
            .opening_balance(1_000),
        )
        .await
        .unwrap();

    assert!(engine.verify_balances().await.unwrap().is_empty());

    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "UPDATE accounts SET balance = ? WHERE code = ?;",
        vec![555i64.into(), "1901".into()],
    ))
    .await
    .unwrap();

    let mismatches = engine.verify_balances().await.unwrap();
    assert_eq!(mismatches.len(), 1);
    assert_eq!(mismatches[0].stored, 555);
    assert_eq!(mismatches[0].derived, 1_000);
}
