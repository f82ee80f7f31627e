use std::error::Error;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, TimeZone, Utc};
use clap::{Args, Parser, Subcommand};
use sea_orm::{Database, DatabaseConnection};
use tracing_subscriber::EnvFilter;

use ledger::{
    Account, AccountCategory, AccountKind, AccountStatus, BalanceSheet, CashFlowStatement,
    CreateAccountCmd, CreateTransactionCmd, Currency, Engine, EntryCmd, IncomeStatement,
    LedgerError, LedgerLine, Money, RATE_SCALE, RevalueCmd, Transaction, TransactionKind,
    TransactionListFilter, TransactionStatus, TrialBalance, UpdateAccountCmd,
};
use migration::MigratorTrait;

#[derive(Parser, Debug)]
#[command(name = "ledger_admin")]
#[command(about = "Admin utilities for the ledger (accounts, postings, reports)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./ledger.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Seed the default chart of accounts (migrations run on connect).
    Init,
    Account(Accounts),
    Currency(Currencies),
    Tx(Tx),
    Report(Reports),
    Revalue(RevalueArgs),
}

#[derive(Args, Debug)]
struct Accounts {
    #[command(subcommand)]
    command: AccountCommand,
}

#[derive(Subcommand, Debug)]
enum AccountCommand {
    Create(AccountCreateArgs),
    /// List accounts, active only unless `--all`.
    List {
        #[arg(long)]
        all: bool,
    },
    Show(AccountRefArgs),
    Update(AccountUpdateArgs),
    Activate(AccountRefArgs),
    Deactivate(AccountRefArgs),
    Delete(AccountRefArgs),
}

#[derive(Args, Debug)]
struct AccountRefArgs {
    /// Account code, e.g. `1001`.
    #[arg(long)]
    code: String,
}

#[derive(Args, Debug)]
struct AccountCreateArgs {
    #[arg(long)]
    code: String,
    #[arg(long)]
    name: String,
    /// One of: asset, liability, equity, revenue, expense.
    #[arg(long)]
    kind: String,
    /// One of: current, fixed, current-liability, long-term-liability,
    /// capital, operational.
    #[arg(long)]
    category: String,
    /// Opening balance as a decimal amount, e.g. `1500.00`.
    #[arg(long, default_value = "0")]
    opening_balance: String,
    /// Protect the account from deletion.
    #[arg(long)]
    system: bool,
}

#[derive(Args, Debug)]
struct AccountUpdateArgs {
    #[arg(long)]
    code: String,
    #[arg(long)]
    name: Option<String>,
    /// New category, same values as `account create --category`.
    #[arg(long)]
    category: Option<String>,
}

#[derive(Args, Debug)]
struct Currencies {
    #[command(subcommand)]
    command: CurrencyCommand,
}

#[derive(Subcommand, Debug)]
enum CurrencyCommand {
    Add(CurrencyAddArgs),
    List,
    SetRate(CurrencySetRateArgs),
}

#[derive(Args, Debug)]
struct CurrencyAddArgs {
    /// Currency code, e.g. `USD`.
    #[arg(long)]
    code: String,
    #[arg(long)]
    name: String,
    /// Exchange rate in millionths, so `1000000` is a 1:1 rate.
    #[arg(long)]
    rate_micros: i64,
}

#[derive(Args, Debug)]
struct CurrencySetRateArgs {
    #[arg(long)]
    code: String,
    /// Exchange rate in millionths, so `1000000` is a 1:1 rate.
    #[arg(long)]
    rate_micros: i64,
}

#[derive(Args, Debug)]
struct Tx {
    #[command(subcommand)]
    command: TxCommand,
}

#[derive(Subcommand, Debug)]
enum TxCommand {
    Record(TxRecordArgs),
    Post(TxRefArgs),
    Void(TxRefArgs),
    Delete(TxRefArgs),
    Show(TxRefArgs),
    List(TxListArgs),
}

#[derive(Args, Debug)]
struct TxRefArgs {
    /// Transaction id.
    #[arg(long)]
    id: i32,
}

#[derive(Args, Debug)]
struct TxRecordArgs {
    /// One of: general, sales, purchase, payroll, loan.
    #[arg(long, default_value = "general")]
    kind: String,
    /// Transaction date as `YYYY-MM-DD`; defaults to today.
    #[arg(long)]
    date: Option<String>,
    /// Debit leg as `CODE=AMOUNT`; repeat for multiple legs.
    #[arg(long = "debit", value_name = "CODE=AMOUNT")]
    debits: Vec<String>,
    /// Credit leg as `CODE=AMOUNT`; repeat for multiple legs.
    #[arg(long = "credit", value_name = "CODE=AMOUNT")]
    credits: Vec<String>,
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    payment_method: Option<String>,
    #[arg(long)]
    description: Option<String>,
    /// Post immediately instead of leaving a draft.
    #[arg(long)]
    post: bool,
    /// Recorded as the acting user on the transaction.
    #[arg(long, default_value = "admin")]
    created_by: String,
}

#[derive(Args, Debug)]
struct TxListArgs {
    /// Filter by kind, same values as `tx record --kind`.
    #[arg(long)]
    kind: Option<String>,
    /// Filter by status: draft, posted or void.
    #[arg(long)]
    status: Option<String>,
    /// Only transactions touching this account code.
    #[arg(long)]
    account: Option<String>,
    /// Start date as `YYYY-MM-DD`, inclusive.
    #[arg(long)]
    from: Option<String>,
    /// End date as `YYYY-MM-DD`, inclusive.
    #[arg(long)]
    to: Option<String>,
    /// Cap the number of rows, newest first.
    #[arg(long)]
    limit: Option<u64>,
}

#[derive(Args, Debug)]
struct Reports {
    /// Print the report as JSON instead of plain text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: ReportCommand,
}

#[derive(Subcommand, Debug)]
enum ReportCommand {
    /// Per-account debit and credit columns over active accounts.
    TrialBalance,
    /// Assets, liabilities and equity as of now.
    BalanceSheet,
    /// Revenue and expense activity over a date range.
    Income(RangeArgs),
    /// Cash movement bucketed into operating, investing and financing.
    CashFlow(RangeArgs),
    /// Entry history of one account with a running balance.
    Ledger(LedgerArgs),
    /// Entry history of the cash account.
    CashBook(RangeArgs),
    /// Compare stored account balances against the posted entries.
    Verify,
}

#[derive(Args, Debug)]
struct RangeArgs {
    /// Start date as `YYYY-MM-DD`, inclusive.
    #[arg(long)]
    from: String,
    /// End date as `YYYY-MM-DD`, inclusive.
    #[arg(long)]
    to: String,
}

#[derive(Args, Debug)]
struct LedgerArgs {
    /// Account code.
    #[arg(long)]
    account: String,

    #[command(flatten)]
    range: RangeArgs,
}

#[derive(Args, Debug)]
struct RevalueArgs {
    /// Code of the currency the books are kept in now.
    #[arg(long)]
    old: String,
    /// Code of the currency to restate the books into.
    #[arg(long)]
    new: String,
    /// Also rewrite account balances and ledger entries.
    #[arg(long)]
    rescale_ledger: bool,
}

fn parse_account_kind(raw: &str) -> Result<AccountKind, String> {
    AccountKind::try_from(raw).map_err(|_| format!("unknown account kind: {raw}"))
}

fn parse_account_category(raw: &str) -> Result<AccountCategory, String> {
    AccountCategory::try_from(raw).map_err(|_| format!("unknown account category: {raw}"))
}

fn parse_kind(raw: &str) -> Result<TransactionKind, String> {
    TransactionKind::try_from(raw).map_err(|_| format!("unknown transaction kind: {raw}"))
}

fn parse_status(raw: &str) -> Result<TransactionStatus, String> {
    TransactionStatus::try_from(raw).map_err(|_| format!("unknown transaction status: {raw}"))
}

fn parse_amount(raw: &str) -> Result<i64, String> {
    let money = raw
        .parse::<Money>()
        .map_err(|_| format!("invalid amount: {raw}"))?;
    Ok(money.minor())
}

/// Splits a `CODE=AMOUNT` leg into an account code and minor units.
fn parse_leg(raw: &str) -> Result<(String, i64), String> {
    let Some((code, rest)) = raw.split_once('=') else {
        return Err(format!("expected CODE=AMOUNT, got: {raw}"));
    };
    let code = code.trim();
    if code.is_empty() {
        return Err(format!("expected CODE=AMOUNT, got: {raw}"));
    }
    let minor = parse_amount(rest.trim())?;
    if minor <= 0 {
        return Err(format!("amount must be positive: {raw}"));
    }
    Ok((code.to_string(), minor))
}

fn parse_day(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| format!("invalid date (expected YYYY-MM-DD): {raw}"))
}

fn day_start(day: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&day.and_time(NaiveTime::MIN))
}

/// Inclusive end of `day`: one nanosecond before the next midnight, so
/// sub-second timestamps within 23:59:59 still fall inside the range.
fn day_end(day: NaiveDate) -> DateTime<Utc> {
    day_start(day) + (TimeDelta::days(1) - TimeDelta::nanoseconds(1))
}

fn parse_or_exit<T>(parsed: Result<T, String>) -> T {
    match parsed {
        Ok(value) => value,
        Err(message) => {
            eprintln!("{message}");
            std::process::exit(2);
        }
    }
}

fn parse_range(range: &RangeArgs) -> (DateTime<Utc>, DateTime<Utc>) {
    let from = day_start(parse_or_exit(parse_day(&range.from)));
    let to = day_end(parse_or_exit(parse_day(&range.to)));
    (from, to)
}

async fn resolve_account(
    engine: &Engine,
    code: &str,
) -> Result<Account, Box<dyn Error + Send + Sync>> {
    match engine.account_by_code(code).await {
        Ok(account) => Ok(account),
        Err(LedgerError::MissingChartOfAccounts(_)) => {
            eprintln!("account not found: {code}");
            std::process::exit(1);
        }
        Err(err) => Err(err.into()),
    }
}

async fn resolve_currency(
    engine: &Engine,
    code: &str,
) -> Result<Currency, Box<dyn Error + Send + Sync>> {
    let currencies = engine.currencies().await?;
    match currencies
        .into_iter()
        .find(|currency| currency.code.eq_ignore_ascii_case(code))
    {
        Some(currency) => Ok(currency),
        None => {
            eprintln!("currency not found: {code}");
            std::process::exit(1);
        }
    }
}

fn amount(minor: i64) -> String {
    Money::new(minor).to_string()
}

/// Amount cell that stays blank for the unused side of an entry.
fn cell(minor: i64) -> String {
    if minor == 0 {
        String::new()
    } else {
        amount(minor)
    }
}

fn format_rate(rate_micros: i64) -> String {
    format!("{}.{:06}", rate_micros / RATE_SCALE, rate_micros % RATE_SCALE)
}

fn print_account_header() {
    println!(
        "{:<6} {:<30} {:<10} {:<20} {:>14} {:>14} {}",
        "CODE", "NAME", "KIND", "CATEGORY", "OPENING", "BALANCE", "STATUS"
    );
}

fn print_account_row(account: &Account) {
    println!(
        "{:<6} {:<30} {:<10} {:<20} {:>14} {:>14} {}",
        account.code,
        account.name,
        account.kind.as_str(),
        account.category.as_str(),
        amount(account.opening_balance),
        amount(account.balance),
        account.status.as_str(),
    );
}

fn print_account_detail(account: &Account) {
    println!("id:              {}", account.id);
    println!("code:            {}", account.code);
    println!("name:            {}", account.name);
    println!("kind:            {}", account.kind.as_str());
    println!("category:        {}", account.category.as_str());
    println!("opening balance: {}", amount(account.opening_balance));
    println!("balance:         {}", amount(account.balance));
    println!("system:          {}", account.system);
    println!("status:          {}", account.status.as_str());
}

fn print_transaction_header() {
    println!(
        "{:>5} {:<12} {:<10} {:<9} {:<8} {:>14} {}",
        "ID", "REFERENCE", "DATE", "KIND", "STATUS", "AMOUNT", "NOTE"
    );
}

fn print_transaction_row(tx: &Transaction) {
    let date = tx.date.format("%Y-%m-%d").to_string();
    println!(
        "{:>5} {:<12} {:<10} {:<9} {:<8} {:>14} {}",
        tx.id,
        tx.reference,
        date,
        tx.kind.as_str(),
        tx.status.as_str(),
        amount(tx.amount),
        tx.description.as_deref().unwrap_or(""),
    );
}

async fn print_transaction_detail(
    engine: &Engine,
    tx: &Transaction,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let accounts = engine.accounts().await?;
    let code_of = |account_id: i32| {
        accounts
            .iter()
            .find(|account| account.id == account_id)
            .map_or_else(|| account_id.to_string(), |account| account.code.clone())
    };

    println!("{} {} {}", tx.reference, tx.kind.as_str(), tx.status.as_str());
    println!("date:       {}", tx.date.format("%Y-%m-%d"));
    println!("amount:     {}", amount(tx.amount));
    println!("created by: {}", tx.created_by);
    if let Some(category) = &tx.category {
        println!("category:   {category}");
    }
    if let Some(method) = &tx.payment_method {
        println!("payment:    {method}");
    }
    if let Some(description) = &tx.description {
        println!("note:       {description}");
    }
    println!();
    println!("{:<6} {:>14} {:>14} {}", "CODE", "DEBIT", "CREDIT", "NOTE");
    for entry in &tx.entries {
        println!(
            "{:<6} {:>14} {:>14} {}",
            code_of(entry.account_id),
            cell(entry.debit),
            cell(entry.credit),
            entry.description.as_deref().unwrap_or(""),
        );
    }
    Ok(())
}

fn print_trial_balance(report: &TrialBalance) {
    println!("{:<6} {:<30} {:>14} {:>14}", "CODE", "NAME", "DEBIT", "CREDIT");
    for row in &report.rows {
        println!(
            "{:<6} {:<30} {:>14} {:>14}",
            row.code,
            row.name,
            amount(row.debit),
            amount(row.credit),
        );
    }
    println!(
        "{:<6} {:<30} {:>14} {:>14}",
        "",
        "TOTAL",
        amount(report.total_debit),
        amount(report.total_credit),
    );
}

fn print_balance_sheet(report: &BalanceSheet) {
    println!("ASSETS");
    println!("  {:<20} {:>14}", "current", amount(report.current_assets));
    println!("  {:<20} {:>14}", "fixed", amount(report.fixed_assets));
    println!("  {:<20} {:>14}", "total", amount(report.total_assets));
    println!("LIABILITIES");
    println!(
        "  {:<20} {:>14}",
        "current",
        amount(report.current_liabilities)
    );
    println!(
        "  {:<20} {:>14}",
        "long-term",
        amount(report.long_term_liabilities)
    );
    println!("  {:<20} {:>14}", "total", amount(report.total_liabilities));
    println!("EQUITY");
    println!("  {:<20} {:>14}", "total", amount(report.equity));
}

fn print_income_statement(report: &IncomeStatement) {
    println!("REVENUE");
    for line in &report.revenue {
        println!(
            "  {:<6} {:<30} {:>14}",
            line.code,
            line.name,
            amount(line.amount)
        );
    }
    println!("  {:<6} {:<30} {:>14}", "", "total", amount(report.total_revenue));
    println!("EXPENSES");
    for line in &report.expenses {
        println!(
            "  {:<6} {:<30} {:>14}",
            line.code,
            line.name,
            amount(line.amount)
        );
    }
    println!("  {:<6} {:<30} {:>14}", "", "total", amount(report.total_expenses));
    println!("{:<40}{:>14}", "NET INCOME", amount(report.net_income));
}

fn print_cash_flow(report: &CashFlowStatement) {
    println!("{:<12} {:>14}", "operating", amount(report.operating));
    println!("{:<12} {:>14}", "investing", amount(report.investing));
    println!("{:<12} {:>14}", "financing", amount(report.financing));
    println!("{:<12} {:>14}", "net", amount(report.net));
}

fn print_ledger_lines(lines: &[LedgerLine]) {
    println!(
        "{:<10} {:<12} {:>14} {:>14} {:>14} {}",
        "DATE", "REFERENCE", "DEBIT", "CREDIT", "BALANCE", "NOTE"
    );
    for line in lines {
        let date = line.date.format("%Y-%m-%d").to_string();
        println!(
            "{:<10} {:<12} {:>14} {:>14} {:>14} {}",
            date,
            line.reference,
            cell(line.debit),
            cell(line.credit),
            amount(line.running_balance),
            line.description.as_deref().unwrap_or(""),
        );
    }
}

async fn run_account(
    engine: &Engine,
    command: AccountCommand,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    match command {
        AccountCommand::Create(args) => {
            let kind = parse_or_exit(parse_account_kind(&args.kind));
            let category = parse_or_exit(parse_account_category(&args.category));
            let opening = parse_or_exit(parse_amount(&args.opening_balance));

            let mut cmd = CreateAccountCmd::new(args.code, args.name, kind, category)
                .opening_balance(opening);
            if args.system {
                cmd = cmd.system();
            }

            let account = engine.create_account(cmd).await?;
            println!("created account: {} {}", account.code, account.name);
        }
        AccountCommand::List { all } => {
            let accounts = if all {
                engine.accounts().await?
            } else {
                engine.active_accounts().await?
            };
            print_account_header();
            for account in &accounts {
                print_account_row(account);
            }
        }
        AccountCommand::Show(args) => {
            let account = resolve_account(engine, &args.code).await?;
            print_account_detail(&account);
        }
        AccountCommand::Update(args) => {
            let account = resolve_account(engine, &args.code).await?;
            let mut cmd = UpdateAccountCmd::new(account.id);
            if let Some(name) = args.name {
                cmd = cmd.name(name);
            }
            if let Some(category) = &args.category {
                cmd = cmd.category(parse_or_exit(parse_account_category(category)));
            }
            let updated = engine.update_account(cmd).await?;
            println!("updated account: {} {}", updated.code, updated.name);
        }
        AccountCommand::Activate(args) => {
            let account = resolve_account(engine, &args.code).await?;
            engine
                .set_account_status(account.id, AccountStatus::Active)
                .await?;
            println!("activated account: {}", account.code);
        }
        AccountCommand::Deactivate(args) => {
            let account = resolve_account(engine, &args.code).await?;
            engine
                .set_account_status(account.id, AccountStatus::Inactive)
                .await?;
            println!("deactivated account: {}", account.code);
        }
        AccountCommand::Delete(args) => {
            let account = resolve_account(engine, &args.code).await?;
            engine.delete_account(account.id).await?;
            println!("deleted account: {}", account.code);
        }
    }
    Ok(())
}

async fn run_currency(
    engine: &Engine,
    command: CurrencyCommand,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    match command {
        CurrencyCommand::Add(args) => {
            let currency = engine
                .create_currency(&args.code, &args.name, args.rate_micros)
                .await?;
            println!(
                "created currency: {} at rate {}",
                currency.code,
                format_rate(currency.rate_micros)
            );
        }
        CurrencyCommand::List => {
            let currencies = engine.currencies().await?;
            println!("{:<5} {:<24} {:>16}", "CODE", "NAME", "RATE");
            for currency in &currencies {
                println!(
                    "{:<5} {:<24} {:>16}",
                    currency.code,
                    currency.name,
                    format_rate(currency.rate_micros),
                );
            }
        }
        CurrencyCommand::SetRate(args) => {
            let currency = resolve_currency(engine, &args.code).await?;
            let updated = engine
                .set_currency_rate(currency.id, args.rate_micros)
                .await?;
            println!(
                "updated rate of {}: {}",
                updated.code,
                format_rate(updated.rate_micros)
            );
        }
    }
    Ok(())
}

async fn run_tx(
    engine: &Engine,
    command: TxCommand,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    match command {
        TxCommand::Record(args) => {
            let kind = parse_or_exit(parse_kind(&args.kind));
            let date = match &args.date {
                Some(raw) => day_start(parse_or_exit(parse_day(raw))),
                None => Utc::now(),
            };

            let mut legs = Vec::new();
            for raw in &args.debits {
                let (code, minor) = parse_or_exit(parse_leg(raw));
                let account = resolve_account(engine, &code).await?;
                legs.push(EntryCmd::debit(account.id, minor));
            }
            for raw in &args.credits {
                let (code, minor) = parse_or_exit(parse_leg(raw));
                let account = resolve_account(engine, &code).await?;
                legs.push(EntryCmd::credit(account.id, minor));
            }

            let mut cmd = CreateTransactionCmd::new(kind, date, args.created_by);
            for leg in legs {
                cmd = cmd.entry(leg);
            }
            if let Some(category) = args.category {
                cmd = cmd.category(category);
            }
            if let Some(method) = args.payment_method {
                cmd = cmd.payment_method(method);
            }
            if let Some(description) = args.description {
                cmd = cmd.description(description);
            }
            if args.post {
                cmd = cmd.post();
            }

            let tx = engine.create_transaction(cmd).await?;
            println!(
                "recorded {} ({}, {})",
                tx.reference,
                tx.status.as_str(),
                amount(tx.amount)
            );
        }
        TxCommand::Post(args) => {
            let tx = engine.post_transaction(args.id).await?;
            println!("posted {}", tx.reference);
        }
        TxCommand::Void(args) => {
            let tx = engine.void_transaction(args.id).await?;
            println!("voided {}", tx.reference);
        }
        TxCommand::Delete(args) => {
            engine.delete_transaction(args.id).await?;
            println!("deleted transaction {}", args.id);
        }
        TxCommand::Show(args) => {
            let tx = engine.transaction_with_entries(args.id).await?;
            print_transaction_detail(engine, &tx).await?;
        }
        TxCommand::List(args) => {
            let mut filter = TransactionListFilter::default();
            if let Some(kind) = &args.kind {
                filter.kind = Some(parse_or_exit(parse_kind(kind)));
            }
            if let Some(status) = &args.status {
                filter.status = Some(parse_or_exit(parse_status(status)));
            }
            if let Some(code) = &args.account {
                filter.account_id = Some(resolve_account(engine, code).await?.id);
            }
            if let Some(from) = &args.from {
                filter.from = Some(day_start(parse_or_exit(parse_day(from))));
            }
            if let Some(to) = &args.to {
                filter.to = Some(day_end(parse_or_exit(parse_day(to))));
            }
            filter.limit = args.limit;

            let transactions = engine.transactions(&filter).await?;
            print_transaction_header();
            for tx in &transactions {
                print_transaction_row(tx);
            }
        }
    }
    Ok(())
}

async fn run_report(
    engine: &Engine,
    report: Reports,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    match report.command {
        ReportCommand::TrialBalance => {
            let trial = engine.trial_balance().await?;
            if report.json {
                println!("{}", serde_json::to_string_pretty(&trial)?);
                return Ok(());
            }
            print_trial_balance(&trial);
        }
        ReportCommand::BalanceSheet => {
            let sheet = engine.balance_sheet().await?;
            if report.json {
                println!("{}", serde_json::to_string_pretty(&sheet)?);
                return Ok(());
            }
            print_balance_sheet(&sheet);
        }
        ReportCommand::Income(range) => {
            let (from, to) = parse_range(&range);
            let income = engine.income_statement(from, to).await?;
            if report.json {
                println!("{}", serde_json::to_string_pretty(&income)?);
                return Ok(());
            }
            print_income_statement(&income);
        }
        ReportCommand::CashFlow(range) => {
            let (from, to) = parse_range(&range);
            let flow = engine.cash_flow(from, to).await?;
            if report.json {
                println!("{}", serde_json::to_string_pretty(&flow)?);
                return Ok(());
            }
            print_cash_flow(&flow);
        }
        ReportCommand::Ledger(args) => {
            let account = resolve_account(engine, &args.account).await?;
            let (from, to) = parse_range(&args.range);
            let lines = engine.ledger_entries(account.id, from, to).await?;
            if report.json {
                println!("{}", serde_json::to_string_pretty(&lines)?);
                return Ok(());
            }
            println!(
                "{} {} ({})",
                account.code,
                account.name,
                account.kind.as_str()
            );
            print_ledger_lines(&lines);
        }
        ReportCommand::CashBook(range) => {
            let (from, to) = parse_range(&range);
            let book = engine.cash_book(from, to).await?;
            if report.json {
                println!("{}", serde_json::to_string_pretty(&book)?);
                return Ok(());
            }
            println!("{} {}", book.account_code, book.account_name);
            print_ledger_lines(&book.lines);
        }
        ReportCommand::Verify => {
            let mismatches = engine.verify_balances().await?;
            if report.json {
                println!("{}", serde_json::to_string_pretty(&mismatches)?);
                return Ok(());
            }
            if mismatches.is_empty() {
                println!("all account balances match the posted entries");
                return Ok(());
            }
            println!("{:<6} {:>14} {:>14}", "CODE", "STORED", "DERIVED");
            for mismatch in &mismatches {
                println!(
                    "{:<6} {:>14} {:>14}",
                    mismatch.code,
                    amount(mismatch.stored),
                    amount(mismatch.derived),
                );
            }
            std::process::exit(1);
        }
    }
    Ok(())
}

async fn run_revalue(
    engine: &Engine,
    args: RevalueArgs,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let old = resolve_currency(engine, &args.old).await?;
    let new = resolve_currency(engine, &args.new).await?;

    let mut cmd = RevalueCmd::new(old.id, new.id);
    if args.rescale_ledger {
        cmd = cmd.rescale_ledger();
    }

    let summary = engine.revalue(cmd).await?;
    println!(
        "revalued books from {} to {}",
        summary.old_code, summary.new_code
    );
    println!("  transactions:  {}", summary.transactions);
    println!("  invoices:      {}", summary.invoices);
    println!("  loans:         {}", summary.loans);
    println!("  loan payments: {}", summary.loan_payments);
    println!("  assets:        {}", summary.assets);
    if args.rescale_ledger {
        println!("  accounts:      {}", summary.accounts);
        println!("  entries:       {}", summary.entries);
    }
    Ok(())
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    tracing::debug!(database_url, "database ready");
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::Init => {
            let seeded = engine.seed_chart_of_accounts().await?;
            if seeded == 0 {
                println!("chart of accounts already seeded");
            } else {
                println!("seeded {seeded} accounts");
            }
        }
        Command::Account(Accounts { command }) => run_account(&engine, command).await?,
        Command::Currency(Currencies { command }) => run_currency(&engine, command).await?,
        Command::Tx(Tx { command }) => run_tx(&engine, command).await?,
        Command::Report(report) => run_report(&engine, report).await?,
        Command::Revalue(args) => run_revalue(&engine, args).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_bounds_span_the_full_day() {
        let day = parse_day("2025-01-31").unwrap();
        assert_eq!(
            day_start(day),
            Utc.with_ymd_and_hms(2025, 1, 31, 0, 0, 0).unwrap()
        );

        // Timestamps taken from a clock carry sub-second precision; the last
        // second of the day must be covered all the way through.
        let late = Utc.with_ymd_and_hms(2025, 1, 31, 23, 59, 59).unwrap()
            + TimeDelta::milliseconds(500);
        let end = day_end(day);
        assert!(late <= end);
        assert!(end < Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap());
    }
}
