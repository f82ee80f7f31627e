use sea_orm::{
    ActiveValue, DatabaseTransaction, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
    prelude::*, sea_query::Expr,
};

use crate::{
    Account, AccountCategory, AccountKind, AccountStatus, CreateAccountCmd, LedgerError,
    ResultLedger, UpdateAccountCmd, accounts, entries,
};

use super::{Engine, normalize_required_text, with_tx};

/// Code of the cash account the cash book is anchored to.
pub const CASH_ACCOUNT_CODE: &str = "1001";

/// Chart of accounts seeded into a fresh ledger.
///
/// Columns: code, name, kind, category, system.
const DEFAULT_CHART: &[(&str, &str, AccountKind, AccountCategory, bool)] = &[
    (
        CASH_ACCOUNT_CODE,
        "Cash",
        AccountKind::Asset,
        AccountCategory::Current,
        true,
    ),
    ("1002", "Bank", AccountKind::Asset, AccountCategory::Current, true),
    (
        "1101",
        "Accounts Receivable",
        AccountKind::Asset,
        AccountCategory::Current,
        true,
    ),
    (
        "1201",
        "Inventory",
        AccountKind::Asset,
        AccountCategory::Current,
        false,
    ),
    (
        "1501",
        "Equipment",
        AccountKind::Asset,
        AccountCategory::Fixed,
        false,
    ),
    (
        "2001",
        "Accounts Payable",
        AccountKind::Liability,
        AccountCategory::CurrentLiability,
        true,
    ),
    (
        "2501",
        "Long Term Loans",
        AccountKind::Liability,
        AccountCategory::LongTermLiability,
        true,
    ),
    (
        "3001",
        "Owner Capital",
        AccountKind::Equity,
        AccountCategory::Capital,
        true,
    ),
    (
        "4001",
        "Sales Revenue",
        AccountKind::Revenue,
        AccountCategory::Operational,
        true,
    ),
    (
        "5001",
        "Salary Expense",
        AccountKind::Expense,
        AccountCategory::Operational,
        true,
    ),
    (
        "5101",
        "Operating Expense",
        AccountKind::Expense,
        AccountCategory::Operational,
        false,
    ),
];

/// Loads an account row or fails with [`LedgerError::AccountNotFound`].
pub(super) async fn require_account(
    db: &DatabaseTransaction,
    account_id: i32,
) -> ResultLedger<accounts::Model> {
    accounts::Entity::find_by_id(account_id)
        .one(db)
        .await?
        .ok_or(LedgerError::AccountNotFound(account_id))
}

/// Loads a well-known account by code or fails with
/// [`LedgerError::MissingChartOfAccounts`].
pub(super) async fn require_account_by_code(
    db: &DatabaseTransaction,
    code: &str,
) -> ResultLedger<accounts::Model> {
    accounts::Entity::find()
        .filter(accounts::Column::Code.eq(code))
        .one(db)
        .await?
        .ok_or_else(|| LedgerError::MissingChartOfAccounts(code.to_string()))
}

/// Applies a signed delta to an account balance as a single
/// `balance = balance + ?` update, so concurrent postings against the same
/// account cannot lose increments.
pub(super) async fn apply_balance_delta(
    db: &DatabaseTransaction,
    account_id: i32,
    delta: i64,
) -> ResultLedger<()> {
    let result = accounts::Entity::update_many()
        .col_expr(
            accounts::Column::Balance,
            Expr::col(accounts::Column::Balance).add(delta),
        )
        .filter(accounts::Column::Id.eq(account_id))
        .exec(db)
        .await?;
    if result.rows_affected == 0 {
        return Err(LedgerError::AccountNotFound(account_id));
    }
    Ok(())
}

async fn insert_account(
    db: &DatabaseTransaction,
    cmd: &CreateAccountCmd,
) -> ResultLedger<Account> {
    let exists = accounts::Entity::find()
        .filter(accounts::Column::Code.eq(cmd.code.as_str()))
        .one(db)
        .await?
        .is_some();
    if exists {
        return Err(LedgerError::DuplicateCode(cmd.code.clone()));
    }

    let model = accounts::ActiveModel {
        code: ActiveValue::Set(cmd.code.clone()),
        name: ActiveValue::Set(cmd.name.clone()),
        kind: ActiveValue::Set(cmd.kind.as_str().to_string()),
        category: ActiveValue::Set(cmd.category.as_str().to_string()),
        balance: ActiveValue::Set(cmd.opening_balance),
        opening_balance: ActiveValue::Set(cmd.opening_balance),
        system: ActiveValue::Set(cmd.system),
        status: ActiveValue::Set(AccountStatus::Active.as_str().to_string()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    model.try_into()
}

impl Engine {
    /// Adds an account to the chart of accounts.
    ///
    /// The account starts active, with `balance` equal to its opening
    /// balance. Fails with [`LedgerError::DuplicateCode`] when the code is
    /// already taken.
    pub async fn create_account(&self, cmd: CreateAccountCmd) -> ResultLedger<Account> {
        let cmd = CreateAccountCmd {
            code: normalize_required_text(&cmd.code, "account code")?,
            name: normalize_required_text(&cmd.name, "account name")?,
            ..cmd
        };
        with_tx!(self, |db_tx| {
            let account = insert_account(&db_tx, &cmd).await?;
            Ok(account)
        })
    }

    /// Returns an account snapshot by id.
    pub async fn account(&self, account_id: i32) -> ResultLedger<Account> {
        with_tx!(self, |db_tx| {
            let model = require_account(&db_tx, account_id).await?;
            let account = Account::try_from(model)?;
            Ok(account)
        })
    }

    /// Returns an account snapshot by code.
    pub async fn account_by_code(&self, code: &str) -> ResultLedger<Account> {
        let code = normalize_required_text(code, "account code")?;
        with_tx!(self, |db_tx| {
            let model = accounts::Entity::find()
                .filter(accounts::Column::Code.eq(code.as_str()))
                .one(&db_tx)
                .await?
                .ok_or(LedgerError::MissingChartOfAccounts(code))?;
            let account = Account::try_from(model)?;
            Ok(account)
        })
    }

    /// Lists the whole chart of accounts ordered by code.
    pub async fn accounts(&self) -> ResultLedger<Vec<Account>> {
        with_tx!(self, |db_tx| {
            let models = accounts::Entity::find()
                .order_by_asc(accounts::Column::Code)
                .all(&db_tx)
                .await?;
            models.into_iter().map(Account::try_from).collect()
        })
    }

    /// Lists active accounts ordered by code.
    pub async fn active_accounts(&self) -> ResultLedger<Vec<Account>> {
        with_tx!(self, |db_tx| {
            let models = accounts::Entity::find()
                .filter(accounts::Column::Status.eq(AccountStatus::Active.as_str()))
                .order_by_asc(accounts::Column::Code)
                .all(&db_tx)
                .await?;
            models.into_iter().map(Account::try_from).collect()
        })
    }

    /// Renames or recategorizes an existing account.
    pub async fn update_account(&self, cmd: UpdateAccountCmd) -> ResultLedger<Account> {
        let name = match &cmd.name {
            Some(name) => Some(normalize_required_text(name, "account name")?),
            None => None,
        };
        with_tx!(self, |db_tx| {
            let model = require_account(&db_tx, cmd.account_id).await?;
            if name.is_none() && cmd.category.is_none() {
                let account = Account::try_from(model)?;
                Ok(account)
            } else {
                let mut active = accounts::ActiveModel {
                    id: ActiveValue::Set(cmd.account_id),
                    ..Default::default()
                };
                if let Some(name) = name {
                    active.name = ActiveValue::Set(name);
                }
                if let Some(category) = cmd.category {
                    active.category = ActiveValue::Set(category.as_str().to_string());
                }
                let updated = active.update(&db_tx).await?;
                let account = Account::try_from(updated)?;
                Ok(account)
            }
        })
    }

    /// Activates or deactivates an account.
    pub async fn set_account_status(
        &self,
        account_id: i32,
        status: AccountStatus,
    ) -> ResultLedger<()> {
        with_tx!(self, |db_tx| {
            require_account(&db_tx, account_id).await?;
            let active = accounts::ActiveModel {
                id: ActiveValue::Set(account_id),
                status: ActiveValue::Set(status.as_str().to_string()),
                ..Default::default()
            };
            active.update(&db_tx).await?;
            Ok(())
        })
    }

    /// Deletes an account that was never posted to.
    ///
    /// System accounts and accounts referenced by any entry are kept; they
    /// can only be deactivated.
    pub async fn delete_account(&self, account_id: i32) -> ResultLedger<()> {
        with_tx!(self, |db_tx| {
            let model = require_account(&db_tx, account_id).await?;
            if model.system {
                return Err(LedgerError::SystemAccount(model.code));
            }

            let referenced = entries::Entity::find()
                .filter(entries::Column::AccountId.eq(account_id))
                .count(&db_tx)
                .await?;
            if referenced > 0 {
                return Err(LedgerError::AccountInUse(account_id));
            }

            accounts::Entity::delete_by_id(account_id)
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    /// Seeds the default chart of accounts, skipping codes that already
    /// exist. Returns the number of accounts inserted.
    pub async fn seed_chart_of_accounts(&self) -> ResultLedger<u32> {
        with_tx!(self, |db_tx| {
            let mut inserted = 0;
            for (code, name, kind, category, system) in DEFAULT_CHART {
                let mut cmd = CreateAccountCmd::new(*code, *name, *kind, *category);
                if *system {
                    cmd = cmd.system();
                }
                match insert_account(&db_tx, &cmd).await {
                    Ok(_) => inserted += 1,
                    Err(LedgerError::DuplicateCode(_)) => {}
                    Err(err) => return Err(err),
                }
            }
            Ok(inserted)
        })
    }
}
