use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::{DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    Account, AccountCategory, AccountKind, AccountStatus, BalanceSheet, CashFlowStatement,
    IncomeStatement, LedgerError, ResultLedger, StatementLine, TransactionStatus, TrialBalance,
    TrialBalanceRow, accounts, entries,
    reports::{BalanceSheetBucket, balance_sheet_bucket},
    transactions,
};

use super::{Engine, with_tx};

pub(super) fn validate_range(start: DateTime<Utc>, end: DateTime<Utc>) -> ResultLedger<()> {
    if start > end {
        return Err(LedgerError::InvalidEntry(
            "invalid range: start must be <= end".to_string(),
        ));
    }
    Ok(())
}

/// Posted transactions dated inside `[start, end]`, ordered by `(date, id)`.
pub(super) async fn posted_transactions_between(
    db: &DatabaseTransaction,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> ResultLedger<Vec<transactions::Model>> {
    let models = transactions::Entity::find()
        .filter(transactions::Column::Status.eq(TransactionStatus::Posted.as_str()))
        .filter(transactions::Column::Date.gte(start))
        .filter(transactions::Column::Date.lte(end))
        .order_by_asc(transactions::Column::Date)
        .order_by_asc(transactions::Column::Id)
        .all(db)
        .await?;
    Ok(models)
}

/// Entry rows belonging to `transaction_ids`, in insertion order.
pub(super) async fn entries_for_transactions(
    db: &DatabaseTransaction,
    transaction_ids: &[i32],
) -> ResultLedger<Vec<entries::Model>> {
    if transaction_ids.is_empty() {
        return Ok(Vec::new());
    }
    let models = entries::Entity::find()
        .filter(entries::Column::TransactionId.is_in(transaction_ids.to_vec()))
        .order_by_asc(entries::Column::Id)
        .all(db)
        .await?;
    Ok(models)
}

/// Kind and category of every account, keyed by id.
pub(super) async fn account_profiles(
    db: &DatabaseTransaction,
) -> ResultLedger<HashMap<i32, (AccountKind, AccountCategory)>> {
    let models = accounts::Entity::find().all(db).await?;
    let mut profiles = HashMap::with_capacity(models.len());
    for model in models {
        profiles.insert(
            model.id,
            (
                AccountKind::try_from(model.kind.as_str())?,
                AccountCategory::try_from(model.category.as_str())?,
            ),
        );
    }
    Ok(profiles)
}

/// Splits a balance into trial balance columns along the account's normal
/// side. A negative balance flips to the opposite column.
fn normal_side_columns(kind: AccountKind, balance: i64) -> (i64, i64) {
    if kind.is_debit_normal() {
        if balance >= 0 { (balance, 0) } else { (0, -balance) }
    } else if balance >= 0 {
        (0, balance)
    } else {
        (-balance, 0)
    }
}

impl Engine {
    /// Trial balance over all active accounts.
    ///
    /// Each balance lands in the column of its normal side; the two column
    /// totals must agree when the books are consistent.
    pub async fn trial_balance(&self) -> ResultLedger<TrialBalance> {
        with_tx!(self, |db_tx| {
            let models = accounts::Entity::find()
                .filter(accounts::Column::Status.eq(AccountStatus::Active.as_str()))
                .order_by_asc(accounts::Column::Code)
                .all(&db_tx)
                .await?;

            let mut rows = Vec::with_capacity(models.len());
            let mut total_debit = 0;
            let mut total_credit = 0;
            for model in models {
                let account = Account::try_from(model)?;
                let (debit, credit) = normal_side_columns(account.kind, account.balance);
                total_debit += debit;
                total_credit += credit;
                rows.push(TrialBalanceRow {
                    account_id: account.id,
                    code: account.code,
                    name: account.name,
                    kind: account.kind,
                    debit,
                    credit,
                });
            }

            Ok(TrialBalance {
                rows,
                total_debit,
                total_credit,
            })
        })
    }

    /// Balance sheet over active accounts, grouped by category.
    pub async fn balance_sheet(&self) -> ResultLedger<BalanceSheet> {
        with_tx!(self, |db_tx| {
            let models = accounts::Entity::find()
                .filter(accounts::Column::Status.eq(AccountStatus::Active.as_str()))
                .order_by_asc(accounts::Column::Code)
                .all(&db_tx)
                .await?;

            let mut report = BalanceSheet::default();
            for model in models {
                let account = Account::try_from(model)?;
                let amount = account.balance.abs();
                match balance_sheet_bucket(account.kind, account.category) {
                    Some(BalanceSheetBucket::CurrentAssets) => report.current_assets += amount,
                    Some(BalanceSheetBucket::FixedAssets) => report.fixed_assets += amount,
                    Some(BalanceSheetBucket::CurrentLiabilities) => {
                        report.current_liabilities += amount;
                    }
                    Some(BalanceSheetBucket::LongTermLiabilities) => {
                        report.long_term_liabilities += amount;
                    }
                    Some(BalanceSheetBucket::Equity) => report.equity += amount,
                    None => {}
                }
            }

            report.total_assets = report.current_assets + report.fixed_assets;
            report.total_liabilities = report.current_liabilities + report.long_term_liabilities;
            Ok(report)
        })
    }

    /// Income statement over posted transactions dated in `[start, end]`.
    ///
    /// Revenue lines sum `credit - debit`, expense lines `debit - credit`.
    /// Accounts without activity in the range are left out.
    pub async fn income_statement(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ResultLedger<IncomeStatement> {
        validate_range(start, end)?;
        with_tx!(self, |db_tx| {
            let tx_models = posted_transactions_between(&db_tx, start, end).await?;
            let transaction_ids: Vec<i32> = tx_models.iter().map(|t| t.id).collect();
            let entry_models = entries_for_transactions(&db_tx, &transaction_ids).await?;

            let mut sums: HashMap<i32, (i64, i64)> = HashMap::new();
            for entry in &entry_models {
                let slot = sums.entry(entry.account_id).or_insert((0, 0));
                slot.0 += entry.debit;
                slot.1 += entry.credit;
            }

            let account_models = accounts::Entity::find()
                .order_by_asc(accounts::Column::Code)
                .all(&db_tx)
                .await?;

            let mut revenue = Vec::new();
            let mut expenses = Vec::new();
            let mut total_revenue = 0;
            let mut total_expenses = 0;
            for model in account_models {
                let account = Account::try_from(model)?;
                let Some((debit, credit)) = sums.get(&account.id).copied() else {
                    continue;
                };
                match account.kind {
                    AccountKind::Revenue => {
                        let amount = credit - debit;
                        total_revenue += amount;
                        revenue.push(StatementLine {
                            account_id: account.id,
                            code: account.code,
                            name: account.name,
                            amount,
                        });
                    }
                    AccountKind::Expense => {
                        let amount = debit - credit;
                        total_expenses += amount;
                        expenses.push(StatementLine {
                            account_id: account.id,
                            code: account.code,
                            name: account.name,
                            amount,
                        });
                    }
                    _ => {}
                }
            }

            Ok(IncomeStatement {
                revenue,
                expenses,
                total_revenue,
                total_expenses,
                net_income: total_revenue - total_expenses,
            })
        })
    }

    /// Cash flow statement over posted transactions dated in `[start, end]`.
    ///
    /// Each entry's net `debit - credit` lands in one bucket: operating for
    /// revenue and expense accounts, investing for fixed-category accounts,
    /// financing for liability and equity accounts. Other asset movements
    /// stay out of the buckets.
    pub async fn cash_flow(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ResultLedger<CashFlowStatement> {
        validate_range(start, end)?;
        with_tx!(self, |db_tx| {
            let tx_models = posted_transactions_between(&db_tx, start, end).await?;
            let transaction_ids: Vec<i32> = tx_models.iter().map(|t| t.id).collect();
            let entry_models = entries_for_transactions(&db_tx, &transaction_ids).await?;
            let profiles = account_profiles(&db_tx).await?;

            let mut report = CashFlowStatement::default();
            for entry in &entry_models {
                let (kind, category) = profiles
                    .get(&entry.account_id)
                    .copied()
                    .ok_or(LedgerError::AccountNotFound(entry.account_id))?;
                let net = entry.debit - entry.credit;
                match kind {
                    AccountKind::Revenue | AccountKind::Expense => report.operating += net,
                    _ if category == AccountCategory::Fixed => report.investing += net,
                    AccountKind::Liability | AccountKind::Equity => report.financing += net,
                    AccountKind::Asset => {}
                }
            }

            report.net = report.operating + report.investing + report.financing;
            Ok(report)
        })
    }
}
