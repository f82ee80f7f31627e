use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::{DatabaseTransaction, JoinType, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*};

use crate::{
    AccountKind, BalanceMismatch, CashBook, LedgerLine, ResultLedger, TransactionStatus, accounts,
    entries, transactions,
};

use super::accounts::{CASH_ACCOUNT_CODE, require_account, require_account_by_code};
use super::reports::{entries_for_transactions, posted_transactions_between, validate_range};
use super::{Engine, with_tx};

/// Movements of one account over `[start, end]`, posted only, ordered by
/// `(date, transaction id, entry id)` with a running balance folded in
/// memory from 0.
async fn ledger_lines(
    db: &DatabaseTransaction,
    account: &accounts::Model,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> ResultLedger<Vec<LedgerLine>> {
    let kind = AccountKind::try_from(account.kind.as_str())?;
    let tx_models = posted_transactions_between(db, start, end).await?;
    let transaction_ids: Vec<i32> = tx_models.iter().map(|t| t.id).collect();
    let entry_models = entries_for_transactions(db, &transaction_ids).await?;

    let mut by_transaction: HashMap<i32, Vec<entries::Model>> = HashMap::new();
    for entry in entry_models {
        if entry.account_id == account.id {
            by_transaction
                .entry(entry.transaction_id)
                .or_default()
                .push(entry);
        }
    }

    let mut lines = Vec::new();
    let mut running = 0i64;
    for tx in &tx_models {
        let Some(tx_entries) = by_transaction.get(&tx.id) else {
            continue;
        };
        for entry in tx_entries {
            running += kind.signed_delta(entry.debit, entry.credit);
            lines.push(LedgerLine {
                date: tx.date,
                transaction_id: tx.id,
                reference: tx.reference.clone(),
                description: entry
                    .description
                    .clone()
                    .or_else(|| tx.description.clone()),
                debit: entry.debit,
                credit: entry.credit,
                running_balance: running,
            });
        }
    }

    Ok(lines)
}

impl Engine {
    /// Ledger of one account over `[start, end]`.
    ///
    /// Lines come back in `(date, transaction id)` order with the running
    /// balance accumulated from 0 at the start of the range.
    pub async fn ledger_entries(
        &self,
        account_id: i32,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ResultLedger<Vec<LedgerLine>> {
        validate_range(start, end)?;
        with_tx!(self, |db_tx| {
            let account = require_account(&db_tx, account_id).await?;
            let lines = ledger_lines(&db_tx, &account, start, end).await?;
            Ok(lines)
        })
    }

    /// Cash book: the ledger of the default cash account.
    ///
    /// Fails with [`MissingChartOfAccounts`] when no account carries
    /// [`CASH_ACCOUNT_CODE`].
    ///
    /// [`MissingChartOfAccounts`]: crate::LedgerError::MissingChartOfAccounts
    pub async fn cash_book(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ResultLedger<CashBook> {
        validate_range(start, end)?;
        with_tx!(self, |db_tx| {
            let cash = require_account_by_code(&db_tx, CASH_ACCOUNT_CODE).await?;
            let lines = ledger_lines(&db_tx, &cash, start, end).await?;
            Ok(CashBook {
                account_code: cash.code,
                account_name: cash.name,
                lines,
            })
        })
    }

    /// Compares every account's stored balance against the balance derived
    /// from its opening balance plus all posted entries.
    ///
    /// Returns one [`BalanceMismatch`] per drifted account; an empty vec
    /// means the books are consistent.
    pub async fn verify_balances(&self) -> ResultLedger<Vec<BalanceMismatch>> {
        with_tx!(self, |db_tx| {
            let account_models = accounts::Entity::find()
                .order_by_asc(accounts::Column::Code)
                .all(&db_tx)
                .await?;

            let mut kinds: HashMap<i32, AccountKind> =
                HashMap::with_capacity(account_models.len());
            for model in &account_models {
                kinds.insert(model.id, AccountKind::try_from(model.kind.as_str())?);
            }

            let entry_models = entries::Entity::find()
                .join(JoinType::InnerJoin, entries::Relation::Transactions.def())
                .filter(transactions::Column::Status.eq(TransactionStatus::Posted.as_str()))
                .all(&db_tx)
                .await?;

            let mut deltas: HashMap<i32, i64> = HashMap::new();
            for entry in &entry_models {
                if let Some(kind) = kinds.get(&entry.account_id) {
                    *deltas.entry(entry.account_id).or_insert(0) +=
                        kind.signed_delta(entry.debit, entry.credit);
                }
            }

            let mut mismatches = Vec::new();
            for model in account_models {
                let derived =
                    model.opening_balance + deltas.get(&model.id).copied().unwrap_or(0);
                if derived != model.balance {
                    mismatches.push(BalanceMismatch {
                        account_id: model.id,
                        code: model.code,
                        stored: model.balance,
                        derived,
                    });
                }
            }

            Ok(mismatches)
        })
    }
}
