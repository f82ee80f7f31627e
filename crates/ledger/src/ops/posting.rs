use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};

use crate::{
    AccountKind, CreateTransactionCmd, Entry, EntryCmd, LedgerError, ResultLedger, Transaction,
    TransactionKind, TransactionStatus, accounts, entries, transactions,
};

use super::accounts::apply_balance_delta;
use super::{Engine, normalize_optional_text, normalize_required_text, with_tx};

/// Checks the double-entry constraints of an entry set before anything is
/// written: at least one entry, every entry strictly on one side, and equal
/// debit and credit totals.
///
/// Returns `(total_debit, total_credit)`.
pub(super) fn validate_entries(entry_cmds: &[EntryCmd]) -> ResultLedger<(i64, i64)> {
    if entry_cmds.is_empty() {
        return Err(LedgerError::EmptyTransaction);
    }

    let mut total_debit: i64 = 0;
    let mut total_credit: i64 = 0;
    for (index, entry) in entry_cmds.iter().enumerate() {
        if entry.debit < 0 || entry.credit < 0 {
            return Err(LedgerError::InvalidEntry(format!(
                "entry {index}: amounts must not be negative"
            )));
        }
        if (entry.debit > 0) == (entry.credit > 0) {
            return Err(LedgerError::InvalidEntry(format!(
                "entry {index}: exactly one of debit and credit must be positive"
            )));
        }
        total_debit = total_debit
            .checked_add(entry.debit)
            .ok_or(LedgerError::AmountOverflow)?;
        total_credit = total_credit
            .checked_add(entry.credit)
            .ok_or(LedgerError::AmountOverflow)?;
    }

    if total_debit != total_credit {
        return Err(LedgerError::UnbalancedEntries {
            debit: total_debit,
            credit: total_credit,
        });
    }

    Ok((total_debit, total_credit))
}

/// Next reference for `kind` in the month of `date`: one past the highest
/// suffix already issued for the `<prefix><YYMM>` stem. Deleted drafts leave
/// gaps behind the maximum; their numbers are not reissued.
async fn next_reference(
    db: &DatabaseTransaction,
    kind: TransactionKind,
    date: DateTime<Utc>,
) -> ResultLedger<String> {
    let stem = format!("{}{}", kind.prefix(), date.format("%y%m"));
    // Suffixes are zero padded to a fixed width, so the lexicographic maximum
    // is also the numeric maximum.
    let newest = transactions::Entity::find()
        .filter(transactions::Column::Reference.starts_with(&stem))
        .order_by_desc(transactions::Column::Reference)
        .one(db)
        .await?;
    let highest = newest
        .as_ref()
        .and_then(|model| model.reference.get(stem.len()..))
        .and_then(|suffix| suffix.parse::<u64>().ok())
        .unwrap_or(0);
    Ok(kind.reference(date, highest + 1))
}

/// Loads the kind of every account in `account_ids`, failing with
/// [`LedgerError::AccountNotFound`] for ids that do not exist.
async fn account_kinds(
    db: &DatabaseTransaction,
    account_ids: &[i32],
) -> ResultLedger<HashMap<i32, AccountKind>> {
    let mut unique = account_ids.to_vec();
    unique.sort_unstable();
    unique.dedup();

    let models = accounts::Entity::find()
        .filter(accounts::Column::Id.is_in(unique.clone()))
        .all(db)
        .await?;

    let mut kinds = HashMap::with_capacity(models.len());
    for model in models {
        kinds.insert(model.id, AccountKind::try_from(model.kind.as_str())?);
    }

    for account_id in unique {
        if !kinds.contains_key(&account_id) {
            return Err(LedgerError::AccountNotFound(account_id));
        }
    }

    Ok(kinds)
}

/// Loads a transaction row or fails with
/// [`LedgerError::TransactionNotFound`].
pub(super) async fn require_transaction(
    db: &DatabaseTransaction,
    transaction_id: i32,
) -> ResultLedger<transactions::Model> {
    transactions::Entity::find_by_id(transaction_id)
        .one(db)
        .await?
        .ok_or(LedgerError::TransactionNotFound(transaction_id))
}

/// Entry rows of a transaction in insertion order.
pub(super) async fn entries_of(
    db: &DatabaseTransaction,
    transaction_id: i32,
) -> ResultLedger<Vec<entries::Model>> {
    let models = entries::Entity::find()
        .filter(entries::Column::TransactionId.eq(transaction_id))
        .order_by_asc(entries::Column::Id)
        .all(db)
        .await?;
    Ok(models)
}

/// Builds the domain transaction from its header and entry rows.
pub(super) fn attach_entries(
    model: transactions::Model,
    entry_models: Vec<entries::Model>,
) -> ResultLedger<Transaction> {
    let mut transaction = Transaction::try_from(model)?;
    transaction.entries = entry_models.into_iter().map(Entry::from).collect();
    Ok(transaction)
}

/// Loads a transaction's entries and attaches them to the domain value.
pub(super) async fn with_entries(
    db: &DatabaseTransaction,
    model: transactions::Model,
) -> ResultLedger<Transaction> {
    let entry_models = entries_of(db, model.id).await?;
    attach_entries(model, entry_models)
}

/// Applies every entry's signed delta to its account, multiplied by
/// `factor` (`1` to post, `-1` to reverse).
async fn apply_entry_deltas(
    db: &DatabaseTransaction,
    entry_models: &[entries::Model],
    kinds: &HashMap<i32, AccountKind>,
    factor: i64,
) -> ResultLedger<()> {
    for entry in entry_models {
        let kind = kinds
            .get(&entry.account_id)
            .ok_or(LedgerError::AccountNotFound(entry.account_id))?;
        let delta = kind.signed_delta(entry.debit, entry.credit) * factor;
        apply_balance_delta(db, entry.account_id, delta).await?;
    }
    Ok(())
}

async fn set_status(
    db: &DatabaseTransaction,
    transaction_id: i32,
    status: TransactionStatus,
) -> ResultLedger<transactions::Model> {
    let active = transactions::ActiveModel {
        id: ActiveValue::Set(transaction_id),
        status: ActiveValue::Set(status.as_str().to_string()),
        ..Default::default()
    };
    let updated = active.update(db).await?;
    Ok(updated)
}

impl Engine {
    /// Records a transaction together with its entries.
    ///
    /// The entry set is validated before anything is written; a rejected
    /// transaction leaves no rows behind. With `cmd.post` set, the entries
    /// are applied to account balances in the same atomic unit as the
    /// inserts, otherwise the transaction stays a draft.
    pub async fn create_transaction(&self, cmd: CreateTransactionCmd) -> ResultLedger<Transaction> {
        let (total_debit, _) = validate_entries(&cmd.entries)?;
        let created_by = normalize_required_text(&cmd.created_by, "created_by")?;
        let category = normalize_optional_text(cmd.category.as_deref());
        let payment_method = normalize_optional_text(cmd.payment_method.as_deref());
        let description = normalize_optional_text(cmd.description.as_deref());

        with_tx!(self, |db_tx| {
            let account_ids: Vec<i32> = cmd.entries.iter().map(|e| e.account_id).collect();
            let kinds = account_kinds(&db_tx, &account_ids).await?;

            let reference = next_reference(&db_tx, cmd.kind, cmd.date).await?;
            let status = if cmd.post {
                TransactionStatus::Posted
            } else {
                TransactionStatus::Draft
            };

            let header = transactions::ActiveModel {
                reference: ActiveValue::Set(reference),
                date: ActiveValue::Set(cmd.date),
                kind: ActiveValue::Set(cmd.kind.as_str().to_string()),
                category: ActiveValue::Set(category),
                amount: ActiveValue::Set(cmd.amount.unwrap_or(total_debit)),
                status: ActiveValue::Set(status.as_str().to_string()),
                payment_method: ActiveValue::Set(payment_method),
                created_by: ActiveValue::Set(created_by),
                description: ActiveValue::Set(description),
                ..Default::default()
            }
            .insert(&db_tx)
            .await?;

            for entry in &cmd.entries {
                entries::ActiveModel {
                    transaction_id: ActiveValue::Set(header.id),
                    account_id: ActiveValue::Set(entry.account_id),
                    debit: ActiveValue::Set(entry.debit),
                    credit: ActiveValue::Set(entry.credit),
                    description: ActiveValue::Set(normalize_optional_text(
                        entry.description.as_deref(),
                    )),
                    ..Default::default()
                }
                .insert(&db_tx)
                .await?;
            }

            let entry_models = entries_of(&db_tx, header.id).await?;
            if status == TransactionStatus::Posted {
                apply_entry_deltas(&db_tx, &entry_models, &kinds, 1).await?;
            }

            attach_entries(header, entry_models)
        })
    }

    /// Applies a draft transaction to account balances, exactly once.
    pub async fn post_transaction(&self, transaction_id: i32) -> ResultLedger<Transaction> {
        with_tx!(self, |db_tx| {
            let model = require_transaction(&db_tx, transaction_id).await?;
            match TransactionStatus::try_from(model.status.as_str())? {
                TransactionStatus::Posted => Err(LedgerError::AlreadyPosted(transaction_id)),
                TransactionStatus::Void => Err(LedgerError::AlreadyVoided(transaction_id)),
                TransactionStatus::Draft => {
                    let entry_models = entries_of(&db_tx, transaction_id).await?;
                    let account_ids: Vec<i32> =
                        entry_models.iter().map(|e| e.account_id).collect();
                    let kinds = account_kinds(&db_tx, &account_ids).await?;
                    apply_entry_deltas(&db_tx, &entry_models, &kinds, 1).await?;

                    let updated =
                        set_status(&db_tx, transaction_id, TransactionStatus::Posted).await?;
                    attach_entries(updated, entry_models)
                }
            }
        })
    }

    /// Voids a transaction.
    ///
    /// A posted transaction gets its balance effects reversed; a draft is
    /// only marked void. Either way the history stays in place and the
    /// transaction can never be applied again.
    pub async fn void_transaction(&self, transaction_id: i32) -> ResultLedger<Transaction> {
        with_tx!(self, |db_tx| {
            let model = require_transaction(&db_tx, transaction_id).await?;
            match TransactionStatus::try_from(model.status.as_str())? {
                TransactionStatus::Void => Err(LedgerError::AlreadyVoided(transaction_id)),
                TransactionStatus::Draft => {
                    let updated =
                        set_status(&db_tx, transaction_id, TransactionStatus::Void).await?;
                    let transaction = with_entries(&db_tx, updated).await?;
                    Ok(transaction)
                }
                TransactionStatus::Posted => {
                    let entry_models = entries_of(&db_tx, transaction_id).await?;
                    let account_ids: Vec<i32> =
                        entry_models.iter().map(|e| e.account_id).collect();
                    let kinds = account_kinds(&db_tx, &account_ids).await?;
                    apply_entry_deltas(&db_tx, &entry_models, &kinds, -1).await?;

                    let updated =
                        set_status(&db_tx, transaction_id, TransactionStatus::Void).await?;
                    attach_entries(updated, entry_models)
                }
            }
        })
    }

    /// Deletes a draft transaction and its entries.
    ///
    /// Posted and void transactions are history and cannot be removed.
    pub async fn delete_transaction(&self, transaction_id: i32) -> ResultLedger<()> {
        with_tx!(self, |db_tx| {
            let model = require_transaction(&db_tx, transaction_id).await?;
            match TransactionStatus::try_from(model.status.as_str())? {
                TransactionStatus::Draft => {
                    entries::Entity::delete_many()
                        .filter(entries::Column::TransactionId.eq(transaction_id))
                        .exec(&db_tx)
                        .await?;
                    transactions::Entity::delete_by_id(transaction_id)
                        .exec(&db_tx)
                        .await?;
                    Ok(())
                }
                TransactionStatus::Posted | TransactionStatus::Void => {
                    Err(LedgerError::OnlyDraftDeletable(transaction_id))
                }
            }
        })
    }
}
