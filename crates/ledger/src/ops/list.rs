use chrono::{DateTime, Utc};

use sea_orm::{
    JoinType, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*,
};

use crate::{
    LedgerError, ResultLedger, Transaction, TransactionKind, TransactionStatus, entries,
    transactions,
};

use super::posting::{require_transaction, with_entries};
use super::{Engine, with_tx};

/// Filters for listing transactions.
///
/// `from` and `to` are both inclusive, in UTC.
#[derive(Clone, Debug, Default)]
pub struct TransactionListFilter {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    /// If present, only transactions of this kind are returned.
    pub kind: Option<TransactionKind>,
    /// If present, only transactions in this status are returned.
    pub status: Option<TransactionStatus>,
    /// If present, only transactions touching this account are returned.
    pub account_id: Option<i32>,
    /// Caps the number of rows returned, newest first.
    pub limit: Option<u64>,
}

fn validate_list_filter(filter: &TransactionListFilter) -> ResultLedger<()> {
    if let (Some(from), Some(to)) = (filter.from, filter.to)
        && from > to
    {
        return Err(LedgerError::InvalidEntry(
            "invalid range: from must be <= to".to_string(),
        ));
    }
    Ok(())
}

impl Engine {
    /// Lists transaction headers, newest first by `(date, id)`.
    ///
    /// Entries are not loaded; use [`Engine::transaction_with_entries`] for
    /// the full picture of a single transaction.
    pub async fn transactions(
        &self,
        filter: &TransactionListFilter,
    ) -> ResultLedger<Vec<Transaction>> {
        validate_list_filter(filter)?;
        with_tx!(self, |db_tx| {
            let mut query = transactions::Entity::find()
                .order_by_desc(transactions::Column::Date)
                .order_by_desc(transactions::Column::Id);

            if let Some(from) = filter.from {
                query = query.filter(transactions::Column::Date.gte(from));
            }
            if let Some(to) = filter.to {
                query = query.filter(transactions::Column::Date.lte(to));
            }
            if let Some(kind) = filter.kind {
                query = query.filter(transactions::Column::Kind.eq(kind.as_str()));
            }
            if let Some(status) = filter.status {
                query = query.filter(transactions::Column::Status.eq(status.as_str()));
            }
            if let Some(account_id) = filter.account_id {
                query = query
                    .join(JoinType::InnerJoin, transactions::Relation::Entries.def())
                    .filter(entries::Column::AccountId.eq(account_id))
                    .distinct();
            }
            if let Some(limit) = filter.limit {
                query = query.limit(limit);
            }

            let models = query.all(&db_tx).await?;
            models.into_iter().map(Transaction::try_from).collect()
        })
    }

    /// Returns one transaction with its entries in insertion order.
    pub async fn transaction_with_entries(
        &self,
        transaction_id: i32,
    ) -> ResultLedger<Transaction> {
        with_tx!(self, |db_tx| {
            let model = require_transaction(&db_tx, transaction_id).await?;
            let transaction = with_entries(&db_tx, model).await?;
            Ok(transaction)
        })
    }
}
