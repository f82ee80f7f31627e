//! Transaction entries.
//!
//! An [`Entry`] is a single debit or credit line applied to an account as
//! part of a [`Transaction`](crate::Transaction). Exactly one of `debit` and
//! `credit` is positive and the other is zero. Amounts are stored as integer
//! **minor units** (e.g. cents).
//!
//! In the ledger, *every* change to account balances happens via entries.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: i32,
    pub transaction_id: i32,
    pub account_id: i32,
    pub debit: i64,
    pub credit: i64,
    pub description: Option<String>,
}

impl Entry {
    /// Net movement of the entry seen from the debit side.
    pub fn net(&self) -> i64 {
        self.debit - self.credit
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions_entries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub transaction_id: i32,
    pub account_id: i32,
    pub debit: i64,
    pub credit: i64,
    pub description: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::transactions::Entity",
        from = "Column::TransactionId",
        to = "super::transactions::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Transactions,
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Accounts,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Entry {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            transaction_id: model.transaction_id,
            account_id: model.account_id,
            debit: model.debit,
            credit: model.credit,
            description: model.description,
        }
    }
}
