//! Account registry primitives.
//!
//! An `Account` is a bucket in the chart of accounts. Its kind fixes the
//! normal balance side: debits increase asset and expense accounts, credits
//! increase liability, equity and revenue accounts.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::LedgerError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    Asset,
    Liability,
    Equity,
    Revenue,
    Expense,
}

impl AccountKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Liability => "liability",
            Self::Equity => "equity",
            Self::Revenue => "revenue",
            Self::Expense => "expense",
        }
    }

    /// Returns `true` when a debit increases the account balance.
    pub fn is_debit_normal(self) -> bool {
        matches!(self, Self::Asset | Self::Expense)
    }

    /// Signed balance change caused by an entry of `debit` and `credit`.
    pub fn signed_delta(self, debit: i64, credit: i64) -> i64 {
        if self.is_debit_normal() {
            debit - credit
        } else {
            credit - debit
        }
    }
}

impl TryFrom<&str> for AccountKind {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "asset" => Ok(Self::Asset),
            "liability" => Ok(Self::Liability),
            "equity" => Ok(Self::Equity),
            "revenue" => Ok(Self::Revenue),
            "expense" => Ok(Self::Expense),
            other => Err(LedgerError::InvalidAccount(format!(
                "invalid account kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccountCategory {
    Current,
    Fixed,
    CurrentLiability,
    LongTermLiability,
    Capital,
    Operational,
}

impl AccountCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Current => "current",
            Self::Fixed => "fixed",
            Self::CurrentLiability => "current-liability",
            Self::LongTermLiability => "long-term-liability",
            Self::Capital => "capital",
            Self::Operational => "operational",
        }
    }
}

impl TryFrom<&str> for AccountCategory {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "current" => Ok(Self::Current),
            "fixed" => Ok(Self::Fixed),
            "current-liability" => Ok(Self::CurrentLiability),
            "long-term-liability" => Ok(Self::LongTermLiability),
            "capital" => Ok(Self::Capital),
            "operational" => Ok(Self::Operational),
            other => Err(LedgerError::InvalidAccount(format!(
                "invalid account category: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    #[default]
    Active,
    Inactive,
}

impl AccountStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

impl TryFrom<&str> for AccountStatus {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            other => Err(LedgerError::InvalidAccount(format!(
                "invalid account status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: i32,
    pub code: String,
    pub name: String,
    pub kind: AccountKind,
    pub category: AccountCategory,
    pub balance: i64,
    pub opening_balance: i64,
    pub system: bool,
    pub status: AccountStatus,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub code: String,
    pub name: String,
    pub kind: String,
    pub category: String,
    pub balance: i64,
    pub opening_balance: i64,
    pub system: bool,
    pub status: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::entries::Entity")]
    Entries,
}

impl Related<super::entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Entries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Account {
    type Error = LedgerError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            code: model.code,
            name: model.name,
            kind: AccountKind::try_from(model.kind.as_str())?,
            category: AccountCategory::try_from(model.category.as_str())?,
            balance: model.balance,
            opening_balance: model.opening_balance,
            system: model.system,
            status: AccountStatus::try_from(model.status.as_str())?,
        })
    }
}
