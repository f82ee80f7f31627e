//! Transaction primitives.
//!
//! A `Transaction` is a single business event made of balanced debit and
//! credit entries. Its status walks one way through draft, posted and void.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::LedgerError;

use super::entries;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    General,
    Sales,
    Purchase,
    Payroll,
    Loan,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Sales => "sales",
            Self::Purchase => "purchase",
            Self::Payroll => "payroll",
            Self::Loan => "loan",
        }
    }

    /// Reference prefix for this kind of transaction.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::General => "TRX",
            Self::Sales => "SAL",
            Self::Purchase => "PUR",
            Self::Payroll => "PAY",
            Self::Loan => "LON",
        }
    }

    /// Builds the reference `<prefix><YYMM><sequence>` for a transaction of
    /// this kind, e.g. `TRX25010007`.
    pub fn reference(self, date: DateTime<Utc>, sequence: u64) -> String {
        format!("{}{}{:04}", self.prefix(), date.format("%y%m"), sequence)
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "general" => Ok(Self::General),
            "sales" => Ok(Self::Sales),
            "purchase" => Ok(Self::Purchase),
            "payroll" => Ok(Self::Payroll),
            "loan" => Ok(Self::Loan),
            other => Err(LedgerError::InvalidEntry(format!(
                "invalid transaction kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Draft,
    Posted,
    Void,
}

impl TransactionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Posted => "posted",
            Self::Void => "void",
        }
    }
}

impl TryFrom<&str> for TransactionStatus {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "draft" => Ok(Self::Draft),
            "posted" => Ok(Self::Posted),
            "void" => Ok(Self::Void),
            other => Err(LedgerError::InvalidEntry(format!(
                "invalid transaction status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i32,
    pub reference: String,
    pub date: DateTime<Utc>,
    pub kind: TransactionKind,
    pub category: Option<String>,
    pub amount: i64,
    pub status: TransactionStatus,
    pub payment_method: Option<String>,
    pub created_by: String,
    pub description: Option<String>,
    pub entries: Vec<entries::Entry>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub reference: String,
    pub date: DateTimeUtc,
    pub kind: String,
    pub category: Option<String>,
    pub amount: i64,
    pub status: String,
    pub payment_method: Option<String>,
    pub created_by: String,
    pub description: Option<String>,
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

impl TryFrom<Model> for Transaction {
    type Error = LedgerError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            reference: model.reference,
            date: model.date,
            kind: TransactionKind::try_from(model.kind.as_str())?,
            category: model.category,
            amount: model.amount,
            status: TransactionStatus::try_from(model.status.as_str())?,
            payment_method: model.payment_method,
            created_by: model.created_by,
            description: model.description,
            entries: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn kind_round_trips_through_str() {
        for kind in [
            TransactionKind::General,
            TransactionKind::Sales,
            TransactionKind::Purchase,
            TransactionKind::Payroll,
            TransactionKind::Loan,
        ] {
            assert_eq!(TransactionKind::try_from(kind.as_str()), Ok(kind));
        }
        assert!(TransactionKind::try_from("journal").is_err());
    }

    #[test]
    fn status_round_trips_through_str() {
        for status in [
            TransactionStatus::Draft,
            TransactionStatus::Posted,
            TransactionStatus::Void,
        ] {
            assert_eq!(TransactionStatus::try_from(status.as_str()), Ok(status));
        }
        assert!(TransactionStatus::try_from("pending").is_err());
    }

    #[test]
    fn reference_embeds_prefix_month_and_sequence() {
        let date = Utc.with_ymd_and_hms(2025, 1, 15, 9, 30, 0).unwrap();
        assert_eq!(
            TransactionKind::General.reference(date, 7),
            "TRX25010007".to_string()
        );
        assert_eq!(
            TransactionKind::Payroll.reference(date, 12),
            "PAY25010012".to_string()
        );

        let september = Utc.with_ymd_and_hms(2025, 9, 1, 0, 0, 0).unwrap();
        assert_eq!(
            TransactionKind::Sales.reference(september, 1),
            "SAL25090001".to_string()
        );
    }
}
