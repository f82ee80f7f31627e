//! Reporting currencies.
//!
//! A [`Currency`] carries an exchange rate against the ledger base unit,
//! stored in micros ([`RATE_SCALE`](crate::RATE_SCALE) per unit).
//! Switching the books from one currency to another rescales every stored
//! amount by `new_rate / old_rate`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    pub id: i32,
    pub code: String,
    pub name: String,
    pub rate_micros: i64,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "currencies")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub code: String,
    pub name: String,
    pub rate_micros: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Currency {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            code: model.code,
            name: model.name,
            rate_micros: model.rate_micros,
        }
    }
}
