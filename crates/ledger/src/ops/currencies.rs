use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{Currency, LedgerError, ResultLedger, currencies};

use super::{Engine, with_tx};

/// Loads a currency row or fails with [`LedgerError::CurrencyNotFound`].
pub(super) async fn require_currency(
    db: &DatabaseTransaction,
    currency_id: i32,
) -> ResultLedger<currencies::Model> {
    currencies::Entity::find_by_id(currency_id)
        .one(db)
        .await?
        .ok_or(LedgerError::CurrencyNotFound(currency_id))
}

fn normalize_currency_field(value: &str, label: &str) -> ResultLedger<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::InvalidCurrency(format!(
            "{label} must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

fn validate_rate(rate_micros: i64) -> ResultLedger<()> {
    if rate_micros <= 0 {
        return Err(LedgerError::InvalidCurrency(
            "rate must be positive".to_string(),
        ));
    }
    Ok(())
}

impl Engine {
    /// Registers a currency with its exchange rate in micros.
    pub async fn create_currency(
        &self,
        code: &str,
        name: &str,
        rate_micros: i64,
    ) -> ResultLedger<Currency> {
        let code = normalize_currency_field(code, "currency code")?;
        let name = normalize_currency_field(name, "currency name")?;
        validate_rate(rate_micros)?;
        with_tx!(self, |db_tx| {
            let exists = currencies::Entity::find()
                .filter(currencies::Column::Code.eq(code.as_str()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(LedgerError::DuplicateCode(code));
            }

            let model = currencies::ActiveModel {
                code: ActiveValue::Set(code),
                name: ActiveValue::Set(name),
                rate_micros: ActiveValue::Set(rate_micros),
                ..Default::default()
            }
            .insert(&db_tx)
            .await?;

            Ok(Currency::from(model))
        })
    }

    /// Lists registered currencies ordered by code.
    pub async fn currencies(&self) -> ResultLedger<Vec<Currency>> {
        with_tx!(self, |db_tx| {
            let models = currencies::Entity::find()
                .order_by_asc(currencies::Column::Code)
                .all(&db_tx)
                .await?;
            Ok(models.into_iter().map(Currency::from).collect())
        })
    }

    /// Updates the exchange rate of an existing currency.
    pub async fn set_currency_rate(
        &self,
        currency_id: i32,
        rate_micros: i64,
    ) -> ResultLedger<Currency> {
        validate_rate(rate_micros)?;
        with_tx!(self, |db_tx| {
            require_currency(&db_tx, currency_id).await?;
            let active = currencies::ActiveModel {
                id: ActiveValue::Set(currency_id),
                rate_micros: ActiveValue::Set(rate_micros),
                ..Default::default()
            };
            let updated = active.update(&db_tx).await?;
            Ok(Currency::from(updated))
        })
    }
}
