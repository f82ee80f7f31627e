use sea_orm::{ActiveValue, DatabaseTransaction, TransactionTrait, prelude::*};

use crate::{
    LedgerError, ResultLedger, RevaluationSummary, RevalueCmd, accounts, assets, entries, invoices,
    loan_payments, loans, money, transactions,
};

use super::currencies::require_currency;
use super::{Engine, with_tx};

/// Generates a rescale pass over one table: each listed monetary column is
/// multiplied by `new_rate / old_rate`, rounding half to even. Returns the
/// number of rows rewritten.
macro_rules! rescale_table {
    ($fn_name:ident, $module:ident, [$($column:ident),+]) => {
        async fn $fn_name(
            db: &DatabaseTransaction,
            new_rate: i64,
            old_rate: i64,
        ) -> ResultLedger<u64> {
            let models = $module::Entity::find().all(db).await?;
            let mut touched = 0;
            for model in models {
                let active = $module::ActiveModel {
                    id: ActiveValue::Set(model.id),
                    $($column: ActiveValue::Set(
                        money::rescale(model.$column, new_rate, old_rate)
                            .ok_or(LedgerError::AmountOverflow)?,
                    ),)+
                    ..Default::default()
                };
                active.update(db).await?;
                touched += 1;
            }
            Ok(touched)
        }
    };
}

rescale_table!(rescale_transactions, transactions, [amount]);
rescale_table!(rescale_invoices, invoices, [total]);
rescale_table!(rescale_loans, loans, [principal, remaining_balance]);
rescale_table!(rescale_loan_payments, loan_payments, [amount]);
rescale_table!(rescale_assets, assets, [purchase_value, current_value]);
rescale_table!(rescale_accounts, accounts, [balance, opening_balance]);
rescale_table!(rescale_entries, entries, [debit, credit]);

impl Engine {
    /// Switches the books from one registered currency to another, rescaling
    /// every stored amount by `new.rate / old.rate` in one atomic unit.
    ///
    /// The pass always covers transaction face amounts, invoice totals, loan
    /// principals and remaining balances, loan payments and asset values.
    /// Account balances and entry debit/credit amounts are rewritten only
    /// when [`RevalueCmd::rescale_ledger`] is set; without it they keep
    /// their old-currency values.
    ///
    /// A failed revaluation leaves every column at its pre-call value.
    pub async fn revalue(&self, cmd: RevalueCmd) -> ResultLedger<RevaluationSummary> {
        with_tx!(self, |db_tx| {
            let old = require_currency(&db_tx, cmd.old_currency_id).await?;
            let new = require_currency(&db_tx, cmd.new_currency_id).await?;
            let (old_rate, new_rate) = (old.rate_micros, new.rate_micros);
            if old_rate <= 0 || new_rate <= 0 {
                return Err(LedgerError::InvalidCurrency(
                    "rate must be positive".to_string(),
                ));
            }

            let mut summary = RevaluationSummary {
                old_code: old.code,
                new_code: new.code,
                ..Default::default()
            };

            summary.transactions = rescale_transactions(&db_tx, new_rate, old_rate).await?;
            summary.invoices = rescale_invoices(&db_tx, new_rate, old_rate).await?;
            summary.loans = rescale_loans(&db_tx, new_rate, old_rate).await?;
            summary.loan_payments = rescale_loan_payments(&db_tx, new_rate, old_rate).await?;
            summary.assets = rescale_assets(&db_tx, new_rate, old_rate).await?;

            if cmd.rescale_ledger {
                summary.accounts = rescale_accounts(&db_tx, new_rate, old_rate).await?;
                summary.entries = rescale_entries(&db_tx, new_rate, old_rate).await?;
            }

            Ok(summary)
        })
    }
}
