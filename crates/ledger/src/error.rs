//! The module contains the errors the ledger can throw.
//!
//! The most common ones are:
//!
//! - [`UnbalancedEntries`] thrown when the debit and credit totals of a
//!   transaction differ.
//! - [`MissingChartOfAccounts`] thrown when a report needs a default account
//!   that was never seeded.
//!
//!  [`UnbalancedEntries`]: LedgerError::UnbalancedEntries
//!  [`MissingChartOfAccounts`]: LedgerError::MissingChartOfAccounts
use sea_orm::DbErr;
use thiserror::Error;

/// Ledger custom errors.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("\"{0}\" already exists")]
    DuplicateCode(String),
    #[error("Account {0} not found")]
    AccountNotFound(i32),
    #[error("Invalid account: {0}")]
    InvalidAccount(String),
    #[error("Account {0} has ledger entries")]
    AccountInUse(i32),
    #[error("\"{0}\" is a system account")]
    SystemAccount(String),
    #[error("Chart of accounts not seeded: \"{0}\" missing")]
    MissingChartOfAccounts(String),
    #[error("Transaction {0} not found")]
    TransactionNotFound(i32),
    #[error("Transaction has no entries")]
    EmptyTransaction,
    #[error("Invalid entry: {0}")]
    InvalidEntry(String),
    #[error("Unbalanced entries: debit {debit} != credit {credit}")]
    UnbalancedEntries { debit: i64, credit: i64 },
    #[error("Transaction {0} already posted")]
    AlreadyPosted(i32),
    #[error("Transaction {0} already void")]
    AlreadyVoided(i32),
    #[error("Transaction {0} is not a draft")]
    OnlyDraftDeletable(i32),
    #[error("Currency {0} not found")]
    CurrencyNotFound(i32),
    #[error("Invalid currency: {0}")]
    InvalidCurrency(String),
    #[error("Amount overflow")]
    AmountOverflow,
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for LedgerError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::DuplicateCode(a), Self::DuplicateCode(b)) => a == b,
            (Self::AccountNotFound(a), Self::AccountNotFound(b)) => a == b,
            (Self::InvalidAccount(a), Self::InvalidAccount(b)) => a == b,
            (Self::AccountInUse(a), Self::AccountInUse(b)) => a == b,
            (Self::SystemAccount(a), Self::SystemAccount(b)) => a == b,
            (Self::MissingChartOfAccounts(a), Self::MissingChartOfAccounts(b)) => a == b,
            (Self::TransactionNotFound(a), Self::TransactionNotFound(b)) => a == b,
            (Self::EmptyTransaction, Self::EmptyTransaction) => true,
            (Self::InvalidEntry(a), Self::InvalidEntry(b)) => a == b,
            (
                Self::UnbalancedEntries {
                    debit: da,
                    credit: ca,
                },
                Self::UnbalancedEntries {
                    debit: db,
                    credit: cb,
                },
            ) => da == db && ca == cb,
            (Self::AlreadyPosted(a), Self::AlreadyPosted(b)) => a == b,
            (Self::AlreadyVoided(a), Self::AlreadyVoided(b)) => a == b,
            (Self::OnlyDraftDeletable(a), Self::OnlyDraftDeletable(b)) => a == b,
            (Self::CurrencyNotFound(a), Self::CurrencyNotFound(b)) => a == b,
            (Self::InvalidCurrency(a), Self::InvalidCurrency(b)) => a == b,
            (Self::AmountOverflow, Self::AmountOverflow) => true,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
