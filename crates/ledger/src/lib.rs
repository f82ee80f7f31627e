pub use accounts::{Account, AccountCategory, AccountKind, AccountStatus};
pub use commands::{
    CreateAccountCmd, CreateTransactionCmd, EntryCmd, RevalueCmd, UpdateAccountCmd,
};
pub use currencies::Currency;
pub use entries::Entry;
pub use error::LedgerError;
pub use money::{Money, RATE_SCALE};
pub use ops::{CASH_ACCOUNT_CODE, Engine, EngineBuilder, TransactionListFilter};
pub use reports::{
    BalanceMismatch, BalanceSheet, CashBook, CashFlowStatement, IncomeStatement, LedgerLine,
    RevaluationSummary, StatementLine, TrialBalance, TrialBalanceRow,
};
pub use transactions::{Transaction, TransactionKind, TransactionStatus};

mod accounts;
mod assets;
mod commands;
mod currencies;
mod entries;
mod error;
mod invoices;
mod loan_payments;
mod loans;
mod money;
mod ops;
mod reports;
mod transactions;

type ResultLedger<T> = Result<T, LedgerError>;
