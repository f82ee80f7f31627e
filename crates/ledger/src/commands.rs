//! Command structs for ledger operations.
//!
//! These types group parameters for write operations (account creation,
//! transaction recording, revaluation), keeping call sites readable and
//! avoiding long argument lists.

use chrono::{DateTime, Utc};

use crate::{AccountCategory, AccountKind, TransactionKind};

/// One debit or credit line of a transaction to be recorded.
#[derive(Clone, Debug)]
pub struct EntryCmd {
    pub account_id: i32,
    pub debit: i64,
    pub credit: i64,
    pub description: Option<String>,
}

impl EntryCmd {
    /// Debit `amount` minor units to `account_id`.
    #[must_use]
    pub fn debit(account_id: i32, amount: i64) -> Self {
        Self {
            account_id,
            debit: amount,
            credit: 0,
            description: None,
        }
    }

    /// Credit `amount` minor units to `account_id`.
    #[must_use]
    pub fn credit(account_id: i32, amount: i64) -> Self {
        Self {
            account_id,
            debit: 0,
            credit: amount,
            description: None,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Create a transaction together with its entries.
#[derive(Clone, Debug)]
pub struct CreateTransactionCmd {
    pub kind: TransactionKind,
    pub date: DateTime<Utc>,
    pub created_by: String,
    pub category: Option<String>,
    pub amount: Option<i64>,
    pub payment_method: Option<String>,
    pub description: Option<String>,
    pub post: bool,
    pub entries: Vec<EntryCmd>,
}

impl CreateTransactionCmd {
    #[must_use]
    pub fn new(kind: TransactionKind, date: DateTime<Utc>, created_by: impl Into<String>) -> Self {
        Self {
            kind,
            date,
            created_by: created_by.into(),
            category: None,
            amount: None,
            payment_method: None,
            description: None,
            post: false,
            entries: Vec::new(),
        }
    }

    #[must_use]
    pub fn entry(mut self, entry: EntryCmd) -> Self {
        self.entries.push(entry);
        self
    }

    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Face amount of the event. Defaults to the debit total of the entries.
    #[must_use]
    pub fn amount(mut self, amount: i64) -> Self {
        self.amount = Some(amount);
        self
    }

    #[must_use]
    pub fn payment_method(mut self, payment_method: impl Into<String>) -> Self {
        self.payment_method = Some(payment_method.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Post the transaction immediately instead of leaving it as a draft.
    #[must_use]
    pub fn post(mut self) -> Self {
        self.post = true;
        self
    }
}

/// Create an account in the chart of accounts.
#[derive(Clone, Debug)]
pub struct CreateAccountCmd {
    pub code: String,
    pub name: String,
    pub kind: AccountKind,
    pub category: AccountCategory,
    pub opening_balance: i64,
    pub system: bool,
}

impl CreateAccountCmd {
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        kind: AccountKind,
        category: AccountCategory,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            kind,
            category,
            opening_balance: 0,
            system: false,
        }
    }

    #[must_use]
    pub fn opening_balance(mut self, opening_balance: i64) -> Self {
        self.opening_balance = opening_balance;
        self
    }

    /// Mark the account as a system account, protecting it from deletion.
    #[must_use]
    pub fn system(mut self) -> Self {
        self.system = true;
        self
    }
}

/// Update an existing account.
#[derive(Clone, Debug)]
pub struct UpdateAccountCmd {
    pub account_id: i32,
    pub name: Option<String>,
    pub category: Option<AccountCategory>,
}

impl UpdateAccountCmd {
    #[must_use]
    pub fn new(account_id: i32) -> Self {
        Self {
            account_id,
            name: None,
            category: None,
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn category(mut self, category: AccountCategory) -> Self {
        self.category = Some(category);
        self
    }
}

/// Switch the books from one currency to another.
#[derive(Clone, Debug)]
pub struct RevalueCmd {
    pub old_currency_id: i32,
    pub new_currency_id: i32,
    pub rescale_ledger: bool,
}

impl RevalueCmd {
    #[must_use]
    pub fn new(old_currency_id: i32, new_currency_id: i32) -> Self {
        Self {
            old_currency_id,
            new_currency_id,
            rescale_ledger: false,
        }
    }

    /// Also rescale account balances and posted entry amounts, not only the
    /// transaction face amounts and the monetary side tables.
    #[must_use]
    pub fn rescale_ledger(mut self) -> Self {
        self.rescale_ledger = true;
        self
    }
}
