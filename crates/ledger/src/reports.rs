//! Read models produced by the reporting operations.
//!
//! All figures are integer minor units and cover **posted** transactions
//! only; drafts and voids never reach a report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AccountCategory, AccountKind};

/// One account row of a trial balance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalanceRow {
    pub account_id: i32,
    pub code: String,
    pub name: String,
    pub kind: AccountKind,
    /// Balance carried in the debit column, 0 when it sits on the credit side.
    pub debit: i64,
    /// Balance carried in the credit column, 0 when it sits on the debit side.
    pub credit: i64,
}

/// Trial balance over all active accounts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalance {
    pub rows: Vec<TrialBalanceRow>,
    pub total_debit: i64,
    pub total_credit: i64,
}

impl TrialBalance {
    /// The books are consistent when both columns add up to the same total.
    pub fn is_balanced(&self) -> bool {
        self.total_debit == self.total_credit
    }
}

/// Balance sheet grouped by account category.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSheet {
    pub current_assets: i64,
    pub fixed_assets: i64,
    pub total_assets: i64,
    pub current_liabilities: i64,
    pub long_term_liabilities: i64,
    pub total_liabilities: i64,
    pub equity: i64,
}

/// One account line of an income statement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementLine {
    pub account_id: i32,
    pub code: String,
    pub name: String,
    pub amount: i64,
}

/// Income statement over a date range.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeStatement {
    pub revenue: Vec<StatementLine>,
    pub expenses: Vec<StatementLine>,
    pub total_revenue: i64,
    pub total_expenses: i64,
    pub net_income: i64,
}

/// Cash flow statement over a date range, bucketed by activity.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashFlowStatement {
    pub operating: i64,
    pub investing: i64,
    pub financing: i64,
    pub net: i64,
}

/// One movement of an account ledger, with the balance after applying it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerLine {
    pub date: DateTime<Utc>,
    pub transaction_id: i32,
    pub reference: String,
    pub description: Option<String>,
    pub debit: i64,
    pub credit: i64,
    pub running_balance: i64,
}

/// Ledger of the default cash account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashBook {
    pub account_code: String,
    pub account_name: String,
    pub lines: Vec<LedgerLine>,
}

/// An account whose stored balance drifted from the one derived from its
/// posted entries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceMismatch {
    pub account_id: i32,
    pub code: String,
    pub stored: i64,
    pub derived: i64,
}

/// Row counts touched by a currency revaluation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevaluationSummary {
    pub old_code: String,
    pub new_code: String,
    pub transactions: u64,
    pub invoices: u64,
    pub loans: u64,
    pub loan_payments: u64,
    pub assets: u64,
    /// Accounts rescaled; stays 0 unless the ledger itself is rescaled.
    pub accounts: u64,
    /// Entries rescaled; stays 0 unless the ledger itself is rescaled.
    pub entries: u64,
}

/// Category bucket of a balance sheet side.
pub(crate) fn balance_sheet_bucket(
    kind: AccountKind,
    category: AccountCategory,
) -> Option<BalanceSheetBucket> {
    match kind {
        AccountKind::Asset => match category {
            AccountCategory::Fixed => Some(BalanceSheetBucket::FixedAssets),
            _ => Some(BalanceSheetBucket::CurrentAssets),
        },
        AccountKind::Liability => match category {
            AccountCategory::LongTermLiability => Some(BalanceSheetBucket::LongTermLiabilities),
            _ => Some(BalanceSheetBucket::CurrentLiabilities),
        },
        AccountKind::Equity => Some(BalanceSheetBucket::Equity),
        AccountKind::Revenue | AccountKind::Expense => None,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum BalanceSheetBucket {
    CurrentAssets,
    FixedAssets,
    CurrentLiabilities,
    LongTermLiabilities,
    Equity,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trial_balance_identity() {
        let report = TrialBalance {
            rows: Vec::new(),
            total_debit: 500,
            total_credit: 500,
        };
        assert!(report.is_balanced());

        let broken = TrialBalance {
            rows: Vec::new(),
            total_debit: 500,
            total_credit: 400,
        };
        assert!(!broken.is_balanced());
    }

    #[test]
    fn revenue_and_expense_stay_off_the_balance_sheet() {
        assert_eq!(
            balance_sheet_bucket(AccountKind::Revenue, AccountCategory::Operational),
            None
        );
        assert_eq!(
            balance_sheet_bucket(AccountKind::Expense, AccountCategory::Operational),
            None
        );
        assert_eq!(
            balance_sheet_bucket(AccountKind::Asset, AccountCategory::Fixed),
            Some(BalanceSheetBucket::FixedAssets)
        );
        assert_eq!(
            balance_sheet_bucket(AccountKind::Liability, AccountCategory::CurrentLiability),
            Some(BalanceSheetBucket::CurrentLiabilities)
        );
    }
}
