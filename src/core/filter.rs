// iislens - core/filter.rs
//
// Account allow-list filtering of parsed records.
// Core layer: pure logic, no I/O dependencies.

use crate::core::model::LogRecord;
use std::collections::HashSet;

/// An optional account allow-list, parsed from free-form user text.
///
/// Empty means "no filtering": every record passes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountAllowList {
    accounts: HashSet<String>,
}

impl AccountAllowList {
    /// Parse a comma-separated account list.
    ///
    /// Entries are trimmed; empty entries are dropped, so inputs like
    /// `"user42, user99,"` and `""` behave as expected.
    pub fn parse(input: &str) -> Self {
        let accounts = input
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
        Self { accounts }
    }

    /// Returns true if no accounts are listed (filtering disabled).
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Number of listed accounts.
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Exact-match membership test.
    pub fn contains(&self, account: &str) -> bool {
        self.accounts.contains(account)
    }
}

/// Keep the records whose derived `account` is a member of the allow-list.
///
/// An empty allow-list is the identity: all records pass. Records with no
/// account never match a non-empty list. Pure over its inputs; order is
/// preserved, so the function is idempotent.
pub fn filter_by_account(records: &[LogRecord], allow: &AccountAllowList) -> Vec<LogRecord> {
    if allow.is_empty() {
        return records.to_vec();
    }

    records
        .iter()
        .filter(|rec| {
            rec.account
                .as_deref()
                .is_some_and(|account| allow.contains(account))
        })
        .cloned()
        .collect()
}
