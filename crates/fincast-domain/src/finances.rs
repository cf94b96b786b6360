//! Derived monthly income/expense buckets.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::month::MonthKey;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
/// Distinguishes the two sides of a month bucket.
pub enum EntryKind {
    Income,
    Expense,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntryKind::Income => "income",
            EntryKind::Expense => "expense",
        };
        f.write_str(label)
    }
}

/// One projected line within a month bucket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub amount: f64,
    pub description: String,
    pub kind: EntryKind,
    pub change_id: Uuid,
}

/// Incomes, expenses and running net for one calendar month.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MonthBucket {
    pub incomes: Vec<Entry>,
    pub expenses: Vec<Entry>,
    pub net: f64,
}

impl MonthBucket {
    /// Appends an entry and folds its amount into the net, incrementally.
    pub fn push(&mut self, entry: Entry) {
        match entry.kind {
            EntryKind::Income => {
                self.net += entry.amount;
                self.incomes.push(entry);
            }
            EntryKind::Expense => {
                self.net -= entry.amount;
                self.expenses.push(entry);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.incomes.is_empty() && self.expenses.is_empty()
    }
}

/// Mapping from month key to bucket; keys unique, map order chronological.
pub type MonthlyFinances = BTreeMap<MonthKey, MonthBucket>;
