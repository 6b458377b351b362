//! Broadcast routing.
//!
//! A [`RoutingTable`] maps a source account to the ordered, duplicate-free
//! list of group channels its updates are delivered to. It is built once from
//! the configured [`BroadcastRule`]s and never mutated afterwards.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use relay_core::dedup;

/// One `[[retweet.broadcast]]` entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BroadcastRule {
    /// Primary account; empty means none.
    pub account: String,
    /// Auxiliary accounts sharing the same destinations.
    pub accounts: Vec<String>,
    /// Destination group channels.
    pub group_nums: Vec<i64>,
}

impl BroadcastRule {
    /// Returns the rule's accounts, primary first, without duplicates.
    pub fn account_set(&self) -> Vec<String> {
        let primary = Some(&self.account).filter(|a| !a.is_empty());
        dedup(primary.into_iter().chain(&self.accounts).cloned())
    }
}

/// Account → destination channels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutingTable {
    routes: HashMap<String, Vec<i64>>,
}

impl RoutingTable {
    /// Builds the table from rules in declaration order.
    ///
    /// Channels are kept in order of first appearance across all rules; an
    /// account named by several rules receives the union of their channels.
    pub fn build(rules: &[BroadcastRule]) -> Self {
        let mut routes: HashMap<String, Vec<i64>> = HashMap::new();

        for rule in rules {
            let channels = dedup(rule.group_nums.iter().copied());
            if channels.is_empty() {
                continue;
            }

            for account in rule.account_set() {
                let entry = routes.entry(account).or_default();
                let merged = dedup(entry.iter().chain(&channels).copied());
                *entry = merged;
            }
        }

        Self { routes }
    }

    /// Returns the channels for `account`, empty if unrouted.
    pub fn channels(&self, account: &str) -> &[i64] {
        self.routes.get(account).map(Vec::as_slice).unwrap_or_default()
    }

    /// Number of routed accounts.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Iterates over `(account, channels)` pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[i64])> {
        self.routes
            .iter()
            .map(|(account, channels)| (account.as_str(), channels.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(account: &str, accounts: &[&str], groups: &[i64]) -> BroadcastRule {
        BroadcastRule {
            account: account.to_string(),
            accounts: accounts.iter().map(|a| a.to_string()).collect(),
            group_nums: groups.to_vec(),
        }
    }

    #[test]
    fn test_channels_are_deduplicated_in_order() {
        let table = RoutingTable::build(&[rule("A", &[], &[10, 20, 10])]);
        assert_eq!(table.channels("A"), &[10, 20]);
    }

    #[test]
    fn test_rules_for_same_account_are_unioned() {
        let table = RoutingTable::build(&[
            rule("A", &["B"], &[10, 20]),
            rule("", &["A"], &[30, 10]),
        ]);

        assert_eq!(table.channels("A"), &[10, 20, 30]);
        assert_eq!(table.channels("B"), &[10, 20]);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_duplicate_account_mentions_do_not_change_table() {
        let once = RoutingTable::build(&[rule("A", &["B"], &[1, 2])]);
        let repeated = RoutingTable::build(&[rule("A", &["A", "B", "B"], &[1, 2])]);
        assert_eq!(once, repeated);
    }

    #[test]
    fn test_primary_account_comes_first() {
        assert_eq!(rule("A", &["B", "A"], &[]).account_set(), vec!["A", "B"]);
        assert_eq!(rule("", &["B"], &[]).account_set(), vec!["B"]);
    }

    #[test]
    fn test_empty_rules_contribute_nothing() {
        let table = RoutingTable::build(&[rule("", &[], &[1]), rule("A", &[], &[])]);
        assert!(table.is_empty());
        assert!(table.channels("A").is_empty());
        assert!(table.channels("unknown").is_empty());
    }

    #[test]
    fn test_build_is_idempotent() {
        let rules = vec![rule("A", &["B"], &[3, 1, 3]), rule("B", &["C"], &[2, 1])];
        assert_eq!(RoutingTable::build(&rules), RoutingTable::build(&rules));
        assert_eq!(RoutingTable::build(&rules).channels("B"), &[3, 1, 2]);
    }
}
