//! Category matching - classify expenses against the owner's rules
//!
//! A pure function of (transactions, rules): no I/O, deterministic, and
//! safe to re-run against an updated rule set because categories are
//! recomputed from scratch every time.

use regex::{Regex, RegexBuilder};

use crate::domain::{CategoryRule, Transaction, TxKind, OTHER_CATEGORY};

/// Compiled per-owner rule set.
///
/// Rule rows are grouped by category name in first-appearance order and
/// each category's identifying texts become one case-insensitive
/// alternation, so a batch pays the regex compilation cost once instead
/// of once per transaction.
pub struct RuleMatcher {
    /// (category name, matcher) in first-defined order - the tie-break
    matchers: Vec<(String, Regex)>,
}

impl RuleMatcher {
    pub fn compile(rules: &[CategoryRule]) -> Self {
        let mut matchers: Vec<(String, Vec<String>)> = Vec::new();

        for rule in rules {
            let Some(text) = rule.matching_text.as_deref() else {
                // Manually-assigned category: no auto-match capability
                continue;
            };
            match matchers.iter().position(|(name, _)| rule.name_matches(name)) {
                Some(idx) => matchers[idx].1.push(as_pattern(text)),
                None => matchers.push((rule.name.clone(), vec![as_pattern(text)])),
            }
        }

        let matchers = matchers
            .into_iter()
            .map(|(name, patterns)| (name, build_alternation(&patterns)))
            .collect();

        Self { matchers }
    }

    /// First category (in first-defined order) whose texts match the
    /// description. Later rules never override an earlier match.
    pub fn classify(&self, description: &str) -> Option<&str> {
        self.matchers
            .iter()
            .find(|(_, re)| re.is_match(description))
            .map(|(name, _)| name.as_str())
    }
}

/// Identifying texts are usually plain substrings but may carry pattern
/// syntax (e.g. `uber \*eats`). Texts that are not valid patterns are
/// matched literally.
fn as_pattern(text: &str) -> String {
    if Regex::new(text).is_ok() {
        text.to_string()
    } else {
        regex::escape(text)
    }
}

fn build_alternation(patterns: &[String]) -> Regex {
    RegexBuilder::new(&patterns.join("|"))
        .case_insensitive(true)
        .build()
        // Every branch was individually validated or escaped, so the
        // joined pattern compiles.
        .unwrap()
}

/// Assign exactly one category to every transaction in the batch.
///
/// Only expenses are classified; income keeps no category. Expenses no
/// rule matches fall back to "Other", so an expense category is never
/// empty after this call.
pub fn categorize(transactions: &mut [Transaction], rules: &[CategoryRule]) {
    let matcher = RuleMatcher::compile(rules);

    for tx in transactions.iter_mut() {
        tx.category = match tx.kind() {
            TxKind::Income => None,
            TxKind::Expense => Some(
                matcher
                    .classify(&tx.description)
                    .unwrap_or(OTHER_CATEGORY)
                    .to_string(),
            ),
        };
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use super::*;

    fn rule(name: &str, text: &str) -> CategoryRule {
        CategoryRule::new(1, name, Some(text)).unwrap()
    }

    fn expense(description: &str) -> Transaction {
        Transaction::new(
            1,
            NaiveDate::from_ymd_opt(2023, 5, 10).unwrap(),
            description,
            Decimal::new(-12_900, 2),
        )
    }

    fn income(description: &str) -> Transaction {
        Transaction::new(
            1,
            NaiveDate::from_ymd_opt(2023, 5, 25).unwrap(),
            description,
            Decimal::new(2_500_000, 2),
        )
    }

    #[test]
    fn test_substring_match_is_case_insensitive() {
        let rules = vec![rule("Subscriptions", "netflix")];
        let mut batch = vec![expense("NETFLIX SE")];
        categorize(&mut batch, &rules);
        assert_eq!(batch[0].category.as_deref(), Some("Subscriptions"));
    }

    #[test]
    fn test_unmatched_expense_falls_back_to_other() {
        let rules = vec![rule("Subscriptions", "netflix")];
        let mut batch = vec![expense("RANDOM SHOP 42")];
        categorize(&mut batch, &rules);
        assert_eq!(batch[0].category.as_deref(), Some("Other"));
    }

    #[test]
    fn test_income_gets_no_category() {
        let rules = vec![rule("Salary", "lön")];
        let mut batch = vec![income("LÖN MAJ")];
        categorize(&mut batch, &rules);
        assert!(batch[0].category.is_none());
    }

    #[test]
    fn test_first_defined_rule_wins() {
        // "coop" appears in both rule sets; the earlier-defined category
        // must win no matter how tempting the later one is.
        let rules = vec![rule("Food", "coop"), rule("Fuel", "coop tanka")];
        let mut batch = vec![expense("COOP TANKA 917")];
        categorize(&mut batch, &rules);
        assert_eq!(batch[0].category.as_deref(), Some("Food"));
    }

    #[test]
    fn test_rows_for_same_category_share_first_position() {
        // Food defined first; a later Food row must not lose to the
        // Travel rule defined in between.
        let rules = vec![
            rule("Food", "ica"),
            rule("Travel", "willys resecenter"),
            rule("Food", "willys"),
        ];
        let mut batch = vec![expense("WILLYS RESECENTER")];
        categorize(&mut batch, &rules);
        assert_eq!(batch[0].category.as_deref(), Some("Food"));
    }

    #[test]
    fn test_pattern_texts_and_invalid_patterns() {
        let rules = vec![rule("Fast Food", r"uber \*eats"), rule("Broken", "foo(bar")];
        let mut batch = vec![expense("UBER *EATS STOCKHOLM"), expense("FOO(BAR AB")];
        categorize(&mut batch, &rules);
        assert_eq!(batch[0].category.as_deref(), Some("Fast Food"));
        // Invalid pattern degrades to a literal match
        assert_eq!(batch[1].category.as_deref(), Some("Broken"));
    }

    #[test]
    fn test_manual_only_rules_are_skipped() {
        let rules = vec![CategoryRule::new(1, "Gifts", None).unwrap()];
        let mut batch = vec![expense("GIFT SHOP")];
        categorize(&mut batch, &rules);
        assert_eq!(batch[0].category.as_deref(), Some("Other"));
    }

    #[test]
    fn test_recategorization_is_idempotent() {
        let rules = vec![rule("Food", "ica"), rule("Subscriptions", "netflix")];
        let mut batch = vec![expense("ICA NÄRA"), expense("NETFLIX SE"), income("LÖN")];

        categorize(&mut batch, &rules);
        let first: Vec<_> = batch.iter().map(|t| t.category.clone()).collect();
        categorize(&mut batch, &rules);
        let second: Vec<_> = batch.iter().map(|t| t.category.clone()).collect();

        assert_eq!(first, second);
    }
}
