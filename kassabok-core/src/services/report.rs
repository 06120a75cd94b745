//! Report service - time-aggregated views over the ledger
//!
//! Every view is a pure function over an immutable snapshot of
//! transactions; the service only fetches the snapshot through the port
//! and delegates. Month and quarter buckets use the end-of-period
//! convention, computed in Rust rather than by the store.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::result::Result;
use crate::domain::{OwnerId, Transaction, TxKind};
use crate::ports::LedgerStore;

/// Tertile bucket over categories ranked by total expense magnitude
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CostClass {
    High,
    Medium,
    Low,
}

impl CostClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            CostClass::High => "High",
            CostClass::Medium => "Medium",
            CostClass::Low => "Low",
        }
    }
}

/// Income, expense and net per calendar month
#[derive(Debug, Clone, Serialize)]
pub struct MonthlyFlow {
    /// End-of-month bucket date
    pub month: NaiveDate,
    pub income: Decimal,
    /// Expense magnitude (positive)
    pub expense: Decimal,
    /// Signed sum of all amounts in the month
    pub net: Decimal,
}

/// Last recorded running balance within a month
#[derive(Debug, Clone, Serialize)]
pub struct MonthlyBalance {
    pub month: NaiveDate,
    pub balance: Decimal,
}

/// Total expense magnitude for one category
#[derive(Debug, Clone, Serialize)]
pub struct CategorySpend {
    pub category: String,
    pub total: Decimal,
}

/// One bucketed amount in a time series
#[derive(Debug, Clone, Serialize)]
pub struct PeriodAmount {
    pub period: NaiveDate,
    pub total: Decimal,
}

/// Monthly expense series for one category
#[derive(Debug, Clone, Serialize)]
pub struct CategorySeries {
    pub category: String,
    pub points: Vec<PeriodAmount>,
}

/// A category's cost class assignment
#[derive(Debug, Clone, Serialize)]
pub struct CategoryCostClass {
    pub category: String,
    pub class: CostClass,
    pub total: Decimal,
}

/// Quarterly expense series for the categories of one cost class
#[derive(Debug, Clone, Serialize)]
pub struct ClassQuarterly {
    pub class: CostClass,
    pub categories: Vec<CategorySeries>,
}

/// Per-description breakdown within a category
#[derive(Debug, Clone, Serialize)]
pub struct TextSummary {
    pub text: String,
    pub total: Decimal,
    pub occurrences: u64,
}

/// Ledger overview for the status view
#[derive(Debug, Clone, Serialize)]
pub struct LedgerStatus {
    pub transactions: usize,
    pub rules: usize,
    pub earliest: Option<NaiveDate>,
    pub latest: Option<NaiveDate>,
}

/// Report service: date-bounded read-only views
pub struct ReportService {
    store: Arc<dyn LedgerStore>,
}

impl ReportService {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    fn snapshot(
        &self,
        owner_id: OwnerId,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<Transaction>> {
        self.store.get_transactions(owner_id, start, end)
    }

    pub fn monthly_flow(
        &self,
        owner_id: OwnerId,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<MonthlyFlow>> {
        Ok(monthly_net_flow(&self.snapshot(owner_id, start, end)?))
    }

    pub fn balance_series(
        &self,
        owner_id: OwnerId,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<MonthlyBalance>> {
        Ok(monthly_balance_series(&self.snapshot(owner_id, start, end)?))
    }

    /// Expense breakdown for the calendar month containing `month`
    pub fn month_snapshot(&self, owner_id: OwnerId, month: NaiveDate) -> Result<Vec<CategorySpend>> {
        let start = month.with_day(1);
        let end = Some(end_of_month(month));
        Ok(category_snapshot(
            &self.snapshot(owner_id, start, end)?,
            month,
        ))
    }

    pub fn category_series(
        &self,
        owner_id: OwnerId,
        categories: &[String],
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<CategorySeries>> {
        Ok(category_series(
            &self.snapshot(owner_id, start, end)?,
            categories,
        ))
    }

    pub fn cost_classes(
        &self,
        owner_id: OwnerId,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<CategoryCostClass>> {
        Ok(cost_classes(&self.snapshot(owner_id, start, end)?))
    }

    pub fn class_quarterly(
        &self,
        owner_id: OwnerId,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<ClassQuarterly>> {
        Ok(cost_class_quarterly(&self.snapshot(owner_id, start, end)?))
    }

    pub fn category_details(
        &self,
        owner_id: OwnerId,
        category: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<TextSummary>> {
        Ok(category_details(
            &self.snapshot(owner_id, start, end)?,
            category,
        ))
    }

    pub fn status(&self, owner_id: OwnerId) -> Result<LedgerStatus> {
        let txs = self.snapshot(owner_id, None, None)?;
        let rules = self.store.get_rules(owner_id)?;
        Ok(LedgerStatus {
            transactions: txs.len(),
            rules: rules.len(),
            earliest: txs.iter().map(|t| t.date).min(),
            latest: txs.iter().map(|t| t.date).max(),
        })
    }
}

/// Last day of the month containing `date`
pub fn end_of_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = (date.year(), date.month());
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    first_of_next.and_then(|d| d.pred_opt()).unwrap_or(date)
}

/// Last day of the calendar quarter containing `date`
pub fn end_of_quarter(date: NaiveDate) -> NaiveDate {
    let quarter_last_month = ((date.month() - 1) / 3) * 3 + 3;
    let anchor = NaiveDate::from_ymd_opt(date.year(), quarter_last_month, 1).unwrap_or(date);
    end_of_month(anchor)
}

/// Group by calendar month and sum flows: profit/loss per month
pub fn monthly_net_flow(transactions: &[Transaction]) -> Vec<MonthlyFlow> {
    let mut months: HashMap<NaiveDate, (Decimal, Decimal)> = HashMap::new();

    for tx in transactions {
        let bucket = months.entry(end_of_month(tx.date)).or_default();
        match tx.kind() {
            TxKind::Income => bucket.0 += tx.amount,
            TxKind::Expense => bucket.1 += tx.magnitude(),
        }
    }

    let mut flows: Vec<MonthlyFlow> = months
        .into_iter()
        .map(|(month, (income, expense))| MonthlyFlow {
            month,
            income,
            expense,
            net: income - expense,
        })
        .collect();
    flows.sort_by_key(|f| f.month);
    flows
}

/// Per month, the last recorded running balance (by date, then input
/// order). Months with no balance data are omitted: manual entries carry
/// no balance and the view must tolerate that.
pub fn monthly_balance_series(transactions: &[Transaction]) -> Vec<MonthlyBalance> {
    let mut last_seen: HashMap<NaiveDate, (NaiveDate, usize, Decimal)> = HashMap::new();

    for (seq, tx) in transactions.iter().enumerate() {
        let Some(balance) = tx.running_balance else {
            continue;
        };
        let month = end_of_month(tx.date);
        match last_seen.get(&month) {
            Some((date, prev_seq, _)) if (*date, *prev_seq) > (tx.date, seq) => {}
            _ => {
                last_seen.insert(month, (tx.date, seq, balance));
            }
        }
    }

    let mut series: Vec<MonthlyBalance> = last_seen
        .into_iter()
        .map(|(month, (_, _, balance))| MonthlyBalance { month, balance })
        .collect();
    series.sort_by_key(|b| b.month);
    series
}

/// Expense totals per category for the calendar month containing
/// `month`, largest first
pub fn category_snapshot(transactions: &[Transaction], month: NaiveDate) -> Vec<CategorySpend> {
    let mut totals: HashMap<&str, Decimal> = HashMap::new();

    for tx in transactions {
        if !tx.is_expense() || end_of_month(tx.date) != end_of_month(month) {
            continue;
        }
        if let Some(category) = tx.category.as_deref() {
            *totals.entry(category).or_default() += tx.magnitude();
        }
    }

    let mut snapshot: Vec<CategorySpend> = totals
        .into_iter()
        .map(|(category, total)| CategorySpend {
            category: category.to_string(),
            total,
        })
        .collect();
    snapshot.sort_by(|a, b| b.total.cmp(&a.total).then(a.category.cmp(&b.category)));
    snapshot
}

/// Monthly expense magnitudes for a caller-supplied category subset.
/// Categories come back in the caller's order; months with no spend are
/// omitted from a category's points.
pub fn category_series(transactions: &[Transaction], categories: &[String]) -> Vec<CategorySeries> {
    categories
        .iter()
        .map(|name| {
            let mut months: HashMap<NaiveDate, Decimal> = HashMap::new();
            for tx in transactions {
                if !tx.is_expense() {
                    continue;
                }
                let matches = tx
                    .category
                    .as_deref()
                    .is_some_and(|c| c.eq_ignore_ascii_case(name));
                if matches {
                    *months.entry(end_of_month(tx.date)).or_default() += tx.magnitude();
                }
            }
            CategorySeries {
                category: name.clone(),
                points: sorted_points(months),
            }
        })
        .collect()
}

/// Partition expense categories into High/Medium/Low by total spend.
///
/// Rank-based tertiles, not equal-width bins: categories are ranked by
/// total magnitude descending and split as evenly as integer division
/// allows, remainder going to the higher classes first. Ties rank by
/// name so the partition is stable across runs.
pub fn cost_classes(transactions: &[Transaction]) -> Vec<CategoryCostClass> {
    let mut totals: HashMap<&str, Decimal> = HashMap::new();
    for tx in transactions {
        if !tx.is_expense() {
            continue;
        }
        if let Some(category) = tx.category.as_deref() {
            *totals.entry(category).or_default() += tx.magnitude();
        }
    }

    let mut ranked: Vec<(&str, Decimal)> = totals.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));

    let n = ranked.len();
    let base = n / 3;
    let remainder = n % 3;
    let sizes = [
        base + usize::from(remainder > 0),
        base + usize::from(remainder > 1),
        base,
    ];

    let mut classes = Vec::with_capacity(n);
    let mut ranked = ranked.into_iter();
    for (class, size) in [CostClass::High, CostClass::Medium, CostClass::Low]
        .into_iter()
        .zip(sizes)
    {
        for (category, total) in ranked.by_ref().take(size) {
            classes.push(CategoryCostClass {
                category: category.to_string(),
                class,
                total,
            });
        }
    }
    classes
}

/// Quarterly expense magnitudes per category, grouped by cost class -
/// the data behind the grouped-bar comparison of comparable categories
pub fn cost_class_quarterly(transactions: &[Transaction]) -> Vec<ClassQuarterly> {
    let classes = cost_classes(transactions);

    let mut by_category: HashMap<&str, HashMap<NaiveDate, Decimal>> = HashMap::new();
    for tx in transactions {
        if !tx.is_expense() {
            continue;
        }
        if let Some(category) = tx.category.as_deref() {
            *by_category
                .entry(category)
                .or_default()
                .entry(end_of_quarter(tx.date))
                .or_default() += tx.magnitude();
        }
    }

    [CostClass::High, CostClass::Medium, CostClass::Low]
        .into_iter()
        .map(|class| ClassQuarterly {
            class,
            categories: classes
                .iter()
                .filter(|c| c.class == class)
                .map(|c| CategorySeries {
                    category: c.category.clone(),
                    points: sorted_points(
                        by_category.remove(c.category.as_str()).unwrap_or_default(),
                    ),
                })
                .collect(),
        })
        .collect()
}

/// Per-description totals and occurrence counts within one category,
/// largest total first
pub fn category_details(transactions: &[Transaction], category: &str) -> Vec<TextSummary> {
    let mut texts: HashMap<&str, (Decimal, u64)> = HashMap::new();

    for tx in transactions {
        if !tx.is_expense() {
            continue;
        }
        let matches = tx
            .category
            .as_deref()
            .is_some_and(|c| c.eq_ignore_ascii_case(category));
        if matches {
            let entry = texts.entry(tx.description.as_str()).or_default();
            entry.0 += tx.magnitude();
            entry.1 += 1;
        }
    }

    let mut details: Vec<TextSummary> = texts
        .into_iter()
        .map(|(text, (total, occurrences))| TextSummary {
            text: text.to_string(),
            total,
            occurrences,
        })
        .collect();
    details.sort_by(|a, b| b.total.cmp(&a.total).then(a.text.cmp(&b.text)));
    details
}

fn sorted_points(buckets: HashMap<NaiveDate, Decimal>) -> Vec<PeriodAmount> {
    let mut points: Vec<PeriodAmount> = buckets
        .into_iter()
        .map(|(period, total)| PeriodAmount { period, total })
        .collect();
    points.sort_by_key(|p| p.period);
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(y: i32, m: u32, d: u32, amount: i64, category: Option<&str>) -> Transaction {
        let mut tx = Transaction::new(
            1,
            NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            "TEST",
            Decimal::new(amount, 2),
        );
        tx.category = category.map(str::to_string);
        tx
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_end_of_month_handles_year_boundary() {
        assert_eq!(end_of_month(date(2023, 12, 3)), date(2023, 12, 31));
        assert_eq!(end_of_month(date(2024, 2, 10)), date(2024, 2, 29));
    }

    #[test]
    fn test_end_of_quarter() {
        assert_eq!(end_of_quarter(date(2023, 2, 15)), date(2023, 3, 31));
        assert_eq!(end_of_quarter(date(2023, 10, 1)), date(2023, 12, 31));
    }

    #[test]
    fn test_monthly_net_flow_splits_and_sums() {
        let txs = vec![
            tx(2023, 5, 1, -30_000, Some("Food")),
            tx(2023, 5, 25, 2_500_000, None),
            tx(2023, 6, 2, -10_000, Some("Food")),
        ];
        let flows = monthly_net_flow(&txs);
        assert_eq!(flows.len(), 2);
        assert_eq!(flows[0].month, date(2023, 5, 31));
        assert_eq!(flows[0].income, Decimal::new(2_500_000, 2));
        assert_eq!(flows[0].expense, Decimal::new(30_000, 2));
        assert_eq!(flows[0].net, Decimal::new(2_470_000, 2));
        assert_eq!(flows[1].net, Decimal::new(-10_000, 2));
    }

    #[test]
    fn test_balance_series_takes_last_in_month() {
        let mut a = tx(2023, 5, 2, -100, Some("Food"));
        a.running_balance = Some(Decimal::new(900_00, 2));
        let mut b = tx(2023, 5, 20, -100, Some("Food"));
        b.running_balance = Some(Decimal::new(700_00, 2));
        let c = tx(2023, 5, 25, -100, Some("Food")); // manual entry, no balance

        let series = monthly_balance_series(&[a, b, c]);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].month, date(2023, 5, 31));
        assert_eq!(series[0].balance, Decimal::new(700_00, 2));
    }

    #[test]
    fn test_balance_series_same_day_uses_input_order() {
        let mut a = tx(2023, 5, 2, -100, Some("Food"));
        a.running_balance = Some(Decimal::new(900_00, 2));
        let mut b = tx(2023, 5, 2, -100, Some("Food"));
        b.running_balance = Some(Decimal::new(800_00, 2));

        let series = monthly_balance_series(&[a, b]);
        assert_eq!(series[0].balance, Decimal::new(800_00, 2));
    }

    #[test]
    fn test_balance_series_empty_without_balances() {
        let txs = vec![tx(2023, 5, 2, -100, Some("Food"))];
        assert!(monthly_balance_series(&txs).is_empty());
    }

    #[test]
    fn test_category_snapshot_filters_month_and_sorts() {
        let txs = vec![
            tx(2023, 5, 1, -20_000, Some("Food")),
            tx(2023, 5, 3, -45_000, Some("Rent")),
            tx(2023, 5, 9, -5_000, Some("Food")),
            tx(2023, 6, 1, -99_999, Some("Travel")), // other month
            tx(2023, 5, 25, 2_500_000, None),        // income
        ];
        let snapshot = category_snapshot(&txs, date(2023, 5, 15));
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].category, "Rent");
        assert_eq!(snapshot[0].total, Decimal::new(45_000, 2));
        assert_eq!(snapshot[1].category, "Food");
        assert_eq!(snapshot[1].total, Decimal::new(25_000, 2));
    }

    #[test]
    fn test_category_series_restricted_to_requested() {
        let txs = vec![
            tx(2023, 5, 1, -20_000, Some("Food")),
            tx(2023, 6, 1, -10_000, Some("Food")),
            tx(2023, 5, 2, -30_000, Some("Rent")),
        ];
        let series = category_series(&txs, &["Food".to_string()]);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].points.len(), 2);
        assert_eq!(series[0].points[0].period, date(2023, 5, 31));
        assert_eq!(series[0].points[0].total, Decimal::new(20_000, 2));
    }

    fn classed_ledger() -> Vec<Transaction> {
        vec![
            tx(2023, 5, 1, -90_000, Some("Rent")),
            tx(2023, 5, 2, -70_000, Some("Travel")),
            tx(2023, 5, 3, -50_000, Some("Food")),
            tx(2023, 5, 4, -30_000, Some("Clothes")),
            tx(2023, 5, 5, -20_000, Some("Health")),
            tx(2023, 5, 6, -10_000, Some("Other")),
            tx(2023, 5, 7, -5_000, Some("Coffee")),
        ]
    }

    #[test]
    fn test_cost_classes_partition_with_remainder_to_high() {
        let classes = cost_classes(&classed_ledger());
        assert_eq!(classes.len(), 7);

        // 7 categories -> 3/2/2 with the remainder going to High
        let count = |class: CostClass| classes.iter().filter(|c| c.class == class).count();
        assert_eq!(count(CostClass::High), 3);
        assert_eq!(count(CostClass::Medium), 2);
        assert_eq!(count(CostClass::Low), 2);

        // No category appears twice
        let mut names: Vec<&str> = classes.iter().map(|c| c.category.as_str()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 7);

        // Aggregate magnitudes are ordered High >= Medium >= Low
        let sum = |class: CostClass| -> Decimal {
            classes
                .iter()
                .filter(|c| c.class == class)
                .map(|c| c.total)
                .sum()
        };
        assert!(sum(CostClass::High) >= sum(CostClass::Medium));
        assert!(sum(CostClass::Medium) >= sum(CostClass::Low));
    }

    #[test]
    fn test_cost_classes_single_category_lands_in_high() {
        let txs = vec![tx(2023, 5, 1, -10_000, Some("Food"))];
        let classes = cost_classes(&txs);
        assert_eq!(classes.len(), 1);
        assert_eq!(classes[0].class, CostClass::High);
    }

    #[test]
    fn test_cost_classes_empty_ledger() {
        assert!(cost_classes(&[]).is_empty());
    }

    #[test]
    fn test_class_quarterly_resamples_by_quarter() {
        let txs = vec![
            tx(2023, 1, 10, -10_000, Some("Food")),
            tx(2023, 2, 10, -15_000, Some("Food")),
            tx(2023, 4, 10, -20_000, Some("Food")),
        ];
        let grouped = cost_class_quarterly(&txs);
        assert_eq!(grouped.len(), 3);

        let high = &grouped[0];
        assert_eq!(high.class, CostClass::High);
        assert_eq!(high.categories.len(), 1);
        let points = &high.categories[0].points;
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].period, date(2023, 3, 31));
        assert_eq!(points[0].total, Decimal::new(25_000, 2));
        assert_eq!(points[1].period, date(2023, 6, 30));
    }

    #[test]
    fn test_category_details_counts_occurrences() {
        let mut a = tx(2023, 5, 1, -9_900, Some("Subscriptions"));
        a.description = "NETFLIX SE".to_string();
        let mut b = tx(2023, 6, 1, -9_900, Some("Subscriptions"));
        b.description = "NETFLIX SE".to_string();
        let mut c = tx(2023, 5, 3, -4_900, Some("Subscriptions"));
        c.description = "HBO MAX".to_string();

        let details = category_details(&[a, b, c], "subscriptions");
        assert_eq!(details.len(), 2);
        assert_eq!(details[0].text, "NETFLIX SE");
        assert_eq!(details[0].occurrences, 2);
        assert_eq!(details[0].total, Decimal::new(19_800, 2));
    }
}
