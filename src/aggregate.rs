//! Chart and table datasets derived from a filtered view.
//!
//! Every function here is pure. Groups are created in the order they first
//! appear in the view and all sorts are stable, so equal sums keep table
//! order.

use crate::filter::FilteredView;
use crate::record::{Period, Record};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

pub const TOP_VENDORS: usize = 10;
pub const TOP_CATEGORIES: usize = 10;
pub const TOP_RECORDS: usize = 5;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PeriodTotal {
    pub period: Period,
    pub total: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CumulativeTotal {
    pub period: Period,
    pub total: Decimal,
    pub cumulative: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GroupTotal {
    pub label: String,
    pub total: Decimal,
}

/// Sum of amounts per month, oldest month first.
pub fn monthly_totals(view: &FilteredView<'_>) -> Vec<PeriodTotal> {
    let mut months: BTreeMap<Period, Decimal> = BTreeMap::new();
    for record in view.iter() {
        *months.entry(record.period).or_default() += record.amount;
    }

    months
        .into_iter()
        .map(|(period, total)| PeriodTotal { period, total })
        .collect()
}

/// Running sum of the monthly totals.
pub fn cumulative_totals(monthly: &[PeriodTotal]) -> Vec<CumulativeTotal> {
    monthly
        .iter()
        .scan(Decimal::ZERO, |running, month| {
            *running += month.total;
            Some(CumulativeTotal {
                period: month.period,
                total: month.total,
                cumulative: *running,
            })
        })
        .collect()
}

/// Sum of amounts per object category, largest first.
pub fn category_totals(view: &FilteredView<'_>) -> Vec<GroupTotal> {
    group_totals(view.iter().filter_map(|record| {
        record
            .category_label()
            .map(|category| (category, record.amount))
    }))
}

/// The `n` vendors with the largest summed amount.
pub fn top_vendors(view: &FilteredView<'_>, n: usize) -> Vec<GroupTotal> {
    let mut totals = group_totals(view.iter().map(|record| (record.vendor.as_str(), record.amount)));
    totals.truncate(n);
    totals
}

/// The first `n` of already sorted category totals.
pub fn top_categories(category_totals: &[GroupTotal], n: usize) -> Vec<GroupTotal> {
    category_totals.iter().take(n).cloned().collect()
}

/// The `n` single records with the largest amount.
pub fn top_records<'a>(view: &FilteredView<'a>, n: usize) -> Vec<&'a Record> {
    let mut records = view.records().to_vec();
    records.sort_by(|a, b| b.amount.cmp(&a.amount));
    records.truncate(n);
    records
}

fn group_totals<'r>(pairs: impl Iterator<Item = (&'r str, Decimal)>) -> Vec<GroupTotal> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut totals: Vec<GroupTotal> = Vec::new();

    for (label, amount) in pairs {
        match index.get(label) {
            Some(&i) => totals[i].total += amount,
            None => {
                index.insert(label, totals.len());
                totals.push(GroupTotal {
                    label: label.to_string(),
                    total: amount,
                });
            }
        }
    }

    totals.sort_by(|a, b| b.total.cmp(&a.total));
    totals
}
