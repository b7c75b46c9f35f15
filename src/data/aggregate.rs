use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::model::{EnrichedItem, GroupKey};

// ---------------------------------------------------------------------------
// Grouping dimensions and measures
// ---------------------------------------------------------------------------

/// Granularity of a revenue trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Periodicity {
    #[default]
    Monthly,
    Yearly,
}

impl Periodicity {
    pub const ALL: [Periodicity; 2] = [Periodicity::Monthly, Periodicity::Yearly];

    pub fn label(self) -> &'static str {
        match self {
            Periodicity::Monthly => "Monthly",
            Periodicity::Yearly => "Yearly",
        }
    }
}

/// Truncate a timestamp to a sortable period label: `YYYY-MM` or `YYYY`.
pub fn period_label(ts: NaiveDateTime, periodicity: Periodicity) -> String {
    match periodicity {
        Periodicity::Monthly => ts.format("%Y-%m").to_string(),
        Periodicity::Yearly => ts.format("%Y").to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Category,
    State,
    Period(Periodicity),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Measure {
    /// Item lines per group (units sold).
    Count,
    /// Sum of item revenue per group.
    Revenue,
}

impl Measure {
    /// Render a value the way it is shown in tables and exports.
    pub fn format(self, value: f64) -> String {
        match self {
            Measure::Count => format!("{value:.0}"),
            Measure::Revenue => format!("{value:.2}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Largest value first; ties broken by key.
    ValueDesc,
    /// Ascending key.  Period labels sort chronologically.
    KeyAsc,
}

/// One aggregated bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupTotal {
    pub key: GroupKey,
    pub value: f64,
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// The bucket a row falls into.  A null category or state maps to
/// [`GroupKey::Unknown`]; a null timestamp excludes the row from period
/// grouping.
pub fn group_key(row: &EnrichedItem, dimension: Dimension) -> Option<GroupKey> {
    match dimension {
        Dimension::Category => Some(GroupKey::from(row.category.as_deref())),
        Dimension::State => Some(GroupKey::from(row.customer_state.as_deref())),
        Dimension::Period(p) => row
            .purchased_at
            .map(|ts| GroupKey::Label(period_label(ts, p))),
    }
}

pub fn aggregate<'a, I>(
    rows: I,
    dimension: Dimension,
    measure: Measure,
    order: SortOrder,
) -> Vec<GroupTotal>
where
    I: IntoIterator<Item = &'a EnrichedItem>,
{
    let mut totals: BTreeMap<GroupKey, f64> = BTreeMap::new();

    for row in rows {
        let Some(key) = group_key(row, dimension) else {
            continue;
        };
        let contribution = match measure {
            Measure::Count => 1.0,
            Measure::Revenue => row.revenue.unwrap_or(0.0),
        };
        *totals.entry(key).or_insert(0.0) += contribution;
    }

    let mut groups: Vec<GroupTotal> = totals
        .into_iter()
        .map(|(key, value)| GroupTotal { key, value })
        .collect();

    match order {
        // BTreeMap iteration is already key-ordered.
        SortOrder::KeyAsc => {}
        SortOrder::ValueDesc => groups.sort_by(|a, b| {
            b.value
                .total_cmp(&a.value)
                .then_with(|| a.key.cmp(&b.key))
        }),
    }

    groups
}

/// Item lines per group, largest first.
pub fn count_by_group<'a, I>(rows: I, dimension: Dimension) -> Vec<GroupTotal>
where
    I: IntoIterator<Item = &'a EnrichedItem>,
{
    aggregate(rows, dimension, Measure::Count, SortOrder::ValueDesc)
}

/// Summed revenue per group.
pub fn sum_by_group<'a, I>(rows: I, dimension: Dimension, order: SortOrder) -> Vec<GroupTotal>
where
    I: IntoIterator<Item = &'a EnrichedItem>,
{
    aggregate(rows, dimension, Measure::Revenue, order)
}

/// Keep the first `n` groups.
pub fn top_n(mut groups: Vec<GroupTotal>, n: usize) -> Vec<GroupTotal> {
    groups.truncate(n);
    groups
}
