use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::aggregate::{
    count_by_group, sum_by_group, top_n, Dimension, GroupTotal, Measure, Periodicity, SortOrder,
};
use crate::data::filter::{filter_rows, FilterSet, ReviewScore, Selection};
use crate::data::join::EnrichedViews;

/// Rows shown in ranked tables and bar charts.
pub const TOP_N: usize = 10;

// ---------------------------------------------------------------------------
// Report selection
// ---------------------------------------------------------------------------

/// Optional filter applied on top of the mandatory year.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SecondaryFilter {
    #[default]
    None,
    State(Selection<String>),
    MinReview(Selection<ReviewScore>),
}

impl SecondaryFilter {
    pub fn kind(&self) -> SecondaryKind {
        match self {
            SecondaryFilter::None => SecondaryKind::None,
            SecondaryFilter::State(_) => SecondaryKind::Location,
            SecondaryFilter::MinReview(_) => SecondaryKind::Review,
        }
    }

    fn apply_to(&self, filters: &mut FilterSet) {
        match self {
            SecondaryFilter::None => {}
            SecondaryFilter::State(state) => filters.state = state.clone(),
            SecondaryFilter::MinReview(min) => filters.min_review = min.clone(),
        }
    }
}

/// Every report the dashboard can produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    BestSelling { year: i32, secondary: SecondaryFilter },
    RevenueTotal { periodicity: Periodicity },
    RevenueByLocation,
    RevenueByCategory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChartKind {
    Bar,
    Line,
}

/// How a report is computed and presented.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportPlan {
    pub title: String,
    pub filters: FilterSet,
    pub dimension: Dimension,
    pub measure: Measure,
    pub order: SortOrder,
    pub table_limit: Option<usize>,
    pub chart: ChartKind,
    pub chart_limit: Option<usize>,
    pub key_column: &'static str,
    pub value_column: &'static str,
}

impl Report {
    pub fn plan(&self) -> ReportPlan {
        match self {
            Report::BestSelling { year, secondary } => {
                let mut filters = FilterSet {
                    year: Some(*year),
                    ..FilterSet::none()
                };
                secondary.apply_to(&mut filters);
                ReportPlan {
                    title: format!("Best-selling products {year} ({})", secondary.kind().label()),
                    filters,
                    dimension: Dimension::Category,
                    measure: Measure::Count,
                    order: SortOrder::ValueDesc,
                    table_limit: Some(TOP_N),
                    chart: ChartKind::Bar,
                    chart_limit: Some(TOP_N),
                    key_column: "product_category_name_english",
                    value_column: "sales_count",
                }
            }
            Report::RevenueTotal { periodicity } => ReportPlan {
                title: format!("Sales revenue trend ({})", periodicity.label()),
                filters: FilterSet::none(),
                dimension: Dimension::Period(*periodicity),
                measure: Measure::Revenue,
                order: SortOrder::KeyAsc,
                table_limit: None,
                chart: ChartKind::Line,
                chart_limit: None,
                key_column: "period",
                value_column: "total_revenue",
            },
            Report::RevenueByLocation => ReportPlan {
                title: "Revenue by location".to_string(),
                filters: FilterSet::none(),
                dimension: Dimension::State,
                measure: Measure::Revenue,
                order: SortOrder::ValueDesc,
                table_limit: None,
                chart: ChartKind::Bar,
                chart_limit: Some(TOP_N),
                key_column: "customer_state",
                value_column: "total_revenue",
            },
            Report::RevenueByCategory => ReportPlan {
                title: "Revenue by product category".to_string(),
                filters: FilterSet::none(),
                dimension: Dimension::Category,
                measure: Measure::Revenue,
                order: SortOrder::ValueDesc,
                table_limit: None,
                chart: ChartKind::Bar,
                chart_limit: Some(TOP_N),
                key_column: "product_category_name_english",
                value_column: "total_revenue",
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Report output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub kind: ChartKind,
    pub title: String,
    pub points: Vec<GroupTotal>,
}

/// A computed report: the ranked/sorted table plus the chart drawn over it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportTable {
    pub title: String,
    pub key_column: String,
    pub value_column: String,
    pub measure: Measure,
    pub rows: Vec<GroupTotal>,
    #[serde(skip)]
    pub chart: Chart,
}

impl ReportTable {
    fn from_groups(plan: ReportPlan, groups: Vec<GroupTotal>) -> Self {
        let chart_title = match plan.chart_limit {
            Some(n) if plan.table_limit.is_none() => format!("{} (top {n})", plan.title),
            _ => plan.title.clone(),
        };

        ReportTable {
            chart: Chart {
                kind: plan.chart,
                title: chart_title,
                points: limited(&groups, plan.chart_limit),
            },
            rows: limited(&groups, plan.table_limit),
            title: plan.title,
            key_column: plan.key_column.to_string(),
            value_column: plan.value_column.to_string(),
            measure: plan.measure,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn limited(groups: &[GroupTotal], limit: Option<usize>) -> Vec<GroupTotal> {
    match limit {
        Some(n) => top_n(groups.to_vec(), n),
        None => groups.to_vec(),
    }
}

/// Filter the item view and aggregate it for `report`.
///
/// A selection that matches no rows yields an empty table and chart.
pub fn run_report(views: &EnrichedViews, report: &Report) -> ReportTable {
    let plan = report.plan();
    let rows = filter_rows(&views.items, &plan.filters);
    let matched = rows.len();
    let groups = match plan.measure {
        Measure::Count => count_by_group(rows, plan.dimension),
        Measure::Revenue => sum_by_group(rows, plan.dimension, plan.order),
    };

    log::debug!(
        "{}: {} groups from {matched} of {} item lines",
        plan.title,
        groups.len(),
        views.items.len()
    );

    ReportTable::from_groups(plan, groups)
}

/// Best-selling report for a dataset in which no purchase year could be
/// parsed: there is no year to pick, so nothing matches.
pub fn empty_best_selling(secondary: SecondaryKind) -> ReportTable {
    let mut plan = Report::BestSelling {
        year: 0,
        secondary: SecondaryFilter::None,
    }
    .plan();
    plan.title = format!("Best-selling products, no purchase years ({})", secondary.label());
    ReportTable::from_groups(plan, Vec::new())
}

// ---------------------------------------------------------------------------
// Flat selection state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReportKind {
    #[default]
    BestSelling,
    RevenueTotal,
    RevenueByLocation,
    RevenueByCategory,
}

impl ReportKind {
    /// The revenue sub-analyses, in menu order.
    pub const REVENUE: [ReportKind; 3] = [
        ReportKind::RevenueTotal,
        ReportKind::RevenueByLocation,
        ReportKind::RevenueByCategory,
    ];

    pub fn is_revenue(self) -> bool {
        !matches!(self, ReportKind::BestSelling)
    }

    pub fn label(self) -> &'static str {
        match self {
            ReportKind::BestSelling => "Best-selling products",
            ReportKind::RevenueTotal => "Total revenue",
            ReportKind::RevenueByLocation => "Revenue by location",
            ReportKind::RevenueByCategory => "Revenue by product category",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SecondaryKind {
    #[default]
    None,
    Location,
    Review,
}

impl SecondaryKind {
    pub const ALL: [SecondaryKind; 3] = [
        SecondaryKind::None,
        SecondaryKind::Location,
        SecondaryKind::Review,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SecondaryKind::None => "All",
            SecondaryKind::Location => "Location",
            SecondaryKind::Review => "Review",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReportError {
    #[error("best-selling products needs a year")]
    MissingYear,

    #[error("minimum review score must be a whole number from 1 to 5, got {0:?}")]
    InvalidReviewScore(String),

    #[error("secondary value {0:?} given without a secondary filter")]
    UnexpectedSecondaryValue(String),
}

/// The user's selection as plain fields.  `secondary_value` of `None` is
/// the "all" sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    pub report: ReportKind,
    pub year: Option<i32>,
    pub secondary_filter: SecondaryKind,
    pub secondary_value: Option<String>,
    pub periodicity: Periodicity,
}

impl ReportConfig {
    /// Validate the flat fields into a [`Report`].
    pub fn to_report(&self) -> Result<Report, ReportError> {
        match self.report {
            ReportKind::BestSelling => {
                let year = self.year.ok_or(ReportError::MissingYear)?;
                let value = self.secondary_value.as_deref();
                let secondary = match self.secondary_filter {
                    SecondaryKind::None => match value {
                        None => SecondaryFilter::None,
                        Some(v) => {
                            return Err(ReportError::UnexpectedSecondaryValue(v.to_string()));
                        }
                    },
                    SecondaryKind::Location => SecondaryFilter::State(match value {
                        None => Selection::All,
                        Some(state) => Selection::Only(state.to_string()),
                    }),
                    SecondaryKind::Review => SecondaryFilter::MinReview(match value {
                        None => Selection::All,
                        Some(v) => Selection::Only(parse_min_review(v)?),
                    }),
                };
                Ok(Report::BestSelling { year, secondary })
            }
            ReportKind::RevenueTotal => Ok(Report::RevenueTotal {
                periodicity: self.periodicity,
            }),
            ReportKind::RevenueByLocation => Ok(Report::RevenueByLocation),
            ReportKind::RevenueByCategory => Ok(Report::RevenueByCategory),
        }
    }
}

fn parse_min_review(value: &str) -> Result<ReviewScore, ReportError> {
    value
        .trim()
        .parse::<u8>()
        .ok()
        .and_then(ReviewScore::new)
        .ok_or_else(|| ReportError::InvalidReviewScore(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::{self, enriched};
    use crate::data::model::GroupKey;

    fn views() -> EnrichedViews {
        EnrichedViews::build(&fixtures::sample_dataset())
    }

    fn best_selling(year: i32, secondary: SecondaryFilter) -> Report {
        Report::BestSelling { year, secondary }
    }

    #[test]
    fn toys_scenario_end_to_end() {
        let views = EnrichedViews {
            orders: Vec::new(),
            items: vec![
                enriched(Some("toys"), 10.0, "2018-03-01 10:00:00"),
                enriched(Some("toys"), 20.0, "2018-04-01 10:00:00"),
                enriched(Some("toys"), 30.0, "2018-05-01 10:00:00"),
            ],
        };

        let best = run_report(&views, &best_selling(2018, SecondaryFilter::None));
        assert_eq!(best.rows.len(), 1);
        assert_eq!(best.rows[0].key, GroupKey::Label("toys".into()));
        assert_eq!(best.rows[0].value, 3.0);
        assert_eq!(best.chart.kind, ChartKind::Bar);

        let by_category = run_report(&views, &Report::RevenueByCategory);
        assert_eq!(by_category.rows[0].value, 60.0);
    }

    #[test]
    fn empty_year_gives_empty_table_and_chart() {
        let table = run_report(&views(), &best_selling(2016, SecondaryFilter::None));
        assert!(table.is_empty());
        assert!(table.chart.points.is_empty());
    }

    #[test]
    fn best_selling_without_years_is_empty_bar_chart() {
        let table = empty_best_selling(SecondaryKind::Review);
        assert!(table.is_empty());
        assert!(table.chart.points.is_empty());
        assert_eq!(table.chart.kind, ChartKind::Bar);
        assert_eq!(table.value_column, "sales_count");
        assert!(table.title.contains("Review"));
    }

    #[test]
    fn best_selling_with_min_review_drops_unreviewed() {
        let views = views();
        let min3 = SecondaryFilter::MinReview(Selection::Only(ReviewScore::new(3).unwrap()));

        let table = run_report(&views, &best_selling(2017, min3));
        let total: f64 = table.rows.iter().map(|r| r.value).sum();
        assert_eq!(total, 4.0);

        // In 2018 only o4 (score 4) survives a threshold of 3.
        let min3 = SecondaryFilter::MinReview(Selection::Only(ReviewScore::new(3).unwrap()));
        let table = run_report(&views, &best_selling(2018, min3));
        let total: f64 = table.rows.iter().map(|r| r.value).sum();
        assert_eq!(total, 2.0);
    }

    #[test]
    fn best_selling_by_state() {
        let views = views();
        let rj = SecondaryFilter::State(Selection::Only("RJ".into()));
        let table = run_report(&views, &best_selling(2017, rj));
        let labels: Vec<String> = table.rows.iter().map(|r| r.key.to_string()).collect();
        assert_eq!(labels, vec!["unknown", "toys"]);
        assert!(table.title.contains("Location"));
    }

    #[test]
    fn revenue_total_is_a_chronological_line() {
        let table = run_report(
            &views(),
            &Report::RevenueTotal {
                periodicity: Periodicity::Yearly,
            },
        );
        assert_eq!(table.chart.kind, ChartKind::Line);
        assert_eq!(table.key_column, "period");
        let rows: Vec<(String, f64)> = table
            .rows
            .iter()
            .map(|r| (r.key.to_string(), r.value))
            .collect();
        assert_eq!(rows, vec![("2017".to_string(), 180.0), ("2018".to_string(), 310.0)]);
    }

    #[test]
    fn location_table_is_full_and_chart_is_top_n() {
        let items: Vec<_> = (0..12i32)
            .map(|i| {
                let mut row = enriched(Some("toys"), f64::from(i + 1), "2018-01-01 00:00:00");
                row.customer_state = Some(format!("S{i:02}"));
                row
            })
            .collect();
        let views = EnrichedViews {
            orders: Vec::new(),
            items,
        };

        let table = run_report(&views, &Report::RevenueByLocation);
        assert_eq!(table.rows.len(), 12);
        assert_eq!(table.chart.points.len(), TOP_N);
        assert_eq!(table.rows[0].key.to_string(), "S11");
        assert!(table.chart.title.ends_with("(top 10)"));
    }

    #[test]
    fn config_maps_to_report() {
        let config = ReportConfig {
            report: ReportKind::BestSelling,
            year: Some(2018),
            secondary_filter: SecondaryKind::Review,
            secondary_value: Some("4".into()),
            periodicity: Periodicity::Monthly,
        };
        assert_eq!(
            config.to_report(),
            Ok(best_selling(
                2018,
                SecondaryFilter::MinReview(Selection::Only(ReviewScore::new(4).unwrap()))
            ))
        );

        let all_states = ReportConfig {
            secondary_filter: SecondaryKind::Location,
            secondary_value: None,
            ..config.clone()
        };
        assert_eq!(
            all_states.to_report(),
            Ok(best_selling(2018, SecondaryFilter::State(Selection::All)))
        );

        let yearly = ReportConfig {
            report: ReportKind::RevenueTotal,
            periodicity: Periodicity::Yearly,
            ..ReportConfig::default()
        };
        assert_eq!(
            yearly.to_report(),
            Ok(Report::RevenueTotal {
                periodicity: Periodicity::Yearly
            })
        );
    }

    #[test]
    fn config_rejects_invalid_selection() {
        let missing_year = ReportConfig::default();
        assert_eq!(missing_year.to_report(), Err(ReportError::MissingYear));

        let bad_score = ReportConfig {
            year: Some(2018),
            secondary_filter: SecondaryKind::Review,
            secondary_value: Some("7".into()),
            ..ReportConfig::default()
        };
        assert_eq!(
            bad_score.to_report(),
            Err(ReportError::InvalidReviewScore("7".into()))
        );

        let stray_value = ReportConfig {
            year: Some(2018),
            secondary_value: Some("SP".into()),
            ..ReportConfig::default()
        };
        assert!(matches!(
            stray_value.to_report(),
            Err(ReportError::UnexpectedSecondaryValue(_))
        ));
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = ReportConfig {
            report: ReportKind::RevenueByCategory,
            year: Some(2017),
            ..ReportConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: ReportConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
