use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ---------------------------------------------------------------------------
// Lenient cell parsing
// ---------------------------------------------------------------------------

/// Accepted purchase/delivery timestamp layouts, tried in order.
const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Offset-carrying layouts.  Arrow renders zoned parquet timestamps as RFC 3339.
const ZONED_TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%:z", "%Y-%m-%d %H:%M:%S%.f%:z"];

/// Parse a timestamp cell.  Anything unparseable becomes `None`.
///
/// Zoned values keep their wall-clock time (`naive_local`), so a purchase
/// falls in the year and month printed in the cell.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(s)
                .ok()
                .or_else(|| {
                    ZONED_TIMESTAMP_FORMATS
                        .iter()
                        .find_map(|fmt| DateTime::parse_from_str(s, fmt).ok())
                })
                .map(|ts| ts.naive_local())
        })
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Parse a price cell.  Non-finite or unparseable values become `None`.
pub fn parse_price(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a review score cell.  Only whole scores in 1..=5 are kept.
pub fn parse_review_score(s: &str) -> Option<u8> {
    let v = s.trim().parse::<f64>().ok()?;
    if v.fract() != 0.0 || !(1.0..=5.0).contains(&v) {
        return None;
    }
    Some(v as u8)
}

fn lenient<'de, D, T>(d: D, parse: fn(&str) -> Option<T>) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(d)?;
    Ok(raw.as_deref().and_then(parse))
}

fn timestamp_cell<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDateTime>, D::Error> {
    lenient(d, parse_timestamp)
}

fn price_cell<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    lenient(d, parse_price)
}

fn score_cell<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u8>, D::Error> {
    lenient(d, parse_review_score)
}

fn text_cell<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    lenient(d, |s| {
        let s = s.trim();
        (!s.is_empty()).then(|| s.to_string())
    })
}

// ---------------------------------------------------------------------------
// Source records – one per row of each input table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Order {
    pub order_id: String,
    pub customer_id: String,
    #[serde(rename = "order_purchase_timestamp", deserialize_with = "timestamp_cell")]
    pub purchased_at: Option<NaiveDateTime>,
    #[serde(rename = "order_delivered_customer_date", deserialize_with = "timestamp_cell")]
    pub delivered_at: Option<NaiveDateTime>,
    #[serde(rename = "order_estimated_delivery_date", deserialize_with = "timestamp_cell")]
    pub estimated_delivery_at: Option<NaiveDateTime>,
}

/// One line of an order.  `price` is used directly as revenue.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OrderItem {
    pub order_id: String,
    pub product_id: String,
    #[serde(deserialize_with = "price_cell")]
    pub price: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Product {
    pub product_id: String,
    #[serde(rename = "product_category_name", deserialize_with = "text_cell")]
    pub category_raw: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CategoryTranslation {
    #[serde(rename = "product_category_name")]
    pub category_raw: String,
    #[serde(rename = "product_category_name_english", deserialize_with = "text_cell")]
    pub category_english: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Customer {
    pub customer_id: String,
    #[serde(deserialize_with = "text_cell")]
    pub customer_state: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Review {
    pub order_id: String,
    #[serde(deserialize_with = "score_cell")]
    pub review_score: Option<u8>,
}

/// The six source tables exactly as loaded.
#[derive(Debug, Clone, Default)]
pub struct RawDataset {
    pub orders: Vec<Order>,
    pub order_items: Vec<OrderItem>,
    pub products: Vec<Product>,
    pub category_translations: Vec<CategoryTranslation>,
    pub customers: Vec<Customer>,
    pub reviews: Vec<Review>,
}

// ---------------------------------------------------------------------------
// Enriched views – denormalised rows produced by the join layer
// ---------------------------------------------------------------------------

/// Order ⋈ Customer ⋈ Review.  One row per order.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedOrder {
    pub order_id: String,
    pub customer_id: String,
    pub purchased_at: Option<NaiveDateTime>,
    pub delivered_at: Option<NaiveDateTime>,
    pub estimated_delivery_at: Option<NaiveDateTime>,
    pub customer_state: Option<String>,
    pub review_score: Option<u8>,
}

/// OrderItem ⋈ EnrichedOrder ⋈ Product ⋈ CategoryTranslation.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedItem {
    pub order_id: String,
    pub product_id: String,
    /// Item price; `None` when the source cell was unparseable.
    pub revenue: Option<f64>,
    pub purchased_at: Option<NaiveDateTime>,
    pub customer_state: Option<String>,
    pub review_score: Option<u8>,
    pub category_raw: Option<String>,
    /// English category name; `None` when no translation exists.
    pub category: Option<String>,
}

// ---------------------------------------------------------------------------
// GroupKey – an aggregation bucket
// ---------------------------------------------------------------------------

/// A grouping bucket.  Rows whose dimension is null land in `Unknown`
/// instead of being dropped.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GroupKey {
    Unknown,
    Label(String),
}

impl GroupKey {
    pub const UNKNOWN_LABEL: &'static str = "unknown";
}

impl From<Option<&str>> for GroupKey {
    fn from(value: Option<&str>) -> Self {
        match value {
            Some(s) => GroupKey::Label(s.to_string()),
            None => GroupKey::Unknown,
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Unknown => write!(f, "{}", Self::UNKNOWN_LABEL),
            GroupKey::Label(s) => write!(f, "{s}"),
        }
    }
}

impl Serialize for GroupKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
