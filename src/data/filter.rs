use std::collections::BTreeSet;
use std::fmt;

use chrono::{Datelike, NaiveDateTime};
use super::model::{EnrichedItem, EnrichedOrder};

// ---------------------------------------------------------------------------
// Row attributes the filters look at
// ---------------------------------------------------------------------------

/// Order-level attributes shared by both enriched views.
pub trait OrderAttributes {
    fn purchased_at(&self) -> Option<NaiveDateTime>;
    fn customer_state(&self) -> Option<&str>;
    fn review_score(&self) -> Option<u8>;

    /// Purchase year, or `None` when the timestamp is null.
    fn purchase_year(&self) -> Option<i32> {
        self.purchased_at().map(|ts| ts.year())
    }
}

impl OrderAttributes for EnrichedOrder {
    fn purchased_at(&self) -> Option<NaiveDateTime> {
        self.purchased_at
    }
    fn customer_state(&self) -> Option<&str> {
        self.customer_state.as_deref()
    }
    fn review_score(&self) -> Option<u8> {
        self.review_score
    }
}

impl OrderAttributes for EnrichedItem {
    fn purchased_at(&self) -> Option<NaiveDateTime> {
        self.purchased_at
    }
    fn customer_state(&self) -> Option<&str> {
        self.customer_state.as_deref()
    }
    fn review_score(&self) -> Option<u8> {
        self.review_score
    }
}

// ---------------------------------------------------------------------------
// Filter values
// ---------------------------------------------------------------------------

/// Either the "all" sentinel (filter disabled) or one concrete value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection<T> {
    All,
    Only(T),
}

impl<T> Default for Selection<T> {
    fn default() -> Self {
        Selection::All
    }
}

/// A minimum review score threshold, always within 1..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReviewScore(u8);

impl ReviewScore {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(score: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&score).then_some(ReviewScore(score))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Every valid threshold, ascending.
    pub fn all() -> impl Iterator<Item = ReviewScore> {
        (Self::MIN..=Self::MAX).map(ReviewScore)
    }
}

impl fmt::Display for ReviewScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Predicates
// ---------------------------------------------------------------------------

/// Purchase year equals `year`.  Rows without a timestamp never match.
pub fn by_year<R: OrderAttributes>(row: &R, year: i32) -> bool {
    row.purchase_year() == Some(year)
}

/// Customer state equals the selected state; `All` keeps every row.
pub fn by_state<R: OrderAttributes>(row: &R, state: &Selection<String>) -> bool {
    match state {
        Selection::All => true,
        Selection::Only(s) => row.customer_state() == Some(s.as_str()),
    }
}

/// Review score is at least the threshold; `All` keeps every row,
/// including those without a review.
pub fn by_min_review<R: OrderAttributes>(row: &R, min: &Selection<ReviewScore>) -> bool {
    match min {
        Selection::All => true,
        Selection::Only(min) => row.review_score().is_some_and(|s| s >= min.get()),
    }
}

/// The active predicates, combined by conjunction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSet {
    pub year: Option<i32>,
    pub state: Selection<String>,
    pub min_review: Selection<ReviewScore>,
}

impl FilterSet {
    /// No predicate active.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn matches<R: OrderAttributes>(&self, row: &R) -> bool {
        self.year.map_or(true, |y| by_year(row, y))
            && by_state(row, &self.state)
            && by_min_review(row, &self.min_review)
    }
}

/// Return the rows that pass every active filter, in view order.
pub fn filter_rows<'a, R: OrderAttributes>(rows: &'a [R], filters: &FilterSet) -> Vec<&'a R> {
    rows.iter().filter(|row| filters.matches(*row)).collect()
}

// ---------------------------------------------------------------------------
// Selectable values
// ---------------------------------------------------------------------------

/// Distinct purchase years present in the view, most recent first.
pub fn available_years<R: OrderAttributes>(rows: &[R]) -> Vec<i32> {
    let years: BTreeSet<i32> = rows.iter().filter_map(|r| r.purchase_year()).collect();
    years.into_iter().rev().collect()
}

/// Distinct, non-null customer states among the rows of `year` (or all rows
/// when `year` is `None`), sorted.
pub fn available_states<R: OrderAttributes>(rows: &[R], year: Option<i32>) -> Vec<String> {
    let states: BTreeSet<&str> = rows
        .iter()
        .filter(|r| year.map_or(true, |y| by_year(*r, y)))
        .filter_map(|r| r.customer_state())
        .collect();
    states.into_iter().map(str::to_string).collect()
}
