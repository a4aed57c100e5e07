//! Dashboard view model
//!
//! Pure computations over the two aggregate collections: summary metrics,
//! control ranges, and the filtered chart series. Filtering works on the
//! in-memory copy only; stored aggregates are never modified.

use review_common::AggregateRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const DASHBOARD_TITLE: &str = "Review Aggregates Dashboard";

pub const EMPTY_WARNING: &str = "No aggregated data found. Please run the ingestion, cleaning, \
     and aggregation stages, then refresh this page.";

/// Preferred default for the minimum-count control
pub const DEFAULT_MIN_COUNT: i64 = 50;

pub const TOP_N_MIN: usize = 5;
pub const TOP_N_MAX: usize = 30;
pub const TOP_N_DEFAULT: usize = 20;

/// User-adjustable filters (query string)
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct DashboardParams {
    pub min_count: Option<i64>,
    pub top_n: Option<usize>,
}

/// Summary metrics shown in the four tiles
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    /// Sum of city counts
    pub total_businesses: i64,
    /// Distinct city keys
    pub cities_covered: usize,
    /// Distinct state keys
    pub states_covered: usize,
    /// Unweighted mean of the state averages
    pub overall_rating: f64,
}

impl Summary {
    pub fn compute(cities: &[AggregateRecord], states: &[AggregateRecord]) -> Self {
        let distinct = |records: &[AggregateRecord]| {
            records.iter().map(|r| r.key.as_str()).collect::<HashSet<_>>().len()
        };

        let overall_rating = if states.is_empty() {
            0.0
        } else {
            states.iter().map(|s| s.avg_rating).sum::<f64>() / states.len() as f64
        };

        Self {
            total_businesses: cities.iter().map(|c| c.count).sum(),
            cities_covered: distinct(cities),
            states_covered: distinct(states),
            overall_rating,
        }
    }

    /// Formatted tiles, in display order
    pub fn tiles(&self) -> Vec<MetricTile> {
        vec![
            MetricTile::new("Total Businesses", group_thousands(self.total_businesses)),
            MetricTile::new("Cities Covered", self.cities_covered.to_string()),
            MetricTile::new("States Covered", self.states_covered.to_string()),
            MetricTile::new("Avg Rating (overall)", format!("{:.2}", self.overall_rating)),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricTile {
    pub label: String,
    pub value: String,
}

impl MetricTile {
    fn new(label: &str, value: String) -> Self {
        Self {
            label: label.to_string(),
            value,
        }
    }
}

/// `1234567` -> `"1,234,567"`
pub fn group_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Minimum business count per city
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CountControl {
    pub min: i64,
    pub max: i64,
    pub value: i64,
    pub step: i64,
}

impl CountControl {
    /// Range spans the observed city counts; `None` without cities
    pub fn for_cities(cities: &[AggregateRecord], requested: Option<i64>) -> Option<Self> {
        let min = cities.iter().map(|c| c.count).min()?;
        let max = cities.iter().map(|c| c.count).max()?;
        let value = requested.unwrap_or(DEFAULT_MIN_COUNT.min(max)).clamp(min, max);
        let step = if max > 100 { 10 } else { 1 };
        Some(Self {
            min,
            max,
            value,
            step,
        })
    }
}

/// Top-N size for the city charts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TopNControl {
    pub min: usize,
    pub max: usize,
    pub value: usize,
}

impl TopNControl {
    pub fn new(requested: Option<usize>) -> Self {
        Self {
            min: TOP_N_MIN,
            max: TOP_N_MAX,
            value: requested.unwrap_or(TOP_N_DEFAULT).clamp(TOP_N_MIN, TOP_N_MAX),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Controls {
    pub min_count: CountControl,
    pub top_n: TopNControl,
}

/// One bar in a chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub label: String,
    pub value: f64,
}

/// Bar chart series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub title: String,
    /// Which aggregate field the bars show: "count" or "avg_rating"
    pub metric: &'static str,
    pub bars: Vec<Bar>,
}

impl Chart {
    fn counts(title: &str, records: &[&AggregateRecord]) -> Self {
        Self {
            title: title.to_string(),
            metric: "count",
            bars: records
                .iter()
                .map(|r| Bar {
                    label: r.key.clone(),
                    value: r.count as f64,
                })
                .collect(),
        }
    }

    fn ratings(title: &str, records: &[&AggregateRecord]) -> Self {
        Self {
            title: title.to_string(),
            metric: "avg_rating",
            bars: records
                .iter()
                .map(|r| Bar {
                    label: r.key.clone(),
                    value: r.avg_rating,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Charts {
    pub top_cities_by_count: Chart,
    pub top_cities_by_rating: Chart,
    pub states_by_rating: Chart,
}

/// Everything the page renders once data is available
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardData {
    pub title: &'static str,
    pub summary: Summary,
    pub tiles: Vec<MetricTile>,
    pub controls: Controls,
    pub charts: Charts,
}

/// Dashboard state: a warning when either collection is empty
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum DashboardView {
    Empty { warning: &'static str },
    Ready(Box<DashboardData>),
}

fn by_count_desc(records: &mut [&AggregateRecord]) {
    records.sort_by(|a, b| b.count.cmp(&a.count));
}

fn by_rating_desc(records: &mut [&AggregateRecord]) {
    records.sort_by(|a, b| b.avg_rating.total_cmp(&a.avg_rating));
}

/// Build the dashboard view from both aggregate sets and the user filters
pub fn build_view(
    cities: &[AggregateRecord],
    states: &[AggregateRecord],
    params: DashboardParams,
) -> DashboardView {
    if cities.is_empty() || states.is_empty() {
        return DashboardView::Empty {
            warning: EMPTY_WARNING,
        };
    }
    let min_count = match CountControl::for_cities(cities, params.min_count) {
        Some(control) => control,
        None => {
            return DashboardView::Empty {
                warning: EMPTY_WARNING,
            }
        }
    };
    let top_n = TopNControl::new(params.top_n);

    let filtered: Vec<&AggregateRecord> =
        cities.iter().filter(|c| c.count >= min_count.value).collect();

    let mut top_by_count = filtered.clone();
    by_count_desc(&mut top_by_count);
    top_by_count.truncate(top_n.value);

    let mut top_by_rating = filtered;
    by_rating_desc(&mut top_by_rating);
    top_by_rating.truncate(top_n.value);

    let mut states_sorted: Vec<&AggregateRecord> = states.iter().collect();
    by_rating_desc(&mut states_sorted);

    let summary = Summary::compute(cities, states);
    DashboardView::Ready(Box::new(DashboardData {
        title: DASHBOARD_TITLE,
        tiles: summary.tiles(),
        summary,
        controls: Controls { min_count, top_n },
        charts: Charts {
            top_cities_by_count: Chart::counts("Top Cities by Business Count", &top_by_count),
            top_cities_by_rating: Chart::ratings("Average Rating by City", &top_by_rating),
            states_by_rating: Chart::ratings("Average Rating by State", &states_sorted),
        },
    }))
}
