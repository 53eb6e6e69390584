//! Chart data from the tourism table: top towns by hotels, facility presence counts, and
//! per-town metric points for the bubble plot.
//!
//! All three are pure functions of the table and the widget values. They recompute from the
//! full table on every call.

use polars::prelude::*;

use crate::dataset::TourismTable;
use crate::error::DashboardResult;
use crate::metrics::{Facility, FacilitySelection, MetricChoice, TopNCount, HOTELS_COLUMN};

const ROW_ALIAS: &str = "__row";
const TOWN_ALIAS: &str = "__town";
const HOTELS_ALIAS: &str = "__hotels";
const X_ALIAS: &str = "__x";
const Y_ALIAS: &str = "__y";
const SIZE_ALIAS: &str = "__size";

/// One bar of the top-towns chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TownCount {
    pub town: String,
    pub hotels: i64,
}

/// Towns having each selected facility, in selection order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacilityDistribution {
    pub counts: Vec<(Facility, u64)>,
}

impl FacilityDistribution {
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|(_, n)| n).sum()
    }

    /// Fraction of the total held by slice `idx`; 0.0 when everything is zero.
    pub fn share(&self, idx: usize) -> f64 {
        let total = self.total();
        match self.counts.get(idx) {
            Some((_, n)) if total > 0 => *n as f64 / total as f64,
            _ => 0.0,
        }
    }

    pub fn get(&self, facility: Facility) -> Option<u64> {
        self.counts
            .iter()
            .find(|(f, _)| *f == facility)
            .map(|(_, n)| *n)
    }
}

/// One town in the bubble plot. Values are passed through untouched; nulls read as NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub label: Option<String>,
}

/// The `n` towns with the most hotels, ordered ascending by hotel count for display.
///
/// Selection is a stable descending sort (nulls last) followed by taking the first `n` rows, so
/// ties keep input order. The selected rows are then stable-sorted ascending. Without a `Town`
/// column, bars are labelled by 1-based row number.
pub fn top_towns(table: &TourismTable, n: TopNCount) -> DashboardResult<Vec<TownCount>> {
    top_towns_limit(table, n.get())
}

/// `top_towns` without the slider bounds on `limit`.
pub(crate) fn top_towns_limit(
    table: &TourismTable,
    limit: usize,
) -> DashboardResult<Vec<TownCount>> {
    table.require_column(HOTELS_COLUMN)?;

    let town_expr = match table.town_column() {
        Some(town) => col(town).cast(DataType::String),
        None => (col(ROW_ALIAS).cast(DataType::Int64) + lit(1_i64)).cast(DataType::String),
    };

    let sort_options = SortMultipleOptions::default()
        .with_order_descending(true)
        .with_nulls_last(true)
        .with_maintain_order(true);

    let df = table
        .lazy()
        .with_row_index(ROW_ALIAS, None)
        .select([
            town_expr.alias(TOWN_ALIAS),
            col(HOTELS_COLUMN).cast(DataType::Int64).alias(HOTELS_ALIAS),
        ])
        .sort_by_exprs(vec![col(HOTELS_ALIAS)], sort_options)
        .slice(0, limit as IdxSize)
        .collect()?;

    let towns = df.column(TOWN_ALIAS)?.str()?;
    let hotels = df.column(HOTELS_ALIAS)?.i64()?;

    let mut bars: Vec<TownCount> = (0..df.height())
        .map(|i| TownCount {
            town: towns.get(i).unwrap_or_default().to_string(),
            hotels: hotels.get(i).unwrap_or(0),
        })
        .collect();

    // Vec::sort_by_key is stable: equal counts stay in selection order.
    bars.sort_by_key(|bar| bar.hotels);
    Ok(bars)
}

/// Count, per selected facility, the towns whose existence indicator equals exactly 0.
///
/// The indicator columns are named "... - does not exist" yet the pie reports towns that have
/// the facility; the `== 0` comparison is kept literally. Returns `None` for an empty selection.
pub fn facility_existence_counts(
    table: &TourismTable,
    selection: &FacilitySelection,
) -> DashboardResult<Option<FacilityDistribution>> {
    if selection.is_empty() {
        return Ok(None);
    }
    for facility in selection.iter() {
        table.require_column(facility.existence_column())?;
    }

    let exprs: Vec<Expr> = selection
        .iter()
        .map(|facility| {
            col(facility.existence_column())
                .cast(DataType::Float64)
                .eq(lit(0.0))
                .sum()
                .cast(DataType::UInt64)
                .alias(facility.label())
        })
        .collect();

    let df = table.lazy().select(exprs).collect()?;

    let mut counts = Vec::with_capacity(selection.len());
    for facility in selection.iter() {
        let n = df.column(facility.label())?.u64()?.get(0).unwrap_or(0);
        counts.push((facility, n));
    }
    Ok(Some(FacilityDistribution { counts }))
}

/// One point per table row: (x, y) from the chosen metrics, bubble size from the third, and
/// the town as label when the table has a `Town` column.
pub fn metric_correlation(
    table: &TourismTable,
    choice: MetricChoice,
) -> DashboardResult<Vec<ScatterPoint>> {
    for metric in [choice.x, choice.y, choice.size] {
        table.require_column(metric.column())?;
    }

    let mut exprs = vec![
        col(choice.x.column()).cast(DataType::Float64).alias(X_ALIAS),
        col(choice.y.column()).cast(DataType::Float64).alias(Y_ALIAS),
        col(choice.size.column())
            .cast(DataType::Float64)
            .alias(SIZE_ALIAS),
    ];
    let town = table.town_column();
    if let Some(town) = town {
        exprs.push(col(town).cast(DataType::String).alias(TOWN_ALIAS));
    }

    let df = table.lazy().select(exprs).collect()?;

    let xs = df.column(X_ALIAS)?.f64()?;
    let ys = df.column(Y_ALIAS)?.f64()?;
    let sizes = df.column(SIZE_ALIAS)?.f64()?;
    let labels = match town {
        Some(_) => Some(df.column(TOWN_ALIAS)?.str()?),
        None => None,
    };

    let points = (0..df.height())
        .map(|i| ScatterPoint {
            x: xs.get(i).unwrap_or(f64::NAN),
            y: ys.get(i).unwrap_or(f64::NAN),
            size: sizes.get(i).unwrap_or(f64::NAN),
            label: labels.and_then(|l| l.get(i)).map(str::to_string),
        })
        .collect();
    Ok(points)
}
