//! View controller: turns the current widget values into the three chart specifications.
//!
//! Every interaction builds a fresh [`DashboardState`] snapshot and calls [`build_view`] again
//! against the full table; nothing is carried over from the previous view.

use std::f64::consts::{FRAC_PI_2, TAU};
use std::time::Instant;
use tracing::debug;

use crate::aggregate::{
    facility_existence_counts, metric_correlation, top_towns, FacilityDistribution, ScatterPoint,
    TownCount,
};
use crate::config::DashboardConfig;
use crate::dataset::TourismTable;
use crate::error::DashboardResult;
use crate::metrics::{Facility, FacilitySelection, Metric, MetricChoice, TopNCount};
use tourism_dash_cli::Args;

pub const BAR_TITLE: &str = "Top Towns by Number of Hotels";
pub const BAR_DESCRIPTION: &str =
    "This bar chart highlights the towns with the greatest hotel presence.";
pub const BAR_X_LABEL: &str = "Number of Hotels";
pub const PIE_TITLE: &str = "Distribution of Facilities Across Towns";
pub const PIE_DESCRIPTION: &str = "This pie chart shows the distribution of facilities in towns of \
     Lebanon that have each selected type of tourism facility";
pub const PIE_HOLE: f64 = 0.3;
pub const EMPTY_SELECTION_MESSAGE: &str =
    "Please select at least one facility to display the pie chart.";
pub const SCATTER_TITLE: &str = "Tourism Facility Correlation";
pub const SCATTER_DESCRIPTION: &str = "Use the dropdown menus below to explore relationships \
     between different tourism facility types. The bubble size represents a third variable, \
     adding another layer of insight.";

/// Widget values for one rerun.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardState {
    pub top_n: TopNCount,
    pub facilities: FacilitySelection,
    pub metrics: MetricChoice,
}

impl DashboardState {
    /// Starting widget values: config defaults, overridden by any CLI flags.
    pub fn from_args_and_config(args: &Args, config: &DashboardConfig) -> Self {
        let top_n = TopNCount::new(args.top_n.unwrap_or(config.default_top_n));

        let facilities: FacilitySelection = if args.facilities.is_empty() {
            config.default_facilities.iter().copied().collect()
        } else {
            args.facilities.iter().copied().map(Facility::from).collect()
        };

        let metrics = MetricChoice {
            x: args.x_metric.map(Metric::from).unwrap_or(config.default_x_metric),
            y: args.y_metric.map(Metric::from).unwrap_or(config.default_y_metric),
            size: args
                .size_metric
                .map(Metric::from)
                .unwrap_or(config.default_size_metric),
        };

        Self {
            top_n,
            facilities,
            metrics,
        }
    }
}

/// Horizontal bar chart of the top towns; `bars` is ascending so the largest draws last.
#[derive(Debug, Clone, PartialEq)]
pub struct BarChartSpec {
    pub title: &'static str,
    pub x_label: &'static str,
    pub bars: Vec<TownCount>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieChartSpec {
    pub title: &'static str,
    pub distribution: FacilityDistribution,
    /// Inner radius as a fraction of the outer radius.
    pub hole: f64,
}

/// One donut wedge. Angles are radians counter-clockwise from the positive x axis. The first
/// wedge starts at twelve o'clock and wedges run clockwise, so `end <= start`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PieSlice {
    pub facility: Facility,
    pub count: u64,
    pub share: f64,
    pub start: f64,
    pub end: f64,
}

impl PieChartSpec {
    pub fn slices(&self) -> Vec<PieSlice> {
        let mut angle = FRAC_PI_2;
        self.distribution
            .counts
            .iter()
            .enumerate()
            .map(|(idx, (facility, count))| {
                let share = self.distribution.share(idx);
                let start = angle;
                angle -= share * TAU;
                PieSlice {
                    facility: *facility,
                    count: *count,
                    share,
                    start,
                    end: angle,
                }
            })
            .collect()
    }
}

/// Pie section outcome. `NoSelection` is an informational state, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum PieView {
    Chart(PieChartSpec),
    NoSelection { message: &'static str },
}

impl PieView {
    pub fn chart(&self) -> Option<&PieChartSpec> {
        match self {
            Self::Chart(spec) => Some(spec),
            Self::NoSelection { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterChartSpec {
    pub title: &'static str,
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub size_label: &'static str,
    pub points: Vec<ScatterPoint>,
}

impl ScatterChartSpec {
    /// Largest finite bubble-size value, or 0.0 when there is none.
    pub fn max_size(&self) -> f64 {
        self.points
            .iter()
            .map(|p| p.size)
            .filter(|s| s.is_finite())
            .fold(0.0, f64::max)
    }

    /// Bubble radius as a fraction of the largest bubble. Area is proportional to the size value;
    /// missing, zero and negative sizes give 0.0.
    pub fn relative_radius(&self, point: &ScatterPoint) -> f64 {
        let max = self.max_size();
        if max > 0.0 && point.size.is_finite() && point.size > 0.0 {
            (point.size / max).sqrt()
        } else {
            0.0
        }
    }

    /// `((x_min, x_max), (y_min, y_max))` over points with finite coordinates.
    pub fn bounds(&self) -> Option<((f64, f64), (f64, f64))> {
        let mut finite = self
            .points
            .iter()
            .filter(|p| p.x.is_finite() && p.y.is_finite());
        let first = finite.next()?;
        let init = ((first.x, first.x), (first.y, first.y));
        Some(finite.fold(init, |((x0, x1), (y0, y1)), p| {
            ((x0.min(p.x), x1.max(p.x)), (y0.min(p.y), y1.max(p.y)))
        }))
    }
}

/// Everything the rendering surface needs for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub bar: BarChartSpec,
    pub pie: PieView,
    pub scatter: ScatterChartSpec,
}

/// Recompute all three charts from the full table.
///
/// The aggregators are independent. The first error (typically a missing column) aborts the
/// whole view so the caller never renders a partial page.
pub fn build_view(table: &TourismTable, state: &DashboardState) -> DashboardResult<DashboardView> {
    let started = Instant::now();

    let bar = BarChartSpec {
        title: BAR_TITLE,
        x_label: BAR_X_LABEL,
        bars: top_towns(table, state.top_n)?,
    };

    let pie = match facility_existence_counts(table, &state.facilities)? {
        Some(distribution) => PieView::Chart(PieChartSpec {
            title: PIE_TITLE,
            distribution,
            hole: PIE_HOLE,
        }),
        None => PieView::NoSelection {
            message: EMPTY_SELECTION_MESSAGE,
        },
    };

    let scatter = ScatterChartSpec {
        title: SCATTER_TITLE,
        x_label: state.metrics.x.column(),
        y_label: state.metrics.y.column(),
        size_label: state.metrics.size.column(),
        points: metric_correlation(table, state.metrics)?,
    };

    debug!(
        top_n = state.top_n.get(),
        facilities = state.facilities.len(),
        elapsed_us = started.elapsed().as_micros() as u64,
        "rebuilt dashboard view"
    );

    Ok(DashboardView { bar, pie, scatter })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DashboardError;
    use clap::Parser;
    use polars::prelude::*;

    fn sample_table() -> TourismTable {
        let towns: Vec<String> = (0..6).map(|i| format!("Town {i}")).collect();
        let df = df!(
            "Town" => &towns,
            "Total number of hotels" => &[1_i64, 6, 3, 0, 9, 2],
            "Total number of cafes" => &[4_i64, 0, 2, 8, 1, 1],
            "Total number of restaurants" => &[3_i64, 3, 5, 0, 7, 2],
            "Total number of guest houses" => &[0_i64, 1, 0, 0, 2, 1],
            "Existence of restaurants - does not exist" => &[0_i64, 0, 0, 1, 0, 0],
            "Existence of hotels - does not exist" => &[0_i64, 0, 0, 1, 0, 0],
            "Existence of cafes - does not exist" => &[0_i64, 1, 0, 0, 0, 0],
            "Existence of guest houses - does not exist" => &[1_i64, 0, 1, 1, 0, 0]
        )
        .unwrap();
        TourismTable::new(df).unwrap()
    }

    #[test]
    fn default_state_matches_widget_defaults() {
        let state = DashboardState::default();
        assert_eq!(state.top_n.get(), 15);
        assert_eq!(state.facilities, FacilitySelection::all());
        assert_eq!(state.metrics, MetricChoice::default());
    }

    #[test]
    fn build_view_with_defaults() {
        let view = build_view(&sample_table(), &DashboardState::default()).unwrap();

        assert_eq!(view.bar.bars.len(), 6);
        assert_eq!(view.bar.bars.last().unwrap().town, "Town 4");
        assert_eq!(view.bar.x_label, "Number of Hotels");

        let pie = view.pie.chart().expect("pie chart");
        assert_eq!(
            pie.distribution.counts,
            vec![
                (Facility::Restaurants, 5),
                (Facility::Hotels, 5),
                (Facility::Cafes, 5),
                (Facility::GuestHouses, 3),
            ]
        );
        assert_eq!(pie.hole, PIE_HOLE);

        assert_eq!(view.scatter.points.len(), 6);
        assert_eq!(view.scatter.x_label, "Total number of hotels");
        assert_eq!(view.scatter.y_label, "Total number of cafes");
        assert_eq!(view.scatter.size_label, "Total number of restaurants");
    }

    #[test]
    fn empty_selection_yields_message() {
        let state = DashboardState {
            facilities: FacilitySelection::empty(),
            ..Default::default()
        };
        let view = build_view(&sample_table(), &state).unwrap();
        assert_eq!(
            view.pie,
            PieView::NoSelection {
                message: EMPTY_SELECTION_MESSAGE
            }
        );
        assert!(view.pie.chart().is_none());
    }

    #[test]
    fn build_view_is_idempotent() {
        let table = sample_table();
        let state = DashboardState::default();
        let first = build_view(&table, &state).unwrap();
        let second = build_view(&table, &state).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn missing_column_fails_whole_view() {
        let df = df!(
            "Town" => &["A"],
            "Total number of hotels" => &[1_i64]
        )
        .unwrap();
        let table = TourismTable::new(df).unwrap();
        let err = build_view(&table, &DashboardState::default()).unwrap_err();
        assert!(matches!(err, DashboardError::MissingColumn { .. }));
    }

    #[test]
    fn pie_slices_cover_full_turn_clockwise_from_top() {
        let view = build_view(&sample_table(), &DashboardState::default()).unwrap();
        let slices = view.pie.chart().unwrap().slices();
        assert_eq!(slices.len(), 4);
        assert!((slices[0].start - FRAC_PI_2).abs() < 1e-12);
        for pair in slices.windows(2) {
            assert!((pair[0].end - pair[1].start).abs() < 1e-12);
        }
        let last = slices.last().unwrap();
        assert!((last.end - (FRAC_PI_2 - TAU)).abs() < 1e-9);
        let shares: f64 = slices.iter().map(|s| s.share).sum();
        assert!((shares - 1.0).abs() < 1e-12);
    }

    #[test]
    fn scatter_radius_scales_with_area() {
        let spec = ScatterChartSpec {
            title: SCATTER_TITLE,
            x_label: "x",
            y_label: "y",
            size_label: "s",
            points: vec![
                ScatterPoint {
                    x: 0.0,
                    y: 1.0,
                    size: 4.0,
                    label: None,
                },
                ScatterPoint {
                    x: 3.0,
                    y: -2.0,
                    size: 1.0,
                    label: None,
                },
                ScatterPoint {
                    x: f64::NAN,
                    y: 9.0,
                    size: f64::NAN,
                    label: None,
                },
            ],
        };
        assert_eq!(spec.max_size(), 4.0);
        assert_eq!(spec.relative_radius(&spec.points[0]), 1.0);
        assert_eq!(spec.relative_radius(&spec.points[1]), 0.5);
        assert_eq!(spec.relative_radius(&spec.points[2]), 0.0);
        assert_eq!(spec.bounds(), Some(((0.0, 3.0), (-2.0, 1.0))));
    }

    #[test]
    fn state_from_args_overrides_config() {
        let config = DashboardConfig::default();
        let args = Args::try_parse_from([
            "tourism-dash",
            "--top-n",
            "8",
            "--facility",
            "cafes",
            "--size-metric",
            "guest-houses",
        ])
        .unwrap();
        let state = DashboardState::from_args_and_config(&args, &config);
        assert_eq!(state.top_n.get(), 8);
        assert_eq!(
            state.facilities.iter().collect::<Vec<_>>(),
            vec![Facility::Cafes]
        );
        assert_eq!(state.metrics.x, Metric::Hotels);
        assert_eq!(state.metrics.size, Metric::GuestHouses);
    }

    #[test]
    fn state_from_config_defaults() {
        let config = DashboardConfig {
            default_top_n: 22,
            default_facilities: vec![Facility::GuestHouses, Facility::Hotels],
            default_x_metric: Metric::Restaurants,
            default_y_metric: Metric::Restaurants,
            default_size_metric: Metric::Cafes,
        };
        let args = Args::try_parse_from(["tourism-dash"]).unwrap();
        let state = DashboardState::from_args_and_config(&args, &config);
        assert_eq!(state.top_n.get(), 22);
        assert_eq!(
            state.facilities.iter().collect::<Vec<_>>(),
            vec![Facility::GuestHouses, Facility::Hotels]
        );
        assert_eq!(state.metrics.y, Metric::Restaurants);
    }
}
