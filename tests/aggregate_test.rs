mod common;

use polars::prelude::*;
use std::fs::File;
use tourism_dash::aggregate::{facility_existence_counts, metric_correlation, top_towns};
use tourism_dash::metrics::{Facility, FacilitySelection, Metric, MetricChoice, TopNCount};
use tourism_dash::{DashboardError, OpenOptions, TourismTable};

fn hotel_counts() -> Vec<i64> {
    (0..common::TOWNS as i64).map(|i| (i * 7) % 13).collect()
}

#[test]
fn test_top_towns_every_slider_value() {
    let table = common::sample_table();
    let all = hotel_counts();

    for n in TopNCount::MIN..=TopNCount::MAX {
        let bars = top_towns(&table, TopNCount::new(n)).unwrap();
        assert_eq!(bars.len(), n as usize, "n = {}", n);
        assert!(
            bars.windows(2).all(|w| w[0].hotels <= w[1].hotels),
            "bars not ascending for n = {}",
            n
        );
        assert_eq!(bars.last().unwrap().hotels, *all.iter().max().unwrap());

        // Every shown town has at least as many hotels as every town left out.
        let shown: Vec<&str> = bars.iter().map(|b| b.town.as_str()).collect();
        let min_shown = bars.first().unwrap().hotels;
        for (i, hotels) in all.iter().enumerate() {
            let town = format!("Town {:02}", i);
            if !shown.contains(&town.as_str()) {
                assert!(*hotels <= min_shown, "{} left out with {}", town, hotels);
            }
        }
    }
}

#[test]
fn test_top_towns_ties_keep_input_order() {
    let table = common::sample_table();
    let bars = top_towns(&table, TopNCount::new(30)).unwrap();
    for pair in bars.windows(2) {
        if pair[0].hotels == pair[1].hotels {
            assert!(pair[0].town < pair[1].town, "{:?}", pair);
        }
    }
}

#[test]
fn test_facility_counts_match_indicators() {
    let table = common::sample_table();
    let dist = facility_existence_counts(&table, &FacilitySelection::all())
        .unwrap()
        .unwrap();
    assert_eq!(
        dist.counts,
        vec![
            (Facility::Restaurants, common::RESTAURANT_TOWNS),
            (Facility::Hotels, common::HOTEL_TOWNS),
            (Facility::Cafes, common::CAFE_TOWNS),
            (Facility::GuestHouses, common::GUEST_HOUSE_TOWNS),
        ]
    );
    assert_eq!(
        dist.total(),
        common::RESTAURANT_TOWNS
            + common::HOTEL_TOWNS
            + common::CAFE_TOWNS
            + common::GUEST_HOUSE_TOWNS
    );
}

#[test]
fn test_facility_counts_follow_selection_order() {
    let table = common::sample_table();
    let selection: FacilitySelection = [Facility::GuestHouses, Facility::Cafes]
        .into_iter()
        .collect();
    let dist = facility_existence_counts(&table, &selection)
        .unwrap()
        .unwrap();
    assert_eq!(
        dist.counts,
        vec![
            (Facility::GuestHouses, common::GUEST_HOUSE_TOWNS),
            (Facility::Cafes, common::CAFE_TOWNS),
        ]
    );
}

#[test]
fn test_facility_counts_empty_selection() {
    let table = common::sample_table();
    let dist = facility_existence_counts(&table, &FacilitySelection::empty()).unwrap();
    assert!(dist.is_none());
}

#[test]
fn test_correlation_passes_values_through() {
    let table = common::sample_table();
    let choice = MetricChoice {
        x: Metric::Restaurants,
        y: Metric::GuestHouses,
        size: Metric::Hotels,
    };
    let points = metric_correlation(&table, choice).unwrap();
    assert_eq!(points.len(), common::TOWNS);

    for (i, point) in points.iter().enumerate() {
        let i = i as f64;
        assert_eq!(point.x, (i * 3.0) % 11.0);
        assert_eq!(point.y, i % 4.0);
        assert_eq!(point.size, (i * 7.0) % 13.0);
    }
    assert_eq!(points[3].label.as_deref(), Some("Town 03"));
}

#[test]
fn test_aggregations_are_idempotent() {
    let table = common::sample_table();
    let n = TopNCount::new(12);
    assert_eq!(
        top_towns(&table, n).unwrap(),
        top_towns(&table, n).unwrap()
    );
    let choice = MetricChoice::default();
    assert_eq!(
        metric_correlation(&table, choice).unwrap(),
        metric_correlation(&table, choice).unwrap()
    );
}

#[test]
fn test_missing_hotels_column() {
    let df = common::sample_frame()
        .drop("Total number of hotels")
        .unwrap();
    let table = TourismTable::new(df).unwrap();
    match top_towns(&table, TopNCount::default()) {
        Err(DashboardError::MissingColumn { column }) => {
            assert_eq!(column, "Total number of hotels")
        }
        other => panic!("expected MissingColumn, got {:?}", other),
    }
}

#[test]
fn test_load_csv_from_disk() {
    let (_dir, table) = common::load_sample_csv();
    assert_eq!(table.height(), common::TOWNS);
    assert!(table.has_column("Total number of guest houses"));
    assert_eq!(top_towns(&table, TopNCount::new(5)).unwrap().len(), 5);
}

#[test]
fn test_load_csv_with_delimiter() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("tourism_semicolon.csv");
    let mut df = common::sample_frame();
    let mut file = File::create(&path).unwrap();
    CsvWriter::new(&mut file)
        .with_separator(b';')
        .finish(&mut df)
        .unwrap();

    let table = TourismTable::from_csv(&path, &OpenOptions::new().with_delimiter(b';')).unwrap();
    assert_eq!(table.height(), common::TOWNS);
    assert!(table.has_column("Town"));
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("missing.csv");
    match TourismTable::from_csv(&path, &OpenOptions::new()) {
        Err(DashboardError::DataLoad { path: p, .. }) => assert_eq!(p, path),
        other => panic!("expected DataLoad, got {:?}", other.map(|t| t.height())),
    }
}
