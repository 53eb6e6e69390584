#![allow(dead_code)]

use polars::prelude::*;
use std::fs::File;
use std::path::PathBuf;
use tempfile::TempDir;
use tourism_dash::{OpenOptions, TourismTable};

pub const TOWNS: usize = 40;

/// Towns with an existence indicator of 0, per facility, in `sample_frame`.
pub const RESTAURANT_TOWNS: u64 = 20;
pub const HOTEL_TOWNS: u64 = 14;
pub const CAFE_TOWNS: u64 = 10;
pub const GUEST_HOUSE_TOWNS: u64 = 8;

pub fn sample_frame() -> DataFrame {
    let idx: Vec<i64> = (0..TOWNS as i64).collect();
    let indicator = |m: i64| idx.iter().map(|i| i64::from(i % m != 0)).collect::<Vec<_>>();
    df!(
        "Town" => idx.iter().map(|i| format!("Town {:02}", i)).collect::<Vec<_>>(),
        "Total number of hotels" => idx.iter().map(|i| (i * 7) % 13).collect::<Vec<_>>(),
        "Total number of cafes" => idx.iter().map(|i| i % 5).collect::<Vec<_>>(),
        "Total number of restaurants" => idx.iter().map(|i| (i * 3) % 11).collect::<Vec<_>>(),
        "Total number of guest houses" => idx.iter().map(|i| i % 4).collect::<Vec<_>>(),
        "Existence of restaurants - does not exist" => indicator(2),
        "Existence of hotels - does not exist" => indicator(3),
        "Existence of cafes - does not exist" => indicator(4),
        "Existence of guest houses - does not exist" => indicator(5)
    )
    .unwrap()
}

pub fn sample_table() -> TourismTable {
    TourismTable::new(sample_frame()).unwrap()
}

/// Write `sample_frame` as CSV into a fresh temp dir. Keep the dir alive for the file to exist.
pub fn write_sample_csv() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("Tourism.csv");
    let mut df = sample_frame();
    let mut file = File::create(&path).unwrap();
    CsvWriter::new(&mut file).finish(&mut df).unwrap();
    (dir, path)
}

pub fn load_sample_csv() -> (TempDir, TourismTable) {
    let (dir, path) = write_sample_csv();
    let table = TourismTable::from_csv(&path, &OpenOptions::new()).unwrap();
    (dir, table)
}
