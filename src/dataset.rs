//! Loading the tourism table: read the delimited file once, trim column names, keep it immutable.

use polars::prelude::*;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{DashboardError, DashboardResult};
use crate::metrics::TOWN_COLUMN;

/// Options for reading the data file. An unset delimiter falls back to a comma.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpenOptions {
    pub delimiter: Option<u8>,
}

impl OpenOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }
}

/// The loaded dataset: one row per town.
///
/// Column names are whitespace-trimmed once on construction and the frame is never
/// mutated afterwards. Aggregators receive it by reference.
#[derive(Debug, Clone)]
pub struct TourismTable {
    df: DataFrame,
}

impl TourismTable {
    /// Wrap an in-memory frame, trimming surrounding whitespace from every column name.
    ///
    /// Two headers that trim to the same name are a `DuplicateColumn` error.
    pub fn new(df: DataFrame) -> DashboardResult<Self> {
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();
        check_trimmed_names(&names)?;
        let renamed: Vec<Expr> = names
            .iter()
            .map(|name| col(name.as_str()).alias(name.trim()))
            .collect();
        let df = df.lazy().select(renamed).collect()?;
        debug!(columns = ?df.get_column_names(), "normalized column names");
        Ok(Self { df })
    }

    /// Read a delimited file into a table. A missing or unreadable file is a `DataLoad` error.
    pub fn from_csv(path: &Path, options: &OpenOptions) -> DashboardResult<Self> {
        let pl_path = PlPath::Local(Arc::from(path));
        let mut reader = LazyCsvReader::new(pl_path);
        if let Some(delimiter) = options.delimiter {
            reader = reader.with_separator(delimiter);
        }

        let df = reader
            .finish()
            .and_then(|lf| lf.collect())
            .map_err(|source| DashboardError::DataLoad {
                path: path.to_path_buf(),
                source,
            })?;

        let table = Self::new(df)?;
        info!(
            path = %path.display(),
            rows = table.height(),
            columns = table.width(),
            "loaded tourism table"
        );
        Ok(table)
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    pub fn width(&self) -> usize {
        self.df.width()
    }

    /// Cheap lazy view over the table (the frame's columns are reference counted).
    pub fn lazy(&self) -> LazyFrame {
        self.df.clone().lazy()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.df.get_column_index(name).is_some()
    }

    /// Fails with `MissingColumn` unless `name` is present.
    pub fn require_column(&self, name: &str) -> DashboardResult<()> {
        if self.has_column(name) {
            Ok(())
        } else {
            Err(DashboardError::missing_column(name))
        }
    }

    /// The town label column, when the dataset carries one.
    pub fn town_column(&self) -> Option<&'static str> {
        self.has_column(TOWN_COLUMN).then_some(TOWN_COLUMN)
    }
}

fn check_trimmed_names(names: &[String]) -> DashboardResult<()> {
    for (i, name) in names.iter().enumerate() {
        let trimmed = name.trim();
        if names[..i].iter().any(|earlier| earlier.trim() == trimmed) {
            let columns = names
                .iter()
                .filter(|other| other.trim() == trimmed)
                .cloned()
                .collect();
            return Err(DashboardError::DuplicateColumn {
                name: trimmed.to_string(),
                columns,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn trims_column_names_once() {
        let df = df!(
            " Town " => &["Byblos", "Tyre"],
            "Total number of hotels  " => &[4_i64, 2],
            "\tKeep inner  spaces\t" => &[1_i64, 1]
        )
        .unwrap();
        let table = TourismTable::new(df).unwrap();
        assert_eq!(
            table.column_names(),
            vec![
                "Town".to_string(),
                "Total number of hotels".to_string(),
                "Keep inner  spaces".to_string()
            ]
        );
        assert_eq!(table.town_column(), Some("Town"));
        assert_eq!(table.height(), 2);
    }

    #[test]
    fn headers_trimming_to_one_name_are_rejected() {
        let df = df!(
            "Town" => &["Byblos"],
            "Town " => &["Tyre"],
            "Total number of hotels" => &[4_i64]
        )
        .unwrap();
        let err = TourismTable::new(df).unwrap_err();
        match &err {
            DashboardError::DuplicateColumn { name, columns } => {
                assert_eq!(name, "Town");
                assert_eq!(columns, &vec!["Town".to_string(), "Town ".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(
            err.to_string(),
            "Columns [\"Town\", \"Town \"] all trim to the same name 'Town'"
        );
    }

    #[test]
    fn town_column_is_optional() {
        let df = df!("Total number of hotels" => &[1_i64, 2, 3]).unwrap();
        let table = TourismTable::new(df).unwrap();
        assert_eq!(table.town_column(), None);
    }

    #[test]
    fn require_column_reports_missing() {
        let df = df!("Town" => &["A"]).unwrap();
        let table = TourismTable::new(df).unwrap();
        let err = table.require_column("Total number of cafes").unwrap_err();
        assert!(matches!(
            err,
            DashboardError::MissingColumn { ref column } if column == "Total number of cafes"
        ));
    }

    #[test]
    fn from_csv_reads_and_trims_headers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Tourism.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "Town , Total number of hotels").unwrap();
        writeln!(file, "Jounieh,12").unwrap();
        writeln!(file, "Batroun,7").unwrap();
        drop(file);

        let table = TourismTable::from_csv(&path, &OpenOptions::new()).unwrap();
        assert_eq!(
            table.column_names(),
            vec!["Town".to_string(), "Total number of hotels".to_string()]
        );
        assert_eq!(table.height(), 2);
    }

    #[test]
    fn from_csv_honors_delimiter() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Tourism.psv");
        std::fs::write(&path, "Town|Total number of cafes\nZahle|3\n").unwrap();

        let opts = OpenOptions::new().with_delimiter(b'|');
        let table = TourismTable::from_csv(&path, &opts).unwrap();
        assert!(table.has_column("Total number of cafes"));
    }

    #[test]
    fn from_csv_missing_file_is_data_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.csv");
        let err = TourismTable::from_csv(&path, &OpenOptions::new()).unwrap_err();
        assert!(matches!(err, DashboardError::DataLoad { .. }));
    }
}
