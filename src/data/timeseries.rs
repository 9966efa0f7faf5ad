//! Household consumption time series loaded from CSV.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::DataError;

/// An ordered sequence of `(timestamp, consumption)` pairs for one household.
///
/// Immutable once loaded. Loading is idempotent: reading the same file twice
/// yields identical in-memory data.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    timestamps: Vec<i64>,
    values_kw: Vec<f32>,
}

impl TimeSeries {
    /// Builds a series from parallel vectors.
    ///
    /// # Panics
    ///
    /// Panics if the vectors differ in length.
    pub fn new(timestamps: Vec<i64>, values_kw: Vec<f32>) -> Self {
        assert_eq!(timestamps.len(), values_kw.len());
        Self {
            timestamps,
            values_kw,
        }
    }

    /// Loads a series from a CSV file with a `timestamp,kw` header.
    ///
    /// # Errors
    ///
    /// Returns a [`DataError`] if the file cannot be opened or any row fails
    /// to parse. Malformed rows are errors, not skipped.
    pub fn from_csv_path(path: &Path) -> Result<Self, DataError> {
        let file = File::open(path).map_err(|e| DataError {
            source: path.display().to_string(),
            message: format!("cannot open: {e}"),
        })?;
        Self::from_csv_reader(file, &path.display().to_string())
    }

    /// Loads a series from any CSV reader with a `timestamp,kw` header.
    ///
    /// # Errors
    ///
    /// Returns a [`DataError`] on CSV syntax errors, missing columns, or
    /// unparseable timestamp/value fields.
    pub fn from_csv_reader<R: Read>(reader: R, source: &str) -> Result<Self, DataError> {
        let mut rdr = csv::ReaderBuilder::new().from_reader(reader);

        let mut timestamps = Vec::new();
        let mut values_kw = Vec::new();

        for (i, record) in rdr.records().enumerate() {
            let record = record.map_err(|e| DataError {
                source: source.to_string(),
                message: format!("row {}: {e}", i + 1),
            })?;
            if record.len() < 2 {
                return Err(DataError {
                    source: source.to_string(),
                    message: format!("row {}: expected 2 columns, got {}", i + 1, record.len()),
                });
            }
            let ts: i64 = record[0].trim().parse().map_err(|e| DataError {
                source: source.to_string(),
                message: format!("row {}: bad timestamp \"{}\": {e}", i + 1, &record[0]),
            })?;
            let kw: f32 = record[1].trim().parse().map_err(|e| DataError {
                source: source.to_string(),
                message: format!("row {}: bad value \"{}\": {e}", i + 1, &record[1]),
            })?;
            timestamps.push(ts);
            values_kw.push(kw);
        }

        Ok(Self {
            timestamps,
            values_kw,
        })
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.values_kw.len()
    }

    /// Returns `true` when the series holds no samples.
    pub fn is_empty(&self) -> bool {
        self.values_kw.is_empty()
    }

    /// Consumption values in kW.
    pub fn values_kw(&self) -> &[f32] {
        &self.values_kw
    }

    /// Timestamps (epoch seconds).
    pub fn timestamps(&self) -> &[i64] {
        &self.timestamps
    }

    /// Mean consumption in kW; zero for an empty series.
    pub fn mean_kw(&self) -> f32 {
        if self.values_kw.is_empty() {
            return 0.0;
        }
        self.values_kw.iter().sum::<f32>() / self.values_kw.len() as f32
    }
}
