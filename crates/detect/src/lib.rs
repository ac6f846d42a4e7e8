//! `sheetflag-detect`: table model and anomaly labeling.
//!
//! Pure engine crate: receives a fetched grid, returns one label per row.
//! No network or file IO.

pub mod coerce;
pub mod error;
pub mod forest;
pub mod label;
pub mod table;

pub use coerce::{coerce_numeric, NumericColumn};
pub use error::DetectError;
pub use forest::{ForestParams, IsolationForest};
pub use label::Label;
pub use table::{CellValue, RequiredColumns, Table};

/// Outcome of one labeling pass over a table.
#[derive(Debug, Clone)]
pub struct Detection {
    /// One label per table row, in row order.
    pub labels: Vec<Label>,
    /// Rows whose feature value parsed and were fed to the model.
    pub fitted_rows: usize,
    pub columns: RequiredColumns,
}

impl Detection {
    pub fn flagged(&self) -> usize {
        self.labels.iter().filter(|l| **l == Label::Flagged).count()
    }

    /// Labels that were not fitted because the feature was not numeric.
    pub fn skipped(&self) -> usize {
        self.labels.len() - self.fitted_rows
    }
}

/// Validate columns, coerce the feature, fit, and project labels.
pub fn detect(
    table: &Table,
    feature_column: &str,
    alert_column: &str,
    params: ForestParams,
) -> Result<Detection, DetectError> {
    let columns = table.require_columns(feature_column, alert_column)?;

    let numeric = NumericColumn::extract(table, columns.feature);
    if numeric.is_empty() {
        return Err(DetectError::NoNumericData { column: feature_column.to_string() });
    }

    log::info!("Analyzing {} rows...", numeric.len());
    if numeric.len() < table.len() {
        log::debug!(
            "{} rows skipped ({} not numeric)",
            table.len() - numeric.len(),
            feature_column,
        );
    }

    let forest = IsolationForest::fit(numeric.values(), params)?;
    let flags = forest.predict(numeric.values());
    let labels = label::project(table.len(), numeric.rows(), &flags);

    Ok(Detection { labels, fitted_rows: numeric.len(), columns })
}
