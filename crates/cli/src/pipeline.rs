//! One run: key → connect → read → label → write.
//!
//! Every step fails fast. Nothing is written unless every earlier
//! step succeeded.

use std::io::Write;
use std::time::Duration;

use sheetflag_config::Settings;
use sheetflag_detect::{detect, label, Detection, DetectError, ForestParams, Table};
use sheetflag_sheets_client::{Endpoints, ServiceAccountKey, SheetsClient, UpdateSummary, Worksheet};

use crate::CliError;

/// Sheet row holding the first data row (row 1 is the header).
const FIRST_DATA_ROW: usize = 2;

#[derive(Debug)]
pub struct RunReport {
    pub worksheet: Worksheet,
    pub rows: usize,
    pub fitted: usize,
    pub flagged: usize,
    /// None on --dry-run or when there was nothing to write.
    pub written: Option<UpdateSummary>,
}

pub fn forest_params(settings: &Settings) -> ForestParams {
    ForestParams {
        trees: settings.model.trees,
        max_samples: settings.model.max_samples,
        seed: settings.model.seed,
    }
}

pub fn endpoints(settings: &Settings) -> Endpoints {
    Endpoints {
        sheets_base: settings.api.sheets_base.clone(),
        drive_base: settings.api.drive_base.clone(),
        timeout: Duration::from_secs(settings.api.timeout_secs),
    }
}

/// Run the whole pipeline. With `dry_run`, the projected column is
/// written to `out` as CSV instead of to the sheet.
pub fn run<W: Write>(settings: &Settings, dry_run: bool, out: &mut W) -> Result<RunReport, CliError> {
    log::info!("Looking for your key file at: {}", settings.credentials.display());
    let key = ServiceAccountKey::from_file(&settings.credentials)?;

    log::info!("Connecting to Google Sheets...");
    let client = SheetsClient::connect(&key, endpoints(settings))?;
    let worksheet = client.open_worksheet(&settings.spreadsheet, settings.worksheet.as_deref())?;
    log::info!(
        "Successfully connected to '{}' (worksheet '{}').",
        worksheet.spreadsheet_name, worksheet.title,
    );

    log::info!("Grabbing all the data from the sheet...");
    let grid = client.get_values(&worksheet)?;
    let table = Table::from_json_grid(&grid)?;

    let detection = detect(&table, &settings.feature_column, &settings.alert_column, forest_params(settings))?;
    log::info!(
        "Analysis complete: {} of {} rows flagged ({} not numeric).",
        detection.flagged(), table.len(), detection.skipped(),
    );

    // Re-resolve the alert column from the header actually read.
    let alert_col = table
        .column_position(&settings.alert_column)
        .ok_or_else(|| DetectError::ColumnIndexNotFound(settings.alert_column.clone()))?;
    let rendered = label::render_all(&detection.labels, &settings.flag_label);

    let written = if dry_run {
        write_preview(out, &table, &detection, &rendered)?;
        log::info!("Dry run: sheet not modified.");
        None
    } else if rendered.is_empty() {
        log::info!("No cells needed updating.");
        None
    } else {
        log::info!("Sending the '{}' warnings back to Google Sheets...", settings.flag_label);
        let summary = client.update_column(&worksheet, alert_col, FIRST_DATA_ROW, &rendered)?;
        log::info!(
            "Success! Your sheet is updated ({} cells{}).",
            summary.updated_cells,
            summary.updated_range.as_deref().map(|r| format!(" in {}", r)).unwrap_or_default(),
        );
        Some(summary)
    };

    Ok(RunReport {
        worksheet,
        rows: table.len(),
        fitted: detection.fitted_rows,
        flagged: detection.flagged(),
        written,
    })
}

/// CSV preview: sheet row, feature cell as shown, label text.
fn write_preview<W: Write>(
    out: &mut W,
    table: &Table,
    detection: &Detection,
    rendered: &[String],
) -> Result<(), CliError> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(["row", "value", "label"])
        .map_err(|e| CliError::io(e.to_string()))?;

    for (i, (cell, text)) in table.column(detection.columns.feature).zip(rendered).enumerate() {
        let row = (i + FIRST_DATA_ROW).to_string();
        wtr.write_record([row.as_str(), cell.display().as_str(), text.as_str()])
            .map_err(|e| CliError::io(e.to_string()))?;
    }

    wtr.flush().map_err(|e| CliError::io(e.to_string()))
}
