//! In-memory worksheet: a header row plus data rows of typed cells.
//!
//! Data row `i` (0-based) is sheet row `i + 2`; row 1 is the header.

use crate::error::DetectError;

/// One cell as delivered by the Sheets API.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
}

impl CellValue {
    /// Decode a JSON cell. Blank strings and nulls are `Empty`.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => CellValue::Empty,
            serde_json::Value::Bool(b) => CellValue::Bool(*b),
            serde_json::Value::Number(n) => match n.as_f64() {
                Some(f) => CellValue::Number(f),
                None => CellValue::Text(n.to_string()),
            },
            serde_json::Value::String(s) if s.is_empty() => CellValue::Empty,
            serde_json::Value::String(s) => CellValue::Text(s.clone()),
            other => CellValue::Text(other.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Text as a user would read it in the sheet.
    pub fn display(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Number(n) => format_number(*n),
            CellValue::Text(s) => s.clone(),
            CellValue::Bool(true) => "TRUE".to_string(),
            CellValue::Bool(false) => "FALSE".to_string(),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Positions of the two columns the run depends on (0-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequiredColumns {
    pub feature: usize,
    pub alert: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Table {
    /// Build a table from a raw grid whose first row is the header.
    ///
    /// Rows are padded with `Empty` (or truncated) to the header width.
    /// No grid, or a header with nothing under it, is `EmptySheet`.
    pub fn from_grid(grid: Vec<Vec<CellValue>>) -> Result<Self, DetectError> {
        let mut iter = grid.into_iter();
        let header_row = iter.next().ok_or(DetectError::EmptySheet)?;
        let headers: Vec<String> = header_row.iter().map(CellValue::display).collect();

        for (i, name) in headers.iter().enumerate() {
            if !name.is_empty() && headers[..i].contains(name) {
                return Err(DetectError::DuplicateHeader(name.clone()));
            }
        }

        let width = headers.len();
        let rows: Vec<Vec<CellValue>> = iter
            .map(|mut row| {
                row.resize(width, CellValue::Empty);
                row
            })
            .collect();

        if rows.is_empty() {
            return Err(DetectError::EmptySheet);
        }

        Ok(Self { headers, rows })
    }

    /// Convenience for JSON grids (`ValueRange.values`).
    pub fn from_json_grid(grid: &[Vec<serde_json::Value>]) -> Result<Self, DetectError> {
        let cells = grid
            .iter()
            .map(|row| row.iter().map(CellValue::from_json).collect())
            .collect();
        Self::from_grid(cells)
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    /// Number of data rows (header excluded).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cells of one column, top to bottom.
    pub fn column(&self, col: usize) -> impl Iterator<Item = &CellValue> + '_ {
        self.rows.iter().map(move |row| &row[col])
    }

    /// Both columns must exist; the error lists what is present.
    pub fn require_columns(&self, feature: &str, alert: &str) -> Result<RequiredColumns, DetectError> {
        match (self.column_position(feature), self.column_position(alert)) {
            (Some(feature), Some(alert)) => Ok(RequiredColumns { feature, alert }),
            (f, a) => {
                let mut missing = Vec::new();
                if f.is_none() {
                    missing.push(feature.to_string());
                }
                if a.is_none() {
                    missing.push(alert.to_string());
                }
                Err(DetectError::MissingColumns {
                    required: vec![feature.to_string(), alert.to_string()],
                    missing,
                    present: self.headers.clone(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    #[test]
    fn test_cell_from_json() {
        assert_eq!(CellValue::from_json(&json!(null)), CellValue::Empty);
        assert_eq!(CellValue::from_json(&json!("")), CellValue::Empty);
        assert_eq!(CellValue::from_json(&json!(12)), CellValue::Number(12.0));
        assert_eq!(CellValue::from_json(&json!(1.5)), CellValue::Number(1.5));
        assert_eq!(CellValue::from_json(&json!("n/a")), text("n/a"));
        assert_eq!(CellValue::from_json(&json!(true)), CellValue::Bool(true));
    }

    #[test]
    fn test_display_integral_number_has_no_decimal() {
        assert_eq!(CellValue::Number(2024.0).display(), "2024");
        assert_eq!(CellValue::Number(2.5).display(), "2.5");
        assert_eq!(CellValue::Bool(false).display(), "FALSE");
    }

    #[test]
    fn test_from_grid_pads_short_rows() {
        let table = Table::from_json_grid(&[
            vec![json!("Name"), json!("DaysSinceOffer"), json!("AI_Alert")],
            vec![json!("Ana"), json!(4)],
            vec![json!("Bo")],
        ])
        .unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0], vec![text("Ana"), CellValue::Number(4.0), CellValue::Empty]);
        assert_eq!(table.rows()[1], vec![text("Bo"), CellValue::Empty, CellValue::Empty]);
    }

    #[test]
    fn test_from_grid_truncates_cells_past_header() {
        let table = Table::from_json_grid(&[
            vec![json!("A")],
            vec![json!(1), json!("stray")],
        ])
        .unwrap();
        assert_eq!(table.rows()[0], vec![CellValue::Number(1.0)]);
    }

    #[test]
    fn test_empty_rows_in_the_middle_are_kept() {
        let table = Table::from_json_grid(&[
            vec![json!("A")],
            vec![json!(1)],
            vec![],
            vec![json!(3)],
        ])
        .unwrap();
        assert_eq!(table.len(), 3);
        assert!(table.rows()[1][0].is_empty());
    }

    #[test]
    fn test_no_values_is_empty_sheet() {
        assert_eq!(Table::from_grid(vec![]).unwrap_err(), DetectError::EmptySheet);
    }

    #[test]
    fn test_header_only_is_empty_sheet() {
        let err = Table::from_json_grid(&[vec![json!("DaysSinceOffer"), json!("AI_Alert")]]).unwrap_err();
        assert_eq!(err, DetectError::EmptySheet);
    }

    #[test]
    fn test_duplicate_header_rejected() {
        let err = Table::from_json_grid(&[
            vec![json!("A"), json!("B"), json!("A")],
            vec![json!(1), json!(2), json!(3)],
        ])
        .unwrap_err();
        assert_eq!(err, DetectError::DuplicateHeader("A".into()));
    }

    #[test]
    fn test_blank_headers_may_repeat() {
        let table = Table::from_json_grid(&[
            vec![json!("A"), json!(""), json!("")],
            vec![json!(1)],
        ])
        .unwrap();
        assert_eq!(table.headers(), &["A".to_string(), String::new(), String::new()]);
    }

    #[test]
    fn test_require_columns_positions() {
        let table = Table::from_json_grid(&[
            vec![json!("Name"), json!("AI_Alert"), json!("DaysSinceOffer")],
            vec![json!("Ana"), json!(""), json!(3)],
        ])
        .unwrap();
        let cols = table.require_columns("DaysSinceOffer", "AI_Alert").unwrap();
        assert_eq!(cols, RequiredColumns { feature: 2, alert: 1 });
    }

    #[test]
    fn test_require_columns_lists_missing_and_present() {
        let table = Table::from_json_grid(&[
            vec![json!("Name"), json!("AI_Alert")],
            vec![json!("Ana"), json!("")],
        ])
        .unwrap();
        let err = table.require_columns("DaysSinceOffer", "AI_Alert").unwrap_err();
        match &err {
            DetectError::MissingColumns { missing, present, .. } => {
                assert_eq!(missing, &vec!["DaysSinceOffer".to_string()]);
                assert_eq!(present, &vec!["Name".to_string(), "AI_Alert".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        let msg = err.to_string();
        assert!(msg.contains("'DaysSinceOffer'"), "{msg}");
        assert!(msg.contains("'AI_Alert'"), "{msg}");
    }
}
