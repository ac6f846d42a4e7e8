//! Numeric coercion of the feature column.
//!
//! Numbers pass through, text is trimmed and parsed, everything else is
//! missing. Non-finite results count as missing.

use crate::table::{CellValue, Table};

/// Coerce one cell to a finite number.
pub fn coerce_numeric(cell: &CellValue) -> Option<f64> {
    let value = match cell {
        CellValue::Number(n) => *n,
        CellValue::Text(s) => s.trim().parse::<f64>().ok()?,
        CellValue::Empty | CellValue::Bool(_) => return None,
    };
    value.is_finite().then_some(value)
}

/// Rows whose feature cell is numeric, keyed by their index in the table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumericColumn {
    rows: Vec<usize>,
    values: Vec<f64>,
}

impl NumericColumn {
    pub fn extract(table: &Table, col: usize) -> Self {
        let mut out = Self::default();
        for (i, cell) in table.column(col).enumerate() {
            if let Some(v) = coerce_numeric(cell) {
                out.rows.push(i);
                out.values.push(v);
            }
        }
        out
    }

    /// Table row indices, ascending.
    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coerce_numbers_and_numeric_text() {
        assert_eq!(coerce_numeric(&CellValue::Number(3.0)), Some(3.0));
        assert_eq!(coerce_numeric(&CellValue::Text("42".into())), Some(42.0));
        assert_eq!(coerce_numeric(&CellValue::Text(" 7.5 ".into())), Some(7.5));
        assert_eq!(coerce_numeric(&CellValue::Text("-1e2".into())), Some(-100.0));
    }

    #[test]
    fn test_coerce_rejects_non_numeric() {
        assert_eq!(coerce_numeric(&CellValue::Empty), None);
        assert_eq!(coerce_numeric(&CellValue::Bool(true)), None);
        assert_eq!(coerce_numeric(&CellValue::Text("pending".into())), None);
        assert_eq!(coerce_numeric(&CellValue::Text("   ".into())), None);
        assert_eq!(coerce_numeric(&CellValue::Text("12 days".into())), None);
    }

    #[test]
    fn test_display_formatted_text_is_not_numeric() {
        for shown in ["1,200", "$5", "50%", "3 days"] {
            assert_eq!(coerce_numeric(&CellValue::Text(shown.into())), None, "{}", shown);
        }
    }

    #[test]
    fn test_coerce_rejects_non_finite() {
        assert_eq!(coerce_numeric(&CellValue::Text("NaN".into())), None);
        assert_eq!(coerce_numeric(&CellValue::Text("inf".into())), None);
        assert_eq!(coerce_numeric(&CellValue::Number(f64::INFINITY)), None);
    }

    #[test]
    fn test_extract_keeps_row_indices() {
        let table = Table::from_json_grid(&[
            vec![json!("Days")],
            vec![json!(2)],
            vec![json!("??")],
            vec![json!("5")],
            vec![],
        ])
        .unwrap();
        let col = NumericColumn::extract(&table, 0);
        assert_eq!(col.rows(), &[0, 2]);
        assert_eq!(col.values(), &[2.0, 5.0]);
    }

    #[test]
    fn test_all_numeric_text_keeps_every_row() {
        let table = Table::from_json_grid(&[
            vec![json!("Days")],
            vec![json!("1")],
            vec![json!("2")],
            vec![json!("3")],
        ])
        .unwrap();
        let col = NumericColumn::extract(&table, 0);
        assert_eq!(col.len(), table.len());
    }
}
