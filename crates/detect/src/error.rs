use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum DetectError {
    /// No header row, or a header with no data rows under it.
    EmptySheet,
    /// One or both required columns are absent from the header.
    MissingColumns {
        required: Vec<String>,
        missing: Vec<String>,
        present: Vec<String>,
    },
    /// A non-blank header appears more than once.
    DuplicateHeader(String),
    /// Not a single row of the feature column parsed as a number.
    NoNumericData { column: String },
    /// Alert column vanished between validation and write-back.
    ColumnIndexNotFound(String),
    /// Model asked to fit zero values.
    EmptyInput,
}

impl fmt::Display for DetectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptySheet => write!(f, "sheet is empty"),
            Self::MissingColumns { required, missing, .. } => {
                let quoted = |names: &[String]| {
                    names.iter().map(|n| format!("'{n}'")).collect::<Vec<_>>().join(", ")
                };
                write!(
                    f,
                    "cannot find column(s) {}; need {}",
                    quoted(missing),
                    quoted(required),
                )
            }
            Self::DuplicateHeader(name) => write!(f, "column '{name}' appears more than once in the header row"),
            Self::NoNumericData { column } => {
                write!(f, "no valid numbers found in '{column}'; can't run the analysis")
            }
            Self::ColumnIndexNotFound(name) => write!(f, "couldn't find the '{name}' column index"),
            Self::EmptyInput => write!(f, "no values to fit"),
        }
    }
}

impl std::error::Error for DetectError {}
