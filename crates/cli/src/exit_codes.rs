//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract - schedulers and wrapper
//! scripts key off them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain      | Description                                  |
//! |---------|-------------|----------------------------------------------|
//! | 0       | Universal   | Success (including --dry-run)                |
//! | 1       | Universal   | General error (unspecified)                  |
//! | 2       | Universal   | Usage or config error                        |
//! | 10-19   | auth        | Credentials, token exchange, transport       |
//! | 20-29   | lookup      | Spreadsheet / worksheet resolution           |
//! | 30-39   | data        | Sheet contents unusable for analysis         |
//! | 40-49   | write-back  | Alert column write                           |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Map it in `sheets_exit_code` / `detect_exit_code`

use sheetflag_detect::DetectError;
use sheetflag_sheets_client::SheetsError;

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - labels computed (and written unless --dry-run).
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, unreadable or invalid config file.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Auth (10-19)
// =============================================================================

/// Service-account key file missing, unreadable, or malformed.
pub const EXIT_CREDENTIALS: u8 = 10;

/// Token endpoint or API rejected the credentials (400/401/403).
pub const EXIT_AUTH: u8 = 11;

/// Network failure or unexpected HTTP status from Google.
pub const EXIT_NETWORK: u8 = 12;

// =============================================================================
// Lookup (20-29)
// =============================================================================

/// No spreadsheet with the configured name is visible to the account.
pub const EXIT_SPREADSHEET_NOT_FOUND: u8 = 20;

/// Configured worksheet title does not exist in the spreadsheet.
pub const EXIT_WORKSHEET_NOT_FOUND: u8 = 21;

// =============================================================================
// Data (30-39)
// =============================================================================

/// No header, or a header with no data rows.
pub const EXIT_EMPTY_SHEET: u8 = 30;

/// Feature or alert column absent from the header row.
pub const EXIT_MISSING_COLUMN: u8 = 31;

/// Feature column has no numeric values at all.
pub const EXIT_NO_NUMERIC_DATA: u8 = 32;

/// A header name appears twice.
pub const EXIT_DUPLICATE_HEADER: u8 = 33;

// =============================================================================
// Write-back (40-49)
// =============================================================================

/// Alert column position could not be resolved at write time.
pub const EXIT_COLUMN_INDEX: u8 = 40;

/// Map a SheetsError to its exit code.
pub fn sheets_exit_code(err: &SheetsError) -> u8 {
    match err {
        SheetsError::Credentials(_) => EXIT_CREDENTIALS,
        SheetsError::Auth(_) => EXIT_AUTH,
        SheetsError::Network(_) | SheetsError::Http(..) | SheetsError::Parse(_) => EXIT_NETWORK,
        SheetsError::SpreadsheetNotFound(_) => EXIT_SPREADSHEET_NOT_FOUND,
        SheetsError::WorksheetNotFound { .. } => EXIT_WORKSHEET_NOT_FOUND,
    }
}

/// Map a DetectError to its exit code.
pub fn detect_exit_code(err: &DetectError) -> u8 {
    match err {
        DetectError::EmptySheet => EXIT_EMPTY_SHEET,
        DetectError::MissingColumns { .. } => EXIT_MISSING_COLUMN,
        DetectError::NoNumericData { .. } => EXIT_NO_NUMERIC_DATA,
        DetectError::DuplicateHeader(_) => EXIT_DUPLICATE_HEADER,
        DetectError::ColumnIndexNotFound(_) => EXIT_COLUMN_INDEX,
        DetectError::EmptyInput => EXIT_ERROR,
    }
}
