/// Error type for spreadsheet service operations.
#[derive(Debug)]
pub enum SheetsError {
    /// Key file missing, unreadable, or not a service-account key
    Credentials(String),
    /// Token endpoint rejected the assertion
    Auth(String),
    /// Network error
    Network(String),
    /// HTTP error with status code
    Http(u16, String),
    /// JSON parsing error
    Parse(String),
    /// No spreadsheet with this exact name is visible to the account
    SpreadsheetNotFound(String),
    /// Spreadsheet exists but has no worksheet with this title
    WorksheetNotFound { spreadsheet: String, worksheet: String },
}

impl std::fmt::Display for SheetsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SheetsError::Credentials(msg) => write!(f, "Credentials error: {}", msg),
            SheetsError::Auth(msg) => write!(f, "Authorization failed: {}", msg),
            SheetsError::Network(msg) => write!(f, "Network error: {}", msg),
            SheetsError::Http(code, msg) => write!(f, "HTTP {}: {}", code, msg),
            SheetsError::Parse(msg) => write!(f, "Parse error: {}", msg),
            SheetsError::SpreadsheetNotFound(name) => {
                write!(f, "Spreadsheet not found. Make sure the name is exactly: '{}'", name)
            }
            SheetsError::WorksheetNotFound { spreadsheet, worksheet } => {
                write!(f, "Spreadsheet '{}' has no worksheet named '{}'", spreadsheet, worksheet)
            }
        }
    }
}

impl std::error::Error for SheetsError {}
