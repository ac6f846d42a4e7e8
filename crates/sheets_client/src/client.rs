//! Google Drive + Sheets HTTP client.
//!
//! Blocking reqwest client (no Tokio runtime required).
//! Covers the whole run: find spreadsheet → pick worksheet → read values →
//! write one column.

use std::time::Duration;

use serde::Deserialize;

use crate::a1;
use crate::auth::{fetch_access_token, ServiceAccountKey};
use crate::error::SheetsError;

const SPREADSHEET_MIME: &str = "application/vnd.google-apps.spreadsheet";

/// API base URLs and request timeout.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub sheets_base: String,
    pub drive_base: String,
    pub timeout: Duration,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            sheets_base: "https://sheets.googleapis.com".to_string(),
            drive_base: "https://www.googleapis.com".to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

/// Spreadsheet service client (blocking), holding one access token.
#[derive(Clone)]
pub struct SheetsClient {
    http: reqwest::blocking::Client,
    sheets_base: String,
    drive_base: String,
    token: String,
}

/// A spreadsheet located through Drive.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SpreadsheetRef {
    pub id: String,
    pub name: String,
}

/// One worksheet (tab) of an opened spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Worksheet {
    pub spreadsheet_id: String,
    pub spreadsheet_name: String,
    pub sheet_id: i64,
    pub title: String,
    pub index: i64,
}

/// What the values API reports back after a write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateSummary {
    pub updated_range: Option<String>,
    pub updated_cells: u64,
}

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<SpreadsheetRef>,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    #[serde(default)]
    sheet_id: i64,
    title: String,
    #[serde(default)]
    index: i64,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchUpdateResponse {
    #[serde(default)]
    total_updated_cells: u64,
    #[serde(default)]
    responses: Vec<UpdateValuesResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateValuesResponse {
    #[serde(default)]
    updated_range: Option<String>,
}

impl SheetsClient {
    /// Authenticate with a service-account key and return a ready client.
    pub fn connect(key: &ServiceAccountKey, endpoints: Endpoints) -> Result<Self, SheetsError> {
        let http = build_http(endpoints.timeout)?;
        let token = fetch_access_token(&http, key)?;
        Ok(Self::from_parts(http, token.access_token, endpoints))
    }

    /// Client with an already issued access token.
    pub fn with_token(token: String, endpoints: Endpoints) -> Result<Self, SheetsError> {
        let http = build_http(endpoints.timeout)?;
        Ok(Self::from_parts(http, token, endpoints))
    }

    fn from_parts(http: reqwest::blocking::Client, token: String, endpoints: Endpoints) -> Self {
        Self {
            http,
            sheets_base: endpoints.sheets_base.trim_end_matches('/').to_string(),
            drive_base: endpoints.drive_base.trim_end_matches('/').to_string(),
            token,
        }
    }

    /// Find a spreadsheet by exact name. The first match wins.
    pub fn find_spreadsheet(&self, name: &str) -> Result<SpreadsheetRef, SheetsError> {
        let url = format!("{}/drive/v3/files", self.drive_base);
        let query = format!(
            "name = '{}' and mimeType = '{}' and trashed = false",
            escape_drive_literal(name),
            SPREADSHEET_MIME,
        );
        let resp = self.get(
            &url,
            &[
                ("q", query.as_str()),
                ("fields", "files(id,name)"),
                ("pageSize", "10"),
                ("supportsAllDrives", "true"),
                ("includeItemsFromAllDrives", "true"),
            ],
        )?;
        let list: FileList = resp.json().map_err(|e| SheetsError::Parse(e.to_string()))?;

        if list.files.len() > 1 {
            log::warn!(
                "{} spreadsheets are named '{}'; using the first (id {})",
                list.files.len(), name, list.files[0].id,
            );
        }

        list.files
            .into_iter()
            .next()
            .ok_or_else(|| SheetsError::SpreadsheetNotFound(name.to_string()))
    }

    /// Worksheets of a spreadsheet, ordered by tab position.
    pub fn worksheets(&self, spreadsheet: &SpreadsheetRef) -> Result<Vec<Worksheet>, SheetsError> {
        let url = format!("{}/v4/spreadsheets/{}", self.sheets_base, spreadsheet.id);
        let resp = self.get(&url, &[("fields", "sheets.properties(sheetId,title,index)")])?;
        let meta: SpreadsheetMeta = resp.json().map_err(|e| SheetsError::Parse(e.to_string()))?;

        let mut sheets: Vec<Worksheet> = meta
            .sheets
            .into_iter()
            .map(|s| Worksheet {
                spreadsheet_id: spreadsheet.id.clone(),
                spreadsheet_name: spreadsheet.name.clone(),
                sheet_id: s.properties.sheet_id,
                title: s.properties.title,
                index: s.properties.index,
            })
            .collect();
        sheets.sort_by_key(|s| s.index);
        Ok(sheets)
    }

    /// Open a spreadsheet by name and pick a worksheet: the named one,
    /// or the first tab when `worksheet` is None.
    pub fn open_worksheet(&self, name: &str, worksheet: Option<&str>) -> Result<Worksheet, SheetsError> {
        let spreadsheet = self.find_spreadsheet(name)?;
        let sheets = self.worksheets(&spreadsheet)?;

        let found = match worksheet {
            Some(title) => sheets.into_iter().find(|s| s.title == title),
            None => sheets.into_iter().next(),
        };

        found.ok_or_else(|| SheetsError::WorksheetNotFound {
            spreadsheet: spreadsheet.name.clone(),
            worksheet: worksheet.unwrap_or("<first>").to_string(),
        })
    }

    /// Every populated row of the worksheet, header first, as displayed.
    /// Trailing empty rows and cells are omitted by the API.
    pub fn get_values(&self, sheet: &Worksheet) -> Result<Vec<Vec<serde_json::Value>>, SheetsError> {
        let mut url = url::Url::parse(&format!(
            "{}/v4/spreadsheets/{}/values",
            self.sheets_base, sheet.spreadsheet_id,
        ))
        .map_err(|e| SheetsError::Parse(format!("bad sheets_base: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| SheetsError::Parse("sheets_base cannot be a base URL".into()))?
            .push(&a1::sheet_range(&sheet.title));

        let resp = self.get(
            url.as_str(),
            &[
                ("majorDimension", "ROWS"),
                ("valueRenderOption", "FORMATTED_VALUE"),
            ],
        )?;
        let range: ValueRange = resp.json().map_err(|e| SheetsError::Parse(e.to_string()))?;
        Ok(range.values)
    }

    /// Write `values` down one column starting at `first_row` (1-based),
    /// as plain text, in a single batch request.
    pub fn update_column(
        &self,
        sheet: &Worksheet,
        col: usize,
        first_row: usize,
        values: &[String],
    ) -> Result<UpdateSummary, SheetsError> {
        if values.is_empty() {
            return Ok(UpdateSummary::default());
        }

        let range = a1::column_range(&sheet.title, col, first_row, first_row + values.len() - 1);
        let rows: Vec<Vec<&str>> = values.iter().map(|v| vec![v.as_str()]).collect();
        let body = serde_json::json!({
            "valueInputOption": "RAW",
            "data": [{
                "range": range,
                "majorDimension": "ROWS",
                "values": rows,
            }],
        });

        let url = format!(
            "{}/v4/spreadsheets/{}/values:batchUpdate",
            self.sheets_base, sheet.spreadsheet_id,
        );
        let resp = self.post_json(&url, &body)?;
        let parsed: BatchUpdateResponse = resp.json().map_err(|e| SheetsError::Parse(e.to_string()))?;

        Ok(UpdateSummary {
            updated_range: parsed.responses.into_iter().next().and_then(|r| r.updated_range),
            updated_cells: parsed.total_updated_cells,
        })
    }

    // ── Internal helpers ────────────────────────────────────────────

    fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<reqwest::blocking::Response, SheetsError> {
        log::debug!("GET {}", url);
        let response = self.http.get(url)
            .query(query)
            .bearer_auth(&self.token)
            .send()
            .map_err(|e| SheetsError::Network(e.to_string()))?;
        check_status(response)
    }

    fn post_json(&self, url: &str, body: &serde_json::Value) -> Result<reqwest::blocking::Response, SheetsError> {
        log::debug!("POST {}", url);
        let response = self.http.post(url)
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .map_err(|e| SheetsError::Network(e.to_string()))?;
        check_status(response)
    }
}

// ── Free functions ──────────────────────────────────────────────────

fn build_http(timeout: Duration) -> Result<reqwest::blocking::Client, SheetsError> {
    reqwest::blocking::Client::builder()
        .user_agent(format!("sheetflag/{}", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .build()
        .map_err(|e| SheetsError::Network(format!("cannot build HTTP client: {}", e)))
}

fn check_status(response: reqwest::blocking::Response) -> Result<reqwest::blocking::Response, SheetsError> {
    let status = response.status().as_u16();
    if response.status().is_success() {
        return Ok(response);
    }

    let body = response.text().unwrap_or_default();
    let message = extract_google_error(&body);
    if status == 401 || status == 403 {
        return Err(SheetsError::Auth(format!("HTTP {}: {}", status, message)));
    }
    Err(SheetsError::Http(status, message))
}

/// `{"error": {"code": 403, "message": "..."}}` -> message, else raw body.
fn extract_google_error(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| json["error"]["message"].as_str().map(String::from))
        .unwrap_or_else(|| body.chars().take(200).collect())
}

/// Escape a string literal for a Drive `q` expression.
fn escape_drive_literal(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "\\'")
}
