//! Google Sheets API client.
//!
//! This crate owns the wire contract with Google: service-account token
//! exchange, spreadsheet lookup by name, worksheet reads, and the single
//! batch write of the alert column.
//!
//! Blocking only. No retries. No knowledge of what the values mean.

pub mod a1;
mod auth;
mod client;
mod error;

pub use auth::{
    build_assertion, fetch_access_token, AccessToken, ServiceAccountKey,
    DEFAULT_TOKEN_URI, JWT_BEARER_GRANT, SCOPES,
};
pub use client::{Endpoints, SheetsClient, SpreadsheetRef, UpdateSummary, Worksheet};
pub use error::SheetsError;
