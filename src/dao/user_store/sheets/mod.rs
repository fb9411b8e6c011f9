//! Tabular spreadsheet backend speaking a Google-Sheets-style values REST API.

pub mod config;
pub mod error;
pub mod rows;
mod store;

pub use config::SheetsConfig;
pub use store::SheetsUserStore;
