use super::error::{SheetsApiError, SheetsResult};

const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com";
const DEFAULT_USERS_SHEET: &str = "Users";
const DEFAULT_CHAT_SHEET: &str = "OwlPost";

/// Runtime configuration describing how to reach the spreadsheet store.
#[derive(Debug, Clone)]
pub struct SheetsConfig {
    /// API endpoint root, without a trailing slash.
    pub base_url: String,
    /// Identifier of the spreadsheet acting as the database.
    pub spreadsheet_id: String,
    /// API key attached to every request.
    pub api_key: String,
    /// Worksheet holding one user row per nickname.
    pub users_sheet: String,
    /// Worksheet holding the chat wall.
    pub chat_sheet: String,
}

impl SheetsConfig {
    /// Construct a configuration from an explicit spreadsheet id and API key.
    pub fn new(spreadsheet_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            spreadsheet_id: spreadsheet_id.into(),
            api_key: api_key.into(),
            users_sheet: DEFAULT_USERS_SHEET.into(),
            chat_sheet: DEFAULT_CHAT_SHEET.into(),
        }
    }

    /// Override the API endpoint root (used by local test doubles).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Build a configuration by reading the expected environment variables.
    pub fn from_env() -> SheetsResult<Self> {
        let spreadsheet_id = std::env::var("STUDY_OS_SHEETS_SPREADSHEET_ID").map_err(|_| {
            SheetsApiError::MissingEnvVar {
                var: "STUDY_OS_SHEETS_SPREADSHEET_ID",
            }
        })?;
        let api_key =
            std::env::var("STUDY_OS_SHEETS_API_KEY").map_err(|_| SheetsApiError::MissingEnvVar {
                var: "STUDY_OS_SHEETS_API_KEY",
            })?;

        let mut config = Self::new(spreadsheet_id, api_key);

        if let Ok(base_url) = std::env::var("STUDY_OS_SHEETS_BASE_URL") {
            config.base_url = base_url;
        }
        if let Ok(sheet) = std::env::var("STUDY_OS_SHEETS_USERS_SHEET") {
            config.users_sheet = sheet;
        }
        if let Ok(sheet) = std::env::var("STUDY_OS_SHEETS_CHAT_SHEET") {
            config.chat_sheet = sheet;
        }

        Ok(config)
    }
}
