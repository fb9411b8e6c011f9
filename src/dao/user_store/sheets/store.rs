use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, Method, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::dao::{
    models::{ChatMessageEntity, UserEntity},
    retry::RetryPolicy,
    storage::{StorageError, StorageResult},
    user_store::UserStore,
};

use super::{
    config::SheetsConfig,
    error::{SheetsApiError, SheetsResult},
    rows::{
        CHAT_HEADER, USER_HEADER, decode_chat_row, decode_user_row, encode_chat_row,
        encode_user_row,
    },
};

/// First data row of a worksheet; row 1 holds the header.
const FIRST_DATA_ROW: usize = 2;

#[derive(Deserialize)]
struct ValuesResponse {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

/// [`UserStore`] backend persisting one user per spreadsheet row.
///
/// Every operation is wrapped in the rate-limit retry policy; HTTP 429 from
/// the API is surfaced as the distinguishable rate-limit signal.
#[derive(Clone)]
pub struct SheetsUserStore {
    client: Client,
    base_url: Arc<str>,
    spreadsheet_id: Arc<str>,
    api_key: Arc<str>,
    users_sheet: Arc<str>,
    chat_sheet: Arc<str>,
    retry: RetryPolicy,
}

impl SheetsUserStore {
    /// Connect to the spreadsheet and make sure both worksheets carry their
    /// header row before any data row is written.
    pub async fn connect(config: SheetsConfig, retry: RetryPolicy) -> SheetsResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| SheetsApiError::ClientBuilder { source })?;

        let store = Self {
            client,
            base_url: Arc::<str>::from(config.base_url.trim_end_matches('/')),
            spreadsheet_id: Arc::<str>::from(config.spreadsheet_id),
            api_key: Arc::<str>::from(config.api_key),
            users_sheet: Arc::<str>::from(config.users_sheet),
            chat_sheet: Arc::<str>::from(config.chat_sheet),
            retry,
        };

        store.ensure_headers().await?;
        Ok(store)
    }

    fn values_url(&self, range: &str, suffix: &str) -> String {
        format!(
            "{}/v4/spreadsheets/{}/values/{}{}",
            self.base_url, self.spreadsheet_id, range, suffix
        )
    }

    async fn send(
        &self,
        method: Method,
        url: String,
        range: &str,
        body: Option<serde_json::Value>,
    ) -> SheetsResult<ValuesResponse> {
        let mut builder = self
            .client
            .request(method, url)
            .query(&[("key", self.api_key.as_ref())]);
        if let Some(body) = body {
            builder = builder.json(&body);
        }

        let response = builder
            .send()
            .await
            .map_err(|source| SheetsApiError::RequestSend {
                range: range.to_string(),
                source,
            })?;

        match response.status() {
            StatusCode::TOO_MANY_REQUESTS => Err(SheetsApiError::RateLimited {
                range: range.to_string(),
            }),
            status if status.is_success() => {
                response
                    .json::<ValuesResponse>()
                    .await
                    .map_err(|source| SheetsApiError::DecodeResponse {
                        range: range.to_string(),
                        source,
                    })
            }
            other => Err(SheetsApiError::RequestStatus {
                range: range.to_string(),
                status: other,
            }),
        }
    }

    async fn get_values(&self, range: &str) -> SheetsResult<Vec<Vec<String>>> {
        let url = self.values_url(range, "");
        Ok(self.send(Method::GET, url, range, None).await?.values)
    }

    async fn append_row(&self, range: &str, row: Vec<String>) -> SheetsResult<()> {
        let url = format!(
            "{}?valueInputOption=RAW",
            self.values_url(range, ":append")
        );
        self.send(Method::POST, url, range, Some(json!({ "values": [row] })))
            .await?;
        Ok(())
    }

    async fn put_row(&self, range: &str, row: Vec<String>) -> SheetsResult<()> {
        let url = format!("{}?valueInputOption=RAW", self.values_url(range, ""));
        self.send(Method::PUT, url, range, Some(json!({ "values": [row] })))
            .await?;
        Ok(())
    }

    /// Write the header row of a worksheet when its first row is empty.
    async fn ensure_header(&self, sheet: &str, header: &[&str]) -> SheetsResult<()> {
        let last_column = column_letter(header.len());
        let range = format!("{sheet}!A1:{last_column}1");
        let existing = self.get_values(&range).await?;
        if existing.first().map(|row| row.is_empty()).unwrap_or(true) {
            info!(sheet, "writing missing header row");
            let header_row = header.iter().map(|cell| cell.to_string()).collect();
            self.put_row(&range, header_row).await?;
        }
        Ok(())
    }

    async fn ensure_headers(&self) -> SheetsResult<()> {
        self.ensure_header(&self.users_sheet, &USER_HEADER).await?;
        self.ensure_header(&self.chat_sheet, &CHAT_HEADER).await
    }

    fn users_data_range(&self) -> String {
        let last_column = column_letter(USER_HEADER.len());
        format!("{}!A{FIRST_DATA_ROW}:{last_column}", self.users_sheet)
    }

    async fn list_users_once(&self) -> StorageResult<Vec<UserEntity>> {
        let rows = self.get_values(&self.users_data_range()).await?;
        Ok(rows
            .iter()
            .map(|row| decode_user_row(row))
            .filter(|user| !user.username.trim().is_empty())
            .collect())
    }

    async fn find_user_once(&self, key: &str) -> StorageResult<Option<UserEntity>> {
        let users = self.list_users_once().await?;
        Ok(users.into_iter().find(|user| user.normalized_key() == key))
    }

    async fn append_user_once(&self, user: &UserEntity) -> StorageResult<()> {
        let row = encode_user_row(user).map_err(|source| SheetsApiError::EncodeCell { source })?;
        let range = format!("{}!A1", self.users_sheet);
        self.append_row(&range, row).await?;
        Ok(())
    }

    async fn update_user_once(&self, user: &UserEntity) -> StorageResult<()> {
        let key = user.normalized_key();
        let rows = self.get_values(&self.users_data_range()).await?;
        let index = rows
            .iter()
            .position(|row| decode_user_row(row).normalized_key() == key)
            .ok_or(StorageError::RecordNotFound { username: key })?;

        let row_number = index + FIRST_DATA_ROW;
        let last_column = column_letter(USER_HEADER.len());
        let range = format!("{}!A{row_number}:{last_column}{row_number}", self.users_sheet);
        let row = encode_user_row(user).map_err(|source| SheetsApiError::EncodeCell { source })?;
        self.put_row(&range, row).await?;
        Ok(())
    }

    async fn list_messages_once(&self, limit: usize) -> StorageResult<Vec<ChatMessageEntity>> {
        let last_column = column_letter(CHAT_HEADER.len());
        let range = format!("{}!A{FIRST_DATA_ROW}:{last_column}", self.chat_sheet);
        let rows = self.get_values(&range).await?;
        let skip = rows.len().saturating_sub(limit);
        Ok(rows[skip..].iter().map(|row| decode_chat_row(row)).collect())
    }

    async fn append_message_once(&self, message: &ChatMessageEntity) -> StorageResult<()> {
        let range = format!("{}!A1", self.chat_sheet);
        self.append_row(&range, encode_chat_row(message)).await?;
        Ok(())
    }

    async fn health_check_once(&self) -> StorageResult<()> {
        let range = format!("{}!A1:A1", self.users_sheet);
        self.get_values(&range).await?;
        Ok(())
    }
}

/// 1-based column index to its letter ("A".."Z"); worksheets here never
/// exceed 26 columns.
fn column_letter(index: usize) -> char {
    (b'A' + (index.min(26) as u8 - 1)) as char
}

impl UserStore for SheetsUserStore {
    fn list_users(&self) -> BoxFuture<'static, StorageResult<Vec<UserEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .retry
                .clone()
                .run("list users", || {
                    let store = store.clone();
                    async move { store.list_users_once().await }
                })
                .await
        })
    }

    fn find_user(&self, key: &str) -> BoxFuture<'static, StorageResult<Option<UserEntity>>> {
        let store = self.clone();
        let key = key.to_string();
        Box::pin(async move {
            store
                .retry
                .clone()
                .run("find user", || {
                    let store = store.clone();
                    let key = key.clone();
                    async move { store.find_user_once(&key).await }
                })
                .await
        })
    }

    fn append_user(&self, user: UserEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .retry
                .clone()
                .run("append user", || {
                    let store = store.clone();
                    let user = user.clone();
                    async move { store.append_user_once(&user).await }
                })
                .await
        })
    }

    fn update_user(&self, user: UserEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .retry
                .clone()
                .run("update user", || {
                    let store = store.clone();
                    let user = user.clone();
                    async move { store.update_user_once(&user).await }
                })
                .await
        })
    }

    fn list_messages(
        &self,
        limit: usize,
    ) -> BoxFuture<'static, StorageResult<Vec<ChatMessageEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .retry
                .clone()
                .run("list messages", || {
                    let store = store.clone();
                    async move { store.list_messages_once(limit).await }
                })
                .await
        })
    }

    fn append_message(
        &self,
        message: ChatMessageEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .retry
                .clone()
                .run("append message", || {
                    let store = store.clone();
                    let message = message.clone();
                    async move { store.append_message_once(&message).await }
                })
                .await
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.health_check_once().await })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ensure_headers().await.map_err(Into::into) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_letters_cover_both_worksheets() {
        assert_eq!(column_letter(USER_HEADER.len()), 'J');
        assert_eq!(column_letter(CHAT_HEADER.len()), 'C');
        assert_eq!(column_letter(1), 'A');
    }
}
