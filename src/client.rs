use crate::controller::EntryApi;
use crate::errors::ApiError;
use crate::models::{CreatedResponse, Entry, EntryFields};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;

/// HTTP client for the entry routes.
#[derive(Clone)]
pub struct HttpEntryApi {
    base_url: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    #[serde(default)]
    details: Option<String>,
}

impl HttpEntryApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, client }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

/// Passes 2xx responses through and turns the rest into [`ApiError`].
async fn check(response: Response, id: Option<i64>) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await?;
    let message = match serde_json::from_str::<ErrorBody>(&text) {
        Ok(ErrorBody {
            error,
            details: Some(details),
        }) => format!("{error}: {details}"),
        Ok(body) => body.error,
        Err(_) => text,
    };

    Err(match (status, id) {
        (StatusCode::BAD_REQUEST, _) => ApiError::Rejected(message),
        (StatusCode::NOT_FOUND, Some(id)) => ApiError::NotFound(id),
        _ => ApiError::Server {
            status: status.as_u16(),
            message,
        },
    })
}

#[async_trait]
impl EntryApi for HttpEntryApi {
    async fn list(&self) -> Result<Vec<Entry>, ApiError> {
        let response = self.client.get(self.url("/entries")).send().await?;
        Ok(check(response, None).await?.json().await?)
    }

    async fn create(&self, fields: &EntryFields) -> Result<i64, ApiError> {
        let response = self
            .client
            .post(self.url("/add-entry"))
            .json(fields)
            .send()
            .await?;
        let created: CreatedResponse = check(response, None).await?.json().await?;
        Ok(created.id)
    }

    async fn update(&self, id: i64, fields: &EntryFields) -> Result<(), ApiError> {
        let response = self
            .client
            .put(self.url(&format!("/update-entry/{id}")))
            .json(fields)
            .send()
            .await?;
        check(response, Some(id)).await?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), ApiError> {
        let response = self
            .client
            .delete(self.url(&format!("/delete-entry/{id}")))
            .send()
            .await?;
        check(response, Some(id)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_drops_trailing_slash() {
        let api = HttpEntryApi::new("http://127.0.0.1:3000/");
        assert_eq!(api.base_url(), "http://127.0.0.1:3000");
        assert_eq!(api.url("/entries"), "http://127.0.0.1:3000/entries");
    }
}
