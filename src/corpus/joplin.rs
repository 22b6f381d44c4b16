//! Joplin Data API client.
//!
//! Talks to the Web Clipper service of a running Joplin desktop app.
//! Endpoint and token come from the `joplin` section of config.json, with
//! `JOPLIN_ENDPOINT` / `JOPLIN_TOKEN` taking precedence.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::{CorpusSource, FolderMeta, NoteField, NoteMeta, field_list};

pub const DEFAULT_JOPLIN_ENDPOINT: &str = "http://localhost:41184";

/// Joplin settings stored in `<data_dir>/config.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JoplinSettings {
    pub endpoint: Option<String>,
    pub token: Option<String>,
}

/// Paginated list response.
#[derive(Debug, Deserialize)]
struct Page<T> {
    items: Vec<T>,
}

/// HTTP client for the Joplin Data API.
pub struct JoplinClient {
    client: reqwest::Client,
    endpoint: String,
    token: Option<String>,
}

impl JoplinClient {
    #[must_use]
    pub fn new(endpoint: &str, token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()),
        }
    }

    /// Build a client from file settings and an environment lookup.
    pub fn from_settings(settings: &JoplinSettings, env: impl Fn(&str) -> Option<String>) -> Self {
        let endpoint = env("JOPLIN_ENDPOINT")
            .or_else(|| settings.endpoint.clone())
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| DEFAULT_JOPLIN_ENDPOINT.to_string());
        let token = env("JOPLIN_TOKEN").or_else(|| settings.token.clone());
        Self::new(&endpoint, token)
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    #[must_use]
    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<reqwest::Response> {
        let url = format!("{}/{path}", self.endpoint);

        let mut request = self.client.get(&url).query(query);
        if let Some(token) = &self.token {
            request = request.query(&[("token", token)]);
        }

        request
            .send()
            .await
            .map_err(|e| Error::Corpus(format!("Joplin request to /{path} failed: {e}")))
    }

    async fn error_for(response: reqwest::Response, path: &str) -> Error {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Error::Corpus(format!("Joplin /{path} returned {status}: {body}"))
    }

    async fn parse<T: DeserializeOwned>(response: reqwest::Response, path: &str) -> Result<T> {
        response
            .json()
            .await
            .map_err(|e| Error::Corpus(format!("Failed to parse Joplin /{path} response: {e}")))
    }
}

impl CorpusSource for JoplinClient {
    async fn list_notes(&self, page: usize, limit: usize, fields: &[NoteField]) -> Result<Vec<NoteMeta>> {
        let query = [
            ("page", page.to_string()),
            ("limit", limit.to_string()),
            ("fields", field_list(fields)),
        ];
        let response = self.get("notes", &query).await?;
        if !response.status().is_success() {
            return Err(Self::error_for(response, "notes").await);
        }

        let page: Page<NoteMeta> = Self::parse(response, "notes").await?;
        Ok(page.items)
    }

    async fn get_note(&self, id: &str, fields: &[NoteField]) -> Result<NoteMeta> {
        let path = format!("notes/{id}");
        let response = self.get(&path, &[("fields", field_list(fields))]).await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(Error::NoteNotFound { id: id.to_string() });
        }
        if !response.status().is_success() {
            return Err(Self::error_for(response, &path).await);
        }

        Self::parse(response, &path).await
    }

    async fn get_folder(&self, id: &str) -> Result<FolderMeta> {
        let path = format!("folders/{id}");
        let response = self.get(&path, &[("fields", "id,title".to_string())]).await?;
        if !response.status().is_success() {
            return Err(Self::error_for(response, &path).await);
        }

        Self::parse(response, &path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let client = JoplinClient::from_settings(&JoplinSettings::default(), |_| None);
        assert_eq!(client.endpoint(), DEFAULT_JOPLIN_ENDPOINT);
        assert!(!client.has_token());
    }

    #[test]
    fn test_env_overrides_settings() {
        let settings = JoplinSettings {
            endpoint: Some("http://file:41184/".into()),
            token: Some("file-token".into()),
        };
        let env: HashMap<&str, &str> = HashMap::from([("JOPLIN_TOKEN", "env-token")]);
        let client = JoplinClient::from_settings(&settings, |k| env.get(k).map(|v| (*v).to_string()));

        assert_eq!(client.endpoint(), "http://file:41184");
        assert_eq!(client.token.as_deref(), Some("env-token"));
    }

    #[test]
    fn test_empty_token_is_none() {
        let client = JoplinClient::new(DEFAULT_JOPLIN_ENDPOINT, Some(String::new()));
        assert!(!client.has_token());
    }

    #[test]
    fn test_page_response_parsing() {
        let body = r#"{"items":[{"id":"a","updated_time":5},{"id":"b","updated_time":7}],"has_more":false}"#;
        let page: Page<NoteMeta> = serde_json::from_str(body).unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[1].updated_time, 7);
    }

    #[tokio::test]
    async fn test_unreachable_server_is_corpus_error() {
        let client = JoplinClient::new("http://127.0.0.1:9", None);
        let err = client.list_notes(1, 10, NoteField::SCAN).await.unwrap_err();
        assert!(matches!(err, Error::Corpus(_)));
    }
}
