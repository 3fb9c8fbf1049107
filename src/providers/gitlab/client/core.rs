use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use url::Url;

use crate::auth::Token;
use crate::error::{MrLensError, Result};

pub(super) const PAGE_SIZE: u32 = 100;
const NEXT_PAGE_HEADER: &str = "x-next-page";

/// Thin wrapper around the GitLab REST API (v4).
pub struct GitLabClient {
    client: Client,
    api_url: String,
    token: Token,
}

impl GitLabClient {
    /// Creates a client for the REST base URL `api_url` (e.g. `https://gitlab.com/api/v4`).
    pub fn new(api_url: &str, token: Token) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .user_agent(concat!("mrlens/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .map_err(|e| MrLensError::Config(format!("Failed to create HTTP client: {e}")))?;

        Url::parse(api_url)
            .map_err(|e| MrLensError::Config(format!("Invalid API base URL: {e}")))?;

        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn endpoint(&self, path: &str, query: &[(&str, String)]) -> Result<Url> {
        let mut url = Url::parse(&format!("{}{path}", self.api_url))
            .map_err(|e| MrLensError::Config(format!("Invalid request URL: {e}")))?;

        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }

        Ok(url)
    }

    /// Issues an authenticated GET and fails on any non-2xx status.
    pub(super) async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Response> {
        let url = self.endpoint(path, query)?;
        debug!("GET {url}");

        let response = self
            .client
            .get(url)
            .bearer_auth(self.token.as_str())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(MrLensError::ApiError {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
                message,
            });
        }

        Ok(response)
    }

    pub(super) async fn get_json<T>(&self, path: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let body = self.get(path, &[]).await?.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    pub(super) async fn get_text(&self, path: &str) -> Result<String> {
        Ok(self.get(path, &[]).await?.text().await?)
    }

    /// Fetches every page of a list endpoint, following the `x-next-page` header.
    pub(super) async fn get_paged<T>(&self, path: &str) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let mut results = Vec::new();
        let mut page: u32 = 1;

        loop {
            let response = self
                .get(
                    path,
                    &[("page", page.to_string()), ("per_page", PAGE_SIZE.to_string())],
                )
                .await?;

            let next_page = next_page(response.headers());
            let body = response.bytes().await?;

            let chunk: serde_json::Value = serde_json::from_slice(&body)?;
            if !chunk.is_array() {
                return Err(MrLensError::UnexpectedResponse(format!(
                    "Expected paged response from {path} to be an array."
                )));
            }

            let items: Vec<T> = serde_json::from_value(chunk)?;
            debug!("Fetched {} items from {path} (page {page})", items.len());
            results.extend(items);

            match next_page {
                Some(next) => page = next,
                None => break,
            }
        }

        Ok(results)
    }
}

/// Absent, blank, zero and non-numeric values all end pagination.
fn next_page(headers: &HeaderMap) -> Option<u32> {
    headers
        .get(NEXT_PAGE_HEADER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|page| *page > 0)
}
