//! HTTP client for the Notion public API

use async_trait::async_trait;
use reqwest::{header, Client, Method};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware, RequestBuilder};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use url::Url;

use super::{ApiErrorBody, CmsError, ContentSource, Listing, PageRecord, Query, RawBlock};
use crate::config::CmsConfig;

const USER_AGENT: &str = concat!("bitftx-site/", env!("CARGO_PKG_VERSION"));

#[derive(Clone)]
pub struct NotionClient {
    http: ClientWithMiddleware,
    api_base: Url,
    api_version: String,
    token: String,
    database_id: String,
    page_size: u32,
}

impl NotionClient {
    /// Build a client from config; the token is read from the environment
    pub fn new(config: &CmsConfig) -> Result<Self, CmsError> {
        let token = std::env::var(&config.token_env)
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| CmsError::Config(format!("{} is not set", config.token_env)))?;

        let database_id = config.database_id().ok_or_else(|| {
            CmsError::Config(format!(
                "no database id (set cms.database_id or one of {})",
                CmsConfig::DATABASE_ENV.join(", ")
            ))
        })?;

        Self::with_credentials(config, token, database_id)
    }

    pub fn with_credentials(
        config: &CmsConfig,
        token: String,
        database_id: String,
    ) -> Result<Self, CmsError> {
        // Url::join drops the last segment unless the base ends with a slash
        let api_base = Url::parse(&format!("{}/", config.api_base.trim_end_matches('/')))?;

        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
        let http = ClientBuilder::new(Client::new())
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            http,
            api_base,
            api_version: config.api_version.clone(),
            token,
            database_id,
            page_size: config.page_size(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, CmsError> {
        Ok(self.api_base.join(path)?)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http
            .request(method, url)
            .bearer_auth(&self.token)
            .header("Notion-Version", &self.api_version)
            .header(header::USER_AGENT, USER_AGENT)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, CmsError> {
        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let body: ApiErrorBody = serde_json::from_slice(&bytes).unwrap_or_default();
            return Err(CmsError::Api {
                status: status.as_u16(),
                code: body.code,
                message: body.message,
            });
        }

        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[derive(Debug, Deserialize)]
struct DatabaseObject {
    #[serde(default)]
    properties: Map<String, Value>,
}

#[async_trait]
impl ContentSource for NotionClient {
    async fn database_properties(&self) -> Result<Vec<String>, CmsError> {
        let url = self.endpoint(&format!("databases/{}", self.database_id))?;
        tracing::debug!("GET {}", url);
        let database: DatabaseObject = self.send(self.request(Method::GET, url)).await?;
        Ok(database.properties.keys().cloned().collect())
    }

    async fn query(&self, query: &Query) -> Result<Listing<PageRecord>, CmsError> {
        let url = self.endpoint(&format!("databases/{}/query", self.database_id))?;
        tracing::debug!(
            "POST {} (filter: {:?}, cursor: {:?})",
            url,
            query.filter,
            query.start_cursor
        );
        let request = self
            .request(Method::POST, url)
            .json(&query.to_body(self.page_size));
        self.send(request).await
    }

    async fn list_children(
        &self,
        block_id: &str,
        cursor: Option<&str>,
    ) -> Result<Listing<RawBlock>, CmsError> {
        let mut url = self.endpoint(&format!("blocks/{}/children", block_id))?;
        url.query_pairs_mut()
            .append_pair("page_size", &self.page_size.to_string());
        if let Some(cursor) = cursor {
            url.query_pairs_mut().append_pair("start_cursor", cursor);
        }
        tracing::debug!("GET {}", url);
        self.send(self.request(Method::GET, url)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_keeps_version_segment() {
        let client = NotionClient::with_credentials(
            &CmsConfig::default(),
            "secret".into(),
            "db".into(),
        )
        .unwrap();
        assert_eq!(
            client.endpoint("databases/db/query").unwrap().as_str(),
            "https://api.notion.com/v1/databases/db/query"
        );
    }

    #[test]
    fn test_missing_token_is_config_error() {
        let config = CmsConfig {
            token_env: "BITFTX_TEST_TOKEN_THAT_IS_NEVER_SET".into(),
            database_id: Some("db".into()),
            ..CmsConfig::default()
        };
        assert!(matches!(NotionClient::new(&config), Err(CmsError::Config(_))));
    }
}
