//! HTTP transport layer
//!
//! All requests leave the crate through [`Transport`]. Centralizing the dispatch here
//! keeps the rest of the code independent of the HTTP library's failure types: every
//! `reqwest` error is classified into [`Error`](crate::error::Error) at this boundary,
//! so the transport library could be swapped without touching callers.

use crate::config::TransportConfig;
use crate::error::{Error, Result};
use reqwest::{RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

/// REST API version the client speaks
const API_VERSION: &str = "v1";

/// Thin wrapper around a pooled HTTP client plus the instance's resolved URLs
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Clone, Debug)]
pub(crate) struct Transport {
    http: reqwest::Client,
    rest_url: Url,
    graphql_url: Url,
    request_timeout: Duration,
}

impl Transport {
    /// Build a transport for one server instance.
    ///
    /// Fails with [`Error::InvalidUrl`] if `base_url` does not parse as an
    /// absolute http(s) URL.
    pub(crate) fn new(base_url: &str, config: &TransportConfig) -> Result<Self> {
        let trimmed = base_url.trim_end_matches('/');
        let base = Url::parse(trimmed)
            .map_err(|e| Error::InvalidUrl(format!("{trimmed}: {e}")))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(Error::InvalidUrl(format!(
                "{trimmed}: scheme must be http or https"
            )));
        }

        let rest_url = Url::parse(&format!("{trimmed}/api/{API_VERSION}/"))
            .map_err(|e| Error::InvalidUrl(format!("{trimmed}: {e}")))?;
        let graphql_url = Url::parse(&format!("{trimmed}/graphql"))
            .map_err(|e| Error::InvalidUrl(format!("{trimmed}: {e}")))?;

        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(Error::from_transport)?;

        Ok(Self {
            http,
            rest_url,
            graphql_url,
            request_timeout: config.request_timeout,
        })
    }

    /// Full URL for a REST endpoint path relative to `/api/v1/`
    pub(crate) fn rest_endpoint(&self, path: &str) -> String {
        format!("{}{}", self.rest_url, path.trim_start_matches('/'))
    }

    /// GET a REST endpoint
    pub(crate) async fn get(&self, endpoint: &str, token: &str) -> Result<Response> {
        let builder = self
            .http
            .get(self.rest_endpoint(endpoint))
            .bearer_auth(token)
            .timeout(self.request_timeout);
        self.execute(builder).await
    }

    /// DELETE a REST endpoint
    pub(crate) async fn delete(&self, endpoint: &str, token: &str) -> Result<Response> {
        let builder = self
            .http
            .delete(self.rest_endpoint(endpoint))
            .bearer_auth(token)
            .timeout(self.request_timeout);
        self.execute(builder).await
    }

    /// POST a JSON body to a REST endpoint
    pub(crate) async fn post_json<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        token: &str,
        body: &B,
    ) -> Result<Response> {
        let builder = self
            .http
            .post(self.rest_endpoint(endpoint))
            .bearer_auth(token)
            .json(body)
            .timeout(self.request_timeout);
        self.execute(builder).await
    }

    /// POST a JSON body and keep the response open for streaming consumption.
    ///
    /// No request timeout is applied: a streaming query holds its response body
    /// open indefinitely, and a whole-request deadline would kill healthy live
    /// streams. Stalls surface through the chunk reader instead.
    pub(crate) async fn post_json_streaming<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        token: &str,
        accept: &str,
        body: &B,
    ) -> Result<Response> {
        let builder = self
            .http
            .post(self.rest_endpoint(endpoint))
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, accept)
            .json(body);
        self.execute(builder).await
    }

    /// POST a multipart form to a REST endpoint (file upload)
    pub(crate) async fn post_multipart(
        &self,
        endpoint: &str,
        token: &str,
        form: reqwest::multipart::Form,
    ) -> Result<Response> {
        let builder = self
            .http
            .post(self.rest_endpoint(endpoint))
            .bearer_auth(token)
            .multipart(form)
            .timeout(self.request_timeout);
        self.execute(builder).await
    }

    /// Execute a GraphQL document and unwrap the `data` envelope.
    ///
    /// GraphQL reports failures as a 200 with an `errors` array, so both the HTTP
    /// status and the envelope are checked here.
    pub(crate) async fn graphql(
        &self,
        token: &str,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<serde_json::Value> {
        let body = serde_json::json!({
            "query": query,
            "variables": variables,
        });
        let builder = self
            .http
            .post(self.graphql_url.clone())
            .bearer_auth(token)
            .json(&body)
            .timeout(self.request_timeout);
        let response = self.execute(builder).await?;

        let mut envelope: serde_json::Value = Self::json_body(response).await?;
        let data = envelope.get_mut("data").map(serde_json::Value::take);
        match data {
            Some(data) if !data.is_null() => Ok(data),
            _ => {
                let detail = envelope
                    .get("errors")
                    .map(ToString::to_string)
                    .unwrap_or_else(|| "GraphQL response carried no data".to_string());
                Err(Error::Protocol(detail))
            }
        }
    }

    /// Read a response body and decode it as JSON
    pub(crate) async fn json_body<T: DeserializeOwned>(response: Response) -> Result<T> {
        let text = response.text().await.map_err(Error::from_transport)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Send a built request, mapping transport failures and non-2xx statuses
    async fn execute(&self, builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await.map_err(Error::from_transport)?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::debug!(status = status.as_u16(), "request rejected by server");
        Err(Error::Http {
            status: status.as_u16(),
            body,
        })
    }
}
