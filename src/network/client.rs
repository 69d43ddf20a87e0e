//! HTTP client for talking to the search cluster

use super::transport::{
    HttpMethod, Transport, TransportError, TransportRequest, TransportResponse,
};
use super::user_agent::{accept_json, user_agent};
use crate::config::ConnectionSettings;
use crate::util::{escape_date_math, to_curl_command};
use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// HTTP client wrapper implementing [`Transport`] over reqwest
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    base_url: Url,
    username: Option<String>,
    password: Option<String>,
    extra_headers: HashMap<String, String>,
    user_agent: String,
}

impl HttpClient {
    /// Create a client for the given cluster URL with default settings
    pub fn new(url: &str) -> Result<Self> {
        Self::with_settings(&ConnectionSettings {
            url: url.to_string(),
            ..Default::default()
        })
    }

    /// Create a new HTTP client with custom settings
    pub fn with_settings(settings: &ConnectionSettings) -> Result<Self> {
        let mut builder = Client::builder()
            .timeout(Duration::from_secs_f64(settings.request_timeout))
            .connect_timeout(Duration::from_secs_f64(settings.connect_timeout))
            .pool_max_idle_per_host(settings.pool_maxsize)
            .gzip(true)
            .brotli(true);

        // SSL verification
        if !settings.verify_ssl {
            builder = builder.danger_accept_invalid_certs(true);
        }

        // Proxy settings
        if let Some(ref proxy_url) = settings.proxies.all {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
        } else {
            if let Some(ref http) = settings.proxies.http {
                builder = builder.proxy(reqwest::Proxy::http(http)?);
            }
            if let Some(ref https) = settings.proxies.https {
                builder = builder.proxy(reqwest::Proxy::https(https)?);
            }
        }

        let client = builder.build()?;

        // Url::join drops the last segment unless the base ends with a slash
        let mut base_url = Url::parse(&settings.url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            client,
            base_url,
            username: settings.username.clone(),
            password: settings.password.clone(),
            extra_headers: settings.extra_headers.clone(),
            user_agent: user_agent(settings.useragent_suffix.as_deref()),
        })
    }

    /// Base URL of the cluster
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Current user agent
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Send a request and decode the JSON response
    pub async fn execute(
        &self,
        request: TransportRequest,
    ) -> std::result::Result<TransportResponse, TransportError> {
        let path = escape_date_math(request.path.trim_start_matches('/'));
        let url = self
            .base_url
            .join(&path)
            .map_err(|e| TransportError::Request(format!("invalid path '{}': {}", path, e)))?;

        debug!("{}", to_curl_command(&request, self.base_url.as_str()));

        let mut req_builder = match request.method {
            HttpMethod::Get => self.client.get(url),
            HttpMethod::Post => self.client.post(url),
            HttpMethod::Delete => self.client.delete(url),
        };

        req_builder = req_builder
            .header("User-Agent", &self.user_agent)
            .header("Accept", accept_json());

        for (key, value) in &self.extra_headers {
            req_builder = req_builder.header(key, value);
        }

        if let Some(ref username) = self.username {
            req_builder = req_builder.basic_auth(username, self.password.as_ref());
        }

        if !request.params.is_empty() {
            req_builder = req_builder.query(&request.params);
        }

        if let Some(ref body) = request.body {
            req_builder = req_builder.json(body);
        }

        let response = req_builder.send().await.map_err(|e| {
            warn!("Request to {} failed: {}", request.path, e);
            if e.is_connect() {
                TransportError::NoReachableEndpoint(e.to_string())
            } else {
                TransportError::Request(e.to_string())
            }
        })?;

        Self::parse_response(response).await
    }

    /// Parse response into a TransportResponse, classifying error statuses
    async fn parse_response(
        response: Response,
    ) -> std::result::Result<TransportResponse, TransportError> {
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            match serde_json::from_str(&text) {
                Ok(body) => body,
                // Error pages are not always JSON; keep the text for the error
                Err(_) if status >= 400 => Value::String(text),
                Err(e) => return Err(TransportError::Decode(e.to_string())),
            }
        };

        if let Some(error) = TransportError::from_status(status, body.clone()) {
            warn!("Engine answered with status {}", status);
            return Err(error);
        }

        Ok(TransportResponse::new(status, body))
    }
}

#[async_trait]
impl Transport for HttpClient {
    async fn search(
        &self,
        request: TransportRequest,
    ) -> std::result::Result<TransportResponse, TransportError> {
        self.execute(request).await
    }

    async fn scroll(
        &self,
        request: TransportRequest,
    ) -> std::result::Result<TransportResponse, TransportError> {
        self.execute(request).await
    }

    async fn clear_scroll(
        &self,
        request: TransportRequest,
    ) -> std::result::Result<TransportResponse, TransportError> {
        self.execute(request).await
    }
}
