// src/utils/http.rs

use std::sync::Arc;

use reqwest::{
    RequestBuilder, Response,
    header::{COOKIE, HeaderMap, HeaderValue},
};
use serde::de::DeserializeOwned;
use url::Url;

use crate::{
    config::Config,
    error::ClientError,
    models::form::FormData,
    utils::report::{StatusSink, show_error},
};

/// Thin wrapper over `reqwest::Client` for the quiz backend.
///
/// * Any non-2xx status is a failure carrying the status and body text.
/// * `*_json` / `*_text` helpers report failures to the status line before
///   returning them, so callers just use `?` and must not report again.
/// * `*_raw` helpers hand back the successful `Response` and leave reporting
///   to the caller.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    status: Arc<dyn StatusSink>,
}

impl ApiClient {
    pub fn new(base_url: &str, status: Arc<dyn StatusSink>) -> Result<Self, ClientError> {
        Self::with_client(reqwest::Client::new(), base_url, status)
    }

    /// Builds a client that carries the session cookie and request timeout.
    pub fn from_config(config: &Config, status: Arc<dyn StatusSink>) -> Result<Self, ClientError> {
        let mut headers = HeaderMap::new();
        if let Some(sid) = &config.session_id {
            let cookie = HeaderValue::from_str(&format!("sid={}", sid))
                .map_err(|e| ClientError::Config(format!("invalid QUIZDRUM_SID: {}", e)))?;
            headers.insert(COOKIE, cookie);
        }

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        Self::with_client(http, &config.base_url, status)
    }

    pub fn with_client(
        http: reqwest::Client,
        base_url: &str,
        status: Arc<dyn StatusSink>,
    ) -> Result<Self, ClientError> {
        let base = Url::parse(base_url)?;
        Ok(Self { http, base, status })
    }

    /// The status line failures are reported to.
    pub fn status(&self) -> &dyn StatusSink {
        self.status.as_ref()
    }

    pub fn url(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.base.join(path)?)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ClientError> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::http(status.as_u16(), body));
        }
        Ok(response)
    }

    fn reported<T>(&self, result: Result<T, ClientError>) -> Result<T, ClientError> {
        if let Err(err) = &result {
            show_error(self.status(), err);
        }
        result
    }

    async fn json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let text = self.send(request).await?.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    async fn text(&self, request: RequestBuilder) -> Result<String, ClientError> {
        Ok(self.send(request).await?.text().await?)
    }

    // GET

    pub async fn get_raw(&self, path: &str) -> Result<Response, ClientError> {
        tracing::debug!("GET {}", path);
        self.send(self.http.get(self.url(path)?)).await
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        tracing::debug!("GET {}", path);
        let result = match self.url(path) {
            Ok(url) => self.json(self.http.get(url)).await,
            Err(e) => Err(e),
        };
        self.reported(result)
    }

    pub async fn get_text(&self, path: &str) -> Result<String, ClientError> {
        tracing::debug!("GET {}", path);
        let result = match self.url(path) {
            Ok(url) => self.text(self.http.get(url)).await,
            Err(e) => Err(e),
        };
        self.reported(result)
    }

    // POST

    pub async fn post_raw(&self, path: &str, form: &FormData) -> Result<Response, ClientError> {
        tracing::debug!("POST {}", path);
        self.send(self.http.post(self.url(path)?).form(form)).await
    }

    pub async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        form: &FormData,
    ) -> Result<T, ClientError> {
        tracing::debug!("POST {}", path);
        let result = match self.url(path) {
            Ok(url) => self.json(self.http.post(url).form(form)).await,
            Err(e) => Err(e),
        };
        self.reported(result)
    }

    pub async fn post_text(&self, path: &str, form: &FormData) -> Result<String, ClientError> {
        tracing::debug!("POST {}", path);
        let result = match self.url(path) {
            Ok(url) => self.text(self.http.post(url).form(form)).await,
            Err(e) => Err(e),
        };
        self.reported(result)
    }

    // PUT

    pub async fn put_json<T: DeserializeOwned>(
        &self,
        path: &str,
        form: &FormData,
    ) -> Result<T, ClientError> {
        tracing::debug!("PUT {}", path);
        let result = match self.url(path) {
            Ok(url) => self.json(self.http.put(url).form(form)).await,
            Err(e) => Err(e),
        };
        self.reported(result)
    }

    pub async fn put_text(&self, path: &str, form: &FormData) -> Result<String, ClientError> {
        tracing::debug!("PUT {}", path);
        let result = match self.url(path) {
            Ok(url) => self.text(self.http.put(url).form(form)).await,
            Err(e) => Err(e),
        };
        self.reported(result)
    }

    // DELETE

    pub async fn delete_text(&self, path: &str) -> Result<String, ClientError> {
        tracing::debug!("DELETE {}", path);
        let result = match self.url(path) {
            Ok(url) => self.text(self.http.delete(url)).await,
            Err(e) => Err(e),
        };
        self.reported(result)
    }
}
