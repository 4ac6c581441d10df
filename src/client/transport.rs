//! HTTP transport seam.
//!
//! The consensus client and health selector speak to nodes through the
//! `Transport` trait so tests can swap in mock servers or scripted fakes.

use std::time::Duration;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::client::ClientError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// One request description, replayed against every node of a role.
#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    pub method: Method,
    pub body: Option<serde_json::Value>,
    pub form: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub basic_auth: Option<(String, String)>,
    pub required_status: u16,
}

impl ExecutionRequest {
    pub fn get(required_status: u16) -> Self {
        Self {
            method: Method::Get,
            body: None,
            form: Vec::new(),
            headers: Vec::new(),
            basic_auth: None,
            required_status,
        }
    }

    pub fn post(required_status: u16) -> Self {
        Self { method: Method::Post, ..Self::get(required_status) }
    }

    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self, ClientError> {
        self.body = Some(serde_json::to_value(body).map_err(|e| ClientError::Encode(e.to_string()))?);
        Ok(self)
    }

    pub fn form_field(mut self, key: &str, value: impl Into<String>) -> Self {
        self.form.push((key.to_string(), value.into()));
        self
    }

    pub fn headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.headers.extend(headers);
        self
    }

    pub fn basic_auth(mut self, user: &str, password: &str) -> Self {
        self.basic_auth = Some((user.to_string(), password.to_string()));
        self
    }
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        serde_json::from_slice(&self.body)
            .map_err(|e| ClientError::Decode { message: e.to_string(), body: self.text() })
    }
}

#[async_trait::async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn execute(&self, url: Url, req: &ExecutionRequest) -> Result<HttpResponse, ClientError>;
}

/// reqwest-backed transport.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, url: Url, req: &ExecutionRequest) -> Result<HttpResponse, ClientError> {
        let mut builder = match req.method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
        };
        for (k, v) in &req.headers {
            builder = builder.header(k.as_str(), v.as_str());
        }
        if let Some((user, password)) = &req.basic_auth {
            builder = builder.basic_auth(user, Some(password));
        }
        if let Some(body) = &req.body {
            builder = builder.json(body);
        } else if !req.form.is_empty() {
            builder = builder.form(&req.form);
        }

        // Strip the URL so identical failures on different nodes compare equal.
        let resp = builder.send().await.map_err(|e| ClientError::Transport(e.without_url().to_string()))?;
        let status = resp.status().as_u16();
        let body = resp.bytes().await.map_err(|e| ClientError::Transport(e.without_url().to_string()))?;
        Ok(HttpResponse { status, body })
    }
}
