// src/relay.rs
//! Outbound request contract. Adapters describe *what* to fetch; a [`Relay`]
//! performs the call and hands back the upstream status and body verbatim.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

const USER_AGENT: &str = concat!("trend-pulse/", env!("CARGO_PKG_VERSION"));

/// Envelope POSTed to the relay endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelayRequest {
    pub protocol: String,
    pub origin: String,
    pub path: String, // includes the query string
    pub method: String,
    pub headers: BTreeMap<String, String>,
}

impl RelayRequest {
    pub fn get(origin: &str, path: impl Into<String>) -> Self {
        Self {
            protocol: "https".to_string(),
            origin: origin.to_string(),
            path: path.into(),
            method: "GET".to_string(),
            headers: BTreeMap::new(),
        }
    }

    pub fn target_url(&self) -> String {
        format!("{}://{}{}", self.protocol, self.origin, self.path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayResponse {
    pub status: u16,
    pub body: String,
}

impl RelayResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body, treating a non-2xx status as an error.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        if !self.is_success() {
            return Err(anyhow!("upstream returned HTTP {}", self.status));
        }
        serde_json::from_str(&self.body).context("decoding upstream json")
    }
}

#[async_trait]
pub trait Relay: Send + Sync {
    async fn send(&self, req: &RelayRequest) -> Result<RelayResponse>;
}

fn build_client(timeout_secs: u64) -> Result<Client> {
    let client = Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(timeout_secs))
        .build()?;
    Ok(client)
}

/// Forwards every request to a single local relay endpoint.
#[derive(Clone)]
pub struct HttpRelay {
    endpoint: String,
    client: Client,
}

impl HttpRelay {
    pub fn new(endpoint: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        Ok(Self {
            endpoint: endpoint.into(),
            client: build_client(timeout_secs)?,
        })
    }
}

#[async_trait]
impl Relay for HttpRelay {
    async fn send(&self, req: &RelayRequest) -> Result<RelayResponse> {
        let rsp = self
            .client
            .post(&self.endpoint)
            .json(req)
            .send()
            .await
            .with_context(|| format!("relay post for {}", req.origin))?;
        let status = rsp.status().as_u16();
        let body = rsp.text().await.context("relay .text()")?;
        Ok(RelayResponse { status, body })
    }
}

/// Calls the upstream directly. For deployments that have no relay in front.
#[derive(Clone)]
pub struct DirectRelay {
    client: Client,
}

impl DirectRelay {
    pub fn new(timeout_secs: u64) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout_secs)?,
        })
    }
}

#[async_trait]
impl Relay for DirectRelay {
    async fn send(&self, req: &RelayRequest) -> Result<RelayResponse> {
        let method = reqwest::Method::from_bytes(req.method.as_bytes())
            .with_context(|| format!("invalid method {}", req.method))?;
        let mut builder = self.client.request(method, req.target_url());
        for (k, v) in &req.headers {
            builder = builder.header(k, v);
        }
        let rsp = builder
            .send()
            .await
            .with_context(|| format!("direct get {}", req.origin))?;
        let status = rsp.status().as_u16();
        let body = rsp.text().await.context("direct .text()")?;
        Ok(RelayResponse { status, body })
    }
}
