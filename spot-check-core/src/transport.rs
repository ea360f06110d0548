use crate::{Config, transport::http::HttpTransport};
use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use std::{fmt::Debug, sync::Arc};
use thiserror::Error;

pub mod http;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A single exchange with the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub host: String,
    pub path: &'static str,
    pub method: Method,
    pub body: Option<Vec<u8>>,
    pub content_type: &'static str,
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to reach device at {url}")]
    Send {
        url: String,
        #[source]
        source: BoxError,
    },

    #[error("device at {url} answered {status}: {body}")]
    Status {
        url: String,
        status: StatusCode,
        body: String,
    },

    #[error("failed to read response body from {url}")]
    Body {
        url: String,
        #[source]
        source: BoxError,
    },

    #[error("request to device did not finish")]
    Interrupted {
        #[source]
        source: tokio::task::JoinError,
    },
}

/// Carries requests to the device.
///
/// Dropping the returned future cancels the exchange.
#[async_trait]
pub trait Transport: Send + Sync + Debug {
    async fn request(&self, request: &Request) -> Result<Vec<u8>, TransportError>;
}

/// Construct the HTTP transport described by the settings file.
pub fn transport_from_config(config: &Config) -> anyhow::Result<Arc<dyn Transport>> {
    let transport = HttpTransport::with_timeout(config.timeout())
        .context("Failed to build HTTP client for the Spot Check device")?;

    Ok(Arc::new(transport))
}
