use async_trait::async_trait;
use reqwest::{Client, header::CONTENT_TYPE};
use std::time::Duration;
use tracing::debug;

use super::{Request, Transport, TransportError};

/// Plain HTTP transport to the device on the local network.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self { http: Client::new() }
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(&self, request: &Request) -> Result<Vec<u8>, TransportError> {
        let url = device_url(&request.host, request.path);
        debug!(method = %request.method, %url, "sending request to device");

        let mut builder = self
            .http
            .request(request.method.clone(), url.as_str())
            .header(CONTENT_TYPE, request.content_type);
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let res = builder
            .send()
            .await
            .map_err(|e| TransportError::Send { url: url.clone(), source: e.into() })?;

        let status = res.status();
        let body = res
            .bytes()
            .await
            .map_err(|e| TransportError::Body { url: url.clone(), source: e.into() })?;

        if !status.is_success() {
            return Err(TransportError::Status {
                url,
                status,
                body: truncate_body(&String::from_utf8_lossy(&body)),
            });
        }

        Ok(body.to_vec())
    }
}

fn device_url(host: &str, path: &str) -> String {
    format!("http://{}/{}", host.trim_end_matches('/'), path.trim_start_matches('/'))
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
