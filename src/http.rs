// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::pin::Pin;

use crate::config::ProxyConfig;
use crate::error::ConfigError;

/// A streaming response body
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, reqwest::Error>> + Send>>;

/// HTTP response with status, content length, and body stream
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Content-Length header value, if present
    pub content_length: Option<u64>,
    /// Response body as a stream of bytes
    pub body: ByteStream,
}

/// Fully buffered HTTP response
pub struct BufferedResponse {
    pub status: u16,
    pub body: Bytes,
}

/// HTTP client abstraction for testability
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// POST a JSON body with extra headers and buffer the response
    async fn post_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: Vec<u8>,
    ) -> Result<BufferedResponse, reqwest::Error>;

    /// Get a streaming response for large downloads
    async fn get_stream(&self, url: &str) -> Result<HttpResponse, reqwest::Error>;
}

/// Default HTTP client implementation using reqwest
#[derive(Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Create a client that routes traffic through the given proxies only.
    ///
    /// System proxy detection is disabled; callers decide which proxies apply.
    pub fn with_proxies(proxies: &ProxyConfig) -> Result<Self, ConfigError> {
        let mut builder = reqwest::Client::builder().no_proxy();

        if let Some(proxy) = proxies.for_http() {
            builder = builder.proxy(reqwest::Proxy::http(proxy).map_err(|e| {
                ConfigError::InvalidProxy {
                    url: proxy.to_string(),
                    source: e,
                }
            })?);
        }

        if let Some(proxy) = proxies.for_https() {
            builder = builder.proxy(reqwest::Proxy::https(proxy).map_err(|e| {
                ConfigError::InvalidProxy {
                    url: proxy.to_string(),
                    source: e,
                }
            })?);
        }

        let client = builder.build().map_err(ConfigError::ClientBuildFailed)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn post_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: Vec<u8>,
    ) -> Result<BufferedResponse, reqwest::Error> {
        let mut request = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body);

        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;

        Ok(BufferedResponse { status, body })
    }

    async fn get_stream(&self, url: &str) -> Result<HttpResponse, reqwest::Error> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let content_length = response.content_length();

        let body: ByteStream = Box::pin(response.bytes_stream());

        Ok(HttpResponse {
            status,
            content_length,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_builds_without_proxies() {
        let client = ReqwestClient::with_proxies(&ProxyConfig::default());
        assert!(client.is_ok());
    }

    #[test]
    fn client_builds_with_normalized_proxies() {
        let proxies = ProxyConfig::new(
            Some("proxy.local:3128".to_string()),
            Some("http://secure.local:3129".to_string()),
        );
        assert!(ReqwestClient::with_proxies(&proxies).is_ok());
    }

    #[test]
    fn reqwest_client_can_be_cloned() {
        let client = ReqwestClient::with_proxies(&ProxyConfig::default()).unwrap();
        let _cloned = client.clone();
    }
}
