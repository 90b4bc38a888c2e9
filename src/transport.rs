//! The network seam.
//!
//! A [`Configurator`](crate::Configurator) hands a fully resolved
//! [`TransportRequest`] to a [`Transport`] and only relies on the returned
//! [`RawResponse`]. [`ReqwestTransport`] is the default implementation.

use crate::settings::Credentials;
use crate::{Error, Result};
use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};
use std::fmt::Debug;
use tokio_util::sync::CancellationToken;
use url::Url;

/// A fully resolved request.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// The HTTP method.
    pub method: Method,
    /// The final URL, including the query string.
    pub url: Url,
    /// The merged header set.
    pub headers: HeaderMap,
    /// The serialized JSON body, if any.
    pub body: Option<String>,
    /// The credentials mode.
    pub credentials: Credentials,
    /// The effective cancellation signal.
    pub signal: Option<CancellationToken>,
}

/// A response with its body fully read.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The response headers.
    pub headers: HeaderMap,
    /// The URL the response was served from, after redirects.
    pub url: Url,
    /// The response body.
    pub body: Bytes,
}

/// Sends requests over the network.
///
/// Implementations honor [`TransportRequest::signal`] by resolving with
/// their own cancellation error once it is cancelled. [`Error::Aborted`] is
/// the transport-level error [`ReqwestTransport`] uses for this; the
/// configurator passes whatever the transport returns through unchanged.
#[async_trait]
pub trait Transport: Send + Sync + Debug {
    /// Sends the request and reads the whole response body.
    async fn send(&self, request: TransportRequest) -> Result<RawResponse>;
}

/// A [`Transport`] backed by a shared `reqwest::Client`.
///
/// reqwest keeps no cookie jar or credential cache here, so there are no
/// ambient credentials for [`Credentials`] to gate; explicitly configured
/// headers such as `authorization` are always sent.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Creates a transport with a default `reqwest::Client`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a transport reusing an existing client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn execute(&self, request: TransportRequest) -> Result<RawResponse> {
        let mut builder = self
            .client
            .request(request.method, request.url)
            .headers(request.headers);

        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let url = response.url().clone();
        let body = response.bytes().await?;

        Ok(RawResponse {
            status,
            headers,
            url,
            body,
        })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> Result<RawResponse> {
        tracing::trace!(credentials = %request.credentials, "Dispatching request via reqwest");

        match request.signal.clone() {
            Some(signal) => {
                tokio::select! {
                    biased;
                    _ = signal.cancelled() => Err(Error::Aborted),
                    response = self.execute(request) => response,
                }
            }
            None => self.execute(request).await,
        }
    }
}
