//! The request configurator.
//!
//! A [`Configurator`] owns the default settings for a service: base URL,
//! endpoint function, params, query, headers, credentials, signal and an
//! optional content interceptor. Calls merge per-call [`Settings`] over these
//! defaults, send through a [`Transport`] and normalize the response.

use crate::{
    dictionary::{value_to_string, Dictionary},
    endpoint::Endpoint,
    normalize::{self, ContentInterceptor},
    response::ResponseResult,
    settings::{Credentials, Settings},
    transport::{ReqwestTransport, Transport, TransportRequest},
    Error, Result,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use http::{header::AUTHORIZATION, HeaderMap, HeaderName, HeaderValue, Method};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use url::Url;

/// The origin relative service URLs are resolved against by default.
pub const DEFAULT_ORIGIN: &str = "http://localhost/";

/// Default settings for a service, applied to every call.
///
/// Setters mutate the instance in place; clone it to branch a configuration
/// without affecting the original.
///
/// # Examples
///
/// ```no_run
/// use fetchwright::{Configurator, Dictionary, Endpoint, Settings};
/// use serde_json::json;
///
/// # async fn example() -> Result<(), fetchwright::Error> {
/// let mut api = Configurator::builder()
///     .service_url("https://api.example.com/v1/")?
///     .endpoint(Endpoint::template("users/{id}"))
///     .build()?;
///
/// api.set_bearer_auth("s3cr3t")?
///     .set_query(&Dictionary::new().with("expand", "profile"), false);
///
/// // GET https://api.example.com/v1/users/42?expand=profile
/// let user = api.get(Settings::new().param("id", 42)).await?;
/// println!("User: {:?}", user.content.as_json());
///
/// // POST with a JSON body
/// let created = api
///     .post(Settings::new().param("id", "new").body(&json!({"name": "Alice"}))?)
///     .await?;
/// println!("Created: {}", created.status);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Configurator {
    service_url: String,
    endpoint: Endpoint,
    params: Dictionary,
    query: Dictionary,
    headers: Dictionary,
    signal: Option<CancellationToken>,
    credentials: Credentials,
    content_interceptor: Option<ContentInterceptor>,
    default_origin: Url,
    transport: Arc<dyn Transport>,
}

impl Configurator {
    /// Creates a new `ConfiguratorBuilder`.
    pub fn builder() -> ConfiguratorBuilder {
        ConfiguratorBuilder::new()
    }

    /// Creates a configurator with default headers, credentials and transport.
    ///
    /// # Errors
    ///
    /// Returns an error if the service URL is empty.
    pub fn new(service_url: impl AsRef<str>, endpoint: Endpoint) -> Result<Self> {
        Self::builder()
            .service_url(service_url)?
            .endpoint(endpoint)
            .build()
    }

    /// Replaces the service URL.
    ///
    /// A relative URL such as `/api/` is resolved against the default origin
    /// when a request is built.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the URL is empty.
    pub fn set_service_url(&mut self, url: impl AsRef<str>) -> Result<&mut Self> {
        self.service_url = validate_service_url(url.as_ref())?;
        tracing::trace!(service_url = %self.service_url, "Service URL set");
        Ok(self)
    }

    /// Replaces the endpoint function.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if no endpoint is given.
    pub fn set_endpoint(&mut self, endpoint: Option<Endpoint>) -> Result<&mut Self> {
        self.endpoint =
            endpoint.ok_or_else(|| Error::Config("Endpoint function is required".to_string()))?;
        Ok(self)
    }

    /// Sets the `authorization` header to `value` as given.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the value is empty.
    pub fn set_authorization(&mut self, value: impl AsRef<str>) -> Result<&mut Self> {
        let value = require("Authorization value", value.as_ref())?;
        self.headers
            .insert(AUTHORIZATION.as_str(), value.to_string());
        tracing::trace!("Authorization header set");
        Ok(self)
    }

    /// Sets `authorization: Basic <token>`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the token is empty.
    pub fn set_basic_auth(&mut self, token: impl AsRef<str>) -> Result<&mut Self> {
        let token = require("Basic auth token", token.as_ref())?;
        self.set_authorization(format!("Basic {}", token))
    }

    /// Sets `authorization: Bearer <token>`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the token is empty.
    pub fn set_bearer_auth(&mut self, token: impl AsRef<str>) -> Result<&mut Self> {
        let token = require("Bearer token", token.as_ref())?;
        self.set_authorization(format!("Bearer {}", token))
    }

    /// Sets `authorization: Basic base64(user:password)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the user or password is empty.
    pub fn set_basic_auth_credentials(
        &mut self,
        user: impl AsRef<str>,
        password: impl AsRef<str>,
    ) -> Result<&mut Self> {
        let user = require("Basic auth user", user.as_ref())?;
        let password = require("Basic auth password", password.as_ref())?;
        let token = STANDARD.encode(format!("{}:{}", user, password));
        self.set_basic_auth(token)
    }

    /// Merges `params` into the default params, or replaces them if `replace`.
    pub fn set_params(&mut self, params: &Dictionary, replace: bool) -> &mut Self {
        update(&mut self.params, params, replace);
        tracing::trace!(count = self.params.len(), replace, "Params set");
        self
    }

    /// Merges `query` into the default query, or replaces it if `replace`.
    pub fn set_query(&mut self, query: &Dictionary, replace: bool) -> &mut Self {
        update(&mut self.query, query, replace);
        tracing::trace!(count = self.query.len(), replace, "Query set");
        self
    }

    /// Merges `headers` into the default headers, or replaces them if `replace`.
    ///
    /// Header names are stored lowercased.
    pub fn set_headers(&mut self, headers: &Dictionary, replace: bool) -> &mut Self {
        update(&mut self.headers, &headers.lowercase_keys(), replace);
        tracing::trace!(count = self.headers.len(), replace, "Headers set");
        self
    }

    /// Replaces the default cancellation signal.
    pub fn set_signal(&mut self, signal: Option<CancellationToken>) -> &mut Self {
        self.signal = signal;
        self
    }

    /// Replaces the credentials mode.
    pub fn set_credentials(&mut self, credentials: Credentials) -> &mut Self {
        self.credentials = credentials;
        self
    }

    /// Replaces the content interceptor.
    pub fn set_content_interceptor(&mut self, interceptor: Option<ContentInterceptor>) -> &mut Self {
        self.content_interceptor = interceptor;
        self
    }

    /// The service URL as configured.
    pub fn service_url(&self) -> &str {
        &self.service_url
    }

    /// The endpoint function.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// The default params.
    pub fn params(&self) -> &Dictionary {
        &self.params
    }

    /// The default query.
    pub fn query(&self) -> &Dictionary {
        &self.query
    }

    /// The default headers.
    pub fn headers(&self) -> &Dictionary {
        &self.headers
    }

    /// The default cancellation signal.
    pub fn signal(&self) -> Option<&CancellationToken> {
        self.signal.as_ref()
    }

    /// The credentials mode.
    pub fn credentials(&self) -> Credentials {
        self.credentials
    }

    /// Returns `true` if a content interceptor is configured.
    pub fn has_content_interceptor(&self) -> bool {
        self.content_interceptor.is_some()
    }

    /// Builds the full request URL.
    ///
    /// The endpoint receives the default params overlaid with
    /// `params_override`. Its path is resolved against the service URL, then
    /// the default query overlaid with `query_override` is appended.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if the service URL or path cannot be
    /// resolved.
    ///
    /// # Examples
    ///
    /// ```
    /// use fetchwright::{Configurator, Dictionary, Endpoint};
    /// use serde_json::json;
    ///
    /// let api = Configurator::new("https://api.example.com/v1/", Endpoint::template("items/{id}"))?;
    /// let url = api.build_url(
    ///     &Dictionary::new().with("id", 3),
    ///     &Dictionary::new().with("tag", json!(["a", "b"])),
    /// )?;
    ///
    /// assert_eq!(url.as_str(), "https://api.example.com/v1/items/3?tag=a&tag=b");
    /// # Ok::<(), fetchwright::Error>(())
    /// ```
    pub fn build_url(&self, params_override: &Dictionary, query_override: &Dictionary) -> Result<Url> {
        let params = self.params.merged(params_override);
        let path = self.endpoint.resolve(&params);

        let mut url = self.base_url()?.join(&path)?;

        let pairs = self.query.merged(query_override).to_query_pairs();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }

        Ok(url)
    }

    fn base_url(&self) -> Result<Url> {
        match Url::parse(&self.service_url) {
            Ok(url) => Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                Ok(self.default_origin.join(&self.service_url)?)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Makes a request with the given method.
    ///
    /// Headers are merged over the defaults, the body is serialized as JSON,
    /// and the per-call signal (if any) replaces the default signal. A
    /// non-2xx status yields [`Error::Response`] before the content
    /// interceptor runs.
    ///
    /// # Errors
    ///
    /// Returns any [`Error`]; see the variants for when each occurs.
    pub async fn fetch(&self, method: Method, settings: Settings) -> Result<ResponseResult> {
        let start_time = Instant::now();

        // Everything borrowed from `self` is resolved before the first await.
        let url = self.build_url(&settings.params, &settings.query)?;
        let headers = to_header_map(&self.headers.merged(&settings.headers.lowercase_keys()))?;
        let body = settings
            .body
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| Error::SerializationFailed(e.to_string()))?;
        let signal = settings.signal.or_else(|| self.signal.clone());
        let endpoint = self.endpoint.clone();
        let interceptor = self.content_interceptor.clone();

        tracing::debug!(
            method = %method,
            url = %url,
            credentials = %self.credentials,
            "Executing HTTP request"
        );

        let raw = self
            .transport
            .send(TransportRequest {
                method: method.clone(),
                url,
                headers,
                body,
                credentials: self.credentials,
                signal,
            })
            .await?;

        let result = normalize::normalize(raw, method, endpoint)?;

        tracing::info!(
            status = result.status.as_u16(),
            mime_type = %result.mime_type,
            content_type = %result.content_type,
            latency_ms = start_time.elapsed().as_millis(),
            "Received HTTP response"
        );

        if !result.status.is_success() {
            if result.status.is_client_error() {
                tracing::error!(
                    status = result.status.as_u16(),
                    content_type = %result.content_type,
                    "Client error (4xx)"
                );
            } else if result.status.is_server_error() {
                tracing::warn!(
                    status = result.status.as_u16(),
                    content_type = %result.content_type,
                    "Server error (5xx)"
                );
            }

            return Err(Error::Response {
                message: format!(
                    "Request to {} failed with status {}",
                    result.response.url, result.status
                ),
                result: Box::new(result),
            });
        }

        match interceptor {
            Some(interceptor) => normalize::intercept(result, &interceptor),
            None => Ok(result),
        }
    }

    /// Makes a GET request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the settings carry a body.
    pub async fn get(&self, settings: Settings) -> Result<ResponseResult> {
        reject_body(&Method::GET, &settings)?;
        self.fetch(Method::GET, settings).await
    }

    /// Makes a POST request with the settings' optional body.
    pub async fn post(&self, settings: Settings) -> Result<ResponseResult> {
        self.fetch(Method::POST, settings).await
    }

    /// Makes a PUT request with the settings' optional body.
    pub async fn put(&self, settings: Settings) -> Result<ResponseResult> {
        self.fetch(Method::PUT, settings).await
    }

    /// Makes a DELETE request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the settings carry a body.
    pub async fn del(&self, settings: Settings) -> Result<ResponseResult> {
        reject_body(&Method::DELETE, &settings)?;
        self.fetch(Method::DELETE, settings).await
    }
}

impl fmt::Debug for Configurator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configurator")
            .field("service_url", &self.service_url)
            .field("params", &self.params)
            .field("query", &self.query)
            .field("headers", &self.headers.len())
            .field("credentials", &self.credentials)
            .field("has_signal", &self.signal.is_some())
            .field("has_content_interceptor", &self.content_interceptor.is_some())
            .field("transport", &self.transport)
            .finish()
    }
}

/// Builder for configuring and creating a [`Configurator`].
///
/// # Examples
///
/// ```
/// use fetchwright::{Configurator, Credentials, Dictionary, Endpoint};
///
/// let api = Configurator::builder()
///     .service_url("/api/")?
///     .default_origin("https://app.example.com")?
///     .endpoint(Endpoint::template("orders/{id}"))
///     .header("x-client", "web")?
///     .params(Dictionary::new().with("id", "latest"))
///     .credentials(Credentials::Include)
///     .build()?;
///
/// let url = api.build_url(&Dictionary::new(), &Dictionary::new())?;
/// assert_eq!(url.as_str(), "https://app.example.com/api/orders/latest");
/// assert_eq!(api.headers().len(), 3);
/// # Ok::<(), fetchwright::Error>(())
/// ```
pub struct ConfiguratorBuilder {
    service_url: Option<String>,
    endpoint: Option<Endpoint>,
    params: Dictionary,
    query: Dictionary,
    headers: Dictionary,
    signal: Option<CancellationToken>,
    credentials: Credentials,
    content_interceptor: Option<ContentInterceptor>,
    default_origin: Option<Url>,
    transport: Option<Arc<dyn Transport>>,
}

impl ConfiguratorBuilder {
    /// Creates a builder with JSON `content-type` and `accept` headers and
    /// `same-origin` credentials.
    pub fn new() -> Self {
        Self {
            service_url: None,
            endpoint: None,
            params: Dictionary::new(),
            query: Dictionary::new(),
            headers: default_headers(),
            signal: None,
            credentials: Credentials::default(),
            content_interceptor: None,
            default_origin: None,
            transport: None,
        }
    }

    /// Sets the service URL all endpoint paths are resolved against.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is empty.
    pub fn service_url(mut self, url: impl AsRef<str>) -> Result<Self> {
        self.service_url = Some(validate_service_url(url.as_ref())?);
        Ok(self)
    }

    /// Sets the endpoint function.
    pub fn endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    /// Sets the default params.
    pub fn params(mut self, params: Dictionary) -> Self {
        self.params = params;
        self
    }

    /// Sets the default query.
    pub fn query(mut self, query: Dictionary) -> Self {
        self.query = query;
        self
    }

    /// Replaces the default headers, including the JSON defaults.
    pub fn headers(mut self, headers: Dictionary) -> Self {
        self.headers = headers.lowercase_keys();
        self
    }

    /// Adds a default header on top of the current set.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let name = HeaderName::try_from(name.as_ref())
            .map_err(|e| Error::Config(format!("Invalid header name: {}", e)))?;
        HeaderValue::try_from(value.as_ref())
            .map_err(|e| Error::Config(format!("Invalid header value: {}", e)))?;
        self.headers.insert(name.as_str(), value.as_ref());
        Ok(self)
    }

    /// Sets the default cancellation signal.
    pub fn signal(mut self, signal: CancellationToken) -> Self {
        self.signal = Some(signal);
        self
    }

    /// Sets the credentials mode.
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    /// Sets the content interceptor.
    pub fn content_interceptor(mut self, interceptor: ContentInterceptor) -> Self {
        self.content_interceptor = Some(interceptor);
        self
    }

    /// Sets the origin that relative service URLs are resolved against.
    ///
    /// Defaults to [`DEFAULT_ORIGIN`].
    ///
    /// # Errors
    ///
    /// Returns an error if the origin is not an absolute URL.
    pub fn default_origin(mut self, origin: impl AsRef<str>) -> Result<Self> {
        self.default_origin = Some(Url::parse(origin.as_ref())?);
        Ok(self)
    }

    /// Sets the transport. Defaults to [`ReqwestTransport`].
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Builds the configured `Configurator`.
    ///
    /// # Errors
    ///
    /// Returns an error if no service URL or endpoint was provided.
    pub fn build(self) -> Result<Configurator> {
        let service_url = self
            .service_url
            .ok_or_else(|| Error::Config("Service URL is required".to_string()))?;
        let endpoint = self
            .endpoint
            .ok_or_else(|| Error::Config("Endpoint function is required".to_string()))?;
        let default_origin = match self.default_origin {
            Some(origin) => origin,
            None => Url::parse(DEFAULT_ORIGIN)?,
        };
        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(ReqwestTransport::new()));

        Ok(Configurator {
            service_url,
            endpoint,
            params: self.params,
            query: self.query,
            headers: self.headers,
            signal: self.signal,
            credentials: self.credentials,
            content_interceptor: self.content_interceptor,
            default_origin,
            transport,
        })
    }
}

impl Default for ConfiguratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn default_headers() -> Dictionary {
    Dictionary::new()
        .with("content-type", "application/json")
        .with("accept", "application/json")
}

fn validate_service_url(url: &str) -> Result<String> {
    if url.trim().is_empty() {
        return Err(Error::Config("Service URL is required".to_string()));
    }
    Ok(url.to_string())
}

fn require<'a>(what: &str, value: &'a str) -> Result<&'a str> {
    if value.is_empty() {
        return Err(Error::Config(format!("{} is required", what)));
    }
    Ok(value)
}

fn update(target: &mut Dictionary, incoming: &Dictionary, replace: bool) {
    if replace {
        *target = incoming.clone();
    } else {
        target.merge(incoming);
    }
}

fn reject_body(method: &Method, settings: &Settings) -> Result<()> {
    if settings.body.is_some() {
        return Err(Error::Config(format!("{} requests cannot carry a body", method)));
    }
    Ok(())
}

fn to_header_map(headers: &Dictionary) -> Result<HeaderMap> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let name = HeaderName::try_from(name.as_str())
            .map_err(|e| Error::Config(format!("Invalid header name: {}", e)))?;
        let value = HeaderValue::try_from(value_to_string(value))
            .map_err(|e| Error::Config(format!("Invalid header value: {}", e)))?;
        map.insert(name, value);
    }
    Ok(map)
}
