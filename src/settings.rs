//! Per-call settings and credential modes.

use crate::dictionary::Dictionary;
use serde_json::Value;
use std::fmt;
use tokio_util::sync::CancellationToken;

/// Whether the transport may attach ambient credentials (cookies, HTTP auth)
/// to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Credentials {
    /// Never send ambient credentials.
    Omit,
    /// Send ambient credentials only to the service's own origin.
    #[default]
    SameOrigin,
    /// Always send ambient credentials.
    Include,
}

impl fmt::Display for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = match self {
            Credentials::Omit => "omit",
            Credentials::SameOrigin => "same-origin",
            Credentials::Include => "include",
        };
        f.write_str(mode)
    }
}

/// Overrides for a single call.
///
/// Params, query and headers are merged over the configurator's defaults,
/// with these values winning. A signal replaces the default signal entirely.
///
/// # Examples
///
/// ```
/// use fetchwright::Settings;
/// use serde_json::json;
///
/// let settings = Settings::new()
///     .param("id", 42)
///     .query_param("tags", json!(["a", "b"]))
///     .header("x-request-id", "abc")
///     .body(&json!({"name": "Alice"}))
///     .unwrap();
///
/// assert_eq!(settings.params.len(), 1);
/// assert!(settings.body.is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Settings {
    /// Params passed to the endpoint function.
    pub params: Dictionary,

    /// Query entries appended to the URL.
    pub query: Dictionary,

    /// Additional headers for this call.
    pub headers: Dictionary,

    /// A cancellation signal for this call only.
    pub signal: Option<CancellationToken>,

    /// The JSON body, only sent by POST and PUT.
    pub body: Option<Value>,
}

impl Settings {
    /// Creates empty settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an endpoint param.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key, value);
        self
    }

    /// Merges a set of endpoint params.
    pub fn params(mut self, params: &Dictionary) -> Self {
        self.params.merge(params);
        self
    }

    /// Adds a query entry.
    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.query.insert(key, value);
        self
    }

    /// Merges a set of query entries.
    pub fn query(mut self, query: &Dictionary) -> Self {
        self.query.merge(query);
        self
    }

    /// Adds a header. Names are case-insensitive.
    pub fn header(mut self, name: impl AsRef<str>, value: impl Into<Value>) -> Self {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value);
        self
    }

    /// Merges a set of headers.
    pub fn headers(mut self, headers: &Dictionary) -> Self {
        self.headers.merge(&headers.lowercase_keys());
        self
    }

    /// Sets the cancellation signal for this call.
    pub fn signal(mut self, signal: CancellationToken) -> Self {
        self.signal = Some(signal);
        self
    }

    /// Sets the request body.
    ///
    /// # Errors
    ///
    /// Returns an error if the body cannot be serialized to JSON.
    pub fn body<B: serde::Serialize + ?Sized>(mut self, body: &B) -> crate::Result<Self> {
        let value = serde_json::to_value(body)
            .map_err(|e| crate::Error::SerializationFailed(e.to_string()))?;
        self.body = Some(value);
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_header_names_are_lowercased() {
        let settings = Settings::new()
            .header("X-Trace", "1")
            .headers(&Dictionary::new().with("Accept", "text/plain"));

        assert_eq!(settings.headers.get("x-trace"), Some(&json!("1")));
        assert_eq!(settings.headers.get("accept"), Some(&json!("text/plain")));
    }

    #[test]
    fn test_credentials_display() {
        assert_eq!(Credentials::default().to_string(), "same-origin");
        assert_eq!(Credentials::Omit.to_string(), "omit");
    }
}
