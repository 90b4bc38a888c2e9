//! Error types for configured HTTP calls.
//!
//! Failures after a response arrived ([`Error::Response`] and
//! [`Error::ContentInterception`]) carry the fully normalized
//! [`ResponseResult`], so the parsed body is available for inspection.

use crate::response::{Content, ResponseResult};
use http::StatusCode;
use std::fmt;

/// The main error type for configured HTTP calls.
///
/// # Examples
///
/// ```no_run
/// use fetchwright::{Configurator, Endpoint, Error, Settings};
///
/// # async fn example() -> Result<(), Error> {
/// let api = Configurator::new("https://api.example.com/", Endpoint::template("users/{id}"))?;
///
/// match api.get(Settings::new().param("id", 7)).await {
///     Ok(result) => println!("Success: {:?}", result.content),
///     Err(Error::Response { result, .. }) => {
///         eprintln!("HTTP error {}: {:?}", result.status, result.raw_content);
///     }
///     Err(Error::ContentInterception { inner, .. }) => {
///         eprintln!("Interceptor failed: {}", inner);
///     }
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A required configuration argument was missing or invalid.
    ///
    /// The configurator is left exactly as it was before the failing call.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The server returned a non-2xx status.
    ///
    /// The body has been classified and parsed before this error is raised;
    /// the content interceptor is not applied.
    #[error("{message}")]
    Response {
        /// A description including the status code.
        message: String,
        /// The normalized result.
        result: Box<ResponseResult>,
    },

    /// The content interceptor failed on an otherwise successful response.
    #[error("{message}: {inner}")]
    ContentInterception {
        /// A description of the failure.
        message: String,
        /// The normalized result the interceptor was given.
        result: Box<ResponseResult>,
        /// The error the interceptor returned.
        #[source]
        inner: InterceptorError,
    },

    /// An interceptor error that opted out of wrapping, exactly as returned.
    #[error(transparent)]
    Interceptor(InterceptorError),

    /// A network-level error occurred (connection failed, DNS lookup failed, etc.).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The transport gave up because the call's signal was cancelled.
    ///
    /// This is a transport-level error reported by [`Transport`](crate::Transport)
    /// implementations; the response normalizer never produces it. No
    /// response exists, so [`Error::result`] is `None`.
    #[error("Request aborted")]
    Aborted,

    /// The response body could not be parsed as its declared content type.
    #[error("Failed to parse response (status {status}): {parse_error}")]
    DeserializationFailed {
        /// The raw response body as text.
        raw_response: String,
        /// The parser's error message.
        parse_error: String,
        /// The HTTP status code.
        status: StatusCode,
    },

    /// The request body could not be serialized to JSON.
    #[error("Failed to serialize request: {0}")]
    SerializationFailed(String),

    /// The request URL could not be resolved.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl Error {
    /// Returns the HTTP status code if a response was received.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Response { result, .. } => Some(result.status),
            Error::ContentInterception { result, .. } => Some(result.status),
            Error::DeserializationFailed { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the normalized result carried by response and interception errors.
    pub fn result(&self) -> Option<&ResponseResult> {
        match self {
            Error::Response { result, .. } => Some(result),
            Error::ContentInterception { result, .. } => Some(result),
            _ => None,
        }
    }

    /// Returns the parsed payload carried by response and interception errors.
    pub fn raw_content(&self) -> Option<&Content> {
        self.result().map(|result| &result.raw_content)
    }

    /// Returns `true` for non-2xx responses.
    pub fn is_response_error(&self) -> bool {
        matches!(self, Error::Response { .. })
    }

    /// Returns `true` if the content interceptor failed, wrapped or not.
    pub fn is_interception_error(&self) -> bool {
        matches!(
            self,
            Error::ContentInterception { .. } | Error::Interceptor(_)
        )
    }
}

/// An error returned by a content interceptor.
///
/// By default the configurator wraps it in [`Error::ContentInterception`]
/// together with the response. Errors built with [`InterceptorError::bypass`]
/// are returned to the caller as [`Error::Interceptor`] instead.
///
/// # Examples
///
/// ```
/// use fetchwright::InterceptorError;
///
/// let wrapped = InterceptorError::new("missing `data` field");
/// assert!(!wrapped.bypass_wrapping);
///
/// let verbatim = InterceptorError::new("session expired").bypass();
/// assert!(verbatim.bypass_wrapping);
/// ```
#[derive(Debug)]
pub struct InterceptorError {
    /// What went wrong.
    pub message: String,
    /// The underlying cause, if any.
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
    /// Skip wrapping and propagate this error as-is.
    pub bypass_wrapping: bool,
}

impl InterceptorError {
    /// Creates an error that will be wrapped with the response.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
            bypass_wrapping: false,
        }
    }

    /// Attaches an underlying cause.
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Marks the error to be propagated without wrapping.
    pub fn bypass(mut self) -> Self {
        self.bypass_wrapping = true;
        self
    }
}

impl fmt::Display for InterceptorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for InterceptorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|source| source as &(dyn std::error::Error + 'static))
    }
}

/// A specialized `Result` type for configured HTTP calls.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_interceptor_error_source_chain() {
        let cause = std::io::Error::new(std::io::ErrorKind::InvalidData, "bad field");
        let err = InterceptorError::new("transform failed").with_source(cause);

        assert_eq!(err.to_string(), "transform failed");
        assert_eq!(err.source().unwrap().to_string(), "bad field");
    }

    #[test]
    fn test_bypassed_error_displays_verbatim() {
        let err = Error::Interceptor(InterceptorError::new("session expired").bypass());

        assert_eq!(err.to_string(), "session expired");
        assert!(err.is_interception_error());
        assert!(err.status().is_none());
    }

    #[test]
    fn test_config_error_has_no_result() {
        let err = Error::Config("service URL is required".to_string());

        assert!(err.result().is_none());
        assert!(err.raw_content().is_none());
        assert!(!err.is_response_error());
    }
}
