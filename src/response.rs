//! Normalized response results.
//!
//! Every call yields a [`ResponseResult`] whose payload has been classified by
//! content type. The payload before interception is kept in
//! [`ResponseResult::raw_content`] for diagnostics.

use crate::endpoint::Endpoint;
use crate::xml::XmlDocument;
use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use url::Url;

/// The classification a response body was parsed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    /// `application/json` and `application/*+json`.
    Json,
    /// `application/xml` and `application/*+xml`.
    Xml,
    /// `text/*` and the remaining `*xml` types.
    Text,
    /// Anything else, read as raw bytes.
    Blob,
    /// No payload could be read (an empty JSON body).
    Unknown,
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ContentType::Json => "JSON",
            ContentType::Xml => "XML",
            ContentType::Text => "TEXT",
            ContentType::Blob => "BLOB",
            ContentType::Unknown => "UNKNOWN",
        };
        f.write_str(name)
    }
}

/// A response payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    /// A parsed JSON value.
    Json(Value),
    /// A parsed XML document.
    Xml(XmlDocument),
    /// Text content.
    Text(String),
    /// Raw bytes.
    Blob(Bytes),
    /// No content.
    Empty,
}

impl Content {
    /// The classification matching this payload's shape.
    pub fn content_type(&self) -> ContentType {
        match self {
            Content::Json(_) => ContentType::Json,
            Content::Xml(_) => ContentType::Xml,
            Content::Text(_) => ContentType::Text,
            Content::Blob(_) => ContentType::Blob,
            Content::Empty => ContentType::Unknown,
        }
    }

    /// Returns the JSON value, if this is JSON content.
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Content::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the XML document, if this is XML content.
    pub fn as_xml(&self) -> Option<&XmlDocument> {
        match self {
            Content::Xml(doc) => Some(doc),
            _ => None,
        }
    }

    /// Returns the text, if this is text content.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Content::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the bytes, if this is binary content.
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Content::Blob(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Deserializes JSON content into a typed value.
    ///
    /// Returns `None` for non-JSON content.
    pub fn json<T: DeserializeOwned>(&self) -> Option<serde_json::Result<T>> {
        self.as_json().map(|value| T::deserialize(value))
    }
}

/// Status line, headers, and final URL of the transport response.
#[derive(Debug, Clone)]
pub struct ResponseHead {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The response headers.
    pub headers: HeaderMap,
    /// The URL the response was served from.
    pub url: Url,
}

impl ResponseHead {
    /// Returns a header value by name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }
}

/// The normalized outcome of one call.
///
/// # Examples
///
/// ```no_run
/// use fetchwright::{Configurator, ContentType, Endpoint, Settings};
///
/// # async fn example() -> fetchwright::Result<()> {
/// let api = Configurator::new("https://api.example.com/", Endpoint::fixed("status"))?;
/// let result = api.get(Settings::new()).await?;
///
/// if result.content_type == ContentType::Json {
///     println!("{:?}", result.content.as_json());
/// }
/// println!("{} {}", result.status, result.mime_type);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ResponseResult {
    /// Status, headers and URL of the underlying response.
    pub response: ResponseHead,

    /// The payload after the content interceptor ran (if one is configured).
    pub content: Content,

    /// The payload as classified and parsed, before interception.
    pub raw_content: Content,

    /// The HTTP status code.
    pub status: StatusCode,

    /// The lowercased MIME type the body was classified by, without parameters.
    pub mime_type: String,

    /// The request method.
    pub method: Method,

    /// The endpoint that produced the request path.
    pub endpoint: Endpoint,

    /// The classification of `raw_content`.
    pub content_type: ContentType,
}

impl ResponseResult {
    /// Returns `true` if the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Returns a response header value by name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.response.header(name)
    }

    /// Returns `true` if the content interceptor replaced the payload.
    pub fn was_intercepted(&self) -> bool {
        self.content != self.raw_content
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[test]
    fn test_content_type_matches_shape() {
        assert_eq!(Content::Json(json!({})).content_type(), ContentType::Json);
        assert_eq!(Content::Text(String::new()).content_type(), ContentType::Text);
        assert_eq!(Content::Blob(Bytes::new()).content_type(), ContentType::Blob);
        assert_eq!(Content::Empty.content_type(), ContentType::Unknown);
    }

    #[test]
    fn test_typed_json_content() {
        #[derive(Deserialize)]
        struct User {
            id: u64,
        }

        let content = Content::Json(json!({"id": 9}));
        let user: User = content.json().unwrap().unwrap();
        assert_eq!(user.id, 9);

        assert!(Content::Text("x".into()).json::<User>().is_none());
    }

    #[test]
    fn test_content_type_display() {
        assert_eq!(ContentType::Xml.to_string(), "XML");
        assert_eq!(ContentType::Unknown.to_string(), "UNKNOWN");
    }
}
