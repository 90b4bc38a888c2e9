//! Content-type classification, body parsing, and content interception.
//!
//! A raw response moves through `classify -> parse -> [intercept]`. Status
//! checking happens between parsing and interception, in the configurator,
//! so error results always carry the parsed body.

use crate::endpoint::Endpoint;
use crate::error::InterceptorError;
use crate::response::{Content, ContentType, ResponseHead, ResponseResult};
use crate::transport::RawResponse;
use crate::xml::XmlDocument;
use crate::{Error, Result};
use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, Method, StatusCode};
use regex::Regex;
use std::sync::{Arc, OnceLock};

/// The MIME type assumed when a response has no `content-type` header.
pub const DEFAULT_MIME_TYPE: &str = "text/plain";

/// A caller-supplied transform applied to every successful result.
///
/// The returned [`Content`] replaces [`ResponseResult::content`]; the
/// original payload stays in [`ResponseResult::raw_content`].
pub type ContentInterceptor =
    Arc<dyn Fn(&ResponseResult) -> std::result::Result<Content, InterceptorError> + Send + Sync>;

struct MimePatterns {
    json: Regex,
    xml: Regex,
    xml_like: Regex,
}

fn patterns() -> &'static MimePatterns {
    static PATTERNS: OnceLock<MimePatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| MimePatterns {
        json: Regex::new(r"(?i)^application/(.+\+)?json").expect("Invalid JSON MIME regex"),
        xml: Regex::new(r"(?i)^application/(.+\+)?xml").expect("Invalid XML MIME regex"),
        xml_like: Regex::new(r"(?i)^(text|application|image)/(.+\+)?xml")
            .expect("Invalid XML-like MIME regex"),
    })
}

/// Classifies a MIME type. The first matching rule wins.
///
/// `text/xml` and `image/svg+xml` classify as [`ContentType::Text`]: the text
/// rule is checked before any XML handling outside `application/`. This
/// precedence is kept for compatibility even though it shadows XML parsing
/// for those types.
///
/// # Examples
///
/// ```
/// use fetchwright::{classify, ContentType};
///
/// assert_eq!(classify("application/json"), ContentType::Json);
/// assert_eq!(classify("application/problem+json"), ContentType::Json);
/// assert_eq!(classify("application/xml"), ContentType::Xml);
/// assert_eq!(classify("text/xml"), ContentType::Text);
/// assert_eq!(classify("image/png"), ContentType::Blob);
/// ```
pub fn classify(mime_type: &str) -> ContentType {
    let patterns = patterns();
    if patterns.json.is_match(mime_type) {
        ContentType::Json
    } else if patterns.xml.is_match(mime_type) {
        ContentType::Xml
    } else if mime_type.to_ascii_lowercase().starts_with("text/")
        || patterns.xml_like.is_match(mime_type)
    {
        ContentType::Text
    } else {
        ContentType::Blob
    }
}

/// Extracts the lowercased MIME type from the `content-type` header,
/// dropping parameters such as `charset`.
pub fn mime_type_of(headers: &HeaderMap) -> String {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|value| value.trim().to_ascii_lowercase())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string())
}

/// Parses a body under the given classification.
///
/// An empty JSON or XML body yields [`Content::Empty`].
pub fn parse_body(
    content_type: ContentType,
    mime_type: &str,
    body: &Bytes,
    status: StatusCode,
) -> Result<Content> {
    let structured = matches!(content_type, ContentType::Json | ContentType::Xml);
    if structured && body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Content::Empty);
    }

    match content_type {
        ContentType::Json => {
            serde_json::from_slice(body)
                .map(Content::Json)
                .map_err(|e| Error::DeserializationFailed {
                    raw_response: String::from_utf8_lossy(body).into_owned(),
                    parse_error: e.to_string(),
                    status,
                })
        }
        ContentType::Xml => {
            let text = String::from_utf8_lossy(body);
            XmlDocument::parse(&text, mime_type)
                .map(Content::Xml)
                .map_err(|e| Error::DeserializationFailed {
                    raw_response: text.to_string(),
                    parse_error: e.to_string(),
                    status,
                })
        }
        ContentType::Text => Ok(Content::Text(String::from_utf8_lossy(body).into_owned())),
        ContentType::Blob => Ok(Content::Blob(body.clone())),
        ContentType::Unknown => Ok(Content::Empty),
    }
}

/// Turns a raw transport response into a [`ResponseResult`].
///
/// Parse failures on a successful status are errors. On a non-2xx status a
/// body that does not parse under its declared type is kept as text, so the
/// status error can still be raised with the body attached.
pub fn normalize(raw: RawResponse, method: Method, endpoint: Endpoint) -> Result<ResponseResult> {
    let mime_type = mime_type_of(&raw.headers);
    let classified = classify(&mime_type);

    let raw_content = match parse_body(classified, &mime_type, &raw.body, raw.status) {
        Ok(content) => content,
        Err(Error::DeserializationFailed {
            raw_response,
            parse_error,
            ..
        }) if !raw.status.is_success() => {
            tracing::debug!(
                status = raw.status.as_u16(),
                mime_type = %mime_type,
                error = %parse_error,
                "Error body did not match its content type, keeping it as text"
            );
            Content::Text(raw_response)
        }
        Err(e) => {
            tracing::error!(
                error = %e,
                mime_type = %mime_type,
                "Failed to parse response body"
            );
            return Err(e);
        }
    };

    let content_type = raw_content.content_type();
    Ok(ResponseResult {
        response: ResponseHead {
            status: raw.status,
            headers: raw.headers,
            url: raw.url,
        },
        content: raw_content.clone(),
        raw_content,
        status: raw.status,
        mime_type,
        method,
        endpoint,
        content_type,
    })
}

/// Runs the interceptor over a successful result.
///
/// A failing interceptor's error is wrapped in
/// [`Error::ContentInterception`] unless it is marked with
/// [`InterceptorError::bypass`], in which case it is returned as
/// [`Error::Interceptor`].
pub fn intercept(
    mut result: ResponseResult,
    interceptor: &ContentInterceptor,
) -> Result<ResponseResult> {
    match interceptor(&result) {
        Ok(content) => {
            result.content = content;
            Ok(result)
        }
        Err(inner) if inner.bypass_wrapping => {
            tracing::debug!(error = %inner, "Interceptor error bypasses wrapping");
            Err(Error::Interceptor(inner))
        }
        Err(inner) => {
            tracing::error!(
                error = %inner,
                status = result.status.as_u16(),
                content_type = %result.content_type,
                "Content interceptor failed"
            );
            Err(Error::ContentInterception {
                message: format!(
                    "Content interception failed for {} response",
                    result.content_type
                ),
                result: Box::new(result),
                inner,
            })
        }
    }
}
