//! # Fetchwright - configurable requests, normalized responses
//!
//! Fetchwright lets you configure a service once (base URL, endpoint template,
//! default params, query, headers, credentials and a cancellation signal) and
//! then issue GET/POST/PUT/DELETE calls that inherit and selectively override
//! those defaults. Every response is classified by its content type and
//! normalized into a [`ResponseResult`], optionally transformed by a content
//! interceptor, and non-2xx statuses become a typed [`Error::Response`].
//!
//! ## Quick Start
//!
//! ```no_run
//! use fetchwright::{Configurator, Dictionary, Endpoint, Settings};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), fetchwright::Error> {
//!     let mut api = Configurator::builder()
//!         .service_url("https://api.example.com/v1/")?
//!         .endpoint(Endpoint::template("users/{id}"))
//!         .build()?;
//!
//!     api.set_bearer_auth("s3cr3t")?;
//!
//!     // GET https://api.example.com/v1/users/123
//!     let user = api.get(Settings::new().param("id", 123)).await?;
//!     println!("User: {:?}", user.content.as_json());
//!
//!     // PUT with a JSON body and an extra query entry
//!     let updated = api
//!         .put(
//!             Settings::new()
//!                 .param("id", 123)
//!                 .query(&Dictionary::new().with("notify", true))
//!                 .body(&json!({"name": "Alice"}))?,
//!         )
//!         .await?;
//!     println!("Updated with status {}", updated.status);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Merge or replace defaults** - `set_params`, `set_query` and `set_headers` merge by default and replace on request
//! - **Endpoint templates** - paths are produced from params by an [`Endpoint`] function
//! - **Content-type normalization** - JSON, XML, text and binary bodies land in one tagged [`Content`]
//! - **Content interceptors** - post-process successful payloads while keeping the raw payload
//! - **Typed errors** - failed responses carry the parsed body for inspection
//! - **Cancellation** - per-call or default [`CancellationToken`](tokio_util::sync::CancellationToken) signals
//! - **Pluggable transport** - [`ReqwestTransport`] by default, or any [`Transport`]
//! - **Automatic logging** - Structured logging with `tracing`
//!
//! ## Content Interceptors
//!
//! ```no_run
//! use fetchwright::{Configurator, Content, Endpoint, InterceptorError, ResponseResult, Settings};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), fetchwright::Error> {
//! let api = Configurator::builder()
//!     .service_url("https://api.example.com/")?
//!     .endpoint(Endpoint::fixed("envelope"))
//!     .content_interceptor(Arc::new(|result: &ResponseResult| {
//!         result
//!             .raw_content
//!             .as_json()
//!             .and_then(|body| body.get("data"))
//!             .cloned()
//!             .map(Content::Json)
//!             .ok_or_else(|| InterceptorError::new("response has no `data` field"))
//!     }))
//!     .build()?;
//!
//! let result = api.get(Settings::new()).await?;
//! println!("Unwrapped: {:?}, original: {:?}", result.content, result.raw_content);
//! # Ok(())
//! # }
//! ```

mod client;
mod dictionary;
mod endpoint;
mod error;
pub mod normalize;
mod response;
mod settings;
pub mod transport;
mod xml;

pub use client::{Configurator, ConfiguratorBuilder, DEFAULT_ORIGIN};
pub use dictionary::{value_to_string, Dictionary};
pub use endpoint::Endpoint;
pub use error::{Error, InterceptorError, Result};
pub use normalize::{classify, ContentInterceptor};
pub use response::{Content, ContentType, ResponseHead, ResponseResult};
pub use settings::{Credentials, Settings};
pub use transport::{RawResponse, ReqwestTransport, Transport, TransportRequest};
pub use xml::{XmlDocument, XmlElement, XmlParseError};
