//! Endpoint functions that turn a parameter set into a URL path.

use crate::dictionary::{value_to_string, Dictionary};
use regex::{Captures, Regex};
use std::fmt;
use std::sync::{Arc, OnceLock};

/// A pure function mapping request params to a path, resolved against the
/// service URL.
///
/// The returned path is not validated; it is joined onto the service URL the
/// same way a browser resolves a relative link.
///
/// # Examples
///
/// ```
/// use fetchwright::{Dictionary, Endpoint};
///
/// let endpoint = Endpoint::template("users/{id}/posts");
/// let params = Dictionary::new().with("id", 42);
///
/// assert_eq!(endpoint.resolve(&params), "users/42/posts");
/// ```
#[derive(Clone)]
pub struct Endpoint(Arc<dyn Fn(&Dictionary) -> String + Send + Sync>);

impl Endpoint {
    /// Wraps an arbitrary path-building function.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Dictionary) -> String + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// An endpoint that always yields the same path.
    pub fn fixed(path: impl Into<String>) -> Self {
        let path = path.into();
        Self::new(move |_| path.clone())
    }

    /// An endpoint built from a `{name}` placeholder template.
    ///
    /// Each placeholder is replaced by the string form of the matching param.
    /// Placeholders with no matching param are left as written.
    pub fn template(template: impl Into<String>) -> Self {
        let template = template.into();
        Self::new(move |params| {
            placeholder_regex()
                .replace_all(&template, |caps: &Captures<'_>| match params.get(&caps[1]) {
                    Some(value) => value_to_string(value),
                    None => caps[0].to_string(),
                })
                .into_owned()
        })
    }

    /// Produces the path for the given params.
    pub fn resolve(&self, params: &Dictionary) -> String {
        (self.0)(params)
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Endpoint(<fn>)")
    }
}

fn placeholder_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("Invalid placeholder regex")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fixed_ignores_params() {
        let endpoint = Endpoint::fixed("/health");
        let params = Dictionary::new().with("id", 1);
        assert_eq!(endpoint.resolve(&params), "/health");
    }

    #[test]
    fn test_template_substitutes_params() {
        let endpoint = Endpoint::template("/orgs/{org}/repos/{repo}");
        let params = Dictionary::new()
            .with("org", "rust-lang")
            .with("repo", "cargo");
        assert_eq!(endpoint.resolve(&params), "/orgs/rust-lang/repos/cargo");
    }

    #[test]
    fn test_template_leaves_unknown_placeholders() {
        let endpoint = Endpoint::template("/items/{id}/{missing}");
        let params = Dictionary::new().with("id", json!(3));
        assert_eq!(endpoint.resolve(&params), "/items/3/{missing}");
    }

    #[test]
    fn test_closure_endpoint() {
        let endpoint = Endpoint::new(|params| match params.get("id") {
            Some(id) => format!("/users/{}", value_to_string(id)),
            None => "/users".to_string(),
        });
        assert_eq!(endpoint.resolve(&Dictionary::new()), "/users");
        assert_eq!(
            endpoint.resolve(&Dictionary::new().with("id", "me")),
            "/users/me"
        );
    }
}
