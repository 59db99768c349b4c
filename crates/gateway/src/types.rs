//! Shared value types: the instance descriptor and the typed results returned
//! by the domain operations.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! invariants (an [`Instance`] always holds an absolute `http`/`https` URL) or
//! mirror a fixed response shape.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::{ExtensionId, GatewayError, RepoName};

/// Path of the GraphQL endpoint relative to the instance root.
pub const GRAPHQL_PATH: &str = ".api/graphql";

// ---------------------------------------------------------------------------
// Instance descriptor
// ---------------------------------------------------------------------------

/// A bearer credential sent as `Authorization: token <credential>`.
///
/// `Debug` output is redacted so tokens never reach logs or span fields.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Creates an [`AccessToken`].
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidInstance`] if the value is empty or
    /// holds bytes an HTTP header value cannot carry (control characters
    /// other than tab, or DEL).
    pub fn new(value: impl Into<String>) -> Result<Self, GatewayError> {
        let v = value.into();
        if v.is_empty() {
            return Err(GatewayError::InvalidInstance(
                "access token is empty".to_string(),
            ));
        }
        if !v.bytes().all(|b| b == b'\t' || (b >= 0x20 && b != 0x7f)) {
            return Err(GatewayError::InvalidInstance(
                "access token contains characters not allowed in an HTTP header".to_string(),
            ));
        }
        Ok(Self(v))
    }

    /// Returns the raw credential.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Returns the full `Authorization` header value.
    pub fn authorization_header(&self) -> String {
        format!("token {}", self.0)
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

// ---------------------------------------------------------------------------

/// Identifies which server to query: an endpoint URL plus an optional
/// credential.
///
/// Immutable and supplied by the caller for every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    url: Url,
    access_token: Option<AccessToken>,
}

impl Instance {
    /// Creates an [`Instance`] from a base URL such as
    /// `"https://sourcegraph.example.com"`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidInstance`] if `url` does not parse, is
    /// not an `http`/`https` URL, or carries a query, fragment, or userinfo.
    pub fn new(url: &str, access_token: Option<AccessToken>) -> Result<Self, GatewayError> {
        let parsed = Url::parse(url)
            .map_err(|e| GatewayError::InvalidInstance(format!("{url}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(GatewayError::InvalidInstance(format!(
                "{url}: unsupported scheme '{}'",
                parsed.scheme()
            )));
        }
        // The endpoint is appended to the path; anything after it would swallow it.
        if parsed.query().is_some() || parsed.fragment().is_some() {
            return Err(GatewayError::InvalidInstance(format!(
                "{url}: base URL must not have a query or fragment"
            )));
        }
        if !parsed.username().is_empty() || parsed.password().is_some() {
            return Err(GatewayError::InvalidInstance(format!(
                "{}: credentials belong in the access token, not the URL",
                parsed.host_str().unwrap_or_default()
            )));
        }
        Ok(Self {
            url: parsed,
            access_token,
        })
    }

    /// Returns the base URL without a trailing slash, as written in error
    /// messages.
    pub fn url(&self) -> &str {
        self.url.as_str().trim_end_matches('/')
    }

    /// Returns the credential, if any.
    pub fn access_token(&self) -> Option<&AccessToken> {
        self.access_token.as_ref()
    }

    /// Returns `<url>/.api/graphql`.
    ///
    /// A base URL with a path prefix keeps that prefix.
    pub fn graphql_endpoint(&self) -> String {
        let mut endpoint = self.url.clone();
        if let Ok(mut segments) = endpoint.path_segments_mut() {
            segments.pop_if_empty().extend(GRAPHQL_PATH.split('/'));
        }
        endpoint.into()
    }
}

impl std::fmt::Display for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.url())
    }
}

// ---------------------------------------------------------------------------
// Operation results
// ---------------------------------------------------------------------------

/// A repository reference as embedded in other results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryRef {
    /// The repository's name on the instance.
    pub name: RepoName,
}

/// One entry of `search.results.results`.
///
/// Only file matches carry a repository; other result kinds decode with
/// `repository: None` and serialise back to `{}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Repository containing the matched file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<RepositoryRef>,
}

/// An extension registered in the instance's extension registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extension {
    /// Registry node ID.
    pub id: ExtensionId,
    /// Published manifest; `None` when the extension has no release.
    pub manifest: Option<ExtensionManifest>,
}

/// The published manifest of an [`Extension`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionManifest {
    /// The manifest JSON exactly as published, unparsed.
    pub raw: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_ignores_trailing_slash() {
        let a = Instance::new("https://example.com", None).unwrap();
        let b = Instance::new("https://example.com/", None).unwrap();
        assert_eq!(a.graphql_endpoint(), "https://example.com/.api/graphql");
        assert_eq!(a.graphql_endpoint(), b.graphql_endpoint());
        assert_eq!(b.url(), "https://example.com");
    }

    #[test]
    fn endpoint_keeps_path_prefix() {
        let instance = Instance::new("http://localhost:3080/sg/", None).unwrap();
        assert_eq!(
            instance.graphql_endpoint(),
            "http://localhost:3080/sg/.api/graphql"
        );
    }

    #[test]
    fn invalid_instances_are_rejected() {
        assert!(matches!(
            Instance::new("not a url", None),
            Err(GatewayError::InvalidInstance(_))
        ));
        assert!(matches!(
            Instance::new("ftp://example.com", None),
            Err(GatewayError::InvalidInstance(_))
        ));
    }

    #[test]
    fn query_fragment_and_userinfo_are_rejected() {
        for url in [
            "https://sg.example.com/?x=1",
            "https://sg.example.com/#frag",
            "https://user:pw@sg.example.com",
        ] {
            assert!(
                matches!(Instance::new(url, None), Err(GatewayError::InvalidInstance(_))),
                "{url} should be rejected"
            );
        }
    }

    #[test]
    fn credential_error_does_not_echo_the_password() {
        let err = Instance::new("https://user:pw@sg.example.com", None).unwrap_err();
        assert!(!err.to_string().contains("pw"));
    }

    #[test]
    fn tokens_that_cannot_be_header_values_are_rejected() {
        for token in ["", "a\nb", "a\rb", "a\u{7f}b"] {
            assert!(
                matches!(AccessToken::new(token), Err(GatewayError::InvalidInstance(_))),
                "{token:?} should be rejected"
            );
        }
        assert!(AccessToken::new("tab\tseparated").is_ok());
    }

    #[test]
    fn access_token_is_redacted_in_debug_output() {
        let token = AccessToken::new("s3cret").unwrap();
        let instance = Instance::new("https://example.com", Some(token.clone())).unwrap();
        assert!(!format!("{instance:?}").contains("s3cret"));
        assert_eq!(token.authorization_header(), "token s3cret");
    }

    #[test]
    fn non_file_match_results_round_trip_as_empty_objects() {
        let results: Vec<SearchResult> = serde_json::from_value(serde_json::json!([
            {"repository": {"name": "github.com/a/b"}},
            {}
        ]))
        .unwrap();
        assert_eq!(results[1].repository, None);
        assert_eq!(
            serde_json::to_value(&results).unwrap(),
            serde_json::json!([{"repository": {"name": "github.com/a/b"}}, {}])
        );
    }
}
