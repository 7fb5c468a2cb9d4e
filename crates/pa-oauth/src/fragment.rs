//! Redirect fragment extraction and implicit-grant parsing
//!
//! The flow manager delivers the raw fragment; turning it into a structured
//! token is the caller's call. [`parse_fragment`] is the opt-in helper for
//! the common implicit-grant shape.

use pa_types::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Extract the fragment from a location string
///
/// Returns the substring after the first `#`, without the `#` itself, or an
/// empty string when the location carries no fragment.
pub fn extract_fragment(location: &str) -> &str {
    location.split_once('#').map(|(_, f)| f).unwrap_or("")
}

/// Access token delivered through an implicit-grant redirect fragment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImplicitGrant {
    /// Access token
    pub access_token: String,

    /// Token type (usually "bearer")
    #[serde(default)]
    pub token_type: Option<String>,

    /// Lifetime in seconds
    #[serde(default)]
    pub expires_in: Option<i64>,

    /// Granted scope
    #[serde(default)]
    pub scope: Option<String>,

    /// Opaque state echoed back by the provider
    #[serde(default)]
    pub state: Option<String>,
}

/// Parse an implicit-grant redirect fragment
///
/// Expects percent-encoded `key=value` pairs separated by `&`, without the
/// leading `#`. Unknown keys are ignored. Fails when `access_token` is
/// missing or `expires_in` is not a number. Validating `state` against the
/// value sent out stays the caller's job.
pub fn parse_fragment(fragment: &str) -> AppResult<ImplicitGrant> {
    let mut access_token = None;
    let mut token_type = None;
    let mut expires_in = None;
    let mut scope = None;
    let mut state = None;

    for pair in fragment.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let key = urlencoding::decode(key)
            .map_err(|e| AppError::Fragment(format!("Invalid key encoding: {}", e)))?;
        let value = urlencoding::decode(value)
            .map_err(|e| AppError::Fragment(format!("Invalid value encoding: {}", e)))?
            .into_owned();

        match key.as_ref() {
            "access_token" => access_token = Some(value),
            "token_type" => token_type = Some(value),
            "expires_in" => {
                let secs = value
                    .parse::<i64>()
                    .map_err(|_| AppError::Fragment(format!("Invalid expires_in: {}", value)))?;
                expires_in = Some(secs);
            }
            "scope" => scope = Some(value),
            "state" => state = Some(value),
            _ => {}
        }
    }

    let access_token =
        access_token.ok_or_else(|| AppError::Fragment("Missing access_token".to_string()))?;

    Ok(ImplicitGrant {
        access_token,
        token_type,
        expires_in,
        scope,
        state,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_fragment() {
        assert_eq!(
            extract_fragment("https://app.example.com/callback#access_token=abc"),
            "access_token=abc"
        );
        assert_eq!(extract_fragment("https://app.example.com/callback"), "");
        assert_eq!(extract_fragment("https://app.example.com/callback#"), "");
    }

    #[test]
    fn test_extract_fragment_splits_on_first_hash() {
        assert_eq!(
            extract_fragment("https://app.example.com/cb#state=a%23b&access_token=t"),
            "state=a%23b&access_token=t"
        );
    }

    #[test]
    fn test_parse_full_fragment() {
        let grant =
            parse_fragment("access_token=abc&token_type=bearer&expires_in=3600&state=xyz")
                .unwrap();

        assert_eq!(grant.access_token, "abc");
        assert_eq!(grant.token_type.as_deref(), Some("bearer"));
        assert_eq!(grant.expires_in, Some(3600));
        assert_eq!(grant.state.as_deref(), Some("xyz"));
        assert!(grant.scope.is_none());
    }

    #[test]
    fn test_parse_decodes_percent_encoding() {
        let grant = parse_fragment("access_token=a%2Fb%3Dc&scope=read%20write").unwrap();
        assert_eq!(grant.access_token, "a/b=c");
        assert_eq!(grant.scope.as_deref(), Some("read write"));
    }

    #[test]
    fn test_parse_ignores_unknown_keys() {
        let grant = parse_fragment("access_token=abc&provider_hint=google").unwrap();
        assert_eq!(grant.access_token, "abc");
    }

    #[test]
    fn test_parse_requires_access_token() {
        let err = parse_fragment("token_type=bearer").unwrap_err();
        assert!(matches!(err, AppError::Fragment(_)));
    }

    #[test]
    fn test_parse_rejects_bad_expires_in() {
        let err = parse_fragment("access_token=abc&expires_in=soon").unwrap_err();
        assert!(matches!(err, AppError::Fragment(_)));
    }
}
