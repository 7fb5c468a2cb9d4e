//! Implicit-flow authorization URL construction

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Client-side parameters for an implicit-flow authorization URL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUrlConfig {
    /// OAuth client id
    pub client_id: String,

    /// Provider authorization endpoint
    pub auth_url: String,

    /// Redirect URI back to the host application
    pub redirect_uri: String,

    /// Requested scopes
    #[serde(default)]
    pub scopes: Vec<String>,

    /// Extra query parameters appended to the URL
    #[serde(default)]
    pub extra_auth_params: HashMap<String, String>,
}

/// Build the authorization URL for the implicit flow
///
/// Requests `response_type=token`, so the provider returns the access token
/// in the redirect fragment instead of through a code exchange. All
/// parameter values are percent-encoded.
pub fn build_authorization_url(config: &AuthUrlConfig) -> String {
    let mut url = format!(
        "{}?client_id={}&response_type=token&redirect_uri={}",
        config.auth_url,
        urlencoding::encode(&config.client_id),
        urlencoding::encode(&config.redirect_uri),
    );

    if !config.scopes.is_empty() {
        let scopes = config.scopes.join(" ");
        url.push_str(&format!("&scope={}", urlencoding::encode(&scopes)));
    }

    for (key, value) in &config.extra_auth_params {
        url.push_str(&format!(
            "&{}={}",
            urlencoding::encode(key),
            urlencoding::encode(value)
        ));
    }

    url
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> AuthUrlConfig {
        AuthUrlConfig {
            client_id: "test_client".to_string(),
            auth_url: "https://provider.example.com/oauth/authorize".to_string(),
            redirect_uri: "https://app.example.com/callback".to_string(),
            scopes: vec!["read".to_string(), "write".to_string()],
            extra_auth_params: HashMap::new(),
        }
    }

    #[test]
    fn test_build_authorization_url() {
        let url = build_authorization_url(&create_test_config());

        assert!(url.starts_with("https://provider.example.com/oauth/authorize?"));
        assert!(url.contains("client_id=test_client"));
        assert!(url.contains("response_type=token"));
        assert!(url.contains("redirect_uri=https%3A%2F%2Fapp.example.com%2Fcallback"));
        assert!(url.contains("scope=read%20write"));
    }

    #[test]
    fn test_build_authorization_url_without_scopes() {
        let mut config = create_test_config();
        config.scopes.clear();

        let url = build_authorization_url(&config);
        assert!(!url.contains("scope="));
    }

    #[test]
    fn test_build_authorization_url_extra_params() {
        let mut config = create_test_config();
        config
            .extra_auth_params
            .insert("prompt".to_string(), "consent".to_string());

        let url = build_authorization_url(&config);
        assert!(url.contains("prompt=consent"));
    }
}
