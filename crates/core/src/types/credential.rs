//! Shopify store credentials.
//!
//! Built once at startup and shared read-only by every tool invocation.

use core::fmt;

use secrecy::{ExposeSecret, SecretString};

/// Errors that can occur when building [`StoreCredentials`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreCredentialsError {
    /// The store domain is empty or malformed.
    #[error("invalid store domain '{0}': expected a host such as your-store.myshopify.com")]
    InvalidDomain(String),
    /// The access token is empty.
    #[error("access token cannot be empty")]
    EmptyAccessToken,
    /// The API version is not `YYYY-MM` or `unstable`.
    #[error("invalid API version '{0}': expected YYYY-MM (e.g. 2025-07) or 'unstable'")]
    InvalidApiVersion(String),
}

/// Credentials for one Shopify store.
///
/// ## Constraints
///
/// - `domain` is a bare host; a leading `https://` and trailing `/` are stripped
/// - `access_token` is non-empty and never printed by `Debug`
/// - `api_version` is `YYYY-MM` or `unstable`
///
/// ```
/// use shopify_admin_mcp_core::StoreCredentials;
///
/// let creds = StoreCredentials::new(
///     "https://demo.myshopify.com/",
///     "shpat_0123456789abcdef",
///     "2025-07",
/// )
/// .expect("valid credentials");
/// assert_eq!(creds.domain(), "demo.myshopify.com");
/// assert!(!format!("{creds:?}").contains("shpat_"));
/// ```
#[derive(Clone)]
pub struct StoreCredentials {
    domain: String,
    access_token: SecretString,
    api_version: String,
}

impl StoreCredentials {
    /// Validate and build credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if the domain, token or API version is malformed.
    pub fn new(
        domain: &str,
        access_token: impl Into<SecretString>,
        api_version: &str,
    ) -> Result<Self, StoreCredentialsError> {
        let domain = normalize_domain(domain)?;

        let access_token = access_token.into();
        if access_token.expose_secret().trim().is_empty() {
            return Err(StoreCredentialsError::EmptyAccessToken);
        }

        let api_version = api_version.trim();
        if !is_valid_api_version(api_version) {
            return Err(StoreCredentialsError::InvalidApiVersion(
                api_version.to_string(),
            ));
        }

        Ok(Self {
            domain,
            access_token,
            api_version: api_version.to_string(),
        })
    }

    /// The store host, e.g. `your-store.myshopify.com`.
    #[must_use]
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// The Admin API access token.
    #[must_use]
    pub const fn access_token(&self) -> &SecretString {
        &self.access_token
    }

    /// The Admin API version, e.g. `2025-07`.
    #[must_use]
    pub fn api_version(&self) -> &str {
        &self.api_version
    }
}

impl fmt::Debug for StoreCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreCredentials")
            .field("domain", &self.domain)
            .field("access_token", &"[REDACTED]")
            .field("api_version", &self.api_version)
            .finish()
    }
}

fn normalize_domain(raw: &str) -> Result<String, StoreCredentialsError> {
    let lowered = raw.trim().to_ascii_lowercase();
    let host = lowered
        .strip_prefix("https://")
        .or_else(|| lowered.strip_prefix("http://"))
        .unwrap_or(&lowered)
        .trim_end_matches('/');

    let valid = !host.is_empty()
        && host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == ':');
    if valid {
        Ok(host.to_string())
    } else {
        Err(StoreCredentialsError::InvalidDomain(raw.to_string()))
    }
}

fn is_valid_api_version(version: &str) -> bool {
    if version == "unstable" {
        return true;
    }
    let bytes = version.as_bytes();
    bytes.len() == 7
        && bytes.iter().enumerate().all(|(i, b)| {
            if i == 4 {
                *b == b'-'
            } else {
                b.is_ascii_digit()
            }
        })
}
