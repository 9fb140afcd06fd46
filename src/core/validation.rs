// Validation of user-supplied configuration values.
// The push endpoint URL and key end up in an outbound request path, so both
// are checked before the monitoring loop starts.

use url::Url;

use crate::error::{AgentError, Result};

/// Maximum URL length accepted for the push endpoint
const MAX_URL_LENGTH: usize = 2048;

/// Maximum length of the push key
const MAX_API_KEY_LENGTH: usize = 256;

/// Validates the base URL of the push endpoint.
///
/// Checks:
/// - not empty and within length limits
/// - parses as a URL
/// - http or https scheme
/// - has a hostname
/// - carries no query string or fragment (the key and parameters are appended)
pub fn validate_api_url(url_str: &str) -> Result<Url> {
    let trimmed = url_str.trim();

    if trimmed.is_empty() {
        return Err(AgentError::config("api_url cannot be empty"));
    }
    if trimmed.len() > MAX_URL_LENGTH {
        return Err(AgentError::config(format!(
            "api_url is too long ({} characters, max {})",
            trimmed.len(),
            MAX_URL_LENGTH
        )));
    }

    let url = Url::parse(trimmed)
        .map_err(|e| AgentError::config(format!("api_url is not a valid URL: {}", e)))?;

    let scheme = url.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(AgentError::config(format!(
            "api_url must use http or https protocol, got: {}",
            scheme
        )));
    }

    if url.host_str().is_none() {
        return Err(AgentError::config("api_url has no hostname"));
    }

    if url.query().is_some() || url.fragment().is_some() {
        return Err(AgentError::config(
            "api_url must not contain a query string or fragment",
        ));
    }

    Ok(url)
}

/// Validates the push key, which becomes the last path segment.
pub fn validate_api_key(key: &str) -> Result<()> {
    let trimmed = key.trim();

    if trimmed.is_empty() {
        return Err(AgentError::config("api_key cannot be empty"));
    }
    if trimmed.len() > MAX_API_KEY_LENGTH {
        return Err(AgentError::config(format!(
            "api_key is too long ({} characters, max {})",
            trimmed.len(),
            MAX_API_KEY_LENGTH
        )));
    }
    if trimmed.contains(&['/', '?', '#', '\0'][..]) || trimmed.chars().any(char::is_whitespace) {
        return Err(AgentError::config(
            "api_key contains characters that are not allowed in a URL path segment",
        ));
    }

    Ok(())
}

/// Validates a percentage threshold (0-100 inclusive).
pub fn validate_percent(name: &str, value: f64) -> Result<()> {
    if !(0.0..=100.0).contains(&value) {
        return Err(AgentError::config(format!(
            "{} must be between 0 and 100, got {}",
            name, value
        )));
    }
    Ok(())
}
