//! Endpoint security - keeping API keys away from first-party endpoints.
//!
//! Embedding this engine in an untrusted execution context (a desktop
//! bundle, a kiosk, an end-user script) with a raw API key and a default
//! endpoint silently hands that key to whoever controls the machine. The
//! checker classifies the configured chat-model endpoint and applies the
//! configured enforcement before any network call is made.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::foundation::{DomainError, ErrorCode};

/// Hostnames of well-known first-party chat-model APIs.
pub const DANGEROUS_ENDPOINTS: [&str; 2] = ["api.openai.com", "api.anthropic.com"];

/// How a dangerous endpoint classification is enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointSecurityMode {
    /// Log only.
    #[default]
    Disabled,
    /// Emit a non-fatal warning naming the hostname.
    Warn,
    /// Fail construction with a configuration error.
    Strict,
}

/// Checks the configured base URL under the given enforcement mode.
///
/// Classification:
/// - no configured URL means the client will talk to its default
///   first-party endpoint, so it is dangerous;
/// - a relative URL (unparseable as absolute) has no hostname to leak a
///   key to and is safe;
/// - an absolute URL is dangerous exactly when its hostname matches the
///   denylist.
///
/// # Errors
///
/// `DangerousEndpoint` in strict mode only.
pub fn check_endpoint(
    base_url: Option<&str>,
    mode: EndpointSecurityMode,
) -> Result<(), DomainError> {
    let Some(base_url) = base_url else {
        return on_dangerous(mode, "No explicit endpoint configured");
    };

    let hostname = match Url::parse(base_url) {
        Ok(parsed) => parsed.host_str().map(str::to_string),
        // Relative URL, treated as safe.
        Err(url::ParseError::RelativeUrlWithoutBase) => return Ok(()),
        Err(_) => None,
    };

    let Some(hostname) = hostname else {
        return Ok(());
    };

    for endpoint in DANGEROUS_ENDPOINTS {
        if hostname == endpoint {
            return on_dangerous(mode, &format!("Detected official API endpoint: {}", endpoint));
        }
    }

    tracing::info!(hostname = %hostname, "safe endpoint");
    Ok(())
}

fn on_dangerous(mode: EndpointSecurityMode, message: &str) -> Result<(), DomainError> {
    match mode {
        EndpointSecurityMode::Disabled => {
            tracing::debug!("endpoint: {}", message);
            Ok(())
        }
        EndpointSecurityMode::Warn => {
            tracing::warn!("{}. Your API key may be exposed to end users.", message);
            Ok(())
        }
        EndpointSecurityMode::Strict => Err(DomainError::new(
            ErrorCode::DangerousEndpoint,
            format!(
                "{}. This may expose your API key to end users. Use a backend proxy instead.",
                message
            ),
        )),
    }
}
