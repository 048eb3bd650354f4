//! Authentication strategies for outbound API calls
//!
//! Entries live under `api.auth.<endpoint-key>` in the configuration document:
//!
//! ```yaml
//! api:
//!   auth:
//!     sms:
//!       type: bearer
//!       token_env: BICS_SMS_TOKEN
//!     connect:
//!       type: header
//!       name: X-Api-Key
//!       value: secret
//! ```
//!
//! Endpoints without an entry send no credentials.

use crate::error::ConfigurationError;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Authentication entry for one endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AuthEntry {
    None,
    /// `Authorization: Bearer <token>`
    Bearer {
        #[serde(default)]
        token: Option<String>,
        #[serde(default)]
        token_env: Option<String>,
    },
    /// Arbitrary header such as `X-Api-Key`
    Header {
        name: String,
        #[serde(default)]
        value: Option<String>,
        #[serde(default)]
        value_env: Option<String>,
    },
}

impl AuthEntry {
    /// Resolve the entry into a strategy, reading secrets from the process environment
    pub fn resolve(&self, endpoint: &str) -> Result<Arc<dyn AuthStrategy>, ConfigurationError> {
        self.resolve_with(endpoint, |var| std::env::var(var).ok())
    }

    /// Resolve the entry with a custom variable lookup
    pub fn resolve_with<F>(
        &self,
        endpoint: &str,
        lookup: F,
    ) -> Result<Arc<dyn AuthStrategy>, ConfigurationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let invalid = |reason: String| ConfigurationError::InvalidAuth {
            endpoint: endpoint.to_string(),
            reason,
        };

        match self {
            AuthEntry::None => Ok(Arc::new(NoAuth)),
            AuthEntry::Bearer { token, token_env } => {
                let token = secret(token.as_deref(), token_env.as_deref(), &lookup)
                    .map_err(invalid)?;
                let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
                    .map_err(|e| invalid(format!("invalid bearer token: {}", e)))?;
                value.set_sensitive(true);
                Ok(Arc::new(HeaderAuth {
                    name: AUTHORIZATION,
                    value,
                    scheme: "bearer",
                }))
            }
            AuthEntry::Header {
                name,
                value,
                value_env,
            } => {
                let name = HeaderName::from_bytes(name.as_bytes())
                    .map_err(|e| invalid(format!("invalid header name '{}': {}", name, e)))?;
                let raw = secret(value.as_deref(), value_env.as_deref(), &lookup)
                    .map_err(invalid)?;
                let mut value = HeaderValue::from_str(&raw)
                    .map_err(|e| invalid(format!("invalid header value: {}", e)))?;
                value.set_sensitive(true);
                Ok(Arc::new(HeaderAuth {
                    name,
                    value,
                    scheme: "header",
                }))
            }
        }
    }
}

/// Literal value wins over the environment variable
fn secret<F>(literal: Option<&str>, env: Option<&str>, lookup: &F) -> Result<String, String>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = literal.filter(|v| !v.is_empty()) {
        return Ok(v.to_string());
    }
    match env {
        Some(var) => lookup(var)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| format!("environment variable {} is not set", var)),
        None => Err("neither a value nor an environment variable is configured".to_string()),
    }
}

/// Attaches credentials to an outgoing request
pub trait AuthStrategy: Send + Sync {
    /// Add credential headers
    fn apply(&self, headers: &mut HeaderMap);

    /// Short label for logs (never the secret itself)
    fn scheme(&self) -> &'static str;
}

/// Sends no credentials
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAuth;

impl AuthStrategy for NoAuth {
    fn apply(&self, _headers: &mut HeaderMap) {}

    fn scheme(&self) -> &'static str {
        "none"
    }
}

/// Sets a single fixed header
#[derive(Debug, Clone)]
pub struct HeaderAuth {
    name: HeaderName,
    value: HeaderValue,
    scheme: &'static str,
}

impl AuthStrategy for HeaderAuth {
    fn apply(&self, headers: &mut HeaderMap) {
        headers.insert(self.name.clone(), self.value.clone());
    }

    fn scheme(&self) -> &'static str {
        self.scheme
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_parse_auth_entries() {
        let yaml = r#"
sms:
  type: bearer
  token_env: BICS_SMS_TOKEN
connect:
  type: header
  name: X-Api-Key
  value: abc
cdr:
  type: none
"#;
        let entries: HashMap<String, AuthEntry> = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(
            entries["sms"],
            AuthEntry::Bearer {
                token: None,
                token_env: Some("BICS_SMS_TOKEN".to_string())
            }
        );
        assert_eq!(entries["cdr"], AuthEntry::None);
        assert!(matches!(entries["connect"], AuthEntry::Header { .. }));
    }

    #[test]
    fn test_bearer_from_env_lookup() {
        let entry = AuthEntry::Bearer {
            token: None,
            token_env: Some("TOKEN".to_string()),
        };
        let strategy = entry
            .resolve_with("sms", |var| (var == "TOKEN").then(|| "t0k".to_string()))
            .unwrap();

        let mut headers = HeaderMap::new();
        strategy.apply(&mut headers);
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer t0k");
        assert_eq!(strategy.scheme(), "bearer");
    }

    #[test]
    fn test_header_literal_value() {
        let entry = AuthEntry::Header {
            name: "X-Api-Key".to_string(),
            value: Some("abc".to_string()),
            value_env: None,
        };
        let strategy = entry.resolve_with("connect", |_| None).unwrap();

        let mut headers = HeaderMap::new();
        strategy.apply(&mut headers);
        assert_eq!(headers.get("x-api-key").unwrap(), "abc");
    }

    #[test]
    fn test_missing_env_is_invalid() {
        let entry = AuthEntry::Bearer {
            token: None,
            token_env: Some("UNSET".to_string()),
        };
        let err = entry.resolve_with("sms", |_| None).err().unwrap();
        assert!(matches!(err, ConfigurationError::InvalidAuth { ref endpoint, .. } if endpoint == "sms"));
        assert!(err.to_string().contains("UNSET"));
    }

    #[test]
    fn test_no_auth_adds_nothing() {
        let mut headers = HeaderMap::new();
        NoAuth.apply(&mut headers);
        assert!(headers.is_empty());
    }
}
