//! Access tokens produced by the external OAuth flow.
//!
//! The engine never exchanges or refreshes tokens itself. It reads the
//! authorized-user JSON file left by the login tool and uses its access token
//! as a bearer credential.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{ProviderError, ProviderResult};

/// A bearer token read from an authorized-user file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AccessToken {
    /// The bearer token. Older files name this field `access_token`.
    #[serde(alias = "access_token")]
    pub token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expiry: Option<DateTime<Utc>>,
    #[serde(default)]
    pub scopes: Vec<String>,
}

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            refresh_token: None,
            expiry: None,
            scopes: Vec::new(),
        }
    }

    /// Loads the token stored at `path`.
    ///
    /// A missing or malformed file is a configuration error: the stream cannot
    /// run until the user logs in again.
    pub fn load(path: impl AsRef<Path>) -> ProviderResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ProviderError::configuration(format!(
                "failed to read token file {}: {}",
                path.display(),
                e
            ))
            .with_source(e)
        })?;

        let token = Self::from_json(&content).map_err(|e| {
            ProviderError::configuration(format!(
                "failed to parse token file {}: {}",
                path.display(),
                e.message()
            ))
        })?;

        debug!(path = %path.display(), "loaded access token");
        Ok(token)
    }

    pub fn from_json(json: &str) -> ProviderResult<Self> {
        let token: Self = serde_json::from_str(json)
            .map_err(|e| ProviderError::configuration(format!("invalid token JSON: {}", e)))?;
        if token.token.trim().is_empty() {
            return Err(ProviderError::configuration("token is empty"));
        }
        Ok(token)
    }

    /// Whether the token's recorded expiry is at or before `now`.
    ///
    /// Tokens without an expiry are assumed valid.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiry.is_some_and(|expiry| expiry <= now)
    }

    /// Logs a warning when the token looks stale. The API has the final word.
    pub fn warn_if_expired(&self, path: &Path, now: DateTime<Utc>) {
        if self.is_expired_at(now) {
            warn!(
                path = %path.display(),
                refreshable = self.refresh_token.is_some(),
                "access token has expired, requests will likely be rejected"
            );
        }
    }
}

/// Where a stream's token lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenFile {
    path: PathBuf,
}

impl TokenFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> ProviderResult<AccessToken> {
        AccessToken::load(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderErrorCode;
    use chrono::TimeZone;
    use std::io::Write;

    #[test]
    fn parses_authorized_user_file() {
        let json = r#"{
            "token": "ya29.abc",
            "refresh_token": "1//xyz",
            "token_uri": "https://oauth2.googleapis.com/token",
            "client_id": "id.apps.googleusercontent.com",
            "scopes": ["https://www.googleapis.com/auth/contacts.readonly"],
            "expiry": "2025-06-01T10:00:00Z"
        }"#;

        let token = AccessToken::from_json(json).unwrap();
        assert_eq!(token.token, "ya29.abc");
        assert_eq!(token.refresh_token.as_deref(), Some("1//xyz"));
        assert_eq!(token.scopes.len(), 1);

        let before = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();
        let after = Utc.with_ymd_and_hms(2025, 6, 1, 11, 0, 0).unwrap();
        assert!(!token.is_expired_at(before));
        assert!(token.is_expired_at(after));
    }

    #[test]
    fn accepts_access_token_alias() {
        let token = AccessToken::from_json(r#"{"access_token": "abc"}"#).unwrap();
        assert_eq!(token, AccessToken::new("abc"));
        assert!(!token.is_expired_at(Utc::now()));
    }

    #[test]
    fn empty_token_is_rejected() {
        let err = AccessToken::from_json(r#"{"token": "  "}"#).unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::Configuration);
    }

    #[test]
    fn missing_file_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = TokenFile::new(dir.path().join("absent.json")).load().unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::Configuration);
        assert!(err.message().contains("absent.json"));
    }

    #[test]
    fn loads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"token": "from-disk"}}"#).unwrap();

        let token = TokenFile::new(file.path()).load().unwrap();
        assert_eq!(token.token, "from-disk");
    }
}
