//! Directory client for the backend user API.

use super::UserDirectory;
use crate::config::DirectoryConfig;
use crate::error::DirectoryError;
use crate::snapshot::UserRecord;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

#[derive(Serialize)]
struct LookupPayload<'a> {
    ids: &'a [String],
}

pub struct HttpDirectory {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpDirectory {
    /// `Ok(None)` when no endpoint is configured. A client that cannot be built is an error,
    /// never a silent fallback to the static directory.
    pub fn new(config: &DirectoryConfig) -> Result<Option<Self>, DirectoryError> {
        let Some(endpoint) = config.endpoint.as_deref() else {
            return Ok(None);
        };
        let endpoint = endpoint.trim_end_matches('/');
        if endpoint.is_empty() {
            return Err(DirectoryError::Unavailable("empty directory endpoint".to_string()));
        }
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.timeout().min(Duration::from_secs(5)))
            .build()?;
        Ok(Some(Self {
            client,
            base_url: endpoint.to_string(),
        }))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl UserDirectory for HttpDirectory {
    fn lookup(&self, actor_ids: &[String]) -> Result<Vec<UserRecord>, DirectoryError> {
        let url = format!("{}/api/v1/users/lookup", self.base_url);
        let res = self
            .client
            .post(&url)
            .json(&LookupPayload { ids: actor_ids })
            .send()?;
        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().unwrap_or_default();
            return Err(DirectoryError::Status { status, body });
        }
        let users: Vec<UserRecord> = res.json()?;
        debug!(requested = actor_ids.len(), returned = users.len(), "directory lookup");
        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_endpoint() {
        assert!(matches!(HttpDirectory::new(&DirectoryConfig::default()), Ok(None)));
    }

    #[test]
    fn blank_endpoint_is_an_error() {
        let config = DirectoryConfig {
            endpoint: Some("/".to_string()),
            ..DirectoryConfig::default()
        };
        assert!(matches!(HttpDirectory::new(&config), Err(DirectoryError::Unavailable(_))));
    }

    #[test]
    fn trims_trailing_slash() {
        let config = DirectoryConfig {
            endpoint: Some("http://directory.local:8080/".to_string()),
            ..DirectoryConfig::default()
        };
        let dir = HttpDirectory::new(&config).unwrap().unwrap();
        assert_eq!(dir.base_url(), "http://directory.local:8080");
    }

    #[test]
    fn unreachable_endpoint_is_a_transport_error() {
        let config = DirectoryConfig {
            endpoint: Some("http://127.0.0.1:9".to_string()),
            timeout_ms: 200,
            users_path: None,
        };
        let dir = HttpDirectory::new(&config).unwrap().unwrap();
        let err = dir.lookup(&["a".to_string()]).unwrap_err();
        assert!(matches!(err, DirectoryError::Transport(_)));
    }
}
