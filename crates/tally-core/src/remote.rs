//! Remote store access: the HTTP contract behind a trait seam.
//!
//! The engine talks to a [`RemoteStore`] so tests can substitute a fake.
//! [`HttpRemote`] is the production implementation; per dataset it speaks
//!
//! - `GET    /{dataset}/health`: connectivity probe
//! - `GET    /{dataset}`:        ordered record array
//! - `POST   /{dataset}`:        create (row datasets) or whole-collection
//!   replace (snapshot datasets)
//! - `PUT    /{dataset}/{id}`:   full replace of one record
//! - `DELETE /{dataset}/{id}`:   delete one record

use reqwest::Client;
use serde_json::Value;

use tally_domain::RecordId;

use crate::config::RemoteConfig;
use crate::error::RemoteError;

/// One dataset's view of the remote store.
///
/// Row operations default to [`RemoteError::Unsupported`]; snapshot datasets
/// (no per-row granularity) leave them that way.
pub trait RemoteStore {
    /// Dataset name, for diagnostics.
    fn dataset(&self) -> &str;

    /// Whether this dataset has per-row remote routes. When false, row
    /// mutations stay local until a bulk submit.
    fn supports_row_ops(&self) -> bool {
        true
    }

    /// Bounded, side-effect-free reachability check. Never errors: any
    /// transport failure or non-success status means unreachable.
    fn health(&self) -> impl std::future::Future<Output = bool>;

    /// The full ordered collection, in wire form.
    fn fetch_all(&self) -> impl std::future::Future<Output = Result<Vec<Value>, RemoteError>>;

    /// Create one record; the body omits identity, the response carries it.
    fn create(
        &self,
        _body: Value,
    ) -> impl std::future::Future<Output = Result<Value, RemoteError>> {
        async { Err(RemoteError::Unsupported("create")) }
    }

    /// Fully replace one record; the body omits identity.
    fn replace(
        &self,
        _id: &RecordId,
        _body: Value,
    ) -> impl std::future::Future<Output = Result<(), RemoteError>> {
        async { Err(RemoteError::Unsupported("update")) }
    }

    /// Delete one record.
    fn delete(
        &self,
        _id: &RecordId,
    ) -> impl std::future::Future<Output = Result<(), RemoteError>> {
        async { Err(RemoteError::Unsupported("delete")) }
    }

    /// Replace the whole collection.
    fn replace_all(
        &self,
        _body: Value,
    ) -> impl std::future::Future<Output = Result<(), RemoteError>> {
        async { Err(RemoteError::Unsupported("submit")) }
    }
}

/// HTTP implementation of the remote contract for one dataset.
pub struct HttpRemote {
    client: Client,
    base_url: String,
    dataset: String,
    probe_timeout: std::time::Duration,
    row_ops: bool,
}

impl HttpRemote {
    /// A dataset with per-row routes (projects, subscriptions).
    pub fn per_row(config: &RemoteConfig, dataset: &str) -> Self {
        Self::new(config, dataset, true)
    }

    /// A snapshot dataset: `GET` and whole-collection `POST` only.
    pub fn snapshot(config: &RemoteConfig, dataset: &str) -> Self {
        Self::new(config, dataset, false)
    }

    fn new(config: &RemoteConfig, dataset: &str, row_ops: bool) -> Self {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .expect("Failed to create HTTP client");
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            dataset: dataset.to_string(),
            probe_timeout: config.probe_timeout(),
            row_ops,
        }
    }

    fn collection_url(&self) -> String {
        format!("{}/{}", self.base_url, self.dataset)
    }

    fn record_url(&self, id: &RecordId) -> String {
        format!("{}/{}/{}", self.base_url, self.dataset, id)
    }

    fn check_status(response: &reqwest::Response) -> Result<(), RemoteError> {
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(RemoteError::Status {
                status: status.as_u16(),
            })
        }
    }
}

impl RemoteStore for HttpRemote {
    fn dataset(&self) -> &str {
        &self.dataset
    }

    fn supports_row_ops(&self) -> bool {
        self.row_ops
    }

    async fn health(&self) -> bool {
        let url = format!("{}/health", self.collection_url());
        let reachable = match self
            .client
            .get(&url)
            .timeout(self.probe_timeout)
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        };
        tracing::debug!(dataset = %self.dataset, reachable, "connectivity probe");
        reachable
    }

    async fn fetch_all(&self) -> Result<Vec<Value>, RemoteError> {
        let response = self
            .client
            .get(self.collection_url())
            .send()
            .await
            .map_err(|e| RemoteError::Transport(e.to_string()))?;
        Self::check_status(&response)?;
        response
            .json::<Vec<Value>>()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))
    }

    async fn create(&self, body: Value) -> Result<Value, RemoteError> {
        if !self.row_ops {
            return Err(RemoteError::Unsupported("create"));
        }
        let response = self
            .client
            .post(self.collection_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| RemoteError::Transport(e.to_string()))?;
        Self::check_status(&response)?;
        response
            .json::<Value>()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))
    }

    async fn replace(&self, id: &RecordId, body: Value) -> Result<(), RemoteError> {
        if !self.row_ops {
            return Err(RemoteError::Unsupported("update"));
        }
        let response = self
            .client
            .put(self.record_url(id))
            .json(&body)
            .send()
            .await
            .map_err(|e| RemoteError::Transport(e.to_string()))?;
        Self::check_status(&response)
    }

    async fn delete(&self, id: &RecordId) -> Result<(), RemoteError> {
        if !self.row_ops {
            return Err(RemoteError::Unsupported("delete"));
        }
        let response = self
            .client
            .delete(self.record_url(id))
            .send()
            .await
            .map_err(|e| RemoteError::Transport(e.to_string()))?;
        Self::check_status(&response)
    }

    async fn replace_all(&self, body: Value) -> Result<(), RemoteError> {
        let response = self
            .client
            .post(self.collection_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| RemoteError::Transport(e.to_string()))?;
        Self::check_status(&response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_follow_the_contract() {
        let config = RemoteConfig {
            base_url: "http://localhost:3000/".to_string(),
            ..RemoteConfig::default()
        };
        let remote = HttpRemote::per_row(&config, "projects");
        assert_eq!(remote.collection_url(), "http://localhost:3000/projects");
        assert_eq!(
            remote.record_url(&RecordId::from("7")),
            "http://localhost:3000/projects/7"
        );
    }

    #[test]
    fn snapshot_remotes_refuse_row_ops() {
        let remote = HttpRemote::snapshot(&RemoteConfig::default(), "budget");
        assert!(!remote.supports_row_ops());
    }
}
