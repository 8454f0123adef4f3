use crate::config::snapshot_url;
use crate::model::DaemonRecord;
use crate::store::FleetStore;
use reqwest::{Client, Url};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

pub const LOADING_MESSAGE: &str = "Loading data...";
pub const FALLBACK_ERROR_MESSAGE: &str = "Failed loading data";

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("HTTP {0}")]
    Status(u16),
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("malformed snapshot: {0}")]
    Malformed(String),
}

impl SnapshotError {
    /// Text shown to the operator.
    pub fn user_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            FALLBACK_ERROR_MESSAGE.to_string()
        } else {
            message
        }
    }
}

/// Accepts either a plain array of records or an object whose values are
/// arrays of records (flattened in key order).
pub fn parse_snapshot(body: Value) -> Result<Vec<DaemonRecord>, SnapshotError> {
    let items: Vec<Value> = match body {
        Value::Array(items) => items,
        Value::Object(groups) => {
            let mut items = Vec::new();
            for (group, value) in groups {
                match value {
                    Value::Array(nested) => items.extend(nested),
                    Value::Object(_) => items.push(value),
                    other => {
                        return Err(SnapshotError::Malformed(format!(
                            "group '{group}' is not a list: {other}"
                        )))
                    }
                }
            }
            items
        }
        other => {
            return Err(SnapshotError::Malformed(format!(
                "expected array or object, got {}",
                json_kind(&other)
            )))
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| {
            serde_json::from_value::<DaemonRecord>(item)
                .map_err(|err| SnapshotError::Malformed(format!("record {idx}: {err}")))
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// HTTP client for the snapshot fetch. No request timeout is set, so a slow
/// backend is waited on until it answers or the load is torn down.
pub fn snapshot_client() -> Result<Client, SnapshotError> {
    Ok(Client::builder().build()?)
}

/// Single GET against `<api_base>/api/show`. No retries.
pub async fn fetch_snapshot(client: &Client, api_base: &Url) -> Result<Vec<DaemonRecord>, SnapshotError> {
    let url = snapshot_url(api_base);
    let response = client.get(&url).send().await?;
    if !response.status().is_success() {
        let status = response.status().as_u16();
        warn!(%url, status, "snapshot request failed");
        return Err(SnapshotError::Status(status));
    }
    let body: Value = response
        .json()
        .await
        .map_err(|err| SnapshotError::Malformed(err.to_string()))?;
    let records = parse_snapshot(body)?;
    info!(%url, count = records.len(), "snapshot fetched");
    Ok(records)
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed(String),
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            LoadState::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// Shared flag that tells an in-flight fetch whether its result is still
/// wanted.
#[derive(Debug, Clone)]
pub struct Liveness(Arc<AtomicBool>);

impl Liveness {
    fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn is_live(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    fn revoke(&self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Drives `Idle -> Loading -> Ready | Failed`. Exactly one terminal transition
/// happens per `begin`; results arriving after teardown are dropped.
#[derive(Debug)]
pub struct SnapshotLoader {
    state: LoadState,
    liveness: Liveness,
}

impl Default for SnapshotLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotLoader {
    pub fn new() -> Self {
        Self {
            state: LoadState::Idle,
            liveness: Liveness::new(),
        }
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn begin(&mut self) -> Liveness {
        self.state = LoadState::Loading;
        self.liveness.clone()
    }

    /// Applies a fetch result. Returns false when the result was discarded.
    pub fn finish(
        &mut self,
        result: Result<Vec<DaemonRecord>, SnapshotError>,
        store: &mut FleetStore,
    ) -> bool {
        if !self.liveness.is_live() || !self.state.is_loading() {
            return false;
        }
        match result {
            Ok(records) => {
                store.load(records);
                self.state = LoadState::Ready;
            }
            Err(err) => {
                warn!(error = %err, "snapshot load failed");
                self.state = LoadState::Failed(err.user_message());
            }
        }
        true
    }

    pub fn teardown(&mut self) {
        self.liveness.revoke();
    }
}
