use crate::alerts::NotificationCenter;
use crate::model::{DaemonId, DaemonRecord, DaemonStatus};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstanceInputError {
    #[error("instance count is empty")]
    Empty,
    #[error("instance count is not a number: {0}")]
    NotANumber(String),
    #[error("instance count cannot be negative: {0}")]
    Negative(String),
}

/// Parses operator input as a non-negative integer instance count.
pub fn parse_instance_input(raw: &str) -> Result<u64, InstanceInputError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(InstanceInputError::Empty);
    }
    if trimmed.starts_with('-') {
        return match trimmed[1..].trim().parse::<f64>() {
            Ok(value) if value == 0.0 => Ok(0),
            Ok(_) => Err(InstanceInputError::Negative(trimmed.to_string())),
            Err(_) => Err(InstanceInputError::NotANumber(trimmed.to_string())),
        };
    }
    let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);
    digits
        .parse::<u64>()
        .map_err(|_| InstanceInputError::NotANumber(trimmed.to_string()))
}

/// Operator-typed instance counts that have not been applied yet, one slot
/// per daemon.
#[derive(Debug, Default, Clone)]
pub struct PendingEdits {
    slots: HashMap<DaemonId, String>,
}

impl PendingEdits {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, daemon_id: &DaemonId, raw: impl Into<String>) {
        self.slots.insert(daemon_id.clone(), raw.into());
    }

    pub fn get(&self, daemon_id: &DaemonId) -> Option<&str> {
        self.slots.get(daemon_id).map(String::as_str)
    }

    pub fn slot_mut(&mut self, daemon_id: &DaemonId) -> &mut String {
        self.slots.entry(daemon_id.clone()).or_default()
    }

    pub fn clear(&mut self, daemon_id: &DaemonId) {
        self.slots.remove(daemon_id);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Toggled(DaemonStatus),
    /// Manual `UP` was refused because the daemon has no running instances.
    Refused,
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied {
        instance: u64,
        status: DaemonStatus,
        alert_id: Option<String>,
    },
    Rejected(InstanceInputError),
    NotFound,
}

/// Authoritative in-memory daemon list. Every mutation goes through here and
/// bumps `revision` so derived views know to recompute.
#[derive(Debug, Default, Clone)]
pub struct FleetStore {
    records: Vec<DaemonRecord>,
    revision: u64,
    has_changes: bool,
}

impl FleetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole record set. Status is re-derived from `instance`.
    pub fn load(&mut self, records: Vec<DaemonRecord>) {
        let mut records = records;
        for record in &mut records {
            record.normalize_status();
        }
        info!(count = records.len(), "fleet snapshot loaded");
        self.records = records;
        self.has_changes = false;
        self.bump();
    }

    pub fn records(&self) -> &[DaemonRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, daemon_id: &DaemonId) -> Option<&DaemonRecord> {
        self.records
            .iter()
            .find(|record| &record.daemon_id == daemon_id)
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn has_changes(&self) -> bool {
        self.has_changes
    }

    /// Edits are local-only; saving just acknowledges them.
    pub fn save(&mut self) {
        self.has_changes = false;
    }

    pub fn toggle_status(&mut self, daemon_id: &DaemonId) -> ToggleOutcome {
        let Some(record) = self
            .records
            .iter_mut()
            .find(|record| &record.daemon_id == daemon_id)
        else {
            return ToggleOutcome::NotFound;
        };
        let next = record.daemon_status.flipped();
        if next.is_up() && record.instance == 0 {
            debug!(daemon_id = %daemon_id, "refusing manual UP with zero instances");
            return ToggleOutcome::Refused;
        }
        record.daemon_status = next;
        self.has_changes = true;
        self.bump();
        ToggleOutcome::Toggled(next)
    }

    /// Applies the pending edit for `daemon_id`. Rejected input leaves both the
    /// record and the pending edit untouched.
    pub fn apply_instance(
        &mut self,
        daemon_id: &DaemonId,
        edits: &mut PendingEdits,
        notifications: &mut NotificationCenter,
        now: DateTime<Utc>,
    ) -> ApplyOutcome {
        let raw = edits.get(daemon_id).unwrap_or_default().to_string();
        self.apply_raw_instance(daemon_id, &raw, edits, notifications, now)
    }

    pub fn apply_raw_instance(
        &mut self,
        daemon_id: &DaemonId,
        raw: &str,
        edits: &mut PendingEdits,
        notifications: &mut NotificationCenter,
        now: DateTime<Utc>,
    ) -> ApplyOutcome {
        let Some(record) = self
            .records
            .iter_mut()
            .find(|record| &record.daemon_id == daemon_id)
        else {
            return ApplyOutcome::NotFound;
        };
        let instance = match parse_instance_input(raw) {
            Ok(instance) => instance,
            Err(err) => {
                warn!(daemon_id = %daemon_id, error = %err, "instance input rejected");
                return ApplyOutcome::Rejected(err);
            }
        };

        record.instance = instance;
        record.normalize_status();
        let status = record.daemon_status;
        let alert_id = if instance == 0 {
            notifications.raise_zero_instance(record, now)
        } else {
            None
        };
        edits.clear(daemon_id);
        self.has_changes = true;
        self.bump();
        ApplyOutcome::Applied {
            instance,
            status,
            alert_id,
        }
    }

    fn bump(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}
