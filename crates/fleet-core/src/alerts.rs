use crate::model::{DaemonId, DaemonRecord};
use crate::store::FleetStore;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

pub const ZERO_INSTANCE_SCAN_MS: i64 = 120_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationEvent {
    pub id: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: Severity,
    pub daemon_id: Option<DaemonId>,
    pub raised_at: DateTime<Utc>,
}

pub fn zero_instance_message(record: &DaemonRecord) -> String {
    let name = if record.daemon_name.trim().is_empty() {
        format!("Daemon {}", record.daemon_id)
    } else {
        format!("Daemon \"{}\" ({})", record.daemon_name, record.daemon_id)
    };
    format!("{name} has 0 running instances. Set the instance count above 0 to silence this alert.")
}

/// Live notification set. At most one live event exists per daemon id;
/// events leave the set only through dismissal.
#[derive(Debug, Default, Clone)]
pub struct NotificationCenter {
    live: Vec<NotificationEvent>,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live(&self) -> &[NotificationEvent] {
        &self.live
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn has_live_for(&self, daemon_id: &DaemonId) -> bool {
        self.live
            .iter()
            .any(|event| event.daemon_id.as_ref() == Some(daemon_id))
    }

    /// Pushes an event unless one is already live for the same daemon.
    /// Returns the id of the new event.
    pub fn push(
        &mut self,
        message: impl Into<String>,
        kind: Severity,
        daemon_id: Option<DaemonId>,
        now: DateTime<Utc>,
    ) -> Option<String> {
        if let Some(id) = daemon_id.as_ref() {
            if self.has_live_for(id) {
                return None;
            }
        }
        let event = NotificationEvent {
            id: Uuid::new_v4().to_string(),
            message: message.into(),
            kind,
            daemon_id,
            raised_at: now,
        };
        let id = event.id.clone();
        self.live.push(event);
        Some(id)
    }

    pub fn raise_zero_instance(&mut self, record: &DaemonRecord, now: DateTime<Utc>) -> Option<String> {
        let raised = self.push(
            zero_instance_message(record),
            Severity::Warning,
            Some(record.daemon_id.clone()),
            now,
        );
        if raised.is_some() {
            info!(daemon_id = %record.daemon_id, "zero-instance alert raised");
        }
        raised
    }

    pub fn dismiss(&mut self, notification_id: &str) -> Option<NotificationEvent> {
        let position = self
            .live
            .iter()
            .position(|event| event.id == notification_id)?;
        Some(self.live.remove(position))
    }

    pub fn dismiss_latest(&mut self) -> Option<NotificationEvent> {
        self.live.pop()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Scanning { next_scan_at: DateTime<Utc> },
    Stopped,
}

/// Periodic zero-instance sweep over the full record set.
#[derive(Debug, Clone)]
pub struct AlertScheduler {
    period: Duration,
    state: SchedulerState,
}

impl AlertScheduler {
    /// Enters the scanning state; the first sweep runs one period after `now`.
    pub fn start(now: DateTime<Utc>) -> Self {
        Self::with_period(Duration::milliseconds(ZERO_INSTANCE_SCAN_MS), now)
    }

    pub fn with_period(period: Duration, now: DateTime<Utc>) -> Self {
        Self {
            period,
            state: SchedulerState::Scanning {
                next_scan_at: now + period,
            },
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn is_scanning(&self) -> bool {
        matches!(self.state, SchedulerState::Scanning { .. })
    }

    /// Runs a sweep when the period has elapsed. Returns the number of alerts
    /// raised; always zero once torn down.
    pub fn poll(
        &mut self,
        now: DateTime<Utc>,
        store: &FleetStore,
        notifications: &mut NotificationCenter,
    ) -> usize {
        let SchedulerState::Scanning { next_scan_at } = self.state else {
            return 0;
        };
        if now < next_scan_at {
            return 0;
        }
        let mut next = next_scan_at + self.period;
        while next <= now {
            next = next + self.period;
        }
        self.state = SchedulerState::Scanning { next_scan_at: next };
        Self::scan(now, store, notifications)
    }

    pub fn scan(now: DateTime<Utc>, store: &FleetStore, notifications: &mut NotificationCenter) -> usize {
        let mut raised = 0;
        for record in store.records().iter().filter(|record| record.instance == 0) {
            if notifications.raise_zero_instance(record, now).is_some() {
                raised += 1;
            }
        }
        debug!(raised, total = store.records().len(), "zero-instance scan finished");
        raised
    }

    pub fn teardown(&mut self) {
        self.state = SchedulerState::Stopped;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DaemonRecord;
    use chrono::TimeZone;

    fn ts(offset_ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_760_000_000_000 + offset_ms)
            .single()
            .expect("valid timestamp")
    }

    fn fleet() -> FleetStore {
        let mut store = FleetStore::new();
        store.load(vec![
            DaemonRecord::new("1", "alpha", 3),
            DaemonRecord::new("2", "beta", 0),
            DaemonRecord::new("3", "gamma", 0),
        ]);
        store
    }

    #[test]
    fn scan_raises_once_per_zero_instance_daemon() {
        let store = fleet();
        let mut center = NotificationCenter::new();
        assert_eq!(AlertScheduler::scan(ts(0), &store, &mut center), 2);
        assert_eq!(AlertScheduler::scan(ts(1), &store, &mut center), 0);
        assert_eq!(center.len(), 2);
        assert!(center.has_live_for(&DaemonId::from("2")));
        assert!(center.live()[0].message.contains("beta"));
        assert_eq!(center.live()[0].kind, Severity::Warning);
    }

    #[test]
    fn poll_waits_for_period_and_stops_after_teardown() {
        let store = fleet();
        let mut center = NotificationCenter::new();
        let mut scheduler = AlertScheduler::start(ts(0));
        assert_eq!(scheduler.poll(ts(119_999), &store, &mut center), 0);
        assert!(center.is_empty());
        assert_eq!(scheduler.poll(ts(120_000), &store, &mut center), 2);
        assert_eq!(
            scheduler.state(),
            SchedulerState::Scanning { next_scan_at: ts(240_000) }
        );

        center.dismiss_latest();
        scheduler.teardown();
        assert_eq!(scheduler.poll(ts(240_000), &store, &mut center), 0);
        assert_eq!(center.len(), 1);
    }

    #[test]
    fn late_poll_sweeps_once_and_skips_missed_periods() {
        let store = fleet();
        let mut center = NotificationCenter::new();
        let mut scheduler = AlertScheduler::start(ts(0));
        assert_eq!(scheduler.poll(ts(500_000), &store, &mut center), 2);
        assert_eq!(
            scheduler.state(),
            SchedulerState::Scanning { next_scan_at: ts(600_000) }
        );
        assert_eq!(scheduler.poll(ts(599_999), &store, &mut center), 0);
        assert_eq!(center.len(), 2);
    }

    #[test]
    fn dismissed_alert_is_eligible_again_on_next_scan() {
        let store = fleet();
        let mut center = NotificationCenter::new();
        AlertScheduler::scan(ts(0), &store, &mut center);
        let first = center.live()[0].id.clone();
        assert!(center.dismiss(&first).is_some());
        assert_eq!(AlertScheduler::scan(ts(10), &store, &mut center), 1);
        assert_eq!(center.len(), 2);
        assert_ne!(center.live()[1].id, first);
    }

    #[test]
    fn alerts_are_not_auto_dismissed_after_recovery() {
        let mut store = fleet();
        let mut center = NotificationCenter::new();
        AlertScheduler::scan(ts(0), &store, &mut center);
        store.load(vec![DaemonRecord::new("2", "beta", 4)]);
        AlertScheduler::scan(ts(1), &store, &mut center);
        assert_eq!(center.len(), 2);
    }

    #[test]
    fn notifications_without_daemon_are_never_deduplicated() {
        let mut center = NotificationCenter::new();
        assert!(center.push("a", Severity::Info, None, ts(0)).is_some());
        assert!(center.push("a", Severity::Info, None, ts(0)).is_some());
        assert_eq!(center.len(), 2);
    }

    #[test]
    fn event_serializes_type_tag() {
        let mut center = NotificationCenter::new();
        center.push("hello", Severity::Warning, Some(DaemonId::from("9")), ts(0));
        let value = serde_json::to_value(&center.live()[0]).expect("serialize");
        assert_eq!(value["type"], "warning");
        assert_eq!(value["daemonId"], "9");
    }
}
