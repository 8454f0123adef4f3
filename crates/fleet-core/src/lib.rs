//! Reactive core of the daemon fleet dashboard: the record store with its
//! optimistic local mutations, the debounced search pipeline, the
//! zero-instance alert scheduler and the chart geometry.
//!
//! Time-dependent pieces never read the clock themselves. The owning event
//! loop passes `now` in, so every timer is cancelable and testable.

pub mod alerts;
pub mod chart;
pub mod config;
pub mod debounce;
pub mod model;
pub mod palette;
pub mod search;
pub mod snapshot;
pub mod store;

pub use alerts::{AlertScheduler, NotificationCenter, NotificationEvent, Severity};
pub use chart::{render_chart, ChartInteraction, ChartModel, ChartViewport};
pub use config::{resolve_api_base, ConfigError};
pub use debounce::Debouncer;
pub use model::{DaemonId, DaemonRecord, DaemonStatus};
pub use palette::{ChartPalette, Theme};
pub use search::{SearchFilter, SuggestionEntry};
pub use snapshot::{
    fetch_snapshot, parse_snapshot, snapshot_client, LoadState, SnapshotError, SnapshotLoader,
};
pub use store::{ApplyOutcome, FleetStore, PendingEdits, ToggleOutcome};
