use crate::config::DashboardConfig;
use crate::prefs::PreferenceStore;
use chrono::{DateTime, Utc};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use fleet_core::chart::{ScreenPoint, Tooltip};
use fleet_core::search::EMPTY_RESULTS_MESSAGE;
use fleet_core::snapshot::LOADING_MESSAGE;
use fleet_core::{
    render_chart, AlertScheduler, ApplyOutcome, ChartInteraction, ChartModel, ChartViewport,
    DaemonId, DaemonRecord, FleetStore, LoadState, NotificationCenter, PendingEdits, SearchFilter,
    SnapshotError, SnapshotLoader, SuggestionEntry, Theme, ToggleOutcome,
};
use ratatui::layout::Rect;
use tracing::{info, warn};

/// Chart units per terminal column when deriving the chart width.
pub const CHART_UNITS_PER_COLUMN: f64 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Grid,
    Search,
    Chart,
}

pub struct App {
    pub config: DashboardConfig,
    pub store: FleetStore,
    pub edits: PendingEdits,
    pub search: SearchFilter,
    pub notifications: NotificationCenter,
    pub scheduler: AlertScheduler,
    pub loader: SnapshotLoader,
    pub viewport: ChartViewport,
    pub interaction: ChartInteraction,
    pub theme: Theme,
    pub prefs: PreferenceStore,
    pub focus: Focus,
    pub selected: usize,
    pub suggestion_cursor: Option<usize>,
    pub editing: bool,
    pub show_help: bool,
    pub status_note: Option<String>,
    pub chart_area: Option<Rect>,
    pub dirty: bool,
    should_quit: bool,
}

impl App {
    pub fn new(config: DashboardConfig, prefs: PreferenceStore, now: DateTime<Utc>) -> Self {
        let theme = prefs.load_theme();
        Self {
            config,
            store: FleetStore::new(),
            edits: PendingEdits::new(),
            search: SearchFilter::new(),
            notifications: NotificationCenter::new(),
            scheduler: AlertScheduler::start(now),
            loader: SnapshotLoader::new(),
            viewport: ChartViewport::default(),
            interaction: ChartInteraction::default(),
            theme,
            prefs,
            focus: Focus::Grid,
            selected: 0,
            suggestion_cursor: None,
            editing: false,
            show_help: false,
            status_note: None,
            chart_area: None,
            dirty: true,
            should_quit: false,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn visible(&self) -> Vec<&DaemonRecord> {
        self.search.visible(&self.store)
    }

    pub fn suggestions(&self) -> Vec<SuggestionEntry> {
        self.search.suggestions(&self.store)
    }

    pub fn selected_id(&self) -> Option<DaemonId> {
        self.visible()
            .get(self.selected)
            .map(|record| record.daemon_id.clone())
    }

    pub fn chart(&self) -> Option<ChartModel> {
        render_chart(&self.visible(), self.viewport.width(), self.theme)
    }

    /// Tooltip for the active point of an already-built chart.
    pub fn tooltip(&self, chart: &ChartModel) -> Option<Tooltip> {
        self.interaction.tooltip(chart)
    }

    /// Banner line derived from the load state and the filtered set.
    pub fn banner(&self) -> Option<String> {
        match self.loader.state() {
            LoadState::Loading => Some(LOADING_MESSAGE.to_string()),
            LoadState::Failed(message) => Some(message.clone()),
            LoadState::Ready | LoadState::Idle => {
                if self.visible().is_empty() && !self.loader.state().is_loading() {
                    Some(EMPTY_RESULTS_MESSAGE.to_string())
                } else {
                    None
                }
            }
        }
    }

    pub fn begin_load(&mut self) -> fleet_core::snapshot::Liveness {
        self.mark_dirty();
        self.loader.begin()
    }

    pub fn finish_load(&mut self, result: Result<Vec<DaemonRecord>, SnapshotError>) {
        if self.loader.finish(result, &mut self.store) {
            self.clamp_selection();
            self.interaction.clear();
            self.mark_dirty();
        }
    }

    pub fn on_tick(&mut self, now: DateTime<Utc>) {
        let was_settling = self.search.is_settling();
        if self.search.tick(now) {
            self.selected = 0;
            self.interaction.clear();
            self.mark_dirty();
        } else if was_settling != self.search.is_settling() {
            self.mark_dirty();
        }
        if self
            .scheduler
            .poll(now, &self.store, &mut self.notifications)
            > 0
        {
            self.mark_dirty();
        }
    }

    /// Records the chart's inner area and re-maps when its width changes.
    pub fn observe_chart_area(&mut self, area: Rect) {
        self.chart_area = Some(area);
        let container = f64::from(area.width) * CHART_UNITS_PER_COLUMN;
        if self.viewport.observe_width(container) {
            self.mark_dirty();
        }
    }

    pub fn teardown(&mut self) {
        self.search.cancel();
        self.scheduler.teardown();
        self.loader.teardown();
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: DateTime<Utc>) {
        self.mark_dirty();
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }
        if self.show_help {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                self.show_help = false;
            }
            return;
        }
        match self.focus {
            Focus::Search => self.handle_search_key(key, now),
            Focus::Chart => self.handle_chart_key(key),
            Focus::Grid if self.editing => self.handle_edit_key(key, now),
            Focus::Grid => self.handle_grid_key(key, now),
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent, now: DateTime<Utc>) {
        match key.code {
            KeyCode::Esc => {
                self.focus = Focus::Grid;
                self.suggestion_cursor = None;
            }
            KeyCode::Enter => {
                let picked = self
                    .suggestion_cursor
                    .and_then(|cursor| self.suggestions().get(cursor).cloned());
                match picked {
                    Some(entry) => self.search.select_suggestion(&entry, now),
                    None => self.search.submit_query(now),
                }
                self.suggestion_cursor = None;
                self.focus = Focus::Grid;
            }
            KeyCode::Down | KeyCode::Tab => self.move_suggestion(1),
            KeyCode::Up | KeyCode::BackTab => self.move_suggestion(-1),
            KeyCode::Backspace => {
                self.search.pop_char(now);
                self.suggestion_cursor = None;
            }
            KeyCode::Char(ch) => {
                self.search.push_char(ch, now);
                self.suggestion_cursor = None;
            }
            _ => {}
        }
    }

    fn move_suggestion(&mut self, delta: isize) {
        let count = self.suggestions().len();
        if count == 0 {
            self.suggestion_cursor = None;
            return;
        }
        let next = match self.suggestion_cursor {
            Some(current) => (current as isize + delta).rem_euclid(count as isize) as usize,
            None if delta < 0 => count - 1,
            None => 0,
        };
        self.suggestion_cursor = Some(next);
    }

    fn handle_grid_key(&mut self, key: KeyEvent, now: DateTime<Utc>) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') | KeyCode::F(1) => self.show_help = true,
            KeyCode::Char('/') => {
                self.focus = Focus::Search;
                self.suggestion_cursor = None;
            }
            KeyCode::Char('c') => {
                self.focus = Focus::Chart;
                let count = self.chart().map(|chart| chart.points.len()).unwrap_or(0);
                self.interaction.step_focus(0, count);
            }
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Char('g') => self.selected = 0,
            KeyCode::Char('t') => self.toggle_selected(),
            KeyCode::Char('i') => self.editing = self.selected_id().is_some(),
            KeyCode::Char(ch) if ch.is_ascii_digit() => {
                if let Some(id) = self.selected_id() {
                    self.edits.set(&id, ch.to_string());
                    self.editing = true;
                }
            }
            KeyCode::Enter => self.apply_selected(now),
            KeyCode::Char('s') => self.save_changes(),
            KeyCode::Char('T') => self.toggle_theme(),
            KeyCode::Char('d') => self.dismiss_latest(),
            KeyCode::Char('x') => self.export_chart(),
            _ => {}
        }
    }

    fn handle_edit_key(&mut self, key: KeyEvent, now: DateTime<Utc>) {
        let Some(id) = self.selected_id() else {
            self.editing = false;
            return;
        };
        match key.code {
            KeyCode::Esc => self.editing = false,
            KeyCode::Enter => {
                self.apply_selected(now);
            }
            KeyCode::Backspace => {
                self.edits.slot_mut(&id).pop();
            }
            KeyCode::Char(ch) => self.edits.slot_mut(&id).push(ch),
            _ => {}
        }
    }

    fn handle_chart_key(&mut self, key: KeyEvent) {
        let count = self.chart().map(|chart| chart.points.len()).unwrap_or(0);
        match key.code {
            KeyCode::Esc | KeyCode::Char('c') => {
                if let Some(index) = self.interaction.active_index() {
                    self.interaction.blur(index);
                }
                self.focus = Focus::Grid;
            }
            KeyCode::Left | KeyCode::Char('h') => self.interaction.step_focus(-1, count),
            KeyCode::Right | KeyCode::Char('l') => self.interaction.step_focus(1, count),
            KeyCode::Home => self.interaction.focus(0),
            KeyCode::End if count > 0 => self.interaction.focus(count - 1),
            _ => {}
        }
    }

    pub fn handle_mouse(&mut self, event: MouseEvent) {
        if !matches!(event.kind, MouseEventKind::Moved) {
            return;
        }
        let Some(area) = self.chart_area else {
            return;
        };
        let Some(chart) = self.chart() else {
            return;
        };
        let previous = self.interaction.active_index();
        let inside = event.column >= area.x
            && event.column < area.x + area.width
            && event.row >= area.y
            && event.row < area.y + area.height;
        let hit = if inside && area.width > 0 && area.height > 0 {
            let units_x = chart.width() / f64::from(area.width);
            let units_y = chart.height() / f64::from(area.height);
            let position = ScreenPoint::new(
                (f64::from(event.column - area.x) + 0.5) * units_x,
                (f64::from(event.row - area.y) + 0.5) * units_y,
            );
            ChartInteraction::hit_test(&chart, position, units_x.max(units_y))
        } else {
            None
        };
        match (previous, hit) {
            (_, Some(index)) => self.interaction.hover(index),
            (Some(index), None) => self.interaction.leave(index),
            (None, None) => {}
        }
        if previous != self.interaction.active_index() {
            self.mark_dirty();
        }
    }

    fn move_selection(&mut self, delta: isize) {
        let count = self.visible().len();
        if count == 0 {
            self.selected = 0;
            return;
        }
        self.selected = (self.selected as isize + delta).clamp(0, count as isize - 1) as usize;
        self.editing = false;
    }

    fn clamp_selection(&mut self) {
        let count = self.visible().len();
        if self.selected >= count {
            self.selected = count.saturating_sub(1);
        }
    }

    fn toggle_selected(&mut self) {
        let Some(id) = self.selected_id() else {
            return;
        };
        self.status_note = match self.store.toggle_status(&id) {
            ToggleOutcome::Toggled(status) => Some(format!("{id} marked {status}")),
            ToggleOutcome::Refused => Some(format!(
                "{id} has 0 instances; set an instance count before marking it UP"
            )),
            ToggleOutcome::NotFound => None,
        };
    }

    fn apply_selected(&mut self, now: DateTime<Utc>) {
        let Some(id) = self.selected_id() else {
            return;
        };
        match self
            .store
            .apply_instance(&id, &mut self.edits, &mut self.notifications, now)
        {
            ApplyOutcome::Applied {
                instance, status, ..
            } => {
                self.editing = false;
                self.status_note = Some(format!("{id}: {instance} instance(s), {status}"));
            }
            ApplyOutcome::Rejected(_) | ApplyOutcome::NotFound => {}
        }
    }

    fn save_changes(&mut self) {
        if self.store.has_changes() {
            self.store.save();
            self.status_note = Some("Changes kept locally".to_string());
        }
    }

    fn dismiss_latest(&mut self) {
        if let Some(event) = self.notifications.dismiss_latest() {
            info!(notification_id = %event.id, "notification dismissed");
        }
    }

    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
        if let Err(err) = self.prefs.save_theme(self.theme) {
            warn!(error = %err, "failed to persist theme");
            self.status_note = Some(err.to_string());
        }
    }

    fn export_chart(&mut self) {
        let Some(chart) = self.chart() else {
            self.status_note = Some("Chart needs at least two daemons".to_string());
            return;
        };
        let path = self.config.chart_export_path();
        let result = path
            .parent()
            .map(std::fs::create_dir_all)
            .transpose()
            .and_then(|_| std::fs::write(&path, chart.to_svg()));
        self.status_note = Some(match result {
            Ok(()) => format!("Chart exported to {}", path.display()),
            Err(err) => format!("Chart export failed: {err}"),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use fleet_core::DaemonStatus;
    use reqwest::Url;

    fn ts(offset_ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_760_000_000_000 + offset_ms)
            .single()
            .expect("valid timestamp")
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn test_app(dir: &tempfile::TempDir) -> App {
        let config = DashboardConfig {
            api_base: Url::parse("http://127.0.0.1:5000").expect("url"),
            state_dir: dir.path().to_path_buf(),
            log_stdout: false,
        };
        let prefs = PreferenceStore::new(config.preferences_path());
        let mut app = App::new(config, prefs, ts(0));
        app.begin_load();
        app.finish_load(Ok(vec![
            DaemonRecord::new("1", "alpha", 3),
            DaemonRecord::new("2", "beta", 0),
            DaemonRecord::new("3", "alpine", 2),
        ]));
        app
    }

    #[test]
    fn typing_in_search_filters_after_debounce() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut app = test_app(&dir);
        app.handle_key(key(KeyCode::Char('/')), ts(0));
        app.handle_key(key(KeyCode::Char('a')), ts(10));
        app.handle_key(key(KeyCode::Char('l')), ts(20));
        assert_eq!(app.suggestions().len(), 2);
        assert_eq!(app.visible().len(), 3);

        app.on_tick(ts(170));
        assert_eq!(app.visible().len(), 2);
    }

    #[test]
    fn enter_on_suggestion_replaces_query() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut app = test_app(&dir);
        app.handle_key(key(KeyCode::Char('/')), ts(0));
        app.handle_key(key(KeyCode::Char('a')), ts(0));
        app.handle_key(key(KeyCode::Down), ts(0));
        app.handle_key(key(KeyCode::Down), ts(0));
        app.handle_key(key(KeyCode::Enter), ts(0));
        assert_eq!(app.search.query(), "beta");
        assert_eq!(app.focus, Focus::Grid);
    }

    #[test]
    fn digit_entry_and_enter_apply_instance() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut app = test_app(&dir);
        app.handle_key(key(KeyCode::Char('j')), ts(0));
        app.handle_key(key(KeyCode::Char('4')), ts(0));
        assert!(app.editing);
        app.handle_key(key(KeyCode::Char('2')), ts(0));
        app.handle_key(key(KeyCode::Enter), ts(0));

        let beta = app.store.get(&DaemonId::from("2")).expect("beta");
        assert_eq!(beta.instance, 42);
        assert_eq!(beta.daemon_status, DaemonStatus::Up);
        assert!(!app.editing);
        assert!(app.store.has_changes());

        app.handle_key(key(KeyCode::Char('s')), ts(0));
        assert!(!app.store.has_changes());
    }

    #[test]
    fn applying_zero_raises_alert_and_scan_does_not_duplicate() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut app = test_app(&dir);
        app.handle_key(key(KeyCode::Char('0')), ts(0));
        app.handle_key(key(KeyCode::Enter), ts(0));
        assert_eq!(app.notifications.len(), 1);

        app.on_tick(ts(120_000));
        assert_eq!(app.notifications.len(), 2);
        app.on_tick(ts(240_000));
        assert_eq!(app.notifications.len(), 2);

        app.handle_key(key(KeyCode::Char('d')), ts(0));
        assert_eq!(app.notifications.len(), 1);
    }

    #[test]
    fn theme_toggle_persists() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut app = test_app(&dir);
        assert_eq!(app.theme, Theme::Dark);
        app.handle_key(key(KeyCode::Char('T')), ts(0));
        assert_eq!(app.theme, Theme::Light);
        assert_eq!(app.prefs.load_theme(), Theme::Light);
    }

    #[test]
    fn chart_focus_shows_single_tooltip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut app = test_app(&dir);
        app.observe_chart_area(Rect::new(0, 0, 60, 20));
        app.handle_key(key(KeyCode::Char('c')), ts(0));
        let tooltip_label = |app: &App| {
            let chart = app.chart().expect("chart");
            app.tooltip(&chart).map(|tip| tip.label)
        };
        assert_eq!(tooltip_label(&app), Some("alpha".to_string()));
        app.handle_key(key(KeyCode::Right), ts(0));
        assert_eq!(tooltip_label(&app), Some("beta".to_string()));
        app.handle_key(key(KeyCode::Esc), ts(0));
        assert!(tooltip_label(&app).is_none());
    }

    #[test]
    fn narrow_chart_area_hits_width_floor() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut app = test_app(&dir);
        app.observe_chart_area(Rect::new(0, 0, 10, 10));
        assert_eq!(app.viewport.width(), 320.0);
    }

    #[test]
    fn failed_load_shows_error_banner() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = DashboardConfig {
            api_base: Url::parse("http://127.0.0.1:5000").expect("url"),
            state_dir: dir.path().to_path_buf(),
            log_stdout: false,
        };
        let prefs = PreferenceStore::new(config.preferences_path());
        let mut app = App::new(config, prefs, ts(0));
        app.begin_load();
        assert_eq!(app.banner().as_deref(), Some(LOADING_MESSAGE));
        app.finish_load(Err(SnapshotError::Status(500)));
        assert_eq!(app.banner().as_deref(), Some("HTTP 500"));
    }

    #[test]
    fn export_writes_svg() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut app = test_app(&dir);
        app.handle_key(key(KeyCode::Char('x')), ts(0));
        let svg = std::fs::read_to_string(app.config.chart_export_path()).expect("svg");
        assert!(svg.contains("<path"));
    }
}
