use crate::debounce::{Debouncer, SEARCH_DEBOUNCE_MS};
use crate::model::{DaemonId, DaemonRecord, DaemonStatus};
use crate::store::FleetStore;
use chrono::{DateTime, Utc};
use std::ops::Range;
use tracing::debug;

pub const MAX_SUGGESTIONS: usize = 5;
pub const EMPTY_RESULTS_MESSAGE: &str = "No daemons match your search.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionEntry {
    pub daemon_id: DaemonId,
    pub daemon_name: String,
    pub daemon_status: DaemonStatus,
}

impl From<&DaemonRecord> for SuggestionEntry {
    fn from(record: &DaemonRecord) -> Self {
        Self {
            daemon_id: record.daemon_id.clone(),
            daemon_name: record.daemon_name.clone(),
            daemon_status: record.daemon_status,
        }
    }
}

/// Byte range of the first case-insensitive occurrence of `needle`.
pub fn find_case_insensitive(haystack: &str, needle: &str) -> Option<Range<usize>> {
    if needle.is_empty() {
        return Some(0..0);
    }
    let needle: Vec<char> = needle.chars().flat_map(char::to_lowercase).collect();
    for (start, _) in haystack.char_indices() {
        let mut wanted = needle.iter();
        let mut end = start;
        let mut matched = false;
        for (offset, ch) in haystack[start..].char_indices() {
            let mut lowered = ch.to_lowercase();
            let all_match = lowered.all(|lc| wanted.next() == Some(&lc));
            if !all_match {
                break;
            }
            end = start + offset + ch.len_utf8();
            if wanted.len() == 0 {
                matched = true;
                break;
            }
        }
        if matched {
            return Some(start..end);
        }
    }
    None
}

pub fn name_matches(record: &DaemonRecord, query: &str) -> bool {
    find_case_insensitive(&record.daemon_name, query).is_some()
}

/// Records whose name contains `query`, in store order. An empty query
/// keeps everything.
pub fn filter_records<'a>(records: &'a [DaemonRecord], query: &str) -> Vec<&'a DaemonRecord> {
    if query.is_empty() {
        return records.iter().collect();
    }
    records
        .iter()
        .filter(|record| name_matches(record, query))
        .collect()
}

pub fn suggestions_for(records: &[DaemonRecord], query: &str) -> Vec<SuggestionEntry> {
    if query.is_empty() {
        return Vec::new();
    }
    records
        .iter()
        .filter(|record| name_matches(record, query))
        .take(MAX_SUGGESTIONS)
        .map(SuggestionEntry::from)
        .collect()
}

/// Splits `text` around the first match of `query` for highlighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightSpans<'a> {
    pub before: &'a str,
    pub matched: &'a str,
    pub after: &'a str,
}

pub fn highlight_match<'a>(text: &'a str, query: &str) -> Option<HighlightSpans<'a>> {
    if query.is_empty() {
        return None;
    }
    let range = find_case_insensitive(text, query)?;
    Some(HighlightSpans {
        before: &text[..range.start],
        matched: &text[range.clone()],
        after: &text[range.end..],
    })
}

/// Query state for the dashboard. The raw query drives suggestions on every
/// keystroke; the debounced copy drives the filtered view.
#[derive(Debug, Clone)]
pub struct SearchFilter {
    query: String,
    applied: Debouncer<String>,
    recomputations: u64,
}

impl Default for SearchFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchFilter {
    pub fn new() -> Self {
        Self {
            query: String::new(),
            applied: Debouncer::with_delay_ms(String::new(), SEARCH_DEBOUNCE_MS),
            recomputations: 0,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn applied_query(&self) -> &str {
        self.applied.value()
    }

    pub fn recomputations(&self) -> u64 {
        self.recomputations
    }

    pub fn is_settling(&self) -> bool {
        self.applied.is_pending()
    }

    pub fn set_query(&mut self, query: impl Into<String>, now: DateTime<Utc>) {
        self.query = query.into();
        self.applied.set(self.query.clone(), now);
    }

    pub fn push_char(&mut self, ch: char, now: DateTime<Utc>) {
        let mut next = self.query.clone();
        next.push(ch);
        self.set_query(next, now);
    }

    pub fn pop_char(&mut self, now: DateTime<Utc>) {
        let mut next = self.query.clone();
        if next.pop().is_some() {
            self.set_query(next, now);
        }
    }

    /// Explicit "run search": trims surrounding whitespace.
    pub fn submit_query(&mut self, now: DateTime<Utc>) {
        let trimmed = self.query.trim().to_string();
        self.set_query(trimmed, now);
    }

    /// Replaces the query text with the suggestion's exact name. Filtering
    /// follows through the normal debounce path.
    pub fn select_suggestion(&mut self, entry: &SuggestionEntry, now: DateTime<Utc>) {
        self.set_query(entry.daemon_name.clone(), now);
    }

    /// Advances the debounce clock. Returns true when the filtered view must
    /// be recomputed.
    pub fn tick(&mut self, now: DateTime<Utc>) -> bool {
        let Some(applied) = self.applied.poll(now) else {
            return false;
        };
        debug!(query = %applied, "search filter recomputed");
        self.recomputations += 1;
        true
    }

    pub fn visible<'a>(&self, store: &'a FleetStore) -> Vec<&'a DaemonRecord> {
        filter_records(store.records(), self.applied.value())
    }

    pub fn suggestions(&self, store: &FleetStore) -> Vec<SuggestionEntry> {
        suggestions_for(store.records(), &self.query)
    }

    pub fn cancel(&mut self) {
        self.applied.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(offset_ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_760_000_000_000 + offset_ms)
            .single()
            .expect("valid timestamp")
    }

    fn store_with(names: &[&str]) -> FleetStore {
        let mut store = FleetStore::new();
        store.load(
            names
                .iter()
                .enumerate()
                .map(|(idx, name)| DaemonRecord::new(idx.to_string(), *name, idx as u64))
                .collect(),
        );
        store
    }

    #[test]
    fn alpha_beta_scenario() {
        let mut store = FleetStore::new();
        store.load(vec![
            DaemonRecord::new("1", "alpha", 3),
            DaemonRecord::new("2", "beta", 0),
        ]);
        let mut search = SearchFilter::new();
        search.set_query("al", ts(0));
        assert_eq!(search.suggestions(&store).len(), 1);
        assert_eq!(search.suggestions(&store)[0].daemon_name, "alpha");
        assert_eq!(search.visible(&store).len(), 2);

        assert!(search.tick(ts(150)));
        let visible: Vec<&str> = search
            .visible(&store)
            .iter()
            .map(|record| record.daemon_name.as_str())
            .collect();
        assert_eq!(visible, vec!["alpha"]);
    }

    #[test]
    fn suggestions_track_raw_query_and_cap_at_five() {
        let store = store_with(&["db-1", "db-2", "DB-3", "web", "db-4", "db-5", "db-6"]);
        let mut search = SearchFilter::new();
        search.set_query("Db", ts(0));
        let names: Vec<String> = search
            .suggestions(&store)
            .into_iter()
            .map(|entry| entry.daemon_name)
            .collect();
        assert_eq!(names, vec!["db-1", "db-2", "DB-3", "db-4", "db-5"]);

        search.set_query("", ts(10));
        assert!(search.suggestions(&store).is_empty());
    }

    #[test]
    fn rapid_typing_recomputes_once() {
        let store = store_with(&["alpha", "alpine", "beta"]);
        let mut search = SearchFilter::new();
        for (step, ch) in "alpi".chars().enumerate() {
            let now = ts(step as i64 * 30);
            search.push_char(ch, now);
            search.tick(now);
        }
        for offset in (100..=500).step_by(25) {
            search.tick(ts(offset));
        }
        assert_eq!(search.recomputations(), 1);
        assert_eq!(search.applied_query(), "alpi");
        assert_eq!(search.visible(&store).len(), 1);
    }

    #[test]
    fn selecting_suggestion_only_changes_query() {
        let store = store_with(&["alpha", "alpine"]);
        let mut search = SearchFilter::new();
        search.set_query("alp", ts(0));
        search.tick(ts(200));
        let pick = search.suggestions(&store)[1].clone();
        search.select_suggestion(&pick, ts(300));
        assert_eq!(search.query(), "alpine");
        assert_eq!(search.applied_query(), "alp");
        assert!(search.tick(ts(450)));
        assert_eq!(search.visible(&store).len(), 1);
    }

    #[test]
    fn submit_trims_whitespace() {
        let mut search = SearchFilter::new();
        search.set_query("  beta ", ts(0));
        search.submit_query(ts(1));
        assert_eq!(search.query(), "beta");
    }

    #[test]
    fn cancel_drops_pending_filter_update() {
        let mut search = SearchFilter::new();
        search.set_query("x", ts(0));
        search.cancel();
        assert!(!search.tick(ts(1_000)));
        assert_eq!(search.applied_query(), "");
    }

    #[test]
    fn highlight_keeps_original_casing() {
        let spans = highlight_match("Alpha-Node", "pha-n").expect("match");
        assert_eq!(spans.before, "Al");
        assert_eq!(spans.matched, "pha-N");
        assert_eq!(spans.after, "ode");
        assert!(highlight_match("beta", "zz").is_none());
        assert!(highlight_match("beta", "").is_none());
    }

    #[test]
    fn case_insensitive_search_handles_non_ascii() {
        assert_eq!(find_case_insensitive("Größe", "SSE"), None);
        assert_eq!(find_case_insensitive("ÉCOLE", "éco"), Some(0..4));
    }
}
