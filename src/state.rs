use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::config::ViewerConfig;
use crate::data::filter::ValueSet;
use crate::data::model::CellValue;
use crate::data::options::FilterOption;
use crate::data::source::{spawn_fetch, DatasetProvider, DirectoryProvider, PendingFetch};
use crate::debounce::{Clock, SystemClock};
use crate::error::LoadError;
use crate::pagination::{calculate_pagination, PageInfo};
use crate::store::{FilterStore, Snapshot};

/// How often to check on a background fetch.
const FETCH_POLL_INTERVAL: Duration = Duration::from_millis(50);

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Summary figures shown above the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metrics {
    pub total_rows: usize,
    pub filtered_rows: usize,
    /// Selected values summed over all columns.
    pub active_filters: usize,
    /// Share of rows shown, one decimal.
    pub filter_percentage: String,
}

/// The full UI state, independent of rendering.
pub struct AppState<C: Clock = SystemClock> {
    pub config: ViewerConfig,

    /// Filter store holding the loaded dataset and its derived view.
    pub store: FilterStore<C>,

    /// Named dataset last requested (None for ad-hoc files).
    pub selected_dataset: Option<String>,

    /// Current table page, 1-based.
    pub current_page: usize,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    provider: Arc<dyn DatasetProvider>,
    pending_fetch: Option<PendingFetch>,
    search: BTreeMap<String, String>,
    seen_generation: u64,
}

impl AppState<SystemClock> {
    pub fn new(config: ViewerConfig) -> Self {
        let provider = Arc::new(DirectoryProvider::new(config.data_dir.clone()));
        let store = FilterStore::with_clock(SystemClock, config.debounce());
        Self::with_parts(config, provider, store)
    }
}

impl<C: Clock> AppState<C> {
    pub fn with_parts(
        config: ViewerConfig,
        provider: Arc<dyn DatasetProvider>,
        store: FilterStore<C>,
    ) -> Self {
        Self {
            config,
            store,
            selected_dataset: None,
            current_page: 1,
            status_message: None,
            provider,
            pending_fetch: None,
            search: BTreeMap::new(),
            seen_generation: 0,
        }
    }

    /// Whether a file loading operation is in progress.
    pub fn loading(&self) -> bool {
        self.pending_fetch.is_some()
    }

    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.store.snapshot()
    }

    // -- loading --

    /// Start fetching a named dataset from the configured provider.
    pub fn request_dataset(&mut self, name: &str) {
        self.selected_dataset = Some(name.to_string());
        self.status_message = None;
        self.pending_fetch = Some(spawn_fetch(Arc::clone(&self.provider), name));
    }

    /// Re-request the dataset that last failed or loaded.
    pub fn retry(&mut self) {
        if let Some(name) = self.selected_dataset.clone() {
            self.request_dataset(&name);
        }
    }

    /// Start loading an arbitrary CSV file.
    pub fn open_path(&mut self, path: &Path) {
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            self.status_message = Some(format!("Error: cannot open {}", path.display()));
            return;
        };
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let provider: Arc<dyn DatasetProvider> = Arc::new(DirectoryProvider::new(dir));
        self.selected_dataset = None;
        self.status_message = None;
        self.pending_fetch = Some(spawn_fetch(provider, file_name));
    }

    /// Advance background work: adopt fetched text and publish staged filter
    /// updates that are due. Returns how soon to call again, if at all.
    pub fn tick(&mut self) -> Option<Duration> {
        if let Some(result) = self.pending_fetch.as_ref().and_then(PendingFetch::try_take) {
            let name = self
                .pending_fetch
                .take()
                .map(|f| f.name().to_string())
                .unwrap_or_default();
            self.finish_load(&name, result);
        }

        self.store.poll();
        self.sync_page();

        if self.loading() {
            Some(FETCH_POLL_INTERVAL)
        } else {
            self.store.time_until_due()
        }
    }

    fn finish_load(&mut self, name: &str, result: Result<String, LoadError>) {
        match result.and_then(|text| self.store.load_dataset(&text)) {
            Ok(snapshot) => {
                log::info!("Loaded {} rows from {name}", snapshot.total_rows());
                self.current_page = 1;
                self.search.clear();
                self.status_message = None;
            }
            Err(e) => {
                let err = anyhow::Error::new(e);
                log::error!("Error loading dataset {name}: {err:#}");
                self.status_message = Some(format!("Error: {err:#}"));
            }
        }
    }

    fn sync_page(&mut self) {
        let Some(snapshot) = self.store.snapshot() else {
            return;
        };
        if snapshot.generation() == self.seen_generation {
            return;
        }
        self.seen_generation = snapshot.generation();
        let total_pages = calculate_pagination(
            snapshot.filtered_len(),
            self.config.items_per_page,
            self.current_page,
        )
        .total_pages;
        self.current_page = self.current_page.clamp(1, total_pages.max(1));
    }

    // -- filter edits --

    /// Whether `value` is checked in `column`, counting staged updates.
    pub fn is_checked(&self, column: &str, value: &CellValue) -> bool {
        self.store
            .staged_selection()
            .and_then(|s| s.get(column))
            .is_some_and(|values| values.contains(value))
    }

    fn staged_values(&self, column: &str) -> ValueSet {
        self.store
            .staged_selection()
            .and_then(|s| s.get(column))
            .cloned()
            .unwrap_or_default()
    }

    fn stage(&mut self, column: &str, values: ValueSet) {
        if let Err(e) = self.store.update_filter(column, values) {
            self.status_message = Some(format!("Error: {e}"));
        }
    }

    pub fn toggle_value(&mut self, column: &str, value: &CellValue) {
        let mut values = self.staged_values(column);
        if !values.remove(value) {
            values.insert(value.clone());
        }
        self.stage(column, values);
    }

    /// Select every option of `column` that matches its search text.
    pub fn select_all_matching(&mut self, column: &str) {
        let values = self
            .visible_options(column)
            .into_iter()
            .map(|o| o.value)
            .collect();
        self.stage(column, values);
    }

    pub fn clear_column(&mut self, column: &str) {
        self.stage(column, ValueSet::new());
    }

    pub fn clear_all(&mut self) {
        self.store.clear_all_filters();
        self.sync_page();
    }

    // -- option search --

    pub fn search_text(&self, column: &str) -> &str {
        self.search.get(column).map(String::as_str).unwrap_or("")
    }

    pub fn search_text_mut(&mut self, column: &str) -> &mut String {
        self.search.entry(column.to_string()).or_default()
    }

    /// Options of `column` whose label contains the search text
    /// (case-insensitive), with check state taken from staged updates.
    pub fn visible_options(&self, column: &str) -> Vec<FilterOption> {
        let needle = self.search_text(column).trim().to_lowercase();
        let staged = self.staged_values(column);
        self.store
            .options(column)
            .iter()
            .filter(|o| needle.is_empty() || o.label.to_lowercase().contains(&needle))
            .map(|o| FilterOption {
                is_selected: staged.contains(&o.value),
                ..o.clone()
            })
            .collect()
    }

    // -- table --

    pub fn page_info(&self) -> PageInfo {
        let total = self.store.snapshot().map_or(0, |s| s.filtered_len());
        calculate_pagination(total, self.config.items_per_page, self.current_page)
    }

    pub fn set_page(&mut self, page: usize) {
        let total_pages = self.page_info().total_pages;
        self.current_page = page.clamp(1, total_pages.max(1));
    }

    pub fn metrics(&self) -> Metrics {
        let Some(snapshot) = self.store.snapshot() else {
            return Metrics {
                total_rows: 0,
                filtered_rows: 0,
                active_filters: 0,
                filter_percentage: "0".into(),
            };
        };
        let total_rows = snapshot.total_rows();
        let filtered_rows = snapshot.filtered_len();
        let filter_percentage = if total_rows > 0 {
            format!("{:.1}", filtered_rows as f64 / total_rows as f64 * 100.0)
        } else {
            "0".into()
        };
        Metrics {
            total_rows,
            filtered_rows,
            active_filters: snapshot.selection().selected_count(),
            filter_percentage,
        }
    }
}
