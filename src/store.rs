use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::data::filter::{filtered_indices, Selection, ValueSet};
use crate::data::loader::parse_dataset;
use crate::data::model::{CellValue, ColumnSchema, Dataset, Row};
use crate::data::options::{options_for_all, FilterOption, OptionLists};
use crate::data::source::{fetch_dataset, DatasetProvider};
use crate::debounce::{Clock, Debouncer, SystemClock};
use crate::error::{FilterError, LoadError};

/// Quiet period before a burst of selection updates is published.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(100);

// ---------------------------------------------------------------------------
// Derived view
// ---------------------------------------------------------------------------

/// Filtered rows plus per-column option lists, always computed together
/// from one selection.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedView {
    filtered: Vec<usize>,
    options: OptionLists,
}

impl DerivedView {
    fn compute(dataset: &Dataset, selection: &Selection) -> Self {
        let started = Instant::now();
        let filtered = filtered_indices(&dataset.rows, selection);
        log::debug!("Filter applied in {:?}", started.elapsed());

        let started = Instant::now();
        let options = options_for_all(&dataset.rows, &dataset.columns, selection);
        log::debug!(
            "Filter options generated for {} columns in {:?}",
            dataset.columns.len(),
            started.elapsed()
        );

        DerivedView { filtered, options }
    }

    /// Indices into the dataset's rows, in source order.
    pub fn filtered_indices(&self) -> &[usize] {
        &self.filtered
    }

}

// ---------------------------------------------------------------------------
// Snapshot – one published, self-consistent state
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct Snapshot {
    dataset: Arc<Dataset>,
    selection: Selection,
    view: DerivedView,
    generation: u64,
}

impl Snapshot {
    fn derive(dataset: Arc<Dataset>, selection: Selection, generation: u64) -> Self {
        let view = DerivedView::compute(&dataset, &selection);
        Snapshot {
            dataset,
            selection,
            view,
            generation,
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn columns(&self) -> &[ColumnSchema] {
        &self.dataset.columns
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn view(&self) -> &DerivedView {
        &self.view
    }

    /// Increases with every publication of the owning store.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn total_rows(&self) -> usize {
        self.dataset.len()
    }

    pub fn filtered_len(&self) -> usize {
        self.view.filtered.len()
    }

    pub fn filtered_rows(&self) -> impl Iterator<Item = &Row> + '_ {
        self.view.filtered.iter().map(|&i| &self.dataset.rows[i])
    }

    /// Option list for `column`; empty for unknown columns.
    pub fn options(&self, column: &str) -> &[FilterOption] {
        self.view
            .options
            .get(column)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

// ---------------------------------------------------------------------------
// Filter state store
// ---------------------------------------------------------------------------

#[derive(Debug)]
enum StoreState {
    Empty,
    Ready(Arc<Snapshot>),
}

/// Owns the loaded dataset and the selection, and publishes a new
/// [`Snapshot`] after every load, clear, or debounced update.
///
/// Readers hold an `Arc<Snapshot>`; a publication swaps in a fresh one, so a
/// reader keeps seeing the snapshot it grabbed, never a half-updated one.
#[derive(Debug)]
pub struct FilterStore<C: Clock = SystemClock> {
    state: StoreState,
    staged: Debouncer<Selection>,
    clock: C,
    generation: u64,
}

impl FilterStore<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock, DEFAULT_DEBOUNCE)
    }
}

impl Default for FilterStore<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> FilterStore<C> {
    pub fn with_clock(clock: C, debounce: Duration) -> Self {
        FilterStore {
            state: StoreState::Empty,
            staged: Debouncer::new(debounce),
            clock,
            generation: 0,
        }
    }

    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        match &self.state {
            StoreState::Ready(snapshot) => Some(Arc::clone(snapshot)),
            StoreState::Empty => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, StoreState::Ready(_))
    }

    // -- transitions --

    /// Parse `raw_text` and replace the dataset, resetting every selection.
    ///
    /// On failure the previous state stays published.
    pub fn load_dataset(&mut self, raw_text: &str) -> Result<Arc<Snapshot>, LoadError> {
        let dataset = parse_dataset(raw_text)?;
        Ok(self.adopt(dataset))
    }

    /// Fetch `name` from `provider` on this thread, then load it.
    pub fn load_from(
        &mut self,
        provider: &dyn DatasetProvider,
        name: &str,
    ) -> Result<Arc<Snapshot>, LoadError> {
        let text = fetch_dataset(provider, name)?;
        self.load_dataset(&text)
    }

    /// Replace the dataset with an already parsed one.
    pub fn adopt(&mut self, dataset: Dataset) -> Arc<Snapshot> {
        if self.staged.cancel().is_some() {
            log::debug!("discarding staged filter update from the previous dataset");
        }
        log::info!(
            "Loaded {} rows with columns {:?}",
            dataset.len(),
            dataset.column_keys().collect::<Vec<_>>()
        );
        let selection = Selection::empty_for(&dataset.columns);
        self.publish(Arc::new(dataset), selection)
    }

    /// Stage a new value set for `column`. The change is published once no
    /// further update has arrived for the debounce period; see [`Self::poll`].
    ///
    /// Updates to several columns inside one quiet period are published
    /// together; for one column the latest call wins.
    pub fn update_filter<I>(&mut self, column: &str, values: I) -> Result<(), FilterError>
    where
        I: IntoIterator<Item = CellValue>,
    {
        let snapshot = match &self.state {
            StoreState::Ready(snapshot) => snapshot,
            StoreState::Empty => {
                log::warn!("ignoring filter update for {column}: no dataset loaded");
                return Err(FilterError::NoDataset);
            }
        };
        if snapshot.dataset.column(column).is_none() {
            log::warn!("ignoring filter update for unknown column {column}");
            return Err(FilterError::UnknownColumn(column.to_string()));
        }

        let values: ValueSet = values.into_iter().collect();
        let mut staged = self
            .staged
            .cancel()
            .unwrap_or_else(|| snapshot.selection.clone());
        staged.set(column, values);
        self.staged.schedule(staged, self.clock.now());
        Ok(())
    }

    /// Publish the staged selection if its quiet period has elapsed.
    pub fn poll(&mut self) -> Option<Arc<Snapshot>> {
        let selection = self.staged.poll(self.clock.now())?;
        self.republish(selection)
    }

    /// Publish the staged selection immediately.
    pub fn flush(&mut self) -> Option<Arc<Snapshot>> {
        let selection = self.staged.flush()?;
        self.republish(selection)
    }

    /// Empty every column's selection right away, dropping any staged update.
    pub fn clear_all_filters(&mut self) -> Option<Arc<Snapshot>> {
        self.staged.cancel();
        let mut selection = match &self.state {
            StoreState::Ready(snapshot) => snapshot.selection.clone(),
            StoreState::Empty => return None,
        };
        selection.clear();
        self.republish(selection)
    }

    // -- queries --

    /// The staged selection if an update is waiting, else the published one.
    pub fn staged_selection(&self) -> Option<&Selection> {
        match (&self.state, self.staged.pending()) {
            (StoreState::Empty, _) => None,
            (StoreState::Ready(_), Some(staged)) => Some(staged),
            (StoreState::Ready(snapshot), None) => Some(&snapshot.selection),
        }
    }

    pub fn has_staged_update(&self) -> bool {
        self.staged.is_pending()
    }

    /// How long until [`Self::poll`] will publish, if anything is staged.
    pub fn time_until_due(&self) -> Option<Duration> {
        self.staged.time_until_due(self.clock.now())
    }

    pub fn selection(&self) -> Option<&Selection> {
        match &self.state {
            StoreState::Ready(snapshot) => Some(&snapshot.selection),
            StoreState::Empty => None,
        }
    }

    pub fn columns(&self) -> &[ColumnSchema] {
        match &self.state {
            StoreState::Ready(snapshot) => snapshot.columns(),
            StoreState::Empty => &[],
        }
    }

    pub fn options(&self, column: &str) -> &[FilterOption] {
        match &self.state {
            StoreState::Ready(snapshot) => snapshot.options(column),
            StoreState::Empty => &[],
        }
    }

    // -- internals --

    fn republish(&mut self, selection: Selection) -> Option<Arc<Snapshot>> {
        let dataset = match &self.state {
            StoreState::Ready(snapshot) => Arc::clone(&snapshot.dataset),
            StoreState::Empty => return None,
        };
        Some(self.publish(dataset, selection))
    }

    fn publish(&mut self, dataset: Arc<Dataset>, selection: Selection) -> Arc<Snapshot> {
        self.generation += 1;
        let snapshot = Arc::new(Snapshot::derive(dataset, selection, self.generation));
        self.state = StoreState::Ready(Arc::clone(&snapshot));
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::source::MemoryProvider;
    use crate::debounce::ManualClock;

    const NUMBERS: &str = "number,mod3,mod4,mod5
12,0,0,2
24,0,0,4
36,0,0,1";

    fn store() -> (FilterStore<ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        let mut store = FilterStore::with_clock(clock.clone(), DEFAULT_DEBOUNCE);
        store.load_dataset(NUMBERS).unwrap();
        (store, clock)
    }

    fn nums(vals: &[i32]) -> Vec<CellValue> {
        vals.iter().map(|v| CellValue::from(*v)).collect()
    }

    fn filtered_numbers(snapshot: &Snapshot) -> Vec<f64> {
        snapshot
            .filtered_rows()
            .filter_map(|row| row.get("number").and_then(CellValue::as_f64))
            .collect()
    }

    fn labels(snapshot: &Snapshot, column: &str) -> Vec<String> {
        snapshot.options(column).iter().map(|o| o.label.clone()).collect()
    }

    #[test]
    fn test_load_initialises_empty_selection() {
        let (store, _) = store();
        let snapshot = store.snapshot().unwrap();
        assert_eq!(snapshot.total_rows(), 3);
        assert_eq!(snapshot.filtered_len(), 3);
        assert!(snapshot.selection().is_unconstrained());
        assert_eq!(snapshot.selection().iter().count(), 4);
        assert_eq!(labels(&snapshot, "mod5"), vec!["1", "2", "4"]);
        assert_eq!(labels(&snapshot, "mod3"), vec!["0"]);
    }

    #[test]
    fn test_update_is_debounced() {
        let (mut store, clock) = store();
        let before = store.snapshot().unwrap();

        store.update_filter("number", nums(&[12])).unwrap();
        assert!(store.has_staged_update());
        assert_eq!(store.poll().map(|s| s.generation()), None);
        assert_eq!(store.snapshot().unwrap().generation(), before.generation());

        clock.advance(Duration::from_millis(50));
        assert!(store.poll().is_none());

        clock.advance(Duration::from_millis(50));
        let after = store.poll().unwrap();
        assert_eq!(filtered_numbers(&after), vec![12.0]);
        assert_eq!(labels(&after, "mod5"), vec!["2"]);
        assert_eq!(
            after.options("mod5"),
            &[FilterOption {
                value: CellValue::from(2),
                label: "2".into(),
                is_selected: false,
            }]
        );
        // The snapshot held by an earlier reader is untouched.
        assert_eq!(before.filtered_len(), 3);
    }

    #[test]
    fn test_burst_across_columns_coalesces() {
        let (mut store, clock) = store();
        let start = store.snapshot().unwrap().generation();

        store.update_filter("mod3", nums(&[0])).unwrap();
        clock.advance(Duration::from_millis(60));
        store.update_filter("mod5", nums(&[2])).unwrap();
        clock.advance(Duration::from_millis(60));
        assert!(store.poll().is_none());
        store.update_filter("mod5", nums(&[2, 4])).unwrap();
        assert_eq!(
            store.staged_selection().unwrap().get("mod5").map(|s| s.len()),
            Some(2)
        );

        clock.advance(DEFAULT_DEBOUNCE);
        let snapshot = store.poll().unwrap();
        assert_eq!(snapshot.generation(), start + 1);
        assert_eq!(filtered_numbers(&snapshot), vec![12.0, 24.0]);
        assert_eq!(labels(&snapshot, "mod4"), vec!["0"]);

        let mod5: Vec<bool> = snapshot.options("mod5").iter().map(|o| o.is_selected).collect();
        assert_eq!(mod5, vec![false, true, true]);
    }

    #[test]
    fn test_flush_publishes_immediately() {
        let (mut store, _) = store();
        store.update_filter("mod5", nums(&[1])).unwrap();
        let snapshot = store.flush().unwrap();
        assert_eq!(filtered_numbers(&snapshot), vec![36.0]);
        assert!(store.flush().is_none());
    }

    #[test]
    fn test_clear_all_drops_staged_update() {
        let (mut store, clock) = store();
        store.update_filter("number", nums(&[24])).unwrap();
        store.flush();
        store.update_filter("mod5", nums(&[4])).unwrap();

        let cleared = store.clear_all_filters().unwrap();
        assert!(cleared.selection().is_unconstrained());
        assert_eq!(cleared.filtered_len(), 3);

        clock.advance(DEFAULT_DEBOUNCE * 2);
        assert!(store.poll().is_none());
    }

    #[test]
    fn test_clear_all_is_idempotent() {
        let (mut store, _) = store();
        store.update_filter("mod3", nums(&[0])).unwrap();
        store.flush();

        let once = store.clear_all_filters().unwrap();
        let twice = store.clear_all_filters().unwrap();
        assert_eq!(once.selection(), twice.selection());
        assert_eq!(once.view(), twice.view());
    }

    #[test]
    fn test_empty_load_keeps_previous_dataset() {
        let (mut store, _) = store();
        let before = store.snapshot().unwrap();
        let err = store.load_dataset("number,mod3\n").unwrap_err();
        assert!(matches!(err, LoadError::EmptyDataset));
        assert_eq!(store.snapshot().unwrap().generation(), before.generation());
    }

    #[test]
    fn test_empty_store_rejects_updates() {
        let mut store = FilterStore::new();
        assert!(!store.is_ready());
        assert_eq!(store.update_filter("a", nums(&[1])), Err(FilterError::NoDataset));
        assert!(store.clear_all_filters().is_none());
        assert!(store.columns().is_empty());
        assert!(store.staged_selection().is_none());
        assert!(matches!(store.load_dataset(""), Err(LoadError::EmptyDataset)));
        assert!(!store.is_ready());
    }

    #[test]
    fn test_unknown_column_rejected() {
        let (mut store, _) = store();
        assert_eq!(
            store.update_filter("mod7", nums(&[1])),
            Err(FilterError::UnknownColumn("mod7".into()))
        );
        assert!(!store.has_staged_update());
    }

    #[test]
    fn test_reload_replaces_everything() {
        let (mut store, clock) = store();
        store.update_filter("mod3", nums(&[0])).unwrap();

        let snapshot = store.load_dataset("city,pop\nOslo,700\nLima,9000\n").unwrap();
        assert_eq!(store.columns().len(), 2);
        assert!(snapshot.selection().is_unconstrained());
        assert!(!store.has_staged_update());

        clock.advance(DEFAULT_DEBOUNCE);
        assert!(store.poll().is_none());
        assert_eq!(labels(&snapshot, "city"), vec!["Lima", "Oslo"]);
    }

    #[test]
    fn test_load_from_provider() {
        let provider = MemoryProvider::new().with("numbers.csv", NUMBERS);
        let mut store = FilterStore::new();
        let snapshot = store.load_from(&provider, "numbers.csv").unwrap();
        assert_eq!(snapshot.total_rows(), 3);
        assert!(matches!(
            store.load_from(&provider, "other.csv"),
            Err(LoadError::Acquisition { .. })
        ));
        assert!(store.is_ready());
    }

    #[test]
    fn test_time_until_due() {
        let (mut store, clock) = store();
        assert_eq!(store.time_until_due(), None);
        store.update_filter("mod4", nums(&[0])).unwrap();
        clock.advance(Duration::from_millis(30));
        assert_eq!(store.time_until_due(), Some(Duration::from_millis(70)));
    }
}
