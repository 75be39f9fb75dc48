use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

use serde::Serialize;

use super::filter::{apply, filtered_indices, Selection, ValueSet};
use super::model::{CellValue, ColumnLocator, ColumnSchema, Row};

// ---------------------------------------------------------------------------
// Cross-filter option lists
// ---------------------------------------------------------------------------

/// One selectable value of a column's filter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOption {
    pub value: CellValue,
    pub label: String,
    pub is_selected: bool,
}

/// Option lists keyed by column key.
pub type OptionLists = BTreeMap<String, Vec<FilterOption>>;

/// Values of `target` still reachable under every *other* active filter.
///
/// The target's own entry in `selection` is ignored when narrowing, so a
/// column never hides its own alternatives. `current` decides `is_selected`.
pub fn options_for(
    rows: &[Row],
    target: &str,
    selection: &Selection,
    current: &ValueSet,
) -> Vec<FilterOption> {
    let started = Instant::now();
    let others = selection.without(target);
    let relevant = apply(rows, &others);
    let options = collect_options(relevant, target, current);
    log::debug!(
        "filter options generated for {target} in {:?}",
        started.elapsed()
    );
    options
}

/// Option lists for every column in `columns`.
pub fn options_for_all(rows: &[Row], columns: &[ColumnSchema], selection: &Selection) -> OptionLists {
    let empty = ValueSet::new();
    let mut filtered: Option<Vec<usize>> = None;

    columns
        .iter()
        .map(|column| {
            let key = column.key.as_str();
            let current = selection.get(key).unwrap_or(&empty);
            let options = if current.is_empty() {
                // Without an own constraint the other filters are the whole
                // selection, so the filtered rows are the relevant rows.
                let indices = filtered.get_or_insert_with(|| filtered_indices(rows, selection));
                collect_options(indices.iter().map(|&i| &rows[i]), key, current)
            } else {
                options_for(rows, key, selection, current)
            };
            (column.key.clone(), options)
        })
        .collect()
}

/// Sort values for display.
///
/// A list made only of numbers sorts numerically. As soon as any text value
/// is present the whole list sorts by display string (case-sensitive,
/// byte-wise), and a number sorts before text with the same display string.
pub fn sort_for_display(values: &mut [CellValue]) {
    if values.iter().all(CellValue::is_number) {
        values.sort();
    } else {
        values.sort_by_cached_key(|v| (v.to_string(), !v.is_number()));
    }
}

fn collect_options<'a>(
    rows: impl IntoIterator<Item = &'a Row>,
    target: &str,
    current: &ValueSet,
) -> Vec<FilterOption> {
    let mut locator = ColumnLocator::new(target);
    let distinct: BTreeSet<&CellValue> = rows
        .into_iter()
        .filter_map(|row| locator.locate(row))
        .collect();

    let mut values: Vec<CellValue> = distinct.into_iter().cloned().collect();
    sort_for_display(&mut values);

    values
        .into_iter()
        .map(|value| FilterOption {
            label: value.to_string(),
            is_selected: current.contains(&value),
            value,
        })
        .collect()
}
