use std::collections::{BTreeMap, BTreeSet};

use super::model::{CellValue, ColumnLocator, ColumnSchema, Row};

// ---------------------------------------------------------------------------
// Filter predicate: which values are selected per column
// ---------------------------------------------------------------------------

/// Chosen values for one column.
pub type ValueSet = BTreeSet<CellValue>;

/// Per-column selection state: maps column key → set of selected values.
/// An empty set means "no constraint from this column".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    entries: BTreeMap<String, ValueSet>,
}

impl Selection {
    /// An all-empty selection with one entry per column.
    pub fn empty_for(columns: &[ColumnSchema]) -> Self {
        Selection {
            entries: columns
                .iter()
                .map(|c| (c.key.clone(), ValueSet::new()))
                .collect(),
        }
    }

    /// Replace the entry for `column`.
    pub fn set(&mut self, column: &str, values: ValueSet) {
        self.entries.insert(column.to_string(), values);
    }

    /// The entry for `column`; an absent column behaves like an empty set.
    pub fn get(&self, column: &str) -> Option<&ValueSet> {
        self.entries.get(column)
    }

    pub fn contains_column(&self, column: &str) -> bool {
        self.entries.contains_key(column)
    }

    /// Columns whose set is non-empty, with their sets.
    pub fn active(&self) -> impl Iterator<Item = (&str, &ValueSet)> {
        self.entries
            .iter()
            .filter(|(_, values)| !values.is_empty())
            .map(|(key, values)| (key.as_str(), values))
    }

    pub fn is_unconstrained(&self) -> bool {
        self.active().next().is_none()
    }

    pub fn is_active(&self, column: &str) -> bool {
        self.get(column).is_some_and(|values| !values.is_empty())
    }

    /// Total number of selected values over all columns.
    pub fn selected_count(&self) -> usize {
        self.entries.values().map(BTreeSet::len).sum()
    }

    /// A copy with `column` treated as unconstrained.
    pub fn without(&self, column: &str) -> Self {
        let mut other = self.clone();
        other.entries.remove(column);
        other
    }

    /// Empty every entry, keeping the keys.
    pub fn clear(&mut self) {
        for values in self.entries.values_mut() {
            values.clear();
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ValueSet)> {
        self.entries.iter().map(|(key, values)| (key.as_str(), values))
    }
}

/// Return indices of rows that pass all active column filters.
///
/// A row passes a column filter when its value at that key is one of the
/// selected values; it must pass every active column. With no active column
/// every index is returned.
pub fn filtered_indices(rows: &[Row], selection: &Selection) -> Vec<usize> {
    let mut active: Vec<(ColumnLocator<'_>, &ValueSet)> = selection
        .active()
        .map(|(key, values)| (ColumnLocator::new(key), values))
        .collect();

    if active.is_empty() {
        return (0..rows.len()).collect();
    }

    rows.iter()
        .enumerate()
        .filter(|(_, row)| {
            active.iter_mut().all(|(locator, selected)| {
                locator
                    .locate(row)
                    .is_some_and(|value| selected.contains(value))
            })
        })
        .map(|(i, _)| i)
        .collect()
}

/// Order-preserving subsequence of `rows` that passes `selection`.
pub fn apply<'a>(rows: &'a [Row], selection: &Selection) -> Vec<&'a Row> {
    if selection.is_unconstrained() {
        return rows.iter().collect();
    }
    filtered_indices(rows, selection)
        .into_iter()
        .map(|i| &rows[i])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::{infer_schema, parse_csv_text};

    fn mock_rows() -> Vec<Row> {
        parse_csv_text("number,mod3,mod4,mod5\n12,0,0,2\n24,0,0,4\n36,0,0,1")
    }

    fn selection(rows: &[Row], picks: &[(&str, &[i32])]) -> Selection {
        let mut sel = Selection::empty_for(&infer_schema(rows));
        for (col, vals) in picks {
            sel.set(col, vals.iter().map(|v| CellValue::from(*v)).collect());
        }
        sel
    }

    #[test]
    fn test_no_filters_returns_all() {
        let rows = mock_rows();
        let sel = selection(&rows, &[]);
        assert!(sel.is_unconstrained());
        let result = apply(&rows, &sel);
        assert_eq!(result, rows.iter().collect::<Vec<_>>());
    }

    #[test]
    fn test_single_filter() {
        let rows = mock_rows();
        let sel = selection(&rows, &[("number", &[12])]);
        assert_eq!(apply(&rows, &sel), vec![&rows[0]]);
    }

    #[test]
    fn test_multiple_filters_conjunctive() {
        let rows = mock_rows();
        let sel = selection(&rows, &[("mod3", &[0]), ("mod5", &[2, 4])]);
        assert_eq!(filtered_indices(&rows, &sel), vec![0, 1]);
    }

    #[test]
    fn test_no_match() {
        let rows = mock_rows();
        let sel = selection(&rows, &[("number", &[999])]);
        assert!(apply(&rows, &sel).is_empty());
    }

    #[test]
    fn test_kind_must_match() {
        let rows = mock_rows();
        let mut sel = selection(&rows, &[]);
        sel.set("number", [CellValue::from("12")].into());
        assert!(apply(&rows, &sel).is_empty());
    }

    #[test]
    fn test_unknown_column_excludes_everything() {
        let rows = mock_rows();
        let mut sel = selection(&rows, &[]);
        sel.set("nope", [CellValue::from(1)].into());
        assert!(filtered_indices(&rows, &sel).is_empty());
    }

    #[test]
    fn test_selection_helpers() {
        let rows = mock_rows();
        let mut sel = selection(&rows, &[("mod3", &[0]), ("mod5", &[2, 4])]);
        assert_eq!(sel.selected_count(), 3);
        assert!(sel.is_active("mod5"));
        assert!(!sel.is_active("mod4"));

        let other = sel.without("mod5");
        assert!(!other.contains_column("mod5"));
        assert!(sel.contains_column("mod5"));

        sel.clear();
        assert!(sel.is_unconstrained());
        assert_eq!(sel.iter().count(), 4);
    }
}
