//! Cross-filtering explorer for delimited tabular data.
//!
//! Selecting values in one column narrows the rows *and* the values offered
//! by every other column's filter. [`store::FilterStore`] keeps the filtered
//! rows and all option lists consistent with one selection snapshot.

pub mod config;
pub mod data;
pub mod debounce;
pub mod error;
pub mod pagination;
pub mod state;
pub mod store;

pub use data::filter::{apply, filtered_indices, Selection, ValueSet};
pub use data::loader::{infer_schema, parse_csv_text, parse_dataset};
pub use data::model::{CellValue, ColumnKind, ColumnSchema, Dataset, Row};
pub use data::options::{options_for, options_for_all, FilterOption, OptionLists};
pub use data::source::{DatasetProvider, DirectoryProvider, MemoryProvider};
pub use error::{ConfigError, FilterError, LoadError};
pub use pagination::{calculate_pagination, PageInfo};
pub use store::{DerivedView, FilterStore, Snapshot};
