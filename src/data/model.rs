use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use serde::{Serialize, Serializer};

// ---------------------------------------------------------------------------
// CellValue – a single cell of a row
// ---------------------------------------------------------------------------

/// A cell value: either numeric or textual.
///
/// Equality is by kind and value, so `Number(0.0)` never equals `Text("0")`.
/// Selections live in `BTreeSet`s downstream, so `CellValue` must be `Ord`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number(f64),
    Text(String),
}

impl CellValue {
    /// Build a numeric cell. `-0.0` collapses to `0.0` so both spellings
    /// land on the same filter option.
    pub fn number(v: f64) -> Self {
        CellValue::Number(if v == 0.0 { 0.0 } else { v })
    }

    /// Interpret an already trimmed field: finite numbers become
    /// [`CellValue::Number`], everything else is kept verbatim as text.
    pub fn parse(field: &str) -> Self {
        match field.parse::<f64>() {
            Ok(v) if v.is_finite() => CellValue::number(v),
            _ => CellValue::Text(field.to_string()),
        }
    }

    pub fn kind(&self) -> ColumnKind {
        match self {
            CellValue::Number(_) => ColumnKind::Number,
            CellValue::Text(_) => ColumnKind::Text,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(v) => Some(*v),
            CellValue::Text(_) => None,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, CellValue::Number(_))
    }
}

// -- Manual Eq/Ord so we can put CellValue in BTreeSet --

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (CellValue::Number(a), CellValue::Number(b)) => a.total_cmp(b),
            (CellValue::Text(a), CellValue::Text(b)) => a.cmp(b),
            (CellValue::Number(_), CellValue::Text(_)) => Ordering::Less,
            (CellValue::Text(_), CellValue::Number(_)) => Ordering::Greater,
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::Number(v) => v.to_bits().hash(state),
            CellValue::Text(s) => s.hash(state),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(v) => write_number(f, *v),
            CellValue::Text(s) => write!(f, "{s}"),
        }
    }
}

/// Plain decimal inside `[1e-6, 1e21)`, exponent form with an explicit sign
/// outside it (`1e+21`, `1.5e-7`).
fn write_number(f: &mut fmt::Formatter<'_>, v: f64) -> fmt::Result {
    let magnitude = v.abs();
    if v == 0.0 || (1e-6..1e21).contains(&magnitude) {
        return write!(f, "{v}");
    }
    let formatted = format!("{v:e}");
    match formatted.split_once('e') {
        Some((mantissa, exp)) if !exp.starts_with('-') => write!(f, "{mantissa}e+{exp}"),
        _ => f.write_str(&formatted),
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::Number(v) => serializer.serialize_f64(*v),
            CellValue::Text(s) => serializer.serialize_str(s),
        }
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::number(v)
    }
}

impl From<i32> for CellValue {
    fn from(v: i32) -> Self {
        CellValue::number(f64::from(v))
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

// ---------------------------------------------------------------------------
// Row – one data record
// ---------------------------------------------------------------------------

/// One parsed record. Keys are shared with every other row of the same
/// dataset and kept in header order.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<CellValue>,
}

impl Row {
    /// `values` must line up with `columns`; the parser guarantees it by
    /// dropping lines whose field count differs from the header.
    pub fn new(columns: Arc<[String]>, values: Vec<CellValue>) -> Self {
        debug_assert_eq!(columns.len(), values.len());
        Row { columns, values }
    }

    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.position(key).and_then(|i| self.values.get(i))
    }

    pub fn position(&self, key: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(String::as_str)
    }

    pub fn values(&self) -> &[CellValue] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.keys().zip(self.values.iter())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub(crate) fn shares_header(&self, header: &Arc<[String]>) -> bool {
        Arc::ptr_eq(&self.columns, header)
    }

    pub(crate) fn header(&self) -> &Arc<[String]> {
        &self.columns
    }
}

/// Resolves one column key against rows, caching the position per header.
///
/// Rows of a parsed dataset all share one header allocation, so the linear
/// key search runs once per scan instead of once per row.
pub(crate) struct ColumnLocator<'k> {
    key: &'k str,
    header: Option<Arc<[String]>>,
    position: Option<usize>,
}

impl<'k> ColumnLocator<'k> {
    pub(crate) fn new(key: &'k str) -> Self {
        ColumnLocator {
            key,
            header: None,
            position: None,
        }
    }

    pub(crate) fn locate<'r>(&mut self, row: &'r Row) -> Option<&'r CellValue> {
        let cached = matches!(&self.header, Some(h) if row.shares_header(h));
        if !cached {
            self.position = row.position(self.key);
            self.header = Some(Arc::clone(row.header()));
        }
        self.position.and_then(|i| row.values.get(i))
    }
}

// ---------------------------------------------------------------------------
// ColumnSchema – inferred per-column metadata
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Number,
    #[serde(rename = "string")]
    Text,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKind::Number => write!(f, "number"),
            ColumnKind::Text => write!(f, "string"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSchema {
    pub key: String,
    pub kind: ColumnKind,
}

impl ColumnSchema {
    pub fn new(key: impl Into<String>, kind: ColumnKind) -> Self {
        ColumnSchema {
            key: key.into(),
            kind,
        }
    }

    /// Display label, derived from the key on every call.
    pub fn label(&self) -> String {
        column_label(&self.key)
    }

    pub fn is_numeric(&self) -> bool {
        self.kind == ColumnKind::Number
    }
}

/// Capitalise the first character, leave the rest untouched (`mod3` → `Mod3`).
pub fn column_label(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// Parsed rows plus the schema inferred from them. Immutable once built;
/// a reload replaces the whole value.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub columns: Vec<ColumnSchema>,
    pub rows: Vec<Row>,
}

impl Dataset {
    /// Infer the schema from the rows and bundle both.
    pub fn from_rows(rows: Vec<Row>) -> Self {
        let columns = super::loader::infer_schema(&rows);
        Dataset { columns, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column(&self, key: &str) -> Option<&ColumnSchema> {
        self.columns.iter().find(|c| c.key == key)
    }

    pub fn column_keys(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.key.as_str())
    }
}
