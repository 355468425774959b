//! Table data model: rows, row kinds and column width fractions.

use crate::error::{Error, Result};
use indexmap::IndexMap;

/// How a row is styled. Decided by the data provider, never by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowKind {
    /// Plain bordered row
    #[default]
    Normal,
    /// Shaded, bold subtotal row (the "cases" rows of the sales report)
    Emphasized,
    /// Shaded, bold closing total row
    Total,
}

impl RowKind {
    /// Classify a row by its key column value.
    ///
    /// Rows whose key equals `sentinel` are emphasized; everything else is
    /// normal. Total rows are marked by position, see [`RowOptions`].
    ///
    /// [`RowOptions`]: crate::layout::RowOptions
    pub fn classify(key_value: &str, sentinel: &str) -> Self {
        if key_value == sentinel {
            RowKind::Emphasized
        } else {
            RowKind::Normal
        }
    }
}

/// One table row: column label to display string, in column order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    /// Styling kind
    pub kind: RowKind,
    /// Ordered cells
    pub cells: IndexMap<String, String>,
}

impl Row {
    /// Create a row from (label, value) pairs.
    pub fn new<K, V>(kind: RowKind, cells: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            kind,
            cells: cells
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Create a normal row.
    pub fn normal<K, V>(cells: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self::new(RowKind::Normal, cells)
    }

    /// Create an emphasized row.
    pub fn emphasized<K, V>(cells: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self::new(RowKind::Emphasized, cells)
    }

    /// Change the row kind.
    pub fn with_kind(mut self, kind: RowKind) -> Self {
        self.kind = kind;
        self
    }

    /// Value of a column, if present.
    pub fn get(&self, label: &str) -> Option<&str> {
        self.cells.get(label).map(String::as_str)
    }

    /// Column labels in order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True when the row has no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Column width fractions of the usable page width.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    fractions: Vec<f32>,
}

/// Slack allowed when checking that fractions sum to at most 1.0.
const FRACTION_TOLERANCE: f32 = 1e-4;

impl ColumnSpec {
    /// Create a column spec. Each fraction must be positive and finite, and
    /// together they must not exceed the usable width.
    pub fn new(fractions: Vec<f32>) -> Result<Self> {
        if fractions.is_empty() {
            return Err(Error::InvalidColumnSpec("no columns".to_string()));
        }
        if let Some((i, f)) = fractions
            .iter()
            .enumerate()
            .find(|(_, f)| !f.is_finite() || **f <= 0.0)
        {
            return Err(Error::InvalidColumnSpec(format!(
                "column {} has fraction {}",
                i, f
            )));
        }
        let sum: f32 = fractions.iter().sum();
        if sum > 1.0 + FRACTION_TOLERANCE {
            return Err(Error::InvalidColumnSpec(format!(
                "fractions sum to {:.4}, more than the usable width",
                sum
            )));
        }
        Ok(Self { fractions })
    }

    /// Equal widths spanning the whole usable width.
    pub fn even(columns: usize) -> Result<Self> {
        if columns == 0 {
            return Err(Error::InvalidColumnSpec("no columns".to_string()));
        }
        Self::new(vec![1.0 / columns as f32; columns])
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.fractions.len()
    }

    /// Always false; a spec has at least one column.
    pub fn is_empty(&self) -> bool {
        self.fractions.is_empty()
    }

    /// The fractions.
    pub fn fractions(&self) -> &[f32] {
        &self.fractions
    }

    /// Absolute column widths for a usable width.
    pub fn widths(&self, usable_width: f32) -> Vec<f32> {
        self.fractions.iter().map(|f| usable_width * f).collect()
    }
}

/// Check a batch of rows against the column layout.
///
/// The first row's labels are the header; every row must carry exactly those
/// labels and their count must match the column count. Returns the header.
pub fn validate_rows(rows: &[Row], columns: &ColumnSpec) -> Result<Vec<String>> {
    let first = rows.first().ok_or(Error::EmptyTable)?;
    let header: Vec<String> = first.cells.keys().cloned().collect();
    check_row(0, first, &header, columns)?;
    for (i, row) in rows.iter().enumerate().skip(1) {
        check_row(i, row, &header, columns)?;
    }
    Ok(header)
}

fn check_row(index: usize, row: &Row, header: &[String], columns: &ColumnSpec) -> Result<()> {
    if let Some(missing) = header.iter().find(|label| !row.cells.contains_key(*label)) {
        return Err(Error::DataShapeMismatch {
            row: index,
            reason: format!("missing column '{}'", missing),
        });
    }
    if row.len() != header.len() {
        let extra = row
            .labels()
            .find(|label| !header.iter().any(|h| h == label))
            .unwrap_or_default();
        return Err(Error::DataShapeMismatch {
            row: index,
            reason: format!("unexpected column '{}'", extra),
        });
    }
    if row.len() != columns.len() {
        return Err(Error::DataShapeMismatch {
            row: index,
            reason: format!(
                "{} values for {} column widths",
                row.len(),
                columns.len()
            ),
        });
    }
    Ok(())
}
