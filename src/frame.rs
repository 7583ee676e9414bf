//! In-memory tabular data: ordered named columns over labelled rows.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{DbError, Result};
use crate::value::Cell;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Column {
    name: String,
    cells: Vec<Cell>,
}

/// An ordered collection of named columns holding an ordered sequence of
/// rows, each carrying a string label.
///
/// Labels default to the positional index rendered as text. Frames read
/// back from the store carry the `ID` column duplicated into the labels,
/// so label-based access round-trips against the primary key.
///
/// Frames are both the write input (rows to persist) and the read output
/// of a [`FrameStore`](crate::FrameStore).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    columns: Vec<Column>,
    labels: Vec<String>,
}

impl Frame {
    /// Creates an empty frame with no columns and no rows.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a named column with the given cells.
    ///
    /// The first column fixes the row count and assigns positional labels;
    /// every later column must have the same length.
    pub fn with_column<C>(
        mut self,
        name: impl Into<String>,
        cells: impl IntoIterator<Item = C>,
    ) -> Result<Self>
    where
        C: Into<Cell>,
    {
        let name = name.into();
        let cells: Vec<Cell> = cells.into_iter().map(Into::into).collect();
        if self.columns.is_empty() {
            self.labels = (0..cells.len()).map(|i| i.to_string()).collect();
        } else if cells.len() != self.labels.len() {
            return Err(DbError::parameter(format!(
                "column '{}' has {} cells but the frame has {} rows",
                name,
                cells.len(),
                self.labels.len()
            )));
        }
        self.columns.push(Column { name, cells });
        Ok(self)
    }

    /// Builds a frame from a column-name to value-list mapping.
    ///
    /// Column order follows the sorted names, since the mapping itself
    /// carries none.
    pub fn from_map(map: &HashMap<String, Vec<String>>) -> Result<Self> {
        let mut names: Vec<&String> = map.keys().collect();
        names.sort();
        let mut frame = Self::new();
        for name in names {
            frame = frame.with_column(name.clone(), map[name].iter().cloned())?;
        }
        Ok(frame)
    }

    /// Renders the frame as a column-name to coerced-value-list mapping.
    pub fn to_map(&self) -> HashMap<String, Vec<String>> {
        self.columns
            .iter()
            .map(|col| {
                let values = col.cells.iter().map(Cell::coerce).collect();
                (col.name.clone(), values)
            })
            .collect()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// True when the frame holds no rows.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Column names in declaration order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// True when a column of that exact name exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    /// Cells of the named column, in row order.
    pub fn column(&self, name: &str) -> Option<&[Cell]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.cells.as_slice())
    }

    /// Row labels, in row order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Appends one row; cells must match the column count and order.
    pub fn push_row<C>(&mut self, cells: impl IntoIterator<Item = C>) -> Result<()>
    where
        C: Into<Cell>,
    {
        let cells: Vec<Cell> = cells.into_iter().map(Into::into).collect();
        if cells.len() != self.columns.len() {
            return Err(DbError::parameter(format!(
                "row has {} cells but the frame has {} columns",
                cells.len(),
                self.columns.len()
            )));
        }
        self.labels.push(self.labels.len().to_string());
        for (col, cell) in self.columns.iter_mut().zip(cells) {
            col.cells.push(cell);
        }
        Ok(())
    }

    /// Copies the named column's coerced values into the row labels.
    ///
    /// Used after a read to mirror `ID` into the labels.
    pub fn set_labels_from(&mut self, column: &str) -> Result<()> {
        let cells = self.column(column).ok_or_else(|| {
            DbError::parameter(format!("no column '{column}' to take labels from"))
        })?;
        self.labels = cells.iter().map(Cell::coerce).collect();
        Ok(())
    }

    /// Renames columns by stripping leading/trailing whitespace.
    pub(crate) fn strip_column_names(&mut self) {
        for col in &mut self.columns {
            col.name = col.name.trim().to_string();
        }
    }

    /// Drops the named column if present; a no-op otherwise.
    pub(crate) fn drop_column(&mut self, name: &str) {
        self.columns.retain(|c| c.name != name);
    }

    /// The row at a position, if in range.
    pub fn row(&self, idx: usize) -> Option<Row<'_>> {
        (idx < self.len()).then_some(Row { frame: self, idx })
    }

    /// Iterates rows in order.
    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        (0..self.len()).map(move |idx| Row { frame: self, idx })
    }

    /// The first row carrying the given label.
    pub fn row_by_label(&self, label: &str) -> Option<Row<'_>> {
        self.rows().find(|r| r.label() == label)
    }

    /// All rows carrying the given label, as a new frame.
    pub fn select_by_label(&self, label: &str) -> Frame {
        self.filter(|row| row.label() == label)
    }

    /// Rows satisfying the predicate, as a new frame. Labels are kept.
    pub fn filter(&self, pred: impl Fn(&Row<'_>) -> bool) -> Frame {
        let keep: Vec<usize> = self
            .rows()
            .filter(|row| pred(row))
            .map(|row| row.idx)
            .collect();
        let columns = self
            .columns
            .iter()
            .map(|col| Column {
                name: col.name.clone(),
                cells: keep.iter().map(|&i| col.cells[i].clone()).collect(),
            })
            .collect();
        let labels = keep.iter().map(|&i| self.labels[i].clone()).collect();
        Frame { columns, labels }
    }

    /// Vertically concatenates same-shaped frames, preserving row order
    /// and labels.
    ///
    /// Every part must declare the same columns in the same order; zero
    /// parts yield an empty frame.
    pub fn concat(parts: impl IntoIterator<Item = Frame>) -> Result<Frame> {
        let mut out: Option<Frame> = None;
        for part in parts {
            match &mut out {
                None => out = Some(part),
                Some(acc) => {
                    if acc.column_names() != part.column_names() {
                        return Err(DbError::parameter(format!(
                            "cannot concat frames with columns {:?} and {:?}",
                            acc.column_names(),
                            part.column_names()
                        )));
                    }
                    acc.labels.extend(part.labels);
                    for (dst, src) in acc.columns.iter_mut().zip(part.columns) {
                        dst.cells.extend(src.cells);
                    }
                }
            }
        }
        Ok(out.unwrap_or_default())
    }
}

/// A borrowed view of one frame row.
#[derive(Debug, Clone, Copy)]
pub struct Row<'f> {
    frame: &'f Frame,
    idx: usize,
}

impl<'f> Row<'f> {
    /// The row's label.
    pub fn label(&self) -> &'f str {
        &self.frame.labels[self.idx]
    }

    /// The cell under the named column, if the column exists.
    pub fn get(&self, column: &str) -> Option<&'f Cell> {
        self.frame
            .columns
            .iter()
            .find(|c| c.name == column)
            .map(|c| &c.cells[self.idx])
    }

    /// Iterates `(column name, cell)` pairs in column order.
    pub fn cells(&self) -> impl Iterator<Item = (&'f str, &'f Cell)> {
        let idx = self.idx;
        self.frame
            .columns
            .iter()
            .map(move |c| (c.name.as_str(), &c.cells[idx]))
    }

    /// Copies this row into a one-row frame, keeping its label.
    pub fn to_frame(&self) -> Frame {
        let columns = self
            .frame
            .columns
            .iter()
            .map(|col| Column {
                name: col.name.clone(),
                cells: vec![col.cells[self.idx].clone()],
            })
            .collect();
        Frame {
            columns,
            labels: vec![self.label().to_string()],
        }
    }
}
