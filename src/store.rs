//! The tabular CRUD mapper: frames in, SQL out, frames back.

use log::debug;
use rusqlite::{params_from_iter, types::Value as SqlValue, Connection};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::error::{DbError, Result};
use crate::frame::{Frame, Row};
use crate::sql::{self, ID_COLUMN};
use crate::value::Cell;

/// Key for a single-row read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKey<'a> {
    /// Match on the primary key, compared as text.
    Id(i64),
    /// Match on a named column's stored text value.
    Column { name: &'a str, value: &'a str },
}

/// Keys for a multi-row read; results follow the supplied order and may
/// repeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKeys<'a> {
    Ids(&'a [i64]),
    Column { name: &'a str, values: &'a [&'a str] },
}

/// Target of a single-row delete.
#[derive(Debug, Clone, Copy)]
pub enum RowMatch<'a> {
    /// A one-row frame; every column present contributes an equality
    /// condition, AND-combined.
    Frame(&'a Frame),
    /// Delete by primary key, compared as text.
    Id(i64),
}

/// Target of a multi-row delete.
#[derive(Debug, Clone, Copy)]
pub enum RowSet<'a> {
    /// One match-delete per row of the frame.
    Frame(&'a Frame),
    /// One delete per id.
    Ids(&'a [i64]),
}

/// CRUD mapper over one SQLite database file.
///
/// Every table it manages carries an implicit `"ID" INTEGER PRIMARY KEY`
/// assigned by the engine; all other columns are unbounded `TEXT`. Column
/// names must not contain spaces, commas, or quotes; this is a caller
/// obligation and is not enforced.
///
/// Each public operation opens a fresh connection to the file (creating it
/// if absent), runs its statements, and drops the connection before
/// returning. Statements outside the `_atomic` variants commit
/// independently, so a failing batch leaves earlier statements applied.
/// Every generated statement is logged at debug level before execution.
#[derive(Debug, Clone)]
pub struct FrameStore {
    db_path: PathBuf,
}

impl FrameStore {
    /// Creates a mapper over the database file at `db_path`. The file is
    /// not touched until the first operation.
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    /// Path of the underlying database file.
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    fn connect(&self) -> Result<Connection> {
        let conn = Connection::open(&self.db_path)?;
        Ok(conn)
    }

    fn execute(conn: &Connection, sql: &str, params: &[String]) -> Result<usize> {
        debug!("{sql} {params:?}");
        let changed = conn.execute(sql, params_from_iter(params.iter()))?;
        Ok(changed)
    }

    /// Creates (or replaces) a table shaped like `frame` and loads its
    /// rows.
    ///
    /// Any existing table of that name is dropped first, schema and data.
    /// An `ID` column in the input is discarded, since the engine assigns the
    /// primary key. Column names are whitespace-stripped.
    pub fn create_table(&self, table: &str, frame: &Frame) -> Result<()> {
        let mut frame = frame.clone();
        frame.strip_column_names();
        frame.drop_column(ID_COLUMN);
        let conn = self.connect()?;
        Self::execute(&conn, &sql::drop_table_if_exists(table), &[])?;
        Self::execute(&conn, &sql::create_table(table, &frame.column_names()), &[])?;
        Self::append_rows_on(&conn, table, &frame)
    }

    /// Bulk-loads all rows of `frame` into an existing table, preserving
    /// column order.
    ///
    /// Stripped column names must match the live schema, or the store
    /// rejects the insert. Rows commit one by one; a failure part-way
    /// leaves earlier rows loaded.
    pub fn append_table(&self, table: &str, frame: &Frame) -> Result<()> {
        let mut frame = frame.clone();
        frame.strip_column_names();
        let conn = self.connect()?;
        Self::append_rows_on(&conn, table, &frame)
    }

    fn append_rows_on(conn: &Connection, table: &str, frame: &Frame) -> Result<()> {
        if frame.width() == 0 {
            return Ok(());
        }
        let text = sql::insert(table, &frame.column_names());
        for row in frame.rows() {
            let values: Vec<String> = row.cells().map(|(_, cell)| cell.coerce()).collect();
            Self::execute(conn, &text, &values)?;
        }
        Ok(())
    }

    /// Unconditionally drops the table.
    pub fn drop_table(&self, table: &str) -> Result<()> {
        let conn = self.connect()?;
        Self::execute(&conn, &sql::drop_table(table), &[])?;
        Ok(())
    }

    /// Inserts exactly one row.
    ///
    /// The frame must hold a single row, otherwise a parameter failure is
    /// returned. Every cell goes through the coercion rule; values are
    /// bound as statement parameters.
    pub fn insert_row(&self, table: &str, frame: &Frame) -> Result<()> {
        let row = single_row(frame, "insert_row")?;
        let conn = self.connect()?;
        Self::insert_row_on(&conn, table, row)
    }

    fn insert_row_on(conn: &Connection, table: &str, row: Row<'_>) -> Result<()> {
        let mut names = Vec::new();
        let mut values = Vec::new();
        for (name, cell) in row.cells() {
            names.push(name);
            values.push(cell.coerce());
        }
        let text = sql::insert(table, &names);
        Self::execute(conn, &text, &values)?;
        Ok(())
    }

    /// Inserts every row of `frame`, one statement per row, committing
    /// each independently. Aborts on the first failure, leaving prior
    /// inserts applied.
    pub fn insert_rows(&self, table: &str, frame: &Frame) -> Result<()> {
        let conn = self.connect()?;
        for row in frame.rows() {
            Self::insert_row_on(&conn, table, row)?;
        }
        Ok(())
    }

    /// Like [`insert_rows`](Self::insert_rows) but wraps the whole batch
    /// in one transaction: all rows land or none do.
    pub fn insert_rows_atomic(&self, table: &str, frame: &Frame) -> Result<()> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        for row in frame.rows() {
            Self::insert_row_on(&tx, table, row)?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Updates cells of existing rows, matched by their `ID` value.
    ///
    /// The frame must contain an `ID` column. One `UPDATE` is issued per
    /// (row × non-`ID` column) pair, each committing independently;
    /// a failure aborts the remainder with earlier updates applied.
    pub fn update_cells(&self, table: &str, frame: &Frame) -> Result<()> {
        let conn = self.connect()?;
        Self::update_cells_on(&conn, table, frame)
    }

    /// Like [`update_cells`](Self::update_cells) but in one transaction.
    pub fn update_cells_atomic(&self, table: &str, frame: &Frame) -> Result<()> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        Self::update_cells_on(&tx, table, frame)?;
        tx.commit()?;
        Ok(())
    }

    fn update_cells_on(conn: &Connection, table: &str, frame: &Frame) -> Result<()> {
        if !frame.has_column(ID_COLUMN) {
            return Err(DbError::parameter(
                "update_cells requires an 'ID' column to match rows on",
            ));
        }
        for row in frame.rows() {
            let id = row
                .get(ID_COLUMN)
                .ok_or_else(|| DbError::parameter("row is missing its 'ID' cell"))?
                .coerce();
            for (name, cell) in row.cells() {
                if name == ID_COLUMN {
                    continue;
                }
                let text = sql::update_cell(table, name);
                Self::execute(conn, &text, &[cell.coerce(), id.clone()])?;
            }
        }
        Ok(())
    }

    /// Deletes rows matching the target: every row equal to the given
    /// one-row frame on all its columns, or the row(s) with the given id.
    pub fn remove_row(&self, table: &str, target: RowMatch<'_>) -> Result<()> {
        let conn = self.connect()?;
        match target {
            RowMatch::Frame(frame) => {
                let row = single_row(frame, "remove_row")?;
                Self::delete_by_match_on(&conn, table, &row)
            }
            RowMatch::Id(id) => Self::delete_by_id_on(&conn, table, id),
        }
    }

    /// Deletes a set of rows: one match-delete per frame row, or one
    /// delete per id. Statements commit independently and abort on the
    /// first failure.
    pub fn remove_rows(&self, table: &str, set: RowSet<'_>) -> Result<()> {
        let conn = self.connect()?;
        Self::remove_rows_on(&conn, table, set)
    }

    /// Like [`remove_rows`](Self::remove_rows) but in one transaction.
    pub fn remove_rows_atomic(&self, table: &str, set: RowSet<'_>) -> Result<()> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        Self::remove_rows_on(&tx, table, set)?;
        tx.commit()?;
        Ok(())
    }

    fn remove_rows_on(conn: &Connection, table: &str, set: RowSet<'_>) -> Result<()> {
        match set {
            RowSet::Frame(frame) => {
                for row in frame.rows() {
                    Self::delete_by_match_on(conn, table, &row)?;
                }
            }
            RowSet::Ids(ids) => {
                for &id in ids {
                    Self::delete_by_id_on(conn, table, id)?;
                }
            }
        }
        Ok(())
    }

    fn delete_by_match_on(conn: &Connection, table: &str, row: &Row<'_>) -> Result<()> {
        let (names, values) = match_conditions(row);
        let text = sql::delete_where_eq(table, &names);
        Self::execute(conn, &text, &values)?;
        Ok(())
    }

    fn delete_by_id_on(conn: &Connection, table: &str, id: i64) -> Result<()> {
        let text = sql::delete_where_eq(table, &[ID_COLUMN]);
        Self::execute(conn, &text, &[id.to_string()])?;
        Ok(())
    }

    /// Reads the whole table back as a frame, with the `ID` column
    /// mirrored into the row labels.
    pub fn get_table(&self, table: &str) -> Result<Frame> {
        let conn = self.connect()?;
        Self::query_frame(&conn, &sql::select_all(table), &[])
    }

    /// Reads the whole table as a plain column-name to value-list mapping.
    pub fn get_table_map(&self, table: &str) -> Result<HashMap<String, Vec<String>>> {
        Ok(self.get_table(table)?.to_map())
    }

    /// Reads several tables, keyed by name.
    pub fn get_tables(&self, tables: &[&str]) -> Result<HashMap<String, Frame>> {
        tables
            .iter()
            .map(|&name| Ok((name.to_string(), self.get_table(name)?)))
            .collect()
    }

    /// Reads the row(s) matching `key`, compared as text.
    ///
    /// Zero matches yield an empty frame, never an error.
    pub fn get_row(&self, table: &str, key: RowKey<'_>) -> Result<Frame> {
        let conn = self.connect()?;
        Self::get_row_on(&conn, table, key)
    }

    /// Reads the rows matching each key in order and stacks the results;
    /// a repeated key repeats its rows.
    ///
    /// An empty key list yields the table's columns with zero rows, the
    /// same shape a zero-match key produces.
    pub fn get_rows(&self, table: &str, keys: RowKeys<'_>) -> Result<Frame> {
        let conn = self.connect()?;
        let mut parts = Vec::new();
        match keys {
            RowKeys::Ids(ids) => {
                for &id in ids {
                    parts.push(Self::get_row_on(&conn, table, RowKey::Id(id))?);
                }
            }
            RowKeys::Column { name, values } => {
                for &value in values {
                    parts.push(Self::get_row_on(&conn, table, RowKey::Column { name, value })?);
                }
            }
        }
        if parts.is_empty() {
            return Self::query_frame(&conn, &sql::select_none(table), &[]);
        }
        Frame::concat(parts)
    }

    fn get_row_on(conn: &Connection, table: &str, key: RowKey<'_>) -> Result<Frame> {
        let (column, value) = match key {
            RowKey::Id(id) => (ID_COLUMN, id.to_string()),
            RowKey::Column { name, value } => (name, value.to_string()),
        };
        Self::query_frame(conn, &sql::select_where_eq(table, column), &[value])
    }

    fn query_frame(conn: &Connection, text: &str, params: &[String]) -> Result<Frame> {
        debug!("{text} {params:?}");
        let mut stmt = conn.prepare(text)?;
        let names: Vec<String> = stmt
            .column_names()
            .iter()
            .map(|n| n.to_string())
            .collect();
        let mut frame = Frame::new();
        for name in &names {
            frame = frame.with_column(name.clone(), Vec::<Cell>::new())?;
        }
        let mut rows = stmt.query(params_from_iter(params.iter()))?;
        while let Some(row) = rows.next()? {
            let mut cells = Vec::with_capacity(names.len());
            for i in 0..names.len() {
                let value: SqlValue = row.get(i)?;
                cells.push(Cell::Text(sql_value_to_text(value)));
            }
            frame.push_row(cells)?;
        }
        if frame.has_column(ID_COLUMN) {
            frame.set_labels_from(ID_COLUMN)?;
        }
        Ok(frame)
    }
}

fn single_row<'f>(frame: &'f Frame, operation: &str) -> Result<Row<'f>> {
    if frame.len() != 1 {
        return Err(DbError::parameter(format!(
            "{operation} requires exactly one row, got {}",
            frame.len()
        )));
    }
    frame
        .row(0)
        .ok_or_else(|| DbError::parameter(format!("{operation} requires exactly one row")))
}

/// Equality conditions for a match-delete: one per column of the row,
/// with duplicate (column, value) pairs collapsed to a single condition.
fn match_conditions<'f>(row: &Row<'f>) -> (Vec<&'f str>, Vec<String>) {
    let mut seen = HashSet::new();
    let mut names = Vec::new();
    let mut values = Vec::new();
    for (name, cell) in row.cells() {
        let value = cell.coerce();
        if seen.insert((name, value.clone())) {
            names.push(name);
            values.push(value);
        }
    }
    (names, values)
}

/// All non-key storage is TEXT; integers come back only from `ID`. NULL
/// (never written by the mapper itself) reads as empty text.
fn sql_value_to_text(value: SqlValue) -> String {
    match value {
        SqlValue::Null => String::new(),
        SqlValue::Integer(i) => i.to_string(),
        SqlValue::Real(f) => f.to_string(),
        SqlValue::Text(s) => s,
        SqlValue::Blob(_) => String::new(),
    }
}
