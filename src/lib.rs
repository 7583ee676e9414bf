//! Frame-oriented CRUD mapper for SQLite.
//!
//! # Intention
//!
//! - Map in-memory tabular data ([`Frame`]) onto tables in a SQLite file.
//! - Generate DDL/DML from table-shaped input and decode query results
//!   back into frames, with one textual storage representation for every
//!   non-key cell.
//!
//! # Architectural Boundaries
//!
//! - Only the mapping layer belongs here: statement generation, value
//!   coercion, result reconstruction, and per-operation session handling.
//! - The engine itself (`rusqlite`) stays behind [`FrameStore`]; callers
//!   never see a connection.

pub mod error;
pub mod frame;
mod sql;
pub mod store;
pub mod value;

pub use error::{DbError, Result};
pub use frame::{Frame, Row};
pub use store::{FrameStore, RowKey, RowKeys, RowMatch, RowSet};
pub use value::Cell;
