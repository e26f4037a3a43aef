//! cellgrid-core - Sheet model, edit protocol and storage.

pub mod error;
pub mod sheet;
pub mod storage;

pub use error::{GridError, Result};
pub use sheet::{DEFAULT_VERSION, Sheet, UndoAction};

pub use cellgrid_engine::engine::{CellContent, CellValue, NamePolicy};
