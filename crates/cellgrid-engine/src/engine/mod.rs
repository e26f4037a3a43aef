//! Spreadsheet engine API.
//!
//! This module provides the core computation engine for the grid:
//!
//! - [`Cell`], [`CellContent`], [`CellValue`] - Data structures for cell storage
//! - [`is_valid_name`], [`NamePolicy`] - Cell name grammar and normalization
//! - [`Formula`] - Parsed formulas and the names they reference
//! - [`evaluate`] - Arithmetic evaluation against a cell lookup
//! - [`DependencyGraph`] - Who-references-whom, in both directions
//! - [`recalculation_order`] - Evaluation order and circular dependency detection
//! - [`format_number`] - Format values for display

mod cell;
mod eval;
mod format;
mod formula;
mod graph;
mod name;
mod plan;

pub use cell::{Cell, CellContent, CellValue};
pub use eval::{EvalError, evaluate};
pub use format::{DEFAULT_DECIMALS, format_number, format_number_with};
pub use formula::{Expr, Formula, FormulaError, Op};
pub use graph::DependencyGraph;
pub use name::{NamePolicy, is_valid_name};
pub use plan::{CycleError, DependentsView, PlannedEdit, recalculation_order};
