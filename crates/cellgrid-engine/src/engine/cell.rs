//! Cell data structures.
//!
//! - [`CellContent`] - What the user entered: a number, text, or a formula
//! - [`CellValue`] - What a read returns: a number, text, or an evaluation error
//! - [`Cell`] - Stored content plus the cached result for formula cells

use std::fmt;

use super::eval::EvalError;
use super::format::{format_number, format_number_with};
use super::formula::{Formula, FormulaError};
use super::name::NamePolicy;

/// The content of a cell, as entered.
#[derive(Clone, Debug, PartialEq)]
pub enum CellContent {
    Number(f64),
    Text(String),
    Formula(Formula),
}

impl CellContent {
    /// Classify raw input.
    /// - Parses as a finite number (surrounding whitespace ignored) -> Number
    /// - Starts with '=' -> Formula (the rest must parse)
    /// - Otherwise -> Text, verbatim; the empty string means "no content"
    pub fn from_input(input: &str, policy: &NamePolicy) -> Result<CellContent, FormulaError> {
        if let Ok(n) = input.trim().parse::<f64>()
            && n.is_finite()
        {
            return Ok(CellContent::Number(n));
        }

        if let Some(formula) = input.strip_prefix('=') {
            return Formula::parse(formula, policy).map(CellContent::Formula);
        }

        Ok(CellContent::Text(input.to_string()))
    }

    /// True for the empty text, which is never stored.
    pub fn is_empty(&self) -> bool {
        matches!(self, CellContent::Text(s) if s.is_empty())
    }

    /// Names this content references; empty unless it is a formula.
    pub fn references(&self) -> &[String] {
        match self {
            CellContent::Formula(f) => f.references(),
            CellContent::Number(_) | CellContent::Text(_) => &[],
        }
    }

    /// Raw input that classifies back to this content.
    pub fn to_input_string(&self) -> String {
        match self {
            CellContent::Number(n) => n.to_string(),
            CellContent::Text(s) => s.clone(),
            CellContent::Formula(f) => format!("={}", f),
        }
    }
}

impl Default for CellContent {
    fn default() -> Self {
        CellContent::Text(String::new())
    }
}

/// The value of a cell, as read.
#[derive(Clone, Debug, PartialEq)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Error(EvalError),
}

impl CellValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(_) | CellValue::Error(_) => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, CellValue::Error(_))
    }

    /// Display string with `decimals` digits for non-integral numbers.
    pub fn to_display_string(&self, decimals: usize) -> String {
        match self {
            CellValue::Number(n) => format_number_with(*n, decimals),
            other => other.to_string(),
        }
    }
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Text(String::new())
    }
}

impl From<Result<f64, EvalError>> for CellValue {
    fn from(result: Result<f64, EvalError>) -> Self {
        match result {
            Ok(n) => CellValue::Number(n),
            Err(e) => CellValue::Error(e),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(n) => f.write_str(&format_number(*n)),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Error(e) => f.write_str(e.marker()),
        }
    }
}

/// A stored cell.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    pub content: CellContent,
    /// Result of the latest evaluation pass; only ever set for formulas.
    pub cached: Option<Result<f64, EvalError>>,
}

impl Cell {
    pub fn new(content: CellContent) -> Cell {
        Cell {
            content,
            cached: None,
        }
    }

    pub fn new_number(n: f64) -> Cell {
        Cell::new(CellContent::Number(n))
    }

    pub fn new_text(text: &str) -> Cell {
        Cell::new(CellContent::Text(text.to_string()))
    }

    pub fn new_formula(formula: Formula) -> Cell {
        Cell::new(CellContent::Formula(formula))
    }

    pub fn formula(&self) -> Option<&Formula> {
        match &self.content {
            CellContent::Formula(f) => Some(f),
            CellContent::Number(_) | CellContent::Text(_) => None,
        }
    }

    /// The value a read returns, if it can be produced without evaluating.
    ///
    /// `None` means the cell is a formula without a cached result.
    pub fn stored_value(&self) -> Option<CellValue> {
        match &self.content {
            CellContent::Number(n) => Some(CellValue::Number(*n)),
            CellContent::Text(s) => Some(CellValue::Text(s.clone())),
            CellContent::Formula(_) => self.cached.clone().map(CellValue::from),
        }
    }

    /// The number other formulas see when they reference this cell.
    pub fn numeric_value(&self) -> Option<f64> {
        match (&self.content, &self.cached) {
            (CellContent::Number(n), _) => Some(*n),
            (CellContent::Formula(_), Some(Ok(n))) => Some(*n),
            _ => None,
        }
    }
}
