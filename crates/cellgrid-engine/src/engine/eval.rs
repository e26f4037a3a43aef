//! Formula evaluation.
//!
//! Walks a parsed [`Formula`]'s expression tree. Cell values are obtained
//! through a caller-supplied lookup, so evaluation never touches the grid
//! directly and cannot mutate it.

use thiserror::Error;

use super::formula::{Expr, Formula, Op};

/// Why a formula could not be reduced to a number.
///
/// This is a value, not a fault: it is cached on the cell and flows into any
/// formula that reads the cell.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    #[error("division by zero")]
    DivisionByZero,

    /// The referenced cell is empty, holds text, or holds an errored formula.
    #[error("'{0}' does not hold a number")]
    UnresolvedReference(String),

    #[error("result is not a finite number")]
    NonFinite,
}

impl EvalError {
    /// Short marker shown in place of a value.
    pub fn marker(&self) -> &'static str {
        match self {
            EvalError::DivisionByZero => "#DIV/0!",
            EvalError::UnresolvedReference(_) => "#VALUE!",
            EvalError::NonFinite => "#NUM!",
        }
    }
}

/// Evaluate `formula`, resolving each referenced name through `lookup`.
///
/// `lookup` returns `None` when the name does not hold a number.
pub fn evaluate<F>(formula: &Formula, lookup: F) -> Result<f64, EvalError>
where
    F: Fn(&str) -> Option<f64>,
{
    let value = eval_expr(formula.expr(), &lookup)?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EvalError::NonFinite)
    }
}

fn eval_expr<F>(expr: &Expr, lookup: &F) -> Result<f64, EvalError>
where
    F: Fn(&str) -> Option<f64>,
{
    match expr {
        Expr::Number(n) => Ok(*n),
        Expr::Ref(name) => lookup(name).ok_or_else(|| EvalError::UnresolvedReference(name.clone())),
        Expr::Neg(inner) => Ok(-eval_expr(inner, lookup)?),
        Expr::Binary { op, left, right } => {
            let l = eval_expr(left, lookup)?;
            let r = eval_expr(right, lookup)?;
            match op {
                Op::Add => Ok(l + r),
                Op::Sub => Ok(l - r),
                Op::Mul => Ok(l * r),
                Op::Div => {
                    if r == 0.0 {
                        Err(EvalError::DivisionByZero)
                    } else {
                        Ok(l / r)
                    }
                }
            }
        }
    }
}
