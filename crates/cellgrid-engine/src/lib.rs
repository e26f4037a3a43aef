//! cellgrid_engine - Cell model, formulas, dependency graph and recalculation planning.

pub mod engine;
