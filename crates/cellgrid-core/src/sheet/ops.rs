use super::state::MAX_UNDO_STACK;
use super::{Sheet, UndoAction};
use crate::error::{GridError, Result};
use cellgrid_engine::engine::{
    Cell, CellContent, CellValue, Formula, PlannedEdit, evaluate, recalculation_order,
};
use log::{debug, trace, warn};
use std::collections::BTreeSet;

impl Sheet {
    /// Set a cell from raw input and recalculate everything that depends on it.
    ///
    /// Returns the cells that were affected, in evaluation order: the edited
    /// cell first, then each direct or indirect dependent after all of its
    /// dependees. On error nothing has changed.
    pub fn set_contents(&mut self, name: &str, input: &str) -> Result<Vec<String>> {
        let (name, before, order) = self.apply_edit(name, input)?;

        let after = self.content(&name).to_input_string();
        self.undo_stack.push(UndoAction {
            name,
            before,
            after,
        });
        self.redo_stack.clear();
        if self.undo_stack.len() > MAX_UNDO_STACK {
            self.undo_stack.remove(0);
        }

        Ok(order)
    }

    /// Validate, plan, then commit one edit. Returns the normalized name, the
    /// previous raw content and the recalculation order.
    fn apply_edit(&mut self, name: &str, input: &str) -> Result<(String, String, Vec<String>)> {
        let name = self
            .policy
            .resolve(name)
            .ok_or_else(|| GridError::InvalidName(name.to_string()))?;
        let content = CellContent::from_input(input, &self.policy).map_err(|source| {
            GridError::MalformedFormula {
                name: name.clone(),
                source,
            }
        })?;

        // Plan against the graph as it would be after the edit; nothing is
        // mutated until the plan succeeds.
        let edit = PlannedEdit::new(&self.graph, &name, content.references().iter().cloned());
        let order = match recalculation_order(&edit, &name) {
            Ok(order) => order,
            Err(cycle) => {
                warn!("rejected edit of {}: {}", name, cycle);
                return Err(GridError::CircularDependency(cycle));
            }
        };
        let dependees = edit.into_dependees();

        let before = self.content(&name).to_input_string();
        self.graph.replace_dependees(&name, &dependees);
        if content.is_empty() {
            self.cells.remove(&name);
        } else {
            self.cells.insert(name.clone(), Cell::new(content));
        }
        self.recalculate(&order);
        self.modified = true;

        debug!("set {} -> recalculated {:?}", name, order);
        Ok((name, before, order))
    }

    /// Re-evaluate every formula cell in `order`, caching each result.
    fn recalculate(&mut self, order: &[String]) {
        for name in order {
            let Some(formula) = self.cells.get(name).and_then(Cell::formula) else {
                continue;
            };
            let result = evaluate(formula, |n| self.lookup(n));
            trace!("evaluated {} = {:?}", name, result);
            if let Some(cell) = self.cells.get_mut(name) {
                cell.cached = Some(result);
            }
        }
    }

    /// The number a formula sees when it references `name`.
    fn lookup(&self, name: &str) -> Option<f64> {
        self.cells.get(name).and_then(Cell::numeric_value)
    }

    /// Current value of a cell. Absent cells read as empty text.
    pub fn value(&self, name: &str) -> CellValue {
        let name = self.policy.normalize(name);
        let Some(cell) = self.cells.get(&name) else {
            return CellValue::default();
        };
        if let Some(value) = cell.stored_value() {
            return value;
        }
        match cell.formula() {
            Some(formula) => evaluate(formula, |n| self.lookup(n)).into(),
            None => CellValue::default(),
        }
    }

    /// Raw content of a cell. Absent cells read as empty text.
    pub fn content(&self, name: &str) -> CellContent {
        let name = self.policy.normalize(name);
        self.cells
            .get(&name)
            .map(|cell| cell.content.clone())
            .unwrap_or_default()
    }

    /// Cells whose formulas directly reference `name`.
    pub fn direct_dependents(&self, name: &str) -> BTreeSet<String> {
        let name = self.policy.normalize(name);
        self.graph.dependents(&name).map(str::to_string).collect()
    }

    /// Names of all cells with content.
    pub fn nonempty_cells(&self) -> BTreeSet<String> {
        self.cells.keys().cloned().collect()
    }

    /// Iterate over non-empty cells in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellContent)> + '_ {
        self.cells
            .iter()
            .map(|(name, cell)| (name.as_str(), &cell.content))
    }

    /// Evaluate a formula (without the leading `=`) against the current
    /// values, without storing it anywhere.
    pub fn evaluate_formula(&self, text: &str) -> Result<CellValue> {
        let formula = Formula::parse(text, &self.policy).map_err(GridError::InvalidFormula)?;
        Ok(evaluate(&formula, |n| self.lookup(n)).into())
    }

    /// Undo the most recent edit.
    /// Returns the cells that were recalculated.
    pub fn undo(&mut self) -> Result<Vec<String>> {
        let action = self.undo_stack.pop().ok_or(GridError::NothingToUndo)?;
        match self.apply_edit(&action.name, &action.before) {
            Ok((_, _, order)) => {
                self.redo_stack.push(action);
                Ok(order)
            }
            Err(e) => {
                self.undo_stack.push(action);
                Err(e)
            }
        }
    }

    /// Redo the most recently undone edit.
    /// Returns the cells that were recalculated.
    pub fn redo(&mut self) -> Result<Vec<String>> {
        let action = self.redo_stack.pop().ok_or(GridError::NothingToRedo)?;
        match self.apply_edit(&action.name, &action.after) {
            Ok((_, _, order)) => {
                self.undo_stack.push(action);
                Ok(order)
            }
            Err(e) => {
                self.redo_stack.push(action);
                Err(e)
            }
        }
    }
}
