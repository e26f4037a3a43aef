use cellgrid_engine::engine::{Cell, DependencyGraph, NamePolicy};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Maximum number of undo entries to keep
pub(crate) const MAX_UNDO_STACK: usize = 100;

/// Version label written to and expected from saved files unless one is given.
pub const DEFAULT_VERSION: &str = "default";

/// Represents an undoable edit of a single cell, as raw input strings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UndoAction {
    pub name: String,
    pub before: String,
    pub after: String,
}

/// A grid of named cells with formulas kept consistent and acyclic.
///
/// The cell store and the dependency graph are private and only change
/// together, through [`Sheet::set_contents`]. For every formula cell `X`,
/// `graph.dependees(X)` is exactly the set of names its formula references.
pub struct Sheet {
    /// Non-empty cells by normalized name
    pub(crate) cells: BTreeMap<String, Cell>,
    /// Edges `A -> B` meaning "B's formula references A"
    pub(crate) graph: DependencyGraph,
    /// Name normalization and validity rules
    pub(crate) policy: NamePolicy,
    /// Version label used when saving and loading
    pub(crate) version: String,
    /// Current file path
    pub file_path: Option<PathBuf>,
    /// Whether the sheet changed since it was created, loaded or saved
    pub(crate) modified: bool,
    /// Undo stack
    pub(crate) undo_stack: Vec<UndoAction>,
    /// Redo stack
    pub(crate) redo_stack: Vec<UndoAction>,
}

impl Sheet {
    /// Create an empty sheet with the identity name policy.
    pub fn new() -> Self {
        Self::with_policy(NamePolicy::default(), DEFAULT_VERSION)
    }

    /// Create an empty sheet with its own name policy and version label.
    pub fn with_policy(policy: NamePolicy, version: &str) -> Self {
        Sheet {
            cells: BTreeMap::new(),
            graph: DependencyGraph::new(),
            policy,
            version: version.to_string(),
            file_path: None,
            modified: false,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn policy(&self) -> &NamePolicy {
        &self.policy
    }

    /// Whether there are unsaved changes.
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Read-only view of the dependency graph.
    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }
}

impl Default for Sheet {
    fn default() -> Self {
        Self::new()
    }
}
