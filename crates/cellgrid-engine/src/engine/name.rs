//! Cell name grammar and normalization policy.
//!
//! Every cell is addressed by a name such as `A1`, `total` or `x2y`: a letter
//! followed by any number of letters or digits. On top of that grammar a grid
//! may install a [`NamePolicy`] that normalizes names (e.g. upper-casing) and
//! applies an extra validity predicate.
//!
//! # Examples
//!
//! ```ignore
//! assert!(is_valid_name("A1"));
//! assert!(!is_valid_name("1A"));
//! let policy = NamePolicy::uppercase();
//! assert_eq!(policy.resolve("b2"), Some("B2".to_string()));
//! ```

use regex::Regex;
use std::fmt;
use std::sync::{Arc, OnceLock};

fn name_re() -> &'static Regex {
    static NAME_RE: OnceLock<Regex> = OnceLock::new();
    NAME_RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z][A-Za-z0-9]*$").expect("cell name regex must compile")
    })
}

/// Returns true if `name` matches the cell name grammar.
pub fn is_valid_name(name: &str) -> bool {
    name_re().is_match(name)
}

type Normalizer = Arc<dyn Fn(&str) -> String + Send + Sync>;
type Validator = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Normalization and validity rules a grid applies to every name it sees.
///
/// The grammar check always runs on the *normalized* name, followed by the
/// policy's own predicate.
#[derive(Clone)]
pub struct NamePolicy {
    normalize: Normalizer,
    is_valid: Validator,
}

impl NamePolicy {
    pub fn new(
        normalize: impl Fn(&str) -> String + Send + Sync + 'static,
        is_valid: impl Fn(&str) -> bool + Send + Sync + 'static,
    ) -> Self {
        NamePolicy {
            normalize: Arc::new(normalize),
            is_valid: Arc::new(is_valid),
        }
    }

    /// Upper-case every name, accept anything the grammar accepts.
    pub fn uppercase() -> Self {
        Self::new(|s| s.to_ascii_uppercase(), |_| true)
    }

    pub fn normalize(&self, name: &str) -> String {
        (self.normalize)(name)
    }

    /// Normalize `name` and return it if it passes both the grammar and the
    /// policy predicate.
    pub fn resolve(&self, name: &str) -> Option<String> {
        let normalized = self.normalize(name);
        if is_valid_name(&normalized) && (self.is_valid)(&normalized) {
            Some(normalized)
        } else {
            None
        }
    }
}

impl Default for NamePolicy {
    fn default() -> Self {
        Self::new(|s| s.to_string(), |_| true)
    }
}

impl fmt::Debug for NamePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NamePolicy { .. }")
    }
}
