//! Parser for .grd file format
//!
//! ```text
//! # comment
//! @version default
//! A1: 42
//! B1: "quoted text"
//! C1: =A1 * 2
//! ```

use crate::error::{GridError, Result};
use std::fs;
use std::path::Path;

/// One `NAME: VALUE` line, with VALUE turned back into raw cell input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrdEntry {
    pub line: usize,
    pub name: String,
    pub input: String,
}

/// Contents of a .grd file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParsedGrd {
    pub version: Option<String>,
    pub entries: Vec<GrdEntry>,
}

/// Parse a .grd file
pub fn parse_grd(path: &Path) -> Result<ParsedGrd> {
    let content = fs::read_to_string(path)?;
    parse_grd_content(&content)
}

/// Read only the version line of a .grd file.
///
/// Cell lines are not parsed, so a file with malformed cells still reports
/// its version.
pub fn read_grd_version(path: &Path) -> Result<Option<String>> {
    let content = fs::read_to_string(path)?;
    Ok(grd_content_version(&content))
}

/// The first `@version` label in .grd content, if any.
fn grd_content_version(content: &str) -> Option<String> {
    content
        .lines()
        .find_map(|line| line.trim().strip_prefix("@version"))
        .map(|version| version.trim().to_string())
}

/// Parse .grd content from a string
pub fn parse_grd_content(content: &str) -> Result<ParsedGrd> {
    let mut parsed = ParsedGrd::default();

    for (line_num, line) in content.lines().enumerate() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(version) = line.strip_prefix("@version") {
            if parsed.version.is_some() {
                return Err(GridError::Parse {
                    line: line_num + 1,
                    message: "Duplicate @version line".to_string(),
                });
            }
            parsed.version = Some(version.trim().to_string());
            continue;
        }

        // Parse "NAME: VALUE" format
        let Some((name, value)) = line.split_once(':') else {
            return Err(GridError::Parse {
                line: line_num + 1,
                message: "Expected 'NAME: VALUE' format".to_string(),
            });
        };

        parsed.entries.push(GrdEntry {
            line: line_num + 1,
            name: name.trim().to_string(),
            input: parse_cell_value(value, line_num + 1)?,
        });
    }

    Ok(parsed)
}

/// Turn a stored value back into the raw input that produced it
fn parse_cell_value(value: &str, line_num: usize) -> Result<String> {
    let value = value.trim();

    if value.is_empty() || value.starts_with('=') {
        return Ok(value.to_string());
    }

    // Quoted string: starts and ends with '"'
    if value.starts_with('"') && value.ends_with('"') && value.len() >= 2 {
        return Ok(unescape_grd_text(&value[1..value.len() - 1]));
    }

    if value.parse::<f64>().is_ok_and(f64::is_finite) {
        return Ok(value.to_string());
    }

    Err(GridError::Parse {
        line: line_num,
        message: format!("Invalid value: {}. Use quotes for text.", value),
    })
}

fn unescape_grd_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(next) = chars.next() {
                match next {
                    '\\' => out.push('\\'),
                    '"' => out.push('"'),
                    'n' => out.push('\n'),
                    _ => {
                        out.push('\\');
                        out.push(next);
                    }
                }
            } else {
                out.push('\\');
            }
        } else {
            out.push(ch);
        }
    }
    out
}
