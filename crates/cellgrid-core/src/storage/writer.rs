//! Writer for .grd file format

use crate::error::Result;
use crate::sheet::Sheet;
use cellgrid_engine::engine::CellContent;
use std::fs;
use std::path::Path;

/// Write a sheet to a .grd file
pub fn write_grd(path: &Path, sheet: &Sheet) -> Result<()> {
    let content = write_grd_content(sheet);
    fs::write(path, content)?;
    Ok(())
}

/// Write a sheet to a .grd format string, cells in name order
pub fn write_grd_content(sheet: &Sheet) -> String {
    let mut lines = vec![
        "# cellgrid sheet".to_string(),
        format!("@version {}", sheet.version()),
    ];

    for (name, content) in sheet.iter() {
        let value_str = match content {
            CellContent::Number(n) => n.to_string(),
            CellContent::Text(s) => format!("\"{}\"", escape_grd_text(s)),
            CellContent::Formula(f) => format!("={}", f),
        };

        lines.push(format!("{}: {}", name, value_str));
    }

    lines.join("\n") + "\n"
}

fn escape_grd_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            _ => out.push(ch),
        }
    }
    out
}
