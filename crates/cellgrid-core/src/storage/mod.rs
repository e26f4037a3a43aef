//! Storage module for the .grd file format

mod parser;
mod writer;

pub use parser::{GrdEntry, ParsedGrd, parse_grd, parse_grd_content, read_grd_version};
pub use writer::{write_grd, write_grd_content};
