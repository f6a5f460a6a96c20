use std::path::Path;

use conflict_stats::Cell;
use serde_json::json;
use serde_json::Value as JSValue;

/// The name given to a table read from `path`: the file name without extension.
pub fn table_name(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

/// Reads a text field. Numbers become numeric cells, blanks become empty cells.
pub fn parse_field(s: &str) -> Cell {
    let t = s.trim();
    if t.is_empty() {
        return Cell::Empty;
    }
    if let Ok(i) = t.parse::<i64>() {
        return Cell::Int(i);
    }
    match t.parse::<f64>() {
        Ok(f) if f.is_finite() => Cell::Float(f),
        _ => Cell::Text(s.to_string()),
    }
}

pub fn cell_to_json(cell: &Cell) -> JSValue {
    match cell {
        Cell::Empty => JSValue::Null,
        Cell::Text(s) => json!(s),
        Cell::Int(i) => json!(i),
        Cell::Float(f) => json!(f),
    }
}
