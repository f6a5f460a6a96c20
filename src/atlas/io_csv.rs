// Primitives for reading CSV files.

use conflict_stats::Table;

use crate::atlas::{
    io_common::{parse_field, table_name},
    *,
};

/// Reads a CSV file whose first line is the header.
pub fn read_csv_table(path: &str) -> AtlasResult<Table> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    let columns: Vec<String> = rdr
        .headers()
        .context(CsvOpenSnafu { path })?
        .iter()
        .map(|s| s.to_string())
        .collect();
    debug!("read_csv_table: {}: header: {:?}", path, columns);

    let mut rows: Vec<Vec<Cell>> = Vec::new();
    for (idx, line_r) in rdr.records().enumerate() {
        // The header is line 1.
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu { path, lineno })?;
        rows.push(line.iter().map(parse_field).collect());
    }
    debug!("read_csv_table: {}: {} rows", path, rows.len());
    Ok(Table::new(&table_name(path), columns, rows))
}
