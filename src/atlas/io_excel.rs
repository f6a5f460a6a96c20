// Primitives for reading Excel files.

use calamine::{open_workbook, DataType, Range, Reader, Xlsx};

use conflict_stats::Table;

use crate::atlas::{io_common::table_name, *};

/// Reads one worksheet, the first one unless `worksheet` is given.
/// The first row is the header.
pub fn read_excel_table(path: &str, worksheet: Option<&str>) -> AtlasResult<Table> {
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;
    let wrange = match worksheet {
        Some(name) => workbook
            .worksheet_range(name)
            .context(MissingWorksheetSnafu { path, name })?,
        None => workbook
            .worksheet_range_at(0)
            .context(EmptyExcelSnafu { path })?,
    }
    .context(OpeningExcelSnafu { path })?;
    range_to_table(path, &wrange)
}

fn range_to_table(path: &str, wrange: &Range<DataType>) -> AtlasResult<Table> {
    let mut iter = wrange.rows();
    let header = iter.next().context(EmptyExcelSnafu { path })?;
    debug!("read_excel_table: header: {:?}", header);
    let columns: Vec<String> = header.iter().map(header_label).collect();

    let rows: Vec<Vec<Cell>> = iter.map(|row| row.iter().map(to_cell).collect()).collect();
    debug!("read_excel_table: {}: {} rows", path, rows.len());
    Ok(Table::new(&table_name(path), columns, rows))
}

fn header_label(cell: &DataType) -> String {
    match cell {
        DataType::String(s) => s.clone(),
        DataType::Int(i) => i.to_string(),
        DataType::Float(f) => f.to_string(),
        _ => String::new(),
    }
}

fn to_cell(cell: &DataType) -> Cell {
    match cell {
        DataType::String(s) => Cell::Text(s.clone()),
        DataType::Int(i) => Cell::Int(*i),
        DataType::Float(f) => Cell::Float(*f),
        DataType::Bool(b) => Cell::Text(b.to_string()),
        // Days since the Excel epoch.
        DataType::DateTime(f) => Cell::Float(*f),
        DataType::Empty => Cell::Empty,
        c => {
            debug!("to_cell: reading {:?} as an empty cell", c);
            Cell::Empty
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells() {
        assert_eq!(
            to_cell(&DataType::String("Cauca".to_string())),
            Cell::Text("Cauca".to_string())
        );
        assert_eq!(to_cell(&DataType::Float(2002.0)), Cell::Float(2002.0));
        assert_eq!(to_cell(&DataType::Int(0)), Cell::Int(0));
        assert_eq!(to_cell(&DataType::Empty), Cell::Empty);
        assert_eq!(header_label(&DataType::String("AÑO".to_string())), "AÑO");
        assert_eq!(header_label(&DataType::Empty), "");
    }

    #[test]
    fn header_then_rows() {
        let mut range: Range<DataType> = Range::new((0, 0), (2, 2));
        range.set_value((0, 0), DataType::String("DEPARTAMENTO".to_string()));
        range.set_value((0, 1), DataType::String("AÑO".to_string()));
        range.set_value((0, 2), DataType::String("Id Persona".to_string()));
        range.set_value((1, 0), DataType::String("meta".to_string()));
        range.set_value((1, 1), DataType::Float(2002.0));
        range.set_value((1, 2), DataType::Int(7));
        range.set_value((2, 0), DataType::String("huila".to_string()));
        range.set_value((2, 1), DataType::Int(0));

        let t = range_to_table("data/CasosMasacres.xlsx", &range).unwrap();
        assert_eq!(t.name, "CasosMasacres");
        assert_eq!(t.columns, vec!["DEPARTAMENTO", "AÑO", "Id Persona"]);
        assert_eq!(
            t.rows,
            vec![
                vec![
                    Cell::Text("meta".to_string()),
                    Cell::Float(2002.0),
                    Cell::Int(7)
                ],
                vec![Cell::Text("huila".to_string()), Cell::Int(0), Cell::Empty],
            ]
        );
    }

    #[test]
    fn missing_workbook() {
        let res = read_excel_table("/nonexistent/conflict_atlas/cases.xlsx", None);
        assert!(matches!(res, Err(AtlasError::OpeningExcel { .. })));
    }
}
