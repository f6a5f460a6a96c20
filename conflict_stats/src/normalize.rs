use log::{debug, info};

use crate::config::*;
use crate::registry::DepartmentRegistry;

/// A table after normalization, with the department values that could not be
/// matched against the registry.
#[derive(PartialEq, Debug, Clone)]
pub struct NormalizedTable {
    pub table: Table,
    /// Distinct unmatched values (upper-cased), in order of first appearance.
    /// They have all been replaced by `UNIDENTIFIED` in the table.
    pub unmapped_departments: Vec<String>,
}

/// Capitalizes the first letter of every word and lowercases the rest.
///
/// A word is a run of alphabetic characters, so "PRESUNTO-responsable" becomes
/// "Presunto-Responsable".
pub fn title_case(s: &str) -> String {
    let mut res = String::with_capacity(s.len());
    let mut in_word = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if in_word {
                res.extend(c.to_lowercase());
            } else {
                res.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            res.push(c);
            in_word = false;
        }
    }
    res
}

/// Normalizes one input table. The row count never changes.
///
/// Missing `Departamento` or `Año` columns are not an error: the corresponding
/// step is skipped.
pub fn normalize_table(table: &Table, registry: &DepartmentRegistry) -> NormalizedTable {
    let headers: Vec<String> = table
        .columns
        .iter()
        .map(|c| title_case(c.trim()))
        .collect();
    debug!("normalize_table: {}: columns {:?}", table.name, headers);

    let mut rows: Vec<Vec<Cell>> = table
        .rows
        .iter()
        .map(|row| row.iter().map(clean_cell).collect())
        .collect();

    let mut unmapped: Vec<String> = Vec::new();
    if let Some(dep_idx) = headers.iter().position(|c| c == columns::DEPARTMENT) {
        for row in rows.iter_mut() {
            if row.len() <= dep_idx {
                row.resize(dep_idx + 1, Cell::Empty);
            }
            let (fixed, miss) = correct_department(&row[dep_idx], registry);
            if let Some(m) = miss {
                if !unmapped.contains(&m) {
                    unmapped.push(m);
                }
            }
            row[dep_idx] = Cell::Text(fixed);
        }
        if !unmapped.is_empty() {
            info!(
                "normalize_table: {}: {} unmapped department values",
                table.name,
                unmapped.len()
            );
        }
    }

    if let Some(year_idx) = headers.iter().position(|c| c == columns::YEAR) {
        for row in rows.iter_mut() {
            if let Some(cell) = row.get_mut(year_idx) {
                default_year(cell);
            }
        }
    }

    NormalizedTable {
        table: Table {
            name: table.name.clone(),
            columns: headers,
            rows,
        },
        unmapped_departments: unmapped,
    }
}

fn clean_cell(cell: &Cell) -> Cell {
    match cell {
        Cell::Text(s) => Cell::Text(title_case(s.trim())),
        c => c.clone(),
    }
}

// Returns the corrected value, and the value that failed the lookup, if any.
fn correct_department(cell: &Cell, registry: &DepartmentRegistry) -> (String, Option<String>) {
    let raw = match cell.as_label() {
        Some(s) => s.to_uppercase().trim().to_string(),
        // Nothing to report for a blank cell.
        None => return (UNIDENTIFIED.to_string(), None),
    };
    let corrected = registry.lookup(&raw).unwrap_or(raw.as_str());
    if registry.contains(corrected) {
        (corrected.to_string(), None)
    } else {
        (UNIDENTIFIED.to_string(), Some(raw))
    }
}

fn default_year(cell: &mut Cell) {
    match *cell {
        Cell::Int(0) => *cell = Cell::Int(DEFAULT_YEAR),
        Cell::Float(f) if f == 0.0 => *cell = Cell::Float(DEFAULT_YEAR as f64),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    fn table(columns: &[&str], rows: Vec<Vec<Cell>>) -> Table {
        Table::new(
            "test",
            columns.iter().map(|s| s.to_string()).collect(),
            rows,
        )
    }

    fn departments(nt: &NormalizedTable) -> Vec<String> {
        nt.table
            .column_values(columns::DEPARTMENT)
            .unwrap()
            .iter()
            .map(|c| c.as_label().unwrap())
            .collect()
    }

    #[test]
    fn title_case_words() {
        assert_eq!(title_case("presunto responsable"), "Presunto Responsable");
        assert_eq!(title_case("AÑO"), "Año");
        assert_eq!(title_case("id persona"), "Id Persona");
        assert_eq!(title_case("OCUPACIÓN"), "Ocupación");
        assert_eq!(title_case("grupo-armado"), "Grupo-Armado");
    }

    #[test]
    fn headers_and_text_cells() {
        let t = table(
            &["MODALIDAD", " sexo "],
            vec![vec![text("  masacre SELECTIVA "), Cell::Int(3)]],
        );
        let reg = DepartmentRegistry::colombia().unwrap();
        let nt = normalize_table(&t, &reg);
        assert_eq!(nt.table.columns, vec!["Modalidad", "Sexo"]);
        assert_eq!(
            nt.table.rows[0],
            vec![text("Masacre Selectiva"), Cell::Int(3)]
        );
        assert!(nt.unmapped_departments.is_empty());
    }

    #[test]
    fn department_variants_match_canonical() {
        let t = table(
            &["departamento"],
            vec![
                vec![text("narino")],
                vec![text("NARIÑO")],
                vec![text(" Nariño ")],
                vec![text("norte de santander")],
                vec![text("SAN ANDRES, PROVIDENCIA Y SANTA CATALINA")],
            ],
        );
        let reg = DepartmentRegistry::colombia().unwrap();
        let nt = normalize_table(&t, &reg);
        assert_eq!(
            departments(&nt),
            vec![
                "Nariño",
                "Nariño",
                "Nariño",
                "Norte de Santander",
                "San Andrés, Providencia y Santa Catalina"
            ]
        );
        assert!(nt.unmapped_departments.is_empty());
    }

    #[test]
    fn unknown_departments_become_unidentified() {
        let t = table(
            &["Departamento"],
            vec![
                vec![text("antioquia")],
                vec![text("xyz")],
                vec![text("Bogotá")],
                vec![text("XYZ ")],
                vec![Cell::Empty],
            ],
        );
        let reg = DepartmentRegistry::colombia().unwrap();
        let nt = normalize_table(&t, &reg);
        assert_eq!(
            departments(&nt),
            vec![
                "Antioquia",
                UNIDENTIFIED,
                UNIDENTIFIED,
                UNIDENTIFIED,
                UNIDENTIFIED
            ]
        );
        assert_eq!(nt.unmapped_departments, vec!["XYZ", "BOGOTÁ"]);
        assert_eq!(nt.table.len(), 5);
    }

    #[test]
    fn year_zero_uses_default() {
        let t = table(
            &["año"],
            vec![
                vec![Cell::Int(0)],
                vec![Cell::Float(0.0)],
                vec![Cell::Int(1800)],
                vec![Cell::Int(2999)],
                vec![Cell::Int(-4)],
                vec![Cell::Empty],
            ],
        );
        let reg = DepartmentRegistry::colombia().unwrap();
        let nt = normalize_table(&t, &reg);
        let years: Vec<Option<i64>> = nt
            .table
            .column_values(columns::YEAR)
            .unwrap()
            .iter()
            .map(|c| c.as_year())
            .collect();
        assert_eq!(
            years,
            vec![
                Some(1946),
                Some(1946),
                Some(1800),
                Some(2999),
                Some(-4),
                None
            ]
        );
    }

    #[test]
    fn short_rows_are_padded_for_departments() {
        let t = table(&["Id", "Departamento"], vec![vec![Cell::Int(1)]]);
        let reg = DepartmentRegistry::colombia().unwrap();
        let nt = normalize_table(&t, &reg);
        assert_eq!(nt.table.rows[0], vec![Cell::Int(1), text(UNIDENTIFIED)]);
    }
}
