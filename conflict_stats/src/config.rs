// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// Column names, as they read after title-casing.
pub mod columns {
    pub const DEPARTMENT: &str = "Departamento";
    pub const YEAR: &str = "Año";
    pub const PERSON_ID: &str = "Id Persona";
    pub const SEX: &str = "Sexo";
    pub const OCCUPATION: &str = "Ocupación";
    pub const MODALITY: &str = "Modalidad";
    pub const RESPONSIBLE: &str = "Presunto Responsable";
    pub const PRESIDENT: &str = "Presidente";
}

/// The department attribute of the polygon dataset.
pub const POLYGON_NAME_ATTRIBUTE: &str = "NAME_1";

/// Fallback for records whose year was recorded as 0.
pub const DEFAULT_YEAR: i64 = 1946;

/// The value given to departments that could not be matched to the registry.
pub const UNIDENTIFIED: &str = "Sin Identificar";

/// A single value in a table.
///
/// Readers should map spreadsheet and CSV fields onto these variants. No other
/// typing is assumed by the pipeline.
#[derive(PartialEq, Debug, Clone)]
pub enum Cell {
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
}

static EMPTY_CELL: Cell = Cell::Empty;

impl Cell {
    /// The value as a year, if it holds an integral number.
    pub fn as_year(&self) -> Option<i64> {
        match self {
            Cell::Int(i) => Some(*i),
            Cell::Float(f) if f.fract() == 0.0 && f.is_finite() => Some(*f as i64),
            _ => None,
        }
    }

    /// The value as a category label. Empty cells and blank strings have no label.
    pub fn as_label(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) if s.trim().is_empty() => None,
            Cell::Text(s) => Some(s.clone()),
            Cell::Int(i) => Some(i.to_string()),
            Cell::Float(f) => Some(f.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }
}

/// A table: named columns over row-major cells.
///
/// Rows shorter than the header are read as if padded with empty cells.
#[derive(PartialEq, Debug, Clone)]
pub struct Table {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(name: &str, columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Table {
        Table {
            name: name.to_string(),
            columns,
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_index(column).is_some()
    }

    /// The cells of one column, in row order.
    pub fn column_values(&self, column: &str) -> Option<Vec<&Cell>> {
        let idx = self.column_index(column)?;
        Some(
            self.rows
                .iter()
                .map(|row| row.get(idx).unwrap_or(&EMPTY_CELL))
                .collect(),
        )
    }

    /// Like `column_values`, but a missing column is an error.
    pub fn require_column(&self, column: &str) -> Result<Vec<&Cell>, StatsErrors> {
        self.column_values(column)
            .ok_or_else(|| StatsErrors::MissingColumn {
                table: self.name.clone(),
                column: column.to_string(),
            })
    }

    /// A new table with the same header holding the rows that pass the predicate.
    pub fn filter_rows<F>(&self, predicate: F) -> Table
    where
        F: Fn(&[Cell]) -> bool,
    {
        Table {
            name: self.name.clone(),
            columns: self.columns.clone(),
            rows: self
                .rows
                .iter()
                .filter(|row| predicate(row.as_slice()))
                .cloned()
                .collect(),
        }
    }
}

/// The four required tables and the optional presidents table, as read.
#[derive(PartialEq, Debug, Clone)]
pub struct DashboardInputs {
    pub cases: Table,
    pub victims: Table,
    pub kidnap_cases: Table,
    pub kidnap_victims: Table,
    pub presidents: Option<Table>,
}

/// The period selected for the scoped tables.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, PartialOrd, Ord)]
pub enum YearScope {
    AllYears,
    Year(i64),
}

impl Display for YearScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            YearScope::AllYears => write!(f, "Todos los años"),
            YearScope::Year(y) => write!(f, "{}", y),
        }
    }
}

// ******** Output data structures *********

/// One row of the per-department table.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct DepartmentCounts {
    pub department: String,
    pub cases: u64,
    pub victims: u64,
}

/// One cell of a dense (year, category) table.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct YearCategoryCount {
    pub year: i64,
    pub category: String,
    pub count: u64,
}

/// One year of the kidnapping timeline.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct KidnapYearCounts {
    pub year: i64,
    pub cases: u64,
    pub victims: u64,
}

/// One row of the presidents comparison.
#[derive(PartialEq, Debug, Clone)]
pub struct PresidentYearCounts {
    pub year: Cell,
    pub president: String,
    pub kidnappings: u64,
    pub massacres: u64,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct LabelCount {
    pub label: String,
    pub count: u64,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub struct Totals {
    pub cases: u64,
    pub victims: u64,
    pub kidnap_cases: u64,
    pub kidnap_victims: u64,
}

/// Errors that prevent the pipeline from producing its tables.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum StatsErrors {
    /// Two canonical names collapse to the same correction key.
    DuplicateCorrectionKey {
        key: String,
        first: String,
        second: String,
    },
    /// A computation needs a column that the table does not have.
    MissingColumn { table: String, column: String },
    /// The polygon dataset has no features, so the map would have no rows.
    EmptyPolygonDataset,
}

impl Error for StatsErrors {}

impl Display for StatsErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatsErrors::DuplicateCorrectionKey { key, first, second } => write!(
                f,
                "departments {:?} and {:?} share the correction key {:?}",
                first, second, key
            ),
            StatsErrors::MissingColumn { table, column } => {
                write!(f, "table {:?} has no column {:?}", table, column)
            }
            StatsErrors::EmptyPolygonDataset => {
                write!(f, "the polygon dataset does not contain any feature")
            }
        }
    }
}
