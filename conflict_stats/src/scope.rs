use log::debug;
use std::collections::BTreeSet;

use crate::config::*;

/// The options offered for year selection: all years first, then every year
/// observed in the given tables, ascending.
///
/// Tables without a year column contribute nothing.
pub fn selectable_years(tables: &[&Table]) -> Vec<YearScope> {
    let mut years: BTreeSet<i64> = BTreeSet::new();
    for t in tables.iter() {
        if let Some(cells) = t.column_values(columns::YEAR) {
            years.extend(cells.iter().filter_map(|c| c.as_year()));
        }
    }
    let mut res = vec![YearScope::AllYears];
    res.extend(years.into_iter().map(YearScope::Year));
    res
}

/// Restricts every table to the same scope.
///
/// With `AllYears` the tables are returned unchanged. With a specific year,
/// every table must have a year column.
pub fn filter_tables(tables: &[&Table], scope: YearScope) -> Result<Vec<Table>, StatsErrors> {
    let mut res: Vec<Table> = Vec::new();
    for t in tables.iter() {
        res.push(filter_table(t, scope)?);
    }
    Ok(res)
}

pub fn filter_table(table: &Table, scope: YearScope) -> Result<Table, StatsErrors> {
    match scope {
        YearScope::AllYears => Ok(table.clone()),
        YearScope::Year(year) => {
            let idx = table
                .column_index(columns::YEAR)
                .ok_or_else(|| StatsErrors::MissingColumn {
                    table: table.name.clone(),
                    column: columns::YEAR.to_string(),
                })?;
            let res = table.filter_rows(|row| {
                row.get(idx).and_then(|c| c.as_year()) == Some(year)
            });
            debug!(
                "filter_table: {}: {} -> {} rows for {}",
                table.name,
                table.len(),
                res.len(),
                scope
            );
            Ok(res)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn years_table(name: &str, years: &[i64]) -> Table {
        Table::new(
            name,
            vec![columns::YEAR.to_string(), "Id".to_string()],
            years
                .iter()
                .enumerate()
                .map(|(idx, y)| vec![Cell::Int(*y), Cell::Int(idx as i64)])
                .collect(),
        )
    }

    #[test]
    fn filter_single_year() {
        let t = years_table("cases", &[2001, 2002, 2002, 2003]);
        let res = filter_table(&t, YearScope::Year(2002)).unwrap();
        assert_eq!(res.len(), 2);
        assert_eq!(
            res.rows,
            vec![
                vec![Cell::Int(2002), Cell::Int(1)],
                vec![Cell::Int(2002), Cell::Int(2)]
            ]
        );
    }

    #[test]
    fn all_years_passes_through() {
        let t = years_table("cases", &[2001, 2002]);
        let res = filter_tables(&[&t, &t], YearScope::AllYears).unwrap();
        assert_eq!(res, vec![t.clone(), t]);
    }

    #[test]
    fn float_years_match() {
        let t = Table::new(
            "victims",
            vec![columns::YEAR.to_string()],
            vec![vec![Cell::Float(2002.0)], vec![Cell::Float(2002.5)]],
        );
        let res = filter_table(&t, YearScope::Year(2002)).unwrap();
        assert_eq!(res.len(), 1);
    }

    #[test]
    fn year_filter_needs_year_column() {
        let t = Table::new("presidents", vec!["Presidente".to_string()], vec![]);
        assert!(filter_table(&t, YearScope::AllYears).is_ok());
        assert_eq!(
            filter_table(&t, YearScope::Year(2002)),
            Err(StatsErrors::MissingColumn {
                table: "presidents".to_string(),
                column: columns::YEAR.to_string(),
            })
        );
    }

    #[test]
    fn options_are_sorted_union() {
        let a = years_table("cases", &[2003, 1990, 2003]);
        let b = years_table("victims", &[2001, 1990]);
        let none = Table::new("other", vec!["Sexo".to_string()], vec![]);
        assert_eq!(
            selectable_years(&[&a, &b, &none]),
            vec![
                YearScope::AllYears,
                YearScope::Year(1990),
                YearScope::Year(2001),
                YearScope::Year(2003)
            ]
        );
        assert_eq!(selectable_years(&[]), vec![YearScope::AllYears]);
    }
}
