use log::debug;
use std::collections::{BTreeMap, BTreeSet};

use crate::config::*;

/// Joins two count series on the union of their keys.
/// A key missing from one side counts 0 there. Keys come out sorted.
pub fn union_fill<K: Ord + Clone>(
    left: &BTreeMap<K, u64>,
    right: &BTreeMap<K, u64>,
) -> Vec<(K, u64, u64)> {
    let keys: BTreeSet<&K> = left.keys().chain(right.keys()).collect();
    keys.into_iter()
        .map(|k| {
            (
                k.clone(),
                left.get(k).cloned().unwrap_or(0),
                right.get(k).cloned().unwrap_or(0),
            )
        })
        .collect()
}

fn count_labels<'a, I>(cells: I) -> BTreeMap<String, u64>
where
    I: Iterator<Item = &'a Cell>,
{
    let mut res: BTreeMap<String, u64> = BTreeMap::new();
    for label in cells.filter_map(|c| c.as_label()) {
        *res.entry(label).or_insert(0) += 1;
    }
    res
}

/// Number of rows per department.
pub fn department_case_counts(cases: &Table) -> Result<BTreeMap<String, u64>, StatsErrors> {
    let deps = cases.require_column(columns::DEPARTMENT)?;
    Ok(count_labels(deps.into_iter()))
}

/// Number of non-empty person identifiers per department.
pub fn department_victim_counts(
    victims: &Table,
    person_column: &str,
) -> Result<BTreeMap<String, u64>, StatsErrors> {
    let deps = victims.require_column(columns::DEPARTMENT)?;
    let persons = victims.require_column(person_column)?;
    let counted = deps
        .into_iter()
        .zip(persons.into_iter())
        .filter(|(_, p)| !p.is_empty())
        .map(|(d, _)| d);
    Ok(count_labels(counted))
}

/// The (Department, Cases, Victims) table, sorted by department name.
pub fn department_table(
    cases: &Table,
    victims: &Table,
    person_column: &str,
) -> Result<Vec<DepartmentCounts>, StatsErrors> {
    let case_counts = department_case_counts(cases)?;
    let victim_counts = department_victim_counts(victims, person_column)?;
    debug!(
        "department_table: {} departments with cases, {} with victims",
        case_counts.len(),
        victim_counts.len()
    );
    Ok(union_fill(&case_counts, &victim_counts)
        .into_iter()
        .map(|(department, cases, victims)| DepartmentCounts {
            department,
            cases,
            victims,
        })
        .collect())
}

/// Number of rows per year. Rows without a usable year are not counted.
pub fn year_counts(table: &Table) -> Result<BTreeMap<i64, u64>, StatsErrors> {
    let years = table.require_column(columns::YEAR)?;
    let mut res: BTreeMap<i64, u64> = BTreeMap::new();
    for y in years.iter().filter_map(|c| c.as_year()) {
        *res.entry(y).or_insert(0) += 1;
    }
    Ok(res)
}

/// Kidnapping cases and victims per year, ascending.
pub fn kidnap_timeline(
    kidnap_cases: &Table,
    kidnap_victims: &Table,
) -> Result<Vec<KidnapYearCounts>, StatsErrors> {
    let cases = year_counts(kidnap_cases)?;
    let victims = year_counts(kidnap_victims)?;
    Ok(union_fill(&cases, &victims)
        .into_iter()
        .map(|(year, cases, victims)| KidnapYearCounts {
            year,
            cases,
            victims,
        })
        .collect())
}

/// Row counts over every observed (year, category) pair, zero-filled.
///
/// Returns None when the table lacks the year or the category column.
pub fn year_category_counts(table: &Table, category: &str) -> Option<Vec<YearCategoryCount>> {
    let years = table.column_values(columns::YEAR)?;
    let cats = table.column_values(category)?;

    let mut counts: BTreeMap<(i64, String), u64> = BTreeMap::new();
    let mut all_years: BTreeSet<i64> = BTreeSet::new();
    let mut all_cats: BTreeSet<String> = BTreeSet::new();
    for (y, c) in years.iter().zip(cats.iter()) {
        if let (Some(year), Some(cat)) = (y.as_year(), c.as_label()) {
            all_years.insert(year);
            all_cats.insert(cat.clone());
            *counts.entry((year, cat)).or_insert(0) += 1;
        }
    }

    let mut res: Vec<YearCategoryCount> = Vec::new();
    for year in all_years.iter() {
        for cat in all_cats.iter() {
            res.push(YearCategoryCount {
                year: *year,
                category: cat.clone(),
                count: counts.get(&(*year, cat.clone())).cloned().unwrap_or(0),
            });
        }
    }
    debug!(
        "year_category_counts: {} x {}: {} years, {} categories",
        table.name,
        category,
        all_years.len(),
        all_cats.len()
    );
    Some(res)
}

fn sorted_by_count(counts: BTreeMap<String, u64>) -> Vec<LabelCount> {
    let mut res: Vec<LabelCount> = counts
        .into_iter()
        .map(|(label, count)| LabelCount { label, count })
        .collect();
    // Stable sort over label order: ties stay alphabetical.
    res.sort_by(|a, b| b.count.cmp(&a.count));
    res
}

/// Value counts of one column, largest first.
///
/// Returns None when the column does not exist.
pub fn distribution(table: &Table, column: &str) -> Option<Vec<LabelCount>> {
    let cells = table.column_values(column)?;
    Some(sorted_by_count(count_labels(cells.into_iter())))
}

/// Frequencies of the upper-cased words of the occupation column, largest first.
pub fn occupation_terms(victims: &Table) -> Option<Vec<LabelCount>> {
    let cells = victims.column_values(columns::OCCUPATION)?;
    let mut counts: BTreeMap<String, u64> = BTreeMap::new();
    for label in cells.iter().filter_map(|c| c.as_label()) {
        for word in label.to_uppercase().split_whitespace() {
            *counts.entry(word.to_string()).or_insert(0) += 1;
        }
    }
    Some(sorted_by_count(counts))
}

/// Every row of the presidents table with the kidnappings and massacres of its year.
///
/// Rows keep the order of the presidents table. Years without records count 0.
pub fn presidents_comparison(
    presidents: &Table,
    kidnap_cases: &Table,
    cases: &Table,
) -> Result<Vec<PresidentYearCounts>, StatsErrors> {
    let years = presidents.require_column(columns::YEAR)?;
    let names = presidents.require_column(columns::PRESIDENT)?;
    let kidnappings = year_counts(kidnap_cases)?;
    let massacres = year_counts(cases)?;

    let res = years
        .into_iter()
        .zip(names.into_iter())
        .map(|(y, n)| {
            let year = y.as_year();
            let lookup =
                |m: &BTreeMap<i64, u64>| year.and_then(|k| m.get(&k).cloned()).unwrap_or(0);
            PresidentYearCounts {
                year: y.clone(),
                president: n.as_label().unwrap_or_default(),
                kidnappings: lookup(&kidnappings),
                massacres: lookup(&massacres),
            }
        })
        .collect();
    Ok(res)
}
