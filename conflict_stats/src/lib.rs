mod config;

pub mod aggregate;
pub mod geo;
pub mod normalize;
pub mod registry;
pub mod scope;

use log::{debug, info};

pub use crate::config::*;
pub use crate::geo::{JoinReport, MapRow, MergedMap, PolygonDataset, PolygonFeature, PolygonHandle};
pub use crate::normalize::NormalizedTable;
pub use crate::registry::{correction_key, DepartmentRegistry, COLOMBIA_DEPARTMENTS};

/// Every table derived for one year selection.
#[derive(PartialEq, Debug, Clone)]
pub struct DashboardTables<G> {
    pub scope: YearScope,
    /// Row counts of the four scoped tables.
    pub totals: Totals,
    /// Scoped cases and victims per department.
    pub departments: Vec<DepartmentCounts>,
    pub map: MergedMap<G>,
    /// Scoped victims by sex.
    pub sex_distribution: Option<Vec<LabelCount>>,
    // The following tables cover all the years, whatever the scope.
    pub responsible_distribution: Option<Vec<LabelCount>>,
    pub modality_trends: Option<Vec<YearCategoryCount>>,
    pub responsible_trends: Option<Vec<YearCategoryCount>>,
    pub kidnap_responsible_trends: Option<Vec<YearCategoryCount>>,
    pub occupation_terms: Option<Vec<LabelCount>>,
    pub kidnap_timeline: Vec<KidnapYearCounts>,
    pub presidents: Option<Vec<PresidentYearCounts>>,
}

/// The normalized inputs of a session.
///
/// Inputs are normalized once. Each call to `compute` derives all the tables
/// again from them, so a new year selection never depends on a previous one.
#[derive(Debug, Clone)]
pub struct Session<'r> {
    registry: &'r DepartmentRegistry,
    person_column: String,
    cases: NormalizedTable,
    victims: NormalizedTable,
    kidnap_cases: NormalizedTable,
    kidnap_victims: NormalizedTable,
    presidents: Option<NormalizedTable>,
}

impl<'r> Session<'r> {
    /// Normalizes the inputs.
    ///
    /// Arguments:
    /// * `registry` the canonical departments
    /// * `inputs` the tables as read
    /// * `person_column` the column identifying a victim, usually `Id Persona`.
    ///   It is matched against the normalized headers, whatever its case.
    pub fn new(
        registry: &'r DepartmentRegistry,
        inputs: &DashboardInputs,
        person_column: &str,
    ) -> Session<'r> {
        let norm = |t: &Table| normalize::normalize_table(t, registry);
        let session = Session {
            registry,
            person_column: normalize::title_case(person_column.trim()),
            cases: norm(&inputs.cases),
            victims: norm(&inputs.victims),
            kidnap_cases: norm(&inputs.kidnap_cases),
            kidnap_victims: norm(&inputs.kidnap_victims),
            presidents: inputs.presidents.as_ref().map(norm),
        };
        info!(
            "Session: {} cases, {} victims, {} kidnapping cases, {} kidnapping victims",
            session.cases.table.len(),
            session.victims.table.len(),
            session.kidnap_cases.table.len(),
            session.kidnap_victims.table.len()
        );
        session
    }

    pub fn cases(&self) -> &Table {
        &self.cases.table
    }

    pub fn victims(&self) -> &Table {
        &self.victims.table
    }

    pub fn kidnap_cases(&self) -> &Table {
        &self.kidnap_cases.table
    }

    pub fn kidnap_victims(&self) -> &Table {
        &self.kidnap_victims.table
    }

    pub fn presidents(&self) -> Option<&Table> {
        self.presidents.as_ref().map(|nt| &nt.table)
    }

    /// The unmatched department values of every table that had some,
    /// as (table name, values).
    pub fn unmapped_departments(&self) -> Vec<(String, Vec<String>)> {
        let mut all: Vec<&NormalizedTable> = vec![
            &self.cases,
            &self.victims,
            &self.kidnap_cases,
            &self.kidnap_victims,
        ];
        all.extend(self.presidents.iter());
        all.iter()
            .filter(|nt| !nt.unmapped_departments.is_empty())
            .map(|nt| (nt.table.name.clone(), nt.unmapped_departments.clone()))
            .collect()
    }

    /// The year options, taken from the massacre cases and victims.
    pub fn selectable_years(&self) -> Vec<YearScope> {
        scope::selectable_years(&[self.cases(), self.victims()])
    }

    /// Derives every table for the given scope.
    ///
    /// Either all the tables are produced, or an error is returned.
    pub fn compute<G: Clone>(
        &self,
        scope: YearScope,
        polygons: &PolygonDataset<G>,
    ) -> Result<DashboardTables<G>, StatsErrors> {
        info!("Computing tables for {}", scope);
        let scoped = crate::scope::filter_tables(
            &[
                self.cases(),
                self.victims(),
                self.kidnap_cases(),
                self.kidnap_victims(),
            ],
            scope,
        )?;
        let (cases, victims, kidnap_cases, kidnap_victims) =
            (&scoped[0], &scoped[1], &scoped[2], &scoped[3]);

        let totals = Totals {
            cases: cases.len() as u64,
            victims: victims.len() as u64,
            kidnap_cases: kidnap_cases.len() as u64,
            kidnap_victims: kidnap_victims.len() as u64,
        };
        debug!("compute: totals: {:?}", totals);

        let departments = aggregate::department_table(cases, victims, &self.person_column)?;
        let map = geo::join_polygons(polygons, &departments, self.registry)?;

        let kidnap_timeline =
            aggregate::kidnap_timeline(self.kidnap_cases(), self.kidnap_victims())?;
        let presidents = match self.presidents() {
            Some(p) => Some(aggregate::presidents_comparison(
                p,
                self.kidnap_cases(),
                self.cases(),
            )?),
            None => None,
        };

        Ok(DashboardTables {
            scope,
            totals,
            departments,
            map,
            sex_distribution: aggregate::distribution(victims, columns::SEX),
            responsible_distribution: aggregate::distribution(self.cases(), columns::RESPONSIBLE),
            modality_trends: aggregate::year_category_counts(self.cases(), columns::MODALITY),
            responsible_trends: aggregate::year_category_counts(
                self.cases(),
                columns::RESPONSIBLE,
            ),
            kidnap_responsible_trends: aggregate::year_category_counts(
                self.kidnap_cases(),
                columns::RESPONSIBLE,
            ),
            occupation_terms: aggregate::occupation_terms(self.victims()),
            kidnap_timeline,
            presidents,
        })
    }
}
