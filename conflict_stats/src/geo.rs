use log::{debug, info};
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::config::*;
use crate::registry::DepartmentRegistry;

/// One polygon of the administrative map. The geometry is opaque here and is
/// never modified.
#[derive(PartialEq, Debug, Clone)]
pub struct PolygonFeature<G> {
    /// The `NAME_1` attribute.
    pub name: String,
    pub geometry: G,
}

#[derive(PartialEq, Debug, Clone)]
pub struct PolygonDataset<G> {
    pub features: Vec<PolygonFeature<G>>,
}

impl<G> PolygonDataset<G> {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// A polygon with the statistics of its department. Counts are 0 when the
/// department has no statistics.
#[derive(PartialEq, Debug, Clone)]
pub struct MapRow<G> {
    pub name: String,
    pub geometry: G,
    pub cases: u64,
    pub victims: u64,
}

/// Coverage gaps found while joining. These do not stop the join.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct JoinReport {
    /// Polygon names that are not canonical department names. Their counts are
    /// always 0.
    pub polygons_outside_registry: Vec<String>,
    /// Departments with statistics but no polygon to show them.
    pub departments_without_polygon: Vec<String>,
}

#[derive(PartialEq, Debug, Clone)]
pub struct MergedMap<G> {
    pub rows: Vec<MapRow<G>>,
    pub report: JoinReport,
}

/// Left join of the department table onto the polygons, on `NAME_1 = Department`.
///
/// The result has exactly one row per polygon, in polygon order.
pub fn join_polygons<G: Clone>(
    polygons: &PolygonDataset<G>,
    departments: &[DepartmentCounts],
    registry: &DepartmentRegistry,
) -> Result<MergedMap<G>, StatsErrors> {
    if polygons.is_empty() {
        return Err(StatsErrors::EmptyPolygonDataset);
    }
    let stats: HashMap<&str, &DepartmentCounts> = departments
        .iter()
        .map(|d| (d.department.as_str(), d))
        .collect();

    let mut report = JoinReport::default();
    let mut rows: Vec<MapRow<G>> = Vec::with_capacity(polygons.len());
    for f in polygons.features.iter() {
        if !registry.contains(&f.name) && !report.polygons_outside_registry.contains(&f.name) {
            report.polygons_outside_registry.push(f.name.clone());
        }
        let (cases, victims) = stats
            .get(f.name.as_str())
            .map(|d| (d.cases, d.victims))
            .unwrap_or((0, 0));
        rows.push(MapRow {
            name: f.name.clone(),
            geometry: f.geometry.clone(),
            cases,
            victims,
        });
    }

    let polygon_names: BTreeSet<&str> =
        polygons.features.iter().map(|f| f.name.as_str()).collect();
    report.departments_without_polygon = departments
        .iter()
        .filter(|d| !polygon_names.contains(d.department.as_str()))
        .map(|d| d.department.clone())
        .collect();

    debug!(
        "join_polygons: {} rows, {} polygons outside the registry, {} departments without polygon",
        rows.len(),
        report.polygons_outside_registry.len(),
        report.departments_without_polygon.len()
    );
    Ok(MergedMap { rows, report })
}

/// The polygon dataset of a session.
///
/// The dataset is read on the first call to `get_or_load` and the same one is
/// returned afterwards. It is never modified once loaded.
#[derive(Debug)]
pub struct PolygonHandle<G> {
    path: PathBuf,
    dataset: OnceLock<PolygonDataset<G>>,
}

impl<G> PolygonHandle<G> {
    pub fn new<P: Into<PathBuf>>(path: P) -> PolygonHandle<G> {
        PolygonHandle {
            path: path.into(),
            dataset: OnceLock::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_loaded(&self) -> bool {
        self.dataset.get().is_some()
    }

    /// Returns the dataset, running `loader` if it has not been loaded yet.
    /// A failed load leaves the handle empty.
    pub fn get_or_load<E, F>(&self, loader: F) -> Result<&PolygonDataset<G>, E>
    where
        F: FnOnce(&Path) -> Result<PolygonDataset<G>, E>,
    {
        if let Some(ds) = self.dataset.get() {
            return Ok(ds);
        }
        let loaded = loader(&self.path)?;
        info!(
            "Loaded {} polygons from {}",
            loaded.len(),
            self.path.display()
        );
        Ok(self.dataset.get_or_init(|| loaded))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::COLOMBIA_DEPARTMENTS;

    fn dataset(names: &[&str]) -> PolygonDataset<u32> {
        PolygonDataset {
            features: names
                .iter()
                .enumerate()
                .map(|(idx, n)| PolygonFeature {
                    name: n.to_string(),
                    geometry: idx as u32,
                })
                .collect(),
        }
    }

    fn counts(department: &str, cases: u64, victims: u64) -> DepartmentCounts {
        DepartmentCounts {
            department: department.to_string(),
            cases,
            victims,
        }
    }

    #[test]
    fn every_polygon_is_kept() {
        let reg = DepartmentRegistry::colombia().unwrap();
        let mut names: Vec<&str> = COLOMBIA_DEPARTMENTS.to_vec();
        names.push("Lago de Tota");
        let polygons = dataset(&names);
        assert_eq!(polygons.len(), 33);

        let stats: Vec<DepartmentCounts> = COLOMBIA_DEPARTMENTS[..20]
            .iter()
            .map(|n| counts(n, 2, 5))
            .collect();
        let merged = join_polygons(&polygons, &stats, &reg).unwrap();
        assert_eq!(merged.rows.len(), 33);
        let zeros = merged
            .rows
            .iter()
            .filter(|r| r.cases == 0 && r.victims == 0)
            .count();
        assert_eq!(zeros, 13);
        // Geometries come through untouched and in order.
        let geoms: Vec<u32> = merged.rows.iter().map(|r| r.geometry).collect();
        assert_eq!(geoms, (0..33).collect::<Vec<u32>>());
        assert_eq!(
            merged.report.polygons_outside_registry,
            vec!["Lago de Tota".to_string()]
        );
        assert!(merged.report.departments_without_polygon.is_empty());
    }

    #[test]
    fn unidentified_has_no_polygon() {
        let reg = DepartmentRegistry::colombia().unwrap();
        let polygons = dataset(&["Meta", "Huila"]);
        let stats = vec![counts("Huila", 1, 1), counts(UNIDENTIFIED, 4, 0)];
        let merged = join_polygons(&polygons, &stats, &reg).unwrap();
        assert_eq!(
            merged.rows,
            vec![
                MapRow {
                    name: "Meta".to_string(),
                    geometry: 0,
                    cases: 0,
                    victims: 0
                },
                MapRow {
                    name: "Huila".to_string(),
                    geometry: 1,
                    cases: 1,
                    victims: 1
                },
            ]
        );
        assert_eq!(
            merged.report.departments_without_polygon,
            vec![UNIDENTIFIED.to_string()]
        );
    }

    #[test]
    fn empty_dataset_is_an_error() {
        let reg = DepartmentRegistry::colombia().unwrap();
        let polygons: PolygonDataset<u32> = dataset(&[]);
        assert_eq!(
            join_polygons(&polygons, &[counts("Meta", 1, 1)], &reg),
            Err(StatsErrors::EmptyPolygonDataset)
        );
    }

    #[test]
    fn handle_loads_once() {
        let handle: PolygonHandle<u32> = PolygonHandle::new("map.geojson");
        assert!(!handle.is_loaded());

        let failed: Result<&PolygonDataset<u32>, String> =
            handle.get_or_load(|_| Err("unreadable".to_string()));
        assert!(failed.is_err());
        assert!(!handle.is_loaded());

        let first: Result<&PolygonDataset<u32>, String> = handle.get_or_load(|p| {
            assert_eq!(p, Path::new("map.geojson"));
            Ok(dataset(&["Meta"]))
        });
        assert_eq!(first.unwrap().len(), 1);

        let second: Result<&PolygonDataset<u32>, String> =
            handle.get_or_load(|_| panic!("the dataset should be cached"));
        assert_eq!(second.unwrap().features[0].name, "Meta");
        assert!(handle.is_loaded());
    }
}
