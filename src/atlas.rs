pub mod config_reader;
pub mod io_common;
pub mod io_csv;
pub mod io_excel;
pub mod io_geojson;

use log::{debug, info, warn};

use conflict_stats::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::Path;

use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::atlas::config_reader::*;
use crate::atlas::io_common::cell_to_json;

#[derive(Debug, Snafu)]
pub enum AtlasError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("No worksheet {name} in {path}"))]
    MissingWorksheet { path: String, name: String },
    #[snafu(display("The spreadsheet {path} has no header row"))]
    EmptyExcel { path: String },
    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading line {lineno} of {path}"))]
    CsvLineParse {
        source: csv::Error,
        path: String,
        lineno: usize,
    },
    #[snafu(display("Unsupported file type for {path}: expected .xlsx or .csv"))]
    UnsupportedFormat { path: String },
    #[snafu(display("Error reading {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing the JSON in {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error formatting the summary"))]
    SerializingJson { source: serde_json::Error },
    #[snafu(display("Invalid GeoJSON in {path}: {message}"))]
    InvalidGeoJson { path: String, message: String },
    #[snafu(display("Missing input file: {name}"))]
    MissingInput { name: String },
    #[snafu(display("Error writing {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("{source}"))]
    Stats { source: StatsErrors },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type AtlasResult<T> = Result<T, AtlasError>;

/// Reads a table, choosing the reader from the file extension.
pub fn read_table(path: &str, worksheet: Option<&str>) -> AtlasResult<Table> {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());
    info!("Attempting to read {:?}", path);
    match ext.as_deref() {
        Some("xlsx") | Some("xlsm") => io_excel::read_excel_table(path, worksheet),
        Some("csv") => io_csv::read_csv_table(path),
        _ => UnsupportedFormatSnafu { path }.fail(),
    }
}

fn required<'a>(name: &str, path: &'a Option<String>) -> AtlasResult<&'a str> {
    path.as_deref().context(MissingInputSnafu { name })
}

/// Reads the input tables. All the required files must be configured before
/// any of them is read.
pub fn read_inputs(config: &AtlasConfig) -> AtlasResult<DashboardInputs> {
    let cases_p = required("cases", &config.inputs.cases)?;
    let victims_p = required("victims", &config.inputs.victims)?;
    let kidnap_cases_p = required("kidnapCases", &config.inputs.kidnap_cases)?;
    let kidnap_victims_p = required("kidnapVictims", &config.inputs.kidnap_victims)?;

    let sheet = config.excel_worksheet_name.as_deref();
    let presidents = match config.inputs.presidents.as_deref() {
        Some(p) => Some(read_table(p, sheet)?),
        None => None,
    };
    Ok(DashboardInputs {
        cases: read_table(cases_p, sheet)?,
        victims: read_table(victims_p, sheet)?,
        kidnap_cases: read_table(kidnap_cases_p, sheet)?,
        kidnap_victims: read_table(kidnap_victims_p, sheet)?,
        presidents,
    })
}

fn scope_to_json(scope: &YearScope) -> JSValue {
    match scope {
        YearScope::AllYears => json!(scope.to_string()),
        YearScope::Year(y) => json!(y),
    }
}

fn label_counts_to_json(label_name: &str, counts: &Option<Vec<LabelCount>>) -> JSValue {
    match counts {
        Some(l) => l
            .iter()
            .map(|lc| {
                let mut m: JSMap<String, JSValue> = JSMap::new();
                m.insert(label_name.to_string(), json!(lc.label));
                m.insert("Cantidad".to_string(), json!(lc.count));
                JSValue::Object(m)
            })
            .collect(),
        None => JSValue::Null,
    }
}

fn trends_to_json(category_name: &str, trends: &Option<Vec<YearCategoryCount>>) -> JSValue {
    match trends {
        Some(l) => l
            .iter()
            .map(|t| {
                let mut m: JSMap<String, JSValue> = JSMap::new();
                m.insert(columns::YEAR.to_string(), json!(t.year));
                m.insert(category_name.to_string(), json!(t.category));
                m.insert("Cantidad".to_string(), json!(t.count));
                JSValue::Object(m)
            })
            .collect(),
        None => JSValue::Null,
    }
}

/// The merged map table as a GeoJSON feature collection.
fn map_to_json(map: &MergedMap<JSValue>) -> JSValue {
    let features: Vec<JSValue> = map
        .rows
        .iter()
        .map(|r| {
            json!({
                "type": "Feature",
                "properties": {
                    "NAME_1": r.name,
                    "Casos": r.cases,
                    "Víctimas": r.victims,
                },
                "geometry": r.geometry,
            })
        })
        .collect();
    json!({"type": "FeatureCollection", "features": features})
}

fn tables_to_json(tables: &DashboardTables<JSValue>) -> JSMap<String, JSValue> {
    let mut m: JSMap<String, JSValue> = JSMap::new();
    m.insert(
        "totals".to_string(),
        json!({
            "casos": tables.totals.cases,
            "victimas": tables.totals.victims,
            "casosSecuestros": tables.totals.kidnap_cases,
            "victimasSecuestros": tables.totals.kidnap_victims,
        }),
    );
    let departments: Vec<JSValue> = tables
        .departments
        .iter()
        .map(|d| json!({"Departamento": d.department, "Casos": d.cases, "Víctimas": d.victims}))
        .collect();
    m.insert("departments".to_string(), json!(departments));
    m.insert("map".to_string(), map_to_json(&tables.map));
    m.insert(
        "mapReport".to_string(),
        json!({
            "polygonsOutsideRegistry": tables.map.report.polygons_outside_registry,
            "departmentsWithoutPolygon": tables.map.report.departments_without_polygon,
        }),
    );
    m.insert(
        "sexDistribution".to_string(),
        label_counts_to_json(columns::SEX, &tables.sex_distribution),
    );
    m.insert(
        "responsibleDistribution".to_string(),
        label_counts_to_json(columns::RESPONSIBLE, &tables.responsible_distribution),
    );
    m.insert(
        "modalityTrends".to_string(),
        trends_to_json(columns::MODALITY, &tables.modality_trends),
    );
    m.insert(
        "responsibleTrends".to_string(),
        trends_to_json(columns::RESPONSIBLE, &tables.responsible_trends),
    );
    m.insert(
        "kidnapResponsibleTrends".to_string(),
        trends_to_json(columns::RESPONSIBLE, &tables.kidnap_responsible_trends),
    );
    m.insert(
        "occupationTerms".to_string(),
        label_counts_to_json(columns::OCCUPATION, &tables.occupation_terms),
    );
    let timeline: Vec<JSValue> = tables
        .kidnap_timeline
        .iter()
        .map(|k| {
            json!({
                "Año": k.year,
                "Casos de Secuestros": k.cases,
                "Víctimas de Secuestros": k.victims,
            })
        })
        .collect();
    m.insert("kidnapTimeline".to_string(), json!(timeline));
    let presidents: JSValue = match &tables.presidents {
        Some(l) => l
            .iter()
            .map(|p| {
                json!({
                    "Año": cell_to_json(&p.year),
                    "Presidente": p.president,
                    "Cantidad Secuestros": p.kidnappings,
                    "Cantidad Masacres": p.massacres,
                })
            })
            .collect(),
        None => JSValue::Null,
    };
    m.insert("presidents".to_string(), presidents);
    m
}

/// Logs the unmapped department values and returns them by table.
fn report_unmapped(session: &Session) -> JSMap<String, JSValue> {
    let mut m: JSMap<String, JSValue> = JSMap::new();
    for (table, values) in session.unmapped_departments() {
        warn!(
            "Departments not mapped correctly in {}: {:?}",
            table, values
        );
        m.insert(table, json!(values));
    }
    m
}

/// Computes every table for the scope and assembles the summary.
pub fn build_summary_js(
    session: &Session,
    scope: YearScope,
    polygons: &PolygonHandle<JSValue>,
) -> AtlasResult<JSValue> {
    let options = session.selectable_years();
    if !options.contains(&scope) {
        warn!("No massacre record for the year {}", scope);
    }
    let dataset = polygons.get_or_load(io_geojson::read_polygons)?;
    let tables = session.compute(scope, dataset).context(StatsSnafu {})?;
    if !tables.map.report.polygons_outside_registry.is_empty() {
        warn!(
            "Polygons with no matching department, shown with 0: {:?}",
            tables.map.report.polygons_outside_registry
        );
    }

    let mut m: JSMap<String, JSValue> = JSMap::new();
    m.insert("year".to_string(), scope_to_json(&scope));
    m.insert(
        "selectableYears".to_string(),
        options.iter().map(scope_to_json).collect(),
    );
    m.insert(
        "unmappedDepartments".to_string(),
        JSValue::Object(report_unmapped(session)),
    );
    m.extend(tables_to_json(&tables));
    Ok(JSValue::Object(m))
}

fn write_output(out: &Option<String>, contents: &str) -> AtlasResult<()> {
    match out.as_deref() {
        None | Some("stdout") => {
            println!("{}", contents);
        }
        Some(path) => {
            info!("Writing summary to {:?}", path);
            fs::write(path, contents).context(WritingOutputSnafu { path })?;
        }
    }
    Ok(())
}

fn check_reference(reference_path: &str, pretty_js_stats: &str) -> AtlasResult<()> {
    let summary_ref = read_summary(reference_path)?;
    let pretty_js_summary_ref =
        serde_json::to_string_pretty(&summary_ref).context(SerializingJsonSnafu {})?;
    if pretty_js_summary_ref != pretty_js_stats {
        warn!("Found differences with the reference string");
        print_diff(pretty_js_summary_ref.as_str(), pretty_js_stats, "\n");
        whatever!("Difference detected between calculated summary and reference summary")
    }
    Ok(())
}

pub fn run_atlas(args: &Args) -> AtlasResult<()> {
    let config = load_config(args)?;
    info!("config: {:?}", config);

    let registry = DepartmentRegistry::colombia().context(StatsSnafu {})?;
    let inputs = read_inputs(&config)?;
    let session = Session::new(&registry, &inputs, config.person_column());

    if args.list_years {
        for y in session.selectable_years() {
            println!("{}", y);
        }
        return Ok(());
    }

    let polygons: PolygonHandle<JSValue> = PolygonHandle::new(config.polygons_path());
    let result_js = build_summary_js(&session, config.scope(), &polygons)?;
    debug!("summary built");

    let pretty_js_stats =
        serde_json::to_string_pretty(&result_js).context(SerializingJsonSnafu {})?;
    write_output(&config.output_file, &pretty_js_stats)?;

    // The reference summary, if provided for comparison
    if let Some(reference_path) = args.reference.as_deref() {
        check_reference(reference_path, &pretty_js_stats)?;
    }
    Ok(())
}
