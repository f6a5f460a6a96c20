use crate::atlas::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

/// The departments polygons used when none are configured.
pub const DEFAULT_POLYGONS: &str = "gadm41_COL_shp/gadm41_COL_1.geojson";

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputFiles {
    pub cases: Option<String>,
    pub victims: Option<String>,
    #[serde(rename = "kidnapCases")]
    pub kidnap_cases: Option<String>,
    #[serde(rename = "kidnapVictims")]
    pub kidnap_victims: Option<String>,
    pub presidents: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct AtlasConfig {
    #[serde(default)]
    pub inputs: InputFiles,
    pub polygons: Option<String>,
    pub year: Option<i64>,
    #[serde(rename = "personColumn")]
    pub person_column: Option<String>,
    #[serde(rename = "outputFile")]
    pub output_file: Option<String>,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
}

impl AtlasConfig {
    pub fn scope(&self) -> YearScope {
        match self.year {
            Some(y) => YearScope::Year(y),
            None => YearScope::AllYears,
        }
    }

    pub fn person_column(&self) -> &str {
        self.person_column.as_deref().unwrap_or(columns::PERSON_ID)
    }

    pub fn polygons_path(&self) -> String {
        self.polygons
            .clone()
            .unwrap_or_else(|| DEFAULT_POLYGONS.to_string())
    }

    /// Makes the relative paths of the configuration relative to `root`.
    fn resolve_paths(&mut self, root: &Path) {
        let resolve = |p: &mut Option<String>| {
            let resolved = match p.as_deref() {
                Some(s) if s != "stdout" && Path::new(s).is_relative() => {
                    Some(root.join(s).display().to_string())
                }
                _ => None,
            };
            if resolved.is_some() {
                *p = resolved;
            }
        };
        resolve(&mut self.inputs.cases);
        resolve(&mut self.inputs.victims);
        resolve(&mut self.inputs.kidnap_cases);
        resolve(&mut self.inputs.kidnap_victims);
        resolve(&mut self.inputs.presidents);
        resolve(&mut self.polygons);
        resolve(&mut self.output_file);
    }

    /// The flags given on the command line take precedence.
    fn override_with(&mut self, args: &Args) {
        let set = |target: &mut Option<String>, value: &Option<String>| {
            if value.is_some() {
                *target = value.clone();
            }
        };
        set(&mut self.inputs.cases, &args.cases);
        set(&mut self.inputs.victims, &args.victims);
        set(&mut self.inputs.kidnap_cases, &args.kidnap_cases);
        set(&mut self.inputs.kidnap_victims, &args.kidnap_victims);
        set(&mut self.inputs.presidents, &args.presidents);
        set(&mut self.polygons, &args.polygons);
        set(&mut self.output_file, &args.out);
        set(&mut self.person_column, &args.person_column);
        set(&mut self.excel_worksheet_name, &args.excel_worksheet_name);
        if args.year.is_some() {
            self.year = args.year;
        }
    }
}

/// Reads a configuration file. Relative paths are resolved against the
/// directory of the file.
pub fn read_config(path: &str) -> AtlasResult<AtlasConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let mut config: AtlasConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    if let Some(root) = Path::new(path).parent() {
        config.resolve_paths(root);
    }
    Ok(config)
}

pub fn read_summary(path: &str) -> AtlasResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    Ok(js)
}

/// The configuration file if any, overridden by the command line.
pub fn load_config(args: &Args) -> AtlasResult<AtlasConfig> {
    let mut config = match args.config.as_deref() {
        Some(p) => read_config(p)?,
        None => AtlasConfig::default(),
    };
    config.override_with(args);
    Ok(config)
}
