use clap::Parser;

/// Builds department and year aggregates of armed-conflict records.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON file describing the input files and the options of the run.
    /// Relative paths in this file are read from the directory of the file. Every other flag
    /// overrides the corresponding setting of this file.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path, xlsx or csv) The massacre cases.
    #[clap(long, value_parser)]
    pub cases: Option<String>,

    /// (file path, xlsx or csv) The massacre victims.
    #[clap(long, value_parser)]
    pub victims: Option<String>,

    /// (file path, xlsx or csv) The kidnapping cases.
    #[clap(long, value_parser)]
    pub kidnap_cases: Option<String>,

    /// (file path, xlsx or csv) The kidnapping victims.
    #[clap(long, value_parser)]
    pub kidnap_victims: Option<String>,

    /// (file path, xlsx or csv, optional) The presidents by year. Enables the comparison
    /// between presidential terms.
    #[clap(long, value_parser)]
    pub presidents: Option<String>,

    /// (file path, GeoJSON) The departments polygons, with a NAME_1 property.
    #[clap(long, value_parser)]
    pub polygons: Option<String>,

    /// (integer or empty) Restricts the department tables to this year. All the years are
    /// used if not specified.
    #[clap(short, long, value_parser)]
    pub year: Option<i64>,

    /// (file path, 'stdout' or empty) Where to write the JSON summary.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference summary in JSON format. If provided, the produced summary
    /// must match it.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (default Id Persona) The column identifying a victim.
    #[clap(long, value_parser)]
    pub person_column: Option<String>,

    /// (default: first worksheet) When using Excel files, the name of the worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    /// If passed as an argument, only prints the years that can be selected.
    #[clap(long, takes_value = false)]
    pub list_years: bool,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
