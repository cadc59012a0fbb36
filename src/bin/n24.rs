//! n24 CLI - Command-line interface for n24-drift
//!
//! Commands:
//! - analyze: Drift, cycle length and predictions for a sleep log
//! - predict: Predicted sleep windows only
//! - groups: Day groups with main sleep and naps
//! - validate: Data-quality report for a sleep log
//! - schema: Print input/output schema information

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use n24_drift::encoder::AnalysisEncoder;
use n24_drift::format::{
    format_cycle_length, format_duration, format_rating, format_signed_duration,
};
use n24_drift::pipeline::DriftProcessor;
use n24_drift::schema::{RecordAdapter, SCHEMA_VERSION};
use n24_drift::types::{Analysis, DayGroup, PredictedRecord, SleepKind, SleepRecord};
use n24_drift::{ComputeError, EngineConfig, RecordStore, DRIFT_VERSION};

/// n24 - Circadian drift analysis for non-24-hour sleep logs
#[derive(Parser)]
#[command(name = "n24")]
#[command(version = DRIFT_VERSION)]
#[command(about = "Measure sleep drift and predict upcoming sleep windows", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a sleep log: drift, cycle length, averages and predictions
    Analyze {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        config: ConfigArgs,

        /// Output format
        #[arg(long, default_value = "text")]
        output_format: OutputFormat,
    },

    /// Print only the predicted sleep windows
    Predict {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        config: ConfigArgs,

        /// Output format
        #[arg(long, default_value = "text")]
        output_format: OutputFormat,
    },

    /// Print the day groups of the visible records
    Groups {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        config: ConfigArgs,

        /// Output format
        #[arg(long, default_value = "text")]
        output_format: OutputFormat,
    },

    /// Validate a sleep log
    Validate {
        #[command(flatten)]
        input: InputArgs,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print schema information
    Schema {
        /// Schema to print (input or output)
        #[arg(value_enum)]
        schema_type: SchemaType,

        /// Output as JSON schema
        #[arg(long)]
        json_schema: bool,
    },
}

#[derive(Args)]
struct InputArgs {
    /// Input file path (use - for stdin)
    #[arg(short, long)]
    input: PathBuf,

    /// Input format
    #[arg(long, default_value = "json")]
    input_format: InputFormat,
}

#[derive(Args)]
struct ConfigArgs {
    /// Load engine configuration from a JSON file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of most recent records to show (0 = all)
    #[arg(long)]
    max_entries: Option<usize>,

    /// Number of days to predict
    #[arg(long)]
    prediction_days: Option<usize>,

    /// Trailing number of days used for drift averaging
    #[arg(long)]
    averaging_days: Option<usize>,

    /// Disable predictions
    #[arg(long)]
    no_predictions: bool,
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// JSON array of records
    Json,
    /// Newline-delimited JSON (one record per line)
    Ndjson,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable report
    Text,
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

#[derive(Clone, ValueEnum)]
enum SchemaType {
    /// Input schema (sleep_log.v1)
    Input,
    /// Output schema (analysis payload)
    Output,
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e)).unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so stdout stays machine-readable
fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("n24_drift=warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn run(cli: Cli) -> Result<(), N24CliError> {
    match cli.command {
        Commands::Analyze {
            input,
            config,
            output_format,
        } => cmd_analyze(&input, &config, output_format),

        Commands::Predict {
            input,
            config,
            output_format,
        } => cmd_predict(&input, &config, output_format),

        Commands::Groups {
            input,
            config,
            output_format,
        } => cmd_groups(&input, &config, output_format),

        Commands::Validate { input, json } => cmd_validate(&input, json),

        Commands::Schema {
            schema_type,
            json_schema,
        } => cmd_schema(schema_type, json_schema),
    }
}

fn cmd_analyze(
    input: &InputArgs,
    config_args: &ConfigArgs,
    output_format: OutputFormat,
) -> Result<(), N24CliError> {
    let store = load_store(input)?;
    let config = load_config(config_args)?;
    let processor = DriftProcessor::new(store);

    match output_format {
        OutputFormat::Text => print_report(&processor.analyze(&config)),
        OutputFormat::Json => {
            let payload =
                AnalysisEncoder::new().encode(processor.store(), &config, processor.analyze(&config));
            println!("{}", serde_json::to_string(&payload)?);
        }
        OutputFormat::JsonPretty => println!("{}", processor.analyze_to_json(&config)?),
    }

    Ok(())
}

fn cmd_predict(
    input: &InputArgs,
    config_args: &ConfigArgs,
    output_format: OutputFormat,
) -> Result<(), N24CliError> {
    let store = load_store(input)?;
    let config = load_config(config_args)?;
    let predictions = n24_drift::predict(&store, &config);

    match output_format {
        OutputFormat::Text => {
            if predictions.is_empty() {
                println!("No predictions");
            }
            for p in &predictions {
                print_record_line(&p.record, "Predicted");
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string(&predictions)?),
        OutputFormat::JsonPretty => println!("{}", serde_json::to_string_pretty(&predictions)?),
    }

    Ok(())
}

fn cmd_groups(
    input: &InputArgs,
    config_args: &ConfigArgs,
    output_format: OutputFormat,
) -> Result<(), N24CliError> {
    let store = load_store(input)?;
    let config = load_config(config_args)?;
    let analysis = n24_drift::analyze(&store, &config);

    let views: Vec<GroupView> = analysis
        .groups
        .iter()
        .map(|g| GroupView::new(g, &analysis.records))
        .collect();

    match output_format {
        OutputFormat::Text => {
            for view in &views {
                println!("{}", view.date);
                for entry in &view.records {
                    let label = match entry.kind {
                        SleepKind::Main => "Main",
                        SleepKind::Nap => "Nap",
                    };
                    print_record_line(&entry.record, label);
                }
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string(&views)?),
        OutputFormat::JsonPretty => println!("{}", serde_json::to_string_pretty(&views)?),
    }

    Ok(())
}

fn cmd_validate(input: &InputArgs, json: bool) -> Result<(), N24CliError> {
    let records = parse_records(input)?;
    let results = RecordAdapter::validate_records(&records);

    let report = ValidationReport {
        schema_version: SCHEMA_VERSION.to_string(),
        total_records: records.len(),
        valid_records: records.len() - results.len(),
        invalid_records: results.len(),
        errors: results
            .iter()
            .map(|r| ValidationErrorDetail {
                index: r.index,
                error: r.error.to_string(),
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total records:   {}", report.total_records);
        println!("Valid records:   {}", report.valid_records);
        println!("Invalid records: {}", report.invalid_records);

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for err in &report.errors {
                println!("  - Record {}: {}", err.index, err.error);
            }
        }
    }

    if report.invalid_records > 0 {
        Err(N24CliError::ValidationFailed(report.invalid_records))
    } else {
        Ok(())
    }
}

fn cmd_schema(schema_type: SchemaType, json_schema: bool) -> Result<(), N24CliError> {
    match schema_type {
        SchemaType::Input => {
            if json_schema {
                println!("{}", get_input_json_schema());
            } else {
                println!("Input Schema: {}", SCHEMA_VERSION);
                println!();
                println!("A JSON array (or NDJSON stream) of sleep records:");
                println!();
                println!("- sleep:  timestamp the person fell asleep (ISO 8601)");
                println!("- wake:   timestamp the person woke up (ISO 8601)");
                println!("- rating: subjective quality 1-5 (default 3)");
                println!("- note:   free text (default empty)");
                println!();
                println!("Timestamps without an offset are read as UTC.");
                println!("Unreadable timestamps are kept and treated as missing values.");
            }
        }
        SchemaType::Output => {
            if json_schema {
                println!("{}", get_output_json_schema());
            } else {
                println!("Output Schema: analysis payload");
                println!();
                println!("- format_version, computed_at_utc");
                println!("- producer: {{ name, version, instance_id }}");
                println!("- config: {{ max_entries, prediction_days, averaging_days, show_predictions }}");
                println!("- coverage: {{ total_records, visible_records, distinct_days, main_sleep_entries, invalid_timestamps }}");
                println!("- analysis:");
                println!("  - records: visible records, oldest first");
                println!("  - groups: [{{ date, indices, main }}]");
                println!("  - drift: {{ sleep_drift_ms, wake_drift_ms, avg_rating }}");
                println!("  - metrics: {{ cycle_length_days, total_drift_ms, visible_drift_ms, avg_sleep_all_days_ms, avg_sleep_visible_days_ms }}");
                println!("  - predictions: [{{ sleep, wake, rating, note, predicted }}]");
                println!();
                println!("Durations are milliseconds; figures with no data are null.");
            }
        }
    }

    Ok(())
}

// Helper functions

fn read_input(path: &Path) -> Result<String, N24CliError> {
    if path.to_string_lossy() == "-" {
        if atty::is(atty::Stream::Stdin) {
            return Err(N24CliError::NoInput);
        }
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(path)?)
    }
}

fn parse_records(input: &InputArgs) -> Result<Vec<SleepRecord>, N24CliError> {
    let data = read_input(&input.input)?;
    let records = match input.input_format {
        InputFormat::Json => RecordAdapter::parse_array(&data)?,
        InputFormat::Ndjson => RecordAdapter::parse_ndjson(&data)?,
    };
    debug!(records = records.len(), "input parsed");
    Ok(records)
}

fn load_store(input: &InputArgs) -> Result<RecordStore, N24CliError> {
    let records = parse_records(input)?;
    if records.is_empty() {
        return Err(N24CliError::NoRecords);
    }
    Ok(RecordStore::new(records))
}

/// Config file first, then individual flags on top
fn load_config(args: &ConfigArgs) -> Result<EngineConfig, N24CliError> {
    let mut config = match &args.config {
        Some(path) => EngineConfig::from_json(&fs::read_to_string(path)?)?,
        None => EngineConfig::default(),
    };

    if let Some(max_entries) = args.max_entries {
        config.max_entries = max_entries;
    }
    if let Some(prediction_days) = args.prediction_days {
        config.prediction_days = prediction_days;
    }
    if let Some(averaging_days) = args.averaging_days {
        config.averaging_days = Some(averaging_days);
    }
    if args.no_predictions {
        config.show_predictions = false;
    }

    config.validate()?;
    Ok(config)
}

fn print_report(analysis: &Analysis) {
    let metrics = &analysis.metrics;

    println!("Sleep Drift Report");
    println!("==================");
    println!("Sleep drift:      {} per day", format_signed_duration(analysis.drift.sleep_drift_ms));
    println!("Wake drift:       {} per day", format_signed_duration(analysis.drift.wake_drift_ms));
    println!("Visible drift:    {} per day", format_signed_duration(metrics.visible_drift_ms));
    println!("Cycle length:     {}", format_cycle_length(metrics.cycle_length_days));
    println!("Avg sleep (all):  {}", format_duration(metrics.avg_sleep_all_days_ms));
    println!("Avg sleep (view): {}", format_duration(metrics.avg_sleep_visible_days_ms));
    println!("Avg rating:       {}", format_rating(analysis.drift.avg_rating));

    println!("\nRecords:");
    for group in analysis.groups.iter().rev() {
        for &index in group.indices.iter().rev() {
            if let (Some(record), Some(kind)) = (analysis.records.get(index), group.kind_of(index)) {
                let label = match kind {
                    SleepKind::Main => "Main",
                    SleepKind::Nap => "Nap",
                };
                print_record_line(record, label);
            }
        }
    }

    if !analysis.predictions.is_empty() {
        println!("\nPredictions:");
        for PredictedRecord { record, .. } in &analysis.predictions {
            print_record_line(record, "Predicted");
        }
    }
}

fn print_record_line(record: &SleepRecord, label: &str) {
    println!(
        "  {:<9} {} -> {}  {:>8}  {}/5  {}",
        label,
        record.sleep,
        record.wake,
        format_duration(record.duration_ms()),
        record.rating,
        record.note
    );
}

fn get_input_json_schema() -> String {
    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": SCHEMA_VERSION,
        "description": "Sleep log record",
        "type": "array",
        "items": {
            "type": "object",
            "required": ["sleep", "wake"],
            "properties": {
                "sleep": { "type": "string", "format": "date-time" },
                "wake": { "type": "string", "format": "date-time" },
                "rating": { "type": "integer", "minimum": 1, "maximum": 5, "default": 3 },
                "note": { "type": "string", "default": "" }
            }
        }
    })
    .to_string()
}

fn get_output_json_schema() -> String {
    let nullable_ms = serde_json::json!({ "type": ["number", "null"] });
    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "n24 analysis payload",
        "type": "object",
        "required": ["format_version", "producer", "computed_at_utc", "config", "coverage", "analysis"],
        "properties": {
            "format_version": { "type": "string" },
            "producer": {
                "type": "object",
                "properties": {
                    "name": { "type": "string" },
                    "version": { "type": "string" },
                    "instance_id": { "type": "string" }
                }
            },
            "computed_at_utc": { "type": "string", "format": "date-time" },
            "config": { "type": "object" },
            "coverage": { "type": "object" },
            "analysis": {
                "type": "object",
                "properties": {
                    "records": { "type": "array" },
                    "groups": { "type": "array" },
                    "drift": {
                        "type": "object",
                        "properties": {
                            "sleep_drift_ms": nullable_ms,
                            "wake_drift_ms": nullable_ms,
                            "avg_rating": nullable_ms
                        }
                    },
                    "metrics": {
                        "type": "object",
                        "properties": {
                            "cycle_length_days": { "type": "integer", "minimum": 0 },
                            "total_drift_ms": nullable_ms,
                            "visible_drift_ms": nullable_ms,
                            "avg_sleep_all_days_ms": nullable_ms,
                            "avg_sleep_visible_days_ms": nullable_ms
                        }
                    },
                    "predictions": { "type": "array" }
                }
            }
        }
    })
    .to_string()
}

// Error types

#[derive(Debug)]
enum N24CliError {
    Io(io::Error),
    Compute(ComputeError),
    Json(serde_json::Error),
    NoInput,
    NoRecords,
    ValidationFailed(usize),
}

impl From<io::Error> for N24CliError {
    fn from(e: io::Error) -> Self {
        N24CliError::Io(e)
    }
}

impl From<ComputeError> for N24CliError {
    fn from(e: ComputeError) -> Self {
        N24CliError::Compute(e)
    }
}

impl From<serde_json::Error> for N24CliError {
    fn from(e: serde_json::Error) -> Self {
        N24CliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<N24CliError> for CliError {
    fn from(e: N24CliError) -> Self {
        match e {
            N24CliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            N24CliError::Compute(ComputeError::InvalidConfig(msg)) => CliError {
                code: "INVALID_CONFIG".to_string(),
                message: msg,
                hint: Some("Check --config and the config flags".to_string()),
            },
            N24CliError::Compute(e) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some(format!("Ensure input matches the {} schema", SCHEMA_VERSION)),
            },
            N24CliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            N24CliError::NoInput => CliError {
                code: "NO_INPUT".to_string(),
                message: "stdin is a terminal, expected piped records".to_string(),
                hint: Some("Pipe a sleep log in or pass --input <file>".to_string()),
            },
            N24CliError::NoRecords => CliError {
                code: "NO_RECORDS".to_string(),
                message: "No records found in input".to_string(),
                hint: Some("Ensure input file is not empty".to_string()),
            },
            N24CliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} records failed validation", count),
                hint: Some("Fix validation errors and retry".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    schema_version: String,
    total_records: usize,
    valid_records: usize,
    invalid_records: usize,
    errors: Vec<ValidationErrorDetail>,
}

#[derive(serde::Serialize)]
struct ValidationErrorDetail {
    index: usize,
    error: String,
}

#[derive(serde::Serialize)]
struct GroupView {
    date: String,
    records: Vec<GroupEntry>,
}

#[derive(serde::Serialize)]
struct GroupEntry {
    kind: SleepKind,
    #[serde(flatten)]
    record: SleepRecord,
    duration_ms: f64,
}

impl GroupView {
    fn new(group: &DayGroup, records: &[SleepRecord]) -> Self {
        let date = match group.date {
            Some(date) => date.to_string(),
            None => n24_drift::timestamp::INVALID_DATE.to_string(),
        };
        let records = group
            .indices
            .iter()
            .filter_map(|&i| {
                let record = records.get(i)?;
                Some(GroupEntry {
                    kind: group.kind_of(i)?,
                    record: record.clone(),
                    duration_ms: record.duration_ms(),
                })
            })
            .collect();
        Self { date, records }
    }
}
