//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use crate::adapters::csv_adapter::{write_columns, CsvAdapter, WriteOptions};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::error::TechindError;
use crate::domain::indicator::{Column, IndicatorType};
use crate::domain::indicator_helpers::{compute_indicators, validate_indicator};
use crate::domain::indicator_parser::{self, SYNTAX};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;

#[derive(Parser, Debug)]
#[command(name = "techind", about = "Technical analysis indicators over CSV bar data")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute indicators over a CSV file and write them as CSV
    Compute(ComputeArgs),
    /// List available indicators with their default parameters
    List,
    /// Parse and validate indicator expressions
    Validate {
        #[arg(required = true)]
        expressions: Vec<String>,
    },
    /// List CSV data files in a directory
    Sources {
        #[arg(default_value = ".")]
        dir: PathBuf,
    },
}

#[derive(Args, Debug, Default, Clone)]
pub struct ComputeArgs {
    /// INI file with [data], [indicators], [output] and [logging] sections
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Input CSV file
    #[arg(short, long)]
    pub data: Option<PathBuf>,
    /// Indicator expression such as `SMA(20)`; repeatable, `;` separates several
    #[arg(short, long = "indicator")]
    pub indicators: Vec<String>,
    /// Output CSV file; stdout when absent
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    #[arg(long)]
    pub start: Option<NaiveDate>,
    #[arg(long)]
    pub end: Option<NaiveDate>,
    /// Fixed number of decimals in the output
    #[arg(long)]
    pub precision: Option<usize>,
    /// Omit the header row
    #[arg(long)]
    pub no_header: bool,
}

/// Everything `compute` needs once flags and config file are merged.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputeRequest {
    pub data: PathBuf,
    pub indicators: Vec<IndicatorType>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub output: Option<PathBuf>,
    pub options: WriteOptions,
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Compute(args) => run_compute(&args),
        Command::List => {
            init_logging(None);
            run_list()
        }
        Command::Validate { expressions } => {
            init_logging(None);
            run_validate(&expressions)
        }
        Command::Sources { dir } => {
            init_logging(None);
            run_sources(&dir)
        }
    }
}

/// Installs the stderr subscriber. `RUST_LOG` wins over `config_level`,
/// which wins over `info`.
pub fn init_logging(config_level: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config_level.unwrap_or("info")))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, TechindError> {
    FileConfigAdapter::from_file(path)
}

fn report(err: &TechindError) -> ExitCode {
    eprintln!("error: {err}");
    ExitCode::from(err)
}

fn run_compute(args: &ComputeArgs) -> ExitCode {
    let config = match args.config.as_deref().map(load_config).transpose() {
        Ok(c) => c,
        Err(e) => return report(&e),
    };
    let level = config.as_ref().and_then(|c| c.get_string("logging", "level"));
    init_logging(level.as_deref());

    let request = match build_compute_request(args, config.as_ref().map(|c| c as &dyn ConfigPort)) {
        Ok(r) => r,
        Err(e) => return report(&e),
    };

    let (base, source) = split_data_path(&request.data);
    let data_port = CsvAdapter::new(base);

    let result = match &request.output {
        Some(path) => File::create(path)
            .map_err(TechindError::from)
            .and_then(|file| run_compute_pipeline(&data_port, &source, &request, BufWriter::new(file))),
        None => run_compute_pipeline(&data_port, &source, &request, io::stdout().lock()),
    };

    match result {
        Ok(()) => {
            if let Some(path) = &request.output {
                tracing::info!(path = %path.display(), "output written");
            }
            ExitCode::SUCCESS
        }
        Err(e) => report(&e),
    }
}

/// Merges command line flags over config file values.
pub fn build_compute_request(
    args: &ComputeArgs,
    config: Option<&dyn ConfigPort>,
) -> Result<ComputeRequest, TechindError> {
    let get = |section: &str, key: &str| config.and_then(|c| c.get_string(section, key));

    let data = match &args.data {
        Some(path) => path.clone(),
        None => get("data", "path")
            .map(PathBuf::from)
            .ok_or_else(|| TechindError::ConfigMissing {
                section: "data".into(),
                key: "path".into(),
            })?,
    };

    let indicators = if args.indicators.is_empty() {
        let list = get("indicators", "list").ok_or_else(|| TechindError::ConfigMissing {
            section: "indicators".into(),
            key: "list".into(),
        })?;
        parse_expressions(std::slice::from_ref(&list))?
    } else {
        parse_expressions(&args.indicators)?
    };
    if indicators.is_empty() {
        return Err(TechindError::ConfigInvalid {
            section: "indicators".into(),
            key: "list".into(),
            reason: "no indicators given".into(),
        });
    }

    let start = match args.start {
        Some(d) => Some(d),
        None => config_date(get("data", "start"), "start")?,
    };
    let end = match args.end {
        Some(d) => Some(d),
        None => config_date(get("data", "end"), "end")?,
    };
    if let (Some(s), Some(e)) = (start, end) {
        if s > e {
            return Err(TechindError::ConfigInvalid {
                section: "data".into(),
                key: "start".into(),
                reason: format!("start {s} is after end {e}"),
            });
        }
    }

    // A negative configured precision selects the shortest form.
    let precision = match args.precision {
        Some(p) => Some(p),
        None => config
            .map(|c| c.get_int("output", "precision"))
            .transpose()?
            .flatten()
            .and_then(|p| usize::try_from(p).ok()),
    };
    let header = !args.no_header
        && config
            .map(|c| c.get_bool("output", "header"))
            .transpose()?
            .flatten()
            .unwrap_or(true);

    Ok(ComputeRequest {
        data,
        indicators,
        start,
        end,
        output: args.output.clone().or_else(|| get("output", "path").map(PathBuf::from)),
        options: WriteOptions { precision, header },
    })
}

fn config_date(value: Option<String>, key: &str) -> Result<Option<NaiveDate>, TechindError> {
    value
        .map(|s| {
            NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
                TechindError::ConfigInvalid {
                    section: "data".into(),
                    key: key.into(),
                    reason: "invalid date format (expected YYYY-MM-DD)".into(),
                }
            })
        })
        .transpose()
}

/// Parses each input as a `;`-separated list, printing the failing input
/// with a caret on error.
pub fn parse_expressions(inputs: &[String]) -> Result<Vec<IndicatorType>, TechindError> {
    let mut indicators = Vec::new();
    for input in inputs {
        match indicator_parser::parse_list(input) {
            Ok(parsed) => indicators.extend(parsed),
            Err(e) => {
                eprintln!(
                    "error: failed to parse indicators:\n{}",
                    e.display_with_context(input)
                );
                return Err(e.into());
            }
        }
    }
    Ok(indicators)
}

/// Splits a data file path into the adapter base directory and source name.
fn split_data_path(path: &Path) -> (PathBuf, String) {
    let base = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let source = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    (base, source)
}

/// Loads bars, computes every requested indicator and writes one CSV table.
pub fn run_compute_pipeline<W: Write>(
    data_port: &dyn DataPort,
    source: &str,
    request: &ComputeRequest,
    writer: W,
) -> Result<(), TechindError> {
    let bars = data_port.fetch_bars(source, request.start, request.end)?;
    tracing::info!(source, bars = bars.len(), "loaded data");

    let results = compute_indicators(&request.indicators, &bars)?;
    let columns: Vec<Column> = results.into_iter().flat_map(|(_, cols)| cols).collect();
    tracing::info!(
        indicators = request.indicators.len(),
        columns = columns.len(),
        "computed indicators"
    );

    let dates: Vec<_> = bars.iter().map(|b| b.date).collect();
    write_columns(writer, &dates, &columns, request.options)
}

fn run_list() -> ExitCode {
    let width = SYNTAX.iter().map(|(s, _)| s.len()).max().unwrap_or(0);
    for (syntax, description) in SYNTAX {
        println!("{syntax:<width$}  {description}");
    }
    ExitCode::SUCCESS
}

fn run_validate(expressions: &[String]) -> ExitCode {
    let indicators = match parse_expressions(expressions) {
        Ok(i) => i,
        Err(e) => return ExitCode::from(&e),
    };
    for indicator in &indicators {
        if let Err(e) = validate_indicator(indicator) {
            return report(&TechindError::from(e));
        }
        println!("ok: {indicator}");
    }
    ExitCode::SUCCESS
}

fn run_sources(dir: &Path) -> ExitCode {
    match CsvAdapter::new(dir.to_path_buf()).list_sources() {
        Ok(sources) => {
            for source in sources {
                println!("{source}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => report(&e),
    }
}
