use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use thiserror::Error;

use kira_growthqc::assess;
use kira_growthqc::input::{InputError, group_by_patient, load_params, load_reference_rows, load_visits};
use kira_growthqc::logging;
use kira_growthqc::model::{ChartType, EngineParams, Gender, GrowthAssessment, ZScoreResult};
use kira_growthqc::pipeline::analyze_patient;
use kira_growthqc::pipeline::assess::compute_zscore_result;
use kira_growthqc::pipeline::stage1_build::BuildError;
use kira_growthqc::pipeline::stage8_report::{ReportInput, write_reports};
use kira_growthqc::reference::ReferenceStore;
use kira_growthqc::report::{ReferenceSummary, ToolMeta};

#[derive(Debug, Parser)]
#[command(name = "kira-growthqc", version, about = "Child growth assessment against LMS reference curves")]
struct Cli {
    /// Log level used when RUST_LOG is not set.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Assess a measurement file and write reports.
    Run(RunArgs),
    /// Assess a single measurement and print JSON to stdout.
    Assess(AssessArgs),
}

#[derive(Debug, Args)]
struct ReferenceArgs {
    /// Reference table (TSV, TSV.gz or JSON).
    #[arg(long)]
    reference: PathBuf,
    /// Chart for reference rows without a chart column.
    #[arg(long, value_parser = parse_chart)]
    chart: Option<ChartType>,
    /// Engine parameters as JSON; omitted keys use built-in defaults.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct RunArgs {
    #[command(flatten)]
    reference: ReferenceArgs,
    #[arg(long)]
    measurements: PathBuf,
    #[arg(long)]
    out: PathBuf,
    /// Project each patient's latest weight this many days ahead.
    #[arg(long)]
    project_days: Option<i64>,
}

#[derive(Debug, Args)]
struct AssessArgs {
    #[command(flatten)]
    reference: ReferenceArgs,
    #[arg(long, value_parser = parse_gender)]
    sex: Gender,
    #[arg(long, allow_negative_numbers = true)]
    age_days: i64,
    #[arg(long)]
    value: f64,
}

#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("reference build failed: {0}")]
    Build(#[from] BuildError),
    #[error("chart {0} not present in reference data")]
    MissingChart(&'static str),
    #[error("--chart is required for assess")]
    ChartRequired,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn parse_chart(raw: &str) -> Result<ChartType, String> {
    ChartType::parse(raw).ok_or_else(|| {
        format!("unknown chart '{raw}' (use weight-for-age|height-for-age|head-circumference-for-age|bmi-for-age)")
    })
}

fn parse_gender(raw: &str) -> Result<Gender, String> {
    Gender::parse(raw).ok_or_else(|| format!("unknown sex '{raw}' (use male|female)"))
}

fn main() {
    let cli = Cli::parse();
    logging::init(&cli.log_level);
    if let Err(err) = run(cli.command) {
        tracing::error!("{err}");
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run(command: Command) -> Result<(), AppError> {
    match command {
        Command::Run(args) => run_batch(args),
        Command::Assess(args) => run_single(args),
    }
}

fn load_engine(args: &ReferenceArgs) -> Result<(ReferenceStore, EngineParams), AppError> {
    let params = match &args.config {
        Some(path) => load_params(path)?,
        None => EngineParams::default_v1(),
    };
    let rows = load_reference_rows(&args.reference)?;
    let store = ReferenceStore::build(&rows, args.chart, &params)?;
    Ok((store, params))
}

fn run_batch(args: RunArgs) -> Result<(), AppError> {
    let (store, params) = load_engine(&args.reference)?;
    let snapshot = store.snapshot();

    let visits = load_visits(&args.measurements)?;
    let patients: Vec<_> = group_by_patient(visits)
        .into_values()
        .filter_map(|series| analyze_patient(&snapshot.set, series, &params, args.project_days))
        .collect();

    let input = ReportInput {
        tool: ToolMeta {
            name: "kira-growthqc".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            git_hash: read_git_hash(Path::new(".")),
        },
        reference: ReferenceSummary::new(
            args.reference.reference.display().to_string(),
            snapshot.version,
            snapshot.set.charts().map(|c| c.as_str().to_string()).collect(),
            &snapshot.report,
        ),
        patients: &patients,
    };
    write_reports(&input, &args.out)?;
    Ok(())
}

#[derive(Debug, Serialize)]
struct SingleOutput {
    chart: ChartType,
    result: ZScoreResult,
    assessment: GrowthAssessment,
}

fn run_single(args: AssessArgs) -> Result<(), AppError> {
    let chart = args.reference.chart.ok_or(AppError::ChartRequired)?;
    let (store, params) = load_engine(&args.reference)?;
    let snapshot = store.snapshot();
    let table = snapshot
        .set
        .get(chart)
        .ok_or(AppError::MissingChart(chart.as_str()))?;

    let out = SingleOutput {
        chart,
        result: compute_zscore_result(table, args.sex, args.age_days, args.value, &params),
        assessment: assess(table, args.sex, args.age_days, args.value, &params),
    };
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn read_git_hash(repo_root: &Path) -> Option<String> {
    let head = repo_root.join(".git/HEAD");
    let content = std::fs::read_to_string(head).ok()?;
    if let Some(ref_line) = content.strip_prefix("ref: ") {
        let ref_path = repo_root.join(".git").join(ref_line.trim());
        return std::fs::read_to_string(ref_path)
            .ok()
            .map(|s| s.trim().to_string());
    }
    Some(content.trim().to_string())
}

#[cfg(test)]
#[path = "../tests/src_inline/main_inline.rs"]
mod tests;
