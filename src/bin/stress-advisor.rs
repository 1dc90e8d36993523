//! Stress Advisor CLI - Command-line presentation layer for Stress Advisor
//!
//! Commands:
//! - assess: Score inputs and print tips (one record per input)
//! - suggest: Print rule-based tips only
//! - labels: List the categorical labels the bundle accepts
//! - doctor: Diagnose bundle health and configuration
//! - schema: Print the input schema

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use stress_advisor::bundle::{ModelBundle, DEFAULT_BUNDLE_FILE};
use stress_advisor::classifier::{HIGH_THRESHOLD, MAX_SCORE, MODERATE_THRESHOLD};
use stress_advisor::encoder::ReportEncoder;
use stress_advisor::encoding::{OFTEN_JUNK_LABEL, POOR_SLEEP_LABEL, JUNK_OFTEN_FALLBACK_CODE};
use stress_advisor::types::{AssessmentReport, RawInputs, FEATURE_COUNT, FEATURE_NAMES};
use stress_advisor::{
    AdvisorError, BundleLoadError, StressAdvisor, StressLevel, Tip,
    ADVISOR_VERSION, PRODUCER_NAME, WELL_BALANCED_MESSAGE,
};

/// Stress Advisor - Student stress scoring and lifestyle advice
#[derive(Parser)]
#[command(name = "stress-advisor")]
#[command(author = "Synheart AI Inc")]
#[command(version = ADVISOR_VERSION)]
#[command(about = "Estimate student stress and suggest lifestyle changes", long_about = None)]
struct Cli {
    /// Model bundle (JSON) with the scoring model and encoding tables
    #[arg(long, global = true, env = "STRESS_ADVISOR_BUNDLE", default_value = DEFAULT_BUNDLE_FILE)]
    bundle: PathBuf,

    /// Log filter (overridden by RUST_LOG)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score inputs and print personalized suggestions
    Assess {
        #[command(flatten)]
        input: InputArgs,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Output format
        #[arg(long, default_value = "text")]
        output_format: OutputFormat,
    },

    /// Print rule-based suggestions only (no scoring)
    Suggest {
        #[command(flatten)]
        input: InputArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the labels accepted for sleep quality and junk food frequency
    Labels {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose bundle health and configuration
    Doctor {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the input schema
    Schema {
        /// Output as JSON schema
        #[arg(long)]
        json_schema: bool,
    },
}

#[derive(Args)]
struct InputArgs {
    /// Input file path (use - for stdin)
    #[arg(short, long, default_value = "-")]
    input: PathBuf,

    /// Input format
    #[arg(long, default_value = "json")]
    input_format: InputFormat,
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// Newline-delimited JSON (one input object per line)
    Ndjson,
    /// A single JSON object or an array of objects
    Json,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable score gauge and suggestions
    Text,
    /// Newline-delimited JSON (one report per line)
    Ndjson,
    /// JSON array of reports
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(&cli.log_level) {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(log_level: &str) -> Result<(), String> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(log_level)
            .map_err(|e| format!("invalid log level/filter '{log_level}': {e}"))?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .try_init()
        .map_err(|e| format!("telemetry error: {e}"))
}

fn run(cli: Cli) -> Result<(), AdvisorCliError> {
    match cli.command {
        Commands::Assess {
            input,
            output,
            output_format,
        } => cmd_assess(&cli.bundle, &input, &output, output_format),

        Commands::Suggest { input, json } => cmd_suggest(&cli.bundle, &input, json),

        Commands::Labels { json } => cmd_labels(&cli.bundle, json),

        Commands::Doctor { json } => cmd_doctor(&cli.bundle, json),

        Commands::Schema { json_schema } => cmd_schema(json_schema),
    }
}

fn cmd_assess(
    bundle: &Path,
    input: &InputArgs,
    output: &Path,
    output_format: OutputFormat,
) -> Result<(), AdvisorCliError> {
    let advisor = StressAdvisor::from_path(bundle)?;
    let inputs = read_inputs(input)?;

    let encoder = ReportEncoder::new();
    let mut reports: Vec<AssessmentReport> = Vec::with_capacity(inputs.len());
    for raw in &inputs {
        reports.push(advisor.assess_report(raw, &encoder)?);
    }

    let output_data = format_reports(&reports, &output_format)?;

    if output.to_string_lossy() == "-" {
        print!("{}", output_data);
    } else {
        fs::write(output, output_data)?;
    }

    Ok(())
}

fn cmd_suggest(bundle: &Path, input: &InputArgs, json: bool) -> Result<(), AdvisorCliError> {
    let advisor = StressAdvisor::from_path(bundle)?;
    let inputs = read_inputs(input)?;

    let mut all_tips: Vec<Vec<Tip>> = Vec::with_capacity(inputs.len());
    for raw in &inputs {
        all_tips.push(advisor.suggestions(raw)?);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&all_tips)?);
    } else {
        for (index, tips) in all_tips.iter().enumerate() {
            if all_tips.len() > 1 {
                println!("Input {}", index + 1);
            }
            print!("{}", render_tips(tips));
        }
    }

    Ok(())
}

fn cmd_labels(bundle: &Path, json: bool) -> Result<(), AdvisorCliError> {
    let advisor = StressAdvisor::from_path(bundle)?;

    if json {
        let labels = serde_json::json!({
            "sleep_quality": advisor.sleep_quality_labels(),
            "junk_food_frequency": advisor.junk_frequency_labels(),
        });
        println!("{}", serde_json::to_string_pretty(&labels)?);
    } else {
        println!("Sleep quality:       {}", advisor.sleep_quality_labels().join(", "));
        println!("Junk food frequency: {}", advisor.junk_frequency_labels().join(", "));
    }

    Ok(())
}

fn cmd_doctor(bundle_path: &Path, json: bool) -> Result<(), AdvisorCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "advisor_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Stress Advisor version {}", ADVISOR_VERSION),
    });

    match ModelBundle::from_path(bundle_path) {
        Ok(bundle) => {
            checks.push(DoctorCheck {
                name: "bundle".to_string(),
                status: CheckStatus::Ok,
                message: format!(
                    "Loaded {} ({} model, version {})",
                    bundle_path.display(),
                    bundle.model().kind(),
                    bundle.bundle_version().unwrap_or("unversioned")
                ),
            });
            checks.extend(bundle_checks(&bundle));
        }
        Err(e) => checks.push(DoctorCheck {
            name: "bundle".to_string(),
            status: CheckStatus::Error,
            message: e.to_string(),
        }),
    }

    // Check stdin is available (for piped inputs)
    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (pass inputs with --input)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (inputs can be streamed)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: ADVISOR_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Stress Advisor Doctor Report");
        println!("============================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(AdvisorCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

fn bundle_checks(bundle: &ModelBundle) -> Vec<DoctorCheck> {
    let mut checks = Vec::new();

    let expected = bundle.expected_input_count();
    let arity = if expected == FEATURE_COUNT {
        DoctorCheck {
            name: "feature_count".to_string(),
            status: CheckStatus::Ok,
            message: format!("Model expects {} features", expected),
        }
    } else {
        DoctorCheck {
            name: "feature_count".to_string(),
            status: CheckStatus::Error,
            message: format!(
                "Feature count mismatch: model expects {} features, app is sending {}",
                expected, FEATURE_COUNT
            ),
        }
    };
    checks.push(arity);

    let feature_order = match bundle.features() {
        Some(names) if names.iter().map(String::as_str).eq(FEATURE_NAMES.iter().copied()) => {
            DoctorCheck {
                name: "feature_order".to_string(),
                status: CheckStatus::Ok,
                message: "Training column order matches input order".to_string(),
            }
        }
        Some(names) => DoctorCheck {
            name: "feature_order".to_string(),
            status: CheckStatus::Warning,
            message: format!("Training columns differ from input order: {}", names.join(", ")),
        },
        None => DoctorCheck {
            name: "feature_order".to_string(),
            status: CheckStatus::Warning,
            message: "Bundle does not record training column names".to_string(),
        },
    };
    checks.push(feature_order);

    checks.push(DoctorCheck {
        name: "sleep_quality_table".to_string(),
        status: CheckStatus::Ok,
        message: format!(
            "{} labels, '{}' = {}",
            bundle.sleep_quality().len(),
            POOR_SLEEP_LABEL,
            bundle.sleep_quality().code(POOR_SLEEP_LABEL).unwrap_or_default()
        ),
    });

    checks.push(if bundle.junk_frequency().code(OFTEN_JUNK_LABEL).is_some() {
        DoctorCheck {
            name: "junk_frequency_table".to_string(),
            status: CheckStatus::Ok,
            message: format!("{} labels", bundle.junk_frequency().len()),
        }
    } else {
        DoctorCheck {
            name: "junk_frequency_table".to_string(),
            status: CheckStatus::Warning,
            message: format!(
                "No '{}' label; the nutrition tip uses fallback code {}",
                OFTEN_JUNK_LABEL, JUNK_OFTEN_FALLBACK_CODE
            ),
        }
    });

    checks
}

fn cmd_schema(json_schema: bool) -> Result<(), AdvisorCliError> {
    if json_schema {
        println!("{}", get_input_json_schema());
    } else {
        println!("Input: one JSON object per student with {} fields", FEATURE_COUNT);
        println!();
        println!("  sleep_hours              integer 0-12");
        println!("  sleep_quality            label from the bundle's sleep_map");
        println!("  study_hours              integer 0-12");
        println!("  attendance_percent       integer 50-100");
        println!("  deadlines_per_week       integer 0-10");
        println!("  exercise_hours_per_week  integer 0-14");
        println!("  caffeine_cups_per_day    integer 0-8");
        println!("  screen_time_hours        integer 0-14");
        println!("  social_media_hours       integer 0-8");
        println!("  family_support           integer 1-5");
        println!("  peer_pressure            integer 1-5");
        println!("  financial_concerns       integer 1-5");
        println!("  junk_food_frequency      label from the bundle's junk_map");
        println!();
        println!("Run 'stress-advisor labels' to list the accepted labels.");
    }

    Ok(())
}

// Helper functions

fn read_inputs(args: &InputArgs) -> Result<Vec<RawInputs>, AdvisorCliError> {
    let input_data = if args.input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(&args.input)?
    };

    let inputs = match args.input_format {
        InputFormat::Ndjson => parse_ndjson(&input_data)?,
        InputFormat::Json => parse_json(&input_data)?,
    };

    if inputs.is_empty() {
        return Err(AdvisorCliError::NoInputs);
    }

    Ok(inputs)
}

fn parse_ndjson(data: &str) -> Result<Vec<RawInputs>, AdvisorCliError> {
    data.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str(line.trim()).map_err(|e| {
                AdvisorCliError::ParseError(format!("Line {}: {}", index + 1, e))
            })
        })
        .collect()
}

fn parse_json(data: &str) -> Result<Vec<RawInputs>, AdvisorCliError> {
    let value: serde_json::Value = serde_json::from_str(data)?;
    match value {
        serde_json::Value::Array(_) => Ok(serde_json::from_value(value)?),
        _ => Ok(vec![serde_json::from_value(value)?]),
    }
}

fn format_reports(
    reports: &[AssessmentReport],
    format: &OutputFormat,
) -> Result<String, AdvisorCliError> {
    match format {
        OutputFormat::Text => Ok(reports
            .iter()
            .map(render_report)
            .collect::<Vec<_>>()
            .join("\n")),
        OutputFormat::Ndjson => {
            let mut lines: Vec<String> = Vec::new();
            for report in reports {
                lines.push(serde_json::to_string(report)?);
            }
            Ok(lines.join("\n") + "\n")
        }
        OutputFormat::Json => Ok(serde_json::to_string(reports)?),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(reports)?),
    }
}

fn render_report(report: &AssessmentReport) -> String {
    let score = &report.assessment.score;
    let mut out = String::new();
    out.push_str(&format!(
        "Stress Level: {} ({:.1} / {:.0})\n",
        score.level, score.clamped_score, MAX_SCORE
    ));
    out.push_str(&render_gauge(score.clamped_score, score.level));
    out.push_str("\nPersonalized Suggestions\n");
    out.push_str(&render_tips(&report.assessment.tips));
    out
}

const GAUGE_WIDTH: usize = 50;

/// Three-band bar matching the classifier thresholds, with a marker under
/// the score
fn render_gauge(score: f64, level: StressLevel) -> String {
    let cell_span = MAX_SCORE / GAUGE_WIDTH as f64;
    let bar: String = (0..GAUGE_WIDTH)
        .map(|cell| {
            let start = cell as f64 * cell_span;
            if start < MODERATE_THRESHOLD {
                '-'
            } else if start < HIGH_THRESHOLD {
                '='
            } else {
                '#'
            }
        })
        .collect();

    let position = ((score / cell_span) as usize).min(GAUGE_WIDTH - 1);
    let marker = match level {
        StressLevel::Low => '^',
        StressLevel::Moderate => '*',
        StressLevel::High => '!',
    };

    format!(
        "[{}]\n {}{}\n",
        bar,
        " ".repeat(position),
        marker
    )
}

fn render_tips(tips: &[Tip]) -> String {
    if tips.is_empty() {
        return format!("{}\n", WELL_BALANCED_MESSAGE);
    }
    tips.iter().map(|tip| format!("- {}\n", tip)).collect()
}

fn get_input_json_schema() -> String {
    let integer = |min: u32, max: u32| serde_json::json!({ "type": "integer", "minimum": min, "maximum": max });
    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "stress_advisor.raw_inputs",
        "description": "Self-reported lifestyle inputs for one student",
        "type": "object",
        "required": FEATURE_NAMES,
        "properties": {
            "sleep_hours": integer(0, 12),
            "sleep_quality": { "type": "string" },
            "study_hours": integer(0, 12),
            "attendance_percent": integer(50, 100),
            "deadlines_per_week": integer(0, 10),
            "exercise_hours_per_week": integer(0, 14),
            "caffeine_cups_per_day": integer(0, 8),
            "screen_time_hours": integer(0, 14),
            "social_media_hours": integer(0, 8),
            "family_support": integer(1, 5),
            "peer_pressure": integer(1, 5),
            "financial_concerns": integer(1, 5),
            "junk_food_frequency": { "type": "string" }
        }
    })
    .to_string()
}

// Error types

#[derive(Debug)]
enum AdvisorCliError {
    Io(io::Error),
    Advisor(AdvisorError),
    Json(serde_json::Error),
    NoInputs,
    DoctorFailed,
    ParseError(String),
}

impl From<io::Error> for AdvisorCliError {
    fn from(e: io::Error) -> Self {
        AdvisorCliError::Io(e)
    }
}

impl From<AdvisorError> for AdvisorCliError {
    fn from(e: AdvisorError) -> Self {
        AdvisorCliError::Advisor(e)
    }
}

impl From<serde_json::Error> for AdvisorCliError {
    fn from(e: serde_json::Error) -> Self {
        AdvisorCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<AdvisorCliError> for CliError {
    fn from(e: AdvisorCliError) -> Self {
        match e {
            AdvisorCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            AdvisorCliError::Advisor(AdvisorError::BundleLoad(e)) => CliError {
                code: "BUNDLE_LOAD_ERROR".to_string(),
                hint: Some(match e {
                    BundleLoadError::Io { .. } => {
                        "Pass --bundle or set STRESS_ADVISOR_BUNDLE".to_string()
                    }
                    _ => "Run 'stress-advisor doctor' to inspect the bundle".to_string(),
                }),
                message: e.to_string(),
            },
            AdvisorCliError::Advisor(e @ AdvisorError::UnknownLabel { .. }) => CliError {
                code: "UNKNOWN_LABEL".to_string(),
                message: e.to_string(),
                hint: Some("Run 'stress-advisor labels' to list accepted labels".to_string()),
            },
            AdvisorCliError::Advisor(e @ AdvisorError::FeatureArityMismatch { .. }) => CliError {
                code: "FEATURE_COUNT_MISMATCH".to_string(),
                message: e.to_string(),
                hint: Some("The bundle was built for a different input layout".to_string()),
            },
            AdvisorCliError::Advisor(AdvisorError::JsonError(e)) | AdvisorCliError::Json(e) => {
                CliError {
                    code: "JSON_ERROR".to_string(),
                    message: e.to_string(),
                    hint: Some("Run 'stress-advisor schema' for the expected fields".to_string()),
                }
            }
            AdvisorCliError::NoInputs => CliError {
                code: "NO_INPUTS".to_string(),
                message: "No inputs found".to_string(),
                hint: Some("Ensure input file is not empty".to_string()),
            },
            AdvisorCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
            AdvisorCliError::ParseError(msg) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: msg,
                hint: Some("Check input format".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
