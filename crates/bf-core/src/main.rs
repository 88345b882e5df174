//! BF-type classification CLI.
//!
//! Reads a workbook JSON, runs merge → aggregate → normalize → classify, and
//! writes the four output sheets. Payloads go to stdout; logs and errors go
//! to stderr.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use bf_common::{format_error_human, Error, OutputFormat, Sheet, StructuredError, SCHEMA_VERSION};
use bf_core::config::{resolve_layout, PresetName, ResolvedLayout};
use bf_core::exit_codes::ExitCode;
use bf_core::logging::{
    event_names, generate_run_id, init_logging, LogConfig, LogFormat, LogLevel, Stage,
};
use bf_core::pipeline::{explain_triple, PhaseTriple};
use bf_core::workbook::{output_sheets, write_workbook_atomic};
use bf_core::{render, RunResult};
use bf_export::{export_sheets, SheetKind, WriterConfig};
use clap::{Args, Parser, Subcommand};
use tracing::{error, info};

/// BF-type classification of trend-factor workbooks
#[derive(Parser)]
#[command(name = "bf-core")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "json")]
    format: OutputFormat,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log format on stderr (human, jsonl)
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline on a workbook
    Run(RunArgs),

    /// Classify a single (origin, current, aspiration) triple
    Classify(ClassifyArgs),

    /// Layout inspection
    Layout(LayoutArgs),

    /// Print version information
    Version,
}

#[derive(Args, Debug)]
struct LayoutSelection {
    /// Layout file (JSON); omitted keys come from the preset
    #[arg(long)]
    layout: Option<PathBuf>,

    /// Built-in layout preset
    #[arg(long, value_enum, default_value_t = PresetName::En, env = "BF_PRESET")]
    preset: PresetName,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Input workbook JSON
    #[arg(long, short = 'i')]
    input: PathBuf,

    /// Write the output workbook JSON here instead of stdout
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Also export each output sheet as Parquet into this directory
    #[arg(long)]
    parquet_dir: Option<PathBuf>,

    /// Compress Parquet files with snappy instead of zstd
    #[arg(long, requires = "parquet_dir")]
    snappy: bool,

    #[command(flatten)]
    selection: LayoutSelection,
}

#[derive(Args, Debug)]
struct ClassifyArgs {
    /// Normalized origin value (h)
    #[arg(long, allow_negative_numbers = true)]
    origin: f64,

    /// Normalized current value (c)
    #[arg(long, allow_negative_numbers = true)]
    current: f64,

    /// Normalized aspiration value (s)
    #[arg(long, allow_negative_numbers = true)]
    aspiration: f64,
}

#[derive(Args, Debug)]
struct LayoutArgs {
    #[command(subcommand)]
    command: LayoutCommands,
}

#[derive(Subcommand, Debug)]
enum LayoutCommands {
    /// Print the resolved layout and where it came from
    Show(LayoutSelection),
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            let code = if e.use_stderr() {
                ExitCode::ArgsError
            } else {
                ExitCode::Clean
            };
            std::process::exit(code.as_i32());
        }
    };

    let cli_level = LogLevel::from_flags(cli.global.quiet, cli.global.verbose);
    init_logging(&LogConfig::from_env(cli_level, cli.global.log_format));

    let run_id = generate_run_id();
    let root = tracing::info_span!("run", run_id = %run_id);
    let _guard = root.enter();

    let exit_code = match &cli.command {
        Commands::Run(args) => cmd_run(&cli.global, args, &run_id),
        Commands::Classify(args) => cmd_classify(&cli.global, args),
        Commands::Layout(args) => match &args.command {
            LayoutCommands::Show(selection) => cmd_layout_show(&cli.global, selection),
        },
        Commands::Version => {
            print_version(&cli.global);
            ExitCode::Clean
        }
    };

    std::process::exit(exit_code.as_i32());
}

// ============================================================================
// run
// ============================================================================

fn cmd_run(global: &GlobalOpts, args: &RunArgs, run_id: &str) -> ExitCode {
    info!(
        event = event_names::RUN_STARTED,
        input = %args.input.display(),
        "run started"
    );
    match run_pipeline_command(global, args, run_id) {
        Ok(()) => ExitCode::Clean,
        Err(e) => report_error(global, &e),
    }
}

fn run_pipeline_command(global: &GlobalOpts, args: &RunArgs, run_id: &str) -> Result<(), Error> {
    let resolved = {
        let _span = tracing::info_span!("stage", stage = %Stage::Init).entered();
        resolve_selection(&args.selection)?
    };

    let result = bf_core::process_path(&args.input, &resolved.layout)?;

    // Everything is computed before the first byte is written.
    if let Some(path) = &args.output {
        let _span = tracing::info_span!("stage", stage = %Stage::Write).entered();
        write_workbook_atomic(&result.workbook, path)?;
        info!(
            event = event_names::OUTPUT_WRITTEN,
            path = %path.display(),
            sheets = result.workbook.sheets.len(),
            "output workbook written"
        );
    }

    if let Some(dir) = &args.parquet_dir {
        let _span = tracing::info_span!("stage", stage = %Stage::Export).entered();
        let mut config = WriterConfig::new(dir.clone());
        if args.snappy {
            config = config.with_snappy();
        }
        if let Err(e) = export_parquet(&result, &resolved, config) {
            if let Some(path) = &args.output {
                let _ = std::fs::remove_file(path);
            }
            return Err(e);
        }
    }

    print_run_payload(global, &result, args.output.as_deref(), run_id)?;

    info!(
        event = event_names::RUN_FINISHED,
        classes = result.output.bf_types.rows.len(),
        components = result.output.bf_types.components.len(),
        "run finished"
    );
    Ok(())
}

fn resolve_selection(selection: &LayoutSelection) -> Result<ResolvedLayout, Error> {
    Ok(resolve_layout(selection.layout.as_deref(), selection.preset)?)
}

fn export_parquet(
    result: &RunResult,
    resolved: &ResolvedLayout,
    config: WriterConfig,
) -> Result<(), Error> {
    let sheets = output_sheets(&result.output, &resolved.layout);
    let refs: Vec<(SheetKind, &Sheet)> = sheets.iter().map(|(kind, sheet)| (*kind, sheet)).collect();
    let dir = config.base_dir.clone();
    let compression = config.compression;
    let written = export_sheets(config, &refs)?;
    info!(
        event = event_names::EXPORT_FINISHED,
        dir = %dir.display(),
        compression = ?compression,
        files = written.len(),
        "parquet export finished"
    );
    Ok(())
}

fn print_run_payload(
    global: &GlobalOpts,
    result: &RunResult,
    output: Option<&Path>,
    run_id: &str,
) -> Result<(), Error> {
    match global.format {
        OutputFormat::Json => match output {
            None => println!("{}", result.workbook.to_json_pretty()?),
            Some(path) => {
                let status = serde_json::json!({
                    "schema_version": SCHEMA_VERSION,
                    "run_id": run_id,
                    "status": "ok",
                    "output": path.display().to_string(),
                    "sheets": result.workbook.sheet_names(),
                    "digest": result.workbook.digest()?,
                });
                println!("{}", serde_json::to_string_pretty(&status)?);
            }
        },
        OutputFormat::Md => print!("{}", render::workbook_markdown(&result.workbook)),
        OutputFormat::Summary => {
            println!("[{}] {}", run_id, render::pipeline_summary(&result.output))
        }
    }
    Ok(())
}

// ============================================================================
// classify / layout / version
// ============================================================================

fn cmd_classify(global: &GlobalOpts, args: &ClassifyArgs) -> ExitCode {
    let values = [args.origin, args.current, args.aspiration];
    if values.iter().any(|v| !v.is_finite()) {
        eprintln!("error: phase values must be finite numbers");
        return ExitCode::ArgsError;
    }

    let m = explain_triple(&PhaseTriple::new(args.origin, args.current, args.aspiration));
    match global.format {
        OutputFormat::Json => match serde_json::to_string_pretty(&m) {
            Ok(json) => println!("{}", json),
            Err(e) => return report_error(global, &e.into()),
        },
        OutputFormat::Md => print!("{}", render::rule_match_markdown(&m)),
        OutputFormat::Summary => println!("{}", render::rule_match_summary(&m)),
    }
    ExitCode::Clean
}

fn cmd_layout_show(global: &GlobalOpts, selection: &LayoutSelection) -> ExitCode {
    let resolved = match resolve_selection(selection) {
        Ok(r) => r,
        Err(e) => return report_error(global, &e),
    };

    match global.format {
        OutputFormat::Json => match serde_json::to_string_pretty(&resolved) {
            Ok(json) => println!("{}", json),
            Err(e) => return report_error(global, &e.into()),
        },
        OutputFormat::Summary => {
            println!(
                "preset={} source={} classification={} mixture={}",
                resolved.preset,
                resolved.source,
                resolved.layout.classification_sheet,
                resolved.layout.mixture_sheet
            );
        }
        OutputFormat::Md => {
            let layout = &resolved.layout;
            println!("# Workbook layout");
            println!();
            println!("- Preset: {} ({})", resolved.preset, resolved.preset.description());
            println!("- Source: {}", resolved.source);
            if let Some(path) = &resolved.path {
                println!("- File: {}", path.display());
            }
            println!("- Classification sheet: {}", layout.classification_sheet);
            println!("- Mixture sheet: {}", layout.mixture_sheet);
            println!("- Identifier column: {}", layout.identifier_column);
            println!("- Class column: {}", layout.class_column);
            println!(
                "- Output sheets: {}",
                layout.output_sheets.in_order().join(", ")
            );
        }
    }
    ExitCode::Clean
}

fn print_version(global: &GlobalOpts) {
    let version_info = serde_json::json!({
        "schema_version": SCHEMA_VERSION,
        "bf_core_version": env!("CARGO_PKG_VERSION"),
        "rust_version": env!("CARGO_PKG_RUST_VERSION"),
    });

    match global.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&version_info).unwrap_or_default()
            );
        }
        _ => {
            println!("bf-core {}", env!("CARGO_PKG_VERSION"));
            println!("schema version: {}", SCHEMA_VERSION);
        }
    }
}

/// Log and print an error, returning its exit code.
fn report_error(global: &GlobalOpts, err: &Error) -> ExitCode {
    let exit_code = ExitCode::for_error(err);
    error!(
        event = event_names::RUN_FAILED,
        code = err.code(),
        category = %err.category(),
        "{}",
        err
    );

    match global.format {
        OutputFormat::Json => {
            let structured = StructuredError::from(err)
                .with_context("exit_code", exit_code.as_i32())
                .with_context("exit", exit_code.code_name());
            eprintln!("{}", structured.to_json());
        }
        _ => {
            let use_color = std::io::stderr().is_terminal();
            eprintln!("{}", format_error_human(err, use_color));
        }
    }
    exit_code
}
