use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use glob::glob;
use pcapscope_core::{DecodeOptions, Report};
use tracing_subscriber::EnvFilter;

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("PCAPSCOPE_BUILD_COMMIT"),
    " ",
    env!("PCAPSCOPE_BUILD_DATE"),
    ")"
);

const EXAMPLES: &str = "Examples:\n  pcapscope pcap decode capture.pcap -o report.json\n  pcapscope pcap analyze 'captures/*.pcap' --stdout --pretty\n  pcapscope pcap header capture.pcap";

#[derive(Parser, Debug)]
#[command(name = "pcapscope")]
#[command(version = VERSION)]
#[command(
    about = "Offline decoder for libpcap captures (Ethernet / IPv4 / TCP / HTTP).",
    long_about = None,
    after_help = EXAMPLES
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Operations on libpcap inputs.
    Pcap {
        #[command(subcommand)]
        command: PcapCommands,
    },
}

#[derive(Subcommand, Debug)]
enum PcapCommands {
    /// Decode a capture file and write a versioned JSON report.
    #[command(visible_alias = "analyse", alias = "analyze")]
    #[command(after_help = EXAMPLES)]
    Decode(DecodeArgs),

    /// Print the capture's global header as JSON.
    Header {
        /// Path to a .pcap or .cap file
        input: PathBuf,
    },
}

#[derive(Args, Debug)]
struct DecodeArgs {
    /// Path to a .pcap or .cap file (a glob matching one file is accepted)
    input: PathBuf,

    /// Output report path (JSON)
    #[arg(short = 'o', long, required_unless_present = "stdout")]
    report: Option<PathBuf>,

    /// Write JSON report to stdout
    #[arg(long, conflicts_with = "report")]
    stdout: bool,

    /// Pretty-print JSON output
    #[arg(long, conflicts_with = "compact")]
    pretty: bool,

    /// Compact JSON output (default)
    #[arg(long)]
    compact: bool,

    /// Suppress non-error output
    #[arg(long)]
    quiet: bool,

    /// Exit with a non-zero code if any diagnostics were raised
    #[arg(long)]
    strict: bool,

    /// List diagnostics after decoding
    #[arg(long)]
    list_diagnostics: bool,

    /// Decode frames on all cores
    #[arg(long)]
    parallel: bool,

    /// Skip HTTP decoding of TCP payloads
    #[arg(long)]
    no_http: bool,

    /// Stop after this many frames
    #[arg(long, value_name = "N")]
    max_frames: Option<usize>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Pcap { command } => match command {
            PcapCommands::Decode(args) => {
                init_tracing(cli.verbose, args.quiet);
                cmd_pcap_decode(args)
            }
            PcapCommands::Header { input } => {
                init_tracing(cli.verbose, false);
                cmd_pcap_header(input)
            }
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    let default = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{err:#}"), None)
    }
}

fn cmd_pcap_decode(args: DecodeArgs) -> Result<(), CliError> {
    let resolved_input = resolve_input_path(&args.input)?;
    validate_input_file(&resolved_input)?;
    let input_abs = fs::canonicalize(&resolved_input)
        .with_context(|| format!("Failed to resolve input path: {}", resolved_input.display()))?;

    let report_path = match (args.stdout, args.report) {
        (true, _) => None,
        (false, Some(path)) => Some(path),
        (false, None) => {
            return Err(CliError::new(
                "missing output path",
                Some("use -o/--report or --stdout".to_string()),
            ));
        }
    };
    if let Some(path) = report_path.as_ref() {
        ensure_distinct_output(path, &input_abs)?;
    }

    let options = DecodeOptions {
        parallel: args.parallel,
        decode_http: !args.no_http,
        max_frames: args.max_frames,
    };
    tracing::info!(input = %resolved_input.display(), ?options, "decoding capture");
    let rep = pcapscope_core::analyze_pcap_file(&resolved_input, &options)
        .context("PCAP decoding failed")?;
    let json = serialize_report(&rep, args.pretty, args.compact)?;

    match report_path {
        None => print!("{}", json),
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).with_context(|| {
                        format!("Failed to create output directory: {}", parent.display())
                    })?;
                }
            }
            fs::write(&path, json)
                .with_context(|| format!("Failed to write report: {}", path.display()))?;
            if !args.quiet {
                eprintln!(
                    "OK: {} frames decoded -> {}",
                    rep.frames.len(),
                    path.display()
                );
            }
        }
    }

    if args.list_diagnostics && !args.quiet {
        print_diagnostics(&rep);
    }
    if args.strict && !rep.diagnostics.is_empty() {
        return Err(CliError::new(
            format!("{} decode diagnostics detected", rep.diagnostics.len()),
            Some("use --list-diagnostics to inspect".to_string()),
        ));
    }
    Ok(())
}

fn cmd_pcap_header(input: PathBuf) -> Result<(), CliError> {
    let resolved_input = resolve_input_path(&input)?;
    validate_input_file(&resolved_input)?;

    let mut bytes = Vec::with_capacity(24);
    fs::File::open(&resolved_input)
        .and_then(|file| file.take(24).read_to_end(&mut bytes))
        .with_context(|| format!("Failed to read input file: {}", resolved_input.display()))?;
    let header = pcapscope_core::parse_header(&bytes).map_err(|err| {
        CliError::new(
            format!("invalid capture header: {err}"),
            Some("expected a libpcap file (pcapng is not supported)".to_string()),
        )
    })?;
    let json = serde_json::to_string_pretty(&header).context("JSON serialization failed")?;
    println!("{}", json);
    Ok(())
}

fn ensure_distinct_output(report_path: &Path, input_abs: &Path) -> Result<(), CliError> {
    let report_dir = match report_path.parent() {
        Some(parent) if parent.as_os_str().is_empty() => fs::canonicalize("."),
        Some(parent) => fs::canonicalize(parent),
        None => return Ok(()),
    };
    // A missing output directory cannot contain the input.
    let Ok(report_dir) = report_dir else {
        return Ok(());
    };
    let file_name = report_path
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("Invalid report path: {}", report_path.display()))?;
    if report_dir.join(file_name) == input_abs {
        return Err(CliError::new(
            format!(
                "report path must differ from input: {}",
                report_path.display()
            ),
            Some("choose a different output path".to_string()),
        ));
    }
    Ok(())
}

fn serialize_report(rep: &Report, pretty: bool, compact: bool) -> Result<String, CliError> {
    if pretty && compact {
        return Err(CliError::new(
            "cannot use --pretty and --compact together",
            Some("choose one output format".to_string()),
        ));
    }
    if pretty {
        serde_json::to_string_pretty(rep)
            .context("JSON serialization failed")
            .map_err(Into::into)
    } else {
        serde_json::to_string(rep)
            .context("JSON serialization failed")
            .map_err(Into::into)
    }
}

fn print_diagnostics(rep: &Report) {
    eprintln!("Diagnostics:");
    for diagnostic in &rep.diagnostics {
        let frame = diagnostic
            .frame_index
            .map(|index| format!("frame {index}"))
            .unwrap_or_else(|| "capture".to_string());
        eprintln!(
            "  {} {} [{}] {}",
            frame,
            diagnostic.kind.as_str(),
            diagnostic.layer.as_str(),
            diagnostic.message
        );
    }
}

fn validate_input_file(input: &Path) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("use a .pcap or .cap file".to_string()),
        ));
    }
    if !input.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some("use a .pcap or .cap file".to_string()),
        ));
    }
    let ext = input
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    if ext != "pcap" && ext != "cap" {
        return Err(CliError::new(
            format!("unsupported input format '{}'", input.display()),
            Some("expected a .pcap or .cap file".to_string()),
        ));
    }
    Ok(())
}

fn resolve_input_path(input: &Path) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(input.to_path_buf());
    }

    let paths = glob(&pattern).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
    let mut matches = Vec::new();
    for entry in paths {
        let path = entry.map_err(|err| {
            CliError::new(
                format!("invalid input pattern '{}'", pattern),
                Some(format!("pattern error: {}", err)),
            )
        })?;
        if path.is_file() {
            matches.push(path);
        }
    }

    match matches.len() {
        0 => Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some("check the path or quote the pattern; expected .pcap or .cap".to_string()),
        )),
        1 => Ok(matches.remove(0)),
        count => {
            let mut listed = matches
                .iter()
                .take(3)
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ");
            if count > 3 {
                listed.push_str(", ...");
            }
            Err(CliError::new(
                format!(
                    "multiple files match pattern '{}' ({} matches); matches: {}",
                    pattern, count, listed
                ),
                Some("pass a single capture file, or run once per file".to_string()),
            ))
        }
    }
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}
