mod listen;
mod logging;

use std::fs;
use std::io::{BufWriter, Write};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use cmsdecode_core::{
    Block, CaptureConfig, CaptureSummary, DEFAULT_MONITOR_PORT, DecodeConfig, Outcome,
    PcapFileSource, capture,
};
use serde::Serialize;

use crate::listen::ListenOptions;
use crate::logging::{LogFormat, LogLevel, init_logging};

#[derive(Parser, Debug)]
#[command(name = "cmsdecode")]
#[command(version)]
#[command(
    about = "Decoder for the binary telemetry stream of central-monitoring patient monitors.",
    long_about = None,
    after_help = "Examples:\n  cmsdecode pcap convert capture.pcapng -o vitals.csv\n  cmsdecode pcap dump capture.pcap --port 515\n  cmsdecode listen --bind 0.0.0.0:515"
)]
struct Cli {
    /// Log verbosity (RUST_LOG overrides)
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value = "text")]
    log_format: LogFormat,

    /// Warn instead of rejecting blocks with nonzero reserved bytes
    #[arg(long, global = true)]
    lenient_reserved: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Operations on recorded PCAP/PCAPNG captures.
    Pcap {
        #[command(subcommand)]
        command: PcapCommands,
    },
    /// Accept live monitor connections and log decoded blocks.
    #[command(after_help = "Examples:\n  cmsdecode listen\n  cmsdecode listen --bind 127.0.0.1:5150 --idle-timeout 30")]
    Listen {
        /// Address to accept monitor connections on
        #[arg(long, default_value = "0.0.0.0:515")]
        bind: SocketAddr,

        /// Drop a connection after this many seconds without a complete frame
        #[arg(long, value_name = "SECS")]
        idle_timeout: Option<u64>,
    },
}

#[derive(Args, Debug)]
struct CaptureArgs {
    /// Path to a .pcap or .pcapng file
    input: PathBuf,

    /// TCP destination port carrying monitor traffic
    #[arg(long, default_value_t = DEFAULT_MONITOR_PORT)]
    port: u16,
}

#[derive(Subcommand, Debug)]
enum PcapCommands {
    /// Write one CSV row per monitoring cycle.
    #[command(
        after_help = "Examples:\n  cmsdecode pcap convert capture.pcapng -o vitals.csv\n  cmsdecode pcap convert capture.pcap --stdout"
    )]
    Convert {
        #[command(flatten)]
        capture: CaptureArgs,

        /// Output CSV path
        #[arg(short = 'o', long, required_unless_present = "stdout")]
        output: Option<PathBuf>,

        /// Write CSV to stdout
        #[arg(long, conflicts_with = "output")]
        stdout: bool,

        /// Suppress non-error output
        #[arg(long)]
        quiet: bool,
    },
    /// Print every decoded block as one JSON line.
    Dump {
        #[command(flatten)]
        capture: CaptureArgs,

        /// Also print blocks that failed validation, as error lines on stderr
        #[arg(long)]
        show_rejected: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let decode = if cli.lenient_reserved {
        DecodeConfig::lenient()
    } else {
        DecodeConfig::default()
    };

    let result = match cli.command {
        Commands::Pcap { command } => match command {
            PcapCommands::Convert {
                capture,
                output,
                stdout,
                quiet,
            } => cmd_pcap_convert(capture, decode, output, stdout, quiet),
            PcapCommands::Dump {
                capture,
                show_rejected,
            } => cmd_pcap_dump(capture, decode, show_rejected),
        },
        Commands::Listen { bind, idle_timeout } => cmd_listen(ListenOptions {
            bind,
            decode,
            idle_timeout: idle_timeout.map(Duration::from_secs),
        }),
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

fn cmd_pcap_convert(
    args: CaptureArgs,
    decode: DecodeConfig,
    output: Option<PathBuf>,
    stdout: bool,
    quiet: bool,
) -> Result<(), CliError> {
    validate_input_file(&args.input)?;
    let config = CaptureConfig {
        port: args.port,
        decode,
    };

    if stdout {
        let out = std::io::stdout().lock();
        cmsdecode_core::convert_to_csv(&args.input, out, &config)
            .context("CSV conversion failed")?;
        return Ok(());
    }

    let output = output.ok_or_else(|| {
        CliError::new(
            "missing output path",
            Some("use -o/--output or --stdout".to_string()),
        )
    })?;
    ensure_distinct_output(&args.input, &output)?;
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
    }

    let file = fs::File::create(&output)
        .with_context(|| format!("Failed to create output file: {}", output.display()))?;
    let summary = cmsdecode_core::convert_to_csv(&args.input, BufWriter::new(file), &config)
        .context("CSV conversion failed")?;

    if !quiet {
        print_summary(&summary);
        eprintln!("OK: {} rows written -> {}", summary.rows, output.display());
    }
    Ok(())
}

#[derive(Serialize)]
struct DumpLine<'a> {
    time: Option<String>,
    flow: String,
    block: &'a Block,
}

fn cmd_pcap_dump(args: CaptureArgs, decode: DecodeConfig, show_rejected: bool) -> Result<(), CliError> {
    validate_input_file(&args.input)?;
    let config = CaptureConfig {
        port: args.port,
        decode,
    };
    let source = PcapFileSource::open(&args.input)
        .with_context(|| format!("Failed to open capture: {}", args.input.display()))?;
    let mut out = BufWriter::new(std::io::stdout().lock());

    cmsdecode_core::decode_source(source, &config, |event| {
        match &event.outcome {
            Outcome::Block(block) => {
                let line = DumpLine {
                    time: capture::ts_to_rfc3339(event.ts),
                    flow: event.flow.to_string(),
                    block,
                };
                serde_json::to_writer(&mut out, &line).map_err(std::io::Error::from)?;
                writeln!(out)?;
            }
            Outcome::Rejected(err) if show_rejected => {
                eprintln!("rejected: {}: {}", event.flow, err);
            }
            Outcome::Rejected(_) => {}
            Outcome::Desynchronized(err) => {
                eprintln!("desynchronized: {}: {}", event.flow, err);
            }
        }
        Ok(())
    })
    .context("capture decoding failed")?;
    out.flush().context("Failed to write output")?;
    Ok(())
}

fn cmd_listen(options: ListenOptions) -> Result<(), CliError> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    runtime.block_on(listen::serve(options))?;
    Ok(())
}

fn print_summary(summary: &CaptureSummary) {
    eprintln!(
        "packets: {}, segments: {}, frames: {}, blocks: {}, rejected: {}, desynchronized: {}",
        summary.packets_total,
        summary.segments,
        summary.frames,
        summary.blocks,
        summary.decode_errors,
        summary.structural_errors
    );
    if let (Some(start), Some(end)) = (&summary.time_start, &summary.time_end) {
        eprintln!("capture window: {start} .. {end}");
    }
}

fn ensure_distinct_output(input: &Path, output: &Path) -> Result<(), CliError> {
    let input_abs = fs::canonicalize(input)
        .with_context(|| format!("Failed to resolve input path: {}", input.display()))?;
    let Some(name) = output.file_name() else {
        return Err(CliError::new(
            format!("invalid output path: {}", output.display()),
            Some("name a file, not a directory".to_string()),
        ));
    };
    let parent = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    if let Ok(dir) = fs::canonicalize(parent) {
        if dir.join(name) == input_abs {
            return Err(CliError::new(
                format!("output path must differ from input: {}", output.display()),
                Some("choose a different output path".to_string()),
            ));
        }
    }
    Ok(())
}

fn validate_input_file(input: &Path) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("use a .pcap or .pcapng file".to_string()),
        ));
    }
    if !input.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some("use a .pcap or .pcapng file".to_string()),
        ));
    }
    let ext = input
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    if ext != "pcap" && ext != "pcapng" {
        return Err(CliError::new(
            format!("unsupported input format '{}'", input.display()),
            Some("expected a .pcap or .pcapng file".to_string()),
        ));
    }
    Ok(())
}
