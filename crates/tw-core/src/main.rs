//! Tagwatch - RFID tag visibility tracker
//!
//! The main entry point for tagwatch, handling:
//! - Tracking loop over a reader device, file or stdin
//! - Replay decoding of captured reader lines
//! - Configuration inspection and validation

use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use std::io::{BufRead, BufReader, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tw_common::error::{format_error_human, StructuredError};
use tw_common::{Error, OutputFormat};
use tw_core::collect::{
    decode, LineSource, ReaderLineSource, ThreadedLineSource, TransportError,
};
use tw_core::config::{
    load_config, validate_config, Config, ConfigOptions, ResolvedConfig, TransportConfig,
};
use tw_core::exit_codes::ExitCode;
use tw_core::log_event;
use tw_core::logging::{
    event_names, generate_run_id, init_logging, LogConfig, LogContext, LogFormat, LogLevel, Stage,
};
use tw_core::output::{write_decoded, write_report, DecodedLine, TrackReport};
use tw_core::registry::TagRegistry;

/// Tagwatch - track RFID tags and estimate whether each one is visible
#[derive(Parser)]
#[command(name = "tagwatch")]
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
    /// Config file (overrides TAGWATCH_CONFIG and the XDG location)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "json")]
    format: OutputFormat,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease verbosity (quiet mode)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log format on stderr
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Track tags from a reader and report their visibility
    Track(TrackArgs),

    /// Decode reader lines and print them as JSON lines
    Decode(DecodeArgs),

    /// Configuration management
    Config(ConfigArgs),
}

// ============================================================================
// Command argument structs
// ============================================================================

#[derive(Args, Debug)]
struct TrackArgs {
    /// Reader device to read from (e.g. /dev/ttyACM0)
    #[arg(long, conflicts_with = "input")]
    device: Option<PathBuf>,

    /// Captured reader lines to replay ("-" for stdin)
    #[arg(long)]
    input: Option<PathBuf>,

    /// Maximum number of tracked tags
    #[arg(long)]
    capacity: Option<usize>,

    /// RNG seed for reproducible estimates
    #[arg(long)]
    seed: Option<u64>,

    /// Pause between cycles in milliseconds
    #[arg(long, default_value_t = 10)]
    poll_ms: u64,

    /// Interval between reports in milliseconds
    #[arg(long, default_value_t = 300)]
    report_ms: u64,

    /// Stop after this many cycles
    #[arg(long)]
    cycles: Option<u64>,
}

#[derive(Args, Debug)]
struct DecodeArgs {
    /// File of reader lines ("-" or absent for stdin)
    #[arg(long)]
    input: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Print the resolved configuration
    Show,

    /// Validate the resolved configuration
    Validate,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = if err.use_stderr() {
                ExitCode::ArgsError
            } else {
                ExitCode::Clean
            };
            let _ = err.print();
            std::process::exit(code.as_i32());
        }
    };

    let log_level = LogLevel::from_verbosity(cli.global.verbose, cli.global.quiet);
    let log_config = LogConfig::from_env(log_level, cli.global.log_format);
    init_logging(&log_config);

    let ctx = LogContext::new(generate_run_id());

    let result = match &cli.command {
        Commands::Track(args) => run_track(&cli.global, args, &ctx),
        Commands::Decode(args) => run_decode(args, &ctx),
        Commands::Config(args) => match args.command {
            ConfigCommands::Show => run_config_show(&cli.global, &ctx),
            ConfigCommands::Validate => run_config_validate(&cli.global, &ctx),
        },
    };

    let exit_code = match result {
        Ok(()) => ExitCode::Clean,
        Err(err) => output_error(&cli.global, &err),
    };
    if !exit_code.is_success() {
        tracing::debug!(
            exit_code = %exit_code,
            user_error = exit_code.is_user_error(),
            "command failed"
        );
    }

    std::process::exit(exit_code.as_i32());
}

fn output_error(global: &GlobalOpts, err: &Error) -> ExitCode {
    match global.format {
        OutputFormat::Json | OutputFormat::Jsonl => {
            eprintln!("{}", StructuredError::from(err).to_json());
        }
        OutputFormat::Summary => {
            let use_color = !global.no_color && std::io::stderr().is_terminal();
            eprintln!("{}", format_error_human(err, use_color));
        }
    }
    ExitCode::for_error(err)
}

fn resolve_config(global: &GlobalOpts, ctx: &LogContext) -> Result<ResolvedConfig, Error> {
    let options = ConfigOptions {
        config_path: global.config.clone(),
    };
    let resolved = load_config(&options)?;
    match &resolved.source_path {
        Some(path) => log_event!(
            ctx,
            INFO,
            event_names::CONFIG_LOADED,
            Stage::Init,
            "configuration loaded",
            path = tracing::field::display(path.display())
        ),
        None => log_event!(
            ctx,
            INFO,
            event_names::CONFIG_DEFAULT_USED,
            Stage::Init,
            "no config file, using defaults"
        ),
    }
    Ok(resolved)
}

// ============================================================================
// track
// ============================================================================

/// Where tracked lines come from, and whether end of stream is expected.
struct OpenedSource {
    source: Box<dyn LineSource>,
    ends_cleanly: bool,
}

fn open_source(args: &TrackArgs, transport: &TransportConfig) -> Result<OpenedSource, Error> {
    let timeout = Duration::from_millis(transport.read_timeout_ms);

    let device = match args.input {
        Some(_) => None,
        None => args.device.as_ref().or(transport.device.as_ref()),
    };
    if let Some(device) = device {
        tracing::debug!(
            device = %device.display(),
            baud_rate = transport.baud_rate,
            "opening reader device"
        );
        let source = ThreadedLineSource::open_device(device, timeout)?;
        return Ok(OpenedSource {
            source: Box::new(source),
            ends_cleanly: false,
        });
    }

    match args.input.as_deref() {
        Some(path) if path != Path::new("-") => Ok(OpenedSource {
            source: Box::new(ReaderLineSource::open(path)?),
            ends_cleanly: true,
        }),
        _ => Ok(OpenedSource {
            source: Box::new(ThreadedLineSource::spawn(
                "stdin",
                std::io::stdin(),
                timeout,
            )?),
            ends_cleanly: true,
        }),
    }
}

fn run_track(global: &GlobalOpts, args: &TrackArgs, ctx: &LogContext) -> Result<(), Error> {
    let mut config: Config = resolve_config(global, ctx)?.config;
    if let Some(capacity) = args.capacity {
        config.registry.capacity = capacity;
    }
    if let Some(seed) = args.seed {
        config.registry.seed = Some(seed);
    }
    validate_config(&config)?;

    let mut registry = TagRegistry::from_config(&config.registry, &config.estimator);
    let OpenedSource {
        mut source,
        ends_cleanly,
    } = open_source(args, &config.transport)?;

    log_event!(
        ctx,
        INFO,
        event_names::RUN_STARTED,
        Stage::Init,
        "tracking started",
        source = source.name(),
        capacity = config.registry.capacity
    );

    let poll = Duration::from_millis(args.poll_ms);
    let report_every = Duration::from_millis(args.report_ms);
    let mut last_report = Instant::now();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    loop {
        if args
            .cycles
            .is_some_and(|limit| registry.counters().cycles >= limit)
        {
            break;
        }

        let line = match source.next_line() {
            Ok(line) => line,
            Err(TransportError::Closed { source_name }) if ends_cleanly => {
                log_event!(
                    ctx,
                    DEBUG,
                    event_names::TRANSPORT_CLOSED,
                    Stage::Ingest,
                    "input exhausted",
                    source = source_name.as_str()
                );
                break;
            }
            Err(err) => {
                write_track_report(&mut out, ctx, &registry, global.format)?;
                return Err(err.into());
            }
        };

        registry.advance(line.as_deref(), Utc::now());

        if last_report.elapsed() >= report_every {
            write_track_report(&mut out, ctx, &registry, global.format)?;
            last_report = Instant::now();
        }

        if !poll.is_zero() {
            std::thread::sleep(poll);
        }
    }

    write_track_report(&mut out, ctx, &registry, global.format)?;

    let counters = registry.counters();
    log_event!(
        ctx,
        INFO,
        event_names::RUN_FINISHED,
        Stage::Report,
        "tracking finished",
        cycles = counters.cycles,
        tags = registry.len(),
        dropped = counters.dropped,
        malformed = counters.malformed
    );
    Ok(())
}

fn write_track_report<W: Write>(
    out: &mut W,
    ctx: &LogContext,
    registry: &TagRegistry,
    format: OutputFormat,
) -> Result<(), Error> {
    let report = TrackReport::new(
        ctx.run_id.clone(),
        Utc::now(),
        registry.capacity(),
        registry.counters(),
        registry.snapshot(),
    );
    write_report(out, &report, format)
}

// ============================================================================
// decode
// ============================================================================

fn run_decode(args: &DecodeArgs, ctx: &LogContext) -> Result<(), Error> {
    let mut source: ReaderLineSource<Box<dyn BufRead>> = match args.input.as_deref() {
        Some(path) if path != Path::new("-") => {
            let file = std::fs::File::open(path).map_err(|source| TransportError::Open {
                device: path.display().to_string(),
                source,
            })?;
            ReaderLineSource::new(path.display().to_string(), Box::new(BufReader::new(file)))
        }
        _ => ReaderLineSource::new("stdin", Box::new(std::io::stdin().lock())),
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut line_number = 0u64;
    let mut decoded = 0u64;
    let mut malformed = 0u64;

    loop {
        let raw = match source.next_line() {
            Ok(Some(raw)) => raw,
            Ok(None) => continue,
            Err(TransportError::Closed { .. }) => break,
            Err(err) => return Err(err.into()),
        };
        line_number += 1;
        if raw.iter().all(u8::is_ascii_whitespace) {
            continue;
        }
        match decode(&raw, Utc::now()) {
            Ok(reading) => {
                decoded += 1;
                write_decoded(
                    &mut out,
                    &DecodedLine {
                        line: line_number,
                        reading,
                    },
                )?;
            }
            Err(err) => {
                malformed += 1;
                log_event!(
                    ctx,
                    DEBUG,
                    event_names::LINE_MALFORMED,
                    Stage::Ingest,
                    "line is not a reading",
                    line = line_number,
                    reason = tracing::field::display(&err)
                );
            }
        }
    }
    out.flush()?;

    eprintln!("decoded {decoded} readings, {malformed} malformed lines");
    Ok(())
}

// ============================================================================
// config
// ============================================================================

fn run_config_show(global: &GlobalOpts, ctx: &LogContext) -> Result<(), Error> {
    let resolved = resolve_config(global, ctx)?;
    let response = serde_json::json!({
        "generated_at": Utc::now().to_rfc3339(),
        "source": {
            "path": resolved.source_path.as_ref().map(|p| p.display().to_string()),
            "using_defaults": resolved.source_path.is_none(),
        },
        "config": &resolved.config,
    });
    print_json(&response, global.format)
}

fn run_config_validate(global: &GlobalOpts, ctx: &LogContext) -> Result<(), Error> {
    let resolved = resolve_config(global, ctx)?;
    match global.format {
        OutputFormat::Summary => {
            let source = resolved
                .source_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "built-in defaults".to_string());
            println!("config OK ({source})");
            Ok(())
        }
        _ => {
            let response = serde_json::json!({
                "status": "ok",
                "path": resolved.source_path.as_ref().map(|p| p.display().to_string()),
            });
            print_json(&response, global.format)
        }
    }
}

fn print_json(value: &serde_json::Value, format: OutputFormat) -> Result<(), Error> {
    let text = match format {
        OutputFormat::Jsonl => serde_json::to_string(value)?,
        _ => serde_json::to_string_pretty(value)?,
    };
    println!("{text}");
    Ok(())
}
