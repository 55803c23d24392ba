//! lamco-motion - fixed-timestep pointer motion synthesis
//!
//! Entry point for the console binary.

use std::io::BufRead;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use lamco_motion::config::Config;
use lamco_motion::control::MotionMode;
use lamco_motion::input::{CommandSender, InputCommand};
use lamco_motion::motion::Point2D;
use lamco_motion::output::{StatusFormat, VirtualCursorSink};
use lamco_motion::runtime::MotionRuntime;
use lamco_motion::scheduler::SchedulingVariant;
use lamco_motion::utils::{
    format_user_error, log_startup_diagnostics, BuildInfo, DiagnosticsReport,
};

/// Command-line arguments for lamco-motion
#[derive(Parser, Debug)]
#[command(name = "lamco-motion")]
#[command(version, about = "Fixed-timestep pointer motion synthesis", long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, env = "LAMCO_MOTION_CONFIG")]
    pub config: Option<PathBuf>,

    /// Verbose logging (can be specified multiple times)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Log format (json|pretty|compact)
    #[arg(long, default_value = "compact")]
    pub log_format: String,

    /// Write logs to file (in addition to stderr)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Initial sensitivity (0-20)
    #[arg(short, long)]
    pub sensitivity: Option<f64>,

    /// Initial motion mode (direct|curved|smooth)
    #[arg(short, long)]
    pub mode: Option<MotionMode>,

    /// Scheduling variant (deadline|free-running)
    #[arg(long)]
    pub scheduling: Option<SchedulingVariant>,

    /// Status output (text|json|log)
    #[arg(long, default_value = "text")]
    pub status_format: StatusFormat,

    /// Start with motion enabled
    #[arg(long)]
    pub enable: bool,

    /// Don't read commands from stdin
    #[arg(long)]
    pub no_stdin: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    pub dump_config: bool,

    /// Print system and scheduling diagnostics and exit
    #[arg(long)]
    pub diagnose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.diagnose {
        print!("{}", DiagnosticsReport::gather());
        return Ok(());
    }

    let loaded = Config::load_or_default(args.config.as_deref());
    let base = match &loaded {
        Ok(config) => config.clone(),
        Err(_) => Config::default_config()?,
    };
    let mut config = base.with_overrides(args.sensitivity, args.mode, args.scheduling);
    if args.enable {
        config.motion.start_enabled = true;
    }

    if args.dump_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    let _log_guard = init_logging(&args, &config)?;

    BuildInfo::current().log_banner();

    log_startup_diagnostics();

    if let Err(e) = &loaded {
        warn!("Failed to load config: {:#}, using defaults", e);
    }
    if let Err(e) = config.validate() {
        let e = e.context("Invalid configuration after command-line overrides");
        eprintln!("{}", format_user_error(&e));
        return Err(e);
    }
    info!("Configuration loaded successfully");
    debug!("Config: {:?}", config);

    if let Err(e) = run(&args, &config).await {
        eprintln!("{}", format_user_error(&e));
        return Err(e);
    }

    info!("lamco-motion shut down");
    Ok(())
}

async fn run(args: &Args, config: &Config) -> Result<()> {
    let sink = VirtualCursorSink::new(Point2D::default(), 0);
    let cursor = sink.handle();
    let display = args.status_format.into_display();

    let runtime = MotionRuntime::start(config, Box::new(sink), Some(display))
        .context("Failed to start motion runtime")?;
    let controls = runtime.controls();

    if !args.no_stdin {
        spawn_console_reader(runtime.command_sender())
            .context("Failed to spawn console-input thread")?;
        eprintln!("Commands: {}", InputCommand::help());
    }

    let mut join = tokio::task::spawn_blocking(move || runtime.wait());
    let joined = tokio::select! {
        joined = &mut join => joined,
        signal = tokio::signal::ctrl_c() => {
            match signal {
                Ok(()) => info!("Received Ctrl-C, stopping"),
                Err(e) => warn!("Ctrl-C handler failed: {}, stopping", e),
            }
            controls.request_shutdown();
            join.await
        }
    };

    let stats = joined
        .context("Runtime join task failed")?
        .context("Motion runtime failed")?;

    info!(
        "Virtual cursor ended at {} after {} px ({} sink calls)",
        cursor.position(),
        stats.pixels_emitted,
        cursor.calls()
    );
    Ok(())
}

/// Forward stdin lines as commands
///
/// Runs on a detached std thread; a blocking stdin read must not hold up
/// runtime shutdown.
fn spawn_console_reader(commands: CommandSender) -> std::io::Result<()> {
    std::thread::Builder::new()
        .name("console-input".to_string())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        warn!("stdin read failed: {}", e);
                        break;
                    }
                };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<InputCommand>() {
                    Ok(command) => {
                        if commands.send(command).is_err() {
                            break;
                        }
                        if command == InputCommand::Quit {
                            break;
                        }
                    }
                    Err(e) => eprintln!("{} (try: {})", e, InputCommand::help()),
                }
            }
            debug!("Console input closed");
        })
        .map(|_| ())
}

fn init_logging(args: &Args, config: &Config) -> Result<Option<WorkerGuard>> {
    let log_level = match args.verbose {
        0 => config.logging.level.to_lowercase(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("lamco_motion={},warn", log_level))
    });

    // stdout carries the status line, so console logs go to stderr
    let console = match args.log_format.as_str() {
        "json" => tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed(),
        "pretty" => tracing_subscriber::fmt::layer()
            .pretty()
            .with_writer(std::io::stderr)
            .boxed(),
        _ => tracing_subscriber::fmt::layer()
            .compact()
            .with_writer(std::io::stderr)
            .boxed(),
    };

    let (file_layer, guard, log_target) = if let Some(path) = &args.log_file {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create log file: {}", path.display()))?;
        let (writer, guard) = tracing_appender::non_blocking(file);
        (Some(writer), Some(guard), Some(path.display().to_string()))
    } else if let Some(dir) = &config.logging.log_dir {
        let appender = tracing_appender::rolling::daily(dir, "lamco-motion.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        (Some(writer), Some(guard), Some(dir.display().to_string()))
    } else {
        (None, None, None)
    };
    let file_layer = file_layer.map(|writer| {
        tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
    });

    tracing_subscriber::registry()
        .with(console)
        .with(file_layer)
        .with(env_filter)
        .init();

    if let Some(target) = log_target {
        info!("Logging to file: {}", target);
    }

    Ok(guard)
}

