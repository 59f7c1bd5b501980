use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "quotereel", version, about = "Produce and post quote reels")]
struct Cli {
    /// Configuration JSON.
    #[arg(long, short, global = true, default_value = "quotereel.json")]
    config: PathBuf,

    /// Override `paths.progress_file`.
    #[arg(long, global = true)]
    progress: Option<PathBuf>,

    /// Log filter (e.g. `info`, `quotereel=debug`). `RUST_LOG` wins when set.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create one video and post it.
    Run,
    /// Print rotation progress and the next posting slot as JSON.
    Status,
    /// Check music, ffmpeg and fonts.
    Check,
    /// Run at every configured posting time.
    Daemon {
        /// Stop after this many runs.
        #[arg(long)]
        max_runs: Option<u64>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match dispatch(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "quotereel failed");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> anyhow::Result<quotereel::Config> {
    let mut cfg = quotereel::Config::load(&cli.config)
        .with_context(|| format!("load config '{}'", cli.config.display()))?;
    if let Some(p) = &cli.progress {
        cfg.paths.progress_file = p.clone();
    }
    Ok(cfg)
}

fn dispatch(cli: Cli) -> anyhow::Result<bool> {
    let cfg = load_config(&cli)?;
    match cli.cmd {
        Command::Run => cmd_run(cfg),
        Command::Status => cmd_status(cfg),
        Command::Check => cmd_check(cfg),
        Command::Daemon { max_runs } => cmd_daemon(cfg, max_runs),
    }
}

fn cmd_run(cfg: quotereel::Config) -> anyhow::Result<bool> {
    let mut agent = quotereel::Agent::from_config(cfg)?;
    let report = agent.run_once()?;
    tracing::info!(
        artifact = %report.artifact.display(),
        media_id = report.media_id.as_deref().unwrap_or("-"),
        "run completed"
    );
    Ok(true)
}

fn cmd_status(cfg: quotereel::Config) -> anyhow::Result<bool> {
    let agent = quotereel::Agent::from_config(cfg)?;
    let snapshot = agent.status()?;
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(true)
}

fn cmd_check(cfg: quotereel::Config) -> anyhow::Result<bool> {
    let mut music = quotereel::agent::music_source(&cfg)?;
    let report = quotereel::housekeeping::check_prerequisites(music.as_mut(), &cfg.text);
    println!("music tracks: {}", report.music_tracks);
    println!("ffmpeg:       {}", if report.ffmpeg { "found" } else { "missing" });
    match &report.font {
        Some(font) => println!("font:         {font}"),
        None => println!("font:         none"),
    }
    for p in &report.problems {
        println!("problem:      {p}");
    }
    Ok(report.is_ok())
}

fn cmd_daemon(cfg: quotereel::Config, max_runs: Option<u64>) -> anyhow::Result<bool> {
    let times = cfg.schedule.parsed_times()?;
    let mut agent = quotereel::Agent::from_config(cfg)?;
    let mut job = || agent.run_once().map(|_| ());
    let runs = quotereel::schedule::run_daemon(
        &times,
        &mut || chrono::Local::now().naive_local(),
        &mut std::thread::sleep,
        &mut job,
        max_runs,
    )?;
    tracing::info!(runs, "daemon stopped");
    Ok(true)
}
