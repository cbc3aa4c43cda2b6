//! Reframe worker binary.
//!
//! Usage:
//!   reframe-worker plan <REQUEST>                      Print the crop plan as JSON
//!   reframe-worker render <REQUEST> <INPUT> <OUTPUT>   Plan, then render with FFmpeg
//!   reframe-worker preview <REQUEST> <INPUT>           Render one cropped frame
//!   reframe-worker check                               Check that FFmpeg is installed

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use reframe_engine::{
    check_ffmpeg, preview_command, preview_output_path, render_command, FfmpegCommand,
    FfmpegRunner, ReframeConfig, ReframeError, ReframePlan, ReframePlanner, ReframeRequest,
};

#[derive(Parser)]
#[command(
    name = "reframe-worker",
    about = "Subject-aware reframing of videos for other aspect ratios",
    version
)]
struct Cli {
    /// Framing preset; without it, REFRAME_* environment variables apply
    #[arg(long, value_enum, global = true)]
    framing: Option<Framing>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan a request and print the plan as JSON
    Plan {
        /// Path to the request JSON
        request: PathBuf,
    },

    /// Plan a request and render the reframed video
    Render {
        /// Path to the request JSON
        request: PathBuf,
        /// Source video
        input: PathBuf,
        /// Output video
        output: PathBuf,
        /// Kill FFmpeg after this many seconds
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Render a single cropped, downscaled frame
    Preview {
        /// Path to the request JSON (a manual crop in it is validated first)
        request: PathBuf,
        /// Source video
        input: PathBuf,
        /// Output image; defaults to a unique file in the temp directory
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Seek position in seconds
        #[arg(long)]
        at: Option<f64>,
    },

    /// Check that FFmpeg is on the PATH
    Check,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Framing {
    Standard,
    Tight,
    Wide,
    Fast,
}

impl Framing {
    fn config(self) -> ReframeConfig {
        match self {
            Framing::Standard => ReframeConfig::default(),
            Framing::Tight => ReframeConfig::tight(),
            Framing::Wide => ReframeConfig::wide(),
            Framing::Fast => ReframeConfig::fast(),
        }
    }
}

fn init_tracing() {
    // Colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,reframe_engine=info,reframe_worker=info"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
}

async fn load_plan(planner: &ReframePlanner, path: &Path) -> anyhow::Result<ReframePlan> {
    let json = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    let request = ReframeRequest::from_json(&json).context("parsing reframe request")?;
    Ok(planner.plan(&request).context("planning reframe")?)
}

/// Run FFmpeg until it exits or Ctrl-C is pressed.
async fn run_ffmpeg(command: &FfmpegCommand, timeout: Option<u64>) -> anyhow::Result<()> {
    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received shutdown signal");
            let _ = cancel_tx.send(true);
        }
    });

    let mut runner = FfmpegRunner::new().with_cancel(cancel_rx);
    if let Some(secs) = timeout {
        runner = runner.with_timeout(secs);
    }
    runner
        .run(command)
        .await
        .with_context(|| format!("writing {}", command.output().display()))?;
    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match cli.framing {
        Some(framing) => framing.config(),
        None => ReframeConfig::from_env(),
    };
    info!("Reframe config: {:?}", config);
    let planner = ReframePlanner::new(config);

    match cli.command {
        Commands::Plan { request } => {
            let plan = load_plan(&planner, &request).await?;
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
        Commands::Render {
            request,
            input,
            output,
            timeout,
        } => {
            let plan = load_plan(&planner, &request).await?;
            let command = render_command(&input, &output, &plan, planner.config());
            run_ffmpeg(&command, timeout).await?;
            info!(output = %output.display(), mode = %plan.mode_used, "Render complete");
        }
        Commands::Preview {
            request,
            input,
            output,
            at,
        } => {
            let plan = load_plan(&planner, &request).await?;
            let output = output.unwrap_or_else(|| preview_output_path(std::env::temp_dir()));
            let at = at.unwrap_or(planner.config().preview_at_secs);
            let command = preview_command(&input, &output, &plan.crop, at, planner.config());
            run_ffmpeg(&command, None).await?;
            info!(output = %output.display(), "Preview written");
            println!("{}", output.display());
        }
        Commands::Check => {
            let path = check_ffmpeg().context("FFmpeg is required for rendering")?;
            println!("{}", path.display());
        }
    }
    Ok(())
}

/// Exit code 2 for bad requests, 1 for everything else.
fn exit_code(err: &anyhow::Error) -> i32 {
    let caller_error = err
        .chain()
        .filter_map(|cause| cause.downcast_ref::<ReframeError>())
        .any(ReframeError::is_caller_error);
    if caller_error {
        2
    } else {
        1
    }
}

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    info!("Starting reframe-worker");

    if let Err(e) = run(cli).await {
        error!("Reframe failed: {:#}", e);
        std::process::exit(exit_code(&e));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_render_takes_input_and_output() {
        let cli = Cli::try_parse_from([
            "reframe-worker",
            "render",
            "req.json",
            "in.mp4",
            "out.mp4",
            "--framing",
            "tight",
        ])
        .unwrap();
        assert!(matches!(cli.framing, Some(Framing::Tight)));
        match cli.command {
            Commands::Render { input, output, .. } => {
                assert_eq!(input, PathBuf::from("in.mp4"));
                assert_eq!(output, PathBuf::from("out.mp4"));
            }
            _ => panic!("expected render"),
        }

        assert!(Cli::try_parse_from(["reframe-worker", "render", "req.json", "in.mp4"]).is_err());
    }

    #[test]
    fn test_caller_errors_exit_with_2() {
        let bad = anyhow::Error::from(ReframeError::invalid_request("no target"))
            .context("planning reframe");
        assert_eq!(exit_code(&bad), 2);

        let failed = anyhow::Error::from(ReframeError::TranscoderNotFound);
        assert_eq!(exit_code(&failed), 1);
    }

    #[test]
    fn test_framing_presets() {
        let wide = Framing::Wide.config();
        let tight = Framing::Tight.config();
        assert!(wide.square_padding.horizontal > tight.square_padding.horizontal);
        assert_eq!(Framing::Fast.config().render_preset, "ultrafast");
    }
}
