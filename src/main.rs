use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use console::style;
use panodrop::common::config::{apply_overrides, load_config};
use panodrop::common::config_commands;
use panodrop::common::{ConfigOverrides, UploadConfig};
use panodrop::intake::Selection;
use panodrop::session::{AddOutcome, SubmitOutcome, UploadSession};
use panodrop::transport::HttpStitchTransport;
use panodrop::ui::{render, shell};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "panodrop", version)]
#[command(about = "Upload a batch of images for panorama stitching")]
struct Cli {
    #[command(flatten)]
    overrides: OverrideArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct OverrideArgs {
    /// Max images per batch
    #[arg(long, global = true)]
    image_limit: Option<usize>,

    /// Max total batch size in MB
    #[arg(long, global = true)]
    max_total_size_mb: Option<u64>,

    /// Stitch endpoint (absolute URL or path under --service-url)
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Base URL for a relative endpoint
    #[arg(long, global = true)]
    service_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Stitch the given images and save the panorama
    Stitch {
        #[arg(required = true, help = "Images to stitch, in order")]
        files: Vec<PathBuf>,

        #[arg(short, long, help = "Where to write the result")]
        out: Option<PathBuf>,
    },
    /// Interactive session; drag files onto the terminal to add them
    Shell,
    /// Serve the drag-and-drop page on localhost
    Serve {
        #[arg(short, long, help = "Port to listen on (0 = any free port)")]
        port: Option<u16>,
    },
    /// Manage the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print config file path
    Path,
    /// Print config file contents
    Show,
    /// Reset config file to defaults
    Reset {
        #[arg(long, help = "Skip confirmation prompt")]
        yes: bool,
    },
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_config(args: &OverrideArgs, port: Option<u16>) -> Result<UploadConfig> {
    let overrides = ConfigOverrides {
        image_limit: args.image_limit,
        max_total_size_mb: args.max_total_size_mb,
        stitch_endpoint: args.endpoint.clone(),
        service_url: args.service_url.clone(),
        port,
    };
    apply_overrides(load_config()?, &overrides)
}

fn build_session(config: &UploadConfig) -> Result<Arc<UploadSession>> {
    let transport = HttpStitchTransport::from_config(config)?;
    tracing::debug!(endpoint = %transport.endpoint(), "Stitch transport ready");
    Ok(Arc::new(UploadSession::new(
        config.limits(),
        Arc::new(transport),
    )))
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_filter = match cli.command {
        Commands::Serve { .. } => "panodrop=info",
        _ => "panodrop=warn",
    };
    init_tracing(default_filter);

    if let Err(err) = run(cli).await {
        eprintln!("{} {err:#}", style("Error:").red().bold());
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Stitch { files, out } => {
            let config = resolve_config(&cli.overrides, None)?;
            stitch_once(&config, files, out).await
        }
        Commands::Shell => {
            let config = resolve_config(&cli.overrides, None)?;
            let session = build_session(&config)?;
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            let stdout = std::io::stdout();
            shell::run_shell(&session, &config, stdin, &mut stdout.lock()).await
        }
        Commands::Serve { port } => {
            let config = resolve_config(&cli.overrides, port)?;
            let session = build_session(&config)?;
            panodrop::server::run_browser_session(session, config).await
        }
        Commands::Config { action } => match action {
            ConfigAction::Path => config_commands::run_config_path(),
            ConfigAction::Show => config_commands::run_config_show(),
            ConfigAction::Reset { yes } => config_commands::run_config_reset(yes).map(|_| ()),
        },
    }
}

async fn stitch_once(config: &UploadConfig, files: Vec<PathBuf>, out: Option<PathBuf>) -> Result<()> {
    let session = build_session(config)?;

    let candidates = Selection::Picked(files)
        .collect()
        .await
        .context("Failed to read images")?;

    let outcome = session.add_files(candidates);
    if let Some(message) = session.snapshot().message {
        eprintln!("{}", render::banner(&message));
    }
    if let AddOutcome::Rejected(err) = outcome {
        bail!(err);
    }

    match shell::submit(&session).await {
        SubmitOutcome::Stitched => {}
        SubmitOutcome::Failed(err) => bail!(err),
        SubmitOutcome::Skipped => bail!("No images to stitch"),
    }

    let path = out.unwrap_or_else(|| PathBuf::from(&config.download_name));
    if !shell::save_result(&session, &path).await? {
        bail!("Stitch service returned no result");
    }
    println!("Saved {}", path.display());
    Ok(())
}
