use std::time::Duration;

use anyhow::{Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use vibenote_core::{
    AnalysisMode, Config, NoteStore, SourceChain, VideoDescriptor, VideoRequest, WebhookSink,
    format_timestamp, relay,
};

use crate::annotate::Annotator;

mod annotate;
mod command;

/// CLI wrapper for AnalysisMode (needed for clap ValueEnum)
#[derive(Clone, Copy, Default, ValueEnum)]
enum CliMode {
    Body,
    Linguistic,
    #[default]
    Full,
}

impl From<CliMode> for AnalysisMode {
    fn from(cli: CliMode) -> Self {
        match cli {
            CliMode::Body => AnalysisMode::Body,
            CliMode::Linguistic => AnalysisMode::Linguistic,
            CliMode::Full => AnalysisMode::Full,
        }
    }
}

#[derive(Parser)]
#[command(name = "vibenote")]
#[command(
    about = "Watch a video, mark moments, annotate them, and export the notes to a webhook"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List videos from channels, video ids, or a URL
    Videos {
        /// Channel id (repeatable). Defaults to VIBENOTE_CHANNELS.
        #[arg(short, long)]
        channel: Vec<String>,

        /// Video id (repeatable)
        #[arg(short, long)]
        id: Vec<String>,

        /// Video or feed URL
        #[arg(short, long)]
        url: Option<String>,
    },

    /// Annotate a video interactively
    Annotate(AnnotateArgs),

    /// Run the export relay that forwards notes to the Zapier webhook
    Relay {
        #[arg(short, long, default_value_t = 3000)]
        port: u16,

        /// Webhook to forward to. Defaults to ZAPIER_HOOK_URL.
        #[arg(long)]
        hook_url: Option<String>,
    },

    /// Print seconds as M:SS
    Format { seconds: f64 },
}

#[derive(Args)]
struct AnnotateArgs {
    /// Video URL or 11-character video id
    video: String,

    /// Analysis mode
    #[arg(short, long, default_value = "full")]
    mode: CliMode,

    /// Export endpoint. Defaults to VIBENOTE_EXPORT_URL or the local relay.
    #[arg(long)]
    export_url: Option<String>,

    /// Keep notes on disk between sessions
    #[arg(long)]
    persist: bool,
}

pub(crate) fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let spinner_style = ProgressStyle::default_spinner()
        .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
        .template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(spinner_style);
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("vibenote=info,vibenote_core=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();
    let config = Config::from_env();

    if let Err(e) = run(cli, config).await {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Commands::Videos { channel, id, url } => {
            let request = match (url, id.is_empty(), channel.is_empty()) {
                (Some(url), _, _) => VideoRequest::Url(url),
                (None, false, _) => VideoRequest::Videos(id),
                (None, true, false) => VideoRequest::Channels(channel),
                (None, true, true) if !config.channels.is_empty() => {
                    VideoRequest::Channels(config.channels.clone())
                }
                _ => bail!(
                    "Nothing to list: pass --channel, --id or --url, or set VIBENOTE_CHANNELS"
                ),
            };
            list_videos(&config, &request).await
        }
        Commands::Annotate(args) => annotate(&config, args).await,
        Commands::Relay { port, hook_url } => {
            let hook_url = match hook_url {
                Some(url) => Some(url),
                None => match config.require_hook_url() {
                    Ok(url) => Some(url.to_string()),
                    Err(e) => {
                        tracing::warn!(error = %e, "exports will be rejected");
                        None
                    }
                },
            };
            let listener = TcpListener::bind(("127.0.0.1", port)).await?;
            println!(
                "{} Relay on http://127.0.0.1:{}{}",
                style("✓").green().bold(),
                port,
                relay::RELAY_PATH
            );
            relay::serve(listener, hook_url).await?;
            Ok(())
        }
        Commands::Format { seconds } => {
            println!("{}", format_timestamp(seconds));
            Ok(())
        }
    }
}

async fn fetch_videos(config: &Config, request: &VideoRequest) -> Result<Vec<VideoDescriptor>> {
    let chain = SourceChain::from_config(config);
    let spinner = create_spinner("Fetching videos...");
    let result = chain.fetch(request).await;
    spinner.finish_and_clear();
    Ok(result?)
}

async fn list_videos(config: &Config, request: &VideoRequest) -> Result<()> {
    let videos = fetch_videos(config, request).await?;

    for video in &videos {
        println!(
            "{}  {}",
            style(&video.id).cyan(),
            style(&video.title).bold()
        );
        println!(
            "    {} {} {}",
            style(video.published_at.format("%Y-%m-%d")).dim(),
            style(format!("({})", video.source)).dim(),
            video.url
        );
    }
    println!("\n{} {} videos", style("✓").green().bold(), videos.len());
    Ok(())
}

async fn annotate(config: &Config, args: AnnotateArgs) -> Result<()> {
    let videos = fetch_videos(config, &VideoRequest::Url(args.video)).await?;
    let Some(video) = videos.into_iter().next() else {
        bail!("Video not found");
    };

    let export_url = args.export_url.unwrap_or_else(|| config.export_url.clone());
    let store = args.persist.then(NoteStore::default_location);

    let mut annotator = Annotator::new(
        video,
        args.mode.into(),
        Box::new(WebhookSink::new(export_url)),
        store,
    )
    .await?;
    annotator.run().await
}
