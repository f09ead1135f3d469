use anyhow::Result;
use clap::Parser;
use meeting_scribe::cli::{self, Cli};
use meeting_scribe::{pipeline, Config};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Cli::parse();
    let mut config = Config::load(args.config.as_deref())?;

    // CLI model selectors override the configured defaults
    if let Some(model) = &args.asr_model {
        config.asr.model = model.clone();
    }
    if let Some(model) = &args.language_model {
        config.notes.model = model.clone();
    }

    cli::ensure_ffmpeg().await?;
    let opts = cli::validate(&args, &config)?;

    info!("meeting-scribe v{}", env!("CARGO_PKG_VERSION"));
    info!("Meeting folder: {}", opts.meeting_folder.display());
    info!("Output folder: {}", opts.output_folder.display());

    pipeline::run(&opts, &config).await
}
