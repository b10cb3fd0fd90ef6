//! Promptforge - text-to-image proxy server and prompt client.

mod adapters;
mod cassette;
mod cli;
mod client;
mod config;
mod context;
mod error;
mod output;
mod params;
mod ports;
mod provider;
mod server;

use std::path::Path;
use std::process;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, GenerateArgs, ServeArgs};
use crate::client::PromptForm;
use crate::config::Config;
use crate::context::ServiceContext;
use crate::error::ImageError;
use crate::output::{resolve_output_path, save_image};
use crate::params::validate_format;
use crate::server::handler::PROMPT_REQUIRED;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Serve(args) => run_serve(cli.config.as_deref(), args).await,
        Command::Generate(args) => run_generate(args).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

/// Log to stderr so `generate --print-url` keeps stdout clean. `RUST_LOG`
/// overrides the default level.
fn init_tracing(verbose: bool) {
    let default = if verbose {
        "promptforge=debug,tower_http=debug"
    } else {
        "promptforge=info,tower_http=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run_serve(config_flag: Option<&str>, args: ServeArgs) -> Result<(), ImageError> {
    let config_path = config::discover_config_path(config_flag);
    let mut config = Config::load(&config_path).map_err(ImageError::Config)?;
    if let Some(name) = args.provider {
        config.provider.name = name;
    }
    let provider = config.provider().map_err(ImageError::InvalidArgument)?;
    let bind = args.bind.unwrap_or_else(|| config.server.bind.clone());

    // Live / recording / replaying
    let replay_path = std::env::var("PROMPTFORGE_REPLAY").ok();
    let is_recording = std::env::var("PROMPTFORGE_REC").is_ok_and(|v| v == "true" || v == "1");

    let (ctx, recording_session) = if let Some(ref cassette_path) = replay_path {
        tracing::info!("Replaying provider responses from {cassette_path}");
        (ServiceContext::replaying(Path::new(cassette_path))?, None)
    } else if is_recording {
        tracing::info!("Recording provider responses");
        let (ctx, session) = ServiceContext::recording(provider, &config)?;
        (ctx, Some(session))
    } else {
        (ServiceContext::live(provider, &config)?, None)
    };

    let listener = TcpListener::bind(&bind).await?;
    server::serve(listener, ctx, shutdown_signal()).await?;

    if let Some(session) = recording_session {
        match session.save() {
            Ok(path) => eprintln!("Cassette saved: {}", path.display()),
            Err(e) => eprintln!("Warning: failed to save cassette: {e}"),
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Cannot listen for Ctrl-C, running until killed: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}

async fn run_generate(args: GenerateArgs) -> Result<(), ImageError> {
    validate_format(&args.format).map_err(ImageError::InvalidArgument)?;
    let prompt = args.resolve_prompt()?;

    let mut form = PromptForm::new(args.server.as_str(), Duration::from_millis(args.delay_ms));
    form.set_prompt(prompt.as_str());
    if !form.can_submit() {
        return Err(ImageError::InvalidArgument(PROMPT_REQUIRED.into()));
    }

    eprintln!("Generating...");
    let image_url = form.submit().await?.to_string();

    if args.print_url {
        println!("{image_url}");
        return Ok(());
    }

    let image = form.fetch_image(&image_url).await?;
    let output_path = resolve_output_path(args.output.as_deref(), &prompt, &args.format);
    save_image(&image, &args.format, &output_path)?;
    eprintln!("Saved: {}", output_path.display());

    Ok(())
}
