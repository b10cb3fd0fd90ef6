//! CLI argument parsing with clap.

use clap::{Args, Parser, Subcommand};

/// Text-to-image proxy server and prompt client.
#[derive(Parser, Debug)]
#[command(name = "promptforge", version, about)]
pub struct Cli {
    /// Config file path override.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Verbose logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// What to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the generation proxy server.
    Serve(ServeArgs),
    /// Submit a prompt to a running proxy and save the image.
    Generate(GenerateArgs),
}

/// Arguments of `serve`.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to bind (overrides the config file).
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Provider name or alias: stability, modelslab (overrides the config file).
    #[arg(short, long)]
    pub provider: Option<String>,
}

/// Arguments of `generate`.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Text prompt describing the desired image.
    #[arg(conflicts_with = "prompt_file")]
    pub prompt: Option<String>,

    /// Path to a file containing the prompt text.
    #[arg(short = 'p', long, conflicts_with = "prompt")]
    pub prompt_file: Option<String>,

    /// Base URL of the proxy.
    #[arg(short, long, default_value = "http://127.0.0.1:3000")]
    pub server: String,

    /// Output format: jpeg, png, webp.
    #[arg(short, long, default_value = "png")]
    pub format: String,

    /// Output file path (auto-generated if not specified).
    #[arg(short, long)]
    pub output: Option<String>,

    /// Cosmetic pause before submitting, in milliseconds.
    #[arg(long, default_value = "2000")]
    pub delay_ms: u64,

    /// Print the returned imageUrl to stdout instead of saving the image.
    #[arg(long)]
    pub print_url: bool,
}

impl GenerateArgs {
    /// Resolve the prompt from either the positional argument or the file flag.
    ///
    /// # Errors
    ///
    /// Returns an error if neither prompt nor prompt-file is provided,
    /// or if the file cannot be read.
    pub fn resolve_prompt(&self) -> Result<String, std::io::Error> {
        if let Some(ref text) = self.prompt {
            Ok(text.clone())
        } else if let Some(ref path) = self.prompt_file {
            std::fs::read_to_string(path).map(|s| s.trim_end_matches(['\r', '\n']).to_string())
        } else {
            Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Provide a prompt string or use -p/--prompt-file",
            ))
        }
    }
}
