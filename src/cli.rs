use clap::{Parser, Subcommand};
use std::path::PathBuf;

use ytblog::{BlogLength, BlogStyle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Html,
    Document,
    Json,
}

#[derive(Parser)]
#[command(
    name = "ytblog",
    about = "Turn YouTube videos into blog posts",
    version = env!("GIT_DESCRIBE"),
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve {
        /// Address to bind (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Generate a blog post for one or more videos
    Generate(GenerateArgs),
}

#[derive(clap::Args)]
pub struct GenerateArgs {
    /// YouTube video URL or video ID (reads from stdin if omitted)
    pub url: Option<String>,

    /// Target length of the post
    #[arg(short, long, value_enum, default_value_t = BlogLength::Medium)]
    pub length: BlogLength,

    /// Writing style
    #[arg(short, long, value_enum, default_value_t = BlogStyle::Professional)]
    pub style: BlogStyle,

    /// Output format: html (default), document, json
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Html)]
    pub format: OutputFormat,

    /// Write output to file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Skip the LLM and use template generation
    #[arg(long)]
    pub offline: bool,

    /// LLM model (overrides config)
    #[arg(long)]
    pub model: Option<String>,

    /// Preferred caption language (overrides config)
    #[arg(long)]
    pub lang: Option<String>,

    /// Show video metadata and generation mode
    #[arg(short, long)]
    pub verbose: bool,
}
