use std::io::{self, BufRead};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use eyre::{Result, WrapErr, bail, eyre};
use log::{debug, info};

mod cli;

use cli::{Cli, Command, GenerateArgs, OutputFormat};
use ytblog::config::Config;
use ytblog::server::{self, AppState};
use ytblog::youtube::{CaptionFetcher, DataApiFetcher, TranscriptFetcher, VideoInfoFetcher};
use ytblog::{BlogGenerationResult, output};

fn setup_logging() -> Result<()> {
    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir)?;
    let log_file = log_dir.join("ytblog.log");

    let target = Box::new(std::fs::OpenOptions::new().create(true).append(true).open(&log_file)?);

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized: {}", log_file.display());
    Ok(())
}

fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ytblog")
        .join("logs")
}

fn build_after_help() -> String {
    let key_line = |var: &str| {
        if std::env::var(var).is_ok_and(|v| !v.is_empty()) {
            format!("  \x1b[32m✅\x1b[0m {var}")
        } else {
            format!("  \x1b[31m❌\x1b[0m {var}")
        }
    };

    format!(
        "\nAPI KEYS:\n{}\n{}\n{}\n\nWithout an LLM key, posts use template generation.\nConfig: {}\nLogs are written to: {}",
        key_line("YOUTUBE_API_KEY"),
        key_line("OPENAI_API_KEY"),
        key_line("ANTHROPIC_API_KEY"),
        ytblog::config::config_path().display(),
        log_dir().join("ytblog.log").display()
    )
}

/// Retry an async operation with exponential backoff
async fn retry<F, Fut, T>(max_attempts: u32, operation: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let mut last_err = None;
    for attempt in 0..max_attempts {
        match operation().await {
            Ok(val) => return Ok(val),
            Err(e) => {
                if attempt + 1 < max_attempts {
                    let delay = Duration::from_millis(500 * 2u64.pow(attempt));
                    debug!("Attempt {} failed: {e}, retrying in {delay:?}", attempt + 1);
                    tokio::time::sleep(delay).await;
                }
                last_err = Some(e);
            }
        }
    }
    Err(last_err.unwrap_or_else(|| eyre!("operation was never attempted")))
}

async fn run_serve(mut config: Config, host: Option<String>, port: Option<u16>) -> Result<()> {
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .wrap_err("invalid bind address")?;
    let state = AppState::from_config(&config)?;
    eprintln!("Serving on http://{addr}");
    server::serve(state, addr).await
}

async fn run_generate(mut config: Config, args: GenerateArgs) -> Result<()> {
    if let Some(model) = args.model.clone() {
        config.model = model;
    }
    if let Some(lang) = args.lang.clone() {
        config.lang = lang;
    }

    let http = config.http_client()?;
    let videos = DataApiFetcher::from_env(http.clone());
    let transcripts = CaptionFetcher::new(http.clone(), config.lang.clone());
    let generator = server::build_generator(&config, http, args.offline);

    // Collect URLs: from arg or stdin
    let urls = if let Some(ref url) = args.url {
        vec![url.clone()]
    } else {
        let stdin = io::stdin();
        stdin.lock().lines().collect::<Result<Vec<_>, _>>()?
    };

    if urls.iter().all(|u| u.trim().is_empty()) {
        bail!("no URL or video ID provided\n\nUsage: ytblog generate <URL>\n       echo <URL> | ytblog generate");
    }

    let mut rendered_all = Vec::new();
    for url_input in urls.iter().map(|u| u.trim()).filter(|u| !u.is_empty()) {
        let video_id = ytblog::extract_video_id(url_input)
            .ok_or_else(|| eyre!("could not extract video ID from: {url_input}\n\nSupported formats:\n  https://www.youtube.com/watch?v=ID\n  https://youtu.be/ID\n  https://www.youtube.com/embed/ID\n  https://www.youtube.com/shorts/ID\n  <11-character video ID>"))?;

        let video = retry(3, || {
            let videos = &videos;
            let video_id = &video_id;
            async move { videos.fetch_video(video_id).await.map_err(eyre::Report::from) }
        })
        .await?
        .ok_or_else(|| eyre!("video not found: {video_id}"))?;

        let transcript = retry(3, || {
            let transcripts = &transcripts;
            let video_id = &video_id;
            async move { transcripts.fetch_transcript(video_id).await.map_err(eyre::Report::from) }
        })
        .await?
        .ok_or_else(|| eyre!("no transcript available for {video_id}"))?;

        let content = generator.generate(&transcript, &video, args.length, args.style).await;
        let result = BlogGenerationResult::new(video, content, args.style);

        if args.verbose {
            eprintln!(
                "Video: {} ({})\nChannel: {}\nTranscript: {} chars\nMode: {}",
                result.video_details.title,
                result.video_details.video_id,
                result.video_details.channel_title,
                transcript.chars().count(),
                if result.is_fallback_generation { "fallback" } else { "llm" },
            );
        }
        for notice in result.notices() {
            eprintln!("Note: {notice}");
        }

        rendered_all.push(match args.format {
            OutputFormat::Html => output::render_html(&result),
            OutputFormat::Document => output::render_document(&result),
            OutputFormat::Json => output::render_json(&result)?,
        });
    }

    let rendered = rendered_all.join("\n");
    if let Some(ref path) = args.output {
        std::fs::write(path, &rendered)?;
        if args.verbose {
            eprintln!("Output written to: {}", path.display());
        }
    } else {
        println!("{rendered}");
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging()?;

    let after_help = build_after_help();
    let cmd = <Cli as clap::CommandFactory>::command().after_help(after_help);
    let matches = cmd.get_matches();
    let cli = <Cli as clap::FromArgMatches>::from_arg_matches(&matches)?;

    // Load config file (non-fatal if missing/invalid)
    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Ignoring config: {e:#}");
        Config::default()
    });
    debug!("Config: {config:?}");

    match cli.command {
        Command::Serve { host, port } => run_serve(config, host, port).await,
        Command::Generate(args) => run_generate(config, args).await,
    }
}
