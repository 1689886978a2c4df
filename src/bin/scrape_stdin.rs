//! Simple CLI that reads HTML from stdin, runs one extraction against it and
//! prints the outcome JSON to stdout.
//!
//! Host events (results and mirrored log lines) go to stderr when `--events`
//! is set.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use rs_pagescrape::logging::init_tracing;
use rs_pagescrape::{
    ChannelEmitter, ContentFormat, EngineOptions, ExtractionSchema, GenericContentRule,
    HostBridge, MemoryViewport, ScrapeEngine,
};

#[derive(Parser, Debug)]
#[command(name = "scrape_stdin", about = "Extract records or readable content from HTML on stdin")]
struct Args {
    /// URL the document was loaded from; used to resolve relative links.
    #[arg(long, default_value = "https://localhost/")]
    url: String,

    /// JSON extraction schema. Without it the generic extractor runs.
    #[arg(long)]
    schema: Option<PathBuf>,

    /// Generic output format.
    #[arg(long, value_enum, default_value_t = Format::Markdown)]
    format: Format,

    #[arg(long)]
    keep_image: bool,

    #[arg(long)]
    keep_link: bool,

    /// Window label scoping the host channels.
    #[arg(long)]
    window_label: Option<String>,

    /// Print host events to stderr.
    #[arg(long)]
    events: bool,
}

#[derive(Clone, Copy, ValueEnum, Debug, PartialEq, Eq)]
enum Format {
    Markdown,
    Text,
}

impl From<Format> for ContentFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Markdown => ContentFormat::Markdown,
            Format::Text => ContentFormat::Text,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut html = String::new();
    io::stdin()
        .read_to_string(&mut html)
        .context("failed to read HTML from stdin")?;

    let schema: Option<ExtractionSchema> = match &args.schema {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read schema {}", path.display()))?;
            Some(serde_json::from_str(&raw).context("invalid schema JSON")?)
        }
        None => None,
    };
    let rule = GenericContentRule {
        format: args.format.into(),
        keep_image: args.keep_image,
        keep_link: args.keep_link,
    };

    let (emitter, mut events) = ChannelEmitter::new();
    let bridge = HostBridge::with_emitter(Arc::new(emitter));
    let options = EngineOptions {
        window_label: args.window_label.clone(),
        ..EngineOptions::default()
    };
    let engine = ScrapeEngine::new(Arc::new(MemoryViewport::new(args.url, html)), bridge, options);

    let outcome = engine.perform_scrape(schema.as_ref(), Some(&rule)).await;

    if args.events {
        while let Ok(event) = events.try_recv() {
            eprintln!("[{}] {} {}", event.emitted_at.to_rfc3339(), event.channel, event.payload);
        }
    }
    println!("{}", serde_json::to_string(&outcome)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_defaults_to_markdown() {
        let args = Args::try_parse_from(["scrape_stdin"]).expect("defaults parse");
        assert_eq!(args.format, Format::Markdown);
    }

    #[test]
    fn text_format_is_accepted() {
        let args = Args::try_parse_from(["scrape_stdin", "--format", "text"]).expect("text parses");
        assert_eq!(ContentFormat::from(args.format), ContentFormat::Text);
    }

    #[test]
    fn unknown_format_is_rejected() {
        let err = Args::try_parse_from(["scrape_stdin", "--format", "html"])
            .expect_err("html is not a format");
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }
}
