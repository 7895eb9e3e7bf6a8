mod args;

use anyhow::{Context as _, Result};
use args::Args;
use clap::Parser as _;
use log::{info, warn};
use reconcile_annotations::{Document, DocumentHost as _, ProofreadConfig, ProofreadSession};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// One annotation as printed on stdout.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Issue {
    from: usize,
    to: usize,
    text: String,
    category: String,
    rule_id: String,
    message: String,
    replacements: Vec<String>,
    class: &'static str,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let level = args.verbose.log_level_filter().to_string().to_lowercase();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "{}={level},reconcile_annotations={level}",
                    env!("CARGO_CRATE_NAME")
                )
                .into()
            }),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(args.use_colors())
                .with_writer(std::io::stderr),
        )
        .try_init()
        .context("Failed to initialise tracing")?;

    let mut config = match &args.config {
        Some(path) => ProofreadConfig::load_from_file(path).await?,
        None => ProofreadConfig::default(),
    };
    args.apply_to(&mut config);

    if config.api_url.is_none() {
        warn!("No API URL is configured, nothing will be checked");
    }

    let text = tokio::fs::read_to_string(&args.input_path)
        .await
        .with_context(|| format!("Cannot read {}", args.input_path.display()))?;

    let session = ProofreadSession::connect(Document::from_plain_text(&text), config)
        .await
        .context("Failed to set up proofreading")?;

    session.proofread().await;
    session.flush().await;

    let host = session.host();
    let document = host.lock().await;
    let issues = document
        .annotations()
        .iter()
        .map(|annotation| {
            let flagged = annotation
                .decode_match()
                .context("Invalid annotation payload")?;

            Ok(Issue {
                from: annotation.from,
                to: annotation.to,
                text: document.text_between(annotation.from, annotation.to),
                category: flagged.category().to_string(),
                rule_id: flagged.rule_id,
                message: flagged.message,
                replacements: flagged.replacements,
                class: annotation.style.css_class(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    info!("Found {} issues", issues.len());
    println!(
        "{}",
        serde_json::to_string_pretty(&issues).context("Failed to serialise issues")?
    );

    Ok(())
}
