//! deckbuild HTTP server
//!
//! Environment:
//! - `DECKBUILD_CONFIG`: path to a YAML config file (defaults apply without it)
//! - `DECKBUILD_CARDS`: path to a JSON array of cards loaded at startup
//! - `RUST_LOG`: tracing filter, `info` by default

use anyhow::{Context, Result};
use deckbuild::prelude::*;
use tracing_subscriber::EnvFilter;

fn load_cards(path: &str) -> Result<Vec<Card>> {
    let content =
        std::fs::read(path).with_context(|| format!("failed to read card file {}", path))?;
    serde_json::from_slice(&content).with_context(|| format!("invalid card file {}", path))
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match std::env::var("DECKBUILD_CONFIG") {
        Ok(path) => AppConfig::from_yaml_file(&path)?,
        Err(_) => AppConfig::default_config(),
    };

    let cards = match std::env::var("DECKBUILD_CARDS") {
        Ok(path) => load_cards(&path)?,
        Err(_) => Vec::new(),
    };
    if cards.is_empty() {
        tracing::warn!("starting with an empty card catalog; upload one with PUT /catalog");
    }

    ServerBuilder::from_config(config)
        .with_cards(cards)
        .serve()
        .await
}
