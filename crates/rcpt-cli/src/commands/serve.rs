//! Serve command - run the HTTP API.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use tracing::warn;

use rcpt_core::ReceiptExtractor;
use rcpt_server::AppState;

use super::{build_categorizer, load_config, load_recognizer};

/// Arguments for the serve command.
#[derive(Args)]
pub struct ServeArgs {
    /// Address to bind (overrides config)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Refine categories remotely even when disabled in config
    #[arg(long)]
    categorize: bool,
}

pub async fn run(args: ServeArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    let mut server = config.server.clone();
    if let Some(host) = args.host {
        server.host = host;
    }
    if let Some(port) = args.port {
        server.port = port;
    }

    let mut state = AppState::new(ReceiptExtractor::with_config(&config.extraction))
        .with_categorizer(build_categorizer(&config.categorizer, args.categorize)?);

    // Without models the server still answers /extract
    match load_recognizer(&config.ocr, args.model_dir.as_deref()) {
        Ok(engine) => state = state.with_recognizer(Arc::new(engine)),
        Err(e) => warn!("OCR disabled: {:#}", e),
    }

    rcpt_server::serve(state, &server).await
}
