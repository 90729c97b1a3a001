use anyhow::Context;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use clap::Parser;
use service::{routes, FunctionsConfig, FunctionsState};
use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use vision::VisionClient;

mod service;
mod vision;

#[derive(Parser)]
#[command(author, version, about = "Hold-detection and secrets functions")]
struct Args {
    /// Load the functions config from YAML
    #[arg(long)]
    config: Option<PathBuf>,
    /// Override the bind address from the config
    #[arg(long)]
    bind: Option<SocketAddr>,
    /// Override the vision annotate endpoint
    #[arg(long)]
    vision_endpoint: Option<String>,
    /// Detect holds in a single image file, print JSON and exit
    #[arg(long)]
    detect: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = match args.config {
        Some(path) => FunctionsConfig::load(path)?,
        None => FunctionsConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.bind = bind;
    }
    if let Some(endpoint) = args.vision_endpoint {
        config.vision.endpoint = endpoint;
    }
    let config = config.with_env_secrets(std::env::vars());

    let runtime = TokioBuilder::new_multi_thread()
        .enable_all()
        .build()
        .context("creating functions runtime")?;

    if let Some(image_path) = args.detect {
        let bytes = fs::read(&image_path)
            .with_context(|| format!("reading image {}", image_path.display()))?;
        let client = VisionClient::new(
            config.vision.clone(),
            config.vision_api_key().map(str::to_string),
        );
        let holds = runtime.block_on(client.detect(&STANDARD.encode(bytes)))?;
        println!("{}", serde_json::to_string_pretty(&holds)?);
        return Ok(());
    }

    let bind = config.bind;
    let state = Arc::new(FunctionsState::new(config));
    let served = state.clone();
    runtime.block_on(async move {
        let (addr, server) = warp::serve(routes(served))
            .try_bind_with_graceful_shutdown(bind, async {
                if let Err(err) = signal::ctrl_c().await {
                    log::warn!("awaiting Ctrl+C failed: {}", err);
                }
            })
            .with_context(|| format!("binding functions server to {}", bind))?;
        log::info!("functions listening on {} (Ctrl+C to stop)", addr);
        server.await;
        Ok::<(), anyhow::Error>(())
    })?;

    let metrics = state.metrics().snapshot();
    log::info!(
        "functions stopped: {} handled, {} failed",
        metrics.handled,
        metrics.failed
    );

    Ok(())
}
