use std::path::Path;

use anyhow::{Context, Result};
use routebind_cli::manifest::{apply_env_overrides, parse_manifest_str, BindingManifest};
use tokio::fs;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use super::output::LogFormat;

pub fn init_logging(level: &str, debug: bool, format: LogFormat) -> Result<()> {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        level.parse().context("Invalid log level")?
    };

    let registry = tracing_subscriber::registry().with(
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.to_string())),
    );

    // stdout is reserved for command output
    match format {
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
    }

    Ok(())
}

pub async fn load_manifest(path: &Path) -> Result<BindingManifest> {
    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read manifest {}", path.display()))?;
    let mut manifest = parse_manifest_str(&raw)
        .with_context(|| format!("Failed to parse manifest {}", path.display()))?;
    apply_env_overrides(&mut manifest).context("Invalid stack override")?;
    info!(
        path = %path.display(),
        routes = manifest.routes.len(),
        functions = manifest.functions.len(),
        "Loaded binding manifest"
    );
    Ok(manifest)
}
