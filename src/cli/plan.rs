use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use routebind_cli::planner;
use tracing::info;

use super::output::{render_plan, OutputFormat};
use super::runtime::load_manifest;

#[derive(Args, Clone, Debug)]
pub struct ManifestArgs {
    /// Binding manifest (YAML or JSON)
    #[arg(short, long, value_name = "FILE")]
    pub manifest: PathBuf,
}

pub async fn cmd_plan(args: ManifestArgs, output: &OutputFormat) -> Result<()> {
    let manifest = load_manifest(&args.manifest).await?;
    let report = planner::plan(&manifest)?;
    println!("{}", render_plan(&report, output)?);
    Ok(())
}

pub async fn cmd_validate(args: ManifestArgs) -> Result<()> {
    let manifest = load_manifest(&args.manifest).await?;
    let routes = planner::validate(&manifest)?;
    info!(routes, "Manifest is valid");
    println!("manifest ok: {routes} route(s)");
    Ok(())
}
