// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::{bail, Context, Result};
use std::env;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

use arctic_composer::config::load_overrides;
use arctic_composer::engine::Composer;
use arctic_composer::fetch::HttpFetcher;
use arctic_composer::viewers::{mount_viewer, PrioritizedSelector, ViewerDescriptor, ViewerHost};

/// Command line options
#[derive(Debug, Default)]
struct CliArgs {
    manifest: String,
    base: Option<String>,
    config: Option<String>,
    overrides: Option<String>,
    location: Option<String>,
}

fn usage(program: &str) -> String {
    format!(
        "Usage: {} <manifest-url> [--base <url|dir>] [--config <url>] [--overrides <file>] [--location <page-url>]\n\
         Example: {} data/ensemble/index.json --base ./www --location \"http://localhost:3000/?MagicLens=true\"",
        program, program
    )
}

fn parse_args(args: &[String]) -> Result<CliArgs> {
    let program = args.first().map(String::as_str).unwrap_or("arctic-composer");
    let mut parsed = CliArgs::default();
    let mut rest = args.iter().skip(1);

    while let Some(arg) = rest.next() {
        let slot = match arg.as_str() {
            "--base" => &mut parsed.base,
            "--config" => &mut parsed.config,
            "--overrides" => &mut parsed.overrides,
            "--location" => &mut parsed.location,
            "-h" | "--help" => bail!(usage(program)),
            flag if flag.starts_with("--") => bail!("Unknown option '{}'\n{}", flag, usage(program)),
            manifest => {
                if !parsed.manifest.is_empty() {
                    bail!("Only one manifest URL may be given\n{}", usage(program));
                }
                parsed.manifest = manifest.to_string();
                continue;
            }
        };
        let value = rest
            .next()
            .with_context(|| format!("Option '{}' needs a value\n{}", arg, usage(program)))?;
        *slot = Some(value.clone());
    }

    if parsed.manifest.is_empty() {
        bail!(usage(program));
    }
    Ok(parsed)
}

/// Host that prints what would be mounted.
struct ConsoleHost;

impl ViewerHost for ConsoleHost {
    fn set_style(&self, property: &str, value: &str) {
        println!("🎨 {}: {}", property, value);
    }

    fn unmount(&self) {}

    fn mount(&self, ui: &str, viewer: &ViewerDescriptor) -> Result<(), String> {
        println!("🖼️  Mounting {}", ui);
        print_viewer(viewer, 1);
        Ok(())
    }
}

fn print_viewer(viewer: &ViewerDescriptor, depth: usize) {
    let indent = "  ".repeat(depth);
    if let Some(model) = &viewer.query_data_model {
        println!("{}query data model {} {:?}", indent, model.id(), model.values());
    }
    if let Some(renderers) = &viewer.renderers {
        for entry in renderers.entries() {
            println!("{}• {} ({})", indent, entry.name, entry.role.kind());
        }
    }
    if let Some(listing) = &viewer.listing {
        println!("{}listing: {}", indent, listing);
    }
    for (i, child) in viewer.list.iter().enumerate() {
        println!("{}[{}] {}", indent, i, child.ui);
        print_viewer(child, depth + 1);
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    if let Err(e) = run(&args).await {
        eprintln!("❌ {:#}", e);
        std::process::exit(1);
    }
}

async fn run(args: &[String]) -> Result<()> {
    let cli = parse_args(args)?;

    let base = match &cli.base {
        Some(base) => base.clone(),
        None => env::current_dir()
            .context("Could not determine the working directory")?
            .display()
            .to_string(),
    };
    let fetcher = HttpFetcher::from_location(&base)?;

    println!("🧊 ArcticViewer composition");
    println!("═══════════════════════════");
    println!("Manifest: {}", cli.manifest);
    println!("Base: {}", fetcher.base());
    println!();

    let mut builder = Composer::builder(Arc::new(fetcher), Arc::new(PrioritizedSelector::default()));
    if let Some(config) = &cli.config {
        builder = builder.config_url(config.clone());
    }
    if let Some(location) = &cli.location {
        builder = builder.location(location.clone());
    }
    if let Some(path) = &cli.overrides {
        let overrides = load_overrides(path)
            .with_context(|| format!("Could not load overrides from '{}'", path))?;
        builder = builder.overrides(overrides);
    }
    let composer = builder.build();

    let start = Instant::now();
    let viewer = composer.compose(&cli.manifest).await?;
    println!("✅ Composed {} in {:?}", viewer.ui, start.elapsed());

    if let Some(render_pass) = mount_viewer(&viewer, &ConsoleHost)? {
        render_pass.await.context("Initial render pass panicked")?;
    }

    let refetched = composer.scheduler().flush();
    if refetched > 0 {
        println!("🔄 Refetched {} model(s)", refetched);
    }
    Ok(())
}
