mod cli;

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use futures::future::join_all;
use ratedposters::context::{self, AppContext};
use rp_core::{ContentType, ProviderSelection, RatingMapping, TitleId};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "ratedposters=trace,rp_core=debug,rp_db=debug".to_string()
        } else {
            "ratedposters=info,rp_db=warn".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Rate {
            id,
            content_type,
            providers,
        } => block_on(rate(config_path, TitleId::new(id, content_type), providers)),
        Commands::Batch {
            ids,
            content_type,
            providers,
        } => block_on(batch(config_path, ids, content_type, providers)),
        Commands::Import { file } => block_on(import(config_path, &file)),
        Commands::CheckConfig => check_config(config_path),
    }
}

fn block_on<F: std::future::Future<Output = Result<()>>>(fut: F) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(fut)
}

fn build_context(config_path: Option<&Path>) -> Result<AppContext> {
    let config = context::load_config(config_path);
    for warning in config.validate() {
        tracing::warn!("{}", warning);
    }
    AppContext::from_config(&config).context("Failed to initialise collaborators")
}

async fn rate(config_path: Option<&Path>, title_id: TitleId, providers: ProviderSelection) -> Result<()> {
    let ctx = build_context(config_path)?;
    tracing::info!(title_id = %title_id, "Rating title");

    let record = ctx.pipeline.get_rated_metadata(&title_id, &providers).await;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

async fn batch(
    config_path: Option<&Path>,
    ids: Vec<String>,
    content_type: ContentType,
    providers: ProviderSelection,
) -> Result<()> {
    let ctx = build_context(config_path)?;
    let title_ids: Vec<TitleId> = ids
        .into_iter()
        .map(|id| TitleId::new(id, content_type.clone()))
        .collect();

    let metadata = ctx.pipeline.metadata();
    let records = join_all(title_ids.iter().map(|id| metadata.get_metadata(id))).await;
    tracing::info!(count = records.len(), "Rating batch");

    let rated = ctx.pipeline.get_rated_batch(records, &providers).await;
    println!("{}", serde_json::to_string_pretty(&rated)?);
    Ok(())
}

async fn import(config_path: Option<&Path>, file: &Path) -> Result<()> {
    let ctx = build_context(config_path)?;

    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read ratings file: {:?}", file))?;
    let entries: HashMap<String, RatingMapping> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse ratings file: {:?}", file))?;

    let titles = entries.len();
    let rows = ctx.ratings_db.import(entries).await?;
    println!("Imported {} ratings for {} titles", rows, titles);
    Ok(())
}

fn check_config(config_path: Option<&Path>) -> Result<()> {
    let resolved = context::resolve_config_path(config_path);
    match &resolved {
        Some(p) => println!("Config file: {:?}", p),
        None => println!("No config file found, using defaults"),
    }

    let config = context::load_config(config_path);
    println!("  Rating provider: {}", config.omdb.base_url);
    println!("  Metadata service: {}", config.metadata.base_url);
    println!(
        "  Shared cache: {}",
        config.cache.redis_url.as_deref().unwrap_or("(in-process only)")
    );
    println!("  Ratings database: {}", config.database.path.display());

    let warnings = config.validate();
    if warnings.is_empty() {
        println!("✓ Configuration is valid");
    } else {
        for warning in &warnings {
            println!("⚠ {}", warning);
        }
    }
    Ok(())
}
