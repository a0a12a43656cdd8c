use clap::{Parser, Subcommand};
use rp_core::{ContentType, ProviderSelection};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ratedposters")]
#[command(author, version, about = "Attach provider ratings to catalog metadata and posters")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rate a single title and print its metadata as JSON
    Rate {
        /// Title identifier (e.g. tt0111161)
        id: String,

        /// Content type of the title
        #[arg(short = 't', long = "type", default_value = "movie")]
        content_type: ContentType,

        /// Providers to include, comma separated, or "all"
        #[arg(short, long, default_value = "all")]
        providers: ProviderSelection,
    },

    /// Rate a page of titles from the ratings database
    Batch {
        /// Title identifiers
        #[arg(required = true)]
        ids: Vec<String>,

        /// Content type of every title
        #[arg(short = 't', long = "type", default_value = "movie")]
        content_type: ContentType,

        /// Providers to include, comma separated, or "all"
        #[arg(short, long, default_value = "all")]
        providers: ProviderSelection,
    },

    /// Load stored ratings from a JSON file into the ratings database
    Import {
        /// JSON object mapping title ids to provider scores
        #[arg(required = true)]
        file: PathBuf,
    },

    /// Validate configuration and print warnings
    CheckConfig,
}
