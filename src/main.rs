use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use tomostudy::config::AppConfig;
use tomostudy::core::auth::hash_password;
use tomostudy::observability::init_tracing;
use tomostudy::server::ServerBuilder;
use tomostudy::storage::InMemoryVocabularyService;

#[derive(Debug, Parser)]
#[command(name = "tomostudy", version, about = "Vocabulary management backend")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server
    Serve {
        /// YAML configuration file; environment variables are used otherwise
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Print the stored form of a password for USER_PASSWORD_HASH
    HashPassword { password: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve { config } => {
            // a missing .env file is fine
            let _ = dotenvy::dotenv();

            let config = match config {
                Some(path) => AppConfig::from_yaml_file(&path)
                    .with_context(|| format!("loading {}", path.display()))?,
                None => AppConfig::from_env().context("loading configuration from environment")?,
            };
            init_tracing(config.environment);
            tracing::info!(config = ?config, "configuration loaded");

            let service = InMemoryVocabularyService::with_uniqueness(config.word_uniqueness);
            ServerBuilder::new(config)
                .with_vocabulary_service(service)
                .serve()
                .await
        }
        Command::HashPassword { password } => {
            let hash = hash_password(&password)
                .map_err(|err| anyhow::anyhow!("hashing password: {err}"))?;
            println!("{hash}");
            Ok(())
        }
    }
}
