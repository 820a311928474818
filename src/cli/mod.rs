//! Operator commands that run against the configured store without starting
//! the HTTP server.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{AppConfig, StorageBackend};
use crate::database::seed::load_reference_file;
use crate::database::{DatabaseManager, Store};

#[derive(Parser)]
#[command(name = "skillmarket")]
#[command(about = "Skill Marketplace CLI - storage maintenance for the marketplace API")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Create missing tables and indexes")]
    Migrate,

    #[command(about = "Append predefined skill records from a JSON file")]
    SeedSkills {
        #[arg(help = "JSON array of {state, district, skill, whatsNew} records")]
        file: PathBuf,

        #[arg(long, help = "Load even if the catalog already has rows")]
        force: bool,
    },
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = AppConfig::from_env();
    config.validate().context("invalid configuration")?;

    match cli.command {
        Commands::Migrate => migrate(&config).await,
        Commands::SeedSkills { file, force } => seed_skills(&config, &file, force).await,
    }
}

async fn migrate(config: &AppConfig) -> anyhow::Result<()> {
    if config.database.backend == StorageBackend::Memory {
        anyhow::bail!("migrate needs the postgres backend; set DATABASE_URL");
    }

    let pool = DatabaseManager::connect(&config.database).await?;
    DatabaseManager::apply_schema(&pool).await?;
    println!("Schema is up to date");
    Ok(())
}

async fn seed_skills(config: &AppConfig, file: &std::path::Path, force: bool) -> anyhow::Result<()> {
    if config.database.backend == StorageBackend::Memory {
        anyhow::bail!("seed-skills needs the postgres backend; set DATABASE_URL");
    }

    let store = DatabaseManager::open(&config.database).await?;
    let inserted = seed_into(store.as_ref(), file, force).await?;
    println!("Inserted {} predefined skill records", inserted);
    Ok(())
}

/// Load `file` into `store`, skipping a populated catalog unless `force`.
pub async fn seed_into(store: &dyn Store, file: &std::path::Path, force: bool) -> anyhow::Result<usize> {
    let existing = store.count_reference().await?;
    if existing > 0 && !force {
        tracing::warn!("Catalog already has {} rows; pass --force to append", existing);
        return Ok(0);
    }

    let records = load_reference_file(file)
        .await
        .with_context(|| format!("failed to load {}", file.display()))?;
    Ok(store.insert_reference(records).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{MemoryStore, ReferenceRepository};
    use std::io::Write;

    fn catalog_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"state":"Kerala","district":"Alappuzha","skill":"Coir weaving","whatsNew":"Geotextiles"}}]"#
        )
        .unwrap();
        file
    }

    #[tokio::test]
    async fn seed_respects_existing_rows_unless_forced() {
        let store = MemoryStore::new();
        let file = catalog_file();

        assert_eq!(seed_into(&store, file.path(), false).await.unwrap(), 1);
        assert_eq!(seed_into(&store, file.path(), false).await.unwrap(), 0);
        assert_eq!(seed_into(&store, file.path(), true).await.unwrap(), 1);
        assert_eq!(store.count_reference().await.unwrap(), 2);
    }

    #[test]
    fn parses_seed_command() {
        let cli = Cli::try_parse_from(["skillmarket", "seed-skills", "skills.json", "--force"]).unwrap();
        match cli.command {
            Commands::SeedSkills { file, force } => {
                assert_eq!(file, PathBuf::from("skills.json"));
                assert!(force);
            }
            _ => panic!("expected seed-skills"),
        }
    }
}
