//! Direct database commands. These bypass the server and read
//! `DATABASE_URL` and `FIELDMAP_COLLECTION` from the environment.

use std::path::{Path, PathBuf};

use clap::Subcommand;
use fieldmap_core::{AppConfig, CollectionName};
use serde_json::Value;
use sqlx::PgPool;

#[derive(Debug, Subcommand)]
pub enum DbCommands {
    /// Check database connectivity
    Ping,
    /// Run pending migrations and create the configured collection table
    Migrate,
    /// Import raw equipment documents from a JSON array file
    Import {
        /// Path to a file holding a JSON array of objects
        file: PathBuf,
    },
    /// Print the number of stored documents
    Count,
}

async fn connect(config: &AppConfig) -> anyhow::Result<PgPool> {
    let pool_config = fieldmap_db::PoolConfig::from_app_config(config);
    let pool = fieldmap_db::connect_pool(&config.database_url, pool_config).await?;
    Ok(pool)
}

pub(crate) async fn run(command: DbCommands) -> anyhow::Result<()> {
    let config = fieldmap_core::load_app_config()?;
    let pool = connect(&config).await?;

    match command {
        DbCommands::Ping => {
            fieldmap_db::health_check(&pool).await?;
            println!("database: ok");
        }
        DbCommands::Migrate => {
            let applied = fieldmap_db::run_migrations(&pool).await?;
            fieldmap_db::ensure_collection(&pool, &config.collection).await?;
            println!("applied {applied} migration(s); collection {} ready", config.collection);
        }
        DbCommands::Import { file } => {
            let (imported, skipped) = import_file(&pool, &config.collection, &file).await?;
            println!(
                "imported {imported} document(s) into {}; skipped {skipped} non-object entr{}",
                config.collection,
                if skipped == 1 { "y" } else { "ies" }
            );
        }
        DbCommands::Count => {
            let count = fieldmap_db::count_records(&pool, &config.collection).await?;
            println!("{count}");
        }
    }

    Ok(())
}

/// Splits a parsed import payload into the documents to insert and the
/// number of entries that are not JSON objects.
fn split_documents(payload: Value) -> anyhow::Result<(Vec<Value>, usize)> {
    let Value::Array(entries) = payload else {
        anyhow::bail!("import file must contain a JSON array of objects");
    };
    let total = entries.len();
    let documents: Vec<Value> = entries.into_iter().filter(Value::is_object).collect();
    let skipped = total - documents.len();
    Ok((documents, skipped))
}

async fn import_file(
    pool: &PgPool,
    collection: &CollectionName,
    file: &Path,
) -> anyhow::Result<(usize, usize)> {
    let raw = tokio::fs::read_to_string(file).await?;
    let payload: Value = serde_json::from_str(&raw)?;
    let (documents, skipped) = split_documents(payload)?;

    if skipped > 0 {
        tracing::warn!(skipped, file = %file.display(), "skipping non-object entries");
    }

    for document in &documents {
        fieldmap_db::insert_record(pool, collection, document).await?;
    }

    Ok((documents.len(), skipped))
}
