//! khmedia CLI: remote bucket bootstrap, offline optimization and object purge.
//!
//! Remote commands read SUPABASE_URL and SUPABASE_KEY from the environment
//! (or `.env`).

use anyhow::Context;
use clap::{Parser, Subcommand};
use khmedia_cli::{init_buckets, init_tracing, optimize_file, purge_url};
use khmedia_core::RemoteStorageConfig;
use khmedia_storage::{create_remote_store, RemoteStore};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "khmedia", about = "khmedia administrative CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create any missing media buckets in the remote store
    InitBuckets,
    /// Optimize an image for a bucket without uploading it
    Optimize {
        /// Path to the source image
        input: PathBuf,
        /// Target bucket (e.g. gallery-images)
        #[arg(long)]
        bucket: String,
        /// Output path (default: <name>.optimized.<ext> next to the input)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Delete the remote object behind a public URL
    PurgeUrl {
        /// Public object URL
        url: String,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

fn remote_store() -> anyhow::Result<Arc<dyn RemoteStore>> {
    let config = RemoteStorageConfig::from_env();
    create_remote_store(&config)?
        .context("Remote store is not configured. Set SUPABASE_URL and SUPABASE_KEY")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::InitBuckets => {
            let store = remote_store()?;
            let summary = init_buckets(store.as_ref()).await;
            print_json(&summary)?;
            if !summary.success {
                anyhow::bail!("Some buckets could not be created");
            }
        }
        Commands::Optimize { input, bucket, out } => {
            let summary = optimize_file(&input, &bucket, out).await?;
            print_json(&summary)?;
        }
        Commands::PurgeUrl { url } => {
            let store = remote_store()?;
            let summary = purge_url(store.as_ref(), &url).await?;
            print_json(&summary)?;
            if !summary.deleted {
                anyhow::bail!("Remote delete failed for {}", url);
            }
        }
    }

    Ok(())
}
