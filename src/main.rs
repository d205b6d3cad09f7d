use clap::Parser;
use docsim::cli::commands::{Cli, Commands};
use docsim::DocSim;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let db_path = std::env::var("DOCSIM_DB").unwrap_or_else(|_| "./docsim.db".into());

    let ds = match DocSim::new(&db_path) {
        Ok(ds) => ds,
        Err(e) => {
            eprintln!("Error initializing docsim: {e}");
            std::process::exit(1);
        }
    };

    let result = run_command(ds, cli.command).await;
    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run_command(ds: DocSim, cmd: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        Commands::Serve { addr } => {
            let api_key = std::env::var("DOCSIM_API_KEY").unwrap_or_else(|_| {
                tracing::warn!("DOCSIM_API_KEY not set, using the demo key");
                "demo-api-key-change-in-production".into()
            });
            docsim::server::serve(Arc::new(ds), &addr, api_key).await?;
        }
        Commands::Add { content, metadata } => {
            let meta = metadata.map(|m| parse_metadata(&m));
            let outcome = ds.ingest(&content, meta).await?;
            println!("{}", serde_json::to_string_pretty(&outcome).unwrap());
        }
        Commands::Search { query, limit } => {
            let results = ds.search(&query, limit).await?;
            println!("{}", serde_json::to_string_pretty(&results).unwrap());
        }
        Commands::Compare { doc1, doc2 } => {
            let similarity = ds.compare(&doc1, &doc2).await?;
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "similarity": similarity,
                    "percentage": similarity * 100.0,
                }))
                .unwrap()
            );
        }
        Commands::Documents { limit } => {
            let docs = ds.documents(limit)?;
            println!("{}", serde_json::to_string_pretty(&docs).unwrap());
        }
        Commands::Delete { id } => {
            let deleted = ds.delete_document(&id)?;
            if deleted {
                println!("Deleted {id}");
            } else {
                println!("No document with id {id}");
            }
        }
        Commands::Clear => {
            ds.clear()?;
            println!("Store cleared");
        }
        Commands::Stats => {
            let stats = ds.stats()?;
            println!("{}", serde_json::to_string_pretty(&stats).unwrap());
        }
    }
    Ok(())
}

/// Metadata arguments are JSON objects; anything else is kept as a note so
/// a bare string on the command line still round-trips.
fn parse_metadata(raw: &str) -> serde_json::Value {
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(v) if v.is_object() => v,
        _ => serde_json::json!({ "note": raw }),
    }
}
