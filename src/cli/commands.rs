use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "docsim", about = "Semantic document similarity store")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1:8080")]
        addr: String,
    },
    /// Ingest a document (duplicate content is a no-op)
    Add {
        /// Document text
        content: String,
        /// Metadata as a JSON object; a plain string is stored under "note"
        #[arg(long)]
        metadata: Option<String>,
    },
    /// Find documents similar to a query
    Search {
        query: String,
        #[arg(long, default_value = "5")]
        limit: usize,
    },
    /// Similarity of two texts, without touching the store
    Compare {
        doc1: String,
        doc2: String,
    },
    /// List stored documents
    Documents {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Delete a document by id
    Delete {
        /// Document id (16 hex chars)
        id: String,
    },
    /// Delete every stored document
    Clear,
    /// Show store statistics
    Stats,
}
