use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod chat;
pub mod ingest;
pub mod serve;

#[derive(Subcommand)]
enum Command {
    /// Run the API server
    Serve {
        /// Set the server host address
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Set the server port
        #[arg(long, default_value = "2222")]
        port: String,
    },
    /// Start an interactive widget session against a running server
    Chat {
        /// Chat endpoint URL
        #[arg(long, default_value = "http://127.0.0.1:2222/api/chat")]
        url: String,

        /// Bearer token sent with each request
        #[arg(long, default_value = "")]
        token: String,
    },
    /// Load knowledge snippets from a file into the store
    Ingest {
        /// Path to a text file; blank lines separate snippets
        #[arg(long)]
        path: String,
    },
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

pub async fn run() -> Result<()> {
    let args = Cli::parse();

    // Handle each sub command
    match args.command {
        Some(Command::Serve { host, port }) => {
            serve::run(host, port).await;
        }
        Some(Command::Chat { url, token }) => {
            chat::run(url, token).await?;
        }
        Some(Command::Ingest { path }) => {
            ingest::run(path).await?;
        }
        None => {}
    }

    Ok(())
}
