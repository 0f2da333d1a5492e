#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use futures::StreamExt;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::{
    prelude::__tracing_subscriber_SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

use ::repochat::{repo_name, stream::PartialResult, ChatStore, Config, Rag, Sender};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List the indexed repositories
    Namespaces,
    /// Show the chunks closest to a query
    Search { namespace: String, query: String },
    /// Ask a question about a repository
    Ask { namespace: String, query: String },
    /// Print the stored chat history of a repository
    History { namespace: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "cli=info,repochat=info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let rag = Arc::new(Rag::new(&config));

    match cli.command {
        Commands::Namespaces => {
            for namespace in rag.namespaces().await? {
                println!("{}\t{namespace}", repo_name(&namespace));
            }
        }
        Commands::Search { namespace, query } => {
            for m in rag.search(&namespace, &query).await? {
                println!("{:.3}\t{}", m.score, m.id);
                println!("{}\n", m.metadata.content);
            }
        }
        Commands::Ask { namespace, query } => {
            let mut stream = Box::pin(repochat::stream::ask(rag, namespace, query));

            while let Some(event) = stream.next().await {
                match event? {
                    PartialResult::References(references) => {
                        debug!("Answering from {} chunks", references.len());
                    }
                    PartialResult::Answer(answer) => println!("{answer}"),
                }
            }
        }
        Commands::History { namespace } => {
            let store = ChatStore::new(config.supabase.as_ref());
            if !store.is_persistent() {
                bail!("$SUPABASE_URL not set");
            }

            for message in store.history(&namespace).await? {
                let who = match message.sender {
                    Sender::User => "you",
                    Sender::Bot => "bot",
                };

                println!("{who}: {}\n", message.text);
            }
        }
    }

    Ok(())
}
