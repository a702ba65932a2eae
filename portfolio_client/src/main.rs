use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use futures::stream::{self, StreamExt};
use portfolio_client::{GraphQLClient, HttpImageUploader, PortfolioClient};
use serde_json::{json, Value};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about = "Browse the public project catalogue", long_about = None)]
struct Args {
    /// Write the JSON result to this file instead of stdout
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List one page of projects
    List {
        /// Only projects in this category
        #[arg(short, long)]
        category: Option<String>,

        /// Continue after this cursor
        #[arg(long)]
        cursor: Option<String>,
    },
    /// Show one or more projects by id
    Show {
        #[arg(required = true)]
        ids: Vec<String>,

        /// Number of concurrent requests
        #[arg(short, long, default_value_t = 4)]
        concurrent: usize,
    },
    /// Show a user with their latest projects
    User {
        id: String,

        /// How many projects to include
        #[arg(short, long)]
        last: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "portfolio_client=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let api_url = env::var("GRAFBASE_API_URL").map_err(|_| "GRAFBASE_API_URL not set")?;
    let api_key = env::var("GRAFBASE_API_KEY").map_err(|_| "GRAFBASE_API_KEY not set")?;
    let server_url = env::var("SERVER_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

    let gql = GraphQLClient::new()?;
    let uploader = HttpImageUploader::new(gql.http().clone(), &server_url);
    let client = PortfolioClient::new(gql, api_url, api_key, Arc::new(uploader));

    let output = match args.command {
        Command::List { category, cursor } => {
            let page = client
                .fetch_all_projects(category.as_deref(), cursor.as_deref())
                .await?;
            serde_json::to_value(page)?
        }
        Command::Show { ids, concurrent } => {
            let results = stream::iter(ids)
                .map(|id| {
                    let client = &client;
                    async move {
                        match client.get_project_details(&id).await {
                            Ok(Some(project)) => json!(project),
                            Ok(None) => json!({ "id": id, "error": "not found" }),
                            Err(e) => json!({ "id": id, "error": e.to_string() }),
                        }
                    }
                })
                .buffered(concurrent.max(1))
                .collect::<Vec<Value>>()
                .await;
            Value::Array(results)
        }
        Command::User { id, last } => match client.get_user_projects(&id, last).await? {
            Some(user) => serde_json::to_value(user)?,
            None => {
                eprintln!("No user with id {}", id);
                return Ok(());
            }
        },
    };

    let rendered = serde_json::to_string_pretty(&output)?;
    match args.output {
        Some(path) => {
            std::fs::write(&path, rendered)?;
            eprintln!("Wrote {}", path.display());
        }
        None => println!("{}", rendered),
    }

    Ok(())
}
