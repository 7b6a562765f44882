use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use reqwest::{Client, Response};
use serde_json::json;

#[derive(Parser)]
#[command(name = "incident-copilot-cli")]
#[command(about = "Incident Copilot CLI", long_about = None)]
struct Cli {
    #[arg(short, long, env = "INCIDENT_COPILOT_ENDPOINT", default_value = "http://localhost:3001")]
    endpoint: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a new incident
    Create {
        #[arg(short, long)]
        title: String,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(short = 'S', long)]
        severity: Option<String>,
    },

    /// List incidents
    List {
        #[arg(short, long, default_value = "0")]
        page: u32,

        #[arg(short = 's', long, default_value = "20")]
        page_size: u32,

        /// Comma-separated statuses
        #[arg(long)]
        status: Option<String>,

        /// Free-text filter
        #[arg(short, long)]
        query: Option<String>,
    },

    /// Get incident details
    Get {
        #[arg(value_name = "INCIDENT_ID")]
        id: String,
    },

    /// Move an incident to a new status
    Status {
        #[arg(value_name = "INCIDENT_ID")]
        id: String,

        #[arg(value_name = "STATUS")]
        status: String,
    },

    /// Find incidents similar to some text
    Similar {
        #[arg(value_name = "TEXT")]
        text: String,

        #[arg(short, long, default_value = "5")]
        k: usize,
    },

    /// Suggest severity, tags and next steps for a draft incident
    Suggest {
        #[arg(short, long, default_value = "")]
        title: String,

        #[arg(short, long)]
        description: Option<String>,
    },

    /// Summarize a stored incident
    Summary {
        #[arg(value_name = "INCIDENT_ID")]
        id: String,
    },

    /// Ask the assistant about one incident
    Chat {
        #[arg(value_name = "INCIDENT_ID")]
        id: String,

        #[arg(value_name = "MESSAGE")]
        message: String,
    },

    /// Ask the assistant about recent incidents
    Ask {
        #[arg(value_name = "QUESTION")]
        question: String,
    },

    /// Recompute one incident's embedding
    Embed {
        #[arg(value_name = "INCIDENT_ID")]
        id: String,
    },

    /// Recompute every embedding
    Rebuild,

    /// Check server health
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = Client::new();
    let base = cli.endpoint.trim_end_matches('/').to_string();

    let response = match cli.command {
        Commands::Create {
            title,
            description,
            severity,
        } => {
            client
                .post(format!("{}/v1/incidents", base))
                .json(&json!({
                    "title": title,
                    "description": description,
                    "severity": severity.map(|s| s.to_uppercase()),
                }))
                .send()
                .await?
        }

        Commands::List {
            page,
            page_size,
            status,
            query,
        } => {
            let mut params = vec![
                ("page", page.to_string()),
                ("page_size", page_size.to_string()),
            ];
            if let Some(status) = status {
                params.push(("status", status));
            }
            if let Some(query) = query {
                params.push(("q", query));
            }

            client
                .get(format!("{}/v1/incidents", base))
                .query(&params)
                .send()
                .await?
        }

        Commands::Get { id } => {
            client
                .get(format!("{}/v1/incidents/{}", base, id))
                .send()
                .await?
        }

        Commands::Status { id, status } => {
            client
                .patch(format!("{}/v1/incidents/{}/status", base, id))
                .json(&json!({ "status": status.to_uppercase() }))
                .send()
                .await?
        }

        Commands::Similar { text, k } => {
            client
                .get(format!("{}/v1/incidents/similar", base))
                .query(&[("q", text), ("k", k.to_string())])
                .send()
                .await?
        }

        Commands::Suggest { title, description } => {
            client
                .post(format!("{}/v1/incidents/suggest", base))
                .json(&json!({ "title": title, "description": description }))
                .send()
                .await?
        }

        Commands::Summary { id } => {
            client
                .get(format!("{}/v1/incidents/{}/summary", base, id))
                .send()
                .await?
        }

        Commands::Chat { id, message } => {
            client
                .post(format!("{}/v1/incidents/{}/chat", base, id))
                .json(&json!({ "messages": [{ "role": "user", "content": message }] }))
                .send()
                .await?
        }

        Commands::Ask { question } => {
            client
                .post(format!("{}/v1/assistant/query", base))
                .json(&json!({ "question": question }))
                .send()
                .await?
        }

        Commands::Embed { id } => {
            client
                .post(format!("{}/v1/incidents/{}/embedding", base, id))
                .send()
                .await?
        }

        Commands::Rebuild => {
            client
                .post(format!("{}/v1/incidents/embeddings/rebuild", base))
                .send()
                .await?
        }

        Commands::Health => client.get(format!("{}/health", base)).send().await?,
    };

    print_response(response).await
}

async fn print_response(response: Response) -> Result<()> {
    let status = response.status();
    let body: serde_json::Value = response
        .json()
        .await
        .with_context(|| format!("Server returned {} with a non-JSON body", status))?;

    println!("{}", serde_json::to_string_pretty(&body)?);

    if !status.is_success() {
        bail!("Request failed with status {}", status);
    }
    Ok(())
}
