use clap::{Parser, Subcommand};
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use serde_json::Value;

#[derive(Parser)]
#[command(name = "proxy-cli")]
#[command(about = "Inspection CLI for the MCP HTTP proxy", long_about = None)]
struct Cli {
    /// Base URL of a running proxy instance.
    #[arg(short, long, default_value = "http://localhost:3002")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check proxy health and configured backend
    Health,
    /// Show service description and route table
    Describe,
    /// Send a request through the proxy
    Call {
        /// HTTP method (GET, POST, DELETE, ...)
        method: String,
        /// Path including query, e.g. /mcp/github/repos?x=1
        path: String,
        /// JSON body for write methods
        #[arg(short, long)]
        body: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let res = match cli.command {
        Commands::Health => client.get(format!("{}/health", base)).send().await?,
        Commands::Describe => client.get(format!("{}/", base)).send().await?,
        Commands::Call { method, path, body } => {
            let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())?;
            let mut request = client.request(method, format!("{}{}", base, path));
            if let Some(body) = body {
                let value: Value = serde_json::from_str(&body)?;
                request = request.json(&value);
            }
            request.send().await?
        }
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let is_json = res
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("json"));

    if status.is_success() {
        println!("Status: {}", status);
    } else {
        eprintln!("Error: proxy returned status {}", status);
    }

    let text = res.text().await?;
    if is_json {
        match serde_json::from_str::<Value>(&text) {
            Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
            Err(_) => println!("{}", text),
        }
    } else {
        println!("{}", text);
    }
    Ok(())
}
