use clap::{Args, Parser, Subcommand};
use reqwest::StatusCode;
use serde_json::Value;

use precedent_proxy::endpoints::catalog;

#[derive(Parser)]
#[command(name = "precedent-cli")]
#[command(about = "Query a running precedent proxy", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// data.go.kr service key, forwarded as `serviceKey`.
    #[arg(short, long, env = "PRECEDENT_SERVICE_KEY")]
    key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Paging {
    #[arg(long)]
    page: Option<u32>,

    #[arg(long)]
    rows: Option<u32>,
}

#[derive(Subcommand)]
enum Commands {
    /// Search precedents
    Search {
        #[command(flatten)]
        paging: Paging,
        /// Case result filter (kindA)
        #[arg(long)]
        result: Option<String>,
        /// Case type filter (kindB)
        #[arg(long)]
        case_type: Option<String>,
        /// Accident/disease filter (kindC)
        #[arg(long)]
        accident: Option<String>,
    },
    /// Fetch a lookup list: accident-types, case-types, result-types, statistics
    Lookup {
        endpoint: String,
        #[command(flatten)]
        paging: Paging,
    },
    /// Check proxy status
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let (route, mut query) = match cli.command {
        Commands::Status => {
            let res = client.get(format!("{base}/status")).send().await?;
            return print_response(res).await;
        }
        Commands::Search {
            paging,
            result,
            case_type,
            accident,
        } => {
            let mut query = paging_query(&paging);
            for (name, value) in [("kindA", result), ("kindB", case_type), ("kindC", accident)] {
                if let Some(value) = value {
                    query.push((name, value));
                }
            }
            (catalog::PRECEDENTS.route, query)
        }
        Commands::Lookup { endpoint, paging } => {
            let descriptor = catalog::by_name(&endpoint)
                .filter(|d| d.filters.is_empty())
                .ok_or_else(|| format!("unknown lookup endpoint: {endpoint}"))?;
            (descriptor.route, paging_query(&paging))
        }
    };

    if let Some(key) = cli.key {
        query.push(("serviceKey", key));
    }

    let res = client
        .get(format!("{base}{route}"))
        .query(&query)
        .send()
        .await?;
    print_response(res).await
}

fn paging_query(paging: &Paging) -> Vec<(&'static str, String)> {
    let mut query = Vec::new();
    if let Some(page) = paging.page {
        query.push(("pageNo", page.to_string()));
    }
    if let Some(rows) = paging.rows {
        query.push(("numOfRows", rows.to_string()));
    }
    query
}

/// Print the body, then fail on a non-2xx status so scripts can detect it.
async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => {
            let pretty = serde_json::to_string_pretty(&json)?;
            if status.is_success() {
                println!("{pretty}");
            } else {
                eprintln!("{pretty}");
            }
        }
        Err(_) => eprintln!("Response: {text}"),
    }
    ensure_success(status)
}

fn ensure_success(status: StatusCode) -> Result<(), Box<dyn std::error::Error>> {
    if status.is_success() {
        Ok(())
    } else {
        Err(format!("proxy returned status {status}").into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_success_status_is_an_error() {
        assert!(ensure_success(StatusCode::OK).is_ok());

        let err = ensure_success(StatusCode::BAD_REQUEST).unwrap_err();
        assert_eq!(err.to_string(), "proxy returned status 400 Bad Request");
        assert!(ensure_success(StatusCode::INTERNAL_SERVER_ERROR).is_err());
    }
}
