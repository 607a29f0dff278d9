//! One-shot request against the search API, for poking at an application from a shell.
//!
//! Usage: `search-request METHOD PATH [JSON_BODY]`
//!
//! Reads `SEARCH_APP_ID`, and the API key from the keyring or `SEARCH_API_KEY`.
//! Set `RUST_LOG=search_client=debug` to watch host failover.

use anyhow::{bail, Context};
use reqwest::Method;
use search_client::{ClientConfig, RequestOptions, SearchClientBuilder};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 2 || args.len() > 3 {
        bail!("usage: search-request METHOD PATH [JSON_BODY]");
    }
    let method: Method = args[0]
        .to_uppercase()
        .parse()
        .with_context(|| format!("invalid HTTP method {:?}", args[0]))?;
    let path = &args[1];

    let mut options = RequestOptions::new();
    if let Some(raw) = args.get(2) {
        let body: serde_json::Value = serde_json::from_str(raw).context("body is not valid JSON")?;
        options = options.json(body);
    }

    let app_id = std::env::var("SEARCH_APP_ID").context("SEARCH_APP_ID is not set")?;
    let client = SearchClientBuilder::new(ClientConfig::from_env(app_id)?).build()?;

    let response: serde_json::Value = client.execute(method, path, options).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);

    for host in client.host_snapshots() {
        tracing::debug!(host = host.url.as_str(), up = host.up, retry_count = host.retry_count, "host state");
    }
    Ok(())
}
