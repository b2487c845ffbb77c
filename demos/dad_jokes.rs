use std::process::ExitCode;

use fetch_http::{FetchClient, FetchError};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

const URL: &str = "https://icanhazdadjoke.com/";

#[derive(Debug, Deserialize, Serialize)]
struct DadJoke {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    joke: String,
    #[serde(default)]
    status: u16,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<()> {
    let client = match FetchClient::builder()
        .default_header("Accept", "application/json")
        .build()
    {
        Ok(client) => client,
        Err(err) => anyhow::bail!("client configuration error: {err}"),
    };

    let response = match client.get(URL, None).await {
        Ok(response) => response,
        Err(FetchError::Api(err)) => anyhow::bail!("API response error {err}"),
        Err(err) => anyhow::bail!("client error {err}"),
    };

    let joke: DadJoke = response.json().await?;
    println!("{}", serde_json::to_string_pretty(&joke)?);
    Ok(())
}
