//! HTTP plumbing shared by the Wikipedia and Wiktionary clients.

use crate::config::HttpConfig;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// User-Agent string identifying this client, as the Wikimedia API policy asks
pub const USER_AGENT: &str = concat!(
    "wikisnip/",
    env!("CARGO_PKG_VERSION"),
    " (https://github.com/cladam/wikisnip)"
);

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid server name: {0:?}")]
    InvalidServer(String),
    #[error("unexpected response: missing {0}")]
    MissingField(&'static str),
}

/// Create a configured HTTP client
pub fn create_client(config: &HttpConfig) -> Result<Client, FetchError> {
    let client = Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}
