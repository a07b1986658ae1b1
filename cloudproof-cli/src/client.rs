//! HTTP access to the CloudProof activity API.

use crate::CliResult;
use clap::Args;
use cloudproof_core::ActivityPayload;
use log::debug;
use reqwest::Client;
use std::future::Future;
use std::pin::Pin;

const DEFAULT_SERVER_URL: &str = "http://localhost:5000";

/// CLI arguments selecting the activity API.
#[derive(Args, Clone, Debug)]
pub struct ServerArgs {
    /// Base URL of the CloudProof API.
    #[arg(long, env = "CLOUDPROOF_API_URL", default_value = DEFAULT_SERVER_URL)]
    pub server_url: String,
}

/// HTTP client abstraction for fetching activity payloads.
pub trait ActivityClient {
    fn fetch_user_activity<'a>(
        &'a self,
        server_url: &'a str,
        user_id: u64,
        days: u32,
    ) -> Pin<Box<dyn Future<Output = CliResult<ActivityPayload>> + Send + 'a>>;

    fn fetch_profile<'a>(
        &'a self,
        server_url: &'a str,
        username: &'a str,
    ) -> Pin<Box<dyn Future<Output = CliResult<ActivityPayload>> + Send + 'a>>;
}

/// Reqwest-backed activity client.
pub struct ReqwestActivityClient {
    client: Client,
}

impl ReqwestActivityClient {
    /// Build a new reqwest activity client.
    pub fn new() -> CliResult<Self> {
        let client = Client::builder().user_agent("cloudproof-cli").build()?;
        Ok(Self { client })
    }
}

impl ActivityClient for ReqwestActivityClient {
    fn fetch_user_activity<'a>(
        &'a self,
        server_url: &'a str,
        user_id: u64,
        days: u32,
    ) -> Pin<Box<dyn Future<Output = CliResult<ActivityPayload>> + Send + 'a>> {
        Box::pin(fetch_payload(
            &self.client,
            user_activity_url(server_url, user_id, days),
        ))
    }

    fn fetch_profile<'a>(
        &'a self,
        server_url: &'a str,
        username: &'a str,
    ) -> Pin<Box<dyn Future<Output = CliResult<ActivityPayload>> + Send + 'a>> {
        Box::pin(fetch_payload(&self.client, profile_url(server_url, username)))
    }
}

/// Normalize the server URL for consistent API requests.
pub fn normalize_server_url(server_url: &str) -> CliResult<String> {
    let trimmed = server_url.trim();
    if trimmed.is_empty() {
        return Err("server url is required".into());
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}

fn user_activity_url(server_url: &str, user_id: u64, days: u32) -> String {
    format!("{server_url}/api/users/{user_id}/activity?days={days}")
}

fn profile_url(server_url: &str, username: &str) -> String {
    format!(
        "{server_url}/api/profile/{}",
        urlencoding::encode(username)
    )
}

/// GET a payload. Transport errors and non-2xx statuses are errors; a JSON
/// body of any shape is accepted and normalized later.
async fn fetch_payload(client: &Client, url: String) -> CliResult<ActivityPayload> {
    debug!("GET {url}");
    let response = client.get(&url).send().await?.error_for_status()?;
    let body = response.bytes().await?;
    Ok(ActivityPayload::from_json_slice(&body)?)
}
