use std::time::Duration;

use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;

use super::error::LookupError;

const USER_AGENT: &str = concat!("akiya-advisor/", env!("CARGO_PKG_VERSION"));

pub fn build_client(timeout: Duration) -> Result<Client, LookupError> {
    Ok(Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()?)
}

/// Parse a base URL so that relative joins append to its path.
pub fn base_url(raw: &str) -> Result<Url, LookupError> {
    let mut url = Url::parse(raw)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Send a request and decode its JSON body, mapping every failure to a
/// typed [`LookupError`].
pub async fn fetch_json<T>(builder: RequestBuilder) -> Result<T, LookupError>
where
    T: DeserializeOwned,
{
    let response = builder.send().await?.error_for_status()?;
    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}
