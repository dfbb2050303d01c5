use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::{debug, info};

use crate::{activity::ActivityRecord, config::Credentials};

use super::{parse_listing, ActivitySource, SourceError};

/// Fetches the activity listing from the web API. Credentials are sent with every request, the
/// service is expected to answer with the activity search response body.
pub struct HttpActivitySource {
    url: String,
    credentials: Credentials,
    client: reqwest::Client,
}

impl HttpActivitySource {
    pub fn new(url: String, credentials: Credentials) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            url,
            credentials,
            client,
        })
    }
}

/// Maps unsuccessful status codes onto the errors the application distinguishes.
fn check_status(status: StatusCode, url: &str) -> Result<(), SourceError> {
    match status {
        s if s.is_success() => Ok(()),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Err(SourceError::Authentication(status.as_u16()))
        }
        StatusCode::NOT_FOUND => Err(SourceError::Unavailable(url.to_string())),
        s => Err(SourceError::Http(s.as_u16())),
    }
}

#[async_trait]
impl ActivitySource for HttpActivitySource {
    async fn list(&self, limit: usize) -> Result<Vec<ActivityRecord>, SourceError> {
        debug!("Requesting {limit} activities from {}", self.url);
        let response = self
            .client
            .get(&self.url)
            .query(&[("limit", limit.to_string()), ("start", "0".to_string())])
            .basic_auth(&self.credentials.email, Some(&self.credentials.password))
            .send()
            .await?;

        check_status(response.status(), &self.url)?;

        let body = response.text().await?;
        let records = parse_listing(&body, limit)?;
        info!("Received {} activities", records.len());
        Ok(records)
    }
}
