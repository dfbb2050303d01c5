//! Contains the sources of activity metadata. [ActivitySource] is the contract the pipeline relies
//! on; [file::FileActivitySource] and [http::HttpActivitySource] are the available realizations.
//! Both understand the summary shape returned by the activity search endpoint, see
//! [ActivitySummary].

pub mod file;
pub mod http;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

#[cfg(test)]
use mockall::automock;

use crate::activity::{ActivityId, ActivityRecord};

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("credentials were rejected by the activity service (HTTP {0})")]
    Authentication(u16),

    #[error("activity listing is not available at {0}")]
    Unavailable(String),

    #[error("activity service answered with HTTP {0}")]
    Http(u16),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed activity listing: {0}")]
    Json(#[from] serde_json::Error),
}

/// Supplies the most recent activities, newest first.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ActivitySource: Send + Sync {
    async fn list(&self, limit: usize) -> Result<Vec<ActivityRecord>, SourceError>;
}

/// One entry of the activity search response. Only the fields used by this application are
/// mapped, everything else is ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySummary {
    pub activity_id: ActivityId,
    #[serde(default)]
    pub activity_name: Option<String>,
    #[serde(default)]
    pub start_time_local: Option<String>,
    #[serde(default, rename = "startTimeGMT")]
    pub start_time_gmt: Option<String>,
    #[serde(default)]
    pub activity_type: Option<ActivityType>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityType {
    pub type_key: String,
}

impl From<ActivitySummary> for ActivityRecord {
    fn from(
        ActivitySummary {
            activity_id,
            activity_name,
            start_time_local,
            start_time_gmt,
            activity_type,
        }: ActivitySummary,
    ) -> Self {
        ActivityRecord {
            id: activity_id,
            name: activity_name,
            // An empty start time is rejected later on, per activity, when a file name is needed.
            start_time: start_time_local.or(start_time_gmt).unwrap_or_default(),
            activity_type: activity_type.map(|v| v.type_key),
        }
    }
}

/// Parses an activity search response body, keeping at most `limit` entries.
pub fn parse_listing(body: &str, limit: usize) -> Result<Vec<ActivityRecord>, SourceError> {
    let summaries: Vec<ActivitySummary> = serde_json::from_str(body)?;
    Ok(summaries
        .into_iter()
        .take(limit)
        .map(ActivityRecord::from)
        .collect())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const LISTING: &str = r#"[
        {
            "activityId": 12345678,
            "activityName": "Morning Ride",
            "startTimeLocal": "2023-07-04 08:15:30",
            "startTimeGMT": "2023-07-04 06:15:30",
            "activityType": { "typeId": 2, "typeKey": "cycling" },
            "distance": 42000.0
        },
        {
            "activityId": "87654321",
            "startTimeGMT": "2023-07-03 17:00:00",
            "activityType": { "typeKey": "running" }
        },
        {
            "activityId": 555,
            "activityName": "Evening Swim",
            "startTimeLocal": "2023-07-02 19:30:00"
        }
    ]"#;

    #[test]
    fn listing_maps_summary_fields() -> anyhow::Result<()> {
        let records = parse_listing(LISTING, 10)?;

        assert_eq!(records.len(), 3);
        assert_eq!(
            records[0],
            ActivityRecord::new("12345678", Some("Morning Ride"), "2023-07-04 08:15:30")
                .with_type("cycling")
        );
        assert_eq!(
            records[1],
            ActivityRecord::new("87654321", None, "2023-07-03 17:00:00").with_type("running")
        );
        assert_eq!(records[2].activity_type, None);
        Ok(())
    }

    #[test]
    fn listing_respects_limit() -> anyhow::Result<()> {
        let records = parse_listing(LISTING, 1)?;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id.as_str(), "12345678");
        Ok(())
    }

    #[test]
    fn malformed_listing_is_an_error() {
        assert!(matches!(
            parse_listing("{\"not\": \"a list\"}", 10),
            Err(SourceError::Json(_))
        ));
    }
}
