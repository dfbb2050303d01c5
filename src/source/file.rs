use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use crate::activity::ActivityRecord;

use super::{parse_listing, ActivitySource, SourceError};

/// Reads a previously saved activity search response from disk.
pub struct FileActivitySource {
    path: PathBuf,
}

impl FileActivitySource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl ActivitySource for FileActivitySource {
    async fn list(&self, limit: usize) -> Result<Vec<ActivityRecord>, SourceError> {
        debug!("Reading activity listing from {:?}", self.path);
        let body = match tokio::fs::read_to_string(&self.path).await {
            Ok(v) => v,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SourceError::Unavailable(self.path.display().to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        parse_listing(&body, limit)
    }
}
