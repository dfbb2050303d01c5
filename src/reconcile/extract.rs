use std::{
    collections::HashMap,
    fmt::Display,
    path::{Path, PathBuf},
};

use clap::ValueEnum;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    activity::{
        naming::{payload_file_name, CanonicalFileName},
        ActivityId,
    },
    archive::{ArchiveError, ArchiveReader},
    utils::time::TimestampError,
};

use super::ReconciliationResult;

/// What to do when two different activities of one run end up with the same canonical name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum CollisionPolicy {
    /// Append `-2`, `-3`, ... to the later file.
    #[default]
    Suffix,
    /// Last writer wins.
    Overwrite,
    /// Leave the later payload under its original name and report an error.
    Fail,
}

impl Display for CollisionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollisionPolicy::Suffix => write!(f, "suffix"),
            CollisionPolicy::Overwrite => write!(f, "overwrite"),
            CollisionPolicy::Fail => write!(f, "fail"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionOutcome {
    /// No archive was downloaded, nothing was done.
    NotFound,
    /// The archive didn't contain `{id}_ACTIVITY.fit`. Its content was still extracted.
    PayloadMissing { extracted: usize },
    Renamed { from: PathBuf, to: PathBuf },
}

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("failed to extract {path:?}: {source}")]
    Archive {
        path: PathBuf,
        #[source]
        source: ArchiveError,
    },

    #[error(transparent)]
    InvalidStartTime(#[from] TimestampError),

    #[error("failed to rename {from:?} to {to:?}: {source}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{name} was already produced for activity {owner} during this run")]
    Collision {
        name: CanonicalFileName,
        owner: ActivityId,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Extracts matched archives into one directory and gives their payload the canonical name.
/// Names produced so far are remembered to detect collisions between activities.
pub struct Extractor<R> {
    reader: R,
    extract_dir: PathBuf,
    policy: CollisionPolicy,
    claimed: HashMap<CanonicalFileName, ActivityId>,
}

impl<R: ArchiveReader> Extractor<R> {
    pub fn new(reader: R, extract_dir: PathBuf, policy: CollisionPolicy) -> Self {
        Self {
            reader,
            extract_dir,
            policy,
            claimed: HashMap::new(),
        }
    }

    pub fn extract_dir(&self) -> &Path {
        &self.extract_dir
    }

    pub fn process(
        &mut self,
        result: &ReconciliationResult,
    ) -> Result<ExtractionOutcome, ExtractionError> {
        if !result.found {
            return Ok(ExtractionOutcome::NotFound);
        }
        let id = &result.activity.id;

        std::fs::create_dir_all(&self.extract_dir)?;
        let extracted = self
            .reader
            .extract_all(&result.archive_path, &self.extract_dir)
            .map_err(|source| ExtractionError::Archive {
                path: result.archive_path.clone(),
                source,
            })?;
        debug!("Extracted {} files for activity {id}", extracted.len());

        let payload = self.extract_dir.join(payload_file_name(id));
        if !payload.is_file() {
            warn!("Archive of activity {id} has no {payload:?}, skipping rename");
            return Ok(ExtractionOutcome::PayloadMissing {
                extracted: extracted.len(),
            });
        }

        let canonical = CanonicalFileName::for_activity(&result.activity)?;
        let name = self.resolve_collision(canonical, id)?;
        let target = self.extract_dir.join(&name);

        std::fs::rename(&payload, &target).map_err(|source| ExtractionError::Rename {
            from: payload.clone(),
            to: target.clone(),
            source,
        })?;
        info!("Renamed {payload:?} to {target:?}");

        self.claimed.insert(name, id.clone());
        Ok(ExtractionOutcome::Renamed {
            from: payload,
            to: target,
        })
    }

    /// Picks the final name for `id`. A name already produced for the same activity is reused, so
    /// duplicated listings overwrite themselves.
    fn resolve_collision(
        &self,
        canonical: CanonicalFileName,
        id: &ActivityId,
    ) -> Result<CanonicalFileName, ExtractionError> {
        let free = |name: &CanonicalFileName| {
            self.claimed
                .get(name)
                .map_or(true, |owner| owner == id)
        };
        if free(&canonical) {
            return Ok(canonical);
        }

        match self.policy {
            CollisionPolicy::Overwrite => {
                warn!("{canonical} is overwritten by activity {id}");
                Ok(canonical)
            }
            CollisionPolicy::Fail => Err(ExtractionError::Collision {
                owner: self.claimed[&canonical].clone(),
                name: canonical,
            }),
            CollisionPolicy::Suffix => {
                let mut counter = 2;
                let mut name = canonical.with_counter(counter);
                while !free(&name) {
                    counter += 1;
                    name = canonical.with_counter(counter);
                }
                warn!("{canonical} is taken, activity {id} is saved as {name}");
                Ok(name)
            }
        }
    }
}
