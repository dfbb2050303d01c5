//! Matching of activities with the archives sitting in the downloads folder, and turning matched
//! archives into canonically named `.fit` files.
//!  - [reconcile] only looks at the filesystem.
//!  - [extract::Extractor] unpacks and renames, one activity at a time, reporting each outcome
//!    separately so a broken archive doesn't stop the others.

pub mod extract;

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::activity::{naming::archive_path, ActivityRecord};

/// Whether the archive of an activity has been downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationResult {
    pub activity: ActivityRecord,
    pub archive_path: PathBuf,
    pub found: bool,
}

/// Looks up `{downloads_dir}/{id}.zip` for every activity. Output order follows input order.
pub fn reconcile(
    activities: impl IntoIterator<Item = ActivityRecord>,
    downloads_dir: &Path,
) -> Vec<ReconciliationResult> {
    activities
        .into_iter()
        .map(|activity| {
            let archive_path = archive_path(downloads_dir, &activity.id);
            let found = archive_path.is_file();
            debug!("Archive {archive_path:?} found: {found}");
            ReconciliationResult {
                activity,
                archive_path,
                found,
            }
        })
        .collect()
}
