use std::{
    fmt::Display,
    path::{Path, PathBuf},
};

use crate::utils::time::{parse_start_time, start_time_to_file_prefix, TimestampError};

use super::{ActivityId, ActivityRecord};

const ARCHIVE_EXTENSION: &str = "zip";
const PAYLOAD_SUFFIX: &str = "_ACTIVITY.fit";
const FIT_EXTENSION: &str = ".fit";

/// Characters that can't survive in a file name on at least one of the supported platforms.
pub(crate) const FORBIDDEN: [char; 3] = ['/', '\\', '|'];

/// Where the downloaded archive of an activity is expected: `{dir}/{id}.zip`.
pub fn archive_path(downloads_dir: &Path, id: &ActivityId) -> PathBuf {
    downloads_dir.join(format!("{id}.{ARCHIVE_EXTENSION}"))
}

/// Name of the primary file inside an activity archive.
pub fn payload_file_name(id: &ActivityId) -> String {
    format!("{id}{PAYLOAD_SUFFIX}")
}

/// Replaces spaces with underscores and drops path separators.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .filter(|c| !FORBIDDEN.contains(c))
        .map(|c| if c == ' ' { '_' } else { c })
        .collect()
}

/// `{date}-{time}-activity_{id}_{name}.fit`, the name an extracted activity ends up with.
#[derive(PartialEq, Eq, Hash, Debug, Clone)]
pub struct CanonicalFileName(String);

impl CanonicalFileName {
    pub fn for_activity(activity: &ActivityRecord) -> Result<Self, TimestampError> {
        let start = parse_start_time(&activity.start_time)?;
        let prefix = start_time_to_file_prefix(start);
        let name = activity
            .name
            .as_deref()
            .map(sanitize_name)
            .unwrap_or_default();

        // Ids built in code skip deserialization checks.
        let id = sanitize_name(activity.id.as_str());

        let file_name = if name.is_empty() {
            format!("{prefix}-activity_{id}{FIT_EXTENSION}")
        } else {
            format!("{prefix}-activity_{id}_{name}{FIT_EXTENSION}")
        };
        Ok(Self(file_name))
    }

    /// Variant used to disambiguate collisions: `name.fit` becomes `name-2.fit` for `n = 2`.
    pub fn with_counter(&self, n: usize) -> Self {
        let stem = self.0.strip_suffix(FIT_EXTENSION).unwrap_or(&self.0);
        Self(format!("{stem}-{n}{FIT_EXTENSION}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CanonicalFileName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<Path> for CanonicalFileName {
    fn as_ref(&self) -> &Path {
        Path::new(&self.0)
    }
}
