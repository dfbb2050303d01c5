//! Activity metadata as handed out by an [ActivitySource](crate::source::ActivitySource).
//! The records are read-only for the rest of the application; everything derived from them
//! (archive paths, canonical names) is computed by [naming].

pub mod naming;

use std::{fmt::Display, sync::Arc};

use serde::Deserialize;
use thiserror::Error;

/// Opaque activity identifier. The API returns integers, exports sometimes carry strings, so both
/// are accepted and kept in textual form. Ids end up in file names and must be a single path
/// component.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone, Deserialize)]
#[serde(try_from = "RawActivityId")]
pub struct ActivityId(Arc<str>);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawActivityId {
    Number(u64),
    Text(String),
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("activity id {0:?} can't be used as a file name")]
pub struct InvalidActivityId(pub String);

impl TryFrom<RawActivityId> for ActivityId {
    type Error = InvalidActivityId;

    fn try_from(value: RawActivityId) -> Result<Self, Self::Error> {
        match value {
            RawActivityId::Number(v) => Ok(ActivityId(v.to_string().into())),
            RawActivityId::Text(v) => {
                let usable = !v.is_empty()
                    && v != "."
                    && v != ".."
                    && !v.contains(&naming::FORBIDDEN[..]);
                if usable {
                    Ok(ActivityId(v.into()))
                } else {
                    Err(InvalidActivityId(v))
                }
            }
        }
    }
}

impl From<&str> for ActivityId {
    fn from(value: &str) -> Self {
        ActivityId(value.into())
    }
}

impl ActivityId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ActivityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A recorded exercise session.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct ActivityRecord {
    pub id: ActivityId,
    pub name: Option<String>,
    /// Local start time, e.g. `2023-07-04T08:15:30` or `2023-07-04 08:15:30`.
    pub start_time: String,
    /// Type key such as `cycling` or `running`.
    pub activity_type: Option<String>,
}

impl ActivityRecord {
    pub fn new(id: impl Into<ActivityId>, name: Option<&str>, start_time: &str) -> Self {
        Self {
            id: id.into(),
            name: name.map(str::to_string),
            start_time: start_time.to_string(),
            activity_type: None,
        }
    }

    pub fn with_type(self, activity_type: &str) -> Self {
        Self {
            activity_type: Some(activity_type.to_string()),
            ..self
        }
    }

    /// Name used in status lines. Unnamed activities are labelled by their position.
    pub fn display_name(&self, index: usize) -> String {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name.to_string(),
            _ => format!("Activity_{index}"),
        }
    }

    pub fn is_of_type(&self, activity_type: &str) -> bool {
        self.activity_type
            .as_deref()
            .is_some_and(|v| v.eq_ignore_ascii_case(activity_type))
    }
}
