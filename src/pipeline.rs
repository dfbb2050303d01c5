//! The single pass the application performs: fetch activities, reconcile them with the downloads
//! folder, optionally extract and rename, and report every step.

use std::{collections::BTreeSet, io::Write, path::Path};

use anyhow::Result;
use tracing::{debug, error, info, instrument};

use crate::{
    activity::ActivityRecord,
    archive::ArchiveReader,
    config::Config,
    reconcile::{
        extract::{CollisionPolicy, ExtractionOutcome, Extractor},
        reconcile,
    },
    report::Reporter,
    source::{ActivitySource, SourceError},
};

/// When filtering by type, this many times more activities are requested so that enough remain
/// after filtering.
const FILTER_FETCH_FACTOR: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Only report which archives are present.
    Check,
    /// Also extract and rename matched archives.
    Sync,
}

#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    pub mode: Mode,
    pub collision_policy: CollisionPolicy,
}

/// Counters over one run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub found: usize,
    pub missing: usize,
    pub renamed: usize,
    /// Extracted, but without a payload to rename.
    pub skipped: usize,
    pub failed: usize,
}

/// Retrieves at most `limit` activities, optionally restricted to one type.
pub async fn fetch_activities(
    source: &dyn ActivitySource,
    limit: usize,
    activity_type: Option<&str>,
) -> Result<Vec<ActivityRecord>, SourceError> {
    let Some(activity_type) = activity_type else {
        let mut activities = source.list(limit).await?;
        activities.truncate(limit);
        return Ok(activities);
    };

    let activities = source
        .list(limit.saturating_mul(FILTER_FETCH_FACTOR))
        .await?
        .into_iter()
        .filter(|v| v.is_of_type(activity_type))
        .take(limit)
        .collect::<Vec<_>>();
    debug!("{} activities of type {activity_type}", activities.len());
    Ok(activities)
}

/// Executes the whole pass. Failures of the source are fatal, failures of single activities are
/// reported and counted.
#[instrument(skip_all, fields(mode = ?options.mode))]
pub async fn run<R: ArchiveReader, W: Write>(
    source: &dyn ActivitySource,
    reader: R,
    config: &Config,
    options: RunOptions,
    reporter: &mut Reporter<W>,
) -> Result<RunSummary> {
    let extractor = match options.mode {
        Mode::Check => None,
        Mode::Sync => Some(Extractor::new(
            reader,
            config.require_extract_folder()?.clone(),
            options.collision_policy,
        )),
    };
    if let Some(extractor) = &extractor {
        debug!("Extracting archives into {:?}", extractor.extract_dir());
    }

    let activities =
        fetch_activities(source, config.limit, config.activity_type.as_deref()).await?;
    info!("Fetched {} activities", activities.len());

    process_activities(activities, &config.downloads_folder, extractor, reporter)
}

/// Reconciles `activities` with `downloads_dir` and, given an extractor, unpacks every match.
pub fn process_activities<R: ArchiveReader, W: Write>(
    activities: Vec<ActivityRecord>,
    downloads_dir: &Path,
    mut extractor: Option<Extractor<R>>,
    reporter: &mut Reporter<W>,
) -> Result<RunSummary> {
    let mut summary = RunSummary::default();
    if activities.is_empty() {
        reporter.no_activities()?;
        return Ok(summary);
    }

    reporter.header(activities.len())?;
    for (index, result) in reconcile(activities, downloads_dir).into_iter().enumerate() {
        reporter.activity(index + 1, &result)?;
        if result.found {
            summary.found += 1;
        } else {
            summary.missing += 1;
        }

        let Some(extractor) = extractor.as_mut() else {
            continue;
        };
        let outcome = extractor.process(&result);
        match &outcome {
            Ok(ExtractionOutcome::NotFound) => {}
            Ok(ExtractionOutcome::PayloadMissing { .. }) => summary.skipped += 1,
            Ok(ExtractionOutcome::Renamed { .. }) => summary.renamed += 1,
            Err(e) => {
                error!("Failed to process activity {}: {e:?}", result.activity.id);
                summary.failed += 1;
            }
        }
        reporter.extraction(&outcome)?;
    }

    reporter.summary(&summary)?;
    Ok(summary)
}

/// Distinct activity types among the latest `limit` activities, sorted.
pub async fn list_activity_types(
    source: &dyn ActivitySource,
    limit: usize,
) -> Result<Vec<String>, SourceError> {
    let activities = source.list(limit).await?;
    debug!("Collecting types of {} activities", activities.len());
    Ok(activities
        .into_iter()
        .filter_map(|v| v.activity_type)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect())
}
