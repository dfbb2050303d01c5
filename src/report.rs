//! Human readable status lines. Everything is written through [Reporter] so that the output can be
//! captured in tests, the binary passes stdout.

use std::io::{self, Write};

use ansi_term::Colour;

use crate::{
    pipeline::RunSummary,
    reconcile::{
        extract::{ExtractionError, ExtractionOutcome},
        ReconciliationResult,
    },
};

const RULE_WIDTH: usize = 80;

pub struct Reporter<W> {
    out: W,
    colored: bool,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, colored: bool) -> Self {
        Self { out, colored }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn paint(&self, colour: Colour, text: &str) -> String {
        if self.colored {
            colour.paint(text).to_string()
        } else {
            text.to_string()
        }
    }

    pub fn no_activities(&mut self) -> io::Result<()> {
        let line = self.paint(Colour::Red, "No activities found");
        writeln!(self.out, "{line}")
    }

    pub fn header(&mut self, count: usize) -> io::Result<()> {
        writeln!(self.out, "Found {count} recent activities:")?;
        writeln!(self.out, "{}", "=".repeat(RULE_WIDTH))
    }

    /// One line per activity. `index` starts from 1.
    pub fn activity(&mut self, index: usize, result: &ReconciliationResult) -> io::Result<()> {
        let status = if result.found {
            self.paint(
                Colour::Green,
                &format!("File found: {}", result.archive_path.display()),
            )
        } else {
            self.paint(Colour::Red, "File not found")
        };
        writeln!(
            self.out,
            "{index:2}. {} (ID: {}) - {status}",
            result.activity.display_name(index),
            result.activity.id,
        )
    }

    /// Nested line describing what happened to a matched archive.
    pub fn extraction(
        &mut self,
        outcome: &Result<ExtractionOutcome, ExtractionError>,
    ) -> io::Result<()> {
        let line = match outcome {
            Ok(ExtractionOutcome::NotFound) => return Ok(()),
            Ok(ExtractionOutcome::PayloadMissing { extracted }) => self.paint(
                Colour::Yellow,
                &format!("Extracted {extracted} files, no activity file to rename"),
            ),
            Ok(ExtractionOutcome::Renamed { to, .. }) => self.paint(
                Colour::Green,
                &format!(
                    "Extracted and renamed to {}",
                    to.file_name().unwrap_or(to.as_os_str()).to_string_lossy()
                ),
            ),
            Err(e) => self.paint(Colour::Red, &format!("Extraction failed: {e}")),
        };
        writeln!(self.out, "      {line}")
    }

    pub fn summary(&mut self, summary: &RunSummary) -> io::Result<()> {
        writeln!(self.out, "{}", "=".repeat(RULE_WIDTH))?;
        writeln!(
            self.out,
            "{} found, {} missing, {} renamed, {} without activity file, {} failed",
            summary.found, summary.missing, summary.renamed, summary.skipped, summary.failed
        )
    }

    /// Numbered list of activity types.
    pub fn activity_types(&mut self, types: &[String]) -> io::Result<()> {
        writeln!(self.out, "Available activity types:")?;
        for (i, activity_type) in types.iter().enumerate() {
            writeln!(self.out, "{:2}. {activity_type}", i + 1)?;
        }
        Ok(())
    }
}
