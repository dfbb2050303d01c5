//! Archive extraction. [ArchiveReader] abstracts the archive format so that the extraction step
//! can be exercised with failing readers in tests; [ZipArchiveReader] is what the application
//! uses.

use std::{
    fs::File,
    io::{self, BufReader},
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::{debug, warn};

#[cfg(test)]
use mockall::automock;

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unreadable archive: {0}")]
    Zip(#[from] zip::result::ZipError),
}

#[cfg_attr(test, automock)]
pub trait ArchiveReader {
    /// Unpacks every entry of `archive` into `destination`, replacing files that already exist.
    /// Returns the paths of the extracted files.
    fn extract_all(&self, archive: &Path, destination: &Path) -> Result<Vec<PathBuf>, ArchiveError>;
}

pub struct ZipArchiveReader;

impl ArchiveReader for ZipArchiveReader {
    fn extract_all(&self, archive: &Path, destination: &Path) -> Result<Vec<PathBuf>, ArchiveError> {
        debug!("Extracting {archive:?} into {destination:?}");
        let file = File::open(archive)?;
        let mut zip = zip::ZipArchive::new(BufReader::new(file))?;

        let mut extracted = Vec::with_capacity(zip.len());
        for i in 0..zip.len() {
            let mut entry = zip.by_index(i)?;
            // Entries pointing outside of the destination are skipped.
            let Some(name) = entry.enclosed_name() else {
                warn!("Skipping unsafe entry {:?} in {archive:?}", entry.name());
                continue;
            };
            let path = destination.join(name);

            if entry.is_dir() {
                std::fs::create_dir_all(&path)?;
                continue;
            }
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            // `File::create` truncates, the last extraction wins.
            let mut out = File::create(&path)?;
            io::copy(&mut entry, &mut out)?;
            extracted.push(path);
        }
        Ok(extracted)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::io::Write;

    use anyhow::Result;
    use tempfile::tempdir;
    use zip::{write::SimpleFileOptions, ZipWriter};

    use super::*;

    /// Writes a zip archive containing `entries` (name, content) to `path`.
    pub(crate) fn write_zip(path: &Path, entries: &[(&str, &str)]) -> Result<()> {
        let mut writer = ZipWriter::new(File::create(path)?);
        for (name, content) in entries {
            writer.start_file(*name, SimpleFileOptions::default())?;
            writer.write_all(content.as_bytes())?;
        }
        writer.finish()?;
        Ok(())
    }

    #[test]
    fn extracts_every_entry() -> Result<()> {
        let dir = tempdir()?;
        let archive = dir.path().join("1.zip");
        write_zip(&archive, &[("1_ACTIVITY.fit", "fit"), ("notes.txt", "notes")])?;
        let out = dir.path().join("out");
        std::fs::create_dir(&out)?;

        let mut extracted = ZipArchiveReader.extract_all(&archive, &out)?;
        extracted.sort();

        assert_eq!(extracted, vec![out.join("1_ACTIVITY.fit"), out.join("notes.txt")]);
        assert_eq!(std::fs::read(out.join("1_ACTIVITY.fit"))?, b"fit");
        Ok(())
    }

    #[test]
    fn overwrites_existing_files() -> Result<()> {
        let dir = tempdir()?;
        let archive = dir.path().join("1.zip");
        write_zip(&archive, &[("1_ACTIVITY.fit", "new")])?;
        let out = dir.path().join("out");
        std::fs::create_dir(&out)?;
        std::fs::write(out.join("1_ACTIVITY.fit"), b"old")?;

        ZipArchiveReader.extract_all(&archive, &out)?;

        assert_eq!(std::fs::read(out.join("1_ACTIVITY.fit"))?, b"new");
        Ok(())
    }

    #[test]
    fn corrupt_archive_is_an_error() -> Result<()> {
        let dir = tempdir()?;
        let archive = dir.path().join("1.zip");
        std::fs::write(&archive, b"definitely not a zip")?;

        assert!(matches!(
            ZipArchiveReader.extract_all(&archive, dir.path()),
            Err(ArchiveError::Zip(_))
        ));
        Ok(())
    }
}
