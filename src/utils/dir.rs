use std::{env, io, path::PathBuf};

use anyhow::{anyhow, Result};

const APPLICATION_DIR: &str = "fitrecon";

/// Directory for the application's own state (logs). Created when missing.
pub fn create_application_default_path() -> Result<PathBuf> {
    let mut path = platform_state_dir(|key| env::var(key).ok())?;
    path.push(APPLICATION_DIR);

    match std::fs::create_dir_all(&path) {
        Ok(_) => Ok(path),
        Err(v) if v.kind() == io::ErrorKind::AlreadyExists => Ok(path),
        Err(v) => Err(v.into()),
    }
}

fn platform_state_dir(lookup: impl Fn(&str) -> Option<String>) -> Result<PathBuf> {
    cfg_if::cfg_if! {
        if #[cfg(windows)] {
            lookup("APPDATA")
                .map(PathBuf::from)
                .ok_or_else(|| anyhow!("APPDATA should be present on Windows"))
        } else {
            lookup("XDG_STATE_HOME")
                .map(PathBuf::from)
                .or_else(|| {
                    lookup("HOME").map(|home| {
                        let mut path = PathBuf::from(home);
                        path.push(".local/state");
                        path
                    })
                })
                .ok_or_else(|| anyhow!("Couldn't find neither XDG_STATE_HOME nor HOME"))
        }
    }
}
