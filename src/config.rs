//! Application configuration. Everything is read once at startup from the environment (a `.env`
//! file in the working directory is loaded first) and validated eagerly, so that the rest of the
//! application works with a plain [Config] value.

use std::{fmt::Debug, io, path::PathBuf};

use thiserror::Error;
use tracing::debug;

pub const DOWNLOADS_FOLDER: &str = "DOWNLOADS_FOLDER";
pub const EXTRACT_FOLDER: &str = "EXTRACT_FOLDER";
pub const ACTIVITIES_URL: &str = "ACTIVITIES_URL";
pub const ACTIVITIES_FILE: &str = "ACTIVITIES_FILE";
pub const EMAIL: &str = "EMAIL";
pub const PASSWORD: &str = "PASSWORD";
pub const ACTIVITY_LIMIT: &str = "ACTIVITY_LIMIT";
pub const ACTIVITY_TYPE: &str = "ACTIVITY_TYPE";

pub const DEFAULT_ACTIVITY_LIMIT: usize = 10;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    MissingVariable(&'static str),

    #[error("{name} has an invalid value {value:?}")]
    InvalidValue { name: &'static str, value: String },

    #[error("no activity source configured, set {ACTIVITIES_URL} or {ACTIVITIES_FILE}")]
    MissingSource,

    #[error("can't load .env file: {0}")]
    EnvFile(String),
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceConfig {
    Http { url: String, credentials: Credentials },
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub source: SourceConfig,
    pub downloads_folder: PathBuf,
    /// Only needed when archives are extracted, hence optional here.
    pub extract_folder: Option<PathBuf>,
    pub limit: usize,
    pub activity_type: Option<String>,
}

impl Config {
    /// Loads `.env` if present and reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        check_env_file(dotenvy::dotenv())?;
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &'static str| get(key).ok_or(ConfigError::MissingVariable(key));

        let downloads_folder = PathBuf::from(require(DOWNLOADS_FOLDER)?);
        let extract_folder = get(EXTRACT_FOLDER).map(PathBuf::from);

        let source = match (get(ACTIVITIES_URL), get(ACTIVITIES_FILE)) {
            (Some(url), _) => SourceConfig::Http {
                url,
                credentials: Credentials {
                    email: require(EMAIL)?,
                    password: require(PASSWORD)?,
                },
            },
            (None, Some(file)) => SourceConfig::File(PathBuf::from(file)),
            (None, None) => return Err(ConfigError::MissingSource),
        };

        let limit = match get(ACTIVITY_LIMIT) {
            Some(value) => parse_limit(&value).ok_or(ConfigError::InvalidValue {
                name: ACTIVITY_LIMIT,
                value,
            })?,
            None => DEFAULT_ACTIVITY_LIMIT,
        };

        Ok(Self {
            source,
            downloads_folder,
            extract_folder,
            limit,
            activity_type: get(ACTIVITY_TYPE),
        })
    }

    /// The extraction folder, failing when it wasn't configured.
    pub fn require_extract_folder(&self) -> Result<&PathBuf, ConfigError> {
        self.extract_folder
            .as_ref()
            .ok_or(ConfigError::MissingVariable(EXTRACT_FOLDER))
    }
}

/// An absent `.env` is the common case, anything else means the file is there but unusable.
fn check_env_file<T: Debug>(result: dotenvy::Result<T>) -> Result<(), ConfigError> {
    match result {
        Ok(v) => {
            debug!("Loaded env file {v:?}");
            Ok(())
        }
        Err(dotenvy::Error::Io(e)) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ConfigError::EnvFile(e.to_string())),
    }
}

fn parse_limit(value: &str) -> Option<usize> {
    value.trim().parse::<usize>().ok().filter(|v| *v > 0)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use tempfile::tempdir;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn file_source_configuration() {
        let config = Config::from_lookup(lookup(&[
            (DOWNLOADS_FOLDER, "/downloads"),
            (EXTRACT_FOLDER, "/extracted"),
            (ACTIVITIES_FILE, "/activities.json"),
        ]))
        .unwrap();

        assert_eq!(
            config,
            Config {
                source: SourceConfig::File("/activities.json".into()),
                downloads_folder: "/downloads".into(),
                extract_folder: Some("/extracted".into()),
                limit: DEFAULT_ACTIVITY_LIMIT,
                activity_type: None,
            }
        );
    }

    #[test]
    fn url_takes_precedence_and_needs_credentials() {
        let missing_password = Config::from_lookup(lookup(&[
            (DOWNLOADS_FOLDER, "/downloads"),
            (ACTIVITIES_URL, "https://example.test/activities"),
            (ACTIVITIES_FILE, "/activities.json"),
            (EMAIL, "rider@example.test"),
        ]));
        assert_eq!(missing_password, Err(ConfigError::MissingVariable(PASSWORD)));

        let config = Config::from_lookup(lookup(&[
            (DOWNLOADS_FOLDER, "/downloads"),
            (ACTIVITIES_URL, "https://example.test/activities"),
            (ACTIVITIES_FILE, "/activities.json"),
            (EMAIL, "rider@example.test"),
            (PASSWORD, "secret"),
        ]))
        .unwrap();
        assert!(matches!(config.source, SourceConfig::Http { .. }));
    }

    #[test]
    fn downloads_folder_is_required() {
        let result = Config::from_lookup(lookup(&[
            (DOWNLOADS_FOLDER, "  "),
            (ACTIVITIES_FILE, "/activities.json"),
        ]));
        assert_eq!(result, Err(ConfigError::MissingVariable(DOWNLOADS_FOLDER)));
    }

    #[test]
    fn some_source_is_required() {
        let result = Config::from_lookup(lookup(&[(DOWNLOADS_FOLDER, "/downloads")]));
        assert_eq!(result, Err(ConfigError::MissingSource));
    }

    #[test]
    fn extract_folder_only_required_on_demand() {
        let config = Config::from_lookup(lookup(&[
            (DOWNLOADS_FOLDER, "/downloads"),
            (ACTIVITIES_FILE, "/activities.json"),
        ]))
        .unwrap();
        assert_eq!(
            config.require_extract_folder(),
            Err(ConfigError::MissingVariable(EXTRACT_FOLDER))
        );
    }

    #[test]
    fn limit_and_type_are_read() {
        let config = Config::from_lookup(lookup(&[
            (DOWNLOADS_FOLDER, "/downloads"),
            (ACTIVITIES_FILE, "/activities.json"),
            (ACTIVITY_LIMIT, "25"),
            (ACTIVITY_TYPE, "cycling"),
        ]))
        .unwrap();
        assert_eq!(config.limit, 25);
        assert_eq!(config.activity_type.as_deref(), Some("cycling"));

        let invalid = Config::from_lookup(lookup(&[
            (DOWNLOADS_FOLDER, "/downloads"),
            (ACTIVITIES_FILE, "/activities.json"),
            (ACTIVITY_LIMIT, "0"),
        ]));
        assert_eq!(
            invalid,
            Err(ConfigError::InvalidValue {
                name: ACTIVITY_LIMIT,
                value: "0".into()
            })
        );
    }

    #[test]
    fn missing_env_file_is_fine() -> anyhow::Result<()> {
        let dir = tempdir()?;
        assert_eq!(check_env_file(dotenvy::from_path(dir.path().join(".env"))), Ok(()));
        Ok(())
    }

    #[test]
    fn broken_env_file_is_reported() {
        let malformed = check_env_file::<()>(Err(dotenvy::Error::LineParse(
            "DOWNLOADS_FOLDER '/downloads".into(),
            17,
        )));
        assert!(matches!(malformed, Err(ConfigError::EnvFile(_))));

        let unreadable = check_env_file::<()>(Err(dotenvy::Error::Io(io::Error::new(
            io::ErrorKind::PermissionDenied,
            "denied",
        ))));
        assert!(matches!(unreadable, Err(ConfigError::EnvFile(_))));
    }
}
