use std::io::{self, IsTerminal};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, level_filters::LevelFilter, warn};

use crate::{
    archive::ZipArchiveReader,
    config::{Config, SourceConfig},
    pipeline::{self, list_activity_types, Mode, RunOptions},
    reconcile::extract::CollisionPolicy,
    report::Reporter,
    source::{file::FileActivitySource, http::HttpActivitySource, ActivitySource},
    utils::{dir::create_application_default_path, logging::enable_logging},
};

/// Number of activities sampled by `types` unless `--limit` is given.
const TYPE_SAMPLE_SIZE: usize = 50;

#[derive(Parser, Debug)]
#[command(
    name = "fitrecon",
    version,
    about = "Checks recent activities against downloaded archives and extracts their .fit files",
    long_about = None
)]
struct Args {
    #[command(subcommand)]
    commands: Option<Commands>,
    #[arg(
        long,
        global = true,
        value_parser = parse_limit,
        help = "Number of recent activities to look at. Overrides ACTIVITY_LIMIT"
    )]
    limit: Option<usize>,
    #[arg(
        long = "activity-type",
        global = true,
        help = "Only look at activities of this type, for example \"cycling\". Overrides ACTIVITY_TYPE"
    )]
    activity_type: Option<String>,
    #[arg(
        long = "on-collision",
        global = true,
        default_value_t = CollisionPolicy::Suffix,
        help = "What to do when two activities of one run get the same file name"
    )]
    collision_policy: CollisionPolicy,
    #[arg(long, global = true, help = "Also print logs to stderr")]
    log: bool,
    #[arg(long = "log-filter", global = true, help = "Log level, for example \"debug\"")]
    log_filter: Option<LevelFilter>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Check for archives, extract them and rename activity files. The default")]
    Sync,
    #[command(about = "Only check which activities have a downloaded archive")]
    Check,
    #[command(about = "List the types of recent activities")]
    Types,
}

fn parse_limit(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(v) if v > 0 => Ok(v),
        _ => Err(format!("{value} is not a positive number")),
    }
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let application_path = create_application_default_path();
    enable_logging(application_path.as_deref().ok(), args.log_filter, args.log)?;
    if let Err(e) = &application_path {
        warn!("No log directory, logging to stderr only: {e}");
    }

    let mut config = Config::from_env()?;
    if let Some(limit) = args.limit {
        config.limit = limit;
    }
    if let Some(activity_type) = args.activity_type.clone() {
        config.activity_type = Some(activity_type);
    }

    let source = create_source(&config.source)?;
    let stdout = io::stdout();
    let colored = stdout.is_terminal();
    let mut reporter = Reporter::new(stdout, colored);

    let mode = match args.commands.unwrap_or(Commands::Sync) {
        Commands::Types => {
            let types =
                list_activity_types(source.as_ref(), args.limit.unwrap_or(TYPE_SAMPLE_SIZE))
                    .await?;
            reporter.activity_types(&types)?;
            return Ok(());
        }
        Commands::Check => Mode::Check,
        Commands::Sync => Mode::Sync,
    };

    let summary = pipeline::run(
        source.as_ref(),
        ZipArchiveReader,
        &config,
        RunOptions {
            mode,
            collision_policy: args.collision_policy,
        },
        &mut reporter,
    )
    .await?;
    info!("Run finished {summary:?}");
    Ok(())
}

fn create_source(config: &SourceConfig) -> Result<Box<dyn ActivitySource>> {
    Ok(match config {
        SourceConfig::Http { url, credentials } => {
            Box::new(HttpActivitySource::new(url.clone(), credentials.clone())?)
        }
        SourceConfig::File(path) => Box::new(FileActivitySource::new(path.clone())),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_arguments_means_sync_defaults() {
        let args = Args::try_parse_from(["fitrecon"]).unwrap();
        assert_eq!(args.commands, None);
        assert_eq!(args.collision_policy, CollisionPolicy::Suffix);
        assert_eq!(args.limit, None);
        assert!(!args.log);
    }

    #[test]
    fn global_options_follow_subcommands() {
        let args = Args::try_parse_from([
            "fitrecon",
            "check",
            "--limit",
            "5",
            "--activity-type",
            "cycling",
            "--on-collision",
            "fail",
        ])
        .unwrap();
        assert_eq!(args.commands, Some(Commands::Check));
        assert_eq!(args.limit, Some(5));
        assert_eq!(args.activity_type.as_deref(), Some("cycling"));
        assert_eq!(args.collision_policy, CollisionPolicy::Fail);
    }

    #[test]
    fn zero_limit_is_rejected() {
        assert!(Args::try_parse_from(["fitrecon", "--limit", "0"]).is_err());
    }

    #[test]
    fn source_follows_configuration() {
        assert!(create_source(&SourceConfig::File("activities.json".into())).is_ok());
    }
}
