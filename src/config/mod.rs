//! Configuration management

use crate::types::CopyError;
use clap::{ArgAction, Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default progress ledger file name (inside the destination root)
pub const PROGRESS_LOG_NAME: &str = ".copy_progress.log";

/// Default error ledger file name (inside the destination root)
pub const ERROR_LOG_NAME: &str = ".copy_errors.log";

/// Resumable, verified bulk copy.
///
/// Copies every file under SOURCE into DEST, recording each verified copy in
/// a progress log so an interrupted run can pick up where it stopped.
#[derive(Debug, Parser)]
#[command(
    name = "rekopy",
    version,
    about,
    subcommand_negates_reqs = true,
    subcommand_precedence_over_arg = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Source directory
    #[arg(required = true)]
    pub source: Option<PathBuf>,

    /// Destination directory (created if absent)
    #[arg(required = true)]
    pub destination: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Hide the live progress bar
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Print the final report as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// TOML file overriding ledger file names
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Re-attempt only the files listed in the error log
    Retry(PathArgs),

    /// Show ledger state without copying anything
    Status(PathArgs),
}

#[derive(Debug, Args)]
pub struct PathArgs {
    /// Source directory
    pub source: PathBuf,

    /// Destination directory
    pub destination: PathBuf,
}

/// What a run should do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Copy everything not yet recorded in the progress log
    #[default]
    Fresh,

    /// Copy only what the error log lists
    Retry,

    /// Read-only inspection of the ledgers
    Status,
}

/// Optional settings loaded from a TOML file
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    /// Progress ledger file name
    pub progress_log: Option<String>,

    /// Error ledger file name
    pub error_log: Option<String>,
}

impl ConfigFile {
    /// Load and parse a config file
    pub fn load(path: &Path) -> Result<Self, CopyError> {
        let content = fs::read_to_string(path).map_err(|e| {
            CopyError::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, CopyError> {
        toml::from_str(content)
            .map_err(|e| CopyError::Config(format!("Invalid config file: {}", e)))
    }
}

/// Global configuration for rekopy
#[derive(Debug, Clone)]
pub struct Config {
    /// Source directory
    pub source: PathBuf,

    /// Destination directory
    pub destination: PathBuf,

    /// Fresh copy, retry or status
    pub mode: RunMode,

    /// Progress ledger file name
    pub progress_log_name: String,

    /// Error ledger file name
    pub error_log_name: String,

    /// Suppress live progress display
    pub quiet: bool,

    /// Emit the report as JSON
    pub json: bool,

    /// Verbosity level from -v
    pub verbose: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: PathBuf::new(),
            destination: PathBuf::new(),
            mode: RunMode::Fresh,
            progress_log_name: PROGRESS_LOG_NAME.to_string(),
            error_log_name: ERROR_LOG_NAME.to_string(),
            quiet: false,
            json: false,
            verbose: 0,
        }
    }
}

impl Config {
    /// Validate configuration
    ///
    /// Runs before any ledger is touched; a failure here aborts the run.
    pub fn validate(&self) -> Result<(), CopyError> {
        if !self.source.exists() {
            return Err(CopyError::SourceNotFound {
                path: self.source.clone(),
            });
        }

        if !self.source.is_dir() {
            return Err(CopyError::Config(format!(
                "Source path is not a directory: {}",
                self.source.display()
            )));
        }

        if self.source == self.destination {
            return Err(CopyError::Config(
                "Source and destination cannot be the same".to_string(),
            ));
        }

        validate_log_name(&self.progress_log_name)?;
        validate_log_name(&self.error_log_name)?;
        if self.progress_log_name == self.error_log_name {
            return Err(CopyError::Config(
                "Progress log and error log must use different file names".to_string(),
            ));
        }

        Ok(())
    }

    /// Absolute location of the progress ledger
    pub fn progress_log_path(&self) -> PathBuf {
        self.destination.join(&self.progress_log_name)
    }

    /// Absolute location of the error ledger
    pub fn error_log_path(&self) -> PathBuf {
        self.destination.join(&self.error_log_name)
    }

    /// Apply overrides from a parsed config file
    pub fn apply_file(&mut self, file: ConfigFile) {
        if let Some(name) = file.progress_log {
            self.progress_log_name = name;
        }
        if let Some(name) = file.error_log {
            self.error_log_name = name;
        }
    }
}

fn validate_log_name(name: &str) -> Result<(), CopyError> {
    if name.trim().is_empty() {
        return Err(CopyError::Config("Log file name cannot be empty".to_string()));
    }
    if name.contains('/') || name.contains('\\') {
        return Err(CopyError::Config(format!(
            "Log file name must not contain path separators: {}",
            name
        )));
    }
    Ok(())
}

impl TryFrom<Cli> for Config {
    type Error = CopyError;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        let (mode, source, destination) = match cli.command {
            Some(Command::Retry(paths)) => (RunMode::Retry, paths.source, paths.destination),
            Some(Command::Status(paths)) => (RunMode::Status, paths.source, paths.destination),
            None => match (cli.source, cli.destination) {
                (Some(source), Some(destination)) => (RunMode::Fresh, source, destination),
                _ => {
                    return Err(CopyError::Config(
                        "Both SOURCE and DEST are required".to_string(),
                    ))
                }
            },
        };

        let mut config = Config {
            source: absolutize(&source)?,
            destination: absolutize(&destination)?,
            mode,
            quiet: cli.quiet,
            json: cli.json,
            verbose: cli.verbose,
            ..Config::default()
        };

        if let Some(path) = &cli.config {
            config.apply_file(ConfigFile::load(path)?);
        }

        config.validate()?;
        Ok(config)
    }
}

/// Make a path absolute without resolving symlinks (the destination may not exist yet).
fn absolutize(path: &Path) -> Result<PathBuf, CopyError> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).expect("parse cli")
    }

    #[test]
    fn test_cli_fresh_mode() {
        let src = TempDir::new().expect("create src tempdir");
        let dst = TempDir::new().expect("create dst tempdir");
        let cli = parse(&[
            "rekopy",
            src.path().to_str().expect("utf8"),
            dst.path().to_str().expect("utf8"),
        ]);

        let config = Config::try_from(cli).expect("valid config");
        assert_eq!(config.mode, RunMode::Fresh);
        assert_eq!(config.source, src.path());
        assert_eq!(config.progress_log_path(), dst.path().join(".copy_progress.log"));
        assert_eq!(config.error_log_path(), dst.path().join(".copy_errors.log"));
    }

    #[test]
    fn test_cli_retry_and_status_subcommands() {
        let src = TempDir::new().expect("create src tempdir");
        let dst = TempDir::new().expect("create dst tempdir");
        let s = src.path().to_str().expect("utf8");
        let d = dst.path().to_str().expect("utf8");

        let retry = Config::try_from(parse(&["rekopy", "retry", s, d])).expect("retry config");
        assert_eq!(retry.mode, RunMode::Retry);

        let status =
            Config::try_from(parse(&["rekopy", "-v", "status", s, d])).expect("status config");
        assert_eq!(status.mode, RunMode::Status);
        assert_eq!(status.verbose, 1);
    }

    #[test]
    fn test_global_flags_before_or_after_subcommand() {
        let src = TempDir::new().expect("create src tempdir");
        let dst = TempDir::new().expect("create dst tempdir");
        let s = src.path().to_str().expect("utf8");
        let d = dst.path().to_str().expect("utf8");

        let before = Config::try_from(parse(&["rekopy", "--json", "--quiet", "retry", s, d]))
            .expect("flags before subcommand");
        assert_eq!(before.mode, RunMode::Retry);
        assert!(before.json);
        assert!(before.quiet);

        let after = Config::try_from(parse(&["rekopy", "retry", "--json", s, d]))
            .expect("flags after subcommand");
        assert_eq!(after.mode, RunMode::Retry);
        assert!(after.json);

        let fresh = Config::try_from(parse(&["rekopy", "-vv", "--json", s, d])).expect("fresh");
        assert_eq!(fresh.mode, RunMode::Fresh);
        assert_eq!(fresh.verbose, 2);
    }

    #[test]
    fn test_cli_requires_paths() {
        assert!(Cli::try_parse_from(["rekopy"]).is_err());
        assert!(Cli::try_parse_from(["rekopy", "only-source"]).is_err());
    }

    #[test]
    fn test_validate_missing_source() {
        let dst = TempDir::new().expect("create dst tempdir");
        let config = Config {
            source: PathBuf::from("/definitely/not/here/rekopy"),
            destination: dst.path().to_path_buf(),
            ..Config::default()
        };
        let err = config.validate().expect_err("missing source must fail");
        assert!(matches!(err, CopyError::SourceNotFound { .. }));
    }

    #[test]
    fn test_validate_same_source_and_destination() {
        let src = TempDir::new().expect("create src tempdir");
        let config = Config {
            source: src.path().to_path_buf(),
            destination: src.path().to_path_buf(),
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(CopyError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_bad_log_names() {
        let src = TempDir::new().expect("create src tempdir");
        let dst = TempDir::new().expect("create dst tempdir");
        let mut config = Config {
            source: src.path().to_path_buf(),
            destination: dst.path().to_path_buf(),
            ..Config::default()
        };
        config.progress_log_name = "nested/progress.log".to_string();
        assert!(config.validate().is_err());

        config.progress_log_name = ERROR_LOG_NAME.to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_file_overrides_log_names() {
        let file = ConfigFile::parse("progress_log = \"done.log\"\nerror_log = \"failed.log\"\n")
            .expect("parse toml");
        let mut config = Config {
            destination: PathBuf::from("/dest"),
            ..Config::default()
        };
        config.apply_file(file);
        assert_eq!(config.progress_log_path(), PathBuf::from("/dest/done.log"));
        assert_eq!(config.error_log_path(), PathBuf::from("/dest/failed.log"));
    }

    #[test]
    fn test_config_file_rejects_unknown_keys() {
        let err = ConfigFile::parse("threads = 8\n").expect_err("unknown key");
        assert!(err.to_string().contains("Invalid config file"));
    }
}
