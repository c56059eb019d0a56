//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use moodle_sync_core::config::{DEFAULT_CONFIG_PATH, FileConfig};

/// Mirror course files from a Moodle portal into a local directory tree.
///
/// Logs in, walks the newest term's courses, and downloads every PDF and ZIP
/// resource that is not already on disk. Runs in a loop unless --once is given.
#[derive(Parser, Debug)]
#[command(name = "moodle-sync")]
#[command(author, version, about)]
pub struct Args {
    /// Path to the INI config file
    #[arg(short = 'c', long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Root directory of the mirrored tree (overrides TargetDir)
    #[arg(short = 't', long)]
    pub target_dir: Option<PathBuf>,

    /// Portal base URL (overrides BaseURL)
    #[arg(short = 'u', long)]
    pub base_url: Option<String>,

    /// Seconds between sync cycles (overrides Interval)
    #[arg(short = 'i', long, value_parser = clap::value_parser!(u64).range(1..=604_800))]
    pub interval: Option<u64>,

    /// Run a single sync cycle and exit
    #[arg(long)]
    pub once: bool,

    /// Sync every discovered term instead of only the newest
    #[arg(long)]
    pub all_terms: bool,

    /// Write logs to stderr instead of the log file
    #[arg(long)]
    pub log_stderr: bool,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Overlays command-line values on the file config.
    pub fn apply_overrides(&self, file_config: &mut FileConfig) {
        if let Some(target_dir) = &self.target_dir {
            file_config.target_dir = Some(target_dir.clone());
        }
        if let Some(base_url) = &self.base_url {
            file_config.base_url = Some(base_url.clone());
        }
        if let Some(interval) = self.interval {
            file_config.interval_secs = Some(interval);
        }
        if self.all_terms {
            file_config.all_terms = Some(true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_args_parses_successfully() {
        let args = Args::try_parse_from(["moodle-sync"]).unwrap();
        assert_eq!(args.config, PathBuf::from("config.ini"));
        assert!(args.target_dir.is_none());
        assert!(args.interval.is_none());
        assert!(!args.once);
        assert!(!args.all_terms);
        assert_eq!(args.verbose, 0);
        assert!(!args.quiet);
    }

    #[test]
    fn test_cli_verbose_flag_increments_count() {
        let args = Args::try_parse_from(["moodle-sync", "-vv"]).unwrap();
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_cli_help_flag_shows_usage() {
        let result = Args::try_parse_from(["moodle-sync", "--help"]);
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_cli_interval_zero_rejected() {
        let result = Args::try_parse_from(["moodle-sync", "--interval", "0"]);
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_cli_invalid_flag_returns_error() {
        let result = Args::try_parse_from(["moodle-sync", "--invalid-flag"]);
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }

    #[test]
    fn test_cli_overrides_replace_file_values() {
        let args = Args::try_parse_from([
            "moodle-sync",
            "--target-dir",
            "/srv/courses",
            "--base-url",
            "https://portal.example/",
            "--interval",
            "60",
            "--all-terms",
        ])
        .unwrap();
        let mut file_config = FileConfig {
            target_dir: Some(PathBuf::from("./old")),
            interval_secs: Some(3600),
            ..FileConfig::default()
        };

        args.apply_overrides(&mut file_config);

        assert_eq!(file_config.target_dir, Some(PathBuf::from("/srv/courses")));
        assert_eq!(file_config.base_url.as_deref(), Some("https://portal.example/"));
        assert_eq!(file_config.interval_secs, Some(60));
        assert_eq!(file_config.all_terms, Some(true));
    }

    #[test]
    fn test_cli_without_overrides_keeps_file_values() {
        let args = Args::try_parse_from(["moodle-sync"]).unwrap();
        let mut file_config = FileConfig {
            target_dir: Some(PathBuf::from("./keep")),
            ..FileConfig::default()
        };
        args.apply_overrides(&mut file_config);
        assert_eq!(file_config.target_dir, Some(PathBuf::from("./keep")));
        assert!(file_config.all_terms.is_none());
    }
}
