//! Command-line interface argument parsing for hikelog.
//!
//! - `hikelog browse`
//! - `hikelog hike add --name "Coast Walk" --location Cliffside --date 5/6/2024 ...`
//! - `hikelog hike search --name ridge --min-length 5`
//! - `hikelog obs add 3 --text "Gannets diving"`

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::form::parse_length;

/// Environment variable overriding the database location
pub const DB_ENV_VAR: &str = "HIKELOG_DB";

/// Log hikes and the observations made along the way.
#[derive(Parser, Debug)]
#[command(name = "hikelog")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the hike database file
    /// Defaults to $HIKELOG_DB, then <data dir>/hikelog/hikelog.db
    #[arg(long, global = true)]
    pub db_path: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Browse hikes and observations in an interactive terminal view
    Browse,

    /// Create, list, search and remove hikes
    #[command(subcommand)]
    Hike(HikeCommand),

    /// Record and manage observations on a hike
    #[command(name = "obs")]
    #[command(subcommand)]
    Observation(ObservationCommand),
}

#[derive(Subcommand, Debug)]
pub enum HikeCommand {
    /// Add a new hike
    Add(HikeFields),

    /// Change fields of an existing hike
    Edit {
        id: i64,
        #[command(flatten)]
        fields: HikeFields,
    },

    /// Show a hike with its observations
    Show {
        id: i64,
        #[arg(long)]
        json: bool,
    },

    /// List every hike
    List {
        #[arg(long)]
        json: bool,
    },

    /// List hikes matching all of the given criteria
    Search {
        #[command(flatten)]
        criteria: SearchCriteria,
        #[arg(long)]
        json: bool,
    },

    /// Delete a hike and its observations
    Delete {
        id: i64,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },

    /// Delete every hike and observation
    DeleteAll {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

/// Hike form fields. All optional here; `add` checks the required ones.
#[derive(Args, Debug, Default, Clone)]
pub struct HikeFields {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
    /// Date of the hike, e.g. 5/6/2024
    #[arg(long)]
    pub date: Option<String>,
    /// Parking available: Yes or No
    #[arg(long)]
    pub parking: Option<String>,
    /// Length in kilometres
    #[arg(long, allow_hyphen_values = true)]
    pub length: Option<String>,
    /// Easy, Medium or Hard
    #[arg(long)]
    pub difficulty: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub weather: Option<String>,
    /// Recommended gear
    #[arg(long)]
    pub gear: Option<String>,
}

#[derive(Args, Debug, Default, Clone)]
pub struct SearchCriteria {
    /// Name contains this text
    #[arg(long)]
    pub name: Option<String>,
    /// Location contains this text
    #[arg(long)]
    pub location: Option<String>,
    /// Exact date
    #[arg(long)]
    pub date: Option<String>,
    /// Exact difficulty ("Any difficulty" matches all)
    #[arg(long)]
    pub difficulty: Option<String>,
    /// Minimum length in kilometres (inclusive)
    #[arg(long, allow_hyphen_values = true, value_parser = parse_length)]
    pub min_length: Option<f64>,
    /// Maximum length in kilometres (inclusive)
    #[arg(long, allow_hyphen_values = true, value_parser = parse_length)]
    pub max_length: Option<f64>,
}

#[derive(Subcommand, Debug)]
pub enum ObservationCommand {
    /// Record an observation on a hike
    Add {
        hike_id: i64,
        /// What was observed
        #[arg(long)]
        text: String,
        /// Time of the observation (YYYY-MM-DD HH:MM:SS), defaults to now
        #[arg(long)]
        time: Option<String>,
        #[arg(long)]
        comments: Option<String>,
    },

    /// List the observations on a hike
    List {
        hike_id: i64,
        #[arg(long)]
        json: bool,
    },

    /// Change an observation
    Edit {
        id: i64,
        #[arg(long)]
        text: Option<String>,
        #[arg(long)]
        time: Option<String>,
        #[arg(long)]
        comments: Option<String>,
    },

    /// Delete an observation
    Delete {
        id: i64,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },

    /// Delete every observation on every hike
    DeleteAll {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

/// Configuration derived from CLI arguments and the environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub verbosity: u8,
}

impl AppConfig {
    pub fn from_cli(db_path: Option<PathBuf>, verbosity: u8) -> Self {
        Self::resolve(db_path, std::env::var_os(DB_ENV_VAR).map(PathBuf::from), verbosity)
    }

    fn resolve(db_path: Option<PathBuf>, env_path: Option<PathBuf>, verbosity: u8) -> Self {
        let db_path = db_path
            .or(env_path.filter(|p| !p.as_os_str().is_empty()))
            .unwrap_or_else(|| {
                dirs::data_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join("hikelog")
                    .join("hikelog.db")
            });

        AppConfig { db_path, verbosity }
    }

    /// Log file used while the browser owns the terminal
    pub fn log_path(&self) -> PathBuf {
        self.db_path.with_file_name("hikelog.log")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_db_path() {
        let config = AppConfig::resolve(None, None, 0);
        assert!(config.db_path.ends_with("hikelog/hikelog.db"));
        assert!(config.log_path().ends_with("hikelog/hikelog.log"));
    }

    #[test]
    fn test_cli_path_wins_over_env() {
        let config = AppConfig::resolve(
            Some(PathBuf::from("/tmp/cli.db")),
            Some(PathBuf::from("/tmp/env.db")),
            1,
        );
        assert_eq!(config.db_path, PathBuf::from("/tmp/cli.db"));
        assert_eq!(config.verbosity, 1);
    }

    #[test]
    fn test_env_path_used_when_no_flag() {
        let config = AppConfig::resolve(None, Some(PathBuf::from("/tmp/env.db")), 0);
        assert_eq!(config.db_path, PathBuf::from("/tmp/env.db"));
    }

    #[test]
    fn test_parse_hike_add() {
        let cli = Cli::try_parse_from([
            "hikelog", "--db-path", "/tmp/h.db", "hike", "add", "--name", "Coast Walk",
            "--location", "Cliffside", "--date", "5/6/2024", "--parking", "Yes", "--length",
            "8.2", "--difficulty", "Medium",
        ])
        .unwrap();
        assert_eq!(cli.db_path, Some(PathBuf::from("/tmp/h.db")));
        match cli.command {
            Commands::Hike(HikeCommand::Add(fields)) => {
                assert_eq!(fields.name.as_deref(), Some("Coast Walk"));
                assert_eq!(fields.length.as_deref(), Some("8.2"));
                assert!(fields.gear.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_obs_and_search() {
        let cli = Cli::try_parse_from(["hikelog", "obs", "add", "3", "--text", "Gannets", "-vv"])
            .unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(
            cli.command,
            Commands::Observation(ObservationCommand::Add { hike_id: 3, .. })
        ));

        let cli = Cli::try_parse_from([
            "hikelog", "hike", "search", "--name", "ridge", "--min-length", "5",
        ])
        .unwrap();
        match cli.command {
            Commands::Hike(HikeCommand::Search { criteria, json }) => {
                assert_eq!(criteria.name.as_deref(), Some("ridge"));
                assert_eq!(criteria.min_length, Some(5.0));
                assert!(!json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_search_lengths_are_validated() {
        for bad in ["NaN", "-1", "far", "inf"] {
            let result =
                Cli::try_parse_from(["hikelog", "hike", "search", "--min-length", bad]);
            assert!(result.is_err(), "--min-length {bad} was accepted");
            let result =
                Cli::try_parse_from(["hikelog", "hike", "search", "--max-length", bad]);
            assert!(result.is_err(), "--max-length {bad} was accepted");
        }

        let cli = Cli::try_parse_from(["hikelog", "hike", "search", "--max-length", "0"]).unwrap();
        match cli.command {
            Commands::Hike(HikeCommand::Search { criteria, .. }) => {
                assert_eq!(criteria.max_length, Some(0.0));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
