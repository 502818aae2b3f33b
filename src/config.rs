use std::path::PathBuf;

use clap::Parser;

pub const DEFAULT_JOB_CAPACITY: usize = 1000;
pub const DEFAULT_MAX_ARGS: usize = 512;
pub const DEFAULT_MAX_LINE: usize = 2048;

#[derive(Parser, Debug)]
#[command(name = "smallsh", version, about = "A small job-control shell")]
pub struct Cli {
    /// Number of background pids tracked for reaping and `exit`
    #[arg(long, default_value_t = DEFAULT_JOB_CAPACITY)]
    pub job_capacity: usize,

    /// Words kept per command line; the rest are dropped
    #[arg(long, default_value_t = DEFAULT_MAX_ARGS)]
    pub max_args: usize,

    /// Bytes kept per command line
    #[arg(long, default_value_t = DEFAULT_MAX_LINE)]
    pub max_line: usize,

    /// Write diagnostic logs to this file (filter via SMALLSH_LOG)
    #[arg(long, env = "SMALLSH_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub job_capacity: usize,
    pub max_args: usize,
    pub max_line: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            job_capacity: DEFAULT_JOB_CAPACITY,
            max_args: DEFAULT_MAX_ARGS,
            max_line: DEFAULT_MAX_LINE,
        }
    }
}

impl From<&Cli> for Config {
    fn from(cli: &Cli) -> Self {
        Self {
            job_capacity: cli.job_capacity,
            max_args: cli.max_args.max(1),
            max_line: cli.max_line.max(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_cli_defaults() {
        let cli = Cli::parse_from(["smallsh"]);
        assert_eq!(Config::from(&cli), Config::default());
        assert!(cli.log_file.is_none());
    }

    #[test]
    fn zero_limits_are_clamped() {
        let cli = Cli::parse_from(["smallsh", "--max-args", "0", "--job-capacity", "0"]);
        let config = Config::from(&cli);
        assert_eq!(config.max_args, 1);
        assert_eq!(config.job_capacity, 0);
    }
}
