//! Command-line argument parsing for sqlrun.
//!
//! Uses clap to parse CLI arguments.

use clap::Parser;
use sql_runner::config::{Config, ConnectionConfig, ConnectionParams};
use sql_runner::error::{Result, RunnerError};
use std::path::PathBuf;

/// How query results are written to stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Tab-separated table.
    #[default]
    Text,
    /// One JSON document per statement.
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid output format: {s}. Expected: text or json")),
        }
    }
}

/// Run SQL statements against a database and print the results.
#[derive(Parser, Debug)]
#[command(name = "sqlrun")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// SQL statements to run, in order, on one connection
    #[arg(value_name = "QUERY", required = true)]
    pub queries: Vec<String>,

    /// Connection address (e.g., mysql://localhost:3306/musicadb2 or sqlite::memory:)
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,

    /// Database user
    #[arg(short = 'U', long, value_name = "USER")]
    pub user: Option<String>,

    /// Database password
    #[arg(short = 'P', long, value_name = "PASSWORD")]
    pub password: Option<String>,

    /// Use named connection from config
    #[arg(short = 'c', long, value_name = "NAME")]
    pub connection: Option<String>,

    /// Config file path
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Output format: text or json
    #[arg(long, value_name = "FORMAT", default_value = "text")]
    pub format: String,

    /// Run the statements without printing their results
    #[arg(short, long)]
    pub quiet: bool,

    /// Log each execution step to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Converts CLI arguments to a ConnectionConfig, without file or env defaults.
    pub fn to_connection_config(&self) -> ConnectionConfig {
        ConnectionConfig {
            url: self.url.clone(),
            user: self.user.clone(),
            password: self.password.clone(),
        }
    }

    /// Returns the config file path to use.
    ///
    /// Uses the --config argument if provided, otherwise the default path.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::default_path)
    }

    /// Returns the named connection to use, if specified.
    pub fn connection_name(&self) -> Option<&str> {
        self.connection.as_deref()
    }

    /// Parses the output format from the --format argument.
    pub fn parse_output_format(&self) -> Result<OutputFormat> {
        self.format.parse().map_err(RunnerError::config)
    }

    /// Resolves the connection parameters.
    ///
    /// Precedence: CLI arguments, then the named (or default) connection from
    /// the config file, then environment variables, then built-in defaults.
    pub fn resolve_params(&self, config: &Config) -> Result<ConnectionParams> {
        self.resolve_params_with(config, |key| std::env::var(key).ok())
    }

    fn resolve_params_with(
        &self,
        config: &Config,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<ConnectionParams> {
        let mut connection = match self.connection_name() {
            Some(name) => config.get_connection(Some(name)).cloned().ok_or_else(|| {
                RunnerError::config(format!("Connection '{name}' not found in config file"))
            })?,
            None => config.get_connection(None).cloned().unwrap_or_default(),
        };

        connection.merge(&self.to_connection_config());
        connection.apply_defaults_from(env);

        Ok(connection.into_params())
    }
}
