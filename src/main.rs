//! sqlrun - run SQL statements against a database and print the results.

mod cli;

use cli::{Cli, OutputFormat};
use sql_runner::config::Config;
use sql_runner::error::Result;
use sql_runner::logging::{self, DEFAULT_FILTER, VERBOSE_FILTER};
use sql_runner::runner::{discard, render_table, Connector, QueryOutput};
use tracing::{error, info};

fn main() {
    let cli = Cli::parse_args();

    logging::init_stderr_logging(if cli.verbose { VERBOSE_FILTER } else { DEFAULT_FILTER });

    if let Err(e) = run(&cli) {
        error!("{}: {}", e.category(), e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let format = cli.parse_output_format()?;

    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let config = Config::load_from_file(&config_path)?;
    let params = cli.resolve_params(&config)?;

    let mut connector = Connector::open(&params)?;

    for query in &cli.queries {
        if cli.quiet {
            connector.execute(query, discard)?;
            continue;
        }

        match format {
            OutputFormat::Text => connector.execute(query, render_table)?,
            OutputFormat::Json => print_json(&connector.fetch(query)?)?,
        }
    }

    connector.close()
}

fn print_json(output: &QueryOutput) -> Result<()> {
    let json = match output {
        QueryOutput::Rows(result) => serde_json::to_string(result),
        QueryOutput::NoResult => serde_json::to_string(&serde_json::Value::Null),
    }
    .map_err(std::io::Error::from)?;
    println!("{json}");
    Ok(())
}
