use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use thiserror::Error;
use tracing::info;

use crate::config::{self, ConfigError};
use crate::core_service::{CoreService, ServiceError};
use crate::model::{HostEntry, Suggestion};

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("service error: {0}")]
    Service(#[from] ServiceError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Parser, PartialEq, Eq)]
#[command(name = "sshrunner-core", version)]
#[command(about = "Match launcher queries against ~/.ssh/config hosts and open ssh sessions")]
pub struct RuntimeOptions {
    /// Path to the sshrunner config file (default: <config-dir>/sshrunner/config.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: RuntimeCommand,
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum RuntimeCommand {
    /// List hosts declared in ~/.ssh/config, in file order
    Hosts,
    /// Rank hosts against a query; start it with "ssh " to allow any address
    Match {
        #[arg(required = true, num_args = 1.., trailing_var_arg = true, allow_hyphen_values = true)]
        query: Vec<String>,
    },
    /// Open the configured terminal running `ssh <HOST>`
    Run { host: String },
    /// Answer JSON requests read one per line from stdin
    Serve,
}

pub fn parse_cli_args<I, T>(args: I) -> Result<RuntimeOptions, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    RuntimeOptions::try_parse_from(args)
}

pub fn run_with_options(options: RuntimeOptions) -> Result<(), RuntimeError> {
    let config = config::load(options.config.as_deref())?;
    if let Err(error) = crate::logging::init(&config.log_filter) {
        eprintln!("[sshrunner-core] logging disabled: {error}");
    }
    info!(
        config_path = %config.config_path.display(),
        command = ?options.command,
        "startup"
    );

    let service = CoreService::new(config)?;
    let stdout = std::io::stdout();

    match options.command {
        RuntimeCommand::Hosts => write_hosts(stdout.lock(), &service.hosts())?,
        RuntimeCommand::Match { query } => {
            let query = query.join(" ");
            write_suggestions(stdout.lock(), &service.match_query(&query))?;
        }
        RuntimeCommand::Run { host } => service.run(&host)?,
        RuntimeCommand::Serve => {
            let handled =
                crate::transport::serve_lines(&service, std::io::stdin().lock(), stdout.lock())?;
            info!(handled, "serve finished");
        }
    }
    Ok(())
}

fn write_hosts<W: Write>(mut out: W, hosts: &[HostEntry]) -> std::io::Result<()> {
    for host in hosts {
        writeln!(out, "{}", host.name())?;
    }
    out.flush()
}

fn write_suggestions<W: Write>(mut out: W, suggestions: &[Suggestion]) -> std::io::Result<()> {
    for suggestion in suggestions {
        writeln!(
            out,
            "{}\t{}\t{}",
            suggestion.tier.as_str(),
            suggestion.host,
            suggestion.text()
        )?;
    }
    out.flush()
}
