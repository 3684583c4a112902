//! Command-line arguments

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clipper_domain::HttpMethod;
use clipper_domain::shop::Period;

/// Clipper - terminal client for the barbershop API
#[derive(Parser, Debug)]
#[command(name = "clipper")]
#[command(author = "Clipper Team")]
#[command(version)]
#[command(about = "Terminal client for the Clipper barbershop API", long_about = None)]
pub struct Cli {
    /// Config file (defaults to ./clipper.toml when present)
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// API base URL, overriding the configuration
    #[arg(short = 'u', long = "api-url", global = true)]
    pub api_url: Option<String>,

    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in and remember the session
    Login {
        /// Account name
        username: String,

        /// Password (read from stdin when omitted)
        #[arg(long = "password", env = "CLIPPER_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Sign out and forget the session
    Logout,

    /// Show the signed-in account
    Whoami,

    /// Show configuration and session state
    Status,

    /// Send a raw request and print the envelope payload
    Request {
        /// HTTP method (GET, POST, PUT, PATCH, DELETE)
        #[arg(value_parser = parse_method)]
        method: HttpMethod,

        /// Endpoint path, e.g. /customers
        endpoint: String,

        /// JSON body
        #[arg(short = 'd', long = "data")]
        data: Option<String>,

        /// Send without credentials
        #[arg(long = "no-auth")]
        no_auth: bool,
    },

    /// List customers
    Customers,

    /// List staff accounts
    Staff,

    /// List catalog services and products
    Catalog,

    /// Show loyalty program settings
    Loyalty,

    /// Show dashboard figures
    Dashboard {
        /// Reporting window: day, week, month or year
        #[arg(short = 'p', long = "period", default_value = "month", value_parser = parse_period)]
        period: Period,
    },
}

fn parse_method(value: &str) -> Result<HttpMethod, String> {
    value.parse().map_err(|e: clipper_domain::DomainError| e.to_string())
}

fn parse_period(value: &str) -> Result<Period, String> {
    match value.to_lowercase().as_str() {
        "day" => Ok(Period::Day),
        "week" => Ok(Period::Week),
        "month" => Ok(Period::Month),
        "year" => Ok(Period::Year),
        other => Err(format!("unknown period '{other}'")),
    }
}
