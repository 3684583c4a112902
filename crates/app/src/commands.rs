//! Command execution

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result, bail};
use clipper_application::ApiError;
use clipper_domain::{HttpMethod, RequestConfig};
use clipper_infrastructure::{ClientConfig, ClipperServices};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::cli::Command;

/// Runs one command against the configured services.
pub async fn run(command: Command, services: &ClipperServices, config: &ClientConfig) -> Result<()> {
    match command {
        Command::Login { username, password } => login(services, &username, password).await,
        Command::Logout => {
            services.session.logout().await;
            Ok(())
        }
        Command::Whoami => {
            let user = services
                .session
                .restore()
                .await
                .context("could not load the signed-in account")?;
            match user {
                Some(user) => print_json(&user),
                None => bail!("not signed in"),
            }
        }
        Command::Status => status(services, config).await,
        Command::Request {
            method,
            endpoint,
            data,
            no_auth,
        } => raw_request(services, method, &endpoint, data.as_deref(), no_auth).await,
        Command::Customers => {
            restore_tokens(services).await;
            print_json(&services.resources.customers().list().await?)
        }
        Command::Staff => {
            restore_tokens(services).await;
            print_json(&services.resources.staff().list().await?)
        }
        Command::Catalog => {
            restore_tokens(services).await;
            print_json(&services.resources.catalog().list().await?)
        }
        Command::Loyalty => {
            restore_tokens(services).await;
            print_json(&services.resources.loyalty().settings().await?)
        }
        Command::Dashboard { period } => {
            restore_tokens(services).await;
            print_json(&services.resources.analytics().dashboard(period).await?)
        }
    }
}

async fn login(services: &ClipperServices, username: &str, password: Option<String>) -> Result<()> {
    let password = match password {
        Some(password) => password,
        None => read_password()?,
    };

    match services.session.login(username, &password).await {
        Ok(user) => {
            eprintln!("Signed in as {} ({})", user.name, user.role.as_str());
            Ok(())
        }
        Err(ApiError::Unauthorized { message }) => bail!("sign in refused: {message}"),
        Err(e) => Err(e).context("sign in failed"),
    }
}

fn read_password() -> Result<String> {
    eprint!("Password: ");
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        bail!("no password given");
    }
    Ok(password)
}

#[derive(Serialize)]
struct Status<'a> {
    api_url: &'a str,
    data_dir: String,
    timeout_ms: u64,
    signed_in: bool,
}

async fn status(services: &ClipperServices, config: &ClientConfig) -> Result<()> {
    let signed_in = services.client.tokens().restore().await;
    print_json(&Status {
        api_url: services.client.base_url(),
        data_dir: config.data_dir.display().to_string(),
        timeout_ms: config.timeout_ms,
        signed_in,
    })
}

async fn raw_request(
    services: &ClipperServices,
    method: HttpMethod,
    endpoint: &str,
    data: Option<&str>,
    no_auth: bool,
) -> Result<()> {
    let mut config = RequestConfig::new(method);
    if let Some(data) = data {
        let body: Value = serde_json::from_str(data).context("--data is not valid JSON")?;
        config = config.with_body(body);
    }
    if no_auth {
        config = config.skip_auth();
    } else {
        restore_tokens(services).await;
    }

    let endpoint = normalize_endpoint(endpoint);
    debug!(%method, endpoint, "raw request");
    let data = services
        .client
        .request::<Value>(&endpoint, config)
        .await?
        .into_data()?;
    print_json(&data)
}

async fn restore_tokens(services: &ClipperServices) {
    if !services.client.tokens().restore().await {
        debug!("no stored session");
    }
}

fn normalize_endpoint(endpoint: &str) -> String {
    if endpoint.starts_with('/') {
        endpoint.to_string()
    } else {
        format!("/{endpoint}")
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value)?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{rendered}")?;
    Ok(())
}
