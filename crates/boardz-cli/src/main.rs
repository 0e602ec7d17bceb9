//! BoardZ command-line login.
//!
//! Logs in against the BoardZ token endpoint and keeps the session on disk
//! so later commands can reuse the token.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use boardz_core::{ApiClient, Config, LoginService, Router, TokenDataStore};
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const USAGE: &str = "Usage: boardz <login [username] | logout | status>";

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

/// Remembers the last requested route; the terminal has only one view.
#[derive(Default)]
struct CliRouter {
    current: Mutex<Vec<String>>,
}

impl Router for CliRouter {
    fn navigate(&self, route: &[&str]) {
        debug!(?route, "Navigating");
        if let Ok(mut current) = self.current.lock() {
            *current = route.iter().map(|s| s.to_string()).collect();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut config = Config::load()?;
    let service = build_service(&config)?;

    match args.first().map(String::as_str) {
        Some("login") => {
            let username = match args.get(1) {
                Some(username) => username.clone(),
                None => prompt_username(config.last_username.as_deref())?,
            };
            login(&service, &mut config, username).await
        }
        Some("logout") => {
            service.unauthenticate();
            println!("Logged out");
            Ok(())
        }
        Some("status") => {
            print_status(&service);
            Ok(())
        }
        _ => {
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    }
}

fn build_service(config: &Config) -> Result<LoginService> {
    let mut store = TokenDataStore::persistent(config.cache_dir()?);
    if let Err(e) = store.load() {
        debug!(error = %e, "Ignoring unreadable session file");
    }

    let client = ApiClient::new(config).context("Failed to build HTTP client")?;
    Ok(LoginService::new(
        config,
        Arc::new(client),
        Arc::new(CliRouter::default()),
        store,
    ))
}

async fn login(service: &LoginService, config: &mut Config, username: String) -> Result<()> {
    let password = rpassword::prompt_password("Password: ")?;

    match service.authenticate(&username, &password).await {
        Ok(_) => {
            config.last_username = Some(username);
            config.save().context("Failed to save config")?;

            let session = service.session();
            info!(username = %session.username, "Login successful");
            println!(
                "Logged in as {} (session expires in {} minutes)",
                session.username,
                session.minutes_until_expiry()
            );
            Ok(())
        }
        Err(e) => Err(e).context("Login failed"),
    }
}

fn print_status(service: &LoginService) {
    if service.is_logged_in() {
        let session = service.session();
        println!(
            "Logged in as {} ({} minutes remaining)",
            session.username,
            session.minutes_until_expiry()
        );
    } else {
        println!("Not logged in");
    }
}

fn prompt_username(last: Option<&str>) -> Result<String> {
    match last {
        Some(last) => print!("Username [{}]: ", last),
        None => print!("Username: "),
    }
    io::stdout().flush()?;

    let mut username = String::new();
    io::stdin().read_line(&mut username)?;
    let username = username.trim();

    match (username.is_empty(), last) {
        (true, Some(last)) => Ok(last.to_string()),
        (true, None) => Err(anyhow::anyhow!("Username required")),
        (false, _) => Ok(username.to_string()),
    }
}
