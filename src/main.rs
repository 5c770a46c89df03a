use std::io::{BufRead, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use authflow::config::{ConfigError, normalize_base_url};
use authflow::{
    AuthConfig, Credentials, FileTokenStore, HttpAuthEndpoint, LoginFlow, LoginMessage, LoginOutcome, Navigator,
    RawToken, SessionState, StorageError, SubmitError, TokenStore,
};
use clap::{Parser, Subcommand};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("token storage failed: {0}")]
    Storage(#[from] StorageError),
    #[error("{0}")]
    Form(&'static str),
    #[error("{0}")]
    Login(LoginMessage),
    #[error("another login is already in progress")]
    InFlight,
    #[error("login attempt was cancelled")]
    Superseded,
    #[error("not logged in; run `authflow login` first")]
    NotLoggedIn,
    #[error("request failed: {0}")]
    Request(#[from] SubmitError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("could not read password: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not read password: {0}")]
    Prompt(#[from] dialoguer::Error),
}

#[derive(Parser, Debug)]
#[command(name = "authflow", about = "Sign in to the bank back office and open the matching dashboard")]
struct Cli {
    /// Auth server origin; overrides `AUTH_BASE_URL`.
    #[arg(long)]
    base_url: Option<String>,

    /// Token storage directory; overrides `AUTH_STATE_DIR`.
    #[arg(long)]
    state_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Exchange credentials for a token and print the landing page.
    Login {
        #[arg(long)]
        username: String,
        /// Read from `AUTH_PASSWORD`, or prompted on stdin when unset.
        #[arg(long, env = "AUTH_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Show whether a usable session token is stored.
    Status,
    /// Ask the server who the stored token belongs to.
    Whoami,
    /// Remove the stored token.
    Logout,
}

/// Prints the landing path in place of a browser navigation.
struct ConsoleNavigator;

impl Navigator for ConsoleNavigator {
    fn navigate(&self, path: &str) {
        println!("{path}");
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = resolve_config(cli.base_url, cli.state_dir)?;

    match cli.command {
        Command::Login { username, password } => {
            let password = match password {
                Some(password) => password,
                None => read_password()?,
            };
            run_login(&config, &username, &password).await
        }
        Command::Status => run_status(&config),
        Command::Whoami => run_whoami(&config).await,
        Command::Logout => run_logout(&config),
    }
}

fn resolve_config(base_url: Option<String>, state_dir: Option<PathBuf>) -> Result<AuthConfig, CliError> {
    let mut config = AuthConfig::from_env()?;
    if let Some(base_url) = base_url {
        config.base_url = normalize_base_url(&base_url)?;
    }
    if let Some(state_dir) = state_dir {
        config.state_dir = Some(state_dir);
    }
    Ok(config)
}

async fn run_login(config: &AuthConfig, username: &str, password: &str) -> Result<(), CliError> {
    let credentials = Credentials::from_form(username, password).map_err(CliError::Form)?;
    let endpoint = HttpAuthEndpoint::new(config)?;
    let store = FileTokenStore::from_config(config)?;
    let flow = LoginFlow::new(
        endpoint,
        store,
        ConsoleNavigator,
        Duration::from_secs(config.timeouts.request_secs),
    );

    match flow.submit(credentials).await {
        LoginOutcome::Routed(_) => Ok(()),
        LoginOutcome::Failed(message) => Err(CliError::Login(message)),
        LoginOutcome::InFlight => Err(CliError::InFlight),
        LoginOutcome::Superseded => Err(CliError::Superseded),
    }
}

fn read_password() -> Result<String, CliError> {
    let stdin = std::io::stdin();
    if stdin.is_terminal() {
        return Ok(dialoguer::Password::new().with_prompt("Password").interact()?);
    }
    Ok(first_line(stdin.lock())?)
}

/// First line of `reader` without its line ending.
fn first_line(mut reader: impl BufRead) -> std::io::Result<String> {
    let mut line = String::new();
    reader.read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_owned())
}

fn run_status(config: &AuthConfig) -> Result<(), CliError> {
    let store = FileTokenStore::from_config(config)?;
    match SessionState::restore(&store)? {
        SessionState::LoggedIn { claims, destination } => {
            let subject = claims.subject.as_deref().unwrap_or("unknown");
            println!("logged in as {subject} ({:?}); landing page {destination}", claims.role());
        }
        SessionState::LoggedOut(reason) => println!("logged out ({reason:?})"),
    }
    Ok(())
}

async fn run_whoami(config: &AuthConfig) -> Result<(), CliError> {
    let store = FileTokenStore::from_config(config)?;
    let token = store.load()?.ok_or(CliError::NotLoggedIn)?;
    let endpoint = HttpAuthEndpoint::new(config)?;
    let user = endpoint.current_user(&RawToken::new(token)).await?;
    print_json(&serde_json::to_value(user)?)
}

fn run_logout(config: &AuthConfig) -> Result<(), CliError> {
    let store = FileTokenStore::from_config(config)?;
    authflow::logout(&store)?;
    println!("logged out");
    Ok(())
}

fn print_json(value: &serde_json::Value) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
