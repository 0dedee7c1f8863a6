use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use esign_token_agent::config::credentials::{ServiceCredentials, SANDBOX_AUTH_HOST};
use esign_token_agent::config::settings::{
    Settings, CONSENT_REDIRECT_URI_DEFAULT, EXCHANGE_TIMEOUT_SECONDS_DEFAULT,
    SAFETY_MARGIN_SECONDS_DEFAULT, TOKEN_SCOPE_DEFAULT,
};
use esign_token_agent::config::settings::LogFormat;
use esign_token_agent::server;
use esign_token_agent::utils::logging;
use esign_token_agent::utils::logging::LogLevel;
use esign_token_agent::{AuthError, TokenProvider};
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(long, env = "ESIGN_INTEGRATION_KEY")]
    integration_key: Option<String>,
    #[arg(long, env = "ESIGN_USER_ID")]
    user_id: Option<String>,
    #[arg(long, env = "ESIGN_PRIVATE_KEY", hide_env_values = true)]
    private_key: Option<String>,
    /// Read the private key PEM from a file instead of the environment.
    #[arg(long, env = "ESIGN_PRIVATE_KEY_FILE")]
    private_key_file: Option<String>,
    #[arg(long, env = "ESIGN_ACCOUNT_ID")]
    account_id: Option<String>,
    #[arg(long, env = "ESIGN_AUTH_HOST", default_value = SANDBOX_AUTH_HOST)]
    auth_host: String,
    #[arg(long, env = "ESIGN_SCOPE", default_value = TOKEN_SCOPE_DEFAULT)]
    scope: String,
    #[arg(long, env = "ESIGN_CONSENT_REDIRECT_URI", default_value = CONSENT_REDIRECT_URI_DEFAULT)]
    consent_redirect_uri: String,
    #[arg(long, env = "ESIGN_SAFETY_MARGIN_SECONDS", default_value_t = SAFETY_MARGIN_SECONDS_DEFAULT)]
    safety_margin_seconds: u64,
    #[arg(long, env = "ESIGN_EXCHANGE_TIMEOUT_SECONDS", default_value_t = EXCHANGE_TIMEOUT_SECONDS_DEFAULT)]
    exchange_timeout_seconds: u64,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value = "compact")]
    log_format: LogFormat,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Exchange a signed assertion for a bearer token and print it to stdout.
    FetchToken,
    /// Print the one-time operator consent URL.
    ConsentUrl,
    /// Serve the consent-callback landing page.
    ServeCallback {
        #[arg(long, default_value = "127.0.0.1:3000")]
        bind: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Read args / env, init logging
    // -------------------------------

    let args = Args::parse();
    logging::run(args.log_level, args.log_format);

    // -------------------------------
    // 2. Assemble credentials
    // -------------------------------

    let private_key = match (&args.private_key, &args.private_key_file) {
        (Some(key), _) => key.clone(),
        (None, Some(path)) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read private key file {}", path))?,
        (None, None) => String::new(),
    };

    let credentials = ServiceCredentials {
        integration_key: args.integration_key.unwrap_or_default(),
        impersonated_user_id: args.user_id.unwrap_or_default(),
        private_key,
        auth_server_host: args.auth_host,
        account_id: args.account_id,
    };

    let settings = Settings {
        safety_margin_seconds: args.safety_margin_seconds,
        exchange_timeout: Duration::from_secs(args.exchange_timeout_seconds),
        scope: args.scope,
        consent_redirect_uri: args.consent_redirect_uri,
    };

    // -------------------------------
    // 3. Build the provider, run the command
    // -------------------------------

    let provider = Arc::new(TokenProvider::new(credentials, settings)?);

    match args.command {
        Command::FetchToken => match provider.get_access_token().await {
            Ok(token) => {
                println!("{}", token);
                Ok(())
            }
            Err(AuthError::ConsentRequired { consent_url, .. }) => {
                info!("one-time consent has not been granted yet");
                eprintln!(
                    "Consent required. Open the following URL in a browser, approve access, then retry:\n{}",
                    consent_url
                );
                std::process::exit(1);
            }
            Err(err) => Err(err.into()),
        },
        Command::ConsentUrl => {
            println!("{}", provider.consent_url()?);
            Ok(())
        }
        Command::ServeCallback { bind } => server::server::start(&bind, provider).await,
    }
}
