use anyhow::{Context, Result};
use clap::Parser;
use std::env;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub storage_dir: String,
    pub database_url: String,
    /// Base URL of the remote credential authority (e.g. `https://auth.example.com`).
    pub auth_url: String,
    /// App identifier sent along with every credential check.
    pub auth_app: String,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "Self-hosted upload/retrieval CDN")]
pub struct Args {
    /// Host to bind to (overrides CDN_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides CDN_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Directory where blobs are stored (overrides CDN_STORAGE_DIR)
    #[arg(long)]
    pub storage_dir: Option<String>,

    /// Database URL for the metadata index (overrides CDN_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Credential authority base URL (overrides CDN_AUTH_URL)
    #[arg(long)]
    pub auth_url: Option<String>,

    /// App identifier for credential checks (overrides CDN_AUTH_APP)
    #[arg(long)]
    pub auth_app: Option<String>,

    /// Run migrations and exit
    #[arg(long)]
    pub migrate: bool,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and migrate flag.
    ///
    /// Fails fast when the credential authority URL is configured nowhere —
    /// the service cannot gate uploads without it.
    pub fn from_env_and_args() -> Result<(Self, bool)> {
        // Parse CLI once
        let args = Args::parse();

        // --- Environment fallback ---
        let env_host = env::var("CDN_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = match env::var("CDN_PORT") {
            Ok(value) => value
                .parse::<u16>()
                .with_context(|| format!("parsing CDN_PORT value `{}`", value))?,
            Err(env::VarError::NotPresent) => 3000,
            Err(err) => return Err(err).context("reading CDN_PORT"),
        };
        let env_storage = env::var("CDN_STORAGE_DIR").unwrap_or_else(|_| "./data/objects".into());
        let env_db =
            env::var("CDN_DATABASE_URL").unwrap_or_else(|_| "sqlite://./data/meta/cdn.db".into());
        let env_auth_url = env::var("CDN_AUTH_URL").ok();
        let env_auth_app = env::var("CDN_AUTH_APP").unwrap_or_else(|_| "image-cdn".into());

        // --- Merge ---
        let cfg = Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            storage_dir: args.storage_dir.unwrap_or(env_storage),
            database_url: args.database_url.unwrap_or(env_db),
            auth_url: args
                .auth_url
                .or(env_auth_url)
                .context("CDN_AUTH_URL (or --auth-url) is required")?,
            auth_app: args.auth_app.unwrap_or(env_auth_app),
        };

        Ok((cfg, args.migrate))
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
