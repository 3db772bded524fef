use anyhow::{Context, Result};
use clap::Parser;
use std::{env, fmt};

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub storage_dir: String,
    pub database_url: String,
    pub secret_key: String,
    pub require_image_on_update: bool,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "Image-backed user/product CRUD API")]
pub struct Args {
    /// Host to bind to (overrides IMAGE_SERVER_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides IMAGE_SERVER_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Directory where image blobs are stored (overrides IMAGE_SERVER_STORAGE_DIR)
    #[arg(long)]
    pub storage_dir: Option<String>,

    /// Database URL (overrides IMAGE_SERVER_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Token signing secret (overrides IMAGE_SERVER_SECRET_KEY)
    #[arg(long)]
    pub secret_key: Option<String>,

    /// Reject updates that carry no image file, matching the legacy behavior
    #[arg(long)]
    pub require_image_on_update: bool,

    /// Run migrations and exit
    #[arg(long)]
    pub migrate: bool,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and migrate flag.
    pub fn from_env_and_args() -> Result<(Self, bool)> {
        // Parse CLI once
        let args = Args::parse();

        // --- Environment fallback ---
        let env_host = env::var("IMAGE_SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = match env::var("IMAGE_SERVER_PORT") {
            Ok(value) => value
                .parse::<u16>()
                .with_context(|| format!("parsing IMAGE_SERVER_PORT value `{}`", value))?,
            Err(env::VarError::NotPresent) => 3000,
            Err(err) => return Err(err).context("reading IMAGE_SERVER_PORT"),
        };
        let env_storage =
            env::var("IMAGE_SERVER_STORAGE_DIR").unwrap_or_else(|_| "./data/images".into());
        let env_db = env::var("IMAGE_SERVER_DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://./data/meta/image_server.db".into());
        let env_secret = match env::var("IMAGE_SERVER_SECRET_KEY") {
            Ok(value) => Some(value),
            Err(env::VarError::NotPresent) => None,
            Err(err) => return Err(err).context("reading IMAGE_SERVER_SECRET_KEY"),
        };
        let env_require_image = match env::var("IMAGE_SERVER_REQUIRE_IMAGE_ON_UPDATE") {
            Ok(value) => value.parse::<bool>().with_context(|| {
                format!(
                    "parsing IMAGE_SERVER_REQUIRE_IMAGE_ON_UPDATE value `{}`",
                    value
                )
            })?,
            Err(env::VarError::NotPresent) => false,
            Err(err) => return Err(err).context("reading IMAGE_SERVER_REQUIRE_IMAGE_ON_UPDATE"),
        };

        // --- Merge ---
        let cfg = Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            storage_dir: args.storage_dir.unwrap_or(env_storage),
            database_url: args.database_url.unwrap_or(env_db),
            secret_key: args
                .secret_key
                .or(env_secret)
                .context("IMAGE_SERVER_SECRET_KEY is not set")?,
            require_image_on_update: args.require_image_on_update || env_require_image,
        };

        Ok((cfg, args.migrate))
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("storage_dir", &self.storage_dir)
            .field("database_url", &self.database_url)
            .field("secret_key", &"<redacted>")
            .field("require_image_on_update", &self.require_image_on_update)
            .finish()
    }
}
