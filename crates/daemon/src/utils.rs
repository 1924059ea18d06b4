use anyhow::{anyhow, Error};
use clap::Parser;
use frontline_core::{
    find_config_file, load_config, ConfigSource, DEFAULT_MAX_DISTANCE_KM, DEFAULT_MAX_WORKERS,
    DEFAULT_REQUEST_TIMEOUT,
};
use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use slog::{debug, o, Drain, Level, Logger};
use std::{env, time::Duration};

#[derive(Parser, Clone, Debug, serde::Deserialize, Default)]
#[command(
    author,
    version,
    about = "Frontline - Builds METSAR reports from model forecasts and ground stations"
)]
pub struct Cli {
    /// Path to config file (TOML format)
    /// Searched in order: this flag, $FRONTLINE_CONFIG, ./frontline.toml,
    /// $XDG_CONFIG_HOME/frontline/frontline.toml, /etc/frontline/frontline.toml
    #[arg(long)]
    #[serde(skip)]
    pub config: Option<String>,

    /// Log level: trace, debug, info, warn, error
    #[arg(short, long, env = "FRONTLINE_LEVEL")]
    pub level: Option<String>,

    /// Only process this aerodrome (ICAO code)
    #[arg(short, long)]
    #[serde(skip)]
    pub code: Option<String>,

    /// First hour to process, YYYY-MM-DDTHH:MM (UTC)
    #[arg(short = 'i', long)]
    #[serde(skip)]
    pub dini: Option<String>,

    /// End of the range (exclusive), YYYY-MM-DDTHH:MM (UTC)
    #[arg(short = 'f', long)]
    #[serde(skip)]
    pub dfnl: Option<String>,

    /// Directory holding the model reports (saida_carrapato_<ICAO>_<YYYYMMDDHH>.txt)
    #[arg(short, long, env = "FRONTLINE_TICKS_DIR")]
    pub ticks_dir: Option<String>,

    /// Directory the METSAR files are written to
    #[arg(short, long, env = "FRONTLINE_OUT_DIR")]
    pub out_dir: Option<String>,

    /// Local directory for the hourly parquet files
    #[arg(short, long, env = "FRONTLINE_DATA_DIR")]
    pub data_dir: Option<String>,

    /// Maximum distance (km) between an aerodrome and its ground station
    #[arg(short, long, env = "FRONTLINE_MAX_DISTANCE_KM")]
    pub max_distance_km: Option<f64>,

    /// Aerodromes processed concurrently within one hour
    #[arg(short = 'w', long, env = "FRONTLINE_MAX_WORKERS")]
    pub max_workers: Option<usize>,

    /// Timeout in seconds for each provider request
    #[arg(long, env = "FRONTLINE_REQUEST_TIMEOUT")]
    pub request_timeout: Option<u64>,

    /// REDEMET API key, observed METARs are skipped without it
    #[arg(long, env = "FRONTLINE_REDEMET_KEY")]
    pub redemet_key: Option<String>,

    /// HTTP User-Agent header for provider requests
    #[arg(short, long, env = "FRONTLINE_USER_AGENT")]
    pub user_agent: Option<String>,
}

impl Cli {
    pub fn ticks_dir(&self) -> String {
        self.ticks_dir
            .clone()
            .unwrap_or_else(|| "./carrapatos".to_string())
    }

    pub fn out_dir(&self) -> String {
        self.out_dir
            .clone()
            .unwrap_or_else(|| "./frontlines".to_string())
    }

    pub fn data_dir(&self) -> String {
        self.data_dir
            .clone()
            .unwrap_or_else(|| "./data".to_string())
    }

    pub fn max_distance_km(&self) -> f64 {
        self.max_distance_km.unwrap_or(DEFAULT_MAX_DISTANCE_KM)
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers.unwrap_or(DEFAULT_MAX_WORKERS).max(1)
    }

    pub fn request_timeout(&self) -> u64 {
        self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn redemet_key(&self) -> Option<String> {
        self.redemet_key
            .clone()
            .filter(|key| !key.trim().is_empty())
    }

    pub fn user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(|| format!("frontline/{}", env!("CARGO_PKG_VERSION")))
    }

    /// Aerodrome filter, upper-cased
    pub fn code(&self) -> Option<String> {
        self.code
            .as_ref()
            .map(|code| code.trim().to_uppercase())
            .filter(|code| !code.is_empty())
    }
}

/// Load configuration from CLI args, config file, and environment
pub fn get_config_info() -> Cli {
    merge_config(Cli::parse())
}

fn merge_config(cli_args: Cli) -> Cli {
    let source = if let Some(ref path) = cli_args.config {
        ConfigSource::Explicit(path.into())
    } else {
        find_config_file("FRONTLINE_CONFIG", "frontline.toml")
    };

    let file_config: Cli = load_config(&source).unwrap_or_default();

    // CLI args override file config (env vars are handled by clap)
    Cli {
        config: cli_args.config,
        level: cli_args.level.or(file_config.level),
        code: cli_args.code,
        dini: cli_args.dini,
        dfnl: cli_args.dfnl,
        ticks_dir: cli_args.ticks_dir.or(file_config.ticks_dir),
        out_dir: cli_args.out_dir.or(file_config.out_dir),
        data_dir: cli_args.data_dir.or(file_config.data_dir),
        max_distance_km: cli_args.max_distance_km.or(file_config.max_distance_km),
        max_workers: cli_args.max_workers.or(file_config.max_workers),
        request_timeout: cli_args.request_timeout.or(file_config.request_timeout),
        redemet_key: cli_args.redemet_key.or(file_config.redemet_key),
        user_agent: cli_args.user_agent.or(file_config.user_agent),
    }
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::Trace,
        "debug" => Level::Debug,
        "info" => Level::Info,
        "warn" => Level::Warning,
        "error" => Level::Error,
        _ => Level::Info,
    }
}

pub fn setup_logger(cli: &Cli) -> Logger {
    let log_level = match cli.level.as_ref() {
        Some(level) => parse_level(level),
        None => parse_level(&env::var("RUST_LOG").unwrap_or_default()),
    };

    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::CompactFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();
    let drain = drain.filter_level(log_level).fuse();
    slog::Logger::root(drain, o!("version" => env!("CARGO_PKG_VERSION")))
}

/// Provider values may be a JSON string, a number or null.
pub fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let number = match value {
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(number.filter(|n| n.is_finite()))
}

pub struct HttpFetcher {
    logger: Logger,
    timeout: Duration,
    client: ClientWithMiddleware,
}

impl HttpFetcher {
    pub fn new(logger: Logger, user_agent: String, timeout_secs: u64) -> Result<Self, Error> {
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(3);
        let client = ClientBuilder::new(Client::builder().user_agent(&user_agent).build()?)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            logger,
            timeout: Duration::from_secs(timeout_secs),
            client,
        })
    }

    pub async fn fetch_text(&self, url: &str) -> Result<String, Error> {
        debug!(self.logger, "requesting: {}", url);
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| anyhow!("error sending request: {}", e))?;
        if !response.status().is_success() {
            return Err(anyhow!(
                "error response from request: {}",
                response.status()
            ));
        }

        match response.text().await {
            Ok(body) => Ok(body),
            Err(e) => Err(anyhow!("error parsing body of request: {}", e)),
        }
    }
}
