use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{Password, Text};
use serde_json::Value;
use skycast_core::{
    Config, DateFormatter, DisplayConfig, GeoCodeQuery, LocationSearchQuery, MessageSeverity,
    UnitSystem, WeatherApi, WeatherError, WeatherQuery, client_from_config,
    config::{DEFAULT_API_URL, ENV_API_KEY},
};
use std::fmt::Display;

use crate::output;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skycast", version, about = "Weather lookup CLI")]
pub struct Cli {
    /// Print the provider response on a single line.
    #[arg(long, global = true)]
    pub compact: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure the provider URL, API key and display settings.
    Configure,

    /// Search locations by name.
    Search {
        /// Free-text place name, e.g. "London" or "London,GB".
        query: String,

        /// Maximum number of results.
        #[arg(long)]
        limit: Option<u32>,

        /// standard, metric or imperial.
        #[arg(long)]
        units: Option<UnitSystem>,
    },

    /// Show current weather at a coordinate.
    Current {
        #[arg(long, allow_hyphen_values = true)]
        lat: String,

        #[arg(long, allow_hyphen_values = true)]
        lon: String,

        /// standard, metric or imperial.
        #[arg(long)]
        units: Option<UnitSystem>,
    },

    /// Find place names near a coordinate.
    Reverse {
        #[arg(long, allow_hyphen_values = true)]
        lat: String,

        #[arg(long, allow_hyphen_values = true)]
        lon: String,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let compact = self.compact;

        match self.command {
            Command::Configure => {
                let (current, err) = Config::load_or_default();
                if let Some(err) = err {
                    notify(
                        MessageSeverity::Warning,
                        format!("Ignoring unreadable configuration: {err:#}"),
                    );
                }
                configure(current)
            }
            Command::Search {
                query,
                limit,
                units,
            } => {
                let session = Session::open()?;
                let query = LocationSearchQuery {
                    q: query,
                    limit,
                    units,
                };
                let result = session.client.search_location(&query).await;
                session.show(result, compact)
            }
            Command::Current { lat, lon, units } => {
                let session = Session::open()?;
                let query = WeatherQuery { lat, lon, units };
                let result = session.client.get_current_weather(&query).await;
                session.show(result, compact)
            }
            Command::Reverse { lat, lon } => {
                let session = Session::open()?;
                let query = GeoCodeQuery::new(lat, lon);
                let result = session.client.reverse_geocode(&query).await;
                session.show(result, compact)
            }
        }
    }
}

/// Client and formatter resolved once per invocation.
struct Session {
    client: Box<dyn WeatherApi>,
    formatter: DateFormatter,
}

impl Session {
    fn open() -> anyhow::Result<Self> {
        let config = Config::load()?.with_process_env();
        let formatter = config.date_formatter()?;

        if !config.has_api_key() {
            notify(
                MessageSeverity::Warning,
                format!("No API key configured. Run `skycast configure` or set {ENV_API_KEY}."),
            );
        }

        let client = client_from_config(&config);
        tracing::debug!(
            base_url = client.base_url(),
            timezone = %formatter.timezone(),
            "Using provider"
        );

        Ok(Self { client, formatter })
    }

    fn show(&self, result: Result<Value, WeatherError>, compact: bool) -> anyhow::Result<()> {
        let body = result.inspect_err(hint_for)?;

        println!("{}", output::render_json(&body, compact)?);
        for line in output::timestamp_summary(&body, &self.formatter) {
            notify(MessageSeverity::Info, line);
        }

        Ok(())
    }
}

/// Write a severity-tagged notification to stderr.
pub fn notify(severity: MessageSeverity, message: impl Display) {
    eprintln!("[{severity}] {message}");
}

fn hint_for(err: &WeatherError) {
    match err.status().map(|s| s.as_u16()) {
        Some(401) => notify(
            MessageSeverity::Warning,
            "The provider rejected the API key. Run `skycast configure` to update it.",
        ),
        Some(404) => notify(MessageSeverity::Info, "No results for that query."),
        Some(429) => notify(MessageSeverity::Warning, "Rate limited by the provider."),
        _ if err.is_transport() => notify(
            MessageSeverity::Warning,
            "Could not reach the provider. Check the API URL and your connection.",
        ),
        _ => {}
    }
}

fn configure(current: Config) -> anyhow::Result<()> {
    let api_url = Text::new("API base URL:")
        .with_default(current.api_url.as_deref().unwrap_or(DEFAULT_API_URL))
        .prompt()?;

    let api_key = Password::new("API key:")
        .without_confirmation()
        .with_help_message("Leave empty to keep the current key")
        .prompt()?;

    let locale = Text::new("Locale (blank for en_US):")
        .with_default(current.display.locale.as_deref().unwrap_or(""))
        .prompt()?;

    let timezone = Text::new("Timezone (blank to detect):")
        .with_default(current.display.timezone.as_deref().unwrap_or(""))
        .prompt()?;

    let config = Config {
        api_url: Some(api_url.trim().to_string()),
        api_key: non_empty(api_key).or(current.api_key),
        display: DisplayConfig {
            locale: non_empty(locale),
            timezone: non_empty(timezone),
        },
    };

    config.date_formatter().context("Display settings were not saved")?;

    let path = config.save()?;
    notify(
        MessageSeverity::Info,
        format!("Configuration saved to {}", path.display()),
    );

    Ok(())
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
