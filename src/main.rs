use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use config::Config;
use m3ucatalog::{
    catalog::Conversion, channels::Converter, convert_and_record, create_app, load_playlists,
    metrics::MonitoringConfig, read_playlist,
};
use serde::de::Deserializer;
use serde::Deserialize;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(long, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert playlist files into a channels.json catalog
    Convert {
        /// Playlist files, concatenated in the order given
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output file, or `-` for stdout
        #[arg(long, short, default_value = "channels.json")]
        output: String,

        /// Language stamped on every channel (overrides config)
        #[arg(long)]
        language: Option<String>,
    },
    /// Serve the catalog built from the configured playlists over HTTP
    Serve {
        /// Listen port (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },
}

#[derive(Debug, Default, Deserialize)]
struct Settings {
    #[serde(default)]
    server: ServerConfig,
    #[serde(default)]
    catalog: CatalogConfig,
    #[serde(default)]
    monitoring: MonitoringConfig,
}

#[derive(Debug, Deserialize)]
struct ServerConfig {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

#[derive(Debug, Deserialize)]
struct CatalogConfig {
    #[serde(
        default,
        alias = "playlist",
        deserialize_with = "deserialize_one_or_many"
    )]
    playlists: Vec<PathBuf>,
    #[serde(default = "default_language")]
    language: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            playlists: Vec::new(),
            language: default_language(),
        }
    }
}

fn default_language() -> String {
    "sq".to_string()
}

fn deserialize_one_or_many<'de, D>(deserializer: D) -> Result<Vec<PathBuf>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(PathBuf),
        Many(Vec<PathBuf>),
    }

    match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(p) => Ok(vec![p]),
        OneOrMany::Many(v) => Ok(v),
    }
}

fn load_settings(path: &str) -> anyhow::Result<Settings> {
    let settings = Config::builder()
        .add_source(config::File::with_name(path).required(false))
        .add_source(config::Environment::with_prefix("M3UCATALOG").separator("__"))
        .build()?;
    let settings: Settings = settings
        .try_deserialize()
        .with_context(|| format!("invalid configuration in {}", path))?;
    Ok(settings)
}

fn log_summary(conversion: &Conversion) {
    info!(
        "Converted {} channels in {} categories ({} dropped entries, {} orphan URLs)",
        conversion.stats.channels,
        conversion.catalog.categories.len(),
        conversion.stats.dropped_entries,
        conversion.stats.orphan_lines
    );
}

async fn run_convert(inputs: Vec<PathBuf>, output: String, converter: Converter) -> anyhow::Result<()> {
    let mut combined = String::new();
    for input in &inputs {
        combined.push_str(&read_playlist(input).await?);
        combined.push('\n');
    }

    let conversion = convert_and_record(&converter, &combined);
    log_summary(&conversion);

    let json = serde_json::to_string_pretty(&conversion.catalog)?;
    if output == "-" {
        println!("{}", json);
    } else {
        tokio::fs::write(&output, json)
            .await
            .with_context(|| format!("failed to write {}", output))?;
        info!("Catalog written to {}", output);
    }
    Ok(())
}

async fn run_serve(settings: Settings, converter: Converter) -> anyhow::Result<()> {
    let content = load_playlists(&settings.catalog.playlists).await;
    let conversion = convert_and_record(&converter, &content);
    if conversion.catalog.channels.is_empty() {
        warn!("No channels loaded from any playlist. Serving an empty catalog.");
    }
    log_summary(&conversion);
    info!("Channels stamped with language '{}'", converter.language());

    let app = create_app(conversion, converter, settings.monitoring);

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    info!("Listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut settings = load_settings(&args.config)?;
    info!("Configuration loaded from {}: {:?}", args.config, settings);

    match args.command {
        Command::Convert {
            inputs,
            output,
            language,
        } => {
            let language = language.unwrap_or(settings.catalog.language);
            run_convert(inputs, output, Converter::with_language(language)).await
        }
        Command::Serve { port } => {
            if let Some(port) = port {
                settings.server.port = port;
            }
            let converter = Converter::with_language(settings.catalog.language.clone());
            run_serve(settings, converter).await
        }
    }
}
