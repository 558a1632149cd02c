#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the case summary widget.

use std::path::PathBuf;

use clap::Parser;
use covid_widget_cache::CacheStore;
use covid_widget_cli::config::{ConfigOverrides, WidgetConfig};
use covid_widget_cli::pipeline::{self, PipelineContext};
use covid_widget_cli::present::{self, ExecutionContext};
use covid_widget_source::http::HttpClient;
use covid_widget_source::registry::{all_providers, find_provider};

#[derive(Parser)]
#[command(name = "covid_widget", about = "Regional COVID-19 case summary widget")]
struct Cli {
    /// Health region code (e.g. "4601") or two-letter province code (e.g. "MB").
    /// Uses the configured defaults when omitted.
    parameter: Option<String>,
    /// How to render the result
    #[arg(long, value_enum, default_value_t = ExecutionContext::Widget)]
    context: ExecutionContext,
    /// Provider id (overrides `COVID_WIDGET_PROVIDER`)
    #[arg(long)]
    provider: Option<String>,
    /// Cache file path (overrides `COVID_WIDGET_CACHE_PATH`)
    #[arg(long)]
    cache_path: Option<PathBuf>,
    /// Per-request timeout in seconds (overrides `COVID_WIDGET_TIMEOUT_SECS`)
    #[arg(long)]
    timeout_secs: Option<u64>,
    /// List the configured providers and exit
    #[arg(long)]
    list_providers: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    if cli.list_providers {
        println!("{:<20} {:<20} NAME", "ID", "SCHEMA");
        println!("{}", "-".repeat(70));
        for provider in &all_providers() {
            println!("{:<20} {:<20} {}", provider.id, provider.schema, provider.name);
        }
        return Ok(());
    }

    let config = WidgetConfig::from_env(ConfigOverrides {
        provider_id: cli.provider,
        cache_path: cli.cache_path,
        timeout_secs: cli.timeout_secs,
    });
    log::debug!("Configuration: {config:?}");

    let provider = find_provider(&config.provider_id)?;
    let client = HttpClient::new(config.timeout)?;
    let cache = CacheStore::new(&config.cache_path);

    let ctx = PipelineContext {
        client: &client,
        provider: &provider,
        cache: &cache,
        defaults: &config.defaults,
        today: chrono::Local::now().date_naive(),
    };

    let outcome = pipeline::run(&ctx, cli.parameter.as_deref()).await?;
    println!("{}", present::render(cli.context, &outcome));

    Ok(())
}
