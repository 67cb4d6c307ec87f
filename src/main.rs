//! nutrisage - Telegram nutrition assistant
//!
//! Main entry point: load configuration, wire up the agent and its tools,
//! register the Telegram webhook, and serve.

use anyhow::Result;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use nutrisage::agent::{Agent, SessionStore};
use nutrisage::cli::Cli;
use nutrisage::config::Config;
use nutrisage::nutritionix::NutritionixClient;
use nutrisage::providers::create_provider;
use nutrisage::server::{self, AppState};
use nutrisage::storage::MealLog;
use nutrisage::telegram::TelegramClient;
use nutrisage::{prompts, tools};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse_args();
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;
    config.validate()?;

    let provider: Arc<dyn nutrisage::providers::Provider> =
        Arc::from(create_provider(&config.provider)?);
    let nutritionix = Arc::new(NutritionixClient::new(config.nutritionix.clone())?);
    let meal_log = Arc::new(MealLog::new(&config.storage.meal_log_path));
    let telegram = Arc::new(TelegramClient::new(&config.telegram)?);
    let sessions = Arc::new(SessionStore::new(&config.sessions));

    let registry = tools::build_registry(nutritionix, meal_log, provider.clone());
    let agent = Agent::new(
        provider,
        registry,
        config.agent.clone(),
        prompts::build_system_prompt(),
    )?;

    match (&config.telegram.webhook_url, cli.no_register_webhook) {
        (Some(webhook_url), false) => {
            telegram.set_webhook(webhook_url).await?;
        }
        (Some(_), true) => {
            tracing::info!("Skipping webhook registration (--no-register-webhook)");
        }
        (None, _) => {
            tracing::warn!("No telegram.webhook_url configured, skipping webhook registration");
        }
    }

    let state = AppState {
        agent: Arc::new(agent),
        sessions,
        telegram,
    };

    server::serve(state, &config.server.host, config.server.port).await
}

/// Initialize tracing subscriber with environment filter
///
/// Set LOG_FORMAT=json for JSON output.
fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("nutrisage=info"));

    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }
}
