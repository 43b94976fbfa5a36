use investment_agent::{api::start_server, AgentConfig, InvestmentAgent};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AgentConfig::from_env()?;

    if config.llm.api_key.is_empty() {
        warn!("GROQ_API_KEY not set in .env, generation requests will fail");
        warn!("See .env.example for setup instructions");
    }

    info!("Investment Agent - API Server");
    info!("Port: {}", config.port);

    let agent = Arc::new(InvestmentAgent::from_config(&config)?);

    info!("Starting API server...");

    start_server(agent, config.port).await?;

    Ok(())
}
