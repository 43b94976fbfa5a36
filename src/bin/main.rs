use futures::StreamExt;
use investment_agent::{relay::relay, AgentConfig, InvestmentAgent, StreamEvent};
use std::io::Write;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    // Logs go to stderr so stdout carries only the answer
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let question = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    if question.trim().is_empty() {
        eprintln!("Usage: investment-agent <question>");
        eprintln!("Example: investment-agent \"Should I buy Apple stock?\"");
        std::process::exit(2);
    }

    let config = AgentConfig::from_env()?;
    let agent = InvestmentAgent::from_config(&config)?;

    let response = agent.execute(&question).await;
    info!(outcome = ?response.outcome, "Running agent");

    let mut events = Box::pin(relay(response.tokens));
    let mut stdout = std::io::stdout();

    while let Some(event) = events.next().await {
        match event {
            StreamEvent::Content(text) => {
                write!(stdout, "{}", text)?;
                stdout.flush()?;
            }
            StreamEvent::Done => writeln!(stdout)?,
        }
    }

    Ok(())
}
