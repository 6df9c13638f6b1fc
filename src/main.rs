use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cardflow::config::Config;
use cardflow::server;

#[derive(Parser)]
#[command(name = "cardflow")]
#[command(about = "AI-planned, data-backed UI module server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Bind host (overrides config)
        #[arg(long)]
        host: Option<String>,
        /// Bind port (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Generate and execute a plan for one request, printing the result as JSON
    Plan {
        /// The user request text
        text: String,
    },
    /// Show the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cardflow=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let mut config = Config::load()?;

    match cli.command {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            server::start_server(config).await?;
        }
        Commands::Plan { text } => {
            run_plan(config, &text).await?;
        }
        Commands::Config => {
            println!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

/// One-shot pipeline run, useful for trying prompts without a frontend.
async fn run_plan(config: Config, text: &str) -> Result<()> {
    let state = server::state::AppState::new(&config)?;

    let summaries = state.catalog.load_all_summaries().await.unwrap_or_default();
    let plan = state
        .interpreter
        .generate_plan(text, None, &summaries)
        .await?;
    let instances = state.plan_executor.execute(&plan).await;

    let output = serde_json::json!({
        "globalStyle": plan.global_style,
        "modules": instances,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
