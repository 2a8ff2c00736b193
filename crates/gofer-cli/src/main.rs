use anyhow::{bail, Result};
use clap::Parser;
use std::env;
use std::path::PathBuf;
use std::process::exit;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use gofer::agent::{Agent, AgentConfig, RunStatus, DEFAULT_MAX_ITERATIONS};
use gofer::providers::base::Provider;
use gofer::providers::cache::CachingProvider;
use gofer::providers::configs::{AnthropicProviderConfig, OpenAiProviderConfig, ProviderConfig};
use gofer::providers::factory::{get_mock_provider, get_provider, ProviderType};
use gofer::registry::ToolRegistry;
use gofer::tools::terminate;
use gofer::tools::workspace::Workspace;

mod session;

use session::Session;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Task for the agent to complete (prompts interactively if omitted)
    #[arg(long)]
    task: Option<String>,

    /// Model to use (default: GOFER_MODEL / DEFAULT_MODEL, then the provider default)
    #[arg(short, long)]
    model: Option<String>,

    /// Provider to use: openai, anthropic or mock
    #[arg(short, long, default_value = "openai", value_parser = clap::value_parser!(ProviderType))]
    provider: ProviderType,

    /// Maximum agent iterations (default: GOFER_MAX_ITERATIONS / DEFAULT_MAX_ITERATIONS, then 10)
    #[arg(long)]
    max_iterations: Option<u32>,

    /// Show each iteration's tool, arguments and result
    #[arg(short, long)]
    verbose: bool,

    /// Skip the network and run against a canned scripted provider
    #[arg(long)]
    mock: bool,

    /// Cache provider responses by request fingerprint for this run
    #[arg(long)]
    cache: bool,

    /// Directory the file tools are confined to
    #[arg(long, default_value = ".")]
    workspace: PathBuf,
}

fn env_model() -> Option<String> {
    env::var("GOFER_MODEL")
        .ok()
        .or_else(|| env::var("DEFAULT_MODEL").ok())
}

fn env_max_iterations() -> Option<u32> {
    env::var("GOFER_MAX_ITERATIONS")
        .ok()
        .or_else(|| env::var("DEFAULT_MAX_ITERATIONS").ok())
        .and_then(|value| value.parse().ok())
}

fn build_registry(workspace_dir: &PathBuf) -> Result<ToolRegistry> {
    let mut registry = ToolRegistry::new();
    let workspace = Arc::new(Workspace::new(workspace_dir.clone()));
    workspace.register_all(&mut registry)?;
    terminate::register(&mut registry)?;
    Ok(registry)
}

fn build_provider(cli: &Cli) -> Result<Box<dyn Provider>> {
    let model = cli.model.clone().or_else(env_model);
    if cli.mock || cli.provider == ProviderType::Mock {
        return Ok(get_mock_provider());
    }
    let config = match cli.provider {
        ProviderType::OpenAi => ProviderConfig::OpenAi(OpenAiProviderConfig::from_env(model)?),
        ProviderType::Anthropic => {
            ProviderConfig::Anthropic(AnthropicProviderConfig::from_env(model)?)
        }
        ProviderType::Mock => unreachable!(),
    };
    let provider = get_provider(config)?;
    if cli.cache {
        Ok(Box::new(CachingProvider::new(provider)))
    } else {
        Ok(provider)
    }
}

async fn run() -> Result<RunStatus> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let task = match &cli.task {
        Some(task) => task.clone(),
        None => cliclack::input("What would you like me to do?")
            .placeholder("e.g. list the Rust files and summarize them")
            .interact()?,
    };
    if task.trim().is_empty() {
        bail!("no task provided");
    }

    let registry = build_registry(&cli.workspace)?;
    let provider = build_provider(&cli)?;

    let config = AgentConfig {
        max_iterations: cli
            .max_iterations
            .or_else(env_max_iterations)
            .unwrap_or(DEFAULT_MAX_ITERATIONS),
        ..AgentConfig::default()
    };
    let agent = Agent::new(provider, registry).with_config(config);

    Session::new(agent, cli.verbose).run(&task).await
}

#[tokio::main]
async fn main() {
    match run().await {
        Ok(RunStatus::Completed) => exit(0),
        Ok(RunStatus::IterationLimit) => exit(2),
        Err(error) => {
            eprintln!("{} {:#}", console::style("error:").red().bold(), error);
            exit(1);
        }
    }
}
