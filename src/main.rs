use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hedera_agent_funding::domain::types::{
    AgentFundingContext, AgentFundingSnapshot, AgentProfile,
};
use hedera_agent_funding::evaluate_funding;
use hedera_agent_funding::features::deploy::{deploy_contracts, DeploySettings};
use hedera_agent_funding::features::{
    funding_proof_request_builder, FundingOrchestrator, FundingOrchestratorOptions,
    HederaClientHandle, HederaContractService, VlayerProofService,
};
use hedera_agent_funding::EnvConfig;
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "hedera-funding", version, about = "Agent funding policy and execution")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the funding decision for a context without touching the ledger.
    Evaluate {
        /// JSON context file, or `-` for stdin.
        #[arg(long)]
        context: PathBuf,
    },
    /// Evaluate, optionally prove, and pay the agent contract once.
    Fund {
        /// JSON context file, or `-` for stdin. Defaults to a sample agent.
        #[arg(long)]
        context: Option<PathBuf>,
    },
    /// Deploy the registry and treasury contracts from Foundry artifacts.
    Deploy,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    match Cli::parse().command {
        Command::Evaluate { context } => {
            let context = read_context(&context)?;
            print_json(&evaluate_funding(&context))
        }
        Command::Fund { context } => {
            let context = match context {
                Some(path) => read_context(&path)?,
                None => sample_context(),
            };
            fund(&context).await
        }
        Command::Deploy => deploy().await,
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr),
        )
        .init();
}

async fn fund(context: &AgentFundingContext) -> Result<()> {
    let config = EnvConfig::from_env().context("failed to load funding configuration")?;
    info!(?config, "configuration loaded");

    let client = Arc::new(HederaClientHandle::new(config.hedera_client_settings()));
    let gateway = HederaContractService::new(
        config.agent_contract_id.clone(),
        config.contract_gas_limit,
        config.dry_run_funding,
        client,
    );
    let options = FundingOrchestratorOptions::new()
        .with_proof_service(Arc::new(VlayerProofService::new(config.vlayer.clone())))
        .with_proof_request_builder(funding_proof_request_builder(
            config.vlayer.proof_url.clone(),
        ));
    let orchestrator = FundingOrchestrator::new(gateway, options);

    let outcome = orchestrator
        .handle_agent_funding(context)
        .await
        .with_context(|| format!("funding failed for agent {}", context.profile.agent_id))?;
    print_json(&outcome)
}

async fn deploy() -> Result<()> {
    let settings = DeploySettings::from_env().context("failed to load deploy configuration")?;
    let handle = HederaClientHandle::new(settings.hedera_client_settings());
    let client = handle
        .client()
        .await
        .context("failed to initialise Hedera relay client")?;
    let report = deploy_contracts(&settings, &client)
        .await
        .context("contract deployment failed")?;
    print_json(&report)
}

fn read_context(path: &Path) -> Result<AgentFundingContext> {
    let raw = if path.as_os_str() == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read context from stdin")?;
        buffer
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read context file {}", path.display()))?
    };
    serde_json::from_str(&raw).context("context is not a valid AgentFundingContext")
}

fn sample_context() -> AgentFundingContext {
    AgentFundingContext {
        profile: AgentProfile {
            agent_id: "agent-sample".to_string(),
            contract_account_id: "0.0.123456".to_string(),
            plan_id: "starter".to_string(),
        },
        snapshot: AgentFundingSnapshot {
            current_balance_hbar: 2.0,
            min_buffer_hbar: 5.0,
            max_buffer_hbar: 20.0,
            plan_cost_hbar: 3.0,
            demand_score: 0.8,
            last_funding_at: None,
            projected_hours_until_depletion: 1.5,
        },
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("failed to render output")?;
    println!("{rendered}");
    Ok(())
}
