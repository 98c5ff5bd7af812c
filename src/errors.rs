//! Error types for configuration, proof generation, ledger execution,
//! orchestration and deployment.

use crate::domain::state_machine::TransitionError;
use std::path::PathBuf;

/// Startup configuration errors. Fatal; raised before any funding call.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable {key}")]
    MissingVar { key: String },

    #[error("Environment variable {key} must be a number, got `{value}`")]
    InvalidNumber { key: String, value: String },

    #[error("VLAYER_JWT_TOKEN is required when VLAYER_ENABLED is true")]
    MissingVlayerToken,
}

/// Unanticipated proof-generation failures. Expected negative outcomes
/// (integration disabled, non-zero exit) are encoded in the artifact instead.
#[derive(Debug, thiserror::Error)]
pub enum ProofError {
    #[error("failed to run attestation cli `{cli_path}`: {source}")]
    Spawn {
        cli_path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Ledger gateway failures. All of them propagate to the orchestrator's caller.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Unsupported Hedera network value {value}")]
    UnsupportedNetwork { value: String },

    #[error("invalid operator key: {reason}")]
    InvalidOperatorKey { reason: String },

    #[error("invalid Hedera entity id `{value}`")]
    InvalidEntityId { value: String },

    #[error("invalid EVM address `{value}`")]
    InvalidAddress { value: String },

    #[error("invalid contract function name `{name}`")]
    InvalidFunction { name: String },

    #[error("payable amount must be non-negative, got {tinybars} tinybars")]
    InvalidPayableAmount { tinybars: i64 },

    #[error("relay transport failed: {reason}")]
    Transport { reason: String },

    #[error("relay returned error for {method}: {message}")]
    Rpc { method: String, message: String },

    #[error("invalid relay response for {method}: {reason}")]
    InvalidResponse { method: String, reason: String },

    #[error("no receipt for transaction {transaction_id} after {attempts} polls")]
    ReceiptTimeout { transaction_id: String, attempts: u32 },

    #[error("contract call {function} reverted in transaction {transaction_id}")]
    Reverted {
        function: String,
        transaction_id: String,
    },
}

/// Failures that escape `FundingOrchestrator::handle_agent_funding`.
#[derive(Debug, thiserror::Error)]
pub enum FundingError {
    #[error("proof generation failed: {0}")]
    Proof(#[from] ProofError),

    #[error("ledger execution failed: {0}")]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Transition(#[from] TransitionError),
}

/// Contract deployment failures.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error("failed to read artifact {}: {source}", path.display())]
    ArtifactRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse artifact {}: {source}", path.display())]
    ArtifactParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Artifact at {} is missing bytecode.object", path.display())]
    MissingBytecode { path: PathBuf },

    #[error("Artifact at {} has invalid bytecode: {reason}", path.display())]
    InvalidBytecode { path: PathBuf, reason: String },

    #[error(
        "Missing AGENT_PAYMENT_TARGET. Provide a Hedera account ID or EVM address for the payout recipient."
    )]
    MissingPaymentTarget,

    #[error("{contract} deployment did not return a contract address")]
    MissingContractAddress { contract: String },

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}
