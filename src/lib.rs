//! Funding policy and orchestration for agents whose plans are paid through
//! a Hedera smart contract.
//!
//! [`domain`] holds the pure policy and the per-call state machine;
//! [`features`] holds the ledger, proof and deployment adapters behind
//! async traits so the orchestrator can be driven with test doubles.

pub mod config;
pub mod domain;
pub mod errors;
pub mod features;
pub mod timing;

#[cfg(test)]
mod test_support;

pub use config::{EnvConfig, VlayerConfig};
pub use domain::funding_policy::evaluate_funding;
pub use domain::types::{
    AgentFundingContext, AgentFundingSnapshot, AgentProfile, FundingDecision, FundingOutcome,
    FundingProofArtifact, FundingProofRequest, FundingProofStatus,
};
pub use errors::{ConfigError, DeployError, FundingError, LedgerError, ProofError};
