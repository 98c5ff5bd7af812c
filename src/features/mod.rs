pub mod abi;
pub mod contract_service;
pub mod deploy;
pub mod evm_tx;
pub mod funding_orchestrator;
pub mod hedera_client;
pub mod proof_service;

pub use contract_service::{ContractFundingCall, HederaContractService, LedgerGateway};
pub use funding_orchestrator::{FundingOrchestrator, FundingOrchestratorOptions};
pub use hedera_client::{HederaClientHandle, HederaClientSettings, JsonRpcTransport, RelayClient};
pub use proof_service::{funding_proof_request_builder, FundingProofProvider, VlayerProofService};
