//! Deploys the funding registry, the payment treasury and (for development)
//! a stub decision verifier from Foundry build artifacts.

use crate::config::{optional_number, optional_string};
use crate::errors::{ConfigError, DeployError, LedgerError};
use crate::features::abi::{encode_constructor_call, ContractFunctionParameters};
use crate::features::hedera_client::{
    normalize_address, resolve_address, EntityId, HederaClientSettings, RelayClient,
    TransactionRequest,
};
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const DEFAULT_DEPLOY_GAS_LIMIT: u64 = 2_000_000;
pub const DEFAULT_ARTIFACTS_DIR: &str = "../my-web-proof/out";
pub const DEFAULT_DEPLOY_NETWORK: &str = "testnet";

const REGISTRY_CONTRACT: &str = "AgentFundingRegistry";
const TREASURY_CONTRACT: &str = "AgentPaymentTreasury";
const STUB_VERIFIER_CONTRACT: &str = "StubAgentDecisionVerifier";

#[derive(Clone, PartialEq, Eq)]
pub struct DeploySettings {
    pub artifacts_dir: PathBuf,
    pub network: String,
    pub operator_id: String,
    pub operator_key: String,
    pub verifier_address: Option<String>,
    pub payment_target: Option<String>,
    pub gas_limit: u64,
}

impl std::fmt::Debug for DeploySettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeploySettings")
            .field("artifacts_dir", &self.artifacts_dir)
            .field("network", &self.network)
            .field("operator_id", &self.operator_id)
            .field("operator_key", &"<redacted>")
            .field("verifier_address", &self.verifier_address)
            .field("payment_target", &self.payment_target)
            .field("gas_limit", &self.gas_limit)
            .finish()
    }
}

impl DeploySettings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let first_of = |keys: &[&str]| keys.iter().find_map(|key| optional_string(&lookup, key));
        let missing = |key: &str| ConfigError::MissingVar {
            key: key.to_string(),
        };
        Ok(Self {
            artifacts_dir: optional_string(&lookup, "CONTRACT_ARTIFACTS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_ARTIFACTS_DIR)),
            network: optional_string(&lookup, "HEDERA_NETWORK")
                .unwrap_or_else(|| DEFAULT_DEPLOY_NETWORK.to_string()),
            operator_id: first_of(&["HEDERA_OPERATOR_ID", "HEDERA_ACCOUNT_ID"])
                .ok_or_else(|| missing("HEDERA_OPERATOR_ID"))?,
            operator_key: first_of(&["HEDERA_OPERATOR_KEY", "HEDERA_PRIVATE_KEY"])
                .ok_or_else(|| missing("HEDERA_OPERATOR_KEY"))?,
            verifier_address: optional_string(&lookup, "AGENT_VERIFIER_ADDRESS"),
            payment_target: first_of(&[
                "AGENT_PAYMENT_TARGET",
                "HEDERA_PAYMENT_TARGET",
                "HEDERA_ACCOUNT_ID",
                "HEDERA_OPERATOR_ID",
            ]),
            gas_limit: optional_number(&lookup, "DEPLOY_GAS_LIMIT", DEFAULT_DEPLOY_GAS_LIMIT)?,
        })
    }

    pub fn hedera_client_settings(&self) -> HederaClientSettings {
        HederaClientSettings {
            network: self.network.clone(),
            operator_id: self.operator_id.clone(),
            operator_key: self.operator_key.clone(),
        }
    }

    fn artifact_path(&self, source_file: &str, contract: &str) -> PathBuf {
        self.artifacts_dir
            .join(source_file)
            .join(format!("{contract}.json"))
    }

    pub fn registry_artifact(&self) -> PathBuf {
        self.artifact_path("AgentFunding.sol", REGISTRY_CONTRACT)
    }

    pub fn treasury_artifact(&self) -> PathBuf {
        self.artifact_path("AgentPaymentTreasury.sol", TREASURY_CONTRACT)
    }

    pub fn stub_verifier_artifact(&self) -> PathBuf {
        self.artifact_path("StubAgentDecisionVerifier.sol", STUB_VERIFIER_CONTRACT)
    }
}

#[derive(Deserialize)]
struct FoundryArtifact {
    #[serde(default)]
    bytecode: Option<FoundryBytecode>,
}

#[derive(Deserialize)]
struct FoundryBytecode {
    #[serde(default)]
    object: Option<String>,
}

/// Reads `bytecode.object` from a Foundry JSON artifact.
pub async fn load_bytecode(path: &Path) -> Result<Vec<u8>, DeployError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| DeployError::ArtifactRead {
            path: path.to_path_buf(),
            source,
        })?;
    let artifact: FoundryArtifact =
        serde_json::from_str(&raw).map_err(|source| DeployError::ArtifactParse {
            path: path.to_path_buf(),
            source,
        })?;
    let object = artifact
        .bytecode
        .and_then(|bytecode| bytecode.object)
        .unwrap_or_default();
    let hex_code = object.trim().trim_start_matches("0x");
    if hex_code.is_empty() {
        return Err(DeployError::MissingBytecode {
            path: path.to_path_buf(),
        });
    }
    hex::decode(hex_code).map_err(|error| DeployError::InvalidBytecode {
        path: path.to_path_buf(),
        reason: error.to_string(),
    })
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeployedContract {
    pub name: String,
    pub evm_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
}

impl DeployedContract {
    fn from_address(name: &str, address: Address) -> Self {
        Self {
            name: name.to_string(),
            evm_address: format!("{address:#x}"),
            entity_id: EntityId::from_long_zero(&address).map(|id| id.to_string()),
        }
    }

    fn address(&self) -> Result<Address, LedgerError> {
        normalize_address(&self.evm_address)
    }
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentReport {
    pub network: String,
    pub gas_limit: u64,
    pub payment_target: String,
    pub verifier: DeployedContract,
    /// True when the development stub was deployed in place of a real verifier.
    pub stub_verifier: bool,
    pub registry: DeployedContract,
    pub treasury: DeployedContract,
}

pub async fn deploy_contracts(
    settings: &DeploySettings,
    client: &RelayClient,
) -> Result<DeploymentReport, DeployError> {
    let payment_target = settings
        .payment_target
        .as_deref()
        .ok_or(DeployError::MissingPaymentTarget)?;
    let payment_target_address = resolve_address(payment_target)?;

    let registry_code = load_bytecode(&settings.registry_artifact()).await?;
    let treasury_code = load_bytecode(&settings.treasury_artifact()).await?;

    info!(
        network = client.network().name(),
        operator = %client.operator_id(),
        payment_target = %format!("{payment_target_address:#x}"),
        gas_limit = settings.gas_limit,
        "deploying funding contracts"
    );

    let (verifier, stub_verifier) = match settings.verifier_address.as_deref() {
        Some(raw) => {
            let verifier = DeployedContract::from_address("AgentDecisionVerifier", resolve_address(raw)?);
            info!(verifier = %verifier.evm_address, "using configured verifier");
            (verifier, false)
        }
        None => {
            warn!("no AGENT_VERIFIER_ADDRESS; deploying {STUB_VERIFIER_CONTRACT} (development only)");
            let stub_code = load_bytecode(&settings.stub_verifier_artifact()).await?;
            let stub = deploy_one(
                client,
                STUB_VERIFIER_CONTRACT,
                stub_code,
                &ContractFunctionParameters::new(),
                settings.gas_limit,
            )
            .await?;
            (stub, true)
        }
    };

    let registry = deploy_one(
        client,
        REGISTRY_CONTRACT,
        registry_code,
        &ContractFunctionParameters::new().add_address(verifier.address()?),
        settings.gas_limit,
    )
    .await?;
    if stub_verifier {
        warn!("replace the stub verifier with a production verifier contract when ready");
    }

    let treasury = deploy_one(
        client,
        TREASURY_CONTRACT,
        treasury_code,
        &ContractFunctionParameters::new()
            .add_address(registry.address()?)
            .add_address(payment_target_address),
        settings.gas_limit,
    )
    .await?;

    info!(
        registry = %registry.evm_address,
        treasury = %treasury.evm_address,
        "deployment complete"
    );
    Ok(DeploymentReport {
        network: client.network().name().to_string(),
        gas_limit: settings.gas_limit,
        payment_target: format!("{payment_target_address:#x}"),
        verifier,
        stub_verifier,
        registry,
        treasury,
    })
}

async fn deploy_one(
    client: &RelayClient,
    name: &str,
    bytecode: Vec<u8>,
    constructor_args: &ContractFunctionParameters,
    gas_limit: u64,
) -> Result<DeployedContract, DeployError> {
    let receipt = client
        .submit(TransactionRequest {
            to: None,
            data: encode_constructor_call(&bytecode, constructor_args),
            value_tinybars: 0,
            gas_limit,
        })
        .await?;
    if !receipt.succeeded() {
        return Err(LedgerError::Reverted {
            function: format!("{name} constructor"),
            transaction_id: receipt.transaction_hash,
        }
        .into());
    }
    let address = receipt
        .contract_address
        .as_deref()
        .ok_or_else(|| DeployError::MissingContractAddress {
            contract: name.to_string(),
        })
        .and_then(|raw| normalize_address(raw).map_err(DeployError::from))?;
    let deployed = DeployedContract::from_address(name, address);
    info!(
        contract = name,
        evm_address = %deployed.evm_address,
        entity_id = deployed.entity_id.as_deref().unwrap_or("-"),
        "contract deployed"
    );
    Ok(deployed)
}
