//! Process-environment configuration.
//!
//! Everything is read once at startup and validated eagerly; a bad value is a
//! [`ConfigError`] before any funding call runs. Lookups go through a closure
//! so tests can feed a fixed map instead of mutating the process environment.

use crate::errors::ConfigError;
use crate::features::contract_service::DEFAULT_CONTRACT_GAS_LIMIT;
use crate::features::hedera_client::HederaClientSettings;
use crate::timing::DEFAULT_FUNDING_POLL_INTERVAL_MS;
use std::fmt;

pub const DEFAULT_VLAYER_CLI: &str = "vlayer";
pub const DEFAULT_VLAYER_NOTARY: &str = "https://test-notary.vlayer.xyz/";

#[derive(Clone, PartialEq, Eq)]
pub struct VlayerConfig {
    pub enabled: bool,
    pub cli_path: String,
    pub notary_url: String,
    pub jwt_token: Option<String>,
    /// Endpoint notarized before funding; unset means no proof is requested.
    pub proof_url: Option<String>,
}

impl Default for VlayerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            cli_path: DEFAULT_VLAYER_CLI.to_string(),
            notary_url: DEFAULT_VLAYER_NOTARY.to_string(),
            jwt_token: None,
            proof_url: None,
        }
    }
}

impl fmt::Debug for VlayerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VlayerConfig")
            .field("enabled", &self.enabled)
            .field("cli_path", &self.cli_path)
            .field("notary_url", &self.notary_url)
            .field("jwt_token", &self.jwt_token.as_ref().map(|_| "<redacted>"))
            .field("proof_url", &self.proof_url)
            .finish()
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct EnvConfig {
    pub hedera_network: String,
    pub operator_id: String,
    pub operator_key: String,
    pub agent_contract_id: String,
    pub contract_gas_limit: u64,
    pub funding_poll_interval_ms: u64,
    pub dry_run_funding: bool,
    pub vlayer: VlayerConfig,
}

impl fmt::Debug for EnvConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvConfig")
            .field("hedera_network", &self.hedera_network)
            .field("operator_id", &self.operator_id)
            .field("operator_key", &"<redacted>")
            .field("agent_contract_id", &self.agent_contract_id)
            .field("contract_gas_limit", &self.contract_gas_limit)
            .field("funding_poll_interval_ms", &self.funding_poll_interval_ms)
            .field("dry_run_funding", &self.dry_run_funding)
            .field("vlayer", &self.vlayer)
            .finish()
    }
}

impl EnvConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vlayer = VlayerConfig {
            enabled: parse_boolean(lookup("VLAYER_ENABLED").as_deref(), false),
            cli_path: optional_string(&lookup, "VLAYER_CLI_PATH")
                .unwrap_or_else(|| DEFAULT_VLAYER_CLI.to_string()),
            notary_url: optional_string(&lookup, "VLAYER_NOTARY_URL")
                .unwrap_or_else(|| DEFAULT_VLAYER_NOTARY.to_string()),
            jwt_token: optional_string(&lookup, "VLAYER_JWT_TOKEN"),
            proof_url: optional_string(&lookup, "VLAYER_PROOF_URL"),
        };
        if vlayer.enabled && vlayer.jwt_token.is_none() {
            return Err(ConfigError::MissingVlayerToken);
        }

        Ok(Self {
            hedera_network: require(&lookup, "HEDERA_NETWORK")?,
            operator_id: require(&lookup, "HEDERA_OPERATOR_ID")?,
            operator_key: require(&lookup, "HEDERA_OPERATOR_KEY")?,
            agent_contract_id: require(&lookup, "AGENT_CONTRACT_ID")?,
            contract_gas_limit: optional_number(
                &lookup,
                "HEDERA_CONTRACT_GAS_LIMIT",
                DEFAULT_CONTRACT_GAS_LIMIT,
            )?,
            funding_poll_interval_ms: optional_number(
                &lookup,
                "FUNDING_POLL_INTERVAL_MS",
                DEFAULT_FUNDING_POLL_INTERVAL_MS,
            )?,
            dry_run_funding: parse_boolean(lookup("HEDERA_AGENT_DRY_RUN").as_deref(), true),
            vlayer,
        })
    }

    pub fn hedera_client_settings(&self) -> HederaClientSettings {
        HederaClientSettings {
            network: self.hedera_network.clone(),
            operator_id: self.operator_id.clone(),
            operator_key: self.operator_key.clone(),
        }
    }
}

/// `true`, `1`, `yes` and `on` (any case, surrounding whitespace ignored) are
/// true; any other set value is false.
pub fn parse_boolean(value: Option<&str>, fallback: bool) -> bool {
    match value {
        None => fallback,
        Some(raw) => matches!(
            raw.trim().to_ascii_lowercase().as_str(),
            "true" | "1" | "yes" | "on"
        ),
    }
}

pub(crate) fn require<F>(lookup: &F, key: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    optional_string(lookup, key).ok_or_else(|| ConfigError::MissingVar {
        key: key.to_string(),
    })
}

pub(crate) fn optional_string<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub(crate) fn optional_number<F>(lookup: &F, key: &str, fallback: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match optional_string(lookup, key) {
        None => Ok(fallback),
        Some(raw) => raw
            .replace('_', "")
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidNumber {
                key: key.to_string(),
                value: raw,
            }),
    }
}
