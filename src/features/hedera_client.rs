//! Hedera network access through the JSON-RPC relay.
//!
//! The relay exposes an Ethereum-compatible endpoint in front of the Hedera
//! consensus nodes, so contract calls are plain EIP-1559 transactions signed
//! with the operator's ECDSA key. Values cross the relay in weibar
//! (1 tinybar = 10^10 weibar).

use crate::errors::LedgerError;
use crate::features::evm_tx::{Eip1559UnsignedTx, OperatorSigner};
use crate::timing::{RECEIPT_POLL_INTERVAL_MS, RECEIPT_POLL_MAX_ATTEMPTS, RELAY_REQUEST_TIMEOUT_SECS};
use alloy_primitives::{Address, Bytes, U256};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::fmt;
use std::io::Read;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, info, warn};

const MAX_RELAY_RESPONSE_BYTES: u64 = 2 * 1024 * 1024;
const WEIBAR_PER_TINYBAR: u64 = 10_000_000_000;
const GAS_PRICE_HEADROOM_DIVISOR: u64 = 10;
const RECEIPT_STATUS_SUCCESS: &str = "0x1";
pub const RECEIPT_SUCCESS: &str = "SUCCESS";

// ── Network selection ───────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HederaNetwork {
    Mainnet,
    Testnet,
    Previewnet,
    Custom { rpc_url: String, chain_id: u64 },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CustomNetwork {
    rpc_url: String,
    chain_id: u64,
}

impl HederaNetwork {
    /// Named networks are matched case-insensitively; anything else must be a
    /// JSON object `{"rpcUrl": "...", "chainId": n}`.
    pub fn parse(raw: &str) -> Result<Self, LedgerError> {
        let normalized = raw.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "mainnet" => return Ok(Self::Mainnet),
            "testnet" => return Ok(Self::Testnet),
            "previewnet" => return Ok(Self::Previewnet),
            _ => {}
        }
        let unsupported = || LedgerError::UnsupportedNetwork {
            value: raw.to_string(),
        };
        let custom: CustomNetwork = serde_json::from_str(raw.trim()).map_err(|_| unsupported())?;
        let rpc_url = custom.rpc_url.trim();
        if rpc_url.is_empty() || custom.chain_id == 0 {
            return Err(unsupported());
        }
        Ok(Self::Custom {
            rpc_url: rpc_url.to_string(),
            chain_id: custom.chain_id,
        })
    }

    pub fn rpc_url(&self) -> &str {
        match self {
            Self::Mainnet => "https://mainnet.hashio.io/api",
            Self::Testnet => "https://testnet.hashio.io/api",
            Self::Previewnet => "https://previewnet.hashio.io/api",
            Self::Custom { rpc_url, .. } => rpc_url,
        }
    }

    pub fn chain_id(&self) -> u64 {
        match self {
            Self::Mainnet => 295,
            Self::Testnet => 296,
            Self::Previewnet => 297,
            Self::Custom { chain_id, .. } => *chain_id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Testnet => "testnet",
            Self::Previewnet => "previewnet",
            Self::Custom { .. } => "custom",
        }
    }
}

// ── Entity ids and addresses ────────────────────────────────────────────────

/// Hedera `shard.realm.num` identifier for accounts and contracts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EntityId {
    pub shard: u32,
    pub realm: u64,
    pub num: u64,
}

impl EntityId {
    /// Long-zero EVM address: shard (4 bytes) | realm (8) | num (8).
    pub fn to_evm_address(&self) -> Address {
        let mut bytes = [0u8; 20];
        bytes[..4].copy_from_slice(&self.shard.to_be_bytes());
        bytes[4..12].copy_from_slice(&self.realm.to_be_bytes());
        bytes[12..].copy_from_slice(&self.num.to_be_bytes());
        Address::from(bytes)
    }

    /// Inverse of [`EntityId::to_evm_address`]. Addresses derived from ECDSA
    /// keys have no entity id and yield `None`.
    pub fn from_long_zero(address: &Address) -> Option<Self> {
        let bytes = address.as_slice();
        // Realms fit in 32 bits, so a non-zero high realm word marks an alias.
        if bytes[4..8].iter().any(|byte| *byte != 0) {
            return None;
        }
        let mut shard = [0u8; 4];
        let mut realm = [0u8; 8];
        let mut num = [0u8; 8];
        shard.copy_from_slice(&bytes[..4]);
        realm.copy_from_slice(&bytes[4..12]);
        num.copy_from_slice(&bytes[12..]);
        Some(Self {
            shard: u32::from_be_bytes(shard),
            realm: u64::from_be_bytes(realm),
            num: u64::from_be_bytes(num),
        })
    }
}

impl FromStr for EntityId {
    type Err = LedgerError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || LedgerError::InvalidEntityId {
            value: raw.to_string(),
        };
        let mut parts = raw.trim().split('.');
        let (Some(shard), Some(realm), Some(num), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };
        let all_digits = [shard, realm, num]
            .iter()
            .all(|part| !part.is_empty() && part.bytes().all(|byte| byte.is_ascii_digit()));
        if !all_digits {
            return Err(invalid());
        }
        Ok(Self {
            shard: shard.parse().map_err(|_| invalid())?,
            realm: realm.parse().map_err(|_| invalid())?,
            num: num.parse().map_err(|_| invalid())?,
        })
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.shard, self.realm, self.num)
    }
}

pub fn normalize_address(raw: &str) -> Result<Address, LedgerError> {
    let trimmed = raw.trim().to_ascii_lowercase();
    let valid = trimmed.len() == 42
        && trimmed.starts_with("0x")
        && trimmed
            .as_bytes()
            .iter()
            .skip(2)
            .all(|byte| byte.is_ascii_hexdigit());
    if !valid {
        return Err(LedgerError::InvalidAddress {
            value: raw.to_string(),
        });
    }
    Address::from_str(&trimmed).map_err(|_| LedgerError::InvalidAddress {
        value: raw.to_string(),
    })
}

/// Accepts either a Hedera entity id or a 0x-prefixed EVM address.
pub fn resolve_address(raw: &str) -> Result<Address, LedgerError> {
    let trimmed = raw.trim();
    if trimmed.starts_with("0x") || trimmed.starts_with("0X") {
        return normalize_address(trimmed);
    }
    Ok(EntityId::from_str(trimmed)?.to_evm_address())
}

pub fn tinybars_to_weibar(tinybars: u64) -> U256 {
    U256::from(tinybars) * U256::from(WEIBAR_PER_TINYBAR)
}

// ── Transport ───────────────────────────────────────────────────────────────

/// Raw JSON-RPC POST. Split out so tests can answer relay calls in-process.
#[async_trait]
pub trait JsonRpcTransport: Send + Sync {
    async fn post_json(&self, url: &str, body: Vec<u8>) -> Result<Vec<u8>, LedgerError>;
}

/// Blocking `ureq` client moved onto tokio's blocking pool.
#[derive(Clone, Debug)]
pub struct UreqTransport {
    agent: ureq::Agent,
    max_response_bytes: u64,
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self {
            agent: ureq::AgentBuilder::new()
                .timeout(Duration::from_secs(RELAY_REQUEST_TIMEOUT_SECS))
                .build(),
            max_response_bytes: MAX_RELAY_RESPONSE_BYTES,
        }
    }
}

#[async_trait]
impl JsonRpcTransport for UreqTransport {
    async fn post_json(&self, url: &str, body: Vec<u8>) -> Result<Vec<u8>, LedgerError> {
        let agent = self.agent.clone();
        let url = url.to_string();
        let max_response_bytes = self.max_response_bytes;
        tokio::task::spawn_blocking(move || {
            let response = agent
                .post(&url)
                .set("content-type", "application/json")
                .send_bytes(&body)
                .map_err(|error| LedgerError::Transport {
                    reason: match error {
                        ureq::Error::Status(status, _) => {
                            format!("relay returned status {status}")
                        }
                        ureq::Error::Transport(transport) => {
                            format!("relay transport failed: {transport}")
                        }
                    },
                })?;

            let mut raw = Vec::new();
            response
                .into_reader()
                .take(max_response_bytes.saturating_add(1))
                .read_to_end(&mut raw)
                .map_err(|error| LedgerError::Transport {
                    reason: format!("failed to read relay response body: {error}"),
                })?;
            if u64::try_from(raw.len()).unwrap_or(u64::MAX) > max_response_bytes {
                return Err(LedgerError::Transport {
                    reason: format!("relay response exceeded {max_response_bytes} bytes"),
                });
            }
            Ok(raw)
        })
        .await
        .map_err(|error| LedgerError::Transport {
            reason: format!("relay request task failed: {error}"),
        })?
    }
}

// ── Relay client ────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub contract_address: Option<String>,
    #[serde(default)]
    pub block_number: Option<String>,
    #[serde(default)]
    pub gas_used: Option<String>,
}

impl TransactionReceipt {
    pub fn succeeded(&self) -> bool {
        self.status
            .as_deref()
            .map(|status| status.trim().eq_ignore_ascii_case(RECEIPT_STATUS_SUCCESS))
            .unwrap_or(false)
    }
}

/// Outgoing transaction before nonce and fees are filled in.
#[derive(Clone, Debug)]
pub struct TransactionRequest {
    pub to: Option<Address>,
    pub data: Vec<u8>,
    pub value_tinybars: u64,
    pub gas_limit: u64,
}

pub struct RelayClient {
    network: HederaNetwork,
    operator_id: EntityId,
    signer: OperatorSigner,
    transport: Arc<dyn JsonRpcTransport>,
    /// Next operator nonce. `None` until seeded from the relay, and again
    /// after a rejected broadcast.
    next_nonce: Mutex<Option<U256>>,
}

impl fmt::Debug for RelayClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayClient")
            .field("network", &self.network)
            .field("operator_id", &self.operator_id)
            .field("signer", &self.signer)
            .finish_non_exhaustive()
    }
}

impl RelayClient {
    pub fn new(
        network: HederaNetwork,
        operator_id: EntityId,
        signer: OperatorSigner,
        transport: Arc<dyn JsonRpcTransport>,
    ) -> Self {
        Self {
            network,
            operator_id,
            signer,
            transport,
            next_nonce: Mutex::new(None),
        }
    }

    pub fn network(&self) -> &HederaNetwork {
        &self.network
    }

    pub fn operator_id(&self) -> EntityId {
        self.operator_id
    }

    pub fn operator_address(&self) -> Address {
        self.signer.address()
    }

    async fn rpc_call(&self, method: &str, params: Value) -> Result<Value, LedgerError> {
        let body = serde_json::to_vec(&json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        }))
        .map_err(|error| LedgerError::InvalidResponse {
            method: method.to_string(),
            reason: format!("failed to serialize request: {error}"),
        })?;

        let raw = self.transport.post_json(self.network.rpc_url(), body).await?;
        let mut value: Value =
            serde_json::from_slice(&raw).map_err(|error| LedgerError::InvalidResponse {
                method: method.to_string(),
                reason: format!("response was not JSON: {error}"),
            })?;
        if let Some(error) = value.get("error") {
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string());
            return Err(LedgerError::Rpc {
                method: method.to_string(),
                message,
            });
        }
        value
            .get_mut("result")
            .map(Value::take)
            .ok_or_else(|| LedgerError::InvalidResponse {
                method: method.to_string(),
                reason: "result was missing".to_string(),
            })
    }

    async fn rpc_quantity(&self, method: &str, params: Value) -> Result<U256, LedgerError> {
        let result = self.rpc_call(method, params).await?;
        let raw = result.as_str().ok_or_else(|| LedgerError::InvalidResponse {
            method: method.to_string(),
            reason: "result was not a hex string".to_string(),
        })?;
        parse_hex_u256(raw).map_err(|reason| LedgerError::InvalidResponse {
            method: method.to_string(),
            reason,
        })
    }

    pub async fn transaction_count(&self, address: Address) -> Result<U256, LedgerError> {
        self.rpc_quantity(
            "eth_getTransactionCount",
            json!([format!("{address:#x}"), "pending"]),
        )
        .await
    }

    pub async fn gas_price(&self) -> Result<U256, LedgerError> {
        self.rpc_quantity("eth_gasPrice", json!([])).await
    }

    pub async fn send_raw_transaction(&self, raw_hex: &str) -> Result<String, LedgerError> {
        let result = self
            .rpc_call("eth_sendRawTransaction", json!([raw_hex]))
            .await?;
        result
            .as_str()
            .map(str::to_ascii_lowercase)
            .ok_or_else(|| LedgerError::InvalidResponse {
                method: "eth_sendRawTransaction".to_string(),
                reason: "result was not a transaction hash".to_string(),
            })
    }

    pub async fn transaction_receipt(
        &self,
        transaction_hash: &str,
    ) -> Result<Option<TransactionReceipt>, LedgerError> {
        let result = self
            .rpc_call("eth_getTransactionReceipt", json!([transaction_hash]))
            .await?;
        if result.is_null() {
            return Ok(None);
        }
        serde_json::from_value(result)
            .map(Some)
            .map_err(|error| LedgerError::InvalidResponse {
                method: "eth_getTransactionReceipt".to_string(),
                reason: error.to_string(),
            })
    }

    pub async fn wait_for_receipt(
        &self,
        transaction_hash: &str,
    ) -> Result<TransactionReceipt, LedgerError> {
        for attempt in 1..=RECEIPT_POLL_MAX_ATTEMPTS {
            if let Some(receipt) = self.transaction_receipt(transaction_hash).await? {
                debug!(transaction_hash, attempt, "receipt available");
                return Ok(receipt);
            }
            tokio::time::sleep(Duration::from_millis(RECEIPT_POLL_INTERVAL_MS)).await;
        }
        warn!(
            transaction_hash,
            attempts = RECEIPT_POLL_MAX_ATTEMPTS,
            "receipt not available"
        );
        Err(LedgerError::ReceiptTimeout {
            transaction_id: transaction_hash.to_string(),
            attempts: RECEIPT_POLL_MAX_ATTEMPTS,
        })
    }

    /// Fills nonce and fees, signs, broadcasts and waits for the receipt.
    ///
    /// Nonce assignment and broadcast are serialized across callers sharing
    /// this client; only the receipt wait runs concurrently.
    pub async fn submit(
        &self,
        request: TransactionRequest,
    ) -> Result<TransactionReceipt, LedgerError> {
        let (transaction_hash, nonce) = {
            let mut next_nonce = self.next_nonce.lock().await;
            let nonce = match *next_nonce {
                Some(nonce) => nonce,
                None => {
                    let seeded = self.transaction_count(self.signer.address()).await?;
                    debug!(nonce = %seeded, "operator nonce seeded from relay");
                    *next_nonce = Some(seeded);
                    seeded
                }
            };
            let gas_price = self.gas_price().await?;
            let max_fee_per_gas =
                gas_price.saturating_add(gas_price / U256::from(GAS_PRICE_HEADROOM_DIVISOR));
            let tx = Eip1559UnsignedTx {
                chain_id: U256::from(self.network.chain_id()),
                nonce,
                max_priority_fee_per_gas: U256::ZERO,
                max_fee_per_gas,
                gas_limit: U256::from(request.gas_limit),
                to: request.to,
                value: tinybars_to_weibar(request.value_tinybars),
                data: Bytes::from(request.data),
            };
            let signed = self.signer.sign_eip1559(&tx)?;
            let transaction_hash = match self.send_raw_transaction(&signed.raw_hex()).await {
                Ok(hash) => hash,
                Err(error) => {
                    *next_nonce = None;
                    warn!(nonce = %nonce, %error, "broadcast rejected; nonce will be re-read");
                    return Err(error);
                }
            };
            *next_nonce = Some(nonce + U256::from(1u8));
            if transaction_hash != signed.hash_hex() {
                warn!(
                    relay_hash = %transaction_hash,
                    local_hash = %signed.hash_hex(),
                    "relay reported a different transaction hash"
                );
            }
            (transaction_hash, nonce)
        };
        info!(
            network = self.network.name(),
            %transaction_hash,
            nonce = %nonce,
            "transaction submitted"
        );
        self.wait_for_receipt(&transaction_hash).await
    }
}

fn parse_hex_u256(raw: &str) -> Result<U256, String> {
    let trimmed = raw.trim();
    let without_prefix = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .ok_or_else(|| format!("`{trimmed}` must be 0x-prefixed hex"))?;
    if without_prefix.is_empty() {
        return Ok(U256::ZERO);
    }
    if without_prefix.len() > 64 {
        return Err(format!("`{trimmed}` exceeds 32 bytes"));
    }
    U256::from_str_radix(without_prefix, 16)
        .map_err(|error| format!("failed to parse `{trimmed}` as hex: {error}"))
}

// ── Memoized handle ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct HederaClientSettings {
    pub network: String,
    pub operator_id: String,
    pub operator_key: String,
}

impl fmt::Debug for HederaClientSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HederaClientSettings")
            .field("network", &self.network)
            .field("operator_id", &self.operator_id)
            .field("operator_key", &"<redacted>")
            .finish()
    }
}

/// Lazily builds one [`RelayClient`] and hands out shared references to it.
/// Construction errors are returned to the caller and retried on next use.
pub struct HederaClientHandle {
    settings: HederaClientSettings,
    transport: Arc<dyn JsonRpcTransport>,
    client: OnceCell<Arc<RelayClient>>,
}

impl fmt::Debug for HederaClientHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HederaClientHandle")
            .field("settings", &self.settings)
            .field("initialized", &self.is_initialized())
            .finish_non_exhaustive()
    }
}

impl HederaClientHandle {
    pub fn new(settings: HederaClientSettings) -> Self {
        Self::with_transport(settings, Arc::new(UreqTransport::default()))
    }

    pub fn with_transport(
        settings: HederaClientSettings,
        transport: Arc<dyn JsonRpcTransport>,
    ) -> Self {
        Self {
            settings,
            transport,
            client: OnceCell::new(),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.client.initialized()
    }

    pub async fn client(&self) -> Result<Arc<RelayClient>, LedgerError> {
        self.client
            .get_or_try_init(|| async {
                let network = HederaNetwork::parse(&self.settings.network)?;
                let operator_id = EntityId::from_str(&self.settings.operator_id)?;
                let signer = OperatorSigner::from_hex(&self.settings.operator_key)?;
                info!(
                    network = network.name(),
                    rpc_url = network.rpc_url(),
                    %operator_id,
                    operator_address = %signer.address(),
                    "hedera relay client initialised"
                );
                Ok::<_, LedgerError>(Arc::new(RelayClient::new(
                    network,
                    operator_id,
                    signer,
                    Arc::clone(&self.transport),
                )))
            })
            .await
            .map(Arc::clone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEV_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn named_networks_parse_case_insensitively() {
        assert_eq!(
            HederaNetwork::parse(" TestNet ").expect("testnet should parse"),
            HederaNetwork::Testnet
        );
        assert_eq!(
            HederaNetwork::parse("mainnet").expect("mainnet should parse").chain_id(),
            295
        );
        assert_eq!(
            HederaNetwork::parse("previewnet")
                .expect("previewnet should parse")
                .rpc_url(),
            "https://previewnet.hashio.io/api"
        );
    }

    #[test]
    fn custom_network_is_read_from_json() {
        let network = HederaNetwork::parse(r#"{"rpcUrl":"http://localhost:7546","chainId":298}"#)
            .expect("custom network should parse");
        assert_eq!(network.rpc_url(), "http://localhost:7546");
        assert_eq!(network.chain_id(), 298);
    }

    #[test]
    fn unknown_network_is_rejected() {
        for raw in ["devnet", "", "{}", r#"{"rpcUrl":"","chainId":1}"#] {
            let error = HederaNetwork::parse(raw).expect_err("unknown network should fail");
            assert!(error.to_string().starts_with("Unsupported Hedera network value"));
        }
    }

    #[test]
    fn entity_id_maps_to_long_zero_address_and_back() {
        let id: EntityId = "0.0.123456".parse().expect("entity id should parse");
        let address = id.to_evm_address();
        assert_eq!(
            format!("{address:#x}"),
            "0x000000000000000000000000000000000001e240"
        );
        assert_eq!(EntityId::from_long_zero(&address), Some(id));
        assert_eq!(id.to_string(), "0.0.123456");
    }

    #[test]
    fn ecdsa_alias_addresses_have_no_entity_id() {
        let alias = normalize_address("0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266")
            .expect("address should parse");
        assert_eq!(EntityId::from_long_zero(&alias), None);
    }

    #[test]
    fn malformed_entity_ids_are_rejected() {
        for raw in ["0.0", "0.0.1.2", "a.b.c", "0..1", "-1.0.1", "0.0.1x"] {
            assert!(raw.parse::<EntityId>().is_err(), "{raw} should not parse");
        }
    }

    #[test]
    fn resolve_address_accepts_both_notations() {
        let from_id = resolve_address("0.0.1001").expect("entity id should resolve");
        let from_hex = resolve_address("0x00000000000000000000000000000000000003E9")
            .expect("hex address should resolve");
        assert_eq!(from_id, from_hex);
        assert!(resolve_address("0x1234").is_err());
    }

    #[test]
    fn tinybars_scale_to_weibar() {
        assert_eq!(
            tinybars_to_weibar(600_000_000),
            U256::from(6_000_000_000_000_000_000u128)
        );
    }

    #[test]
    fn receipt_status_one_is_success() {
        let receipt: TransactionReceipt = serde_json::from_value(json!({
            "transactionHash": "0xabc",
            "status": "0x1",
            "contractAddress": null
        }))
        .expect("receipt should parse");
        assert!(receipt.succeeded());

        let reverted = TransactionReceipt {
            status: Some("0x0".to_string()),
            ..receipt
        };
        assert!(!reverted.succeeded());
    }

    #[test]
    fn hex_quantities_parse() {
        assert_eq!(parse_hex_u256("0x0").expect("zero should parse"), U256::ZERO);
        assert_eq!(parse_hex_u256("0x").expect("empty should parse"), U256::ZERO);
        assert_eq!(
            parse_hex_u256("0xa5").expect("value should parse"),
            U256::from(165u64)
        );
        assert!(parse_hex_u256("a5").is_err());
    }

    #[test]
    fn settings_debug_redacts_operator_key() {
        let settings = HederaClientSettings {
            network: "testnet".to_string(),
            operator_id: "0.0.2".to_string(),
            operator_key: DEV_KEY.to_string(),
        };
        let rendered = format!("{settings:?}");
        assert!(!rendered.contains(DEV_KEY));
        assert!(rendered.contains("<redacted>"));
    }
}
