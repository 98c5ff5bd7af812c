use crate::errors::LedgerError;
use alloy_primitives::{keccak256, Address, U256};

const WORD_BYTES: usize = 32;

/// A single Solidity argument of a funding contract call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContractParam {
    String(String),
    Address(Address),
    Int64(i64),
    Uint256(U256),
    Bool(bool),
    Bytes32([u8; 32]),
}

impl ContractParam {
    pub fn solidity_type(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Address(_) => "address",
            Self::Int64(_) => "int64",
            Self::Uint256(_) => "uint256",
            Self::Bool(_) => "bool",
            Self::Bytes32(_) => "bytes32",
        }
    }

    fn is_dynamic(&self) -> bool {
        matches!(self, Self::String(_))
    }
}

/// Ordered argument list, built the same way a Hedera SDK caller would.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContractFunctionParameters {
    params: Vec<ContractParam>,
}

impl ContractFunctionParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_string(mut self, value: impl Into<String>) -> Self {
        self.params.push(ContractParam::String(value.into()));
        self
    }

    pub fn add_address(mut self, value: Address) -> Self {
        self.params.push(ContractParam::Address(value));
        self
    }

    pub fn add_int64(mut self, value: i64) -> Self {
        self.params.push(ContractParam::Int64(value));
        self
    }

    pub fn add_uint256(mut self, value: U256) -> Self {
        self.params.push(ContractParam::Uint256(value));
        self
    }

    pub fn add_bool(mut self, value: bool) -> Self {
        self.params.push(ContractParam::Bool(value));
        self
    }

    pub fn add_bytes32(mut self, value: [u8; 32]) -> Self {
        self.params.push(ContractParam::Bytes32(value));
        self
    }

    pub fn params(&self) -> &[ContractParam] {
        &self.params
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn solidity_types(&self) -> Vec<&'static str> {
        self.params.iter().map(ContractParam::solidity_type).collect()
    }
}

pub fn canonical_signature(
    function_name: &str,
    params: &ContractFunctionParameters,
) -> Result<String, LedgerError> {
    let trimmed_name = function_name.trim();
    let valid = !trimmed_name.is_empty()
        && !trimmed_name.starts_with(|c: char| c.is_ascii_digit())
        && trimmed_name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
    if !valid {
        return Err(LedgerError::InvalidFunction {
            name: function_name.to_string(),
        });
    }
    Ok(format!(
        "{trimmed_name}({})",
        params.solidity_types().join(",")
    ))
}

/// First four bytes of `keccak256(signature)`.
pub fn function_selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    let mut selector = [0u8; 4];
    selector.copy_from_slice(&hash.as_slice()[..4]);
    selector
}

pub fn selector_hex(signature: &str) -> String {
    format!("0x{}", hex::encode(function_selector(signature)))
}

/// Calldata for `function_name(params)`: selector followed by the ABI-encoded
/// arguments.
pub fn encode_function_call(
    function_name: &str,
    params: &ContractFunctionParameters,
) -> Result<Vec<u8>, LedgerError> {
    let signature = canonical_signature(function_name, params)?;
    let encoded = encode_params(params.params());
    let mut out = Vec::with_capacity(4 + encoded.len());
    out.extend_from_slice(&function_selector(&signature));
    out.extend_from_slice(&encoded);
    Ok(out)
}

/// Contract-creation input: init bytecode followed by the encoded constructor
/// arguments.
pub fn encode_constructor_call(bytecode: &[u8], params: &ContractFunctionParameters) -> Vec<u8> {
    let encoded = encode_params(params.params());
    let mut out = Vec::with_capacity(bytecode.len() + encoded.len());
    out.extend_from_slice(bytecode);
    out.extend_from_slice(&encoded);
    out
}

/// Head/tail layout. Every supported static type fills one word, so the head
/// is exactly one word per argument and tail offsets follow from that.
pub fn encode_params(params: &[ContractParam]) -> Vec<u8> {
    let head_size_bytes = params.len() * WORD_BYTES;
    let mut head = Vec::with_capacity(head_size_bytes);
    let mut tail = Vec::new();

    for param in params {
        if param.is_dynamic() {
            let offset = head_size_bytes + tail.len();
            head.extend_from_slice(&encode_u256_word(U256::from(offset)));
            tail.extend_from_slice(&encode_dynamic(param));
        } else {
            head.extend_from_slice(&encode_static_word(param));
        }
    }

    head.extend_from_slice(&tail);
    head
}

fn encode_dynamic(param: &ContractParam) -> Vec<u8> {
    match param {
        ContractParam::String(text) => encode_dynamic_bytes(text.as_bytes()),
        other => encode_static_word(other).to_vec(),
    }
}

fn encode_static_word(param: &ContractParam) -> [u8; 32] {
    match param {
        ContractParam::Address(address) => {
            let mut word = [0u8; 32];
            word[12..].copy_from_slice(address.as_slice());
            word
        }
        ContractParam::Int64(value) => {
            // Two's complement, sign-extended to the full word.
            let fill = if *value < 0 { 0xff } else { 0x00 };
            let mut word = [fill; 32];
            word[24..].copy_from_slice(&value.to_be_bytes());
            word
        }
        ContractParam::Uint256(value) => encode_u256_word(*value),
        ContractParam::Bool(value) => encode_u256_word(U256::from(u8::from(*value))),
        ContractParam::Bytes32(bytes) => *bytes,
        ContractParam::String(_) => [0u8; 32],
    }
}

/// Length word followed by the payload zero-padded to a word boundary.
fn encode_dynamic_bytes(bytes: &[u8]) -> Vec<u8> {
    let padding = (WORD_BYTES - bytes.len() % WORD_BYTES) % WORD_BYTES;
    let mut out = Vec::with_capacity(WORD_BYTES + bytes.len() + padding);
    out.extend_from_slice(&encode_u256_word(U256::from(bytes.len())));
    out.extend_from_slice(bytes);
    out.resize(out.len() + padding, 0);
    out
}

fn encode_u256_word(value: U256) -> [u8; 32] {
    value.to_be_bytes::<32>()
}
