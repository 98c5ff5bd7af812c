use crate::errors::LedgerError;
use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
use alloy_rlp::{length_of_length, BufMut, Encodable, Header, EMPTY_STRING_CODE};
use k256::ecdsa::SigningKey;
use sha3::{Digest, Keccak256};
use std::fmt;

const EMPTY_ACCESS_LIST_RLP_LEN: usize = 1;
const EIP1559_TX_TYPE: u8 = 0x02;
const PRIVATE_KEY_BYTES: usize = 32;
const DER_KEY_HEX_PREFIX: &str = "3030";

/// Unsigned type-2 transaction. `to: None` is a contract creation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Eip1559UnsignedTx {
    pub chain_id: U256,
    pub nonce: U256,
    pub max_priority_fee_per_gas: U256,
    pub max_fee_per_gas: U256,
    pub gas_limit: U256,
    pub to: Option<Address>,
    pub value: U256,
    pub data: Bytes,
}

impl Eip1559UnsignedTx {
    fn fields_length(&self) -> usize {
        self.chain_id.length()
            + self.nonce.length()
            + self.max_priority_fee_per_gas.length()
            + self.max_fee_per_gas.length()
            + self.gas_limit.length()
            + to_length(&self.to)
            + self.value.length()
            + self.data.length()
            + EMPTY_ACCESS_LIST_RLP_LEN
    }

    fn encode_fields(&self, out: &mut dyn BufMut) {
        self.chain_id.encode(out);
        self.nonce.encode(out);
        self.max_priority_fee_per_gas.encode(out);
        self.max_fee_per_gas.encode(out);
        self.gas_limit.encode(out);
        encode_to(&self.to, out);
        self.value.encode(out);
        self.data.encode(out);
        Header {
            list: true,
            payload_length: 0,
        }
        .encode(out);
    }

    /// Hash the operator signs: `keccak256(0x02 || rlp(fields))`.
    pub fn signing_hash(&self) -> B256 {
        keccak256(encode_eip1559_unsigned(self))
    }
}

impl Encodable for Eip1559UnsignedTx {
    fn encode(&self, out: &mut dyn BufMut) {
        Header {
            list: true,
            payload_length: self.fields_length(),
        }
        .encode(out);
        self.encode_fields(out);
    }

    fn length(&self) -> usize {
        let payload_length = self.fields_length();
        payload_length + length_of_length(payload_length)
    }
}

struct Eip1559SignedTx<'a> {
    tx: &'a Eip1559UnsignedTx,
    y_parity: u8,
    r: U256,
    s: U256,
}

impl Eip1559SignedTx<'_> {
    fn payload_length(&self) -> usize {
        self.tx.fields_length() + self.y_parity.length() + self.r.length() + self.s.length()
    }
}

impl Encodable for Eip1559SignedTx<'_> {
    fn encode(&self, out: &mut dyn BufMut) {
        Header {
            list: true,
            payload_length: self.payload_length(),
        }
        .encode(out);
        self.tx.encode_fields(out);
        self.y_parity.encode(out);
        self.r.encode(out);
        self.s.encode(out);
    }

    fn length(&self) -> usize {
        let payload_length = self.payload_length();
        payload_length + length_of_length(payload_length)
    }
}

fn to_length(to: &Option<Address>) -> usize {
    match to {
        Some(address) => address.length(),
        None => 1,
    }
}

fn encode_to(to: &Option<Address>, out: &mut dyn BufMut) {
    match to {
        Some(address) => address.encode(out),
        None => out.put_u8(EMPTY_STRING_CODE),
    }
}

fn encode_eip1559_unsigned(tx: &Eip1559UnsignedTx) -> Vec<u8> {
    let payload = alloy_rlp::encode(tx);
    let mut out = Vec::with_capacity(1 + payload.len());
    out.push(EIP1559_TX_TYPE);
    out.extend_from_slice(&payload);
    out
}

fn encode_eip1559_signed(tx: &Eip1559UnsignedTx, y_parity: u8, r: U256, s: U256) -> Vec<u8> {
    let payload = alloy_rlp::encode(Eip1559SignedTx { tx, y_parity, r, s });
    let mut out = Vec::with_capacity(1 + payload.len());
    out.push(EIP1559_TX_TYPE);
    out.extend_from_slice(&payload);
    out
}

/// Signed, broadcast-ready transaction bytes plus their hash.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedTransaction {
    pub raw: Vec<u8>,
    pub hash: B256,
}

impl SignedTransaction {
    pub fn raw_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.raw))
    }

    pub fn hash_hex(&self) -> String {
        format!("0x{}", hex::encode(self.hash.as_slice()))
    }
}

/// secp256k1 operator key used to sign relay transactions.
#[derive(Clone)]
pub struct OperatorSigner {
    key: SigningKey,
    address: Address,
}

impl fmt::Debug for OperatorSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperatorSigner")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl OperatorSigner {
    /// Accepts raw hex (optionally `0x`-prefixed) or a DER-encoded hex key, in
    /// which case the trailing 32 bytes are the scalar.
    pub fn from_hex(raw: &str) -> Result<Self, LedgerError> {
        let trimmed = raw.trim();
        let without_prefix = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        let decoded = hex::decode(without_prefix).map_err(|error| LedgerError::InvalidOperatorKey {
            reason: format!("key must be hex: {error}"),
        })?;
        let scalar = if decoded.len() == PRIVATE_KEY_BYTES {
            decoded.as_slice()
        } else if decoded.len() > PRIVATE_KEY_BYTES
            && without_prefix.to_ascii_lowercase().starts_with(DER_KEY_HEX_PREFIX)
        {
            &decoded[decoded.len() - PRIVATE_KEY_BYTES..]
        } else {
            return Err(LedgerError::InvalidOperatorKey {
                reason: format!(
                    "expected {PRIVATE_KEY_BYTES} key bytes or a DER key, got {} bytes",
                    decoded.len()
                ),
            });
        };
        let key = SigningKey::from_slice(scalar).map_err(|error| LedgerError::InvalidOperatorKey {
            reason: format!("not a valid secp256k1 key: {error}"),
        })?;
        let address = address_of(&key);
        Ok(Self { key, address })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn sign_eip1559(&self, tx: &Eip1559UnsignedTx) -> Result<SignedTransaction, LedgerError> {
        let signing_hash = tx.signing_hash();
        let (signature, recovery_id) = self
            .key
            .sign_prehash_recoverable(signing_hash.as_slice())
            .map_err(|error| LedgerError::InvalidOperatorKey {
                reason: format!("failed to sign transaction: {error}"),
            })?;
        let (r_bytes, s_bytes) = signature.split_bytes();
        let raw = encode_eip1559_signed(
            tx,
            u8::from(recovery_id.is_y_odd()),
            U256::from_be_slice(&r_bytes),
            U256::from_be_slice(&s_bytes),
        );
        let hash = keccak256(&raw);
        Ok(SignedTransaction { raw, hash })
    }
}

fn address_of(key: &SigningKey) -> Address {
    let uncompressed = key.verifying_key().to_encoded_point(false);
    let digest = Keccak256::digest(&uncompressed.as_bytes()[1..]);
    Address::from_slice(&digest[12..32])
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_rlp::Decodable;
    use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};

    // Well-known development key (Hardhat account #0).
    const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const DEV_ADDRESS: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";

    fn sample_tx(to: Option<Address>) -> Eip1559UnsignedTx {
        Eip1559UnsignedTx {
            chain_id: U256::from(296u64),
            nonce: U256::from(7u64),
            max_priority_fee_per_gas: U256::ZERO,
            max_fee_per_gas: U256::from(710_000_000_000u64),
            gas_limit: U256::from(2_000_000u64),
            to,
            value: U256::from(600_000_000u64) * U256::from(10_000_000_000u64),
            data: Bytes::from(vec![0xde, 0xad, 0xbe, 0xef]),
        }
    }

    #[test]
    fn operator_address_is_derived_from_public_key() {
        let signer = OperatorSigner::from_hex(DEV_KEY).expect("dev key should parse");
        assert_eq!(format!("{:#x}", signer.address()), DEV_ADDRESS);
    }

    #[test]
    fn der_prefixed_key_uses_trailing_scalar() {
        let der = format!(
            "3030020100300706052b8104000a04220420{}",
            DEV_KEY.trim_start_matches("0x")
        );
        let signer = OperatorSigner::from_hex(&der).expect("der key should parse");
        assert_eq!(format!("{:#x}", signer.address()), DEV_ADDRESS);
    }

    #[test]
    fn malformed_keys_are_rejected() {
        for raw in ["", "zz", "0x1234", &"00".repeat(32)] {
            let error = OperatorSigner::from_hex(raw).expect_err("bad key should fail");
            assert!(matches!(error, LedgerError::InvalidOperatorKey { .. }));
        }
    }

    #[test]
    fn unsigned_encoding_is_typed_rlp_list() {
        let tx = sample_tx(Some(Address::repeat_byte(0x33)));
        let encoded = encode_eip1559_unsigned(&tx);
        assert_eq!(encoded[0], EIP1559_TX_TYPE);
        let mut payload = &encoded[1..];
        let header = Header::decode(&mut payload).expect("list header should decode");
        assert!(header.list);
        assert_eq!(header.payload_length, payload.len());
    }

    #[test]
    fn contract_creation_encodes_empty_destination() {
        let call = alloy_rlp::encode(sample_tx(Some(Address::ZERO)));
        let create = alloy_rlp::encode(sample_tx(None));
        assert_eq!(call.len() - create.len(), 20);
    }

    #[test]
    fn signature_recovers_to_operator_address() {
        let signer = OperatorSigner::from_hex(DEV_KEY).expect("dev key should parse");
        let tx = sample_tx(Some(Address::repeat_byte(0x44)));
        let signed = signer.sign_eip1559(&tx).expect("signing should succeed");
        assert_eq!(signed.hash, keccak256(&signed.raw));
        assert!(signed.raw_hex().starts_with("0x02"));

        // y_parity, r and s follow the unsigned fields.
        let mut payload = &signed.raw[1..];
        let header = Header::decode(&mut payload).expect("signed header should decode");
        assert_eq!(header.payload_length, payload.len());
        let unsigned_fields = alloy_rlp::encode(&tx);
        let mut unsigned_payload = unsigned_fields.as_slice();
        let unsigned_header =
            Header::decode(&mut unsigned_payload).expect("unsigned header should decode");
        let mut tail = &payload[unsigned_header.payload_length..];
        let y_parity = u8::decode(&mut tail).expect("y_parity should decode");
        let r = U256::decode(&mut tail).expect("r should decode");
        let s = U256::decode(&mut tail).expect("s should decode");
        assert!(tail.is_empty());

        let mut compact = [0u8; 64];
        compact[..32].copy_from_slice(&r.to_be_bytes::<32>());
        compact[32..].copy_from_slice(&s.to_be_bytes::<32>());
        let signature = Signature::from_slice(&compact).expect("signature should parse");
        let recovery_id = RecoveryId::from_byte(y_parity).expect("recovery id should parse");
        let recovered = VerifyingKey::recover_from_prehash(
            tx.signing_hash().as_slice(),
            &signature,
            recovery_id,
        )
        .expect("public key should recover");
        let uncompressed = recovered.to_encoded_point(false);
        let digest = Keccak256::digest(&uncompressed.as_bytes()[1..]);
        assert_eq!(format!("0x{}", hex::encode(&digest[12..])), DEV_ADDRESS);
    }
}
