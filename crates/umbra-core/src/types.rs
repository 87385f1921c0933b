// Wire-visible. Field order is part of the borsh encoding.
//! Canonical protocol types for Umbra.
//!
//! This module defines the entity identifiers, byte-string newtypes, and
//! transaction payloads shared across the workspace. All types here must
//! remain backward-compatible once released.

use crate::constants::*;
use borsh::{BorshDeserialize, BorshSerialize};
use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Errors related to parsing, validation, or construction of core types.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Hex string had an unexpected byte length.
    #[error("invalid hex length: expected {expected} bytes, got {got} bytes")]
    InvalidHexLength {
        /// Expected number of bytes.
        expected: usize,
        /// Actual number of bytes provided.
        got: usize,
    },

    /// Hex decoding failed.
    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    /// Commitment bytes do not describe a usable curve point.
    #[error("invalid commitment: {0}")]
    InvalidCommitment(&'static str),

    /// Blinding bytes do not describe a usable non-zero scalar.
    #[error("invalid blinding: {0}")]
    InvalidBlinding(&'static str),

    /// A value violated protocol constraints.
    #[error("invalid value: {0}")]
    InvalidValue(&'static str),
}

/// Identifier of a token: `(shard, realm, num)`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, BorshSerialize, BorshDeserialize)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TokenId {
    /// Shard number.
    pub shard: u64,
    /// Realm number.
    pub realm: u64,
    /// Entity number within the realm.
    pub num: u64,
}

impl TokenId {
    /// Constructs a token id from its three components.
    pub const fn new(shard: u64, realm: u64, num: u64) -> Self {
        Self { shard, realm, num }
    }

    /// Constructs a token id in the default shard and realm.
    pub const fn from_num(num: u64) -> Self {
        Self::new(0, 0, num)
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.shard, self.realm, self.num)
    }
}

impl FromStr for TokenId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (shard, realm, num) = parse_entity_id(s)?;
        Ok(Self { shard, realm, num })
    }
}

/// Identifier of an account: `(shard, realm, num)`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, BorshSerialize, BorshDeserialize)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AccountId {
    /// Shard number.
    pub shard: u64,
    /// Realm number.
    pub realm: u64,
    /// Entity number within the realm.
    pub num: u64,
}

impl AccountId {
    /// Constructs an account id from its three components.
    pub const fn new(shard: u64, realm: u64, num: u64) -> Self {
        Self { shard, realm, num }
    }

    /// Constructs an account id in the default shard and realm.
    pub const fn from_num(num: u64) -> Self {
        Self::new(0, 0, num)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.shard, self.realm, self.num)
    }
}

impl FromStr for AccountId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (shard, realm, num) = parse_entity_id(s)?;
        Ok(Self { shard, realm, num })
    }
}

fn parse_entity_id(s: &str) -> Result<(u64, u64, u64), CoreError> {
    let mut parts = s.split('.');
    let mut next = || -> Result<u64, CoreError> {
        parts
            .next()
            .ok_or(CoreError::InvalidValue("entity id needs shard.realm.num"))?
            .parse::<u64>()
            .map_err(|_| CoreError::InvalidValue("entity id component is not a number"))
    };
    let shard = next()?;
    let realm = next()?;
    let num = next()?;
    if parts.next().is_some() {
        return Err(CoreError::InvalidValue("entity id has trailing components"));
    }
    Ok((shard, realm, num))
}

/// Commitment bytes as referenced on the wire and in the registry.
///
/// A well-formed commitment is the SEC-1 compressed encoding of a
/// non-infinity secp256k1 point ([`COMMITMENT_LEN`] bytes), but callers
/// treat the bytes as opaque until verification decodes them.
#[derive(Clone, PartialEq, Eq, Hash, BorshSerialize, BorshDeserialize)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Commitment(pub Vec<u8>);

impl Commitment {
    /// Constructs a commitment from raw bytes.
    pub fn from_slice(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }

    /// Returns the underlying bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Number of bytes in the commitment.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the commitment carries no bytes at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Commitment({})", hex::encode(&self.0))
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0))
    }
}

impl FromStr for Commitment {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        Ok(Self(hex::decode(s)?))
    }
}

/// A big-endian blinding scalar as held by the minter of a note.
#[derive(Clone, Copy, PartialEq, Eq, Hash, BorshSerialize, BorshDeserialize)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Blinding(pub [u8; BLINDING_LEN]);

impl Blinding {
    /// Returns the underlying byte array.
    pub const fn as_bytes(&self) -> &[u8; BLINDING_LEN] {
        &self.0
    }
}

impl fmt::Debug for Blinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Blinding({})", hex::encode(self.0))
    }
}

impl fmt::Display for Blinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl From<[u8; BLINDING_LEN]> for Blinding {
    fn from(value: [u8; BLINDING_LEN]) -> Self {
        Self(value)
    }
}

impl FromStr for Blinding {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s)?;
        if bytes.len() != BLINDING_LEN {
            return Err(CoreError::InvalidHexLength {
                expected: BLINDING_LEN,
                got: bytes.len(),
            });
        }
        let mut arr = [0u8; BLINDING_LEN];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

/// Token classification.
///
/// Only [`TokenType::FungiblePrivate`] tokens participate in private
/// transfers.
#[derive(Clone, Copy, PartialEq, Eq, Debug, BorshSerialize, BorshDeserialize)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TokenType {
    /// Ordinary fungible token with public balances.
    FungibleCommon,
    /// Non-fungible token.
    NonFungibleUnique,
    /// Fungible token whose balances live in confidential notes.
    FungiblePrivate,
}

/// The token record as read from the external token store.
#[derive(Clone, PartialEq, Eq, Debug, BorshSerialize, BorshDeserialize)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Token {
    /// Identifier of the token.
    pub token_id: TokenId,
    /// Classification of the token.
    pub token_type: TokenType,
    /// KYC key, when per-account authorization is required.
    pub kyc_key: Option<Vec<u8>>,
}

impl Token {
    /// Whether participating accounts must hold a KYC grant.
    pub fn has_kyc_key(&self) -> bool {
        self.kyc_key.is_some()
    }
}

/// An account's association with a token, as read from the relation store.
#[derive(Clone, Copy, PartialEq, Eq, Debug, BorshSerialize, BorshDeserialize)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TokenRelation {
    /// The associated account.
    pub account_id: AccountId,
    /// The associated token.
    pub token_id: TokenId,
    /// Whether KYC has been granted for this association.
    pub kyc_granted: bool,
}

/// A single output of a private transfer: a commitment and its new owner.
#[derive(Clone, PartialEq, Eq, Debug, BorshSerialize, BorshDeserialize)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OutputCommitment {
    /// Account that will own the emitted note. Optional on the wire;
    /// the handler rejects outputs without one.
    pub owner: Option<AccountId>,
    /// Commitment bytes of the emitted note.
    pub commitment: Commitment,
}

/// Payload of a private fungible-token transfer.
#[derive(Clone, PartialEq, Eq, Debug, BorshSerialize, BorshDeserialize)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PrivateTokenTransferBody {
    /// The token whose notes move.
    pub token: TokenId,
    /// Commitments of the notes being consumed, in order.
    pub inputs: Vec<Commitment>,
    /// Notes being emitted, in order.
    pub outputs: Vec<OutputCommitment>,
    /// Opaque proof blob. Not interpreted; only its size is observed.
    pub zk_proof: Vec<u8>,
}

/// The transaction body as delivered by the host framework.
#[derive(Clone, PartialEq, Eq, Debug, Default, BorshSerialize, BorshDeserialize)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TransactionBody {
    /// Private-token-transfer payload, when this transaction carries one.
    pub private_token_transfer: Option<PrivateTokenTransferBody>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_ids_render_dotted() {
        assert_eq!(TokenId::from_num(9090).to_string(), "0.0.9090");
        assert_eq!(AccountId::new(1, 2, 3).to_string(), "1.2.3");
    }

    #[test]
    fn entity_ids_parse_dotted() {
        let id: TokenId = "0.0.9090".parse().unwrap();
        assert_eq!(id, TokenId::from_num(9090));
        assert!("0.0".parse::<TokenId>().is_err());
        assert!("0.0.1.2".parse::<AccountId>().is_err());
        assert!("a.b.c".parse::<AccountId>().is_err());
    }

    #[test]
    fn commitment_hex_round_trip() {
        let commitment: Commitment = "0x0102ff".parse().unwrap();
        assert_eq!(commitment.as_bytes(), &[0x01, 0x02, 0xff]);
        assert_eq!(commitment.to_string(), "0102ff");
    }

    #[test]
    fn blinding_requires_exact_length() {
        assert!("01".repeat(BLINDING_LEN).parse::<Blinding>().is_ok());
        assert!("01".repeat(BLINDING_LEN - 1).parse::<Blinding>().is_err());
    }

    #[test]
    fn kyc_key_presence_is_visible() {
        let mut token = Token {
            token_id: TokenId::from_num(1),
            token_type: TokenType::FungiblePrivate,
            kyc_key: None,
        };
        assert!(!token.has_kyc_key());
        token.kyc_key = Some(vec![0xaa]);
        assert!(token.has_kyc_key());
    }
}
