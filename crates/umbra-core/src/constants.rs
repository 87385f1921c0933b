//! Protocol-wide constants for Umbra.

/// Length in bytes of a SEC-1 compressed secp256k1 point.
///
/// One tag byte (`0x02` or `0x03`) followed by the 32-byte X coordinate.
pub const COMMITMENT_LEN: usize = 33;

/// Length in bytes of a big-endian blinding scalar.
pub const BLINDING_LEN: usize = 32;
