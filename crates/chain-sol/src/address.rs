//! Solana address encoding and validation.
//!
//! Solana addresses are Base58-encoded 32-byte values: either Ed25519
//! public keys or program-derived addresses. Validation is purely structural;
//! nothing here checks that an account exists on-chain.

use crate::error::SolError;

/// Validate a Solana address string.
///
/// A valid address is a Base58 string that decodes to exactly 32 bytes.
pub fn validate_address(address: &str) -> Result<(), SolError> {
    address_to_bytes(address).map(|_| ())
}

/// Decode a Solana address string to its 32-byte representation.
///
/// Surrounding whitespace is ignored, which matters for pasted input.
pub fn address_to_bytes(address: &str) -> Result<[u8; 32], SolError> {
    let bytes = bs58::decode(address.trim())
        .into_vec()
        .map_err(|e| SolError::InvalidAddress(format!("base58 decode failed: {e}")))?;

    let arr: [u8; 32] = bytes.try_into().map_err(|v: Vec<u8>| {
        SolError::InvalidAddress(format!("expected 32 bytes, got {}", v.len()))
    })?;

    Ok(arr)
}

/// Encode 32 bytes as a Solana address (Base58 string).
pub fn bytes_to_address(bytes: &[u8; 32]) -> String {
    bs58::encode(bytes).into_string()
}
