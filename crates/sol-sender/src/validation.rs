//! Input validators.
//!
//! Each validator returns a [`ValidationError`] whose `Display` text is the
//! message shown at the prompt, so the shell can re-ask without further
//! formatting. [`validate_send_token_options`] is the last guard before a
//! transaction is built and covers callers that skip the prompts.

use chain_sol::{address, keypair, SolKeypair};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter a valid Solana public key")]
    InvalidPublicKey,

    #[error("Please enter a valid positive number")]
    InvalidAmount,

    #[error("Please enter a valid token mint address")]
    InvalidMintAddress,

    #[error("{0}")]
    InvalidSecretKey(String),

    #[error("Invalid sender keypair")]
    MissingKeypair,

    #[error("Invalid receiver public key")]
    MissingReceiver,

    #[error("Amount must be greater than 0")]
    NonPositiveAmount,

    #[error("Invalid mint address")]
    InvalidMint,
}

pub fn validate_address(input: &str) -> Result<(), ValidationError> {
    address::validate_address(input).map_err(|_| ValidationError::InvalidPublicKey)
}

pub fn validate_mint_address(input: &str) -> Result<(), ValidationError> {
    address::validate_address(input).map_err(|_| ValidationError::InvalidMintAddress)
}

pub fn validate_amount(input: &str) -> Result<(), ValidationError> {
    parse_amount(input).map(|_| ())
}

/// Parse a positive, finite amount.
pub fn parse_amount(input: &str) -> Result<f64, ValidationError> {
    match input.trim().parse::<f64>() {
        Ok(amount) if amount.is_finite() && amount > 0.0 => Ok(amount),
        _ => Err(ValidationError::InvalidAmount),
    }
}

pub fn validate_secret_key(input: &str) -> Result<(), ValidationError> {
    keypair::parse_secret_key(input)
        .map(|_| ())
        .map_err(|e| ValidationError::InvalidSecretKey(e.to_string()))
}

/// Final precondition check, run right before building the transaction.
pub fn validate_send_token_options(
    keypair: Option<&SolKeypair>,
    receiver: Option<&[u8; 32]>,
    amount: f64,
    mint: &str,
) -> Result<(), ValidationError> {
    if keypair.is_none() {
        return Err(ValidationError::MissingKeypair);
    }
    if receiver.is_none() {
        return Err(ValidationError::MissingReceiver);
    }
    if !amount.is_finite() || amount <= 0.0 {
        return Err(ValidationError::NonPositiveAmount);
    }
    address::validate_address(mint).map_err(|_| ValidationError::InvalidMint)
}
