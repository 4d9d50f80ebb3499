//! Solana primitives for the token sender.
//!
//! This crate handles Solana addresses, secret-key parsing, manual
//! transaction wire format serialization, SPL token instructions and
//! associated token account derivation, without pulling in `solana-sdk`.
//!
//! The compact binary wire format is implemented by hand, using
//! `ed25519-dalek` for Ed25519 signing and `bs58` for Base58 encoding.
//! Nothing in here touches the network.

pub mod address;
pub mod error;
pub mod keypair;
pub mod spl_token;
pub mod transaction;

pub use address::{address_to_bytes, bytes_to_address, validate_address};
pub use error::SolError;
pub use keypair::{parse_secret_key, ParsedKey, SolKeypair};
pub use spl_token::{
    build_create_associated_token_account, build_spl_transfer, derive_associated_token_address,
    ASSOCIATED_TOKEN_PROGRAM_ID, NATIVE_MINT, TOKEN_PROGRAM_ID,
};
pub use transaction::{
    build_system_transfer_instruction, compile_transaction, encode_compact_u16,
    serialize_message, sign_transaction, CompiledInstruction, SignedTransaction,
    SolAccountMeta, SolInstruction, SolTransaction, SYSTEM_PROGRAM_ID,
};
