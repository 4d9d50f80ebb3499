//! SPL Token instructions for Solana.
//!
//! Implements the SPL Token `Transfer` instruction, the Associated Token
//! Account program's `Create` instruction, and associated token account
//! (ATA) address derivation without the `spl-token` or
//! `spl-associated-token-account` crates.

use sha2::{Digest, Sha256};

use crate::error::SolError;
use crate::transaction::{SolAccountMeta, SolInstruction, SYSTEM_PROGRAM_ID};

// ---------------------------------------------------------------------------
// Well-known program IDs
// ---------------------------------------------------------------------------

/// SPL Token Program ID: `TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA`
pub const TOKEN_PROGRAM_ID: [u8; 32] = [
    0x06, 0xdd, 0xf6, 0xe1, 0xd7, 0x65, 0xa1, 0x93, 0xd9, 0xcb, 0xe1, 0x46, 0xce, 0xeb,
    0x79, 0xac, 0x1c, 0xb4, 0x85, 0xed, 0x5f, 0x5b, 0x37, 0x91, 0x3a, 0x8c, 0xf5, 0x85,
    0x7e, 0xff, 0x00, 0xa9,
];

/// Associated Token Account Program ID: `ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL`
pub const ASSOCIATED_TOKEN_PROGRAM_ID: [u8; 32] = [
    0x8c, 0x97, 0x25, 0x8f, 0x4e, 0x24, 0x89, 0xf1, 0xbb, 0x3d, 0x10, 0x29, 0x14, 0x8e,
    0x0d, 0x83, 0x0b, 0x5a, 0x13, 0x99, 0xda, 0xff, 0x10, 0x84, 0x04, 0x8e, 0x7b, 0xd8,
    0xdb, 0xe9, 0xf8, 0x59,
];

/// Wrapped SOL mint. Selecting it as the "token" means a plain native SOL
/// transfer, not an SPL transfer of wrapped SOL.
pub const NATIVE_MINT: &str = "So11111111111111111111111111111111111111112";

/// The string appended to PDA derivation: "ProgramDerivedAddress".
const PDA_MARKER: &[u8] = b"ProgramDerivedAddress";

/// SPL Token `Transfer` instruction tag.
const TOKEN_TRANSFER_IX_TAG: u8 = 3;

// ---------------------------------------------------------------------------
// SPL Token Transfer
// ---------------------------------------------------------------------------

/// Build an SPL Token `Transfer` instruction.
///
/// `amount` is in the token's base units (for a 6-decimal token,
/// `1_000_000` is one whole token). Data is the tag `3` followed by the
/// u64 LE amount, 9 bytes in total.
pub fn build_spl_transfer(
    from_token_account: &[u8; 32],
    to_token_account: &[u8; 32],
    owner: &[u8; 32],
    amount: u64,
) -> Result<SolInstruction, SolError> {
    if amount == 0 {
        return Err(SolError::TransactionBuildError(
            "SPL transfer amount must be > 0".into(),
        ));
    }

    let mut data = Vec::with_capacity(9);
    data.push(TOKEN_TRANSFER_IX_TAG);
    data.extend_from_slice(&amount.to_le_bytes());

    Ok(SolInstruction {
        program_id: TOKEN_PROGRAM_ID,
        accounts: vec![
            SolAccountMeta::writable(*from_token_account, false),
            SolAccountMeta::writable(*to_token_account, false),
            SolAccountMeta::readonly(*owner, true),
        ],
        data,
    })
}

/// Build the Associated Token Account program's `Create` instruction.
///
/// Creates `associated_account` for (`owner`, `mint`), rent paid by `payer`.
/// The legacy `Create` variant carries no instruction data and fails
/// on-chain if the account already exists.
pub fn build_create_associated_token_account(
    payer: &[u8; 32],
    associated_account: &[u8; 32],
    owner: &[u8; 32],
    mint: &[u8; 32],
) -> SolInstruction {
    SolInstruction {
        program_id: ASSOCIATED_TOKEN_PROGRAM_ID,
        accounts: vec![
            SolAccountMeta::writable(*payer, true),
            SolAccountMeta::writable(*associated_account, false),
            SolAccountMeta::readonly(*owner, false),
            SolAccountMeta::readonly(*mint, false),
            SolAccountMeta::readonly(SYSTEM_PROGRAM_ID, false),
            SolAccountMeta::readonly(TOKEN_PROGRAM_ID, false),
        ],
        data: Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// Associated Token Account (PDA) derivation
// ---------------------------------------------------------------------------

/// Derive the associated token account address for a wallet + mint pair.
///
/// The ATA is a Program Derived Address (PDA) with seeds:
///   `[wallet_address, token_program_id, mint_address]`
/// derived from the Associated Token Account program.
///
/// The derivation searches for a bump seed (255 down to 0) such that the
/// resulting point is NOT on the Ed25519 curve.
pub fn derive_associated_token_address(
    wallet: &[u8; 32],
    mint: &[u8; 32],
) -> Result<[u8; 32], SolError> {
    find_program_address(
        &[wallet.as_ref(), &TOKEN_PROGRAM_ID, mint.as_ref()],
        &ASSOCIATED_TOKEN_PROGRAM_ID,
    )
    .map(|(address, _bump)| address)
}

/// Find a valid Program Derived Address (PDA) for the given seeds and program.
///
/// Tries bump seeds from 255 down to 0, hashing
/// `SHA-256(seed_0 || ... || seed_n || bump || program_id || "ProgramDerivedAddress")`,
/// and returns the first digest that is NOT a valid Ed25519 point.
fn find_program_address(
    seeds: &[&[u8]],
    program_id: &[u8; 32],
) -> Result<([u8; 32], u8), SolError> {
    (0u8..=255)
        .rev()
        .find_map(|bump| create_program_address(seeds, bump, program_id).map(|a| (a, bump)))
        .ok_or_else(|| SolError::InvalidAddress("no off-curve bump seed for PDA".into()))
}

fn create_program_address(seeds: &[&[u8]], bump: u8, program_id: &[u8; 32]) -> Option<[u8; 32]> {
    let mut hasher = Sha256::new();
    for seed in seeds {
        hasher.update(seed);
    }
    hasher.update([bump]);
    hasher.update(program_id);
    hasher.update(PDA_MARKER);

    let hash: [u8; 32] = hasher.finalize().into();
    (!is_on_curve(&hash)).then_some(hash)
}

/// Check if 32 bytes represent a valid Ed25519 curve point.
///
/// Uses `curve25519-dalek` to attempt decompression. If it succeeds, the
/// point is on the curve.
fn is_on_curve(bytes: &[u8; 32]) -> bool {
    curve25519_dalek::edwards::CompressedEdwardsY(*bytes)
        .decompress()
        .is_some()
}
