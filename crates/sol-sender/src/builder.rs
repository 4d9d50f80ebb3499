//! Assembles the unsigned transfer transaction.
//!
//! A mint other than [`NATIVE_MINT`] produces an SPL token transfer,
//! preceded by an associated-token-account `Create` when the recipient has
//! no account for that mint yet. Anything else is a plain System Program
//! transfer of lamports. The recent blockhash is fetched last, so the
//! validity window starts as late as possible.

use chain_sol::{
    address_to_bytes, build_create_associated_token_account, build_spl_transfer,
    build_system_transfer_instruction, bytes_to_address, compile_transaction,
    derive_associated_token_address, SolInstruction, SolTransaction, NATIVE_MINT,
};
use tracing::debug;

use crate::amount::{to_base_units, SOL_DECIMALS};
use crate::error::SenderError;
use crate::rpc::SolanaRpc;
use crate::ui;

/// A compiled, unsigned transfer and its freshness window.
#[derive(Debug, Clone)]
pub struct BuiltTransaction {
    pub transaction: SolTransaction,
    pub fee_payer: [u8; 32],
    pub last_valid_block_height: u64,
}

pub async fn build_transfer(
    rpc: &dyn SolanaRpc,
    sender: &[u8; 32],
    receiver: &[u8; 32],
    amount: f64,
    mint: Option<&str>,
) -> Result<BuiltTransaction, SenderError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(SenderError::NonPositiveAmount);
    }

    let instructions = match mint {
        Some(mint) if mint != NATIVE_MINT => {
            token_transfer_instructions(rpc, sender, receiver, amount, mint).await?
        }
        _ => vec![native_transfer_instruction(sender, receiver, amount)?],
    };

    ui::step("⚙️  Setting transaction parameters...");
    let latest = rpc.get_latest_blockhash().await?;
    let transaction = compile_transaction(&instructions, sender, &latest.blockhash)?;

    ui::success("✅ Transaction created successfully");
    ui::detail("Fee payer", bytes_to_address(sender));
    ui::detail("Recent blockhash", bytes_to_address(&latest.blockhash));
    ui::detail("Last valid block height", latest.last_valid_block_height);
    debug!(
        instructions = instructions.len(),
        accounts = transaction.account_keys.len(),
        "compiled transfer"
    );

    Ok(BuiltTransaction {
        transaction,
        fee_payer: *sender,
        last_valid_block_height: latest.last_valid_block_height,
    })
}

async fn token_transfer_instructions(
    rpc: &dyn SolanaRpc,
    sender: &[u8; 32],
    receiver: &[u8; 32],
    amount: f64,
    mint: &str,
) -> Result<Vec<SolInstruction>, SenderError> {
    ui::step("📋 Creating SPL token transaction...");
    ui::detail("Amount", format!("{amount} tokens"));
    ui::detail("Recipient", bytes_to_address(receiver));
    ui::detail("Token Mint", mint);

    let mint_key = address_to_bytes(mint)?;

    ui::step("🔍 Getting token mint information...");
    let decimals = rpc.get_mint_decimals(&mint_key).await?;
    let units = to_base_units(amount, decimals)?;
    ui::detail("Token decimals", decimals);
    ui::detail("Adjusted amount", units);

    ui::step("🏦 Getting token accounts...");
    let sender_ata = derive_associated_token_address(sender, &mint_key)?;
    let receiver_ata = derive_associated_token_address(receiver, &mint_key)?;
    ui::detail("Sender token account", bytes_to_address(&sender_ata));
    ui::detail("Recipient token account", bytes_to_address(&receiver_ata));

    let mut instructions = Vec::with_capacity(2);

    ui::step("🔍 Checking recipient token account...");
    if rpc.account_exists(&receiver_ata).await? {
        ui::success("✅ Recipient token account exists");
    } else {
        ui::warn("⚠️  Recipient token account does not exist. Creating...");
        instructions.push(build_create_associated_token_account(
            sender,
            &receiver_ata,
            receiver,
            &mint_key,
        ));
    }

    ui::step("➕ Adding token transfer instruction...");
    instructions.push(build_spl_transfer(&sender_ata, &receiver_ata, sender, units)?);
    Ok(instructions)
}

fn native_transfer_instruction(
    sender: &[u8; 32],
    receiver: &[u8; 32],
    amount: f64,
) -> Result<SolInstruction, SenderError> {
    let lamports = to_base_units(amount, SOL_DECIMALS)?;

    ui::step("📋 Creating native SOL transaction...");
    ui::detail("Amount", format!("{amount} SOL"));
    ui::detail("Recipient", bytes_to_address(receiver));
    ui::detail("Lamports", lamports);

    Ok(build_system_transfer_instruction(sender, receiver, lamports)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::mock::MockRpc;
    use crate::rpc::RpcError;
    use chain_sol::{
        SolKeypair, ASSOCIATED_TOKEN_PROGRAM_ID, SYSTEM_PROGRAM_ID, TOKEN_PROGRAM_ID,
    };

    const USDC_DEVNET: &str = "4zMMC9srt5Ri5X14GAgXhaHii3GnPAEERYPJgZJDncDU";

    fn parties() -> ([u8; 32], [u8; 32]) {
        (
            SolKeypair::from_seed(&[1u8; 32]).pubkey(),
            SolKeypair::from_seed(&[2u8; 32]).pubkey(),
        )
    }

    fn usdc() -> [u8; 32] {
        address_to_bytes(USDC_DEVNET).unwrap()
    }

    #[tokio::test]
    async fn native_transfer_when_no_mint() {
        let rpc = MockRpc::new();
        let (sender, receiver) = parties();

        let built = build_transfer(&rpc, &sender, &receiver, 2.5, None)
            .await
            .unwrap();

        let tx = &built.transaction;
        assert_eq!(tx.program_ids(), vec![SYSTEM_PROGRAM_ID]);
        assert_eq!(tx.fee_payer(), Some(&sender));
        assert_eq!(tx.recent_blockhash, rpc.blockhash.blockhash);
        assert_eq!(built.last_valid_block_height, 150);

        let data = &tx.compiled_instructions[0].data;
        assert_eq!(&data[..4], &2u32.to_le_bytes());
        assert_eq!(&data[4..], &2_500_000_000u64.to_le_bytes());
    }

    #[tokio::test]
    async fn native_sentinel_mint_is_a_sol_transfer() {
        let rpc = MockRpc::new();
        let (sender, receiver) = parties();

        let built = build_transfer(&rpc, &sender, &receiver, 1.0, Some(NATIVE_MINT))
            .await
            .unwrap();

        assert_eq!(built.transaction.program_ids(), vec![SYSTEM_PROGRAM_ID]);
    }

    #[tokio::test]
    async fn token_transfer_creates_missing_recipient_account() {
        let rpc = MockRpc::new().with_mint(usdc(), 6);
        let (sender, receiver) = parties();

        let built = build_transfer(&rpc, &sender, &receiver, 1.5, Some(USDC_DEVNET))
            .await
            .unwrap();

        let tx = &built.transaction;
        assert_eq!(
            tx.program_ids(),
            vec![ASSOCIATED_TOKEN_PROGRAM_ID, TOKEN_PROGRAM_ID]
        );
        assert!(tx.compiled_instructions[0].data.is_empty());
        assert_eq!(tx.compiled_instructions[0].account_indices.len(), 6);

        let transfer = &tx.compiled_instructions[1].data;
        assert_eq!(transfer[0], 3);
        assert_eq!(&transfer[1..], &1_500_000u64.to_le_bytes());
    }

    #[tokio::test]
    async fn token_transfer_skips_create_when_account_exists() {
        let (sender, receiver) = parties();
        let receiver_ata = derive_associated_token_address(&receiver, &usdc()).unwrap();
        let rpc = MockRpc::new()
            .with_mint(usdc(), 6)
            .with_account(receiver_ata);

        let built = build_transfer(&rpc, &sender, &receiver, 3.0, Some(USDC_DEVNET))
            .await
            .unwrap();

        assert_eq!(built.transaction.program_ids(), vec![TOKEN_PROGRAM_ID]);
    }

    #[tokio::test]
    async fn token_transfer_accounts_are_derived_atas() {
        let (sender, receiver) = parties();
        let sender_ata = derive_associated_token_address(&sender, &usdc()).unwrap();
        let receiver_ata = derive_associated_token_address(&receiver, &usdc()).unwrap();
        let rpc = MockRpc::new()
            .with_mint(usdc(), 6)
            .with_account(receiver_ata);

        let built = build_transfer(&rpc, &sender, &receiver, 1.0, Some(USDC_DEVNET))
            .await
            .unwrap();

        let tx = &built.transaction;
        let keys: Vec<[u8; 32]> = tx.compiled_instructions[0]
            .account_indices
            .iter()
            .map(|&i| tx.account_keys[i as usize])
            .collect();
        assert_eq!(keys, vec![sender_ata, receiver_ata, sender]);
    }

    #[tokio::test]
    async fn unknown_mint_propagates_rpc_error() {
        let rpc = MockRpc::new();
        let (sender, receiver) = parties();

        let err = build_transfer(&rpc, &sender, &receiver, 1.0, Some(USDC_DEVNET))
            .await
            .unwrap_err();

        assert!(matches!(err, SenderError::Rpc(RpcError::MintNotFound(_))));
        assert_eq!(rpc.blockhash_requests(), 0);
    }

    #[tokio::test]
    async fn amount_below_smallest_unit_fails() {
        let rpc = MockRpc::new().with_mint(usdc(), 2);
        let (sender, receiver) = parties();

        let err = build_transfer(&rpc, &sender, &receiver, 0.001, Some(USDC_DEVNET))
            .await
            .unwrap_err();

        assert!(matches!(err, SenderError::AmountOutOfRange { decimals: 2, .. }));
    }

    #[tokio::test]
    async fn non_positive_amount_is_rejected_before_rpc() {
        let rpc = MockRpc::new();
        let (sender, receiver) = parties();

        let err = build_transfer(&rpc, &sender, &receiver, 0.0, None)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Amount must be greater than zero.");
        assert_eq!(rpc.blockhash_requests(), 0);
    }
}
