//! Signing, submission and confirmation.

use std::time::Duration;

use chain_sol::{sign_transaction, SolKeypair};
use tracing::{debug, warn};

use crate::builder::BuiltTransaction;
use crate::error::SenderError;
use crate::rpc::SolanaRpc;
use crate::ui;

/// Confirmation polling settings.
#[derive(Debug, Clone)]
pub struct ConfirmOptions {
    pub poll_interval: Duration,
}

impl Default for ConfirmOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
        }
    }
}

/// Sign `built` with `keypair`, send it and wait for `confirmed`.
///
/// Polling stops with [`SenderError::BlockhashExpired`] once the chain has
/// moved past the transaction's last valid block height.
pub async fn submit(
    rpc: &dyn SolanaRpc,
    built: BuiltTransaction,
    keypair: &SolKeypair,
    options: &ConfirmOptions,
) -> Result<String, SenderError> {
    ui::step("✍️  Signing transaction...");
    let signed = sign_transaction(&built.transaction, keypair)?;
    ui::success("✅ Transaction signed successfully");

    ui::step("📡 Sending transaction to the network...");
    let signature = rpc.send_transaction(&signed.wire).await?;
    if signature != signed.signature_base58() {
        warn!(%signature, "node returned an unexpected signature");
    }

    loop {
        if let Some(status) = rpc.get_signature_status(&signature).await? {
            if let Some(err) = &status.err {
                return Err(SenderError::TransactionFailed {
                    signature,
                    reason: err.to_string(),
                });
            }
            if status.is_confirmed() {
                debug!(%signature, "transaction confirmed");
                return Ok(signature);
            }
        }

        let height = rpc.get_block_height().await?;
        if height > built.last_valid_block_height {
            return Err(SenderError::BlockhashExpired {
                signature,
                last_valid_block_height: built.last_valid_block_height,
            });
        }
        debug!(%signature, height, "awaiting confirmation");
        tokio::time::sleep(options.poll_interval).await;
    }
}
