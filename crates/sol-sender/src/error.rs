use chain_sol::SolError;
use thiserror::Error;

use crate::rpc::RpcError;
use crate::validation::ValidationError;

#[derive(Debug, Error)]
pub enum SenderError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Sol(#[from] SolError),

    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error("Amount must be greater than zero.")]
    NonPositiveAmount,

    #[error("Amount {amount} cannot be expressed with {decimals} decimals")]
    AmountOutOfRange { amount: f64, decimals: u8 },

    #[error("Transaction {signature} failed: {reason}")]
    TransactionFailed { signature: String, reason: String },

    #[error(
        "Transaction {signature} was not confirmed before block height {last_valid_block_height} (blockhash expired)"
    )]
    BlockhashExpired {
        signature: String,
        last_valid_block_height: u64,
    },

    #[error("missing answer for {0}")]
    IncompleteInput(&'static str),

    #[error("prompt failed: {0}")]
    Prompt(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_is_transparent() {
        let err: SenderError = ValidationError::MissingReceiver.into();
        assert_eq!(err.to_string(), "Invalid receiver public key");
    }

    #[test]
    fn sol_error_is_transparent() {
        let err: SenderError = SolError::SigningError("boom".into()).into();
        assert_eq!(err.to_string(), "signing error: boom");
    }

    #[test]
    fn display_expired() {
        let err = SenderError::BlockhashExpired {
            signature: "5ig".into(),
            last_valid_block_height: 120,
        };
        assert_eq!(
            err.to_string(),
            "Transaction 5ig was not confirmed before block height 120 (blockhash expired)"
        );
    }

    #[test]
    fn display_out_of_range() {
        let err = SenderError::AmountOutOfRange {
            amount: 0.0000001,
            decimals: 6,
        };
        assert_eq!(
            err.to_string(),
            "Amount 0.0000001 cannot be expressed with 6 decimals"
        );
    }
}
