//! Interactive sender for SOL and SPL tokens.
//!
//! The prompt flow lives in [`shell`]; it hands a [`shell::TransferRequest`]
//! to the [`builder`] and [`submitter`], which reach the chain through the
//! [`rpc::SolanaRpc`] trait. Wire-level Solana code is in `chain-sol`.

pub mod amount;
pub mod builder;
pub mod cli;
pub mod error;
pub mod logging;
pub mod prompt;
pub mod rpc;
pub mod shell;
pub mod submitter;
pub mod tokens;
pub mod ui;
pub mod validation;

pub use error::SenderError;
