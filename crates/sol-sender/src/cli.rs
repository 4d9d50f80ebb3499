//! # CLI Interface
//!
//! `sol-sender` with no subcommand, `send`, or any unrecognized word runs
//! the interactive send flow; `help` prints usage and security notes.

use clap::{ArgAction, Parser, Subcommand};

use crate::logging::LogFormat;

/// Interactive tool to send SOL and SPL tokens on Solana.
#[derive(Parser, Debug)]
#[command(
    name = "sol-sender",
    about = "Interactive CLI tool to send SPL tokens on Solana",
    version,
    disable_help_subcommand = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// JSON-RPC endpoint to use instead of the selected network's default.
    #[arg(long, global = true)]
    pub rpc_url: Option<String>,

    /// Log output format (logs go to stderr).
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Send SPL tokens interactively
    Send,
    /// Show help information
    Help,
    #[command(external_subcommand)]
    Other(Vec<String>),
}

/// What the binary should do after parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Send,
    Help,
    /// Unknown subcommand; falls back to sending.
    SendUnknown(String),
}

impl Cli {
    pub fn action(&self) -> Action {
        match &self.command {
            None | Some(Commands::Send) => Action::Send,
            Some(Commands::Help) => Action::Help,
            Some(Commands::Other(args)) => {
                Action::SendUnknown(args.first().cloned().unwrap_or_default())
            }
        }
    }

    /// Default log filter for the given verbosity.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}
