use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::warn;

use sol_sender::cli::{Action, Cli};
use sol_sender::error::SenderError;
use sol_sender::logging::init_logging;
use sol_sender::prompt::TerminalPrompter;
use sol_sender::rpc::{HttpRpcClient, SolanaRpc};
use sol_sender::shell::{help_text, run_send};
use sol_sender::submitter::ConfirmOptions;
use sol_sender::tokens::Network;
use sol_sender::ui;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_level(), cli.log_format);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            ui::error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.action() {
        Action::Help => {
            println!("{}", help_text());
            return Ok(());
        }
        Action::SendUnknown(command) => {
            warn!(%command, "unknown command, running send");
        }
        Action::Send => {}
    }

    let rpc_override = cli.rpc_url;
    let connect = move |network: Network| -> Result<Arc<dyn SolanaRpc>, SenderError> {
        let url = rpc_override.unwrap_or_else(|| network.rpc_url().to_string());
        let client = HttpRpcClient::new(url)?;
        Ok(Arc::new(client))
    };

    let mut prompter = TerminalPrompter;
    run_send(&mut prompter, connect, &ConfirmOptions::default()).await?;
    Ok(())
}
