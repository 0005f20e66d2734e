//! Receipt commands

use a2p_types::{Did, ReceiptId};
use clap::Subcommand;

use crate::output::{self, OutputFormat};
use crate::Service;

#[derive(Subcommand)]
pub enum ReceiptCommands {
    /// List receipts that are neither revoked nor expired
    List {
        /// User DID
        user: Did,

        /// Only receipts issued to this agent
        #[arg(short, long)]
        agent: Option<Did>,
    },

    /// Revoke a receipt
    Revoke {
        user: Did,
        receipt_id: ReceiptId,

        #[arg(short, long)]
        reason: Option<String>,
    },
}

pub async fn execute(
    command: ReceiptCommands,
    service: &Service,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match command {
        ReceiptCommands::List { user, agent } => {
            let receipts = service.active_receipts(&user, agent.as_ref()).await?;
            output::print(&receipts, format)
        }
        ReceiptCommands::Revoke {
            user,
            receipt_id,
            reason,
        } => {
            let receipt = service.revoke_receipt(&user, &receipt_id, reason).await?;
            output::print(&receipt, format)
        }
    }
}
