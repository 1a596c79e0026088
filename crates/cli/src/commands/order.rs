//! Last-order commands.

use std::path::PathBuf;

use chrono::Utc;
use clap::Subcommand;

use super::{CliError, Context, print};
use crate::render;

#[derive(Subcommand)]
pub enum OrderAction {
    /// Show the last order confirmation
    Show,
    /// Write the last order's receipt to a file
    Receipt {
        /// Output path (defaults to `receipt-<number>.txt`)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print a short text for sharing the order
    Share,
}

pub fn run(ctx: &Context, action: OrderAction) -> Result<(), CliError> {
    let checkout = ctx.checkout();
    let now = Utc::now();

    match action {
        OrderAction::Show => {
            let order = checkout.last_order(now)?;
            print(&render::confirmation(&order, now))
        }
        OrderAction::Receipt { output } => {
            let receipt = checkout.receipt(now)?;
            let path = output.unwrap_or_else(|| PathBuf::from(&receipt.file_name));
            std::fs::write(&path, receipt.text)?;
            print(&format!("Receipt saved to {}", path.display()))
        }
        OrderAction::Share => print(&checkout.last_order(now)?.share_text()),
    }
}
