//! Cart commands.

use clap::Subcommand;
use comanda_core::types::ProductId;

use super::{CliError, Context, print};
use crate::render;

#[derive(Subcommand)]
pub enum CartAction {
    /// Show the cart
    Show,
    /// Add a product
    Add {
        id: String,

        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Change a line's quantity (0 removes it)
    Set { id: String, quantity: u32 },
    /// Remove a line
    Remove { id: String },
    /// Empty the cart
    Clear,
}

pub async fn run(ctx: &Context, action: CartAction) -> Result<(), CliError> {
    let menu = ctx.menu();
    let cart = match action {
        CartAction::Show => menu.cart()?,
        CartAction::Add { id, quantity } => {
            let notice = menu.add_to_cart(&ProductId::new(id), quantity).await?;
            print(&render::notice(&notice))?;
            menu.cart()?
        }
        CartAction::Set { id, quantity } => menu.set_quantity(&ProductId::new(id), quantity)?,
        CartAction::Remove { id } => menu.remove(&ProductId::new(id))?,
        CartAction::Clear => {
            menu.clear_cart()?;
            menu.cart()?
        }
    };
    print(&render::cart(&cart))
}
