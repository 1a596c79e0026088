//! Menu browsing commands.

use clap::Subcommand;
use comanda_core::catalog::CategoryFilter;
use comanda_core::types::ProductId;

use super::{CliError, Context, print};
use crate::render;

#[derive(Subcommand)]
pub enum MenuAction {
    /// List products, optionally for one category
    List {
        /// Category id, or `todo` for every category
        #[arg(short, long, default_value = "todo")]
        category: CategoryFilter,
    },
    /// Show one product
    Show { id: String },
}

pub async fn run(ctx: &Context, action: MenuAction) -> Result<(), CliError> {
    let menu = ctx.menu();
    match action {
        MenuAction::List { category } => {
            let view = menu.load(&category).await?;
            print(&render::menu(&view))
        }
        MenuAction::Show { id } => {
            let detail = menu.detail(&ProductId::new(id)).await?;
            print(&render::product_detail(&detail))
        }
    }
}
