//! Theme preference commands.

use clap::Subcommand;
use comanda_core::types::Theme;

use super::{CliError, Context, print};

#[derive(Subcommand)]
pub enum ThemeAction {
    /// Switch between light and dark
    Toggle,
    /// Set the theme (`claro`/`light` or `oscuro`/`dark`)
    Set { theme: Theme },
}

pub fn run(ctx: &Context, action: Option<ThemeAction>) -> Result<(), CliError> {
    let session = ctx.session();
    let theme = match action {
        None => session.theme()?,
        Some(ThemeAction::Toggle) => session.toggle_theme()?,
        Some(ThemeAction::Set { theme }) => {
            session.set_theme(theme)?;
            theme
        }
    };
    print(&format!("Theme: {}", theme.as_str()))
}
