//! Session commands.

use clap::Subcommand;
use comanda_client::RegistrationForm;
use comanda_core::types::Landing;
use secrecy::SecretString;

use super::{CliError, Context, print, prompt};
use crate::render;

#[derive(Subcommand)]
pub enum AuthAction {
    /// Log in and store the session
    Login {
        /// Account email (defaults to the remembered one)
        #[arg(short, long)]
        email: Option<String>,

        /// Password (prompted when omitted)
        #[arg(short, long)]
        password: Option<String>,

        /// Remember the email for the next login
        #[arg(long)]
        remember: bool,
    },
    /// Create an account
    Register {
        #[arg(long)]
        first_name: String,

        #[arg(long)]
        last_name: String,

        #[arg(short, long)]
        email: String,

        /// Password (prompted when omitted)
        #[arg(short, long)]
        password: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long)]
        address: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Check the stored token with the backend
    Verify,
}

pub async fn run(ctx: &Context, action: AuthAction) -> Result<(), CliError> {
    let session = ctx.session();

    match action {
        AuthAction::Login {
            email,
            password,
            remember,
        } => {
            let email = match email {
                Some(email) => email,
                None => session
                    .remembered_email()?
                    .ok_or_else(|| CliError::Input("--email is required".to_string()))?,
            };
            let password = SecretString::from(password_or_prompt(password, "Password: ")?);

            let outcome = session.login(&email, &password, remember).await?;
            print(&format!("Welcome, {}!", outcome.user.name))?;
            if outcome.landing == Landing::AdminPanel {
                print("Administrator account: see `comanda admin dashboard`.")?;
            }
        }
        AuthAction::Register {
            first_name,
            last_name,
            email,
            password,
            phone,
            address,
        } => {
            let password = password_or_prompt(password, "Password: ")?;
            let confirmation = prompt("Confirm password: ")?;
            let form = RegistrationForm {
                first_name,
                last_name,
                email,
                password,
                password_confirmation: Some(confirmation),
                phone,
                address,
            };
            session.register(&form).await?;
            print("Account created. You can now log in.")?;
        }
        AuthAction::Logout => {
            session.logout()?;
            print("Logged out.")?;
        }
        AuthAction::Whoami => match session.current_user()? {
            Some(user) => print(&render::user(&user))?,
            None => print("Not logged in.")?,
        },
        AuthAction::Verify => {
            if session.verify().await? {
                print("Session is valid.")?;
            } else {
                print("Not logged in.")?;
            }
        }
    }
    Ok(())
}

fn password_or_prompt(password: Option<String>, question: &str) -> Result<String, CliError> {
    match password {
        Some(password) => Ok(password),
        None => prompt(question),
    }
}
