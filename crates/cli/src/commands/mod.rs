//! Command implementations.
//!
//! Each submodule owns its clap action enum and a `run` function. Output
//! goes through [`print`]; logs go to stderr.

pub mod admin;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod menu;
pub mod order;
pub mod theme;

pub use admin::AdminAction;
pub use auth::AuthAction;
pub use cart::CartAction;
pub use checkout::CheckoutAction;
pub use menu::MenuAction;
pub use order::OrderAction;
pub use theme::ThemeAction;

use std::io::{self, BufRead, Write};

use comanda_client::{
    AdminError, AdminService, ApiClient, ApiError, CheckoutError, CheckoutService, ClientConfig,
    ConfigError, FileStore, LocalState, MenuError, MenuService, SessionError, SessionService,
    StorageError,
};
use thiserror::Error;

/// Errors surfaced to the user.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{}", .0.user_message())]
    Api(#[from] ApiError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Menu(#[from] MenuError),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    #[error(transparent)]
    Admin(#[from] AdminError),

    /// Bad command-line input.
    #[error("{0}")]
    Input(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl CliError {
    /// Process exit code: 2 for input the user can fix, 1 otherwise.
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Input(_)
            | Self::Session(SessionError::MissingFields | SessionError::Invalid(_))
            | Self::Checkout(CheckoutError::Wizard(_) | CheckoutError::Cart(_))
            | Self::Admin(AdminError::Catalog(_))
            | Self::Menu(MenuError::Cart(_)) => 2,
            _ => 1,
        }
    }

    /// Failures worth reporting as errors rather than user mistakes.
    pub const fn is_unexpected(&self) -> bool {
        matches!(
            self,
            Self::Config(_)
                | Self::Storage(_)
                | Self::Io(_)
                | Self::Api(ApiError::Decode { .. })
                | Self::Menu(MenuError::Storage(_))
                | Self::Checkout(CheckoutError::Storage(_))
                | Self::Admin(AdminError::Storage(_))
                | Self::Session(SessionError::Storage(_))
        )
    }
}

/// Shared client handles for one invocation.
pub struct Context {
    pub config: ClientConfig,
    pub api: ApiClient,
    pub state: LocalState,
}

impl Context {
    /// Build the API client and open the state file.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn open(config: ClientConfig) -> Result<Self, CliError> {
        let api = ApiClient::new(&config)?;
        let state = LocalState::new(FileStore::new(config.state_path.clone()));
        Ok(Self { config, api, state })
    }

    pub fn session(&self) -> SessionService {
        SessionService::new(self.api.clone(), self.state.clone())
    }

    pub fn menu(&self) -> MenuService {
        MenuService::new(self.api.clone(), self.state.clone())
    }

    pub fn checkout(&self) -> CheckoutService {
        CheckoutService::new(self.api.clone(), self.state.clone(), self.config.delivery_cost)
    }

    pub fn admin(&self) -> AdminService {
        AdminService::new(self.api.clone(), self.state.clone())
    }
}

/// Write command output to stdout.
pub fn print(text: &str) -> Result<(), CliError> {
    let mut out = io::stdout().lock();
    out.write_all(text.as_bytes())?;
    if !text.ends_with('\n') {
        out.write_all(b"\n")?;
    }
    Ok(())
}

/// Ask a question on stderr and read one line from stdin.
pub fn prompt(question: &str) -> Result<String, CliError> {
    let mut err = io::stderr().lock();
    write!(err, "{question}")?;
    err.flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Ask a yes/no question, defaulting to no.
pub fn confirm(question: &str) -> Result<bool, CliError> {
    let answer = prompt(&format!("{question} [y/N] "))?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
