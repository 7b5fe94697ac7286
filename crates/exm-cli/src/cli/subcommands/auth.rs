use clap::Subcommand;

/// Authentication commands.
#[derive(Clone, Debug, Subcommand)]
pub enum AuthCommands {
    /// Send a verification code by SMS.
    SendCode {
        #[arg(long)]
        phone: String,
    },
    /// Sign in with a phone number and verification code.
    Login {
        #[arg(long)]
        phone: String,
        #[arg(long)]
        code: String,
    },
    /// Create an account.
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        code: String,
    },
    /// Sign out and clear stored credentials.
    Logout,
    /// Show current session status.
    Status {
        /// Do not contact the backend.
        #[arg(long)]
        offline: bool,
    },
}
