use clap::Subcommand;

/// Goal commands.
#[derive(Clone, Debug, Subcommand)]
pub enum GoalCommands {
    /// List goals.
    List {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        subject: Option<String>,
        /// preparing, doing, passed, suspended
        #[arg(long)]
        status: Option<String>,
    },
    /// Get a goal by ID.
    Get { id: String },
    /// Create a goal.
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        subject: String,
        #[arg(long)]
        status: Option<String>,
        /// Instructions for AI question generation.
        #[arg(long)]
        prompt: Option<String>,
    },
    /// Delete a goal and its exams.
    Delete { id: String },
}
