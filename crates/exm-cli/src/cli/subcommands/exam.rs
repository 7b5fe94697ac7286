use clap::Subcommand;

/// Exam commands.
#[derive(Clone, Debug, Subcommand)]
pub enum ExamCommands {
    /// List exams.
    List {
        #[arg(long)]
        goal: Option<String>,
        /// pending, preparing, completed, failed
        #[arg(long)]
        status: Option<String>,
    },
    /// Get an exam by ID.
    Get { id: String },
    /// Schedule an exam.
    Create {
        #[arg(long)]
        goal: String,
        /// Question ID (repeatable).
        #[arg(long = "question", required = true)]
        questions: Vec<String>,
        /// Start time (RFC 3339). Defaults to now.
        #[arg(long)]
        start: Option<String>,
        /// Planned duration in minutes.
        #[arg(long, default_value_t = 60)]
        duration: u32,
    },
    /// Delete an exam.
    Delete { id: String },
    /// Show answers with the AI tutoring transcript per question.
    Review { id: String },
}
