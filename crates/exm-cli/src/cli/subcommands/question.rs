use std::path::PathBuf;

use clap::Subcommand;

/// Question bank commands.
#[derive(Clone, Debug, Subcommand)]
pub enum QuestionCommands {
    /// List questions.
    List {
        #[arg(long)]
        subject: Option<String>,
        /// choice, qa, judge, reading, summary, show
        #[arg(long = "type")]
        question_type: Option<String>,
        #[arg(long)]
        title: Option<String>,
    },
    /// Get a question by ID.
    Get { id: String },
    /// Update a question.
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        subject: Option<String>,
        #[arg(long = "type")]
        question_type: Option<String>,
        /// Option text (repeatable, replaces all options).
        #[arg(long = "option")]
        options: Vec<String>,
        #[arg(long)]
        answer: Option<String>,
    },
    /// Create questions from a JSON array file.
    Import { file: PathBuf },
}
