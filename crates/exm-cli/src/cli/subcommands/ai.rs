use clap::Subcommand;

/// AI commands.
#[derive(Clone, Debug, Subcommand)]
pub enum AiCommands {
    /// Draft questions for a subject.
    Generate {
        #[arg(long)]
        subject: String,
        #[arg(long = "type", default_value = "choice")]
        question_type: String,
        #[arg(long, default_value_t = 5)]
        count: u32,
        /// Goal whose AI prompt guides generation.
        #[arg(long)]
        goal: Option<String>,
        #[arg(long)]
        prompt: Option<String>,
        /// Persist the drafts to the question bank.
        #[arg(long)]
        save: bool,
    },
    /// Extract questions from page photos (local files are uploaded first).
    ParseImages {
        #[arg(long)]
        subject: String,
        #[arg(required = true)]
        images: Vec<String>,
        #[arg(long)]
        save: bool,
    },
    /// Ask the tutor about a question of an exam.
    Analyze {
        #[arg(long)]
        exam: String,
        #[arg(long)]
        question: String,
        #[arg(long)]
        message: String,
    },
}
