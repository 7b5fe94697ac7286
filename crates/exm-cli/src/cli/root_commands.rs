use std::path::PathBuf;

use clap::{Args, Subcommand};
use exm_api::pages::Page;

use crate::cli::subcommands::{
    AiCommands, AuthCommands, ExamCommands, GoalCommands, QuestionCommands,
};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Sign in, sign out, session status.
    Auth {
        #[command(subcommand)]
        action: AuthCommands,
    },
    /// Learning goals.
    Goal {
        #[command(subcommand)]
        action: GoalCommands,
    },
    /// Exams.
    Exam {
        #[command(subcommand)]
        action: ExamCommands,
    },
    /// Question bank.
    Question {
        #[command(subcommand)]
        action: QuestionCommands,
    },
    /// AI question generation and tutoring.
    Ai {
        #[command(subcommand)]
        action: AiCommands,
    },
    /// Upload a file to object storage.
    Upload(UploadArgs),
    /// Prefetch a page's data and print or save the snapshot.
    Page(PageArgs),
}

#[derive(Clone, Debug, Args)]
pub struct UploadArgs {
    /// Local file to upload.
    pub file: PathBuf,
}

#[derive(Clone, Debug, Args)]
pub struct PageArgs {
    /// Page to prefetch: goals, goal, exam, questions.
    #[arg(value_name = "PAGE")]
    pub name: Page,
    /// Goal or exam id for detail pages.
    #[arg(long)]
    pub id: Option<String>,
    /// Write the snapshot here instead of stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,
}
