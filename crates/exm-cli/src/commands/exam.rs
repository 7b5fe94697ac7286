use exm_auth::CredentialStore;
use exm_core::entities::{Exam, Message, NewExam, Question};
use exm_core::enums::{ExamStatus, QuestionType};
use exm_core::paging::ExamFilter;
use serde::Serialize;
use serde_json::Value;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::ExamCommands;
use crate::commands::shared::limit::pagination;
use crate::commands::shared::parse::{parse_opt_enum, parse_time_or_now};
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct ExamReview {
    exam_id: String,
    goal_id: String,
    status: ExamStatus,
    items: Vec<ReviewItem>,
}

#[derive(Debug, Serialize)]
struct ReviewItem {
    question_id: String,
    #[serde(rename = "type")]
    question_type: QuestionType,
    title: String,
    answer: Option<String>,
    submitted: Option<Value>,
    transcript: Vec<Message>,
}

/// Handle `exm exam`.
pub async fn handle(
    action: &ExamCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        ExamCommands::List { goal, status } => {
            let filter = ExamFilter {
                goal_id: goal.clone(),
                status: parse_opt_enum(status.as_deref(), "status")?,
            };
            let exams = ctx.api.exams(&filter, &pagination(ctx, flags)).await?;
            output(&exams, flags.format)
        }
        ExamCommands::Get { id } => output(&ctx.api.exam(id).await?, flags.format),
        ExamCommands::Create {
            goal,
            questions,
            start,
            duration,
        } => {
            let exam = NewExam {
                goal_id: goal.clone(),
                question_ids: questions.clone(),
                examinee_id: ctx.credentials.user_id(),
                start_time: parse_time_or_now(start.as_deref(), "start")?,
                planned_duration: *duration,
            };
            output(&ctx.api.create_exam(&exam).await?, flags.format)
        }
        ExamCommands::Delete { id } => {
            ctx.api.delete_exam(id).await?;
            output(&serde_json::json!({ "deleted": id }), flags.format)
        }
        ExamCommands::Review { id } => {
            let exam = ctx.api.exam(id).await?;
            let questions = ctx.api.questions_by_id(&exam.question_ids).await?;
            output(&review(exam, questions), flags.format)
        }
    }
}

/// Pair each question with the submitted answer and its tutoring transcript,
/// in exam order.
fn review(exam: Exam, questions: Vec<Question>) -> ExamReview {
    let items = questions
        .into_iter()
        .map(|question| ReviewItem {
            submitted: exam.answer.value_for(&question.id).cloned(),
            transcript: exam.answer.transcript_for(&question.id).to_vec(),
            question_id: question.id,
            question_type: question.question_type,
            title: question.title,
            answer: question.answer,
        })
        .collect();

    ExamReview {
        exam_id: exam.id,
        goal_id: exam.goal_id,
        status: exam.status,
        items,
    }
}
