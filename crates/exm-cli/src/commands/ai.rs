use std::path::Path;

use exm_api::ai::{
    self, AnalyzeQuestionRequest, GenerateQuestionsRequest, ParseImagesRequest,
};
use exm_core::entities::{Message, NewQuestion};
use exm_core::enums::QuestionType;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::AiCommands;
use crate::commands::shared::parse::parse_enum;
use crate::context::AppContext;
use crate::output::output;

/// Handle `exm ai`.
pub async fn handle(
    action: &AiCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        AiCommands::Generate {
            subject,
            question_type,
            count,
            goal,
            prompt,
            save,
        } => {
            let request = GenerateQuestionsRequest {
                goal_id: goal.clone(),
                subject: subject.clone(),
                question_type: parse_enum::<QuestionType>(question_type, "type")?,
                count: *count,
                prompt: prompt.clone(),
            };
            let drafts = ai::generate_questions(ctx.api.client(), &request).await?;
            finish(drafts, *save, ctx, flags).await
        }
        AiCommands::ParseImages {
            subject,
            images,
            save,
        } => {
            let request = ParseImagesRequest {
                images: resolve_images(images, ctx).await?,
                subject: subject.clone(),
            };
            let drafts = ai::parse_questions_from_images(ctx.api.client(), &request).await?;
            finish(drafts, *save, ctx, flags).await
        }
        AiCommands::Analyze {
            exam,
            question,
            message,
        } => {
            let messages = conversation(ctx, exam, question, message).await?;
            let request = AnalyzeQuestionRequest {
                exam_id: exam.clone(),
                question_id: question.clone(),
                messages,
            };
            output(&ctx.api.analyze_question(&request).await?, flags.format)
        }
    }
}

/// Print drafts, or persist them when `--save` is given.
async fn finish(
    drafts: Vec<NewQuestion>,
    save: bool,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    if !save {
        return output(&drafts, flags.format);
    }
    let created = ctx.api.batch_create_questions(&drafts).await?;
    output(&created, flags.format)
}

/// URLs pass through; anything else is a local file and is uploaded first.
async fn resolve_images(images: &[String], ctx: &AppContext) -> anyhow::Result<Vec<String>> {
    let mut urls = Vec::with_capacity(images.len());
    for image in images {
        if is_remote(image) {
            urls.push(image.clone());
            continue;
        }
        let path = Path::new(image);
        let uploaded = ctx.api.upload(path).await?;
        tracing::debug!(file = %path.display(), key = %uploaded.key, "image uploaded");
        urls.push(uploaded.url);
    }
    Ok(urls)
}

fn is_remote(image: &str) -> bool {
    image.starts_with("http://") || image.starts_with("https://")
}

/// Transcript stored on the exam for this question, plus the new user turn.
async fn conversation(
    ctx: &AppContext,
    exam_id: &str,
    question_id: &str,
    message: &str,
) -> anyhow::Result<Vec<Message>> {
    let exam = ctx.api.exam(exam_id).await?;
    if !exam.question_ids.iter().any(|id| id == question_id) {
        anyhow::bail!("question '{question_id}' is not part of exam '{exam_id}'");
    }
    let mut messages = exam.answer.transcript_for(question_id).to_vec();
    messages.push(Message::user(message));
    Ok(messages)
}
