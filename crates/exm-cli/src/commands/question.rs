use std::path::Path;

use anyhow::Context;
use exm_core::entities::{NewQuestion, QuestionUpdate};
use exm_core::paging::QuestionFilter;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::QuestionCommands;
use crate::commands::shared::limit::pagination;
use crate::commands::shared::parse::parse_opt_enum;
use crate::context::AppContext;
use crate::output::output;

/// Handle `exm question`.
pub async fn handle(
    action: &QuestionCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        QuestionCommands::List {
            subject,
            question_type,
            title,
        } => {
            let filter = QuestionFilter {
                subject: subject.clone(),
                question_type: parse_opt_enum(question_type.as_deref(), "type")?,
                title: title.clone(),
            };
            let questions = ctx.api.questions(&filter, &pagination(ctx, flags)).await?;
            output(&questions, flags.format)
        }
        QuestionCommands::Get { id } => output(&ctx.api.question(id).await?, flags.format),
        QuestionCommands::Update {
            id,
            title,
            subject,
            question_type,
            options,
            answer,
        } => {
            let change = QuestionUpdate {
                id: id.clone(),
                title: title.clone(),
                subject: subject.clone(),
                question_type: parse_opt_enum(question_type.as_deref(), "type")?,
                options: Some(options.clone()).filter(|o| !o.is_empty()),
                answer: answer.clone(),
            };
            output(&ctx.api.update_question(&change).await?, flags.format)
        }
        QuestionCommands::Import { file } => {
            let questions = read_questions(file)?;
            let created = ctx.api.batch_create_questions(&questions).await?;
            output(&created, flags.format)
        }
    }
}

/// Read a JSON array of questions, e.g. the output of `exm ai generate`.
fn read_questions(path: &Path) -> anyhow::Result<Vec<NewQuestion>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a JSON array of questions", path.display()))
}

#[cfg(test)]
mod tests {
    use exm_core::enums::QuestionType;

    use super::read_questions;

    #[test]
    fn reads_generated_questions_file() {
        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let path = tmp.path().join("drafts.json");
        std::fs::write(
            &path,
            r#"[{"subject":"math","type":"judge","title":"0 is even","answer":"true"}]"#,
        )
        .expect("write drafts");

        let questions = read_questions(&path).expect("drafts should parse");
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].question_type, QuestionType::Judge);
    }

    #[test]
    fn rejects_non_array_file() {
        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let path = tmp.path().join("one.json");
        std::fs::write(&path, r#"{"subject":"math"}"#).expect("write file");

        let err = read_questions(&path).expect_err("should fail");
        assert!(format!("{err:#}").contains("not a JSON array of questions"));
    }
}
