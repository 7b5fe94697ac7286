//! `/ai/*` endpoints. Generation and parsing run on the long timeout.

use exm_core::entities::{Message, NewQuestion};
use exm_core::enums::QuestionType;
use exm_http::{ApiClient, RequestSpec};
use serde::{Deserialize, Serialize};

use crate::{Api, ApiError, keys};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenerateQuestionsRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal_id: Option<String>,
    pub subject: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub count: u32,
    /// Extra instructions; the goal's own `ai_prompt` applies on the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParseImagesRequest {
    /// Object URLs of uploaded page photos.
    pub images: Vec<String>,
    pub subject: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnalyzeQuestionRequest {
    pub exam_id: String,
    pub question_id: String,
    /// Conversation so far, oldest first, ending with the user's turn.
    pub messages: Vec<Message>,
}

/// # Errors
///
/// Returns [`ApiError::Http`] if the body cannot be encoded.
pub fn generate_questions_request(
    request: &GenerateQuestionsRequest,
) -> Result<RequestSpec, ApiError> {
    Ok(RequestSpec::post("/ai/generate-questions")
        .json(request)?
        .long_running())
}

/// # Errors
///
/// Returns [`ApiError::InvalidInput`] when no image is given.
pub fn parse_images_request(request: &ParseImagesRequest) -> Result<RequestSpec, ApiError> {
    if request.images.is_empty() {
        return Err(ApiError::InvalidInput("at least one image is required".into()));
    }
    Ok(RequestSpec::post("/ai/parse-questions-from-images")
        .json(request)?
        .long_running())
}

/// # Errors
///
/// Returns [`ApiError::InvalidInput`] for an empty conversation.
pub fn analyze_question_request(request: &AnalyzeQuestionRequest) -> Result<RequestSpec, ApiError> {
    if request.messages.is_empty() {
        return Err(ApiError::InvalidInput("the conversation is empty".into()));
    }
    Ok(RequestSpec::post("/ai/analyze-question").json(request)?)
}

/// Draft questions; nothing is persisted until `question::batch_create`.
///
/// # Errors
///
/// Returns [`ApiError`] on invalid input or call failure.
pub async fn generate_questions(
    client: &ApiClient,
    request: &GenerateQuestionsRequest,
) -> Result<Vec<NewQuestion>, ApiError> {
    Ok(client
        .execute(&generate_questions_request(request)?)
        .await?)
}

/// # Errors
///
/// Returns [`ApiError`] on invalid input or call failure.
pub async fn parse_questions_from_images(
    client: &ApiClient,
    request: &ParseImagesRequest,
) -> Result<Vec<NewQuestion>, ApiError> {
    Ok(client.execute(&parse_images_request(request)?).await?)
}

/// Ask the tutor about one exam question. Returns the assistant's reply.
///
/// # Errors
///
/// Returns [`ApiError`] on invalid input or call failure.
pub async fn analyze_question(
    client: &ApiClient,
    request: &AnalyzeQuestionRequest,
) -> Result<Message, ApiError> {
    Ok(client.execute(&analyze_question_request(request)?).await?)
}

impl Api {
    /// The backend appends the exchange to the exam's transcript, so the
    /// cached exam is invalidated.
    ///
    /// # Errors
    ///
    /// Same as [`analyze_question`].
    pub async fn analyze_question(
        &self,
        request: &AnalyzeQuestionRequest,
    ) -> Result<Message, ApiError> {
        let reply = analyze_question(self.client(), request).await?;
        self.cache()
            .invalidate_queries(&keys::exam(&request.exam_id))
            .await;
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use exm_http::TimeoutClass;
    use pretty_assertions::assert_eq;

    use super::*;

    fn generate(count: u32) -> GenerateQuestionsRequest {
        GenerateQuestionsRequest {
            goal_id: Some("g-1".into()),
            subject: "math".into(),
            question_type: QuestionType::Choice,
            count,
            prompt: None,
        }
    }

    #[test]
    fn count_is_left_to_the_backend() {
        let req = generate_questions_request(&generate(80)).unwrap();
        assert_eq!(req.body.unwrap()["count"], 80);
    }

    #[test]
    fn generation_and_parsing_use_long_timeout() {
        let req = generate_questions_request(&generate(5)).unwrap();
        assert_eq!(req.timeout, TimeoutClass::Long);
        assert_eq!(req.body.as_ref().unwrap()["type"], "choice");

        let req = parse_images_request(&ParseImagesRequest {
            images: vec!["https://bucket/uploads/1-p.png".into()],
            subject: "english".into(),
        })
        .unwrap();
        assert_eq!(req.timeout, TimeoutClass::Long);
    }

    #[test]
    fn analysis_uses_default_timeout() {
        let req = analyze_question_request(&AnalyzeQuestionRequest {
            exam_id: "e-1".into(),
            question_id: "q-1".into(),
            messages: vec![Message::user("Why is B correct?")],
        })
        .unwrap();
        assert_eq!(req.timeout, TimeoutClass::Default);
        assert_eq!(req.body.unwrap()["messages"][0]["type"], "text");
    }
}
