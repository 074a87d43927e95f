use async_trait::async_trait;
use tracing::info;

use super::api_client::ApiClient;
use crate::dto::quiz_dto::{QuizDto, QuizSummary};
use crate::error::{Error, Result};
use crate::models::{
    AnswerSet, CourseId, QuizDefinition, QuizId, QuizResultRecord, SubmissionResult, UserId,
};

/// The two backend calls a quiz session depends on.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuizBackend: Send + Sync {
    async fn fetch_quiz(&self, quiz_id: &QuizId) -> Result<QuizDefinition>;

    async fn submit_quiz(
        &self,
        quiz_id: &QuizId,
        user_id: &UserId,
        answers: &AnswerSet,
    ) -> Result<SubmissionResult>;
}

#[derive(Clone)]
pub struct QuizService {
    api: ApiClient,
}

impl QuizService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list_by_course(&self, course_id: &CourseId) -> Result<Vec<QuizSummary>> {
        self.api
            .get_json(&format!("quizzes/course/{}", course_id))
            .await
    }

    pub async fn student_results(&self, student_id: &UserId) -> Result<Vec<QuizResultRecord>> {
        self.api
            .get_json(&format!("quizzes/student/{}/results", student_id))
            .await
    }
}

#[async_trait]
impl QuizBackend for QuizService {
    async fn fetch_quiz(&self, quiz_id: &QuizId) -> Result<QuizDefinition> {
        let dto: QuizDto = self.api.get_json(&format!("quizzes/{}", quiz_id)).await?;
        let quiz = QuizDefinition::try_from(dto).map_err(Error::Malformed)?;
        info!(%quiz_id, questions = quiz.question_count(), "fetched quiz");
        Ok(quiz)
    }

    async fn submit_quiz(
        &self,
        quiz_id: &QuizId,
        user_id: &UserId,
        answers: &AnswerSet,
    ) -> Result<SubmissionResult> {
        let result: SubmissionResult = self
            .api
            .post_json(
                &format!("quizzes/{}/submit", quiz_id),
                &[("studentId", user_id.as_str())],
                answers,
            )
            .await?;
        info!(%quiz_id, %user_id, score = result.score, "submitted quiz");
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Id;
    use std::time::Duration;
    use tokio_test::{assert_err, block_on};

    #[test]
    fn unreachable_backend_is_a_transport_error() {
        let api = ApiClient::new("http://127.0.0.1:9/api", Duration::from_millis(500)).unwrap();
        let service = QuizService::new(api);
        let err = assert_err!(block_on(service.fetch_quiz(&Id::from(7))));
        assert!(matches!(err, Error::Reqwest(_)));
    }

    #[test]
    fn mock_backend_reports_expected_calls() {
        let mut backend = MockQuizBackend::new();
        backend
            .expect_fetch_quiz()
            .withf(|quiz_id| quiz_id.as_str() == "7")
            .times(1)
            .returning(|_| Err(Error::Unauthorized("expired".to_string())));

        let err = assert_err!(block_on(backend.fetch_quiz(&Id::from(7))));
        assert!(err.is_unauthorized());
    }
}
