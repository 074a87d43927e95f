use serde::{Deserialize, Serialize};

use super::id::Id;
use super::quiz::QuizRef;

/// Scored outcome of one submission, as computed by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResult {
    pub score: u32,
    pub correct_answers: u32,
    pub total_questions: u32,
    pub passed: bool,
}

impl SubmissionResult {
    pub fn validate(&self) -> Result<(), String> {
        if self.score > 100 {
            return Err(format!("score {} is not a percentage", self.score));
        }
        if self.correct_answers > self.total_questions {
            return Err(format!(
                "{} correct answers out of {} questions",
                self.correct_answers, self.total_questions
            ));
        }
        Ok(())
    }
}

/// Past attempt as listed on the student dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResultRecord {
    pub id: Id,
    #[serde(default)]
    pub quiz: Option<QuizRef>,
    pub score: u32,
    pub correct_answers: u32,
    pub total_questions: u32,
    pub passed: bool,
}
