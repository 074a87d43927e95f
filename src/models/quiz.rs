use serde::Serialize;
use std::collections::HashSet;

use super::id::QuizId;
use super::question::Question;

pub const DEFAULT_TIME_LIMIT_MINUTES: u32 = 10;
pub const MIN_OPTIONS: usize = 2;
pub const MAX_OPTIONS: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizDefinition {
    pub id: QuizId,
    pub title: Option<String>,
    pub time_limit_minutes: u32,
    pub passing_score: u32,
    pub questions: Vec<Question>,
}

impl QuizDefinition {
    pub fn time_limit_seconds(&self) -> u32 {
        self.time_limit_minutes.saturating_mul(60)
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn find_question(&self, id: &super::id::QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| &q.id == id)
    }

    /// Checks the shape rules the session relies on.
    pub fn validate(&self) -> Result<(), String> {
        if self.time_limit_minutes == 0 {
            return Err("time limit must be positive".to_string());
        }
        if self.passing_score > 100 {
            return Err(format!(
                "passing score {} is not a percentage",
                self.passing_score
            ));
        }

        let mut seen = HashSet::new();
        for question in &self.questions {
            if !seen.insert(&question.id) {
                return Err(format!("duplicate question id {}", question.id));
            }
            let count = question.options.len();
            if !(MIN_OPTIONS..=MAX_OPTIONS).contains(&count) {
                return Err(format!(
                    "question {} has {} options, expected {} to {}",
                    question.id, count, MIN_OPTIONS, MAX_OPTIONS
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize, Serialize)]
pub struct QuizRef {
    pub id: QuizId,
    pub title: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Id, OptionLetter};
    use std::collections::BTreeMap;

    fn question(id: &str, letters: &[OptionLetter]) -> Question {
        Question {
            id: Id::from(id),
            question_text: format!("Question {}", id),
            options: letters
                .iter()
                .map(|l| (*l, format!("Option {}", l)))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    fn quiz(questions: Vec<Question>) -> QuizDefinition {
        QuizDefinition {
            id: Id::from(1),
            title: None,
            time_limit_minutes: 5,
            passing_score: 60,
            questions,
        }
    }

    #[test]
    fn rejects_duplicate_question_ids() {
        let q = question("q1", &[OptionLetter::A, OptionLetter::B]);
        let err = quiz(vec![q.clone(), q]).validate().unwrap_err();
        assert!(err.contains("duplicate"));
    }

    #[test]
    fn rejects_single_option_questions() {
        let err = quiz(vec![question("q1", &[OptionLetter::A])])
            .validate()
            .unwrap_err();
        assert!(err.contains("1 options"));
    }

    #[test]
    fn accepts_two_to_four_options() {
        let quiz = quiz(vec![
            question("q1", &[OptionLetter::A, OptionLetter::C]),
            question("q2", &OptionLetter::ALL),
        ]);
        assert!(quiz.validate().is_ok());
        assert_eq!(quiz.time_limit_seconds(), 300);
    }
}
