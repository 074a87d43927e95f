use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{
    Id, OptionLetter, Question, QuizDefinition, DEFAULT_TIME_LIMIT_MINUTES,
};

const DEFAULT_PASSING_SCORE: i64 = 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizDto {
    pub id: Id,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub time_limit_minutes: Option<i64>,
    #[serde(default)]
    pub passing_score: Option<i64>,
    pub questions: Vec<QuestionDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDto {
    pub id: Id,
    pub question_text: String,
    #[serde(default)]
    pub option_a: Option<String>,
    #[serde(default)]
    pub option_b: Option<String>,
    #[serde(default)]
    pub option_c: Option<String>,
    #[serde(default)]
    pub option_d: Option<String>,
}

/// Lightweight listing entry for a course's quizzes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSummary {
    pub id: Id,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub time_limit_minutes: Option<i64>,
    #[serde(default)]
    pub passing_score: Option<i64>,
}

impl From<QuestionDto> for Question {
    fn from(dto: QuestionDto) -> Self {
        let options = [
            (OptionLetter::A, dto.option_a),
            (OptionLetter::B, dto.option_b),
            (OptionLetter::C, dto.option_c),
            (OptionLetter::D, dto.option_d),
        ]
        .into_iter()
        .filter_map(|(letter, text)| {
            text.filter(|t| !t.trim().is_empty())
                .map(|t| (letter, t))
        })
        .collect::<BTreeMap<_, _>>();

        Question {
            id: dto.id,
            question_text: dto.question_text,
            options,
        }
    }
}

impl TryFrom<QuizDto> for QuizDefinition {
    type Error = String;

    fn try_from(dto: QuizDto) -> Result<Self, Self::Error> {
        let time_limit_minutes = dto
            .time_limit_minutes
            .filter(|minutes| *minutes > 0)
            .map(|minutes| u32::try_from(minutes).unwrap_or(u32::MAX / 60))
            .unwrap_or(DEFAULT_TIME_LIMIT_MINUTES);

        let passing_score = dto.passing_score.unwrap_or(DEFAULT_PASSING_SCORE);
        let passing_score = u32::try_from(passing_score)
            .map_err(|_| format!("passing score {} is not a percentage", passing_score))?;

        let quiz = QuizDefinition {
            id: dto.id,
            title: dto.title,
            time_limit_minutes,
            passing_score,
            questions: dto.questions.into_iter().map(Question::from).collect(),
        };
        quiz.validate()?;
        Ok(quiz)
    }
}
