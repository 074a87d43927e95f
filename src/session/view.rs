use serde::Serialize;

use super::{QuizSession, SessionStatus};
use crate::models::OptionLetter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NavDot {
    Current,
    Answered,
    Unanswered,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionView {
    pub letter: OptionLetter,
    pub text: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultView {
    pub passed: bool,
    pub headline: String,
    pub message: String,
    pub score: String,
    pub summary: String,
}

/// Render-ready snapshot of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionView {
    pub status: SessionStatus,
    pub title: Option<String>,
    pub header: String,
    pub progress_percent: u32,
    pub timer: String,
    pub question_label: Option<String>,
    pub question_text: Option<String>,
    pub options: Vec<OptionView>,
    pub dots: Vec<NavDot>,
    pub can_go_back: bool,
    pub shows_submit: bool,
    pub error: Option<String>,
    pub result: Option<ResultView>,
}

impl SessionView {
    pub fn is_finished(&self) -> bool {
        matches!(
            self.status,
            SessionStatus::Completed | SessionStatus::LoadFailed | SessionStatus::Closed
        )
    }
}

impl From<&QuizSession> for SessionView {
    fn from(session: &QuizSession) -> Self {
        let count = session.question_count();
        let current = session.current_index();
        let question = session.current_question();

        let options = question
            .map(|q| {
                q.ordered_options()
                    .map(|(letter, text)| OptionView {
                        letter,
                        text: text.to_string(),
                        selected: session.answers().get(&q.id) == Some(letter),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let dots = session
            .answered_flags()
            .into_iter()
            .enumerate()
            .map(|(i, answered)| match (i == current, answered) {
                (true, _) => NavDot::Current,
                (false, true) => NavDot::Answered,
                (false, false) => NavDot::Unanswered,
            })
            .collect();

        let result = match (session.result(), session.quiz()) {
            (Some(result), Some(quiz)) => Some(ResultView {
                passed: result.passed,
                headline: if result.passed {
                    "You Passed!".to_string()
                } else {
                    "Not Quite".to_string()
                },
                message: if result.passed {
                    "Great job! Keep it up.".to_string()
                } else {
                    format!("You need {}% to pass. Try again!", quiz.passing_score)
                },
                score: format!("{}%", result.score),
                summary: format!(
                    "{} / {} correct answers",
                    result.correct_answers, result.total_questions
                ),
            }),
            _ => None,
        };

        SessionView {
            status: session.status(),
            title: session.quiz().and_then(|q| q.title.clone()),
            header: if count == 0 {
                String::new()
            } else {
                format!("Question {} of {}", current + 1, count)
            },
            progress_percent: session.progress_percent(),
            timer: session.formatted_remaining(),
            question_label: question.map(|_| format!("Question {}", current + 1)),
            question_text: question.map(|q| q.question_text.clone()),
            options,
            dots,
            can_go_back: current > 0,
            shows_submit: session.is_last_question(),
            error: session.error().map(ToString::to_string),
            result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::SessionContext;
    use crate::models::{Id, Question, QuizDefinition, Role, SubmissionResult, User};
    use std::collections::BTreeMap;

    fn session_with(ids: &[&str], passing_score: u32) -> QuizSession {
        let ctx = SessionContext::signed_in(
            User {
                id: Id::from(1),
                email: "s@uca.ma".to_string(),
                first_name: "S".to_string(),
                last_name: "T".to_string(),
                role: Role::Student,
                profile_picture: None,
            },
            "jwt",
        );
        let quiz = QuizDefinition {
            id: Id::from(9),
            title: Some("Java".to_string()),
            time_limit_minutes: 2,
            passing_score,
            questions: ids
                .iter()
                .map(|id| Question {
                    id: Id::from(*id),
                    question_text: format!("Text {}", id),
                    options: [(OptionLetter::A, "yes"), (OptionLetter::C, "no")]
                        .into_iter()
                        .map(|(l, t)| (l, t.to_string()))
                        .collect::<BTreeMap<_, _>>(),
                })
                .collect(),
        };
        let mut session = QuizSession::new(Id::from(9), &ctx);
        session.finish_loading(Ok(quiz));
        session
    }

    #[test]
    fn renders_active_question() {
        let mut session = session_with(&["q1", "q2", "q3"], 60);
        session.select_answer(Id::from("q3"), OptionLetter::C).unwrap();
        session.go_to(1).unwrap();
        session.tick();

        let view = SessionView::from(&session);
        assert_eq!(view.header, "Question 2 of 3");
        assert_eq!(view.progress_percent, 67);
        assert_eq!(view.timer, "01:59");
        assert_eq!(view.question_text.as_deref(), Some("Text q2"));
        assert_eq!(
            view.options.iter().map(|o| o.letter).collect::<Vec<_>>(),
            vec![OptionLetter::A, OptionLetter::C]
        );
        assert_eq!(
            view.dots,
            vec![NavDot::Unanswered, NavDot::Current, NavDot::Answered]
        );
        assert!(view.can_go_back);
        assert!(!view.shows_submit);
    }

    #[test]
    fn renders_failed_result_with_threshold() {
        let mut session = session_with(&["q1"], 70);
        session.submit().unwrap();
        session.finish_submission(Ok(SubmissionResult {
            score: 0,
            correct_answers: 0,
            total_questions: 1,
            passed: false,
        }));

        let view = SessionView::from(&session);
        assert!(view.is_finished());
        let result = view.result.expect("result view");
        assert_eq!(result.headline, "Not Quite");
        assert_eq!(result.message, "You need 70% to pass. Try again!");
        assert_eq!(result.score, "0%");
        assert_eq!(result.summary, "0 / 1 correct answers");
    }
}
