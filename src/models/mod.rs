pub mod answer;
pub mod id;
pub mod question;
pub mod quiz;
pub mod result;
pub mod user;

pub use answer::AnswerSet;
pub use id::{CourseId, Id, QuestionId, QuizId, UserId};
pub use question::{OptionLetter, Question};
pub use quiz::{QuizDefinition, QuizRef, DEFAULT_TIME_LIMIT_MINUTES};
pub use result::{QuizResultRecord, SubmissionResult};
pub use user::{Role, User};
