pub mod controller;
pub mod runner;
pub mod view;

use serde::Serialize;
use std::fmt;

pub use controller::{QuizSession, SubmissionRequest};
pub use runner::{SessionCommand, SessionHandle, SessionRunner};
pub use view::{NavDot, ResultView, SessionView};

/// Lifecycle of one quiz attempt.
///
/// `Loading -> Active -> Submitting -> Completed` is the happy path. Failures
/// park the session in `LoadFailed` or `SubmitFailed`; `Closed` is terminal and
/// swallows any late backend response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Loading,
    LoadFailed,
    Active,
    Submitting,
    SubmitFailed,
    Completed,
    Closed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Loading => "loading",
            SessionStatus::LoadFailed => "load_failed",
            SessionStatus::Active => "active",
            SessionStatus::Submitting => "submitting",
            SessionStatus::SubmitFailed => "submit_failed",
            SessionStatus::Completed => "completed",
            SessionStatus::Closed => "closed",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
