use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::id::QuestionId;
use super::question::OptionLetter;

/// Selected choice per question for one attempt. Unanswered questions are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSet(BTreeMap<QuestionId, OptionLetter>);

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the choice for a question, replacing any earlier one.
    pub fn select(&mut self, question_id: QuestionId, letter: OptionLetter) -> Option<OptionLetter> {
        self.0.insert(question_id, letter)
    }

    pub fn get(&self, question_id: &QuestionId) -> Option<OptionLetter> {
        self.0.get(question_id).copied()
    }

    pub fn is_answered(&self, question_id: &QuestionId) -> bool {
        self.0.contains_key(question_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&QuestionId, &OptionLetter)> {
        self.0.iter()
    }
}

impl FromIterator<(QuestionId, OptionLetter)> for AnswerSet {
    fn from_iter<I: IntoIterator<Item = (QuestionId, OptionLetter)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Id;
    use serde_json::json;

    #[test]
    fn last_selection_wins() {
        let mut answers = AnswerSet::new();
        assert_eq!(answers.select(Id::from("q"), OptionLetter::A), None);
        assert_eq!(
            answers.select(Id::from("q"), OptionLetter::C),
            Some(OptionLetter::A)
        );
        assert_eq!(answers.len(), 1);
        assert_eq!(answers.get(&Id::from("q")), Some(OptionLetter::C));
    }

    #[test]
    fn serializes_as_plain_object() {
        let answers: AnswerSet = [
            (Id::from(1), OptionLetter::A),
            (Id::from(2), OptionLetter::D),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            serde_json::to_value(&answers).unwrap(),
            json!({ "1": "A", "2": "D" })
        );
    }
}
