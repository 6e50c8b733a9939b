use chrono::{DateTime, Utc};

use quiz_core::model::{AnswerBuffer, AnswerValue, AttemptId, Question, QuestionId, Test};

/// In-memory state of one test-taking session.
///
/// Holds the loaded test, the backend-issued attempt id, the current
/// question index, and the answer buffer. Lives only for the duration of
/// the session; there is no persistence and no resume after a restart.
#[derive(Debug, Clone)]
pub struct SessionStore {
    test: Test,
    attempt_id: AttemptId,
    current: usize,
    answers: AnswerBuffer,
    started_at: DateTime<Utc>,
}

impl SessionStore {
    #[must_use]
    pub fn new(test: Test, attempt_id: AttemptId, started_at: DateTime<Utc>) -> Self {
        Self {
            test,
            attempt_id,
            current: 0,
            answers: AnswerBuffer::new(),
            started_at,
        }
    }

    // Accessors
    #[must_use]
    pub fn test(&self) -> &Test {
        &self.test
    }

    #[must_use]
    pub fn attempt_id(&self) -> AttemptId {
        self.attempt_id
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// The question at the current index.
    ///
    /// Always valid: the index is clamped on every move and a test has at
    /// least one question.
    #[must_use]
    pub fn current_question(&self) -> &Question {
        &self.test.questions()[self.current.min(self.test.last_index())]
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.current == self.test.last_index()
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.test.question_count()
    }

    /// Number of questions with a buffered answer.
    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    /// Moves to the given question index, clamping out-of-bounds values
    /// into range. Out-of-bounds navigation fails silently.
    pub fn advance(&mut self, index: usize) {
        self.current = index.min(self.test.last_index());
    }

    /// Stores the answer for a question. Last write wins.
    pub fn set_answer(&mut self, question_id: QuestionId, value: AnswerValue) {
        self.answers.set(question_id, value);
    }

    #[must_use]
    pub fn answer(&self, question_id: QuestionId) -> Option<&AnswerValue> {
        self.answers.get(question_id)
    }

    #[must_use]
    pub fn is_answered(&self, question_id: QuestionId) -> bool {
        self.answers.is_answered(question_id)
    }

    pub fn remove_answer(&mut self, question_id: QuestionId) {
        self.answers.remove(question_id);
    }

    /// Drops the whole answer buffer. Called when the session ends.
    pub fn clear_answers(&mut self) {
        self.answers.clear();
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{QuestionKind, TestId};
    use quiz_core::time::fixed_now;

    fn build_store(question_count: u64) -> SessionStore {
        let questions = (1..=question_count)
            .map(|id| {
                Question::new(
                    QuestionId::new(id),
                    format!("Question {id}"),
                    QuestionKind::SingleChoice,
                    vec!["A".to_string(), "B".to_string()],
                    None,
                )
                .unwrap()
            })
            .collect();
        let test = Test::new(TestId::new(1), "Store test", None, questions).unwrap();
        SessionStore::new(test, AttemptId::new(7), fixed_now())
    }

    #[test]
    fn starts_at_question_zero() {
        let store = build_store(3);
        assert_eq!(store.current_index(), 0);
        assert_eq!(store.current_question().id(), QuestionId::new(1));
        assert!(!store.is_last());
    }

    #[test]
    fn advance_clamps_out_of_bounds() {
        let mut store = build_store(3);
        store.advance(99);
        assert_eq!(store.current_index(), 2);
        assert!(store.is_last());
    }

    #[test]
    fn advance_moves_within_bounds() {
        let mut store = build_store(3);
        store.advance(1);
        assert_eq!(store.current_question().id(), QuestionId::new(2));
    }

    #[test]
    fn set_answer_overwrites() {
        let mut store = build_store(2);
        let question = QuestionId::new(1);

        store.set_answer(question, AnswerValue::choice(1));
        store.set_answer(question, AnswerValue::choice(2));

        assert_eq!(store.answer(question), Some(&AnswerValue::choice(2)));
        assert_eq!(store.answered_count(), 1);
    }

    #[test]
    fn clear_answers_empties_buffer() {
        let mut store = build_store(2);
        store.set_answer(QuestionId::new(1), AnswerValue::choice(1));
        store.set_answer(QuestionId::new(2), AnswerValue::text("hi"));

        store.clear_answers();

        assert_eq!(store.answered_count(), 0);
        assert!(!store.is_answered(QuestionId::new(1)));
    }
}
