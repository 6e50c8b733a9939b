use super::store::SessionStore;

/// Aggregated view of session progress, useful for UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionProgress {
    /// 1-based position of the current question.
    pub current: usize,
    pub total: usize,
    /// Questions with a buffered answer.
    pub answered: usize,
    /// Progress-bar fill, 0..=100.
    pub percent: u8,
}

impl SessionProgress {
    #[must_use]
    pub fn of(store: &SessionStore) -> Self {
        let total = store.question_count();
        let current = store.current_index() + 1;
        Self {
            current,
            total,
            answered: store.answered_count(),
            percent: ((current * 100) / total).min(100) as u8,
        }
    }
}

/// State of one navigation dot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DotState {
    Active,
    Answered,
    Unanswered,
}

/// One dot per question: the active question wins over answered.
#[must_use]
pub fn dots(store: &SessionStore) -> Vec<DotState> {
    store
        .test()
        .questions()
        .iter()
        .enumerate()
        .map(|(index, question)| {
            if index == store.current_index() {
                DotState::Active
            } else if store.is_answered(question.id()) {
                DotState::Answered
            } else {
                DotState::Unanswered
            }
        })
        .collect()
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
