use chrono::{DateTime, Utc};
use std::fmt;

use quiz_core::model::{AnswerValue, AttemptId, QuestionKind, Test};

use super::events::{Effect, Notice, SessionEvent};
use super::store::SessionStore;
use super::timer::{QuestionTimer, TimerTick};

//
// ─── PHASE ─────────────────────────────────────────────────────────────────────
//

/// Lifecycle phase of a session.
///
/// `ConfirmingFinish` is a cancellable gate, not a durable state: the user
/// either confirms and the attempt is finalized, or cancels and returns to
/// `Active`. `Finished` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Active,
    ConfirmingFinish,
    Finished,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// The test-taking state machine.
///
/// Owns the session store, the per-question timer, and the phase, and maps
/// events to effects without touching the network or any UI. The
/// controller interprets the returned effects; views are projected from
/// the session read-only.
pub struct Session {
    store: SessionStore,
    timer: QuestionTimer,
    phase: SessionPhase,
    dirty_text: bool,
}

impl Session {
    /// Builds a session positioned on question 0 with the timer running.
    #[must_use]
    pub fn new(test: Test, attempt_id: AttemptId, started_at: DateTime<Utc>) -> Self {
        let store = SessionStore::new(test, attempt_id, started_at);
        let mut timer = QuestionTimer::new();
        timer.start();
        Self {
            store,
            timer,
            phase: SessionPhase::Active,
            dirty_text: false,
        }
    }

    // Accessors
    #[must_use]
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    #[must_use]
    pub fn timer(&self) -> &QuestionTimer {
        &self.timer
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub fn attempt_id(&self) -> AttemptId {
        self.store.attempt_id()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.phase == SessionPhase::Finished
    }

    /// Advances the countdown by one second. Driven by the controller.
    pub fn tick_timer(&mut self) -> TimerTick {
        self.timer.tick()
    }

    /// Applies one event and returns the effects the caller must run.
    ///
    /// Events that do not apply to the current phase or question kind are
    /// ignored and produce no effects.
    pub fn apply(&mut self, event: SessionEvent) -> Vec<Effect> {
        match self.phase {
            SessionPhase::Finished => Vec::new(),
            SessionPhase::ConfirmingFinish => self.apply_confirming(event),
            SessionPhase::Active => self.apply_active(event),
        }
    }

    fn apply_active(&mut self, event: SessionEvent) -> Vec<Effect> {
        match event {
            SessionEvent::SelectOption(option) => self.select_option(option),
            SessionEvent::ToggleOption(option) => self.toggle_option(option),
            SessionEvent::InputText(text) => self.input_text(text),
            SessionEvent::Next => self.next(),
            SessionEvent::Previous => self.previous(),
            SessionEvent::Jump(index) => self.jump(index),
            SessionEvent::TimerExpired => self.time_up(),
            SessionEvent::FinishRequested => {
                self.timer.stop();
                self.phase = SessionPhase::ConfirmingFinish;
                Vec::new()
            }
            SessionEvent::ConfirmFinish | SessionEvent::CancelFinish => Vec::new(),
        }
    }

    fn apply_confirming(&mut self, event: SessionEvent) -> Vec<Effect> {
        match event {
            SessionEvent::ConfirmFinish => {
                let mut effects = self.flush_text();
                effects.push(Effect::FinishAttempt);
                effects
            }
            SessionEvent::CancelFinish => {
                self.phase = SessionPhase::Active;
                // Reset-on-resume: a fresh 60 seconds, not the remainder.
                // On the last question the timer stays stopped.
                if !self.store.is_last() {
                    self.timer.start();
                }
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    /// Single-choice selection: buffer the answer and submit immediately.
    fn select_option(&mut self, option: usize) -> Vec<Effect> {
        let question = self.store.current_question();
        let (id, kind, count) = (question.id(), question.kind(), question.option_count());
        if kind != QuestionKind::SingleChoice || option >= count {
            return Vec::new();
        }

        let value = AnswerValue::choice(option + 1);
        self.store.set_answer(id, value.clone());
        vec![Effect::SubmitAnswer {
            question_id: id,
            value,
        }]
    }

    /// Multiple-choice toggle: buffer the updated set and submit it.
    ///
    /// Toggling the last selected option off clears the buffered answer
    /// and submits nothing.
    fn toggle_option(&mut self, option: usize) -> Vec<Effect> {
        let question = self.store.current_question();
        let (id, kind, count) = (question.id(), question.kind(), question.option_count());
        if kind != QuestionKind::MultipleChoice || option >= count {
            return Vec::new();
        }

        let selected = match self.store.answer(id) {
            Some(value) => value.toggled(option + 1),
            None => vec![option + 1],
        };
        if selected.is_empty() {
            self.store.remove_answer(id);
            return Vec::new();
        }

        let value = AnswerValue::choices(selected);
        self.store.set_answer(id, value.clone());
        vec![Effect::SubmitAnswer {
            question_id: id,
            value,
        }]
    }

    /// Free-text input: buffer locally, no per-keystroke submission.
    fn input_text(&mut self, text: String) -> Vec<Effect> {
        let question = self.store.current_question();
        let (id, kind) = (question.id(), question.kind());
        if kind != QuestionKind::FreeText {
            return Vec::new();
        }

        self.store.set_answer(id, AnswerValue::text(text));
        self.dirty_text = true;
        Vec::new()
    }

    /// Submits a pending free-text edit for the current question, if any.
    ///
    /// Whitespace-only text stays buffered for redisplay but is not sent.
    fn flush_text(&mut self) -> Vec<Effect> {
        if !self.dirty_text {
            return Vec::new();
        }
        self.dirty_text = false;

        let id = self.store.current_question().id();
        match self.store.answer(id) {
            Some(AnswerValue::Text(text)) if !text.trim().is_empty() => {
                let value = AnswerValue::text(text.clone());
                vec![Effect::SubmitAnswer {
                    question_id: id,
                    value,
                }]
            }
            _ => Vec::new(),
        }
    }

    fn next(&mut self) -> Vec<Effect> {
        let effects = self.flush_text();
        if self.store.is_last() {
            self.timer.stop();
            self.phase = SessionPhase::ConfirmingFinish;
        } else {
            self.move_to(self.store.current_index() + 1);
        }
        effects
    }

    fn previous(&mut self) -> Vec<Effect> {
        if self.store.current_index() == 0 {
            return Vec::new();
        }
        let effects = self.flush_text();
        self.move_to(self.store.current_index() - 1);
        effects
    }

    /// Direct navigation. Leaving a question flushes pending text just
    /// like `next` does, so no entered answer is silently lost.
    fn jump(&mut self, index: usize) -> Vec<Effect> {
        let effects = self.flush_text();
        self.move_to(index);
        effects
    }

    fn move_to(&mut self, index: usize) {
        self.store.advance(index);
        self.timer.start();
    }

    /// Timer expiry: one `next` transition, or an unconditional finish on
    /// the last question (no confirmation gate to act on in time).
    fn time_up(&mut self) -> Vec<Effect> {
        if self.store.is_last() {
            let mut effects = vec![Effect::Notify(Notice::warning(
                "Time is up, finishing the test",
            ))];
            effects.extend(self.flush_text());
            self.timer.stop();
            effects.push(Effect::FinishAttempt);
            effects
        } else {
            let mut effects = vec![Effect::Notify(Notice::warning(
                "Time is up, moving to the next question",
            ))];
            effects.extend(self.next());
            effects
        }
    }

    /// The attempt was finalized backend-side.
    pub(crate) fn mark_finished(&mut self) {
        self.timer.stop();
        self.phase = SessionPhase::Finished;
        self.store.clear_answers();
    }

    /// Finalization failed; the user stays on the current question and may
    /// retry. The timer restarts fresh except on the last question.
    pub(crate) fn finish_failed(&mut self) {
        self.phase = SessionPhase::Active;
        if !self.store.is_last() {
            self.timer.start();
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("attempt_id", &self.store.attempt_id())
            .field("current", &self.store.current_index())
            .field("answered", &self.store.answered_count())
            .field("phase", &self.phase)
            .field("timer_remaining", &self.timer.remaining())
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
