use quiz_core::model::{AnswerValue, QuestionKind};

use super::progress::{DotState, SessionProgress, dots};
use super::service::{Session, SessionPhase};
use super::timer::QuestionTimer;

//
// ─── TIMER DISPLAY ─────────────────────────────────────────────────────────────
//

/// Visual urgency tier for the remaining time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Urgency {
    Calm,
    /// 30 seconds or less.
    Warning,
    /// 10 seconds or less.
    Critical,
}

impl Urgency {
    #[must_use]
    pub fn for_remaining(seconds: u32) -> Self {
        if seconds <= 10 {
            Urgency::Critical
        } else if seconds <= 30 {
            Urgency::Warning
        } else {
            Urgency::Calm
        }
    }
}

/// Formats remaining seconds as `m:ss` with zero-padded seconds.
#[must_use]
pub fn format_clock(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerView {
    pub text: String,
    pub urgency: Urgency,
}

impl TimerView {
    #[must_use]
    pub fn of(timer: &QuestionTimer) -> Self {
        Self {
            text: format_clock(timer.remaining()),
            urgency: Urgency::for_remaining(timer.remaining()),
        }
    }
}

//
// ─── QUESTION VIEW ─────────────────────────────────────────────────────────────
//

/// One selectable option with its highlight state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceView {
    pub label: String,
    pub selected: bool,
}

/// Interactive part of the question card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionBody {
    Choices {
        multiple: bool,
        options: Vec<ChoiceView>,
    },
    TextEntry {
        value: String,
    },
}

/// Everything the renderer needs for the current state.
///
/// A pure, idempotent projection: projecting twice without an intervening
/// event yields the same view, and building it never mutates the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    pub title: String,
    pub question_text: String,
    pub body: QuestionBody,
    pub progress: SessionProgress,
    pub dots: Vec<DotState>,
    pub timer: TimerView,
    pub phase: SessionPhase,
}

impl SessionView {
    #[must_use]
    pub fn project(session: &Session) -> Self {
        let store = session.store();
        let question = store.current_question();
        let answer = store.answer(question.id());

        let body = match question.kind() {
            QuestionKind::FreeText => QuestionBody::TextEntry {
                value: match answer {
                    Some(AnswerValue::Text(text)) => text.clone(),
                    _ => String::new(),
                },
            },
            kind => QuestionBody::Choices {
                multiple: kind == QuestionKind::MultipleChoice,
                options: question
                    .options()
                    .iter()
                    .enumerate()
                    .map(|(index, label)| ChoiceView {
                        label: label.clone(),
                        selected: answer.is_some_and(|value| value.selects(index + 1)),
                    })
                    .collect(),
            },
        };

        Self {
            title: store.test().title().to_owned(),
            question_text: question.text().to_owned(),
            body,
            progress: SessionProgress::of(store),
            dots: dots(store),
            timer: TimerView::of(session.timer()),
            phase: session.phase(),
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sessions::events::SessionEvent;
    use quiz_core::model::{AttemptId, Question, QuestionId, Test, TestId};
    use quiz_core::time::fixed_now;

    fn build_session() -> Session {
        let q1 = Question::new(
            QuestionId::new(1),
            "Pick a letter",
            QuestionKind::SingleChoice,
            vec!["A".to_string(), "B".to_string()],
            None,
        )
        .unwrap();
        let q2 = Question::new(
            QuestionId::new(2),
            "Say something",
            QuestionKind::FreeText,
            Vec::new(),
            None,
        )
        .unwrap();
        let test = Test::new(TestId::new(1), "View test", None, vec![q1, q2]).unwrap();
        Session::new(test, AttemptId::new(9), fixed_now())
    }

    #[test]
    fn clock_formats_with_zero_padded_seconds() {
        assert_eq!(format_clock(60), "1:00");
        assert_eq!(format_clock(59), "0:59");
        assert_eq!(format_clock(9), "0:09");
        assert_eq!(format_clock(0), "0:00");
        assert_eq!(format_clock(125), "2:05");
    }

    #[test]
    fn urgency_tiers_change_at_thresholds() {
        assert_eq!(Urgency::for_remaining(60), Urgency::Calm);
        assert_eq!(Urgency::for_remaining(31), Urgency::Calm);
        assert_eq!(Urgency::for_remaining(30), Urgency::Warning);
        assert_eq!(Urgency::for_remaining(11), Urgency::Warning);
        assert_eq!(Urgency::for_remaining(10), Urgency::Critical);
        assert_eq!(Urgency::for_remaining(0), Urgency::Critical);
    }

    #[test]
    fn projects_choice_question_with_highlight() {
        let mut session = build_session();
        session.apply(SessionEvent::SelectOption(1));

        let view = SessionView::project(&session);

        assert_eq!(view.question_text, "Pick a letter");
        match view.body {
            QuestionBody::Choices { multiple, options } => {
                assert!(!multiple);
                assert!(!options[0].selected);
                assert!(options[1].selected);
            }
            QuestionBody::TextEntry { .. } => panic!("expected choices"),
        }
    }

    #[test]
    fn projects_text_question_with_restored_value() {
        let mut session = build_session();
        session.apply(SessionEvent::Next);
        session.apply(SessionEvent::InputText("hello".into()));

        let view = SessionView::project(&session);

        assert_eq!(view.body, QuestionBody::TextEntry { value: "hello".into() });
        assert_eq!(view.progress.current, 2);
        assert_eq!(view.progress.percent, 100);
    }

    #[test]
    fn projection_is_idempotent() {
        let mut session = build_session();
        session.apply(SessionEvent::SelectOption(0));

        assert_eq!(SessionView::project(&session), SessionView::project(&session));
    }

    #[test]
    fn timer_view_follows_ticks() {
        let mut session = build_session();
        for _ in 0..55 {
            session.tick_timer();
        }

        let view = SessionView::project(&session);

        assert_eq!(view.timer.text, "0:05");
        assert_eq!(view.timer.urgency, Urgency::Critical);
    }
}
