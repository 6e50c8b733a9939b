use quiz_core::model::{AnswerValue, QuestionId};

/// User or timer input driving the session state machine.
///
/// Option indices are 0-based display positions; the wire encoding is
/// derived when the answer value is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Pick an option on a single-choice question.
    SelectOption(usize),
    /// Toggle an option on a multiple-choice question.
    ToggleOption(usize),
    /// Replace the free-text entry for the current question.
    InputText(String),
    Next,
    Previous,
    /// Direct navigation via a navigation dot.
    Jump(usize),
    /// Delivered by the driver when the question timer runs out.
    TimerExpired,
    /// Explicit "finish test" action; opens the confirmation gate.
    FinishRequested,
    ConfirmFinish,
    CancelFinish,
}

/// Side effects requested by a transition, interpreted by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    SubmitAnswer {
        question_id: QuestionId,
        value: AnswerValue,
    },
    FinishAttempt,
    Notify(Notice),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A user-visible, transient notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}
