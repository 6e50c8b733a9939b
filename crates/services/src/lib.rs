#![forbid(unsafe_code)]

pub mod error;
pub mod sessions;

pub use quiz_core::Clock;

pub use error::{SessionError, StartError};
pub use sessions::{
    AnswerSubmitter, ChoiceView, DotState, Effect, Notice, NoticeLevel, QUESTION_SECONDS,
    QuestionBody, QuestionTimer, Session, SessionController, SessionEnd, SessionEvent,
    SessionPhase, SessionProgress, SessionStore, SessionView, Step, SubmitOutcome, TimerTick,
    TimerView, Urgency,
};
