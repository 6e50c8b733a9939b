mod controller;
mod events;
mod progress;
mod service;
mod store;
mod submit;
mod timer;
mod view;

// Public API of the session subsystem.
pub use crate::error::{SessionError, StartError};
pub use controller::{SessionController, SessionEnd, Step};
pub use events::{Effect, Notice, NoticeLevel, SessionEvent};
pub use progress::{DotState, SessionProgress, dots};
pub use service::{Session, SessionPhase};
pub use store::SessionStore;
pub use submit::{AnswerSubmitter, SubmitOutcome};
pub use timer::{QUESTION_SECONDS, QuestionTimer, TimerTick};
pub use view::{ChoiceView, QuestionBody, SessionView, TimerView, Urgency, format_clock};
