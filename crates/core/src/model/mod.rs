mod answer;
mod ids;
mod question;

pub use answer::{AnswerBuffer, AnswerValue};
pub use ids::{AttemptId, ParseIdError, QuestionId, TestId};
pub use question::{Question, QuestionError, QuestionKind};
pub use test::{Test, TestError};
