//! Documents kept by the store and exchanged with clients.

mod history;
mod pdf;
mod question;
mod quiz;
mod user;

pub use history::{AnswerRecord, TestHistory, NOT_ANSWERED};
pub use pdf::PdfDocument;
pub use question::{QuestionStatus, QuizQuestion};
pub use quiz::{Difficulty, Quiz, QuizDetail, QuizSummary};
pub use user::{Creator, Profile, Role, User};
