//! Async orchestration of practice sessions.

pub mod session;
pub mod verdict;

pub use session::{MentorReply, PracticeSession};
pub use verdict::SubmissionVerdict;
