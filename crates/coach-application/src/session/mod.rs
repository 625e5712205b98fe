//! Practice session use case.

mod practice;

#[cfg(test)]
mod practice_test;

pub use practice::{MentorReply, PracticeSession};
