//! Problem catalog.
//!
//! The catalog is read-only input: the session layer only uses a problem's `id`
//! for keying, the remaining fields are passed through for display.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Difficulty label shown next to a problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        };
        f.pad(label)
    }
}

/// A practice problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
}

impl Problem {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        difficulty: Difficulty,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            difficulty,
        }
    }
}

/// Ordered list of problems.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProblemCatalog {
    problems: Vec<Problem>,
}

impl ProblemCatalog {
    pub fn new(problems: Vec<Problem>) -> Self {
        Self { problems }
    }

    pub fn problems(&self) -> &[Problem] {
        &self.problems
    }

    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Problem> {
        self.problems.iter().find(|p| p.id == id)
    }

    /// Looks up `id`, falling back to the first entry for unknown ids.
    ///
    /// Returns `None` only when the catalog is empty.
    pub fn resolve(&self, id: &str) -> Option<&Problem> {
        match self.get(id) {
            Some(problem) => Some(problem),
            None => {
                let fallback = self.problems.first()?;
                tracing::warn!(
                    "[Catalog] Unknown problem '{}', falling back to '{}'",
                    id,
                    fallback.id
                );
                Some(fallback)
            }
        }
    }
}

impl Default for ProblemCatalog {
    fn default() -> Self {
        Self::new(vec![
            Problem::new(
                "two-sum",
                "Two Sum",
                "Given an array of integers nums and an integer target, return indices of the two numbers such that they add up to target.",
                Difficulty::Easy,
            ),
            Problem::new(
                "reverse-string",
                "Reverse String",
                "Reverse the given string.",
                Difficulty::Easy,
            ),
            Problem::new(
                "longest-substring-without-repeating-characters",
                "Longest Substring Without Repeating Characters",
                "Find the length of the longest substring without repeating characters.",
                Difficulty::Medium,
            ),
            Problem::new(
                "median-of-two-sorted-arrays",
                "Median of Two Sorted Arrays",
                "Find the median of two sorted arrays.",
                Difficulty::Hard,
            ),
        ])
    }
}
