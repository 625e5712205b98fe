//! Parsing of judge replies to `submit` requests.

/// Outcome of a submission as reported by the judge.
///
/// The judge answers with lines of the form:
///
/// ```text
/// RESULT: PASS
/// FEEDBACK: Handles all edge cases.
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionVerdict {
    pub passed: bool,
    pub feedback: String,
}

impl SubmissionVerdict {
    /// Parses a judge reply.
    ///
    /// Without a `RESULT:` line the submission counts as failed; without a
    /// `FEEDBACK:` line the whole reply is the feedback.
    pub fn parse(text: &str) -> Self {
        let mut passed = false;
        let mut feedback = None;

        for line in text.trim().lines() {
            let line = line.trim();
            if let Some(rest) = line.strip_prefix("RESULT:") {
                passed = rest.to_uppercase().contains("PASS");
            } else if let Some(rest) = line.strip_prefix("FEEDBACK:") {
                feedback = Some(rest.trim().to_string());
            }
        }

        Self {
            passed,
            feedback: feedback.unwrap_or_else(|| text.trim().to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pass() {
        let verdict = SubmissionVerdict::parse("RESULT: PASS\nFEEDBACK: Handles all edge cases.");
        assert!(verdict.passed);
        assert_eq!(verdict.feedback, "Handles all edge cases.");
    }

    #[test]
    fn test_parse_fail_is_case_insensitive_on_value() {
        let verdict = SubmissionVerdict::parse("RESULT: fail\nFEEDBACK: Off by one.");
        assert!(!verdict.passed);

        let verdict = SubmissionVerdict::parse("RESULT: pass");
        assert!(verdict.passed);
        assert_eq!(verdict.feedback, "RESULT: pass");
    }

    #[test]
    fn test_unstructured_reply() {
        let verdict = SubmissionVerdict::parse("  Looks fine to me.  ");
        assert!(!verdict.passed);
        assert_eq!(verdict.feedback, "Looks fine to me.");
    }
}
