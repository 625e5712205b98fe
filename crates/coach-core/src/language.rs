//! Programming language identifiers and their starter templates.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Language used when a problem has no recorded preference.
pub const DEFAULT_FALLBACK_LANGUAGE: &str = "javascript";

/// Template shown for languages without a dedicated starter.
const GENERIC_TEMPLATE: &str = "// Write your solution here\n";

/// Languages with a dedicated starter template, paired with that template.
const STARTER_TEMPLATES: &[(&str, &str)] = &[
    ("javascript", "// Start coding here"),
    ("typescript", "// Start coding here\nfunction solve(): void {\n}\n"),
    ("python", "# Start coding here\ndef solve():\n    pass\n"),
    (
        "java",
        "// Start coding here\nclass Solution {\n    public void solve() {\n    }\n}\n",
    ),
    ("cpp", "// Start coding here\n#include <bits/stdc++.h>\nusing namespace std;\n"),
    ("c", "// Start coding here\n#include <stdio.h>\n"),
    ("go", "// Start coding here\npackage main\n\nfunc solve() {\n}\n"),
    ("rust", "// Start coding here\nfn solve() {\n}\n"),
];

/// A normalized programming language identifier.
///
/// Identifiers are trimmed and lower-cased on construction so `"Python"` and
/// `" python "` address the same code slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Language(String);

impl Language {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(id.as_ref().trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true when this language has a dedicated starter template.
    pub fn is_known(&self) -> bool {
        STARTER_TEMPLATES.iter().any(|(id, _)| *id == self.0)
    }

    /// The code a fresh slot for this language starts with.
    pub fn starter_template(&self) -> &'static str {
        STARTER_TEMPLATES
            .iter()
            .find(|(id, _)| *id == self.0)
            .map(|(_, template)| *template)
            .unwrap_or(GENERIC_TEMPLATE)
    }

    /// Identifiers of all languages with a dedicated starter template.
    pub fn known() -> impl Iterator<Item = &'static str> {
        STARTER_TEMPLATES.iter().map(|(id, _)| *id)
    }
}

impl Default for Language {
    fn default() -> Self {
        Self::new(DEFAULT_FALLBACK_LANGUAGE)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Language {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for Language {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}
