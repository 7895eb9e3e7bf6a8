use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::utils::utf16::utf16_to_char_index;

/// Closed classification of the service's category ids. Drives both the
/// spelling/grammar toggles and the style of the resulting annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    Spelling,
    Grammar,
    Other,
}

impl Category {
    #[must_use]
    pub fn classify(category_id: &str) -> Self {
        match category_id {
            "TYPOS" | "CASING" | "COMPOUNDING" | "CONFUSED_WORDS" => Self::Spelling,
            "GRAMMAR" | "PUNCTUATION" | "REDUNDANCY" | "REPETITIONS" | "REPETITIONS_STYLE"
            | "SEMANTICS" | "GENDER_NEUTRALITY" | "FALSE_FRIENDS" | "TYPOGRAPHY" => Self::Grammar,
            _ => Self::Other,
        }
    }

    #[must_use]
    pub fn style_class(self) -> StyleClass {
        match self {
            Self::Spelling => StyleClass::Red,
            Self::Grammar => StyleClass::Amber,
            Self::Other => StyleClass::Neutral,
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Spelling => write!(f, "spelling"),
            Category::Grammar => write!(f, "grammar"),
            Category::Other => write!(f, "other"),
        }
    }
}

/// How an annotation is rendered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StyleClass {
    Red,
    Amber,
    Neutral,
}

impl StyleClass {
    /// The CSS classes put on annotated spans.
    #[must_use]
    pub fn css_class(self) -> &'static str {
        match self {
            StyleClass::Red => "lt lt-spelling-error",
            StyleClass::Amber => "lt lt-grammar-error",
            StyleClass::Neutral => "lt lt-other-error",
        }
    }
}

/// One issue flagged by the checking service, with `offset` and `length`
/// counted in characters of the extracted text.
///
/// The `context_*` fields are kept exactly as the service reported them (in
/// UTF-16 code units). They identify a grammar issue independently of where
/// it currently sits in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub offset: usize,
    pub length: usize,
    pub rule_id: String,
    pub category_id: String,
    pub message: String,
    pub replacements: Vec<String>,
    pub context_text: String,
    pub context_offset: usize,
    pub context_length: usize,
}

impl Match {
    #[must_use]
    pub fn category(&self) -> Category { Category::classify(&self.category_id) }

    #[must_use]
    pub fn end(&self) -> usize { self.offset.saturating_add(self.length) }

    /// The flagged text as it appeared in the service's context snapshot.
    #[must_use]
    pub fn word(&self) -> Option<String> {
        let start = utf16_to_char_index(&self.context_text, self.context_offset)?;
        let end = utf16_to_char_index(
            &self.context_text,
            self.context_offset.checked_add(self.context_length)?,
        )?;

        Some(
            self.context_text
                .chars()
                .skip(start)
                .take(end.checked_sub(start)?)
                .collect(),
        )
    }

    /// Return a copy of the match moved by `by` characters.
    #[must_use]
    pub fn rebased(mut self, by: usize) -> Self {
        self.offset += by;
        self
    }
}

#[cfg(test)]
pub(crate) fn test_match(offset: usize, length: usize, category_id: &str) -> Match {
    Match {
        offset,
        length,
        rule_id: format!("{category_id}_RULE"),
        category_id: category_id.to_owned(),
        message: "Possible mistake found.".to_owned(),
        replacements: vec!["fix".to_owned()],
        context_text: String::new(),
        context_offset: 0,
        context_length: 0,
    }
}
