use serde::{Deserialize, Serialize};

use crate::classifier::taxonomy::{MatchPolicy, Taxonomy};

const QUOTE_CHARS: &[char] = &['"', '\'', '`', '\u{201C}', '\u{201D}', '\u{2018}', '\u{2019}'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationOutcome {
    Matched,
    FreeForm,
    NoMatch,
    InsufficientInput,
    ServiceError,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub label: String,
    pub outcome: ClassificationOutcome,
}

impl Classification {
    pub fn new(label: impl Into<String>, outcome: ClassificationOutcome) -> Self {
        Self {
            label: label.into(),
            outcome,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        matches!(
            self.outcome,
            ClassificationOutcome::NoMatch
                | ClassificationOutcome::InsufficientInput
                | ClassificationOutcome::ServiceError
        )
    }
}

/// Maps a raw model reply onto a label of `taxonomy`.
///
/// Surrounding whitespace and quote marks are stripped first. Under
/// [`MatchPolicy::Contains`] the labels are tried in configured order and the
/// first one occurring anywhere in the reply wins, so an earlier label beats a
/// later one even if the later one appears first in the text. Under
/// [`MatchPolicy::FreeForm`] everything but ASCII letters, digits and
/// whitespace is dropped and the first `max_words` words are joined with `_`.
/// A reply that yields nothing, or that only repeats the `no_match` sentinel
/// the open-set prompt offers, maps to the `no_match` sentinel.
pub fn resolve_label(reply: &str, taxonomy: &Taxonomy) -> Classification {
    let reply = reply.trim().trim_matches(QUOTE_CHARS).trim();

    let resolved = match &taxonomy.match_policy {
        MatchPolicy::Contains { case_sensitive } => {
            first_contained_label(reply, &taxonomy.labels, *case_sensitive)
                .map(|label| Classification::new(label, ClassificationOutcome::Matched))
        }
        MatchPolicy::FreeForm { max_words } => {
            let token = free_form_token(reply, *max_words);
            let echoes_no_match = token
                .eq_ignore_ascii_case(&free_form_token(&taxonomy.sentinels.no_match, *max_words));
            (!token.is_empty() && !echoes_no_match)
                .then(|| Classification::new(token, ClassificationOutcome::FreeForm))
        }
    };

    resolved.unwrap_or_else(|| {
        Classification::new(
            taxonomy.sentinels.no_match.clone(),
            ClassificationOutcome::NoMatch,
        )
    })
}

fn first_contained_label<'a>(
    reply: &str,
    labels: &'a [String],
    case_sensitive: bool,
) -> Option<&'a str> {
    if case_sensitive {
        return labels
            .iter()
            .find(|label| !label.is_empty() && reply.contains(label.as_str()))
            .map(String::as_str);
    }

    let reply = reply.to_lowercase();
    labels
        .iter()
        .find(|label| !label.is_empty() && reply.contains(&label.to_lowercase()))
        .map(String::as_str)
}

fn free_form_token(reply: &str, max_words: usize) -> String {
    let cleaned = reply
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect::<String>();
    cleaned
        .split_whitespace()
        .take(max_words.max(1))
        .collect::<Vec<_>>()
        .join("_")
}
