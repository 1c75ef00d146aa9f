use serde::de::{Deserializer, IgnoredAny};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::constants::NOTES_SEPARATOR;

/// Keyword rules for relevance scoring. Every category defaults to an empty list.
///
/// A rule set is read-only for the duration of a classification run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    #[serde(default, deserialize_with = "lenient_terms")]
    pub positive_terms: Vec<String>,
    #[serde(default, deserialize_with = "lenient_terms")]
    pub negative_terms: Vec<String>,
    #[serde(default, deserialize_with = "lenient_terms")]
    pub neutral_terms: Vec<String>,
}

impl RuleSet {
    pub fn new<S: Into<String>>(
        positive_terms: impl IntoIterator<Item = S>,
        negative_terms: impl IntoIterator<Item = S>,
        neutral_terms: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            positive_terms: positive_terms.into_iter().map(Into::into).collect(),
            negative_terms: negative_terms.into_iter().map(Into::into).collect(),
            neutral_terms: neutral_terms.into_iter().map(Into::into).collect(),
        }
    }
}

/// Accept a list of strings; anything else becomes an empty list and non-string entries are dropped
fn lenient_terms<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Entry {
        Term(String),
        Other(IgnoredAny),
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Terms {
        List(Vec<Entry>),
        Other(IgnoredAny),
    }

    Ok(match Terms::deserialize(deserializer)? {
        Terms::List(entries) => entries
            .into_iter()
            .filter_map(|entry| match entry {
                Entry::Term(term) => Some(term),
                Entry::Other(_) => {
                    warn!("Ignoring non-string rule term");
                    None
                }
            })
            .collect(),
        Terms::Other(_) => {
            warn!("Ignoring malformed rule term list");
            Vec::new()
        }
    })
}

/// How confident we are that a comment concerns the tracked organization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RelevanceLabel {
    /// Strongly relevant; the organization is clearly referenced
    Verified,
    Likely,
    NotRelevant,
    Uncertain,
}

impl RelevanceLabel {
    /// Thresholds are checked in priority order: `>= 2`, `== 1`, `<= -2`, otherwise uncertain
    pub fn from_score(score: i32) -> Self {
        if score >= 2 {
            RelevanceLabel::Verified
        } else if score == 1 {
            RelevanceLabel::Likely
        } else if score <= -2 {
            RelevanceLabel::NotRelevant
        } else {
            RelevanceLabel::Uncertain
        }
    }

    pub fn confidence(self) -> f64 {
        match self {
            RelevanceLabel::Verified | RelevanceLabel::NotRelevant => 1.0,
            RelevanceLabel::Likely => 0.5,
            RelevanceLabel::Uncertain => 0.3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RelevanceLabel::Verified => "verified",
            RelevanceLabel::Likely => "likely relevant",
            RelevanceLabel::NotRelevant => "not relevant",
            RelevanceLabel::Uncertain => "uncertain",
        }
    }
}

/// Outcome of scoring one comment; consumed immediately by the classify stage
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringResult {
    pub text: String,
    pub score: i32,
    pub label: RelevanceLabel,
    pub confidence: f64,
    /// `+term`, `-term` and `~term` entries joined by `;`
    pub notes: String,
}

/// Distinct terms (by trimmed, lowercased form) that occur in `lowered`, in rule order.
/// Hits are returned as configured, surrounding whitespace included.
fn matched_terms<'a>(lowered: &str, terms: &'a [String]) -> Vec<&'a str> {
    let mut seen: Vec<String> = Vec::new();
    let mut hits = Vec::new();
    for term in terms {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() || seen.contains(&needle) {
            continue;
        }
        if lowered.contains(&needle) {
            hits.push(term.as_str());
        }
        seen.push(needle);
    }
    hits
}

/// Apply relevance rules to one comment.
///
/// `score = 2 * positives - 2 * negatives`; neutral matches only show up in the notes.
pub fn score_text(text: &str, rules: &RuleSet) -> ScoringResult {
    let lowered = text.to_lowercase();
    let positives = matched_terms(&lowered, &rules.positive_terms);
    let negatives = matched_terms(&lowered, &rules.negative_terms);
    let neutrals = matched_terms(&lowered, &rules.neutral_terms);

    let score = 2 * positives.len() as i32 - 2 * negatives.len() as i32;
    let label = RelevanceLabel::from_score(score);

    let notes = positives
        .iter()
        .map(|t| format!("+{t}"))
        .chain(negatives.iter().map(|t| format!("-{t}")))
        .chain(neutrals.iter().map(|t| format!("~{t}")))
        .collect::<Vec<_>>()
        .join(NOTES_SEPARATOR);

    ScoringResult {
        text: text.to_string(),
        score,
        label,
        confidence: label.confidence(),
        notes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn band_rules() -> RuleSet {
        RuleSet::new(vec!["band", "great job"], vec!["spam"], vec![])
    }

    #[test]
    fn test_strong_positive_comment() {
        let result = score_text("Great job band!", &band_rules());
        assert_eq!(result.score, 4);
        assert_eq!(result.label, RelevanceLabel::Verified);
        assert_eq!(result.confidence, 1.0);
        assert_eq!(result.notes, "+band;+great job");
        assert_eq!(result.text, "Great job band!");
    }

    #[test]
    fn test_empty_text() {
        let result = score_text("", &band_rules());
        assert_eq!(result.score, 0);
        assert_eq!(result.label, RelevanceLabel::Uncertain);
        assert_eq!(result.confidence, 0.3);
        assert_eq!(result.notes, "");
    }

    #[test]
    fn test_label_boundaries() {
        let cases = [
            (3, RelevanceLabel::Verified, 1.0),
            (2, RelevanceLabel::Verified, 1.0),
            (1, RelevanceLabel::Likely, 0.5),
            (0, RelevanceLabel::Uncertain, 0.3),
            (-1, RelevanceLabel::Uncertain, 0.3),
            (-2, RelevanceLabel::NotRelevant, 1.0),
            (-4, RelevanceLabel::NotRelevant, 1.0),
        ];
        for (score, label, confidence) in cases {
            assert_eq!(RelevanceLabel::from_score(score), label, "score {score}");
            assert_eq!(label.confidence(), confidence, "score {score}");
        }
    }

    #[test]
    fn test_negative_and_neutral_notes_order() {
        let rules = RuleSet::new(vec!["mesa"], vec!["spam", "bot"], vec!["game"]);
        let result = score_text("Spam BOT posting about the game at Mesa", &rules);
        assert_eq!(result.score, -2);
        assert_eq!(result.label, RelevanceLabel::NotRelevant);
        assert_eq!(result.notes, "+mesa;-spam;-bot;~game");
    }

    #[test]
    fn test_neutral_terms_do_not_move_score() {
        let rules = RuleSet::new(vec![], vec![], vec!["halftime"]);
        let result = score_text("See you at halftime", &rules);
        assert_eq!(result.score, 0);
        assert_eq!(result.notes, "~halftime");
    }

    #[test]
    fn test_terms_are_trimmed_deduplicated_and_case_insensitive() {
        let rules = RuleSet::new(vec![" Band ", "band", "BAND", "", "   "], vec![], vec![]);
        let result = score_text("what a BAND", &rules);
        assert_eq!(result.score, 2);
        assert_eq!(result.notes, "+ Band ");
    }

    #[test]
    fn test_empty_rule_set_never_fails() {
        let result = score_text("Great job band!", &RuleSet::default());
        assert_eq!(result.score, 0);
        assert_eq!(result.label, RelevanceLabel::Uncertain);
        assert_eq!(result.notes, "");
    }

    #[test]
    fn test_score_is_twice_positive_minus_negative() {
        let rules = RuleSet::new(vec!["alpha", "beta", "gamma"], vec!["delta", "epsilon"], vec![]);
        let texts = [
            ("alpha beta gamma", 6),
            ("alpha delta", 0),
            ("delta epsilon", -4),
            ("alpha beta delta", 2),
            ("nothing here", 0),
        ];
        for (text, expected) in texts {
            assert_eq!(score_text(text, &rules).score, expected, "{text}");
        }
    }
}
