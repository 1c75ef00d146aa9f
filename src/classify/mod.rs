//! Rule-based comment classification: relevance, sentiment and themes.

pub mod relevance;
pub mod sentiment;
pub mod themes;

pub use relevance::{score_text, RelevanceLabel, RuleSet, ScoringResult};
pub use sentiment::{sentiment_from_score, Sentiment};
pub use themes::{guess_themes, Theme, ThemeTagger, DEFAULT_THEME, THEME_TABLE};

use crate::constants::THEME_SEPARATOR;

/// Derived fields written next to the normalized columns
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub sentiment: Sentiment,
    pub themes: Vec<&'static str>,
    pub confidence: f64,
    pub notes: String,
    pub relevance: RelevanceLabel,
}

impl Classification {
    pub fn themes_field(&self) -> String {
        self.themes.join(THEME_SEPARATOR)
    }

    pub fn confidence_field(&self) -> String {
        format!("{:.1}", self.confidence)
    }
}

/// Applies one rule set and the theme table uniformly to every comment of a run
pub struct Classifier<'a> {
    rules: &'a RuleSet,
    tagger: ThemeTagger,
}

impl<'a> Classifier<'a> {
    pub fn new(rules: &'a RuleSet) -> Self {
        Self {
            rules,
            tagger: ThemeTagger::default(),
        }
    }

    pub fn classify(&self, text: &str) -> Classification {
        let scored = score_text(text, self.rules);
        Classification {
            sentiment: sentiment_from_score(scored.score),
            themes: self.tagger.tag(text),
            confidence: scored.confidence,
            notes: scored.notes,
            relevance: scored.label,
        }
    }
}
