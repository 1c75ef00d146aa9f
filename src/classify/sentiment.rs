use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    pub fn as_str(self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse sentiment from the relevance score alone.
///
/// Computed separately from [`RelevanceLabel`](super::RelevanceLabel): a score
/// of 1 is "likely relevant" but still neutral here.
pub fn sentiment_from_score(score: i32) -> Sentiment {
    if score >= 2 {
        Sentiment::Positive
    } else if score <= -2 {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::RelevanceLabel;

    #[test]
    fn test_thresholds() {
        assert_eq!(sentiment_from_score(4), Sentiment::Positive);
        assert_eq!(sentiment_from_score(2), Sentiment::Positive);
        assert_eq!(sentiment_from_score(1), Sentiment::Neutral);
        assert_eq!(sentiment_from_score(0), Sentiment::Neutral);
        assert_eq!(sentiment_from_score(-1), Sentiment::Neutral);
        assert_eq!(sentiment_from_score(-2), Sentiment::Negative);
        assert_eq!(sentiment_from_score(-6), Sentiment::Negative);
    }

    #[test]
    fn test_monotonic_and_symmetric() {
        let rank = |s: Sentiment| match s {
            Sentiment::Negative => -1,
            Sentiment::Neutral => 0,
            Sentiment::Positive => 1,
        };
        for score in -10..10 {
            assert!(rank(sentiment_from_score(score)) <= rank(sentiment_from_score(score + 1)));
            assert_eq!(rank(sentiment_from_score(score)), -rank(sentiment_from_score(-score)));
        }
    }

    #[test]
    fn test_score_of_one_is_likely_relevant_but_neutral() {
        assert_eq!(RelevanceLabel::from_score(1), RelevanceLabel::Likely);
        assert_eq!(sentiment_from_score(1), Sentiment::Neutral);
    }

    #[test]
    fn test_serialized_form_is_lowercase() {
        assert_eq!(Sentiment::Negative.to_string(), "negative");
        assert_eq!(serde_json::to_string(&Sentiment::Positive).unwrap(), "\"positive\"");
    }
}
