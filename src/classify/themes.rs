/// A theme label and the keyword substrings that trigger it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub name: &'static str,
    pub keywords: &'static [&'static str],
}

/// Assigned when no keyword in the table matches
pub const DEFAULT_THEME: &str = "shout-outs";

/// Declaration order is output order
pub const THEME_TABLE: &[Theme] = &[
    Theme {
        name: "sound",
        keywords: &["sound", "loud", "mix", "audio", "drumline", "battery", "pit"],
    },
    Theme {
        name: "drill",
        keywords: &["drill", "set", "forms", "formation", "charts", "pyware"],
    },
    Theme {
        name: "uniforms",
        keywords: &["uniform", "plume", "gauntlet", "shako", "hat"],
    },
    Theme {
        name: "spirit",
        keywords: &["go mavs", "go mavericks", "spirit", "hype", "fight song", "crowd"],
    },
    Theme {
        name: "shout-outs",
        keywords: &["shout out", "shout-out", "props", "great job", "thank", "proud"],
    },
    Theme {
        name: "logistics",
        keywords: &["arrival", "parking", "gate", "schedule", "time", "logistics"],
    },
];

/// Keyword-driven theme tagging over a fixed table
#[derive(Debug, Clone, Copy)]
pub struct ThemeTagger {
    table: &'static [Theme],
    default_theme: &'static str,
}

impl Default for ThemeTagger {
    fn default() -> Self {
        Self {
            table: THEME_TABLE,
            default_theme: DEFAULT_THEME,
        }
    }
}

impl ThemeTagger {
    /// Matching themes in table order; never empty
    pub fn tag(&self, text: &str) -> Vec<&'static str> {
        let lowered = text.to_lowercase();
        let matches: Vec<&'static str> = self
            .table
            .iter()
            .filter(|theme| theme.keywords.iter().any(|kw| lowered.contains(kw)))
            .map(|theme| theme.name)
            .collect();

        if matches.is_empty() {
            vec![self.default_theme]
        } else {
            matches
        }
    }
}

pub fn guess_themes(text: &str) -> Vec<&'static str> {
    ThemeTagger::default().tag(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_order_not_input_order() {
        assert_eq!(guess_themes("Nice uniform and clean drill"), vec!["drill", "uniforms"]);
        assert_eq!(guess_themes("drill and uniform"), vec!["drill", "uniforms"]);
    }

    #[test]
    fn test_default_theme_when_nothing_matches() {
        assert_eq!(guess_themes(""), vec![DEFAULT_THEME]);
        assert_eq!(guess_themes("lovely evening"), vec![DEFAULT_THEME]);
    }

    #[test]
    fn test_case_insensitive_multi_word_keywords() {
        assert_eq!(guess_themes("GO MAVS!!"), vec!["spirit"]);
        assert_eq!(guess_themes("Where is PARKING?"), vec!["logistics"]);
    }

    #[test]
    fn test_one_keyword_per_theme_is_enough_and_no_duplicates() {
        let themes = guess_themes("loud loud audio mix from the drumline");
        assert_eq!(themes, vec!["sound"]);
    }

    #[test]
    fn test_never_empty() {
        let samples = ["", " ", "x", "Thank you!", "the pit was loud", "🎺🎺"];
        for text in samples {
            let themes = guess_themes(text);
            assert!(!themes.is_empty(), "{text:?}");
            let is_default = themes == vec![DEFAULT_THEME];
            let any_keyword = THEME_TABLE
                .iter()
                .any(|t| t.keywords.iter().any(|kw| text.to_lowercase().contains(kw)));
            assert!(any_keyword || is_default);
        }
    }

    #[test]
    fn test_theme_names_listed_in_order() {
        let names: Vec<_> = THEME_TABLE.iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["sound", "drill", "uniforms", "spirit", "shout-outs", "logistics"]);
    }
}
