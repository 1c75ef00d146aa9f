use std::collections::HashMap;
use tracing::{debug, warn};

use crate::constants::{
    CAPTION_EXCERPT_MAX_CHARS, COMMENTER_HANDLE, COMMENT_ID, COMMENT_TEXT, DATE_UTC, NORMALIZED_COLUMNS,
    PLATFORM, POST_CAPTION_EXCERPT, POST_OWNER_HANDLE, POST_URL,
};
use crate::table::Table;

/// Source column aliases for each normalized field, highest priority first
pub const DEFAULT_ALIASES: [(&str, &[&str]); 8] = [
    (DATE_UTC, &["date", "timestamp", "created_at"]),
    (PLATFORM, &["platform"]),
    (POST_URL, &["post_url", "url", "link"]),
    (POST_OWNER_HANDLE, &["post_owner", "page", "owner"]),
    (POST_CAPTION_EXCERPT, &["post_caption", "caption", "message"]),
    (COMMENT_ID, &["comment_id", "cid", "commentid"]),
    (COMMENTER_HANDLE, &["commenter", "user", "username", "profile_name"]),
    (COMMENT_TEXT, &["comment_text", "text", "message", "body"]),
];

/// How one normalized column is resolved from an export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub column: &'static str,
    pub aliases: Vec<String>,
    /// Used for every row when none of the aliases exist in the export
    pub default: String,
}

/// Maps heterogeneous export columns onto the eight-column normalized schema
#[derive(Debug, Clone)]
pub struct Normalizer {
    fields: Vec<FieldSpec>,
}

impl Normalizer {
    pub fn new(default_platform: &str) -> Self {
        let fields = DEFAULT_ALIASES
            .iter()
            .map(|(column, aliases)| FieldSpec {
                column: *column,
                aliases: aliases.iter().map(|a| a.to_string()).collect(),
                default: if *column == PLATFORM {
                    default_platform.to_string()
                } else {
                    String::new()
                },
            })
            .collect();
        Self { fields }
    }

    /// Replace the alias list of individual fields. Unknown field names are ignored.
    pub fn with_alias_overrides(mut self, overrides: &HashMap<String, Vec<String>>) -> Self {
        for (column, aliases) in overrides {
            match self.fields.iter_mut().find(|f| f.column == column.as_str()) {
                Some(field) => field.aliases = aliases.clone(),
                None => warn!("Ignoring aliases for unknown column '{}'", column),
            }
        }
        self
    }

    /// First alias present in the export wins; exact header beats a case-insensitive one
    fn resolve(&self, field: &FieldSpec, table: &Table) -> Option<usize> {
        field.aliases.iter().find_map(|alias| table.find_column(alias))
    }

    /// Produce the normalized table. Row count and order are preserved.
    pub fn normalize(&self, table: &Table) -> Table {
        let mut normalized = Table::new(NORMALIZED_COLUMNS);
        if table.is_empty() {
            return normalized;
        }

        let sources: Vec<Option<usize>> = self
            .fields
            .iter()
            .map(|field| {
                let idx = self.resolve(field, table);
                match idx {
                    Some(i) => debug!("{} <- {}", field.column, table.headers()[i]),
                    None => debug!("{} <- default {:?}", field.column, field.default),
                }
                idx
            })
            .collect();

        for row in table.rows() {
            let cells = self
                .fields
                .iter()
                .zip(&sources)
                .map(|(field, source)| {
                    let value = match source {
                        Some(i) => row[*i].clone(),
                        None => field.default.clone(),
                    };
                    if field.column == POST_CAPTION_EXCERPT {
                        truncate_chars(&value, CAPTION_EXCERPT_MAX_CHARS)
                    } else {
                        value
                    }
                })
                .collect();
            normalized.push_row(cells);
        }
        normalized
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(crate::constants::DEFAULT_PLATFORM)
    }
}

fn truncate_chars(value: &str, max: usize) -> String {
    match value.char_indices().nth(max) {
        Some((byte_idx, _)) => value[..byte_idx].to_string(),
        None => value.to_string(),
    }
}
