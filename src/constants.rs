/// Column and artifact constants shared across the pipeline stages.
/// The column lists define the on-disk shape of every stage artifact.

// Normalized schema (stage 2 output)
pub const DATE_UTC: &str = "date_utc";
pub const PLATFORM: &str = "platform";
pub const POST_URL: &str = "post_url";
pub const POST_OWNER_HANDLE: &str = "post_owner_handle";
pub const POST_CAPTION_EXCERPT: &str = "post_caption_excerpt";
pub const COMMENT_ID: &str = "comment_id";
pub const COMMENTER_HANDLE: &str = "commenter_handle";
pub const COMMENT_TEXT: &str = "comment_text";

// Derived classification fields (stage 3 output)
pub const SENTIMENT: &str = "sentiment";
pub const THEMES: &str = "themes";
pub const CONFIDENCE: &str = "confidence_cmumesa";
pub const NOTES: &str = "notes";

/// The eight columns every export format is mapped onto
pub const NORMALIZED_COLUMNS: [&str; 8] = [
    DATE_UTC,
    PLATFORM,
    POST_URL,
    POST_OWNER_HANDLE,
    POST_CAPTION_EXCERPT,
    COMMENT_ID,
    COMMENTER_HANDLE,
    COMMENT_TEXT,
];

/// The twelve columns of the classified table and final report, in order
pub const SCHEMA_COLUMNS: [&str; 12] = [
    DATE_UTC,
    PLATFORM,
    POST_URL,
    POST_OWNER_HANDLE,
    POST_CAPTION_EXCERPT,
    COMMENT_ID,
    COMMENTER_HANDLE,
    COMMENT_TEXT,
    SENTIMENT,
    THEMES,
    CONFIDENCE,
    NOTES,
];

/// Single column of the candidates artifact
pub const QUERY: &str = "query";

/// Provenance column appended to every row read from a multi-file export directory
pub const SOURCE_FILE: &str = "__source_file";

pub const CAPTION_EXCERPT_MAX_CHARS: usize = 200;
pub const DEFAULT_PLATFORM: &str = "facebook";
pub const THEME_SEPARATOR: &str = "|";
pub const NOTES_SEPARATOR: &str = ";";

// Artifact layout under the data directory
pub const RAW_DIR: &str = "raw";
pub const WORK_DIR: &str = "work";
pub const CANDIDATES_FILE: &str = "candidates.csv";
pub const NORMALIZED_FILE: &str = "comments_raw.csv";
pub const CLASSIFIED_FILE: &str = "comments_classified.csv";
pub const REPORT_FILE: &str = "monitor_report.csv";

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";
pub const CONFIG_ENV_VAR: &str = "SOCIAL_MONITOR_CONFIG";
pub const DEFAULT_WINDOW: &str = "21d";

// Process exit codes reported by the CLI
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_MISSING_INPUT: i32 = 2;
pub const EXIT_EMPTY_INPUT: i32 = 3;
