pub const DEFAULT_LANGUAGE: &str = "auto";
pub const DEFAULT_DEBOUNCE_TIME_MS: u64 = 800;
pub const DEFAULT_FRAGMENT_PADDING: usize = 250;
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

pub const DEFAULT_SQLITE_URL: &str = "sqlite://ignored_suggestions.sqlite";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 4;

/// Stands in for inline leaves without text (images, formulas) in the
/// extracted text so that offsets stay aligned.
pub const INLINE_PLACEHOLDER: char = ' ';

/// Separates blocks in the extracted text so that the checking service sees
/// paragraph boundaries as sentence breaks.
pub const BLOCK_SEPARATOR: char = '\n';

/// The service omits the category for some rules, these are treated as typos.
pub const FALLBACK_CATEGORY_ID: &str = "TYPOS";
