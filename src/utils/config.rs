//! Configuration and constants.

/// Current output schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

// Pattern compression bounds.
// Longer patterns are preferred over shorter ones, so the scan starts at
// the upper bound and works down; 20 keeps the scan quadratic-ish on the
// traces the collector actually produces.
pub const MAX_PATTERN_SCAN_LENGTH: usize = 20;
pub const DEFAULT_MIN_PATTERN_LENGTH: usize = 2;
pub const DEFAULT_MIN_REPETITIONS: usize = 2;

// Where-entry dataset selection defaults (same knobs the collector-side
// pipeline exposes as --min_path_amt / --max_siblings).
pub const DEFAULT_MIN_PATH_COUNT: usize = 4;
pub const DEFAULT_MAX_SIBLINGS: usize = 100;

/// Substrings that mark a caller line as import-resolution machinery.
/// Frames whose parent location matches are collapsed to the sentinel
/// instead of exposing resolver internals in "where" output.
pub const IMPORT_MACHINERY_MARKERS: &[&str] = &["<frozen importlib", "importlib._bootstrap"];

/// Sentinel shown in place of an import-machinery caller line
pub const IMPORT_CALL_SENTINEL: &str = "<import_call>";

/// Path segment that identifies an externally-installed package location
pub const SITE_PACKAGES_SEGMENT: &str = "/site-packages/";
