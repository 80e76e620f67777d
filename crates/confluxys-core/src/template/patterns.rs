//! Fixed patterns used while authoring templates.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Example value shapes, most specific first
    pub static ref INTEGER_VALUE: Regex = Regex::new(r"^\d+$").unwrap();

    pub static ref DECIMAL_VALUE: Regex = Regex::new(r"^\d+\.\d+$").unwrap();

    // Characters not allowed in generated table/column names
    pub static ref NON_IDENTIFIER: Regex = Regex::new(r"[^a-zA-Z0-9_]").unwrap();
}

/// Capture group for integer examples.
pub const INTEGER_CAPTURE: &str = r"(\d+)";

/// Capture group for decimal examples.
pub const DECIMAL_CAPTURE: &str = r"(\d+\.?\d*)";

/// Capture group for multi-word examples; stops at the trailing literal.
pub const PHRASE_CAPTURE: &str = r"(.+?)";

/// Capture group for single-token examples.
pub const TOKEN_CAPTURE: &str = r"(\S+)";

/// Prefix of every generated table name.
pub const TABLE_PREFIX: &str = "doc_";
