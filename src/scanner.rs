use std::collections::HashMap;

use crate::errors::DynError;

/// Tag-name to tag-value mapping scanned out of one raw annotation string.
pub type TagMap = HashMap<String, String>;

/// Parses a field's raw metadata annotation into a tag map. Implementations
/// must be pure: same input, same output. A scan failure skips that field's
/// evaluation and is recorded against the field.
pub trait Scanner: Send + Sync {
    fn tags(&self, raw: &str) -> Result<TagMap, DynError>;
}
