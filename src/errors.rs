use itertools::Itertools;
use thiserror::Error;

/// Error type collaborators (scanners, interpreters) return. Kept opaque so
/// implementations can surface whatever error stack they already use.
pub type DynError = Box<dyn std::error::Error + Send + Sync>;

/// A single evaluation failure. Everything except `RootNotRecord` is local
/// to one field and carries the `OwnerType.FieldName` long name so the
/// offending field can be identified in the aggregate.
#[derive(Debug, Error)]
pub enum EvalError {
    /// The value handed to eval was not a record. Fatal for the whole call.
    #[error("root value must be a record (JSON object), actually: {0}")]
    RootNotRecord(String),

    /// The scanner rejected the field's raw annotation string.
    #[error("<<{long_name}>>: {source}")]
    Scan { long_name: String, source: DynError },

    /// An expression asked for an interpreter that is not registered.
    #[error("unknown interpreter: {0}")]
    UnknownInterpreter(String),

    /// The selected interpreter failed (or panicked) while executing.
    #[error("<<{long_name}>>: {source}")]
    Interp { long_name: String, source: DynError },

    /// Empty-tag evaluation was requested for a field with no interpreter.
    #[error("<<{long_name}>>: no interpreter registered for field without expression")]
    NoInterpreter { long_name: String },

    /// The interpreter's result could not be converted into the field.
    #[error("<<{long_name}>>: {message}")]
    Coerce { long_name: String, message: String },
}

/// Aggregate of all per-field failures from one eval call, in traversal
/// order across every recursion depth. Never empty: "no failure" is `Ok(())`.
#[derive(Debug)]
pub struct Errors(pub(crate) Vec<EvalError>);

impl Errors {
    pub fn iter(&self) -> impl Iterator<Item = &EvalError> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for Errors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.len() == 1 {
            return write!(f, "1 error occurred:\n  * {}", self.0[0]);
        }
        write!(
            f,
            "{} errors occurred:\n{}",
            self.0.len(),
            self.0.iter().map(|e| format!("  * {e}")).join("\n")
        )
    }
}

impl std::error::Error for Errors {}

pub type Result<T> = std::result::Result<T, Errors>;
