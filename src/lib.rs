//! Annotation-driven record field initialization.
//!
//! Fields of a record carry small expressions in per-field metadata
//! annotations; the [`Evaluator`] walks a record instance in declaration
//! order, hands each expression to a registered [`Interpreter`] together
//! with an [`ExprContext`] (sibling fields, caller-supplied extra context,
//! values propagated from parent fields), and writes the result back into
//! the field. The expression language and the annotation syntax are both
//! pluggable: the engine only orchestrates.
//!
//! Records are `serde_json::Value` objects described by a [`RecordSchema`],
//! the type-level side table holding each field's declared kind and raw
//! annotation string. Evaluation relies on interpretation and dynamic
//! values throughout, so it suits one-time setup of configuration-like
//! objects rather than hot paths.

pub mod context;
pub mod errors;
pub mod interp;
pub mod scanner;
pub mod schema;

mod coerce;
mod engine;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use context::ExprContext;
pub use errors::{DynError, Errors, EvalError, Result};
pub use interp::{Interpreter, Interpreters, WHOLE_TAG};
pub use scanner::{Scanner, TagMap};
pub use schema::{FieldKind, FieldSpec, RecordSchema};

/// Evaluation knobs. Serde-enabled so applications can carry them in their
/// own configuration.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Options {
    /// Compute results but never write them back into the record.
    /// Interpreters may still have side effects of their own.
    #[serde(default)]
    pub non_mutating: bool,
    /// Evaluate fields even when no expression was found, passing an empty
    /// expression string. Only useful together with a catch-all interpreter.
    #[serde(default)]
    pub eval_empty_tags: bool,
}

/// The evaluation engine. Constructed once (scanner, interpreter registry
/// and options are fixed for its lifetime) and reusable across records.
pub struct Evaluator {
    pub(crate) scanner: Arc<dyn Scanner>,
    pub(crate) interpreters: Interpreters,
    pub(crate) options: Options,
}

impl Evaluator {
    /// Mutating evaluator with default options.
    ///
    /// Panics if `interpreters` is empty: an evaluator with no interpreters
    /// can never do useful work, so misconfiguration fails at construction.
    pub fn new(scanner: Arc<dyn Scanner>, interpreters: Interpreters) -> Self {
        Self::with_options(scanner, interpreters, Options::default())
    }

    /// Evaluator that computes every expression but leaves the record
    /// untouched. See [`Evaluator::new`].
    pub fn non_mutating(scanner: Arc<dyn Scanner>, interpreters: Interpreters) -> Self {
        Self::with_options(
            scanner,
            interpreters,
            Options {
                non_mutating: true,
                ..Options::default()
            },
        )
    }

    /// Evaluator with explicit options. Panics if `interpreters` is empty.
    pub fn with_options(
        scanner: Arc<dyn Scanner>,
        interpreters: Interpreters,
        options: Options,
    ) -> Self {
        if interpreters.is_empty() {
            panic!("tag-eval: no interpreters registered");
        }
        Self {
            scanner,
            interpreters,
            options,
        }
    }

    pub fn options(&self) -> Options {
        self.options
    }
}
