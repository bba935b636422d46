use std::sync::Arc;

use serde_json::Value;

use crate::context::ExprContext;
use crate::errors::DynError;

/// Registry key for the catch-all interpreter: a field whose tag map matched
/// no registered name is handed the *entire raw annotation string* as its
/// expression. Probed after all named interpreters.
pub const WHOLE_TAG: &str = "";

/// Evaluates one expression against a field-scoped context. Implementations
/// may perform I/O and may call back into other registered interpreters via
/// [`ExprContext::eval_expr`].
pub trait Interpreter: Send + Sync {
    fn execute(&self, expr: &str, ctx: &ExprContext<'_>) -> Result<Value, DynError>;
}

/// Tag-name to interpreter registry. Dispatch is deterministic: names are
/// probed in registration order and the first one present in a field's tag
/// map wins, so register higher-priority interpreters first. Re-registering
/// a name replaces the previous entry in place.
#[derive(Clone, Default)]
pub struct Interpreters {
    entries: Vec<(String, Arc<dyn Interpreter>)>,
}

impl Interpreters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, tag: impl Into<String>, interp: impl Interpreter + 'static) -> Self {
        self.register_arc(tag, Arc::new(interp));
        self
    }

    pub fn register_arc(&mut self, tag: impl Into<String>, interp: Arc<dyn Interpreter>) {
        let tag = tag.into();
        match self.entries.iter_mut().find(|(name, _)| *name == tag) {
            Some(entry) => entry.1 = interp,
            None => self.entries.push((tag, interp)),
        }
    }

    pub fn get(&self, tag: &str) -> Option<Arc<dyn Interpreter>> {
        self.entries
            .iter()
            .find(|(name, _)| name == tag)
            .map(|(_, interp)| Arc::clone(interp))
    }

    /// Registered names in dispatch (registration) order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Selects the interpreter for one field. Named entries are probed in
    /// registration order against the tag map; the winning entry is removed
    /// and its value becomes the expression. The catch-all, probed last,
    /// receives the whole unparsed annotation instead.
    pub(crate) fn dispatch(
        &self,
        tags: &mut crate::scanner::TagMap,
        raw_annotation: &str,
    ) -> Option<(Arc<dyn Interpreter>, String)> {
        for (name, interp) in &self.entries {
            if name == WHOLE_TAG {
                continue;
            }
            if let Some(expr) = tags.remove(name.as_str()) {
                return Some((Arc::clone(interp), expr));
            }
        }
        self.get(WHOLE_TAG).map(|interp| {
            tags.remove(WHOLE_TAG);
            (interp, raw_annotation.to_string())
        })
    }
}
