use serde_json::Value;

use crate::errors::{DynError, EvalError};
use crate::interp::Interpreters;
use crate::scanner::TagMap;

/// Everything an interpreter may see while evaluating one field's
/// expression. Built fresh per field and discarded afterwards.
///
/// `root` always refers to the record passed into the outermost eval call,
/// never to a sub-record, and `extra` is the same reference at every
/// recursion depth. Interpreters composing expression languages can clone
/// the context and adjust the public fields before handing it to
/// [`ExprContext::eval_expr`].
#[derive(Clone)]
pub struct ExprContext<'a> {
    /// Declaration name of the field being evaluated.
    pub name: &'a str,
    /// `OwnerType.FieldName`, for error attribution.
    pub long_name: &'a str,
    /// Remaining tags of the field, with the consumed interpreter key removed.
    pub tags: TagMap,
    /// The root record of the whole eval call.
    pub root: &'a Value,
    /// Caller-supplied extra context; the engine never mutates it.
    pub extra: &'a Value,
    /// The parent field's interpreter result, when this field belongs to a
    /// nested record reached by recursion.
    pub sub: Option<&'a Value>,
    /// The field's current value, if it has one.
    pub val: Option<Value>,
    registry: &'a Interpreters,
}

impl<'a> ExprContext<'a> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        name: &'a str,
        long_name: &'a str,
        tags: TagMap,
        root: &'a Value,
        extra: &'a Value,
        sub: Option<&'a Value>,
        val: Option<Value>,
        registry: &'a Interpreters,
    ) -> Self {
        Self {
            name,
            long_name,
            tags,
            root,
            extra,
            sub,
            val,
            registry,
        }
    }

    /// Invokes another registered interpreter by name against an arbitrary
    /// expression and context. Lets interpreters compose expression
    /// languages; an unregistered name is an error surfaced to the caller.
    pub fn eval_expr(
        &self,
        interpreter: &str,
        expr: &str,
        ctx: &ExprContext<'_>,
    ) -> Result<Value, DynError> {
        match self.registry.get(interpreter) {
            Some(interp) => interp.execute(expr, ctx),
            None => Err(Box::new(EvalError::UnknownInterpreter(
                interpreter.to_string(),
            ))),
        }
    }
}
