use std::any::Any;

use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::coerce::{coerce, kind_of, Coerced};
use crate::context::ExprContext;
use crate::errors::{DynError, Errors, EvalError, Result};
use crate::interp::Interpreter;
use crate::schema::{FieldKind, RecordSchema};
use crate::Evaluator;

impl Evaluator {
    /// Walks every field of `record` in declaration order, evaluating the
    /// expression found in its annotation (if any) and, in mutating mode,
    /// writing the result back. Recurses into nested record fields. All
    /// per-field failures across the whole traversal are aggregated; a
    /// non-record root is the only immediately fatal condition.
    ///
    /// `schema` is the type-level metadata of `record`; `extra` is shared
    /// read-only with every expression context at every depth. The record
    /// must not be mutated externally for the duration of the call.
    pub fn eval(&self, schema: &RecordSchema, record: &mut Value, extra: &Value) -> Result<()> {
        if !record.is_object() {
            return Err(Errors(vec![EvalError::RootNotRecord(
                kind_of(record).to_string(),
            )]));
        }
        debug!(record = %schema.name, non_mutating = self.options.non_mutating, "evaluating record");
        let mut errs = Vec::new();
        let mut path = Vec::new();
        self.walk(schema, record, extra, &mut path, None, &mut errs);
        if errs.is_empty() {
            Ok(())
        } else {
            Err(Errors(errs))
        }
    }

    /// One level of the recursive walk. `path` addresses the current
    /// sub-record inside `root` (empty at the top level), so nested
    /// assignments land in the root object itself. `sub` is the parent
    /// field's interpreter result, threaded down one level only.
    fn walk(
        &self,
        schema: &RecordSchema,
        root: &mut Value,
        extra: &Value,
        path: &mut Vec<String>,
        sub: Option<&Value>,
        errs: &mut Vec<EvalError>,
    ) {
        for field in &schema.fields {
            let long_name = format!("{}.{}", schema.name, field.name);
            let mut tags = match self.scanner.tags(&field.annotation) {
                Ok(tags) => tags,
                Err(source) => {
                    errs.push(EvalError::Scan { long_name, source });
                    continue;
                }
            };

            let dispatched = self.interpreters.dispatch(&mut tags, &field.annotation);
            let should_eval = match &dispatched {
                Some((_, expr)) => !expr.is_empty() || self.options.eval_empty_tags,
                None => self.options.eval_empty_tags,
            };

            // The interpreter's raw result, kept (pre-coercion) to seed
            // nested-record evaluation through the Sub channel.
            let mut result: Option<Value> = None;
            if should_eval {
                match dispatched {
                    None => {
                        errs.push(EvalError::NoInterpreter {
                            long_name: long_name.clone(),
                        });
                    }
                    Some((interp, expr)) => {
                        let val = current_value(root, path, &field.name).cloned();
                        let ctx = ExprContext::new(
                            &field.name,
                            &long_name,
                            tags,
                            &*root,
                            extra,
                            sub,
                            val,
                            &self.interpreters,
                        );
                        trace!(field = %long_name, expr = %expr, "executing interpreter");
                        match execute_guarded(interp.as_ref(), &expr, &ctx) {
                            Err(source) => {
                                errs.push(EvalError::Interp {
                                    long_name: long_name.clone(),
                                    source,
                                });
                            }
                            Ok(value) => {
                                if !self.options.non_mutating && field.writable {
                                    match coerce(&field.kind, value.clone()) {
                                        Ok(Coerced::Assign(converted)) => {
                                            trace!(field = %long_name, "assigning result");
                                            if let Some(obj) = record_slot(root, path) {
                                                obj.insert(field.name.clone(), converted);
                                            }
                                        }
                                        Ok(Coerced::Skip) => {}
                                        Err(message) => {
                                            errs.push(EvalError::Coerce {
                                                long_name: long_name.clone(),
                                                message,
                                            });
                                        }
                                    }
                                }
                                result = Some(value);
                            }
                        }
                    }
                }
            }

            if let FieldKind::Record(sub_schema) = &field.kind {
                if !self.options.non_mutating {
                    // A nested record that was never populated still has
                    // fields to evaluate; give it its zero value first so
                    // assignments have somewhere to land.
                    if let Some(obj) = record_slot(root, path) {
                        let missing = matches!(obj.get(&field.name), None | Some(Value::Null));
                        if missing {
                            obj.insert(field.name.clone(), sub_schema.zero_value());
                        }
                    }
                }
                trace!(field = %long_name, "descending into nested record");
                path.push(field.name.clone());
                self.walk(sub_schema, root, extra, path, result.as_ref(), errs);
                path.pop();
            }
        }
    }
}

/// Resolves the object holding the current sub-record's fields.
fn record_slot<'v>(root: &'v mut Value, path: &[String]) -> Option<&'v mut Map<String, Value>> {
    let mut cur = root;
    for key in path {
        cur = cur.as_object_mut()?.get_mut(key)?;
    }
    cur.as_object_mut()
}

fn current_value<'v>(root: &'v Value, path: &[String], name: &str) -> Option<&'v Value> {
    let mut cur = root;
    for key in path {
        cur = cur.get(key)?;
    }
    cur.get(name)
}

/// Runs the interpreter with a panic guard: a panicking interpreter becomes
/// an ordinary per-field error instead of unwinding past the walk.
fn execute_guarded(
    interp: &dyn Interpreter,
    expr: &str,
    ctx: &ExprContext<'_>,
) -> std::result::Result<Value, DynError> {
    match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| interp.execute(expr, ctx))) {
        Ok(res) => res,
        Err(panic) => Err(panic_message(panic).into()),
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("interpreter panicked: {s}")
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("interpreter panicked: {s}")
    } else {
        "interpreter panicked".to_string()
    }
}
