#![allow(dead_code)]

use serde_json::{json, Value};
use tag_eval::{DynError, ExprContext, Interpreter, Scanner, TagMap};

/// Initializes a fmt subscriber once so `--nocapture` runs show the
/// engine's debug/trace output.
pub fn init_tracing() {
    use std::sync::Once;
    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

/// Strict Go-struct-tag style scanner: whitespace-separated `key:"value"`
/// pairs. Anything else is a scan error.
pub struct TagScanner;

impl Scanner for TagScanner {
    fn tags(&self, raw: &str) -> Result<TagMap, DynError> {
        let mut tags = TagMap::new();
        let mut s = raw.trim_start();
        while !s.is_empty() {
            let Some(colon) = s.find(':') else {
                return Err(format!("malformed tag near {s:?}").into());
            };
            let key = &s[..colon];
            if key.is_empty() || key.contains(char::is_whitespace) {
                return Err(format!("malformed tag key near {s:?}").into());
            }
            let after = &s[colon + 1..];
            let Some(quoted) = after.strip_prefix('"') else {
                return Err(format!("missing quote after {key:?}").into());
            };
            let Some(end) = quoted.find('"') else {
                return Err(format!("unterminated value for {key:?}").into());
            };
            tags.insert(key.to_string(), quoted[..end].to_string());
            s = quoted[end + 1..].trim_start();
        }
        Ok(tags)
    }
}

/// Scanner yielding no tags at all, for exercising the whole-annotation
/// catch-all with free-form annotation strings.
pub struct EmptyScanner;

impl Scanner for EmptyScanner {
    fn tags(&self, _raw: &str) -> Result<TagMap, DynError> {
        Ok(TagMap::new())
    }
}

/// Parses the expression as a JSON literal, e.g. `const:"42"`; text that is
/// not valid JSON becomes a plain string.
pub struct Const;

impl Interpreter for Const {
    fn execute(&self, expr: &str, _ctx: &ExprContext<'_>) -> Result<Value, DynError> {
        Ok(serde_json::from_str(expr).unwrap_or_else(|_| Value::String(expr.to_string())))
    }
}

/// Resolves a dotted reference into the expression context:
/// `root.<path>`, `extra.<path>`, `sub.<path>`, `val`, `name`, `tags.<key>`.
/// Missing paths resolve to null.
pub struct Lookup;

impl Interpreter for Lookup {
    fn execute(&self, expr: &str, ctx: &ExprContext<'_>) -> Result<Value, DynError> {
        let mut parts = expr.trim().split('.');
        let head = parts.next().unwrap_or_default();
        let mut cur = match head {
            "root" => ctx.root.clone(),
            "extra" => ctx.extra.clone(),
            "sub" => ctx.sub.cloned().unwrap_or(Value::Null),
            "val" => ctx.val.clone().unwrap_or(Value::Null),
            "name" => json!(ctx.name),
            "tags" => serde_json::to_value(&ctx.tags)?,
            other => return Err(format!("unknown reference root: {other}").into()),
        };
        for part in parts {
            cur = match &cur {
                Value::Object(map) => map.get(part).cloned().unwrap_or(Value::Null),
                Value::Array(items) => part
                    .parse::<usize>()
                    .ok()
                    .and_then(|i| items.get(i))
                    .cloned()
                    .unwrap_or(Value::Null),
                _ => Value::Null,
            };
        }
        Ok(cur)
    }
}

/// Reports the length of whatever expression text it was handed. Useful for
/// proving the catch-all receives the raw annotation unparsed.
pub struct CharCount;

impl Interpreter for CharCount {
    fn execute(&self, expr: &str, _ctx: &ExprContext<'_>) -> Result<Value, DynError> {
        Ok(json!(expr.len()))
    }
}

/// Delegates to another registered interpreter: `chain:"name expr"`.
pub struct Chain;

impl Interpreter for Chain {
    fn execute(&self, expr: &str, ctx: &ExprContext<'_>) -> Result<Value, DynError> {
        let (name, rest) = expr.split_once(' ').unwrap_or((expr, ""));
        ctx.eval_expr(name, rest, ctx)
    }
}

/// Always fails, with the expression as the message.
pub struct Fail;

impl Interpreter for Fail {
    fn execute(&self, expr: &str, _ctx: &ExprContext<'_>) -> Result<Value, DynError> {
        Err(expr.to_string().into())
    }
}
