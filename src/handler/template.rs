//! Reply templating.
//!
//! Every string in a reply is rendered with Handlebars against
//! `{ "path": <service key>, "param": <decoded params> }`. A string made of a
//! single `{{path}}` / `{{param.x}}` expression is replaced by the raw JSON
//! value it names, so numbers and objects keep their type.

use handlebars::Handlebars;
use serde_json::{Map, Value};

use crate::handler::HandlerError;

/// Handlebars registry shared by all compiled scripts.
pub struct Templates {
    handlebars: Handlebars<'static>,
}

impl Templates {
    pub fn new() -> Self {
        let mut handlebars = Handlebars::new();
        // Replies are JSON, not HTML.
        handlebars.register_escape_fn(handlebars::no_escape);
        Self { handlebars }
    }

    /// Render every string leaf of `value`.
    pub fn render_value(&self, value: &Value, ctx: &Value) -> Result<Value, HandlerError> {
        match value {
            Value::String(s) => self.render_string_value(s, ctx),
            Value::Array(items) => items
                .iter()
                .map(|item| self.render_value(item, ctx))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            Value::Object(fields) => {
                let mut out = Map::with_capacity(fields.len());
                for (k, v) in fields {
                    out.insert(k.clone(), self.render_value(v, ctx)?);
                }
                Ok(Value::Object(out))
            }
            other => Ok(other.clone()),
        }
    }

    /// Render a template string to text.
    pub fn render_str(&self, template: &str, ctx: &Value) -> Result<String, HandlerError> {
        if !template.contains("{{") {
            return Ok(template.to_string());
        }
        self.handlebars
            .render_template(template, ctx)
            .map_err(|e| HandlerError::new(format!("template error: {}", e)))
    }

    fn render_string_value(&self, s: &str, ctx: &Value) -> Result<Value, HandlerError> {
        if let Some(raw) = single_expression(s).and_then(|expr| lookup(ctx, expr)) {
            return Ok(raw.clone());
        }
        self.render_str(s, ctx).map(Value::String)
    }
}

impl Default for Templates {
    fn default() -> Self {
        Self::new()
    }
}

/// `"{{ param.id }}"` → `Some("param.id")` when the whole string is one plain lookup.
fn single_expression(s: &str) -> Option<&str> {
    let inner = s.trim().strip_prefix("{{")?.strip_suffix("}}")?.trim();
    let plain = !inner.is_empty()
        && inner
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
    let rooted = inner == "path" || inner == "param" || inner.starts_with("param.");
    (plain && rooted).then_some(inner)
}

fn lookup<'a>(ctx: &'a Value, dotted: &str) -> Option<&'a Value> {
    dotted.split('.').try_fold(ctx, |value, segment| match value {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}
