//! Programmable handler scripts.
//!
//! A definition whose top-level object has a `"$mock"` member is a script:
//!
//! ```json
//! {
//!   "$mock": {
//!     "cases": [
//!       { "when": { "id": 0 }, "throw": "no such id" },
//!       { "when": { "id": 1 }, "reply": { "name": "first", "_status": 201 } }
//!     ],
//!     "reply": { "id": "{{param.id}}", "from": "{{path}}" }
//!   }
//! }
//! ```
//!
//! The first case whose `when` entries all equal the request params wins,
//! otherwise the top-level outcome applies. An outcome without `reply` or
//! `throw` replies `null`.

use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::handler::template::Templates;
use crate::handler::HandlerError;

/// Marker key that turns a definition into a script.
pub const SCRIPT_KEY: &str = "$mock";

#[derive(Debug, Clone, Deserialize)]
pub struct MockScript {
    #[serde(default)]
    cases: Vec<Case>,
    #[serde(flatten)]
    outcome: Outcome,
}

#[derive(Debug, Clone, Deserialize)]
struct Case {
    #[serde(default)]
    when: Map<String, Value>,
    #[serde(flatten)]
    outcome: Outcome,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct Outcome {
    reply: Option<Value>,
    throw: Option<String>,
}

impl MockScript {
    /// Parse the body of a `"$mock"` member.
    pub fn from_value(value: Value) -> Result<Self, String> {
        let script: MockScript = serde_json::from_value(value).map_err(|e| e.to_string())?;
        script.outcome.check("default outcome")?;
        for (i, case) in script.cases.iter().enumerate() {
            case.outcome.check(&format!("case {}", i))?;
        }
        Ok(script)
    }

    /// Evaluate the script for one request.
    pub fn run(
        &self,
        templates: &Templates,
        path: &str,
        param: &Value,
    ) -> Result<Value, HandlerError> {
        let outcome = self
            .cases
            .iter()
            .find(|case| case.matches(param))
            .map(|case| &case.outcome)
            .unwrap_or(&self.outcome);

        let ctx = json!({ "path": path, "param": param });

        if let Some(message) = &outcome.throw {
            return Err(HandlerError::new(templates.render_str(message, &ctx)?));
        }

        match &outcome.reply {
            Some(reply) => templates.render_value(reply, &ctx),
            None => Ok(Value::Null),
        }
    }
}

impl Case {
    fn matches(&self, param: &Value) -> bool {
        self.when
            .iter()
            .all(|(key, expected)| param.get(key) == Some(expected))
    }
}

impl Outcome {
    fn check(&self, label: &str) -> Result<(), String> {
        if self.reply.is_some() && self.throw.is_some() {
            return Err(format!("{} sets both `reply` and `throw`", label));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn script(value: Value) -> MockScript {
        MockScript::from_value(value).unwrap()
    }

    #[test]
    fn test_default_reply_is_rendered() {
        let s = script(json!({ "reply": { "id": "{{param.id}}", "from": "{{path}}" } }));
        let out = s.run(&Templates::new(), "foo_bar", &json!({ "id": 3 })).unwrap();
        assert_eq!(out, json!({ "id": 3, "from": "foo_bar" }));
    }

    #[test]
    fn test_first_matching_case_wins() {
        let s = script(json!({
            "cases": [
                { "when": { "id": 1 }, "reply": "one" },
                { "when": { "id": 1 }, "reply": "shadowed" },
                { "when": {}, "reply": "any" }
            ],
            "reply": "default"
        }));
        let t = Templates::new();
        assert_eq!(s.run(&t, "k", &json!({ "id": 1 })).unwrap(), json!("one"));
        assert_eq!(s.run(&t, "k", &json!({ "id": 2 })).unwrap(), json!("any"));
    }

    #[test]
    fn test_throw_renders_message() {
        let s = script(json!({ "throw": "bad id {{param.id}}" }));
        let err = s.run(&Templates::new(), "k", &json!({ "id": 9 })).unwrap_err();
        assert_eq!(err.message(), "bad id 9");
    }

    #[test]
    fn test_empty_script_replies_null() {
        let s = script(json!({}));
        assert_eq!(s.run(&Templates::new(), "k", &json!({})).unwrap(), Value::Null);
    }

    #[test]
    fn test_case_against_non_object_params() {
        let s = script(json!({ "cases": [{ "when": { "id": 1 }, "reply": 1 }], "reply": 2 }));
        assert_eq!(s.run(&Templates::new(), "k", &json!("raw")).unwrap(), json!(2));
    }

    #[test]
    fn test_reply_and_throw_rejected() {
        let err = MockScript::from_value(json!({ "reply": 1, "throw": "x" })).unwrap_err();
        assert!(err.contains("both"));
    }
}
