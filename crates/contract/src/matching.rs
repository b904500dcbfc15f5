//! Comparison of observed traffic against expectations.

use std::collections::BTreeMap;

use serde_json::Value;

/// A request as the mock server received it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedRequest {
    /// HTTP method as sent.
    pub method: String,
    /// Request path, without query string.
    pub path: String,
    /// Headers keyed by lower-cased name. Repeated headers are joined with `", "`.
    pub headers: BTreeMap<String, String>,
    /// Raw body bytes.
    pub body: Vec<u8>,
}

impl ObservedRequest {
    /// Looks up a header by name, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// One-line description, e.g. `POST /api`.
    pub fn summary(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Strict structural equality, reporting every differing location.
pub(crate) fn compare_exact(path: &str, expected: &Value, actual: &Value, out: &mut Vec<String>) {
    match (expected, actual) {
        (Value::Object(want), Value::Object(got)) => {
            for (key, want_value) in want {
                let at = format!("{path}.{key}");
                match got.get(key) {
                    Some(got_value) => compare_exact(&at, want_value, got_value, out),
                    None => out.push(format!("body {at}: expected {want_value}, but it was missing")),
                }
            }
            for key in got.keys().filter(|key| !want.contains_key(*key)) {
                out.push(format!("body {path}.{key}: unexpected key"));
            }
        }
        (Value::Array(want), Value::Array(got)) => {
            if want.len() != got.len() {
                out.push(format!(
                    "body {path}: expected {} element(s), got {}",
                    want.len(),
                    got.len()
                ));
                return;
            }
            for (index, (w, g)) in want.iter().zip(got).enumerate() {
                compare_exact(&format!("{path}[{index}]"), w, g, out);
            }
        }
        _ if expected == actual => {}
        _ => out.push(format!("body {path}: expected {expected}, got {actual}")),
    }
}

/// Type-shape comparison: values may differ as long as their JSON types and
/// structure agree with the example.
pub(crate) fn compare_shape(path: &str, example: &Value, actual: &Value, out: &mut Vec<String>) {
    match (example, actual) {
        (Value::Object(want), Value::Object(got)) => {
            for (key, want_value) in want {
                let at = format!("{path}.{key}");
                match got.get(key) {
                    Some(got_value) => compare_shape(&at, want_value, got_value, out),
                    None => out.push(format!(
                        "body {at}: expected a {}, but it was missing",
                        type_name(want_value)
                    )),
                }
            }
        }
        (Value::Array(want), Value::Array(got)) => {
            let Some(element) = want.first() else {
                return;
            };
            if got.is_empty() {
                out.push(format!("body {path}: expected at least one element"));
            }
            for (index, g) in got.iter().enumerate() {
                compare_shape(&format!("{path}[{index}]"), element, g, out);
            }
        }
        _ if type_name(example) == type_name(actual) => {}
        _ => out.push(format!(
            "body {path}: expected a {}, got a {}",
            type_name(example),
            type_name(actual)
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn exact(expected: Value, actual: Value) -> Vec<String> {
        let mut out = Vec::new();
        compare_exact("$", &expected, &actual, &mut out);
        out
    }

    fn shape(example: Value, actual: Value) -> Vec<String> {
        let mut out = Vec::new();
        compare_shape("$", &example, &actual, &mut out);
        out
    }

    #[test]
    fn test_exact_reports_nested_value_difference() {
        assert_eq!(
            exact(
                json!({"method": "user.create", "params": {"email": "ddelnano"}}),
                json!({"method": "user.create", "params": {"email": "someone"}}),
            ),
            vec![r#"body $.params.email: expected "ddelnano", got "someone""#.to_string()]
        );
    }

    #[test]
    fn test_exact_reports_missing_and_unexpected_keys() {
        assert_eq!(
            exact(json!({"id": 0}), json!({"jsonrpc": "2.0"})),
            vec![
                "body $.id: expected 0, but it was missing".to_string(),
                "body $.jsonrpc: unexpected key".to_string(),
            ]
        );
    }

    #[test]
    fn test_exact_reports_array_length() {
        assert_eq!(
            exact(json!([1, 2]), json!([1])),
            vec!["body $: expected 2 element(s), got 1".to_string()]
        );
    }

    #[test]
    fn test_shape_ignores_values_and_extra_keys() {
        assert!(shape(
            json!({"id": "x", "email": "y"}),
            json!({"id": "a1234abcd", "email": "ddelnano", "password": "password"}),
        )
        .is_empty());
    }

    #[test]
    fn test_shape_checks_each_array_element() {
        assert_eq!(
            shape(json!([{"id": "x"}]), json!([{"id": "a"}, {"id": 7}])),
            vec!["body $[1].id: expected a string, got a number".to_string()]
        );
        assert_eq!(
            shape(json!([{"id": "x"}]), json!([])),
            vec!["body $: expected at least one element".to_string()]
        );
    }

    #[test]
    fn test_header_lookup_ignores_case() {
        let req = ObservedRequest {
            method: "POST".to_string(),
            path: "/api".to_string(),
            headers: BTreeMap::from([("content-type".to_string(), "application/json".to_string())]),
            body: Vec::new(),
        };
        assert_eq!(req.header("Content-Type"), Some("application/json"));
        assert_eq!(req.summary(), "POST /api");
    }
}
