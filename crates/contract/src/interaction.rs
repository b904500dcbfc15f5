//! Expected request/response pairs.
//!
//! An [`Interaction`] is registered during test setup, matched while the test
//! runs, and drained by verification. Its serialised form is the Pact v2
//! interaction object written to the contract file.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::matching::{compare_exact, compare_shape, ObservedRequest};

/// One expected exchange between consumer and provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Interaction {
    /// Human-readable description, e.g. `"A request to create ddelnano"`.
    pub description: String,

    /// Precondition label set with `given`, e.g. `"No user exists"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_state: Option<String>,

    /// What the consumer must send.
    pub request: RequestExpectation,

    /// What the mock answers when the request matches.
    pub response: ResponseSpec,
}

// ---------------------------------------------------------------------------
// Request side
// ---------------------------------------------------------------------------

/// How an expected request body is compared.
///
/// Serialises as the bare example value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BodyMatcher {
    /// Parsed JSON must equal this value exactly (no extra object keys).
    Exact(Value),
    /// Parsed JSON must have the same shape: same JSON types, every key of
    /// each example object present, array elements shaped like the first
    /// example element. Values themselves are not compared.
    Like(Value),
}

impl BodyMatcher {
    /// Problems found comparing `actual` against this matcher; empty on match.
    pub fn differences(&self, actual: &Value) -> Vec<String> {
        let mut problems = Vec::new();
        match self {
            Self::Exact(expected) => compare_exact("$", expected, actual, &mut problems),
            Self::Like(example) => compare_shape("$", example, actual, &mut problems),
        }
        problems
    }
}

/// The request half of an interaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestExpectation {
    /// HTTP method, compared case-insensitively.
    pub method: String,

    /// Exact request path.
    pub path: String,

    /// Required headers. Names compare case-insensitively, values exactly.
    /// Headers not listed here are ignored.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,

    /// Body matcher; `None` accepts any body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<BodyMatcher>,
}

impl RequestExpectation {
    /// Expects `method` on `path` with no header or body constraints.
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into().to_ascii_uppercase(),
            path: path.into(),
            headers: BTreeMap::new(),
            body: None,
        }
    }

    /// Expects a `POST` to `path`.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new("POST", path)
    }

    /// Requires header `name` to equal `value`.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Requires the body to equal `body` exactly.
    pub fn json_body(self, body: Value) -> Self {
        self.body(BodyMatcher::Exact(body))
    }

    /// Sets an arbitrary body matcher.
    pub fn body(mut self, matcher: BodyMatcher) -> Self {
        self.body = Some(matcher);
        self
    }

    /// Every way `observed` fails this expectation; empty on match.
    pub fn differences(&self, observed: &ObservedRequest) -> Vec<String> {
        let mut problems = Vec::new();

        if !self.method.eq_ignore_ascii_case(&observed.method) {
            problems.push(format!(
                "method: expected {}, got {}",
                self.method, observed.method
            ));
        }

        if self.path != observed.path {
            problems.push(format!(
                "path: expected {}, got {}",
                self.path, observed.path
            ));
        }

        for (name, expected) in &self.headers {
            match observed.header(name) {
                None => problems.push(format!(
                    "header {name}: expected {expected:?}, but it was missing"
                )),
                Some(actual) if actual != expected => problems.push(format!(
                    "header {name}: expected {expected:?}, got {actual:?}"
                )),
                Some(_) => {}
            }
        }

        if let Some(matcher) = &self.body {
            match serde_json::from_slice::<Value>(&observed.body) {
                Ok(actual) => problems.extend(matcher.differences(&actual)),
                Err(e) => problems.push(format!("body: expected JSON, could not parse it ({e})")),
            }
        }

        problems
    }
}

// ---------------------------------------------------------------------------
// Response side
// ---------------------------------------------------------------------------

/// The response half of an interaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseSpec {
    /// HTTP status code.
    pub status: u16,

    /// Response headers, sent verbatim.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,

    /// JSON body; `None` sends an empty body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl ResponseSpec {
    /// A response with `status` and nothing else.
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
            body: None,
        }
    }

    /// A `200 OK` response.
    pub fn ok() -> Self {
        Self::new(200)
    }

    /// Adds a response header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Sets the JSON body.
    pub fn json_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}
