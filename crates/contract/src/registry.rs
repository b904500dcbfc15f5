//! The interaction registry: registered expectations and the traffic matched
//! against them.
//!
//! Matching is stateful. Registration order defines preference: a request is
//! matched to the first interaction that has not been received yet, falling
//! back to one that has (interactions may be replayed). A request matching
//! nothing is recorded as a [`Mismatch`] and answered with `500`.

use std::collections::BTreeMap;
use std::mem;

use serde_json::json;
use tracing::{debug, warn};

use crate::{Interaction, Mismatch, ObservedRequest, VerificationFailure};

/// What the mock sends back for one observed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockReply {
    /// HTTP status code.
    pub status: u16,
    /// Response headers, as registered.
    pub headers: BTreeMap<String, String>,
    /// Serialised body; empty when none was registered.
    pub body: Vec<u8>,
}

#[derive(Debug)]
struct Entry {
    interaction: Interaction,
    hits: usize,
}

/// Registered interactions plus the record of what was observed.
#[derive(Debug, Default)]
pub struct InteractionRegistry {
    entries: Vec<Entry>,
    mismatches: Vec<Mismatch>,
    confirmed: Vec<Interaction>,
}

impl InteractionRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an interaction to the matching sequence.
    pub fn register(&mut self, interaction: Interaction) {
        debug!(description = %interaction.description, "interaction registered");
        self.entries.push(Entry {
            interaction,
            hits: 0,
        });
    }

    /// Number of registered interactions awaiting verification.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when nothing awaits verification.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Interactions confirmed by successful verifications, in confirmation order.
    pub fn confirmed(&self) -> &[Interaction] {
        &self.confirmed
    }

    /// Matches `request` and produces the mock's answer.
    pub fn handle(&mut self, request: &ObservedRequest) -> MockReply {
        let problems: Vec<Vec<String>> = self
            .entries
            .iter()
            .map(|entry| entry.interaction.request.differences(request))
            .collect();

        let fresh = (0..self.entries.len())
            .find(|&i| self.entries[i].hits == 0 && problems[i].is_empty());
        let replay = || problems.iter().position(Vec::is_empty);

        if let Some(index) = fresh.or_else(replay) {
            let entry = &mut self.entries[index];
            entry.hits += 1;
            debug!(
                request = %request.summary(),
                description = %entry.interaction.description,
                hits = entry.hits,
                "request matched"
            );
            let response = &entry.interaction.response;
            return MockReply {
                status: response.status,
                headers: response.headers.clone(),
                body: response
                    .body
                    .as_ref()
                    .map(|body| body.to_string().into_bytes())
                    .unwrap_or_default(),
            };
        }

        let closest = self.closest_candidate(request);
        let mismatch = Mismatch {
            request: request.summary(),
            closest: closest.map(|i| self.entries[i].interaction.description.clone()),
            problems: closest.map(|i| problems[i].clone()).unwrap_or_else(|| {
                vec!["no interactions are registered".to_string()]
            }),
        };
        warn!(
            request = %mismatch.request,
            closest = ?mismatch.closest,
            problems = ?mismatch.problems,
            "request did not match any interaction"
        );

        let body = json!({
            "error": "request did not match any registered interaction",
            "request": mismatch.request,
            "closest": mismatch.closest,
            "problems": mismatch.problems,
        });
        self.mismatches.push(mismatch);

        MockReply {
            status: 500,
            headers: BTreeMap::from([(
                "Content-Type".to_string(),
                "application/json".to_string(),
            )]),
            body: body.to_string().into_bytes(),
        }
    }

    /// Index of the interaction a mismatched request was most likely meant
    /// for: an unreceived one with the same method and path, then any
    /// unreceived one, then any at all.
    fn closest_candidate(&self, request: &ObservedRequest) -> Option<usize> {
        let same_route = |entry: &Entry| {
            entry.interaction.request.method.eq_ignore_ascii_case(&request.method)
                && entry.interaction.request.path == request.path
        };

        self.entries
            .iter()
            .position(|e| e.hits == 0 && same_route(e))
            .or_else(|| self.entries.iter().position(|e| e.hits == 0))
            .or_else(|| if self.entries.is_empty() { None } else { Some(0) })
    }

    /// Checks every registered interaction was received and no request went
    /// unmatched, then clears the registry for the next round.
    ///
    /// On success the received interactions join [`confirmed`](Self::confirmed).
    pub fn verify(&mut self) -> Result<(), VerificationFailure> {
        let entries = mem::take(&mut self.entries);
        let mismatches = mem::take(&mut self.mismatches);

        let missing: Vec<String> = entries
            .iter()
            .filter(|entry| entry.hits == 0)
            .map(|entry| entry.interaction.description.clone())
            .collect();

        if !missing.is_empty() || !mismatches.is_empty() {
            return Err(VerificationFailure {
                mismatches,
                missing,
                test_error: None,
            });
        }

        for entry in entries {
            let interaction = entry.interaction;
            self.confirmed.retain(|known| {
                known.description != interaction.description
                    || known.provider_state != interaction.provider_state
            });
            self.confirmed.push(interaction);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RequestExpectation, ResponseSpec};
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    fn interaction(description: &str, method: &str, reply: Value) -> Interaction {
        Interaction {
            description: description.to_string(),
            provider_state: Some("No user exists".to_string()),
            request: RequestExpectation::post("/api")
                .header("Content-Type", "application/json")
                .json_body(json!({"method": method, "id": 0, "jsonrpc": "2.0"})),
            response: ResponseSpec::ok()
                .header("Content-Type", "application/json")
                .json_body(reply),
        }
    }

    fn request(method: &str, with_content_type: bool) -> ObservedRequest {
        let mut headers = BTreeMap::new();
        if with_content_type {
            headers.insert("content-type".to_string(), "application/json".to_string());
        }
        ObservedRequest {
            method: "POST".to_string(),
            path: "/api".to_string(),
            headers,
            body: json!({"method": method, "id": 0, "jsonrpc": "2.0"})
                .to_string()
                .into_bytes(),
        }
    }

    #[test]
    fn test_matched_request_gets_registered_response() {
        let mut registry = InteractionRegistry::new();
        registry.register(interaction("create", "user.create", json!("a1234abcd")));

        let reply = registry.handle(&request("user.create", true));

        assert_eq!(reply.status, 200);
        assert_eq!(reply.body, br#""a1234abcd""#.to_vec());
        assert_eq!(
            reply.headers.get("Content-Type").map(String::as_str),
            Some("application/json")
        );
        assert!(registry.verify().is_ok());
        assert_eq!(registry.confirmed().len(), 1);
    }

    #[test]
    fn test_requests_pick_the_matching_interaction_in_any_order() {
        let mut registry = InteractionRegistry::new();
        registry.register(interaction("create", "user.create", json!("a1234abcd")));
        registry.register(interaction("list", "user.getAll", json!([])));

        assert_eq!(registry.handle(&request("user.getAll", true)).body, b"[]".to_vec());
        assert_eq!(registry.handle(&request("user.create", true)).status, 200);
        assert!(registry.verify().is_ok());
    }

    #[test]
    fn test_interactions_may_be_replayed() {
        let mut registry = InteractionRegistry::new();
        registry.register(interaction("create", "user.create", json!("a1234abcd")));

        assert_eq!(registry.handle(&request("user.create", true)).status, 200);
        assert_eq!(registry.handle(&request("user.create", true)).status, 200);
        assert!(registry.verify().is_ok());
    }

    #[test]
    fn test_mismatch_answers_500_and_fails_verification() {
        let mut registry = InteractionRegistry::new();
        registry.register(interaction("create", "user.create", json!("a1234abcd")));

        let reply = registry.handle(&request("user.create", false));
        assert_eq!(reply.status, 500);

        let failure = registry.verify().unwrap_err();
        assert_eq!(failure.mismatches.len(), 1);
        assert_eq!(failure.mismatches[0].closest.as_deref(), Some("create"));
        assert_eq!(
            failure.mismatches[0].problems,
            vec![r#"header Content-Type: expected "application/json", but it was missing"#.to_string()]
        );
        assert_eq!(failure.missing, vec!["create".to_string()]);
        assert!(registry.confirmed().is_empty());
    }

    #[test]
    fn test_unreceived_interaction_is_missing() {
        let mut registry = InteractionRegistry::new();
        registry.register(interaction("create", "user.create", json!("a1234abcd")));
        registry.register(interaction("list", "user.getAll", json!([])));

        registry.handle(&request("user.create", true));

        let failure = registry.verify().unwrap_err();
        assert!(failure.mismatches.is_empty());
        assert_eq!(failure.missing, vec!["list".to_string()]);
    }

    #[test]
    fn test_verify_drains_the_registry() {
        let mut registry = InteractionRegistry::new();
        registry.register(interaction("create", "user.create", json!("a1234abcd")));
        assert!(registry.verify().is_err());

        assert!(registry.is_empty());
        assert!(registry.verify().is_ok());
    }

    #[test]
    fn test_request_with_nothing_registered() {
        let mut registry = InteractionRegistry::new();
        assert_eq!(registry.handle(&request("user.create", true)).status, 500);

        let failure = registry.verify().unwrap_err();
        assert_eq!(failure.mismatches[0].closest, None);
        assert_eq!(
            failure.mismatches[0].problems,
            vec!["no interactions are registered".to_string()]
        );
    }
}
