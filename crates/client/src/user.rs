//! The user record exchanged with the `user.*` methods.

use serde::{Deserialize, Serialize};

use crate::UserId;

/// A Xen Orchestra user account.
///
/// A user built locally for creation has no `id`; users decoded from a
/// server response carry one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Server-assigned id. Omitted on the wire when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<UserId>,

    /// Login name. Xen Orchestra calls this field `email` but does not require
    /// an address.
    pub email: String,

    /// Account secret.
    pub password: String,
}

impl User {
    /// A user that has not been created yet.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            id: None,
            email: email.into(),
            password: password.into(),
        }
    }

    /// Returns a copy of this user carrying `id`.
    pub fn with_id(mut self, id: UserId) -> Self {
        self.id = Some(id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_user_has_no_id_on_the_wire() {
        let wire = serde_json::to_value(User::new("ddelnano", "password")).unwrap();
        assert_eq!(wire, json!({"email": "ddelnano", "password": "password"}));
    }

    #[test]
    fn test_decodes_listed_user() {
        let user: User = serde_json::from_value(json!({
            "id": "a1234abcd",
            "email": "ddelnano",
            "password": "password",
        }))
        .unwrap();

        assert_eq!(user.id.as_ref().map(UserId::as_str), Some("a1234abcd"));
        assert_eq!(user.email, "ddelnano");
    }
}
