//! Parameter records for the remote methods the [`crate::Client`] calls.
//!
//! Each record serialises to exactly the `params` object its method expects
//! and declares the type its result decodes into.

use rpc::RpcMethod;
use serde::Serialize;

use crate::{User, UserId};

/// `user.create`: returns the new user's id.
#[derive(Debug, Clone, Serialize)]
pub struct CreateUser<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

impl RpcMethod for CreateUser<'_> {
    const NAME: &'static str = "user.create";
    type Output = UserId;
}

/// `user.getAll`: lists every user.
///
/// The method takes no arguments; a placeholder parameter is still sent so
/// the envelope always carries a `params` object.
#[derive(Debug, Clone, Serialize)]
pub struct GetAllUsers {
    dummy: &'static str,
}

impl Default for GetAllUsers {
    fn default() -> Self {
        Self { dummy: "dummy" }
    }
}

impl RpcMethod for GetAllUsers {
    const NAME: &'static str = "user.getAll";
    type Output = Vec<User>;
}

/// `user.delete`. The server answers `true`; callers do not decode it.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteUser<'a> {
    pub id: &'a UserId,
}

impl DeleteUser<'_> {
    /// Wire name of the method.
    pub const NAME: &'static str = "user.delete";
}

/// `session.signInWithPassword`: returns the signed-in user.
#[derive(Debug, Clone, Serialize)]
pub struct SignInWithPassword<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

impl RpcMethod for SignInWithPassword<'_> {
    const NAME: &'static str = "session.signInWithPassword";
    type Output = User;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_param_shapes() {
        let create = CreateUser {
            email: "ddelnano",
            password: "password",
        };
        assert_eq!(
            serde_json::to_value(&create).unwrap(),
            json!({"email": "ddelnano", "password": "password"})
        );

        assert_eq!(
            serde_json::to_value(GetAllUsers::default()).unwrap(),
            json!({"dummy": "dummy"})
        );

        let id = UserId::new("a1234abcd").unwrap();
        assert_eq!(
            serde_json::to_value(DeleteUser { id: &id }).unwrap(),
            json!({"id": "a1234abcd"})
        );
    }
}
