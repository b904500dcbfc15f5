//! Typed user operations on top of an [`RpcCaller`].

use rpc::{RpcCaller, RpcCallerExt};
use tracing::{debug, instrument};

use crate::methods::{CreateUser, DeleteUser, GetAllUsers, SignInWithPassword};
use crate::{ClientError, User, UserId};

/// Xen Orchestra API client.
///
/// Every operation is one stateless request/response round trip on the
/// wrapped caller: no retries, no pagination, no local validation beyond
/// serialising the parameters. Correctness of the wire shape is the
/// transport's concern.
pub struct Client {
    rpc: Box<dyn RpcCaller>,
}

impl Client {
    /// Wraps any caller, such as the production HTTP transport or a test double.
    pub fn new(rpc: impl RpcCaller + 'static) -> Self {
        Self { rpc: Box::new(rpc) }
    }

    /// Authenticates the session behind the caller.
    #[instrument(skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<User, ClientError> {
        let user = self
            .rpc
            .invoke(&SignInWithPassword { email, password })
            .await?;
        Ok(user)
    }

    /// Creates `user` and returns it with the server-assigned id filled in.
    ///
    /// Any id already set on `user` is ignored.
    #[instrument(skip_all, fields(email = %user.email))]
    pub async fn create_user(&self, user: &User) -> Result<User, ClientError> {
        let id = self
            .rpc
            .invoke(&CreateUser {
                email: &user.email,
                password: &user.password,
            })
            .await?;
        debug!(%id, "user created");
        Ok(user.clone().with_id(id))
    }

    /// Lists every user known to the server.
    #[instrument(skip(self))]
    pub async fn get_all_users(&self) -> Result<Vec<User>, ClientError> {
        let users = self.rpc.invoke(&GetAllUsers::default()).await?;
        Ok(users)
    }

    /// Looks up a single user by id.
    ///
    /// The API has no single-user getter, so this lists all users and filters.
    #[instrument(skip(self))]
    pub async fn get_user(&self, id: &UserId) -> Result<User, ClientError> {
        self.get_all_users()
            .await?
            .into_iter()
            .find(|user| user.id.as_ref() == Some(id))
            .ok_or_else(|| ClientError::UserNotFound(id.clone()))
    }

    /// Deletes the user with `id`. The server's reply is not decoded.
    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: &UserId) -> Result<(), ClientError> {
        self.rpc
            .call_discarding(DeleteUser::NAME, &DeleteUser { id })
            .await?;
        Ok(())
    }

    /// Closes the underlying caller.
    pub async fn close(&self) -> Result<(), ClientError> {
        self.rpc.close().await?;
        Ok(())
    }
}
