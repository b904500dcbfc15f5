//! Typed method records.
//!
//! A parameter struct implementing [`RpcMethod`] names the remote method it
//! belongs to and the type its result decodes into. Together the records of a
//! domain form a closed, compile-time-checked set of call shapes, while
//! [`crate::RpcCaller::call`] stays generic over any method string.

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Parameters of one remote method.
pub trait RpcMethod: Serialize + Sync {
    /// Wire name of the method, e.g. `"user.create"`.
    const NAME: &'static str;

    /// Type the response decodes into.
    type Output: DeserializeOwned + Send;
}
