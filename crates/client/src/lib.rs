//! Xen Orchestra domain client.
//!
//! [`Client`] turns typed user operations into JSON-RPC calls on any
//! [`rpc::RpcCaller`]. It never touches the network itself: hand it the
//! production transport (`transport::HttpCaller`) or the contract-test double
//! (`contract::ContractCaller`).
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype ids ([`UserId`]) |
//! | [`user`] | The [`User`] record |
//! | [`methods`] | Per-method parameter records |
//! | [`client`] | [`Client`] operations |
//! | [`errors`] | [`ClientError`] |

pub mod client;
pub mod errors;
pub mod identifiers;
pub mod methods;
pub mod user;

pub use client::Client;
pub use errors::ClientError;
pub use identifiers::{EmptyIdError, UserId};
pub use user::User;
