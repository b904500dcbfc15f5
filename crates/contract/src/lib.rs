//! Consumer-driven contract testing for the xo-sdk client.
//!
//! A [`MockSession`] runs an HTTP mock of the provider and holds an
//! [`InteractionRegistry`] of expected request/response pairs. The
//! [`ContractCaller`] implements [`rpc::RpcCaller`] against that mock, so the
//! real domain client can be exercised end to end. Every request is checked
//! for method, path, headers, and body; verification reports what was not
//! matched or never received.
//!
//! ## Failure channels
//!
//! Transport, serialisation, and decode problems surface as
//! [`rpc::RpcError`] from the caller, like with any transport. Contract
//! violations are a separate [`VerificationFailure`], returned by
//! [`MockSession::verify`] and fatal (a panic) when raised at teardown.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`interaction`] | [`Interaction`], request expectations, body matchers, response specs |
//! | [`matching`] | [`ObservedRequest`] and JSON comparison |
//! | [`registry`] | [`InteractionRegistry`] |
//! | [`session`] | [`MockSession`], [`PactConfig`], registration builders |
//! | [`caller`] | [`ContractCaller`] |
//! | [`contract_file`] | Pact v2 file output |
//! | [`errors`] | [`ContractError`], [`VerificationFailure`] |

pub mod caller;
pub mod contract_file;
pub mod errors;
pub mod interaction;
pub mod matching;
pub mod registry;
mod server;
pub mod session;

pub use caller::{ContractCaller, API_PATH};
pub use errors::{ContractError, Mismatch, VerificationFailure};
pub use interaction::{BodyMatcher, Interaction, RequestExpectation, ResponseSpec};
pub use matching::ObservedRequest;
pub use registry::{InteractionRegistry, MockReply};
pub use session::{InteractionBuilder, MockSession, PactConfig, ResponseBuilder, DEFAULT_HOST};
