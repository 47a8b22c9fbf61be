//! Pattern-addressed request/response transport over a persistent TCP connection.
//!
//! Every message is a length-prefixed frame carrying a JSON envelope. Requests name a pattern
//! and carry a correlation id; responses echo the correlation id with either a result value or
//! a structured [`RemoteError`]. Many requests can be in flight on one connection and their
//! responses may arrive in any order.
//!
//! - [`RpcClient`] sends calls and matches responses by correlation id.
//! - [`RpcServer`] accepts connections and hands each request to a [`Handler`].
//! - [`Call`] ties a typed payload to its pattern name and response type.

pub mod call;
pub mod client;
pub mod envelope;
pub mod error;
pub mod frame;
pub mod server;

pub use call::Call;
pub use client::ClientConfig;
pub use client::RpcClient;
pub use envelope::Outcome;
pub use envelope::RequestEnvelope;
pub use envelope::ResponseEnvelope;
pub use error::ErrorKind;
pub use error::RemoteError;
pub use error::RpcError;
pub use frame::FrameError;
pub use server::Handler;
pub use server::RpcServer;
