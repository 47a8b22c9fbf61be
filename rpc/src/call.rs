use serde::de::DeserializeOwned;
use serde::Serialize;

/// A typed request payload bound to the pattern that handles it.
///
/// `RpcClient::call` serializes the payload, sends it under `PATTERN` and decodes the result
/// as `Response`.
pub trait Call: Serialize + Send + Sync {
    /// Pattern name the server dispatches on.
    const PATTERN: &'static str;

    /// Success payload returned by the handler.
    type Response: DeserializeOwned + Send;
}
