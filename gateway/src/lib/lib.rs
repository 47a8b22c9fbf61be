pub mod config;
pub mod domain;
pub mod inbound;
pub mod outbound;

pub use domain::identity::IdentityClient;
pub use inbound::http::router::create_router;
pub use outbound::identity::RpcIdentityClient;
