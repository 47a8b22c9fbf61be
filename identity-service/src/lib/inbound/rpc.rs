pub mod dispatcher;
pub mod handlers;

pub use dispatcher::IdentityDispatcher;
