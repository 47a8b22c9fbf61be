//! Identity RPC contract shared by the gateway and the identity service.
//!
//! Each pattern has one payload type implementing [`rpc::Call`], which fixes its pattern name
//! and response type for callers. The server decodes incoming requests into
//! [`IdentityRequest`] and matches on it exhaustively.

pub mod request;
pub mod requests;
pub mod responses;

pub use request::IdentityRequest;
pub use requests::*;
pub use responses::AuthResult;
pub use responses::DeleteUserResponse;
pub use responses::UserView;

/// Pattern names as they appear on the wire.
pub mod patterns {
    pub const VALIDATE_USER: &str = "validate_user";
    pub const VALIDATE_USER_ALIAS: &str = "validateUser";
    pub const REGISTER: &str = "register";
    pub const LOGIN: &str = "login";
    pub const FIND_ALL_USERS: &str = "find_all_users";
    pub const FIND_USER_BY_ID: &str = "find_user_by_id";
    pub const UPDATE_USER: &str = "update_user";
    pub const UPDATE_USER_PASSWORD: &str = "update_user_password";
    pub const DELETE_USER: &str = "delete_user";
    pub const GET_USER_COUNT: &str = "get_user_count";
    pub const GET_USER_COUNT_BY_ROLE: &str = "get_user_count_by_role";
}
