pub mod access;
pub mod auth;
pub mod identity;
pub mod profile;
pub mod users;
