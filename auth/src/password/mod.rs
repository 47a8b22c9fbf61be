pub mod argon2;
pub mod errors;

pub use self::argon2::PasswordHasher;
pub use ::argon2::Params as HashParams;
pub use errors::PasswordError;
