//! Authentication primitives shared by the identity service and the gateway.
//!
//! - Password hashing (Argon2id)
//! - Signing-secret policy
//! - JWT token issuing and verification for user identities
//! - The closed set of user roles
//!
//! Each service wraps these in its own ports; this crate holds no domain state.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let digest = hasher.hash("Secret123!").unwrap();
//! assert!(hasher.verify("Secret123!", &digest).unwrap());
//! assert!(!hasher.verify("WrongPass", &digest).unwrap());
//! ```
//!
//! ## Tokens
//! ```
//! use auth::{Identity, Role, SigningSecret, TokenService};
//!
//! let secret = SigningSecret::new("k3y-for-doc-tests-0123456789-abcdefghij").unwrap();
//! let tokens = TokenService::new(&secret, chrono::Duration::hours(24));
//!
//! let identity = Identity::new("42", "a@x.com", "alice", vec![Role::User]);
//! let token = tokens.issue(&identity).unwrap();
//! assert_eq!(tokens.verify(&token).unwrap(), identity);
//! ```

pub mod identity;
pub mod jwt;
pub mod password;
pub mod roles;
pub mod secret;
pub mod tokens;

pub use identity::Identity;
pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use password::HashParams;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use roles::Role;
pub use roles::RoleError;
pub use secret::SecretError;
pub use secret::SigningSecret;
pub use tokens::TokenError;
pub use tokens::TokenService;
