//! Authentication utilities library
//!
//! Provides the token and password infrastructure for the user service:
//! - Signed bearer tokens (HS256) with a fixed claim contract
//! - Token verification with issuer and clock-skew (leeway) checks
//! - Password hashing (Argon2id)
//!
//! The claim contract is the wire format any client of the service relies
//! on: `sub`, `iss`, `iat`, `exp`, plus `userId`, `username` and an optional
//! `roles` array (omitted when empty, never serialized as `[]`).
//!
//! # Examples
//!
//! ## Issuing and verifying a token
//! ```
//! use auth::{TokenIssuer, TokenVerifier};
//! use chrono::Duration;
//!
//! let secret = b"secret_key_at_least_32_bytes_long!";
//! let issuer = TokenIssuer::new(secret, "NiN".to_string(), Duration::minutes(60));
//! let verifier = TokenVerifier::new(secret, "NiN".to_string(), 60);
//!
//! let issued = issuer.issue(42, "alice", &["USER".to_string()]).unwrap();
//! let claims = verifier.verify(&issued.token).unwrap();
//! assert_eq!(claims.user_id, 42);
//! assert_eq!(claims.roles(), &["USER".to_string()]);
//! ```
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash).unwrap());
//! ```

pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use jwt::decode_secret;
pub use jwt::Claims;
pub use jwt::IssuedToken;
pub use jwt::SecretError;
pub use jwt::TokenError;
pub use jwt::TokenIssuer;
pub use jwt::TokenVerifier;
pub use password::PasswordError;
pub use password::PasswordHasher;
