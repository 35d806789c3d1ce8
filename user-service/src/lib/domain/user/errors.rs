use thiserror::Error;

/// Error for Username validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UsernameError {
    #[error("Username must not be blank")]
    Empty,

    #[error("Username too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },

    #[error("Username contains control characters")]
    InvalidCharacters,
}

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("Invalid email format: {0}")]
    InvalidFormat(String),
}

/// Error for Role parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RoleError {
    #[error("Unknown role: {0}")]
    Unknown(String),
}

/// Error surfaced by the storage adapters.
///
/// `UniqueViolation` carries the violated constraint name; it is the one
/// condition the domain services reinterpret (duplicate registration,
/// linker retry). Everything else stays an opaque infrastructure failure.
#[derive(Debug, Clone, Error)]
pub enum RepositoryError {
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("database error: {0}")]
    Database(String),
}

/// Error for credential authentication.
///
/// `UserNotFound` and `BadCredentials` both surface to the end user as the
/// same generic "invalid username or password"; the distinction exists for
/// logging only.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("no user with username: {0}")]
    UserNotFound(String),

    #[error("password does not match")]
    BadCredentials,

    #[error("password verification error: {0}")]
    Password(#[from] auth::PasswordError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Error for federated-identity linking.
///
/// `UnverifiedEmail` is a permanent rejection of the assertion.
/// `Conflict` means the one-shot retry also lost a uniqueness race; a
/// subsequent identical request is likely to succeed, so it maps to a
/// transient-server-error class, never a client-input error.
#[derive(Debug, Clone, Error)]
pub enum LinkError {
    #[error("assertion email is missing or not verified")]
    UnverifiedEmail,

    #[error("identity linking lost a uniqueness race twice")]
    Conflict,

    #[error("placeholder password hashing failed: {0}")]
    Password(#[from] auth::PasswordError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Top-level error for registration and user management operations.
#[derive(Debug, Clone, Error)]
pub enum UserError {
    #[error("Invalid username: {0}")]
    InvalidUsername(#[from] UsernameError),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("Password error: {0}")]
    Password(#[from] auth::PasswordError),

    #[error("User not found: {0}")]
    NotFound(String),

    #[error("Username already exists: {0}")]
    UsernameAlreadyExists(String),

    #[error("Email already exists: {0}")]
    EmailAlreadyExists(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<RepositoryError> for UserError {
    fn from(err: RepositoryError) -> Self {
        UserError::DatabaseError(err.to_string())
    }
}
