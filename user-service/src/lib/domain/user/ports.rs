use async_trait::async_trait;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::ProviderLink;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::user::errors::RepositoryError;

/// Persistence operations for the user aggregate.
///
/// Timestamps are assigned inside the adapter at create/update time; the
/// domain never writes them.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist a new user; storage assigns the id.
    ///
    /// # Errors
    /// * `UniqueViolation` - Username or email is already taken
    /// * `Database` - Storage operation failed
    async fn create(&self, user: NewUser) -> Result<User, RepositoryError>;

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, RepositoryError>;

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, RepositoryError>;

    async fn list_all(&self) -> Result<Vec<User>, RepositoryError>;

    /// Update an existing user in place.
    ///
    /// # Returns
    /// The updated user, or `None` when no row with that id exists
    ///
    /// # Errors
    /// * `UniqueViolation` - New username or email is already taken
    /// * `Database` - Storage operation failed
    async fn update(&self, user: User) -> Result<Option<User>, RepositoryError>;

    /// Remove a user; returns whether a row was deleted. Provider links
    /// are dependent records and go with it.
    async fn delete(&self, id: UserId) -> Result<bool, RepositoryError>;
}

/// Persistence operations for provider links.
#[async_trait]
pub trait ProviderLinkRepository: Send + Sync + 'static {
    /// Resolve the account owning the link for (provider, subject), the
    /// steady-state path of federated login.
    async fn find_linked_user(
        &self,
        provider: &str,
        subject: &str,
    ) -> Result<Option<User>, RepositoryError>;

    /// Bind (provider, subject) to an existing account. Persisted
    /// immediately so the uniqueness constraint is checked eagerly.
    ///
    /// # Errors
    /// * `UniqueViolation` - The (provider, subject) pair already exists
    /// * `Database` - Storage operation failed
    async fn link_existing(
        &self,
        user_id: UserId,
        provider: &str,
        subject: &str,
    ) -> Result<ProviderLink, RepositoryError>;

    /// Create a new account and its provider link as one atomic unit.
    ///
    /// Both inserts commit together; a uniqueness violation on either
    /// rolls back the whole unit, so a linkless account can never be left
    /// behind.
    ///
    /// # Errors
    /// * `UniqueViolation` - Account email/username or the (provider,
    ///   subject) pair already exists
    /// * `Database` - Storage operation failed
    async fn create_user_with_link(
        &self,
        user: NewUser,
        provider: &str,
        subject: &str,
    ) -> Result<User, RepositoryError>;
}
