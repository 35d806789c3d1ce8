use std::sync::Arc;

use crate::domain::user::models::NewUser;
use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::Role;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::AuthError;
use crate::user::errors::RepositoryError;
use crate::user::errors::UserError;

/// Well-formed Argon2id hash with the default parameters, matching no
/// password. The unknown-username path verifies against it so both
/// rejection paths cost one full Argon2 verification and response timing
/// cannot reveal whether a username exists.
const ENUMERATION_GUARD_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$AAAAAAAAAAAAAAAAAAAAAA$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

/// Domain service for registration, credential authentication and user
/// management.
///
/// Collaborators are constructor-supplied; the hashing primitive is the
/// auth crate's Argon2 collaborator.
pub struct UserService<R>
where
    R: UserRepository,
{
    repository: Arc<R>,
    password_hasher: auth::PasswordHasher,
}

impl<R> UserService<R>
where
    R: UserRepository,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            password_hasher: auth::PasswordHasher::new(),
        }
    }

    /// Register a new local-password user with role USER.
    ///
    /// # Errors
    /// * `UsernameAlreadyExists` / `EmailAlreadyExists` - Uniqueness
    ///   violation mapped from the storage constraint
    /// * `Password` - Hashing failed
    /// * `DatabaseError` - Storage operation failed
    pub async fn register(&self, command: RegisterUserCommand) -> Result<User, UserError> {
        let password_hash = self.password_hasher.hash(&command.password)?;

        let user = NewUser {
            username: command.username,
            email: command.email,
            password_hash,
            date_of_birth: command.date_of_birth,
            role: Role::User,
        };

        let username = user.username.clone();
        let email = user.email.clone();
        self.repository.create(user).await.map_err(|e| match e {
            RepositoryError::UniqueViolation(constraint) if constraint.contains("email") => {
                UserError::EmailAlreadyExists(email.to_string())
            }
            RepositoryError::UniqueViolation(_) => {
                UserError::UsernameAlreadyExists(username.to_string())
            }
            other => other.into(),
        })
    }

    /// Verify a username/password pair and return the account.
    ///
    /// Both failure variants must surface identically to the end user;
    /// callers log the precise cause and report a generic rejection. Both
    /// paths also run one full Argon2 verification, so neither the
    /// response nor its timing distinguishes them.
    ///
    /// # Errors
    /// * `UserNotFound` - No account with this exact username
    /// * `BadCredentials` - Password does not match the stored hash
    pub async fn authenticate(
        &self,
        username: &Username,
        password: &str,
    ) -> Result<User, AuthError> {
        let user = match self.repository.find_by_username(username).await? {
            Some(user) => user,
            None => {
                // Burn the same verification cost as a wrong password
                let _ = self.password_hasher.verify(password, ENUMERATION_GUARD_HASH);
                return Err(AuthError::UserNotFound(username.to_string()));
            }
        };

        if !self.password_hasher.verify(password, &user.password_hash)? {
            return Err(AuthError::BadCredentials);
        }

        Ok(user)
    }

    pub async fn get_user(&self, id: UserId) -> Result<User, UserError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))
    }

    pub async fn list_users(&self) -> Result<Vec<User>, UserError> {
        Ok(self.repository.list_all().await?)
    }

    /// Apply a partial update; only provided fields change. A new
    /// password is hashed before it reaches storage.
    pub async fn update_user(
        &self,
        id: UserId,
        command: UpdateUserCommand,
    ) -> Result<User, UserError> {
        let mut user = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))?;

        if let Some(new_username) = command.username {
            user.username = new_username;
        }

        if let Some(new_email) = command.email {
            user.email = new_email;
        }

        if let Some(new_password) = command.password {
            user.password_hash = self.password_hasher.hash(&new_password)?;
        }

        if let Some(new_date_of_birth) = command.date_of_birth {
            user.date_of_birth = new_date_of_birth;
        }

        let username = user.username.clone();
        let email = user.email.clone();
        self.repository
            .update(user)
            .await
            .map_err(|e| match e {
                RepositoryError::UniqueViolation(constraint) if constraint.contains("email") => {
                    UserError::EmailAlreadyExists(email.to_string())
                }
                RepositoryError::UniqueViolation(_) => {
                    UserError::UsernameAlreadyExists(username.to_string())
                }
                other => other.into(),
            })?
            .ok_or(UserError::NotFound(id.to_string()))
    }

    pub async fn delete_user(&self, id: UserId) -> Result<(), UserError> {
        if !self.repository.delete(id).await? {
            return Err(UserError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use chrono::Utc;
    use mockall::mock;
    use mockall::predicate::*;

    use super::*;
    use crate::domain::user::models::EmailAddress;

    mock! {
        pub TestUserRepository {}

        #[async_trait]
        impl UserRepository for TestUserRepository {
            async fn create(&self, user: NewUser) -> Result<User, RepositoryError>;
            async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError>;
            async fn find_by_username(&self, username: &Username) -> Result<Option<User>, RepositoryError>;
            async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, RepositoryError>;
            async fn list_all(&self) -> Result<Vec<User>, RepositoryError>;
            async fn update(&self, user: User) -> Result<Option<User>, RepositoryError>;
            async fn delete(&self, id: UserId) -> Result<bool, RepositoryError>;
        }
    }

    fn persisted(id: i64, user: NewUser) -> User {
        let now = Utc::now();
        User {
            id: UserId(id),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            date_of_birth: user.date_of_birth,
            role: user.role,
            created_at: now,
            updated_at: now,
        }
    }

    fn register_command(username: &str, email: &str, password: &str) -> RegisterUserCommand {
        RegisterUserCommand {
            username: Username::new(username.to_string()).unwrap(),
            email: EmailAddress::new(email.to_string()).unwrap(),
            password: password.to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1995, 6, 15).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_register_hashes_password_and_assigns_user_role() {
        let mut repository = MockTestUserRepository::new();
        repository
            .expect_create()
            .withf(|user| {
                user.username.as_str() == "ivan"
                    && user.email.as_str() == "ivan@example.com"
                    && user.password_hash.starts_with("$argon2")
                    && user.role == Role::User
            })
            .times(1)
            .returning(|user| Ok(persisted(1, user)));

        let service = UserService::new(Arc::new(repository));
        let user = service
            .register(register_command("ivan", "ivan@example.com", "pw1234"))
            .await
            .unwrap();

        assert_eq!(user.id, UserId(1));
        assert_eq!(user.role, Role::User);
    }

    #[tokio::test]
    async fn test_register_duplicate_username_maps_to_typed_error() {
        let mut repository = MockTestUserRepository::new();
        repository
            .expect_create()
            .times(1)
            .returning(|_| Err(RepositoryError::UniqueViolation("users_username_key".into())));

        let service = UserService::new(Arc::new(repository));
        let result = service
            .register(register_command("ivan", "ivan@example.com", "pw1234"))
            .await;

        assert!(matches!(result, Err(UserError::UsernameAlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_register_duplicate_email_maps_to_typed_error() {
        let mut repository = MockTestUserRepository::new();
        repository
            .expect_create()
            .times(1)
            .returning(|_| Err(RepositoryError::UniqueViolation("users_email_key".into())));

        let service = UserService::new(Arc::new(repository));
        let result = service
            .register(register_command("ivan", "ivan@example.com", "pw1234"))
            .await;

        assert!(matches!(result, Err(UserError::EmailAlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_authenticate_success() {
        let hasher = auth::PasswordHasher::new();
        let hash = hasher.hash("pw1234").unwrap();

        let mut repository = MockTestUserRepository::new();
        repository
            .expect_find_by_username()
            .times(1)
            .returning(move |username| {
                Ok(Some(persisted(
                    1,
                    NewUser {
                        username: username.clone(),
                        email: EmailAddress::new("ivan@example.com".to_string()).unwrap(),
                        password_hash: hash.clone(),
                        date_of_birth: NaiveDate::from_ymd_opt(1995, 6, 15).unwrap(),
                        role: Role::User,
                    },
                )))
            });

        let service = UserService::new(Arc::new(repository));
        let username = Username::new("ivan".to_string()).unwrap();
        let user = service.authenticate(&username, "pw1234").await.unwrap();

        assert_eq!(user.username.as_str(), "ivan");
    }

    #[tokio::test]
    async fn test_authenticate_unknown_username() {
        let mut repository = MockTestUserRepository::new();
        repository
            .expect_find_by_username()
            .times(1)
            .returning(|_| Ok(None));

        let service = UserService::new(Arc::new(repository));
        let username = Username::new("ghost".to_string()).unwrap();
        let result = service.authenticate(&username, "pw1234").await;

        assert!(matches!(result, Err(AuthError::UserNotFound(_))));
    }

    #[tokio::test]
    async fn test_authenticate_wrong_password() {
        let hasher = auth::PasswordHasher::new();
        let hash = hasher.hash("pw1234").unwrap();

        let mut repository = MockTestUserRepository::new();
        repository
            .expect_find_by_username()
            .times(1)
            .returning(move |username| {
                Ok(Some(persisted(
                    1,
                    NewUser {
                        username: username.clone(),
                        email: EmailAddress::new("ivan@example.com".to_string()).unwrap(),
                        password_hash: hash.clone(),
                        date_of_birth: NaiveDate::from_ymd_opt(1995, 6, 15).unwrap(),
                        role: Role::User,
                    },
                )))
            });

        let service = UserService::new(Arc::new(repository));
        let username = Username::new("ivan".to_string()).unwrap();
        let result = service.authenticate(&username, "wrong").await;

        assert!(matches!(result, Err(AuthError::BadCredentials)));
    }

    #[tokio::test]
    async fn test_unknown_username_rejection_burns_hashing_cost() {
        let hasher = auth::PasswordHasher::new();
        let hash = hasher.hash("pw1234").unwrap();

        let mut repository = MockTestUserRepository::new();
        repository
            .expect_find_by_username()
            .times(2)
            .returning(move |username| {
                if username.as_str() == "ivan" {
                    Ok(Some(persisted(
                        1,
                        NewUser {
                            username: username.clone(),
                            email: EmailAddress::new("ivan@example.com".to_string()).unwrap(),
                            password_hash: hash.clone(),
                            date_of_birth: NaiveDate::from_ymd_opt(1995, 6, 15).unwrap(),
                            role: Role::User,
                        },
                    )))
                } else {
                    Ok(None)
                }
            });

        let service = UserService::new(Arc::new(repository));
        let ghost = Username::new("ghost".to_string()).unwrap();
        let ivan = Username::new("ivan".to_string()).unwrap();

        let started = std::time::Instant::now();
        let result = service.authenticate(&ghost, "pw1234").await;
        let unknown_user = started.elapsed();
        assert!(matches!(result, Err(AuthError::UserNotFound(_))));

        let started = std::time::Instant::now();
        let result = service.authenticate(&ivan, "wrong").await;
        let wrong_password = started.elapsed();
        assert!(matches!(result, Err(AuthError::BadCredentials)));

        // Each rejection runs one Argon2 verification, which dominates the
        // elapsed time; the unknown-username path must not be observably
        // cheaper than the wrong-password path.
        assert!(
            unknown_user * 5 > wrong_password,
            "unknown-username rejection too fast: {unknown_user:?} vs {wrong_password:?}"
        );
    }

    #[tokio::test]
    async fn test_get_user_not_found() {
        let mut repository = MockTestUserRepository::new();
        repository
            .expect_find_by_id()
            .times(1)
            .returning(|_| Ok(None));

        let service = UserService::new(Arc::new(repository));
        let result = service.get_user(UserId(404)).await;

        assert!(matches!(result, Err(UserError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_user_rehashes_password() {
        let mut repository = MockTestUserRepository::new();
        repository.expect_find_by_id().times(1).returning(|id| {
            Ok(Some(persisted(
                id.0,
                NewUser {
                    username: Username::new("ivan".to_string()).unwrap(),
                    email: EmailAddress::new("ivan@example.com".to_string()).unwrap(),
                    password_hash: "$argon2id$old".to_string(),
                    date_of_birth: NaiveDate::from_ymd_opt(1995, 6, 15).unwrap(),
                    role: Role::User,
                },
            )))
        });
        repository
            .expect_update()
            .withf(|user| {
                user.username.as_str() == "ivan2"
                    && user.password_hash.starts_with("$argon2")
                    && user.password_hash != "$argon2id$old"
            })
            .times(1)
            .returning(|user| Ok(Some(user)));

        let service = UserService::new(Arc::new(repository));
        let command = UpdateUserCommand {
            username: Some(Username::new("ivan2".to_string()).unwrap()),
            password: Some("newpassword".to_string()),
            ..Default::default()
        };

        let user = service.update_user(UserId(1), command).await.unwrap();
        assert_eq!(user.username.as_str(), "ivan2");
    }

    #[tokio::test]
    async fn test_delete_user_not_found() {
        let mut repository = MockTestUserRepository::new();
        repository.expect_delete().times(1).returning(|_| Ok(false));

        let service = UserService::new(Arc::new(repository));
        let result = service.delete_user(UserId(404)).await;

        assert!(matches!(result, Err(UserError::NotFound(_))));
    }
}
