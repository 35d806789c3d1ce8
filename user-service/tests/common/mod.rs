use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Barrier;
use user_service::domain::user::models::NewUser;
use user_service::domain::user::models::ProviderLink;
use user_service::domain::user::models::User;
use user_service::domain::user::models::UserId;
use user_service::domain::user::ports::ProviderLinkRepository;
use user_service::domain::user::ports::UserRepository;
use user_service::user::errors::RepositoryError;

/// In-memory stand-in for the Postgres adapter with the same uniqueness
/// behavior: duplicate usernames, emails or provider subjects surface as
/// `UniqueViolation` with the real constraint names.
pub struct InMemoryStore {
    inner: Mutex<StoreInner>,
    // When set, account creation waits for all parties before inserting,
    // forcing concurrent logins past their existence checks first.
    create_barrier: Option<Arc<Barrier>>,
}

struct StoreInner {
    users: Vec<User>,
    links: Vec<ProviderLink>,
    next_user_id: i64,
    next_link_id: i64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::build(None)
    }

    pub fn with_create_barrier(barrier: Arc<Barrier>) -> Self {
        Self::build(Some(barrier))
    }

    fn build(create_barrier: Option<Arc<Barrier>>) -> Self {
        Self {
            inner: Mutex::new(StoreInner {
                users: Vec::new(),
                links: Vec::new(),
                next_user_id: 1,
                next_link_id: 1,
            }),
            create_barrier,
        }
    }

    pub fn user_count(&self) -> usize {
        self.inner.lock().unwrap().users.len()
    }

    pub fn link_count(&self) -> usize {
        self.inner.lock().unwrap().links.len()
    }
}

impl StoreInner {
    fn check_unique_user(&self, user: &NewUser) -> Result<(), RepositoryError> {
        if self.users.iter().any(|u| u.username == user.username) {
            return Err(RepositoryError::UniqueViolation(
                "users_username_key".to_string(),
            ));
        }
        if self.users.iter().any(|u| u.email == user.email) {
            return Err(RepositoryError::UniqueViolation(
                "users_email_key".to_string(),
            ));
        }
        Ok(())
    }

    fn insert_user(&mut self, user: NewUser) -> Result<User, RepositoryError> {
        self.check_unique_user(&user)?;
        let now = Utc::now();
        let persisted = User {
            id: UserId(self.next_user_id),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            date_of_birth: user.date_of_birth,
            role: user.role,
            created_at: now,
            updated_at: now,
        };
        self.next_user_id += 1;
        self.users.push(persisted.clone());
        Ok(persisted)
    }

    fn insert_link(
        &mut self,
        user_id: UserId,
        provider: &str,
        subject: &str,
    ) -> Result<ProviderLink, RepositoryError> {
        if self
            .links
            .iter()
            .any(|l| l.provider == provider && l.provider_user_id == subject)
        {
            return Err(RepositoryError::UniqueViolation(
                "user_providers_provider_subject_key".to_string(),
            ));
        }
        let link = ProviderLink {
            id: self.next_link_id,
            user_id,
            provider: provider.to_string(),
            provider_user_id: subject.to_string(),
        };
        self.next_link_id += 1;
        self.links.push(link.clone());
        Ok(link)
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create(&self, user: NewUser) -> Result<User, RepositoryError> {
        self.inner.lock().unwrap().insert_user(user)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_username(
        &self,
        username: &user_service::domain::user::models::Username,
    ) -> Result<Option<User>, RepositoryError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.iter().find(|u| &u.username == username).cloned())
    }

    async fn find_by_email(
        &self,
        email: &user_service::domain::user::models::EmailAddress,
    ) -> Result<Option<User>, RepositoryError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.iter().find(|u| &u.email == email).cloned())
    }

    async fn list_all(&self) -> Result<Vec<User>, RepositoryError> {
        Ok(self.inner.lock().unwrap().users.clone())
    }

    async fn update(&self, user: User) -> Result<Option<User>, RepositoryError> {
        let mut inner = self.inner.lock().unwrap();
        match inner.users.iter_mut().find(|u| u.id == user.id) {
            Some(slot) => {
                let mut updated = user;
                updated.updated_at = Utc::now();
                *slot = updated.clone();
                Ok(Some(updated))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: UserId) -> Result<bool, RepositoryError> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.users.len();
        inner.users.retain(|u| u.id != id);
        Ok(inner.users.len() < before)
    }
}

#[async_trait]
impl ProviderLinkRepository for InMemoryStore {
    async fn find_linked_user(
        &self,
        provider: &str,
        subject: &str,
    ) -> Result<Option<User>, RepositoryError> {
        let inner = self.inner.lock().unwrap();
        let link = inner
            .links
            .iter()
            .find(|l| l.provider == provider && l.provider_user_id == subject);
        Ok(link.and_then(|l| inner.users.iter().find(|u| u.id == l.user_id).cloned()))
    }

    async fn link_existing(
        &self,
        user_id: UserId,
        provider: &str,
        subject: &str,
    ) -> Result<ProviderLink, RepositoryError> {
        self.inner.lock().unwrap().insert_link(user_id, provider, subject)
    }

    async fn create_user_with_link(
        &self,
        user: NewUser,
        provider: &str,
        subject: &str,
    ) -> Result<User, RepositoryError> {
        if let Some(barrier) = &self.create_barrier {
            barrier.wait().await;
        }
        // Single lock for both inserts mirrors the adapter's transaction.
        let mut inner = self.inner.lock().unwrap();
        let persisted = inner.insert_user(user)?;
        inner.insert_link(persisted.id, provider, subject)?;
        Ok(persisted)
    }
}
